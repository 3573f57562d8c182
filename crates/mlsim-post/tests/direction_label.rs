use mlsim_post::{direction_label, summarize_values};

fn label_for(positive: usize, negative: usize) -> String {
    let values: Vec<f64> = std::iter::repeat(1.0)
        .take(positive)
        .chain(std::iter::repeat(-1.0).take(negative))
        .collect();
    direction_label(&summarize_values(&values).unwrap())
}

#[test]
fn mostly_positive_contrast_is_labelled_above_zero() {
    assert_eq!(label_for(23, 2), "92%>0");
}

#[test]
fn mostly_negative_contrast_is_labelled_below_zero() {
    assert_eq!(label_for(29, 71), "71%<0");
}

#[test]
fn ties_favour_above_zero() {
    assert_eq!(label_for(4, 4), "50%>0");
}

#[test]
fn halves_round_away_from_zero() {
    // 5/8 = 62.5 % and 1/8 = 12.5 % are exact in binary.
    assert_eq!(label_for(5, 3), "63%>0");
    assert_eq!(label_for(1, 7), "88%<0");
    assert_eq!(label_for(3, 5), "63%<0");
}

#[test]
fn unanimous_samples_render_one_hundred_percent() {
    let values: Vec<f64> = (1..=10).map(f64::from).collect();
    assert_eq!(direction_label(&summarize_values(&values).unwrap()), "100%>0");
}
