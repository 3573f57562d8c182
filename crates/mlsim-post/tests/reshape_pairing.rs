use std::collections::BTreeMap;
use std::fs;

use mlsim_core::DrawMatrix;
use mlsim_post::{condition_grid, reshape, PosteriorRow};
use tempfile::tempdir;

fn sample_matrix() -> DrawMatrix {
    // Three draws for conditions 0 and 1.
    DrawMatrix::from_row_major(3, 2, vec![1.0, 1.5, 2.0, 2.25, -1.0, 0.0]).unwrap()
}

#[test]
fn grid_covers_both_conditions() {
    assert_eq!(condition_grid(), vec![0.0, 1.0]);
}

#[test]
fn each_replication_has_one_row_per_condition() {
    let table = reshape(&sample_matrix(), &[0, 1]).unwrap();
    assert_eq!(table.len(), 6);
    assert_eq!(table.conditions(), vec![0, 1]);

    let mut counts: BTreeMap<(usize, u8), usize> = BTreeMap::new();
    for row in table.rows() {
        *counts.entry((row.replication, row.condition)).or_insert(0) += 1;
    }
    assert_eq!(counts.len(), 6);
    assert!(counts.values().all(|count| *count == 1));

    let control: Vec<usize> = table.rows_for(0).map(|row| row.replication).collect();
    let treatment: Vec<usize> = table.rows_for(1).map(|row| row.replication).collect();
    assert_eq!(control, vec![1, 2, 3]);
    assert_eq!(control, treatment);
}

#[test]
fn values_follow_the_labelled_columns() {
    let table = reshape(&sample_matrix(), &[1, 0]).unwrap();
    assert_eq!(
        table.rows()[0],
        PosteriorRow {
            condition: 1,
            replication: 1,
            measurement: 1.0
        }
    );
    let control: Vec<f64> = table.rows_for(0).map(|row| row.measurement).collect();
    assert_eq!(control, vec![1.5, 2.25, 0.0]);
}

#[test]
fn precondition_violations_are_reported() {
    let matrix = sample_matrix();
    assert_eq!(reshape(&matrix, &[0]).unwrap_err().code(), "reshape-label-count");
    assert_eq!(reshape(&matrix, &[0, 0]).unwrap_err().code(), "reshape-duplicate-label");

    let empty = DrawMatrix::from_row_major(0, 2, Vec::new()).unwrap();
    assert_eq!(reshape(&empty, &[0, 1]).unwrap_err().code(), "reshape-empty");
}

#[test]
fn table_is_written_as_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out").join("posterior.csv");
    reshape(&sample_matrix(), &[0, 1]).unwrap().write_csv(&path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("condition,replication,measurement"));
    assert_eq!(lines.next(), Some("0,1,1.0"));
    assert_eq!(contents.lines().count(), 7);
}
