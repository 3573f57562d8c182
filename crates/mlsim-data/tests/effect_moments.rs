use mlsim_core::RngHandle;
use mlsim_data::{draw_participants, EffectMoments, SimulationParams};

#[test]
fn random_effects_converge_to_configuration() {
    let params = SimulationParams {
        participants: 20_000,
        ..SimulationParams::default()
    };
    let mut rng = RngHandle::from_seed(11);
    let participants = draw_participants(&params, &mut rng).unwrap();
    let moments = EffectMoments::from_participants(&participants);

    assert!((moments.intercept_mean - params.intercept_mean).abs() < 0.03);
    assert!((moments.slope_mean - params.effect_mean).abs() < 0.05);
    assert!((moments.intercept_sd - params.intercept_sd).abs() < 0.02);
    assert!((moments.slope_sd - params.slope_sd).abs() < 0.03);
    assert!((moments.correlation - params.correlation).abs() < 0.03);
}

#[test]
fn estimates_tighten_with_more_participants() {
    let error_for = |participants: u32| {
        let params = SimulationParams {
            participants,
            ..SimulationParams::default()
        };
        // Average absolute correlation error over several seeds.
        (0..8)
            .map(|seed| {
                let mut rng = RngHandle::from_seed(seed);
                let drawn = draw_participants(&params, &mut rng).unwrap();
                (EffectMoments::from_participants(&drawn).correlation - params.correlation).abs()
            })
            .sum::<f64>()
            / 8.0
    };
    assert!(error_for(5_000) < error_for(20));
}
