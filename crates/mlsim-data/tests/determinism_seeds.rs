use mlsim_core::RngHandle;
use mlsim_data::{simulate, simulate_seeded, SimulationParams};
use proptest::prelude::*;

#[test]
fn same_seed_reproduces_table() {
    let params = SimulationParams::default();
    let a = simulate_seeded(&params).unwrap();
    let b = simulate_seeded(&params).unwrap();
    assert_eq!(a, b);
}

#[test]
fn different_seeds_change_measurements() {
    let params = SimulationParams::default();
    let other = SimulationParams {
        seed: 2,
        ..SimulationParams::default()
    };
    let a = simulate_seeded(&params).unwrap();
    let b = simulate_seeded(&other).unwrap();
    assert_ne!(a.observations, b.observations);
}

#[test]
fn explicit_generator_matches_seeded_helper() {
    let params = SimulationParams::default();
    let mut rng = RngHandle::from_seed(params.seed);
    let explicit = simulate(&params, &mut rng).unwrap();
    assert_eq!(explicit, simulate_seeded(&params).unwrap());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn any_seed_is_deterministic(seed in any::<u64>(), participants in 1u32..8, trials in 1u32..6) {
        let params = SimulationParams { seed, participants, trials, ..SimulationParams::default() };
        let a = simulate_seeded(&params).unwrap();
        let b = simulate_seeded(&params).unwrap();
        prop_assert_eq!(a.observations.len(), (participants * trials) as usize);
        prop_assert_eq!(a, b);
    }
}
