//! Synthetic data generator for a multilevel two-condition experiment.
//!
//! Participants receive correlated intercept and slope effects drawn from a
//! bivariate normal; each participant contributes `trials` rows whose condition
//! flag follows a fixed alternating pattern over the flattened table.

mod generate;
/// Bivariate normal sampler and covariance construction.
pub mod mvn;
mod params;
/// CSV persistence helpers.
pub mod table;

pub use generate::{
    condition_pattern, draw_participants, simulate, simulate_seeded, EffectMoments, Observation,
    Participant, SimulatedData,
};
pub use mvn::{covariance_matrix, BivariateNormal};
pub use params::SimulationParams;
