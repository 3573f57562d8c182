#![deny(missing_docs)]
//! Core error, randomness and serialization primitives shared by the mlsim crates.
//!
//! Every pipeline stage reports failures as [`MlsimError`], draws randomness
//! from an explicitly passed [`RngHandle`], and persists artefacts through the
//! canonical JSON helpers in [`codec`].

pub mod codec;
pub mod errors;
pub mod provenance;
pub mod rng;
pub mod stats;
mod types;

pub use codec::{stable_hash_string, to_canonical_json_bytes};
pub use errors::{ErrorInfo, MlsimError};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use types::DrawMatrix;
