#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Heat-island analysis over sampled variable data.
//!
//! Everything here is pure: the same [`Dataset`](solaris_variable_models::Dataset)
//! always produces the same score, projection and statistics. Results are
//! recomputed on every request and never cached.

pub mod projector;
pub mod recommendations;
pub mod scorer;
pub mod stats;

pub use projector::project;
pub use recommendations::recommendations;
pub use scorer::score;
pub use stats::{summarize, summarize_dataset};

/// Rounds `value` to 2 decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
