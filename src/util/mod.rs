//! Internal utilities.
//!
//! # Modules
//!
//! - [`random`] - Seedable entry selection for displacement

pub mod random;

pub use random::{RandomSource, SplitMixRandom};
