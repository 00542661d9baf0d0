//! Core storage and filter logic.
//!
//! # Module Organization
//!
//! ```text
//! core/
//! ├── params.rs   - Defaults, validation, bucket sizing
//! ├── plane.rs    - One bit-packed entry plane per cell width
//! ├── buckets.rs  - BucketStore: planes, bucket indexing, inserted counter
//! ├── filter.rs   - CuckooFilter: fingerprints, candidate buckets, operations
//! └── mod.rs      - This file (public API)
//! ```
//!
//! # Layers
//!
//! | Layer | Knows about |
//! |-------|-------------|
//! | [`plane`] | cells of one entry across every bucket |
//! | [`BucketStore`] | buckets of `entries_per_bucket` cells, no locking |
//! | [`CuckooFilter`] | hashing, locking, displacement, the kicked slot |

pub mod buckets;
pub mod filter;
pub mod params;
pub mod plane;

pub use buckets::BucketStore;
pub use filter::{CuckooFilter, FilterConfig};
