//! CuckooCraft: concurrent cuckoo filter for Rust.
//!
//! A cuckoo filter answers approximate set membership like a Bloom filter,
//! but stores a short fingerprint per item in one of two candidate buckets.
//! That makes it possible to:
//! - **Delete** items without rebuilding
//! - **Count** repeated inserts of one item (counting mode)
//! - **Expand** in place by doubling entries per bucket
//!
//! Lookups can return false positives at a rate set by the fingerprint width
//! and bucket size. They never return false negatives for items that were
//! inserted and not deleted.
//!
//! # Quick Start
//!
//! ```
//! use cuckoocraft::CuckooFilter;
//!
//! let filter = CuckooFilter::new(10_000).unwrap();
//!
//! filter.insert(b"hello");
//! filter.insert_str("world");
//!
//! assert!(filter.contains(b"hello"));
//! assert!(filter.contains_str("world"));
//!
//! assert!(filter.delete(b"hello"));
//! assert!(!filter.contains(b"hello"));
//! ```
//!
//! # Concurrency
//!
//! Every operation takes `&self`. Buckets are guarded by a fixed set of
//! striped locks, so share the filter across threads with `Arc`:
//!
//! ```
//! use cuckoocraft::CuckooFilterBuilder;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let filter = Arc::new(
//!     CuckooFilterBuilder::new(100_000)
//!         .with_concurrency(64)
//!         .build()
//!         .unwrap(),
//! );
//!
//! let handles: Vec<_> = (0..4u64)
//!     .map(|t| {
//!         let filter = Arc::clone(&filter);
//!         thread::spawn(move || {
//!             for i in 0..1_000u64 {
//!                 filter.insert(&(t * 1_000 + i).to_le_bytes());
//!             }
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert!(filter.contains(&3_999u64.to_le_bytes()));
//! ```
//!
//! # Displacement Modes
//!
//! | Mode | Kick chain | Guarantee |
//! |------|-----------|-----------|
//! | [`SwapSafety::Reliable`] | serialized through the kicked slot | no false negatives |
//! | [`SwapSafety::Fast`] | concurrent | an evicted item can be lost under contention |
//! | [`SwapSafety::Smart`] | fast, reliable past a load threshold | reliable when it matters |
//!
//! # Features
//!
//! - `serde` - Snapshots of the complete filter state ([`FilterSnapshot`])
//! - `trace` - Per-operation `tracing` events on insert and delete
//!
//! # Logging
//!
//! Lifecycle events (creation, expansion, restore) are emitted at `debug`
//! and rejected inserts at `warn` through [`tracing`]. Install any
//! subscriber to see them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_root_url = "https://docs.rs/cuckoocraft/0.1.0")]

/// Bucket storage, parameters and the filter itself
pub mod core;

/// Error types and result aliases
pub mod error;

/// String encoders for the `*_str` operations
pub mod encode;

/// Item and fingerprint hashers
pub mod hash;

/// Entry selection randomness
pub mod util;

/// Locks, the kicked slot and displacement strategies
pub mod sync;

/// Filter builder
pub mod builder;

/// Snapshots (requires `serde` feature)
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub mod serde_support;

pub use error::{CuckooCraftError, Result};

pub use crate::core::{BucketStore, CuckooFilter, FilterConfig};

pub use builder::{CuckooFilterBuilder, FilterMetadata};

pub use sync::SwapSafety;

pub use hash::{BucketHasher, FingerprintHasher, FixedHasher, MixedFingerprintHasher, StdHasher, XxHasher};

pub use encode::{AsciiEncoder, HexEncoder, StringEncoder, Utf16LeEncoder, Utf8Encoder};

pub use util::{RandomSource, SplitMixRandom};

#[cfg(feature = "serde")]
pub use serde_support::{FilterSnapshot, SnapshotError};

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use cuckoocraft::prelude::*;
///
/// let filter = CuckooFilterBuilder::new(1_000)
///     .with_swap_safety(SwapSafety::Smart)
///     .build()
///     .unwrap();
/// filter.insert_str("hello");
/// assert!(filter.contains_str("hello"));
/// ```
pub mod prelude {
    pub use crate::builder::{CuckooFilterBuilder, FilterMetadata};
    pub use crate::core::{CuckooFilter, FilterConfig};
    pub use crate::encode::StringEncoder;
    pub use crate::error::{CuckooCraftError, Result};
    pub use crate::hash::{BucketHasher, FingerprintHasher};
    pub use crate::sync::SwapSafety;

    #[cfg(feature = "serde")]
    pub use crate::serde_support::FilterSnapshot;
}
