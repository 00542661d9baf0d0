//! Serialization support for cuckoo filters.
//!
//! This module is only available when the `serde` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! cuckoocraft = { version = "0.1", features = ["serde"] }
//! ```
//!
//! A [`FilterSnapshot`] is a plain data capture of a filter: its scalar
//! configuration, inserted count, kicked slot, hasher identities, and one
//! byte vector per entry plane. It works with any serde format.
//!
//! Hashers are not serialized. Restoring requires hashers of the same type
//! and seed as the captured filter, which
//! [`CuckooFilter::from_snapshot`](crate::CuckooFilter::from_snapshot) checks by
//! name and seed; a different hasher would make every stored fingerprint
//! unreachable.
//!
//! # Examples
//!
//! ```
//! use cuckoocraft::{CuckooFilter, CuckooFilterBuilder};
//! use cuckoocraft::hash::{FixedHasher, XxHasher};
//!
//! let filter = CuckooFilterBuilder::new(1_000).build().unwrap();
//! filter.insert_str("persisted");
//!
//! let json = serde_json::to_string(&filter.snapshot()).unwrap();
//! let snapshot = serde_json::from_str(&json).unwrap();
//!
//! let restored = CuckooFilter::from_snapshot(
//!     &snapshot,
//!     *filter.bucket_hasher(),
//!     FixedHasher,
//! ).unwrap();
//! assert!(restored.contains_str("persisted"));
//! # let _: XxHasher = *restored.bucket_hasher();
//! ```

pub mod snapshot;

pub use snapshot::{FilterSnapshot, SnapshotError, SNAPSHOT_VERSION};
