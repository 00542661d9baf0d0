//! Hash strategies for cuckoo filters.
//!
//! # Module Structure
//!
//! ```text
//! hash/
//! ├── hasher.rs       - BucketHasher trait and StdHasher (seeded FNV-1a)
//! ├── xxhash.rs       - XxHasher (XXH64), the default bucket hasher
//! ├── fingerprint.rs  - FingerprintHasher trait, FixedHasher, MixedFingerprintHasher
//! └── mod.rs          - This file (public API)
//! ```
//!
//! Two hashes drive every operation:
//!
//! - A [`BucketHasher`] turns item bytes into a 64-bit hash. The fingerprint
//!   comes from its low-order bits and the primary bucket from its high bits.
//! - A [`FingerprintHasher`] turns a fingerprint into the offset XORed onto a
//!   bucket to reach the alternate bucket.
//!
//! # Choosing a Hash Function
//!
//! | Hash Function | Speed     | Quality   | Use Case                         |
//! |---------------|-----------|-----------|----------------------------------|
//! | [`XxHasher`]  | Very Fast | Excellent | Default bucket hash              |
//! | [`StdHasher`] | Medium    | Good      | Dependency-free, stable output   |
//! | [`FixedHasher`] | Fastest | Good high bits | Default fingerprint hash     |
//! | [`MixedFingerprintHasher`] | Fast | Excellent | Fingerprint hash via a bucket hasher |
//!
//! None of these are cryptographic; do not use them where an adversary picks
//! the keys.

pub mod fingerprint;
pub mod hasher;
pub mod xxhash;

pub use fingerprint::{FingerprintHasher, FixedHasher, MixedFingerprintHasher};
pub use hasher::{BucketHasher, StdHasher};
pub use xxhash::XxHasher;
