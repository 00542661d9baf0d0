//! XXH64 bucket hasher.
//!
//! The default [`BucketHasher`]. Wraps the `xxhash-rust` implementation of
//! 64-bit xxHash, which is fast on the short keys typical of membership
//! filters and produces well-mixed high bits. Bucket indices are taken from
//! the high bits, so that matters.
//!
//! ```
//! use cuckoocraft::hash::{BucketHasher, XxHasher};
//!
//! let h1 = XxHasher::with_seed(0).hash_bytes(b"test");
//! let h2 = XxHasher::with_seed(1).hash_bytes(b"test");
//! assert_ne!(h1, h2);
//! ```

#![allow(clippy::module_name_repetitions)]

use super::hasher::BucketHasher;
use crate::core::params::DEFAULT_RANDOM_SEED;
use xxhash_rust::xxh64::xxh64;

/// Seeded XXH64.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XxHasher {
    seed: u64,
}

impl XxHasher {
    /// Hasher seeded with the crate's default seed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            seed: DEFAULT_RANDOM_SEED,
        }
    }

    /// Hasher with a specific seed.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for XxHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl BucketHasher for XxHasher {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        xxh64(bytes, self.seed)
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn name(&self) -> &'static str {
        "XxHasher"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vector() {
        assert_eq!(XxHasher::with_seed(0).hash_bytes(b""), 0xEF46_DB37_51D8_E999);
    }

    #[test]
    fn test_default_seed() {
        assert_eq!(XxHasher::default().seed(), DEFAULT_RANDOM_SEED);
        assert_eq!(XxHasher::new(), XxHasher::with_seed(DEFAULT_RANDOM_SEED));
    }

    #[test]
    fn test_hash_bytes_deterministic() {
        let hasher = XxHasher::new();
        assert_eq!(hasher.hash_bytes(b"test string"), hasher.hash_bytes(b"test string"));
    }

    #[test]
    fn test_hash_bytes_different_inputs() {
        let hasher = XxHasher::new();
        assert_ne!(hasher.hash_bytes(b"input1"), hasher.hash_bytes(b"input2"));
    }

    #[test]
    fn test_high_bits_vary() {
        let hasher = XxHasher::new();
        let tops: std::collections::HashSet<u64> = (0u32..256)
            .map(|i| hasher.hash_bytes(&i.to_le_bytes()) >> 60)
            .collect();
        assert_eq!(tops.len(), 16);
    }
}
