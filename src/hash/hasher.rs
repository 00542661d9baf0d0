//! Bucket hash trait and a dependency-free FNV hasher.
//!
//! A [`BucketHasher`] maps an item's bytes to the 64-bit hash from which both
//! the fingerprint and the primary candidate bucket are derived. It works on
//! `&[u8]` rather than `T: Hash` so the byte encoding of an item is explicit
//! and stable across processes, which raw dumps and snapshots depend on.
//!
//! ```
//! use cuckoocraft::hash::{BucketHasher, StdHasher};
//!
//! let hasher = StdHasher::with_seed(7);
//! assert_eq!(hasher.hash_bytes(b"hello"), hasher.hash_bytes(b"hello"));
//! assert_ne!(hasher.hash_bytes(b"hello"), hasher.hash_bytes(b"world"));
//! ```

#![allow(clippy::module_name_repetitions)]

/// Deterministic, seedable hash of arbitrary bytes.
pub trait BucketHasher: Send + Sync {
    /// Hash `bytes` to 64 bits. Must be deterministic for a given seed.
    fn hash_bytes(&self, bytes: &[u8]) -> u64;

    /// Seed this hasher was built with.
    fn seed(&self) -> u64;

    /// Short name for logs and snapshots.
    fn name(&self) -> &'static str;
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a state.
#[derive(Debug, Clone, Copy)]
struct Fnv1a {
    state: u64,
}

impl Fnv1a {
    const fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    #[inline]
    fn finish(self) -> u64 {
        self.state
    }
}

/// Seeded FNV-1a.
///
/// Slower and weaker than [`XxHasher`](crate::hash::XxHasher) but stable,
/// tiny and dependency-free. The seed is absorbed as eight little-endian bytes
/// before the data.
#[derive(Debug, Clone, Copy)]
pub struct StdHasher {
    seed: u64,
}

impl StdHasher {
    /// Hasher with seed 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { seed: 0 }
    }

    /// Hasher with a specific seed.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for StdHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl BucketHasher for StdHasher {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        let mut fnv = Fnv1a::new();
        fnv.write(&self.seed.to_le_bytes());
        fnv.write(bytes);
        fnv.finish()
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn name(&self) -> &'static str {
        "StdHasher"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv_reference_vectors() {
        let mut empty = Fnv1a::new();
        empty.write(b"");
        assert_eq!(empty.finish(), 0xcbf2_9ce4_8422_2325);

        let mut a = Fnv1a::new();
        a.write(b"a");
        assert_eq!(a.finish(), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_deterministic() {
        let hasher = StdHasher::new();
        assert_eq!(hasher.hash_bytes(b"test"), hasher.hash_bytes(b"test"));
    }

    #[test]
    fn test_seed_changes_hash() {
        let h1 = StdHasher::with_seed(1).hash_bytes(b"test");
        let h2 = StdHasher::with_seed(2).hash_bytes(b"test");
        assert_ne!(h1, h2);
        assert_eq!(StdHasher::with_seed(9).seed(), 9);
    }

    #[test]
    fn test_empty_input() {
        let hasher = StdHasher::default();
        assert_ne!(hasher.hash_bytes(b""), hasher.hash_bytes(b"\0"));
    }

    #[test]
    fn test_name() {
        assert_eq!(StdHasher::new().name(), "StdHasher");
    }
}
