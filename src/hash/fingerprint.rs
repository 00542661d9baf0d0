//! Fingerprint hashes.
//!
//! The alternate candidate bucket of a fingerprint is
//! `bucket ^ bucket_index(hash_fingerprint(fp))`. Because XOR is its own
//! inverse, either candidate plus the fingerprint recovers the other one,
//! which is what lets displacement move a fingerprint without the original
//! item.
//!
//! | Hasher | Cost | Distribution |
//! |--------|------|--------------|
//! | [`FixedHasher`] | one multiply | good in the high bits |
//! | [`MixedFingerprintHasher`] | a full bucket hash | best |

use super::hasher::BucketHasher;
use super::xxhash::XxHasher;

/// Hash of a fingerprint, used to derive the alternate bucket.
pub trait FingerprintHasher: Send + Sync {
    /// Hash `fingerprint` to 64 bits.
    fn hash_fingerprint(&self, fingerprint: u32) -> u64;

    /// Short name for logs and snapshots.
    fn name(&self) -> &'static str;
}

/// Murmur-style 64-bit mixing constant.
const MIX: u64 = 0xC4CE_B9FE_1A85_EC53;

/// Fixed-multiplier fingerprint hash.
///
/// ```
/// use cuckoocraft::hash::{FingerprintHasher, FixedHasher};
///
/// assert_eq!(FixedHasher.hash_fingerprint(1), 0xC4CE_B9FE_1A85_EC53);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedHasher;

impl FingerprintHasher for FixedHasher {
    #[inline]
    fn hash_fingerprint(&self, fingerprint: u32) -> u64 {
        u64::from(fingerprint).wrapping_mul(MIX)
    }

    fn name(&self) -> &'static str {
        "FixedHasher"
    }
}

/// Fingerprint hash through any [`BucketHasher`] over the fingerprint's
/// little-endian bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MixedFingerprintHasher<H = XxHasher> {
    inner: H,
}

impl<H: BucketHasher> MixedFingerprintHasher<H> {
    /// Wrap a bucket hasher.
    #[must_use]
    pub const fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H: BucketHasher> FingerprintHasher for MixedFingerprintHasher<H> {
    #[inline]
    fn hash_fingerprint(&self, fingerprint: u32) -> u64 {
        self.inner.hash_bytes(&fingerprint.to_le_bytes())
    }

    fn name(&self) -> &'static str {
        "MixedFingerprintHasher"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_hasher_multiplies() {
        assert_eq!(FixedHasher.hash_fingerprint(0), 0);
        assert_eq!(FixedHasher.hash_fingerprint(2), MIX.wrapping_mul(2));
    }

    #[test]
    fn test_fixed_hasher_spreads_high_bits() {
        let tops: std::collections::HashSet<u64> =
            (1u32..=255).map(|fp| FixedHasher.hash_fingerprint(fp) >> 61).collect();
        assert_eq!(tops.len(), 8);
    }

    #[test]
    fn test_mixed_matches_inner() {
        let inner = XxHasher::with_seed(3);
        let mixed = MixedFingerprintHasher::new(inner);
        assert_eq!(
            mixed.hash_fingerprint(0xABCD),
            inner.hash_bytes(&0xABCDu32.to_le_bytes())
        );
        assert_eq!(mixed.name(), "MixedFingerprintHasher");
    }
}
