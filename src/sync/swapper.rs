//! Displacement ("kicking") strategies.
//!
//! A swapper runs only after both candidate buckets of a fingerprint were
//! found full. It repeatedly evicts a random entry of the current bucket,
//! puts the homeless fingerprint there, and tries to place the evictee in its
//! own alternate bucket:
//!
//! ```text
//! repeat up to max_kicks:
//!     entry       = random() & (entries_per_bucket - 1)
//!     fingerprint = store.swap(entry, bucket, fingerprint)      # evictee
//!     bucket      = bucket ^ index(fp_hash(fingerprint))        # its other home
//!     if store.insert(bucket, fingerprint): done
//! park the last evictee in the kicked slot
//! ```
//!
//! # Strategies
//!
//! | Strategy | Kicked slot lock | Concurrent chains | Can lose items |
//! |----------|------------------|-------------------|----------------|
//! | [`FastSwapper`] | never | yes | yes, under contention |
//! | [`ReliableSwapper`] | whole loop | one at a time | no |
//! | [`SmartSwapper`] | at or above the load threshold | below it | only below it |
//!
//! `Fast` lets two chains race: each chain's in-flight fingerprint lives only
//! on its own stack, and if both exhaust, only one can park in the kicked
//! slot. The other evictee is dropped. `Reliable` keeps the in-flight
//! fingerprint in the kicked slot for the whole loop, where lookups can see
//! it, and serializes chains through the slot's lock.

use crate::core::BucketStore;
use crate::hash::FingerprintHasher;
use crate::sync::{BucketLocker, KickedSlot};
use crate::util::RandomSource;
use std::fmt;

/// Shared state a displacement loop works on.
pub struct KickContext<'a, F: ?Sized> {
    /// Fingerprint storage.
    pub store: &'a BucketStore,
    /// Per-bucket locks.
    pub locker: &'a BucketLocker,
    /// Overflow register.
    pub kicked: &'a KickedSlot,
    /// Hash used to find a fingerprint's alternate bucket.
    pub fingerprint_hasher: &'a F,
    /// Entry selection.
    pub random: &'a dyn RandomSource,
    /// Kick budget.
    pub max_kicks: u32,
}

impl<'a, F: FingerprintHasher + ?Sized> KickContext<'a, F> {
    /// The other candidate bucket of `fingerprint` when it sits in `bucket`.
    #[inline]
    pub fn alternate_bucket(&self, bucket: u64, fingerprint: u32) -> u64 {
        bucket ^ self
            .store
            .bucket_index(self.fingerprint_hasher.hash_fingerprint(fingerprint))
    }

    #[inline]
    fn random_entry(&self) -> usize {
        // Entries per bucket only grows, so a stale read is still in range.
        let mask = self.store.entries_per_bucket() - 1;
        self.random.next_u32() as usize & mask
    }
}

impl<F: ?Sized> fmt::Debug for KickContext<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KickContext")
            .field("max_kicks", &self.max_kicks)
            .field("kicked", &self.kicked)
            .finish_non_exhaustive()
    }
}

/// A displacement strategy.
pub trait Swapper: Send + Sync {
    /// Make room for `fingerprint`, whose candidate buckets are both full,
    /// starting from `bucket`.
    ///
    /// Returns true if the fingerprint (or whichever fingerprint ended up
    /// homeless) is now accounted for in the store or the kicked slot, false
    /// if the filter is full.
    fn swap<F: FingerprintHasher + ?Sized>(
        &self,
        ctx: &KickContext<'_, F>,
        fingerprint: u32,
        bucket: u64,
    ) -> bool;
}

/// Concurrency mode for displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwapSafety {
    /// Lock-free chains; may lose items under heavy concurrent inserts.
    Fast,
    /// One chain at a time; never loses items.
    #[default]
    Reliable,
    /// `Fast` until the load factor passes a threshold, then `Reliable`.
    Smart,
}

/// Displacement without the kicked slot lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastSwapper;

impl Swapper for FastSwapper {
    fn swap<F: FingerprintHasher + ?Sized>(
        &self,
        ctx: &KickContext<'_, F>,
        mut fingerprint: u32,
        mut bucket: u64,
    ) -> bool {
        if !ctx.kicked.is_empty() {
            return false;
        }

        for _ in 0..ctx.max_kicks {
            let entry = ctx.random_entry();
            {
                let _guard = ctx.locker.lock(bucket);
                fingerprint = ctx.store.swap(entry, bucket, fingerprint);
            }

            bucket = ctx.alternate_bucket(bucket, fingerprint);

            let _guard = ctx.locker.lock(bucket);
            if ctx.store.insert(bucket, fingerprint) {
                return true;
            }
        }

        if ctx.kicked.try_claim(fingerprint, bucket) {
            ctx.store.increment_inserted_count();
            return true;
        }

        tracing::warn!(
            fingerprint,
            bucket,
            "kicked slot taken by a concurrent insert, dropping evicted fingerprint"
        );
        false
    }
}

/// Displacement serialized through the kicked slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReliableSwapper;

impl Swapper for ReliableSwapper {
    fn swap<F: FingerprintHasher + ?Sized>(
        &self,
        ctx: &KickContext<'_, F>,
        fingerprint: u32,
        bucket: u64,
    ) -> bool {
        let kicked = ctx.kicked;
        let _slot = kicked.lock();

        if !kicked.try_claim(fingerprint, bucket) {
            return false;
        }

        for _ in 0..ctx.max_kicks {
            let entry = ctx.random_entry();
            let bucket = kicked.bucket();
            {
                let _guard = ctx.locker.lock(bucket);
                let evicted = ctx.store.swap(entry, bucket, kicked.fingerprint());
                kicked.set_fingerprint(evicted);
            }

            let next = ctx.alternate_bucket(bucket, kicked.fingerprint());
            kicked.set_bucket(next);

            let _guard = ctx.locker.lock(next);
            if ctx.store.insert(next, kicked.fingerprint()) {
                kicked.clear();
                return true;
            }
        }

        #[cfg(feature = "trace")]
        tracing::trace!(
            fingerprint = kicked.fingerprint(),
            bucket = kicked.bucket(),
            "kicks exhausted, fingerprint parked"
        );
        ctx.store.increment_inserted_count();
        true
    }
}

/// Chooses [`FastSwapper`] or [`ReliableSwapper`] by load factor.
///
/// The threshold is evaluated against the current capacity on every call, so
/// it stays meaningful after the filter expands.
#[derive(Debug, Clone, Copy)]
pub struct SmartSwapper {
    load_factor_threshold: f64,
}

impl SmartSwapper {
    /// Switch to reliable displacement once `inserted >= threshold * capacity`.
    #[must_use]
    pub const fn new(load_factor_threshold: f64) -> Self {
        Self {
            load_factor_threshold,
        }
    }

    /// Whether a swap issued now would run reliably.
    #[must_use]
    pub fn is_reliable(&self, store: &BucketStore) -> bool {
        store.inserted_count() as f64 >= store.capacity() as f64 * self.load_factor_threshold
    }
}

impl Default for SmartSwapper {
    fn default() -> Self {
        Self::new(crate::core::params::DEFAULT_SMART_LOAD_FACTOR)
    }
}

impl Swapper for SmartSwapper {
    fn swap<F: FingerprintHasher + ?Sized>(
        &self,
        ctx: &KickContext<'_, F>,
        fingerprint: u32,
        bucket: u64,
    ) -> bool {
        if self.is_reliable(ctx.store) {
            ReliableSwapper.swap(ctx, fingerprint, bucket)
        } else {
            FastSwapper.swap(ctx, fingerprint, bucket)
        }
    }
}

/// The swapper a filter was configured with.
#[derive(Debug, Clone, Copy)]
pub enum SwapperKind {
    /// See [`FastSwapper`].
    Fast(FastSwapper),
    /// See [`ReliableSwapper`].
    Reliable(ReliableSwapper),
    /// See [`SmartSwapper`].
    Smart(SmartSwapper),
}

impl SwapperKind {
    /// Build the swapper for a mode.
    #[must_use]
    pub fn new(safety: SwapSafety, smart_load_factor: f64) -> Self {
        match safety {
            SwapSafety::Fast => Self::Fast(FastSwapper),
            SwapSafety::Reliable => Self::Reliable(ReliableSwapper),
            SwapSafety::Smart => Self::Smart(SmartSwapper::new(smart_load_factor)),
        }
    }

    /// The mode this swapper implements.
    #[must_use]
    pub fn safety(&self) -> SwapSafety {
        match self {
            Self::Fast(_) => SwapSafety::Fast,
            Self::Reliable(_) => SwapSafety::Reliable,
            Self::Smart(_) => SwapSafety::Smart,
        }
    }
}

impl Swapper for SwapperKind {
    #[inline]
    fn swap<F: FingerprintHasher + ?Sized>(
        &self,
        ctx: &KickContext<'_, F>,
        fingerprint: u32,
        bucket: u64,
    ) -> bool {
        match self {
            Self::Fast(s) => s.swap(ctx, fingerprint, bucket),
            Self::Reliable(s) => s.swap(ctx, fingerprint, bucket),
            Self::Smart(s) => s.swap(ctx, fingerprint, bucket),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::FixedHasher;
    use crate::util::SplitMixRandom;

    /// Every fingerprint hashes to offset 1, so buckets pair up as (2k, 2k+1).
    struct OffsetOne;

    impl FingerprintHasher for OffsetOne {
        fn hash_fingerprint(&self, _fingerprint: u32) -> u64 {
            // top bits select bucket 1 of 8
            1 << 61
        }

        fn name(&self) -> &'static str {
            "OffsetOne"
        }
    }

    struct Fixture {
        store: BucketStore,
        locker: BucketLocker,
        kicked: KickedSlot,
        random: SplitMixRandom,
    }

    impl Fixture {
        fn new() -> Self {
            let store = BucketStore::new(4, 8, 8, true).unwrap();
            let locker = BucketLocker::new(8, store.bucket_count()).unwrap();
            Self {
                store,
                locker,
                kicked: KickedSlot::new(),
                random: SplitMixRandom::new(1),
            }
        }

        fn ctx<'a, F: FingerprintHasher>(&'a self, hasher: &'a F, max_kicks: u32) -> KickContext<'a, F> {
            KickContext {
                store: &self.store,
                locker: &self.locker,
                kicked: &self.kicked,
                fingerprint_hasher: hasher,
                random: &self.random,
                max_kicks,
            }
        }

        fn fill_pair(&self, base: u32) {
            for bucket in [2u64, 3] {
                for i in 0..4 {
                    assert!(self.store.insert(bucket, base + i));
                }
            }
        }

        fn pair_contents(&self) -> Vec<u32> {
            let mut all = Vec::new();
            for bucket in [2u64, 3] {
                for entry in 0..4 {
                    all.push(self.store.get(entry, bucket));
                }
            }
            all.sort_unstable();
            all
        }
    }

    #[test]
    fn test_alternate_bucket_is_involution() {
        let fx = Fixture::new();
        let ctx = fx.ctx(&FixedHasher, 10);
        for bucket in 0..8 {
            for fp in 1..=255 {
                let alt = ctx.alternate_bucket(bucket, fp);
                assert_eq!(ctx.alternate_bucket(alt, fp), bucket);
            }
        }
    }

    #[test]
    fn test_kick_moves_into_free_slot() {
        let fx = Fixture::new();
        // bucket 2 full, bucket 3 has room: first kick lands in bucket 3
        for i in 0..4 {
            fx.store.insert(2, 10 + i);
        }
        let ctx = fx.ctx(&OffsetOne, 10);
        assert!(ReliableSwapper.swap(&ctx, 99, 2));
        assert!(fx.kicked.is_empty());
        assert!(fx.store.contains(2, 99));
        assert_eq!(fx.store.inserted_count(), 5);
        assert_eq!(
            (0..4).filter(|&e| fx.store.get(e, 3) != 0).count(),
            1
        );
    }

    #[test]
    fn test_reliable_parks_evictee_and_counts_it() {
        let fx = Fixture::new();
        fx.fill_pair(10);
        let ctx = fx.ctx(&OffsetOne, 25);

        assert!(ReliableSwapper.swap(&ctx, 99, 2));
        assert_eq!(fx.store.inserted_count(), 9);

        let (parked, bucket) = fx.kicked.get().unwrap();
        assert!(bucket == 2 || bucket == 3);

        // Nothing was lost: the pair plus the slot hold all nine fingerprints.
        let mut all = fx.pair_contents();
        all.push(parked);
        all.sort_unstable();
        let mut expected: Vec<u32> = (10..18).collect();
        expected.push(99);
        assert_eq!(all, expected);

        // Second homeless item: filter is full.
        assert!(!ReliableSwapper.swap(&ctx, 77, 2));
        assert_eq!(fx.store.inserted_count(), 9);
    }

    #[test]
    fn test_fast_parks_then_refuses() {
        let fx = Fixture::new();
        fx.fill_pair(10);
        let ctx = fx.ctx(&OffsetOne, 5);

        assert!(FastSwapper.swap(&ctx, 99, 2));
        assert!(!fx.kicked.is_empty());
        assert_eq!(fx.store.inserted_count(), 9);

        assert!(!FastSwapper.swap(&ctx, 77, 3));
        assert_eq!(fx.store.inserted_count(), 9);
    }

    #[test]
    fn test_zero_kicks_parks_immediately() {
        let fx = Fixture::new();
        fx.fill_pair(10);
        let ctx = fx.ctx(&OffsetOne, 0);
        assert!(ReliableSwapper.swap(&ctx, 99, 2));
        assert_eq!(fx.kicked.get(), Some((99, 2)));
        assert_eq!(fx.pair_contents(), (10..18).collect::<Vec<_>>());
    }

    #[test]
    fn test_smart_switches_on_load() {
        let fx = Fixture::new();
        let smart = SmartSwapper::new(0.5);
        assert!(!smart.is_reliable(&fx.store));
        for bucket in 0..8u64 {
            for i in 0..2 {
                fx.store.insert(bucket, 1 + i);
            }
        }
        assert!(smart.is_reliable(&fx.store));

        let fx = Fixture::new();
        for bucket in 0..8u64 {
            fx.store.insert(bucket, 1);
        }
        assert!(!smart.is_reliable(&fx.store));
    }

    #[test]
    fn test_smart_reliable_at_exact_threshold() {
        let fx = Fixture::new();
        for bucket in 0..4u64 {
            for i in 0..4 {
                fx.store.insert(bucket, 1 + i);
            }
        }
        assert_eq!(fx.store.inserted_count(), 16);
        assert!(SmartSwapper::new(0.5).is_reliable(&fx.store));
        assert!(!SmartSwapper::new(0.51).is_reliable(&fx.store));
    }

    #[test]
    fn test_smart_zero_threshold_always_reliable() {
        let fx = Fixture::new();
        let smart = SmartSwapper::new(0.0);
        assert!(smart.is_reliable(&fx.store));

        fx.fill_pair(10);
        let ctx = fx.ctx(&OffsetOne, 4);
        assert!(smart.swap(&ctx, 99, 2));
        // reliable swaps refuse a second homeless item without touching the store
        let before = fx.pair_contents();
        assert!(!smart.swap(&ctx, 77, 2));
        assert_eq!(fx.pair_contents(), before);
    }

    #[test]
    fn test_smart_threshold_follows_expansion() {
        let fx = Fixture::new();
        let smart = SmartSwapper::new(0.5);
        for bucket in 0..8u64 {
            for i in 0..3 {
                fx.store.insert(bucket, 1 + i);
            }
        }
        assert!(smart.is_reliable(&fx.store));
        fx.store.expand(64).unwrap();
        assert!(!smart.is_reliable(&fx.store));
    }

    #[test]
    fn test_kind_reports_safety() {
        for safety in [SwapSafety::Fast, SwapSafety::Reliable, SwapSafety::Smart] {
            assert_eq!(SwapperKind::new(safety, 0.9).safety(), safety);
        }
        assert_eq!(SwapSafety::default(), SwapSafety::Reliable);
    }

    #[test]
    fn test_kind_delegates() {
        let fx = Fixture::new();
        fx.fill_pair(10);
        let ctx = fx.ctx(&OffsetOne, 3);
        let kind = SwapperKind::new(SwapSafety::Smart, 0.0);
        assert!(kind.swap(&ctx, 50, 3));
        assert!(!fx.kicked.is_empty());
    }
}
