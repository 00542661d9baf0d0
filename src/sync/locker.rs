//! Bucket-sharded mutexes.
//!
//! A fixed, power-of-two array of mutexes. Bucket `b` is guarded by shard
//! `b & (concurrency - 1)`, so adjacent buckets land on different shards and
//! unrelated inserts rarely contend.
//!
//! ## Locking Protocol
//!
//! | Operation            | Locks Acquired          | Duration |
//! |----------------------|-------------------------|----------|
//! | insert / delete      | One shard at a time     | Brief    |
//! | displacement step    | One shard at a time     | Brief    |
//! | `expand()` / dump    | Every shard, ascending  | Full     |
//!
//! No code path holds two shard locks except [`BucketLocker::lock_all`], which
//! always acquires them in ascending order. That rules out lock-order cycles.
//!
//! Guards are RAII: releasing a lock is dropping its guard, so an early return
//! or a panic can never leave a shard locked.

use crate::error::Result;
use crate::core::params;
use crate::sync::CacheLinePadded;
use parking_lot::{Mutex, MutexGuard};

/// Guard for a single bucket shard.
pub type BucketGuard<'a> = MutexGuard<'a, ()>;

/// Guards for every shard, held together by [`BucketLocker::lock_all`].
#[derive(Debug)]
pub struct AllBucketsGuard<'a> {
    _guards: Vec<BucketGuard<'a>>,
}

/// Array of per-shard mutexes indexed by bucket.
///
/// # Examples
///
/// ```
/// use cuckoocraft::sync::BucketLocker;
///
/// let locker = BucketLocker::new(16, 1024).unwrap();
/// {
///     let _guard = locker.lock(42);
///     // bucket 42 (and every bucket sharing its shard) is held here
/// }
/// let _all = locker.lock_all();
/// ```
#[derive(Debug)]
pub struct BucketLocker {
    shards: Box<[CacheLinePadded<Mutex<()>>]>,
    mask: u64,
}

impl BucketLocker {
    /// Create a locker with `concurrency` shards, capped to `bucket_count`.
    ///
    /// # Errors
    ///
    /// Returns [`CuckooCraftError::InvalidConcurrency`](crate::CuckooCraftError::InvalidConcurrency)
    /// unless `concurrency` is a power of two.
    pub fn new(concurrency: usize, bucket_count: u64) -> Result<Self> {
        params::validate_concurrency(concurrency)?;

        let capped = (concurrency as u64).min(bucket_count.max(1)) as usize;
        let shards = (0..capped)
            .map(|_| CacheLinePadded::new(Mutex::new(())))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            shards,
            mask: capped as u64 - 1,
        })
    }

    /// Number of shards actually allocated.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.shards.len()
    }

    #[inline]
    fn shard(&self, bucket: u64) -> &Mutex<()> {
        &self.shards[(bucket & self.mask) as usize]
    }

    /// Block until the shard guarding `bucket` is held.
    #[inline]
    pub fn lock(&self, bucket: u64) -> BucketGuard<'_> {
        self.shard(bucket).lock()
    }

    /// Take the shard guarding `bucket` if it is free.
    #[inline]
    pub fn try_lock(&self, bucket: u64) -> Option<BucketGuard<'_>> {
        self.shard(bucket).try_lock()
    }

    /// Acquire every shard in ascending order.
    ///
    /// Only for whole-structure operations; never on a hot path.
    pub fn lock_all(&self) -> AllBucketsGuard<'_> {
        AllBucketsGuard {
            _guards: self.shards.iter().map(|shard| shard.lock()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_rejects_non_power_of_two() {
        assert!(BucketLocker::new(0, 64).is_err());
        assert!(BucketLocker::new(12, 64).is_err());
    }

    #[test]
    fn test_concurrency_capped_to_buckets() {
        assert_eq!(BucketLocker::new(64, 8).unwrap().concurrency(), 8);
        assert_eq!(BucketLocker::new(16, 1024).unwrap().concurrency(), 16);
    }

    #[test]
    fn test_buckets_share_shard_by_mask() {
        let locker = BucketLocker::new(4, 64).unwrap();
        let _held = locker.lock(1);
        assert!(locker.try_lock(5).is_none());
        assert!(locker.try_lock(2).is_some());
    }

    #[test]
    fn test_lock_all_blocks_everything() {
        let locker = BucketLocker::new(8, 64).unwrap();
        let all = locker.lock_all();
        for bucket in 0..8 {
            assert!(locker.try_lock(bucket).is_none());
        }
        drop(all);
        assert!(locker.try_lock(3).is_some());
    }

    #[test]
    fn test_lock_serializes_same_bucket() {
        let locker = Arc::new(BucketLocker::new(2, 64).unwrap());
        let value = Arc::new(AtomicU64::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let locker = Arc::clone(&locker);
                let value = Arc::clone(&value);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let _guard = locker.lock(7);
                        // non-atomic read-modify-write, safe only under the lock
                        let v = value.load(Ordering::Relaxed);
                        value.store(v + 1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(value.load(Ordering::Relaxed), 2000);
    }
}
