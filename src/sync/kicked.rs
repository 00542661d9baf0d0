//! Single-item overflow register.
//!
//! When a displacement chain runs out of kicks, the last evicted fingerprint
//! has no bucket to go to. It is parked here together with one of its two
//! candidate buckets, and lookups check the slot in addition to the store.
//!
//! The fingerprint field doubles as the occupancy flag: 0 is never a live
//! fingerprint, so `fingerprint == 0` means empty. The lock-free
//! [`KickedSlot::try_claim`] CAS moves it from empty to occupied. Strategies
//! that need to serialize against the slot take [`KickedSlot::lock`], which
//! is reentrant so a delete holding it can reinsert the parked item through a
//! strategy that takes it again.

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Holder for the at-most-one fingerprint displacement could not place.
///
/// # Examples
///
/// ```
/// use cuckoocraft::sync::KickedSlot;
///
/// let slot = KickedSlot::new();
/// assert!(slot.is_empty());
/// assert!(slot.try_claim(0x2A, 7));
/// assert!(!slot.try_claim(0x11, 3));
/// assert!(slot.matches(0x2A, 1, 7));
/// assert_eq!(slot.take(), Some((0x2A, 7)));
/// assert!(slot.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct KickedSlot {
    fingerprint: AtomicU32,
    bucket: AtomicU64,
    lock: ReentrantMutex<()>,
}

impl KickedSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize against other holders of the slot lock.
    pub fn lock(&self) -> ReentrantMutexGuard<'_, ()> {
        self.lock.lock()
    }

    /// Park `fingerprint` at `bucket` if the slot is empty.
    ///
    /// Returns false if another item already holds the slot.
    pub fn try_claim(&self, fingerprint: u32, bucket: u64) -> bool {
        debug_assert_ne!(fingerprint, 0, "empty marker cannot be parked");
        if self
            .fingerprint
            .compare_exchange(0, fingerprint, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.bucket.store(bucket, Ordering::Release);
        true
    }

    /// Whether no item is parked.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fingerprint.load(Ordering::Acquire) == 0
    }

    /// Parked fingerprint, or 0.
    #[inline]
    #[must_use]
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint.load(Ordering::Acquire)
    }

    /// Bucket recorded with the parked fingerprint.
    #[inline]
    #[must_use]
    pub fn bucket(&self) -> u64 {
        self.bucket.load(Ordering::Acquire)
    }

    /// Replace the recorded bucket.
    pub fn set_bucket(&self, bucket: u64) {
        self.bucket.store(bucket, Ordering::Release);
    }

    /// Replace the parked fingerprint. Callers hold [`KickedSlot::lock`].
    pub fn set_fingerprint(&self, fingerprint: u32) {
        self.fingerprint.store(fingerprint, Ordering::Release);
    }

    /// Parked `(fingerprint, bucket)` if any.
    #[must_use]
    pub fn get(&self) -> Option<(u32, u64)> {
        match self.fingerprint() {
            0 => None,
            fp => Some((fp, self.bucket())),
        }
    }

    /// Empty the slot and return what it held.
    pub fn take(&self) -> Option<(u32, u64)> {
        match self.fingerprint.swap(0, Ordering::AcqRel) {
            0 => None,
            fp => Some((fp, self.bucket())),
        }
    }

    /// Empty the slot.
    pub fn clear(&self) {
        self.fingerprint.store(0, Ordering::Release);
    }

    /// Whether the parked item is `fingerprint` with a candidate in `{bucket1, bucket2}`.
    #[inline]
    #[must_use]
    pub fn matches(&self, fingerprint: u32, bucket1: u64, bucket2: u64) -> bool {
        let held = self.fingerprint();
        if held == 0 || held != fingerprint {
            return false;
        }
        let bucket = self.bucket();
        bucket == bucket1 || bucket == bucket2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_claim_only_when_empty() {
        let slot = KickedSlot::new();
        assert!(slot.try_claim(5, 10));
        assert!(!slot.try_claim(6, 11));
        assert_eq!(slot.get(), Some((5, 10)));
        slot.clear();
        assert!(slot.try_claim(6, 11));
        assert_eq!(slot.get(), Some((6, 11)));
    }

    #[test]
    fn test_matches_either_bucket() {
        let slot = KickedSlot::new();
        assert!(!slot.matches(9, 1, 2));
        slot.try_claim(9, 2);
        assert!(slot.matches(9, 1, 2));
        assert!(slot.matches(9, 2, 1));
        assert!(!slot.matches(9, 3, 4));
        assert!(!slot.matches(8, 1, 2));
    }

    #[test]
    fn test_take_empties() {
        let slot = KickedSlot::new();
        assert_eq!(slot.take(), None);
        slot.try_claim(3, 4);
        assert_eq!(slot.take(), Some((3, 4)));
        assert!(slot.is_empty());
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_take_pairs_fingerprint_with_its_bucket() {
        let slot = KickedSlot::new();
        slot.try_claim(5, 1);
        assert_eq!(slot.take(), Some((5, 1)));
        assert!(slot.try_claim(6, 3));
        assert_eq!(slot.take(), Some((6, 3)));
        assert!(slot.try_claim(7, 0));
        assert_eq!(slot.get(), Some((7, 0)));
    }

    #[test]
    fn test_lock_is_reentrant() {
        let slot = KickedSlot::new();
        let _outer = slot.lock();
        let _inner = slot.lock();
        slot.set_fingerprint(12);
        slot.set_bucket(1);
        assert!(slot.matches(12, 1, 0));
    }

    #[test]
    fn test_concurrent_claims_single_winner() {
        let slot = Arc::new(KickedSlot::new());
        let handles: Vec<_> = (1..=16u32)
            .map(|fp| {
                let slot = Arc::clone(&slot);
                thread::spawn(move || slot.try_claim(fp, u64::from(fp)))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        let (fp, bucket) = slot.get().unwrap();
        assert_eq!(u64::from(fp), bucket);
    }
}
