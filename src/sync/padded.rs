//! Cache-line padding for hot shared state.
//!
//! Lock shards and the inserted-item counter are touched by every writer.
//! Packing them next to each other makes unrelated threads invalidate each
//! other's cache lines (false sharing). Wrapping each one in
//! [`CacheLinePadded`] gives it a line of its own.
//!
//! ```text
//! [Mutex<()> shard 0 | padding] [Mutex<()> shard 1 | padding] ...   64 bytes each
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

/// Value aligned (and therefore padded) to a 64-byte cache line.
///
/// # Examples
///
/// ```
/// use cuckoocraft::sync::CacheLinePadded;
/// use std::sync::atomic::AtomicU64;
///
/// let counter = CacheLinePadded::new(AtomicU64::new(0));
/// counter.increment();
/// assert_eq!(counter.load(), 1);
/// assert_eq!(std::mem::align_of_val(&counter), 64);
/// ```
#[repr(align(64))]
pub struct CacheLinePadded<T> {
    value: T,
}

impl<T> CacheLinePadded<T> {
    /// Wrap a value.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> Deref for CacheLinePadded<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.value
    }
}

impl CacheLinePadded<AtomicU64> {
    /// Load with Acquire ordering.
    #[inline]
    #[must_use]
    pub fn load(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Store with Release ordering.
    #[inline]
    pub fn store(&self, val: u64) {
        self.value.store(val, Ordering::Release);
    }

    /// Add one.
    #[inline]
    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::AcqRel);
    }

    /// Subtract `val`, saturating at zero.
    ///
    /// Fast-mode displacement can race a delete past an insert, so the
    /// counter must never wrap to `u64::MAX`.
    #[inline]
    pub fn saturating_sub(&self, val: u64) {
        let _ = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| Some(v.saturating_sub(val)));
    }
}

impl<T: Default> Default for CacheLinePadded<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for CacheLinePadded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheLinePadded")
            .field("value", &self.value)
            .finish()
    }
}
