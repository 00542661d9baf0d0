//! Concurrency primitives for the cuckoo filter.
//!
//! # Module Organization
//!
//! - [`CacheLinePadded`] - Cache-line alignment for shards and counters
//! - [`BucketLocker`] - Bucket-sharded mutexes
//! - [`KickedSlot`] - Single-item overflow register
//! - [`Swapper`] - Displacement strategies ([`FastSwapper`], [`ReliableSwapper`], [`SmartSwapper`])
//!
//! # Lock Ordering
//!
//! | First held            | May then acquire              |
//! |-----------------------|-------------------------------|
//! | kicked slot lock      | bucket shards                 |
//! | one bucket shard      | the store's plane list (read) |
//! | every bucket shard    | the store's plane list (write)|
//!
//! Nothing acquires these in the reverse direction, so the protocol is
//! deadlock-free. The plane list read lock is internal to
//! [`BucketStore`](crate::core::BucketStore) and never held across calls.

pub mod kicked;
pub mod locker;
pub mod padded;
pub mod swapper;

pub use kicked::KickedSlot;
pub use locker::{AllBucketsGuard, BucketGuard, BucketLocker};
pub use padded::CacheLinePadded;
pub use swapper::{
    FastSwapper, KickContext, ReliableSwapper, SmartSwapper, SwapSafety, Swapper, SwapperKind,
};
