//! Bit-packed bucket store.
//!
//! Logically a matrix of `entries_per_bucket x bucket_count` cells, each an
//! unsigned `fingerprint_bits`-wide integer where 0 means empty. Physically
//! one [`EntryPlane`] per entry slot, all of the same layout, selected once
//! from the fingerprint width:
//!
//! ```text
//!            bucket 0   bucket 1   bucket 2   ...
//! plane 0  [   fp   ] [   0    ] [   fp   ]
//! plane 1  [   fp   ] [   0    ] [   0    ]
//! plane 2  [   0    ] [   0    ] [   0    ]
//! plane 3  [   0    ] [   0    ] [   0    ]
//! ```
//!
//! # Thread Safety
//!
//! Cells are atomics, so every accessor takes `&self`. Multi-cell operations
//! (`insert`, `delete`, ...) are only atomic with respect to each other when
//! the caller holds the bucket's lock from
//! [`BucketLocker`](crate::sync::BucketLocker). The plane list sits behind a
//! `parking_lot::RwLock` that is write-locked only by [`BucketStore::expand`].
//!
//! # Release
//!
//! Plane buffers are owned by the store and freed exactly once when it drops.
//! There is no way to reach a plane after that, so use-after-release cannot be
//! expressed.

use crate::core::params;
use crate::core::plane::{BytePlane, EntryPlane, IntPlane, PackedPlane, ShortPlane};
use crate::error::{CuckooCraftError, Result};
use crate::sync::CacheLinePadded;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use std::sync::atomic::AtomicU64;

/// Plane lists, one variant per cell layout.
#[derive(Debug)]
enum Planes {
    Byte(Vec<BytePlane>),
    Short(Vec<ShortPlane>),
    Int(Vec<IntPlane>),
    Packed(Vec<PackedPlane>),
}

/// Run `$body` with `$p` bound to the concrete plane slice.
macro_rules! with_planes {
    ($planes:expr, $p:ident => $body:expr) => {
        match $planes {
            Planes::Byte($p) => $body,
            Planes::Short($p) => $body,
            Planes::Int($p) => $body,
            Planes::Packed($p) => $body,
        }
    };
}

fn allocate_planes<P: EntryPlane>(count: usize, bucket_count: u64, bits: u32) -> Result<Vec<P>> {
    let mut planes = Vec::new();
    planes
        .try_reserve_exact(count)
        .map_err(|_| CuckooCraftError::allocation_failed(count * std::mem::size_of::<P>()))?;
    for _ in 0..count {
        planes.push(P::allocate(bucket_count, bits)?);
    }
    Ok(planes)
}

fn append_planes<P: EntryPlane>(planes: &mut Vec<P>, mut new: Vec<P>) -> Result<()> {
    planes
        .try_reserve_exact(new.len())
        .map_err(|_| CuckooCraftError::allocation_failed(new.len() * std::mem::size_of::<P>()))?;
    planes.append(&mut new);
    Ok(())
}

#[inline]
fn scan_contains<P: EntryPlane>(planes: &[P], bucket: u64, value: u32) -> bool {
    planes.iter().any(|p| p.get(bucket) == value)
}

#[inline]
fn scan_count<P: EntryPlane>(planes: &[P], bucket: u64, value: u32) -> usize {
    planes.iter().filter(|p| p.get(bucket) == value).count()
}

/// Outcome of a single-bucket insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Written,
    Duplicate,
    Full,
}

#[inline]
fn scan_insert<P: EntryPlane>(planes: &[P], bucket: u64, value: u32, dedup: bool) -> Placement {
    for plane in planes {
        let current = plane.get(bucket);
        if current == 0 {
            plane.set(bucket, value);
            return Placement::Written;
        }
        if dedup && current == value {
            return Placement::Duplicate;
        }
    }
    Placement::Full
}

#[inline]
fn scan_delete<P: EntryPlane>(planes: &[P], bucket: u64, value: u32, limit: usize) -> usize {
    let mut deleted = 0;
    for plane in planes {
        if deleted >= limit {
            break;
        }
        if plane.get(bucket) == value {
            plane.set(bucket, 0);
            deleted += 1;
        }
    }
    deleted
}

/// Bit-packed storage for fingerprints plus the inserted-item counter.
///
/// # Examples
///
/// ```
/// use cuckoocraft::core::BucketStore;
///
/// let store = BucketStore::new(4, 64, 12, false).unwrap();
/// let bucket = store.bucket_index(0xDEAD_BEEF_0000_0000);
/// assert!(store.insert(bucket, 0xABC));
/// assert!(store.contains(bucket, 0xABC));
/// assert_eq!(store.inserted_count(), 1);
/// assert!(store.delete(bucket, 0xABC));
/// assert_eq!(store.inserted_count(), 0);
/// ```
#[derive(Debug)]
pub struct BucketStore {
    planes: RwLock<Planes>,
    bucket_count: u64,
    fingerprint_bits: u32,
    index_shift: u32,
    plane_bytes: u64,
    counting_enabled: bool,
    inserted: CacheLinePadded<AtomicU64>,
}

impl BucketStore {
    /// Allocate a zeroed store.
    ///
    /// `bucket_count` is rounded up to a power of two and clamped to
    /// `[MIN_BUCKET_COUNT, MAX_BUCKET_COUNT]`.
    ///
    /// # Errors
    ///
    /// - [`CuckooCraftError::InvalidEntriesPerBucket`] if `entries_per_bucket` is not a power of two
    /// - [`CuckooCraftError::InvalidFingerprintBits`] if the width is not in `1..=32`
    /// - [`CuckooCraftError::AllocationFailed`] if a plane cannot be allocated
    pub fn new(
        entries_per_bucket: usize,
        bucket_count: u64,
        fingerprint_bits: u32,
        counting_enabled: bool,
    ) -> Result<Self> {
        params::validate_entries_per_bucket(entries_per_bucket)?;
        params::validate_fingerprint_bits(fingerprint_bits)?;

        let bucket_count = params::round_bucket_count(bucket_count);
        let planes = match fingerprint_bits {
            8 => Planes::Byte(allocate_planes(entries_per_bucket, bucket_count, 8)?),
            16 => Planes::Short(allocate_planes(entries_per_bucket, bucket_count, 16)?),
            32 => Planes::Int(allocate_planes(entries_per_bucket, bucket_count, 32)?),
            bits => Planes::Packed(allocate_planes(entries_per_bucket, bucket_count, bits)?),
        };

        tracing::debug!(
            bucket_count,
            entries_per_bucket,
            fingerprint_bits,
            counting_enabled,
            "allocated bucket store"
        );

        Ok(Self {
            planes: RwLock::new(planes),
            bucket_count,
            fingerprint_bits,
            index_shift: params::index_shift(bucket_count),
            plane_bytes: params::plane_bytes(bucket_count, fingerprint_bits),
            counting_enabled,
            inserted: CacheLinePadded::new(AtomicU64::new(0)),
        })
    }

    /// Map a 64-bit hash to a bucket using its top bits.
    ///
    /// High bits are used instead of a low-bit mask because several cheap
    /// hashes (including the fixed-multiplier fingerprint hash) mix poorly
    /// into their low bits.
    #[inline]
    #[must_use]
    pub fn bucket_index(&self, hash: u64) -> u64 {
        hash >> self.index_shift
    }

    /// Number of buckets (a power of two).
    #[must_use]
    pub fn bucket_count(&self) -> u64 {
        self.bucket_count
    }

    /// Fingerprint width in bits.
    #[must_use]
    pub fn fingerprint_bits(&self) -> u32 {
        self.fingerprint_bits
    }

    /// Whether repeated inserts of one fingerprint occupy separate slots.
    #[must_use]
    pub fn counting_enabled(&self) -> bool {
        self.counting_enabled
    }

    /// Current entries per bucket (number of planes).
    #[must_use]
    pub fn entries_per_bucket(&self) -> usize {
        with_planes!(&*self.planes.read(), p => p.len())
    }

    /// Total fingerprint slots: `bucket_count * entries_per_bucket`.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.bucket_count * self.entries_per_bucket() as u64
    }

    /// Bytes of bucket memory currently allocated.
    #[must_use]
    pub fn memory_usage_bytes(&self) -> u64 {
        self.plane_bytes * self.entries_per_bucket() as u64
    }

    /// Bytes in one plane.
    #[must_use]
    pub fn plane_bytes(&self) -> u64 {
        self.plane_bytes
    }

    /// Fingerprints currently accounted for (including a kicked one).
    #[inline]
    #[must_use]
    pub fn inserted_count(&self) -> u64 {
        self.inserted.load()
    }

    /// Count one more stored fingerprint.
    #[inline]
    pub fn increment_inserted_count(&self) {
        self.inserted.increment();
    }

    /// Count one fewer stored fingerprint.
    #[inline]
    pub fn decrement_inserted_count(&self) {
        self.inserted.saturating_sub(1);
    }

    pub(crate) fn set_inserted_count(&self, count: u64) {
        self.inserted.store(count);
    }

    /// Read a single cell.
    #[inline]
    #[must_use]
    pub fn get(&self, entry: usize, bucket: u64) -> u32 {
        with_planes!(&*self.planes.read(), p => p[entry].get(bucket))
    }

    /// Write a single cell without touching the counter.
    #[inline]
    pub fn set(&self, entry: usize, bucket: u64, value: u32) {
        with_planes!(&*self.planes.read(), p => p[entry].set(bucket, value))
    }

    /// Write a single cell and return what it held before.
    #[inline]
    pub fn swap(&self, entry: usize, bucket: u64, value: u32) -> u32 {
        with_planes!(&*self.planes.read(), p => p[entry].swap(bucket, value))
    }

    /// Whether any entry of `bucket` holds `value`.
    #[inline]
    #[must_use]
    pub fn contains(&self, bucket: u64, value: u32) -> bool {
        with_planes!(&*self.planes.read(), p => scan_contains(p, bucket, value))
    }

    /// Number of entries of `bucket` holding `value`.
    #[inline]
    #[must_use]
    pub fn count(&self, bucket: u64, value: u32) -> usize {
        with_planes!(&*self.planes.read(), p => scan_count(p, bucket, value))
    }

    /// Store `value` in the first empty entry of `bucket`.
    ///
    /// With counting disabled, finding `value` already present before an empty
    /// slot reports success without writing, so repeated inserts of one item
    /// do not eat several slots.
    ///
    /// Returns false if the bucket is full.
    pub fn insert(&self, bucket: u64, value: u32) -> bool {
        let dedup = !self.counting_enabled;
        let placement =
            with_planes!(&*self.planes.read(), p => scan_insert(p, bucket, value, dedup));
        match placement {
            Placement::Written => {
                self.inserted.increment();
                true
            }
            Placement::Duplicate => true,
            Placement::Full => false,
        }
    }

    /// Clear one occurrence of `value` from `bucket`.
    pub fn delete(&self, bucket: u64, value: u32) -> bool {
        self.delete_count(bucket, value, 1) == 1
    }

    /// Clear up to `limit` occurrences of `value` from `bucket`.
    ///
    /// Returns the number actually cleared.
    pub fn delete_count(&self, bucket: u64, value: u32, limit: usize) -> usize {
        if limit == 0 {
            return 0;
        }
        let deleted =
            with_planes!(&*self.planes.read(), p => scan_delete(p, bucket, value, limit));
        if deleted > 0 {
            self.inserted.saturating_sub(deleted as u64);
        }
        deleted
    }

    /// Double entries per bucket by appending zeroed planes.
    ///
    /// The new planes are allocated before the plane list is write-locked, so
    /// an allocation failure leaves the store exactly as it was. Concurrent
    /// readers keep running until the final append.
    ///
    /// # Errors
    ///
    /// - [`CuckooCraftError::ExpansionLimitReached`] if doubling would exceed `max_entries_per_bucket`
    /// - [`CuckooCraftError::AllocationFailed`] if the new planes cannot be allocated
    pub fn expand(&self, max_entries_per_bucket: usize) -> Result<()> {
        let planes = self.planes.upgradable_read();
        let entries = with_planes!(&*planes, p => p.len());
        if entries.saturating_mul(2) > max_entries_per_bucket {
            return Err(CuckooCraftError::expansion_limit_reached(
                entries,
                max_entries_per_bucket,
            ));
        }

        let (buckets, bits) = (self.bucket_count, self.fingerprint_bits);
        let fresh = match &*planes {
            Planes::Byte(_) => Planes::Byte(allocate_planes(entries, buckets, bits)?),
            Planes::Short(_) => Planes::Short(allocate_planes(entries, buckets, bits)?),
            Planes::Int(_) => Planes::Int(allocate_planes(entries, buckets, bits)?),
            Planes::Packed(_) => Planes::Packed(allocate_planes(entries, buckets, bits)?),
        };

        let mut planes = RwLockUpgradableReadGuard::upgrade(planes);
        match (&mut *planes, fresh) {
            (Planes::Byte(p), Planes::Byte(new)) => append_planes(p, new)?,
            (Planes::Short(p), Planes::Short(new)) => append_planes(p, new)?,
            (Planes::Int(p), Planes::Int(new)) => append_planes(p, new)?,
            (Planes::Packed(p), Planes::Packed(new)) => append_planes(p, new)?,
            _ => unreachable!("plane layout is fixed at construction"),
        }

        tracing::debug!(
            entries_per_bucket = entries * 2,
            bucket_count = self.bucket_count,
            "expanded bucket store"
        );
        Ok(())
    }

    /// Number of nonzero cells across all planes. Linear in capacity.
    #[must_use]
    pub fn occupied_count(&self) -> u64 {
        let buckets = self.bucket_count;
        with_planes!(&*self.planes.read(), p => {
            p.iter()
                .map(|plane| (0..buckets).filter(|&b| plane.get(b) != 0).count() as u64)
                .sum()
        })
    }

    /// Dump every plane as a little-endian byte stream, plane 0 first.
    #[must_use]
    pub fn dump_planes(&self) -> Vec<Vec<u8>> {
        with_planes!(&*self.planes.read(), p => p.iter().map(EntryPlane::to_bytes).collect())
    }

    /// Overwrite every plane from dumps produced by [`BucketStore::dump_planes`].
    ///
    /// # Errors
    ///
    /// Returns [`CuckooCraftError::SnapshotMismatch`] if the number of planes
    /// or any plane length differs from this store.
    pub fn load_planes(&self, dumps: &[Vec<u8>]) -> Result<()> {
        let planes = self.planes.read();
        with_planes!(&*planes, p => {
            if p.len() != dumps.len() {
                return Err(CuckooCraftError::snapshot_mismatch(format!(
                    "{} planes supplied for {} entries per bucket",
                    dumps.len(),
                    p.len()
                )));
            }
            if let Some(bad) = dumps.iter().find(|d| d.len() as u64 != self.plane_bytes) {
                return Err(CuckooCraftError::snapshot_mismatch(format!(
                    "plane of {} bytes supplied, expected {}",
                    bad.len(),
                    self.plane_bytes
                )));
            }
            for (plane, bytes) in p.iter().zip(dumps) {
                plane.load_bytes(bytes)?;
            }
        });
        Ok(())
    }
}
