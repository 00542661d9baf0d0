//! Filter snapshots.

use crate::core::{CuckooFilter, FilterConfig};
use crate::encode::Utf8Encoder;
use crate::error::{CuckooCraftError, Result};
use crate::hash::{BucketHasher, FingerprintHasher};
use crate::util::SplitMixRandom;
use serde::{Deserialize, Serialize};

/// Snapshot format version.
pub const SNAPSHOT_VERSION: u16 = 1;

/// Serializable capture of a filter's complete state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSnapshot {
    /// Format version for compatibility checking.
    pub version: u16,
    /// Scalar configuration, with entries per bucket after any expansion.
    pub config: FilterConfig,
    /// Inserted-item counter, including a parked item.
    pub inserted_count: u64,
    /// Parked `(fingerprint, bucket)`.
    pub kicked: Option<(u32, u64)>,
    /// Name of the bucket hasher.
    pub bucket_hasher: String,
    /// Seed of the bucket hasher.
    pub bucket_hasher_seed: u64,
    /// Name of the fingerprint hasher.
    pub fingerprint_hasher: String,
    /// One little-endian byte stream per entry plane, plane 0 first.
    pub planes: Vec<Vec<u8>>,
}

/// Reasons a snapshot cannot be restored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// Snapshot written by an incompatible version.
    #[error("unsupported snapshot version {0} (expected {})", SNAPSHOT_VERSION)]
    UnsupportedVersion(u16),

    /// Restoring hasher differs from the one the snapshot was taken with.
    #[error("{role} hasher mismatch: snapshot uses {expected}, got {found}")]
    HasherMismatch {
        /// Which hasher disagreed.
        role: &'static str,
        /// Hasher recorded in the snapshot.
        expected: String,
        /// Hasher supplied for the restore.
        found: String,
    },

    /// Number of planes disagrees with entries per bucket.
    #[error("{found} planes for {expected} entries per bucket")]
    PlaneCount {
        /// Entries per bucket in the configuration.
        expected: usize,
        /// Planes present.
        found: usize,
    },

    /// Bucket count is not the power of two the configuration rounds to.
    #[error("bucket count {0} is not a valid power of two")]
    BucketCount(u64),

    /// Parked item cannot exist in a filter of this geometry.
    #[error("kicked fingerprint {fingerprint:#x} at bucket {bucket} is out of range")]
    InvalidKicked {
        /// Parked fingerprint.
        fingerprint: u32,
        /// Parked bucket.
        bucket: u64,
    },
}

impl From<SnapshotError> for CuckooCraftError {
    fn from(err: SnapshotError) -> Self {
        CuckooCraftError::snapshot_mismatch(err.to_string())
    }
}

impl FilterSnapshot {
    /// Check the snapshot is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns the first [`SnapshotError`] found.
    pub fn check(&self) -> std::result::Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        let buckets = self.config.bucket_count;
        if !buckets.is_power_of_two() || crate::core::params::round_bucket_count(buckets) != buckets {
            return Err(SnapshotError::BucketCount(buckets));
        }
        if self.planes.len() != self.config.entries_per_bucket {
            return Err(SnapshotError::PlaneCount {
                expected: self.config.entries_per_bucket,
                found: self.planes.len(),
            });
        }
        if let Some((fingerprint, bucket)) = self.kicked {
            let bits = self.config.fingerprint_bits.clamp(1, 32);
            let mask = u32::MAX >> (32 - bits);
            if fingerprint == 0 || fingerprint & !mask != 0 || bucket >= buckets {
                return Err(SnapshotError::InvalidKicked { fingerprint, bucket });
            }
        }
        Ok(())
    }
}

impl<B: BucketHasher, F: FingerprintHasher> CuckooFilter<B, F> {
    /// Capture the filter's complete state.
    ///
    /// Holds the kicked slot lock and every bucket lock while copying, so the
    /// snapshot is consistent even under concurrent inserts.
    #[must_use]
    pub fn snapshot(&self) -> FilterSnapshot {
        let _slot = self.kicked_slot().lock();
        let _all = self.locker().lock_all();

        FilterSnapshot {
            version: SNAPSHOT_VERSION,
            config: self.config(),
            inserted_count: self.store().inserted_count(),
            kicked: self.kicked_slot().get(),
            bucket_hasher: self.bucket_hasher().name().to_string(),
            bucket_hasher_seed: self.bucket_hasher().seed(),
            fingerprint_hasher: self.fingerprint_hasher().name().to_string(),
            planes: self.store().dump_planes(),
        }
    }

    /// Rebuild a filter from a snapshot.
    ///
    /// The restored filter uses [`Utf8Encoder`] and a fresh entry selector
    /// seeded from the snapshot.
    ///
    /// # Errors
    ///
    /// - [`CuckooCraftError::SnapshotMismatch`] if the snapshot is inconsistent
    ///   or the hashers differ from the recorded ones
    /// - any configuration error from [`FilterConfig::validate`]
    pub fn from_snapshot(
        snapshot: &FilterSnapshot,
        bucket_hasher: B,
        fingerprint_hasher: F,
    ) -> Result<Self> {
        snapshot.check()?;

        if bucket_hasher.name() != snapshot.bucket_hasher
            || bucket_hasher.seed() != snapshot.bucket_hasher_seed
        {
            return Err(SnapshotError::HasherMismatch {
                role: "bucket",
                expected: format!("{}({:#x})", snapshot.bucket_hasher, snapshot.bucket_hasher_seed),
                found: format!("{}({:#x})", bucket_hasher.name(), bucket_hasher.seed()),
            }
            .into());
        }
        if fingerprint_hasher.name() != snapshot.fingerprint_hasher {
            return Err(SnapshotError::HasherMismatch {
                role: "fingerprint",
                expected: snapshot.fingerprint_hasher.clone(),
                found: fingerprint_hasher.name().to_string(),
            }
            .into());
        }

        let filter = Self::from_parts(
            &snapshot.config,
            bucket_hasher,
            fingerprint_hasher,
            Box::new(Utf8Encoder),
            Box::new(SplitMixRandom::new(snapshot.config.random_seed)),
        )?;

        filter.store().load_planes(&snapshot.planes)?;
        filter.store().set_inserted_count(snapshot.inserted_count);
        if let Some((fingerprint, bucket)) = snapshot.kicked {
            filter.kicked_slot().try_claim(fingerprint, bucket);
        }

        tracing::debug!(
            capacity = filter.capacity(),
            inserted = snapshot.inserted_count,
            kicked = snapshot.kicked.is_some(),
            "restored cuckoo filter from snapshot"
        );
        Ok(filter)
    }
}
