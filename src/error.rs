//! Error types for cuckoo filter construction and whole-filter operations.
//!
//! Membership operations never fail: a full filter is reported through the
//! `bool` returned by `insert`, not through this type. Errors are reserved for
//! configuration problems caught at construction, allocation failures, and the
//! raw dump/restore paths.
//!
//! # Error Propagation
//!
//! ```
//! use cuckoocraft::{CuckooFilterBuilder, Result};
//!
//! fn small_filter() -> Result<u64> {
//!     let filter = CuckooFilterBuilder::new(1_000)
//!         .with_fingerprint_bits(12)
//!         .build()?;
//!     Ok(filter.capacity())
//! }
//! # assert!(small_filter().is_ok());
//! ```

#![allow(clippy::module_name_repetitions)]

use std::fmt;

/// Result type alias for fallible cuckoo filter operations.
pub type Result<T> = std::result::Result<T, CuckooCraftError>;

/// Errors that can occur while building, expanding or restoring a filter.
///
/// `Clone + PartialEq` so tests can compare errors directly; I/O failures are
/// therefore carried as messages rather than as `std::io::Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum CuckooCraftError {
    /// Requested capacity was zero.
    InvalidCapacity {
        /// The capacity that was provided.
        capacity: u64,
    },

    /// Fingerprint width outside the supported range.
    ///
    /// Width 0 cannot hold a nonzero fingerprint and widths above 32 do not
    /// fit the 32-bit cell type.
    InvalidFingerprintBits {
        /// The width that was provided.
        bits: u32,
        /// Smallest accepted width.
        min: u32,
        /// Largest accepted width.
        max: u32,
    },

    /// Entries per bucket is zero or not a power of two.
    InvalidEntriesPerBucket {
        /// The entry count that was provided.
        entries: usize,
    },

    /// Lock shard count is zero or not a power of two.
    InvalidConcurrency {
        /// The shard count that was provided.
        concurrency: usize,
    },

    /// Smart swap threshold outside `[0, 1]`.
    InvalidLoadFactorThreshold {
        /// The threshold that was provided.
        threshold: f64,
    },

    /// Any other inconsistent combination of parameters.
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },

    /// A bucket plane could not be allocated.
    AllocationFailed {
        /// Size of the allocation that failed.
        bytes: usize,
    },

    /// `expand()` was called with entries per bucket already at its maximum.
    ExpansionLimitReached {
        /// Current entries per bucket.
        entries_per_bucket: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Reading or writing raw bucket memory failed.
    Io {
        /// Description of the underlying I/O failure.
        message: String,
    },

    /// Restored state does not match the filter it is restored into.
    SnapshotMismatch {
        /// Which part of the snapshot disagreed.
        reason: String,
    },
}

impl fmt::Display for CuckooCraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCapacity { capacity } => {
                write!(f, "Invalid capacity: {}. Capacity must be positive.", capacity)
            }
            Self::InvalidFingerprintBits { bits, min, max } => {
                write!(
                    f,
                    "Invalid fingerprint width: {} bits. Must be in range [{}, {}].",
                    bits, min, max
                )
            }
            Self::InvalidEntriesPerBucket { entries } => {
                write!(
                    f,
                    "Invalid entries per bucket: {}. Must be a power of 2.",
                    entries
                )
            }
            Self::InvalidConcurrency { concurrency } => {
                write!(
                    f,
                    "Invalid concurrency: {}. Must be a power of 2.",
                    concurrency
                )
            }
            Self::InvalidLoadFactorThreshold { threshold } => {
                write!(
                    f,
                    "Smart swap load factor {} is out of bounds. Must be in range [0, 1].",
                    threshold
                )
            }
            Self::InvalidParameters { message } => {
                write!(f, "Invalid cuckoo filter parameters: {}.", message)
            }
            Self::AllocationFailed { bytes } => {
                write!(f, "Failed to allocate {} bytes of bucket memory.", bytes)
            }
            Self::ExpansionLimitReached {
                entries_per_bucket,
                max,
            } => {
                write!(
                    f,
                    "Cannot expand: {} entries per bucket already at maximum of {}.",
                    entries_per_bucket, max
                )
            }
            Self::Io { message } => write!(f, "Bucket memory I/O error: {}.", message),
            Self::SnapshotMismatch { reason } => {
                write!(f, "Snapshot does not match filter: {}.", reason)
            }
        }
    }
}

impl std::error::Error for CuckooCraftError {}

impl From<std::io::Error> for CuckooCraftError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl CuckooCraftError {
    /// Create an `InvalidCapacity` error.
    #[must_use]
    pub fn invalid_capacity(capacity: u64) -> Self {
        Self::InvalidCapacity { capacity }
    }

    /// Create an `InvalidFingerprintBits` error.
    #[must_use]
    pub fn invalid_fingerprint_bits(bits: u32, min: u32, max: u32) -> Self {
        Self::InvalidFingerprintBits { bits, min, max }
    }

    /// Create an `InvalidEntriesPerBucket` error.
    #[must_use]
    pub fn invalid_entries_per_bucket(entries: usize) -> Self {
        Self::InvalidEntriesPerBucket { entries }
    }

    /// Create an `InvalidConcurrency` error.
    #[must_use]
    pub fn invalid_concurrency(concurrency: usize) -> Self {
        Self::InvalidConcurrency { concurrency }
    }

    /// Create an `InvalidLoadFactorThreshold` error.
    #[must_use]
    pub fn invalid_load_factor_threshold(threshold: f64) -> Self {
        Self::InvalidLoadFactorThreshold { threshold }
    }

    /// Create an `InvalidParameters` error with a formatted message.
    ///
    /// # Examples
    /// ```
    /// use cuckoocraft::CuckooCraftError;
    ///
    /// let err = CuckooCraftError::invalid_parameters(
    ///     format!("entries per bucket {} exceeds maximum {}", 128, 64)
    /// );
    /// assert!(err.to_string().contains("128"));
    /// ```
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create an `AllocationFailed` error.
    #[must_use]
    pub fn allocation_failed(bytes: usize) -> Self {
        Self::AllocationFailed { bytes }
    }

    /// Create an `ExpansionLimitReached` error.
    #[must_use]
    pub fn expansion_limit_reached(entries_per_bucket: usize, max: usize) -> Self {
        Self::ExpansionLimitReached {
            entries_per_bucket,
            max,
        }
    }

    /// Create an `Io` error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a `SnapshotMismatch` error.
    #[must_use]
    pub fn snapshot_mismatch(reason: impl Into<String>) -> Self {
        Self::SnapshotMismatch {
            reason: reason.into(),
        }
    }
}
