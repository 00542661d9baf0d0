//! Filter parameter defaults, validation and sizing.
//!
//! All configuration checks live here so the builder, the snapshot restore
//! path and the bucket store reject bad input with the same errors.
//!
//! # Sizing
//!
//! The bucket count is derived from the requested capacity:
//!
//! ```text
//! buckets = next_pow2(ceil(capacity / entries_per_bucket))   clamped to [8, 2^60]
//! ```
//!
//! The lower clamp guarantees every plane is a whole number of bytes for any
//! fingerprint width; the upper clamp keeps `bucket * fingerprint_bits` inside
//! 64 bits.
//!
//! ```
//! use cuckoocraft::core::params::bucket_count_for;
//!
//! assert_eq!(bucket_count_for(32, 4).unwrap(), 8);
//! assert_eq!(bucket_count_for(1_000, 4).unwrap(), 256);
//! ```

use crate::error::{CuckooCraftError, Result};

/// Smallest accepted fingerprint width.
pub const MIN_FINGERPRINT_BITS: u32 = 1;

/// Largest accepted fingerprint width.
pub const MAX_FINGERPRINT_BITS: u32 = 32;

/// Fewest buckets a store will allocate.
pub const MIN_BUCKET_COUNT: u64 = 8;

/// Most buckets a store will allocate.
pub const MAX_BUCKET_COUNT: u64 = 1 << 60;

/// Default entries per bucket.
pub const DEFAULT_ENTRIES_PER_BUCKET: usize = 4;

/// Default fingerprint width.
pub const DEFAULT_FINGERPRINT_BITS: u32 = 8;

/// Default displacement budget. Gives roughly 95% load before inserts fail.
pub const DEFAULT_MAX_KICKS: u32 = 400;

/// Default lock shard count.
pub const DEFAULT_CONCURRENCY: usize = 64;

/// Default load factor at which `Smart` swapping turns reliable.
pub const DEFAULT_SMART_LOAD_FACTOR: f64 = 0.90;

/// Default seed for both the bucket hasher and the kick entry selector.
pub const DEFAULT_RANDOM_SEED: u64 = 0x48F7_E28A;

/// Default ceiling for entries per bucket reached through expansion.
pub const DEFAULT_MAX_ENTRIES_PER_BUCKET: usize = 64;

/// Validate a fingerprint width.
///
/// # Errors
///
/// Returns [`CuckooCraftError::InvalidFingerprintBits`] for 0 or anything above 32.
pub fn validate_fingerprint_bits(bits: u32) -> Result<()> {
    if !(MIN_FINGERPRINT_BITS..=MAX_FINGERPRINT_BITS).contains(&bits) {
        return Err(CuckooCraftError::invalid_fingerprint_bits(
            bits,
            MIN_FINGERPRINT_BITS,
            MAX_FINGERPRINT_BITS,
        ));
    }
    Ok(())
}

/// Validate an entries-per-bucket value.
///
/// # Errors
///
/// Returns [`CuckooCraftError::InvalidEntriesPerBucket`] unless `entries` is a power of two.
pub fn validate_entries_per_bucket(entries: usize) -> Result<()> {
    if !entries.is_power_of_two() {
        return Err(CuckooCraftError::invalid_entries_per_bucket(entries));
    }
    Ok(())
}

/// Validate a lock shard count.
///
/// # Errors
///
/// Returns [`CuckooCraftError::InvalidConcurrency`] unless `concurrency` is a power of two.
pub fn validate_concurrency(concurrency: usize) -> Result<()> {
    if !concurrency.is_power_of_two() {
        return Err(CuckooCraftError::invalid_concurrency(concurrency));
    }
    Ok(())
}

/// Validate the smart swap load factor threshold.
///
/// # Errors
///
/// Returns [`CuckooCraftError::InvalidLoadFactorThreshold`] for NaN or values outside `[0, 1]`.
pub fn validate_load_factor_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(CuckooCraftError::invalid_load_factor_threshold(threshold));
    }
    Ok(())
}

/// Compute the power-of-two bucket count for a requested capacity.
///
/// # Errors
///
/// Returns [`CuckooCraftError::InvalidCapacity`] for a zero capacity and
/// [`CuckooCraftError::InvalidEntriesPerBucket`] for a non power-of-two entry count.
pub fn bucket_count_for(capacity: u64, entries_per_bucket: usize) -> Result<u64> {
    if capacity == 0 {
        return Err(CuckooCraftError::invalid_capacity(capacity));
    }
    validate_entries_per_bucket(entries_per_bucket)?;

    let requested = capacity.div_ceil(entries_per_bucket as u64);
    Ok(round_bucket_count(requested))
}

/// Round a raw bucket count up to the next power of two inside the allowed range.
#[must_use]
pub fn round_bucket_count(requested: u64) -> u64 {
    requested
        .checked_next_power_of_two()
        .unwrap_or(MAX_BUCKET_COUNT)
        .clamp(MIN_BUCKET_COUNT, MAX_BUCKET_COUNT)
}

/// Right-shift that maps a 64-bit hash onto `[0, bucket_count)`.
///
/// `bucket_count` must be a power of two in `[MIN_BUCKET_COUNT, MAX_BUCKET_COUNT]`.
#[must_use]
pub const fn index_shift(bucket_count: u64) -> u32 {
    64 - bucket_count.trailing_zeros()
}

/// Bytes one entry plane occupies for the given geometry.
#[must_use]
pub const fn plane_bytes(bucket_count: u64, fingerprint_bits: u32) -> u64 {
    (bucket_count / 8) * fingerprint_bits as u64
}

/// Expected false positive rate at a given load factor.
///
/// A negative lookup probes `2 * entries_per_bucket` slots; each occupied one
/// matches with probability `2^-bits`.
///
/// ```
/// use cuckoocraft::core::params::expected_fp_rate;
///
/// let fpp = expected_fp_rate(4, 8, 1.0);
/// assert!((fpp - 8.0 / 256.0).abs() < 1e-3);
/// ```
#[must_use]
pub fn expected_fp_rate(entries_per_bucket: usize, fingerprint_bits: u32, load_factor: f64) -> f64 {
    let slots = 2.0 * entries_per_bucket as f64 * load_factor.clamp(0.0, 1.0);
    1.0 - (1.0 - 2f64.powi(-(fingerprint_bits as i32))).powf(slots)
}
