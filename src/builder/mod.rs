//! Builder for cuckoo filter construction.
//!
//! Setters only record values. Everything is validated together in
//! [`CuckooFilterBuilder::build`], so an invalid setting is reported as an
//! error rather than silently clamped.
//!
//! # Examples
//!
//! ## Defaults
//!
//! ```
//! use cuckoocraft::CuckooFilterBuilder;
//!
//! let filter = CuckooFilterBuilder::new(10_000).build().unwrap();
//! assert_eq!(filter.entries_per_bucket(), 4);
//! assert_eq!(filter.fingerprint_bits(), 8);
//! ```
//!
//! ## Tuned
//!
//! ```
//! use cuckoocraft::{CuckooFilterBuilder, SwapSafety};
//! use cuckoocraft::hash::{MixedFingerprintHasher, StdHasher};
//!
//! let filter = CuckooFilterBuilder::new(1 << 20)
//!     .with_fingerprint_bits(12)
//!     .with_entries_per_bucket(8)
//!     .with_counting(true)
//!     .with_swap_safety(SwapSafety::Smart)
//!     .with_smart_load_factor(0.85)
//!     .with_bucket_hasher(StdHasher::with_seed(3))
//!     .with_fingerprint_hasher(MixedFingerprintHasher::new(StdHasher::new()))
//!     .build()
//!     .unwrap();
//! assert_eq!(filter.capacity(), 1 << 20);
//! ```
//!
//! ## Error Handling
//!
//! ```
//! use cuckoocraft::{CuckooCraftError, CuckooFilterBuilder};
//!
//! let result = CuckooFilterBuilder::new(1_000).with_entries_per_bucket(3).build();
//! assert!(matches!(result, Err(CuckooCraftError::InvalidEntriesPerBucket { entries: 3 })));
//! ```

use crate::core::params;
use crate::core::{CuckooFilter, FilterConfig};
use crate::encode::{StringEncoder, Utf8Encoder};
use crate::error::{CuckooCraftError, Result};
use crate::hash::{BucketHasher, FingerprintHasher, FixedHasher, XxHasher};
use crate::sync::SwapSafety;
use crate::util::{RandomSource, SplitMixRandom};
use std::fmt;

/// Fluent configuration for [`CuckooFilter`].
///
/// The default bucket hasher is [`XxHasher`] seeded with the random seed, so
/// [`with_random_seed`](Self::with_random_seed) reseeds it too unless a bucket
/// hasher was supplied explicitly.
pub struct CuckooFilterBuilder<B = XxHasher, F = FixedHasher> {
    capacity: u64,
    config: FilterConfig,
    bucket_hasher: B,
    reseed_bucket_hasher: Option<fn(u64) -> B>,
    fingerprint_hasher: F,
    encoder: Box<dyn StringEncoder>,
    random: Option<Box<dyn RandomSource>>,
}

impl CuckooFilterBuilder<XxHasher, FixedHasher> {
    /// Start configuring a filter for `capacity` items.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            config: FilterConfig::default(),
            bucket_hasher: XxHasher::new(),
            reseed_bucket_hasher: Some(XxHasher::with_seed),
            fingerprint_hasher: FixedHasher,
            encoder: Box::new(Utf8Encoder),
            random: None,
        }
    }
}

impl<B, F> CuckooFilterBuilder<B, F> {
    /// Entries per bucket (power of two). Default 4.
    #[must_use]
    pub fn with_entries_per_bucket(mut self, entries: usize) -> Self {
        self.config.entries_per_bucket = entries;
        self
    }

    /// Fingerprint width in bits, `1..=32`. Default 8.
    #[must_use]
    pub fn with_fingerprint_bits(mut self, bits: u32) -> Self {
        self.config.fingerprint_bits = bits;
        self
    }

    /// Displacement budget per insert. Default 400.
    #[must_use]
    pub fn with_max_kicks(mut self, max_kicks: u32) -> Self {
        self.config.max_kicks = max_kicks;
        self
    }

    /// Lock shard count (power of two), capped to the bucket count. Default 64.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Let repeated inserts of one item occupy separate slots. Default off.
    #[must_use]
    pub fn with_counting(mut self, enabled: bool) -> Self {
        self.config.counting_enabled = enabled;
        self
    }

    /// Displacement mode. Default [`SwapSafety::Reliable`].
    #[must_use]
    pub fn with_swap_safety(mut self, safety: SwapSafety) -> Self {
        self.config.swap_safety = safety;
        self
    }

    /// Load factor above which `Smart` displacement turns reliable. Default 0.90.
    #[must_use]
    pub fn with_smart_load_factor(mut self, threshold: f64) -> Self {
        self.config.smart_load_factor = threshold;
        self
    }

    /// Seed for entry selection and the default bucket hasher.
    #[must_use]
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Grow instead of rejecting inserts when full. Default off.
    #[must_use]
    pub fn with_auto_expand(mut self, enabled: bool) -> Self {
        self.config.auto_expand = enabled;
        self
    }

    /// Ceiling for entries per bucket reached by expansion. Default 64.
    #[must_use]
    pub fn with_max_entries_per_bucket(mut self, max: usize) -> Self {
        self.config.max_entries_per_bucket = max;
        self
    }

    /// Encoder for the `*_str` operations. Default [`Utf8Encoder`].
    #[must_use]
    pub fn with_string_encoder(mut self, encoder: impl StringEncoder + 'static) -> Self {
        self.encoder = Box::new(encoder);
        self
    }

    /// Replace the seeded entry selector entirely.
    #[must_use]
    pub fn with_random_source(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Some(Box::new(random));
        self
    }

    /// Hash for item bytes.
    #[must_use]
    pub fn with_bucket_hasher<B2>(self, hasher: B2) -> CuckooFilterBuilder<B2, F> {
        CuckooFilterBuilder {
            capacity: self.capacity,
            config: self.config,
            bucket_hasher: hasher,
            reseed_bucket_hasher: None,
            fingerprint_hasher: self.fingerprint_hasher,
            encoder: self.encoder,
            random: self.random,
        }
    }

    /// Hash for fingerprints.
    #[must_use]
    pub fn with_fingerprint_hasher<F2>(self, hasher: F2) -> CuckooFilterBuilder<B, F2> {
        CuckooFilterBuilder {
            capacity: self.capacity,
            config: self.config,
            bucket_hasher: self.bucket_hasher,
            reseed_bucket_hasher: self.reseed_bucket_hasher,
            fingerprint_hasher: hasher,
            encoder: self.encoder,
            random: self.random,
        }
    }
}

impl<B: BucketHasher, F: FingerprintHasher> CuckooFilterBuilder<B, F> {
    fn resolve_config(&self) -> Result<FilterConfig> {
        if self.capacity == 0 {
            return Err(CuckooCraftError::invalid_capacity(self.capacity));
        }
        let mut config = self.config.clone();
        config.bucket_count = params::bucket_count_for(self.capacity, config.entries_per_bucket)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the settings and allocate the filter.
    ///
    /// # Errors
    ///
    /// - [`CuckooCraftError::InvalidCapacity`] for a zero capacity
    /// - [`CuckooCraftError::InvalidEntriesPerBucket`] / [`CuckooCraftError::InvalidConcurrency`]
    ///   for values that are not powers of two
    /// - [`CuckooCraftError::InvalidFingerprintBits`] outside `1..=32`
    /// - [`CuckooCraftError::InvalidLoadFactorThreshold`] outside `[0, 1]`
    /// - [`CuckooCraftError::InvalidParameters`] if entries per bucket exceeds its maximum
    /// - [`CuckooCraftError::AllocationFailed`] if bucket memory cannot be allocated
    pub fn build(self) -> Result<CuckooFilter<B, F>> {
        let config = self.resolve_config()?;
        let bucket_hasher = match self.reseed_bucket_hasher {
            Some(reseed) => reseed(config.random_seed),
            None => self.bucket_hasher,
        };
        let random = self
            .random
            .unwrap_or_else(|| Box::new(SplitMixRandom::new(config.random_seed)));

        CuckooFilter::from_parts(
            &config,
            bucket_hasher,
            self.fingerprint_hasher,
            self.encoder,
            random,
        )
    }

    /// Build and also report the derived geometry.
    ///
    /// # Errors
    ///
    /// See [`CuckooFilterBuilder::build`].
    pub fn build_with_metadata(self) -> Result<(CuckooFilter<B, F>, FilterMetadata)> {
        let requested = self.capacity;
        let filter = self.build()?;
        let metadata = FilterMetadata {
            requested_capacity: requested,
            capacity: filter.capacity(),
            bucket_count: filter.bucket_count(),
            entries_per_bucket: filter.entries_per_bucket(),
            fingerprint_bits: filter.fingerprint_bits(),
            memory_bytes: filter.memory_usage_bytes(),
            full_load_fp_rate: params::expected_fp_rate(
                filter.entries_per_bucket(),
                filter.fingerprint_bits(),
                1.0,
            ),
        };
        Ok((filter, metadata))
    }
}

impl<B: fmt::Debug, F: fmt::Debug> fmt::Debug for CuckooFilterBuilder<B, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CuckooFilterBuilder")
            .field("capacity", &self.capacity)
            .field("config", &self.config)
            .field("bucket_hasher", &self.bucket_hasher)
            .field("fingerprint_hasher", &self.fingerprint_hasher)
            .field("custom_random_source", &self.random.is_some())
            .finish_non_exhaustive()
    }
}

/// Geometry chosen by [`CuckooFilterBuilder::build_with_metadata`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterMetadata {
    /// Capacity passed to the builder.
    pub requested_capacity: u64,
    /// Actual slots after power-of-two rounding.
    pub capacity: u64,
    /// Buckets per plane.
    pub bucket_count: u64,
    /// Entries per bucket.
    pub entries_per_bucket: usize,
    /// Fingerprint width.
    pub fingerprint_bits: u32,
    /// Bucket memory in bytes.
    pub memory_bytes: u64,
    /// Expected false positive rate once every slot is used.
    pub full_load_fp_rate: f64,
}

impl FilterMetadata {
    /// Bits of bucket memory per slot.
    #[must_use]
    pub fn bits_per_item(&self) -> f64 {
        self.memory_bytes as f64 * 8.0 / self.capacity as f64
    }

    /// Bucket memory in KiB.
    #[must_use]
    pub fn memory_kb(&self) -> f64 {
        self.memory_bytes as f64 / 1024.0
    }
}
