//! Concurrent cuckoo filter.
//!
//! # Algorithm
//!
//! An item's 64-bit hash yields two things:
//!
//! ```text
//! hash:        [ top bits -> bucket1 ........ low bits -> fingerprint ]
//! bucket2    = bucket1 ^ index(fingerprint_hash(fingerprint))
//! ```
//!
//! The fingerprint is the first nonzero `fingerprint_bits`-wide chunk of the
//! hash, scanning from the low end, or 1 if every chunk is zero. Zero marks an
//! empty cell and is never stored.
//!
//! `insert` tries bucket1, then bucket2, each under its shard lock, then
//! hands the fingerprint to the configured [`Swapper`](crate::sync::Swapper),
//! which evicts entries along a bounded chain. An item that ends a chain with
//! nowhere to go is parked in the single [`KickedSlot`], and lookups check it
//! alongside both buckets.
//!
//! # Concurrency
//!
//! Every operation takes `&self`; share the filter with `Arc`. Lookups do not
//! lock. During a displacement chain an evicted fingerprint is briefly
//! invisible to lookups; this never affects an item whose `insert` has
//! already returned under [`SwapSafety::Reliable`].
//!
//! # Examples
//!
//! ```
//! use cuckoocraft::CuckooFilterBuilder;
//!
//! let filter = CuckooFilterBuilder::new(1_000)
//!     .with_counting(true)
//!     .build()
//!     .unwrap();
//!
//! assert!(filter.insert_str("apple"));
//! assert!(filter.insert_str("apple"));
//! assert!(filter.contains_str("apple"));
//! assert_eq!(filter.count_str("apple"), 2);
//! assert!(filter.delete_str("apple"));
//! assert_eq!(filter.count_str("apple"), 1);
//! ```

use crate::core::params;
use crate::core::BucketStore;
use crate::encode::{StringEncoder, Utf8Encoder};
use crate::error::Result;
use crate::hash::{BucketHasher, FingerprintHasher, FixedHasher, XxHasher};
use crate::sync::{BucketLocker, KickContext, KickedSlot, SwapSafety, Swapper, SwapperKind};
use crate::util::{RandomSource, SplitMixRandom};
use std::fmt;
use std::io::{Read, Write};

/// Scalar configuration of a filter.
///
/// Everything needed, together with hashers, to allocate an equivalent empty
/// filter. Obtained from [`CuckooFilter::config`] or assembled by
/// [`CuckooFilterBuilder`](crate::CuckooFilterBuilder).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterConfig {
    /// Buckets per plane. Rounded to a power of two on construction.
    pub bucket_count: u64,
    /// Entries per bucket (power of two).
    pub entries_per_bucket: usize,
    /// Fingerprint width, `1..=32`.
    pub fingerprint_bits: u32,
    /// Whether repeated inserts of one item take separate slots.
    pub counting_enabled: bool,
    /// Displacement budget per insert.
    pub max_kicks: u32,
    /// Requested lock shard count (power of two).
    pub concurrency: usize,
    /// Displacement mode.
    pub swap_safety: SwapSafety,
    /// Load factor at which `Smart` displacement turns reliable.
    pub smart_load_factor: f64,
    /// Seed for entry selection.
    pub random_seed: u64,
    /// Double entries per bucket instead of failing an insert.
    pub auto_expand: bool,
    /// Ceiling for entries per bucket.
    pub max_entries_per_bucket: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            bucket_count: params::MIN_BUCKET_COUNT,
            entries_per_bucket: params::DEFAULT_ENTRIES_PER_BUCKET,
            fingerprint_bits: params::DEFAULT_FINGERPRINT_BITS,
            counting_enabled: false,
            max_kicks: params::DEFAULT_MAX_KICKS,
            concurrency: params::DEFAULT_CONCURRENCY,
            swap_safety: SwapSafety::default(),
            smart_load_factor: params::DEFAULT_SMART_LOAD_FACTOR,
            random_seed: params::DEFAULT_RANDOM_SEED,
            auto_expand: false,
            max_entries_per_bucket: params::DEFAULT_MAX_ENTRIES_PER_BUCKET,
        }
    }
}

impl FilterConfig {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns the matching `Invalid*` variant of
    /// [`CuckooCraftError`](crate::CuckooCraftError) for the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.bucket_count == 0 {
            return Err(crate::CuckooCraftError::invalid_capacity(0));
        }
        params::validate_entries_per_bucket(self.entries_per_bucket)?;
        params::validate_entries_per_bucket(self.max_entries_per_bucket)?;
        if self.entries_per_bucket > self.max_entries_per_bucket {
            return Err(crate::CuckooCraftError::invalid_parameters(format!(
                "entries per bucket {} exceeds maximum {}",
                self.entries_per_bucket, self.max_entries_per_bucket
            )));
        }
        params::validate_fingerprint_bits(self.fingerprint_bits)?;
        params::validate_concurrency(self.concurrency)?;
        params::validate_load_factor_threshold(self.smart_load_factor)?;
        Ok(())
    }
}

/// Concurrent cuckoo filter with bit-packed buckets.
///
/// `B` hashes item bytes, `F` hashes fingerprints. Build one with
/// [`CuckooFilterBuilder`](crate::CuckooFilterBuilder).
///
/// Memory is released when the filter is dropped or [`closed`](Self::close);
/// both consume it, so no operation can run afterwards.
pub struct CuckooFilter<B = XxHasher, F = FixedHasher> {
    store: BucketStore,
    locker: BucketLocker,
    kicked: KickedSlot,
    swapper: SwapperKind,
    bucket_hasher: B,
    fingerprint_hasher: F,
    encoder: Box<dyn StringEncoder>,
    random: Box<dyn RandomSource>,
    fingerprint_mask: u32,
    fingerprints_per_hash: u32,
    max_kicks: u32,
    concurrency: usize,
    smart_load_factor: f64,
    random_seed: u64,
    auto_expand: bool,
    max_entries_per_bucket: usize,
}

impl CuckooFilter<XxHasher, FixedHasher> {
    /// Filter for `capacity` items with every other setting at its default.
    ///
    /// # Errors
    ///
    /// Returns [`CuckooCraftError::InvalidCapacity`](crate::CuckooCraftError::InvalidCapacity)
    /// for a zero capacity.
    pub fn new(capacity: u64) -> Result<Self> {
        crate::CuckooFilterBuilder::new(capacity).build()
    }
}

impl<B: BucketHasher, F: FingerprintHasher> CuckooFilter<B, F> {
    /// Assemble a filter from validated parts.
    ///
    /// # Errors
    ///
    /// Returns a configuration error from [`FilterConfig::validate`] or
    /// [`CuckooCraftError::AllocationFailed`](crate::CuckooCraftError::AllocationFailed).
    pub fn from_parts(
        config: &FilterConfig,
        bucket_hasher: B,
        fingerprint_hasher: F,
        encoder: Box<dyn StringEncoder>,
        random: Box<dyn RandomSource>,
    ) -> Result<Self> {
        config.validate()?;

        let store = BucketStore::new(
            config.entries_per_bucket,
            config.bucket_count,
            config.fingerprint_bits,
            config.counting_enabled,
        )?;
        let locker = BucketLocker::new(config.concurrency, store.bucket_count())?;
        let bits = config.fingerprint_bits;

        tracing::debug!(
            capacity = store.capacity(),
            bucket_count = store.bucket_count(),
            entries_per_bucket = config.entries_per_bucket,
            fingerprint_bits = bits,
            swap_safety = ?config.swap_safety,
            bucket_hasher = bucket_hasher.name(),
            fingerprint_hasher = fingerprint_hasher.name(),
            "created cuckoo filter"
        );

        Ok(Self {
            store,
            locker,
            kicked: KickedSlot::new(),
            swapper: SwapperKind::new(config.swap_safety, config.smart_load_factor),
            bucket_hasher,
            fingerprint_hasher,
            encoder,
            random,
            fingerprint_mask: u32::MAX >> (32 - bits),
            fingerprints_per_hash: 64 / bits,
            max_kicks: config.max_kicks,
            concurrency: config.concurrency,
            smart_load_factor: config.smart_load_factor,
            random_seed: config.random_seed,
            auto_expand: config.auto_expand,
            max_entries_per_bucket: config.max_entries_per_bucket,
        })
    }

    /// Filter with default encoder and a seeded random source.
    ///
    /// # Errors
    ///
    /// See [`CuckooFilter::from_parts`].
    pub fn with_hashers(config: &FilterConfig, bucket_hasher: B, fingerprint_hasher: F) -> Result<Self> {
        Self::from_parts(
            config,
            bucket_hasher,
            fingerprint_hasher,
            Box::new(Utf8Encoder),
            Box::new(SplitMixRandom::new(config.random_seed)),
        )
    }

    // ---- fingerprint and bucket derivation ----

    /// Fingerprint of a 64-bit item hash. Never 0.
    #[inline]
    #[must_use]
    pub fn fingerprint(&self, hash: u64) -> u32 {
        let bits = self.store.fingerprint_bits();
        let mut rest = hash;
        for _ in 0..self.fingerprints_per_hash {
            let fp = (rest as u32) & self.fingerprint_mask;
            if fp != 0 {
                return fp;
            }
            rest >>= bits;
        }
        1
    }

    /// `(fingerprint, bucket1, bucket2)` for a 64-bit item hash.
    #[inline]
    #[must_use]
    pub fn candidates(&self, hash: u64) -> (u32, u64, u64) {
        let fingerprint = self.fingerprint(hash);
        let bucket1 = self.store.bucket_index(hash);
        (fingerprint, bucket1, self.alternate_bucket(bucket1, fingerprint))
    }

    #[inline]
    fn alternate_bucket(&self, bucket: u64, fingerprint: u32) -> u64 {
        bucket ^ self
            .store
            .bucket_index(self.fingerprint_hasher.hash_fingerprint(fingerprint))
    }

    fn kick_context(&self) -> KickContext<'_, F> {
        KickContext {
            store: &self.store,
            locker: &self.locker,
            kicked: &self.kicked,
            fingerprint_hasher: &self.fingerprint_hasher,
            random: self.random.as_ref(),
            max_kicks: self.max_kicks,
        }
    }

    // ---- insert ----

    /// Insert raw bytes.
    ///
    /// Returns false only when the filter is full: both candidate buckets and
    /// the kick budget are exhausted, the kicked slot is taken, and expansion
    /// (if enabled) has hit its ceiling.
    ///
    /// With auto-expansion, an evictee left homeless by the kick loop is moved
    /// into a grown store before this returns; it stays parked only at the cap.
    pub fn insert(&self, data: &[u8]) -> bool {
        self.insert_hash(self.bucket_hasher.hash_bytes(data))
    }

    /// Insert a string through the configured encoder.
    pub fn insert_str(&self, value: &str) -> bool {
        self.insert(&self.encoder.encode(value))
    }

    /// Insert a precomputed 64-bit item hash.
    pub fn insert_hash(&self, hash: u64) -> bool {
        let fingerprint = self.fingerprint(hash);
        let bucket1 = self.store.bucket_index(hash);

        #[cfg(feature = "trace")]
        tracing::trace!(fingerprint, bucket1, "insert");

        if self.insert_fingerprint(fingerprint, bucket1) {
            if self.auto_expand && !self.kicked.is_empty() {
                self.expand_for_kicked();
            }
            return true;
        }
        if self.auto_expand {
            return self.insert_expanding(fingerprint, bucket1);
        }

        tracing::warn!(
            inserted = self.store.inserted_count(),
            capacity = self.store.capacity(),
            "cuckoo filter full, insert rejected"
        );
        false
    }

    fn insert_fingerprint(&self, fingerprint: u32, bucket1: u64) -> bool {
        {
            let _guard = self.locker.lock(bucket1);
            if self.store.insert(bucket1, fingerprint) {
                return true;
            }
        }

        let bucket2 = self.alternate_bucket(bucket1, fingerprint);
        {
            let _guard = self.locker.lock(bucket2);
            if self.store.insert(bucket2, fingerprint) {
                return true;
            }
        }

        self.swapper.swap(&self.kick_context(), fingerprint, bucket2)
    }

    fn insert_expanding(&self, fingerprint: u32, bucket1: u64) -> bool {
        loop {
            let observed = self.store.entries_per_bucket();
            if let Err(err) = self.grow(observed) {
                tracing::warn!(error = %err, "cuckoo filter full, auto-expansion refused");
                return false;
            }
            self.reinsert_kicked();
            if self.insert_fingerprint(fingerprint, bucket1) {
                self.expand_for_kicked();
                return true;
            }
        }
    }

    /// Grow until the parked item, if any, fits back into the store.
    ///
    /// The kicked slot lock is held throughout, so a reliable chain in flight
    /// is never mistaken for a parked item. The item stays parked only once
    /// expansion is refused.
    fn expand_for_kicked(&self) {
        let _slot = self.kicked.lock();
        while !self.kicked.is_empty() {
            let observed = self.store.entries_per_bucket();
            if let Err(err) = self.grow(observed) {
                tracing::debug!(error = %err, "kicked fingerprint stays parked");
                return;
            }
            self.reinsert_kicked();
        }
    }

    /// Double entries per bucket unless another thread already did since
    /// `observed` was read.
    fn grow(&self, observed: usize) -> Result<()> {
        let _all = self.locker.lock_all();
        if self.store.entries_per_bucket() != observed {
            return Ok(());
        }
        self.store.expand(self.max_entries_per_bucket)
    }

    /// Move the parked item, if any, back into the store.
    ///
    /// Its candidate buckets are recomputed from the fingerprint and the
    /// bucket recorded with it, so the item is inserted exactly as a fresh
    /// insert of that fingerprint would be.
    fn reinsert_kicked(&self) {
        let _slot = self.kicked.lock();
        let Some((fingerprint, bucket)) = self.kicked.take() else {
            return;
        };
        self.store.decrement_inserted_count();

        #[cfg(feature = "trace")]
        tracing::trace!(fingerprint, bucket, "reinserting kicked fingerprint");

        if !self.insert_fingerprint(fingerprint, bucket) {
            tracing::warn!(fingerprint, bucket, "kicked fingerprint could not be reinserted");
        }
    }

    // ---- lookup ----

    /// Whether `data` may have been inserted.
    #[must_use]
    pub fn contains(&self, data: &[u8]) -> bool {
        self.contains_hash(self.bucket_hasher.hash_bytes(data))
    }

    /// Whether `value` may have been inserted.
    #[must_use]
    pub fn contains_str(&self, value: &str) -> bool {
        self.contains(&self.encoder.encode(value))
    }

    /// Whether an item with this hash may have been inserted.
    #[must_use]
    pub fn contains_hash(&self, hash: u64) -> bool {
        let fingerprint = self.fingerprint(hash);
        let bucket1 = self.store.bucket_index(hash);
        if self.store.contains(bucket1, fingerprint) {
            return true;
        }
        let bucket2 = self.alternate_bucket(bucket1, fingerprint);
        self.store.contains(bucket2, fingerprint) || self.kicked.matches(fingerprint, bucket1, bucket2)
    }

    /// Occurrences of `data`'s fingerprint in its candidate buckets and the
    /// kicked slot. Exact for distinct items with counting enabled.
    #[must_use]
    pub fn count(&self, data: &[u8]) -> usize {
        self.count_hash(self.bucket_hasher.hash_bytes(data))
    }

    /// See [`CuckooFilter::count`].
    #[must_use]
    pub fn count_str(&self, value: &str) -> usize {
        self.count(&self.encoder.encode(value))
    }

    /// See [`CuckooFilter::count`].
    #[must_use]
    pub fn count_hash(&self, hash: u64) -> usize {
        let (fingerprint, bucket1, bucket2) = self.candidates(hash);
        let mut count = self.store.count(bucket1, fingerprint);
        if bucket2 != bucket1 {
            count += self.store.count(bucket2, fingerprint);
        }
        if self.kicked.matches(fingerprint, bucket1, bucket2) {
            count += 1;
        }
        count
    }

    // ---- delete ----

    /// Remove one occurrence of `data`. Returns whether anything was removed.
    ///
    /// Deleting an item that was never inserted may remove a colliding
    /// item's fingerprint instead.
    pub fn delete(&self, data: &[u8]) -> bool {
        self.delete_hash(self.bucket_hasher.hash_bytes(data))
    }

    /// See [`CuckooFilter::delete`].
    pub fn delete_str(&self, value: &str) -> bool {
        self.delete(&self.encoder.encode(value))
    }

    /// See [`CuckooFilter::delete`].
    pub fn delete_hash(&self, hash: u64) -> bool {
        self.delete_count_hash(hash, 1) == 1
    }

    /// Remove up to `count` occurrences of `data`. Returns how many were removed.
    pub fn delete_count(&self, data: &[u8], count: usize) -> usize {
        self.delete_count_hash(self.bucket_hasher.hash_bytes(data), count)
    }

    /// See [`CuckooFilter::delete_count`].
    pub fn delete_count_str(&self, value: &str, count: usize) -> usize {
        self.delete_count(&self.encoder.encode(value), count)
    }

    /// See [`CuckooFilter::delete_count`].
    pub fn delete_count_hash(&self, hash: u64, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        let fingerprint = self.fingerprint(hash);
        let bucket1 = self.store.bucket_index(hash);

        let mut deleted = {
            let _guard = self.locker.lock(bucket1);
            self.store.delete_count(bucket1, fingerprint, count)
        };

        let bucket2 = self.alternate_bucket(bucket1, fingerprint);
        if deleted < count && bucket2 != bucket1 {
            let _guard = self.locker.lock(bucket2);
            deleted += self.store.delete_count(bucket2, fingerprint, count - deleted);
        }

        if deleted < count {
            let _slot = self.kicked.lock();
            if self.kicked.matches(fingerprint, bucket1, bucket2) {
                self.kicked.clear();
                self.store.decrement_inserted_count();
                deleted += 1;
            }
        }

        #[cfg(feature = "trace")]
        tracing::trace!(fingerprint, bucket1, bucket2, deleted, "delete");

        if deleted > 0 {
            self.reinsert_kicked();
        }
        deleted
    }

    // ---- whole-filter operations ----

    /// Double entries per bucket, doubling capacity.
    ///
    /// Holds every bucket lock for the duration. A parked item is moved into
    /// the new room afterwards. On error the filter is unchanged.
    ///
    /// # Errors
    ///
    /// - [`CuckooCraftError::ExpansionLimitReached`](crate::CuckooCraftError::ExpansionLimitReached)
    ///   if doubling would exceed the configured maximum
    /// - [`CuckooCraftError::AllocationFailed`](crate::CuckooCraftError::AllocationFailed)
    pub fn expand(&self) -> Result<()> {
        {
            let _all = self.locker.lock_all();
            if let Err(err) = self.store.expand(self.max_entries_per_bucket) {
                tracing::warn!(error = %err, "expansion refused");
                return Err(err);
            }
        }
        self.reinsert_kicked();
        Ok(())
    }

    /// Write every entry plane to `writer`, plane 0 first, each as
    /// [`plane_bytes`](BucketStore::plane_bytes) little-endian bytes.
    ///
    /// Holds every bucket lock while writing. The kicked slot and counter are
    /// not part of the stream; see `snapshot()` for a complete capture.
    ///
    /// # Errors
    ///
    /// Returns [`CuckooCraftError::Io`](crate::CuckooCraftError::Io) if the writer fails.
    pub fn write_memory<W: Write>(&self, writer: &mut W) -> Result<()> {
        let _all = self.locker.lock_all();
        for plane in self.store.dump_planes() {
            writer.write_all(&plane)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Replace every entry plane with bytes from `reader`, in the format of
    /// [`CuckooFilter::write_memory`].
    ///
    /// The filter must have the same geometry as the one that was written.
    /// All planes are read before any is replaced, so a short stream leaves the
    /// filter unchanged. The kicked slot is cleared and the inserted count is
    /// recomputed from occupied cells.
    ///
    /// # Errors
    ///
    /// Returns [`CuckooCraftError::Io`](crate::CuckooCraftError::Io) if the
    /// stream ends early or fails.
    pub fn read_memory<R: Read>(&self, reader: &mut R) -> Result<()> {
        let _slot = self.kicked.lock();
        let _all = self.locker.lock_all();

        let plane_bytes = usize::try_from(self.store.plane_bytes()).map_err(|_| {
            crate::CuckooCraftError::allocation_failed(usize::MAX)
        })?;
        let mut planes = Vec::with_capacity(self.store.entries_per_bucket());
        for _ in 0..self.store.entries_per_bucket() {
            let mut plane = vec![0u8; plane_bytes];
            reader.read_exact(&mut plane)?;
            planes.push(plane);
        }
        self.store.load_planes(&planes)?;

        self.kicked.clear();
        self.store.set_inserted_count(self.store.occupied_count());

        tracing::debug!(
            inserted = self.store.inserted_count(),
            entries_per_bucket = planes.len(),
            "restored bucket memory"
        );
        Ok(())
    }

    /// Release the filter's memory.
    ///
    /// Equivalent to dropping it; provided so the release point can be
    /// explicit in calling code.
    pub fn close(self) {
        tracing::debug!(
            memory_bytes = self.store.memory_usage_bytes(),
            "closing cuckoo filter"
        );
        drop(self);
    }

    // ---- accessors ----

    /// Total fingerprint slots: buckets times entries per bucket.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.store.capacity()
    }

    /// Number of buckets.
    #[must_use]
    pub fn bucket_count(&self) -> u64 {
        self.store.bucket_count()
    }

    /// Current entries per bucket.
    #[must_use]
    pub fn entries_per_bucket(&self) -> usize {
        self.store.entries_per_bucket()
    }

    /// Fingerprint width.
    #[must_use]
    pub fn fingerprint_bits(&self) -> u32 {
        self.store.fingerprint_bits()
    }

    /// Fingerprints stored, including a parked one.
    #[must_use]
    pub fn inserted_count(&self) -> u64 {
        self.store.inserted_count()
    }

    /// `inserted_count / capacity`.
    #[must_use]
    pub fn load_factor(&self) -> f64 {
        self.store.inserted_count() as f64 / self.store.capacity() as f64
    }

    /// Expected false positive rate at the current load.
    #[must_use]
    pub fn expected_fp_rate(&self) -> f64 {
        params::expected_fp_rate(
            self.entries_per_bucket(),
            self.fingerprint_bits(),
            self.load_factor(),
        )
    }

    /// Bytes of bucket memory allocated.
    #[must_use]
    pub fn memory_usage_bytes(&self) -> u64 {
        self.store.memory_usage_bytes()
    }

    /// Lock shards actually allocated (capped to the bucket count).
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.locker.concurrency()
    }

    /// Configured displacement mode.
    #[must_use]
    pub fn swap_safety(&self) -> SwapSafety {
        self.swapper.safety()
    }

    /// Whether counting is enabled.
    #[must_use]
    pub fn is_counting(&self) -> bool {
        self.store.counting_enabled()
    }

    /// The parked `(fingerprint, bucket)`, if displacement left an item homeless.
    #[must_use]
    pub fn kicked(&self) -> Option<(u32, u64)> {
        self.kicked.get()
    }

    /// The bucket hasher.
    pub fn bucket_hasher(&self) -> &B {
        &self.bucket_hasher
    }

    /// The fingerprint hasher.
    pub fn fingerprint_hasher(&self) -> &F {
        &self.fingerprint_hasher
    }

    /// Current configuration, with entries per bucket reflecting expansions.
    #[must_use]
    pub fn config(&self) -> FilterConfig {
        FilterConfig {
            bucket_count: self.store.bucket_count(),
            entries_per_bucket: self.store.entries_per_bucket(),
            fingerprint_bits: self.store.fingerprint_bits(),
            counting_enabled: self.store.counting_enabled(),
            max_kicks: self.max_kicks,
            concurrency: self.concurrency,
            swap_safety: self.swapper.safety(),
            smart_load_factor: self.smart_load_factor,
            random_seed: self.random_seed,
            auto_expand: self.auto_expand,
            max_entries_per_bucket: self.max_entries_per_bucket,
        }
    }

    #[cfg(feature = "serde")]
    pub(crate) fn store(&self) -> &BucketStore {
        &self.store
    }

    #[cfg(feature = "serde")]
    pub(crate) fn locker(&self) -> &BucketLocker {
        &self.locker
    }

    #[cfg(feature = "serde")]
    pub(crate) fn kicked_slot(&self) -> &KickedSlot {
        &self.kicked
    }
}

impl<B, F> fmt::Debug for CuckooFilter<B, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CuckooFilter")
            .field("store", &self.store)
            .field("concurrency", &self.locker.concurrency())
            .field("kicked", &self.kicked.get())
            .field("swapper", &self.swapper)
            .field("max_kicks", &self.max_kicks)
            .field("auto_expand", &self.auto_expand)
            .finish_non_exhaustive()
    }
}
