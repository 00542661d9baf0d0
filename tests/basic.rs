//! Basic end-to-end behaviour through the public API.

use cuckoocraft::{
    CuckooCraftError, CuckooFilter, CuckooFilterBuilder, HexEncoder, SwapSafety, Utf16LeEncoder,
};

#[test]
fn test_basic_insert_and_find() {
    let filter = CuckooFilter::new(100).unwrap();

    filter.insert(b"test-item");

    assert!(
        filter.contains(b"test-item"),
        "Should find the item we just added"
    );
}

#[test]
fn test_counting_lifecycle() {
    let filter = CuckooFilterBuilder::new(32)
        .with_fingerprint_bits(8)
        .with_counting(true)
        .build()
        .unwrap();

    for _ in 0..3 {
        assert!(filter.insert_str("test value"));
    }
    assert_eq!(filter.count_str("test value"), 3);

    assert!(filter.delete_str("test value"));
    assert_eq!(filter.count_str("test value"), 2);

    assert_eq!(filter.delete_count_str("test value", 6), 2);
    assert!(!filter.contains_str("test value"));
    assert_eq!(filter.inserted_count(), 0);

    assert_eq!(filter.capacity(), 32);
    filter.expand().unwrap();
    assert_eq!(filter.capacity(), 64);
}

#[test]
fn test_no_false_negatives() {
    let filter = CuckooFilter::new(1000).unwrap();

    for i in 0u64..800 {
        assert!(filter.insert(&i.to_le_bytes()));
    }
    for i in 0u64..800 {
        assert!(filter.contains(&i.to_le_bytes()), "False negative for {}", i);
    }
}

#[test]
fn test_delete_missing_returns_false() {
    let filter = CuckooFilter::new(100).unwrap();
    assert!(!filter.delete(b"never inserted"));
    assert_eq!(filter.delete_count(b"never inserted", 3), 0);
    assert_eq!(filter.inserted_count(), 0);
}

#[test]
fn test_without_counting_duplicates_share_a_slot() {
    let filter = CuckooFilter::new(100).unwrap();
    assert!(!filter.is_counting());

    for _ in 0..5 {
        assert!(filter.insert_str("repeat"));
    }
    assert_eq!(filter.count_str("repeat"), 1);
    assert_eq!(filter.inserted_count(), 1);

    assert!(filter.delete_str("repeat"));
    assert!(!filter.contains_str("repeat"));
}

#[test]
fn test_str_and_bytes_agree_under_utf8() {
    let filter = CuckooFilter::new(100).unwrap();
    filter.insert_str("héllo");
    assert!(filter.contains("héllo".as_bytes()));
}

#[test]
fn test_custom_encoders() {
    let utf16 = CuckooFilterBuilder::new(100)
        .with_string_encoder(Utf16LeEncoder)
        .build()
        .unwrap();
    utf16.insert_str("A");
    assert!(utf16.contains(&[0x41, 0x00]));

    let hex = CuckooFilterBuilder::new(100)
        .with_string_encoder(HexEncoder)
        .build()
        .unwrap();
    hex.insert_str("deadbeef");
    assert!(hex.contains(&[0xDE, 0xAD, 0xBE, 0xEF]));
    assert!(hex.contains_str("DEADBEEF"));
}

#[test]
fn test_hash_entry_points_match_byte_entry_points() {
    use cuckoocraft::BucketHasher;

    let filter = CuckooFilter::new(100).unwrap();
    let hash = filter.bucket_hasher().hash_bytes(b"item");
    filter.insert_hash(hash);
    assert!(filter.contains(b"item"));
    assert_eq!(filter.count(b"item"), 1);
    assert!(filter.delete_hash(hash));
    assert!(!filter.contains(b"item"));
}

#[test]
fn test_load_factor_and_fp_rate() {
    let filter = CuckooFilterBuilder::new(1024)
        .with_fingerprint_bits(16)
        .build()
        .unwrap();
    assert_eq!(filter.load_factor(), 0.0);

    for i in 0u32..512 {
        filter.insert(&i.to_le_bytes());
    }
    let load = filter.load_factor();
    assert!(load > 0.45 && load <= 0.5, "load factor {}", load);
    assert!(filter.expected_fp_rate() < 0.001);

    let mut false_positives = 0;
    for i in 10_000u32..20_000 {
        if filter.contains(&i.to_le_bytes()) {
            false_positives += 1;
        }
    }
    assert!(false_positives < 20, "{} false positives", false_positives);
}

#[test]
fn test_builder_rejects_bad_parameters() {
    assert!(matches!(
        CuckooFilter::new(0),
        Err(CuckooCraftError::InvalidCapacity { .. })
    ));
    assert!(matches!(
        CuckooFilterBuilder::new(100).with_fingerprint_bits(33).build(),
        Err(CuckooCraftError::InvalidFingerprintBits { .. })
    ));
    assert!(matches!(
        CuckooFilterBuilder::new(100).with_concurrency(3).build(),
        Err(CuckooCraftError::InvalidConcurrency { .. })
    ));
}

#[test]
fn test_swap_safety_is_reported() {
    for safety in [SwapSafety::Fast, SwapSafety::Reliable, SwapSafety::Smart] {
        let filter = CuckooFilterBuilder::new(100)
            .with_swap_safety(safety)
            .build()
            .unwrap();
        assert_eq!(filter.swap_safety(), safety);
        assert!(filter.insert_str("x"));
        assert!(filter.contains_str("x"));
    }
}

#[test]
fn test_memory_round_trip_through_a_buffer() {
    let source = CuckooFilterBuilder::new(256)
        .with_fingerprint_bits(13)
        .build()
        .unwrap();
    for i in 0u32..150 {
        source.insert(&i.to_le_bytes());
    }

    let mut buffer = Vec::new();
    source.write_memory(&mut buffer).unwrap();
    assert_eq!(buffer.len() as u64, source.memory_usage_bytes());

    let target = CuckooFilterBuilder::new(256)
        .with_fingerprint_bits(13)
        .build()
        .unwrap();
    target.read_memory(&mut buffer.as_slice()).unwrap();
    for i in 0u32..150 {
        assert!(target.contains(&i.to_le_bytes()));
    }
    assert!(matches!(
        target.read_memory(&mut &buffer[..10]),
        Err(CuckooCraftError::Io { .. })
    ));
}
