//! Property-based tests for ID generation.
//!
//! Uses proptest to verify that:
//! - Generated IDs always have the 24 hex digit shape
//! - IDs are deterministic for the same inputs
//! - Distinct sequence numbers never collide in realistic batches
//! - The collision checker is honored

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use std::collections::HashSet;
use tracing::info;

use issue_tracker::util::id::{ID_LENGTH, IdGenerator, compute_id_hash, is_valid_id_format};

/// Initialize test logging for proptest (called once per test)
fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

fn instant(seconds: i64, millis: u32) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, millis * 1_000_000).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        ..Default::default()
    })]

    /// Property: every candidate is 24 lowercase hex digits
    #[test]
    fn id_always_valid_format(
        project in "\\PC{0,64}",
        seq in 1_i64..1_000_000,
        seconds in 0_i64..4_000_000_000,
        millis in 0_u32..1000,
        nonce in 0_u32..1000,
    ) {
        init_test_logging();
        let id = IdGenerator::new().generate_candidate(&project, seq, instant(seconds, millis), nonce);
        info!("proptest_id_valid: project_len={} output_id={id}", project.len());

        prop_assert_eq!(id.len(), ID_LENGTH);
        prop_assert!(is_valid_id_format(&id), "bad id {}", id);
    }

    /// Property: same inputs produce the same id
    #[test]
    fn id_is_deterministic(
        project in "[a-z]{1,16}",
        seq in 1_i64..1_000_000,
        seconds in 0_i64..2_000_000_000,
    ) {
        let generator = IdGenerator::new();
        let at = instant(seconds, 0);
        prop_assert_eq!(
            generator.generate_candidate(&project, seq, at, 0),
            generator.generate_candidate(&project, seq, at, 0)
        );
    }

    /// Property: the hash part has exactly the requested length
    #[test]
    fn hash_has_requested_length(input in "\\PC{0,100}", length in 0_usize..=64) {
        let hash = compute_id_hash(&input, length);
        prop_assert_eq!(hash.len(), length);
        prop_assert!(hash.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }

    /// Property: the generator skips every id the checker reports as taken
    #[test]
    fn generate_skips_taken_ids(taken in 0_u32..20) {
        let generator = IdGenerator::new();
        let at = instant(1_703_614_340, 0);
        let blocked: HashSet<String> = (0..taken)
            .map(|nonce| generator.generate_candidate("apitest", 7, at, nonce))
            .collect();

        let id = generator
            .generate("apitest", 7, at, |candidate| blocked.contains(candidate))
            .expect("free id");
        prop_assert!(!blocked.contains(&id));
        prop_assert_eq!(id, generator.generate_candidate("apitest", 7, at, taken));
    }
}

#[test]
fn batch_of_sequences_has_no_collisions() {
    init_test_logging();
    let generator = IdGenerator::new();
    let at = instant(1_703_614_340, 123);

    let ids: HashSet<String> = (1..=10_000)
        .map(|seq| generator.generate_candidate("apitest", seq, at, 0))
        .collect();

    info!("batch_of_sequences_has_no_collisions: unique={}", ids.len());
    assert_eq!(ids.len(), 10_000);
}

#[test]
fn rejects_malformed_ids() {
    for bad in [
        "",
        "658b17841a1fe2cbc76c784",
        "658b17841a1fe2cbc76c78470",
        "658B17841A1FE2CBC76C7847",
        "658b17841a1fe2cbc76c784g",
        "not-an-id",
    ] {
        assert!(!is_valid_id_format(bad), "{bad:?} accepted");
    }
    assert!(is_valid_id_format("658b17841a1fe2cbc76c7847"));
}
