// Property-based tests for canonicalization and the fuzzy comparator.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use pnlcheck_recon::canonical::{canonical_string, canonicalize, format_value};
use pnlcheck_recon::compare::{compare, CompareSettings};
use pnlcheck_recon::model::{CompareMode, ReportDataset};

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// Report-sized values: mostly ordinary amounts, sometimes zeros of either sign.
fn arb_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => -1.0e9..1.0e9f64,
        1 => Just(0.0),
        1 => Just(-0.0),
        1 => -1.0e-7..1.0e-7f64,
    ]
}

fn arb_rows(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((arb_value(), arb_value()), len)
}

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn canonicalize_is_deterministic(rows in arb_rows(0..40)) {
        let ds = ReportDataset::from_pairs("p", &rows);
        prop_assert_eq!(canonicalize(&ds, 6), canonicalize(&ds, 6));
    }

    #[test]
    fn no_negative_zero_in_output(v in arb_value()) {
        let s = format_value(v, 6);
        prop_assert_ne!(s, "-0.000000");
    }

    #[test]
    fn one_string_per_row(rows in arb_rows(0..40)) {
        let ds = ReportDataset::from_pairs("p", &rows);
        let s = canonical_string(&ds, 6);
        let expected = if rows.is_empty() { 0 } else { rows.len() };
        let actual = if s.is_empty() { 0 } else { s.split('|').count() };
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn swapping_distinct_rows_changes_digest(rows in arb_rows(2..20)) {
        let ds = ReportDataset::from_pairs("p", &rows);
        let mut swapped = rows.clone();
        swapped.swap(0, 1);
        let sw = ReportDataset::from_pairs("p", &swapped);
        let first = format!("{},{}", format_value(rows[0].0, 6), format_value(rows[0].1, 6));
        let second = format!("{},{}", format_value(rows[1].0, 6), format_value(rows[1].1, 6));
        if first == second {
            prop_assert_eq!(canonicalize(&ds, 6).digest, canonicalize(&sw, 6).digest);
        } else {
            prop_assert_ne!(canonicalize(&ds, 6).digest, canonicalize(&sw, 6).digest);
        }
    }

    #[test]
    fn dataset_matches_itself_in_every_mode(rows in arb_rows(1..40)) {
        let ds = ReportDataset::from_pairs("p", &rows);
        for mode in [CompareMode::Exact, CompareMode::Fuzzy, CompareMode::Auto] {
            let r = compare(&ds, &ds, mode, &CompareSettings::default()).unwrap();
            prop_assert!(r.matched);
        }
    }
}
