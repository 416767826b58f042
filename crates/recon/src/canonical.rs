//! Canonical string encoding and digest of a dataset.
//!
//! Row: `reference,asset` with exactly `precision` fractional digits.
//! Dataset: rows joined with `|` in dataset order. Digest: SHA-256, lowercase hex.
//!
//! Two values encode identically iff they are equal after rounding to
//! `precision` digits, with `-0.0` and `0.0` folded into a single zero.

use sha2::{Digest, Sha256};

use crate::model::ReportDataset;

/// Round to `precision` fractional digits, then fold negative zero into
/// positive zero.
///
/// Rounding goes through the correctly rounded decimal formatter, so the
/// exact binary value decides ties and no magnitude can overflow.
pub fn normalize(value: f64, precision: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let rounded = format!("{:.*}", precision as usize, value)
        .parse::<f64>()
        .unwrap_or(value);
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

pub fn format_value(value: f64, precision: u32) -> String {
    format!("{:.*}", precision as usize, normalize(value, precision))
}

/// The `|`-joined row encoding of a dataset.
pub fn canonical_string(dataset: &ReportDataset, precision: u32) -> String {
    dataset
        .rows
        .iter()
        .map(|row| {
            format!(
                "{},{}",
                format_value(row.reference, precision),
                format_value(row.asset, precision)
            )
        })
        .collect::<Vec<_>>()
        .join("|")
}

pub fn digest(canonical: &str) -> String {
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

/// Canonical string and its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonical {
    pub string: String,
    pub digest: String,
}

pub fn canonicalize(dataset: &ReportDataset, precision: u32) -> Canonical {
    let string = canonical_string(dataset, precision);
    let digest = digest(&string);
    Canonical { string, digest }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds(pairs: &[(f64, f64)]) -> ReportDataset {
        ReportDataset::from_pairs("t", pairs)
    }

    #[test]
    fn zero_forms_are_identical() {
        let a = canonicalize(&ds(&[(0.0, -0.0)]), 6);
        let b = canonicalize(&ds(&[(0.0, 0.0)]), 6);
        assert_eq!(a, b);
        assert_eq!(a.string, "0.000000,0.000000");
    }

    #[test]
    fn tiny_negative_rounds_to_plain_zero() {
        assert_eq!(format_value(-0.0000004, 6), "0.000000");
        assert_eq!(format_value(-0.0000006, 6), "-0.000001");
    }

    #[test]
    fn ties_follow_the_stored_binary_value() {
        // 5e-7 is stored just below the half, 1.0000005 just above it
        assert_eq!(format_value(5e-7, 6), "0.000000");
        assert_eq!(format_value(-5e-7, 6), "0.000000");
        assert_eq!(format_value(1.0000005, 6), "1.000001");
    }

    #[test]
    fn huge_values_stay_finite_and_distinct() {
        assert_eq!(normalize(1e303, 6), 1e303);
        assert_eq!(normalize(-f64::MAX, 6), -f64::MAX);
        let a = canonicalize(&ds(&[(1e303, 1.0)]), 6);
        let b = canonicalize(&ds(&[(5e303, 1.0)]), 6);
        assert!(!a.string.contains("inf"), "{}", a.string);
        assert_ne!(a.digest, b.digest);
    }

    #[test]
    fn fixed_width_fraction() {
        assert_eq!(format_value(1.5, 6), "1.500000");
        assert_eq!(format_value(-1234567.1234567, 6), "-1234567.123457");
        assert_eq!(format_value(42.0, 2), "42.00");
    }

    #[test]
    fn rows_joined_in_order() {
        let c = canonical_string(&ds(&[(1.0, 2.0), (3.25, -4.0)]), 6);
        assert_eq!(c, "1.000000,2.000000|3.250000,-4.000000");
    }

    #[test]
    fn empty_dataset_is_empty_string() {
        let c = canonicalize(&ds(&[]), 6);
        assert_eq!(c.string, "");
        // SHA-256 of the empty string.
        assert_eq!(
            c.digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn reorder_changes_digest() {
        let a = canonicalize(&ds(&[(1.0, 2.0), (3.0, 4.0)]), 6);
        let b = canonicalize(&ds(&[(3.0, 4.0), (1.0, 2.0)]), 6);
        assert_ne!(a.digest, b.digest);
    }

    #[test]
    fn sub_precision_noise_is_ignored() {
        let a = canonicalize(&ds(&[(10.1234561, 5.0)]), 6);
        let b = canonicalize(&ds(&[(10.1234559, 5.0000001)]), 6);
        assert_eq!(a.digest, b.digest);
    }

    #[test]
    fn digest_is_hex_sha256() {
        let d = digest("abc");
        assert_eq!(d, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    }
}
