//! Canonical Comparator.
//!
//! `select_branch` is the whole decision procedure; `compare` runs the branch
//! it picks. Digest branches compare canonical SHA-256 digests, the fuzzy
//! branch compares rows positionally within a per-field tolerance.

use std::time::Instant;

use crate::canonical::canonicalize;
use crate::config::{ExtractConfig, FuzzyConfig, ReconConfig};
use crate::error::ReconError;
use crate::model::{Branch, CompareMode, ComparisonResult, FuzzyStats, ReportDataset, RowMismatch};

/// Numeric knobs of a comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareSettings {
    pub precision: u32,
    pub tolerance: f64,
    pub threshold_percent: f64,
    pub max_row_diff: usize,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self::new(&ExtractConfig::default(), &FuzzyConfig::default())
    }
}

impl CompareSettings {
    pub fn new(extract: &ExtractConfig, fuzzy: &FuzzyConfig) -> Self {
        Self {
            precision: extract.precision,
            tolerance: fuzzy.tolerance,
            threshold_percent: fuzzy.threshold_percent,
            max_row_diff: fuzzy.max_row_diff,
        }
    }

    pub fn from_config(config: &ReconConfig) -> Self {
        Self::new(&config.extract, &config.fuzzy)
    }
}

/// Pick the comparison branch from the mode and the two row counts.
///
/// `Auto` is treated as `Exact`; resolve it against the source kind first.
pub fn select_branch(
    mode: CompareMode,
    rows_a: usize,
    rows_b: usize,
    max_row_diff: usize,
) -> Branch {
    match mode {
        CompareMode::Auto | CompareMode::Exact => Branch::Exact,
        CompareMode::Fuzzy if rows_a.abs_diff(rows_b) > max_row_diff => {
            Branch::FuzzyRowCountFallback
        }
        CompareMode::Fuzzy if rows_a.min(rows_b) == 0 => Branch::FuzzyEmptyFallback,
        CompareMode::Fuzzy => Branch::FuzzyThreshold,
    }
}

/// Compare `source` (extracted) against `output` (machine-generated).
pub fn compare(
    source: &ReportDataset,
    output: &ReportDataset,
    mode: CompareMode,
    settings: &CompareSettings,
) -> Result<ComparisonResult, ReconError> {
    let start = Instant::now();

    source.ensure_finite()?;
    output.ensure_finite()?;
    if source.is_empty() && output.is_empty() {
        return Err(ReconError::EmptyDataset);
    }

    let branch = select_branch(mode, source.len(), output.len(), settings.max_row_diff);
    let a = canonicalize(source, settings.precision);
    let b = canonicalize(output, settings.precision);

    let (matched, fuzzy) = match branch {
        Branch::Exact | Branch::FuzzyRowCountFallback | Branch::FuzzyEmptyFallback => {
            (a.digest == b.digest, None)
        }
        Branch::FuzzyThreshold => {
            let stats = fuzzy_stats(source, output, settings.tolerance);
            let passed = passes_threshold(&stats, settings.threshold_percent);
            (passed, Some(stats))
        }
    };

    log::debug!(
        "compare: branch={branch}, rows {} vs {}, matched={matched}",
        source.len(),
        output.len()
    );
    if let Some(ref stats) = fuzzy {
        for m in &stats.mismatches {
            log::debug!(
                "row {} mismatch: source(ref={}, asset={}) vs output(ref={}, asset={})",
                m.index,
                m.source.reference,
                m.source.asset,
                m.output.reference,
                m.output.asset,
            );
        }
        log::debug!(
            "{}/{} rows match ({:.1}%)",
            stats.matching_rows,
            stats.compared_rows,
            stats.match_percentage
        );
    }

    Ok(ComparisonResult {
        matched,
        branch: Some(branch),
        rows_source: source.len(),
        rows_output: output.len(),
        sheets: Vec::new(),
        canonical_digest_a: Some(a.digest),
        canonical_digest_b: Some(b.digest),
        canonical_string_a: Some(a.string),
        canonical_string_b: Some(b.string),
        fuzzy,
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        error: None,
    })
}

/// Positional comparison over the overlapping prefix of both datasets.
/// A row matches when both fields differ by strictly less than `tolerance`.
pub fn fuzzy_stats(source: &ReportDataset, output: &ReportDataset, tolerance: f64) -> FuzzyStats {
    let mut matching_rows = 0;
    let mut mismatches = Vec::new();

    for (index, (s, o)) in source.rows.iter().zip(&output.rows).enumerate() {
        let ref_ok = (s.reference - o.reference).abs() < tolerance;
        let asset_ok = (s.asset - o.asset).abs() < tolerance;
        if ref_ok && asset_ok {
            matching_rows += 1;
        } else {
            mismatches.push(RowMismatch { index, source: *s, output: *o });
        }
    }

    let compared_rows = source.len().min(output.len());
    let match_percentage = if compared_rows == 0 {
        0.0
    } else {
        matching_rows as f64 / compared_rows as f64 * 100.0
    };

    FuzzyStats {
        compared_rows,
        matching_rows,
        match_percentage,
        mismatches,
    }
}

/// `matching / compared * 100 >= threshold`, evaluated without the division.
pub fn passes_threshold(stats: &FuzzyStats, threshold_percent: f64) -> bool {
    stats.compared_rows > 0
        && stats.matching_rows as f64 * 100.0 >= threshold_percent * stats.compared_rows as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds(pairs: &[(f64, f64)]) -> ReportDataset {
        ReportDataset::from_pairs("t", pairs)
    }

    fn defaults() -> CompareSettings {
        CompareSettings::default()
    }

    fn ten_rows() -> Vec<(f64, f64)> {
        (0..10).map(|i| (i as f64 * 1.5, -(i as f64) * 2.25)).collect()
    }

    /// Copy of `rows` with the first `k` asset values pushed out of tolerance.
    fn perturb(rows: &[(f64, f64)], k: usize) -> Vec<(f64, f64)> {
        rows.iter()
            .enumerate()
            .map(|(i, &(r, a))| if i < k { (r, a + 0.5) } else { (r, a) })
            .collect()
    }

    // -- select_branch ------------------------------------------------------

    #[test]
    fn branch_exact_ignores_counts() {
        assert_eq!(select_branch(CompareMode::Exact, 10, 30, 2), Branch::Exact);
        assert_eq!(select_branch(CompareMode::Auto, 0, 3, 2), Branch::Exact);
    }

    #[test]
    fn branch_row_count_guard() {
        assert_eq!(select_branch(CompareMode::Fuzzy, 10, 13, 2), Branch::FuzzyRowCountFallback);
        assert_eq!(select_branch(CompareMode::Fuzzy, 13, 10, 2), Branch::FuzzyRowCountFallback);
        assert_eq!(select_branch(CompareMode::Fuzzy, 10, 12, 2), Branch::FuzzyThreshold);
    }

    #[test]
    fn branch_empty_overlap() {
        assert_eq!(select_branch(CompareMode::Fuzzy, 0, 2, 2), Branch::FuzzyEmptyFallback);
        assert_eq!(select_branch(CompareMode::Fuzzy, 0, 3, 2), Branch::FuzzyRowCountFallback);
    }

    // -- exact --------------------------------------------------------------

    #[test]
    fn exact_identical_after_rounding() {
        let a = ds(&[(1.0000001, 2.0), (0.0, -0.0)]);
        let b = ds(&[(1.0, 2.0000004), (-0.0, 0.0)]);
        let r = compare(&a, &b, CompareMode::Exact, &defaults()).unwrap();
        assert!(r.matched);
        assert_eq!(r.branch, Some(Branch::Exact));
        assert_eq!(r.canonical_digest_a, r.canonical_digest_b);
        assert!(r.fuzzy.is_none());
    }

    #[test]
    fn exact_single_cell_difference() {
        let a = ds(&ten_rows());
        let b = ds(&perturb(&ten_rows(), 1));
        let r = compare(&a, &b, CompareMode::Exact, &defaults()).unwrap();
        assert!(!r.matched);
        assert_ne!(r.canonical_digest_a, r.canonical_digest_b);
    }

    #[test]
    fn exact_row_count_difference() {
        let rows = ten_rows();
        let r = compare(&ds(&rows), &ds(&rows[..9]), CompareMode::Exact, &defaults()).unwrap();
        assert!(!r.matched);
    }

    // -- fuzzy --------------------------------------------------------------

    #[test]
    fn fuzzy_eight_of_ten_passes() {
        let rows = ten_rows();
        let off = ds(&perturb(&rows, 2));
        let r = compare(&ds(&rows), &off, CompareMode::Fuzzy, &defaults()).unwrap();
        let stats = r.fuzzy.as_ref().unwrap();
        assert_eq!(stats.matching_rows, 8);
        assert_eq!(stats.compared_rows, 10);
        assert_eq!(stats.match_percentage, 80.0);
        assert_eq!(stats.mismatches.len(), 2);
        assert_eq!(stats.mismatches[0].index, 0);
        assert!(r.matched);
        assert_eq!(r.branch, Some(Branch::FuzzyThreshold));
    }

    #[test]
    fn fuzzy_seven_of_ten_fails() {
        let rows = ten_rows();
        let off = ds(&perturb(&rows, 3));
        let r = compare(&ds(&rows), &off, CompareMode::Fuzzy, &defaults()).unwrap();
        assert_eq!(r.fuzzy.as_ref().unwrap().matching_rows, 7);
        assert!(!r.matched);
    }

    #[test]
    fn fuzzy_tolerance_is_strict() {
        let a = ds(&[(1.0, 1.0)]);
        let inside = ds(&[(1.0009, 1.0)]);
        let outside = ds(&[(1.002, 1.0)]);
        let s = defaults();
        assert!(compare(&a, &inside, CompareMode::Fuzzy, &s).unwrap().matched);
        assert!(!compare(&a, &outside, CompareMode::Fuzzy, &s).unwrap().matched);
    }

    #[test]
    fn fuzzy_row_count_guard_forces_digest() {
        let rows: Vec<(f64, f64)> = (0..13).map(|i| (i as f64, i as f64)).collect();
        // Same first 10 rows: fuzzy would pass at 100%, the guard must refuse.
        let r = compare(&ds(&rows[..10]), &ds(&rows), CompareMode::Fuzzy, &defaults()).unwrap();
        assert_eq!(r.branch, Some(Branch::FuzzyRowCountFallback));
        assert!(!r.matched);
        assert!(r.fuzzy.is_none());
    }

    #[test]
    fn fuzzy_small_row_count_difference_uses_overlap() {
        let rows: Vec<(f64, f64)> = (0..12).map(|i| (i as f64, i as f64)).collect();
        let r = compare(&ds(&rows[..10]), &ds(&rows), CompareMode::Fuzzy, &defaults()).unwrap();
        assert_eq!(r.branch, Some(Branch::FuzzyThreshold));
        assert!(r.matched);
        assert_eq!(r.fuzzy.unwrap().compared_rows, 10);
    }

    #[test]
    fn fuzzy_one_sided_empty_falls_back() {
        let r = compare(&ds(&[]), &ds(&[(1.0, 1.0)]), CompareMode::Fuzzy, &defaults()).unwrap();
        assert_eq!(r.branch, Some(Branch::FuzzyEmptyFallback));
        assert!(!r.matched);
    }

    #[test]
    fn configurable_threshold_and_tolerance() {
        let rows = ten_rows();
        let settings = CompareSettings {
            threshold_percent: 95.0,
            ..CompareSettings::default()
        };
        let off = ds(&perturb(&rows, 1));
        let r = compare(&ds(&rows), &off, CompareMode::Fuzzy, &settings).unwrap();
        assert!(!r.matched);

        let loose = CompareSettings { tolerance: 1.0, ..CompareSettings::default() };
        let r = compare(&ds(&rows), &ds(&perturb(&rows, 5)), CompareMode::Fuzzy, &loose).unwrap();
        assert!(r.matched);
        assert_eq!(r.fuzzy.unwrap().matching_rows, 10);
    }

    // -- errors -------------------------------------------------------------

    #[test]
    fn both_empty_is_error() {
        let err = compare(&ds(&[]), &ds(&[]), CompareMode::Exact, &defaults()).unwrap_err();
        assert_eq!(err, ReconError::EmptyDataset);
    }

    #[test]
    fn non_finite_is_error() {
        let err = compare(
            &ds(&[(1.0, 1.0)]),
            &ds(&[(f64::INFINITY, 1.0)]),
            CompareMode::Exact,
            &CompareSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReconError::NonFiniteValue { row: 0, .. }));
    }
}
