//! Convergence diagnostics over a generated sequence.
//!
//! These only compute numbers; charting them is left to the caller.

use serde::Serialize;

use crate::catalog::FeatureCatalog;
use crate::combination::Combination;
use crate::ledger::DistributionLedger;

/// Slice of `seq` between two fractions of its length, `0.0..=1.0`.
pub fn combinations_by_range<T>(seq: &[T], start: f64, end: f64) -> &[T] {
    let len = seq.len();
    let at = |fraction: f64| ((len as f64 * fraction.clamp(0.0, 1.0)) as usize).min(len);
    let (lo, hi) = (at(start), at(end));
    if lo >= hi {
        return &[];
    }
    &seq[lo..hi]
}

/// Fresh ledger updated with the given range of `seq`.
pub fn ledger_by_range(
    catalog: &FeatureCatalog,
    seq: &[Combination],
    start: f64,
    end: f64,
) -> DistributionLedger {
    let mut ledger = DistributionLedger::new(catalog);
    ledger.update(combinations_by_range(seq, start, end));
    ledger
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureError {
    pub feature: String,
    /// Median absolute weight difference over the feature's traits.
    pub error: f64,
}

/// Distribution error after a prefix of the output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPoint {
    /// Position on the combinations axis.
    pub combinations_count: f64,
    pub features: Vec<FeatureError>,
    /// Median of the per-feature errors.
    pub average: f64,
}

/// Distribution error measured over growing prefixes of `seq`.
///
/// Point `i` covers the first `(i + 1) / points` of the sequence. Its x
/// position is spread evenly over `0..=seq.len()`.
pub fn distribution_error(
    catalog: &FeatureCatalog,
    seq: &[Combination],
    points: usize,
) -> Vec<ErrorPoint> {
    let len = seq.len() as f64;
    (0..points)
        .map(|i| {
            let end = (i + 1) as f64 / points as f64;
            let ledger = ledger_by_range(catalog, seq, 0.0, end);
            let features: Vec<FeatureError> = catalog
                .feature_names()
                .enumerate()
                .map(|(f, name)| FeatureError {
                    feature: name.to_string(),
                    error: median(ledger.absolute_differences(f)),
                })
                .collect();
            let average = median(features.iter().map(|e| e.error).collect());
            let combinations_count = if points > 1 {
                i as f64 * len / (points - 1) as f64
            } else {
                0.0
            };
            ErrorPoint {
                combinations_count,
                features,
                average,
            }
        })
        .collect()
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
