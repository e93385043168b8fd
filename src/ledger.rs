//! Running record of the empirical trait distribution of a generation run.
//!
//! Only traits that have been observed at least once get their current
//! weight recomputed. Unobserved traits keep their previous value (zero for
//! a fresh ledger) instead of being renormalized, so a feature's current
//! weights are not guaranteed to form a probability distribution. Selection
//! order depends on this, so it must stay as is.

use serde::Serialize;

use crate::catalog::FeatureCatalog;
use crate::combination::Combination;

/// One (feature, trait) entry of a ledger snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub feature_name: String,
    pub trait_name: String,
    pub target_weight: f64,
    pub current_weight: f64,
    pub weight_difference: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionLedger {
    target: Vec<Vec<f64>>,
    current: Vec<Vec<f64>>,
    difference: Vec<Vec<f64>>,
    counts: Vec<Vec<usize>>,
    accepted: usize,
    names: Vec<(String, Vec<String>)>,
}

impl DistributionLedger {
    /// Fresh ledger with every current weight at zero.
    pub fn new(catalog: &FeatureCatalog) -> Self {
        let target: Vec<Vec<f64>> = catalog
            .features()
            .iter()
            .map(|f| f.traits.iter().map(|t| t.target_weight).collect())
            .collect();
        let current: Vec<Vec<f64>> = target.iter().map(|t| vec![0.0; t.len()]).collect();
        let counts = target.iter().map(|t| vec![0; t.len()]).collect();
        let names = catalog
            .features()
            .iter()
            .map(|f| (f.name.clone(), f.traits.iter().map(|t| t.name.clone()).collect()))
            .collect();
        let mut ledger = Self {
            difference: target.clone(),
            target,
            current,
            counts,
            accepted: 0,
            names,
        };
        ledger.refresh_differences();
        ledger
    }

    /// Recompute from scratch over every accepted combination.
    ///
    /// An empty slice leaves the ledger unchanged.
    pub fn update(&mut self, accepted: &[Combination]) {
        if accepted.is_empty() {
            return;
        }
        for row in &mut self.counts {
            row.iter_mut().for_each(|c| *c = 0);
        }
        for combination in accepted {
            for (f, &t) in combination.traits().iter().enumerate() {
                self.counts[f][t] += 1;
            }
        }
        self.accepted = accepted.len();
        self.refresh_current();
        self.refresh_differences();
    }

    /// Account for one more accepted combination.
    ///
    /// Leaves the ledger in the same state as [`update`](Self::update) over
    /// the whole sequence accepted so far.
    pub fn record(&mut self, combination: &Combination) {
        for (f, &t) in combination.traits().iter().enumerate() {
            self.counts[f][t] += 1;
        }
        self.accepted += 1;
        self.refresh_current();
        self.refresh_differences();
    }

    fn refresh_current(&mut self) {
        let total = self.accepted as f64;
        for (counts, current) in self.counts.iter().zip(self.current.iter_mut()) {
            for (&count, weight) in counts.iter().zip(current.iter_mut()) {
                if count > 0 {
                    *weight = count as f64 / total;
                }
            }
        }
    }

    fn refresh_differences(&mut self) {
        for ((target, current), diff) in self
            .target
            .iter()
            .zip(&self.current)
            .zip(self.difference.iter_mut())
        {
            for ((t, c), d) in target.iter().zip(current).zip(diff.iter_mut()) {
                *d = t - c;
            }
        }
    }

    /// Sum of the weight differences of the traits in `combination`.
    ///
    /// Terms are added in catalog feature order, so float ties between
    /// candidates are decided by sums taken in that order.
    pub fn score(&self, combination: &Combination) -> f64 {
        combination
            .traits()
            .iter()
            .enumerate()
            .map(|(f, &t)| self.difference[f][t])
            .sum()
    }

    pub fn current_weight(&self, feature: usize, trait_index: usize) -> f64 {
        self.current[feature][trait_index]
    }

    pub fn weight_difference(&self, feature: usize, trait_index: usize) -> f64 {
        self.difference[feature][trait_index]
    }

    /// Number of combinations the ledger currently accounts for.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Every entry in catalog order.
    pub fn snapshot(&self) -> Vec<LedgerEntry> {
        let mut out = Vec::new();
        for (f, (feature_name, traits)) in self.names.iter().enumerate() {
            for (t, trait_name) in traits.iter().enumerate() {
                out.push(LedgerEntry {
                    feature_name: feature_name.clone(),
                    trait_name: trait_name.clone(),
                    target_weight: self.target[f][t],
                    current_weight: self.current[f][t],
                    weight_difference: self.difference[f][t],
                });
            }
        }
        out
    }

    /// Absolute weight differences of one feature's traits.
    pub fn absolute_differences(&self, feature: usize) -> Vec<f64> {
        self.difference[feature].iter().map(|d| d.abs()).collect()
    }
}
