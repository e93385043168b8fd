//! Greedy distribution-fitting selection loop.
//!
//! Every iteration scores each remaining combination by the sum of its
//! traits' weight differences, takes the highest score (earliest in
//! enumeration order on ties), removes it from the universe and updates the
//! ledger. There is no randomness: the same catalog and count always yield
//! the same sequence.

use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::catalog::FeatureCatalog;
use crate::combination::{Combination, NamedCombination};
use crate::config::Config;
use crate::error::{RarityError, Result};
use crate::ledger::DistributionLedger;
use crate::universe::CombinationUniverse;

/// How many combinations a run should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// The whole universe, written as `-1` on the command line.
    All,
    Exactly(usize),
}

impl Request {
    /// Interpret a signed count where `-1` means the whole universe.
    pub fn from_count(n: i64) -> Result<Self> {
        match n {
            -1 => Ok(Request::All),
            n if n >= 0 => usize::try_from(n)
                .map(Request::Exactly)
                .map_err(|_| RarityError::InvalidRequest(n)),
            n => Err(RarityError::InvalidRequest(n)),
        }
    }

    /// Concrete count for a universe of `available` combinations.
    pub fn resolve(self, available: usize) -> Result<usize> {
        match self {
            Request::All => Ok(available),
            Request::Exactly(n) if n > available => Err(RarityError::CapacityExceeded {
                requested: n,
                available,
            }),
            Request::Exactly(n) => Ok(n),
        }
    }
}

/// Output of a completed run.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Accepted combinations in selection order.
    pub combinations: Vec<Combination>,
    /// Ledger after the last accepted combination.
    pub ledger: DistributionLedger,
    /// Size of the universe the run drew from.
    pub max_combinations: usize,
}

impl Generation {
    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    pub fn named(&self, catalog: &FeatureCatalog) -> Vec<NamedCombination> {
        self.combinations.iter().map(|c| c.named(catalog)).collect()
    }
}

/// State handed to observers after every accepted combination.
#[derive(Debug)]
pub struct Step<'a> {
    /// Zero based position of `combination` in the output.
    pub iteration: usize,
    pub combination: &'a Combination,
    /// Score the combination won with.
    pub score: f64,
    pub ledger: &'a DistributionLedger,
}

/// A single generation run.
///
/// Drive it with [`step`](Self::step) to stop between iterations, or with
/// [`run`](Self::run) to completion.
pub struct GreedyAllocator<'c> {
    catalog: &'c FeatureCatalog,
    universe: CombinationUniverse,
    ledger: DistributionLedger,
    accepted: Vec<Combination>,
    count: usize,
    progress: ProgressBar,
}

impl<'c> GreedyAllocator<'c> {
    /// Validate the request and build the universe and a fresh ledger.
    ///
    /// Capacity is checked against the catalog before anything is
    /// enumerated, so a rejected request does no work.
    pub fn new(catalog: &'c FeatureCatalog, request: Request, config: &Config) -> Result<Self> {
        let available = catalog
            .max_combinations()
            .ok_or(RarityError::UniverseTooLarge)?;
        let count = request.resolve(available)?;
        let universe = CombinationUniverse::new(catalog)?;
        let ledger = DistributionLedger::new(catalog);

        let progress = if config.generation.progress && count > 0 {
            let bar = ProgressBar::new(count as u64);
            bar.set_style(
                ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_message("Generating combinations");
            bar
        } else {
            ProgressBar::hidden()
        };

        log::info!(
            "generating {} of {} possible combinations",
            count,
            universe.size()
        );
        Ok(Self {
            catalog,
            universe,
            ledger,
            accepted: Vec::with_capacity(count),
            count,
            progress,
        })
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        self.catalog
    }

    /// Resolved number of combinations this run will produce.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn ledger(&self) -> &DistributionLedger {
        &self.ledger
    }

    pub fn accepted(&self) -> &[Combination] {
        &self.accepted
    }

    pub fn universe(&self) -> &CombinationUniverse {
        &self.universe
    }

    pub fn is_finished(&self) -> bool {
        self.accepted.len() >= self.count
    }

    /// Perform one iteration. Returns `None` once `count` is reached.
    pub fn step(&mut self) -> Result<Option<Step<'_>>> {
        if self.is_finished() {
            return Ok(None);
        }
        let (position, score) = select_best(self.universe.remaining(), &self.ledger).ok_or(
            RarityError::UniverseExhausted {
                produced: self.accepted.len(),
                requested: self.count,
            },
        )?;
        let combination = self.universe.remove_at(position)?;
        self.ledger.record(&combination);
        self.accepted.push(combination);
        self.progress.inc(1);

        let iteration = self.accepted.len() - 1;
        let combination = &self.accepted[iteration];
        log::debug!(
            "#{} {} score={:.6}",
            iteration,
            combination.named(self.catalog),
            score
        );
        Ok(Some(Step {
            iteration,
            combination,
            score,
            ledger: &self.ledger,
        }))
    }

    /// Run to completion.
    pub fn run(self) -> Result<Generation> {
        self.run_with(|_| {})
    }

    /// Run to completion, calling `observer` after every iteration.
    pub fn run_with<F>(mut self, mut observer: F) -> Result<Generation>
    where
        F: FnMut(&Step<'_>),
    {
        while let Some(step) = self.step()? {
            observer(&step);
        }
        self.progress.finish_and_clear();
        log::info!("generated {} combinations", self.accepted.len());
        Ok(Generation {
            combinations: self.accepted,
            ledger: self.ledger,
            max_combinations: self.universe.size(),
        })
    }
}

/// Generate `n` combinations, where `n == -1` selects the whole universe.
///
/// `n == 0` returns an empty generation without enumerating the universe.
pub fn generate(catalog: &FeatureCatalog, n: i64, config: &Config) -> Result<Generation> {
    let request = Request::from_count(n)?;
    let available = catalog
        .max_combinations()
        .ok_or(RarityError::UniverseTooLarge)?;
    if request.resolve(available)? == 0 {
        return Ok(Generation {
            combinations: Vec::new(),
            ledger: DistributionLedger::new(catalog),
            max_combinations: available,
        });
    }
    GreedyAllocator::new(catalog, request, config)?.run()
}

/// Position and score of the best candidate, earliest position on ties.
#[cfg(not(feature = "parallel"))]
fn select_best(candidates: &[Combination], ledger: &DistributionLedger) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        let score = ledger.score(candidate);
        match best {
            Some((_, b)) if score <= b => {}
            _ => best = Some((i, score)),
        }
    }
    best
}

#[cfg(feature = "parallel")]
fn select_best(candidates: &[Combination], ledger: &DistributionLedger) -> Option<(usize, f64)> {
    candidates
        .par_iter()
        .enumerate()
        .map(|(i, c)| (i, ledger.score(c)))
        .reduce_with(|a, b| {
            if b.1 > a.1 || (b.1 == a.1 && b.0 < a.0) {
                b
            } else {
                a
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogRow;

    fn catalog() -> FeatureCatalog {
        let rows = vec![
            CatalogRow::new("A", "a1", 0.75),
            CatalogRow::new("A", "a2", 0.25),
            CatalogRow::new("B", "b1", 0.5),
            CatalogRow::new("B", "b2", 0.5),
        ];
        FeatureCatalog::from_rows(rows, &Config::default()).unwrap()
    }

    #[test]
    fn request_from_count() {
        assert_eq!(Request::from_count(-1).unwrap(), Request::All);
        assert_eq!(Request::from_count(3).unwrap(), Request::Exactly(3));
        assert!(matches!(
            Request::from_count(-2),
            Err(RarityError::InvalidRequest(-2))
        ));
        assert!(matches!(
            Request::Exactly(5).resolve(4),
            Err(RarityError::CapacityExceeded {
                requested: 5,
                available: 4
            })
        ));
    }

    #[test]
    fn tie_resolves_to_earliest() {
        let ledger = DistributionLedger::new(&catalog());
        let candidates = vec![
            Combination::new(vec![1, 1]),
            Combination::new(vec![0, 1]),
            Combination::new(vec![0, 0]),
        ];
        assert_eq!(select_best(&candidates, &ledger), Some((1, 1.25)));
        assert_eq!(select_best(&[], &ledger), None);
    }

    #[test]
    fn stepping_reports_scores() {
        let catalog = catalog();
        let mut allocator =
            GreedyAllocator::new(&catalog, Request::Exactly(2), &Config::default()).unwrap();
        let first = allocator.step().unwrap().unwrap();
        assert_eq!(first.iteration, 0);
        assert_eq!(first.score, 1.25);
        let second = allocator.step().unwrap().unwrap();
        assert_eq!(second.score, 0.75);
        assert!(allocator.step().unwrap().is_none());
        assert_eq!(allocator.universe().remaining_len(), 2);
    }
}
