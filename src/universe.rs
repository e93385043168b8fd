//! The materialized cross-product of every feature's traits.

use crate::catalog::FeatureCatalog;
use crate::combination::Combination;
use crate::error::{RarityError, Result};

/// All combinations not yet selected, in enumeration order.
///
/// Enumeration is nested over features in catalog order with the last
/// feature's trait varying fastest. Removal keeps the relative order of the
/// remaining members, which the allocator relies on for tie breaking.
#[derive(Debug, Clone)]
pub struct CombinationUniverse {
    remaining: Vec<Combination>,
    max_combinations: usize,
}

impl CombinationUniverse {
    pub fn new(catalog: &FeatureCatalog) -> Result<Self> {
        let max_combinations = catalog
            .max_combinations()
            .ok_or(RarityError::UniverseTooLarge)?;
        let arity = catalog.len();
        let radix: Vec<usize> = catalog.features().iter().map(|f| f.traits.len()).collect();

        let mut remaining = Vec::new();
        remaining
            .try_reserve_exact(max_combinations)
            .map_err(|_| RarityError::UniverseTooLarge)?;

        let mut odometer = vec![0usize; arity];
        for _ in 0..max_combinations {
            remaining.push(Combination::new(odometer.clone()));
            for pos in (0..arity).rev() {
                odometer[pos] += 1;
                if odometer[pos] < radix[pos] {
                    break;
                }
                odometer[pos] = 0;
            }
        }

        log::debug!("enumerated {} combinations", max_combinations);
        Ok(Self {
            remaining,
            max_combinations,
        })
    }

    /// Cardinality at construction; does not shrink with removals.
    pub fn size(&self) -> usize {
        self.max_combinations
    }

    pub fn remaining(&self) -> &[Combination] {
        &self.remaining
    }

    pub fn remaining_len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn contains(&self, combination: &Combination) -> bool {
        self.remaining.contains(combination)
    }

    /// Remove one element equal to `combination`.
    pub fn remove(&mut self, combination: &Combination) -> Result<Combination> {
        let pos = self
            .remaining
            .iter()
            .position(|c| c == combination)
            .ok_or_else(|| RarityError::NotFound(format!("{:?}", combination.traits())))?;
        Ok(self.remaining.remove(pos))
    }

    /// Remove the element at `position` in the remaining sequence.
    pub fn remove_at(&mut self, position: usize) -> Result<Combination> {
        if position >= self.remaining.len() {
            return Err(RarityError::NotFound(format!(
                "position {} of {} remaining",
                position,
                self.remaining.len()
            )));
        }
        Ok(self.remaining.remove(position))
    }
}
