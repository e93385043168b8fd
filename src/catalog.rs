//! Validated feature/trait/weight data that every generation run starts from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::combination::Combination;
use crate::config::Config;
use crate::error::{RarityError, Result};

/// One row of a rarity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub feature: String,
    pub trait_name: String,
    pub target_weight: f64,
}

impl CatalogRow {
    pub fn new(feature: &str, trait_name: &str, target_weight: f64) -> Self {
        Self {
            feature: feature.to_string(),
            trait_name: trait_name.to_string(),
            target_weight,
        }
    }
}

/// A possible value of a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Trait {
    pub name: String,
    /// Desired frequency of this trait within its feature.
    pub target_weight: f64,
}

/// A named axis of variation and its traits, in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub traits: Vec<Trait>,
}

impl Feature {
    pub fn trait_index(&self, name: &str) -> Option<usize> {
        self.traits.iter().position(|t| t.name == name)
    }
}

/// Immutable catalog of features in first-appearance order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCatalog {
    features: Vec<Feature>,
}

impl FeatureCatalog {
    /// Build a catalog from table rows.
    ///
    /// Features are ordered by their first appearance, traits by row order.
    /// Fails with [`RarityError::MalformedCatalog`] on an empty table, an
    /// empty feature or trait name, a repeated trait within a feature, a
    /// weight outside `[0, 1]`, or a feature whose weights do not sum to 1
    /// within the configured tolerance.
    pub fn from_rows<I>(rows: I, config: &Config) -> Result<Self>
    where
        I: IntoIterator<Item = CatalogRow>,
    {
        let mut features: Vec<Feature> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for (i, row) in rows.into_iter().enumerate() {
            if row.feature.is_empty() || row.trait_name.is_empty() {
                return Err(RarityError::MalformedCatalog(format!(
                    "row {} has an empty feature or trait name",
                    i + 1
                )));
            }
            let w = row.target_weight;
            if !w.is_finite() || !(0.0..=1.0).contains(&w) {
                return Err(RarityError::MalformedCatalog(format!(
                    "trait '{}' of feature '{}' has weight {} outside [0, 1]",
                    row.trait_name, row.feature, w
                )));
            }
            let idx = *by_name.entry(row.feature.clone()).or_insert_with(|| {
                features.push(Feature {
                    name: row.feature.clone(),
                    traits: Vec::new(),
                });
                features.len() - 1
            });
            let feature = &mut features[idx];
            if feature.trait_index(&row.trait_name).is_some() {
                return Err(RarityError::MalformedCatalog(format!(
                    "trait '{}' appears twice in feature '{}'",
                    row.trait_name, row.feature
                )));
            }
            feature.traits.push(Trait {
                name: row.trait_name,
                target_weight: w,
            });
        }

        if features.is_empty() {
            return Err(RarityError::MalformedCatalog("catalog has no features".into()));
        }

        let tolerance = config.generation.tolerance;
        for feature in &features {
            if feature.traits.is_empty() {
                return Err(RarityError::MalformedCatalog(format!(
                    "feature '{}' has no traits",
                    feature.name
                )));
            }
            let sum: f64 = feature.traits.iter().map(|t| t.target_weight).sum();
            if (sum - 1.0).abs() > tolerance {
                return Err(RarityError::MalformedCatalog(format!(
                    "weights of feature '{}' sum to {}, expected 1",
                    feature.name, sum
                )));
            }
        }

        log::debug!("catalog built with {} features", features.len());
        Ok(Self { features })
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    pub fn trait_names(&self, feature: usize) -> impl Iterator<Item = &str> {
        self.features[feature].traits.iter().map(|t| t.name.as_str())
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f.name == name)
    }

    pub fn target_weight(&self, feature: usize, trait_index: usize) -> f64 {
        self.features[feature].traits[trait_index].target_weight
    }

    /// Number of features, i.e. the arity of every combination.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Size of the full cross-product, or `None` on overflow.
    pub fn max_combinations(&self) -> Option<usize> {
        self.features
            .iter()
            .try_fold(1usize, |acc, f| acc.checked_mul(f.traits.len()))
    }

    /// Build a combination from `(feature, trait)` name pairs.
    ///
    /// Every feature must be named exactly once; order of the pairs is free.
    pub fn combination(&self, pairs: &[(&str, &str)]) -> Result<Combination> {
        let mut slots: Vec<Option<usize>> = vec![None; self.features.len()];
        for &(feature_name, trait_name) in pairs {
            let f = self.feature_index(feature_name).ok_or_else(|| {
                RarityError::NotFound(format!("feature '{feature_name}'"))
            })?;
            let t = self.features[f].trait_index(trait_name).ok_or_else(|| {
                RarityError::NotFound(format!(
                    "trait '{trait_name}' in feature '{feature_name}'"
                ))
            })?;
            if slots[f].replace(t).is_some() {
                return Err(RarityError::MalformedCatalog(format!(
                    "feature '{feature_name}' named twice in combination"
                )));
            }
        }
        let traits = slots
            .into_iter()
            .enumerate()
            .map(|(f, slot)| {
                slot.ok_or_else(|| {
                    RarityError::MalformedCatalog(format!(
                        "combination is missing feature '{}'",
                        self.features[f].name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Combination::new(traits))
    }
}
