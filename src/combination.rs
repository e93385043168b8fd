use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::catalog::FeatureCatalog;

/// One trait choice per feature, stored as trait indices in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination {
    traits: Vec<usize>,
}

impl Combination {
    /// Unchecked; use [`FeatureCatalog::combination`] to build from names.
    pub(crate) fn new(traits: Vec<usize>) -> Self {
        Self { traits }
    }

    /// Trait index chosen for each feature.
    pub fn traits(&self) -> &[usize] {
        &self.traits
    }

    pub fn arity(&self) -> usize {
        self.traits.len()
    }

    /// Resolve indices to `(feature, trait)` names.
    pub fn named(&self, catalog: &FeatureCatalog) -> NamedCombination {
        let entries = catalog
            .features()
            .iter()
            .zip(&self.traits)
            .map(|(f, &t)| (f.name.clone(), f.traits[t].name.clone()))
            .collect();
        NamedCombination { entries }
    }
}

/// A combination as `feature_name -> trait_name`, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedCombination {
    pub entries: Vec<(String, String)>,
}

impl NamedCombination {
    pub fn get(&self, feature: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| f == feature)
            .map(|(_, t)| t.as_str())
    }

    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, t)| t.as_str())
    }
}

impl fmt::Display for NamedCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, (_, t)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(t)?;
        }
        f.write_str(")")
    }
}

// Serialized as a map so feature order survives in JSON output.
impl Serialize for NamedCombination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (feature, trait_name) in &self.entries {
            map.serialize_entry(feature, trait_name)?;
        }
        map.end()
    }
}
