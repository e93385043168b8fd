use std::path::Path;

use serde::Deserialize;

use crate::error::{RarityError, Result};
use crate::table::PreprocessorKind;

/// Runtime configuration for loading a rarity table and generating from it.
///
/// Passed explicitly into catalog construction and the allocator; nothing
/// reads configuration from process-wide state.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub table: TableConfig,
    pub generation: GenerationConfig,
}

/// Column layout of the input table and the preprocessing chain.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    /// Header of the column holding feature names.
    pub feature_column_name: String,
    /// Header of the column holding trait names.
    pub trait_column_name: String,
    /// Header of the column holding target weights.
    pub weights_column_name: String,
    /// Single byte field delimiter.
    pub delimiter: char,
    /// Preprocessors applied in order after loading.
    pub preprocessors: Vec<PreprocessorKind>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            feature_column_name: "feature_name".to_string(),
            trait_column_name: "trait_name".to_string(),
            weights_column_name: "target_weight".to_string(),
            delimiter: ',',
            preprocessors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Allowed deviation of a feature's weight sum from 1.
    pub tolerance: f64,
    /// Show a progress bar while generating.
    pub progress: bool,
    /// Number of points in the convergence report.
    pub checkpoints: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            progress: false,
            checkpoints: 10,
        }
    }
}

impl Config {
    /// Parse a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| RarityError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let tol = self.generation.tolerance;
        if !tol.is_finite() || tol < 0.0 {
            return Err(RarityError::Config(format!(
                "tolerance must be a non-negative number, got {tol}"
            )));
        }
        if !self.table.delimiter.is_ascii() {
            return Err(RarityError::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.table.delimiter
            )));
        }
        if self.generation.checkpoints == 0 {
            return Err(RarityError::Config("checkpoints must be at least 1".into()));
        }
        Ok(())
    }
}
