//! Loading rarity tables and preparing their rows for the catalog.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::{CatalogRow, FeatureCatalog};
use crate::config::{Config, TableConfig};
use crate::error::{RarityError, Result};

/// Source of raw rarity table rows.
pub trait TableLoader {
    fn load(&self) -> Result<Vec<CatalogRow>>;
}

/// Reads a headered CSV file with configurable column names.
#[derive(Debug, Clone)]
pub struct CsvTableLoader {
    path: PathBuf,
    table: TableConfig,
}

impl CsvTableLoader {
    /// Fails with a `NotFound` I/O error if `path` does not exist.
    pub fn new<P: AsRef<Path>>(path: P, table: &TableConfig) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RarityError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("CSV file '{}' does not exist", path.display()),
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
            table: table.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse rows from any reader using the given column layout.
    pub fn from_reader<R: Read>(reader: R, table: &TableConfig) -> Result<Vec<CatalogRow>> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(table.delimiter as u8)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| RarityError::Table(format!("missing column '{name}'")))
        };
        let feature_col = column(&table.feature_column_name)?;
        let trait_col = column(&table.trait_column_name)?;
        let weight_col = column(&table.weights_column_name)?;

        let mut rows = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record?;
            if record.iter().all(|field| field.is_empty()) {
                log::warn!("skipping blank record {}", line + 1);
                continue;
            }
            let field = |col: usize| record.get(col).unwrap_or("");
            let raw_weight = field(weight_col);
            let target_weight: f64 = raw_weight.parse().map_err(|_| {
                RarityError::Table(format!(
                    "record {}: invalid weight '{}'",
                    line + 1,
                    raw_weight
                ))
            })?;
            rows.push(CatalogRow {
                feature: field(feature_col).to_string(),
                trait_name: field(trait_col).to_string(),
                target_weight,
            });
        }
        log::debug!("loaded {} rows", rows.len());
        Ok(rows)
    }
}

impl TableLoader for CsvTableLoader {
    fn load(&self) -> Result<Vec<CatalogRow>> {
        let file = File::open(&self.path)?;
        Self::from_reader(file, &self.table)
    }
}

/// Transforms table rows; preprocessors are applied in sequence.
pub trait TablePreprocessor {
    fn name(&self) -> &'static str;
    fn run(&self, rows: Vec<CatalogRow>) -> Result<Vec<CatalogRow>>;
}

/// Fills empty feature cells with the feature name above them.
///
/// Spreadsheets commonly name a feature only on its first trait row.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillFeatureNames;

impl TablePreprocessor for FillFeatureNames {
    fn name(&self) -> &'static str {
        "fill-feature-names"
    }

    fn run(&self, mut rows: Vec<CatalogRow>) -> Result<Vec<CatalogRow>> {
        let mut last: Option<String> = None;
        for (i, row) in rows.iter_mut().enumerate() {
            if row.feature.is_empty() {
                match &last {
                    Some(name) => row.feature = name.clone(),
                    None => {
                        return Err(RarityError::Table(format!(
                            "row {} has no feature name and nothing above it",
                            i + 1
                        )))
                    }
                }
            } else {
                last = Some(row.feature.clone());
            }
        }
        Ok(rows)
    }
}

/// Rescales each feature's weights so they sum to 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeWeights;

impl TablePreprocessor for NormalizeWeights {
    fn name(&self) -> &'static str {
        "normalize-weights"
    }

    fn run(&self, mut rows: Vec<CatalogRow>) -> Result<Vec<CatalogRow>> {
        let mut sums: HashMap<String, f64> = HashMap::new();
        for row in &rows {
            *sums.entry(row.feature.clone()).or_insert(0.0) += row.target_weight;
        }
        if let Some((feature, _)) = sums.iter().find(|&(_, &sum)| sum == 0.0 || !sum.is_finite()) {
            return Err(RarityError::MalformedCatalog(format!(
                "cannot normalize feature '{feature}', its weights sum to zero"
            )));
        }
        for row in &mut rows {
            row.target_weight /= sums[&row.feature];
        }
        Ok(rows)
    }
}

/// Preprocessors selectable by name in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreprocessorKind {
    FillFeatureNames,
    NormalizeWeights,
}

impl PreprocessorKind {
    pub fn build(self) -> Box<dyn TablePreprocessor> {
        match self {
            PreprocessorKind::FillFeatureNames => Box::new(FillFeatureNames),
            PreprocessorKind::NormalizeWeights => Box::new(NormalizeWeights),
        }
    }
}

pub fn build_chain(kinds: &[PreprocessorKind]) -> Vec<Box<dyn TablePreprocessor>> {
    kinds.iter().map(|k| k.build()).collect()
}

/// Load rows, run the configured preprocessors and build the catalog.
pub fn load_catalog(loader: &dyn TableLoader, config: &Config) -> Result<FeatureCatalog> {
    let mut rows = loader.load()?;
    for preprocessor in build_chain(&config.table.preprocessors) {
        log::debug!("applying preprocessor {}", preprocessor.name());
        rows = preprocessor.run(rows)?;
    }
    FeatureCatalog::from_rows(rows, config)
}
