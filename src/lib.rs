//! Distribution-fitting generator of unique trait combinations.
//!
//! A [`FeatureCatalog`] holds, per feature, the traits and their target
//! weights. [`generate`] draws combinations without replacement from the
//! full cross-product so that the cumulative trait distribution of every
//! prefix of the output tracks the targets as closely as a greedy choice
//! allows.

pub mod allocator;
pub mod catalog;
pub mod combination;
pub mod config;
pub mod diagnostics;
mod error;
pub mod io_utils;
pub mod ledger;
pub mod output;
pub mod table;
pub mod universe;

pub use allocator::{generate, Generation, GreedyAllocator, Request, Step};
pub use catalog::{CatalogRow, Feature, FeatureCatalog, Trait};
pub use combination::{Combination, NamedCombination};
pub use config::{Config, GenerationConfig, TableConfig};
pub use diagnostics::{
    combinations_by_range, distribution_error, ledger_by_range, ErrorPoint, FeatureError,
};
pub use error::{RarityError, Result};
pub use ledger::{DistributionLedger, LedgerEntry};
pub use output::{fingerprint, write_combinations_csv, write_combinations_json, write_ledger_csv};
pub use table::{
    build_chain, load_catalog, CsvTableLoader, FillFeatureNames, NormalizeWeights,
    PreprocessorKind, TableLoader, TablePreprocessor,
};
pub use universe::CombinationUniverse;
