//! Writers for generated combinations and ledger snapshots.

use std::io::Write;

use serde::ser::{SerializeMap, Serializer};
use sha2::{Digest, Sha256};

use crate::catalog::FeatureCatalog;
use crate::combination::Combination;
use crate::error::Result;
use crate::ledger::LedgerEntry;

/// Write combinations as a JSON object keyed by output position.
///
/// `{"0": {"Background": "Blue", ...}, "1": {...}}`
pub fn write_combinations_json<W: Write>(
    writer: W,
    catalog: &FeatureCatalog,
    combinations: &[Combination],
) -> Result<()> {
    let mut ser = serde_json::Serializer::pretty(writer);
    let mut map = (&mut ser).serialize_map(Some(combinations.len()))?;
    for (i, combination) in combinations.iter().enumerate() {
        map.serialize_entry(&i.to_string(), &combination.named(catalog))?;
    }
    map.end()?;
    Ok(())
}

/// Write combinations as CSV with one column per feature.
pub fn write_combinations_csv<W: Write>(
    writer: W,
    catalog: &FeatureCatalog,
    combinations: &[Combination],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(catalog.feature_names())?;
    for combination in combinations {
        wtr.write_record(combination.named(catalog).trait_names())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a ledger snapshot as CSV.
pub fn write_ledger_csv<W: Write>(writer: W, entries: &[LedgerEntry]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in entries {
        wtr.serialize(entry)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Hex SHA-256 of a named combination sequence.
///
/// Two runs produced the same output exactly when their fingerprints match.
pub fn fingerprint(catalog: &FeatureCatalog, combinations: &[Combination]) -> String {
    let mut hasher = Sha256::new();
    for combination in combinations {
        for (feature, trait_name) in combination.named(catalog).entries {
            hasher.update(feature.as_bytes());
            hasher.update([0x1f]);
            hasher.update(trait_name.as_bytes());
            hasher.update([0x1e]);
        }
        hasher.update([0x1d]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogRow;
    use crate::config::Config;
    use crate::ledger::DistributionLedger;

    fn catalog() -> FeatureCatalog {
        let rows = vec![
            CatalogRow::new("Background", "Blue", 0.5),
            CatalogRow::new("Background", "Red", 0.5),
            CatalogRow::new("Eyes", "Round", 1.0),
        ];
        FeatureCatalog::from_rows(rows, &Config::default()).unwrap()
    }

    #[test]
    fn json_keeps_feature_order() {
        let catalog = catalog();
        let combos = vec![Combination::new(vec![1, 0])];
        let mut buf = Vec::new();
        write_combinations_json(&mut buf, &catalog, &combos).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["0"]["Background"], "Red");
        assert_eq!(value["0"]["Eyes"], "Round");
        assert!(text.find("Background").unwrap() < text.find("Eyes").unwrap());
    }

    #[test]
    fn csv_has_feature_header() {
        let catalog = catalog();
        let combos = vec![Combination::new(vec![0, 0]), Combination::new(vec![1, 0])];
        let mut buf = Vec::new();
        write_combinations_csv(&mut buf, &catalog, &combos).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Background,Eyes\nBlue,Round\nRed,Round\n"
        );
    }

    #[test]
    fn ledger_csv_has_header() {
        let ledger = DistributionLedger::new(&catalog());
        let mut buf = Vec::new();
        write_ledger_csv(&mut buf, &ledger.snapshot()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let first = text.lines().next().unwrap();
        assert_eq!(
            first,
            "feature_name,trait_name,target_weight,current_weight,weight_difference"
        );
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn fingerprint_depends_on_order() {
        let catalog = catalog();
        let a = vec![Combination::new(vec![0, 0]), Combination::new(vec![1, 0])];
        let b = vec![Combination::new(vec![1, 0]), Combination::new(vec![0, 0])];
        assert_eq!(fingerprint(&catalog, &a), fingerprint(&catalog, &a));
        assert_ne!(fingerprint(&catalog, &a), fingerprint(&catalog, &b));
        assert_eq!(fingerprint(&catalog, &a).len(), 64);
    }
}
