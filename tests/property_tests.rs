use std::collections::HashSet;

use proptest::prelude::*;
use raritygen::{
    generate, CatalogRow, CombinationUniverse, Config, DistributionLedger, FeatureCatalog,
};

fn catalog_strategy() -> impl Strategy<Value = FeatureCatalog> {
    prop::collection::vec(prop::collection::vec(1u32..10, 1..4), 1..4).prop_map(|features| {
        let mut rows = Vec::new();
        for (f, weights) in features.iter().enumerate() {
            let sum: u32 = weights.iter().sum();
            for (t, w) in weights.iter().enumerate() {
                rows.push(CatalogRow::new(
                    &format!("f{f}"),
                    &format!("t{t}"),
                    *w as f64 / sum as f64,
                ));
            }
        }
        FeatureCatalog::from_rows(rows, &Config::default()).unwrap()
    })
}

fn catalog_and_count() -> impl Strategy<Value = (FeatureCatalog, usize)> {
    catalog_strategy().prop_flat_map(|catalog| {
        let max = catalog.max_combinations().unwrap();
        (Just(catalog), 0..=max)
    })
}

proptest! {
    #[test]
    fn output_is_distinct_members((catalog, n) in catalog_and_count()) {
        let generation = generate(&catalog, n as i64, &Config::default()).unwrap();
        prop_assert_eq!(generation.len(), n);
        let unique: HashSet<_> = generation.combinations.iter().collect();
        prop_assert_eq!(unique.len(), n);
        for combination in &generation.combinations {
            prop_assert_eq!(combination.arity(), catalog.len());
            for (f, &t) in combination.traits().iter().enumerate() {
                prop_assert!(t < catalog.features()[f].traits.len());
            }
        }
    }

    #[test]
    fn all_sentinel_covers_universe(catalog in catalog_strategy()) {
        let generation = generate(&catalog, -1, &Config::default()).unwrap();
        let universe = CombinationUniverse::new(&catalog).unwrap();
        prop_assert_eq!(generation.len(), universe.size());
        let produced: HashSet<_> = generation.combinations.iter().cloned().collect();
        let expected: HashSet<_> = universe.remaining().iter().cloned().collect();
        prop_assert_eq!(produced, expected);
    }

    #[test]
    fn shorter_runs_are_prefixes((catalog, n) in catalog_and_count()) {
        let config = Config::default();
        let short = generate(&catalog, n as i64, &config).unwrap();
        let again = generate(&catalog, n as i64, &config).unwrap();
        let full = generate(&catalog, -1, &config).unwrap();
        prop_assert_eq!(&short.combinations, &again.combinations);
        prop_assert_eq!(&short.combinations[..], &full.combinations[..n]);
    }

    #[test]
    fn incremental_ledger_matches_recomputation((catalog, n) in catalog_and_count()) {
        let generation = generate(&catalog, n as i64, &Config::default()).unwrap();
        let mut recomputed = DistributionLedger::new(&catalog);
        recomputed.update(&generation.combinations);
        prop_assert_eq!(generation.ledger, recomputed);
    }

    #[test]
    fn over_capacity_always_fails(catalog in catalog_strategy(), extra in 1usize..5) {
        let max = catalog.max_combinations().unwrap();
        prop_assert!(generate(&catalog, (max + extra) as i64, &Config::default()).is_err());
    }
}
