//! Prints trait counts and target weights per feature for a rarity table.
//! Used for a quick sanity check before a generation run.

use std::{env, path::Path};
use raritygen::io_utils::{rarity_cli_error, simple_cli_error};
use raritygen::{load_catalog, Config, CsvTableLoader};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        let program = args.first().map(String::as_str).unwrap_or("catalog_summary");
        return Err(simple_cli_error(&format!("Usage: {program} <table_csv>")).into());
    }

    let path = Path::new(&args[1]);
    let config = Config::default();
    let loader =
        CsvTableLoader::new(path, &config.table).map_err(|e| rarity_cli_error("opening table", e))?;
    let catalog =
        load_catalog(&loader, &config).map_err(|e| rarity_cli_error("loading table", e))?;

    for feature in catalog.features() {
        println!("{} ({} traits)", feature.name, feature.traits.len());
        for t in &feature.traits {
            println!("  {:<24} {:.4}", t.name, t.target_weight);
        }
    }
    match catalog.max_combinations() {
        Some(max) => println!("{max} possible combinations"),
        None => println!("too many combinations to count"),
    }

    Ok(())
}
