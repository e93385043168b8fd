use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use raritygen::io_utils::{io_cli_error, rarity_cli_error, simple_cli_error, CliError};
use raritygen::{
    distribution_error, fingerprint, generate, load_catalog, write_combinations_csv,
    write_combinations_json, write_ledger_csv, Config, CsvTableLoader, FeatureCatalog,
};

#[derive(Parser)]
#[command(name = "raritygen", about = "Generate trait combinations fitting a rarity table")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print features, trait counts and the number of possible combinations
    Inspect(TableArgs),
    /// Generate combinations
    Generate(GenerateArgs),
    /// Print the distribution error of a generated sequence as JSON
    Report(ReportArgs),
}

#[derive(clap::Args)]
struct TableArgs {
    /// Rarity table CSV
    table: PathBuf,
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct GenerateArgs {
    #[command(flatten)]
    table: TableArgs,
    /// Number of combinations, -1 for all possible
    #[arg(short = 'n', long, default_value_t = -1, allow_negative_numbers = true)]
    count: i64,
    /// Output file, stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    /// Write the final ledger snapshot as CSV
    #[arg(long)]
    ledger: Option<PathBuf>,
    /// Show a progress bar
    #[arg(long)]
    progress: bool,
}

#[derive(clap::Args)]
struct ReportArgs {
    #[command(flatten)]
    table: TableArgs,
    /// Number of combinations, -1 for all possible
    #[arg(short = 'n', long, default_value_t = -1, allow_negative_numbers = true)]
    count: i64,
    /// Number of points in the series, defaults to the configured checkpoints
    #[arg(long)]
    points: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Inspect(args) => inspect(&args),
        Command::Generate(args) => run_generate(&args),
        Command::Report(args) => report(&args),
    }
}

fn load(args: &TableArgs) -> Result<(Config, FeatureCatalog), CliError> {
    let config = match &args.config {
        Some(path) => Config::load(path).map_err(|e| rarity_cli_error("loading config", e))?,
        None => Config::default(),
    };
    let loader = CsvTableLoader::new(&args.table, &config.table)
        .map_err(|e| rarity_cli_error("opening table", e))?;
    let catalog =
        load_catalog(&loader, &config).map_err(|e| rarity_cli_error("loading table", e))?;
    Ok((config, catalog))
}

fn inspect(args: &TableArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (_, catalog) = load(args)?;
    for feature in catalog.features() {
        println!("{}: {} traits", feature.name, feature.traits.len());
    }
    match catalog.max_combinations() {
        Some(max) => println!("possible combinations: {max}"),
        None => println!("possible combinations: too many to count"),
    }
    Ok(())
}

fn run_generate(args: &GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (mut config, catalog) = load(&args.table)?;
    config.generation.progress |= args.progress;

    let generation = generate(&catalog, args.count, &config)
        .map_err(|e| rarity_cli_error("generating combinations", e))?;

    let write = |writer: &mut dyn Write| match args.format {
        Format::Json => write_combinations_json(writer, &catalog, &generation.combinations),
        Format::Csv => write_combinations_csv(writer, &catalog, &generation.combinations),
    };
    match &args.output {
        Some(path) => {
            let mut file = create(path)?;
            write(&mut file).map_err(|e| rarity_cli_error("writing combinations", e))?;
            file.flush().map_err(|e| io_cli_error("writing", path, e))?;
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write(&mut lock).map_err(|e| rarity_cli_error("writing combinations", e))?;
            // The JSON writer leaves the closing brace without a newline.
            if let Format::Json = args.format {
                writeln!(lock)?;
            }
        }
    }

    if let Some(path) = &args.ledger {
        let mut file = create(path)?;
        write_ledger_csv(&mut file, &generation.ledger.snapshot())
            .map_err(|e| rarity_cli_error("writing ledger", e))?;
        file.flush().map_err(|e| io_cli_error("writing", path, e))?;
    }

    log::info!(
        "{} of {} combinations, fingerprint {}",
        generation.len(),
        generation.max_combinations,
        fingerprint(&catalog, &generation.combinations)
    );
    Ok(())
}

fn report(args: &ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, catalog) = load(&args.table)?;
    let points = args.points.unwrap_or(config.generation.checkpoints);
    if points == 0 {
        return Err(simple_cli_error("--points must be at least 1").into());
    }
    let generation = generate(&catalog, args.count, &config)
        .map_err(|e| rarity_cli_error("generating combinations", e))?;
    let series = distribution_error(&catalog, &generation.combinations, points);
    println!("{}", serde_json::to_string_pretty(&series)?);
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, CliError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| io_cli_error("creating", path, e))
}
