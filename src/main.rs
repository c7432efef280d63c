use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use worldjson::api::{Resolution, source_for};
use worldjson::config::{CliOverrides, FileConfig, ResolvedConfig, resolve};
use worldjson::error::BuildError;
use worldjson::pipeline::Pipeline;
use worldjson::synth::Locale;

/// Build an enriched world.json from public country boundaries
///
/// Every country keeps its full boundary geometry and gets synthetic
/// placeholder properties: name, population, gdp, waterScore,
/// waterResources and center [lat, lon].
///
/// Examples:
///   # High resolution (1:50m) into world.json
///   worldjson
///
///   # Medium resolution with English descriptions
///   worldjson --scale 110 --locale en -o world-110m.json
///
///   # Always download, ignoring any cached copy
///   worldjson --no-cache
#[derive(Parser, Debug)]
#[command(name = "worldjson")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches worldjson.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dataset scale: 50 (high) or 110 (medium) [default: 50]
    #[arg(short = 's', long)]
    scale: Option<Resolution>,

    /// Output file [default: world.json]
    #[arg(short = 'o', long)]
    out: Option<PathBuf>,

    /// Directory searched for a cached copy of the dataset
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Skip the local cache and always download
    #[arg(long)]
    no_cache: bool,

    /// Language of the waterResources text [default: tr]
    #[arg(long)]
    locale: Option<Locale>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let build_error = e.downcast_ref::<BuildError>();
            if build_error.is_some_and(BuildError::is_fetch_failure) {
                eprintln!("Download failed. Are you online?");
            }
            eprintln!("Error: {:#}", e);
            ExitCode::from(build_error.map(BuildError::exit_code).unwrap_or(1))
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(args: Args) -> Result<()> {
    let total_start = Instant::now();

    let file_config = match args.config {
        Some(ref path) => Some(FileConfig::from_path(path).context("Failed to load config")?),
        None => FileConfig::load(),
    };
    let overrides = CliOverrides {
        scale: args.scale,
        out: args.out.clone(),
        cache_dir: args.cache_dir.clone(),
        no_cache: args.no_cache,
        locale: args.locale,
        verbose: args.verbose,
    };
    let ResolvedConfig {
        resolution,
        output: output_path,
        verbose,
        source: source_config,
        enrich: enrich_config,
    } = resolve(&overrides, file_config.unwrap_or_default());
    source_config.validate()?;

    println!("worldjson - Enriched World GeoJSON Builder");
    println!("==========================================");
    println!();

    if verbose {
        println!("Configuration:");
        println!("  Scale: {}m", resolution.scale());
        println!("  Source URL: {}", source_config.url_for(resolution));
        if source_config.use_cache {
            println!(
                "  Cache file: {}",
                source_config.cache_path(resolution).display()
            );
        } else {
            println!("  Cache file: disabled");
        }
        println!("  Timeout: {}s", source_config.timeout_secs);
        println!("  Name keys: {}", enrich_config.names.keys.join(", "));
        println!(
            "  Hash: {:?} (version {})",
            enrich_config.synth.hash,
            enrich_config.synth.hash.version()
        );
        println!("  Locale: {:?}", enrich_config.locale);
        println!("  Output: {}", output_path.display());
        println!();
    }

    let pipeline = Pipeline::new(&enrich_config);
    let source = source_for(&source_config, resolution);

    let spinner = create_spinner(&format!(
        "Loading world data ({}m) from {}...",
        resolution.scale(),
        source.describe()
    ));
    let start = Instant::now();
    let features = match pipeline.load(source.as_ref()) {
        Ok(features) => features,
        Err(e) => {
            spinner.abandon_with_message("Loading world data failed");
            return Err(e.into());
        }
    };
    spinner.finish_with_message(format!(
        "Loaded {} features [{:.1}s]",
        features.len(),
        start.elapsed().as_secs_f32()
    ));

    let spinner = create_spinner("Enriching features...");
    let start = Instant::now();
    let collection = pipeline.enrich(features);
    spinner.finish_with_message(format!(
        "Enriched {} features [{:.1}s]",
        collection.len(),
        start.elapsed().as_secs_f32()
    ));

    let spinner = create_spinner("Writing output...");
    let start = Instant::now();
    let summary = pipeline
        .write(&output_path, &collection)
        .context("Failed to write output file")?;
    spinner.finish_with_message(format!(
        "Wrote {} bytes [{:.1}s]",
        summary.bytes,
        start.elapsed().as_secs_f32()
    ));

    println!();
    println!(
        "Done. Wrote {} ({:.2} MB).",
        summary.path.display(),
        summary.megabytes()
    );
    println!(
        "{} features in {:.1}s",
        summary.features,
        total_start.elapsed().as_secs_f32()
    );

    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
