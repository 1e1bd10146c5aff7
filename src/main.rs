//! m2index - local real-estate price-per-m² index
//!
//! A CLI tool that records property listings, derives the price per m²
//! of each one, and judges it against the other listings of the same
//! condominium.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid input, malformed import, store failure, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod store;

use anyhow::{Context, Result};
use chrono::Local;
use cli::{Args, Command, Mode, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use models::{ListingRecord, NewListing};
use report::{ChartSeries, RenderOptions};
use std::path::{Path, PathBuf};
use store::{JsonFileStore, ListingBook};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if args.command == Command::InitConfig {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("m2index v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Command failed: {}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .m2index.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Set [general] responsible to your name before adding listings.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: tracing subscriber already set");
    }
}

/// Load configuration, open the store and dispatch the command.
fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let store = JsonFileStore::new(&config.store.path);
    info!("Using store: {}", store.path().display());
    // Import replaces the collection, so a corrupt store must not block it.
    let mut book = match args.command {
        Command::Import { .. } => ListingBook::unloaded(store),
        _ => ListingBook::open(store)
            .with_context(|| format!("Failed to open listing store {}", config.store.path))?,
    };

    let result = match args.command {
        Command::Add {
            condominium,
            neighborhood,
            area,
            price,
        } => handle_add(
            &mut book,
            &config,
            NewListing {
                condominium,
                neighborhood,
                area,
                price,
            },
        ),
        Command::Remove { id } => {
            let removed = book.delete(&id)?;
            println!("🗑️  Removed listing {} ({})", id, removed.condominium);
            Ok(())
        }
        Command::Favorite { id } => {
            let favorite = book.toggle_favorite(&id)?;
            let marker = if favorite { "★ Favorite" } else { "☆ Not favorite" };
            println!("{} {}", marker, id);
            Ok(())
        }
        Command::List { search } => {
            handle_list(book.records(), &search, &config);
            Ok(())
        }
        Command::Search { query } => {
            handle_search(book.records(), &query, &config);
            Ok(())
        }
        Command::Summary => {
            handle_summary(book.records(), &config);
            Ok(())
        }
        Command::Ranking => {
            handle_ranking(book.records(), &config);
            Ok(())
        }
        Command::Opportunities => {
            handle_opportunities(book.records(), &config);
            Ok(())
        }
        Command::Report { id, output, format } => {
            handle_report(&book, &id, output, format, &config)
        }
        Command::Export { output } => handle_export(&book, output.as_deref()),
        Command::Import { file } => handle_import(&mut book, &file),
        Command::InitConfig => handle_init_config(),
    };

    debug!("Listing book at revision {}", book.revision());
    result
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

fn money(config: &Config, value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{} {:.*}", config.report.currency, decimals, v),
        None => "n/a".to_string(),
    }
}

fn handle_add(
    book: &mut ListingBook<JsonFileStore>,
    config: &Config,
    input: NewListing,
) -> Result<()> {
    let today = Local::now().date_naive();
    let record = book.create(input, &config.general.responsible, today)?;

    println!(
        "✅ Saved listing {} in {}",
        record.id.as_deref().unwrap_or("-"),
        record.condominium
    );
    println!("   Value per m²: {}", money(config, record.unit_value, 2));
    Ok(())
}

fn print_overall(records: &[ListingRecord], config: &Config) {
    if let Some(summary) = analysis::overall_summary(records) {
        println!(
            "📊 Overall average: {}/m² | Records: {} | Updated: {}",
            money(config, summary.average, 0),
            summary.count,
            summary
                .most_recent_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
}

fn print_search_summary(records: &[ListingRecord], query: &str, config: &Config) -> bool {
    let Some(summary) = analysis::search_summary(records, query) else {
        return false;
    };

    println!("\n🏢 {}", summary.name);
    println!("   Average: {}/m²", money(config, summary.average, 0));
    println!("   Records: {}", summary.count);
    if let Some(trend) = summary.trend {
        println!("   Trend: {:.1}%", trend);
    }

    if let Some(chart) = ChartSeries::from_points(analysis::search_series(records, query)) {
        println!(
            "   History: {} ({} → {})",
            report::generator::sparkline(&chart),
            money(config, chart.points().first().map(|p| p.unit_value), 0),
            money(config, chart.points().last().map(|p| p.unit_value), 0)
        );
    }

    true
}

fn handle_list(records: &[ListingRecord], search: &str, config: &Config) {
    print_overall(records, config);
    print_search_summary(records, search, config);

    let listings = analysis::filter_listings(records, search);
    if listings.is_empty() {
        println!("\n   No listings found.");
        return;
    }

    println!();
    for record in listings {
        let diagnosis = analysis::classify(records, record);

        println!(
            "{} {} - {} [{}]",
            diagnosis.tone.emoji(),
            record.condominium,
            record.neighborhood,
            diagnosis.position.tag()
        );
        println!("   m²: {}", money(config, record.unit_value, 2));
        println!(
            "   Condominium average: {}",
            money(config, analysis::group_average(records, &record.condominium), 2)
        );
        if let Some(trend) = analysis::trend(records, &record.condominium) {
            println!("   Trend: {:.1}%", trend);
        }
        println!("   {}", diagnosis.label);

        if config.general.mode == Mode::Admin {
            println!(
                "   id: {} | {} | by {}",
                record.id.as_deref().unwrap_or("-"),
                if record.favorite { "★ Favorite" } else { "☆" },
                record.responsible
            );
        }
    }
}

fn handle_search(records: &[ListingRecord], query: &str, config: &Config) {
    if !print_search_summary(records, query, config) {
        println!("No condominium matches '{}'.", query);
    }
}

fn handle_summary(records: &[ListingRecord], config: &Config) {
    if analysis::overall_summary(records).is_none() {
        println!("No listings recorded yet.");
        return;
    }
    print_overall(records, config);
}

fn handle_ranking(records: &[ListingRecord], config: &Config) {
    let ranking = analysis::rank_groups(records);
    if ranking.is_empty() {
        println!("No condominium has priced listings yet.");
        return;
    }

    println!("🏆 Ranking by m²\n");
    for (i, group) in ranking.iter().enumerate() {
        println!("{}. {}", i + 1, group.name);
        println!("   Average: {}/m²", money(config, Some(group.average), 0));
        println!("   Records: {}", group.count);
    }
}

fn handle_opportunities(records: &[ListingRecord], config: &Config) {
    println!("🔵 Opportunities\n");

    let found = analysis::opportunities(records);
    if found.is_empty() {
        println!("   None yet");
        return;
    }

    for record in found {
        println!("{} - {}", record.condominium, record.neighborhood);
        println!("   m²: {}", money(config, record.unit_value, 2));
    }
}

fn handle_report(
    book: &ListingBook<JsonFileStore>,
    id: &str,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    config: &Config,
) -> Result<()> {
    let record = book
        .get(id)
        .ok_or_else(|| error::MarketError::NotFound(id.to_string()))?;

    let responsible = if config.general.responsible.trim().is_empty() {
        record.responsible.as_str()
    } else {
        config.general.responsible.as_str()
    };

    let content = report::synthesize_report(
        record,
        book.records(),
        responsible,
        Local::now().date_naive(),
    );

    let format = format.unwrap_or(config.report.format);
    let rendered = match format {
        OutputFormat::Json => report::generate_json_report(&content)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&content, &RenderOptions::from(&config.report))
        }
    };

    let path = output.unwrap_or_else(|| PathBuf::from(&config.report.output));
    report::write_report(&rendered, &path)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    if let Some(position) = content.position {
        println!("{} {}", position.tone().emoji(), position.label());
    }
    println!("✅ Report saved to: {}", path.display());
    Ok(())
}

fn handle_export(book: &ListingBook<JsonFileStore>, output: Option<&Path>) -> Result<()> {
    let json = book.export_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write backup to {}", path.display()))?;
            println!(
                "✅ Exported {} listings to {}",
                book.records().len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn handle_import(book: &mut ListingBook<JsonFileStore>, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read backup {}", file.display()))?;

    let count = book.import_json(&text)?;
    println!("✅ Restored {} listings from {}", count, file.display());
    Ok(())
}
