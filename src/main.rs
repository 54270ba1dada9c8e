use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use elsevier_client::api::{ElsevierClient, Provider, SearchOptions};
use elsevier_client::config::{
    find_config_file, load_config, write_default_config, Config, ItemFailurePolicy,
};
use elsevier_client::models::{Entry, SearchFilter};
use elsevier_client::utils::read_entries;
use is_terminal::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Elsevier Client - Search Scopus / ScienceDirect, enrich results with PlumX metrics, download figures
#[derive(Parser, Debug)]
#[command(name = "elsevier-client")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search Elsevier databases, enrich results with PlumX metrics and download article objects", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root directory for result files (overrides configuration)
    #[arg(long, global = true)]
    results_dir: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
}

/// Search database
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Database {
    #[value(name = "scopus")]
    Scopus,
    #[value(name = "sciencedirect", alias = "scidir")]
    ScienceDirect,
}

impl From<Database> for Provider {
    fn from(db: Database) -> Self {
        match db {
            Database::Scopus => Provider::Scopus,
            Database::ScienceDirect => Provider::ScienceDirect,
        }
    }
}

/// Per-object download failure handling
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OnFailure {
    /// Log and continue with the next object
    Skip,
    /// Stop downloading remaining objects of the same kind
    Abort,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search Scopus or ScienceDirect and save the results
    #[command(alias = "s")]
    Search {
        /// Title keyword (repeatable; all must match)
        #[arg(long = "keyword", short = 'k')]
        keywords: Vec<String>,

        /// Scopus subject-area code, e.g. MEDI (repeatable; Scopus only)
        #[arg(long = "subject", short = 's')]
        subjects: Vec<String>,

        /// Scopus author ID (repeatable; Scopus only)
        #[arg(long = "author-id")]
        author_ids: Vec<String>,

        /// Author name (repeatable)
        #[arg(long = "author", short = 'a')]
        authors: Vec<String>,

        /// Year range, e.g. "2020-2025"
        #[arg(long, short = 'd')]
        date_range: Option<String>,

        /// Database to search
        #[arg(long, short = 'p', value_enum, default_value_t = Database::ScienceDirect)]
        provider: Database,

        /// Stop after this many results (default from configuration)
        #[arg(long, short = 'm', conflicts_with = "all")]
        max_results: Option<usize>,

        /// Fetch every page regardless of the result cap
        #[arg(long)]
        all: bool,

        /// Also save results as CSV
        #[arg(long)]
        csv: bool,

        /// Seconds to wait between pages (default from configuration)
        #[arg(long)]
        delay: Option<f64>,
    },

    /// Add PlumX policy-citation and news-mention counts to saved search results
    #[command(alias = "m")]
    Metrics {
        /// JSON file written by `search`
        input: PathBuf,

        /// Do not write the CSV output file
        #[arg(long)]
        no_save: bool,
    },

    /// Download high-resolution figures (and optionally manuscripts) for an article
    #[command(alias = "o")]
    Objects {
        /// Article DOI
        doi: String,

        /// Also download author-manuscript PDFs
        #[arg(long)]
        manuscripts: bool,

        /// What to do when one download fails (default from configuration)
        #[arg(long, value_enum)]
        on_failure: Option<OnFailure>,
    },

    /// Write a default configuration file
    InitConfig {
        /// Where to write it
        #[arg(default_value = "elsevier-client.toml")]
        path: PathBuf,
    },
}

/// Print all available environment variables
fn print_env_vars() {
    println!("Elsevier Client - Environment Variables");
    println!();
    println!("Credentials:");
    println!("  ELSEVIER_API_KEY            Elsevier API key (required for API calls)");
    println!("  ELSEVIER_INST_TOKEN         Institutional token (optional)");
    println!();
    println!("Configuration Overrides:");
    println!("  ELSEVIER_CLIENT_API__BASE_URL");
    println!("      API host (default: https://api.elsevier.com)");
    println!("  ELSEVIER_CLIENT_API__TIMEOUT_SECS");
    println!("      Request timeout in seconds (default: 30)");
    println!("  ELSEVIER_CLIENT_SEARCH__PAGE_DELAY_SECS");
    println!("      Pause between result pages (default: 5.0)");
    println!("  ELSEVIER_CLIENT_SEARCH__MAX_RESULTS");
    println!("      Result cap, 0 for none (default: 50)");
    println!("  ELSEVIER_CLIENT_SEARCH__SAVE_CSV");
    println!("      Also write CSV (default: false)");
    println!("  ELSEVIER_CLIENT_OUTPUT__RESULTS_DIR");
    println!("      Result directory (default: ./results)");
    println!("  ELSEVIER_CLIENT_DOWNLOADS__ON_ITEM_FAILURE");
    println!("      skip or abort (default: skip)");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export ELSEVIER_API_KEY=\"your-key-here\"");
    println!("  elsevier-client search -p scopus -k \"meta-analysis\" -s MEDI --csv");
    std::process::exit(0);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
    }

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("elsevier_client={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(command) = cli.command else {
        println!("Elsevier Client v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Run 'elsevier-client --help' for usage information.");
        println!();
        println!("Commands:");
        println!("  search           - Search Scopus / ScienceDirect");
        println!("  metrics <file>   - Add PlumX counts to saved results");
        println!("  objects <doi>    - Download article figures and manuscripts");
        println!("  init-config      - Write a default configuration file");
        return Ok(());
    };

    if let Commands::InitConfig { path } = &command {
        write_default_config(path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let mut config = resolve_config(cli.config.as_deref())?;
    if let Some(dir) = &cli.results_dir {
        config.output.results_dir = dir.clone();
    }

    if !config.credentials.has_api_key() {
        tracing::warn!("ELSEVIER_API_KEY is not set; requests will be rejected by the API");
    }

    match command {
        Commands::Search {
            keywords,
            subjects,
            author_ids,
            authors,
            date_range,
            provider,
            max_results,
            all,
            csv,
            delay,
        } => {
            if let Some(delay) = delay {
                config.search.page_delay_secs = delay;
            }
            let client = ElsevierClient::from_config(&config)?;

            let filter = SearchFilter {
                keywords,
                subjects,
                author_ids,
                authors,
                date_range,
            };

            let mut options = SearchOptions::from(&config.search);
            if all {
                options.max_results = None;
            } else if let Some(max) = max_results {
                options.max_results = Some(max);
            }
            options.save_csv = options.save_csv || csv;

            let entries = client.search(provider.into(), &filter, &options).await?;
            if !cli.quiet {
                eprintln!("Found {} entries", entries.len());
            }
            output_entries(&entries, cli.output)?;
        }

        Commands::Metrics { input, no_save } => {
            let client = ElsevierClient::from_config(&config)?;
            let entries = read_entries(&input)
                .with_context(|| format!("Failed to read entries from {}", input.display()))?;
            let enriched = client.plumx_metrics(entries, !no_save).await?;
            output_entries(&enriched, cli.output)?;
        }

        Commands::Objects {
            doi,
            manuscripts,
            on_failure,
        } => {
            if let Some(policy) = on_failure {
                config.downloads.on_item_failure = match policy {
                    OnFailure::Skip => ItemFailurePolicy::Skip,
                    OnFailure::Abort => ItemFailurePolicy::Abort,
                };
            }
            let client = ElsevierClient::from_config(&config)?;
            let report = client.retrieve_objects(&doi, manuscripts).await?;

            if !cli.quiet {
                eprintln!(
                    "Saved {} graphics and {} manuscripts for {} ({} failed)",
                    report.graphics.len(),
                    report.manuscripts.len(),
                    report.doi,
                    report.failures
                );
            }
            for path in report.graphics.iter().chain(report.manuscripts.iter()) {
                println!("{}", path.display());
            }
        }

        Commands::InitConfig { .. } => unreachable!(),
    }

    Ok(())
}

fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(config_path) = explicit {
        return load_config(Some(config_path)).context("Failed to load configuration");
    }
    if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        return load_config(Some(&config_path)).context("Failed to load configuration");
    }
    load_config(None).context("Failed to load configuration")
}

fn output_entries(entries: &[Entry], format: OutputFormat) -> Result<()> {
    let actual_format = if format == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    };

    match actual_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entries)?);
        }
        OutputFormat::Table => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);

            let with_counters = entries.iter().any(Entry::has_counters);
            let mut header = vec!["DOI", "Title", "Publication", "Date"];
            if with_counters {
                header.extend(["Policy", "News"]);
            }
            table.set_header(header);

            for entry in entries {
                let mut row = vec![
                    Cell::new(entry.doi().unwrap_or_default()),
                    Cell::new(truncate(entry.title().unwrap_or_default(), 50))
                        .add_attribute(Attribute::Bold),
                    Cell::new(truncate(entry.publication_name().unwrap_or_default(), 30)),
                    Cell::new(entry.cover_date().unwrap_or_default()),
                ];
                if with_counters {
                    row.push(Cell::new(counter_cell(entry.policy_citation_count())));
                    row.push(Cell::new(counter_cell(entry.news_mentions())));
                }
                table.add_row(row);
            }
            println!("{table}");
        }
        OutputFormat::Auto => unreachable!(),
    }

    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn counter_cell(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
