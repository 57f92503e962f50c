//! Euraxess-Harvest main entry point
//!
//! This is the command-line interface for harvesting research job postings
//! and browsing them.

use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use euraxess_harvest::config::{load_config_with_hash, Config};
use euraxess_harvest::crawler::{plan_harvest, run_harvest};
use euraxess_harvest::dashboard::{
    export_markdown, load_dashboard_data, narrow, paginate, render_table, DashboardStats,
    DeadlineWindow, FilterOptions, JobFilter, JobRow,
};
use euraxess_harvest::favorites::{FavoritesFile, Toggled};
use euraxess_harvest::storage::CsvStore;
use euraxess_harvest::CareerStage;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Euraxess-Harvest: an incremental research-jobs harvester
///
/// Euraxess-Harvest walks the research-jobs listing newest first, appends
/// postings it has not seen to a CSV store, and lets you filter, browse and
/// bookmark the open positions.
#[derive(Parser, Debug)]
#[command(name = "euraxess-harvest")]
#[command(version)]
#[command(about = "An incremental research-jobs harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Harvest new postings into the job store
    Crawl {
        /// Show where the harvest would start without fetching anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show open jobs matching the filters
    Jobs(JobsArgs),

    /// List the values each filter accepts
    Options {
        /// Only list countries containing this text
        #[arg(long)]
        country_search: Option<String>,

        /// Only list fields containing this text
        #[arg(long)]
        field_search: Option<String>,

        /// Only list sub-fields containing this text
        #[arg(long)]
        sub_field_search: Option<String>,
    },

    /// Show dashboard metrics
    Stats,

    /// Manage favourite jobs
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },
}

#[derive(Args, Debug)]
struct JobsArgs {
    /// Keep jobs in this country (repeatable)
    #[arg(long = "country", value_name = "COUNTRY")]
    countries: Vec<String>,

    /// Keep jobs open to this career stage, R1-R4 (repeatable)
    #[arg(long = "profile", value_name = "STAGE")]
    profiles: Vec<CareerStage>,

    /// Keep jobs in this main research field (repeatable)
    #[arg(long = "field", value_name = "FIELD")]
    fields: Vec<String>,

    /// Keep jobs in this research sub-field (repeatable)
    #[arg(long = "sub-field", value_name = "SUB_FIELD")]
    sub_fields: Vec<String>,

    /// Keep jobs funded by this programme (repeatable)
    #[arg(long = "funding", value_name = "PROGRAMME")]
    funding_programs: Vec<String>,

    /// Only show favourite jobs
    #[arg(long)]
    favorites_only: bool,

    /// Search titles and descriptions
    #[arg(long)]
    search: Option<String>,

    /// Deadline window: within-month, within-quarter or none
    #[arg(long)]
    deadline: Option<DeadlineWindow>,

    /// Earliest posting date (YYYY-MM-DD)
    #[arg(long)]
    posted_from: Option<NaiveDate>,

    /// Latest posting date (YYYY-MM-DD)
    #[arg(long)]
    posted_to: Option<NaiveDate>,

    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Jobs per page
    #[arg(long, default_value_t = 50)]
    page_size: usize,

    /// Also write every matching job to a markdown file
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,
}

impl JobsArgs {
    fn filter(&self) -> JobFilter {
        JobFilter {
            countries: self.countries.clone(),
            profiles: self.profiles.clone(),
            fields: self.fields.clone(),
            sub_fields: self.sub_fields.clone(),
            favorites_only: self.favorites_only,
            search_term: self.search.clone(),
            funding_programs: self.funding_programs.clone(),
            deadline_window: self.deadline,
            posted_from: self.posted_from,
            posted_to: self.posted_to,
        }
    }
}

#[derive(Subcommand, Debug)]
enum FavoriteAction {
    /// Add the job if it is not a favourite, remove it otherwise
    Toggle { id: String },

    /// Set the favourite flag of a job explicitly
    Set {
        id: String,

        #[arg(long, conflicts_with = "off", required_unless_present = "off")]
        on: bool,

        #[arg(long)]
        off: bool,
    },

    /// List favourite job ids
    List,

    /// Remove every favourite
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::debug!("Configuration loaded (hash: {})", config_hash);

    match cli.command {
        Command::Crawl { dry_run: true } => handle_dry_run(&config),
        Command::Crawl { dry_run: false } => handle_crawl(&config).await,
        Command::Jobs(args) => handle_jobs(&config, &args),
        Command::Options {
            country_search,
            field_search,
            sub_field_search,
        } => handle_options(
            &config,
            country_search.as_deref().unwrap_or(""),
            field_search.as_deref().unwrap_or(""),
            sub_field_search.as_deref().unwrap_or(""),
        ),
        Command::Stats => handle_stats(&config),
        Command::Favorite { action } => handle_favorite(&config, action),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("euraxess_harvest=info,warn"),
            1 => EnvFilter::new("euraxess_harvest=debug,info"),
            2 => EnvFilter::new("euraxess_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn load_rows(config: &Config) -> anyhow::Result<Vec<JobRow>> {
    let store = CsvStore::new(&config.output.store_path);
    Ok(load_dashboard_data(&store, now())?)
}

/// Handles `crawl --dry-run`: shows where the harvest would start
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let plan = plan_harvest(config)?;
    plan.print();
    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main harvest operation
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting harvest of {}{}",
        config.crawler.base_url,
        config.crawler.listing_path
    );

    match run_harvest(config).await {
        Ok(report) => {
            report.print();
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles `jobs`: prints one page of the filtered table
fn handle_jobs(config: &Config, args: &JobsArgs) -> anyhow::Result<()> {
    let rows = load_rows(config)?;
    let favorites = FavoritesFile::new(&config.output.favorites_path).load_or_default();

    let filtered = args.filter().apply(&rows, &favorites, now());

    if let Some(path) = &args.export {
        export_markdown(&filtered, &favorites, path)?;
        println!("✓ Exported {} jobs to: {}", filtered.len(), path.display());
    }

    let page = paginate(&filtered, args.page_size, args.page);
    print!("{}", render_table(page.items, &favorites));
    println!(
        "\nPage {} of {} ({} matching jobs, {} open in total)",
        page.page,
        page.total_pages,
        page.total_items,
        rows.len()
    );

    Ok(())
}

/// Handles `options`: lists the filter choices
fn handle_options(
    config: &Config,
    country_search: &str,
    field_search: &str,
    sub_field_search: &str,
) -> anyhow::Result<()> {
    let rows = load_rows(config)?;
    let options = FilterOptions::from_rows(&rows);

    print_options("Countries", &narrow(&options.countries, country_search));
    let profiles: Vec<&str> = options.profiles.iter().map(|stage| stage.code()).collect();
    print_options("Profiles", &profiles);
    print_options("Fields", &narrow(&options.fields, field_search));
    print_options("Sub-fields", &narrow(&options.sub_fields, sub_field_search));
    print_options("Funding programmes", &narrow(&options.funding_programs, ""));

    Ok(())
}

fn print_options(title: &str, values: &[&str]) {
    println!("{} ({}):", title, values.len());
    for value in values {
        println!("  - {}", value);
    }
    println!();
}

/// Handles `stats`: shows the dashboard metrics
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let rows = load_rows(config)?;
    let favorites = FavoritesFile::new(&config.output.favorites_path).load_or_default();

    println!("Store: {}\n", config.output.store_path);
    DashboardStats::compute(&rows, now()).print(favorites.len());

    Ok(())
}

/// Handles `favorite`: edits the favourites file
fn handle_favorite(config: &Config, action: FavoriteAction) -> anyhow::Result<()> {
    let file = FavoritesFile::new(&config.output.favorites_path);

    match action {
        FavoriteAction::Toggle { id } => match file.toggle(&id)? {
            Toggled::Added => println!("★ Added {} to favorites", id),
            Toggled::Removed => println!("Removed {} from favorites", id),
        },
        FavoriteAction::Set { id, on, .. } => {
            if file.set(&id, on)? {
                println!("✓ Updated {}", id);
            } else {
                println!("{} was already {}", id, if on { "a favorite" } else { "not a favorite" });
            }
        }
        FavoriteAction::List => {
            let favorites = file.load()?;
            println!("Favorites ({}):", favorites.len());
            for id in favorites.iter() {
                println!("  - {}", id);
            }
        }
        FavoriteAction::Clear => {
            file.clear()?;
            println!("✓ Cleared all favorites");
        }
    }

    Ok(())
}
