//! # Docket Search CLI (`dockets`)
//!
//! The `dockets` binary is the primary interface for Docket Search. It
//! provides commands for schema initialization and for running ranked
//! docket searches against the configured OpenSearch and Postgres
//! backends.
//!
//! ## Usage
//!
//! ```bash
//! dockets --config ./config/dockets.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dockets init` | Create the relational schema and stored-results table |
//! | `dockets search "<term>"` | Run a docket search and print one result page |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the schema
//! dockets init --config ./config/dockets.toml
//!
//! # Fresh search, first page
//! dockets search "National"
//!
//! # Filtered search keyed to a session
//! dockets search "emissions" --agency EPA --session review-42
//!
//! # Page through previously stored results
//! dockets search "National" --cached --page 1
//!
//! # Machine-readable output
//! dockets search "National" --json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docket_search::config;
use docket_search::credentials;
use docket_search::db;
use docket_search::migrate;
use docket_search::models::{DateRange, FilterParams, SearchRequest, SortParams, SortType};
use docket_search::search;

/// Docket Search CLI — ranked full-text search over regulatory dockets.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/dockets.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "dockets",
    about = "Docket Search — ranked full-text search over regulatory dockets",
    version,
    long_about = "Docket Search aggregates per-docket matches for a search term across the \
    comment and attachment-text indexes, enriches the matches from a mirrored relational \
    schema, scores and orders them, and stores the ranked set per session so repeat \
    requests can page through cached results."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/dockets.toml`. Credential source, OpenSearch,
    /// and Postgres settings are read from this file.
    #[arg(long, global = true, default_value = "./config/dockets.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v = debug, -vv = trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the mirrored docket tables (dockets, agencies, documents,
    /// abstracts, htm_summaries) and the stored_results table backing the
    /// result cache. This command is idempotent — running it multiple
    /// times is safe.
    Init,

    /// Search dockets by term.
    ///
    /// Aggregates per-docket matches across the comment and
    /// attachment-text indexes, enriches from Postgres, and prints one
    /// ranked page. With `--cached`, serves the page from results stored
    /// by a previous refresh of the same term/session/sort/filter
    /// combination instead of re-querying the index.
    Search {
        /// The search term (matched as a phrase).
        term: String,

        /// 0-based page number.
        #[arg(long, default_value_t = 0)]
        page: usize,

        /// Serve from stored results instead of refreshing.
        #[arg(long)]
        cached: bool,

        /// Session identifier; part of the stored-result key.
        #[arg(long, default_value = "session1")]
        session: String,

        /// Nominal sort type recorded in the result key:
        /// `dateModified`, `alphaByTitle`, or `relevance`.
        #[arg(long, default_value = "dateModified", value_parser = search::parse_sort_type)]
        sort: SortType,

        /// Record ascending sort order in the result key.
        #[arg(long)]
        asc: bool,

        /// Agency id recorded in the filter key; repeatable.
        #[arg(long = "agency")]
        agencies: Vec<String>,

        /// Filter window start (RFC 3339), recorded in the result key.
        #[arg(long, default_value = "1970-01-01T00:00:00Z", value_parser = search::parse_filter_date)]
        date_start: String,

        /// Filter window end (RFC 3339), recorded in the result key.
        #[arg(long, default_value = "", value_parser = search::parse_filter_date)]
        date_end: String,

        /// Docket type recorded in the filter key (e.g. `Rulemaking`).
        #[arg(long, default_value = "")]
        docket_type: String,

        /// Print the full response as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DOCKETS_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let source = credentials::create_credential_source(&cfg)?;
            let pool = db::connect(&cfg, &source.postgres()?).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Search {
            term,
            page,
            cached,
            session,
            sort,
            asc,
            agencies,
            date_start,
            date_end,
            docket_type,
            json,
        } => {
            let request = SearchRequest {
                search_term: term,
                page_number: page,
                refresh_results: !cached,
                session_id: session,
                sort_params: SortParams {
                    sort_type: sort,
                    desc: !asc,
                },
                filter_params: FilterParams {
                    agencies,
                    date_range: DateRange {
                        start: date_start,
                        end: date_end,
                    },
                    docket_type,
                },
            };

            search::run_search(&cfg, &request, json).await?;
        }
    }

    Ok(())
}
