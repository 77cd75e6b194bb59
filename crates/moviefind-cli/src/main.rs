//! moviefind - terminal movie browser with debounced search.

/// Application configuration (TOML).
mod config;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{AppConfig, resolve_config_path, resolve_log_path};
use moviefind_api::appwrite::{AppwriteClient, LocalAnalyticsStore, TrendingEntry};
use moviefind_api::tmdb::{Movie, MovieRequest, TmdbClient, fetch_movies};
use moviefind_tui::{BrowserOptions, run_browser};

/// User agent sent to both services.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// CLI argument parser.
#[derive(Parser)]
#[command(name = "moviefind", about, version)]
struct Cli {
    /// Override config/log directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Browse and search movies interactively.
    Browse,
    /// List popular movies.
    Popular,
    /// Search movies by title.
    Search(SearchArgs),
    /// Show the most searched queries.
    Trending(TrendingArgs),
    /// Print shell completions.
    Completions(CompletionsArgs),
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search query (e.g. "batman").
    #[arg(long, required = true)]
    query: String,
    /// Record the top result in the search analytics store.
    #[arg(long)]
    record: bool,
}

/// Arguments for the `trending` subcommand.
#[derive(clap::Args)]
struct TrendingArgs {
    /// Number of entries (default: `search.trending_limit` from config).
    #[arg(long)]
    limit: Option<u32>,
}

/// Arguments for the `completions` subcommand.
#[derive(clap::Args)]
struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum)]
    shell: Shell,
}

/// Builds the TMDB client from config and `TMDB_API_TOKEN`.
///
/// A missing token is not fatal: requests go out with an empty bearer
/// token and fail with HTTP 401 through the normal error path.
///
/// # Errors
///
/// Returns an error if the configured base URL is invalid or the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client(config: &AppConfig) -> Result<TmdbClient> {
    let api_token = std::env::var("TMDB_API_TOKEN").unwrap_or_else(|_| {
        tracing::warn!("TMDB_API_TOKEN is not set; catalog requests will be rejected");
        String::new()
    });

    let mut builder = TmdbClient::builder()
        .api_token(api_token)
        .user_agent(USER_AGENT);
    if let Some(base_url) = &config.catalog.base_url {
        let url = Url::parse(base_url)
            .with_context(|| format!("invalid catalog.base_url: {base_url}"))?;
        builder = builder.base_url(url);
    }
    builder.build().context("failed to build TMDB client")
}

/// Builds the Appwrite client from config and `APPWRITE_API_KEY`.
///
/// # Errors
///
/// Returns an error if a required `[analytics]` setting is missing or invalid.
#[instrument(skip_all)]
fn build_appwrite_client(config: &AppConfig) -> Result<AppwriteClient> {
    let analytics = &config.analytics;
    let endpoint = Url::parse(&analytics.endpoint)
        .with_context(|| format!("invalid analytics.endpoint: {}", analytics.endpoint))?;
    let project_id = analytics
        .project_id
        .clone()
        .context("analytics.project_id is not set in config.toml")?;
    let database_id = analytics
        .database_id
        .clone()
        .context("analytics.database_id is not set in config.toml")?;
    let collection_id = analytics
        .collection_id
        .clone()
        .context("analytics.collection_id is not set in config.toml")?;

    AppwriteClient::builder()
        .endpoint(endpoint)
        .project_id(project_id)
        .database_id(database_id)
        .collection_id(collection_id)
        .api_key(std::env::var("APPWRITE_API_KEY").ok())
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build Appwrite client")
}

/// Loads `config.toml` from `--dir` or the default location.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let path = resolve_config_path(dir)?;
    AppConfig::load(&path)
}

/// Logs a movie list as a table.
fn log_movies(movies: &[Movie]) {
    tracing::info!("ID\tYear\tLang\tRating\tTitle");
    for movie in movies {
        tracing::info!(
            "{}\t{}\t{}\t{}\t{}",
            movie.id,
            movie.release_year().unwrap_or("-"),
            movie.original_language.as_deref().unwrap_or("-"),
            movie
                .vote_average
                .map_or_else(|| String::from("-"), |v| format!("{v:.1}")),
            movie.title,
        );
    }
    tracing::info!("Total: {} movies", movies.len());
}

/// Logs trending entries as a ranked table.
fn log_trending(entries: &[TrendingEntry]) {
    tracing::info!("Rank\tCount\tQuery\t\tMovie");
    for (entry, rank) in entries.iter().zip(1_usize..) {
        tracing::info!(
            "{rank}\t{}\t{}\t\t{} ({})",
            entry.count,
            entry.query,
            entry.title,
            entry.movie_id,
        );
    }
}

/// Runs the `popular` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the request fails.
#[instrument(skip_all)]
async fn run_popular(dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client(&config)?;

    let movies = fetch_movies(&client, &MovieRequest::Popular)
        .await
        .context("TMDB discover/movie request failed")?;

    log_movies(&movies);
    Ok(())
}

/// Runs the `search` subcommand.
///
/// With `--record`, a non-empty result set records the query against the
/// top movie, the same rule the interactive browser follows.
///
/// # Errors
///
/// Returns an error if a client fails to build or a request fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client(&config)?;

    let request = MovieRequest::for_query(&args.query);
    let movies = fetch_movies(&client, &request)
        .await
        .context("TMDB search/movie request failed")?;

    log_movies(&movies);

    if !args.record {
        return Ok(());
    }
    match (request.query(), movies.first()) {
        (Some(query), Some(top)) => {
            let store = build_appwrite_client(&config)?;
            store
                .record_search(query, top)
                .await
                .context("failed to record search")?;
            tracing::info!("Recorded \"{query}\" -> {} ({})", top.title, top.id);
        }
        _ => tracing::info!("Nothing to record"),
    }
    Ok(())
}

/// Runs the `trending` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the request fails.
#[instrument(skip_all)]
async fn run_trending(args: &TrendingArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let store = build_appwrite_client(&config)?;
    let limit = args.limit.unwrap_or(config.search.trending_limit);

    let entries = store
        .trending(limit)
        .await
        .context("failed to load trending searches")?;

    if entries.is_empty() {
        tracing::info!("No searches recorded yet.");
        return Ok(());
    }
    log_trending(&entries);
    Ok(())
}

/// Launches the interactive browser.
///
/// # Errors
///
/// Returns an error if a client fails to build or the TUI fails.
#[instrument(skip_all)]
async fn run_browse(dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let catalog = Arc::new(build_tmdb_client(&config)?);
    let store = Arc::new(build_appwrite_client(&config)?);
    let options = BrowserOptions {
        debounce: config.search.debounce(),
        trending_limit: config.search.trending_limit,
    };

    tracing::info!("Launching TUI...");
    run_browser(catalog, store, options)
        .await
        .context("movie browser TUI failed")
}

/// Prints shell completions to stdout.
fn run_completions(args: &CompletionsArgs) {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "moviefind", &mut std::io::stdout());
}

/// Returns the tracing writer: stdout, or an append-mode log file.
fn make_writer(log_file: Option<&Path>) -> Result<BoxMakeWriter> {
    let Some(path) = log_file else {
        return Ok(BoxMakeWriter::new(std::io::stdout));
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    Ok(BoxMakeWriter::new(Mutex::new(file)))
}

/// Initializes the global tracing subscriber.
///
/// Logs go to `log_file` when given (the TUI owns the terminal), stdout otherwise.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let writer = make_writer(log_file)?;
    let ansi = log_file.is_none();

    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dir = cli.dir.as_ref();

    let log_file = if matches!(cli.command, Commands::Browse) {
        Some(resolve_log_path(dir)?)
    } else {
        None
    };
    init_tracing(log_file.as_deref())?;

    match &cli.command {
        Commands::Browse => run_browse(dir).await,
        Commands::Popular => run_popular(dir).await,
        Commands::Search(args) => run_search(args, dir).await,
        Commands::Trending(args) => run_trending(args, dir).await,
        Commands::Completions(args) => {
            run_completions(args);
            Ok(())
        }
    }
}
