use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quip_common::observability::{LogConfig, init_logging};
use quip_config::{QuipConfig, QuipConfigLoader};
use quip_fetch::JokeApi;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use wiring::build_fetcher;

mod render;
mod wiring;

const DEFAULT_CONFIG_FILE: &str = "quip.yaml";

/// Fetch a joke from a chucknorris.io-compatible API.
#[derive(Debug, Parser)]
#[command(name = "quip", version)]
struct Cli {
    /// Config file (YAML/TOML/JSON). Defaults to ./quip.yaml when present.
    #[arg(long, short, env = "QUIP_CONFIG")]
    config: Option<PathBuf>,

    /// Wait this long before sending the request; overrides `fetch.delay_ms`.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Print the `{data, error}` pair as JSON.
    #[arg(long)]
    json: bool,

    /// Mirror logs to stderr.
    #[arg(long)]
    log_stderr: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Command {
    /// A random joke, optionally from one category.
    Random {
        #[arg(long, short)]
        category: Option<String>,
    },
    /// One random joke among those matching QUERY (3 to 120 characters).
    Search { query: String },
    /// List the available categories.
    Categories,
    /// Fetch and classify an arbitrary URL.
    Get { url: String },
}

impl Command {
    fn target(&self, api: &JokeApi) -> String {
        match self {
            Command::Random { category: None } => api.random().into(),
            Command::Random {
                category: Some(category),
            } => api.random_in(category).into(),
            Command::Search { query } => api.search(query).into(),
            Command::Categories => api.categories().into(),
            Command::Get { url } => url.clone(),
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<QuipConfig> {
    let loader = QuipConfigLoader::new();
    let loader = match path {
        Some(path) => loader.with_file(path),
        None => loader.with_optional_file(DEFAULT_CONFIG_FILE),
    };
    loader.load().context("failed to load configuration")
}

fn log_config(cfg: &QuipConfig, force_stderr: bool) -> LogConfig {
    LogConfig {
        app_name: "quip",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.stderr || force_stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let cfg = load_config(cli.config.as_deref())?;
    let log_path = init_logging(log_config(&cfg, cli.log_stderr))?;
    tracing::info!(log=%log_path.display(), base_url=%cfg.api.base_url, "quip.start");

    let api = JokeApi::new(&cfg.api.base_url)
        .with_context(|| format!("invalid api.base_url: {}", cfg.api.base_url))?;
    let fetcher = build_fetcher(&cfg)?;

    let command = cli.command.unwrap_or(Command::Random { category: None });
    let url = command.target(&api);
    let delay = cli
        .delay_ms
        .map(Duration::from_millis)
        .or_else(|| cfg.fetch.delay());

    let outcome = fetcher.fetch_and_classify(&url, delay).await;

    let rendered = if cli.json {
        render::json(&outcome)?
    } else {
        render::text(&outcome)
    };
    match &outcome {
        Ok(_) => {
            println!("{rendered}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::info!(error=%err, "quip.finished_with_error");
            if cli.json {
                println!("{rendered}");
            } else {
                eprintln!("{rendered}");
            }
            Ok(ExitCode::from(1))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("quip: {err:#}");
            ExitCode::from(2)
        }
    }
}
