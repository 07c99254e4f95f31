use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spark_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "spark")]
#[command(author, version, about = "A paged social feed reader for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to ~/.config/spark/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI
    Run {
        /// Read posts from a JSON/JSONL file instead of the API
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Show how a description file is split into pages
    Paginate {
        /// Markdown-like description file
        file: PathBuf,
        /// Page height budget (overrides layout.page_height_limit)
        #[arg(short, long)]
        limit: Option<u32>,
        /// Print the pages as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the blocks parsed from a description file as JSON
    Parse {
        file: PathBuf,
    },
    /// Fetch posts and print a summary
    Fetch {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        /// Read posts from a JSON/JSONL file instead of the API
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML
    Config,
}

/// Install the tracing subscriber. The TUI logs to a file so the screen stays clean.
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if to_file {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let config = Arc::new(config);

    let is_tui = matches!(cli.command, Some(Commands::Run { .. }) | None);
    init_logging(&config, is_tui)?;

    match cli.command {
        Some(Commands::Run { file }) => commands::run::run(config, file.as_deref()).await,
        None => commands::run::run(config, None).await,
        Some(Commands::Paginate { file, limit, json }) => {
            commands::paginate::run(&config, &file, limit, json)
        }
        Some(Commands::Parse { file }) => commands::parse::run(&file),
        Some(Commands::Fetch { limit, file }) => {
            commands::fetch::run(&config, limit, file.as_deref()).await
        }
        Some(Commands::Config) => commands::config::run(&config),
    }
}
