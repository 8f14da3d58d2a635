mod commands;
mod google;
mod notifier;
mod render;
mod source;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::watch::WatchOptions;
use gcal_remind_core::RemindConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gcal-remind")]
#[command(about = "Desktop reminders for upcoming Google Calendar events")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// List upcoming events and exit
    #[arg(short, long)]
    list: bool,

    /// Keep watching after listing
    #[arg(short, long)]
    run: bool,

    /// Number of upcoming events to fetch per poll
    #[arg(short, long, value_name = "N")]
    events: Option<u32>,

    /// Calendar to watch (defaults to calendar_id from config)
    #[arg(short, long)]
    calendar: Option<String>,

    /// Seconds between polls
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// Path to config file (defaults to ~/.config/gcal-remind/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Dump tracked events after each poll and log at debug level
    #[arg(long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file with every option commented out
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Some(Commands::InitConfig { force }) => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => RemindConfig::config_path()?,
            };
            commands::init_config::run(&path, *force)
        }
        None => {
            let mut config = load_config(cli.config.as_deref())?;
            apply_overrides(&mut config, &cli);
            config.validate()?;

            let options = WatchOptions {
                list: cli.list,
                keep_running: cli.run,
                verbose: cli.verbose,
            };
            commands::watch::run(config, options).await
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<RemindConfig> {
    match path {
        Some(path) => RemindConfig::load_from(path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => RemindConfig::load().context("Failed to load config"),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn apply_overrides(config: &mut RemindConfig, cli: &Cli) {
    if let Some(events) = cli.events {
        config.max_events = events;
    }
    if let Some(calendar) = &cli.calendar {
        config.calendar_id = calendar.clone();
    }
    if let Some(interval) = cli.interval {
        config.poll_interval_secs = interval;
    }
}
