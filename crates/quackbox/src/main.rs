//! Quackbox CLI
//!
//! Thin front end over the catalog service: refresh the catalog from the
//! games directory, print it, launch games and keep it up to date while the
//! directory changes. Catalog output goes to stdout as JSON, logs to stderr.

mod cli;

use anyhow::{Context, Result};
use cli::{CliArgs, Command, USAGE};
use quackbox_catalog::{CatalogService, DirectoryWatcher};
use quackbox_config::QuackboxConfig;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

fn main() -> Result<()> {
    let args = cli::parse_args(std::env::args().skip(1))?;

    if args.command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = load_config(&args)?;
    setup_logging(&config.log_level);

    if let Command::Config(target) = &args.command {
        match target {
            Some(path) => config
                .save(path)
                .with_context(|| format!("Failed to write {}", path.display()))?,
            None => print!("{}", config.to_toml()?),
        }
        return Ok(());
    }

    let service = CatalogService::from_config(&config);
    debug!(
        "Catalog {} for games in {}",
        service.store().path().display(),
        service.games_dir().display()
    );

    match args.command {
        Command::Refresh => print_json(&service.refresh()?),
        Command::List => print_json(&service.entries()?),
        Command::Show(id) => print_json(&service.entry(&id)?),
        Command::Launch(id) => {
            let report = service.launch(&id)?;
            println!(
                "Launched {} (pid {}), played {} time(s)",
                report.entry.title, report.handle.pid, report.entry.times_played
            );
            Ok(())
        }
        Command::Watch => watch(&service, &config),
        Command::Config(_) | Command::Help => Ok(()),
    }
}

fn load_config(args: &CliArgs) -> Result<QuackboxConfig> {
    match &args.config_path {
        Some(path) => QuackboxConfig::load_layered(Some(path.as_path()))
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => QuackboxConfig::load_default().context("Failed to load configuration"),
    }
}

fn setup_logging(default_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Refresh once, then again after every batch of directory changes
fn watch(service: &CatalogService, config: &QuackboxConfig) -> Result<()> {
    let watcher = DirectoryWatcher::new(service.games_dir())?.ignore_file(service.store().path());
    let quiet = Duration::from_millis(config.watch.debounce_ms);

    service.refresh().context("Initial refresh failed")?;
    info!("Watching for new games, press Ctrl+C to stop");

    while let Some(events) = watcher.wait_for_change(None, quiet) {
        debug!("{} change(s) in {}", events, watcher.path().display());
        match service.refresh_with_report() {
            Ok((catalog, report)) if report.changed => {
                info!(
                    "Catalog updated: {} new game(s), {} in catalog",
                    report.added,
                    catalog.len()
                );
            }
            Ok(_) => {}
            Err(e) => error!("Refresh failed: {}", e),
        }
    }

    Ok(())
}
