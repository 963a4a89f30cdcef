//! epistats - CLI for the epidemiological statistics aggregation engine
//!
//! This tool provides commands for:
//! - Running one refresh cycle and printing the statistics snapshot
//! - Checking the configured statistics source
//! - Inspecting the persisted seven-day-average history
//!
//! Uses XDG Base Directory specification for file locations:
//! - History store: $XDG_DATA_HOME/epistats/history.db
//! - Config: $XDG_CONFIG_HOME/epistats/config.toml
//! - Logs: $XDG_STATE_HOME/epistats/

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use epistats_core::{
    Config, Database, MockStatisticsProvider, SplunkStatisticsProvider, StatisticsProvider,
};

#[derive(Parser)]
#[command(name = "epistats")]
#[command(about = "Aggregate epidemiological usage statistics")]
#[command(version)]
struct Args {
    /// Path to a config file (default: XDG config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one refresh cycle and print the snapshot as JSON
    Refresh {
        /// Use the deterministic mock provider instead of Splunk
        #[arg(long)]
        mock: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Show the statistics source configuration
    Status,

    /// List persisted seven-day averages
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    let config = match &args.config {
        Some(path) => Config::load_from(path).context("failed to load configuration")?,
        None => Config::load().context("failed to load configuration")?,
    };

    // Logging goes to the XDG state dir so JSON output on stdout stays clean
    let _log_guard = epistats_core::logging::init(&config.logging)
        .context("failed to initialize logging")?;

    match args.command {
        Command::Refresh { mock, pretty } => cmd_refresh(&config, mock, pretty).await,
        Command::Status => cmd_status(&config),
        Command::History => cmd_history(),
    }
}

fn open_store() -> Result<Arc<Database>> {
    let db_path = Config::database_path();
    tracing::info!(path = %db_path.display(), "Opening history store");

    let store = Database::open(&db_path).context("failed to open history store")?;
    store
        .migrate()
        .context("failed to run history store migrations")?;
    Ok(Arc::new(store))
}

async fn cmd_refresh(config: &Config, mock: bool, pretty: bool) -> Result<()> {
    let store = open_store()?;

    let provider: Box<dyn StatisticsProvider> = if mock {
        Box::new(MockStatisticsProvider::new(store))
    } else {
        let splunk = config.splunk().context("cannot build Splunk provider")?;
        Box::new(
            SplunkStatisticsProvider::new(splunk.clone(), store)
                .context("failed to create Splunk provider")?,
        )
    };

    let snapshot = provider
        .compute_statistics()
        .await
        .context("refresh cycle failed")?;

    let json = if pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };
    println!("{}", json);

    Ok(())
}

fn cmd_status(config: &Config) -> Result<()> {
    println!("epistats statistics source");
    println!("==========================");
    println!();

    match &config.splunk {
        Some(splunk) => {
            println!("Source:           splunk");
            println!("URL:              {}", splunk.url);
            println!("Username:         {}", splunk.username);
            println!("Password:         ********");
            println!("Start date:       {}", splunk.start_date);
            println!("End days back:    {}", splunk.end_days_back);
            match splunk.active_apps_override {
                Some(count) => println!("Active apps:      overridden to {}", count),
                None => println!("Active apps:      from query"),
            }
            println!(
                "Timeouts:         connect {}s, request {}s",
                splunk.connect_timeout_secs, splunk.request_timeout_secs
            );
            if let Err(e) = splunk.validate() {
                println!();
                println!("Configuration invalid: {}", e);
            }
        }
        None => {
            println!("Source:           not configured (mock only)");
            println!();
            println!("Add a [splunk] section to {:?}", Config::config_path());
        }
    }

    println!();
    println!("History store:    {:?}", Config::database_path());
    println!("Log file:         {:?}", Config::log_path());

    Ok(())
}

fn cmd_history() -> Result<()> {
    let store = open_store()?;
    let entries = store
        .list_seven_day_avgs()
        .context("failed to list history")?;

    if entries.is_empty() {
        println!("No persisted seven-day averages.");
        return Ok(());
    }

    println!("{:<12} {:>14}", "day", "seven-day avg");
    for (day, value) in entries {
        println!("{:<12} {:>14}", day, value);
    }

    Ok(())
}
