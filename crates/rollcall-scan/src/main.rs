//! Rollcall kiosk
//!
//! Reads scan ids from stdin, one per line, as a keyboard-emulating scanner
//! would type them, and records each against an in-memory roster.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rollcall_a11y::{
    AnnouncementPriority, Announcer, Document, Element, LiveRegionMutation, LiveRegionSink,
    SharedDocument,
};
use rollcall_config::ConfigManager;
use rollcall_scan::{DomainService, InMemoryRoster, ScanInputController, ScanOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rollcall-kiosk")]
#[command(about = "Record attendance scans read from stdin")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Known roster entry as ID=NAME; without any, every id is accepted
    #[arg(short, long = "known", value_name = "ID=NAME")]
    known: Vec<String>,

    /// Print scan statistics as JSON on exit
    #[arg(long)]
    stats: bool,
}

/// Prints live-region text the way a screen reader would speak it
struct ConsoleSink;

impl LiveRegionSink for ConsoleSink {
    fn apply(&self, channel: AnnouncementPriority, mutation: &LiveRegionMutation) {
        if let LiveRegionMutation::SetText(text) = mutation {
            println!("[{channel}] {text}");
        }
    }
}

fn parse_roster(entries: &[String]) -> Result<InMemoryRoster> {
    if entries.is_empty() {
        return Ok(InMemoryRoster::open());
    }
    let names = entries
        .iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(id, name)| (id.trim().to_string(), name.trim().to_string()))
                .ok_or_else(|| anyhow!("invalid roster entry '{entry}', expected ID=NAME"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(InMemoryRoster::new(names))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    let config = manager
        .load()
        .with_context(|| format!("failed to load {}", manager.config_path().display()))?;

    let mut document = Document::new();
    let root = document.root();
    let surface = document
        .append(root, Element::text_field("Scan student card"))
        .ok_or_else(|| anyhow!("document root is missing"))?;
    let host = SharedDocument::new(document);

    let announcer = Announcer::init(&config.announcer, Some(Arc::new(ConsoleSink)));
    let service: Arc<dyn DomainService> = Arc::new(parse_roster(&cli.known)?);
    let controller = ScanInputController::builder(
        service,
        announcer.clone(),
        Arc::new(host.clone()),
        surface,
    )
    .settings(config.scan.clone())
    .mount();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match controller.submit_value(line).await {
            ScanOutcome::Ignored => {}
            outcome => tracing::debug!(?outcome, "scan submitted"),
        }
    }

    controller.unmount();
    announcer.dispose();

    if cli.stats {
        println!("{}", serde_json::to_string_pretty(&controller.stats())?);
    }
    Ok(())
}
