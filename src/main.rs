//! Binary entry point for scanledger.
//!
//! Wires a reference CSV, a stdin-driven scan stream, and a console result
//! sink into a running dedup-and-lookup pipeline.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print output in the main binary for CLI results
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use scanledger::channel;
use scanledger::config::ScanConfig;
use scanledger::ingest::{FrameSource, ManualEntry, StreamIngest};
use scanledger::ledger::DedupLedger;
use scanledger::observability::{self, LogFormat, LoggingConfig};
use scanledger::reference::{ReferenceHandle, load_reference_csv};
use scanledger::services::ClassifierService;
use scanledger::sink::{NoCue, NotificationCue, SessionLog, TracingCue, run_sink};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Scanledger - scan-event dedup and lookup engine.
#[derive(Parser)]
#[command(name = "scanledger")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the scan pipeline, reading payloads line by line from stdin.
    Run {
        /// Path to the reference CSV file.
        #[arg(short, long)]
        reference: Option<PathBuf>,

        /// 0-based key column index in the reference file.
        #[arg(long)]
        key_column: Option<usize>,

        /// Cooldown window in seconds.
        #[arg(long)]
        cooldown_secs: Option<u64>,

        /// Disable notification cues.
        #[arg(long)]
        no_cues: bool,
    },

    /// Classify a single identifier and exit.
    Check {
        /// The identifier payload to classify.
        value: String,

        /// Path to the reference CSV file.
        #[arg(short, long)]
        reference: Option<PathBuf>,

        /// 0-based key column index in the reference file.
        #[arg(long)]
        key_column: Option<usize>,
    },
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match ScanConfig::load_from_file(path) {
            Ok(mut config) => {
                config.apply_env_overrides();
                config
            },
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return ExitCode::FAILURE;
            },
        },
        None => ScanConfig::load_default(),
    };

    observability::init(LoggingConfig {
        verbose: cli.verbose,
        format: if cli.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Text
        },
    });

    let result = match cli.command {
        Commands::Run {
            reference,
            key_column,
            cooldown_secs,
            no_cues,
        } => {
            if let Some(reference) = reference {
                config.reference_path = Some(reference);
            }
            if let Some(key_column) = key_column {
                config.key_column = key_column;
            }
            if let Some(cooldown_secs) = cooldown_secs {
                config.cooldown_secs = cooldown_secs;
            }
            if no_cues {
                config.cues_enabled = false;
            }
            cmd_run(config).await
        },
        Commands::Check {
            value,
            reference,
            key_column,
        } => {
            if let Some(reference) = reference {
                config.reference_path = Some(reference);
            }
            if let Some(key_column) = key_column {
                config.key_column = key_column;
            }
            cmd_check(&config, &value).await
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Builds the engine core shared by both commands.
fn build_classifier(config: &ScanConfig) -> Arc<ClassifierService> {
    let reference = Arc::new(ReferenceHandle::new());

    if let Some(path) = &config.reference_path {
        match load_reference_csv(path, config.key_column) {
            Ok(set) => reference.publish(set),
            Err(e) => {
                // The pipeline stays usable without a set; lookups degrade
                // to "not found" until a valid one is published.
                warn!(path = %path.display(), error = %e, "reference load failed");
            },
        }
    }

    let ledger = Arc::new(DedupLedger::new(config.cooldown()));
    Arc::new(ClassifierService::new(ledger, reference))
}

/// Runs the full pipeline until stdin closes or Ctrl-C arrives.
async fn cmd_run(config: ScanConfig) -> anyhow::Result<()> {
    let classifier = build_classifier(&config);
    let (tx, rx) = channel::bounded(config.channel_capacity);

    // Cooperative stop: Ctrl-C flips the watch, the stream adapter
    // observes it between poll cycles and drains out.
    let (stop_tx, stop_rx) = watch::channel(false);
    {
        let stop_tx = stop_tx.clone();
        ctrlc::set_handler(move || {
            let _ = stop_tx.send(true);
        })
        .context("failed to install Ctrl-C handler")?;
    }

    // Ledger sweeper keeps the map from growing without bound.
    let sweeper = {
        let ledger = Arc::clone(classifier.ledger());
        let mut stop = stop_rx.clone();
        let interval = config.sweep_interval;
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        ledger.prune_expired(chrono::Utc::now());
                    },
                    _ = stop.changed() => return,
                }
            }
        })
    };

    // Consumer: render to stdout, keep the session log, trigger cues.
    let log = Arc::new(SessionLog::new());
    let cue: Box<dyn NotificationCue> = if config.cues_enabled {
        Box::new(TracingCue)
    } else {
        Box::new(NoCue)
    };
    let sink = {
        let log = Arc::clone(&log);
        tokio::spawn(async move {
            run_sink(rx, &log, cue.as_ref(), |message| println!("{message}")).await
        })
    };

    // Producer: stdin lines stand in for the camera decode stream.
    let ingest = StreamIngest::new(Arc::clone(&classifier), tx);
    let stream_result = ingest.run(stdin_source(stop_tx), stop_rx).await;
    drop(ingest);

    // All senders are gone once the stream returns; the sink drains the
    // buffered remainder and finishes.
    let consumed = sink.await.context("result sink panicked")?;
    sweeper.abort();

    info!(
        consumed,
        accepted = log.len(),
        tracked = classifier.ledger().len(),
        "pipeline stopped"
    );
    stream_result?;
    Ok(())
}

/// Classifies one identifier through the manual-entry adapter.
async fn cmd_check(config: &ScanConfig, value: &str) -> anyhow::Result<()> {
    let classifier = build_classifier(config);
    let (tx, mut rx) = channel::bounded(1);

    let manual = ManualEntry::new(classifier, tx);
    manual.submit(value).await?;

    if let Some(classification) = rx.recv().await {
        println!("{}", scanledger::render_message(&classification));
    }
    Ok(())
}

/// Bridges blocking stdin reads into a promptly-returning frame source.
///
/// A dedicated thread owns the blocking reads; the source itself only
/// drains a queue, so the stream adapter can keep observing its stop
/// signal. When stdin closes, the thread flips the stop watch so the
/// pipeline winds down on its own.
fn stdin_source(stop_tx: watch::Sender<bool>) -> impl FrameSource {
    let (line_tx, line_rx) = std_mpsc::channel::<String>();

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut buffer = String::new();
        loop {
            buffer.clear();
            match stdin.read_line(&mut buffer) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if line_tx.send(buffer.trim_end().to_string()).is_err() {
                        break;
                    }
                },
            }
        }
        let _ = stop_tx.send(true);
    });

    move || -> scanledger::Result<Vec<String>> {
        let mut payloads = Vec::new();
        while let Ok(line) = line_rx.try_recv() {
            payloads.push(line);
        }
        Ok(payloads)
    }
}
