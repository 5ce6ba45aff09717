//! mkbd - the minimalkb-core demo/test daemon
//!
//! A thin CLI wrapper around [`minimalkb_core::KnowledgeBase`]: loads an
//! initial ontology, starts the reasoner and lifespan workers, and runs
//! until interrupted.

use clap::Parser;
use minimalkb_core::config::KbConfig;
use minimalkb_core::KnowledgeBase;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mkbd")]
#[command(version = minimalkb_core::VERSION)]
#[command(about = "minimalkb-core demo daemon", long_about = None)]
struct Cli {
    /// Reserved for the wire-transport listener; the transport itself is
    /// out of scope for this crate, so this flag has no effect yet.
    #[arg(long)]
    port: Option<u16>,

    /// Ontology file to load at startup, in addition to the bundled one
    #[arg(long)]
    ontology: Option<PathBuf>,

    /// Verbosity: -v for info, -vv for debug, -vvv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Exit immediately after startup self-checks instead of serving
    /// (used by CI smoke tests)
    #[arg(long)]
    failfast: bool,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(port) = cli.port {
        tracing::warn!(port, "--port is a placeholder; this crate does not yet serve a wire transport");
    }

    let config = KbConfig {
        initial_ontology: cli.ontology.clone(),
        ..KbConfig::default()
    };

    let kb = KnowledgeBase::new(config)?;
    tracing::info!(version = %kb.hello(), "minimalkb-core starting");

    if cli.failfast {
        tracing::info!("failfast: startup checks passed, exiting");
        return Ok(());
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        tracing::info!("received interrupt, shutting down");
        shutdown_clone.store(true, Ordering::SeqCst);
    })?;

    while !shutdown.load(Ordering::SeqCst) {
        std::thread::sleep(std::time::Duration::from_millis(50));
    }

    drop(kb);
    Ok(())
}
