//! Registry auth gateway.
//!
//! Loads the gateway configuration, provisions the server and token
//! signing identities, and keeps the result live until asked to stop.
//!
//! ```text
//!     config file ──▶ load_config ──▶ SharedConfig ◀── readers
//!                          ▲
//!            SIGHUP ───────┤
//!            file change ──┘ (--watch)
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tokio::sync::mpsc;

use registry_auth::config::{load_config, ConfigWatcher, LoadedConfig, SharedConfig};
use registry_auth::lifecycle::{startup, ConfigSummary, LifecycleEvent, Signals};
use registry_auth::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "registry-auth")]
#[command(about = "Token authentication gateway for container registries", long_about = None)]
struct Cli {
    /// Path to the configuration file (YAML, or TOML with a .toml extension)
    config: PathBuf,

    /// Load and validate the configuration, print a summary and exit
    #[arg(long)]
    check: bool,

    /// Reload when the configuration file changes
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(logging::DEFAULT_FILTER) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let result = if cli.check {
        check(&cli.config)
    } else {
        run(&cli.config, cli.watch).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, config = %cli.config.display(), "Fatal error");
            ExitCode::FAILURE
        }
    }
}

fn check(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_config(path)?;
    let summary = ConfigSummary::new(&loaded);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn run(path: &Path, watch: bool) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "registry-auth starting");

    let shared = startup(path)?;
    let mut signals = Signals::new()?;

    // The watcher handle must outlive the loop or watching stops.
    let (_watcher, mut updates) = if watch {
        let (watcher, rx) = ConfigWatcher::new(path);
        (Some(watcher.run()?), Some(rx))
    } else {
        (None, None)
    };

    loop {
        tokio::select! {
            event = signals.recv() => match event {
                LifecycleEvent::Reload => reload(&shared, path),
                LifecycleEvent::Shutdown => break,
            },
            next = next_update(&mut updates) => match next {
                Some(next) => install(&shared, next),
                None => {
                    tracing::warn!("Config watcher stopped");
                    updates = None;
                }
            },
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn next_update(updates: &mut Option<mpsc::UnboundedReceiver<LoadedConfig>>) -> Option<LoadedConfig> {
    match updates {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn reload(shared: &SharedConfig, path: &Path) {
    tracing::info!(path = %path.display(), "SIGHUP received, reloading");
    match shared.reload_from(path) {
        Ok(()) => ConfigSummary::new(&shared.load()).log(),
        Err(e) => tracing::error!(error = %e, "Reload failed, keeping current configuration"),
    }
}

fn install(shared: &SharedConfig, next: LoadedConfig) {
    let summary = ConfigSummary::new(&next);
    shared.replace(next);
    summary.log();
}
