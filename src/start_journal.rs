//! Startup helpers for the contact journal.

use std::process::ExitCode;

use crate::journal::{Journal, JournalConfig};

/// Install the global `tracing` subscriber, honouring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

/// Open (and migrate) the journal configured through the environment.
///
/// # Returns
/// `ExitCode::SUCCESS` once the database is ready, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();

    tracing::info!("Starting contact journal v{}", env!("CARGO_PKG_VERSION"));

    let config = match JournalConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let path = config.storage.sqlite_path.clone();
    match rt.block_on(Journal::open(config)) {
        Ok(_journal) => {
            tracing::info!("Journal ready at {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Failed to open journal at {}: {e}", path.display());
            ExitCode::from(1)
        }
    }
}
