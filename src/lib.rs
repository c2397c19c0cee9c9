pub mod batch;
pub mod cli;
pub mod client;
pub mod error;
pub mod intake;
pub mod models;
pub mod overlay;
pub mod report;
pub mod session;
pub mod settings;
pub mod store;
pub mod utils;

use anyhow::{Context, Result};
use clap::Parser;

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    log_builder(env_logger::Env::default()).init();

    let cli = cli::Cli::parse();
    log::debug!("DentoScan starting up...");

    // One cooperative event loop; image work is pushed to the blocking pool.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(cli::execute(cli))
}

/// `RUST_LOG` wins when set; otherwise everything logs at `info`.
fn log_builder(env: env_logger::Env<'_>) -> env_logger::Builder {
    env_logger::Builder::from_env(env.default_filter_or("info"))
}
