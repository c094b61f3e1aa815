use anyhow::{Context, Result};
use tracing::info;

use corvid_uci::UciEngine;

fn main() -> Result<()> {
    // Standard output carries the protocol; diagnostics go to stderr.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    info!(version = env!("CARGO_PKG_VERSION"), "corvid starting");
    UciEngine::new().run().context("UCI loop failed")?;
    Ok(())
}
