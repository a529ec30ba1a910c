//! Logging setup using tracing.
//!
//! Log lines go to stderr so that stdout only ever carries JSON output.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `cardsync=info`, or `cardsync=debug`
/// when `verbose` is on.
pub fn init(verbose: bool) -> Result<()> {
    let fallback = if verbose {
        "cardsync=debug"
    } else {
        "cardsync=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize tracing: {e}"))?;

    Ok(())
}
