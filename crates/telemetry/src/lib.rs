//! Logging setup for the flexfn CLI.

use anyhow::Context as _;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

mod env;

/// Level used when no filter is configured.
const DEFAULT_DIRECTIVES: &str = "warn";

/// Installs the global `tracing` subscriber.
///
/// Logs go to stderr so that command output on stdout stays machine readable.
/// The filter comes from `FLEXFN_LOG` (or `RUST_LOG`) and defaults to
/// warnings only; `FLEXFN_LOG_FORMAT=json` switches to JSON lines.
pub fn init() -> anyhow::Result<()> {
    let directives = env::log_directives();
    let filter = EnvFilter::try_new(directives.as_deref().unwrap_or(DEFAULT_DIRECTIVES))
        .context("invalid log filter")?;

    let layer = if env::json_format() {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .context("failed to install the tracing subscriber")?;
    Ok(())
}
