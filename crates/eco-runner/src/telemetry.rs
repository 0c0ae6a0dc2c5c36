//! Logging setup for the runner.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// Filtering follows `RUST_LOG`; `ECO_LOG_FORMAT=json` switches to one JSON
/// object per event. Logs go to stderr so the report on stdout stays clean.
pub fn init_telemetry() -> Result<()> {
    let json = std::env::var("ECO_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,eco_runner=info,eco_world=info".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| {
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
        }))
        .try_init()?;

    info!(json, "Telemetry initialized");
    Ok(())
}
