//! quake-relay — Binary Entrypoint
//! Boots the Axum HTTP server: event listing, event details and Prometheus metrics.
//!
//! Configuration is read from `$QUAKE_CONFIG_PATH` or `config/quake.toml`.

use quake_relay::metrics::Metrics;
use quake_relay::QuakeConfig;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - QUAKE_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("QUAKE_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quake_relay=debug,ingest=info,warn"));

    // Shuttle may already own the global subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let config = QuakeConfig::load_default()?;
    tracing::info!(
        realtime = %config.feeds.realtime_url,
        longterm = %config.feeds.longterm_url,
        force = config.policy.force,
        ignore_warning = config.policy.ignore_warning,
        "configuration loaded"
    );

    let metrics = Metrics::init(&config)?;
    let router = quake_relay::app(&config)?.merge(metrics.router());

    Ok(router.into())
}
