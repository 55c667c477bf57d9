//! News Classify Service: Binary Entrypoint
//! Boots the Axum HTTP server: config, tracing, seeded news desk, routes.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_classify::metrics::Metrics;
use news_classify::{build_state, create_router, AppConfig};

/// Compact logs by default; `NEWS_LOG_JSON=1` switches to JSON lines.
/// `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_classify=info,warn"));

    let json = std::env::var("NEWS_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    // Shuttle may already have installed a subscriber; keep it in that case.
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AppConfig::load().context("load news config")?;
    tracing::info!(
        seed = ?cfg.seed,
        jitter = cfg.jitter,
        export_dir = %cfg.export_dir.display(),
        "config loaded"
    );

    let state = build_state(&cfg).context("build app state")?;
    let mut router = create_router(state);

    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = %e, "metrics disabled"),
    }

    Ok(router.into())
}
