use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::topic::Topic;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Only one recorder may exist per
    /// process, so this fails on a second call.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;
        ensure_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metric descriptions (so series show up on /metrics).
fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_classifications_total", "Classifications served, by topic.");
        describe_counter!("news_corrections_total", "User corrections applied.");
        describe_counter!("news_filters_created_total", "Filters created.");
        describe_counter!("news_filters_deleted_total", "Filters deleted.");
        describe_gauge!("news_articles", "Articles currently in the store.");
    });
}

// Without an installed recorder the macros below are no-ops.

pub fn record_classification(topic: Topic) {
    counter!("news_classifications_total", "topic" => topic.english()).increment(1);
}

pub fn record_correction() {
    counter!("news_corrections_total").increment(1);
}

pub fn record_filter_created() {
    counter!("news_filters_created_total").increment(1);
}

pub fn record_filter_deleted() {
    counter!("news_filters_deleted_total").increment(1);
}

pub fn set_article_count(n: usize) {
    gauge!("news_articles").set(n as f64);
}
