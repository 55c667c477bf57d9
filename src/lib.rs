// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod corrections;
pub mod desk;
pub mod export;
pub mod filters;
pub mod import;
pub mod keywords;
pub mod menu;
pub mod metrics;
pub mod scorer;
pub mod seed;
pub mod stats;
pub mod store;
pub mod topic;
pub mod weights;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::AppConfig;
pub use crate::desk::NewsDesk;
pub use crate::filters::FilterLogic;
pub use crate::scorer::{Classification, Jitter, NoJitter, RngJitter, TopicScorer};
pub use crate::topic::{Topic, TopicChoice};

/// Build the application state from config: keyword dictionary, seeded desk
/// (classified with the configured jitter) and export directory.
pub fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let dictionary = cfg.keyword_dictionary()?;
    let scorer = TopicScorer::new(dictionary);
    let mut jitter = cfg.jitter_source();
    let desk = NewsDesk::seeded(scorer, &mut *jitter, cfg.seed_demo_filters);
    Ok(AppState::new(desk, jitter, cfg.export_dir.clone()))
}
