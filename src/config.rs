//! # Application Config
//!
//! TOML file, then environment overrides, then built-in defaults.
//!
//! Resolution of the file path:
//! 1. `$NEWS_CONFIG_PATH`
//! 2. `config/news.toml`
//! 3. none found → `AppConfig::default()`
//!
//! A file named by `NEWS_CONFIG_PATH` must exist; the default path is optional.
//!
//! Example:
//! ```toml
//! seed = 42
//! jitter = true
//! keywords_path = "config/keywords.toml"
//! export_dir = "exports"
//! seed_demo_filters = true
//! ```

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::keywords::KeywordDictionary;
use crate::scorer::{Jitter, NoJitter, RngJitter};

pub const DEFAULT_CONFIG_PATH: &str = "config/news.toml";
pub const ENV_CONFIG_PATH: &str = "NEWS_CONFIG_PATH";
pub const ENV_SEED: &str = "NEWS_SEED";
pub const ENV_JITTER: &str = "NEWS_JITTER";

fn default_true() -> bool {
    true
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Seed for the jitter RNG; `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// `false` disables jitter entirely (deterministic scoring).
    #[serde(default = "default_true")]
    pub jitter: bool,
    /// Optional TOML keyword dictionary replacing the built-in one.
    #[serde(default)]
    pub keywords_path: Option<PathBuf>,
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    #[serde(default = "default_true")]
    pub seed_demo_filters: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed: None,
            jitter: true,
            keywords_path: None,
            export_dir: default_export_dir(),
            seed_demo_filters: true,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Resolve the config file, then apply `NEWS_SEED` / `NEWS_JITTER`.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => Self::from_file(Path::new(&p))?,
            Err(_) => {
                let p = Path::new(DEFAULT_CONFIG_PATH);
                if p.exists() {
                    Self::from_file(p)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env_overrides(
            std::env::var(ENV_SEED).ok(),
            std::env::var(ENV_JITTER).ok(),
        );
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid config TOML at {}", path.display()))
    }

    /// Unparseable values are ignored and the file value stays.
    fn apply_env_overrides(&mut self, seed: Option<String>, jitter: Option<String>) {
        if let Some(s) = seed.and_then(|s| s.trim().parse::<u64>().ok()) {
            self.seed = Some(s);
        }
        if let Some(j) = jitter.as_deref().and_then(parse_flag) {
            self.jitter = j;
        }
    }

    /// Built-in dictionary unless `keywords_path` is set.
    pub fn keyword_dictionary(&self) -> anyhow::Result<KeywordDictionary> {
        match &self.keywords_path {
            Some(p) => KeywordDictionary::from_toml_file(p),
            None => Ok(KeywordDictionary::builtin()),
        }
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        }
    }

    /// Seeded or entropy-backed RNG jitter, or none when `jitter = false`.
    pub fn jitter_source(&self) -> Box<dyn Jitter + Send> {
        if self.jitter {
            Box::new(RngJitter(self.rng()))
        } else {
            Box::new(NoJitter)
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
