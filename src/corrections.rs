//! corrections.rs: append-only log of user corrections.
//!
//! Two streams are kept:
//! - `TrainingEvent`: what the scorer learned from (id, old → new, timestamp).
//! - `CorrectionRecord`: the UI-facing history entry (adds confidences and a
//!   short title snippet).
//!
//! Neither stream is ever mutated or truncated; readers get slices or the
//! last N entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::topic::Topic;

/// Number of title characters kept in a history entry.
pub const TITLE_SNIPPET_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingEvent {
    pub article_id: u64,
    pub old_topic: Topic,
    pub new_topic: Topic,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    pub article_id: u64,
    pub old_topic: Topic,
    pub new_topic: Topic,
    pub old_confidence: f32,
    pub new_confidence: f32,
    pub timestamp: DateTime<Utc>,
    /// Publication date of the corrected article (as shown in the feed).
    pub date: String,
    /// First `TITLE_SNIPPET_CHARS` characters of the title followed by "...".
    pub title: String,
}

#[derive(Debug, Default, Clone)]
pub struct CorrectionLog {
    training: Vec<TrainingEvent>,
    history: Vec<CorrectionRecord>,
}

impl CorrectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, event: TrainingEvent, record: CorrectionRecord) {
        self.training.push(event);
        self.history.push(record);
    }

    pub fn training_events(&self) -> &[TrainingEvent] {
        &self.training
    }

    pub fn history(&self) -> &[CorrectionRecord] {
        &self.history
    }

    /// The last `n` records, oldest first.
    pub fn last_n(&self, n: usize) -> &[CorrectionRecord] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// `"<first 30 chars>..."`, counted in characters so Cyrillic is never split.
pub fn title_snippet(title: &str) -> String {
    let mut s: String = title.chars().take(TITLE_SNIPPET_CHARS).collect();
    s.push_str("...");
    s
}
