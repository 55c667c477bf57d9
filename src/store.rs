//! # Article Store
//!
//! Ordered, in-memory article collection.
//!
//! - Iteration order is insertion order and every filter preserves it.
//! - Articles are never removed during a session; an import replaces the
//!   whole collection at once.
//! - The only in-place mutation is `correct`, which rewrites the predicted
//!   topic, confidence and true topic together.

use serde::{Deserialize, Serialize};

use crate::topic::Topic;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    #[serde(rename = "content")]
    pub body: String,
    pub source: String,
    pub date: String,
    pub predicted_topic: Topic,
    /// In `[0, 1]`; exactly `1.0` once corrected.
    pub confidence: f32,
    #[serde(default)]
    pub true_topic: Option<Topic>,
}

impl Article {
    pub fn is_corrected(&self) -> bool {
        self.true_topic.is_some()
    }

    /// Case-folded `title + " " + body`, the text keyword filters look at.
    pub fn folded_text(&self) -> String {
        format!("{} {}", self.title, self.body).to_lowercase()
    }
}

/// What a correction overwrote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overwritten {
    pub old_topic: Topic,
    pub old_confidence: f32,
}

#[derive(Debug, Default, Clone)]
pub struct ArticleStore {
    articles: Vec<Article>,
}

impl ArticleStore {
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles }
    }

    pub fn all(&self) -> &[Article] {
        &self.articles
    }

    pub fn get(&self, id: u64) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Force `topic` as both prediction and ground truth with confidence 1.0.
    /// Returns `None` when `id` is unknown.
    pub(crate) fn correct(&mut self, id: u64, topic: Topic) -> Option<(Overwritten, &Article)> {
        let article = self.articles.iter_mut().find(|a| a.id == id)?;
        let prev = Overwritten {
            old_topic: article.predicted_topic,
            old_confidence: article.confidence,
        };
        article.predicted_topic = topic;
        article.confidence = 1.0;
        article.true_topic = Some(topic);
        Some((prev, article))
    }

    /// Swap in a freshly imported collection; returns the previous size.
    pub(crate) fn replace(&mut self, articles: Vec<Article>) -> usize {
        std::mem::replace(&mut self.articles, articles).len()
    }
}
