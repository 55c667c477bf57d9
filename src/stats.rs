//! # Statistics
//!
//! Confidence bands, quality counters and on-demand snapshots of the store.
//!
//! Band edges:
//! - high:   `c > 0.9`
//! - medium: `0.8 <= c <= 0.9`
//! - low:    `c < 0.8`
//!
//! The quality counters start at fixed demo values; only the correction path
//! moves them (precision gains 0.01 on every 5th correction, capped at 0.98).

use serde::{Deserialize, Serialize};

use crate::store::Article;
use crate::topic::Topic;

pub const INITIAL_PRECISION: f32 = 0.87;
pub const INITIAL_RECALL: f32 = 0.82;
pub const INITIAL_F1: f32 = 0.85;
pub const PRECISION_CAP: f32 = 0.98;
pub const PRECISION_STEP: f32 = 0.01;
pub const CORRECTIONS_PER_STEP: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn of(confidence: f32) -> Self {
        if confidence > 0.9 {
            ConfidenceBand::High
        } else if confidence >= 0.8 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityCounters {
    pub precision: f32,
    pub recall: f32,
    #[serde(rename = "f1_score")]
    pub f1: f32,
    pub corrected_count: u32,
}

impl Default for QualityCounters {
    fn default() -> Self {
        Self {
            precision: INITIAL_PRECISION,
            recall: INITIAL_RECALL,
            f1: INITIAL_F1,
            corrected_count: 0,
        }
    }
}

impl QualityCounters {
    pub(crate) fn record_correction(&mut self) {
        self.corrected_count += 1;
        if self.corrected_count % CORRECTIONS_PER_STEP == 0 {
            self.precision = (self.precision + PRECISION_STEP).min(PRECISION_CAP);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandHistogram {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl BandHistogram {
    fn add(&mut self, confidence: f32) {
        match ConfidenceBand::of(confidence) {
            ConfidenceBand::High => self.high += 1,
            ConfidenceBand::Medium => self.medium += 1,
            ConfidenceBand::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(flatten)]
    pub quality: QualityCounters,
    pub total_articles: usize,
    #[serde(rename = "high_confidence")]
    pub high: usize,
    #[serde(rename = "medium_confidence")]
    pub medium: usize,
    #[serde(rename = "low_confidence")]
    pub low: usize,
    /// `0.0` for an empty store.
    pub avg_confidence: f32,
}

impl StatsSnapshot {
    pub fn compute(quality: QualityCounters, articles: &[Article]) -> Self {
        let mut bands = BandHistogram::default();
        let mut sum = 0.0f32;
        for a in articles {
            bands.add(a.confidence);
            sum += a.confidence;
        }
        Self {
            quality,
            total_articles: articles.len(),
            high: bands.high,
            medium: bands.medium,
            low: bands.low,
            avg_confidence: mean(sum, articles.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicDistribution {
    pub topic: Topic,
    pub count: usize,
    pub avg_confidence: f32,
    pub bands: BandHistogram,
}

/// Per-topic counts in `Topic::ALL` order; topics without articles are skipped.
pub fn topic_distribution(articles: &[Article]) -> Vec<TopicDistribution> {
    let mut bands = [BandHistogram::default(); 8];
    let mut sums = [0.0f32; 8];
    for a in articles {
        let i = a.predicted_topic.index();
        bands[i].add(a.confidence);
        sums[i] += a.confidence;
    }
    Topic::ALL
        .into_iter()
        .filter_map(|topic| {
            let i = topic.index();
            let count = bands[i].total();
            (count > 0).then(|| TopicDistribution {
                topic,
                count,
                avg_confidence: mean(sums[i], count),
                bands: bands[i],
            })
        })
        .collect()
}

fn mean(sum: f32, n: usize) -> f32 {
    if n == 0 {
        0.0
    } else {
        sum / n as f32
    }
}
