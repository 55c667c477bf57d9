//! # Topic Scorer
//!
//! Maps `(title, body)` to a `(topic, confidence)` pair.
//!
//! Scoring, per topic in `Topic::ALL` order:
//! 1. For every keyword of the topic count whole-word hits in the case-folded
//!    `title + " " + body` and add `tier_weight * hits`.
//! 2. If the keyword had hits and also appears (substring) in the title, add
//!    a title boost of `tier_weight * 2` on top.
//! 3. Multiply by the adaptive topic weight, then by a jitter factor drawn
//!    from `[0.8, 1.2]`.
//!
//! The winner is the first topic (in `Topic::ALL` order) holding the maximal
//! score, so an all-zero text resolves to `Topic::Politics`.
//!
//! Randomness is always injected through [`Jitter`]; use [`NoJitter`] for
//! deterministic results.

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::keywords::KeywordDictionary;
use crate::topic::Topic;
use crate::weights::TopicWeights;

pub const MIN_CONFIDENCE: f32 = 0.60;
pub const MAX_CONFIDENCE: f32 = 0.98;

/// Source of multiplicative noise in `[lo, hi]`.
pub trait Jitter {
    fn factor(&mut self, lo: f32, hi: f32) -> f32;
}

/// Always `1.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl Jitter for NoJitter {
    #[inline]
    fn factor(&mut self, _lo: f32, _hi: f32) -> f32 {
        1.0
    }
}

/// Uniform draws from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngJitter<R>(pub R);

impl<R: Rng> Jitter for RngJitter<R> {
    fn factor(&mut self, lo: f32, hi: f32) -> f32 {
        self.0.random_range(lo..=hi)
    }
}

impl<J: Jitter + ?Sized> Jitter for &mut J {
    fn factor(&mut self, lo: f32, hi: f32) -> f32 {
        (**self).factor(lo, hi)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TopicScore {
    pub topic: Topic,
    pub score: f32,
}

/// Result of a single classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub topic: Topic,
    /// In `[0.60, 0.98]`, rounded to 2 decimals.
    pub confidence: f32,
    /// Final per-topic scores in `Topic::ALL` order.
    pub scores: Vec<TopicScore>,
}

#[derive(Debug, Clone)]
pub struct TopicScorer {
    dictionary: KeywordDictionary,
    weights: TopicWeights,
}

impl Default for TopicScorer {
    fn default() -> Self {
        Self::new(KeywordDictionary::builtin())
    }
}

impl TopicScorer {
    pub fn new(dictionary: KeywordDictionary) -> Self {
        debug!(
            target: "classify",
            keywords = dictionary.len(),
            "topic scorer initialized"
        );
        Self {
            dictionary,
            weights: TopicWeights::default(),
        }
    }

    pub fn dictionary(&self) -> &KeywordDictionary {
        &self.dictionary
    }

    pub fn weights(&self) -> &TopicWeights {
        &self.weights
    }

    /// Shift weights after a user correction: `new_topic` up, `old_topic` down.
    /// Only the correction path calls this.
    pub(crate) fn learn_from_correction(&mut self, old_topic: Topic, new_topic: Topic) {
        let up = self.weights.reinforce(new_topic);
        let down = self.weights.penalize(old_topic);
        debug!(
            target: "corrections",
            from = %old_topic, to = %new_topic,
            w_to = up, w_from = down,
            "topic weights adjusted"
        );
    }

    /// Raw, weighted and jittered score for every topic.
    pub fn score<J: Jitter + ?Sized>(&self, title: &str, body: &str, jitter: &mut J) -> [f32; 8] {
        let title_folded = title.to_lowercase();
        let combined = format!("{} {}", title, body).to_lowercase();
        self.score_folded(&title_folded, &combined, jitter)
    }

    fn score_folded<J: Jitter + ?Sized>(
        &self,
        title_folded: &str,
        combined: &str,
        jitter: &mut J,
    ) -> [f32; 8] {
        let mut scores = [0.0f32; 8];
        for topic in Topic::ALL {
            let mut score = 0.0f32;
            for kw in self.dictionary.for_topic(topic) {
                let hits = kw.count_in(combined);
                if hits == 0 {
                    continue;
                }
                let w = kw.tier.weight();
                score += w * hits as f32;
                if kw.contained_in(title_folded) {
                    score += w * 2.0;
                }
            }
            score *= self.weights.get(topic);
            score *= jitter.factor(0.8, 1.2);
            scores[topic.index()] = score;
        }
        scores
    }

    pub fn classify<J: Jitter + ?Sized>(
        &self,
        title: &str,
        body: &str,
        jitter: &mut J,
    ) -> Classification {
        let title_folded = title.to_lowercase();
        let combined = format!("{} {}", title, body).to_lowercase();

        let scores = self.score_folded(&title_folded, &combined, jitter);
        let topic = pick_winner(&scores);
        let confidence = self.confidence(&scores, topic, &title_folded, &combined, jitter);

        debug!(
            target: "classify",
            id = %anon_hash(title),
            %topic,
            confidence,
            "classified"
        );

        Classification {
            topic,
            confidence,
            scores: Topic::ALL
                .into_iter()
                .map(|t| TopicScore {
                    topic: t,
                    score: scores[t.index()],
                })
                .collect(),
        }
    }

    /// Confidence heuristic for an already chosen topic.
    ///
    /// `base(lead) * difficulty * length * title * jitter[0.97, 1.03]`,
    /// clamped to `[0.60, 0.98]` and rounded to 2 decimals. Both texts must be
    /// case-folded.
    pub fn confidence<J: Jitter + ?Sized>(
        &self,
        scores: &[f32; 8],
        chosen: Topic,
        title_folded: &str,
        combined_folded: &str,
        jitter: &mut J,
    ) -> f32 {
        let mut sorted = *scores;
        sorted.sort_by(|a, b| b.total_cmp(a));
        let lead_ratio = match (sorted.first(), sorted.get(1)) {
            (Some(&best), Some(&second)) if best > 0.0 => (best - second) / best,
            _ => 0.0,
        };

        let base = if lead_ratio > 0.5 {
            0.93
        } else if lead_ratio > 0.3 {
            0.85
        } else if lead_ratio > 0.1 {
            0.75
        } else {
            0.65
        };

        let difficulty_factor = 1.0 - chosen.difficulty() * 0.15;

        let words = combined_folded.split_whitespace().count();
        let length_factor = if words < 50 {
            1.1
        } else if words < 150 {
            1.0
        } else {
            0.9
        };

        let title_has_keyword = self
            .dictionary
            .for_topic(chosen)
            .any(|kw| kw.contained_in(title_folded));
        let title_factor = if title_has_keyword { 1.15 } else { 1.0 };

        let raw = base * difficulty_factor * length_factor * title_factor * jitter.factor(0.97, 1.03);
        round2(raw.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE))
    }
}

/// First topic holding the maximal score (strict `>` keeps earlier topics on ties).
fn pick_winner(scores: &[f32; 8]) -> Topic {
    let mut best = Topic::ALL[0];
    for topic in Topic::ALL.into_iter().skip(1) {
        if scores[topic.index()] > scores[best.index()] {
            best = topic;
        }
    }
    best
}

#[inline]
pub fn round2(x: f32) -> f32 {
    (x * 100.0).round() / 100.0
}

/// Short anonymized id for log lines; raw text is never logged.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
