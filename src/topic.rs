//! # Topics
//!
//! The fixed set of eight classification categories.
//!
//! Iteration order is part of the contract: `Topic::ALL` is the order used
//! for scoring and tie-breaks (first topic with the maximal score wins), for
//! the feed dropdown and for per-topic statistics. Do not reorder.
//!
//! Labels are the Russian display names used by the article data; parsing
//! accepts either the label or the English variant name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "Политика", alias = "Politics")]
    Politics,
    #[serde(rename = "Экономика", alias = "Economy")]
    Economy,
    #[serde(rename = "Технологии", alias = "Technology")]
    Technology,
    #[serde(rename = "Наука", alias = "Science")]
    Science,
    #[serde(rename = "Медицина", alias = "Medicine")]
    Medicine,
    #[serde(rename = "Спорт", alias = "Sport")]
    Sport,
    #[serde(rename = "Культура", alias = "Culture")]
    Culture,
    #[serde(rename = "Образование", alias = "Education")]
    Education,
}

/// Label of the "no topic constraint" choice in the feed.
pub const ALL_TOPICS_LABEL: &str = "Все темы";

impl Topic {
    /// Stable iteration order (scoring, tie-break, UI lists).
    pub const ALL: [Topic; 8] = [
        Topic::Politics,
        Topic::Economy,
        Topic::Technology,
        Topic::Science,
        Topic::Medicine,
        Topic::Sport,
        Topic::Culture,
        Topic::Education,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Topic::Politics => "Политика",
            Topic::Economy => "Экономика",
            Topic::Technology => "Технологии",
            Topic::Science => "Наука",
            Topic::Medicine => "Медицина",
            Topic::Sport => "Спорт",
            Topic::Culture => "Культура",
            Topic::Education => "Образование",
        }
    }

    pub fn english(self) -> &'static str {
        match self {
            Topic::Politics => "Politics",
            Topic::Economy => "Economy",
            Topic::Technology => "Technology",
            Topic::Science => "Science",
            Topic::Medicine => "Medicine",
            Topic::Sport => "Sport",
            Topic::Culture => "Culture",
            Topic::Education => "Education",
        }
    }

    /// Simulated difficulty of the topic; feeds `1 - difficulty * 0.15`
    /// in the confidence heuristic.
    pub fn difficulty(self) -> f32 {
        match self {
            Topic::Politics => 0.7,
            Topic::Economy => 0.6,
            Topic::Technology => 0.8,
            Topic::Science => 0.9,
            Topic::Medicine => 0.85,
            Topic::Sport => 0.5,
            Topic::Culture => 0.6,
            Topic::Education => 0.7,
        }
    }

    /// Position in `Topic::ALL`; used to index per-topic arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTopic(pub String);

impl fmt::Display for UnknownTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown topic `{}`", self.0)
    }
}

impl std::error::Error for UnknownTopic {}

impl FromStr for Topic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        Topic::ALL
            .into_iter()
            .find(|topic| topic.label() == t || topic.english().eq_ignore_ascii_case(t))
            .ok_or_else(|| UnknownTopic(t.to_string()))
    }
}

/// A topic selector that may also be the "all topics" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicChoice {
    All,
    Only(Topic),
}

impl TopicChoice {
    pub fn as_topic(self) -> Option<Topic> {
        match self {
            TopicChoice::All => None,
            TopicChoice::Only(t) => Some(t),
        }
    }
}

impl From<Option<Topic>> for TopicChoice {
    fn from(t: Option<Topic>) -> Self {
        t.map(TopicChoice::Only).unwrap_or(TopicChoice::All)
    }
}

impl FromStr for TopicChoice {
    type Err = UnknownTopic;

    /// Empty text, the "Все темы" label or `all` select everything.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.is_empty() || t == ALL_TOPICS_LABEL || t.eq_ignore_ascii_case("all") {
            return Ok(TopicChoice::All);
        }
        t.parse().map(TopicChoice::Only)
    }
}
