//! # Filters
//!
//! User-defined keyword/topic predicates and their evaluation.
//!
//! Evaluation paths:
//! - `evaluate_by_topic`: everything for `TopicChoice::All`, otherwise the
//!   articles predicted as that topic.
//! - `evaluate_by_keywords`: optional topic pre-filter, then case-insensitive
//!   *substring* containment over `title + " " + body` with AND/OR logic.
//!   An empty keyword list yields no articles, even with a topic set.
//!
//! Both preserve store order. Ids come from a counter that is never reset,
//! so deleting a filter never frees its id for reuse.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::store::Article;
use crate::topic::{Topic, TopicChoice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterLogic {
    And,
    #[default]
    Or,
}

impl fmt::Display for FilterLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FilterLogic::And => "AND",
            FilterLogic::Or => "OR",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLogic(pub String);

impl fmt::Display for UnknownLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown filter logic `{}` (expected AND or OR)", self.0)
    }
}

impl std::error::Error for UnknownLogic {}

impl FromStr for FilterLogic {
    type Err = UnknownLogic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AND" | "И" => Ok(FilterLogic::And),
            "OR" | "ИЛИ" => Ok(FilterLogic::Or),
            _ => Err(UnknownLogic(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub topic: Option<Topic>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub logic: FilterLogic,
    pub active: bool,
    pub created: NaiveDate,
}

impl Filter {
    pub fn has_keywords(&self) -> bool {
        !self.keywords.is_empty()
    }
}

/// Owns the filter collection and the id counter.
#[derive(Debug, Clone)]
pub struct FilterBook {
    filters: Vec<Filter>,
    next_id: u64,
}

impl Default for FilterBook {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            next_id: 1,
        }
    }
}

impl FilterBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new active filter. Name and keywords are taken as given;
    /// trimming and blank-dropping is the caller's job (see `split_keywords`).
    pub fn create(
        &mut self,
        name: impl Into<String>,
        topic: Option<Topic>,
        keywords: Vec<String>,
        logic: FilterLogic,
    ) -> &Filter {
        let id = self.next_id;
        self.next_id += 1;
        self.filters.push(Filter {
            id,
            name: name.into(),
            topic,
            keywords,
            logic,
            active: true,
            created: Utc::now().date_naive(),
        });
        &self.filters[self.filters.len() - 1]
    }

    /// Flip the active flag; returns the new state or `None` if unknown.
    pub fn toggle_active(&mut self, id: u64) -> Option<bool> {
        let f = self.filters.iter_mut().find(|f| f.id == id)?;
        f.active = !f.active;
        Some(f.active)
    }

    /// Remove a filter; `false` if unknown.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| f.id != id);
        self.filters.len() != before
    }

    pub fn get(&self, id: u64) -> Option<&Filter> {
        self.filters.iter().find(|f| f.id == id)
    }

    pub fn all(&self) -> &[Filter] {
        &self.filters
    }

    pub fn active(&self) -> impl Iterator<Item = &Filter> + '_ {
        self.filters.iter().filter(|f| f.active)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Articles for a topic selection, in store order.
pub fn evaluate_by_topic(articles: &[Article], choice: TopicChoice) -> Vec<&Article> {
    match choice {
        TopicChoice::All => articles.iter().collect(),
        TopicChoice::Only(t) => articles.iter().filter(|a| a.predicted_topic == t).collect(),
    }
}

/// Articles whose text contains the keywords (substring, case-insensitive).
pub fn evaluate_by_keywords<'a, S: AsRef<str>>(
    articles: &'a [Article],
    keywords: &[S],
    logic: FilterLogic,
    topic: Option<Topic>,
) -> Vec<&'a Article> {
    if keywords.is_empty() {
        return Vec::new();
    }
    let needles: Vec<String> = keywords.iter().map(|k| k.as_ref().to_lowercase()).collect();

    articles
        .iter()
        .filter(|a| topic.map_or(true, |t| a.predicted_topic == t))
        .filter(|a| {
            let text = a.folded_text();
            match logic {
                FilterLogic::Or => needles.iter().any(|k| text.contains(k.as_str())),
                FilterLogic::And => needles.iter().all(|k| text.contains(k.as_str())),
            }
        })
        .collect()
}

/// Comma-separated user input → trimmed, non-empty keywords.
pub fn split_keywords(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(id: u64, topic: Topic, title: &str, body: &str) -> Article {
        Article {
            id,
            title: title.into(),
            body: body.into(),
            source: "test".into(),
            date: "01.01.2024".into(),
            predicted_topic: topic,
            confidence: 0.8,
            true_topic: None,
        }
    }

    fn corpus() -> Vec<Article> {
        vec![
            art(1, Topic::Technology, "New AI chip", "A startup ships silicon."),
            art(2, Topic::Technology, "Cloud prices", "Nothing about it."),
            art(3, Topic::Economy, "Startup funding", "Investors pour money into AI."),
            art(4, Topic::Technology, "Quantum startup", "Raises a seed round."),
        ]
    }

    fn ids(v: &[&Article]) -> Vec<u64> {
        v.iter().map(|a| a.id).collect()
    }

    #[test]
    fn empty_keywords_match_nothing() {
        let c = corpus();
        let none: [&str; 0] = [];
        assert!(evaluate_by_keywords(&c, &none, FilterLogic::Or, None).is_empty());
        assert!(evaluate_by_keywords(&c, &none, FilterLogic::And, Some(Topic::Technology)).is_empty());
    }

    #[test]
    fn or_and_and_with_topic() {
        let c = corpus();
        let kws = ["ai", "startup"];
        let or = evaluate_by_keywords(&c, &kws, FilterLogic::Or, Some(Topic::Technology));
        assert_eq!(ids(&or), vec![1, 4]);
        // "raises" carries "ai" as a substring
        let and = evaluate_by_keywords(&c, &kws, FilterLogic::And, None);
        assert_eq!(ids(&and), vec![1, 3, 4]);
    }

    #[test]
    fn substring_not_whole_word() {
        let c = vec![art(1, Topic::Economy, "Криптовалюты растут", "")];
        let hit = evaluate_by_keywords(&c, &["криптовалют"], FilterLogic::Or, None);
        assert_eq!(ids(&hit), vec![1]);
        let upper = evaluate_by_keywords(&c, &["КРИПТО"], FilterLogic::Or, None);
        assert_eq!(ids(&upper), vec![1]);
    }

    #[test]
    fn and_is_never_looser_than_or() {
        let c = corpus();
        let kws = ["startup", "seed", "ai"];
        let or = ids(&evaluate_by_keywords(&c, &kws, FilterLogic::Or, None));
        let and = ids(&evaluate_by_keywords(&c, &kws, FilterLogic::And, None));
        assert!(and.iter().all(|id| or.contains(id)));
        let single = ["quantum"];
        assert_eq!(
            ids(&evaluate_by_keywords(&c, &single, FilterLogic::Or, None)),
            ids(&evaluate_by_keywords(&c, &single, FilterLogic::And, None))
        );
    }

    #[test]
    fn by_topic_keeps_order() {
        let c = corpus();
        assert_eq!(ids(&evaluate_by_topic(&c, TopicChoice::All)), vec![1, 2, 3, 4]);
        assert_eq!(
            ids(&evaluate_by_topic(&c, TopicChoice::Only(Topic::Technology))),
            vec![1, 2, 4]
        );
        assert!(evaluate_by_topic(&c, TopicChoice::Only(Topic::Sport)).is_empty());
    }

    #[test]
    fn ids_are_never_reused_after_delete() {
        let mut b = FilterBook::new();
        let a = b.create("a", None, vec!["x".into()], FilterLogic::Or).id;
        let second = b.create("b", None, vec![], FilterLogic::And).id;
        assert!(b.delete(a));
        let c = b.create("c", Some(Topic::Sport), vec![], FilterLogic::Or).id;
        assert_eq!((a, second, c), (1, 2, 3));
        assert!(!b.delete(a));
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn toggle_flips_and_reports_unknown() {
        let mut b = FilterBook::new();
        let id = b.create("f", None, vec![], FilterLogic::Or).id;
        assert!(b.get(id).map(|f| f.active).unwrap_or(false));
        assert_eq!(b.toggle_active(id), Some(false));
        assert_eq!(b.active().count(), 0);
        assert_eq!(b.toggle_active(id), Some(true));
        assert_eq!(b.toggle_active(42), None);
    }

    #[test]
    fn split_keywords_trims_and_drops_blanks() {
        assert_eq!(split_keywords(" ai, ,startup ,,"), vec!["ai", "startup"]);
        assert!(split_keywords("   ").is_empty());
    }

    #[test]
    fn logic_parses_both_cases() {
        assert_eq!("and".parse::<FilterLogic>().unwrap(), FilterLogic::And);
        assert_eq!(" OR ".parse::<FilterLogic>().unwrap(), FilterLogic::Or);
        assert_eq!("xor".parse::<FilterLogic>(), Err(UnknownLogic("xor".into())));
        assert!(UnknownLogic("xor".into()).to_string().contains("AND or OR"));
        assert_eq!(serde_json::to_value(FilterLogic::And).unwrap(), serde_json::json!("AND"));
    }
}
