//! # News Desk
//!
//! The explicit session context: scorer, article store, filter book,
//! correction log and quality counters live here and nowhere else.
//!
//! `apply_correction` is the single mutation path that touches several of
//! them at once:
//! 1. rewrite the article (topic, confidence 1.0, true topic),
//! 2. shift topic weights (`new` up, `old` down),
//! 3. append a training event and a history record,
//! 4. bump the corrected counter (and precision every 5th time).
//!
//! Callers that share a desk across tasks wrap it in a lock; the desk itself
//! has no interior mutability.

use chrono::Utc;
use tracing::info;

use crate::corrections::{title_snippet, CorrectionLog, CorrectionRecord, TrainingEvent};
use crate::filters::{evaluate_by_keywords, evaluate_by_topic, Filter, FilterBook, FilterLogic};
use crate::menu::{build_menu, resolve, MenuEntry};
use crate::metrics;
use crate::scorer::{Classification, Jitter, TopicScorer};
use crate::seed;
use crate::stats::{topic_distribution, QualityCounters, StatsSnapshot, TopicDistribution};
use crate::store::{Article, ArticleStore};
use crate::topic::{Topic, TopicChoice};
use crate::weights::TopicWeights;

#[derive(Debug, Clone, Default)]
pub struct NewsDesk {
    scorer: TopicScorer,
    store: ArticleStore,
    filters: FilterBook,
    log: CorrectionLog,
    quality: QualityCounters,
}

impl NewsDesk {
    /// Empty desk around the given scorer.
    pub fn new(scorer: TopicScorer) -> Self {
        Self {
            scorer,
            ..Self::default()
        }
    }

    /// Desk with pre-built articles (no classification is run).
    pub fn with_articles(scorer: TopicScorer, articles: Vec<Article>) -> Self {
        Self {
            scorer,
            store: ArticleStore::new(articles),
            ..Self::default()
        }
    }

    /// Classify the built-in templates and optionally add the demo filters.
    pub fn seeded<J: Jitter + ?Sized>(scorer: TopicScorer, jitter: &mut J, demo_filters: bool) -> Self {
        let articles = seed::generate_articles(&scorer, jitter);
        let mut desk = Self::with_articles(scorer, articles);
        if demo_filters {
            for f in &seed::DEMO_FILTERS {
                desk.create_filter(f.name, f.topic, f.owned_keywords(), f.logic);
            }
        }
        info!(
            articles = desk.store.len(),
            filters = desk.filters.len(),
            "news desk seeded"
        );
        desk
    }

    pub fn classify<J: Jitter + ?Sized>(&self, title: &str, body: &str, jitter: &mut J) -> Classification {
        let c = self.scorer.classify(title, body, jitter);
        metrics::record_classification(c.topic);
        c
    }

    /// Apply a user correction. `false` when `article_id` is unknown, in which
    /// case nothing changes.
    pub fn apply_correction(&mut self, article_id: u64, new_topic: Topic) -> bool {
        let Some((prev, article)) = self.store.correct(article_id, new_topic) else {
            return false;
        };
        let now = Utc::now();
        let record = CorrectionRecord {
            article_id,
            old_topic: prev.old_topic,
            new_topic,
            old_confidence: prev.old_confidence,
            new_confidence: article.confidence,
            timestamp: now,
            date: article.date.clone(),
            title: title_snippet(&article.title),
        };

        self.scorer.learn_from_correction(prev.old_topic, new_topic);
        self.log.push(
            TrainingEvent {
                article_id,
                old_topic: prev.old_topic,
                new_topic,
                timestamp: now,
            },
            record,
        );
        self.quality.record_correction();
        metrics::record_correction();

        info!(
            target: "corrections",
            article_id,
            from = %prev.old_topic,
            to = %new_topic,
            corrected = self.quality.corrected_count,
            "article corrected"
        );
        true
    }

    pub fn evaluate_by_topic(&self, choice: TopicChoice) -> Vec<&Article> {
        evaluate_by_topic(self.store.all(), choice)
    }

    pub fn evaluate_by_keywords<S: AsRef<str>>(
        &self,
        keywords: &[S],
        logic: FilterLogic,
        topic: Option<Topic>,
    ) -> Vec<&Article> {
        evaluate_by_keywords(self.store.all(), keywords, logic, topic)
    }

    /// Store a filter and log how many articles it currently matches.
    pub fn create_filter(
        &mut self,
        name: impl Into<String>,
        topic: Option<Topic>,
        keywords: Vec<String>,
        logic: FilterLogic,
    ) -> &Filter {
        let f = self.filters.create(name, topic, keywords, logic);
        if f.has_keywords() {
            let matched = evaluate_by_keywords(self.store.all(), &f.keywords, f.logic, f.topic).len();
            info!(
                target: "filters",
                id = f.id,
                name = %f.name,
                keywords = f.keywords.len(),
                matched,
                "filter created"
            );
        }
        metrics::record_filter_created();
        f
    }

    pub fn toggle_filter(&mut self, id: u64) -> Option<bool> {
        self.filters.toggle_active(id)
    }

    pub fn delete_filter(&mut self, id: u64) -> bool {
        let removed = self.filters.delete(id);
        if removed {
            metrics::record_filter_deleted();
        }
        removed
    }

    /// Articles selected by a stored filter; `None` for an unknown id.
    pub fn filter_articles(&self, id: u64) -> Option<Vec<&Article>> {
        let f = self.filters.get(id)?;
        Some(if f.has_keywords() {
            evaluate_by_keywords(self.store.all(), &f.keywords, f.logic, f.topic)
        } else {
            evaluate_by_topic(self.store.all(), f.topic.into())
        })
    }

    pub fn menu(&self) -> Vec<MenuEntry> {
        build_menu(&self.filters)
    }

    pub fn resolve_menu(&self, entry: &MenuEntry) -> Option<Vec<&Article>> {
        resolve(entry, self.store.all(), &self.filters)
    }

    /// Swap in an imported article set; history and weights are kept.
    pub fn replace_articles(&mut self, articles: Vec<Article>) -> usize {
        let previous = self.store.replace(articles);
        info!(previous, current = self.store.len(), "articles replaced");
        previous
    }

    pub fn articles(&self) -> &[Article] {
        self.store.all()
    }

    pub fn article(&self, id: u64) -> Option<&Article> {
        self.store.get(id)
    }

    pub fn filters(&self) -> &FilterBook {
        &self.filters
    }

    pub fn corrections(&self) -> &CorrectionLog {
        &self.log
    }

    pub fn recent_corrections(&self, n: usize) -> &[CorrectionRecord] {
        self.log.last_n(n)
    }

    pub fn quality(&self) -> QualityCounters {
        self.quality
    }

    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot::compute(self.quality, self.store.all())
    }

    pub fn topic_distribution(&self) -> Vec<TopicDistribution> {
        topic_distribution(self.store.all())
    }

    pub fn weights(&self) -> &TopicWeights {
        self.scorer.weights()
    }

    pub fn scorer(&self) -> &TopicScorer {
        &self.scorer
    }
}
