//! Feed selector model: a typed list of entries instead of decorated strings.
//!
//! Layout: `AllTopics`, one `Topic` per category, then (only if any filters
//! exist) a `Divider`, a `Header` and every *active* user filter, or
//! `NoActiveFilters` when all of them are switched off.

use serde::Serialize;

use crate::filters::{evaluate_by_keywords, evaluate_by_topic, FilterBook, FilterLogic};
use crate::store::Article;
use crate::topic::{Topic, TopicChoice};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MenuEntry {
    AllTopics,
    Topic {
        topic: Topic,
    },
    Divider,
    Header,
    UserFilter {
        id: u64,
        name: String,
        topic: Option<Topic>,
        logic: FilterLogic,
        keywords_preview: String,
    },
    NoActiveFilters,
}

impl MenuEntry {
    /// Entries that only decorate the list and select nothing.
    pub fn is_decoration(&self) -> bool {
        matches!(
            self,
            MenuEntry::Divider | MenuEntry::Header | MenuEntry::NoActiveFilters
        )
    }
}

/// First two keywords joined by ", ", with "..." when more follow.
pub fn keywords_preview(keywords: &[String]) -> String {
    let mut s = keywords.iter().take(2).cloned().collect::<Vec<_>>().join(", ");
    if keywords.len() > 2 {
        s.push_str("...");
    }
    s
}

pub fn build_menu(filters: &FilterBook) -> Vec<MenuEntry> {
    let mut out = Vec::with_capacity(Topic::ALL.len() + 3 + filters.len());
    out.push(MenuEntry::AllTopics);
    out.extend(Topic::ALL.into_iter().map(|topic| MenuEntry::Topic { topic }));

    if filters.is_empty() {
        return out;
    }

    out.push(MenuEntry::Divider);
    out.push(MenuEntry::Header);

    let before = out.len();
    out.extend(filters.active().map(|f| MenuEntry::UserFilter {
        id: f.id,
        name: f.name.clone(),
        topic: f.topic,
        logic: f.logic,
        keywords_preview: keywords_preview(&f.keywords),
    }));
    if out.len() == before {
        out.push(MenuEntry::NoActiveFilters);
    }
    out
}

/// Articles selected by a menu entry; `None` for decoration entries.
///
/// A user filter with keywords runs the keyword evaluation; without keywords
/// it narrows by its topic only. An id that no longer exists shows everything.
pub fn resolve<'a>(
    entry: &MenuEntry,
    articles: &'a [Article],
    filters: &FilterBook,
) -> Option<Vec<&'a Article>> {
    if entry.is_decoration() {
        return None;
    }
    let hits = match entry {
        MenuEntry::Topic { topic } => evaluate_by_topic(articles, TopicChoice::Only(*topic)),
        MenuEntry::UserFilter { id, .. } => match filters.get(*id) {
            Some(f) if f.has_keywords() => evaluate_by_keywords(articles, &f.keywords, f.logic, f.topic),
            Some(f) => evaluate_by_topic(articles, f.topic.into()),
            None => evaluate_by_topic(articles, TopicChoice::All),
        },
        _ => evaluate_by_topic(articles, TopicChoice::All),
    };
    Some(hits)
}
