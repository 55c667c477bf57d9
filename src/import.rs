//! Import of an articles JSON export (`{ "articles": [...] }`).
//!
//! Topics are read by display name (or English name); a blank `true_topic`
//! counts as "not corrected". Ids must be unique and confidences must lie in
//! `[0, 1]`; the whole file is rejected otherwise.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;

use crate::store::Article;
use crate::topic::Topic;

#[derive(Debug, Deserialize)]
struct ArticlesFile {
    #[serde(default)]
    export_date: Option<String>,
    articles: Vec<ImportedArticle>,
}

#[derive(Debug, Deserialize)]
struct ImportedArticle {
    id: u64,
    title: String,
    content: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    date: String,
    predicted_topic: Topic,
    confidence: f32,
    #[serde(default, deserialize_with = "blank_topic")]
    true_topic: Option<Topic>,
}

fn blank_topic<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Topic>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

pub fn parse_articles_json(json: &str) -> Result<Vec<Article>> {
    let file: ArticlesFile = serde_json::from_str(json).context("invalid articles JSON")?;
    tracing::debug!(
        exported = file.export_date.as_deref().unwrap_or("-"),
        count = file.articles.len(),
        "articles file parsed"
    );

    let mut seen = HashSet::with_capacity(file.articles.len());
    let mut out = Vec::with_capacity(file.articles.len());
    for a in file.articles {
        if !seen.insert(a.id) {
            bail!("duplicate article id {}", a.id);
        }
        if !(0.0..=1.0).contains(&a.confidence) {
            bail!("article {}: confidence {} outside [0, 1]", a.id, a.confidence);
        }
        out.push(Article {
            id: a.id,
            title: a.title,
            body: a.content,
            source: a.source,
            date: a.date,
            predicted_topic: a.predicted_topic,
            confidence: a.confidence,
            true_topic: a.true_topic,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desk::NewsDesk;
    use crate::export::write_articles_json;
    use crate::scorer::{NoJitter, TopicScorer};

    #[test]
    fn export_then_import_keeps_ids_and_corrections() {
        let mut d = NewsDesk::seeded(TopicScorer::default(), &mut NoJitter, false);
        d.apply_correction(7, Topic::Education);
        let mut buf = Vec::new();
        write_articles_json(&mut buf, d.articles()).unwrap();

        let back = parse_articles_json(std::str::from_utf8(&buf).unwrap()).unwrap();
        assert_eq!(back.len(), 23);
        assert_eq!(back[6].true_topic, Some(Topic::Education));
        assert_eq!(back[6].confidence, 1.0);
        assert_eq!(back[0].body, d.articles()[0].body);
    }

    #[test]
    fn blank_true_topic_and_english_names() {
        let json = r#"{"articles":[
            {"id":1,"title":"t","content":"c","source":"s","date":"d",
             "predicted_topic":"Sport","confidence":0.7,"true_topic":""},
            {"id":2,"title":"t","content":"c",
             "predicted_topic":"Наука","confidence":0.9,"true_topic":"Medicine"}
        ]}"#;
        let arts = parse_articles_json(json).unwrap();
        assert_eq!(arts[0].predicted_topic, Topic::Sport);
        assert_eq!(arts[0].true_topic, None);
        assert_eq!(arts[1].true_topic, Some(Topic::Medicine));
    }

    #[test]
    fn rejects_bad_input() {
        let dup = r#"{"articles":[
            {"id":1,"title":"","content":"","predicted_topic":"Спорт","confidence":0.7},
            {"id":1,"title":"","content":"","predicted_topic":"Спорт","confidence":0.7}
        ]}"#;
        assert!(parse_articles_json(dup).is_err());
        let conf = r#"{"articles":[{"id":1,"title":"","content":"","predicted_topic":"Спорт","confidence":1.5}]}"#;
        assert!(parse_articles_json(conf).is_err());
        let topic = r#"{"articles":[{"id":1,"title":"","content":"","predicted_topic":"Погода","confidence":0.5}]}"#;
        assert!(parse_articles_json(topic).is_err());
    }
}
