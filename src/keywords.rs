//! # Keyword Dictionary
//!
//! Static topic → tier → keyword configuration used by the scorer.
//!
//! - Built-in dictionary (`KeywordDictionary::builtin()`) mirrors the demo data.
//! - Optional TOML override (see `from_toml_str` for the shape).
//! - Keywords are kept as written; only the scanned text is case-folded.
//!   A keyword with capitals (`IT`) therefore never matches.
//! - Each keyword is compiled into a Unicode word-boundary regex so Cyrillic
//!   phrases match as whole words.
//!
//! Read-only after construction.

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::topic::Topic;

/// Keyword strength class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Strong,
    Medium,
    Weak,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Strong, Tier::Medium, Tier::Weak];

    pub fn weight(self) -> f32 {
        match self {
            Tier::Strong => 5.0,
            Tier::Medium => 3.0,
            Tier::Weak => 1.0,
        }
    }
}

/// One compiled keyword.
#[derive(Debug, Clone)]
pub struct KeywordEntry {
    pub topic: Topic,
    pub tier: Tier,
    /// Phrase as written in the dictionary (trimmed).
    pub phrase: String,
    re: Regex,
}

impl KeywordEntry {
    fn compile(topic: Topic, tier: Tier, raw: &str) -> Result<Self> {
        let phrase = raw.trim().to_string();
        if phrase.is_empty() {
            return Err(anyhow!("empty keyword for topic `{}`", topic));
        }
        let re = Regex::new(&format!(r"\b{}\b", regex::escape(&phrase)))
            .map_err(|e| anyhow!("keyword `{}` regex error: {}", phrase, e))?;
        Ok(Self {
            topic,
            tier,
            phrase,
            re,
        })
    }

    /// Non-overlapping whole-word occurrences in already case-folded text.
    pub fn count_in(&self, folded: &str) -> usize {
        self.re.find_iter(folded).count()
    }

    /// Plain substring containment in already case-folded text.
    #[inline]
    pub fn contained_in(&self, folded: &str) -> bool {
        folded.contains(self.phrase.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct KeywordDictionary {
    entries: Vec<KeywordEntry>,
}

/* ----------------------------
Config schema (from TOML)
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
struct DictionaryRoot {
    topics: Vec<TopicKeywordsCfg>,
}

#[derive(Debug, Clone, Deserialize)]
struct TopicKeywordsCfg {
    topic: Topic,
    #[serde(default)]
    strong: Vec<String>,
    #[serde(default)]
    medium: Vec<String>,
    #[serde(default)]
    weak: Vec<String>,
}

struct RawTiers {
    strong: &'static [&'static str],
    medium: &'static [&'static str],
    weak: &'static [&'static str],
}

fn builtin_raw(topic: Topic) -> RawTiers {
    match topic {
        Topic::Politics => RawTiers {
            strong: &["правительство", "выборы", "президент", "санкции", "законопроект", "депутат"],
            medium: &["политика", "власть", "голосование", "реформа", "администрация"],
            weak: &["политик", "кампания", "переговоры", "дипломатия"],
        },
        Topic::Economy => RawTiers {
            strong: &["экономика", "инвестиции", "инфляция", "рынок", "бирж", "криптовалют"],
            medium: &["финансы", "бизнес", "валюта", "банк", "фондовый"],
            weak: &["деньги", "стоимость", "прибыль", "убыток", "доход"],
        },
        Topic::Technology => RawTiers {
            strong: &["искусственный интеллект", "нейросеть", "квантовый", "программирование", "алгоритм"],
            medium: &["технологии", "гаджет", "стартап", "инновации", "IT", "цифровой"],
            weak: &["компьютер", "смартфон", "приложение", "интернет", "софт"],
        },
        Topic::Science => RawTiers {
            strong: &["научное открытие", "исследование", "эксперимент", "лаборатория", "гипотеза"],
            medium: &["наука", "ученые", "публикация", "теория", "открытие"],
            weak: &["исследователь", "научный", "изучение", "анализ", "метод"],
        },
        Topic::Medicine => RawTiers {
            strong: &["медицина", "диагностика", "вакцина", "лекарство", "терапия", "онкология"],
            medium: &["здоровье", "врач", "больница", "пациент", "лечение", "профилактика"],
            weak: &["медицинский", "клиника", "здоровье", "диагноз", "симптом"],
        },
        Topic::Sport => RawTiers {
            strong: &["чемпионат", "олимпиада", "футбол", "матч", "победа", "рекорд"],
            medium: &["спорт", "игрок", "соревнование", "тренировка", "команда"],
            weak: &["спортсмен", "игра", "турнир", "соревнования", "лига"],
        },
        Topic::Culture => RawTiers {
            strong: &["культура", "искусство", "музей", "театр", "выставка", "концерт"],
            medium: &["фильм", "литература", "музыка", "артист", "художник"],
            weak: &["культурный", "творчество", "произведение", "исполнитель", "автор"],
        },
        Topic::Education => RawTiers {
            strong: &["образование", "университет", "студент", "экзамен", "учебник", "курс"],
            medium: &["школа", "обучение", "преподаватель", "программа", "диплом"],
            weak: &["учебный", "занятие", "урок", "лекция", "семинар"],
        },
    }
}

static BUILTIN: Lazy<KeywordDictionary> = Lazy::new(|| {
    let mut entries = Vec::new();
    for topic in Topic::ALL {
        let raw = builtin_raw(topic);
        for (tier, words) in [
            (Tier::Strong, raw.strong),
            (Tier::Medium, raw.medium),
            (Tier::Weak, raw.weak),
        ] {
            for w in words.iter() {
                entries.push(KeywordEntry::compile(topic, tier, w).expect("valid builtin keyword"));
            }
        }
    }
    KeywordDictionary { entries }
});

impl KeywordDictionary {
    /// Built-in dictionary (compiled once per process).
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Load from a TOML string:
    ///
    /// ```toml
    /// [[topics]]
    /// topic = "Спорт"
    /// strong = ["матч", "чемпионат"]
    /// medium = ["команда"]
    /// weak = ["игра"]
    /// ```
    ///
    /// Entries are stored in `Topic::ALL` order regardless of file order.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let root: DictionaryRoot = toml::from_str(toml_str)?;
        let mut entries = Vec::new();
        for topic in Topic::ALL {
            for cfg in root.topics.iter().filter(|c| c.topic == topic) {
                for (tier, words) in [
                    (Tier::Strong, &cfg.strong),
                    (Tier::Medium, &cfg.medium),
                    (Tier::Weak, &cfg.weak),
                ] {
                    for w in words {
                        entries.push(KeywordEntry::compile(topic, tier, w)?);
                    }
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading keyword dictionary from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing keyword dictionary {}", path.display()))
    }

    /// All entries in stable (topic, tier, file) order.
    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }

    pub fn for_topic(&self, topic: Topic) -> impl Iterator<Item = &KeywordEntry> + '_ {
        self.entries.iter().filter(move |e| e.topic == topic)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KeywordDictionary {
    fn default() -> Self {
        Self::builtin()
    }
}
