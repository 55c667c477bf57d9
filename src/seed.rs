//! Built-in demo data: article templates and filters.
//!
//! Each template carries a target confidence band. After classification the
//! confidence is nudged toward that band (high: `min(0.98, c * 1.1)`,
//! low: `max(0.60, c * 0.85)`, medium untouched) and re-rounded to 2 decimals.
//! Ids are assigned `1..=N` in template order.

use tracing::info;

use crate::filters::FilterLogic;
use crate::scorer::{round2, Jitter, TopicScorer, MAX_CONFIDENCE, MIN_CONFIDENCE};
use crate::stats::{topic_distribution, ConfidenceBand};
use crate::store::Article;
use crate::topic::Topic;

use ConfidenceBand::{High, Low, Medium};

#[derive(Debug, Clone, Copy)]
pub struct ArticleTemplate {
    pub title: &'static str,
    pub body: &'static str,
    pub source: &'static str,
    pub date: &'static str,
    pub target: ConfidenceBand,
}

const fn tpl(
    title: &'static str,
    body: &'static str,
    source: &'static str,
    date: &'static str,
    target: ConfidenceBand,
) -> ArticleTemplate {
    ArticleTemplate {
        title,
        body,
        source,
        date,
        target,
    }
}

pub const ARTICLE_TEMPLATES: [ArticleTemplate; 23] = [
    tpl(
        "Президент подписал новый закон о выборах",
        "Документ вносит изменения в избирательное законодательство.",
        "Ведомости",
        "10.01.2024",
        High,
    ),
    tpl(
        "Фондовый рынок показал рекордный рост",
        "Основные индексы выросли на 3-5% за торговую сессию.",
        "РБК",
        "15.01.2024",
        High,
    ),
    tpl(
        "Новый квантовый компьютер установил рекорд",
        "Ученые представили процессор с 512 кубитами.",
        "Хабр",
        "14.01.2024",
        High,
    ),
    tpl(
        "Утверждена вакцина от сезонного гриппа",
        "Минздрав одобрил препарат с эффективностью 95%.",
        "Медпортал",
        "13.01.2024",
        High,
    ),
    tpl(
        "Финальный матч чемпионата мира по футболу",
        "Сборная Аргентины обыграла Бразилию со счетом 3:2.",
        "Спорт-Экспресс",
        "07.01.2024",
        High,
    ),
    tpl(
        "Экономические реформы и их влияние",
        "Эксперты обсуждают последствия изменений в налоговом кодексе.",
        "Ведомости",
        "09.01.2024",
        Medium,
    ),
    tpl(
        "Кибербезопасность в современном мире",
        "Специалисты обсуждают методы защиты от кибератак.",
        "SecurityLab",
        "08.01.2024",
        Medium,
    ),
    tpl(
        "Климатические исследования и их значение",
        "Ученые представили данные о глобальном потеплении.",
        "Nature",
        "06.01.2024",
        Medium,
    ),
    tpl(
        "Дистанционное обучение: преимущества и недостатки",
        "Исследование показало результаты онлайн-образования.",
        "Education Week",
        "05.01.2024",
        Medium,
    ),
    tpl(
        "Цифровое искусство в современных музеях",
        "Музеи начинают приобретать цифровые произведения.",
        "ArtNews",
        "04.01.2024",
        Medium,
    ),
    tpl(
        "Искусственный интеллект в медицинской диагностике",
        "Нейросети помогают врачам в анализе медицинских снимков.",
        "N+1",
        "11.01.2024",
        Low,
    ),
    tpl(
        "Цифровизация образовательной системы",
        "Технологии меняют подход к обучению в школах и вузах.",
        "Коммерсант",
        "12.01.2024",
        Low,
    ),
    tpl(
        "Научные исследования в области биотехнологий",
        "Ученые работают над созданием новых сортов растений.",
        "AgroNews",
        "03.01.2024",
        Low,
    ),
    tpl(
        "Финансирование технологических стартапов",
        "Инвесторы вкладывают средства в перспективные проекты.",
        "Bloomberg",
        "02.01.2024",
        Low,
    ),
    tpl(
        "Спортивная аналитика и использование данных",
        "Команды применяют big data для анализа выступлений.",
        "SportsTech",
        "01.01.2024",
        Low,
    ),
    tpl(
        "Разработка программного обеспечения для науки",
        "IT-компании создают софт для исследовательских задач.",
        "Хабр",
        "31.12.2023",
        Medium,
    ),
    tpl(
        "Музейные технологии и виртуальная реальность",
        "Экспозиции становятся интерактивными с помощью VR.",
        "Культура.рф",
        "30.12.2023",
        Medium,
    ),
    tpl(
        "Экономика и экология: поиск баланса",
        "Предприятия внедряют зеленые технологии.",
        "ЭкоНовости",
        "29.12.2023",
        Low,
    ),
    tpl(
        "Медицинские исследования и этика",
        "Ученые обсуждают вопросы биоэтики в экспериментах.",
        "Медновости",
        "28.12.2023",
        Low,
    ),
    tpl(
        "Политика и международные отношения",
        "Страны обсуждают новые форматы сотрудничества.",
        "Euronews",
        "27.12.2023",
        Medium,
    ),
    tpl(
        "Искусственный интеллект в диагностике рака",
        "Нейросети показали высокую точность в обнаружении опухолей на ранних стадиях.",
        "Медновости",
        "16.01.2024",
        High,
    ),
    tpl(
        "Инвестиции в криптовалюты достигли рекордного уровня",
        "Биткоин привлек более 10 млрд долларов инвестиций в этом году.",
        "РБК",
        "17.01.2024",
        High,
    ),
    tpl(
        "Квантовый компьютер для медицинских исследований",
        "Ученые используют квантовые вычисления для разработки новых лекарств.",
        "Хабр",
        "18.01.2024",
        Medium,
    ),
];

/// Nudge a classifier confidence toward the template's target band.
pub fn adjust_for_band(confidence: f32, target: ConfidenceBand) -> f32 {
    let c = match target {
        ConfidenceBand::High => (confidence * 1.1).min(MAX_CONFIDENCE),
        ConfidenceBand::Low => (confidence * 0.85).max(MIN_CONFIDENCE),
        ConfidenceBand::Medium => confidence,
    };
    round2(c)
}

/// Classify every template and return the seeded articles.
pub fn generate_articles<J: Jitter + ?Sized>(scorer: &TopicScorer, jitter: &mut J) -> Vec<Article> {
    let articles: Vec<Article> = ARTICLE_TEMPLATES
        .iter()
        .zip(1u64..)
        .map(|(t, id)| {
            let c = scorer.classify(t.title, t.body, jitter);
            Article {
                id,
                title: t.title.to_string(),
                body: t.body.to_string(),
                source: t.source.to_string(),
                date: t.date.to_string(),
                predicted_topic: c.topic,
                confidence: adjust_for_band(c.confidence, t.target),
                true_topic: None,
            }
        })
        .collect();

    for d in topic_distribution(&articles) {
        info!(
            topic = %d.topic,
            count = d.count,
            avg_confidence = d.avg_confidence,
            high = d.bands.high,
            medium = d.bands.medium,
            low = d.bands.low,
            "seed distribution"
        );
    }
    articles
}

pub struct DemoFilter {
    pub name: &'static str,
    pub topic: Option<Topic>,
    pub keywords: &'static [&'static str],
    pub logic: FilterLogic,
}

impl DemoFilter {
    pub fn owned_keywords(&self) -> Vec<String> {
        self.keywords.iter().map(|k| k.to_string()).collect()
    }
}

pub const DEMO_FILTERS: [DemoFilter; 5] = [
    DemoFilter {
        name: "ИИ в медицине",
        topic: Some(Topic::Medicine),
        keywords: &["искусственный интеллект", "диагностика", "нейросеть"],
        logic: FilterLogic::Or,
    },
    DemoFilter {
        name: "Крипто-инвестиции",
        topic: Some(Topic::Economy),
        keywords: &["криптовалют", "биткоин", "инвестици"],
        logic: FilterLogic::Or,
    },
    DemoFilter {
        name: "Высокие технологии",
        topic: Some(Topic::Technology),
        keywords: &["квантовый", "искусственный интеллект", "нейросеть"],
        logic: FilterLogic::Or,
    },
    DemoFilter {
        name: "Сложные мед исследования",
        topic: Some(Topic::Medicine),
        keywords: &["исследование", "ученые", "вакцин"],
        logic: FilterLogic::And,
    },
    DemoFilter {
        name: "Инвестиции и стартапы",
        topic: None,
        keywords: &["инвестиции", "стартап", "финансирование"],
        logic: FilterLogic::Or,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterBook;
    use crate::scorer::NoJitter;

    #[test]
    fn band_adjustment_rules() {
        assert_eq!(adjust_for_band(0.85, ConfidenceBand::Medium), 0.85);
        assert_eq!(adjust_for_band(0.93, ConfidenceBand::High), MAX_CONFIDENCE);
        assert!((adjust_for_band(0.80, ConfidenceBand::High) - 0.88).abs() < 1e-6);
        assert!((adjust_for_band(0.80, ConfidenceBand::Low) - 0.68).abs() < 1e-6);
        assert_eq!(adjust_for_band(0.64, ConfidenceBand::Low), MIN_CONFIDENCE);
    }

    #[test]
    fn seeds_every_template_in_order() {
        let arts = generate_articles(&TopicScorer::default(), &mut NoJitter);
        assert_eq!(arts.len(), ARTICLE_TEMPLATES.len());
        assert!(arts.iter().zip(1u64..).all(|(a, id)| a.id == id));
        assert!(arts.iter().all(|a| (0.0..=1.0).contains(&a.confidence) && a.true_topic.is_none()));
        assert_eq!(arts[0].predicted_topic, Topic::Politics);
        assert_eq!(arts[4].predicted_topic, Topic::Sport);
    }

    #[test]
    fn demo_filters_get_sequential_ids() {
        let mut book = FilterBook::new();
        for f in &DEMO_FILTERS {
            book.create(f.name, f.topic, f.owned_keywords(), f.logic);
        }
        let ids: Vec<u64> = book.all().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(book.get(4).map(|f| f.logic), Some(FilterLogic::And));
        assert_eq!(book.get(5).and_then(|f| f.topic), None);
    }
}
