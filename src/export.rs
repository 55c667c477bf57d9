//! # Export
//!
//! JSON/CSV/XLSX dumps of the desk state. Every writer has a `Write`-based
//! form (used by tests and the HTTP layer) and the bundle writer `export_all`
//! which lays out a timestamped folder:
//!
//! ```text
//! <dir>/NewsClassify_Export_<YYYYmmdd_HHMMSS>/
//!     articles.json
//!     filters.json
//!     statistics.json
//!     README.txt
//! ```

use anyhow::{Context, Result};
use chrono::Local;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::corrections::CorrectionRecord;
use crate::desk::NewsDesk;
use crate::filters::Filter;
use crate::stats::StatsSnapshot;
use crate::store::Article;
use crate::topic::Topic;

pub const EXPORT_FOLDER_PREFIX: &str = "NewsClassify_Export_";

const XLSX_SHEET: &str = "Статьи";
const XLSX_HEADERS: [&str; 9] = [
    "ID",
    "Заголовок",
    "Содержание",
    "Источник",
    "Дата",
    "Предсказанная тема",
    "Уверенность (%)",
    "Исправленная тема",
    "Исправлена",
];
const XLSX_MAX_WIDTH: usize = 50;

/// Output format for a single articles export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown export format `{}` (expected json, csv or xlsx)", self.0)
    }
}

impl std::error::Error for UnknownFormat {}

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// `news_<kind>_<YYYYmmdd_HHMMSS>.<ext>`
pub fn export_file_name(kind: &str, ext: &str) -> String {
    format!("news_{kind}_{}.{ext}", Local::now().format("%Y%m%d_%H%M%S"))
}

#[derive(Debug, Serialize)]
struct ArticleRow<'a> {
    id: u64,
    title: &'a str,
    content: &'a str,
    source: &'a str,
    date: &'a str,
    predicted_topic: Topic,
    confidence: f32,
    true_topic: Option<Topic>,
    is_corrected: bool,
}

impl<'a> From<&'a Article> for ArticleRow<'a> {
    fn from(a: &'a Article) -> Self {
        Self {
            id: a.id,
            title: &a.title,
            content: &a.body,
            source: &a.source,
            date: &a.date,
            predicted_topic: a.predicted_topic,
            confidence: a.confidence,
            true_topic: a.true_topic,
            is_corrected: a.is_corrected(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: u64,
    title: &'a str,
    content: &'a str,
    source: &'a str,
    date: &'a str,
    predicted_topic: Topic,
    confidence: f32,
    true_topic: Option<Topic>,
    is_corrected: &'static str,
}

#[derive(Debug, Serialize)]
struct ArticlesDoc<'a> {
    export_date: String,
    total_articles: usize,
    articles: Vec<ArticleRow<'a>>,
}

#[derive(Debug, Serialize)]
struct FiltersDoc<'a> {
    export_date: String,
    total_filters: usize,
    filters: &'a [Filter],
}

#[derive(Debug, Serialize)]
struct StatsSummary {
    total_corrections: usize,
    avg_confidence: f32,
    precision: f32,
}

#[derive(Debug, Serialize)]
struct StatsDoc<'a> {
    export_date: String,
    statistics: &'a StatsSnapshot,
    correction_history: &'a [CorrectionRecord],
    summary: StatsSummary,
}

fn export_date() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

pub fn write_articles_json<W: Write>(w: W, articles: &[Article]) -> Result<()> {
    let doc = ArticlesDoc {
        export_date: export_date(),
        total_articles: articles.len(),
        articles: articles.iter().map(ArticleRow::from).collect(),
    };
    serde_json::to_writer_pretty(w, &doc).context("serialize articles")
}

pub fn write_articles_csv<W: Write>(w: W, articles: &[Article]) -> Result<()> {
    let mut out = csv::Writer::from_writer(w);
    for a in articles {
        out.serialize(CsvRow {
            id: a.id,
            title: &a.title,
            content: &a.body,
            source: &a.source,
            date: &a.date,
            predicted_topic: a.predicted_topic,
            confidence: a.confidence,
            true_topic: a.true_topic,
            is_corrected: if a.is_corrected() { "Да" } else { "Нет" },
        })
        .with_context(|| format!("write csv row for article {}", a.id))?;
    }
    out.flush().context("flush csv")?;
    Ok(())
}

/// One sheet, bold header row, column widths fitted to content (max 50).
pub fn write_articles_xlsx<W: Write>(mut w: W, articles: &[Article]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(XLSX_SHEET)?;

    let bold = Format::new().set_bold();
    let mut widths = [0usize; XLSX_HEADERS.len()];
    for (col, header) in XLSX_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
        widths[col] = header.chars().count();
    }

    for (i, a) in articles.iter().enumerate() {
        let row = i as u32 + 1;
        let percent = (f64::from(a.confidence) * 100.0).round();
        let true_topic = a.true_topic.map(Topic::label).unwrap_or("");
        let flag = if a.is_corrected() { "Да" } else { "Нет" };

        sheet.write_number(row, 0, a.id as f64)?;
        sheet.write_number(row, 6, percent)?;
        let texts = [
            (1, a.title.as_str()),
            (2, a.body.as_str()),
            (3, a.source.as_str()),
            (4, a.date.as_str()),
            (5, a.predicted_topic.label()),
            (7, true_topic),
            (8, flag),
        ];
        for (col, text) in texts {
            sheet.write_string(row, col as u16, text)?;
            widths[col] = widths[col].max(text.chars().count());
        }
        widths[0] = widths[0].max(a.id.to_string().len());
        widths[6] = widths[6].max(percent.to_string().len());
    }

    for (col, width) in widths.iter().enumerate() {
        sheet.set_column_width(col as u16, (*width + 2).min(XLSX_MAX_WIDTH) as f64)?;
    }

    let bytes = workbook.save_to_buffer().context("build xlsx workbook")?;
    w.write_all(&bytes).context("write xlsx")
}

pub fn write_articles<W: Write>(format: ExportFormat, w: W, articles: &[Article]) -> Result<()> {
    match format {
        ExportFormat::Json => write_articles_json(w, articles),
        ExportFormat::Csv => write_articles_csv(w, articles),
        ExportFormat::Xlsx => write_articles_xlsx(w, articles),
    }
}

pub fn write_filters_json<W: Write>(w: W, filters: &[Filter]) -> Result<()> {
    let doc = FiltersDoc {
        export_date: export_date(),
        total_filters: filters.len(),
        filters,
    };
    serde_json::to_writer_pretty(w, &doc).context("serialize filters")
}

pub fn write_stats_json<W: Write>(w: W, stats: &StatsSnapshot, history: &[CorrectionRecord]) -> Result<()> {
    let doc = StatsDoc {
        export_date: export_date(),
        statistics: stats,
        correction_history: history,
        summary: StatsSummary {
            total_corrections: history.len(),
            avg_confidence: stats.avg_confidence,
            precision: stats.quality.precision,
        },
    };
    serde_json::to_writer_pretty(w, &doc).context("serialize statistics")
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    Ok(BufWriter::new(f))
}

/// Write the full bundle into a fresh timestamped folder under `dir`
/// and return the folder path.
pub fn export_all(dir: &Path, desk: &NewsDesk) -> Result<PathBuf> {
    let folder = dir.join(format!(
        "{EXPORT_FOLDER_PREFIX}{}",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    fs::create_dir_all(&folder).with_context(|| format!("create export folder {}", folder.display()))?;

    let mut w = create(&folder.join("articles.json"))?;
    write_articles_json(&mut w, desk.articles())?;
    w.flush()?;

    let mut w = create(&folder.join("filters.json"))?;
    write_filters_json(&mut w, desk.filters().all())?;
    w.flush()?;

    let mut w = create(&folder.join("statistics.json"))?;
    write_stats_json(&mut w, &desk.stats(), desk.corrections().history())?;
    w.flush()?;

    fs::write(folder.join("README.txt"), readme())
        .with_context(|| format!("write README in {}", folder.display()))?;

    info!(
        folder = %folder.display(),
        articles = desk.articles().len(),
        filters = desk.filters().len(),
        "export bundle written"
    );
    Ok(folder)
}

fn readme() -> String {
    format!(
        "NewsClassify - экспорт данных
==============================

Дата экспорта: {}

Содержимое папки:
1. articles.json    - все статьи
2. filters.json     - пользовательские фильтры
3. statistics.json  - статистика и история исправлений

articles.json
  articles[]: id, title, content, source, date,
              predicted_topic, confidence (0-1), true_topic, is_corrected

filters.json
  filters[]: id, name, topic, keywords, logic (AND/OR), active, created

statistics.json
  statistics: precision, recall, f1_score, corrected_count, total_articles,
              high/medium/low_confidence, avg_confidence
  correction_history[]: article_id, old_topic, new_topic,
                        old_confidence, new_confidence, timestamp, date, title
  summary: total_corrections, avg_confidence, precision

Файл articles.json можно импортировать обратно.
",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}
