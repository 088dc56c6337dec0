//! Progress report over everything saved for a learner.

use thiserror::Error;
use tracing::info;

use crate::record::{CellValue, Record, DATE_FIELD, THERAPIST_FIELD};
use crate::store::{open_learner_sheet, sheet_title, SheetClient, StoreError};
use crate::util::{mean, std_dev};

/// Marker that makes a column a performance percentage.
pub const PERCENT_MARKER: char = '%';

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no data found in '{0}'; ensure the learner name is correct and data has been saved")]
    NoData(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A plotted value; `row` is its position among the sheet's data rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub row: usize,
    pub value: f64,
}

impl Point {
    pub fn new(row: usize, value: f64) -> Self {
        Self { row, value }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.row as f64, p.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

impl Series {
    fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn mean(&self) -> Option<f64> {
        mean(&self.values())
    }

    pub fn std_dev(&self) -> Option<f64> {
        std_dev(&self.values())
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub learner: String,
    pub records: Vec<Record>,
    pub series: Vec<Series>,
    /// `Date` of each row, indexed like `Point::row`.
    pub dates: Vec<String>,
    pub notes: String,
    pub sheet_url: Option<String>,
}

/// Every field name containing `%`, in first-seen order.
pub fn percent_columns(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for name in records.iter().flat_map(|r| r.names()) {
        if name.contains(PERCENT_MARKER) && !columns.iter().any(|c| c == name) {
            columns.push(name.to_string());
        }
    }
    columns
}

/// One series per percent column; rows without a number in the column are
/// skipped rather than plotted as zero.
pub fn build_series(records: &[Record]) -> Vec<Series> {
    percent_columns(records)
        .into_iter()
        .map(|name| {
            let points = records
                .iter()
                .enumerate()
                .filter_map(|(idx, record)| {
                    record
                        .get(&name)
                        .and_then(CellValue::as_number)
                        .map(|v| Point::new(idx, v))
                })
                .collect();
            Series { name, points }
        })
        .collect()
}

pub fn date_labels(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.get(DATE_FIELD).map(|v| v.to_string()).unwrap_or_default())
        .collect()
}

/// Free-text notes for the most recent row.
pub fn session_notes(records: &[Record], learner: &str) -> Option<String> {
    let latest = records.last()?;
    let field = |name: &str| latest.get(name).map(|v| v.to_string()).unwrap_or_default();
    Some(format!(
        "Date: {}\nTherapist: {}\nLearner: {}\nPerformance Summary: {}",
        field(DATE_FIELD),
        field(THERAPIST_FIELD),
        learner,
        latest.summary()
    ))
}

pub fn generate(client: &dyn SheetClient, learner: &str) -> Result<Report, ReportError> {
    let learner = learner.trim();
    let (title, sheet) = open_learner_sheet(client, learner)?;
    let records = sheet.get_all_records()?;
    let notes = session_notes(&records, learner).ok_or_else(|| ReportError::NoData(title))?;

    let series = build_series(&records);
    info!(%learner, rows = records.len(), series = series.len(), "generated report");

    Ok(Report {
        learner: learner.to_string(),
        dates: date_labels(&records),
        series,
        notes,
        sheet_url: sheet.url(),
        records,
    })
}

/// Title shown above the report, naming the sheet it was read from.
pub fn report_title(learner: &str) -> String {
    format!("Cumulative Progress Over Time ({})", sheet_title(learner))
}
