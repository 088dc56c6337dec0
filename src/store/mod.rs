//! Per-learner spreadsheet persistence.
//!
//! A [`SheetClient`] opens worksheets by title; a [`Worksheet`] appends rows
//! and reads every data row back keyed by its header. The adapter functions
//! [`save`] and [`load`] resolve the learner's sheet title and never create
//! sheets or write headers.

pub mod credentials;
pub mod csv_book;
pub mod google;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::record::{CellValue, Record};

pub use csv_book::CsvWorkbook;
pub use google::GoogleSheets;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sheet '{0}' not found; ensure it exists and is shared with the service account")]
    SheetNotFound(String),
    #[error("learner name is empty")]
    InvalidLearner,
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("spreadsheet service unreachable: {0}")]
    Unreachable(String),
    #[error("spreadsheet service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub trait Worksheet {
    fn append_row(&mut self, values: &[CellValue]) -> Result<(), StoreError>;

    fn get_all_records(&self) -> Result<Vec<Record>, StoreError>;

    /// Browser link to the sheet, when the backend has one.
    fn url(&self) -> Option<String> {
        None
    }
}

pub trait SheetClient {
    fn open(&self, title: &str) -> Result<Box<dyn Worksheet + '_>, StoreError>;

    /// Short backend name for the header bar.
    fn describe(&self) -> String;
}

pub fn sheet_title(learner: &str) -> String {
    format!("{learner}_Data")
}

/// Resolve and open the learner's sheet.
pub fn open_learner_sheet<'a>(
    client: &'a dyn SheetClient,
    learner: &str,
) -> Result<(String, Box<dyn Worksheet + 'a>), StoreError> {
    let learner = learner.trim();
    if learner.is_empty() {
        return Err(StoreError::InvalidLearner);
    }
    let title = sheet_title(learner);
    let sheet = client.open(&title).inspect_err(|e| {
        warn!(sheet = %title, error = %e, "failed to open learner sheet");
    })?;
    Ok((title, sheet))
}

/// Append `record` as one row of the learner's sheet. Returns the sheet title.
pub fn save(client: &dyn SheetClient, learner: &str, record: &Record) -> Result<String, StoreError> {
    let (title, mut sheet) = open_learner_sheet(client, learner)?;
    sheet.append_row(&record.values())?;
    info!(sheet = %title, fields = record.len(), "appended row");
    Ok(title)
}

pub fn load(client: &dyn SheetClient, learner: &str) -> Result<Vec<Record>, StoreError> {
    let (title, sheet) = open_learner_sheet(client, learner)?;
    let records = sheet.get_all_records()?;
    info!(sheet = %title, rows = records.len(), "loaded records");
    Ok(records)
}

/// Turn raw sheet rows into header-keyed records. The first row is the
/// header; short rows are padded with empty cells, blank rows are skipped,
/// and cells past the header are ignored.
pub fn records_from_rows(rows: Vec<Vec<String>>) -> Vec<Record> {
    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };

    rows.filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            if row.len() > header.len() {
                debug!(
                    cells = row.len(),
                    columns = header.len(),
                    "row wider than header"
                );
            }
            let mut record = Record::new();
            for (idx, name) in header.iter().enumerate() {
                let value = row
                    .get(idx)
                    .map(|cell| CellValue::parse(cell))
                    .unwrap_or_default();
                record.push(name.clone(), value);
            }
            record
        })
        .collect()
}
