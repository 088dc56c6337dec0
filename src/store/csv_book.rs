use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{records_from_rows, SheetClient, StoreError, Worksheet};
use crate::record::{CellValue, Record};

/// A directory of `<title>.csv` files standing in for a spreadsheet account.
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    dir: PathBuf,
}

impl CsvWorkbook {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, title: &str) -> PathBuf {
        self.dir.join(format!("{title}.csv"))
    }
}

impl SheetClient for CsvWorkbook {
    fn open(&self, title: &str) -> Result<Box<dyn Worksheet + '_>, StoreError> {
        let path = self.path_for(title);
        if !path.is_file() {
            return Err(StoreError::SheetNotFound(title.to_string()));
        }
        Ok(Box::new(CsvSheet { path }))
    }

    fn describe(&self) -> String {
        format!("csv: {}", self.dir.display())
    }
}

struct CsvSheet {
    path: PathBuf,
}

impl Worksheet for CsvSheet {
    fn append_row(&mut self, values: &[CellValue]) -> Result<(), StoreError> {
        // A header typed by hand may lack its final newline
        let needs_newline = fs::read(&self.path)?
            .last()
            .is_some_and(|b| *b != b'\n');

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        if needs_newline {
            writeln!(file)?;
        }

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(file);
        writer.write_record(values.iter().map(|v| v.to_string()))?;
        writer.flush()?;
        Ok(())
    }

    fn get_all_records(&self) -> Result<Vec<Record>, StoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let rows = reader
            .records()
            .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

        Ok(records_from_rows(rows))
    }
}
