//! Flat records appended to a learner sheet, and the closed set of session
//! entries that produce them.

use std::fmt;

use chrono::NaiveDate;
use itertools::Itertools;

use crate::codes::{HourSlot, ProbeResponse, PromptLevel, TrialCode};
use crate::scoring::{accuracy, TRIALS_PER_TARGET};
use crate::util::format_number;

pub const DATE_FIELD: &str = "Date";
pub const THERAPIST_FIELD: &str = "Therapist";
pub const LEARNER_FIELD: &str = "Learner";
pub const TOTAL_DURATION_FIELD: &str = "Total Duration (s)";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Upper bound on targets scored in one trial-by-trial entry.
pub const MAX_TRIAL_TARGETS: usize = 10;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Coerce a raw sheet cell: blank is empty, finite numerics are numbers.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Empty => serde_json::Value::String(String::new()),
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(format_number(*n))),
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<u64> for CellValue {
    fn from(n: u64) -> Self {
        CellValue::Number(n as f64)
    }
}

/// Field-name to value mapping that remembers insertion order. The order is
/// the positional order of the appended row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Setting an existing field replaces its value in place.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<CellValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> Vec<CellValue> {
        self.fields.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `{Date: 2024-03-01, Word %: 60}`
    pub fn summary(&self) -> String {
        format!(
            "{{{}}}",
            self.fields
                .iter()
                .map(|(n, v)| format!("{n}: {v}"))
                .join(", ")
        )
    }
}

/// Split comma-separated target or step labels, trimming and dropping blanks.
pub fn parse_labels(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionDetails {
    pub date: NaiveDate,
    pub start_time: HourSlot,
    pub end_time: HourSlot,
    pub therapist: String,
    pub learner: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColdProbe {
    pub date: NaiveDate,
    pub responses: Vec<(String, ProbeResponse)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrialByTrial {
    pub date: NaiveDate,
    pub targets: Vec<(String, [TrialCode; TRIALS_PER_TARGET])>,
}

impl TrialByTrial {
    pub fn accuracies(&self) -> Vec<(String, f64)> {
        self.targets
            .iter()
            .map(|(label, trials)| (label.clone(), accuracy(trials)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskAnalysis {
    pub date: NaiveDate,
    pub steps: Vec<(String, PromptLevel)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorDuration {
    pub date: NaiveDate,
    pub episodes: Vec<u64>,
}

impl BehaviorDuration {
    pub fn total_secs(&self) -> u64 {
        self.episodes.iter().sum()
    }
}

/// One saveable submission from any of the data-entry sections.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEntry {
    Details(SessionDetails),
    ColdProbe(ColdProbe),
    Trials(TrialByTrial),
    TaskAnalysis(TaskAnalysis),
    Duration(BehaviorDuration),
}

/// Column name a trial target's accuracy is written under.
pub fn percent_field(label: &str) -> String {
    format!("{label} %")
}

impl SessionEntry {
    pub fn to_record(&self) -> Record {
        match self {
            SessionEntry::Details(d) => Record::new()
                .with(DATE_FIELD, format_date(d.date))
                .with("Start Time", d.start_time.to_string())
                .with("End Time", d.end_time.to_string())
                .with(THERAPIST_FIELD, d.therapist.clone())
                .with(LEARNER_FIELD, d.learner.clone()),
            SessionEntry::ColdProbe(p) => {
                let mut record = Record::new().with(DATE_FIELD, format_date(p.date));
                for (label, response) in &p.responses {
                    record.push(label.clone(), response.to_string());
                }
                record
            }
            SessionEntry::Trials(t) => {
                let mut record = Record::new().with(DATE_FIELD, format_date(t.date));
                for (label, pct) in t.accuracies() {
                    record.push(percent_field(&label), pct);
                }
                record
            }
            SessionEntry::TaskAnalysis(t) => {
                let mut record = Record::new().with(DATE_FIELD, format_date(t.date));
                for (label, level) in &t.steps {
                    record.push(label.clone(), level.to_string());
                }
                record
            }
            SessionEntry::Duration(d) => Record::new()
                .with(DATE_FIELD, format_date(d.date))
                .with(TOTAL_DURATION_FIELD, d.total_secs()),
        }
    }
}
