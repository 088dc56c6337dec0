use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};

use super::text_field::TextField;
use crate::codes::{Choice, ProbeResponse, PromptLevel};
use crate::record::{parse_labels, ColdProbe, SessionEntry, TaskAnalysis};

/// A comma-separated label input followed by one select per parsed label.
/// Row values survive edits to the label list as long as the label does.
#[derive(Debug, Clone)]
pub struct TargetList<T: Choice> {
    pub input: TextField,
    rows: Vec<(String, T)>,
    default: T,
    focus: usize,
}

pub type ColdProbeForm = TargetList<ProbeResponse>;
pub type TaskAnalysisForm = TargetList<PromptLevel>;

impl<T: Choice> TargetList<T> {
    pub fn new(default: T) -> Self {
        Self {
            input: TextField::default(),
            rows: Vec::new(),
            default,
            focus: 0,
        }
    }

    pub fn rows(&self) -> &[(String, T)] {
        &self.rows
    }

    /// 0 is the label input, `n + 1` is row `n`.
    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn input_focused(&self) -> bool {
        self.focus == 0
    }

    pub fn set_labels(&mut self, labels: &str) {
        self.input.set(labels);
        self.sync();
    }

    pub fn set(&mut self, row: usize, value: T) {
        if let Some(slot) = self.rows.get_mut(row) {
            slot.1 = value;
        }
    }

    fn sync(&mut self) {
        let previous = std::mem::take(&mut self.rows);
        self.rows = parse_labels(self.input.value())
            .into_iter()
            .map(|label| {
                let value = previous
                    .iter()
                    .find(|(l, _)| *l == label)
                    .map(|(_, v)| *v)
                    .unwrap_or(self.default);
                (label, value)
            })
            .collect();
        self.focus = self.focus.min(self.rows.len());
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => {
                self.focus = self.focus.saturating_sub(1);
                return true;
            }
            KeyCode::Down | KeyCode::Enter => {
                self.focus = (self.focus + 1).min(self.rows.len());
                return true;
            }
            _ => {}
        }

        if self.input_focused() {
            let handled = self.input.handle_key(key);
            if handled {
                self.sync();
            }
            return handled;
        }

        let forward = match key.code {
            KeyCode::Right | KeyCode::Char(' ') => true,
            KeyCode::Left => false,
            _ => return false,
        };
        if let Some(slot) = self.rows.get_mut(self.focus - 1) {
            slot.1 = slot.1.cycle(forward);
        }
        true
    }
}

impl TargetList<ProbeResponse> {
    pub fn entry(&self, date: NaiveDate) -> SessionEntry {
        SessionEntry::ColdProbe(ColdProbe {
            date,
            responses: self.rows.clone(),
        })
    }
}

impl TargetList<PromptLevel> {
    pub fn entry(&self, date: NaiveDate) -> SessionEntry {
        SessionEntry::TaskAnalysis(TaskAnalysis {
            date,
            steps: self.rows.clone(),
        })
    }
}

impl Default for ColdProbeForm {
    fn default() -> Self {
        Self::new(ProbeResponse::Yes)
    }
}

impl Default for TaskAnalysisForm {
    fn default() -> Self {
        Self::new(PromptLevel::FullPhysical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CellValue;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn typing_labels_creates_rows() {
        let mut form = ColdProbeForm::default();
        for c in "red, blue".chars() {
            form.handle_key(key(KeyCode::Char(c)));
        }
        let labels: Vec<&str> = form.rows().iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["red", "blue"]);
        assert!(form.rows().iter().all(|(_, v)| *v == ProbeResponse::Yes));
    }

    #[test]
    fn selects_cycle_on_focused_row() {
        let mut form = ColdProbeForm::default();
        form.set_labels("red,blue");
        form.handle_key(key(KeyCode::Down));
        form.handle_key(key(KeyCode::Down));
        form.handle_key(key(KeyCode::Right));
        form.handle_key(key(KeyCode::Right));
        assert_eq!(form.rows()[0].1, ProbeResponse::Yes);
        assert_eq!(form.rows()[1].1, ProbeResponse::NotApplicable);
    }

    #[test]
    fn values_follow_labels_when_list_changes() {
        let mut form = TaskAnalysisForm::default();
        form.set_labels("wash,dry");
        form.set(1, PromptLevel::Independent);
        form.set_labels("rinse,wash,dry");
        assert_eq!(form.rows()[0].1, PromptLevel::FullPhysical);
        assert_eq!(form.rows()[2].1, PromptLevel::Independent);
    }

    #[test]
    fn shrinking_list_clamps_focus() {
        let mut form = ColdProbeForm::default();
        form.set_labels("a,b,c");
        for _ in 0..3 {
            form.handle_key(key(KeyCode::Down));
        }
        assert_eq!(form.focus(), 3);
        form.set_labels("a");
        assert_eq!(form.focus(), 1);
    }

    #[test]
    fn task_analysis_record() {
        let mut form = TaskAnalysisForm::default();
        form.set_labels("wash, dry");
        form.set(0, PromptLevel::Gestural);
        let record = form.entry(date()).to_record();
        let values: Vec<String> = record.values().iter().map(|v| v.to_string()).collect();
        assert_eq!(values, ["2024-03-01", "GP", "FP"]);
        assert_eq!(record.get("dry"), Some(&CellValue::Text("FP".into())));
    }

    #[test]
    fn empty_input_saves_date_only() {
        let form = ColdProbeForm::default();
        assert_eq!(form.entry(date()).to_record().len(), 1);
    }
}
