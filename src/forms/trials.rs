use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};

use super::text_field::TextField;
use crate::codes::{Choice, TrialCode};
use crate::record::{parse_labels, SessionEntry, TrialByTrial, MAX_TRIAL_TARGETS};
use crate::scoring::{accuracy, TRIALS_PER_TARGET};

pub type TrialRow = (String, [TrialCode; TRIALS_PER_TARGET]);

/// Target input plus a grid of ten trial cells per target.
#[derive(Debug, Clone, Default)]
pub struct TrialForm {
    pub input: TextField,
    rows: Vec<TrialRow>,
    /// 0 is the target input, `n + 1` is grid row `n`.
    row: usize,
    col: usize,
}

impl TrialForm {
    pub fn rows(&self) -> &[TrialRow] {
        &self.rows
    }

    pub fn input_focused(&self) -> bool {
        self.row == 0
    }

    /// Focused grid cell as (row, trial), if the grid has focus.
    pub fn focused_cell(&self) -> Option<(usize, usize)> {
        (self.row > 0).then(|| (self.row - 1, self.col))
    }

    pub fn set_targets(&mut self, labels: &str) {
        self.input.set(labels);
        self.sync();
    }

    pub fn set_trial(&mut self, row: usize, trial: usize, code: TrialCode) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|(_, t)| t.get_mut(trial)) {
            *cell = code;
        }
    }

    pub fn accuracies(&self) -> Vec<(String, f64)> {
        self.rows
            .iter()
            .map(|(label, trials)| (label.clone(), accuracy(trials)))
            .collect()
    }

    pub fn entry(&self, date: NaiveDate) -> SessionEntry {
        SessionEntry::Trials(TrialByTrial {
            date,
            targets: self.rows.clone(),
        })
    }

    fn sync(&mut self) {
        let previous = std::mem::take(&mut self.rows);
        self.rows = parse_labels(self.input.value())
            .into_iter()
            .take(MAX_TRIAL_TARGETS)
            .map(|label| {
                let trials = previous
                    .iter()
                    .find(|(l, _)| *l == label)
                    .map(|(_, t)| *t)
                    .unwrap_or([TrialCode::Correct; TRIALS_PER_TARGET]);
                (label, trials)
            })
            .collect();
        self.row = self.row.min(self.rows.len());
    }

    fn cell_mut(&mut self) -> Option<&mut TrialCode> {
        let (row, col) = self.focused_cell()?;
        self.rows.get_mut(row).and_then(|(_, t)| t.get_mut(col))
    }

    fn advance(&mut self) {
        if self.col + 1 < TRIALS_PER_TARGET {
            self.col += 1;
        } else if self.row < self.rows.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => {
                self.row = self.row.saturating_sub(1);
                return true;
            }
            KeyCode::Down => {
                self.row = (self.row + 1).min(self.rows.len());
                return true;
            }
            _ => {}
        }

        if self.input_focused() {
            if key.code == KeyCode::Enter {
                self.row = (self.row + 1).min(self.rows.len());
                return true;
            }
            let handled = self.input.handle_key(key);
            if handled {
                self.sync();
            }
            return handled;
        }

        match key.code {
            KeyCode::Left => self.col = self.col.saturating_sub(1),
            KeyCode::Right => self.col = (self.col + 1).min(TRIALS_PER_TARGET - 1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(cell) = self.cell_mut() {
                    *cell = cell.cycle(true);
                }
            }
            KeyCode::Char(c) => match TrialCode::from_char(c) {
                Some(code) => {
                    if let Some(cell) = self.cell_mut() {
                        *cell = code;
                    }
                    self.advance();
                }
                None => return false,
            },
            _ => return false,
        }
        true
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

    #[test]
    fn at_most_ten_targets() {
        let mut form = TrialForm::default();
        form.set_targets("a,b,c,d,e,f,g,h,i,j,k,l");
        assert_eq!(form.rows().len(), MAX_TRIAL_TARGETS);
        assert_eq!(form.rows().last().unwrap().0, "j");
    }

    #[test]
    fn typing_codes_fills_row_and_wraps() {
        let mut form = TrialForm::default();
        form.set_targets("ball, cup");
        form.handle_key(key(KeyCode::Enter));
        assert_eq!(form.focused_cell(), Some((0, 0)));

        for c in "+++p-I+-pI".chars() {
            assert!(form.handle_key(key(KeyCode::Char(c))));
        }
        assert_eq!(form.focused_cell(), Some((1, 0)));
        assert_eq!(form.accuracies()[0], ("ball".to_string(), 60.0));
        assert_eq!(form.accuracies()[1], ("cup".to_string(), 100.0));
    }

    #[test]
    fn unknown_code_keys_are_ignored() {
        let mut form = TrialForm::default();
        form.set_targets("ball");
        form.handle_key(key(KeyCode::Down));
        assert!(!form.handle_key(key(KeyCode::Char('x'))));
        assert_eq!(form.focused_cell(), Some((0, 0)));
    }

    #[test]
    fn space_cycles_focused_cell() {
        let mut form = TrialForm::default();
        form.set_targets("ball");
        form.handle_key(key(KeyCode::Down));
        form.handle_key(key(KeyCode::Right));
        form.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(form.rows()[0].1[1], TrialCode::Prompted);
        assert_eq!(form.rows()[0].1[0], TrialCode::Correct);
    }

    #[test]
    fn trial_codes_typed_into_input_stay_text() {
        let mut form = TrialForm::default();
        for c in "a+b".chars() {
            form.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(form.input.value(), "a+b");
        assert_eq!(form.rows().len(), 1);
    }

    #[test]
    fn record_holds_percentages() {
        let mut form = TrialForm::default();
        form.set_targets("ball");
        for trial in 0..TRIALS_PER_TARGET {
            form.set_trial(0, trial, TrialCode::Incorrect);
        }
        form.set_trial(0, 3, TrialCode::Independent);
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let record = form.entry(date).to_record();
        assert_eq!(record.get("ball %"), Some(&CellValue::Number(10.0)));
    }
}
