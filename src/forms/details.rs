use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};

use super::text_field::TextField;
use crate::codes::{Choice, HourSlot};
use crate::record::{format_date, SessionDetails, SessionEntry, DATE_FORMAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsField {
    Date,
    StartTime,
    EndTime,
    Therapist,
    Learner,
}

impl DetailsField {
    pub const ALL: [DetailsField; 5] = [
        DetailsField::Date,
        DetailsField::StartTime,
        DetailsField::EndTime,
        DetailsField::Therapist,
        DetailsField::Learner,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DetailsField::Date => "Date (YYYY-MM-DD)",
            DetailsField::StartTime => "Start Time",
            DetailsField::EndTime => "End Time",
            DetailsField::Therapist => "Therapist's Name",
            DetailsField::Learner => "Learner's Name (used for the sheet)",
        }
    }

    pub fn is_text(self) -> bool {
        !matches!(self, DetailsField::StartTime | DetailsField::EndTime)
    }
}

#[derive(Debug, Clone)]
pub struct SessionDetailsForm {
    pub date: TextField,
    pub start_time: HourSlot,
    pub end_time: HourSlot,
    pub therapist: TextField,
    pub learner: TextField,
    focus: usize,
}

impl SessionDetailsForm {
    pub fn new(today: NaiveDate, learner: Option<&str>) -> Self {
        Self {
            date: TextField::new(format_date(today)),
            start_time: HourSlot::default(),
            end_time: HourSlot::default(),
            therapist: TextField::default(),
            learner: TextField::new(learner.unwrap_or_default()),
            focus: 0,
        }
    }

    pub fn focused(&self) -> DetailsField {
        DetailsField::ALL[self.focus]
    }

    pub fn text_field(&self, field: DetailsField) -> Option<&TextField> {
        match field {
            DetailsField::Date => Some(&self.date),
            DetailsField::Therapist => Some(&self.therapist),
            DetailsField::Learner => Some(&self.learner),
            DetailsField::StartTime | DetailsField::EndTime => None,
        }
    }

    fn text_field_mut(&mut self, field: DetailsField) -> Option<&mut TextField> {
        match field {
            DetailsField::Date => Some(&mut self.date),
            DetailsField::Therapist => Some(&mut self.therapist),
            DetailsField::Learner => Some(&mut self.learner),
            DetailsField::StartTime | DetailsField::EndTime => None,
        }
    }

    pub fn learner(&self) -> &str {
        self.learner.value().trim()
    }

    /// The entered session date, or `fallback` when it does not parse.
    pub fn date_or(&self, fallback: NaiveDate) -> NaiveDate {
        NaiveDate::parse_from_str(self.date.value().trim(), DATE_FORMAT).unwrap_or(fallback)
    }

    pub fn entry(&self, today: NaiveDate) -> SessionEntry {
        SessionEntry::Details(SessionDetails {
            date: self.date_or(today),
            start_time: self.start_time,
            end_time: self.end_time,
            therapist: self.therapist.value().trim().to_string(),
            learner: self.learner().to_string(),
        })
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => {
                self.focus = self.focus.saturating_sub(1);
                return true;
            }
            KeyCode::Down | KeyCode::Enter => {
                self.focus = (self.focus + 1).min(DetailsField::ALL.len() - 1);
                return true;
            }
            _ => {}
        }

        let field = self.focused();
        if let Some(text) = self.text_field_mut(field) {
            return text.handle_key(key);
        }

        let forward = match key.code {
            KeyCode::Right | KeyCode::Char(' ') => true,
            KeyCode::Left => false,
            _ => return false,
        };
        match field {
            DetailsField::StartTime => self.start_time = self.start_time.cycle(forward),
            DetailsField::EndTime => self.end_time = self.end_time.cycle(forward),
            _ => {}
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn type_str(form: &mut SessionDetailsForm, s: &str) {
        for c in s.chars() {
            form.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn defaults() {
        let form = SessionDetailsForm::new(today(), Some("Sam"));
        assert_eq!(form.date.value(), "2024-03-01");
        assert_eq!(form.start_time.to_string(), "9:00");
        assert_eq!(form.learner(), "Sam");
        assert_eq!(form.focused(), DetailsField::Date);
    }

    #[test]
    fn fill_in_every_field() {
        let mut form = SessionDetailsForm::new(today(), None);
        form.handle_key(key(KeyCode::Down));
        form.handle_key(key(KeyCode::Right));
        form.handle_key(key(KeyCode::Down));
        form.handle_key(key(KeyCode::Right));
        form.handle_key(key(KeyCode::Right));
        form.handle_key(key(KeyCode::Right));
        form.handle_key(key(KeyCode::Down));
        type_str(&mut form, "Dana");
        form.handle_key(key(KeyCode::Enter));
        type_str(&mut form, " Sam ");

        match form.entry(today()) {
            SessionEntry::Details(d) => {
                assert_eq!(d.date, today());
                assert_eq!(d.start_time.to_string(), "10:00");
                assert_eq!(d.end_time.to_string(), "12:00");
                assert_eq!(d.therapist, "Dana");
                assert_eq!(d.learner, "Sam");
            }
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[test]
    fn invalid_date_falls_back() {
        let mut form = SessionDetailsForm::new(today(), None);
        form.date.set("next tuesday");
        assert_eq!(form.date_or(today()), today());
        form.date.set("2024-02-29");
        assert_eq!(
            form.date_or(today()),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn focus_is_clamped() {
        let mut form = SessionDetailsForm::new(today(), None);
        form.handle_key(key(KeyCode::Up));
        assert_eq!(form.focused(), DetailsField::Date);
        for _ in 0..10 {
            form.handle_key(key(KeyCode::Down));
        }
        assert_eq!(form.focused(), DetailsField::Learner);
    }
}
