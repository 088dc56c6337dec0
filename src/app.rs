use std::time::Instant;

use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use tracing::{info, warn};

use crate::forms::{
    ColdProbeForm, DurationForm, SessionDetailsForm, TaskAnalysisForm, TimerAction, TrialForm,
};
use crate::record::SessionEntry;
use crate::report::{self, Report};
use crate::runtime::{AppEvent, EventSource, Runner};
use crate::section::Section;
use crate::store::{self, SheetClient};
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// One-line message shown under the current section.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub section: Section,
    pub details: SessionDetailsForm,
    pub cold_probe: ColdProbeForm,
    pub trials: TrialForm,
    pub task_analysis: TaskAnalysisForm,
    pub duration: DurationForm,
    pub report: Option<Report>,
    pub status: Option<Status>,
    store: Box<dyn SheetClient>,
}

impl App {
    pub fn new(store: Box<dyn SheetClient>, learner: Option<&str>) -> Self {
        Self {
            section: Section::default(),
            details: SessionDetailsForm::new(Local::now().date_naive(), learner),
            cold_probe: ColdProbeForm::default(),
            trials: TrialForm::default(),
            task_analysis: TaskAnalysisForm::default(),
            duration: DurationForm::default(),
            report: None,
            status: None,
            store,
        }
    }

    pub fn store(&self) -> &dyn SheetClient {
        self.store.as_ref()
    }

    /// Learner whose sheet every section reads and writes.
    pub fn learner(&self) -> &str {
        self.details.learner()
    }

    /// Date stamped on every saved row.
    pub fn session_date(&self) -> NaiveDate {
        self.details.date_or(Local::now().date_naive())
    }

    pub fn select(&mut self, section: Section) {
        self.section = section;
        self.status = None;
    }

    /// Record the current section would save, None on the report section.
    pub fn current_entry(&self) -> Option<SessionEntry> {
        let date = self.session_date();
        match self.section {
            Section::SessionDetails => Some(self.details.entry(date)),
            Section::ColdProbe => Some(self.cold_probe.entry(date)),
            Section::TrialByTrial => Some(self.trials.entry(date)),
            Section::TaskAnalysis => Some(self.task_analysis.entry(date)),
            Section::BehaviorDuration => Some(self.duration.entry(date)),
            Section::Reports => None,
        }
    }

    /// Append the current section's record to the learner sheet. Failures
    /// become the status line; nothing here ends the session.
    pub fn save_current(&mut self) {
        let Some(entry) = self.current_entry() else {
            return;
        };
        let record = entry.to_record();
        match store::save(self.store.as_ref(), self.learner(), &record) {
            Ok(title) => {
                if matches!(entry, SessionEntry::Duration(_)) {
                    self.duration.clear();
                }
                self.status = Some(Status::success(format!("Data saved to {title}")));
            }
            Err(e) => {
                warn!(section = %self.section, error = %e, "save failed");
                self.status = Some(Status::error(e.to_string()));
            }
        }
    }

    pub fn load_report(&mut self) {
        match report::generate(self.store.as_ref(), self.learner()) {
            Ok(report) => {
                self.status = Some(Status::info(format!(
                    "Loaded {} rows for {}",
                    report.records.len(),
                    report.learner
                )));
                self.report = Some(report);
            }
            Err(e) => {
                warn!(error = %e, "report failed");
                self.report = None;
                self.status = Some(Status::error(e.to_string()));
            }
        }
    }

    /// True while typed characters belong to a text field, so digits are
    /// input rather than section shortcuts.
    pub fn text_input_focused(&self) -> bool {
        match self.section {
            Section::SessionDetails => self.details.focused().is_text(),
            Section::ColdProbe => self.cold_probe.input_focused(),
            Section::TrialByTrial => self.trials.input_focused(),
            Section::TaskAnalysis => self.task_analysis.input_focused(),
            Section::BehaviorDuration | Section::Reports => false,
        }
    }

    pub fn on_timer_action(&mut self, action: TimerAction) {
        self.status = Some(match action {
            TimerAction::Started => Status::info("Timer started"),
            TimerAction::Stopped(Some(secs)) => {
                info!(secs, "recorded episode");
                Status::success(format!("Recorded episode duration: {secs} seconds"))
            }
            TimerAction::Stopped(None) => Status::error("Timer is not running"),
            TimerAction::Cleared => Status::info("Cleared recorded episodes"),
        });
    }

    /// Global keys first, then the current section's keys.
    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('c') if ctrl => return Flow::Quit,
            KeyCode::Char('s') if ctrl => {
                match self.section {
                    Section::Reports => self.load_report(),
                    _ => self.save_current(),
                }
                return Flow::Continue;
            }
            KeyCode::Tab => {
                self.select(self.section.next());
                return Flow::Continue;
            }
            KeyCode::BackTab => {
                self.select(self.section.prev());
                return Flow::Continue;
            }
            KeyCode::Char(c @ '1'..='6') if !ctrl && !self.text_input_focused() => {
                let idx = c as usize - '1' as usize;
                self.select(Section::ALL[idx]);
                return Flow::Continue;
            }
            _ => {}
        }

        match self.section {
            Section::SessionDetails => {
                self.details.handle_key(key);
            }
            Section::ColdProbe => {
                self.cold_probe.handle_key(key);
            }
            Section::TrialByTrial => {
                self.trials.handle_key(key);
            }
            Section::TaskAnalysis => {
                self.task_analysis.handle_key(key);
            }
            Section::BehaviorDuration => {
                if let Some(action) = self.duration.handle_key(key, Instant::now()) {
                    self.on_timer_action(action);
                }
            }
            Section::Reports => match key.code {
                KeyCode::Enter | KeyCode::Char('r') => self.load_report(),
                KeyCode::Char('o') => self.open_sheet_in_browser(),
                _ => {}
            },
        }
        Flow::Continue
    }

    fn open_sheet_in_browser(&mut self) {
        let Some(url) = self.report.as_ref().and_then(|r| r.sheet_url.clone()) else {
            self.status = Some(Status::error("This sheet has no browser link"));
            return;
        };
        if !webbrowser::Browser::is_available() {
            self.status = Some(Status::info(url));
            return;
        }
        if let Err(e) = webbrowser::open(&url) {
            self.status = Some(Status::error(format!("Could not open browser: {e}")));
        }
    }
}

/// Draw, then feed events to `app` until it asks to quit. Ticks only
/// redraw while the behavior timer runs.
pub fn run<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> std::io::Result<()> {
    terminal.draw(|f| ui::draw(app, f))?;
    loop {
        match runner.step() {
            AppEvent::Tick => {
                if app.duration.timer().is_running() {
                    terminal.draw(|f| ui::draw(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui::draw(app, f))?;
            }
            AppEvent::Key(key) => {
                if app.handle_key(key) == Flow::Quit {
                    break;
                }
                terminal.draw(|f| ui::draw(app, f))?;
            }
        }
    }
    Ok(())
}
