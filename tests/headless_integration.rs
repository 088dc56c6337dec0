use std::fs;
use std::time::{Duration, Instant};

use abatrack::app::{self, App, StatusKind};
use abatrack::runtime::{AppEvent, Runner, TestEventSource};
use abatrack::section::Section;
use abatrack::store::CsvWorkbook;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use tempfile::{tempdir, TempDir};

// Headless flows: a csv workbook in a temp dir stands in for the learner's
// spreadsheet, and keys go straight to App::handle_key.

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl_s() -> KeyEvent {
    KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_key(key(KeyCode::Char(c)));
    }
}

fn app_with_sheet(header: &str) -> (TempDir, App) {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("Sam_Data.csv"), header).unwrap();
    let mut app = App::new(Box::new(CsvWorkbook::new(dir.path())), Some("Sam"));
    app.details.date.set("2024-03-01");
    (dir, app)
}

fn sheet_contents(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("Sam_Data.csv")).unwrap()
}

fn render(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
    terminal.draw(|f| abatrack::ui::draw(app, f)).unwrap();
    terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|c| c.symbol())
        .collect()
}

#[test]
fn session_details_row_is_appended() {
    let (dir, mut app) = app_with_sheet("Date,Start Time,End Time,Therapist,Learner\n");

    // Date -> Start -> End
    app.handle_key(key(KeyCode::Down));
    app.handle_key(key(KeyCode::Down));
    app.handle_key(key(KeyCode::Right));
    app.handle_key(key(KeyCode::Right));
    app.handle_key(key(KeyCode::Down));
    type_text(&mut app, "Dana");
    app.handle_key(ctrl_s());

    let status = app.status.clone().unwrap();
    assert_eq!(status.kind, StatusKind::Success);
    assert_eq!(status.message, "Data saved to Sam_Data");
    assert_eq!(
        sheet_contents(&dir),
        "Date,Start Time,End Time,Therapist,Learner\n2024-03-01,9:00,11:00,Dana,Sam\n"
    );
}

#[test]
fn trial_accuracies_are_saved_as_percent_columns() {
    let (dir, mut app) = app_with_sheet("Date,ball %,cup %\n");

    app.handle_key(key(KeyCode::Tab));
    app.handle_key(key(KeyCode::Tab));
    assert_eq!(app.section, Section::TrialByTrial);

    type_text(&mut app, "ball, cup");
    app.handle_key(key(KeyCode::Down));
    type_text(&mut app, "+p+I+--p+I");
    // second row stays at the default of ten correct trials
    app.handle_key(ctrl_s());

    assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Success);
    assert_eq!(sheet_contents(&dir), "Date,ball %,cup %\n2024-03-01,60,100\n");
}

#[test]
fn cold_probe_and_task_analysis_rows() {
    let (dir, mut app) = app_with_sheet("Date,ball,cup\n");

    app.select(Section::ColdProbe);
    type_text(&mut app, "ball,cup");
    app.handle_key(key(KeyCode::Down));
    app.handle_key(key(KeyCode::Down));
    app.handle_key(key(KeyCode::Right));
    app.handle_key(ctrl_s());

    app.select(Section::TaskAnalysis);
    type_text(&mut app, "ball");
    app.handle_key(key(KeyCode::Down));
    app.handle_key(key(KeyCode::Left));
    app.handle_key(ctrl_s());

    assert_eq!(
        sheet_contents(&dir),
        "Date,ball,cup\n2024-03-01,Y,N\n2024-03-01,I\n"
    );
}

#[test]
fn behavior_duration_sums_episodes_and_resets() {
    let (dir, mut app) = app_with_sheet("Date,Total Duration (s)\n");
    app.select(Section::BehaviorDuration);

    let t0 = Instant::now();
    app.duration.start(t0);
    app.duration.stop(t0 + Duration::from_secs(5));
    app.duration.start(t0 + Duration::from_secs(10));
    app.duration.stop(t0 + Duration::from_secs(17));
    assert!(render(&app).contains("Total Duration: 12 seconds"));

    app.handle_key(ctrl_s());

    assert_eq!(sheet_contents(&dir), "Date,Total Duration (s)\n2024-03-01,12\n");
    assert!(app.duration.episodes().is_empty());
}

#[test]
fn duration_keys_start_stop_and_clear() {
    let (dir, mut app) = app_with_sheet("Date,Total Duration (s)\n");
    app.select(Section::BehaviorDuration);

    app.handle_key(key(KeyCode::Char('s')));
    assert!(app.duration.timer().is_running());
    assert!(render(&app).contains("Recording"));

    app.handle_key(key(KeyCode::Char('x')));
    assert_eq!(app.duration.episodes().len(), 1);
    assert!(app.status.as_ref().unwrap().message.starts_with("Recorded episode duration"));

    app.handle_key(key(KeyCode::Char('c')));
    assert!(app.duration.episodes().is_empty());
    assert!(render(&app).contains("Total Duration: 0 seconds"));
    assert_eq!(sheet_contents(&dir), "Date,Total Duration (s)\n");
}

#[test]
fn number_keys_jump_between_sections_outside_text_fields() {
    let (_dir, mut app) = app_with_sheet("Date\n");

    app.select(Section::BehaviorDuration);
    app.handle_key(key(KeyCode::Char('3')));
    assert_eq!(app.section, Section::TrialByTrial);

    // the targets input has focus, so digits are typed
    type_text(&mut app, "a1");
    assert_eq!(app.section, Section::TrialByTrial);
    assert_eq!(app.trials.input.value(), "a1");

    // into the grid
    app.handle_key(key(KeyCode::Down));
    app.handle_key(key(KeyCode::Char('6')));
    assert_eq!(app.section, Section::Reports);

    app.handle_key(key(KeyCode::Char('1')));
    assert_eq!(app.section, Section::SessionDetails);

    // Date field is text
    app.handle_key(key(KeyCode::Char('2')));
    assert_eq!(app.section, Section::SessionDetails);

    app.select(Section::ColdProbe);
    type_text(&mut app, "ball");
    app.handle_key(key(KeyCode::Down));
    app.handle_key(key(KeyCode::Char('4')));
    assert_eq!(app.section, Section::TaskAnalysis);
}

#[test]
fn missing_sheet_becomes_status_not_panic() {
    let dir = tempdir().unwrap();
    let mut app = App::new(Box::new(CsvWorkbook::new(dir.path())), Some("Nobody"));
    app.handle_key(ctrl_s());

    let status = app.status.clone().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.message.contains("Nobody_Data"));
    assert!(!dir.path().join("Nobody_Data.csv").exists());
    assert!(render(&app).contains("Nobody_Data"));
}

#[test]
fn blank_learner_writes_nothing() {
    let (dir, mut app) = app_with_sheet("Date,ball %\n");
    app.details.learner.set("   ");
    app.select(Section::TrialByTrial);
    app.handle_key(ctrl_s());

    assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Error);
    assert_eq!(sheet_contents(&dir), "Date,ball %\n");
}

#[test]
fn report_loads_series_and_notes() {
    let (_dir, mut app) = app_with_sheet(
        "Date,Therapist,ball %,cup %\n\
         2024-03-01,Dana,60,\n\
         2024-03-02,Dana,80,40\n\
         2024-03-03,Lee,90,70\n",
    );
    app.select(Section::Reports);
    app.handle_key(key(KeyCode::Char('r')));

    let report = app.report.as_ref().expect("report loaded");
    assert_eq!(report.series.len(), 2);
    assert_eq!(report.series[0].name, "ball %");
    assert_eq!(report.series[0].points.len(), 3);
    assert_eq!(report.series[1].points.len(), 2);
    assert!(report.notes.contains("Date: 2024-03-03"));
    assert!(report.notes.contains("Therapist: Lee"));
    assert!(report.notes.contains("Learner: Sam"));

    let screen = render(&app);
    assert!(screen.contains("Cumulative Progress Over Time"));
    assert!(screen.contains("Session Notes"));
}

#[test]
fn report_on_empty_sheet_is_no_data() {
    let (_dir, mut app) = app_with_sheet("Date,ball %\n");
    app.select(Section::Reports);
    app.handle_key(key(KeyCode::Enter));

    assert!(app.report.is_none());
    let status = app.status.clone().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.message.contains("no data"));
}

#[test]
fn run_loop_stops_on_escape() {
    let (dir, mut app) = app_with_sheet("Date,Start Time,End Time,Therapist,Learner\n");
    let (source, _tx) = TestEventSource::scripted([
        AppEvent::Resize,
        AppEvent::Key(key(KeyCode::Tab)),
        AppEvent::Tick,
        AppEvent::Key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)),
        AppEvent::Key(ctrl_s()),
        AppEvent::Key(key(KeyCode::Esc)),
    ]);
    let runner = Runner::new(source, Duration::from_millis(5));
    let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();

    app::run(&mut terminal, &mut app, &runner).unwrap();

    assert_eq!(app.section, Section::SessionDetails);
    assert!(sheet_contents(&dir).ends_with(",Sam\n"));
}
