use ratatui::{layout::Rect, Frame};

use crate::app::App;
use crate::section::Section;
use crate::ui::{forms, report};

/// Body of one section: draws itself into `area` and names its keys.
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect);

    /// Section-specific keys shown in the legend line.
    fn keys(&self) -> &'static str {
        ""
    }
}

pub struct DetailsScreen;

impl Screen for DetailsScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        forms::render_details(&app.details, f, area);
    }

    fn keys(&self) -> &'static str {
        "(↑/↓) field  (←/→) hour"
    }
}

pub struct ColdProbeScreen;

impl Screen for ColdProbeScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        forms::render_target_list(&app.cold_probe, "Targets (comma separated)", f, area);
    }

    fn keys(&self) -> &'static str {
        "(↑/↓) row  (←/→) Y/N/NA"
    }
}

pub struct TrialsScreen;

impl Screen for TrialsScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        forms::render_trials(&app.trials, f, area);
    }

    fn keys(&self) -> &'static str {
        "(arrows) cell  (+ p - I) code"
    }
}

pub struct TaskAnalysisScreen;

impl Screen for TaskAnalysisScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        forms::render_target_list(&app.task_analysis, "Steps (comma separated)", f, area);
    }

    fn keys(&self) -> &'static str {
        "(↑/↓) step  (←/→) prompt level"
    }
}

pub struct DurationScreen;

impl Screen for DurationScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        forms::render_duration(&app.duration, f, area);
    }

    fn keys(&self) -> &'static str {
        "(s)tart  (x) stop  (c)lear"
    }
}

pub struct ReportScreen;

impl Screen for ReportScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        report::render_report(app, f, area);
    }

    fn keys(&self) -> &'static str {
        "(r)efresh  (o)pen sheet"
    }
}

pub fn current_screen(section: Section) -> Box<dyn Screen> {
    match section {
        Section::SessionDetails => Box::new(DetailsScreen),
        Section::ColdProbe => Box::new(ColdProbeScreen),
        Section::TrialByTrial => Box::new(TrialsScreen),
        Section::TaskAnalysis => Box::new(TaskAnalysisScreen),
        Section::BehaviorDuration => Box::new(DurationScreen),
        Section::Reports => Box::new(ReportScreen),
    }
}
