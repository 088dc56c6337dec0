/// Menu sections, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum Section {
    #[default]
    #[strum(to_string = "Session Details")]
    SessionDetails,
    #[strum(to_string = "Cold Probe Data")]
    ColdProbe,
    #[strum(to_string = "Trial-by-Trial Data")]
    TrialByTrial,
    #[strum(to_string = "Task Analysis")]
    TaskAnalysis,
    #[strum(to_string = "Behavior Duration")]
    BehaviorDuration,
    #[strum(to_string = "Progress & Reports")]
    Reports,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::SessionDetails,
        Section::ColdProbe,
        Section::TrialByTrial,
        Section::TaskAnalysis,
        Section::BehaviorDuration,
        Section::Reports,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Label of the save action, None for the read-only report section.
    pub fn save_label(self) -> Option<&'static str> {
        match self {
            Section::SessionDetails => Some("Save Session Details"),
            Section::ColdProbe => Some("Save Cold Probe Data"),
            Section::TrialByTrial => Some("Save Trial Data"),
            Section::TaskAnalysis => Some("Save Task Analysis Data"),
            Section::BehaviorDuration => Some("Save Behavior Duration Data"),
            Section::Reports => None,
        }
    }
}
