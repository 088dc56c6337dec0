//! Fixed option sets offered by the selection fields.

use std::fmt;

/// A closed set of options a select field cycles through.
pub trait Choice: Copy + PartialEq + fmt::Display + 'static {
    fn options() -> &'static [Self];

    fn cycle(self, forward: bool) -> Self {
        let opts = Self::options();
        let pos = opts.iter().position(|o| *o == self).unwrap_or(0);
        let next = if forward {
            (pos + 1) % opts.len()
        } else {
            (pos + opts.len() - 1) % opts.len()
        };
        opts[next]
    }
}

/// Cold probe response
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ProbeResponse {
    #[strum(to_string = "Y")]
    Yes,
    #[strum(to_string = "N")]
    No,
    #[strum(to_string = "NA")]
    NotApplicable,
}

impl ProbeResponse {
    pub const ALL: [ProbeResponse; 3] = [
        ProbeResponse::Yes,
        ProbeResponse::No,
        ProbeResponse::NotApplicable,
    ];
}

impl Choice for ProbeResponse {
    fn options() -> &'static [Self] {
        &Self::ALL
    }
}

/// Prompt level required for a task-analysis step, most to least intrusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PromptLevel {
    #[strum(to_string = "FP")]
    FullPhysical,
    #[strum(to_string = "PP")]
    PartialPhysical,
    #[strum(to_string = "MP")]
    Model,
    #[strum(to_string = "VI")]
    VerbalInstruction,
    #[strum(to_string = "VP")]
    Verbal,
    #[strum(to_string = "GP")]
    Gestural,
    #[strum(to_string = "TD")]
    Textual,
    #[strum(to_string = "I")]
    Independent,
}

impl PromptLevel {
    pub const ALL: [PromptLevel; 8] = [
        PromptLevel::FullPhysical,
        PromptLevel::PartialPhysical,
        PromptLevel::Model,
        PromptLevel::VerbalInstruction,
        PromptLevel::Verbal,
        PromptLevel::Gestural,
        PromptLevel::Textual,
        PromptLevel::Independent,
    ];
}

impl Choice for PromptLevel {
    fn options() -> &'static [Self] {
        &Self::ALL
    }
}

/// Outcome of a single discrete trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TrialCode {
    #[strum(to_string = "+")]
    Correct,
    #[strum(to_string = "p")]
    Prompted,
    #[strum(to_string = "-")]
    Incorrect,
    #[strum(to_string = "I")]
    Independent,
}

impl TrialCode {
    pub const ALL: [TrialCode; 4] = [
        TrialCode::Correct,
        TrialCode::Prompted,
        TrialCode::Incorrect,
        TrialCode::Independent,
    ];

    /// Both `+` and `I` count towards accuracy.
    pub fn is_correct(self) -> bool {
        matches!(self, TrialCode::Correct | TrialCode::Independent)
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "+" => Some(TrialCode::Correct),
            "p" => Some(TrialCode::Prompted),
            "-" => Some(TrialCode::Incorrect),
            "I" => Some(TrialCode::Independent),
            _ => None,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        let mut buf = [0u8; 4];
        Self::parse(c.encode_utf8(&mut buf))
    }
}

impl Choice for TrialCode {
    fn options() -> &'static [Self] {
        &Self::ALL
    }
}

/// Hourly session slot, 9:00 through 17:00
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HourSlot(u8);

impl HourSlot {
    pub const FIRST: u8 = 9;
    pub const LAST: u8 = 17;

    pub const ALL: [HourSlot; 9] = [
        HourSlot(9),
        HourSlot(10),
        HourSlot(11),
        HourSlot(12),
        HourSlot(13),
        HourSlot(14),
        HourSlot(15),
        HourSlot(16),
        HourSlot(17),
    ];

    pub fn new(hour: u8) -> Option<Self> {
        (Self::FIRST..=Self::LAST)
            .contains(&hour)
            .then_some(HourSlot(hour))
    }
}

impl Default for HourSlot {
    fn default() -> Self {
        HourSlot(Self::FIRST)
    }
}

impl fmt::Display for HourSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:00", self.0)
    }
}

impl Choice for HourSlot {
    fn options() -> &'static [Self] {
        &Self::ALL
    }
}
