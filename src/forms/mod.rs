//! Per-section form state. Each form turns its current input into a
//! [`SessionEntry`](crate::record::SessionEntry) without touching the store.

pub mod details;
pub mod duration;
pub mod targets;
pub mod text_field;
pub mod trials;

pub use details::{DetailsField, SessionDetailsForm};
pub use duration::{DurationForm, TimerAction, TimerState};
pub use targets::{ColdProbeForm, TargetList, TaskAnalysisForm};
pub use text_field::TextField;
pub use trials::TrialForm;
