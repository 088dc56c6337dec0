use std::time::{Duration, Instant};

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};

use crate::record::{BehaviorDuration, SessionEntry};

/// Start/stop timer for a single behavior episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running(Instant),
}

impl TimerState {
    /// Starting a running timer restarts it from `now`.
    pub fn start(self, now: Instant) -> Self {
        TimerState::Running(now)
    }

    /// Stop the timer, yielding the episode length in whole seconds.
    pub fn stop(self, now: Instant) -> (Self, Option<u64>) {
        match self {
            TimerState::Running(started) => (
                TimerState::Idle,
                Some(now.saturating_duration_since(started).as_secs()),
            ),
            TimerState::Idle => (TimerState::Idle, None),
        }
    }

    pub fn elapsed(self, now: Instant) -> Option<Duration> {
        match self {
            TimerState::Running(started) => Some(now.saturating_duration_since(started)),
            TimerState::Idle => None,
        }
    }

    pub fn is_running(self) -> bool {
        matches!(self, TimerState::Running(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Started,
    Stopped(Option<u64>),
    Cleared,
}

/// Episodes recorded since the last save; the saved figure is their sum.
#[derive(Debug, Clone, Default)]
pub struct DurationForm {
    timer: TimerState,
    episodes: Vec<u64>,
}

impl DurationForm {
    pub fn timer(&self) -> TimerState {
        self.timer
    }

    pub fn episodes(&self) -> &[u64] {
        &self.episodes
    }

    pub fn total_secs(&self) -> u64 {
        self.episodes.iter().sum()
    }

    pub fn start(&mut self, now: Instant) {
        self.timer = self.timer.start(now);
    }

    pub fn stop(&mut self, now: Instant) -> Option<u64> {
        let (timer, secs) = self.timer.stop(now);
        self.timer = timer;
        if let Some(secs) = secs {
            self.episodes.push(secs);
        }
        secs
    }

    /// Drops recorded episodes; a running timer keeps running.
    pub fn clear(&mut self) {
        self.episodes.clear();
    }

    pub fn entry(&self, date: NaiveDate) -> SessionEntry {
        SessionEntry::Duration(BehaviorDuration {
            date,
            episodes: self.episodes.clone(),
        })
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<TimerAction> {
        match key.code {
            KeyCode::Char('s') | KeyCode::Enter => {
                self.start(now);
                Some(TimerAction::Started)
            }
            KeyCode::Char('x') | KeyCode::Char(' ') => Some(TimerAction::Stopped(self.stop(now))),
            KeyCode::Char('c') => {
                self.clear();
                Some(TimerAction::Cleared)
            }
            _ => None,
        }
    }
}
