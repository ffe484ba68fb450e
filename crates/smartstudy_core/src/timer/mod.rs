//! Study session stopwatch.
//!
//! # Responsibility
//! - Model the IDLE/STARTED/STOPPED stopwatch as a pure state machine.
//! - Run it on one background thread that owns the counter (`service`).
//!
//! # Invariants
//! - Elapsed seconds only grow while `Started`, by one per tick.
//! - `cancel` and `finish` both reset elapsed to zero; only `finish` reports
//!   the elapsed value first.

use serde::Serialize;

mod service;

pub use service::{TimerError, TimerHandle, TimerService, DEFAULT_TICK};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    Idle,
    Started,
    /// Paused with elapsed time retained.
    Stopped,
}

impl TimerState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Started => "started",
            Self::Stopped => "stopped",
        }
    }
}

/// Stopwatch state without any threading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyTimer {
    state: TimerState,
    elapsed_secs: u64,
}

impl Default for StudyTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl StudyTimer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            elapsed_secs: 0,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Starts from idle or resumes from stopped. Returns whether the state
    /// changed.
    pub fn start(&mut self) -> bool {
        match self.state {
            TimerState::Idle | TimerState::Stopped => {
                self.state = TimerState::Started;
                true
            }
            TimerState::Started => false,
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.state != TimerState::Started {
            return false;
        }
        self.state = TimerState::Stopped;
        true
    }

    /// Pauses a running timer, otherwise starts or resumes it.
    pub fn toggle(&mut self) {
        if !self.pause() {
            self.start();
        }
    }

    /// Discards elapsed time from any state.
    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
        self.elapsed_secs = 0;
    }

    /// Ends the run and returns the elapsed seconds. Idle timers return zero.
    pub fn finish(&mut self) -> u64 {
        let elapsed = self.elapsed_secs;
        self.cancel();
        elapsed
    }

    /// Advances by one second while started.
    pub fn tick(&mut self) -> bool {
        if self.state != TimerState::Started {
            return false;
        }
        self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        true
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            elapsed_secs: self.elapsed_secs,
        }
    }
}

/// Read-only view of the timer published to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub elapsed_secs: u64,
}

impl TimerSnapshot {
    pub fn hours(&self) -> String {
        pad2(self.elapsed_secs / 3600)
    }

    pub fn minutes(&self) -> String {
        pad2((self.elapsed_secs % 3600) / 60)
    }

    pub fn seconds(&self) -> String {
        pad2(self.elapsed_secs % 60)
    }

    pub fn formatted(&self) -> String {
        format_hms(self.elapsed_secs)
    }
}

/// Formats total seconds as `HH:MM:SS`. Hours past 99 keep all digits.
pub fn format_hms(total_secs: u64) -> String {
    format!(
        "{}:{}:{}",
        pad2(total_secs / 3600),
        pad2((total_secs % 3600) / 60),
        pad2(total_secs % 60)
    )
}

fn pad2(value: u64) -> String {
    format!("{value:02}")
}
