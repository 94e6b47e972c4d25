//! Round/break countdown driven by backend-declared durations.
//!
//! The timer never captures its inputs. Every `tick` and `reconcile` call
//! receives the latest durations and session flag, and the backend is
//! authoritative: a duration change restarts the round instead of trying to
//! carry elapsed time across.

use serde::Serialize;
use shared::domain::Metrics;
use tracing::{debug, info};

pub const ROUND_LABEL: &str = "Time left in round";
pub const BREAK_LABEL: &str = "Time left in break";
pub const WAITING_LABEL: &str = "Waiting for session start";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Round,
    Break,
}

impl Phase {
    fn flipped(self) -> Self {
        match self {
            Phase::Round => Phase::Break,
            Phase::Break => Phase::Round,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerInputs {
    pub round_time_minutes: f64,
    pub break_time_minutes: f64,
    pub session_started: bool,
}

impl TimerInputs {
    pub fn new(round_time_minutes: f64, break_time_minutes: f64, session_started: bool) -> Self {
        Self {
            round_time_minutes,
            break_time_minutes,
            session_started,
        }
    }

    pub fn from_metrics(metrics: &Metrics, session_started: bool) -> Self {
        Self::new(
            metrics.round_time_minutes,
            metrics.break_time_minutes,
            session_started,
        )
    }

    pub fn round_seconds(&self) -> u64 {
        minutes_to_seconds(sanitize_minutes(self.round_time_minutes))
    }

    pub fn break_seconds(&self) -> u64 {
        minutes_to_seconds(sanitize_minutes(self.break_time_minutes))
    }

    fn seconds_for(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Round => self.round_seconds(),
            Phase::Break => self.break_seconds(),
        }
    }
}

/// Coerces a malformed duration (NaN, infinite, negative) to zero minutes.
pub fn sanitize_minutes(raw: f64) -> f64 {
    if raw.is_finite() && raw >= 0.0 {
        raw
    } else {
        debug!(raw, "coercing malformed timer duration to 0");
        0.0
    }
}

fn minutes_to_seconds(minutes: f64) -> u64 {
    (minutes * 60.0).round() as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerState {
    pub phase: Phase,
    pub seconds_remaining: u64,
    /// False while the session has not started; the countdown is frozen.
    pub running: bool,
}

impl TimerState {
    fn reset(round_seconds: u64) -> Self {
        Self {
            phase: Phase::Round,
            seconds_remaining: round_seconds,
            running: false,
        }
    }

    pub fn is_round_active(&self) -> bool {
        self.phase == Phase::Round
    }

    /// Zero-padded `(minutes, seconds)` for display.
    pub fn countdown(&self) -> (String, String) {
        (
            format!("{:02}", self.seconds_remaining / 60),
            format!("{:02}", self.seconds_remaining % 60),
        )
    }

    pub fn label(&self) -> &'static str {
        match (self.running, self.phase) {
            (false, _) => WAITING_LABEL,
            (true, Phase::Round) => ROUND_LABEL,
            (true, Phase::Break) => BREAK_LABEL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoundTimer {
    state: TimerState,
    round_seconds: u64,
    break_seconds: u64,
}

impl RoundTimer {
    pub fn new(inputs: TimerInputs) -> Self {
        let round_seconds = inputs.round_seconds();
        let mut state = TimerState::reset(round_seconds);
        state.running = inputs.session_started;
        Self {
            state,
            round_seconds,
            break_seconds: inputs.break_seconds(),
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Applies the latest backend inputs without advancing time. Returns
    /// whether the visible state changed.
    pub fn reconcile(&mut self, inputs: TimerInputs) -> bool {
        let round_seconds = inputs.round_seconds();
        let break_seconds = inputs.break_seconds();
        let durations_changed =
            round_seconds != self.round_seconds || break_seconds != self.break_seconds;
        self.round_seconds = round_seconds;
        self.break_seconds = break_seconds;

        if !inputs.session_started {
            let reset = TimerState::reset(round_seconds);
            if self.state == reset {
                return false;
            }
            info!(round_seconds, "session not running; timer reset to round start");
            self.state = reset;
            return true;
        }

        if durations_changed {
            info!(
                round_seconds,
                break_seconds, "round/break durations changed; restarting round"
            );
            self.state = TimerState {
                phase: Phase::Round,
                seconds_remaining: round_seconds,
                running: true,
            };
            return true;
        }

        if !self.state.running {
            info!(round_seconds, "session started; countdown running");
            self.state.running = true;
            return true;
        }
        false
    }

    /// One elapsed second. Reconciles first so the tick always works on the
    /// inputs current at tick time.
    pub fn tick(&mut self, inputs: TimerInputs) -> TimerState {
        self.reconcile(inputs);
        if !self.state.running {
            return self.state;
        }
        self.state.seconds_remaining = self.state.seconds_remaining.saturating_sub(1);
        if self.state.seconds_remaining == 0 {
            let next = self.state.phase.flipped();
            self.state.phase = next;
            self.state.seconds_remaining = inputs.seconds_for(next);
            info!(phase = ?next, seconds = self.state.seconds_remaining, "timer phase flipped");
        }
        self.state
    }
}

#[cfg(test)]
#[path = "tests/timer_tests.rs"]
mod tests;
