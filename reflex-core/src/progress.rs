use crate::constants::{CRASH_WINDOW, SETBACK_DELTA, STUCK_DELTA};
use serde::Serialize;

/// Classification of one ground tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressReading {
    pub delta: f64,
    pub stuck: bool,
    pub sudden_setback: bool,
    pub crashed: bool,
}

/// Tracks progress deltas, stuck streaks and a slowly forgotten crash count.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressMonitor {
    previous_progress: f64,
    stuck_frames: u32,
    recent_crashes: u32,
    good_streak: u32,
    crash_window_ticks: u32,
    crash_window: u32,
}

impl Default for ProgressMonitor {
    fn default() -> Self {
        Self::new(CRASH_WINDOW)
    }
}

impl ProgressMonitor {
    pub fn new(crash_window: u32) -> Self {
        Self {
            previous_progress: 0.0,
            stuck_frames: 0,
            recent_crashes: 0,
            good_streak: 0,
            crash_window_ticks: 0,
            crash_window,
        }
    }

    pub fn update(&mut self, progress: f64, stuck_threshold: u32) -> ProgressReading {
        // A garbled reading counts as no movement and leaves the reference
        // point alone.
        let delta = if progress.is_finite() {
            let delta = progress - self.previous_progress;
            self.previous_progress = progress;
            delta
        } else {
            tracing::trace!(progress, "non-finite progress treated as zero delta");
            0.0
        };

        let stuck = delta < STUCK_DELTA;
        if stuck {
            self.stuck_frames = self.stuck_frames.saturating_add(1);
            self.good_streak = 0;
        } else {
            self.stuck_frames = 0;
            self.good_streak = self.good_streak.saturating_add(1);
        }

        let sudden_setback = delta < SETBACK_DELTA;
        let crashed = sudden_setback || (stuck && self.stuck_frames > stuck_threshold);
        if crashed {
            self.recent_crashes = self.recent_crashes.saturating_add(1);
        }

        self.crash_window_ticks += 1;
        if self.crash_window_ticks > self.crash_window {
            self.recent_crashes = self.recent_crashes.saturating_sub(1);
            self.crash_window_ticks = 0;
        }

        ProgressReading {
            delta,
            stuck,
            sudden_setback,
            crashed,
        }
    }

    pub fn previous_progress(&self) -> f64 {
        self.previous_progress
    }

    pub fn stuck_frames(&self) -> u32 {
        self.stuck_frames
    }

    pub fn recent_crashes(&self) -> u32 {
        self.recent_crashes
    }

    pub fn good_streak(&self) -> u32 {
        self.good_streak
    }

    pub fn crash_window_ticks(&self) -> u32 {
        self.crash_window_ticks
    }

    pub fn clear_stuck(&mut self) {
        self.stuck_frames = 0;
    }

    /// Drops one crash from the short-term count, floored at zero.
    pub fn forgive_crash(&mut self) {
        self.recent_crashes = self.recent_crashes.saturating_sub(1);
    }
}
