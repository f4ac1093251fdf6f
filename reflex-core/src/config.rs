use crate::constants::*;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Baseline tuning for one agent. The dynamic parameters start here and are
/// pulled back here whenever the run is going well.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub id: String,
    pub description: String,

    // Terrain scan
    pub lookahead_min: usize,
    pub lookahead_max: usize,
    pub pit_depth: usize,
    /// Rows above the grid bottom where the wall band is centred.
    pub agent_height_rows: usize,

    // Control baseline
    pub stuck_threshold: u32,
    pub jump_hold: u32,
    pub random_jump_prob: f64,

    // Adaptation
    pub random_prob_step: f64,
    pub crash_window: u32,
    pub good_streak_trigger: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            id: "reflex-default".to_string(),
            description: "Baseline reflex profile.".to_string(),
            lookahead_min: LOOKAHEAD_MIN,
            lookahead_max: LOOKAHEAD_MAX,
            pit_depth: PIT_DEPTH_CHECK,
            agent_height_rows: AGENT_HEIGHT_ROWS,
            stuck_threshold: STUCK_THRESHOLD,
            jump_hold: BASE_JUMP_HOLD,
            random_jump_prob: BASE_RANDOM_JUMP_PROB,
            random_prob_step: RANDOM_PROB_STEP,
            crash_window: CRASH_WINDOW,
            good_streak_trigger: GOOD_STREAK_TRIGGER,
        }
    }
}

pub const PRESET_NAMES: [&str; 3] = ["default", "cautious", "sprinter"];

impl AgentConfig {
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "cautious" => Some(Self {
                id: "reflex-cautious".to_string(),
                description: "Long lookahead and long jumps for pit-heavy stages.".to_string(),
                lookahead_max: 6,
                jump_hold: 14,
                random_jump_prob: 0.005,
                stuck_threshold: 7,
                ..Self::default()
            }),
            "sprinter" => Some(Self {
                id: "reflex-sprinter".to_string(),
                description: "Short hops and quick panic response for flat stages.".to_string(),
                lookahead_max: 4,
                jump_hold: 10,
                random_jump_prob: 0.02,
                stuck_threshold: 5,
                ..Self::default()
            }),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookahead_min == 0 {
            return Err(ConfigError::ZeroField {
                field: "lookahead_min",
            });
        }
        if self.pit_depth == 0 {
            return Err(ConfigError::ZeroField { field: "pit_depth" });
        }
        if self.agent_height_rows == 0 {
            return Err(ConfigError::ZeroField {
                field: "agent_height_rows",
            });
        }
        if self.crash_window == 0 {
            return Err(ConfigError::ZeroField {
                field: "crash_window",
            });
        }
        if self.lookahead_min > self.lookahead_max {
            return Err(ConfigError::LookaheadOrder {
                min: self.lookahead_min,
                max: self.lookahead_max,
            });
        }
        if self.lookahead_max > MAX_LOOKAHEAD_LIMIT {
            return Err(ConfigError::LookaheadOutOfRange {
                value: self.lookahead_max,
                max: MAX_LOOKAHEAD_LIMIT,
            });
        }
        if !(MIN_JUMP_HOLD..=MAX_JUMP_HOLD_LIMIT).contains(&self.jump_hold) {
            return Err(ConfigError::JumpHoldOutOfRange {
                value: self.jump_hold,
                min: MIN_JUMP_HOLD,
                max: MAX_JUMP_HOLD_LIMIT,
            });
        }
        if !(MIN_RANDOM_PROB..=MAX_RANDOM_PROB).contains(&self.random_jump_prob) {
            return Err(ConfigError::RandomProbOutOfRange {
                value: self.random_jump_prob,
                min: MIN_RANDOM_PROB,
                max: MAX_RANDOM_PROB,
            });
        }
        if !(MIN_STUCK_THRESHOLD..=MAX_STUCK_THRESHOLD).contains(&self.stuck_threshold) {
            return Err(ConfigError::StuckThresholdOutOfRange {
                value: self.stuck_threshold,
                min: MIN_STUCK_THRESHOLD,
                max: MAX_STUCK_THRESHOLD,
            });
        }
        if !(self.random_prob_step.is_finite() && self.random_prob_step > 0.0) {
            return Err(ConfigError::NonPositiveStep {
                value: self.random_prob_step,
            });
        }
        Ok(())
    }
}
