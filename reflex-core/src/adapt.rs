//! Online tuning of the four dynamic parameters.
//!
//! Every tick a target is picked fresh from the crash count and good streak,
//! then each parameter moves one bounded step toward it.

use crate::config::AgentConfig;
use crate::constants::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DynamicParams {
    pub lookahead_max: usize,
    pub jump_hold_max: u32,
    pub random_jump_prob: f64,
    pub stuck_threshold: u32,
}

impl DynamicParams {
    pub fn baseline(cfg: &AgentConfig) -> Self {
        Self {
            lookahead_max: cfg.lookahead_max,
            jump_hold_max: cfg.jump_hold,
            random_jump_prob: cfg.random_jump_prob,
            stuck_threshold: cfg.stuck_threshold,
        }
        .clamped(cfg.lookahead_min)
    }

    /// Hard safety bounds, applied after every step.
    pub fn clamped(self, lookahead_min: usize) -> Self {
        let lookahead_floor = lookahead_min.min(MAX_LOOKAHEAD_LIMIT);
        let prob = if self.random_jump_prob.is_nan() {
            MIN_RANDOM_PROB
        } else {
            self.random_jump_prob
        };
        Self {
            lookahead_max: self.lookahead_max.clamp(lookahead_floor, MAX_LOOKAHEAD_LIMIT),
            jump_hold_max: self.jump_hold_max.clamp(MIN_JUMP_HOLD, MAX_JUMP_HOLD_LIMIT),
            random_jump_prob: prob.clamp(MIN_RANDOM_PROB, MAX_RANDOM_PROB),
            stuck_threshold: self
                .stuck_threshold
                .clamp(MIN_STUCK_THRESHOLD, MAX_STUCK_THRESHOLD),
        }
    }
}

/// Which target tier was chosen on the last refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Posture {
    Baseline,
    Confident,
    Wary,
    Cautious,
}

impl Posture {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Confident => "confident",
            Self::Wary => "wary",
            Self::Cautious => "cautious",
        }
    }
}

pub fn retarget(
    baseline: &DynamicParams,
    recent_crashes: u32,
    good_streak: u32,
    good_streak_trigger: u32,
) -> (Posture, DynamicParams) {
    if recent_crashes >= 3 {
        let target = DynamicParams {
            lookahead_max: (baseline.lookahead_max + 2).min(MAX_LOOKAHEAD_LIMIT),
            jump_hold_max: (baseline.jump_hold_max + 6).min(MAX_JUMP_HOLD_LIMIT),
            random_jump_prob: (baseline.random_jump_prob * 0.5).max(MIN_RANDOM_PROB),
            stuck_threshold: (baseline.stuck_threshold + 2).min(MAX_STUCK_THRESHOLD),
        };
        (Posture::Cautious, target)
    } else if recent_crashes == 2 {
        let target = DynamicParams {
            lookahead_max: (baseline.lookahead_max + 1).min(MAX_LOOKAHEAD_LIMIT),
            jump_hold_max: (baseline.jump_hold_max + 4).min(MAX_JUMP_HOLD_LIMIT),
            random_jump_prob: (baseline.random_jump_prob * 0.7).max(MIN_RANDOM_PROB),
            stuck_threshold: (baseline.stuck_threshold + 1).min(10),
        };
        (Posture::Wary, target)
    } else if good_streak > good_streak_trigger {
        let target = DynamicParams {
            random_jump_prob: (baseline.random_jump_prob * 1.2).min(MAX_RANDOM_PROB),
            ..*baseline
        };
        (Posture::Confident, target)
    } else {
        (Posture::Baseline, *baseline)
    }
}

fn step_int<T>(current: T, target: T) -> T
where
    T: Copy + Ord + core::ops::Add<Output = T> + core::ops::Sub<Output = T> + From<u8>,
{
    let one = T::from(1);
    match current.cmp(&target) {
        core::cmp::Ordering::Less => (current + one).min(target),
        core::cmp::Ordering::Greater => (current - one).max(target),
        core::cmp::Ordering::Equal => current,
    }
}

fn step_prob(current: f64, target: f64, step: f64) -> f64 {
    if (current - target).abs() <= step {
        target
    } else if current < target {
        current + step
    } else {
        current - step
    }
}

/// Moves each parameter one step toward `target` without overshooting.
pub fn step(current: &DynamicParams, target: &DynamicParams, prob_step: f64) -> DynamicParams {
    DynamicParams {
        lookahead_max: step_int(current.lookahead_max, target.lookahead_max),
        jump_hold_max: step_int(current.jump_hold_max, target.jump_hold_max),
        random_jump_prob: step_prob(
            current.random_jump_prob,
            target.random_jump_prob,
            prob_step,
        ),
        stuck_threshold: step_int(current.stuck_threshold, target.stuck_threshold),
    }
}

/// Non-finite or non-positive steps fall back to the default.
fn sanitize_step(step: f64) -> f64 {
    if step.is_finite() && step > 0.0 {
        step
    } else {
        RANDOM_PROB_STEP
    }
}

#[derive(Clone, Debug)]
pub struct AdaptationController {
    baseline: DynamicParams,
    params: DynamicParams,
    posture: Posture,
    lookahead_min: usize,
    prob_step: f64,
    good_streak_trigger: u32,
}

impl AdaptationController {
    pub fn new(cfg: &AgentConfig) -> Self {
        let baseline = DynamicParams::baseline(cfg);
        Self {
            baseline,
            params: baseline,
            posture: Posture::Baseline,
            lookahead_min: cfg.lookahead_min,
            prob_step: sanitize_step(cfg.random_prob_step),
            good_streak_trigger: cfg.good_streak_trigger,
        }
    }

    pub fn refresh(&mut self, recent_crashes: u32, good_streak: u32) -> &DynamicParams {
        let (posture, target) = retarget(
            &self.baseline,
            recent_crashes,
            good_streak,
            self.good_streak_trigger,
        );
        if posture != self.posture {
            tracing::debug!(
                from = self.posture.as_str(),
                to = posture.as_str(),
                recent_crashes,
                good_streak,
                "adaptation posture changed"
            );
            self.posture = posture;
        }
        self.params = step(&self.params, &target, self.prob_step).clamped(self.lookahead_min);
        &self.params
    }

    pub fn params(&self) -> &DynamicParams {
        &self.params
    }

    pub fn baseline(&self) -> &DynamicParams {
        &self.baseline
    }

    pub fn posture(&self) -> Posture {
        self.posture
    }
}
