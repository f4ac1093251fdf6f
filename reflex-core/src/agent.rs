//! Per-tick decision loop.
//!
//! A started jump is committed: while the countdown runs every tick emits
//! `Jump` and nothing else is evaluated. On the ground the checks run in a
//! fixed order (panic, obstacle, crash anticipation, exploration) and the
//! first one that fires starts a jump.

use crate::adapt::{AdaptationController, DynamicParams, Posture};
use crate::config::AgentConfig;
use crate::constants::*;
use crate::progress::ProgressMonitor;
use crate::rng::{RandomSource, SeededRng};
use crate::snapshot::Snapshot;
use crate::terrain::{danger_ahead, obstacle_ahead, ScanProfile};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Advance,
    Jump,
}

impl Action {
    /// One-byte tape encoding: `R` for advance, `U` for jump.
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Advance => b'R',
            Self::Jump => b'U',
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'R' => Some(Self::Advance),
            b'U' => Some(Self::Jump),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpTrigger {
    Panic,
    Obstacle,
    Danger,
    Exploration,
}

impl JumpTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Panic => "panic",
            Self::Obstacle => "obstacle",
            Self::Danger => "danger",
            Self::Exploration => "exploration",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct JumpStart {
    pub trigger: JumpTrigger,
    /// Countdown loaded after this tick; this many further ticks emit `Jump`.
    pub duration: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub action: Action,
    /// Set only on the tick a jump begins.
    pub jump: Option<JumpStart>,
}

impl Decision {
    fn advance() -> Self {
        Self {
            action: Action::Advance,
            jump: None,
        }
    }

    fn hold() -> Self {
        Self {
            action: Action::Jump,
            jump: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Ground,
    Jumping,
}

/// Read-only copy of the agent's mutable control state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ControlState {
    pub tick: u64,
    pub jump_countdown: u32,
    pub previous_progress: f64,
    pub stuck_frames: u32,
    pub recent_crashes: u32,
    pub good_streak: u32,
    pub crash_window_ticks: u32,
}

/// Anything that turns a snapshot into one action per tick.
pub trait Controller {
    fn id(&self) -> &str;
    fn act(&mut self, snapshot: &Snapshot) -> Action;
}

pub struct ReflexAgent<R: RandomSource = SeededRng> {
    id: String,
    scan: ScanProfile,
    lookahead_min: usize,
    monitor: ProgressMonitor,
    adapt: AdaptationController,
    jump_countdown: u32,
    tick: u64,
    rng: R,
}

impl<R: RandomSource> ReflexAgent<R> {
    /// `rng` is used exactly as handed over.
    pub fn new(config: &AgentConfig, rng: R) -> Self {
        Self {
            id: config.id.clone(),
            scan: ScanProfile::from(config),
            lookahead_min: config.lookahead_min,
            monitor: ProgressMonitor::new(config.crash_window),
            adapt: AdaptationController::new(config),
            jump_countdown: 0,
            tick: 0,
            rng,
        }
    }

    pub fn decide(&mut self, snapshot: &Snapshot) -> Decision {
        self.tick += 1;

        if self.jump_countdown > 0 {
            self.jump_countdown -= 1;
            return Decision::hold();
        }

        // Crash accounting uses the threshold in force before this tick's
        // adaptation step.
        let threshold = self.adapt.params().stuck_threshold;
        self.monitor.update(snapshot.progress, threshold);
        let params = *self
            .adapt
            .refresh(self.monitor.recent_crashes(), self.monitor.good_streak());

        if self.monitor.stuck_frames() > params.stuck_threshold {
            let blocked = obstacle_ahead(
                snapshot,
                &self.scan,
                PANIC_SCAN_MIN,
                params.lookahead_max,
            );
            let ticks = if blocked {
                PANIC_BLOCKED_JUMP_TICKS
            } else {
                PANIC_JUMP_TICKS
            };
            let duration = self.draw(ticks).min(params.jump_hold_max);
            self.monitor.clear_stuck();
            return self.start_jump(JumpTrigger::Panic, duration);
        }

        if obstacle_ahead(snapshot, &self.scan, self.lookahead_min, params.lookahead_max) {
            let duration = self.draw(OBSTACLE_JUMP_TICKS).min(params.jump_hold_max);
            return self.start_jump(JumpTrigger::Obstacle, duration);
        }

        if self.monitor.recent_crashes() >= DANGER_CRASH_TRIGGER
            && danger_ahead(snapshot, &self.scan, params.lookahead_max)
        {
            let duration = self.draw(DANGER_JUMP_TICKS).min(params.jump_hold_max);
            self.monitor.forgive_crash();
            return self.start_jump(JumpTrigger::Danger, duration);
        }

        if self.rng.next_f64() < params.random_jump_prob {
            let duration = self.draw(EXPLORE_JUMP_TICKS);
            return self.start_jump(JumpTrigger::Exploration, duration);
        }

        Decision::advance()
    }

    fn draw(&mut self, (min, max_exclusive): (u32, u32)) -> u32 {
        self.rng.next_range(min, max_exclusive)
    }

    fn start_jump(&mut self, trigger: JumpTrigger, duration: u32) -> Decision {
        self.jump_countdown = duration;
        tracing::debug!(
            tick = self.tick,
            trigger = trigger.as_str(),
            duration,
            "jump started"
        );
        Decision {
            action: Action::Jump,
            jump: Some(JumpStart { trigger, duration }),
        }
    }

    pub fn phase(&self) -> Phase {
        if self.jump_countdown > 0 {
            Phase::Jumping
        } else {
            Phase::Ground
        }
    }

    pub fn control_state(&self) -> ControlState {
        ControlState {
            tick: self.tick,
            jump_countdown: self.jump_countdown,
            previous_progress: self.monitor.previous_progress(),
            stuck_frames: self.monitor.stuck_frames(),
            recent_crashes: self.monitor.recent_crashes(),
            good_streak: self.monitor.good_streak(),
            crash_window_ticks: self.monitor.crash_window_ticks(),
        }
    }

    pub fn params(&self) -> &DynamicParams {
        self.adapt.params()
    }

    pub fn baseline(&self) -> &DynamicParams {
        self.adapt.baseline()
    }

    pub fn posture(&self) -> Posture {
        self.adapt.posture()
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }
}

impl<R: RandomSource> Controller for ReflexAgent<R> {
    fn id(&self) -> &str {
        &self.id
    }

    fn act(&mut self, snapshot: &Snapshot) -> Action {
        self.decide(snapshot).action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::parse_ascii_grid;
    use std::collections::VecDeque;

    /// Replays scripted draws; falls back to "no exploration, lowest value".
    #[derive(Default)]
    struct ScriptedRng {
        ints: VecDeque<u32>,
        floats: VecDeque<f64>,
    }

    impl RandomSource for ScriptedRng {
        fn next_int(&mut self, bound: u32) -> u32 {
            self.ints.pop_front().unwrap_or(0) % bound
        }

        fn next_f64(&mut self) -> f64 {
            self.floats.pop_front().unwrap_or(0.999)
        }
    }

    const WALLED: &str = "
        ............
        ............
        ............
        ............
        .....#......
        .....#......
        ############
        ############
    ";

    fn blank(progress: f64) -> Snapshot {
        Snapshot::new(None, progress, 0.0)
    }

    #[test]
    fn clear_path_advances() {
        let mut agent = ReflexAgent::new(&AgentConfig::default(), ScriptedRng::default());
        let mut progress = 0.0;
        for _ in 0..20 {
            progress += 2.0;
            assert_eq!(agent.decide(&blank(progress)), Decision::advance());
        }
        assert_eq!(agent.phase(), Phase::Ground);
    }

    #[test]
    fn wall_ahead_starts_committed_jump() {
        let rng = ScriptedRng {
            ints: VecDeque::from([3]),
            ..ScriptedRng::default()
        };
        let mut agent = ReflexAgent::new(&AgentConfig::default(), rng);
        let snap = Snapshot::new(Some(parse_ascii_grid(WALLED)), 2.0, 0.0);

        let first = agent.decide(&snap);
        assert_eq!(
            first.jump,
            Some(JumpStart {
                trigger: JumpTrigger::Obstacle,
                duration: 12,
            })
        );
        // 10 + 3 = 13, capped at the jump-hold ceiling of 12.
        for remaining in (0..12).rev() {
            let next = agent.decide(&blank(0.0));
            assert_eq!(next, Decision::hold());
            assert_eq!(agent.control_state().jump_countdown, remaining);
        }
        assert_eq!(agent.phase(), Phase::Ground);
    }

    #[test]
    fn jump_ticks_skip_progress_monitoring() {
        let rng = ScriptedRng {
            floats: VecDeque::from([0.0]),
            ..ScriptedRng::default()
        };
        let mut agent = ReflexAgent::new(&AgentConfig::default(), rng);
        let start = agent.decide(&blank(3.0));
        assert_eq!(start.jump.map(|j| j.trigger), Some(JumpTrigger::Exploration));
        assert_eq!(start.jump.map(|j| j.duration), Some(3));

        for _ in 0..3 {
            agent.decide(&blank(-50.0));
        }
        let state = agent.control_state();
        assert_eq!(state.previous_progress, 3.0);
        assert_eq!(state.recent_crashes, 0);
        assert_eq!(state.tick, 4);
    }

    #[test]
    fn stall_triggers_panic_on_seventh_tick() {
        let mut agent = ReflexAgent::new(&AgentConfig::default(), ScriptedRng::default());
        for _ in 0..6 {
            assert_eq!(agent.act(&blank(0.0)), Action::Advance);
        }
        let decision = agent.decide(&blank(0.0));
        assert_eq!(decision.action, Action::Jump);
        assert_eq!(
            decision.jump,
            Some(JumpStart {
                trigger: JumpTrigger::Panic,
                duration: 8,
            })
        );
        let state = agent.control_state();
        assert_eq!(state.stuck_frames, 0);
        // The stall also counts as one crash, which the panic jump keeps.
        assert_eq!(state.recent_crashes, 1);
    }

    #[test]
    fn blocked_panic_uses_longer_range() {
        let rng = ScriptedRng {
            ints: VecDeque::from([5]),
            ..ScriptedRng::default()
        };
        let cfg = AgentConfig {
            jump_hold: 20,
            ..AgentConfig::default()
        };
        let mut agent = ReflexAgent::new(&cfg, rng);
        // Stall blind, then the wall shows up on the tick the panic fires.
        for _ in 0..6 {
            agent.decide(&blank(0.0));
        }
        assert_eq!(agent.control_state().stuck_frames, 6);
        let grid = parse_ascii_grid(WALLED);
        let decision = agent.decide(&Snapshot::new(Some(grid), 0.0, 0.0));
        assert_eq!(
            decision.jump,
            Some(JumpStart {
                trigger: JumpTrigger::Panic,
                duration: 17,
            })
        );
    }

    #[test]
    fn danger_jump_forgives_one_crash() {
        let pit = "
            ............
            ............
            ............
            ............
            ............
            ............
            ##.#########
            ##.#########
        ";
        let mut agent = ReflexAgent::new(&AgentConfig::default(), ScriptedRng::default());
        // Two sharp setbacks on clear ground.
        agent.decide(&blank(10.0));
        agent.decide(&blank(5.0));
        agent.decide(&blank(1.0));
        assert_eq!(agent.control_state().recent_crashes, 2);

        // The pit sits one column ahead: below the obstacle window, inside
        // the danger window.
        let snap = Snapshot::new(Some(parse_ascii_grid(pit)), 1.0, 0.0);
        let decision = agent.decide(&snap);
        assert_eq!(decision.jump.map(|j| j.trigger), Some(JumpTrigger::Danger));
        assert_eq!(decision.jump.map(|j| j.duration), Some(10));
        assert_eq!(agent.control_state().recent_crashes, 1);
    }

    #[test]
    fn absent_and_garbled_grids_never_fail() {
        let mut agent = ReflexAgent::new(&AgentConfig::default(), SeededRng::new(7));
        let grids = [
            None,
            Some(Vec::new()),
            Some(vec![Vec::new()]),
            Some(vec![vec![0; 12], vec![1; 3]]),
            Some(vec![vec![1]]),
        ];
        for (idx, grid) in grids.into_iter().cycle().take(200).enumerate() {
            let snap = Snapshot::new(grid, idx as f64 * 0.3, 0.0);
            let action = agent.act(&snap);
            assert!(matches!(action, Action::Advance | Action::Jump));
        }
    }

    #[test]
    fn tape_bytes_round_trip() {
        for action in [Action::Advance, Action::Jump] {
            assert_eq!(Action::from_byte(action.as_byte()), Some(action));
        }
        assert_eq!(Action::from_byte(b'x'), None);
    }
}
