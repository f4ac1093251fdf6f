use reflex_core::constants::*;
use reflex_core::snapshot::parse_ascii_grid;
use reflex_core::{
    Action, AgentConfig, Controller, JumpTrigger, RandomSource, ReflexAgent, SeededRng, Snapshot,
};

/// Host stand-in: noisy progress with setbacks and a rotating mix of valid,
/// ragged and missing grids.
fn noisy_snapshots(seed: u32, count: usize) -> Vec<Snapshot> {
    let mut rng = SeededRng::new(seed);
    let mut progress = 0.0f64;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        progress += match rng.next_int(10) {
            0 => -2.0,
            1..=4 => 0.0,
            _ => 1.5,
        };
        let grid = match rng.next_int(6) {
            0 => None,
            1 => Some(vec![vec![0; 16], vec![1; 4]]),
            _ => {
                let rows = 10;
                let cols = 16;
                let mut grid = vec![vec![0; cols]; rows];
                for row in grid.iter_mut().skip(rows - 2) {
                    for cell in row.iter_mut() {
                        *cell = i32::from(rng.next_int(5) != 0);
                    }
                }
                Some(grid)
            }
        };
        out.push(Snapshot::new(grid, progress, progress - 3.0));
    }
    out
}

#[test]
fn dynamic_params_stay_bounded_and_smooth() {
    for seed in [0xDEAD_BEEF, 0xC0FF_EE11, 0x1234_5678, 7] {
        let cfg = AgentConfig::default();
        let mut agent = ReflexAgent::new(&cfg, SeededRng::new(seed ^ 0x5555));
        let mut previous = *agent.params();
        for snap in noisy_snapshots(seed, 3_000) {
            agent.act(&snap);
            let p = *agent.params();
            assert!((cfg.lookahead_min..=MAX_LOOKAHEAD_LIMIT).contains(&p.lookahead_max));
            assert!((MIN_JUMP_HOLD..=MAX_JUMP_HOLD_LIMIT).contains(&p.jump_hold_max));
            assert!((MIN_RANDOM_PROB..=MAX_RANDOM_PROB).contains(&p.random_jump_prob));
            assert!((MIN_STUCK_THRESHOLD..=MAX_STUCK_THRESHOLD).contains(&p.stuck_threshold));

            assert!(p.lookahead_max.abs_diff(previous.lookahead_max) <= 1);
            assert!(p.jump_hold_max.abs_diff(previous.jump_hold_max) <= 1);
            assert!(p.stuck_threshold.abs_diff(previous.stuck_threshold) <= 1);
            assert!(
                (p.random_jump_prob - previous.random_jump_prob).abs()
                    <= cfg.random_prob_step + 1e-12
            );
            previous = p;
        }
    }
}

#[test]
fn started_jumps_run_their_full_countdown() {
    let mut agent = ReflexAgent::new(&AgentConfig::default(), SeededRng::new(0xC0FF_EE11));
    let mut pending: Option<u32> = None;
    let mut jumps_seen = 0;
    for snap in noisy_snapshots(99, 4_000) {
        let before = agent.control_state().jump_countdown;
        let decision = agent.decide(&snap);
        let after = agent.control_state().jump_countdown;

        if let Some(left) = pending {
            assert_eq!(decision.action, Action::Jump);
            assert!(decision.jump.is_none());
            assert_eq!(after, left - 1);
            pending = (after > 0).then_some(after);
            continue;
        }

        assert_eq!(before, 0);
        match decision.jump {
            Some(start) => {
                jumps_seen += 1;
                assert_eq!(decision.action, Action::Jump);
                assert!(start.duration >= 3);
                assert_eq!(after, start.duration);
                pending = Some(start.duration);
            }
            None => assert_eq!(decision.action, Action::Advance),
        }
    }
    assert!(jumps_seen > 0);
}

#[test]
fn identical_seed_and_frames_reproduce_actions() {
    let frames = noisy_snapshots(0xABCD, 1_500);
    let run = |seed| {
        let mut agent = ReflexAgent::new(&AgentConfig::default(), SeededRng::new(seed));
        frames.iter().map(|s| agent.act(s)).collect::<Vec<_>>()
    };
    assert_eq!(run(0x1234_5678), run(0x1234_5678));
}

/// Draws the low end of every range and never rolls under the exploration
/// probability.
struct Steady;

impl RandomSource for Steady {
    fn next_int(&mut self, _bound: u32) -> u32 {
        0
    }

    fn next_f64(&mut self) -> f64 {
        0.999
    }
}

#[test]
fn seven_stalled_ticks_panic_on_the_last() {
    let mut agent = ReflexAgent::new(&AgentConfig::default(), Steady);
    let stalled = Snapshot::new(None, 0.0, 0.0);
    for tick in 1..=6 {
        assert_eq!(agent.act(&stalled), Action::Advance, "tick {tick}");
    }
    assert_eq!(agent.control_state().stuck_frames, 6);

    let last = agent.decide(&stalled);
    assert_eq!(last.action, Action::Jump);
    assert_eq!(last.jump.map(|j| j.trigger), Some(JumpTrigger::Panic));
    assert_eq!(last.jump.map(|j| j.duration), Some(PANIC_JUMP_TICKS.0));
    assert_eq!(agent.control_state().stuck_frames, 0);
}

#[test]
fn pit_ahead_on_real_stage_triggers_jump() {
    let stage = "
        ................
        ................
        ................
        ................
        ................
        ................
        ................
        ................
        ######....######
        ######....######
    ";
    let grid = parse_ascii_grid(stage);
    let mut agent = ReflexAgent::new(&AgentConfig::default(), SeededRng::new(3));
    // Column 2: the gap starts at lookahead 4.
    let decision = agent.decide(&Snapshot::new(Some(grid), 52.0, 50.0));
    assert_eq!(decision.action, Action::Jump);
    assert_eq!(decision.jump.map(|j| j.trigger.as_str()), Some("obstacle"));
    let duration = decision.jump.map(|j| j.duration).unwrap_or_default();
    assert!((10..=12).contains(&duration));
}
