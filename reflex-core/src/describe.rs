//! Explicit field listings for debugging: the snapshot layout the agent
//! expects, and the live values of an agent's state.

use crate::agent::ReflexAgent;
use crate::rng::RandomSource;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldDescription {
    pub group: &'static str,
    pub name: &'static str,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

fn field(
    group: &'static str,
    name: &'static str,
    kind: &'static str,
    value: String,
) -> FieldDescription {
    FieldDescription {
        group,
        name,
        kind,
        value: Some(value),
    }
}

pub fn snapshot_fields() -> Vec<FieldDescription> {
    [
        ("grid", "Option<Vec<Vec<i32>>>"),
        ("progress", "f64"),
        ("origin_offset", "f64"),
        ("remaining_time_ms", "Option<u64>"),
    ]
    .into_iter()
    .map(|(name, kind)| FieldDescription {
        group: "snapshot",
        name,
        kind,
        value: None,
    })
    .collect()
}

pub fn describe_agent<R: RandomSource>(agent: &ReflexAgent<R>) -> Vec<FieldDescription> {
    let state = agent.control_state();
    let params = agent.params();
    let baseline = agent.baseline();
    vec![
        field("control", "tick", "u64", state.tick.to_string()),
        field("control", "phase", "Phase", format!("{:?}", agent.phase())),
        field("control", "jump_countdown", "u32", state.jump_countdown.to_string()),
        field(
            "control",
            "previous_progress",
            "f64",
            state.previous_progress.to_string(),
        ),
        field("control", "stuck_frames", "u32", state.stuck_frames.to_string()),
        field("control", "recent_crashes", "u32", state.recent_crashes.to_string()),
        field("control", "good_streak", "u32", state.good_streak.to_string()),
        field(
            "control",
            "crash_window_ticks",
            "u32",
            state.crash_window_ticks.to_string(),
        ),
        field("adapt", "posture", "Posture", agent.posture().as_str().to_string()),
        field("adapt", "lookahead_max", "usize", params.lookahead_max.to_string()),
        field("adapt", "jump_hold_max", "u32", params.jump_hold_max.to_string()),
        field(
            "adapt",
            "random_jump_prob",
            "f64",
            format!("{:.4}", params.random_jump_prob),
        ),
        field("adapt", "stuck_threshold", "u32", params.stuck_threshold.to_string()),
        field(
            "baseline",
            "lookahead_max",
            "usize",
            baseline.lookahead_max.to_string(),
        ),
        field(
            "baseline",
            "jump_hold_max",
            "u32",
            baseline.jump_hold_max.to_string(),
        ),
        field(
            "baseline",
            "random_jump_prob",
            "f64",
            format!("{:.4}", baseline.random_jump_prob),
        ),
        field(
            "baseline",
            "stuck_threshold",
            "u32",
            baseline.stuck_threshold.to_string(),
        ),
    ]
}
