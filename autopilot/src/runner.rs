use crate::config::config_fingerprint;
use anyhow::{anyhow, Context, Result};
use reflex_core::adapt::{DynamicParams, Posture};
use reflex_core::agent::{ControlState, JumpTrigger};
use reflex_core::{Action, AgentConfig, Controller, ReflexAgent, SeededRng, Snapshot};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize)]
pub struct RunMetrics {
    pub config_id: String,
    pub config_fingerprint: String,
    pub seed: u32,
    pub frame_count: u32,
    pub advance_frames: u32,
    pub jump_frames: u32,
    pub jumps_started: u32,
    pub panic_jumps: u32,
    pub obstacle_jumps: u32,
    pub danger_jumps: u32,
    pub exploration_jumps: u32,
    pub peak_recent_crashes: u32,
    pub final_posture: Posture,
    pub final_params: DynamicParams,
    pub final_state: ControlState,
    pub final_rng_state: u32,
}

#[derive(Clone, Debug)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    pub actions: Vec<Action>,
}

impl RunArtifact {
    pub fn tape(&self) -> Vec<u8> {
        encode_actions(&self.actions)
    }
}

/// Feeds every frame through a fresh agent seeded with `seed`.
pub fn run_trace(config: &AgentConfig, seed: u32, frames: &[Snapshot]) -> Result<RunArtifact> {
    if frames.is_empty() {
        return Err(anyhow!("trace must contain at least one frame"));
    }
    config
        .validate()
        .map_err(|err| anyhow!("invalid agent config '{}': {err}", config.id))?;

    let mut agent = ReflexAgent::new(config, SeededRng::new(seed));
    let mut actions = Vec::with_capacity(frames.len());

    let mut advance_frames = 0u32;
    let mut jump_frames = 0u32;
    let mut jumps_started = 0u32;
    let mut panic_jumps = 0u32;
    let mut obstacle_jumps = 0u32;
    let mut danger_jumps = 0u32;
    let mut exploration_jumps = 0u32;
    let mut peak_recent_crashes = 0u32;

    for frame in frames {
        let decision = agent.decide(frame);
        match decision.action {
            Action::Advance => advance_frames += 1,
            Action::Jump => jump_frames += 1,
        }
        if let Some(start) = decision.jump {
            jumps_started += 1;
            match start.trigger {
                JumpTrigger::Panic => panic_jumps += 1,
                JumpTrigger::Obstacle => obstacle_jumps += 1,
                JumpTrigger::Danger => danger_jumps += 1,
                JumpTrigger::Exploration => exploration_jumps += 1,
            }
        }
        peak_recent_crashes = peak_recent_crashes.max(agent.control_state().recent_crashes);
        actions.push(decision.action);
    }

    Ok(RunArtifact {
        metrics: RunMetrics {
            config_id: config.id.clone(),
            config_fingerprint: config_fingerprint(config)?,
            seed,
            frame_count: actions.len() as u32,
            advance_frames,
            jump_frames,
            jumps_started,
            panic_jumps,
            obstacle_jumps,
            danger_jumps,
            exploration_jumps,
            peak_recent_crashes,
            final_posture: agent.posture(),
            final_params: *agent.params(),
            final_state: agent.control_state(),
            final_rng_state: agent.rng().state(),
        },
        actions,
    })
}

/// Drives any controller over a trace and returns its actions.
pub fn run_controller(controller: &mut dyn Controller, frames: &[Snapshot]) -> Vec<Action> {
    frames.iter().map(|frame| controller.act(frame)).collect()
}

pub fn encode_actions(actions: &[Action]) -> Vec<u8> {
    actions.iter().map(|action| action.as_byte()).collect()
}

pub fn decode_actions(bytes: &[u8]) -> Result<Vec<Action>> {
    bytes
        .iter()
        .enumerate()
        .filter(|(_, byte)| !byte.is_ascii_whitespace())
        .map(|(idx, byte)| {
            Action::from_byte(*byte)
                .ok_or_else(|| anyhow!("invalid action byte 0x{byte:02x} at offset {idx}"))
        })
        .collect()
}

pub fn write_tape(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed writing {}", path.display()))
}
