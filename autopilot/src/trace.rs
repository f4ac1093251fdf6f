//! Snapshot traces: JSON Lines, one snapshot per line.

use anyhow::{anyhow, Context, Result};
use reflex_core::Snapshot;
use std::fs;
use std::path::Path;

/// Blank lines and `#` comments are skipped. Line numbers in errors are
/// 1-based.
pub fn parse_trace(data: &str) -> Result<Vec<Snapshot>> {
    let mut frames = Vec::new();
    for (idx, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let frame: Snapshot = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid snapshot on line {}", idx + 1))?;
        frames.push(frame);
    }
    if frames.is_empty() {
        return Err(anyhow!("trace contained no snapshots"));
    }
    Ok(frames)
}

pub fn load_trace(path: &Path) -> Result<Vec<Snapshot>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading trace {}", path.display()))?;
    parse_trace(&data).with_context(|| format!("failed parsing trace {}", path.display()))
}

pub fn write_trace(path: &Path, frames: &[Snapshot]) -> Result<()> {
    let mut out = String::new();
    for frame in frames {
        out.push_str(&serde_json::to_string(frame).context("failed to encode snapshot")?);
        out.push('\n');
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    fs::write(path, out).with_context(|| format!("failed writing {}", path.display()))
}
