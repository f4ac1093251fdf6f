//! Wall and pit detection over the occupancy grid.
//!
//! The `scan_*` functions report grid faults explicitly. The `*_ahead`
//! wrappers used by the decision loop fold any fault into "nothing ahead".

use crate::config::AgentConfig;
use crate::constants::{AGENT_HEIGHT_ROWS, PIT_DEPTH_CHECK};
use crate::error::ScanFault;
use crate::snapshot::{Snapshot, TileView};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanProfile {
    pub pit_depth: usize,
    pub agent_height_rows: usize,
}

impl Default for ScanProfile {
    fn default() -> Self {
        Self {
            pit_depth: PIT_DEPTH_CHECK,
            agent_height_rows: AGENT_HEIGHT_ROWS,
        }
    }
}

impl From<&AgentConfig> for ScanProfile {
    fn from(cfg: &AgentConfig) -> Self {
        Self {
            pit_depth: cfg.pit_depth,
            agent_height_rows: cfg.agent_height_rows,
        }
    }
}

/// Wall band rows, inclusive: from two rows above to one row below the
/// estimated agent row.
fn wall_band(view: &TileView<'_>, profile: &ScanProfile) -> (usize, usize) {
    let last = view.height() - 1;
    let agent_row = view.height().saturating_sub(profile.agent_height_rows);
    (agent_row.saturating_sub(2), (agent_row + 1).min(last))
}

fn has_wall(
    view: &TileView<'_>,
    profile: &ScanProfile,
    col: usize,
) -> Result<bool, ScanFault> {
    let (top, bottom) = wall_band(view, profile);
    for row in top..=bottom {
        if view.is_solid(row, col)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_pit(view: &TileView<'_>, profile: &ScanProfile, col: usize) -> Result<bool, ScanFault> {
    let bottom_start = view.height().saturating_sub(profile.pit_depth);
    for row in (bottom_start..view.height()).rev() {
        if view.is_solid(row, col)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// True on the first column in `current+min_look ..= current+max_look` that
/// holds a wall in the agent's height band or has no ground. Columns past the
/// right edge are skipped.
pub fn scan_obstacle(
    view: &TileView<'_>,
    profile: &ScanProfile,
    min_look: usize,
    max_look: usize,
    current: usize,
) -> Result<bool, ScanFault> {
    for look in min_look..=max_look {
        let col = current + look;
        if col >= view.width() {
            continue;
        }
        if has_wall(view, profile, col)? || is_pit(view, profile, col)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Pit-only variant over `current+1 ..= current+max_look`.
pub fn scan_danger(
    view: &TileView<'_>,
    profile: &ScanProfile,
    max_look: usize,
    current: usize,
) -> Result<bool, ScanFault> {
    for look in 1..=max_look {
        let col = current + look;
        if col >= view.width() {
            continue;
        }
        if is_pit(view, profile, col)? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn obstacle_ahead(
    snapshot: &Snapshot,
    profile: &ScanProfile,
    min_look: usize,
    max_look: usize,
) -> bool {
    let scanned = snapshot.tiles().and_then(|view| {
        let current = view.column_at(snapshot.progress, snapshot.origin_offset);
        scan_obstacle(&view, profile, min_look, max_look, current)
    });
    settle(scanned)
}

pub fn danger_ahead(snapshot: &Snapshot, profile: &ScanProfile, max_look: usize) -> bool {
    let scanned = snapshot.tiles().and_then(|view| {
        let current = view.column_at(snapshot.progress, snapshot.origin_offset);
        scan_danger(&view, profile, max_look, current)
    });
    settle(scanned)
}

fn settle(scanned: Result<bool, ScanFault>) -> bool {
    match scanned {
        Ok(hit) => hit,
        Err(fault) => {
            tracing::trace!(%fault, "terrain scan fault treated as clear");
            false
        }
    }
}
