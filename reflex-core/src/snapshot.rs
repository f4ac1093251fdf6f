use crate::error::ScanFault;
use serde::{Deserialize, Serialize};

/// Per-tick perception handed over by the host.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Occupancy grid, row-major with row 0 at the top. 0 is passable.
    #[serde(default)]
    pub grid: Option<Vec<Vec<i32>>>,
    /// Cumulative distance travelled.
    pub progress: f64,
    /// Stage origin, subtracted from `progress` to get the grid column.
    #[serde(default)]
    pub origin_offset: f64,
    /// Host time budget for this tick. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_time_ms: Option<u64>,
}

impl Snapshot {
    pub fn new(grid: Option<Vec<Vec<i32>>>, progress: f64, origin_offset: f64) -> Self {
        Self {
            grid,
            progress,
            origin_offset,
            remaining_time_ms: None,
        }
    }

    pub fn tiles(&self) -> Result<TileView<'_>, ScanFault> {
        TileView::new(self.grid.as_deref().ok_or(ScanFault::GridAbsent)?)
    }
}

/// Bounds-checked read access to a possibly ragged grid.
#[derive(Clone, Copy, Debug)]
pub struct TileView<'a> {
    rows: &'a [Vec<i32>],
    width: usize,
}

impl<'a> TileView<'a> {
    /// The first row defines the column count; later rows may be shorter and
    /// fault on access.
    pub fn new(rows: &'a [Vec<i32>]) -> Result<Self, ScanFault> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(ScanFault::GridAbsent);
        }
        Ok(Self { rows, width })
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_solid(&self, row: usize, col: usize) -> Result<bool, ScanFault> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|cell| *cell != 0)
            .ok_or(ScanFault::CellOutOfRange { row, col })
    }

    /// Column under the agent, clamped into the grid.
    pub fn column_at(&self, progress: f64, origin_offset: f64) -> usize {
        let raw = (progress - origin_offset).floor() as i64;
        raw.clamp(0, self.width as i64 - 1) as usize
    }
}

/// Builds a grid from rows of text: `.` and spaces are empty, anything else
/// is solid. Blank lines are skipped.
pub fn parse_ascii_grid(text: &str) -> Vec<Vec<i32>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.chars()
                .map(|ch| if ch == '.' || ch == ' ' { 0 } else { 1 })
                .collect()
        })
        .collect()
}
