use core::fmt;

/// Perception faults seen while reading the tile grid. The scanner never
/// surfaces these to the decision loop; they collapse to "nothing ahead".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanFault {
    GridAbsent,
    CellOutOfRange { row: usize, col: usize },
}

impl fmt::Display for ScanFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridAbsent => write!(f, "grid absent or empty"),
            Self::CellOutOfRange { row, col } => {
                write!(f, "cell out of range: row={row}, col={col}")
            }
        }
    }
}

impl std::error::Error for ScanFault {}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    LookaheadOrder { min: usize, max: usize },
    LookaheadOutOfRange { value: usize, max: usize },
    JumpHoldOutOfRange { value: u32, min: u32, max: u32 },
    RandomProbOutOfRange { value: f64, min: f64, max: f64 },
    StuckThresholdOutOfRange { value: u32, min: u32, max: u32 },
    ZeroField { field: &'static str },
    NonPositiveStep { value: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LookaheadOrder { min, max } => {
                write!(f, "lookahead_min ({min}) exceeds lookahead_max ({max})")
            }
            Self::LookaheadOutOfRange { value, max } => {
                write!(f, "lookahead_max out of range: {value} (allowed ..={max})")
            }
            Self::JumpHoldOutOfRange { value, min, max } => {
                write!(f, "jump_hold out of range: {value} (allowed {min}..={max})")
            }
            Self::RandomProbOutOfRange { value, min, max } => write!(
                f,
                "random_jump_prob out of range: {value} (allowed {min}..={max})"
            ),
            Self::StuckThresholdOutOfRange { value, min, max } => write!(
                f,
                "stuck_threshold out of range: {value} (allowed {min}..={max})"
            ),
            Self::ZeroField { field } => write!(f, "{field} must be > 0"),
            Self::NonPositiveStep { value } => {
                write!(f, "random_prob_step must be positive, got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
