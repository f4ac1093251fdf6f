// Baseline tuning. These are the defaults for `AgentConfig`.
pub const LOOKAHEAD_MIN: usize = 2;
pub const LOOKAHEAD_MAX: usize = 5;
pub const PIT_DEPTH_CHECK: usize = 6;
pub const AGENT_HEIGHT_ROWS: usize = 4;
pub const STUCK_THRESHOLD: u32 = 6;
pub const BASE_JUMP_HOLD: u32 = 12;
pub const BASE_RANDOM_JUMP_PROB: f64 = 0.01;
pub const RANDOM_PROB_STEP: f64 = 0.001;
pub const CRASH_WINDOW: u32 = 40;
pub const GOOD_STREAK_TRIGGER: u32 = 30;

// Hard safety bounds for the dynamic parameters.
pub const MAX_LOOKAHEAD_LIMIT: usize = 8;
pub const MIN_JUMP_HOLD: u32 = 4;
pub const MAX_JUMP_HOLD_LIMIT: u32 = 20;
pub const MIN_RANDOM_PROB: f64 = 0.002;
pub const MAX_RANDOM_PROB: f64 = 0.12;
pub const MIN_STUCK_THRESHOLD: u32 = 2;
pub const MAX_STUCK_THRESHOLD: u32 = 12;

// Progress classification.
pub const STUCK_DELTA: f64 = 1.0;
pub const SETBACK_DELTA: f64 = -0.4;

// Jump durations, as [min, max_exclusive) tick ranges.
pub const PANIC_JUMP_TICKS: (u32, u32) = (8, 14);
pub const PANIC_BLOCKED_JUMP_TICKS: (u32, u32) = (12, 18);
pub const PANIC_SCAN_MIN: usize = 2;
pub const OBSTACLE_JUMP_TICKS: (u32, u32) = (10, 18);
pub const DANGER_JUMP_TICKS: (u32, u32) = (10, 16);
pub const EXPLORE_JUMP_TICKS: (u32, u32) = (3, 8);
pub const DANGER_CRASH_TRIGGER: u32 = 2;
