pub mod adapt;
pub mod agent;
pub mod config;
pub mod constants;
pub mod describe;
pub mod error;
pub mod progress;
pub mod rng;
pub mod snapshot;
pub mod terrain;

pub use agent::{Action, Controller, Decision, JumpTrigger, ReflexAgent};
pub use config::AgentConfig;
pub use error::{ConfigError, ScanFault};
pub use rng::{RandomSource, SeededRng};
pub use snapshot::Snapshot;
