pub mod config;
pub mod error;
pub mod types;

pub use config::{EngineConfig, RollTiming};
pub use error::{EngineError, Result};
pub use types::{CombatantId, HardTargetId, LogSource, SectorId};
