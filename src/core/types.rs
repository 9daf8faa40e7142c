//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a roster entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId(pub u32);

impl std::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier for mission sectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectorId(pub Uuid);

impl SectorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SectorId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for hard targets inside a sector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HardTargetId(pub Uuid);

impl HardTargetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HardTargetId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who authored a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogSource {
    System,
    User,
}

impl LogSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::User => "USER",
        }
    }
}
