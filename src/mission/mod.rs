//! Mission sectors and their generation
//!
//! Sector CRUD belongs to the mission store; this module only defines the
//! snapshot types, the d6 generation tables and record normalization.

pub mod generation;
pub mod normalize;
pub mod sector;

pub use generation::{roll_airspace, roll_difficulty, roll_objective, roll_sector, Airspace, Difficulty};
pub use normalize::{normalize_sectors, parse_sectors};
pub use sector::{
    parse_threat_tag, Cover, DefenseCountdown, HardTarget, Sector, SectorContent, Space,
    ThreatLevel, Weather,
};
