//! Loadout catalog - weapons, armor and special gear
//!
//! Labels match the ids the roster editor stores ("marksman_rifle", "hmg").

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;

/// Fold a stored label into `snake_case` for matching
pub(crate) fn label_key(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Primary weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weapon {
    AssaultRifle,
    Carbine,
    MarksmanRifle,
}

impl Weapon {
    pub fn id(&self) -> &'static str {
        match self {
            Self::AssaultRifle => "assault_rifle",
            Self::Carbine => "carbine",
            Self::MarksmanRifle => "marksman_rifle",
        }
    }
}

impl FromStr for Weapon {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "assault_rifle" => Ok(Self::AssaultRifle),
            "carbine" => Ok(Self::Carbine),
            "marksman_rifle" | "dmr" => Ok(Self::MarksmanRifle),
            _ => Err(EngineError::unknown("weapon", s)),
        }
    }
}

/// Body armor class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Armor {
    Light,
    Medium,
    Heavy,
}

impl Armor {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Heavy => "heavy",
        }
    }
}

impl FromStr for Armor {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "light" => Ok(Self::Light),
            "medium" => Ok(Self::Medium),
            "heavy" => Ok(Self::Heavy),
            _ => Err(EngineError::unknown("armor", s)),
        }
    }
}

/// Assignable special equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gear {
    SniperRifle,
    HeavyMachineGun,
    Medkit,
    Demolitions,
    ReconDrone,
}

impl Gear {
    pub fn id(&self) -> &'static str {
        match self {
            Self::SniperRifle => "sniper_rifle",
            Self::HeavyMachineGun => "hmg",
            Self::Medkit => "medkit",
            Self::Demolitions => "demolitions",
            Self::ReconDrone => "recon_drone",
        }
    }
}

impl FromStr for Gear {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "sniper_rifle" | "sniper" => Ok(Self::SniperRifle),
            "hmg" | "heavy_machine_gun" => Ok(Self::HeavyMachineGun),
            "medkit" => Ok(Self::Medkit),
            "demolitions" | "demo_charge" => Ok(Self::Demolitions),
            "recon_drone" | "drone" => Ok(Self::ReconDrone),
            _ => Err(EngineError::unknown("gear", s)),
        }
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl fmt::Display for Armor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
