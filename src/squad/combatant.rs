//! Combatants and their per-engagement state
//!
//! Status severity is ordered. Grit and ammo are small counters that never
//! leave [0, MAX_RESOURCE].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;
use crate::core::types::CombatantId;
use crate::squad::loadout::{label_key, Armor, Gear, Weapon};

/// Upper bound for grit and ammo
pub const MAX_RESOURCE: u8 = 3;

/// Health status, ordered from healthy to dead
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Status {
    #[default]
    Ok,
    Grazed,
    Wounded,
    BleedingOut,
    Dead,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Ok,
        Status::Grazed,
        Status::Wounded,
        Status::BleedingOut,
        Status::Dead,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Grazed => "Grazed",
            Self::Wounded => "Wounded",
            Self::BleedingOut => "Bleeding Out",
            Self::Dead => "Dead",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }

    /// Next status in the editor cycle; Dead wraps back to OK
    pub fn cycle(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Advance severity by `steps`, stopping at Dead
    pub fn worsen(&self, steps: u8) -> Self {
        let index = (self.index() + steps as usize).min(Self::ALL.len() - 1);
        Self::ALL[index]
    }

    /// Counts toward the injuries modifier
    pub fn is_wounded(&self) -> bool {
        *self >= Self::Wounded
    }

    /// Can no longer act (Bleeding Out or Dead)
    pub fn is_incapacitated(&self) -> bool {
        *self >= Self::BleedingOut
    }
}

impl FromStr for Status {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "ok" => Ok(Self::Ok),
            "grazed" => Ok(Self::Grazed),
            "wounded" => Ok(Self::Wounded),
            "bleeding_out" | "bleedingout" => Ok(Self::BleedingOut),
            "dead" => Ok(Self::Dead),
            _ => Err(EngineError::unknown("status", s)),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a combatant is pressing the enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OffensivePosition {
    Flanking,
    #[default]
    Engaged,
    Limited,
}

impl OffensivePosition {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Flanking => "Flanking",
            Self::Engaged => "Engaged",
            Self::Limited => "Limited",
        }
    }
}

impl FromStr for OffensivePosition {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "flanking" => Ok(Self::Flanking),
            "engaged" => Ok(Self::Engaged),
            "limited" => Ok(Self::Limited),
            _ => Err(EngineError::unknown("offensive position", s)),
        }
    }
}

/// How well a combatant is protected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DefensivePosition {
    Fortified,
    #[default]
    InCover,
    Flanked,
}

impl DefensivePosition {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fortified => "Fortified",
            Self::InCover => "In Cover",
            Self::Flanked => "Flanked",
        }
    }
}

impl FromStr for DefensivePosition {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "fortified" => Ok(Self::Fortified),
            "in_cover" | "incover" => Ok(Self::InCover),
            "flanked" => Ok(Self::Flanked),
            _ => Err(EngineError::unknown("defensive position", s)),
        }
    }
}

/// What a combatant intends to do this exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Fire,
    MoveUp,
    FallBack,
    CoveringFire(CombatantId),
    UseSpecialGear,
    Interact,
    Disengage,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fire => "Fire",
            Self::MoveUp => "Move Up",
            Self::FallBack => "Fall Back",
            Self::CoveringFire(_) => "Covering Fire",
            Self::UseSpecialGear => "Use Special Gear",
            Self::Interact => "Interact",
            Self::Disengage => "Disengage",
        }
    }
}

/// Which counter a bump applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Grit,
    Ammo,
}

/// A single roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub status: Status,
    pub grit: u8,
    pub ammo: u8,
    pub weapon: Option<Weapon>,
    pub armor: Option<Armor>,
    pub gear: Vec<Gear>,
    pub offensive_position: OffensivePosition,
    pub defensive_position: DefensivePosition,
    pub intent: Option<Intent>,
    pub at_risk: bool,
}

impl Combatant {
    pub fn new(id: CombatantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: Status::Ok,
            grit: MAX_RESOURCE,
            ammo: MAX_RESOURCE,
            weapon: None,
            armor: None,
            gear: Vec::new(),
            offensive_position: OffensivePosition::default(),
            defensive_position: DefensivePosition::default(),
            intent: None,
            at_risk: false,
        }
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn with_armor(mut self, armor: Armor) -> Self {
        self.armor = Some(armor);
        self
    }

    pub fn with_gear(mut self, gear: Gear) -> Self {
        if !self.gear.contains(&gear) {
            self.gear.push(gear);
        }
        self
    }

    pub fn with_positions(
        mut self,
        offensive: OffensivePosition,
        defensive: DefensivePosition,
    ) -> Self {
        self.offensive_position = offensive;
        self.defensive_position = defensive;
        self
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn has_gear(&self, gear: Gear) -> bool {
        self.gear.contains(&gear)
    }

    pub fn is_incapacitated(&self) -> bool {
        self.status.is_incapacitated()
    }

    pub fn resource(&self, resource: Resource) -> u8 {
        match resource {
            Resource::Grit => self.grit,
            Resource::Ammo => self.ammo,
        }
    }

    /// Add `delta` to grit or ammo, clamped to [0, MAX_RESOURCE]
    pub fn bump(&mut self, resource: Resource, delta: i32) {
        let slot = match resource {
            Resource::Grit => &mut self.grit,
            Resource::Ammo => &mut self.ammo,
        };
        *slot = i32::from(*slot)
            .saturating_add(delta)
            .clamp(0, MAX_RESOURCE as i32) as u8;
    }
}

/// The leading `slots` entries of the roster; everyone else is reserve
pub fn deployed(roster: &[Combatant], slots: usize) -> &[Combatant] {
    &roster[..roster.len().min(slots)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ordering() {
        assert!(Status::Ok < Status::Grazed);
        assert!(Status::Wounded < Status::BleedingOut);
        assert!(Status::BleedingOut < Status::Dead);
    }

    #[test]
    fn test_status_cycle_wraps() {
        assert_eq!(Status::Ok.cycle(), Status::Grazed);
        assert_eq!(Status::Dead.cycle(), Status::Ok);
    }

    #[test]
    fn test_status_worsen_saturates() {
        assert_eq!(Status::Grazed.worsen(1), Status::Wounded);
        assert_eq!(Status::Wounded.worsen(2), Status::Dead);
        assert_eq!(Status::BleedingOut.worsen(5), Status::Dead);
    }

    #[test]
    fn test_wounded_and_incapacitated() {
        assert!(!Status::Grazed.is_wounded());
        assert!(Status::Wounded.is_wounded());
        assert!(!Status::Wounded.is_incapacitated());
        assert!(Status::BleedingOut.is_incapacitated());
    }

    #[test]
    fn test_status_parses_display_labels() {
        for status in Status::ALL {
            assert_eq!(status.label().parse::<Status>().unwrap(), status);
        }
    }

    #[test]
    fn test_bump_clamped() {
        let mut trooper = Combatant::new(CombatantId(1), "Aelius");
        trooper.bump(Resource::Grit, 1);
        assert_eq!(trooper.grit, 3);

        trooper.bump(Resource::Ammo, -5);
        assert_eq!(trooper.ammo, 0);

        trooper.bump(Resource::Ammo, 2);
        assert_eq!(trooper.resource(Resource::Ammo), 2);
    }

    #[test]
    fn test_bump_extreme_deltas_saturate() {
        let mut trooper = Combatant::new(CombatantId(1), "Aelius");
        trooper.bump(Resource::Grit, i32::MAX);
        assert_eq!(trooper.grit, 3);

        trooper.bump(Resource::Grit, i32::MIN);
        assert_eq!(trooper.grit, 0);
    }

    #[test]
    fn test_deployed_is_first_five() {
        let roster: Vec<Combatant> = (0..7)
            .map(|i| Combatant::new(CombatantId(i), format!("T{i}")))
            .collect();

        let active = deployed(&roster, 5);
        assert_eq!(active.len(), 5);
        assert_eq!(active[4].id, CombatantId(4));

        assert_eq!(deployed(&roster[..2], 5).len(), 2);
    }

    #[test]
    fn test_with_gear_no_duplicates() {
        let trooper = Combatant::new(CombatantId(1), "Decimus")
            .with_gear(Gear::HeavyMachineGun)
            .with_gear(Gear::HeavyMachineGun);
        assert_eq!(trooper.gear.len(), 1);
    }
}
