//! Advance roll modifiers
//!
//! Five independent sources summed into one additive modifier. Every
//! function takes the deployed squad only; reserves never count.

use serde::{Deserialize, Serialize};

use crate::engagement::constants::{
    HEAVY_ARMOR_MOBILITY, INJURIES_FEW_MODIFIER, INJURIES_MANY_MODIFIER,
    INJURIES_MANY_THRESHOLD, LIGHT_ARMOR_MOBILITY, ROLLS_PER_FATIGUE,
};
use crate::mission::sector::{Sector, Weather};
use crate::squad::combatant::Combatant;
use crate::squad::loadout::Armor;

/// Named contributions to the advance roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModifierSet {
    pub injuries: i32,
    pub mobility: i32,
    pub fatigue: i32,
    pub weather: i32,
    pub custom: i32,
}

impl ModifierSet {
    pub fn total(&self) -> i32 {
        [self.mobility, self.fatigue, self.weather, self.custom]
            .into_iter()
            .fold(self.injuries, i32::saturating_add)
    }
}

pub fn injuries_modifier(squad: &[Combatant]) -> i32 {
    let wounded = squad.iter().filter(|c| c.status.is_wounded()).count();
    match wounded {
        0 => 0,
        n if n >= INJURIES_MANY_THRESHOLD => INJURIES_MANY_MODIFIER,
        _ => INJURIES_FEW_MODIFIER,
    }
}

/// Light armor across the board speeds the squad up; any heavy armor slows it
pub fn mobility_modifier(squad: &[Combatant]) -> i32 {
    let armors: Vec<Armor> = squad.iter().filter_map(|c| c.armor).collect();
    if armors.is_empty() {
        0
    } else if armors.iter().all(|a| *a == Armor::Light) {
        LIGHT_ARMOR_MOBILITY
    } else if armors.contains(&Armor::Heavy) {
        HEAVY_ARMOR_MOBILITY
    } else {
        0
    }
}

/// -1 for every three advance rolls already made
pub fn fatigue_modifier(prior_advance_rolls: u32) -> i32 {
    -((prior_advance_rolls / ROLLS_PER_FATIGUE) as i32)
}

pub fn weather_modifier(weather: Weather) -> i32 {
    match weather {
        Weather::Normal => 0,
        Weather::Bad => -1,
        Weather::Terrible => -2,
    }
}

/// Derive the full modifier set for an advance roll
///
/// Without a selected sector the weather contributes nothing.
pub fn compute_advance_modifiers(
    squad: &[Combatant],
    sector: Option<&Sector>,
    prior_advance_rolls: u32,
    custom: i32,
) -> ModifierSet {
    ModifierSet {
        injuries: injuries_modifier(squad),
        mobility: mobility_modifier(squad),
        fatigue: fatigue_modifier(prior_advance_rolls),
        weather: sector.map_or(0, |s| weather_modifier(s.weather)),
        custom,
    }
}

/// Signed display form: "+1", "0", "-2"
pub fn format_modifier(value: i32) -> String {
    if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}
