//! Position rules - injury thresholds, injury severity and terrain limits
//!
//! Terrain limits are advisory. They surface as alerts and are never
//! corrected automatically.

use std::fmt;

use ahash::AHashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::CombatantId;
use crate::engagement::constants::{
    FLANKED_THRESHOLD, FORTIFIED_THRESHOLD, HEAVY_ARMOR_THRESHOLD_REDUCTION, IN_COVER_THRESHOLD,
    NORMAL_COVER_FORTIFIED_CAP, TRANSITIONAL_SPACE_FLANKING_CAP,
};
use crate::engagement::dice::roll_d6;
use crate::mission::sector::{Cover, Sector, Space, ThreatLevel};
use crate::squad::combatant::{Combatant, DefensivePosition, Intent, OffensivePosition, Status};
use crate::squad::loadout::Armor;

/// Threshold at which a combatant cannot be hit at all
pub const FULLY_SHIELDED: u8 = 0;

/// Base hit threshold for a defensive stance
pub fn stance_threshold(stance: DefensivePosition) -> u8 {
    match stance {
        DefensivePosition::Fortified => FORTIFIED_THRESHOLD,
        DefensivePosition::InCover => IN_COVER_THRESHOLD,
        DefensivePosition::Flanked => FLANKED_THRESHOLD,
    }
}

/// Stance used for injury purposes; movement intents override the stored one
pub fn effective_stance(combatant: &Combatant) -> DefensivePosition {
    match combatant.intent {
        Some(Intent::MoveUp) => DefensivePosition::Flanked,
        Some(Intent::FallBack) => DefensivePosition::InCover,
        _ => combatant.defensive_position,
    }
}

/// Hit on a d6 roll <= threshold; 0 means fully shielded
pub fn injury_threshold(combatant: &Combatant) -> u8 {
    let base = stance_threshold(effective_stance(combatant));
    match combatant.armor {
        Some(Armor::Heavy) => base.saturating_sub(HEAVY_ARMOR_THRESHOLD_REDUCTION),
        _ => base,
    }
}

/// Injuries dealt by one hit, given the severity d6
pub fn injuries_for_severity(threat: ThreatLevel, severity_roll: u8) -> u8 {
    let double_on = match threat {
        ThreatLevel::One | ThreatLevel::Two => 0,
        ThreatLevel::Three => 2,
        ThreatLevel::Four => 3,
    };
    if severity_roll <= double_on {
        2
    } else {
        1
    }
}

/// Outcome of one injury check against a combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryCheck {
    pub combatant: CombatantId,
    pub roll: u8,
    pub threshold: u8,
    /// Severity d6, only drawn on a hit
    pub severity_roll: Option<u8>,
    pub injuries: u8,
}

impl InjuryCheck {
    pub fn is_hit(&self) -> bool {
        self.injuries > 0
    }
}

pub fn resolve_injury_check<R: Rng + ?Sized>(
    combatant: &Combatant,
    threat: ThreatLevel,
    rng: &mut R,
) -> InjuryCheck {
    let threshold = injury_threshold(combatant);
    let roll = roll_d6(rng);

    let (severity_roll, injuries) = if roll <= threshold {
        let severity = roll_d6(rng);
        (Some(severity), injuries_for_severity(threat, severity))
    } else {
        (None, 0)
    };

    InjuryCheck {
        combatant: combatant.id,
        roll,
        threshold,
        severity_roll,
        injuries,
    }
}

/// Worsen status by the injury count; Bleeding Out marks the combatant at risk
pub fn apply_injuries(combatant: &mut Combatant, injuries: u8) {
    if injuries == 0 {
        return;
    }
    combatant.status = combatant.status.worsen(injuries);
    if combatant.status == Status::BleedingOut {
        combatant.at_risk = true;
    }
}

/// Most combatants allowed Fortified under this cover; `None` is unlimited
pub fn fortified_cap(cover: Cover) -> Option<usize> {
    match cover {
        Cover::Exposed => Some(0),
        Cover::Normal => Some(NORMAL_COVER_FORTIFIED_CAP),
        Cover::Dense => None,
    }
}

/// Most combatants allowed Flanking in this space; `None` is unlimited
pub fn flanking_cap(space: Space) -> Option<usize> {
    match space {
        Space::Tight => Some(0),
        Space::Transitional => Some(TRANSITIONAL_SPACE_FLANKING_CAP),
        Space::Open => None,
    }
}

/// Per-position head count of a squad
#[derive(Debug, Clone, Default)]
pub struct PositionCensus {
    offensive: AHashMap<OffensivePosition, usize>,
    defensive: AHashMap<DefensivePosition, usize>,
}

impl PositionCensus {
    pub fn of(squad: &[Combatant]) -> Self {
        let mut census = Self::default();
        for combatant in squad {
            *census
                .offensive
                .entry(combatant.offensive_position)
                .or_insert(0) += 1;
            *census
                .defensive
                .entry(combatant.defensive_position)
                .or_insert(0) += 1;
        }
        census
    }

    pub fn offensive(&self, position: OffensivePosition) -> usize {
        self.offensive.get(&position).copied().unwrap_or(0)
    }

    pub fn defensive(&self, position: DefensivePosition) -> usize {
        self.defensive.get(&position).copied().unwrap_or(0)
    }
}

/// Advisory warning that the squad's arrangement breaks a terrain limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainAlert {
    FortifiedForbidden { count: usize },
    FortifiedOverCap { count: usize, cap: usize },
    FlankingForbidden { count: usize },
    FlankingOverCap { count: usize, cap: usize },
}

impl fmt::Display for TerrainAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FortifiedForbidden { count } => {
                write!(f, "Exposed cover: never Fortified ({count} Fortified)")
            }
            Self::FortifiedOverCap { count, cap } => {
                write!(f, "Normal cover: no more than {cap} Fortified ({count} Fortified)")
            }
            Self::FlankingForbidden { count } => {
                write!(f, "Tight space: never Flanking ({count} Flanking)")
            }
            Self::FlankingOverCap { count, cap } => {
                write!(f, "Transitional space: no more than {cap} Flanking ({count} Flanking)")
            }
        }
    }
}

pub fn terrain_alerts(squad: &[Combatant], sector: &Sector) -> Vec<TerrainAlert> {
    let census = PositionCensus::of(squad);
    let mut alerts = Vec::new();

    let fortified = census.defensive(DefensivePosition::Fortified);
    match fortified_cap(sector.cover) {
        Some(0) if fortified > 0 => {
            alerts.push(TerrainAlert::FortifiedForbidden { count: fortified })
        }
        Some(cap) if fortified > cap => alerts.push(TerrainAlert::FortifiedOverCap {
            count: fortified,
            cap,
        }),
        _ => {}
    }

    let flanking = census.offensive(OffensivePosition::Flanking);
    match flanking_cap(sector.space) {
        Some(0) if flanking > 0 => alerts.push(TerrainAlert::FlankingForbidden { count: flanking }),
        Some(cap) if flanking > cap => alerts.push(TerrainAlert::FlankingOverCap {
            count: flanking,
            cap,
        }),
        _ => {}
    }

    alerts
}
