//! Enemy tactics
//!
//! Each exchange the enemy may pull a tactic: a d6 at or under the threat
//! level picks one of six battlefield events that shove squad positions.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::CombatantId;
use crate::engagement::dice::roll_d6;
use crate::engagement::roll::RollCheck;
use crate::mission::sector::ThreatLevel;
use crate::squad::combatant::{Combatant, DefensivePosition, OffensivePosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TacticKind {
    SuppressingFire,
    FlankingManoeuvre,
    Grenade,
    PinnedDown,
    CounterPush,
    ShiftingLines,
}

/// Which combatants a tactic lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TacticReach {
    OneRandom,
    Everyone,
}

/// Position a tactic looks for and the position it forces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionShift {
    Offensive(OffensivePosition, OffensivePosition),
    Defensive(DefensivePosition, DefensivePosition),
}

impl PositionShift {
    fn matches(&self, combatant: &Combatant) -> bool {
        match self {
            Self::Offensive(from, _) => combatant.offensive_position == *from,
            Self::Defensive(from, _) => combatant.defensive_position == *from,
        }
    }

    fn apply(&self, combatant: &mut Combatant) {
        match self {
            Self::Offensive(_, to) => combatant.offensive_position = *to,
            Self::Defensive(_, to) => combatant.defensive_position = *to,
        }
    }
}

impl TacticKind {
    pub const ALL: [TacticKind; 6] = [
        TacticKind::SuppressingFire,
        TacticKind::FlankingManoeuvre,
        TacticKind::Grenade,
        TacticKind::PinnedDown,
        TacticKind::CounterPush,
        TacticKind::ShiftingLines,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::SuppressingFire => "Suppressing Fire",
            Self::FlankingManoeuvre => "Flanking Manoeuvre",
            Self::Grenade => "Grenade",
            Self::PinnedDown => "Pinned Down",
            Self::CounterPush => "Counter-Push",
            Self::ShiftingLines => "Shifting Lines",
        }
    }

    pub fn effect(&self) -> &'static str {
        match self {
            Self::SuppressingFire => "One random Flanking combatant becomes Limited.",
            Self::FlankingManoeuvre => "One random Fortified combatant becomes Flanked.",
            Self::Grenade => "One random In Cover combatant becomes Flanked.",
            Self::PinnedDown => "Every Flanking combatant becomes Engaged.",
            Self::CounterPush => "One random Engaged combatant becomes Limited.",
            Self::ShiftingLines => "Every Fortified combatant falls back In Cover.",
        }
    }

    pub fn shift(&self) -> PositionShift {
        use DefensivePosition as D;
        use OffensivePosition as O;

        match self {
            Self::SuppressingFire => PositionShift::Offensive(O::Flanking, O::Limited),
            Self::FlankingManoeuvre => PositionShift::Defensive(D::Fortified, D::Flanked),
            Self::Grenade => PositionShift::Defensive(D::InCover, D::Flanked),
            Self::PinnedDown => PositionShift::Offensive(O::Flanking, O::Engaged),
            Self::CounterPush => PositionShift::Offensive(O::Engaged, O::Limited),
            Self::ShiftingLines => PositionShift::Defensive(D::Fortified, D::InCover),
        }
    }

    pub fn reach(&self) -> TacticReach {
        match self {
            Self::PinnedDown | Self::ShiftingLines => TacticReach::Everyone,
            _ => TacticReach::OneRandom,
        }
    }
}

impl fmt::Display for TacticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A draw at or under the threat level triggers a tactic
pub fn tactic_triggers(draw: u8, threat: Option<ThreatLevel>) -> bool {
    threat.is_some_and(|level| draw <= level.number())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticRoll {
    pub draw: u8,
    pub threat: Option<ThreatLevel>,
    pub tactic: Option<TacticKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TacticCheck {
    pub threat: Option<ThreatLevel>,
}

impl RollCheck for TacticCheck {
    type Dice = u8;
    type Outcome = TacticRoll;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u8 {
        roll_d6(rng)
    }

    fn resolve<R: Rng + ?Sized>(&mut self, dice: &u8, rng: &mut R) -> TacticRoll {
        let tactic = if tactic_triggers(*dice, self.threat) {
            TacticKind::ALL.choose(rng).copied()
        } else {
            None
        };

        TacticRoll {
            draw: *dice,
            threat: self.threat,
            tactic,
        }
    }
}

/// Apply a tactic's position shift to the squad; returns who was moved
pub fn apply_tactic<R: Rng + ?Sized>(
    tactic: TacticKind,
    squad: &mut [Combatant],
    rng: &mut R,
) -> Vec<CombatantId> {
    let shift = tactic.shift();
    let eligible: Vec<usize> = squad
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_incapacitated() && shift.matches(c))
        .map(|(i, _)| i)
        .collect();

    let targets: Vec<usize> = match tactic.reach() {
        TacticReach::Everyone => eligible,
        TacticReach::OneRandom => eligible.choose(rng).copied().into_iter().collect(),
    };

    targets
        .into_iter()
        .map(|i| {
            shift.apply(&mut squad[i]);
            squad[i].id
        })
        .collect()
}

pub fn tactic_log_message(tactic: TacticKind, squad: &[Combatant], moved: &[CombatantId]) -> String {
    let names: Vec<&str> = squad
        .iter()
        .filter(|c| moved.contains(&c.id))
        .map(|c| c.name.as_str())
        .collect();

    if names.is_empty() {
        format!("ENEMY TACTIC: {} (no effect)", tactic.name())
    } else {
        format!("ENEMY TACTIC: {} >> {}", tactic.name(), names.join(", "))
    }
}
