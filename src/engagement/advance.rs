//! Sector advance check
//!
//! 2d3 plus the advance modifier, read against the sector's threat level.
//! Lower threat is never worse for the same total, and a higher total is
//! never worse at the same threat.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engagement::dice::roll_d3;
use crate::engagement::modifiers::{format_modifier, ModifierSet};
use crate::engagement::roll::RollCheck;
use crate::mission::sector::{Sector, ThreatLevel};
use crate::squad::combatant::{Combatant, DefensivePosition, OffensivePosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AdvanceOutcome {
    Ambushed,
    Spotted,
    Advantage,
    Surprise,
    Overwhelm,
}

impl AdvanceOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ambushed => "Ambushed",
            Self::Spotted => "Spotted",
            Self::Advantage => "Advantage",
            Self::Surprise => "Surprise",
            Self::Overwhelm => "Overwhelm",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Ambushed => "The Squad starts Flanked + Engaged.",
            Self::Spotted => "The Squad starts In Cover + Engaged.",
            Self::Advantage => "The Squad starts In Cover + Flanking.",
            Self::Surprise => "The Squad starts In Cover + Flanking + 1 Momentum.",
            Self::Overwhelm => "The Squad overwhelms the enemy force, and the enemy is routed.",
        }
    }

    /// Starting positions for the whole deployed squad; Overwhelm has none
    pub fn positions(&self) -> Option<(OffensivePosition, DefensivePosition)> {
        match self {
            Self::Ambushed => Some((OffensivePosition::Engaged, DefensivePosition::Flanked)),
            Self::Spotted => Some((OffensivePosition::Engaged, DefensivePosition::InCover)),
            Self::Advantage | Self::Surprise => {
                Some((OffensivePosition::Flanking, DefensivePosition::InCover))
            }
            Self::Overwhelm => None,
        }
    }

    pub fn momentum_bonus(&self) -> i8 {
        match self {
            Self::Surprise => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for AdvanceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn determine_advance_outcome(total: i32, threat: ThreatLevel) -> AdvanceOutcome {
    use AdvanceOutcome::*;

    match threat {
        ThreatLevel::One => match total {
            t if t >= 6 => Overwhelm,
            5 => Surprise,
            4 => Advantage,
            _ => Spotted,
        },
        ThreatLevel::Two => match total {
            t if t >= 6 => Overwhelm,
            5 => Advantage,
            3 | 4 => Spotted,
            _ => Ambushed,
        },
        ThreatLevel::Three => match total {
            t if t >= 6 => Advantage,
            4 | 5 => Spotted,
            _ => Ambushed,
        },
        ThreatLevel::Four => match total {
            t if t >= 7 => Spotted,
            _ => Ambushed,
        },
    }
}

/// The two d3 of an advance roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceDice {
    pub first: u8,
    pub second: u8,
}

impl AdvanceDice {
    pub fn sum(&self) -> i32 {
        i32::from(self.first) + i32::from(self.second)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceResult {
    pub dice: AdvanceDice,
    pub modifier: i32,
    pub total: i32,
    pub threat: ThreatLevel,
    pub outcome: AdvanceOutcome,
}

pub fn resolve_advance(dice: AdvanceDice, modifier: i32, threat: ThreatLevel) -> AdvanceResult {
    let total = dice.sum() + modifier;
    AdvanceResult {
        dice,
        modifier,
        total,
        threat,
        outcome: determine_advance_outcome(total, threat),
    }
}

/// Advance roll bound to the modifiers and threat captured at start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceCheck {
    pub modifiers: ModifierSet,
    pub threat: ThreatLevel,
}

impl RollCheck for AdvanceCheck {
    type Dice = AdvanceDice;
    type Outcome = AdvanceResult;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> AdvanceDice {
        AdvanceDice {
            first: roll_d3(rng),
            second: roll_d3(rng),
        }
    }

    fn resolve<R: Rng + ?Sized>(&mut self, dice: &AdvanceDice, _rng: &mut R) -> AdvanceResult {
        resolve_advance(*dice, self.modifiers.total(), self.threat)
    }
}

pub fn advance_log_message(squad_name: &str, sector: &Sector, result: &AdvanceResult) -> String {
    format!(
        "{squad_name} ADVANCES >> {}\nCover: {} ++ Space: {} ++ Threat Level: {}\nSTATUS: {}",
        sector.display_name(),
        sector.cover,
        sector.space,
        sector.content,
        result.outcome,
    )
}

/// One-line breakdown of an advance roll
pub fn advance_summary(result: &AdvanceResult) -> String {
    format!(
        "{} + {} ({}) = {} vs {}: {}",
        result.dice.first,
        result.dice.second,
        format_modifier(result.modifier),
        result.total,
        result.threat,
        result.outcome,
    )
}

/// Put the whole squad into the outcome's starting positions.
///
/// Returns false for Overwhelm, which sets no positions.
pub fn apply_advance_positions(outcome: AdvanceOutcome, squad: &mut [Combatant]) -> bool {
    let Some((offensive, defensive)) = outcome.positions() else {
        return false;
    };
    for combatant in squad.iter_mut() {
        combatant.offensive_position = offensive;
        combatant.defensive_position = defensive;
    }
    true
}
