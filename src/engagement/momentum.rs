//! Momentum tracking and engagement status
//!
//! Momentum is a per-sector counter in [-3, 5]. Reaching the floor loses
//! the engagement; reaching the threat-dependent threshold wins it. A
//! defense objective replaces the threshold check with an exchange
//! countdown evaluated once.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engagement::constants::{
    DEFENSE_EXTRA_EXCHANGES_MAX, DEFENSE_EXTRA_EXCHANGES_MIN, DEFENSE_HOLD_MOMENTUM,
    MOMENTUM_DEFAULT, MOMENTUM_MAX, MOMENTUM_MIN,
};
use crate::mission::sector::{DefenseCountdown, Sector, ThreatLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngagementStatus {
    Victory,
    Defeat,
}

impl EngagementStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Victory => "Victory",
            Self::Defeat => "Defeat",
        }
    }
}

pub fn victory_threshold(threat: ThreatLevel) -> i8 {
    (threat.number() as i8 + 1).min(MOMENTUM_MAX)
}

/// Normalize a stored momentum value; NaN and missing values become 0
pub fn clamp_momentum(raw: Option<f64>) -> i8 {
    match raw {
        Some(value) if !value.is_nan() => {
            value
                .round()
                .clamp(f64::from(MOMENTUM_MIN), f64::from(MOMENTUM_MAX)) as i8
        }
        _ => MOMENTUM_DEFAULT,
    }
}

pub fn engagement_status(momentum: i8, threat: ThreatLevel) -> Option<EngagementStatus> {
    if momentum <= MOMENTUM_MIN {
        Some(EngagementStatus::Defeat)
    } else if momentum >= victory_threshold(threat) {
        Some(EngagementStatus::Victory)
    } else {
        None
    }
}

/// Status of a sector; an active defense objective overrides the thresholds
pub fn sector_status(sector: &Sector) -> Option<EngagementStatus> {
    if let Some(defense) = sector.defense {
        return defense.resolved;
    }
    sector
        .threat_level()
        .and_then(|threat| engagement_status(sector.momentum, threat))
}

/// Result of a momentum adjustment
#[derive(Debug, Clone, PartialEq)]
pub struct MomentumChange {
    pub sector: Sector,
    /// False when the adjustment was absorbed by a bound
    pub changed: bool,
    /// Status newly reached by this adjustment
    pub crossed: Option<EngagementStatus>,
}

pub fn adjust_momentum(sector: &Sector, delta: i8) -> MomentumChange {
    let before = sector_status(sector);
    let momentum = sector
        .momentum
        .saturating_add(delta)
        .clamp(MOMENTUM_MIN, MOMENTUM_MAX);

    let mut updated = sector.clone();
    updated.momentum = momentum;
    let after = sector_status(&updated);

    let crossed = match after {
        Some(status) if before != Some(status) => Some(status),
        _ => None,
    };

    MomentumChange {
        changed: momentum != sector.momentum,
        sector: updated,
        crossed,
    }
}

/// Start a defense objective: survive threat level plus 1 or 2 exchanges.
///
/// Returns `None` for sectors without a threat level.
pub fn enter_defense<R: Rng + ?Sized>(sector: &Sector, rng: &mut R) -> Option<Sector> {
    let threat = sector.threat_level()?;
    let extra = rng.gen_range(DEFENSE_EXTRA_EXCHANGES_MIN..=DEFENSE_EXTRA_EXCHANGES_MAX);

    let mut updated = sector.clone();
    updated.defense = Some(DefenseCountdown {
        remaining: u32::from(threat.number()) + extra,
        resolved: None,
    });
    Some(updated)
}

/// Leave the defense objective and return to threshold status
pub fn exit_defense(sector: &Sector) -> Sector {
    let mut updated = sector.clone();
    updated.defense = None;
    updated
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefenseProgress {
    pub sector: Sector,
    /// Set only on the exchange that ends the countdown
    pub resolved: Option<EngagementStatus>,
}

/// Count down one exchange of an active, unresolved defense objective
pub fn complete_exchange(sector: &Sector) -> Option<DefenseProgress> {
    let defense = sector.defense?;
    if defense.resolved.is_some() {
        return None;
    }

    let remaining = defense.remaining.saturating_sub(1);
    let resolved = (remaining == 0).then(|| {
        if sector.momentum >= DEFENSE_HOLD_MOMENTUM {
            EngagementStatus::Victory
        } else {
            EngagementStatus::Defeat
        }
    });

    let mut updated = sector.clone();
    updated.defense = Some(DefenseCountdown {
        remaining,
        resolved,
    });

    Some(DefenseProgress {
        sector: updated,
        resolved,
    })
}

pub fn status_log_message(squad_name: &str, sector: &Sector, status: EngagementStatus) -> String {
    let name = sector.display_name();
    match (status, sector.defense.is_some()) {
        (EngagementStatus::Victory, true) => {
            format!("{squad_name} held {name} and won engagement")
        }
        (EngagementStatus::Victory, false) => format!("{squad_name} won engagement at {name}"),
        (EngagementStatus::Defeat, true) => {
            format!("{name} has fallen. {squad_name} lost engagement")
        }
        (EngagementStatus::Defeat, false) => format!("{squad_name} lost engagement at {name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::sector::SectorContent;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn threat_sector(level: ThreatLevel) -> Sector {
        Sector::new("Depot", SectorContent::Threat(level))
    }

    #[test]
    fn test_victory_thresholds() {
        assert_eq!(victory_threshold(ThreatLevel::One), 2);
        assert_eq!(victory_threshold(ThreatLevel::Three), 4);
        assert_eq!(victory_threshold(ThreatLevel::Four), 5);
    }

    #[test]
    fn test_clamp_momentum() {
        assert_eq!(clamp_momentum(None), 0);
        assert_eq!(clamp_momentum(Some(f64::NAN)), 0);
        assert_eq!(clamp_momentum(Some(2.4)), 2);
        assert_eq!(clamp_momentum(Some(-9.0)), -3);
        assert_eq!(clamp_momentum(Some(f64::INFINITY)), 5);
    }

    #[test]
    fn test_status_bands() {
        assert_eq!(engagement_status(-3, ThreatLevel::One), Some(EngagementStatus::Defeat));
        assert_eq!(engagement_status(1, ThreatLevel::One), None);
        assert_eq!(engagement_status(2, ThreatLevel::One), Some(EngagementStatus::Victory));
        assert_eq!(engagement_status(4, ThreatLevel::Four), None);
    }

    #[test]
    fn test_non_engageable_sector_has_no_status() {
        let sector = Sector::new("Cache", SectorContent::Boon).with_momentum(-3);
        assert_eq!(sector_status(&sector), None);
    }

    #[test]
    fn test_adjust_clamps_and_reports_no_change() {
        let sector = threat_sector(ThreatLevel::Four).with_momentum(5);
        let change = adjust_momentum(&sector, 1);
        assert_eq!(change.sector.momentum, 5);
        assert!(!change.changed);
        assert_eq!(change.crossed, None);
    }

    #[test]
    fn test_crossing_emits_once() {
        let sector = threat_sector(ThreatLevel::One).with_momentum(1);

        let first = adjust_momentum(&sector, 1);
        assert_eq!(first.crossed, Some(EngagementStatus::Victory));

        let second = adjust_momentum(&first.sector, 1);
        assert!(second.changed);
        assert_eq!(second.crossed, None);
    }

    #[test]
    fn test_crossing_into_defeat() {
        let sector = threat_sector(ThreatLevel::Two).with_momentum(-2);
        let change = adjust_momentum(&sector, -1);
        assert_eq!(change.crossed, Some(EngagementStatus::Defeat));

        let stuck = adjust_momentum(&change.sector, -1);
        assert!(!stuck.changed);
        assert_eq!(stuck.crossed, None);
    }

    #[test]
    fn test_enter_defense_goal_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..50 {
            let sector = enter_defense(&threat_sector(ThreatLevel::Two), &mut rng).unwrap();
            let remaining = sector.defense.unwrap().remaining;
            assert!(remaining == 3 || remaining == 4);
        }
        assert!(enter_defense(&Sector::new("Cache", SectorContent::Boon), &mut rng).is_none());
    }

    #[test]
    fn test_defense_countdown_victory() {
        let mut sector = threat_sector(ThreatLevel::One).with_momentum(1);
        sector.defense = Some(DefenseCountdown {
            remaining: 2,
            resolved: None,
        });

        let step = complete_exchange(&sector).unwrap();
        assert_eq!(step.resolved, None);
        let last = complete_exchange(&step.sector).unwrap();
        assert_eq!(last.resolved, Some(EngagementStatus::Victory));
        assert_eq!(sector_status(&last.sector), Some(EngagementStatus::Victory));

        // Evaluated once
        assert!(complete_exchange(&last.sector).is_none());
    }

    #[test]
    fn test_defense_countdown_defeat() {
        let mut sector = threat_sector(ThreatLevel::One).with_momentum(0);
        sector.defense = Some(DefenseCountdown {
            remaining: 1,
            resolved: None,
        });
        let last = complete_exchange(&sector).unwrap();
        assert_eq!(last.resolved, Some(EngagementStatus::Defeat));
        assert_eq!(
            status_log_message("Viper", &last.sector, EngagementStatus::Defeat),
            "Depot has fallen. Viper lost engagement"
        );
    }

    #[test]
    fn test_defense_overrides_thresholds() {
        let mut sector = threat_sector(ThreatLevel::One).with_momentum(1);
        sector.defense = Some(DefenseCountdown {
            remaining: 3,
            resolved: None,
        });
        let change = adjust_momentum(&sector, 1);
        assert_eq!(change.crossed, None);
        assert_eq!(sector_status(&change.sector), None);

        let left = exit_defense(&change.sector);
        assert_eq!(sector_status(&left), Some(EngagementStatus::Victory));
    }

    #[test]
    fn test_complete_exchange_without_defense() {
        assert!(complete_exchange(&threat_sector(ThreatLevel::Three)).is_none());
    }
}
