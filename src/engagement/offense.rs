//! Offense dice pool
//!
//! Each deployed combatant firing this exchange adds dice to the squad's
//! offense pool. The rationale lists the rules that applied, in order.

use serde::{Deserialize, Serialize};

use crate::core::types::CombatantId;
use crate::mission::sector::{Sector, Space};
use crate::squad::combatant::{Combatant, DefensivePosition, Intent, OffensivePosition};
use crate::squad::loadout::{Gear, Weapon};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffenseContribution {
    pub combatant: CombatantId,
    pub value: i32,
    pub rationale: Vec<String>,
}

pub fn offense_contribution(combatant: &Combatant, sector: Option<&Sector>) -> OffenseContribution {
    let mut rationale = Vec::new();

    if combatant.is_incapacitated() {
        rationale.push(format!("{}: no contribution", combatant.status));
        return OffenseContribution {
            combatant: combatant.id,
            value: 0,
            rationale,
        };
    }

    match combatant.intent {
        Some(Intent::Fire) => {}
        Some(other) => {
            rationale.push(format!("{}: not firing", other.label()));
            return OffenseContribution {
                combatant: combatant.id,
                value: 0,
                rationale,
            };
        }
        None => {
            rationale.push("No intent: not firing".to_string());
            return OffenseContribution {
                combatant: combatant.id,
                value: 0,
                rationale,
            };
        }
    }

    let mut value = 1;
    rationale.push("Fire +1".to_string());

    match combatant.offensive_position {
        OffensivePosition::Flanking => {
            value += 1;
            rationale.push("Flanking +1".to_string());
        }
        OffensivePosition::Limited => {
            value -= 1;
            rationale.push("Limited -1".to_string());
        }
        OffensivePosition::Engaged => {}
    }

    let space = sector.map(|s| s.space);
    match (combatant.weapon, combatant.offensive_position, space) {
        (
            Some(Weapon::MarksmanRifle),
            OffensivePosition::Limited,
            Some(Space::Transitional | Space::Open),
        ) => {
            value += 1;
            rationale.push("Marksman rifle at range +1".to_string());
        }
        (Some(Weapon::Carbine), OffensivePosition::Engaged, Some(Space::Tight)) => {
            value += 1;
            rationale.push("Carbine in close quarters +1".to_string());
        }
        _ => {}
    }

    if combatant.defensive_position == DefensivePosition::Fortified {
        if combatant.has_gear(Gear::SniperRifle) {
            value += 1;
            rationale.push("Fortified sniper rifle +1".to_string());
        }
        if combatant.has_gear(Gear::HeavyMachineGun) {
            value += 1;
            rationale.push("Fortified HMG +1".to_string());
        }
    }

    OffenseContribution {
        combatant: combatant.id,
        value,
        rationale,
    }
}

/// Contributions of the deployed squad and the resulting pool size
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OffenseReport {
    pub contributions: Vec<OffenseContribution>,
    pub total: u32,
}

pub fn compute_offense_pool(squad: &[Combatant], sector: Option<&Sector>) -> OffenseReport {
    let contributions: Vec<OffenseContribution> = squad
        .iter()
        .map(|c| offense_contribution(c, sector))
        .collect();
    let sum: i32 = contributions.iter().map(|c| c.value).sum();

    OffenseReport {
        contributions,
        total: sum.max(0) as u32,
    }
}

/// Reconciles the computed offense pool with a manual override.
///
/// A pinned override holds until cleared. An unpinned override is dropped
/// the first time the computed total changes after it was set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OffensePoolDial {
    computed: u32,
    manual: Option<u32>,
    pinned: bool,
}

impl OffensePoolDial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the latest computed total; returns true if an override was dropped
    pub fn observe(&mut self, computed: u32) -> bool {
        let changed = computed != self.computed;
        self.computed = computed;

        if changed && self.manual.is_some() && !self.pinned {
            self.manual = None;
            return true;
        }
        false
    }

    pub fn set_manual(&mut self, value: u32, pinned: bool) {
        self.manual = Some(value);
        self.pinned = pinned;
    }

    pub fn clear_manual(&mut self) {
        self.manual = None;
        self.pinned = false;
    }

    pub fn computed(&self) -> u32 {
        self.computed
    }

    pub fn effective(&self) -> u32 {
        self.manual.unwrap_or(self.computed)
    }

    pub fn is_overridden(&self) -> bool {
        self.manual.is_some()
    }

    pub fn is_pinned(&self) -> bool {
        self.manual.is_some() && self.pinned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::sector::{Cover, SectorContent};
    use crate::squad::combatant::Status;

    fn shooter(id: u32) -> Combatant {
        Combatant::new(CombatantId(id), format!("T{id}")).with_intent(Intent::Fire)
    }

    fn sector(space: Space) -> Sector {
        Sector::new("Block", SectorContent::Nothing).with_terrain(Cover::Normal, space)
    }

    #[test]
    fn test_base_fire() {
        let c = shooter(1);
        let contribution = offense_contribution(&c, None);
        assert_eq!(contribution.value, 1);
        assert_eq!(contribution.rationale, vec!["Fire +1"]);
    }

    #[test]
    fn test_non_fire_contributes_zero() {
        for intent in [
            Intent::MoveUp,
            Intent::FallBack,
            Intent::CoveringFire(CombatantId(2)),
            Intent::UseSpecialGear,
            Intent::Interact,
            Intent::Disengage,
        ] {
            let c = Combatant::new(CombatantId(1), "A")
                .with_intent(intent)
                .with_positions(OffensivePosition::Flanking, DefensivePosition::Fortified)
                .with_gear(Gear::SniperRifle);
            let contribution = offense_contribution(&c, None);
            assert_eq!(contribution.value, 0);
            assert_eq!(contribution.rationale.len(), 1);
        }

        let idle = Combatant::new(CombatantId(1), "A");
        assert_eq!(offense_contribution(&idle, None).value, 0);
    }

    #[test]
    fn test_incapacitated_contributes_zero() {
        let c = shooter(1).with_status(Status::BleedingOut);
        assert_eq!(offense_contribution(&c, None).value, 0);

        let wounded = shooter(1).with_status(Status::Wounded);
        assert_eq!(offense_contribution(&wounded, None).value, 1);
    }

    #[test]
    fn test_position_adjustments() {
        let flanking =
            shooter(1).with_positions(OffensivePosition::Flanking, DefensivePosition::InCover);
        assert_eq!(offense_contribution(&flanking, None).value, 2);

        let limited =
            shooter(1).with_positions(OffensivePosition::Limited, DefensivePosition::InCover);
        assert_eq!(offense_contribution(&limited, None).value, 0);
    }

    #[test]
    fn test_marksman_at_range() {
        let c = shooter(1)
            .with_weapon(Weapon::MarksmanRifle)
            .with_positions(OffensivePosition::Limited, DefensivePosition::InCover);

        assert_eq!(offense_contribution(&c, Some(&sector(Space::Open))).value, 1);
        assert_eq!(
            offense_contribution(&c, Some(&sector(Space::Transitional))).value,
            1
        );
        assert_eq!(offense_contribution(&c, Some(&sector(Space::Tight))).value, 0);
    }

    #[test]
    fn test_carbine_close_quarters() {
        let c = shooter(1).with_weapon(Weapon::Carbine);
        assert_eq!(offense_contribution(&c, Some(&sector(Space::Tight))).value, 2);
        assert_eq!(offense_contribution(&c, Some(&sector(Space::Open))).value, 1);
    }

    #[test]
    fn test_fortified_gear_stacks() {
        let c = shooter(1)
            .with_positions(OffensivePosition::Engaged, DefensivePosition::Fortified)
            .with_gear(Gear::SniperRifle)
            .with_gear(Gear::HeavyMachineGun);
        let contribution = offense_contribution(&c, None);
        assert_eq!(contribution.value, 3);
        assert_eq!(
            contribution.rationale,
            vec!["Fire +1", "Fortified sniper rifle +1", "Fortified HMG +1"]
        );

        let exposed = shooter(1).with_gear(Gear::HeavyMachineGun);
        assert_eq!(offense_contribution(&exposed, None).value, 1);
    }

    #[test]
    fn test_pool_total() {
        let squad = vec![
            shooter(1).with_positions(OffensivePosition::Flanking, DefensivePosition::InCover),
            shooter(2),
            Combatant::new(CombatantId(3), "C").with_intent(Intent::Interact),
        ];
        let report = compute_offense_pool(&squad, None);
        assert_eq!(report.contributions.len(), 3);
        assert_eq!(report.total, 3);
    }

    #[test]
    fn test_pool_never_negative() {
        let squad = vec![
            shooter(1).with_positions(OffensivePosition::Limited, DefensivePosition::InCover),
        ];
        assert_eq!(compute_offense_pool(&squad, None).total, 0);
        assert_eq!(compute_offense_pool(&[], None).total, 0);
    }

    #[test]
    fn test_dial_unpinned_override_goes_stale() {
        let mut dial = OffensePoolDial::new();
        dial.observe(3);
        dial.set_manual(6, false);
        assert_eq!(dial.effective(), 6);

        // Same total keeps the override
        assert!(!dial.observe(3));
        assert_eq!(dial.effective(), 6);

        assert!(dial.observe(4));
        assert_eq!(dial.effective(), 4);
        assert!(!dial.is_overridden());
    }

    #[test]
    fn test_dial_pinned_override_holds() {
        let mut dial = OffensePoolDial::new();
        dial.observe(2);
        dial.set_manual(5, true);

        assert!(!dial.observe(7));
        assert_eq!(dial.effective(), 5);
        assert!(dial.is_pinned());

        dial.clear_manual();
        assert_eq!(dial.effective(), 7);
        assert!(!dial.is_pinned());
    }
}
