//! Engagement orchestrator
//!
//! Composes the rule modules over injected roster, mission and log handles.
//! Randomized checks run through one roll controller each; the host drives
//! them by calling `tick` with its clock.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{CombatantId, HardTargetId, LogSource, SectorId};
use crate::engagement::advance::{
    advance_log_message, apply_advance_positions, AdvanceCheck, AdvanceDice, AdvanceOutcome,
    AdvanceResult,
};
use crate::engagement::dice::{DicePoolCheck, DicePoolResult};
use crate::engagement::hard_targets::{self, neutralized_message, HitsChange};
use crate::engagement::modifiers::{compute_advance_modifiers, ModifierSet};
use crate::engagement::momentum::{
    self, sector_status, status_log_message, EngagementStatus, MomentumChange,
};
use crate::engagement::offense::{compute_offense_pool, OffensePoolDial, OffenseReport};
use crate::engagement::positions::{
    apply_injuries, injury_threshold, resolve_injury_check, terrain_alerts, InjuryCheck,
    TerrainAlert,
};
use crate::engagement::roll::{CancelToken, RollAnimationController, RollState};
use crate::engagement::stores::{LogSink, MissionStore, RosterStore};
use crate::engagement::tactics::{apply_tactic, tactic_log_message, TacticCheck, TacticRoll};
use crate::mission::sector::Sector;
use crate::squad::combatant::{
    deployed, Combatant, DefensivePosition, Intent, OffensivePosition, Resource, Status,
};

/// Something that happened during `tick`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    AdvanceResolved(AdvanceResult),
    TacticResolved(TacticRoll),
    DicePoolResolved(DicePoolResult),
}

pub struct EngagementEngine<R: RosterStore, M: MissionStore, L: LogSink> {
    config: EngineConfig,
    roster: R,
    mission: M,
    log: L,
    rng: ChaCha8Rng,

    advance_roll: RollAnimationController<AdvanceCheck>,
    tactic_roll: RollAnimationController<TacticCheck>,
    dice_roll: RollAnimationController<DicePoolCheck>,

    // Session counters
    prior_advance_rolls: u32,
    custom_modifier: i32,
    offense_dial: OffensePoolDial,
    /// Resolved advance outcome not yet put into effect
    unapplied_advance: Option<AdvanceOutcome>,
    tactic_applied: bool,
}

impl<R: RosterStore, M: MissionStore, L: LogSink> EngagementEngine<R, M, L> {
    pub fn new(config: EngineConfig, roster: R, mission: M, log: L) -> Result<Self> {
        config.validate().map_err(EngineError::InvalidConfig)?;

        let seed = config.seed.unwrap_or_else(rand::random);
        tracing::debug!("Engagement engine seeded with {}", seed);

        Ok(Self {
            advance_roll: RollAnimationController::new(config.advance_roll),
            tactic_roll: RollAnimationController::new(config.tactic_roll),
            dice_roll: RollAnimationController::new(config.dice_roll),
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
            roster,
            mission,
            log,
            prior_advance_rolls: 0,
            custom_modifier: 0,
            offense_dial: OffensePoolDial::new(),
            unapplied_advance: None,
            tactic_applied: false,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn roster(&self) -> &R {
        &self.roster
    }

    pub fn mission(&self) -> &M {
        &self.mission
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    /// Deployed combatants only
    pub fn squad(&self) -> Vec<Combatant> {
        let roster = self.roster.get();
        deployed(&roster, self.config.deployed_slots).to_vec()
    }

    pub fn selected_sector(&self) -> Option<Sector> {
        self.mission
            .selected_sector_id()
            .and_then(|id| self.mission.sector(id))
    }

    fn engaged_sector(&self) -> Option<Sector> {
        self.selected_sector().filter(Sector::is_engageable)
    }

    // ========================================================================
    // MOVEMENT
    // ========================================================================

    /// Move the squad to another sector, or back to staging with `None`.
    ///
    /// Returns false when nothing changed: same sector, unknown id, or a
    /// sector with nothing to engage.
    pub fn select_sector(&mut self, id: Option<SectorId>) -> bool {
        let current = self.mission.selected_sector_id();
        if current == id {
            return false;
        }

        let Some(next_id) = id else {
            self.reset_session();
            self.mission.set_selected_sector_id(None);
            tracing::info!("Squad returned to staging");
            return true;
        };

        let Some(next) = self.mission.sector(next_id) else {
            return false;
        };
        if !next.is_engageable() {
            tracing::debug!("Ignoring move to non-engageable sector {}", next.display_name());
            return false;
        }

        let previous = current
            .and_then(|id| self.mission.sector(id))
            .map(|s| s.display_name().to_string())
            .unwrap_or_else(|| "Staging Area".to_string());

        self.reset_session();
        self.mission.set_selected_sector_id(Some(next_id));

        let message = format!(
            "{} MOVEMENT: {} >> {}",
            self.roster.squad_name(),
            previous,
            next.display_name()
        );
        tracing::info!("{}", message);
        self.log.append(&message, LogSource::System);
        true
    }

    fn reset_session(&mut self) {
        self.teardown();
        self.custom_modifier = 0;
        self.tactic_applied = false;
    }

    // ========================================================================
    // MODIFIERS
    // ========================================================================

    pub fn modifiers(&self) -> ModifierSet {
        let sector = self.selected_sector();
        compute_advance_modifiers(
            &self.squad(),
            sector.as_ref(),
            self.prior_advance_rolls,
            self.custom_modifier,
        )
    }

    pub fn custom_modifier(&self) -> i32 {
        self.custom_modifier
    }

    pub fn set_custom_modifier(&mut self, value: i32) {
        self.custom_modifier = value;
    }

    pub fn prior_advance_rolls(&self) -> u32 {
        self.prior_advance_rolls
    }

    pub fn set_prior_advance_rolls(&mut self, count: u32) {
        self.prior_advance_rolls = count;
    }

    // ========================================================================
    // ROLLS
    // ========================================================================

    /// Start an advance roll against the selected sector.
    ///
    /// Modifiers are captured now. `None` if a roll is in flight or no
    /// engageable sector is selected.
    pub fn start_advance_roll(&mut self, now: Duration) -> Option<CancelToken> {
        let threat = self.engaged_sector()?.threat_level()?;
        let check = AdvanceCheck {
            modifiers: self.modifiers(),
            threat,
        };
        let token = self.advance_roll.start(check, now, &mut self.rng)?;
        self.unapplied_advance = None;
        tracing::debug!("Advance roll started against {}", threat);
        Some(token)
    }

    pub fn start_tactic_roll(&mut self, now: Duration) -> Option<CancelToken> {
        let threat = self.engaged_sector().and_then(|s| s.threat_level());
        let token = self
            .tactic_roll
            .start(TacticCheck { threat }, now, &mut self.rng)?;
        self.tactic_applied = false;
        tracing::debug!("Tactic roll started");
        Some(token)
    }

    pub fn start_dice_roll(&mut self, count: u32, now: Duration) -> Option<CancelToken> {
        let check = DicePoolCheck::new(count, self.config.dice_pool_min, self.config.dice_pool_max);
        self.dice_roll.start(check, now, &mut self.rng)
    }

    /// Drive every roll controller to `now`; returns the rolls that finalized
    pub fn tick(&mut self, now: Duration) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        if let Some(result) = self.advance_roll.advance(now, &mut self.rng) {
            self.on_advance_resolved(&result);
            events.push(EngineEvent::AdvanceResolved(result));
        }

        if let Some(roll) = self.tactic_roll.advance(now, &mut self.rng) {
            self.on_tactic_resolved(&roll);
            events.push(EngineEvent::TacticResolved(roll));
        }

        if let Some(result) = self.dice_roll.advance(now, &mut self.rng) {
            tracing::debug!("Dice pool resolved: {:?}", result.faces);
            events.push(EngineEvent::DicePoolResolved(result));
        }

        events
    }

    fn on_advance_resolved(&mut self, result: &AdvanceResult) {
        self.prior_advance_rolls += 1;
        self.unapplied_advance = Some(result.outcome);
        tracing::info!(
            "Advance roll {} + {} with {} = {}: {}",
            result.dice.first,
            result.dice.second,
            result.modifier,
            result.total,
            result.outcome
        );

        if let Some(sector) = self.selected_sector() {
            let message = advance_log_message(&self.roster.squad_name(), &sector, result);
            self.log.append(&message, LogSource::System);
        }
    }

    fn on_tactic_resolved(&mut self, roll: &TacticRoll) {
        match roll.tactic {
            Some(tactic) => {
                tracing::info!("Enemy tactic drawn on {}: {}", roll.draw, tactic);
                let message = format!("ENEMY TACTIC: {}\n{}", tactic.name(), tactic.effect());
                self.log.append(&message, LogSource::System);
            }
            None => tracing::debug!("No enemy tactic on draw {}", roll.draw),
        }
    }

    /// Next time `tick` has work to do, relative to `now`
    pub fn next_deadline(&self, now: Duration) -> Option<Duration> {
        [
            self.advance_roll.next_deadline(now),
            self.tactic_roll.next_deadline(now),
            self.dice_roll.next_deadline(now),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn is_rolling(&self) -> bool {
        self.advance_roll.is_rolling() || self.tactic_roll.is_rolling() || self.dice_roll.is_rolling()
    }

    pub fn advance_state(&self) -> &RollState<AdvanceDice, AdvanceResult> {
        self.advance_roll.state()
    }

    pub fn tactic_state(&self) -> &RollState<u8, TacticRoll> {
        self.tactic_roll.state()
    }

    pub fn dice_state(&self) -> &RollState<Vec<u8>, DicePoolResult> {
        self.dice_roll.state()
    }

    /// Cancel every roll in flight and drop resolved results
    pub fn teardown(&mut self) {
        self.unapplied_advance = None;
        self.advance_roll.teardown();
        self.tactic_roll.teardown();
        self.dice_roll.teardown();
    }

    // ========================================================================
    // OUTCOMES
    // ========================================================================

    /// Put the resolved advance outcome into effect, once per roll.
    ///
    /// Sets squad positions and grants Surprise momentum. Returns false if
    /// there is no unapplied outcome.
    pub fn apply_advance_outcome(&mut self) -> bool {
        let Some(outcome) = self.unapplied_advance.take() else {
            return false;
        };

        let slots = self.config.deployed_slots;
        self.roster.replace_all(|roster| {
            let mut updated = roster.to_vec();
            let cut = updated.len().min(slots);
            apply_advance_positions(outcome, &mut updated[..cut]);
            updated
        });

        let bonus = outcome.momentum_bonus();
        if bonus != 0 {
            self.adjust_momentum(bonus);
        }

        tracing::info!("Applied advance outcome {}", outcome);
        true
    }

    /// Put the drawn enemy tactic into effect; returns who was moved
    pub fn apply_tactic_outcome(&mut self) -> Vec<CombatantId> {
        if self.tactic_applied {
            return Vec::new();
        }
        let Some(tactic) = self.tactic_roll.outcome().and_then(|r| r.tactic) else {
            return Vec::new();
        };
        self.tactic_applied = true;

        let slots = self.config.deployed_slots;
        let rng = &mut self.rng;
        let mut moved = Vec::new();
        self.roster.replace_all(|roster| {
            let mut updated = roster.to_vec();
            let cut = updated.len().min(slots);
            moved = apply_tactic(tactic, &mut updated[..cut], rng);
            updated
        });

        let message = tactic_log_message(tactic, &self.squad(), &moved);
        self.log.append(&message, LogSource::System);
        moved
    }

    // ========================================================================
    // MOMENTUM
    // ========================================================================

    /// Adjust momentum of the selected sector by `delta`
    pub fn adjust_momentum(&mut self, delta: i8) -> Option<Sector> {
        let sector = self.engaged_sector()?;
        let MomentumChange {
            sector,
            changed,
            crossed,
        } = momentum::adjust_momentum(&sector, delta);

        if !changed {
            return Some(sector);
        }
        self.mission.replace_sector(sector.clone());
        if let Some(status) = crossed {
            self.announce_status(&sector, status);
        }
        Some(sector)
    }

    pub fn engagement_status(&self) -> Option<EngagementStatus> {
        self.engaged_sector().as_ref().and_then(sector_status)
    }

    pub fn enter_defense_objective(&mut self) -> Option<Sector> {
        let sector = self.engaged_sector()?;
        if sector.defense.is_some() {
            return Some(sector);
        }
        let sector = momentum::enter_defense(&sector, &mut self.rng)?;
        if let Some(defense) = sector.defense {
            let message = format!(
                "{} DEFENDS {}: hold for {} exchanges",
                self.roster.squad_name(),
                sector.display_name(),
                defense.remaining
            );
            self.log.append(&message, LogSource::System);
        }
        self.mission.replace_sector(sector.clone());
        Some(sector)
    }

    pub fn exit_defense_objective(&mut self) -> Option<Sector> {
        let sector = self.engaged_sector()?;
        sector.defense?;
        let sector = momentum::exit_defense(&sector);
        self.mission.replace_sector(sector.clone());
        Some(sector)
    }

    /// Count down one exchange of the active defense objective
    pub fn complete_exchange(&mut self) -> Option<Sector> {
        let sector = self.engaged_sector()?;
        let progress = momentum::complete_exchange(&sector)?;
        self.mission.replace_sector(progress.sector.clone());
        if let Some(status) = progress.resolved {
            self.announce_status(&progress.sector, status);
        }
        Some(progress.sector)
    }

    fn announce_status(&mut self, sector: &Sector, status: EngagementStatus) {
        let message = status_log_message(&self.roster.squad_name(), sector, status);
        tracing::info!("{}", message);
        self.log.append(&message, LogSource::System);
    }

    // ========================================================================
    // HARD TARGETS
    // ========================================================================

    pub fn set_hard_target_hits(&mut self, target: HardTargetId, hits: i64) -> Option<Sector> {
        let sector = self.selected_sector()?;
        let change = hard_targets::set_hits(&sector, target, hits)?;
        Some(self.record_hits(change))
    }

    pub fn adjust_hard_target_hits(&mut self, target: HardTargetId, delta: i64) -> Option<Sector> {
        let sector = self.selected_sector()?;
        let change = hard_targets::adjust_hits(&sector, target, delta)?;
        Some(self.record_hits(change))
    }

    fn record_hits(&mut self, change: HitsChange) -> Sector {
        if change.changed {
            self.mission.replace_sector(change.sector.clone());
        }
        if let Some(target) = &change.neutralized {
            let message = neutralized_message(&change.sector, target);
            tracing::info!("{}", message);
            self.log.append(&message, LogSource::System);
        }
        change.sector
    }

    // ========================================================================
    // COMBATANTS
    // ========================================================================

    fn update_combatant<F>(&mut self, id: CombatantId, edit: F) -> Option<Combatant>
    where
        F: FnOnce(&mut Combatant),
    {
        let mut found = None;
        self.roster.replace_all(|roster| {
            let mut updated = roster.to_vec();
            if let Some(combatant) = updated.iter_mut().find(|c| c.id == id) {
                edit(combatant);
                found = Some(combatant.clone());
            }
            updated
        });
        found
    }

    pub fn set_intent(&mut self, id: CombatantId, intent: Option<Intent>) -> Option<Combatant> {
        self.update_combatant(id, |c| c.intent = intent)
    }

    /// Always permitted; returns the alerts the new arrangement raises
    pub fn set_offensive_position(
        &mut self,
        id: CombatantId,
        position: OffensivePosition,
    ) -> Vec<TerrainAlert> {
        if self
            .update_combatant(id, |c| c.offensive_position = position)
            .is_none()
        {
            return Vec::new();
        }
        self.terrain_alerts()
    }

    pub fn set_defensive_position(
        &mut self,
        id: CombatantId,
        position: DefensivePosition,
    ) -> Vec<TerrainAlert> {
        if self
            .update_combatant(id, |c| c.defensive_position = position)
            .is_none()
        {
            return Vec::new();
        }
        self.terrain_alerts()
    }

    pub fn bump_resource(&mut self, id: CombatantId, resource: Resource, delta: i32) -> Option<u8> {
        self.update_combatant(id, |c| c.bump(resource, delta))
            .map(|c| c.resource(resource))
    }

    pub fn cycle_status(&mut self, id: CombatantId) -> Option<Status> {
        self.update_combatant(id, |c| c.status = c.status.cycle())
            .map(|c| c.status)
    }

    /// Roll an injury check for a deployed combatant and apply the result
    pub fn injury_check(&mut self, id: CombatantId) -> Option<InjuryCheck> {
        let threat = self.engaged_sector()?.threat_level()?;
        let combatant = self.squad().into_iter().find(|c| c.id == id)?;
        let check = resolve_injury_check(&combatant, threat, &mut self.rng);

        if check.is_hit() {
            let updated = self.update_combatant(id, |c| apply_injuries(c, check.injuries))?;
            let message = format!(
                "{} HIT: {} injur{} >> {}",
                updated.name,
                check.injuries,
                if check.injuries == 1 { "y" } else { "ies" },
                updated.status
            );
            tracing::info!("{}", message);
            self.log.append(&message, LogSource::System);
        }
        Some(check)
    }

    pub fn injury_thresholds(&self) -> Vec<(CombatantId, u8)> {
        self.squad()
            .iter()
            .map(|c| (c.id, injury_threshold(c)))
            .collect()
    }

    // ========================================================================
    // OFFENSE AND TERRAIN
    // ========================================================================

    pub fn offense_report(&self) -> OffenseReport {
        let sector = self.selected_sector();
        compute_offense_pool(&self.squad(), sector.as_ref())
    }

    /// Offense pool size after reconciling any manual override
    pub fn offense_pool(&mut self) -> u32 {
        let computed = self.offense_report().total;
        if self.offense_dial.observe(computed) {
            tracing::debug!("Offense pool override dropped, computed total is now {}", computed);
        }
        self.offense_dial.effective()
    }

    /// `Some((value, pinned))` sets an override, `None` clears it
    pub fn set_offense_override(&mut self, value: Option<(u32, bool)>) {
        let computed = self.offense_report().total;
        self.offense_dial.observe(computed);
        match value {
            Some((value, pinned)) => self.offense_dial.set_manual(value, pinned),
            None => self.offense_dial.clear_manual(),
        }
    }

    pub fn terrain_alerts(&self) -> Vec<TerrainAlert> {
        let Some(sector) = self.selected_sector() else {
            return Vec::new();
        };
        let alerts = terrain_alerts(&self.squad(), &sector);
        for alert in &alerts {
            tracing::warn!("{}", alert);
        }
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engagement::advance::AdvanceOutcome;
    use crate::engagement::stores::{InMemoryMission, InMemoryRoster, MemoryLog};
    use crate::mission::sector::{Cover, HardTarget, SectorContent, Space, ThreatLevel};
    use crate::squad::loadout::Armor;

    type TestEngine = EngagementEngine<InMemoryRoster, InMemoryMission, MemoryLog>;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn roster() -> InMemoryRoster {
        let combatants = (1..=6)
            .map(|i| Combatant::new(CombatantId(i), format!("T{i}")))
            .collect();
        InMemoryRoster::new("Viper", combatants)
    }

    fn engine_with(sectors: Vec<Sector>) -> TestEngine {
        let config = EngineConfig {
            seed: Some(11),
            ..EngineConfig::default()
        };
        EngagementEngine::new(config, roster(), InMemoryMission::new(sectors), MemoryLog::new())
            .unwrap()
    }

    fn threat(level: ThreatLevel) -> Sector {
        Sector::new("Depot", SectorContent::Threat(level))
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            dice_pool_min: 9,
            dice_pool_max: 2,
            ..EngineConfig::default()
        };
        let result: Result<TestEngine> =
            EngagementEngine::new(config, roster(), InMemoryMission::default(), MemoryLog::new());
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_select_logs_movement() {
        let first = threat(ThreatLevel::One);
        let mut second = threat(ThreatLevel::Two);
        second.name = "Bridge".to_string();
        let (a, b) = (first.id, second.id);
        let mut engine = engine_with(vec![first, second]);

        assert!(engine.select_sector(Some(a)));
        assert!(!engine.select_sector(Some(a)));
        assert!(engine.select_sector(Some(b)));

        assert_eq!(
            engine.log().texts(),
            vec![
                "Viper MOVEMENT: Staging Area >> Depot",
                "Viper MOVEMENT: Depot >> Bridge"
            ]
        );
    }

    #[test]
    fn test_select_non_engageable_is_noop() {
        let boon = Sector::new("Cache", SectorContent::Boon);
        let id = boon.id;
        let mut engine = engine_with(vec![boon]);

        assert!(!engine.select_sector(Some(id)));
        assert!(engine.selected_sector().is_none());
        assert!(engine.log().entries.is_empty());
    }

    #[test]
    fn test_switch_resets_session() {
        let first = threat(ThreatLevel::One);
        let second = threat(ThreatLevel::Two);
        let (a, b) = (first.id, second.id);
        let mut engine = engine_with(vec![first, second]);

        engine.select_sector(Some(a));
        engine.set_custom_modifier(3);
        engine.start_advance_roll(ms(0));
        engine.select_sector(Some(b));

        assert_eq!(engine.custom_modifier(), 0);
        assert_eq!(engine.advance_state(), &RollState::Idle);
        assert!(engine.tick(ms(5000)).is_empty());
        assert_eq!(engine.prior_advance_rolls(), 0);
    }

    #[test]
    fn test_advance_roll_round_trip() {
        let sector = threat(ThreatLevel::Two);
        let id = sector.id;
        let mut engine = engine_with(vec![sector]);
        engine.select_sector(Some(id));

        assert!(engine.start_advance_roll(ms(0)).is_some());
        assert!(engine.start_advance_roll(ms(10)).is_none());
        assert!(engine.tick(ms(500)).is_empty());

        let events = engine.tick(ms(900));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], EngineEvent::AdvanceResolved(_)));
        assert_eq!(engine.prior_advance_rolls(), 1);

        let last = engine.log().texts().last().map(|s| s.to_string()).unwrap();
        assert!(last.starts_with("Viper ADVANCES >> Depot"));
    }

    #[test]
    fn test_advance_requires_selection() {
        let mut engine = engine_with(vec![threat(ThreatLevel::One)]);
        assert!(engine.start_advance_roll(ms(0)).is_none());
    }

    #[test]
    fn test_apply_advance_outcome_once() {
        let sector = threat(ThreatLevel::One);
        let id = sector.id;
        let mut engine = engine_with(vec![sector]);
        engine.select_sector(Some(id));

        engine.start_advance_roll(ms(0));
        let events = engine.tick(ms(900));
        let EngineEvent::AdvanceResolved(result) = events[0].clone() else {
            panic!("expected advance result");
        };

        assert!(engine.apply_advance_outcome());
        assert!(!engine.apply_advance_outcome());

        let squad = engine.squad();
        if let Some((offensive, defensive)) = result.outcome.positions() {
            assert!(squad.iter().all(|c| c.offensive_position == offensive));
            assert!(squad.iter().all(|c| c.defensive_position == defensive));
        }
        let momentum = engine.selected_sector().unwrap().momentum;
        let expected = if result.outcome == AdvanceOutcome::Surprise { 1 } else { 0 };
        assert_eq!(momentum, expected);
    }

    #[test]
    fn test_each_advance_outcome_applies_its_effect() {
        use crate::engagement::advance::resolve_advance;
        use crate::squad::combatant::{DefensivePosition, OffensivePosition};

        let cases = [
            (ThreatLevel::Two, (1, 1), AdvanceOutcome::Ambushed),
            (ThreatLevel::One, (1, 1), AdvanceOutcome::Spotted),
            (ThreatLevel::One, (2, 2), AdvanceOutcome::Advantage),
            (ThreatLevel::One, (3, 2), AdvanceOutcome::Surprise),
            (ThreatLevel::One, (3, 3), AdvanceOutcome::Overwhelm),
        ];

        for (level, (first, second), expected) in cases {
            let sector = threat(level);
            let id = sector.id;
            let combatants = (1..=6)
                .map(|i| {
                    Combatant::new(CombatantId(i), format!("T{i}")).with_positions(
                        OffensivePosition::Limited,
                        DefensivePosition::Fortified,
                    )
                })
                .collect();
            let config = EngineConfig {
                seed: Some(11),
                ..EngineConfig::default()
            };
            let mut engine = EngagementEngine::new(
                config,
                InMemoryRoster::new("Viper", combatants),
                InMemoryMission::new(vec![sector]),
                MemoryLog::new(),
            )
            .unwrap();
            engine.select_sector(Some(id));

            let result = resolve_advance(AdvanceDice { first, second }, 0, level);
            assert_eq!(result.outcome, expected);
            engine.on_advance_resolved(&result);

            assert!(engine.apply_advance_outcome());
            let roster = engine.roster().get();
            let (deployed, reserves) = roster.split_at(5);
            let (offensive, defensive) = expected
                .positions()
                .unwrap_or((OffensivePosition::Limited, DefensivePosition::Fortified));
            assert!(deployed.iter().all(|c| c.offensive_position == offensive));
            assert!(deployed.iter().all(|c| c.defensive_position == defensive));
            assert_eq!(reserves[0].offensive_position, OffensivePosition::Limited);
            assert_eq!(reserves[0].defensive_position, DefensivePosition::Fortified);

            let momentum = engine.selected_sector().unwrap().momentum;
            assert_eq!(momentum, expected.momentum_bonus());

            assert!(!engine.apply_advance_outcome());
            assert_eq!(engine.selected_sector().unwrap().momentum, momentum);
        }
    }

    #[test]
    fn test_torn_down_outcome_is_not_applied() {
        use crate::engagement::advance::resolve_advance;

        let sector = threat(ThreatLevel::One);
        let id = sector.id;
        let mut engine = engine_with(vec![sector]);
        engine.select_sector(Some(id));

        let result = resolve_advance(AdvanceDice { first: 3, second: 2 }, 0, ThreatLevel::One);
        engine.on_advance_resolved(&result);
        engine.teardown();

        assert!(!engine.apply_advance_outcome());
        assert_eq!(engine.selected_sector().unwrap().momentum, 0);
    }

    #[test]
    fn test_momentum_crossing_logged_once() {
        let sector = threat(ThreatLevel::One).with_momentum(1);
        let id = sector.id;
        let mut engine = engine_with(vec![sector]);
        engine.select_sector(Some(id));

        engine.adjust_momentum(1);
        engine.adjust_momentum(1);
        engine.adjust_momentum(1);

        let wins = engine
            .log()
            .texts()
            .iter()
            .filter(|t| t.contains("won engagement"))
            .count();
        assert_eq!(wins, 1);
        assert_eq!(engine.engagement_status(), Some(EngagementStatus::Victory));
    }

    #[test]
    fn test_defense_objective_resolves() {
        let sector = threat(ThreatLevel::One).with_momentum(1);
        let id = sector.id;
        let mut engine = engine_with(vec![sector]);
        engine.select_sector(Some(id));

        let entered = engine.enter_defense_objective().unwrap();
        let mut remaining = entered.defense.unwrap().remaining;
        assert!(remaining == 2 || remaining == 3);

        while remaining > 0 {
            let sector = engine.complete_exchange().unwrap();
            remaining = sector.defense.unwrap().remaining;
        }
        assert_eq!(engine.engagement_status(), Some(EngagementStatus::Victory));
        assert!(engine.complete_exchange().is_none());
    }

    #[test]
    fn test_hard_target_neutralized_logged_once() {
        let target = HardTarget::new("Bunker", 1);
        let target_id = target.id;
        let sector = threat(ThreatLevel::Two).with_hard_target(target);
        let id = sector.id;
        let mut engine = engine_with(vec![sector]);
        engine.select_sector(Some(id));

        engine.adjust_hard_target_hits(target_id, -1);
        engine.adjust_hard_target_hits(target_id, -1);

        let neutralized = engine
            .log()
            .texts()
            .iter()
            .filter(|t| t.starts_with("HARD TARGET NEUTRALIZED"))
            .count();
        assert_eq!(neutralized, 1);
    }

    #[test]
    fn test_reserves_excluded() {
        let mut engine = engine_with(Vec::new());
        engine.set_intent(CombatantId(6), Some(Intent::Fire));
        assert_eq!(engine.offense_report().total, 0);

        engine.set_intent(CombatantId(1), Some(Intent::Fire));
        assert_eq!(engine.offense_pool(), 1);
    }

    #[test]
    fn test_bump_and_cycle() {
        let mut engine = engine_with(Vec::new());
        assert_eq!(engine.bump_resource(CombatantId(1), Resource::Grit, 5), Some(3));
        assert_eq!(engine.bump_resource(CombatantId(1), Resource::Ammo, -7), Some(0));
        assert_eq!(engine.cycle_status(CombatantId(2)), Some(Status::Grazed));
        assert_eq!(engine.cycle_status(CombatantId(99)), None);
    }

    #[test]
    fn test_position_change_returns_alerts() {
        let sector = threat(ThreatLevel::Two).with_terrain(Cover::Exposed, Space::Open);
        let id = sector.id;
        let mut engine = engine_with(vec![sector]);
        engine.select_sector(Some(id));

        let alerts = engine.set_defensive_position(CombatantId(1), DefensivePosition::Fortified);
        assert_eq!(alerts, vec![TerrainAlert::FortifiedForbidden { count: 1 }]);

        // Reserves never count
        let alerts = engine.set_defensive_position(CombatantId(1), DefensivePosition::InCover);
        assert!(alerts.is_empty());
        let alerts = engine.set_defensive_position(CombatantId(6), DefensivePosition::Fortified);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_injury_check_shielded() {
        let sector = threat(ThreatLevel::Four);
        let id = sector.id;
        let mut engine = engine_with(vec![sector]);
        engine.select_sector(Some(id));
        engine.roster.replace_all(|roster| {
            roster
                .iter()
                .cloned()
                .map(|c| {
                    c.with_armor(Armor::Heavy)
                        .with_positions(OffensivePosition::Engaged, DefensivePosition::Fortified)
                })
                .collect()
        });

        for _ in 0..20 {
            let check = engine.injury_check(CombatantId(1)).unwrap();
            assert!(!check.is_hit());
        }
        assert_eq!(engine.squad()[0].status, Status::Ok);
        assert!(engine.injury_thresholds().iter().all(|(_, t)| *t == 0));
        assert!(engine.injury_check(CombatantId(6)).is_none());
    }

    #[test]
    fn test_offense_override_reconciliation() {
        let mut engine = engine_with(Vec::new());
        engine.set_intent(CombatantId(1), Some(Intent::Fire));
        assert_eq!(engine.offense_pool(), 1);

        engine.set_offense_override(Some((4, false)));
        assert_eq!(engine.offense_pool(), 4);

        engine.set_intent(CombatantId(2), Some(Intent::Fire));
        assert_eq!(engine.offense_pool(), 2);

        engine.set_offense_override(Some((7, true)));
        engine.set_intent(CombatantId(3), Some(Intent::Fire));
        assert_eq!(engine.offense_pool(), 7);
    }

    #[test]
    fn test_dice_pool_clamped() {
        let mut engine = engine_with(Vec::new());
        engine.start_dice_roll(40, ms(0));
        let events = engine.tick(ms(900));
        let EngineEvent::DicePoolResolved(result) = &events[0] else {
            panic!("expected dice pool result");
        };
        assert_eq!(result.faces.len(), 20);
    }

    #[test]
    fn test_tactic_roll_without_sector_never_triggers() {
        let mut engine = engine_with(Vec::new());
        engine.start_tactic_roll(ms(0));
        assert!(engine.tick(ms(900)).is_empty());

        let events = engine.tick(ms(1200));
        let EngineEvent::TacticResolved(roll) = &events[0] else {
            panic!("expected tactic roll");
        };
        assert_eq!(roll.tactic, None);
        assert!(engine.apply_tactic_outcome().is_empty());
    }

    #[test]
    fn test_teardown_cancels_everything() {
        let sector = threat(ThreatLevel::Three);
        let id = sector.id;
        let mut engine = engine_with(vec![sector]);
        engine.select_sector(Some(id));

        let token = engine.start_advance_roll(ms(0)).unwrap();
        engine.start_tactic_roll(ms(0));
        assert!(engine.is_rolling());
        assert_eq!(engine.next_deadline(ms(0)), Some(ms(120)));

        engine.teardown();
        assert!(token.is_cancelled());
        assert!(engine.tick(ms(2000)).is_empty());
        assert_eq!(engine.log().entries.len(), 1);
    }
}
