//! Engagement rules and the orchestrating engine
//!
//! Modifier aggregation, advance and tactic checks, momentum, injuries,
//! offense dice and hard targets. Every randomized check runs through the
//! shared roll controller in `roll`.

pub mod advance;
pub mod constants;
pub mod dice;
pub mod engine;
pub mod hard_targets;
pub mod modifiers;
pub mod momentum;
pub mod offense;
pub mod positions;
pub mod roll;
pub mod stores;
pub mod tactics;

pub use advance::{
    advance_log_message, determine_advance_outcome, resolve_advance, AdvanceCheck, AdvanceDice,
    AdvanceOutcome, AdvanceResult,
};
pub use dice::{DicePoolCheck, DicePoolResult};
pub use engine::{EngagementEngine, EngineEvent};
pub use hard_targets::{adjust_hits, set_hits, HitsChange};
pub use modifiers::{compute_advance_modifiers, format_modifier, ModifierSet};
pub use momentum::{
    adjust_momentum, clamp_momentum, complete_exchange, engagement_status, enter_defense,
    sector_status, victory_threshold, EngagementStatus, MomentumChange,
};
pub use offense::{
    compute_offense_pool, offense_contribution, OffenseContribution, OffensePoolDial,
    OffenseReport,
};
pub use positions::{
    apply_injuries, injury_threshold, resolve_injury_check, terrain_alerts, InjuryCheck,
    PositionCensus, TerrainAlert,
};
pub use roll::{CancelToken, RollAnimationController, RollCheck, RollState};
pub use stores::{
    InMemoryMission, InMemoryRoster, LogEntry, LogSink, MemoryLog, MissionStore, RosterStore,
};
pub use tactics::{apply_tactic, tactic_triggers, TacticCheck, TacticKind, TacticRoll};
