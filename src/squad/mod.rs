//! Squad roster - combatants, loadouts and record normalization
//!
//! The roster itself lives in an external store; these are the typed
//! snapshots the engagement rules read and return.

pub mod combatant;
pub mod loadout;
pub mod normalize;

pub use combatant::{
    deployed, Combatant, DefensivePosition, Intent, OffensivePosition, Resource, Status,
    MAX_RESOURCE,
};
pub use loadout::{Armor, Gear, Weapon};
pub use normalize::{normalize_roster, parse_roster};
