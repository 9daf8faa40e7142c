//! Collaborator handles the engine reads and writes through
//!
//! Roster and mission state live outside the engine. The engine only ever
//! sees snapshots and writes back whole replacement values.

use serde::{Deserialize, Serialize};

use crate::core::types::{LogSource, SectorId};
use crate::mission::sector::Sector;
use crate::squad::combatant::Combatant;

pub trait RosterStore {
    /// Ordered roster snapshot; deployed combatants first
    fn get(&self) -> Vec<Combatant>;

    fn replace_all<F>(&mut self, updater: F)
    where
        F: FnOnce(&[Combatant]) -> Vec<Combatant>;

    fn squad_name(&self) -> String;
}

pub trait MissionStore {
    fn sectors(&self) -> Vec<Sector>;

    fn sector(&self, id: SectorId) -> Option<Sector> {
        self.sectors().into_iter().find(|s| s.id == id)
    }

    /// Replace the sector with the same id; unknown ids are ignored
    fn replace_sector(&mut self, sector: Sector);

    fn selected_sector_id(&self) -> Option<SectorId>;

    fn set_selected_sector_id(&mut self, id: Option<SectorId>);
}

pub trait LogSink {
    fn append(&mut self, text: &str, source: LogSource);
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRoster {
    pub name: String,
    pub combatants: Vec<Combatant>,
}

impl InMemoryRoster {
    pub fn new(name: impl Into<String>, combatants: Vec<Combatant>) -> Self {
        Self {
            name: name.into(),
            combatants,
        }
    }
}

impl RosterStore for InMemoryRoster {
    fn get(&self) -> Vec<Combatant> {
        self.combatants.clone()
    }

    fn replace_all<F>(&mut self, updater: F)
    where
        F: FnOnce(&[Combatant]) -> Vec<Combatant>,
    {
        self.combatants = updater(&self.combatants);
    }

    fn squad_name(&self) -> String {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            "Unnamed Squad".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryMission {
    pub sectors: Vec<Sector>,
    pub selected: Option<SectorId>,
}

impl InMemoryMission {
    pub fn new(sectors: Vec<Sector>) -> Self {
        Self {
            sectors,
            selected: None,
        }
    }
}

impl MissionStore for InMemoryMission {
    fn sectors(&self) -> Vec<Sector> {
        self.sectors.clone()
    }

    fn sector(&self, id: SectorId) -> Option<Sector> {
        self.sectors.iter().find(|s| s.id == id).cloned()
    }

    fn replace_sector(&mut self, sector: Sector) {
        if let Some(slot) = self.sectors.iter_mut().find(|s| s.id == sector.id) {
            *slot = sector;
        }
    }

    fn selected_sector_id(&self) -> Option<SectorId> {
        self.selected
    }

    fn set_selected_sector_id(&mut self, id: Option<SectorId>) {
        self.selected = id;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub text: String,
    pub source: LogSource,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    pub entries: Vec<LogEntry>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.text.as_str()).collect()
    }
}

impl LogSink for MemoryLog {
    fn append(&mut self, text: &str, source: LogSource) {
        self.entries.push(LogEntry {
            text: text.to_string(),
            source,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CombatantId;
    use crate::mission::sector::SectorContent;

    #[test]
    fn test_squad_name_fallback() {
        assert_eq!(InMemoryRoster::new("  ", Vec::new()).squad_name(), "Unnamed Squad");
        assert_eq!(InMemoryRoster::new("Viper", Vec::new()).squad_name(), "Viper");
    }

    #[test]
    fn test_replace_all_uses_updater() {
        let mut roster = InMemoryRoster::new(
            "Viper",
            vec![Combatant::new(CombatantId(1), "A"), Combatant::new(CombatantId(2), "B")],
        );
        roster.replace_all(|current| current.iter().rev().cloned().collect());
        assert_eq!(roster.get()[0].id, CombatantId(2));
    }

    #[test]
    fn test_replace_sector_ignores_unknown() {
        let sector = Sector::new("A", SectorContent::Nothing);
        let id = sector.id;
        let mut mission = InMemoryMission::new(vec![sector]);

        mission.replace_sector(Sector::new("Stranger", SectorContent::Boon));
        assert_eq!(mission.sectors().len(), 1);

        let mut renamed = mission.sector(id).unwrap();
        renamed.name = "B".to_string();
        mission.replace_sector(renamed);
        assert_eq!(mission.sector(id).unwrap().name, "B");
    }

    #[test]
    fn test_memory_log_records_source() {
        let mut log = MemoryLog::new();
        log.append("hello", LogSource::User);
        assert_eq!(log.texts(), vec!["hello"]);
        assert_eq!(log.entries[0].source, LogSource::User);
    }
}
