//! Hard target hit counters

use crate::core::types::HardTargetId;
use crate::mission::sector::{HardTarget, Sector};

#[derive(Debug, Clone, PartialEq)]
pub struct HitsChange {
    pub sector: Sector,
    pub changed: bool,
    /// The target, when this change took it from above zero to zero
    pub neutralized: Option<HardTarget>,
}

/// Set a target's hits, floored at zero. `None` if the target is unknown.
pub fn set_hits(sector: &Sector, target: HardTargetId, hits: i64) -> Option<HitsChange> {
    let index = sector.hard_targets.iter().position(|t| t.id == target)?;
    let before = sector.hard_targets[index].hits;
    let after = hits.clamp(0, i64::from(u32::MAX)) as u32;

    let mut updated = sector.clone();
    updated.hard_targets[index].hits = after;

    let neutralized = (before > 0 && after == 0).then(|| updated.hard_targets[index].clone());

    Some(HitsChange {
        changed: before != after,
        sector: updated,
        neutralized,
    })
}

pub fn adjust_hits(sector: &Sector, target: HardTargetId, delta: i64) -> Option<HitsChange> {
    let current = sector.hard_target(target)?.hits;
    set_hits(sector, target, i64::from(current).saturating_add(delta))
}

pub fn neutralized_message(sector: &Sector, target: &HardTarget) -> String {
    format!(
        "HARD TARGET NEUTRALIZED: {} ({})",
        target.display_name(),
        sector.display_name()
    )
}
