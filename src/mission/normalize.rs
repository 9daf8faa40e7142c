//! Lenient conversion of stored sector records

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::types::{HardTargetId, SectorId};
use crate::engagement::momentum::clamp_momentum;
use crate::mission::sector::{HardTarget, Sector};
use crate::squad::normalize::{bounded_int, parse_label, str_field};

/// Stored ids that are not UUIDs map to a name-based UUID so re-parsing is stable
fn parse_uuid(record: &Map<String, Value>) -> Option<Uuid> {
    let raw = str_field(record, &["id"])?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(
        Uuid::parse_str(raw)
            .unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_OID, raw.as_bytes())),
    )
}

fn normalize_hard_target(raw: &Value, default_hits: u32) -> HardTarget {
    let Some(record) = raw.as_object() else {
        return HardTarget::new("", default_hits);
    };

    HardTarget {
        id: parse_uuid(record).map(HardTargetId).unwrap_or_default(),
        name: str_field(record, &["name"]).unwrap_or_default().to_string(),
        hits: bounded_int(record.get("hits"), u32::MAX as i64, default_hits as i64) as u32,
    }
}

fn normalize_sector(raw: &Value, default_hits: u32) -> Sector {
    let Some(record) = raw.as_object() else {
        return Sector::new("", Default::default());
    };

    let mut sector = Sector::new(
        str_field(record, &["name"]).unwrap_or_default(),
        parse_label(record, &["content"]).unwrap_or_default(),
    );
    if let Some(id) = parse_uuid(record) {
        sector.id = SectorId(id);
    }
    sector.cover = parse_label(record, &["cover"]).unwrap_or_default();
    sector.space = parse_label(record, &["space"]).unwrap_or_default();
    sector.weather = parse_label(record, &["weather"]).unwrap_or_default();
    sector.momentum = clamp_momentum(record.get("momentum").and_then(Value::as_f64));
    sector.hard_targets = record
        .get("hardTargets")
        .or_else(|| record.get("hard_targets"))
        .and_then(Value::as_array)
        .map(|targets| {
            targets
                .iter()
                .map(|target| normalize_hard_target(target, default_hits))
                .collect()
        })
        .unwrap_or_default();

    sector
}

/// Normalize an arbitrary JSON value into sectors; non-arrays yield no sectors
pub fn normalize_sectors(raw: &Value, default_hits: u32) -> Vec<Sector> {
    raw.as_array()
        .map(|entries| {
            entries
                .iter()
                .map(|entry| normalize_sector(entry, default_hits))
                .collect()
        })
        .unwrap_or_default()
}

/// Parse and normalize a stored sector list
pub fn parse_sectors(json: &str, default_hits: u32) -> Result<Vec<Sector>> {
    let raw: Value = serde_json::from_str(json)?;
    Ok(normalize_sectors(&raw, default_hits))
}
