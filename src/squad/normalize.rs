//! Lenient conversion of stored roster records
//!
//! Roster records come from an external store and may be partial, stale or
//! hand-edited. Every unusable field falls back to a neutral default.

use serde_json::{Map, Value};

use crate::core::error::Result;
use crate::core::types::CombatantId;
use crate::squad::combatant::{Combatant, Intent, MAX_RESOURCE};
use crate::squad::loadout::label_key;

/// First string value found under any of `keys`
pub(crate) fn str_field<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
}

/// Parse an optional label, treating unknown values as absent
pub(crate) fn parse_label<T: std::str::FromStr>(
    record: &Map<String, Value>,
    keys: &[&str],
) -> Option<T> {
    str_field(record, keys).and_then(|raw| raw.parse().ok())
}

/// Integer in [0, max] from a number or numeric string, else `fallback`
pub(crate) fn bounded_int(value: Option<&Value>, max: i64, fallback: i64) -> i64 {
    let numeric = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match numeric {
        Some(n) if n.is_finite() => (n.floor() as i64).clamp(0, max),
        _ => fallback,
    }
}

fn parse_intent(record: &Map<String, Value>) -> Option<Intent> {
    let raw = str_field(record, &["intent"])?;
    let intent = match label_key(raw).as_str() {
        "fire" => Intent::Fire,
        "move_up" | "moveup" => Intent::MoveUp,
        "fall_back" | "fallback" => Intent::FallBack,
        "use_special_gear" | "special_gear" => Intent::UseSpecialGear,
        "interact" => Intent::Interact,
        "disengage" => Intent::Disengage,
        "covering_fire" | "coveringfire" => {
            let target = record
                .get("intentTarget")
                .or_else(|| record.get("intent_target"))
                .and_then(Value::as_u64)?;
            Intent::CoveringFire(CombatantId(u32::try_from(target).ok()?))
        }
        _ => return None,
    };
    Some(intent)
}

fn normalize_combatant(raw: &Value, index: usize) -> Combatant {
    let fallback_id = CombatantId(index as u32 + 1);
    let Some(record) = raw.as_object() else {
        return Combatant::new(fallback_id, "");
    };

    let id = record
        .get("id")
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
        .map(CombatantId)
        .unwrap_or(fallback_id);
    let name = str_field(record, &["name"]).unwrap_or_default();

    let mut combatant = Combatant::new(id, name);
    combatant.status = parse_label(record, &["status"]).unwrap_or_default();

    let max = MAX_RESOURCE as i64;
    combatant.grit = bounded_int(record.get("grit"), max, max) as u8;
    combatant.ammo = bounded_int(record.get("ammo"), max, max) as u8;

    combatant.weapon = parse_label(record, &["weaponId", "weapon"]);
    combatant.armor = parse_label(record, &["armorId", "armor"]);
    if let Some(items) = ["specialGear", "gear"]
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_array)) {
        for gear in items.iter().filter_map(Value::as_str).filter_map(|g| g.parse().ok()) {
            combatant = combatant.with_gear(gear);
        }
    }

    combatant.offensive_position =
        parse_label(record, &["offensivePosition", "offensive_position"]).unwrap_or_default();
    combatant.defensive_position =
        parse_label(record, &["defensivePosition", "defensive_position"]).unwrap_or_default();
    combatant.intent = parse_intent(record);
    combatant.at_risk = record
        .get("atRisk")
        .or_else(|| record.get("at_risk"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    combatant
}

/// Normalize an arbitrary JSON value into a roster; non-arrays yield an empty roster
pub fn normalize_roster(raw: &Value) -> Vec<Combatant> {
    raw.as_array()
        .map(|entries| {
            entries
                .iter()
                .enumerate()
                .map(|(index, entry)| normalize_combatant(entry, index))
                .collect()
        })
        .unwrap_or_default()
}

/// Parse and normalize a stored roster document
pub fn parse_roster(json: &str) -> Result<Vec<Combatant>> {
    let raw: Value = serde_json::from_str(json)?;
    Ok(normalize_roster(&raw))
}
