//! Random sector generation
//!
//! Every table is a single d6 lookup. Harder missions shift sector content
//! toward higher threat levels.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engagement::dice::roll_d6;
use crate::mission::sector::{Cover, Sector, SectorContent, Space, ThreatLevel, Weather};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Routine,
    #[default]
    Hazardous,
    Desperate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Airspace {
    Clear,
    #[default]
    Contested,
    Hostile,
}

use SectorContent::{Boon, Nothing, Threat};
use ThreatLevel::{Four, One, Three, Two};

/// Content table indexed by `d6 - 1`
const ROUTINE_CONTENT: [SectorContent; 6] = [
    Threat(Two),
    Threat(One),
    Threat(One),
    Threat(One),
    Nothing,
    Boon,
];
const HAZARDOUS_CONTENT: [SectorContent; 6] = [
    Threat(Three),
    Threat(One),
    Threat(One),
    Threat(Two),
    Nothing,
    Boon,
];
const DESPERATE_CONTENT: [SectorContent; 6] = [
    Threat(Four),
    Threat(Three),
    Threat(Two),
    Threat(Two),
    Threat(Two),
    Boon,
];

/// Mission archetypes as (type, objective)
pub const MISSION_OBJECTIVES: [(&str, &str); 13] = [
    ("Seize & Secure", "Assault"),
    ("Seize & Secure", "Search & Destroy"),
    ("Seize & Secure", "Breach"),
    ("Hit & Run", "Raid"),
    ("Hit & Run", "Recon"),
    ("Hit & Run", "Extraction"),
    ("Hit & Run", "Recovery"),
    ("Hit & Run", "Sabotage"),
    ("Free Roam", "Kill Mission"),
    ("Free Roam", "Disruption"),
    ("Defense", "Siege"),
    ("Defense", "Evacuation"),
    ("Defense", "Last Stand"),
];

pub fn cover_for_roll(roll: u8) -> Cover {
    match roll {
        1 => Cover::Exposed,
        2..=4 => Cover::Normal,
        _ => Cover::Dense,
    }
}

pub fn space_for_roll(roll: u8) -> Space {
    match roll {
        1 => Space::Tight,
        2..=4 => Space::Transitional,
        _ => Space::Open,
    }
}

pub fn weather_for_roll(roll: u8) -> Weather {
    match roll {
        1..=3 => Weather::Normal,
        4..=5 => Weather::Bad,
        _ => Weather::Terrible,
    }
}

pub fn content_for_roll(difficulty: Difficulty, roll: u8) -> SectorContent {
    let table = match difficulty {
        Difficulty::Routine => &ROUTINE_CONTENT,
        Difficulty::Hazardous => &HAZARDOUS_CONTENT,
        Difficulty::Desperate => &DESPERATE_CONTENT,
    };
    table[(roll.clamp(1, 6) - 1) as usize]
}

/// 3-in-6 Routine, 2-in-6 Hazardous, 1-in-6 Desperate
pub fn difficulty_for_roll(roll: u8) -> Difficulty {
    match roll {
        1..=3 => Difficulty::Routine,
        4..=5 => Difficulty::Hazardous,
        _ => Difficulty::Desperate,
    }
}

/// 3-in-6 Contested, 2-in-6 Clear, 1-in-6 Hostile
pub fn airspace_for_roll(roll: u8) -> Airspace {
    match roll {
        1..=3 => Airspace::Contested,
        4..=5 => Airspace::Clear,
        _ => Airspace::Hostile,
    }
}

pub fn roll_difficulty<R: Rng + ?Sized>(rng: &mut R) -> Difficulty {
    difficulty_for_roll(roll_d6(rng))
}

pub fn roll_airspace<R: Rng + ?Sized>(rng: &mut R) -> Airspace {
    airspace_for_roll(roll_d6(rng))
}

/// Pick a mission objective formatted as "Type // Objective"
pub fn roll_objective<R: Rng + ?Sized>(rng: &mut R) -> String {
    let (kind, objective) = MISSION_OBJECTIVES
        .choose(rng)
        .copied()
        .unwrap_or(MISSION_OBJECTIVES[0]);
    format!("{kind} // {objective}")
}

/// Roll a complete sector for a mission of the given difficulty
pub fn roll_sector<R: Rng + ?Sized>(
    name: impl Into<String>,
    difficulty: Difficulty,
    rng: &mut R,
) -> Sector {
    let cover = cover_for_roll(roll_d6(rng));
    let space = space_for_roll(roll_d6(rng));
    let weather = weather_for_roll(roll_d6(rng));
    let content = content_for_roll(difficulty, roll_d6(rng));

    Sector::new(name, content)
        .with_terrain(cover, space)
        .with_weather(weather)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_cover_bands() {
        assert_eq!(cover_for_roll(1), Cover::Exposed);
        assert_eq!(cover_for_roll(4), Cover::Normal);
        assert_eq!(cover_for_roll(5), Cover::Dense);
    }

    #[test]
    fn test_space_and_weather_bands() {
        assert_eq!(space_for_roll(1), Space::Tight);
        assert_eq!(space_for_roll(3), Space::Transitional);
        assert_eq!(space_for_roll(6), Space::Open);
        assert_eq!(weather_for_roll(3), Weather::Normal);
        assert_eq!(weather_for_roll(5), Weather::Bad);
        assert_eq!(weather_for_roll(6), Weather::Terrible);
    }

    #[test]
    fn test_desperate_missions_are_deadlier() {
        assert_eq!(
            content_for_roll(Difficulty::Desperate, 1),
            SectorContent::Threat(ThreatLevel::Four)
        );
        assert_eq!(
            content_for_roll(Difficulty::Routine, 1),
            SectorContent::Threat(ThreatLevel::Two)
        );
        assert_eq!(content_for_roll(Difficulty::Hazardous, 5), SectorContent::Nothing);
        for difficulty in [Difficulty::Routine, Difficulty::Hazardous, Difficulty::Desperate] {
            assert_eq!(content_for_roll(difficulty, 6), SectorContent::Boon);
        }
    }

    #[test]
    fn test_mission_level_rolls() {
        assert_eq!(difficulty_for_roll(2), Difficulty::Routine);
        assert_eq!(difficulty_for_roll(5), Difficulty::Hazardous);
        assert_eq!(difficulty_for_roll(6), Difficulty::Desperate);
        assert_eq!(airspace_for_roll(1), Airspace::Contested);
        assert_eq!(airspace_for_roll(4), Airspace::Clear);
        assert_eq!(airspace_for_roll(6), Airspace::Hostile);
    }

    #[test]
    fn test_roll_sector_is_deterministic_per_seed() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);

        let first = roll_sector("Alpha", Difficulty::Desperate, &mut a);
        let second = roll_sector("Alpha", Difficulty::Desperate, &mut b);

        assert_eq!(first.cover, second.cover);
        assert_eq!(first.space, second.space);
        assert_eq!(first.weather, second.weather);
        assert_eq!(first.content, second.content);
        assert_eq!(first.momentum, 0);
    }

    #[test]
    fn test_objective_format() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let objective = roll_objective(&mut rng);
        assert!(objective.contains(" // "));
    }
}
