//! Mission sectors - terrain, weather, threat and hard targets

use std::fmt;
use std::str::FromStr;

use nom::bytes::complete::tag_no_case;
use nom::character::complete::{digit1, space0};
use nom::combinator::{all_consuming, map_res};
use nom::sequence::{delimited, pair, preceded};
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;
use crate::core::types::{HardTargetId, SectorId};
use crate::engagement::constants::{MOMENTUM_DEFAULT, MOMENTUM_MAX, MOMENTUM_MIN};
use crate::engagement::momentum::EngagementStatus;
use crate::squad::loadout::label_key;

/// Terrain cover; limits how many combatants can be Fortified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cover {
    Exposed,
    #[default]
    Normal,
    Dense,
}

/// Room to manoeuvre; limits how many combatants can be Flanking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Space {
    Tight,
    #[default]
    Transitional,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Weather {
    #[default]
    Normal,
    Bad,
    Terrible,
}

/// Threat level of an engageable sector, TL 1 (light) to TL 4 (overwhelming)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ThreatLevel {
    One,
    Two,
    Three,
    Four,
}

impl ThreatLevel {
    pub const ALL: [ThreatLevel; 4] = [
        ThreatLevel::One,
        ThreatLevel::Two,
        ThreatLevel::Three,
        ThreatLevel::Four,
    ];

    pub fn from_number(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    /// Short assessment shown next to the threat tag
    pub fn assessment(&self) -> &'static str {
        match self {
            Self::One => "Light",
            Self::Two => "Standard",
            Self::Three => "Heavy",
            Self::Four => "Overwhelming",
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TL {}", self.number())
    }
}

/// What waits in a sector; only threat levels can be engaged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SectorContent {
    Boon,
    #[default]
    Nothing,
    Threat(ThreatLevel),
}

impl SectorContent {
    pub fn threat_level(&self) -> Option<ThreatLevel> {
        match self {
            Self::Threat(level) => Some(*level),
            Self::Boon | Self::Nothing => None,
        }
    }

    pub fn is_engageable(&self) -> bool {
        self.threat_level().is_some()
    }
}

impl fmt::Display for SectorContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boon => f.write_str("Boon"),
            Self::Nothing => f.write_str("Nothing"),
            Self::Threat(level) => write!(f, "{level}"),
        }
    }
}

fn threat_tag(input: &str) -> IResult<&str, u8> {
    preceded(
        pair(tag_no_case("TL"), space0),
        map_res(digit1, |digits: &str| digits.parse::<u8>()),
    )
    .parse(input)
}

/// Parse a "TL n" content tag
pub fn parse_threat_tag(input: &str) -> Option<ThreatLevel> {
    let (_, level) = all_consuming(delimited(space0, threat_tag, space0))
        .parse(input)
        .ok()?;
    ThreatLevel::from_number(level)
}

impl FromStr for SectorContent {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "boon" => Ok(Self::Boon),
            "nothing" => Ok(Self::Nothing),
            _ => parse_threat_tag(s)
                .map(Self::Threat)
                .ok_or_else(|| EngineError::unknown("sector content", s)),
        }
    }
}

impl FromStr for Cover {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "exposed" => Ok(Self::Exposed),
            "normal" => Ok(Self::Normal),
            "dense" => Ok(Self::Dense),
            _ => Err(EngineError::unknown("cover", s)),
        }
    }
}

impl FromStr for Space {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "tight" => Ok(Self::Tight),
            "transitional" => Ok(Self::Transitional),
            "open" => Ok(Self::Open),
            _ => Err(EngineError::unknown("space", s)),
        }
    }
}

impl FromStr for Weather {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "normal" => Ok(Self::Normal),
            "bad" => Ok(Self::Bad),
            "terrible" => Ok(Self::Terrible),
            _ => Err(EngineError::unknown("weather", s)),
        }
    }
}

impl fmt::Display for Cover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Named objective or enemy asset with a hit counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardTarget {
    pub id: HardTargetId,
    pub name: String,
    pub hits: u32,
}

impl HardTarget {
    pub fn new(name: impl Into<String>, hits: u32) -> Self {
        Self {
            id: HardTargetId::new(),
            name: name.into(),
            hits,
        }
    }

    pub fn is_neutralized(&self) -> bool {
        self.hits == 0
    }

    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            "Unnamed Target"
        } else {
            trimmed
        }
    }
}

/// Countdown state of a defense objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseCountdown {
    /// Exchanges still to survive
    pub remaining: u32,
    /// Set once, when `remaining` reaches zero
    pub resolved: Option<EngagementStatus>,
}

/// A mission sector snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: SectorId,
    pub name: String,
    pub cover: Cover,
    pub space: Space,
    pub content: SectorContent,
    pub weather: Weather,
    pub momentum: i8,
    pub hard_targets: Vec<HardTarget>,
    pub defense: Option<DefenseCountdown>,
}

impl Sector {
    pub fn new(name: impl Into<String>, content: SectorContent) -> Self {
        Self {
            id: SectorId::new(),
            name: name.into(),
            cover: Cover::default(),
            space: Space::default(),
            content,
            weather: Weather::default(),
            momentum: MOMENTUM_DEFAULT,
            hard_targets: Vec::new(),
            defense: None,
        }
    }

    pub fn with_terrain(mut self, cover: Cover, space: Space) -> Self {
        self.cover = cover;
        self.space = space;
        self
    }

    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = weather;
        self
    }

    pub fn with_momentum(mut self, momentum: i8) -> Self {
        self.momentum = momentum.clamp(MOMENTUM_MIN, MOMENTUM_MAX);
        self
    }

    pub fn with_hard_target(mut self, target: HardTarget) -> Self {
        self.hard_targets.push(target);
        self
    }

    pub fn threat_level(&self) -> Option<ThreatLevel> {
        self.content.threat_level()
    }

    pub fn is_engageable(&self) -> bool {
        self.content.is_engageable()
    }

    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            "Unnamed Sector"
        } else {
            trimmed
        }
    }

    pub fn hard_target(&self, id: HardTargetId) -> Option<&HardTarget> {
        self.hard_targets.iter().find(|t| t.id == id)
    }
}
