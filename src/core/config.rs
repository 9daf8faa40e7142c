//! Engine configuration with documented constants
//!
//! All tunable values are collected here. The defaults reproduce the
//! tabletop rules; a TOML file may override any subset of them.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};

/// Timer settings for one kind of animated roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollTiming {
    /// Interval between interim (display-only) samples
    pub tick_ms: u64,
    /// Delay from `start()` until the authoritative result is drawn
    pub duration_ms: u64,
}

impl RollTiming {
    pub const fn new(tick_ms: u64, duration_ms: u64) -> Self {
        Self {
            tick_ms,
            duration_ms,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Configuration for the engagement engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === ROSTER ===
    /// Number of leading roster entries that take part in an engagement
    ///
    /// Everyone past this index sits in reserve and is ignored by every
    /// modifier, contribution and alert.
    pub deployed_slots: usize,

    // === ROLL ANIMATION ===
    /// Timing of the sector advance roll (two d3)
    pub advance_roll: RollTiming,

    /// Timing of the tactic roll (one d6, then a table draw)
    ///
    /// Slightly longer than the advance roll so the two never finish on
    /// the same frame when started together.
    pub tactic_roll: RollTiming,

    /// Timing of the cosmetic dice pool
    pub dice_roll: RollTiming,

    // === DICE POOL ===
    /// Smallest number of d6 the dice pool will roll
    pub dice_pool_min: u32,

    /// Largest number of d6 the dice pool will roll
    pub dice_pool_max: u32,

    // === SECTORS ===
    /// Hit counter given to hard targets whose stored value is unusable
    pub default_hard_target_hits: u32,

    // === RANDOMNESS ===
    /// Seed for the engine RNG; `None` draws a fresh seed per engine
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deployed_slots: 5,

            advance_roll: RollTiming::new(120, 900),
            tactic_roll: RollTiming::new(120, 1200),
            dice_roll: RollTiming::new(120, 900),

            dice_pool_min: 1,
            dice_pool_max: 20,

            default_hard_target_hits: 3,

            seed: None,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing keys keep their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate().map_err(EngineError::InvalidConfig)?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.deployed_slots == 0 {
            return Err("deployed_slots must be at least 1".into());
        }

        for (name, timing) in [
            ("advance_roll", self.advance_roll),
            ("tactic_roll", self.tactic_roll),
            ("dice_roll", self.dice_roll),
        ] {
            if timing.tick_ms == 0 {
                return Err(format!("{name}.tick_ms must be positive"));
            }
            if timing.duration_ms < timing.tick_ms {
                return Err(format!(
                    "{name}.duration_ms ({}) should be >= tick_ms ({})",
                    timing.duration_ms, timing.tick_ms
                ));
            }
        }

        if self.dice_pool_min == 0 || self.dice_pool_min > self.dice_pool_max {
            return Err(format!(
                "dice pool bounds must satisfy 1 <= min ({}) <= max ({})",
                self.dice_pool_min, self.dice_pool_max
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            seed = 42

            [advance_roll]
            tick_ms = 100
            duration_ms = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.advance_roll, RollTiming::new(100, 1000));
        assert_eq!(config.deployed_slots, 5);
        assert_eq!(config.tactic_roll, RollTiming::new(120, 1200));
    }

    #[test]
    fn test_rejects_inverted_dice_bounds() {
        let result = EngineConfig::from_toml_str("dice_pool_min = 10\ndice_pool_max = 2\n");
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = EngineConfig::from_toml_str("deployed_slots = \"five\"");
        assert!(matches!(result, Err(EngineError::TomlError(_))));
    }

    #[test]
    fn test_zero_tick_rejected() {
        let mut config = EngineConfig::default();
        config.dice_roll.tick_ms = 0;
        assert!(config.validate().is_err());
    }
}
