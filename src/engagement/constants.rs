//! Engagement rule constants - all tunable values in one place
//!
//! Modifiers are ADDITIVE integers applied to dice totals.

// Momentum track
pub const MOMENTUM_MIN: i8 = -3;
pub const MOMENTUM_MAX: i8 = 5;
pub const MOMENTUM_DEFAULT: i8 = 0;

// Defense objective: goal = threat level + 1..=2 exchanges
pub const DEFENSE_EXTRA_EXCHANGES_MIN: u32 = 1;
pub const DEFENSE_EXTRA_EXCHANGES_MAX: u32 = 2;
/// Momentum needed when the countdown ends for the sector to hold
pub const DEFENSE_HOLD_MOMENTUM: i8 = 1;

// Advance roll modifiers
pub const INJURIES_FEW_MODIFIER: i32 = -1;
pub const INJURIES_MANY_MODIFIER: i32 = -2;
/// Wounded count at which the heavier injuries penalty applies
pub const INJURIES_MANY_THRESHOLD: usize = 3;
pub const LIGHT_ARMOR_MOBILITY: i32 = 1;
pub const HEAVY_ARMOR_MOBILITY: i32 = -1;
/// Advance rolls per point of fatigue
pub const ROLLS_PER_FATIGUE: u32 = 3;

// Injury thresholds (hit on d6 <= threshold)
pub const FORTIFIED_THRESHOLD: u8 = 1;
pub const IN_COVER_THRESHOLD: u8 = 2;
pub const FLANKED_THRESHOLD: u8 = 3;
pub const HEAVY_ARMOR_THRESHOLD_REDUCTION: u8 = 1;

// Terrain position caps
pub const NORMAL_COVER_FORTIFIED_CAP: usize = 2;
pub const TRANSITIONAL_SPACE_FLANKING_CAP: usize = 2;
