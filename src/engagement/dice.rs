//! Dice helpers and the cosmetic dice pool
//!
//! The dice pool has no rule consequences; it exists so the tabletop
//! "throw a handful of d6" action runs through the same roll controller.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engagement::roll::RollCheck;

pub fn roll_d3<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(1..=3)
}

pub fn roll_d6<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(1..=6)
}

/// Final faces of a dice pool throw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DicePoolResult {
    pub faces: Vec<u8>,
}

impl DicePoolResult {
    pub fn highest(&self) -> Option<u8> {
        self.faces.iter().copied().max()
    }

    pub fn lowest(&self) -> Option<u8> {
        self.faces.iter().copied().min()
    }
}

/// N d6, with N clamped into the configured bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DicePoolCheck {
    count: u32,
}

impl DicePoolCheck {
    pub fn new(count: u32, min: u32, max: u32) -> Self {
        Self {
            count: count.clamp(min, max),
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

impl RollCheck for DicePoolCheck {
    type Dice = Vec<u8>;
    type Outcome = DicePoolResult;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Dice {
        (0..self.count).map(|_| roll_d6(rng)).collect()
    }

    fn resolve<R: Rng + ?Sized>(&mut self, dice: &Self::Dice, _rng: &mut R) -> Self::Outcome {
        DicePoolResult {
            faces: dice.clone(),
        }
    }
}
