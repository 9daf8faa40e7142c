//! Animated roll state machine shared by every randomized check
//!
//! Idle -> Rolling -> Resolved -> Idle. While Rolling, interim values are
//! resampled on every tick for display only. A single finalize step draws the
//! authoritative dice and runs the resolver exactly once per `start()`.
//!
//! The controller owns no timers. The host passes its clock (`now`, measured
//! from any fixed epoch) into `start` and `advance`; deadlines are compared
//! against that clock. A `CancelToken` is handed out on start so teardown
//! from anywhere in the host invalidates the pending tick and finalize.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use rand::Rng;

use crate::core::config::RollTiming;

/// A randomized check that can be driven by the controller
pub trait RollCheck {
    /// Raw dice faces, shown while rolling and kept once resolved
    type Dice: Clone + fmt::Debug;
    /// Result of running the resolver on the final dice
    type Outcome: Clone + fmt::Debug;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Dice;

    fn resolve<R: Rng + ?Sized>(&mut self, dice: &Self::Dice, rng: &mut R) -> Self::Outcome;
}

/// Shared cancellation flag for one in-flight roll
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Observable state of a roll
#[derive(Debug, Clone, PartialEq)]
pub enum RollState<D, O> {
    Idle,
    Rolling { interim: D },
    Resolved { dice: D, outcome: O },
}

struct PendingRoll<C> {
    check: C,
    token: CancelToken,
    /// `None` once finalize has cancelled the tick
    next_tick: Option<Duration>,
    finalize_at: Duration,
}

pub struct RollAnimationController<C: RollCheck> {
    timing: RollTiming,
    state: RollState<C::Dice, C::Outcome>,
    pending: Option<PendingRoll<C>>,
}

impl<C: RollCheck> RollAnimationController<C> {
    pub fn new(timing: RollTiming) -> Self {
        Self {
            timing,
            state: RollState::Idle,
            pending: None,
        }
    }

    pub fn timing(&self) -> RollTiming {
        self.timing
    }

    pub fn state(&self) -> &RollState<C::Dice, C::Outcome> {
        &self.state
    }

    pub fn is_rolling(&self) -> bool {
        matches!(self.state, RollState::Rolling { .. })
    }

    pub fn interim(&self) -> Option<&C::Dice> {
        match &self.state {
            RollState::Rolling { interim } => Some(interim),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<&C::Outcome> {
        match &self.state {
            RollState::Resolved { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// Begin a roll. Returns `None` (and drops `check`) if one is already in flight.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        check: C,
        now: Duration,
        rng: &mut R,
    ) -> Option<CancelToken> {
        if self.is_rolling() {
            tracing::debug!("Roll already in flight, ignoring start");
            return None;
        }

        let token = CancelToken::new();
        self.state = RollState::Rolling {
            interim: check.sample(rng),
        };
        self.pending = Some(PendingRoll {
            check,
            token: token.clone(),
            next_tick: Some(now + self.timing.tick_interval()),
            finalize_at: now + self.timing.duration(),
        });

        Some(token)
    }

    /// Fire any due tick or the finalize step.
    ///
    /// Returns the outcome only on the call where finalize fires.
    pub fn advance<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) -> Option<C::Outcome> {
        let pending = self.pending.as_mut()?;

        if pending.token.is_cancelled() {
            self.pending = None;
            self.state = RollState::Idle;
            return None;
        }

        if now >= pending.finalize_at {
            pending.next_tick = None;
            let mut finished = self.pending.take()?;
            let dice = finished.check.sample(rng);
            let outcome = finished.check.resolve(&dice, rng);
            self.state = RollState::Resolved {
                dice,
                outcome: outcome.clone(),
            };
            return Some(outcome);
        }

        if let Some(next_tick) = pending.next_tick {
            if now >= next_tick {
                let interval = self.timing.tick_interval();
                let missed = if interval.is_zero() {
                    0
                } else {
                    u32::try_from((now - next_tick).as_nanos() / interval.as_nanos())
                        .unwrap_or(u32::MAX)
                };
                pending.next_tick = Some(
                    next_tick.saturating_add(interval.saturating_mul(missed.saturating_add(1))),
                );
                self.state = RollState::Rolling {
                    interim: pending.check.sample(rng),
                };
            }
        }

        None
    }

    /// Time until the next tick or finalize is due
    pub fn next_deadline(&self, now: Duration) -> Option<Duration> {
        let pending = self.pending.as_ref()?;
        let due = pending
            .next_tick
            .map_or(pending.finalize_at, |tick| tick.min(pending.finalize_at));
        Some(due.saturating_sub(now))
    }

    /// Return a resolved roll to Idle; ignored while rolling
    pub fn acknowledge(&mut self) {
        if !self.is_rolling() {
            self.state = RollState::Idle;
        }
    }

    /// Cancel pending timers and drop any result
    pub fn teardown(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
            tracing::debug!("Roll cancelled before finalize");
        }
        self.state = RollState::Idle;
    }
}

impl<C: RollCheck> Drop for RollAnimationController<C> {
    fn drop(&mut self) {
        if let Some(pending) = &self.pending {
            pending.token.cancel();
        }
    }
}
