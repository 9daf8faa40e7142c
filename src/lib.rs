//! Danger Close - Rules Engine for Squad-Tactics Engagements

pub mod core;
pub mod engagement;
pub mod mission;
pub mod squad;
