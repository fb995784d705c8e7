//! Core data models for league history.

mod ids;
mod league;
mod matchup;
mod stats;

#[cfg(test)]
pub(crate) use matchup::fixtures;

pub use ids::*;
pub use league::*;
pub use matchup::{Matchup, Outcome};
pub use stats::*;
