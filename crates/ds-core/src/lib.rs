//! ds-core: simulation logic for DOCSim.
//!
//! This crate contains the whole game (breeding, training, feeding,
//! racing, records, persistence) with no interactive I/O. The `ds-cli`
//! crate drives it from a terminal.
//!
//! Determinism is the core contract: every stochastic decision draws from
//! a labeled RNG stream derived from the global seed (see `ds-rng`), so a
//! career replays identically from one seed and the cross-horse world
//! program stays coherent when the player switches horses.

pub mod breeding;
pub mod commentary;
pub mod config;
pub mod economy;
pub mod engine;
pub mod export;
pub mod feeding;
pub mod gambling;
pub mod handicapping;
pub mod leaderboard;
pub mod model;
pub mod names;
pub mod pool;
pub mod progression;
pub mod rating;
pub mod records;
pub mod reporting;
pub mod roster;
pub mod save;
pub mod schedule;
pub mod surfaces;
pub mod training;
pub mod world;

pub use model::{
    Condition, ExtStat, Externals, Grade, Horse, IntStat, Internals, LegType, Revision, Sex, Slot,
    Surface,
};

/// Earnings required to enter a G1 directly.
pub const G1_GATE: i64 = 1_000_000;

/// Career length cap; hitting it forces retirement.
pub const MAX_CAREER_RACES: u32 = 64;

/// Races where the player may choose to retire.
pub const RETIRE_ELIGIBLE_RACES: u32 = 20;
