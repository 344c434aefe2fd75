//! Global (cross-horse) race program state.
//!
//! The schedule keeps advancing even when the player switches horses:
//! `current_round` and `race_index` point at the next race the world will
//! run, and `cycle` counts completed 16-round programs. A missing or
//! corrupt state file is treated as a fresh program, never an error.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schedule::{RACES_PER_ROUND, ROUNDS};

#[derive(Error, Debug)]
pub enum WorldError {
    #[error("Could not write world state '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Could not encode world state: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    /// 1..=16.
    pub current_round: u32,
    /// Completed 16-round programs.
    pub cycle: u32,
    /// Next race within the current round, 0..=5.
    pub race_index: usize,
}

impl Default for WorldState {
    fn default() -> Self {
        Self {
            current_round: 1,
            cycle: 0,
            race_index: 0,
        }
    }
}

impl WorldState {
    /// Stable iteration key for the race the world currently points at.
    /// Keeps matchups and conditions deterministic when switching horses
    /// mid-program.
    pub fn race_iter(&self, round_num: u32, race_index: usize) -> u64 {
        u64::from(self.cycle) * 1000 + u64::from(round_num) * 10 + race_index as u64
    }

    fn sanitized(mut self) -> Self {
        if self.current_round < 1 || self.current_round > ROUNDS {
            self.current_round = 1;
        }
        if self.race_index >= RACES_PER_ROUND {
            self.race_index = 0;
        }
        self
    }

    /// Advance by whole rounds, wrapping 16 -> 1 and bumping the cycle.
    pub fn advance_rounds(&mut self, rounds: u32) {
        for _ in 0..rounds {
            self.current_round += 1;
            self.race_index = 0;
            if self.current_round > ROUNDS {
                self.current_round = 1;
                self.cycle += 1;
            }
        }
    }
}

/// Load world state; out-of-range fields are clamped, corruption resets.
pub fn load_world_state(path: &Path) -> WorldState {
    match std::fs::read_to_string(path) {
        Ok(text) => serde_json::from_str::<WorldState>(&text)
            .map(WorldState::sanitized)
            .unwrap_or_default(),
        Err(_) => WorldState::default(),
    }
}

pub fn save_world_state(path: &Path, state: &WorldState) -> Result<(), WorldError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| WorldError::Io {
            path: path.display().to_string(),
            source,
        })?;
    }
    let payload = serde_json::to_string_pretty(state)?;
    std::fs::write(path, payload).map_err(|source| WorldError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Reset the program back to round 1 and persist it.
pub fn reset_world_state(path: &Path) -> Result<WorldState, WorldError> {
    let state = WorldState::default();
    save_world_state(path, &state)?;
    Ok(state)
}
