//! Breeder-HTML ingestion.
//!
//! The breeder file is a self-contained HTML tool that embeds its horse
//! data as a JavaScript literal: `const gameData = {...};`. We extract
//! that blob, parse it as JSON, and pull the sire/dam rosters for the
//! requested revision.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ExtStat, Revision};

/// Roster ingestion errors.
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Breeder HTML not found: {path}")]
    FileNotFound { path: String },

    #[error("Could not read breeder HTML '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Could not find `const gameData = {{...}};` in breeder HTML")]
    MarkerNotFound,

    #[error("Breeder HTML game data is not valid JSON: {0}")]
    MalformedData(#[from] serde_json::Error),

    #[error("Revision {wanted} not found. Available: {available:?}")]
    RevisionNotFound {
        wanted: Revision,
        available: Vec<String>,
    },

    #[error("Revision {0} has an empty sire or dam roster")]
    EmptyRoster(Revision),
}

/// A breeding-pool parent: internals on the roster scale, externals 0..=16.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentHorse {
    pub name: String,
    pub stamina: i32,
    pub speed: i32,
    pub sharp: i32,
    pub ac: i32,
    pub start: i32,
    pub corner: i32,
    pub oob: i32,
    pub competing: i32,
    pub tenacious: i32,
    pub spurt: i32,
}

impl ParentHorse {
    pub fn ext(&self, stat: ExtStat) -> i32 {
        match stat {
            ExtStat::Start => self.start,
            ExtStat::Corner => self.corner,
            ExtStat::Oob => self.oob,
            ExtStat::Competing => self.competing,
            ExtStat::Tenacious => self.tenacious,
            ExtStat::Spurt => self.spurt,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RevisionData {
    sires: Vec<ParentHorse>,
    dams: Vec<ParentHorse>,
}

/// Extract the embedded game-data object from the breeder HTML text.
fn parse_game_data(html: &str) -> Result<BTreeMap<String, RevisionData>, RosterError> {
    // (?s) lets `.` span the multi-line object literal; lazy match stops at
    // the first `};`.
    let re = Regex::new(r"(?s)const\s+gameData\s*=\s*(\{.*?\});").expect("hard-coded pattern");
    let caps = re.captures(html).ok_or(RosterError::MarkerNotFound)?;
    let data: BTreeMap<String, RevisionData> = serde_json::from_str(&caps[1])?;
    Ok(data)
}

/// Load the sire and dam rosters for one revision of the breeder HTML.
pub fn load_roster(
    html_path: &Path,
    revision: Revision,
) -> Result<(Vec<ParentHorse>, Vec<ParentHorse>), RosterError> {
    if !html_path.exists() {
        return Err(RosterError::FileNotFound {
            path: html_path.display().to_string(),
        });
    }
    let text = std::fs::read_to_string(html_path).map_err(|source| RosterError::Io {
        path: html_path.display().to_string(),
        source,
    })?;

    let mut data = parse_game_data(&text)?;
    let rev_key = revision.to_string();
    let Some(rev) = data.remove(&rev_key) else {
        return Err(RosterError::RevisionNotFound {
            wanted: revision,
            available: data.keys().cloned().collect(),
        });
    };
    if rev.sires.is_empty() || rev.dams.is_empty() {
        return Err(RosterError::EmptyRoster(revision));
    }
    Ok((rev.sires, rev.dams))
}
