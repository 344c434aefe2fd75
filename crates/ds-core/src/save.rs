//! Career save files.
//!
//! One JSON file per horse under `saves/`; retired horses are archived
//! under `retired/` for the breeding pool. The schema is additive: loaders
//! tolerate missing optional fields so older saves keep working.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Horse, Revision};

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Could not read save '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Could not write save '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("Save file '{path}' is not valid: {source}")]
    Invalid {
        path: String,
        source: serde_json::Error,
    },
    #[error("Could not encode save state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// World snapshot stored in saves for players managing multiple horses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub current_round: u32,
    pub cycle: u32,
}

/// Full persisted career state for one horse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveState {
    pub seed: u64,
    pub rev: Revision,
    /// Next round to play.
    pub round_num: u32,
    pub meet_iter: u64,
    pub earnings: i64,
    pub races_run: u32,
    #[serde(default)]
    pub retired: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retired_reason: Option<String>,
    pub player: Horse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world: Option<WorldSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
    // Retirement keepsakes, set when the horse is archived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retire_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retire_poem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retire_tier: Option<String>,
}

/// Write a save, stamping `saved_at` and creating parent directories.
pub fn save_state(path: &Path, state: &SaveState) -> Result<(), SaveError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| SaveError::Write {
            path: path.display().to_string(),
            source,
        })?;
    }
    let mut stamped = state.clone();
    stamped.saved_at = Some(chrono::Utc::now().to_rfc3339());
    let payload = serde_json::to_string_pretty(&stamped)?;
    std::fs::write(path, payload).map_err(|source| SaveError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Load a save. A missing file is `Ok(None)`; a corrupt file is an error.
pub fn load_state(path: &Path) -> Result<Option<SaveState>, SaveError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path).map_err(|source| SaveError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let state = serde_json::from_str(&text).map_err(|source| SaveError::Invalid {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Some(state))
}

/// Filesystem-safe stem for save files derived from a horse name.
pub fn safe_filename(name: &str) -> String {
    let mut s = String::new();
    for c in name.trim().chars() {
        match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => s.push('_'),
            c if c.is_whitespace() => s.push('_'),
            c => s.push(c),
        }
    }
    // Collapse runs of underscores and trim leading/trailing junk.
    let mut out = String::with_capacity(s.len());
    let mut prev_underscore = false;
    for c in s.chars() {
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }
    let out = out.trim_matches(|c| c == '_' || c == '.' || c == ' ').to_string();
    if out.is_empty() { "horse".to_string() } else { out }
}

/// Pick a non-colliding save path for a new horse: `<stem>.json`,
/// `<stem>_2.json`, ...
pub fn unique_save_path(dir: &Path, horse_name: &str) -> PathBuf {
    let stem = safe_filename(horse_name);
    let mut path = dir.join(format!("{stem}.json"));
    let mut n = 2;
    while path.exists() {
        path = dir.join(format!("{stem}_{n}.json"));
        n += 1;
    }
    path
}

/// All readable saves in a directory, sorted by file name.
pub fn scan_saves(dir: &Path) -> Vec<(PathBuf, SaveState)> {
    let mut out = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return out;
    };
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .collect();
    paths.sort();
    for path in paths {
        if let Ok(Some(state)) = load_state(&path) {
            out.push((path, state));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Condition, Externals, Internals, LegType, Pedigree, RaceLogEntry, Sex, Slot, Surface,
    };

    fn sample_state() -> SaveState {
        let mut player = Horse::new(
            "PLAYER-001",
            "My: Horse?",
            Sex::F,
            LegType::SD,
            180,
            Internals {
                stamina: 33,
                speed: 37,
                sharp: 29,
            },
            Externals {
                start: 30,
                corner: 22,
                oob: 26,
                competing: 24,
                tenacious: 21,
                spurt: 28,
            },
        );
        player.g1_wins = 1;
        player.genetic_tokens = 2;
        player.pedigree = Pedigree {
            sire_name: Some("Timber Country".into()),
            dam_name: Some("Northern Star".into()),
            ..Pedigree::default()
        };
        player.career_log.push(RaceLogEntry {
            round_num: 1,
            slot: Slot::G1,
            race_name: "Winter Stakes".into(),
            track: "Eastern City".into(),
            course_code: "EC".into(),
            surface: Surface::Dirt,
            condition: Condition::Soft,
            distance: 1600,
            winner_time: 96.4,
            player_pos: 1,
            player_time: 96.4,
            player_lengths: 0.0,
            payout: 940_000,
            earnings_total_after: 1_240_000,
            field: Vec::new(),
        });
        SaveState {
            seed: 42,
            rev: Revision::RevC,
            round_num: 2,
            meet_iter: 3,
            earnings: 1_240_000,
            races_run: 6,
            retired: false,
            retired_reason: None,
            player,
            world: Some(WorldSnapshot {
                current_round: 2,
                cycle: 0,
            }),
            saved_at: None,
            retire_note: None,
            retire_poem: None,
            retire_tier: None,
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saves").join("horse.json");
        let state = sample_state();
        save_state(&path, &state).unwrap();

        let loaded = load_state(&path).unwrap().unwrap();
        assert_eq!(loaded.seed, 42);
        assert_eq!(loaded.rev, Revision::RevC);
        assert_eq!(loaded.earnings, 1_240_000);
        assert_eq!(loaded.player.name, "My: Horse?");
        assert_eq!(loaded.player.career_log.len(), 1);
        assert_eq!(loaded.player.career_log[0].slot, Slot::G1);
        assert_eq!(
            loaded.player.pedigree.sire_name.as_deref(),
            Some("Timber Country")
        );
        assert!(loaded.saved_at.is_some());
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_state(&dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{broken").unwrap();
        assert!(matches!(
            load_state(&path),
            Err(SaveError::Invalid { .. })
        ));
    }

    #[test]
    fn test_minimal_old_save_still_loads() {
        // An older save without the optional fields.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.json");
        let json = r#"{
            "seed": 7, "rev": "revD", "round_num": 1, "meet_iter": 1,
            "earnings": 0, "races_run": 0,
            "player": {
                "id": "PLAYER-001", "name": "Old Save", "sex": "M", "style": "FR",
                "ac": 100,
                "internals": {"stamina": 30, "speed": 30, "sharp": 30},
                "externals": {"start": 20, "corner": 20, "oob": 20,
                              "competing": 20, "tenacious": 20, "spurt": 20}
            }
        }"#;
        std::fs::write(&path, json).unwrap();
        let state = load_state(&path).unwrap().unwrap();
        assert!(!state.retired);
        assert!(state.world.is_none());
        assert_eq!(state.player.g1_wins, 0);
    }

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("My: Horse?"), "My_Horse");
        assert_eq!(safe_filename("  Spaced  Name  "), "Spaced_Name");
        assert_eq!(safe_filename("***"), "horse");
        assert_eq!(safe_filename("Plain"), "Plain");
    }

    #[test]
    fn test_unique_save_path_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let first = unique_save_path(dir.path(), "Star");
        std::fs::write(&first, "{}").unwrap();
        let second = unique_save_path(dir.path(), "Star");
        assert_eq!(second.file_name().unwrap(), "Star_2.json");
    }

    #[test]
    fn test_scan_saves_skips_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        save_state(&dir.path().join("a.json"), &sample_state()).unwrap();
        std::fs::write(dir.path().join("b.json"), "{bad").unwrap();
        std::fs::write(dir.path().join("c.txt"), "not a save").unwrap();
        let saves = scan_saves(dir.path());
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].1.player.name, "My: Horse?");
    }
}
