//! National records, persisted to `data/records_state.json`.
//!
//! Keys are `"COURSE|distance|SURFACE"`. A record only falls when beaten
//! by more than [`EPS_BREAK`] seconds. The state file bootstraps from a
//! defaults file when missing, and deleting it between runs is a reset,
//! not an error.

use std::collections::BTreeMap;
use std::path::Path;

use ds_rng::{SimRng, sim_key};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Surface;
use crate::names::load_name_pool;
use crate::surfaces::RecordSurfaces;

/// Seconds a record must be beaten by.
pub const EPS_BREAK: f64 = 0.10;

/// Holder name used by shipped default records before reset fills them in.
pub const PLACEHOLDER_HOLDER: &str = "(Default Nat Rec)";

#[derive(Error, Debug)]
pub enum RecordsError {
    #[error("Could not write records '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Could not encode records: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One course/distance/surface record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub time_seconds: f64,
    #[serde(default = "default_holder")]
    pub holder: String,
}

fn default_holder() -> String {
    "N/A".to_string()
}

fn key(course_code: &str, distance: u32, surface: Surface) -> String {
    format!("{course_code}|{distance}|{surface}")
}

fn parse_key(k: &str) -> Option<(String, u32, Surface)> {
    let mut parts = k.split('|');
    let cc = parts.next()?.to_string();
    let dist: u32 = parts.next()?.parse().ok()?;
    let surf: Surface = parts.next()?.parse().ok()?;
    Some((cc, dist, surf))
}

/// The national record book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordBook {
    entries: BTreeMap<String, RecordEntry>,
}

impl RecordBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Load the record state, bootstrapping from defaults when missing.
    /// Unreadable files degrade to an empty book.
    pub fn load(state_path: &Path, default_path: &Path) -> Self {
        for path in [state_path, default_path] {
            if let Ok(text) = std::fs::read_to_string(path) {
                if let Ok(book) = serde_json::from_str::<RecordBook>(&text) {
                    return book;
                }
            }
        }
        Self::new()
    }

    pub fn save(&self, path: &Path) -> Result<(), RecordsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| RecordsError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        std::fs::write(path, payload).map_err(|source| RecordsError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn get(&self, course_code: &str, distance: u32, surface: Surface) -> Option<&RecordEntry> {
        self.entries.get(&key(course_code, distance, surface))
    }

    /// Return the record for a course, creating it from the given par time
    /// when absent.
    pub fn ensure(
        &mut self,
        course_code: &str,
        distance: u32,
        surface: Surface,
        time_seconds: f64,
    ) -> RecordEntry {
        self.entries
            .entry(key(course_code, distance, surface))
            .or_insert_with(|| RecordEntry {
                time_seconds,
                holder: default_holder(),
            })
            .clone()
    }

    /// Update the record if `time_seconds` beats it by more than
    /// [`EPS_BREAK`]. Returns (broken, current entry).
    pub fn update_if_broken(
        &mut self,
        course_code: &str,
        distance: u32,
        surface: Surface,
        time_seconds: f64,
        holder: &str,
    ) -> (bool, RecordEntry) {
        let k = key(course_code, distance, surface);
        match self.entries.get_mut(&k) {
            None => {
                let entry = RecordEntry {
                    time_seconds,
                    holder: holder.to_string(),
                };
                self.entries.insert(k, entry.clone());
                (true, entry)
            }
            Some(entry) => {
                if time_seconds < entry.time_seconds - EPS_BREAK {
                    entry.time_seconds = time_seconds;
                    entry.holder = holder.to_string();
                    (true, entry.clone())
                } else {
                    (false, entry.clone())
                }
            }
        }
    }

    /// Which surfaces the record set knows for each (course, distance).
    /// Used by schedule enrichment.
    pub fn surfaces_map(&self) -> RecordSurfaces {
        let mut out = RecordSurfaces::new();
        for k in self.entries.keys() {
            if let Some((cc, dist, surf)) = parse_key(k) {
                let list = out.entry((cc, dist)).or_default();
                if !list.contains(&surf) {
                    list.push(surf);
                }
            }
        }
        out
    }

    /// Replace placeholder holders with deterministic names from the CPU
    /// name pool. Cosmetic only.
    fn fill_placeholder_holders(&mut self, data_dir: &Path, seed: u64) {
        let keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, v)| v.holder.trim() == PLACEHOLDER_HOLDER)
            .map(|(k, _)| k.clone())
            .collect();
        if keys.is_empty() {
            return;
        }

        let mut pool = load_name_pool(data_dir);
        let mut rng = SimRng::new(sim_key!(seed, "RECORDS", "PLACEHOLDERS"));
        rng.shuffle(&mut pool);

        let mut used = std::collections::HashSet::new();
        for (idx, k) in keys.iter().enumerate() {
            let base = if pool.is_empty() {
                format!("Horse {}", idx + 1)
            } else {
                pool[idx % pool.len()].clone()
            };
            let mut name = base.clone();
            let mut suffix = 2;
            while !used.insert(name.clone()) {
                name = format!("{base} {suffix}");
                suffix += 1;
            }
            if let Some(entry) = self.entries.get_mut(k) {
                entry.holder = name;
            }
        }
    }
}

/// Reset the record state from the defaults file, filling placeholder
/// holders with plausible names, and persist the result.
pub fn reset_records(
    state_path: &Path,
    default_path: &Path,
    seed: u64,
) -> Result<RecordBook, RecordsError> {
    let mut book = RecordBook::load(default_path, default_path);
    let data_dir = default_path.parent().unwrap_or(Path::new("."));
    book.fill_placeholder_holders(data_dir, if seed == 0 { 1337 } else { seed });
    book.save(state_path)?;
    Ok(book)
}
