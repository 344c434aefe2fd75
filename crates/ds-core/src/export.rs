//! DOCSIMRAW card export.
//!
//! Serializes a saved horse into a deterministic 512-byte binary card
//! payload plus a human-readable JSON manifest, for consumption by other
//! community tools. The payload is a DOCSim-defined schema, not the
//! proprietary arcade card format.
//!
//! Layout (little-endian), DOCSIMRAW v1:
//!
//! ```text
//! 0x00  9   Magic: b"DOCSIMRAW"
//! 0x09  1   Schema version (1)
//! 0x0C  4   Seed (u32)
//! 0x10  4   Rev string (utf-8, NUL padded, e.g. "revC")
//! 0x20  32  Horse name (utf-8, NUL padded)
//! 0x40  1   Sex (0=F, 1=M)
//! 0x41  1   Style code
//! 0x42  1   Horse type code (0 stamina, 1 speed, 2 sharp)
//! 0x43  1   Coat color code
//! 0x44  1   Personality code
//! 0x45  1   Hearts
//! 0x48  2   AC (u16)
//! 0x4A  2   rating_base (u16)
//! 0x4C  4   earnings (u32)
//! 0x50  4   races_run (u32)
//! 0x60  3   Internals: stamina, speed, sharp (u8)
//! 0x68  6   Externals: start, corner, oob, competing, tenacious, spurt (u8)
//! 0x70  6   Breeding ext (u8, 0..=16) when present, else zeros
//! 0x80  32  Sire name (utf-8, NUL padded)
//! 0xA0  32  Dam name (utf-8, NUL padded)
//! ```

use std::path::{Path, PathBuf};

use ds_rng::sim_key;
use serde::Serialize;
use thiserror::Error;

use crate::model::{CodedName, ExtStat, Horse, LegType, Sex};
use crate::save::{SaveState, safe_filename};

pub const RAW_MAGIC: &[u8; 9] = b"DOCSIMRAW";
pub const RAW_SCHEMA_VERSION: u8 = 1;
pub const RAW_SIZE: usize = 0x200;

pub const MAX_HEARTS: u8 = 5;

/// Cosmetic coat colors with stable numeric codes.
pub const COAT_COLORS: [(u8, &str); 8] = [
    (0, "Bay"),
    (1, "Chestnut"),
    (2, "Black"),
    (3, "Gray"),
    (4, "Dark Bay"),
    (5, "Palomino"),
    (6, "Buckskin"),
    (7, "Roan"),
];

/// Cosmetic personalities with stable numeric codes.
pub const PERSONALITIES: [(u8, &str); 8] = [
    (0, "Calm"),
    (1, "Spirited"),
    (2, "Aggressive"),
    (3, "Lazy"),
    (4, "Nervous"),
    (5, "Brave"),
    (6, "Intelligent"),
    (7, "Stubborn"),
];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Could not write export '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Could not encode manifest: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Fill missing cosmetic extras (coat/personality/hearts) on the horse.
///
/// Deterministic per (seed, horse id) via a small LCG so repeated exports
/// of the same save agree; existing values are preserved.
pub fn ensure_horse_extras(horse: &mut Horse, seed: u64) {
    let key = sim_key!(seed, horse.id, "EXTRAS");
    let mut x = (key & 0xFFFF_FFFF) as u32;
    let mut next = move || {
        x = x.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        x
    };

    if horse.extras.coat.is_none() {
        let (code, name) = COAT_COLORS[next() as usize % COAT_COLORS.len()];
        horse.extras.coat = Some(CodedName {
            code,
            name: name.to_string(),
        });
    }
    if horse.extras.personality.is_none() {
        let (code, name) = PERSONALITIES[next() as usize % PERSONALITIES.len()];
        horse.extras.personality = Some(CodedName {
            code,
            name: name.to_string(),
        });
    }
    if horse.extras.hearts < 1 || horse.extras.hearts > MAX_HEARTS {
        horse.extras.hearts = (next() % u32::from(MAX_HEARTS)) as u8 + 1;
    }
}

fn pack_str(buf: &mut [u8], offset: usize, len: usize, value: &str) {
    let raw = value.as_bytes();
    let n = raw.len().min(len);
    buf[offset..offset + n].copy_from_slice(&raw[..n]);
    for b in &mut buf[offset + n..offset + len] {
        *b = 0;
    }
}

fn style_code(leg: LegType) -> u8 {
    match leg {
        LegType::SD => 0,
        LegType::SR => 1,
        _ => 2,
    }
}

fn horse_type_code(horse: &Horse) -> u8 {
    match horse.internal_type() {
        crate::model::IntStat::Stamina => 0,
        crate::model::IntStat::Speed => 1,
        crate::model::IntStat::Sharp => 2,
    }
}

/// Build the 512-byte DOCSIMRAW payload for a horse.
pub fn build_card_payload(horse: &Horse, state: &SaveState) -> Vec<u8> {
    let mut buf = vec![0u8; RAW_SIZE];
    buf[0x00..0x09].copy_from_slice(RAW_MAGIC);
    buf[0x09] = RAW_SCHEMA_VERSION;
    buf[0x0C..0x10].copy_from_slice(&(state.seed as u32).to_le_bytes());

    pack_str(&mut buf, 0x10, 4, &state.rev.to_string());
    pack_str(&mut buf, 0x20, 32, &horse.name);

    buf[0x40] = u8::from(horse.sex == Sex::M);
    buf[0x41] = style_code(horse.leg);
    buf[0x42] = horse_type_code(horse);

    if let Some(coat) = &horse.extras.coat {
        buf[0x43] = coat.code;
    }
    if let Some(pers) = &horse.extras.personality {
        buf[0x44] = pers.code;
    }
    buf[0x45] = horse.extras.hearts.max(1);

    buf[0x48..0x4A].copy_from_slice(&(horse.ac.clamp(0, u16::MAX as i32) as u16).to_le_bytes());
    let rating = horse.rating_base.unwrap_or(0.0).max(0.0) as u16;
    buf[0x4A..0x4C].copy_from_slice(&rating.to_le_bytes());
    buf[0x4C..0x50].copy_from_slice(&(state.earnings.clamp(0, u32::MAX as i64) as u32).to_le_bytes());
    buf[0x50..0x54].copy_from_slice(&state.races_run.to_le_bytes());

    buf[0x60] = horse.internals.stamina.clamp(0, 255) as u8;
    buf[0x61] = horse.internals.speed.clamp(0, 255) as u8;
    buf[0x62] = horse.internals.sharp.clamp(0, 255) as u8;

    for (i, stat) in ExtStat::ALL.iter().enumerate() {
        buf[0x68 + i] = horse.externals.get(*stat).clamp(0, 255) as u8;
    }

    if let Some(be) = &horse.pedigree.breeding_ext {
        for (i, stat) in ExtStat::ALL.iter().enumerate() {
            buf[0x70 + i] = be.get(*stat).clamp(0, 255) as u8;
        }
    }

    pack_str(
        &mut buf,
        0x80,
        32,
        horse.pedigree.sire_name.as_deref().unwrap_or(""),
    );
    pack_str(
        &mut buf,
        0xA0,
        32,
        horse.pedigree.dam_name.as_deref().unwrap_or(""),
    );

    buf
}

#[derive(Serialize)]
struct Manifest<'a> {
    schema: &'static str,
    schema_version: u8,
    seed: u64,
    rev: String,
    earnings: i64,
    races_run: u32,
    horse: &'a Horse,
}

/// Export `.raw` + manifest for a save state. Returns (raw, manifest)
/// paths.
pub fn export_state_to_raw_files(
    state: &SaveState,
    export_dir: &Path,
) -> Result<(PathBuf, PathBuf), ExportError> {
    std::fs::create_dir_all(export_dir).map_err(|source| ExportError::Io {
        path: export_dir.display().to_string(),
        source,
    })?;

    let mut horse = state.player.clone();
    ensure_horse_extras(&mut horse, state.seed);

    let payload = build_card_payload(&horse, state);

    let stem = safe_filename(&horse.name);
    let raw_path = export_dir.join(format!("{stem}.raw"));
    let manifest_path = export_dir.join(format!("{stem}.raw.json"));

    std::fs::write(&raw_path, &payload).map_err(|source| ExportError::Io {
        path: raw_path.display().to_string(),
        source,
    })?;

    let manifest = Manifest {
        schema: "DOCSIMRAW",
        schema_version: RAW_SCHEMA_VERSION,
        seed: state.seed,
        rev: state.rev.to_string(),
        earnings: state.earnings,
        races_run: state.races_run,
        horse: &horse,
    };
    let text = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(&manifest_path, text).map_err(|source| ExportError::Io {
        path: manifest_path.display().to_string(),
        source,
    })?;

    Ok((raw_path, manifest_path))
}
