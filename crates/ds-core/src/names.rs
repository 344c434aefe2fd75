//! CPU horse naming.
//!
//! Names come from `data/cpu_names.txt` when present (one per line, `#`
//! comments allowed, at least ten usable names required), otherwise from a
//! built-in fallback pool. Round name lists are drawn deterministically
//! and extended with suffixes when the pool runs short.

use std::path::Path;

use ds_rng::{SimRng, sim_key};

pub const DEFAULT_FALLBACK: [&str; 18] = [
    "Silver Comet",
    "Thunder Boy",
    "Silent Storm",
    "Timber Country",
    "Runaway King",
    "Northern Star",
    "Eastern Legend",
    "Central Pride",
    "Western Ace",
    "Southern Charm",
    "Sega Lightning",
    "Blue Horizon",
    "Golden Derby",
    "Rapid River",
    "Midnight Arrow",
    "Emerald Crown",
    "Crimson Rocket",
    "Lucky Stride",
];

/// Load the CPU name pool from `<data_dir>/cpu_names.txt`.
pub fn load_name_pool(data_dir: &Path) -> Vec<String> {
    let path = data_dir.join("cpu_names.txt");
    if let Ok(text) = std::fs::read_to_string(&path) {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();
        if lines.len() >= 10 {
            let mut seen = std::collections::HashSet::new();
            return lines
                .into_iter()
                .filter(|n| seen.insert(n.to_string()))
                .map(str::to_string)
                .collect();
        }
    }
    DEFAULT_FALLBACK.iter().map(|s| s.to_string()).collect()
}

/// Build `pool_size` deterministic names for one round.
pub fn build_round_names(
    global_seed: u64,
    round_num: u32,
    pool_size: usize,
    base_pool: &[String],
) -> Vec<String> {
    let mut rng = SimRng::new(sim_key!(global_seed, "CPU_NAMES", round_num));
    let mut pool: Vec<String> = base_pool.to_vec();
    rng.shuffle(&mut pool);

    const SUFFIXES: [&str; 11] = [
        "", " II", " III", " IV", " V", " Jr.", " Sr.", " A", " B", " C", " D",
    ];

    let mut out = Vec::with_capacity(pool_size);
    let mut i = 0usize;
    while out.len() < pool_size && !pool.is_empty() {
        let base = &pool[i % pool.len()];
        let suf = SUFFIXES[(i / pool.len()) % SUFFIXES.len()];
        out.push(format!("{base}{suf}"));
        i += 1;
    }
    out
}
