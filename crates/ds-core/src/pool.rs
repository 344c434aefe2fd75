//! CPU round pools and field selection.
//!
//! Each round breeds a fresh pool of 36 CPU foals from the roster, scaled
//! by a round-mean multiplier so late rounds run deeper fields. Race
//! fields draw from rating-percentile bands per slot (1R soft, G1 elite),
//! avoiding horses already used by that slot this round.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use ds_rng::{SimRng, sim_key};

use crate::breeding::{BirthSpec, birth_externals, breed_ac, breed_internals, derive_leg_type};
use crate::model::{ExtStat, Horse, Sex, Slot};
use crate::names::{build_round_names, load_name_pool};
use crate::rating::{compute_rating, pool_int_stats};
use crate::roster::ParentHorse;

/// Default CPU pool size per round.
pub const POOL_SIZE: usize = 36;

/// Rating-percentile band per slot.
pub fn slot_band(slot: Slot) -> (f64, f64) {
    match slot {
        Slot::R1 => (0.20, 0.80),
        Slot::R2 => (0.25, 0.85),
        Slot::R3 => (0.50, 0.95),
        Slot::R4 => (0.30, 0.85),
        Slot::R5 => (0.40, 0.90),
        Slot::G1 => (0.65, 1.00),
    }
}

/// One round's CPU pool.
#[derive(Debug, Clone)]
pub struct RoundPool {
    pub round_num: u32,
    pub seed: u64,
    pub horses: Vec<Horse>,
    /// Horse ids sorted by ascending rating.
    pub sorted_ids: Vec<String>,
    used_by_slot: HashMap<Slot, HashSet<String>>,
}

/// Field strength multiplier for a round, 1.00 at round 1 up to 1.35.
pub fn round_mean_multiplier(round_num: u32) -> f64 {
    1.00 + f64::from(round_num - 1) * (0.35 / 15.0)
}

fn scale_external(v: i32, rm: f64) -> i32 {
    const MID: f64 = 28.0;
    let scaled = MID + (f64::from(v) - MID) * rm;
    (scaled.round() as i32).clamp(8, 48)
}

fn scale_internal(v: i32, rm: f64) -> i32 {
    let mult = 0.95 + 0.05 * rm;
    (f64::from(v) * mult).round() as i32
}

/// Breed and rate one round's CPU pool.
pub fn build_round_pool(
    global_seed: u64,
    round_num: u32,
    sires: &[ParentHorse],
    dams: &[ParentHorse],
    data_dir: &Path,
    pool_size: usize,
) -> RoundPool {
    let seed = sim_key!(global_seed, "ROUND", round_num);
    let mut rng = SimRng::new(seed);
    let rm = round_mean_multiplier(round_num);

    let base_names = load_name_pool(data_dir);
    let names = build_round_names(global_seed, round_num, pool_size, &base_names);

    let mut horses: Vec<Horse> = Vec::with_capacity(pool_size);
    for idx in 0..pool_size {
        let sire = &sires[rng.index(sires.len())];
        let dam = &dams[rng.index(dams.len())];
        let ext = birth_externals(sire, dam, &mut rng, BirthSpec::default());
        let ints = breed_internals(sire, dam);
        let ac = breed_ac(sire, dam, &mut rng);

        let mut ext2 = ext;
        for stat in ExtStat::ALL {
            ext2.set(stat, scale_external(ext.get(stat), rm));
        }
        let ints2 = crate::model::Internals {
            stamina: scale_internal(ints.stamina, rm),
            speed: scale_internal(ints.speed, rm),
            sharp: scale_internal(ints.sharp, rm),
        };

        let leg = derive_leg_type(&ext2);
        let sex = if rng.random() < 0.5 { Sex::M } else { Sex::F };

        horses.push(Horse::new(
            format!("CPU-R{round_num:02}-{idx:02}"),
            names.get(idx).cloned().unwrap_or_else(|| format!("CPU {idx}")),
            sex,
            leg,
            ac,
            ints2,
            ext2,
        ));
    }

    let (mu, sd) = pool_int_stats(&horses);
    for h in &mut horses {
        h.rating_base = Some(compute_rating(h, mu, sd));
    }

    let mut sorted_ids: Vec<String> = horses.iter().map(|h| h.id.clone()).collect();
    sorted_ids.sort_by(|a, b| {
        let ra = horses
            .iter()
            .find(|h| &h.id == a)
            .and_then(|h| h.rating_base)
            .unwrap_or(0.0);
        let rb = horses
            .iter()
            .find(|h| &h.id == b)
            .and_then(|h| h.rating_base)
            .unwrap_or(0.0);
        ra.partial_cmp(&rb).unwrap_or(std::cmp::Ordering::Equal)
    });

    RoundPool {
        round_num,
        seed,
        horses,
        sorted_ids,
        used_by_slot: HashMap::new(),
    }
}

impl RoundPool {
    fn horse_by_id(&self, id: &str) -> Option<&Horse> {
        self.horses.iter().find(|h| h.id == id)
    }
}

/// Select a CPU field from the slot's rating band, shifted by difficulty.
///
/// Horses already fielded by this slot in this round are avoided while
/// possible; selection is deterministic per (seed, round, slot, meet).
pub fn select_cpu_field(
    global_seed: u64,
    pool: &mut RoundPool,
    slot: Slot,
    meet_iteration: u64,
    field_size: usize,
    band_shift: f64,
) -> Vec<Horse> {
    let (lo_raw, hi_raw) = slot_band(slot);
    let lo_p = (lo_raw + band_shift).clamp(0.0, 1.0);
    let hi_p = (hi_raw + band_shift).clamp(0.0, 1.0).max(lo_p);

    let ids = &pool.sorted_ids;
    let n = ids.len();
    let lo = ((n as f64 * lo_p) as usize).min(n.saturating_sub(1));
    let hi = ((n as f64 * hi_p) as usize)
        .saturating_sub(1)
        .clamp(lo, n.saturating_sub(1));
    let mut candidates: Vec<String> = ids[lo..=hi].to_vec();

    let mut rng = SimRng::new(sim_key!(
        global_seed,
        "FIELD",
        pool.round_num,
        slot,
        meet_iteration
    ));
    rng.shuffle(&mut candidates);

    let used = pool.used_by_slot.entry(slot).or_default();
    let mut chosen: Vec<String> = Vec::with_capacity(field_size);
    for id in &candidates {
        if !used.contains(id) {
            chosen.push(id.clone());
        }
        if chosen.len() == field_size {
            break;
        }
    }
    // Band exhausted: allow reuse to fill the gate.
    if chosen.len() < field_size {
        for id in &candidates {
            if !chosen.contains(id) {
                chosen.push(id.clone());
            }
            if chosen.len() == field_size {
                break;
            }
        }
    }

    used.extend(chosen.iter().cloned());
    chosen
        .iter()
        .filter_map(|id| pool.horse_by_id(id).cloned())
        .collect()
}

/// Percentile rank of the player's rating within the round pool, in [0, 1].
pub fn player_rating_percentile(player: &Horse, pool_horses: &[Horse]) -> f64 {
    if pool_horses.is_empty() {
        return 0.50;
    }
    let (mu, sd) = pool_int_stats(pool_horses);
    let pr = compute_rating(player, mu, sd);
    let ratings: Vec<f64> = pool_horses
        .iter()
        .map(|h| h.rating_base.unwrap_or_else(|| compute_rating(h, mu, sd)))
        .collect();
    let le = ratings.iter().filter(|r| **r <= pr).count();
    le as f64 / ratings.len() as f64
}

/// Success-scaled 1R handicap: stronger careers draw tougher opening
/// fields. Returns (shift, wins, percentile); the shift stays modest so it
/// never swamps the round difficulty curve.
pub fn handicap_band_shift_1r(player: &Horse, pool_horses: &[Horse]) -> (f64, usize, f64) {
    let wins = player.wins();
    let pct = player_rating_percentile(player, pool_horses);

    // Wins-driven scaling (primary): 10 wins => 0.08, capped at 0.12.
    let shift_wins = (wins as f64 * 0.008).min(0.12);

    // G1 wins nudge a little further.
    let shift_g1 = (f64::from(player.g1_wins.max(0)) * 0.02).min(0.06);

    // Top 30% of the pool nudges upward.
    let shift_pct = if pct > 0.70 {
        ((pct - 0.70) * 0.20).min(0.06)
    } else {
        0.0
    };

    let shift = (shift_wins + shift_g1 + shift_pct).min(0.18);
    (shift, wins, pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Condition, Externals, Internals, LegType, RaceLogEntry, Surface};

    fn parents() -> (Vec<ParentHorse>, Vec<ParentHorse>) {
        let mk = |name: &str, base: i32, ac: i32| ParentHorse {
            name: name.to_string(),
            stamina: base,
            speed: base + 2,
            sharp: base - 2,
            ac,
            start: 10,
            corner: 9,
            oob: 11,
            competing: 10,
            tenacious: 8,
            spurt: 12,
        };
        (
            vec![mk("Sire A", 40, 60), mk("Sire B", 36, 200), mk("Sire C", 44, 120)],
            vec![mk("Dam A", 38, 90), mk("Dam B", 42, 30), mk("Dam C", 34, 250)],
        )
    }

    fn build(seed: u64, round: u32) -> RoundPool {
        let (sires, dams) = parents();
        let dir = tempfile::tempdir().unwrap();
        build_round_pool(seed, round, &sires, &dams, dir.path(), POOL_SIZE)
    }

    #[test]
    fn test_pool_is_deterministic() {
        let a = build(42, 3);
        let b = build(42, 3);
        assert_eq!(a.sorted_ids, b.sorted_ids);
        for (ha, hb) in a.horses.iter().zip(&b.horses) {
            assert_eq!(ha.name, hb.name);
            assert_eq!(ha.externals, hb.externals);
            assert_eq!(ha.rating_base, hb.rating_base);
        }
    }

    #[test]
    fn test_pool_sorted_by_rating() {
        let pool = build(42, 1);
        assert_eq!(pool.horses.len(), POOL_SIZE);
        let ratings: Vec<f64> = pool
            .sorted_ids
            .iter()
            .map(|id| pool.horse_by_id(id).unwrap().rating_base.unwrap())
            .collect();
        for w in ratings.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn test_later_rounds_run_stronger() {
        let early = build(42, 1);
        let late = build(42, 16);
        let avg = |p: &RoundPool| {
            p.horses.iter().map(|h| h.externals.sum()).sum::<i32>() as f64 / p.horses.len() as f64
        };
        assert!(avg(&late) > avg(&early));
    }

    #[test]
    fn test_field_selection_avoids_reuse_within_slot() {
        let mut pool = build(42, 2);
        let first = select_cpu_field(42, &mut pool, Slot::R1, 1, 11, 0.0);
        let second = select_cpu_field(42, &mut pool, Slot::R1, 2, 11, 0.0);
        assert_eq!(first.len(), 11);
        assert_eq!(second.len(), 11);
        let first_ids: HashSet<&str> = first.iter().map(|h| h.id.as_str()).collect();
        // The 1R band holds ~21 of 36 horses, so the second meet cannot be
        // fully fresh, but overlap must only appear once the unused pool
        // runs dry: 21 - 11 = 10 fresh horses minimum.
        let fresh = second
            .iter()
            .filter(|h| !first_ids.contains(h.id.as_str()))
            .count();
        assert!(fresh >= 10, "only {fresh} fresh runners");
    }

    #[test]
    fn test_g1_band_selects_elite() {
        let mut pool = build(42, 5);
        let g1_field = select_cpu_field(42, &mut pool, Slot::G1, 1, 12, 0.0);
        let elite_floor = pool.sorted_ids.len() * 65 / 100;
        let elite: HashSet<&str> = pool.sorted_ids[elite_floor..]
            .iter()
            .map(String::as_str)
            .collect();
        for h in &g1_field {
            assert!(elite.contains(h.id.as_str()), "{} below the G1 band", h.id);
        }
    }

    #[test]
    fn test_band_shift_raises_the_floor() {
        let mut pool = build(42, 2);
        let rank_of: HashMap<String, usize> = pool
            .sorted_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        let hard = select_cpu_field(42, &mut pool.clone(), Slot::R1, 1, 11, 0.15);
        // 1R shifted by +0.15 starts at percentile 0.35 => rank 12 of 36.
        for h in &hard {
            assert!(rank_of[h.id.as_str()] >= 12, "{} below shifted band", h.id);
        }
        // Unshifted 1R may dip down to rank 7.
        let soft = select_cpu_field(42, &mut pool, Slot::R1, 1, 11, 0.0);
        assert!(soft.iter().all(|h| rank_of[h.id.as_str()] >= 7));
    }

    fn log_entry(pos: u32) -> RaceLogEntry {
        RaceLogEntry {
            round_num: 1,
            slot: Slot::R1,
            race_name: String::new(),
            track: "Central City".to_string(),
            course_code: "CC".to_string(),
            surface: Surface::Turf,
            condition: Condition::Good,
            distance: 1200,
            winner_time: 70.0,
            player_pos: pos,
            player_time: 71.0,
            player_lengths: 5.0,
            payout: 0,
            earnings_total_after: 0,
            field: Vec::new(),
        }
    }

    #[test]
    fn test_1r_handicap_scales_with_wins() {
        let pool = build(42, 1);
        let mut player = Horse::new(
            "PLAYER-001",
            "Champ",
            crate::model::Sex::M,
            LegType::FR,
            100,
            Internals {
                stamina: 30,
                speed: 30,
                sharp: 30,
            },
            Externals {
                start: 20,
                corner: 20,
                oob: 20,
                competing: 20,
                tenacious: 20,
                spurt: 20,
            },
        );
        let (none, wins0, _) = handicap_band_shift_1r(&player, &pool.horses);
        assert_eq!(wins0, 0);

        for _ in 0..10 {
            player.career_log.push(log_entry(1));
        }
        player.g1_wins = 2;
        let (shift, wins, _) = handicap_band_shift_1r(&player, &pool.horses);
        assert_eq!(wins, 10);
        assert!(shift > none);
        assert!(shift <= 0.18);
    }

    #[test]
    fn test_percentile_bounds() {
        let pool = build(42, 1);
        let weak = Horse::new(
            "W",
            "Weak",
            crate::model::Sex::F,
            LegType::SR,
            100,
            Internals {
                stamina: 5,
                speed: 5,
                sharp: 5,
            },
            Externals {
                start: 8,
                corner: 8,
                oob: 8,
                competing: 8,
                tenacious: 8,
                spurt: 8,
            },
        );
        let pct = player_rating_percentile(&weak, &pool.horses);
        assert!((0.0..=1.0).contains(&pct));
        assert!(pct < 0.2);
        assert_eq!(player_rating_percentile(&weak, &[]), 0.50);
    }
}
