//! Gambling Chance: pick-the-winner round for players short of the G1
//! earnings gate.
//!
//! Win probabilities come from a softmax over noisy strength estimates;
//! the posted odds carry a house edge, and payouts round to betting
//! units.

use std::collections::HashMap;

use ds_rng::{SimRng, sim_key};

use crate::economy::round_to_unit;
use crate::engine::base_score;
use crate::model::{Condition, Horse, Slot, Surface};

pub const DEFAULT_STAKE: i64 = 25_000;
pub const HOUSE_EDGE: f64 = 0.15;
const SOFTMAX_TEMP: f64 = 12.0;
const ROUND_UNIT: i64 = 10_000;

#[derive(Debug, Clone)]
pub struct GamblingChanceResult {
    pub picked_horse_id: String,
    pub winner_horse_id: String,
    pub won: bool,
    pub payout: i64,
    pub odds_by_horse: HashMap<String, f64>,
}

fn softmax(scores: &[f64], temp: f64) -> Vec<f64> {
    let mx = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| ((s - mx) / temp).exp()).collect();
    let z: f64 = exps.iter().sum();
    exps.iter().map(|e| e / z).collect()
}

/// Run one Gambling Chance round over the CPU field.
pub fn run_gambling_chance(
    global_seed: u64,
    meet_iter: u64,
    round_num: u32,
    slot: Slot,
    cpu_field: &[Horse],
    picked_horse_id: &str,
) -> GamblingChanceResult {
    let mut rng = SimRng::new(sim_key!(global_seed, "GAMBLE", round_num, slot, meet_iter));

    let ids: Vec<&str> = cpu_field.iter().map(|h| h.id.as_str()).collect();
    let raw: Vec<f64> = cpu_field
        .iter()
        .map(|h| {
            base_score(h, 1600, Surface::Turf, Condition::Good)
                + rng.gauss(0.0, 2.0)
                + rng.gauss(0.0, 1.0)
        })
        .collect();
    let ps = softmax(&raw, SOFTMAX_TEMP);

    let odds_by_horse: HashMap<String, f64> = ids
        .iter()
        .zip(&ps)
        .map(|(id, p)| (id.to_string(), (1.0 / p.max(1e-6)) * (1.0 - HOUSE_EDGE)))
        .collect();

    // Sample the winner from the same probabilities the odds came from.
    let r = rng.random();
    let mut acc = 0.0;
    let mut winner = *ids.last().unwrap_or(&"");
    for (id, p) in ids.iter().zip(&ps) {
        acc += p;
        if r <= acc {
            winner = id;
            break;
        }
    }

    let won = picked_horse_id == winner;
    let payout = if won {
        round_to_unit(
            DEFAULT_STAKE as f64 * odds_by_horse.get(picked_horse_id).copied().unwrap_or(0.0),
            ROUND_UNIT,
        )
    } else {
        0
    };

    GamblingChanceResult {
        picked_horse_id: picked_horse_id.to_string(),
        winner_horse_id: winner.to_string(),
        won,
        payout,
        odds_by_horse,
    }
}
