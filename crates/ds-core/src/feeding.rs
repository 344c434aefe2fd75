//! Feeding: the food catalog, the post-training offering, and meal
//! effects.
//!
//! Feeding always follows training (even a skipped session). The offering
//! leans on the session grade, biases toward the training's primary
//! stats, and gates the rewards: Draft Beer only appears after a Perfect
//! session, and the genetic specials unlock one per G1 win, guaranteed
//! at the next 1R after the win.

use ds_rng::{SimRng, sim_key};

use crate::model::{
    EXT_MAX, EXT_MIN, ExtDeltas, ExtStat, FeedingResult, Grade, Horse, Slot,
};
use crate::training::diminish;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodTier {
    Basic,
    Standard,
    Premium,
    Special,
}

#[derive(Debug, Clone, Copy)]
pub struct FoodItem {
    pub name: &'static str,
    pub tier: FoodTier,
}

/// A compact nostalgic catalog.
pub const FOODS: [FoodItem; 21] = [
    FoodItem { name: "Vegetable Salad", tier: FoodTier::Standard },
    FoodItem { name: "Camembert Cheese", tier: FoodTier::Premium },
    FoodItem { name: "Chinese Herbal Dumplings (Regular)", tier: FoodTier::Standard },
    FoodItem { name: "Apple", tier: FoodTier::Basic },
    FoodItem { name: "Large Apple", tier: FoodTier::Standard },
    FoodItem { name: "Green Apple", tier: FoodTier::Basic },
    FoodItem { name: "Orange", tier: FoodTier::Basic },
    FoodItem { name: "Large Orange", tier: FoodTier::Standard },
    FoodItem { name: "Carrot", tier: FoodTier::Basic },
    FoodItem { name: "Bunch of Carrots", tier: FoodTier::Standard },
    FoodItem { name: "Fodder", tier: FoodTier::Basic },
    FoodItem { name: "Fodder with Green Tea", tier: FoodTier::Standard },
    FoodItem { name: "Hay Bale Deluxe", tier: FoodTier::Standard },
    FoodItem { name: "Mineral Mix", tier: FoodTier::Standard },
    FoodItem { name: "Cube Sugar", tier: FoodTier::Premium },
    FoodItem { name: "Pudding", tier: FoodTier::Standard },
    FoodItem { name: "Large Pudding", tier: FoodTier::Premium },
    // Nostalgia easter egg, offered only on Perfect training results.
    FoodItem { name: "Draft Beer", tier: FoodTier::Premium },
    // Genetic foods, offered only when unlocked by G1 wins.
    FoodItem { name: "Herbal Dumpling", tier: FoodTier::Special },
    FoodItem { name: "Large Herbal Dumpling", tier: FoodTier::Special },
    FoodItem { name: "Large Korean Ginseng", tier: FoodTier::Special },
];

/// Unlock order of the genetic specials (one per G1 win).
pub const SPECIAL_ORDER: [&str; 3] = [
    "Herbal Dumpling",
    "Large Herbal Dumpling",
    "Large Korean Ginseng",
];

const PERFECT_ONLY: &str = "Draft Beer";

fn tier_of(name: &str) -> FoodTier {
    FOODS
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.tier)
        .unwrap_or(FoodTier::Standard)
}

/// Genetic specials unlocked by the horse's G1 wins.
pub fn unlocked_specials(horse: &Horse) -> Vec<&'static str> {
    let n = horse.g1_wins.clamp(0, 3) as usize;
    SPECIAL_ORDER[..n].to_vec()
}

/// Build the 5-item meal offering for this feeding.
#[allow(clippy::too_many_arguments)]
pub fn build_food_offering(
    global_seed: u64,
    meet_iter: u64,
    round_num: u32,
    slot: Slot,
    grade: Grade,
    primary: &[ExtStat],
    horse: &Horse,
    k: usize,
) -> Vec<String> {
    let mut rng = SimRng::new(sim_key!(global_seed, "FOOD_OFFER", round_num, slot, meet_iter));

    let unlocked = unlocked_specials(horse);
    let gate_ok = |f: &FoodItem| f.name != PERFECT_ONLY || grade == Grade::Perfect;

    let basic: Vec<FoodItem> = FOODS
        .iter()
        .filter(|f| f.tier == FoodTier::Basic && gate_ok(f))
        .copied()
        .collect();
    let standard: Vec<FoodItem> = FOODS
        .iter()
        .filter(|f| f.tier == FoodTier::Standard && gate_ok(f))
        .copied()
        .collect();
    let premium: Vec<FoodItem> = FOODS
        .iter()
        .filter(|f| f.tier == FoodTier::Premium && gate_ok(f))
        .copied()
        .collect();
    let specials: Vec<FoodItem> = FOODS
        .iter()
        .filter(|f| unlocked.contains(&f.name))
        .copied()
        .collect();

    // Grade decides the pool ordering and how many biased picks we take.
    let (mut pool, bias_n): (Vec<FoodItem>, usize) = match grade {
        Grade::Perfect => ([premium.clone(), standard, basic].concat(), 4),
        Grade::Cool | Grade::Great => ([premium.clone(), standard, basic].concat(), 3),
        Grade::Good | Grade::None => ([standard, basic, premium.clone()].concat(), 2),
        Grade::Bad => ([basic, standard, premium.clone()].concat(), 1),
    };
    rng.shuffle(&mut pool);

    let mut chosen: Vec<&'static str> = Vec::new();

    // Perfect training always puts the Draft Beer on the table.
    if grade == Grade::Perfect && premium.iter().any(|f| f.name == PERFECT_ONLY) {
        chosen.push(PERFECT_ONLY);
    }

    // At most one special, to preserve its specialness. A pending G1
    // reward guarantees the best unlocked special at the next 1R.
    let force_special =
        !specials.is_empty() && horse.pending_g1_superfood && slot == Slot::R1;
    if force_special {
        if let Some(best) = specials.iter().max_by_key(|f| {
            SPECIAL_ORDER.iter().position(|n| *n == f.name).unwrap_or(0)
        }) {
            chosen.push(best.name);
        }
    } else if !specials.is_empty() && grade != Grade::Bad {
        let p = match grade {
            Grade::Perfect => 0.60,
            Grade::Cool => 0.50,
            Grade::Great => 0.40,
            _ => 0.30,
        };
        if rng.random() < p {
            if let Some(f) = rng.choose(&specials) {
                chosen.push(f.name);
            }
        }
    }

    // Biased picks: foods that "fit" the training's primaries by simple
    // name heuristics.
    let has = |stat: ExtStat| primary.contains(&stat);
    let mut remaining: Vec<(&'static str, f64)> = pool
        .iter()
        .filter(|f| !chosen.contains(&f.name))
        .map(|f| {
            let n = f.name.to_lowercase();
            let mut score = 0.0;
            if n.contains("carrot") && (has(ExtStat::Start) || has(ExtStat::Oob)) {
                score += 2.0;
            }
            if n.contains("apple") && has(ExtStat::Spurt) {
                score += 1.0;
            }
            if n.contains("dumpling") && (has(ExtStat::Tenacious) || has(ExtStat::Competing)) {
                score += 1.5;
            }
            if n.contains("cheese") && (has(ExtStat::Competing) || has(ExtStat::Tenacious)) {
                score += 1.0;
            }
            if n.contains("mineral") && (has(ExtStat::Corner) || has(ExtStat::Tenacious)) {
                score += 1.0;
            }
            (f.name, score + rng.random() * 0.05)
        })
        .collect();
    remaining.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    for (name, _) in remaining.iter().take(bias_n) {
        if !chosen.contains(name) {
            chosen.push(name);
        }
    }

    // Fill the rest at random.
    let mut fill: Vec<&'static str> = pool
        .iter()
        .map(|f| f.name)
        .filter(|n| !chosen.contains(n))
        .collect();
    rng.shuffle(&mut fill);
    for name in fill {
        if chosen.len() >= k {
            break;
        }
        chosen.push(name);
    }

    chosen.truncate(k);
    chosen.into_iter().map(str::to_string).collect()
}

/// Per-horse deterministic food preference multiplier.
fn preference_multiplier(horse: &Horse, food: &str) -> f64 {
    // Keyed off stable horse identity rather than the player id, which is
    // always "PLAYER-001".
    let mut pref_rng = SimRng::new(sim_key!(
        0u64,
        "FOOD_PREF",
        horse.name,
        horse.sex,
        horse.ac,
        food
    ));
    let r = pref_rng.random();
    if r < 0.15 {
        0.7 // hates
    } else if r < 0.55 {
        1.0 // neutral
    } else if r < 0.85 {
        1.2 // likes
    } else {
        1.4 // loves
    }
}

/// Compute realized stat deltas for eating `chosen_food`, without applying.
#[allow(clippy::too_many_arguments)]
fn compute_food_deltas(
    global_seed: u64,
    meet_iter: u64,
    round_num: u32,
    slot: Slot,
    grade: Grade,
    primary: &[ExtStat],
    secondary: &[ExtStat],
    horse: &Horse,
    chosen_food: &str,
) -> ExtDeltas {
    let mut rng = SimRng::new(sim_key!(
        global_seed,
        "FOOD_DELTA",
        meet_iter,
        round_num,
        slot,
        chosen_food
    ));

    let sec_targets: &[ExtStat] = if primary == secondary { &[] } else { secondary };

    let is_beer = chosen_food == PERFECT_ONLY;
    let is_special = SPECIAL_ORDER.contains(&chosen_food);
    let tier = tier_of(chosen_food);

    let pref_mult = preference_multiplier(horse, chosen_food);

    // Bad training can sour the meal, but reward foods never punish.
    let effective_grade = if grade == Grade::Bad && (is_beer || is_special) {
        Grade::Good
    } else {
        grade
    };

    let base_budget: i64 = if effective_grade == Grade::Bad {
        // Volatile, often negative; premium softens the downside.
        let (lo, hi) = match tier {
            FoodTier::Basic => (-3, 0),
            FoodTier::Premium => (-2, 2),
            _ => (-3, 1),
        };
        rng.randint(lo, hi)
    } else if is_special {
        let (lo, hi) = match chosen_food {
            "Herbal Dumpling" => (3, 5),
            "Large Herbal Dumpling" => (4, 6),
            "Large Korean Ginseng" => (5, 7),
            _ => (3, 6),
        };
        rng.randint(lo, hi)
    } else if is_beer {
        // "Perfect + Draft Beer" should feel like a premium reward.
        let (lo, hi) = if grade == Grade::Perfect { (4, 7) } else { (3, 6) };
        rng.randint(lo, hi)
    } else {
        let (lo, hi) = match tier {
            FoodTier::Basic => (1, 2),
            FoodTier::Standard => (1, 3),
            FoodTier::Premium => (2, 4),
            FoodTier::Special => (3, 6),
        };
        rng.randint(lo, hi)
    };

    let budget = (base_budget as f64 * pref_mult) as i64;
    if budget == 0 {
        return ExtDeltas::new();
    }

    // Simulate within this feeding so diminishing/clamping see the
    // intermediate values.
    let mut temp = horse.externals;
    let mut deltas = ExtDeltas::new();
    let mut sim_apply = |stat: ExtStat, raw: i32, temp: &mut crate::model::Externals| {
        let cur = temp.get(stat);
        let d = diminish(cur, raw);
        let new = (cur + d).clamp(EXT_MIN, EXT_MAX);
        let applied = new - cur;
        temp.set(stat, new);
        if applied != 0 {
            *deltas.entry(stat).or_insert(0) += applied;
        }
    };

    // Weighted target bag: primaries dominate.
    let mut bag: Vec<ExtStat> = Vec::new();
    for s in primary {
        bag.extend(std::iter::repeat_n(*s, 4));
    }
    for s in sec_targets {
        bag.extend(std::iter::repeat_n(*s, 2));
    }
    if bag.is_empty() {
        bag = ExtStat::ALL.to_vec();
    }
    let target_set: Vec<ExtStat> = {
        let mut v = bag.clone();
        v.sort();
        v.dedup();
        v
    };

    let p2 = match (is_beer, tier) {
        (true, _) => 0.45,
        (_, FoodTier::Basic) => 0.15,
        (_, FoodTier::Standard) => 0.25,
        (_, FoodTier::Premium) => 0.35,
        (_, FoodTier::Special) => 0.40,
    };

    let sign: i32 = if budget > 0 { 1 } else { -1 };
    let mut remaining = budget.abs();
    while remaining > 0 {
        let Some(stat) = rng.choose(&bag).copied() else {
            break;
        };
        let cur = temp.get(stat);
        // Force 2-point packets once diminishing is active so the budget
        // is actually spent.
        let packet: i64 = if remaining >= 2 && (cur >= 42 || rng.random() < p2) {
            2
        } else {
            1
        };
        sim_apply(stat, sign * packet as i32, &mut temp);
        remaining -= packet;
    }

    // Spillover to a non-target stat.
    let others: Vec<ExtStat> = ExtStat::ALL
        .iter()
        .copied()
        .filter(|s| !target_set.contains(s))
        .collect();
    if !others.is_empty() {
        let rich = is_beer || is_special || tier == FoodTier::Premium;
        let (p_other, extra) = if rich {
            (0.55, if rng.random() < 0.33 { 2 } else { 1 })
        } else {
            (0.30, 1)
        };
        if rng.random() < p_other {
            if let Some(stat) = rng.choose(&others).copied() {
                sim_apply(stat, sign * extra, &mut temp);
            }
        }
    }

    deltas
}

/// Feed the chosen meal: apply deltas, grant genetic tokens for specials.
#[allow(clippy::too_many_arguments)]
pub fn apply_feeding(
    global_seed: u64,
    meet_iter: u64,
    round_num: u32,
    slot: Slot,
    grade: Grade,
    primary: &[ExtStat],
    secondary: &[ExtStat],
    horse: &mut Horse,
    chosen_food: &str,
) -> FeedingResult {
    let deltas = compute_food_deltas(
        global_seed,
        meet_iter,
        round_num,
        slot,
        grade,
        primary,
        secondary,
        horse,
        chosen_food,
    );
    for (stat, d) in &deltas {
        let cur = horse.externals.get(*stat);
        horse.externals.set(*stat, (cur + d).clamp(EXT_MIN, EXT_MAX));
    }

    let mut notes = String::new();
    if SPECIAL_ORDER.contains(&chosen_food) {
        // Genetic foods improve future breeding outcomes when this horse
        // is later picked as a retired parent.
        horse.genetic_tokens += 1;
        notes = "Special genetic food consumed. (+1 genetic token)".to_string();
    }

    FeedingResult {
        grade_context: grade,
        foods_offered: Vec::new(),
        chosen: chosen_food.to_string(),
        deltas,
        notes,
    }
}
