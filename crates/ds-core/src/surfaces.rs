//! Surface preference, going rolls, and schedule enrichment.
//!
//! AC is a single byte: low values prefer turf, high values dirt. Track
//! condition is rolled deterministically per race and skews by surface:
//! turf runs fastest on GOOD, dirt on SOFT.

use std::collections::HashMap;

use ds_rng::{SimRng, sim_key};

use crate::model::{Condition, Slot, Surface};
use crate::schedule::{RaceMeta, track_code};

/// AC preference category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcCategory {
    Turf,
    Mixed,
    DirtLean,
    DirtMax,
}

pub fn ac_category(ac: i32) -> AcCategory {
    if ac <= 63 {
        AcCategory::Turf
    } else if ac <= 212 {
        AcCategory::Mixed
    } else if ac <= 254 {
        AcCategory::DirtLean
    } else {
        AcCategory::DirtMax
    }
}

/// Fit of an AC value on a surface, roughly in [-0.6, 1.0].
pub fn surface_fit(ac: i32, race_surface: Surface) -> f64 {
    match ac_category(ac) {
        AcCategory::Turf => {
            if race_surface == Surface::Turf {
                0.9
            } else {
                -0.6
            }
        }
        AcCategory::Mixed => 0.2,
        AcCategory::DirtLean => {
            if race_surface == Surface::Dirt {
                0.6
            } else {
                -0.2
            }
        }
        AcCategory::DirtMax => {
            if race_surface == Surface::Dirt {
                1.0
            } else {
                -0.5
            }
        }
    }
}

fn condition_probs(surface: Surface) -> [(Condition, f64); 4] {
    match surface {
        Surface::Turf => [
            (Condition::Good, 0.35),
            (Condition::GoodToSoft, 0.30),
            (Condition::Soft, 0.20),
            (Condition::Heavy, 0.15),
        ],
        Surface::Dirt => [
            (Condition::Soft, 0.35),
            (Condition::Heavy, 0.30),
            (Condition::GoodToSoft, 0.20),
            (Condition::Good, 0.15),
        ],
    }
}

/// Roll the going for one race, keyed to the world race iteration.
pub fn roll_condition(
    global_seed: u64,
    world_iter: u64,
    round_num: u32,
    slot: Slot,
    surface: Surface,
) -> Condition {
    let mut rng = SimRng::new(sim_key!(global_seed, "COND", world_iter, round_num, slot));
    let r = rng.random();
    let probs = condition_probs(surface);
    let mut acc = 0.0;
    for (cond, p) in probs {
        acc += p;
        if r <= acc {
            return cond;
        }
    }
    probs[3].0
}

/// Track-speed scalar for the going; positive means a slightly faster track.
pub fn condition_speed_scalar(surface: Surface, cond: Condition) -> f64 {
    match surface {
        Surface::Turf => match cond {
            Condition::Good => 0.02,
            Condition::GoodToSoft => 0.00,
            Condition::Soft => -0.01,
            Condition::Heavy => -0.03,
        },
        Surface::Dirt => match cond {
            Condition::Soft => 0.02,
            Condition::Heavy => 0.01,
            Condition::GoodToSoft => 0.00,
            Condition::Good => -0.02,
        },
    }
}

/// Per-(course, distance) surfaces observed in the default record set.
pub type RecordSurfaces = HashMap<(String, u32), Vec<Surface>>;

/// Explicit (round, slot) surface overrides.
pub type SurfaceOverrides = HashMap<(u32, Slot), Surface>;

/// The community-schedule dirt G1s.
pub fn default_surface_overrides() -> SurfaceOverrides {
    HashMap::from([
        ((1, Slot::G1), Surface::Dirt),
        ((9, Slot::G1), Surface::Dirt),
        ((14, Slot::G1), Surface::Dirt),
    ])
}

fn determine_surface(
    course_code: &str,
    distance: u32,
    name: &str,
    record_surfaces: &RecordSurfaces,
    overrides: &SurfaceOverrides,
    round_num: u32,
    slot: Slot,
) -> Surface {
    if let Some(s) = overrides.get(&(round_num, slot)) {
        return *s;
    }
    if name.to_lowercase().contains("dirt") {
        return Surface::Dirt;
    }
    if let Some(surfaces) = record_surfaces.get(&(course_code.to_string(), distance)) {
        if surfaces.len() == 1 {
            return surfaces[0];
        }
    }
    Surface::Turf
}

/// Fill course codes and surfaces into the base schedule.
pub fn enrich_schedule(
    schedule: Vec<Vec<RaceMeta>>,
    record_surfaces: &RecordSurfaces,
    overrides: &SurfaceOverrides,
) -> Vec<Vec<RaceMeta>> {
    schedule
        .into_iter()
        .map(|round| {
            round
                .into_iter()
                .map(|mut race| {
                    race.course_code = track_code(race.track);
                    race.surface = determine_surface(
                        race.course_code,
                        race.distance,
                        race.name.unwrap_or(""),
                        record_surfaces,
                        overrides,
                        race.round_num,
                        race.slot,
                    );
                    race
                })
                .collect()
        })
        .collect()
}
