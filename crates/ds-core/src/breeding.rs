//! Breeding: internals, AC, birth externals, and leg-type derivation.
//!
//! Externals are bred on the racing scale (8..=48) from parents on the
//! breeder scale (0..=16). The sum of a foal's externals is capped; the
//! cap loosens slightly when the parents carry genetic tokens.

use ds_rng::SimRng;

use crate::model::{EXT_MAX, EXT_MIN, ExtStat, Externals, Internals, LegType};
use crate::roster::ParentHorse;

const GAMMA: f64 = 1.6;
const NOISE_SD: f64 = 2.2;
const ANOMALY_P: f64 = 0.035;
const ANOMALY_MAG: f64 = 14.0;

/// Birth parameters. Defaults match the standard market breeding.
#[derive(Debug, Clone, Copy)]
pub struct BirthSpec {
    /// Cap on the sum of the six bred externals (before token bonus).
    pub cap_sum: i32,
    pub sire_tokens: i32,
    pub dam_tokens: i32,
}

impl Default for BirthSpec {
    fn default() -> Self {
        Self {
            cap_sum: 160,
            sire_tokens: 0,
            dam_tokens: 0,
        }
    }
}

pub fn floor_avg(a: i32, b: i32) -> i32 {
    (a + b).div_euclid(2)
}

/// Internals are the floor-average of the parents, stat by stat.
pub fn breed_internals(sire: &ParentHorse, dam: &ParentHorse) -> Internals {
    Internals {
        stamina: floor_avg(sire.stamina, dam.stamina),
        speed: floor_avg(sire.speed, dam.speed),
        sharp: floor_avg(sire.sharp, dam.sharp),
    }
}

/// AC blends the parents with a wide gaussian, clamped to the byte range.
pub fn breed_ac(sire: &ParentHorse, dam: &ParentHorse, rng: &mut SimRng) -> i32 {
    let base = (sire.ac + dam.ac) as f64 / 2.0;
    let v = (base + rng.gauss(0.0, 18.0)).round() as i32;
    v.clamp(0, 255)
}

/// Breed the six externals onto the racing scale.
///
/// Per stat: normalize the parent mean (denominator 16 when either parent
/// maxes the stat, else 15), shift by genetic tokens, apply the gamma
/// curve onto 8..=48, add triangular noise, and rarely an anomaly whose
/// positive bias grows with tokens. The summed result is then pushed under
/// the (token-adjusted) cap: first a proportional reduction across stats
/// with room above the floor, then decrement-the-max until within cap.
pub fn birth_externals(
    sire: &ParentHorse,
    dam: &ParentHorse,
    rng: &mut SimRng,
    spec: BirthSpec,
) -> Externals {
    let t_total = (spec.sire_tokens + spec.dam_tokens).max(0);
    let n_shift = 0.03 * f64::from(t_total.min(6));
    let cap_sum = (spec.cap_sum + (4 * t_total).min(20)).min(180);

    let mut out = Externals {
        start: EXT_MIN,
        corner: EXT_MIN,
        oob: EXT_MIN,
        competing: EXT_MIN,
        tenacious: EXT_MIN,
        spurt: EXT_MIN,
    };

    for stat in ExtStat::ALL {
        let a0 = sire.ext(stat).clamp(0, 16);
        let b0 = dam.ext(stat).clamp(0, 16);
        let denom = if a0 == 16 || b0 == 16 { 16.0 } else { 15.0 };
        let mut n = (f64::from(a0 + b0) / 2.0) / denom;
        n = (n + n_shift).clamp(0.0, 1.0);
        let expected = f64::from(EXT_MIN) + f64::from(EXT_MAX - EXT_MIN) * n.powf(GAMMA);

        let mut noise = rng.tri_centered() * NOISE_SD * 2.0;

        if rng.random() < ANOMALY_P {
            let p_pos = (0.50 + 0.05 * f64::from(t_total)).min(0.70);
            let sign = if rng.random() < p_pos { 1.0 } else { -1.0 };
            noise += sign * (rng.random() * ANOMALY_MAG);
        }

        let v = (expected + noise) as i32;
        out.set(stat, v.clamp(EXT_MIN, EXT_MAX));
    }

    // Cap enforcement: proportional cuts over stats above the floor.
    for _ in 0..20 {
        let total = out.sum();
        if total <= cap_sum {
            break;
        }
        let excess = total - cap_sum;
        let reducibles: Vec<(ExtStat, i32)> = ExtStat::ALL
            .iter()
            .filter(|s| out.get(**s) > EXT_MIN)
            .map(|s| (*s, out.get(*s) - EXT_MIN))
            .collect();
        let total_room: i32 = reducibles.iter().map(|(_, room)| room).sum();
        if total_room <= 0 {
            break;
        }
        for (stat, room) in reducibles {
            let cut = ((excess as f64) * (f64::from(room) / f64::from(total_room))).round() as i32;
            if cut <= 0 {
                continue;
            }
            out.set(stat, (out.get(stat) - cut).max(EXT_MIN));
        }
    }

    // Last resort: shave the highest stat one point at a time.
    while out.sum() > cap_sum {
        let Some(kmax) = ExtStat::ALL.iter().copied().max_by_key(|s| out.get(*s)) else {
            break;
        };
        if out.get(kmax) <= EXT_MIN {
            break;
        }
        out.set(kmax, out.get(kmax) - 1);
    }

    out
}

/// Convert an in-career external (8..=48) back to the breeder scale
/// (0..=16).
pub fn racing_to_breeder_scale(v: i32) -> i32 {
    let scaled = ((f64::from(v) - 8.0) / 40.0 * 16.0).round() as i32;
    scaled.clamp(0, 16)
}

/// Build a roster-style parent from a retired race horse.
///
/// Prefers the genetic breeding-card externals stored at birth; older
/// saves without them fall back to converting the trained externals.
pub fn parent_from_retired(horse: &crate::model::Horse) -> ParentHorse {
    let ext = |stat: ExtStat| match &horse.pedigree.breeding_ext {
        Some(be) => be.get(stat).clamp(0, 16),
        None => racing_to_breeder_scale(horse.externals.get(stat)),
    };
    ParentHorse {
        name: horse.name.clone(),
        stamina: horse.internals.stamina,
        speed: horse.internals.speed,
        sharp: horse.internals.sharp,
        ac: horse.ac,
        start: ext(ExtStat::Start),
        corner: ext(ExtStat::Corner),
        oob: ext(ExtStat::Oob),
        competing: ext(ExtStat::Competing),
        tenacious: ext(ExtStat::Tenacious),
        spurt: ext(ExtStat::Spurt),
    }
}

/// Derive the DOC leg type from racing externals (CORNER excluded).
///
/// START ranked against OOB/COMPETING/TENACIOUS/SPURT decides the type;
/// a very flat profile is Almighty.
pub fn derive_leg_type(ext: &Externals) -> LegType {
    const COMPARE: [ExtStat; 5] = [
        ExtStat::Start,
        ExtStat::Oob,
        ExtStat::Competing,
        ExtStat::Tenacious,
        ExtStat::Spurt,
    ];
    let vals: Vec<i32> = COMPARE.iter().map(|s| ext.get(*s)).collect();
    let max = vals.iter().copied().max().unwrap_or(EXT_MIN);
    let min = vals.iter().copied().min().unwrap_or(EXT_MIN);
    if max - min <= 3 {
        return LegType::AL;
    }

    let start = ext.start;
    let greater = COMPARE.iter().filter(|s| ext.get(**s) > start).count();
    match greater {
        0 => LegType::FR,
        1 => LegType::SD,
        2 => LegType::LS,
        _ => LegType::SR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds_rng::sim_key;
    use proptest::prelude::*;

    fn parent(name: &str, internals: (i32, i32, i32), ac: i32, ext: [i32; 6]) -> ParentHorse {
        ParentHorse {
            name: name.to_string(),
            stamina: internals.0,
            speed: internals.1,
            sharp: internals.2,
            ac,
            start: ext[0],
            corner: ext[1],
            oob: ext[2],
            competing: ext[3],
            tenacious: ext[4],
            spurt: ext[5],
        }
    }

    #[test]
    fn test_breed_internals_floor_average() {
        let sire = parent("S", (41, 40, 36), 100, [8; 6]);
        let dam = parent("D", (38, 45, 31), 100, [8; 6]);
        let ints = breed_internals(&sire, &dam);
        assert_eq!(ints.stamina, 39);
        assert_eq!(ints.speed, 42);
        assert_eq!(ints.sharp, 33);
    }

    #[test]
    fn test_breed_ac_in_byte_range() {
        let sire = parent("S", (40, 40, 40), 250, [8; 6]);
        let dam = parent("D", (40, 40, 40), 250, [8; 6]);
        let mut rng = SimRng::new(sim_key!(1u64, "BIRTH", "ac"));
        for _ in 0..200 {
            let ac = breed_ac(&sire, &dam, &mut rng);
            assert!((0..=255).contains(&ac));
        }
    }

    #[test]
    fn test_birth_externals_deterministic() {
        let sire = parent("S", (40, 40, 40), 100, [12, 9, 8, 10, 7, 11]);
        let dam = parent("D", (40, 40, 40), 100, [10, 10, 10, 10, 10, 10]);
        let a = birth_externals(
            &sire,
            &dam,
            &mut SimRng::new(99),
            BirthSpec::default(),
        );
        let b = birth_externals(
            &sire,
            &dam,
            &mut SimRng::new(99),
            BirthSpec::default(),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_leg_type_table() {
        // Spread <= 3 over the compared stats -> Almighty.
        let flat = Externals {
            start: 20,
            corner: 48,
            oob: 21,
            competing: 22,
            tenacious: 20,
            spurt: 23,
        };
        assert_eq!(derive_leg_type(&flat), LegType::AL);

        // START highest -> Front-runner.
        let fr = Externals {
            start: 40,
            corner: 8,
            oob: 20,
            competing: 18,
            tenacious: 16,
            spurt: 22,
        };
        assert_eq!(derive_leg_type(&fr), LegType::FR);

        // One stat above START -> Start Dash.
        let sd = Externals {
            start: 30,
            corner: 8,
            oob: 36,
            competing: 18,
            tenacious: 16,
            spurt: 22,
        };
        assert_eq!(derive_leg_type(&sd), LegType::SD);

        // Two above -> Last Spurt.
        let ls = Externals {
            start: 24,
            corner: 8,
            oob: 36,
            competing: 18,
            tenacious: 16,
            spurt: 30,
        };
        assert_eq!(derive_leg_type(&ls), LegType::LS);

        // Three or more above -> Stretch-runner.
        let sr = Externals {
            start: 12,
            corner: 8,
            oob: 36,
            competing: 20,
            tenacious: 16,
            spurt: 30,
        };
        assert_eq!(derive_leg_type(&sr), LegType::SR);
    }

    #[test]
    fn test_racing_to_breeder_scale() {
        assert_eq!(racing_to_breeder_scale(8), 0);
        assert_eq!(racing_to_breeder_scale(48), 16);
        assert_eq!(racing_to_breeder_scale(28), 8);
    }

    #[test]
    fn test_parent_from_retired_prefers_breeding_card() {
        use crate::model::{BreedingExt, Externals, Horse, Internals, LegType, Sex};
        let mut h = Horse::new(
            "PLAYER-001",
            "Champ",
            Sex::M,
            LegType::FR,
            90,
            Internals {
                stamina: 41,
                speed: 39,
                sharp: 33,
            },
            Externals {
                start: 48,
                corner: 48,
                oob: 48,
                competing: 48,
                tenacious: 48,
                spurt: 48,
            },
        );
        // No card -> conversion from trained externals.
        assert_eq!(parent_from_retired(&h).start, 16);

        h.pedigree.breeding_ext = Some(BreedingExt {
            start: 11,
            corner: 9,
            oob: 10,
            competing: 8,
            tenacious: 7,
            spurt: 12,
        });
        let p = parent_from_retired(&h);
        assert_eq!(p.start, 11);
        assert_eq!(p.spurt, 12);
        assert_eq!(p.stamina, 41);
    }

    proptest! {
        #[test]
        fn prop_birth_externals_respect_range_and_cap(
            seed in 0u64..10_000,
            sire_ext in proptest::array::uniform6(0i32..=16),
            dam_ext in proptest::array::uniform6(0i32..=16),
            sire_tokens in 0i32..=6,
            dam_tokens in 0i32..=6,
        ) {
            let sire = parent("S", (40, 40, 40), 100, sire_ext);
            let dam = parent("D", (40, 40, 40), 100, dam_ext);
            let spec = BirthSpec { cap_sum: 160, sire_tokens, dam_tokens };
            let mut rng = SimRng::new(seed);
            let ext = birth_externals(&sire, &dam, &mut rng, spec);

            for stat in ExtStat::ALL {
                prop_assert!((EXT_MIN..=EXT_MAX).contains(&ext.get(stat)));
            }
            let cap = (160 + (4 * (sire_tokens + dam_tokens)).min(20)).min(180);
            prop_assert!(ext.sum() <= cap);
        }
    }
}
