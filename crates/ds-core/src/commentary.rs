//! Commentary: birth notes, on-paper expectations, post-race insights,
//! and retirement poems.
//!
//! Everything here is informational. The expected score mirrors the race
//! engine's modifiers in a simplified, noise-free form so the insights can
//! hint at hidden mismatches (surface, trip, gate, traffic) without
//! revealing the simulation internals.

use ds_rng::{SimRng, sim_key};

use crate::model::{Condition, Horse, LegType, Sex, Surface};
use crate::roster::ParentHorse;
use crate::schedule::RaceMeta;

/// Surface-preference scalar, kept local to the commentary layer.
fn surface_preference_scalar(ac: f64, surface: Surface, condition: Condition) -> f64 {
    let ac = ac.clamp(0.0, 255.0);
    match surface {
        Surface::Turf => {
            let ideal = 128.0;
            let diff = (ac - ideal).abs() / ideal;
            (1.0 - 0.18 * diff).max(0.78)
        }
        Surface::Dirt => {
            let ideal = 255.0;
            let diff = (ac - ideal).abs() / ideal;
            let mut scalar = 1.0 - 0.22 * diff;
            match condition {
                Condition::Heavy => scalar -= 0.04 * diff,
                Condition::Soft => scalar -= 0.015 * diff,
                _ => {}
            }
            scalar.max(0.78)
        }
    }
}

/// Distance-fit scalar: sharp builds fade on long trips, stamina builds
/// lack zip in sprints.
fn distance_profile_scalar(distance: u32, stamina: f64, sharp: f64) -> f64 {
    let d = f64::from(distance);
    let sharpness = sharp - stamina;

    if d >= 2400.0 {
        if sharpness > 10.0 {
            return (1.0 - 0.012 * (sharpness - 10.0)).max(0.85);
        }
    } else if d >= 2000.0 {
        if sharpness > 12.0 {
            return (1.0 - 0.010 * (sharpness - 12.0)).max(0.88);
        }
    } else if d <= 1400.0 {
        let dullness = stamina - sharp;
        if dullness > 10.0 {
            return (1.0 - 0.010 * (dullness - 10.0)).max(0.90);
        }
    }
    1.0
}

/// Deterministic "on paper" score, used for favorite ranks and
/// expectation checks. No noise.
pub fn expected_score(h: &Horse, race: &RaceMeta, condition: Condition, gate: u32) -> f64 {
    let st = f64::from(h.internals.stamina);
    let sp = f64::from(h.internals.speed);
    let sh = f64::from(h.internals.sharp);

    let e = &h.externals;
    let (start, corner, oob, comp, ten, spurt) = (
        f64::from(e.start),
        f64::from(e.corner),
        f64::from(e.oob),
        f64::from(e.competing),
        f64::from(e.tenacious),
        f64::from(e.spurt),
    );

    // Base internal power: speed-forward.
    let ip = 0.46 * sp + 0.30 * st + 0.24 * sh;

    let style = match h.leg {
        LegType::FR => 0.36 * start + 0.26 * corner + 0.14 * comp + 0.10 * ten + 0.14 * spurt,
        LegType::SD => 0.42 * start + 0.16 * oob + 0.18 * corner + 0.10 * comp + 0.14 * spurt,
        LegType::LS => 0.18 * start + 0.18 * oob + 0.14 * corner + 0.14 * comp + 0.36 * spurt,
        _ => 0.20 * start + 0.22 * corner + 0.16 * comp + 0.12 * ten + 0.30 * spurt,
    };
    let style_scalar = 0.84 + (style / 48.0) * 0.22;

    let surface_scalar = surface_preference_scalar(f64::from(h.ac), race.surface, condition);
    let distance_scalar = distance_profile_scalar(race.distance, st, sh);

    let condition_scalar = match condition {
        Condition::Good => 1.00,
        Condition::Soft | Condition::GoodToSoft => 0.985,
        Condition::Heavy => 0.965,
    };

    let g = f64::from(gate.clamp(1, 12));
    let mid = 6.5;
    let gate_scalar = 1.0 - 0.03 * ((g - mid).abs() / mid);

    ip * style_scalar * surface_scalar * distance_scalar * condition_scalar * gate_scalar
}

/// A short stable note announcing the foal. Informational only.
pub fn birth_comment(seed: u64, sex: Sex, sire: &ParentHorse, dam: &ParentHorse) -> String {
    let st = f64::from(sire.stamina + dam.stamina) / 2.0;
    let sp = f64::from(sire.speed + dam.speed) / 2.0;
    let sh = f64::from(sire.sharp + dam.sharp) / 2.0;

    let trait_hint = if st >= sp && st >= sh {
        "Plenty of lungs in the pedigree."
    } else if sp >= st && sp >= sh {
        "Speed runs deep in this family."
    } else {
        "Quick feet and sharper instincts in the bloodline."
    };

    const MALE_LINES: [&str; 4] = [
        "A colt hits the ground with purpose.",
        "A colt arrives, full of swagger.",
        "A colt is born, and the barn gets louder.",
        "A colt steps out like he owns the place.",
    ];
    const FEMALE_LINES: [&str; 4] = [
        "A filly arrives with a steady eye.",
        "A filly is born, light on her feet.",
        "A filly arrives, calm but confident.",
        "A filly steps out and the barn goes quiet.",
    ];

    let mut rng = SimRng::new(sim_key!(seed, "birth", sire.name, dam.name, sex));
    let lines: &[&str] = if sex == Sex::F { &FEMALE_LINES } else { &MALE_LINES };
    let lead = rng.choose(lines).copied().unwrap_or("A foal is born.");
    format!("Stable note: {lead} {trait_hint}")
}

/// Inputs for the post-race insight check.
pub struct InsightContext {
    pub expected_rank: u32,
    pub actual_pos: u32,
    pub gate: u32,
}

/// Post-race trainer comments hinting at hidden modifiers.
///
/// Triggers when the horse underperformed its on-paper rank, or finished
/// mid-pack with a strong surface/distance mismatch. Returns at most one
/// line: the strongest reason wins.
pub fn race_insight_lines(
    seed: u64,
    horse: &Horse,
    race: &RaceMeta,
    condition: Condition,
    ctx: &InsightContext,
) -> Vec<String> {
    let underperformed = ctx.actual_pos as i32 - ctx.expected_rank as i32 >= 2
        || (ctx.expected_rank <= 4 && ctx.actual_pos >= 6);

    let ac = f64::from(horse.ac);
    let st = f64::from(horse.internals.stamina);
    let sh = f64::from(horse.internals.sharp);
    let sharpness = sh - st;

    let oob = f64::from(horse.externals.oob);
    let ten = f64::from(horse.externals.tenacious);
    let start = f64::from(horse.externals.start);

    let surf_scalar = surface_preference_scalar(ac, race.surface, condition);
    let dist_scalar = distance_profile_scalar(race.distance, st, sh);

    let mismatch_trigger = ctx.actual_pos >= 5 && (surf_scalar <= 0.93 || dist_scalar <= 0.95);
    if !(underperformed || mismatch_trigger) {
        return Vec::new();
    }

    let race_name = race.display_name();
    let pick = |label: &str, lines: &[String]| -> String {
        let mut rng = SimRng::new(sim_key!(seed, label, horse.id, race_name));
        rng.choose(lines).cloned().unwrap_or_default()
    };

    let pref_surface = if ac >= 200.0 {
        Some(Surface::Dirt)
    } else if ac <= 160.0 {
        Some(Surface::Turf)
    } else {
        None
    };
    let surf_name = if race.surface == Surface::Dirt { "dirt" } else { "turf" };

    let mut reasons: Vec<(f64, String)> = Vec::new();

    // Surface mismatch.
    if let Some(pref) = pref_surface {
        if pref != race.surface && surf_scalar <= 0.93 {
            let want = if pref == Surface::Dirt { "dirt" } else { "turf" };
            let lines = [
                format!("Trainer's note: That looked like a {want} runner on {surf_name}."),
                format!("Track talk: Surface matters; {want} types can struggle on {surf_name}."),
            ];
            reasons.push((1.00 + (0.93 - surf_scalar) * 2.0, pick("c_surf", &lines)));
        }
    }

    // Heavy or soft going (skip if already surface-mismatched enough).
    if condition != Condition::Good && surf_scalar <= 0.96 {
        let prose = condition.prose();
        let lines = [
            format!("The going was deep; {prose} {surf_name} can punish the wrong type."),
            format!("Not a clean trip in that footing. A {prose} track can sap a runner."),
        ];
        reasons.push((0.70 + (1.0 - surf_scalar) * 1.0, pick("c_going", &lines)));
    }

    // Sharp types over a stamina trip.
    if race.distance >= 2400 && sharpness > 8.0 && dist_scalar < 0.98 {
        let lines = [
            "That was a stamina course; sharp types can fade when the trip stretches.".to_string(),
            "Long trip, sharp build. More stamina (or a shorter race) usually helps.".to_string(),
        ];
        reasons.push((0.90 + (0.98 - dist_scalar) * 3.0, pick("c_trip", &lines)));
    }

    // Stayers in a sprint.
    if race.distance <= 1400 && (st - sh) > 10.0 && dist_scalar < 0.98 {
        let lines = [
            "Too sharp a sprint for a stayer; needed more early zip.".to_string(),
            "Short trip, big lungs. Sprinters get first run here.".to_string(),
        ];
        reasons.push((0.80 + (0.98 - dist_scalar) * 3.0, pick("c_sprint", &lines)));
    }

    // Wide gate trouble.
    if ctx.gate >= 11 && ctx.actual_pos >= 7 {
        let lines = [
            format!("Bad draw: gate {} can force a wide trip.", ctx.gate),
            format!("Gate {} meant extra ground; hard to make it up.", ctx.gate),
        ];
        reasons.push((0.55, pick("c_gate", &lines)));
    }

    // Closer traffic.
    if horse.leg.is_closer() && oob <= 18.0 && ctx.actual_pos >= 7 {
        let lines = [
            "Traffic trouble: needed more Out of the Box to find daylight.".to_string(),
            "Got bottled up; Out of the Box helps you cut through the pack.".to_string(),
        ];
        reasons.push((0.75, pick("c_traffic", &lines)));
    }

    // Front-runner fades.
    if horse.leg == LegType::FR {
        if ten <= 18.0 && race.distance >= 1800 {
            let lines = [
                "Went forward early, but the finish asked for more Tenacious.".to_string(),
                "Led them up, and then the long run home bit back. Tenacious helps you hold."
                    .to_string(),
            ];
            reasons.push((0.60, pick("c_fade", &lines)));
        }
        if start <= 16.0 {
            let lines = [
                "Slow away from the gate; Start matters when you're meant to go forward."
                    .to_string(),
                "Missed the jump. A front-runner wants a cleaner break.".to_string(),
            ];
            reasons.push((0.55, pick("c_break", &lines)));
        }
    }

    if reasons.is_empty() {
        let lines = [
            "Didn't find a rhythm today; sometimes it's just not their day.".to_string(),
            "That one never got comfortable. Keep tuning the build and try again.".to_string(),
            "A puzzling run; might have been the trip, might have been the day.".to_string(),
        ];
        return vec![pick("c_generic", &lines)];
    }

    reasons.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    vec![reasons[0].1.clone()]
}

/// Career tiers for the retirement poem.
fn career_tier(earnings: i64, races: u32, g1_wins: i32) -> &'static str {
    if g1_wins >= 3 || earnings >= 5_000_000 {
        "legend"
    } else if g1_wins >= 1 || earnings >= 1_500_000 {
        "star"
    } else if earnings >= 250_000 || races >= 10 {
        "fighter"
    } else {
        "quiet"
    }
}

/// A DOC-inspired retirement poem, tiered by career results.
pub fn retirement_poem_lines(seed: u64, horse: &Horse, earnings: i64, races: u32) -> Vec<String> {
    let g1 = horse.g1_wins;
    let tier = career_tier(earnings, races, g1);

    let legend: [&[&str]; 2] = [
        &[
            "A champion steps away from the rail,",
            "and the crowd finally exhales.",
            "From gate to wire, you answered every call;",
            "the clock remembers your name.",
            "Rest now. The field will chase your echo.",
            "Tomorrow, a new hope is born.",
        ],
        &[
            "The banners come down slowly,",
            "but the story stays.",
            "You ran with steel in your stride,",
            "and left the track a little quieter behind you.",
            "Hold your head high in the paddock of legends.",
            "The next generation is watching.",
        ],
    ];
    let star: [&[&str]; 2] = [
        &[
            "Not every career is a crown;",
            "some are a steady flame.",
            "You found big moments under bright lights,",
            "and proved you belonged.",
            "Walk out proud. The barn knows what you did.",
        ],
        &[
            "A good horse leaves a mark",
            "without needing a statue.",
            "You showed heart when it counted,",
            "and taught the stable to believe.",
            "Retire with respect, and a full feed tub.",
        ],
    ];
    let fighter: [&[&str]; 2] = [
        &[
            "Some horses win by inches,",
            "some by stubborn will.",
            "You kept showing up,",
            "and that matters.",
            "Rest those legs; your work is done.",
        ],
        &[
            "No easy roads,",
            "no easy fields.",
            "But you fought for every length,",
            "and earned your keep.",
            "That's a career worth saluting.",
        ],
    ];
    let quiet: [&[&str]; 2] = [
        &[
            "The track doesn't love everyone loudly,",
            "but it remembers the honest ones.",
            "You tried. You learned. You ran.",
            "That's enough for a good ending.",
            "Rest now; your next chapter is quieter.",
        ],
        &[
            "Not every dream ends in a trophy,",
            "but every run writes a line.",
            "Thank you for the miles.",
            "Thank you for the effort.",
            "Time to come home.",
        ],
    ];

    let bank: [&[&str]; 2] = match tier {
        "legend" => legend,
        "star" => star,
        "fighter" => fighter,
        _ => quiet,
    };

    let mut rng = SimRng::new(sim_key!(seed, "retire", horse.id, horse.name, tier));
    let poem = rng.choose(&bank).copied().unwrap_or(bank[0]);

    let mut out: Vec<String> = poem.iter().map(|l| l.to_string()).collect();
    let money = crate::economy::format_money(earnings);
    if g1 > 0 {
        let s = if g1 != 1 { "s" } else { "" };
        out.push(format!("({g1} G1 win{s} | ${money} earned)"));
    } else {
        let s = if races != 1 { "s" } else { "" };
        out.push(format!("(${money} earned | {races} race{s})"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Externals, Internals, Slot};

    fn race(distance: u32, surface: Surface) -> RaceMeta {
        RaceMeta {
            round_num: 2,
            slot: Slot::R4,
            track: "Southern Park",
            distance,
            winner_purse: 200_000,
            name: None,
            course_code: "SP",
            surface,
        }
    }

    fn horse(leg: LegType, ac: i32, st: i32, sh: i32) -> Horse {
        Horse::new(
            "PLAYER-001",
            "Moody Filly",
            Sex::F,
            leg,
            ac,
            Internals {
                stamina: st,
                speed: 30,
                sharp: sh,
            },
            Externals {
                start: 20,
                corner: 20,
                oob: 20,
                competing: 20,
                tenacious: 20,
                spurt: 20,
            },
        )
    }

    #[test]
    fn test_expected_score_prefers_good_going() {
        let h = horse(LegType::AL, 128, 30, 30);
        let r = race(1600, Surface::Turf);
        let good = expected_score(&h, &r, Condition::Good, 6);
        let heavy = expected_score(&h, &r, Condition::Heavy, 6);
        assert!(good > heavy);
    }

    #[test]
    fn test_expected_score_gate_penalty_is_mild() {
        let h = horse(LegType::AL, 128, 30, 30);
        let r = race(1600, Surface::Turf);
        let inside = expected_score(&h, &r, Condition::Good, 6);
        let wide = expected_score(&h, &r, Condition::Good, 12);
        assert!(wide < inside);
        assert!(wide > inside * 0.95);
    }

    #[test]
    fn test_birth_comment_deterministic_and_sexed() {
        let sire = ParentHorse {
            name: "Sire".into(),
            stamina: 46,
            speed: 30,
            sharp: 30,
            ac: 100,
            start: 10,
            corner: 10,
            oob: 10,
            competing: 10,
            tenacious: 10,
            spurt: 10,
        };
        let dam = ParentHorse {
            name: "Dam".into(),
            ..sire.clone()
        };
        let a = birth_comment(42, Sex::F, &sire, &dam);
        let b = birth_comment(42, Sex::F, &sire, &dam);
        assert_eq!(a, b);
        assert!(a.contains("filly"));
        assert!(a.contains("lungs"), "stamina pedigree hint: {a}");
        assert!(birth_comment(42, Sex::M, &sire, &dam).contains("colt"));
    }

    #[test]
    fn test_no_insight_when_run_matches_expectation() {
        let h = horse(LegType::AL, 128, 30, 30);
        let r = race(1600, Surface::Turf);
        let lines = race_insight_lines(
            42,
            &h,
            &r,
            Condition::Good,
            &InsightContext {
                expected_rank: 5,
                actual_pos: 4,
                gate: 6,
            },
        );
        assert!(lines.is_empty());
    }

    #[test]
    fn test_surface_mismatch_insight() {
        // A dirt-max build on turf, well beaten.
        let h = horse(LegType::AL, 255, 30, 30);
        let r = race(1600, Surface::Turf);
        let lines = race_insight_lines(
            42,
            &h,
            &r,
            Condition::Good,
            &InsightContext {
                expected_rank: 3,
                actual_pos: 9,
                gate: 6,
            },
        );
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("dirt"), "{lines:?}");
    }

    #[test]
    fn test_underperformance_always_gets_a_line() {
        let h = horse(LegType::AL, 128, 30, 30);
        let r = race(1600, Surface::Turf);
        let lines = race_insight_lines(
            42,
            &h,
            &r,
            Condition::Good,
            &InsightContext {
                expected_rank: 1,
                actual_pos: 8,
                gate: 6,
            },
        );
        assert_eq!(lines.len(), 1);
        assert!(!lines[0].is_empty());
    }

    #[test]
    fn test_poem_tiers_and_signature() {
        let mut h = horse(LegType::AL, 128, 30, 30);
        let poem = retirement_poem_lines(42, &h, 100_000, 4);
        assert!(poem.len() >= 5);
        assert!(poem.last().unwrap().contains("$100,000"));

        h.g1_wins = 3;
        let poem = retirement_poem_lines(42, &h, 6_000_000, 40);
        assert!(poem.last().unwrap().contains("3 G1 wins"));
        // Deterministic per seed.
        assert_eq!(poem, retirement_poem_lines(42, &h, 6_000_000, 40));
    }
}
