//! The 16-round national race program.
//!
//! Six races per round: five open slots (1R..5R) and a named G1 feature.
//! Course codes and surfaces are filled in by `surfaces::enrich_schedule`.

use crate::model::{Slot, Surface};

/// Rounds in a full program cycle.
pub const ROUNDS: u32 = 16;
/// Races per round.
pub const RACES_PER_ROUND: usize = 6;

/// Static description of one scheduled race.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceMeta {
    pub round_num: u32,
    pub slot: Slot,
    pub track: &'static str,
    pub distance: u32,
    pub winner_purse: i64,
    pub name: Option<&'static str>,
    pub course_code: &'static str,
    pub surface: Surface,
}

impl RaceMeta {
    fn open(round_num: u32, slot: Slot, track: &'static str, distance: u32, purse: i64) -> Self {
        Self {
            round_num,
            slot,
            track,
            distance,
            winner_purse: purse,
            name: None,
            course_code: "",
            surface: Surface::Turf,
        }
    }

    fn g1(round_num: u32, track: &'static str, distance: u32, purse: i64, name: &'static str) -> Self {
        Self {
            name: Some(name),
            ..Self::open(round_num, Slot::G1, track, distance, purse)
        }
    }

    /// "G1 Winter Stakes | Eastern City 1600m TURF" style header.
    pub fn title(&self) -> String {
        let nm = self.name.unwrap_or("");
        format!(
            "{} {} | {} {}m {}",
            self.slot, nm, self.track, self.distance, self.surface
        )
        .replace("  ", " ")
    }

    /// Display name, falling back to "slot track" for unnamed races.
    pub fn display_name(&self) -> String {
        match self.name {
            Some(n) => n.to_string(),
            None => format!("{} {}", self.slot, self.track),
        }
    }
}

/// Track-name to course-code mapping.
pub fn track_code(track: &str) -> &'static str {
    match track {
        "Central City" => "CC",
        "Eastern City" => "EC",
        "Northern Park" => "NP",
        "Southern Park" => "SP",
        "Western Hills" | "Western Hill" => "WH",
        "Sega" => "SEGA",
        _ => "",
    }
}

/// The base schedule, before course-code/surface enrichment.
pub fn base_schedule() -> Vec<Vec<RaceMeta>> {
    use Slot::*;
    let r = RaceMeta::open;
    let g1 = RaceMeta::g1;
    vec![
        vec![
            r(1, R1, "Central City", 1200, 100_000),
            r(1, R2, "Eastern City", 1600, 200_000),
            r(1, R3, "Central City", 1400, 500_000),
            r(1, R4, "Eastern City", 2000, 200_000),
            r(1, R5, "Central City", 3000, 200_000),
            g1(1, "Eastern City", 1600, 940_000, "Winter Stakes"),
        ],
        vec![
            r(2, R1, "Northern Park", 1800, 100_000),
            r(2, R2, "Southern Park", 2000, 200_000),
            r(2, R3, "Northern Park", 1600, 500_000),
            r(2, R4, "Southern Park", 1700, 200_000),
            r(2, R5, "Northern Park", 2500, 200_000),
            g1(2, "Southern Park", 1200, 940_000, "Sprinters Trophy"),
        ],
        vec![
            r(3, R1, "Northern Park", 1600, 100_000),
            r(3, R2, "Western Hills", 1200, 200_000),
            r(3, R3, "Northern Park", 1800, 500_000),
            r(3, R4, "Western Hills", 2200, 200_000),
            r(3, R5, "Northern Park", 1800, 200_000),
            g1(3, "Western Hills", 1600, 890_000, "DOC 1000 Guineas"),
        ],
        vec![
            r(4, R1, "Central City", 1200, 100_000),
            r(4, R2, "Northern Park", 2500, 200_000),
            r(4, R3, "Central City", 2200, 500_000),
            r(4, R4, "Northern Park", 1800, 200_000),
            r(4, R5, "Central City", 3000, 200_000),
            g1(4, "Northern Park", 2000, 970_000, "DOC 2000 Guineas"),
        ],
        vec![
            r(5, R1, "Eastern City", 1600, 100_000),
            r(5, R2, "Central City", 3000, 200_000),
            r(5, R3, "Eastern City", 2100, 500_000),
            r(5, R4, "Central City", 1600, 200_000),
            r(5, R5, "Eastern City", 1600, 200_000),
            g1(5, "Central City", 3200, 1_320_000, "Spring Classic"),
        ],
        vec![
            r(6, R1, "Southern Park", 1800, 100_000),
            r(6, R2, "Eastern City", 2400, 200_000),
            r(6, R3, "Southern Park", 1700, 500_000),
            r(6, R4, "Eastern City", 1400, 200_000),
            r(6, R5, "Southern Park", 1200, 200_000),
            g1(6, "Eastern City", 2400, 940_000, "American Oaks"),
        ],
        vec![
            r(7, R1, "Southern Park", 1800, 100_000),
            r(7, R2, "Eastern City", 2400, 200_000),
            r(7, R3, "Southern Park", 1700, 500_000),
            r(7, R4, "Eastern City", 1400, 200_000),
            r(7, R5, "Southern Park", 1200, 200_000),
            g1(7, "Eastern City", 2400, 920_000, "American Derby"),
        ],
        vec![
            r(8, R1, "Northern Park", 1600, 100_000),
            r(8, R2, "Western Hills", 1400, 200_000),
            r(8, R3, "Northern Park", 1800, 500_000),
            r(8, R4, "Western Hills", 2000, 200_000),
            r(8, R5, "Northern Park", 2500, 200_000),
            g1(8, "Western Hills", 2200, 1_320_000, "Summer Grand Prix"),
        ],
        vec![
            r(9, R1, "Sega", 1600, 100_000),
            r(9, R2, "Sega", 2400, 200_000),
            r(9, R3, "Sega", 1800, 500_000),
            r(9, R4, "Sega", 1400, 200_000),
            r(9, R5, "Sega", 1800, 200_000),
            g1(9, "Sega", 2000, 1_300_000, "Super Dirt Grand Prix"),
        ],
        vec![
            r(10, R1, "Western Hill", 1200, 100_000),
            r(10, R2, "Northern Park", 2500, 200_000),
            r(10, R3, "Western Hill", 1400, 500_000),
            r(10, R4, "Northern Park", 1200, 200_000),
            r(10, R5, "Western Hill", 2000, 200_000),
            g1(10, "Northern Park", 1200, 940_000, "Sprinters Stakes"),
        ],
        vec![
            r(11, R1, "Western Hill", 2000, 100_000),
            r(11, R2, "Central City", 1600, 200_000),
            r(11, R3, "Western Hill", 2000, 500_000),
            r(11, R4, "Central City", 1200, 200_000),
            r(11, R5, "Western Hill", 2200, 200_000),
            g1(11, "Central City", 3000, 1_120_000, "Stayers Stakes"),
        ],
        vec![
            r(12, R1, "Southern Park", 2000, 100_000),
            r(12, R2, "Central City", 1400, 200_000),
            r(12, R3, "Southern Park", 1700, 500_000),
            r(12, R4, "Central City", 2000, 200_000),
            r(12, R5, "Southern Park", 1200, 200_000),
            g1(12, "Central City", 2000, 1_000_000, "Queen Elizabeth Cup"),
        ],
        vec![
            r(13, R1, "Eastern City", 2000, 100_000),
            r(13, R2, "Central City", 1600, 200_000),
            r(13, R3, "Eastern City", 1600, 500_000),
            r(13, R4, "Central City", 2000, 200_000),
            r(13, R5, "Eastern City", 2400, 200_000),
            g1(13, "Central City", 1600, 940_000, "Mile Championship"),
        ],
        vec![
            r(14, R1, "Western Hill", 1200, 100_000),
            r(14, R2, "Eastern City", 1600, 200_000),
            r(14, R3, "Western Hill", 2000, 500_000),
            r(14, R4, "Eastern City", 1400, 200_000),
            r(14, R5, "Western Hill", 1600, 200_000),
            g1(14, "Eastern City", 2100, 1_300_000, "Japan Cup Dirt"),
        ],
        vec![
            r(15, R1, "Central City", 1400, 100_000),
            r(15, R2, "Eastern City", 2100, 200_000),
            r(15, R3, "Central City", 3200, 500_000),
            r(15, R4, "Eastern City", 1200, 200_000),
            r(15, R5, "Central City", 1600, 200_000),
            g1(15, "Eastern City", 2400, 2_500_000, "Japan Cup"),
        ],
        vec![
            r(16, R1, "Northern Park", 1800, 100_000),
            r(16, R2, "Eastern City", 2100, 200_000),
            r(16, R3, "Sega", 2000, 500_000),
            r(16, R4, "Sega", 1600, 200_000),
            r(16, R5, "Sega", 1800, 200_000),
            g1(16, "Sega", 2400, 2_000_000, "Derby Owners Cup"),
        ],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_schedule_shape() {
        let sched = base_schedule();
        assert_eq!(sched.len(), ROUNDS as usize);
        for (i, round) in sched.iter().enumerate() {
            assert_eq!(round.len(), RACES_PER_ROUND);
            let slots: Vec<Slot> = round.iter().map(|r| r.slot).collect();
            assert_eq!(slots, Slot::iter().collect::<Vec<_>>());
            for race in round {
                assert_eq!(race.round_num, i as u32 + 1);
                assert!(race.distance >= 1200 && race.distance <= 3200);
                assert!(race.winner_purse >= 100_000);
            }
            // Exactly the feature race carries a name.
            assert!(round[5].name.is_some());
            assert!(round[..5].iter().all(|r| r.name.is_none()));
        }
    }

    #[test]
    fn test_every_track_has_a_code() {
        for round in base_schedule() {
            for race in round {
                assert!(!track_code(race.track).is_empty(), "no code for {}", race.track);
            }
        }
    }

    #[test]
    fn test_titles() {
        let sched = base_schedule();
        assert_eq!(
            sched[0][5].title(),
            "G1 Winter Stakes | Eastern City 1600m TURF"
        );
        assert_eq!(sched[0][0].display_name(), "1R Central City");
    }
}
