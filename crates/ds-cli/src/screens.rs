//! Screen rendering: splash, stable card, market table, profile, and the
//! retirement registration card.

use std::io::Write;

use crossterm::{cursor::MoveTo, execute, terminal};

use ds_core::breeding::racing_to_breeder_scale;
use ds_core::economy::format_money;
use ds_core::model::{BreedingExt, ExtDeltas, ExtStat, Horse, IntStat};
use ds_core::roster::ParentHorse;

/// Best-effort terminal clear before the splash/retirement screens.
pub fn clear_screen() {
    let mut stdout = std::io::stdout();
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All), MoveTo(0, 0));
    let _ = stdout.flush();
}

pub fn splash(version: &str) -> String {
    let art = r#"
  ██████╗  ██████╗  ██████╗███████╗██╗███╗   ███╗
  ██╔══██╗██╔═══██╗██╔════╝██╔════╝██║████╗ ████║
  ██║  ██║██║   ██║██║     █████╗  ██║██╔████╔██║
  ██║  ██║██║   ██║██║     ██╔══╝  ██║██║╚██╔╝██║
  ██████╔╝╚██████╔╝╚██████╗███████╗██║██║ ╚═╝ ██║
  ╚═════╝  ╚═════╝  ╚═════╝╚══════╝╚═╝╚═╝     ╚═╝"#;
    format!(
        "{art}\n\n  DOCSim — Derby Owners Club Simulation Program  (v{version})\n  World Edition  |  text-based homage\n  {}\n",
        "=".repeat(54)
    )
}

/// One-line stable card of the six externals, with optional deltas.
pub fn stable_card(horse: &Horse, deltas: Option<&ExtDeltas>) -> String {
    let parts: Vec<String> = ExtStat::ALL
        .iter()
        .map(|stat| {
            let val = horse.externals.get(*stat);
            match deltas.and_then(|d| d.get(stat)).copied().unwrap_or(0) {
                0 => format!("{:<4} {:>2}", stat.label(), val),
                d if d > 0 => format!("{:<4} {:>2} (+{})", stat.label(), val, d),
                d => format!("{:<4} {:>2} ({})", stat.label(), val, d),
            }
        })
        .collect();
    parts.join(" | ")
}

/// Sire/dam market selection table.
pub fn parent_pick_table(parents: &[ParentHorse]) -> String {
    if parents.is_empty() {
        return "(no horses)".to_string();
    }
    let name_w = parents
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(16)
        .clamp(16, 28);

    let header = format!(
        "{:>2}  {:<name_w$}  {:>9}  {:>4}  {:>5} {:>6} {:>4} {:>4} {:>3} {:>5}",
        "#", "Horse", "INT", "AC", "Start", "Corner", "OOB", "Comp", "Ten", "Spurt"
    );
    let mut rows = vec![header.clone(), "-".repeat(header.chars().count())];
    for (i, p) in parents.iter().enumerate() {
        let int_txt = format!("{}/{}/{}", p.stamina, p.speed, p.sharp);
        rows.push(format!(
            "{:>2}  {:<name_w$}  {:>9}  {:>4}  {:>5} {:>6} {:>4} {:>4} {:>3} {:>5}",
            i + 1,
            p.name,
            int_txt,
            p.ac,
            p.start,
            p.corner,
            p.oob,
            p.competing,
            p.tenacious,
            p.spurt
        ));
    }
    rows.join("\n")
}

pub fn parent_summary(p: &ParentHorse) -> String {
    format!(
        "{} | INT {}/{}/{} | AC {} | EXT {},{},{},{},{},{}",
        p.name,
        p.stamina,
        p.speed,
        p.sharp,
        p.ac,
        p.start,
        p.corner,
        p.oob,
        p.competing,
        p.tenacious,
        p.spurt
    )
}

/// Horse profile screen body.
pub fn profile(horse: &Horse, earnings: i64, races_run: u32) -> String {
    let mut lines = vec!["=== Horse Profile ===".to_string()];
    lines.push(format!(
        "Name: {} ({})  Leg Type: {} [{}]  AC: {}",
        horse.name,
        horse.sex,
        horse.leg.label(),
        horse.leg,
        horse.ac
    ));
    lines.push(format!(
        "Earnings: ${} | Races: {races_run}",
        format_money(earnings)
    ));
    lines.push(format!(
        "Internals ST/SP/SH: {}/{}/{}",
        horse.internals.stamina, horse.internals.speed, horse.internals.sharp
    ));
    lines.push(format!(
        "G1 wins: {} | Genetic tokens: {}",
        horse.g1_wins, horse.genetic_tokens
    ));
    lines.push("Externals:".to_string());
    lines.push(stable_card(horse, None));
    if horse.pending_g1_superfood {
        lines.push(
            "Note: A special food is guaranteed at your next 1R feeding (from your last G1 win)."
                .to_string(),
        );
    }
    lines.join("\n")
}

/// Legacy tier for the retirement screen: (symbol, label).
pub fn retirement_tier(earnings: i64, g1_wins: i32) -> (&'static str, &'static str) {
    if g1_wins >= 3 || earnings >= 5_000_000 {
        ("◎", "Legend")
    } else if g1_wins >= 1 || earnings >= 2_500_000 {
        ("○", "Star")
    } else if earnings >= 750_000 {
        ("▲", "Fighter")
    } else {
        ("△", "Quiet")
    }
}

/// Breeder-scale externals for the registration card, with fallbacks for
/// older saves.
pub fn breeding_card_ext(horse: &Horse) -> BreedingExt {
    if let Some(be) = &horse.pedigree.breeding_ext {
        return *be;
    }
    if let (Some(se), Some(de)) = (&horse.pedigree.sire_ext, &horse.pedigree.dam_ext) {
        return BreedingExt {
            start: (se.start + de.start) / 2,
            corner: (se.corner + de.corner) / 2,
            oob: (se.oob + de.oob) / 2,
            competing: (se.competing + de.competing) / 2,
            tenacious: (se.tenacious + de.tenacious) / 2,
            spurt: (se.spurt + de.spurt) / 2,
        };
    }
    BreedingExt {
        start: racing_to_breeder_scale(horse.externals.start),
        corner: racing_to_breeder_scale(horse.externals.corner),
        oob: racing_to_breeder_scale(horse.externals.oob),
        competing: racing_to_breeder_scale(horse.externals.competing),
        tenacious: racing_to_breeder_scale(horse.externals.tenacious),
        spurt: racing_to_breeder_scale(horse.externals.spurt),
    }
}

/// Absolute marker tiering for a breeder-scale (0..=16) stat.
pub fn symbol_for_breeding_value(v: i32) -> &'static str {
    if v >= 12 {
        "◎"
    } else if v >= 9 {
        "○"
    } else if v >= 6 {
        "▲"
    } else {
        "△"
    }
}

/// The Dam/Sire registration card shown at retirement.
pub fn retirement_card(
    horse: &Horse,
    earnings: i64,
    races_run: u32,
    poem: &[String],
) -> String {
    let mut lines = Vec::new();
    lines.push("Dam reg.".to_string());
    lines.push("=".repeat(62));
    lines.push(format!("{} has finished its racing career...", horse.name));
    lines.push("Dam reg. and is".to_string());
    lines.push("now ready to retire to the breeding farm.".to_string());
    lines.push(String::new());

    let (tier_sym, tier_label) = retirement_tier(earnings, horse.g1_wins);
    lines.push(format!("Legacy: {tier_sym} {tier_label}"));
    for line in poem {
        lines.push(line.clone());
    }
    lines.push(String::new());

    let internal_type = match horse.internal_type() {
        IntStat::Stamina => "STAMINA type",
        IntStat::Speed => "SPEED type",
        IntStat::Sharp => "SHARP type",
    };
    lines.push(format!("{internal_type:>54}"));
    lines.push("-".repeat(62));
    lines.push(format!(
        "Earnings: ${}  |  Races: {races_run}  |  G1 wins: {}  |  Tokens: {}",
        format_money(earnings),
        horse.g1_wins,
        horse.genetic_tokens
    ));
    lines.push(format!(
        "Internals ST/SP/SH: {}/{}/{}",
        horse.internals.stamina, horse.internals.speed, horse.internals.sharp
    ));
    lines.push(String::new());
    if horse.pedigree.sire_name.is_some() || horse.pedigree.dam_name.is_some() {
        lines.push(format!(
            "Sire: {}  |  Dam: {}",
            horse.pedigree.sire_name.as_deref().unwrap_or("?"),
            horse.pedigree.dam_name.as_deref().unwrap_or("?")
        ));
        lines.push(String::new());
    }

    lines.push("Breeding Card (externals)".to_string());
    let card = breeding_card_ext(horse);
    for stat in ExtStat::ALL {
        lines.push(format!(
            "{:<14}{}",
            stat.card_label(),
            symbol_for_breeding_value(card.get(stat))
        ));
    }
    lines.push(String::new());
    lines.push("Final Trained Externals".to_string());
    lines.push(stable_card(horse, None));
    lines.push(String::new());
    lines.push("Do not leave Dam reg. card.".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds_core::model::{Externals, Internals, LegType, Sex};

    fn horse() -> Horse {
        Horse::new(
            "PLAYER-001",
            "Emerald Crown",
            Sex::F,
            LegType::LS,
            120,
            Internals {
                stamina: 36,
                speed: 31,
                sharp: 28,
            },
            Externals {
                start: 18,
                corner: 25,
                oob: 31,
                competing: 22,
                tenacious: 27,
                spurt: 35,
            },
        )
    }

    #[test]
    fn test_stable_card_shows_deltas() {
        let h = horse();
        let plain = stable_card(&h, None);
        assert!(plain.contains("START 18"));
        assert!(plain.contains("SPURT 35"));

        let mut deltas = ExtDeltas::new();
        deltas.insert(ExtStat::Spurt, 2);
        deltas.insert(ExtStat::Start, -1);
        let with = stable_card(&h, Some(&deltas));
        assert!(with.contains("SPURT 35 (+2)"));
        assert!(with.contains("START 18 (-1)"));
    }

    #[test]
    fn test_parent_table_has_all_rows() {
        let p = ParentHorse {
            name: "Timber Country".into(),
            stamina: 40,
            speed: 44,
            sharp: 36,
            ac: 40,
            start: 12,
            corner: 9,
            oob: 8,
            competing: 10,
            tenacious: 7,
            spurt: 11,
        };
        let table = parent_pick_table(&[p.clone(), p]);
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("40/44/36"));
        assert_eq!(parent_pick_table(&[]), "(no horses)");
    }

    #[test]
    fn test_retirement_tiers() {
        assert_eq!(retirement_tier(0, 0).1, "Quiet");
        assert_eq!(retirement_tier(800_000, 0).1, "Fighter");
        assert_eq!(retirement_tier(0, 1).1, "Star");
        assert_eq!(retirement_tier(5_500_000, 0).1, "Legend");
        assert_eq!(retirement_tier(0, 3).1, "Legend");
    }

    #[test]
    fn test_breeding_symbols() {
        assert_eq!(symbol_for_breeding_value(16), "◎");
        assert_eq!(symbol_for_breeding_value(10), "○");
        assert_eq!(symbol_for_breeding_value(7), "▲");
        assert_eq!(symbol_for_breeding_value(2), "△");
    }

    #[test]
    fn test_breeding_card_fallback_chain() {
        let mut h = horse();
        // No pedigree at all: converted from trained externals.
        let card = breeding_card_ext(&h);
        assert_eq!(card.start, racing_to_breeder_scale(18));

        // Sire/dam externals present: floor average.
        h.pedigree.sire_ext = Some(BreedingExt {
            start: 10,
            corner: 8,
            oob: 8,
            competing: 8,
            tenacious: 8,
            spurt: 8,
        });
        h.pedigree.dam_ext = Some(BreedingExt {
            start: 15,
            corner: 8,
            oob: 8,
            competing: 8,
            tenacious: 8,
            spurt: 8,
        });
        assert_eq!(breeding_card_ext(&h).start, 12);

        // The stored card wins over everything.
        h.pedigree.breeding_ext = Some(BreedingExt {
            start: 3,
            corner: 3,
            oob: 3,
            competing: 3,
            tenacious: 3,
            spurt: 3,
        });
        assert_eq!(breeding_card_ext(&h).start, 3);
    }

    #[test]
    fn test_retirement_card_sections() {
        let mut h = horse();
        h.g1_wins = 1;
        h.pedigree.sire_name = Some("Timber Country".into());
        let poem = vec!["A line.".to_string()];
        let card = retirement_card(&h, 2_600_000, 31, &poem);
        assert!(card.contains("Legacy: ○ Star"));
        assert!(card.contains("STAMINA type"));
        assert!(card.contains("OUT OF BOX"));
        assert!(card.contains("Sire: Timber Country"));
        assert!(card.contains("$2,600,000"));
    }

    #[test]
    fn test_splash_mentions_program() {
        let s = splash("0.3.0");
        assert!(s.contains("DOCSim"));
        assert!(s.contains("v0.3.0"));
    }
}
