//! Pre-race "Horse Handicapping" preview.
//!
//! Informational only; nothing here affects outcomes. Each stat column is
//! ranked across the field with DOC-style markers:
//!
//!   ◎ best | ○ 2nd | ▲ 3rd | △ 4th-6th | (blank) 7th+
//!
//! Rows sort by gate, and a "Fav" column shows the on-paper ranking from
//! the deterministic expected score.

use std::collections::HashMap;

use crate::commentary::expected_score;
use crate::model::{Condition, ExtStat, Horse, IntStat};
use crate::schedule::RaceMeta;

struct StatColumn {
    label: &'static str,
    get: fn(&Horse) -> i32,
}

const STAT_COLUMNS: [StatColumn; 9] = [
    StatColumn { label: "ST", get: |h| h.internals.get(IntStat::Stamina) },
    StatColumn { label: "SP", get: |h| h.internals.get(IntStat::Speed) },
    StatColumn { label: "SH", get: |h| h.internals.get(IntStat::Sharp) },
    StatColumn { label: "Start", get: |h| h.externals.get(ExtStat::Start) },
    StatColumn { label: "Corner", get: |h| h.externals.get(ExtStat::Corner) },
    StatColumn { label: "OOB", get: |h| h.externals.get(ExtStat::Oob) },
    StatColumn { label: "Comp", get: |h| h.externals.get(ExtStat::Competing) },
    StatColumn { label: "Ten", get: |h| h.externals.get(ExtStat::Tenacious) },
    StatColumn { label: "Spurt", get: |h| h.externals.get(ExtStat::Spurt) },
];

/// The k-th largest values (with duplicates), like a spreadsheet LARGE().
fn top_values(values: &[i32], k: usize) -> Vec<i32> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.truncate(k);
    sorted
}

/// Marker for one value against the field's top six.
pub fn marker_for_value(v: i32, top: &[i32]) -> &'static str {
    match top.iter().position(|t| v == *t) {
        Some(0) => "◎",
        Some(1) => "○",
        Some(2) => "▲",
        Some(3..=5) => "△",
        _ => "",
    }
}

fn stat_markers(horses: &[&Horse], get: fn(&Horse) -> i32) -> Vec<&'static str> {
    let vals: Vec<i32> = horses.iter().map(|h| get(h)).collect();
    let top = top_values(&vals, 6);
    vals.iter().map(|v| marker_for_value(*v, &top)).collect()
}

/// Render the handicapping preview for a monospaced console.
pub fn render_handicapping_table(
    runners: &[&Horse],
    gate_by_id: &HashMap<String, u32>,
    race: &RaceMeta,
    condition: Condition,
) -> String {
    if runners.is_empty() {
        return String::new();
    }

    // Display order: by gate number, DOC-style.
    let mut horses: Vec<&Horse> = runners.to_vec();
    horses.sort_by_key(|h| gate_by_id.get(&h.id).copied().unwrap_or(999));

    let markers_by_col: Vec<Vec<&'static str>> = STAT_COLUMNS
        .iter()
        .map(|col| stat_markers(&horses, col.get))
        .collect();

    // On-paper favorite ranks.
    let mut scored: Vec<(f64, &str)> = horses
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let gate = gate_by_id.get(&h.id).copied().unwrap_or(i as u32 + 1);
            (expected_score(h, race, condition, gate), h.id.as_str())
        })
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    let fav_rank_by_id: HashMap<&str, usize> = scored
        .iter()
        .enumerate()
        .map(|(rank, (_, id))| (*id, rank + 1))
        .collect();

    const GATE_W: usize = 4;
    const HORSE_W: usize = 24;
    const SEX_W: usize = 3;
    const AC_W: usize = 4;

    let mut lines: Vec<String> = Vec::new();
    lines.push("=== Horse Handicapping (informational only) ===".to_string());

    let stat_labels: Vec<&str> = STAT_COLUMNS
        .iter()
        .map(|c| c.label)
        .chain(std::iter::once("Fav"))
        .collect();
    let stat_hdr: Vec<String> = stat_labels
        .iter()
        .map(|lab| format!("{lab:>w$}", w = lab.len().max(3)))
        .collect();
    lines.push(format!(
        "{:<GATE_W$} {:<HORSE_W$} {:<SEX_W$} {:>AC_W$}  {}",
        "Gate",
        "Horse",
        "Sex",
        "AC",
        stat_hdr.join(" ")
    ));
    lines.push(format!(
        "{} {} {} {}  {}",
        "-".repeat(GATE_W),
        "-".repeat(HORSE_W),
        "-".repeat(SEX_W),
        "-".repeat(AC_W),
        stat_labels
            .iter()
            .map(|lab| "-".repeat(lab.len().max(3)))
            .collect::<Vec<_>>()
            .join(" ")
    ));

    for (i, h) in horses.iter().enumerate() {
        let gate = gate_by_id.get(&h.id).copied().unwrap_or(i as u32 + 1);
        let mut name: String = h.name.trim().to_string();
        if name.chars().count() > HORSE_W {
            name = name.chars().take(HORSE_W - 1).collect::<String>() + "…";
        }

        let mut row_marks: Vec<String> = STAT_COLUMNS
            .iter()
            .enumerate()
            .map(|(c, col)| format!("{:>w$}", markers_by_col[c][i], w = col.label.len().max(3)))
            .collect();
        let fav = fav_rank_by_id
            .get(h.id.as_str())
            .map(|r| r.to_string())
            .unwrap_or_default();
        row_marks.push(format!("{fav:>3}"));

        lines.push(format!(
            "{:<GATE_W$} {:<HORSE_W$} {:<SEX_W$} {:>AC_W$}  {}",
            gate,
            name,
            h.sex.to_string(),
            h.ac,
            row_marks.join(" ")
        ));
    }

    lines.push(String::new());
    lines.push("Legend: ◎ best | ○ 2nd | ▲ 3rd | △ 4th-6th".to_string());
    lines.push("Fav: 1 = top on paper".to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::draw_gates;
    use crate::model::{Externals, Internals, LegType, Sex, Slot, Surface};

    fn race() -> RaceMeta {
        RaceMeta {
            round_num: 1,
            slot: Slot::R2,
            track: "Eastern City",
            distance: 1600,
            winner_purse: 200_000,
            name: None,
            course_code: "EC",
            surface: Surface::Turf,
        }
    }

    fn field() -> Vec<Horse> {
        (0..12)
            .map(|i| {
                Horse::new(
                    format!("H{i:02}"),
                    format!("Horse {i:02}"),
                    if i % 2 == 0 { Sex::M } else { Sex::F },
                    LegType::AL,
                    100 + i,
                    Internals {
                        stamina: 20 + i,
                        speed: 20 + i,
                        sharp: 20 + i,
                    },
                    Externals {
                        start: 12 + i,
                        corner: 12 + i,
                        oob: 12 + i,
                        competing: 12 + i,
                        tenacious: 12 + i,
                        spurt: 12 + i,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_markers() {
        let top = top_values(&[48, 40, 40, 30, 20, 18, 10, 9], 6);
        assert_eq!(marker_for_value(48, &top), "◎");
        assert_eq!(marker_for_value(40, &top), "○");
        assert_eq!(marker_for_value(30, &top), "△");
        assert_eq!(marker_for_value(18, &top), "△");
        assert_eq!(marker_for_value(10, &top), "");
    }

    #[test]
    fn test_table_rows_sorted_by_gate() {
        let horses = field();
        let refs: Vec<&Horse> = horses.iter().collect();
        let gates = draw_gates(42, 1, &race(), crate::model::Condition::Good, &refs);
        let table = render_handicapping_table(&refs, &gates, &race(), crate::model::Condition::Good);

        let rows: Vec<&str> = table
            .lines()
            .filter(|l| l.starts_with(|c: char| c.is_ascii_digit()))
            .collect();
        assert_eq!(rows.len(), 12);
        let gate_nums: Vec<u32> = rows
            .iter()
            .filter_map(|r| r.split_whitespace().next()?.parse().ok())
            .collect();
        let mut sorted = gate_nums.clone();
        sorted.sort_unstable();
        assert_eq!(gate_nums, sorted);
    }

    #[test]
    fn test_best_horse_is_favorite_and_top_marked() {
        let horses = field();
        let refs: Vec<&Horse> = horses.iter().collect();
        let gates: HashMap<String, u32> = refs
            .iter()
            .enumerate()
            .map(|(i, h)| (h.id.clone(), i as u32 + 1))
            .collect();
        let table = render_handicapping_table(&refs, &gates, &race(), crate::model::Condition::Good);
        // Horse 11 carries every top stat and a central-enough draw to be
        // the on-paper favorite.
        let row = table
            .lines()
            .find(|l| l.contains("Horse 11"))
            .expect("row for Horse 11");
        assert!(row.contains('◎'));
        assert!(row.trim_end().ends_with('1'));
        assert!(table.contains("Legend:"));
    }

    #[test]
    fn test_empty_field_renders_empty() {
        let table = render_handicapping_table(&[], &HashMap::new(), &race(), crate::model::Condition::Good);
        assert!(table.is_empty());
    }
}
