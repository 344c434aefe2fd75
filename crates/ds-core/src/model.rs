//! Core data model: horses, stats, race results.
//!
//! Serde shapes here define the on-disk save schema, so field and variant
//! names are part of the persistence contract (`"TURF"`, `"GOOD_TO_SOFT"`,
//! `"FR"`, ...). See `save.rs` for the enclosing save-state layout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, EnumString};

/// Horse sex.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Sex {
    M,
    F,
}

impl Sex {
    pub const fn word(&self) -> &'static str {
        match self {
            Sex::M => "Colt",
            Sex::F => "Filly",
        }
    }
}

/// Racing surface.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Surface {
    Turf,
    Dirt,
}

/// Track condition (going).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    Good,
    GoodToSoft,
    Soft,
    Heavy,
}

impl Condition {
    /// Lower-case, space-separated form for prose ("good to soft").
    pub fn prose(&self) -> String {
        self.to_string().to_lowercase().replace('_', " ")
    }
}

/// DOC leg type, derived from the birth externals.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum LegType {
    FR,
    SD,
    LS,
    SR,
    AL,
}

impl LegType {
    pub const fn label(&self) -> &'static str {
        match self {
            LegType::FR => "Front-runner",
            LegType::SD => "Start Dash",
            LegType::LS => "Last Spurt",
            LegType::SR => "Stretch-runner",
            LegType::AL => "Almighty",
        }
    }

    /// Closer-style types that rely on the late phase.
    pub const fn is_closer(&self) -> bool {
        matches!(self, LegType::LS | LegType::SR)
    }
}

/// Race slot within a round: five open races plus the feature G1.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum Slot {
    #[serde(rename = "1R")]
    #[strum(serialize = "1R")]
    R1,
    #[serde(rename = "2R")]
    #[strum(serialize = "2R")]
    R2,
    #[serde(rename = "3R")]
    #[strum(serialize = "3R")]
    R3,
    #[serde(rename = "4R")]
    #[strum(serialize = "4R")]
    R4,
    #[serde(rename = "5R")]
    #[strum(serialize = "5R")]
    R5,
    G1,
}

/// Breeder-HTML data revision.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Revision {
    #[serde(rename = "revA")]
    #[strum(serialize = "revA")]
    RevA,
    #[serde(rename = "revB")]
    #[strum(serialize = "revB")]
    RevB,
    #[serde(rename = "revC")]
    #[strum(serialize = "revC")]
    RevC,
    #[serde(rename = "revD")]
    #[strum(serialize = "revD")]
    RevD,
}

/// Training/feeding result grade, best to worst (`None` = no session).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Grade {
    Perfect,
    Cool,
    Great,
    Good,
    Bad,
    None,
}

/// Internal (hidden) stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Internals {
    pub stamina: i32,
    pub speed: i32,
    pub sharp: i32,
}

/// Keys into [`Internals`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IntStat {
    Stamina,
    Speed,
    Sharp,
}

impl IntStat {
    pub const ALL: [IntStat; 3] = [IntStat::Stamina, IntStat::Speed, IntStat::Sharp];
}

impl Internals {
    pub fn get(&self, stat: IntStat) -> i32 {
        match stat {
            IntStat::Stamina => self.stamina,
            IntStat::Speed => self.speed,
            IntStat::Sharp => self.sharp,
        }
    }

    pub fn set(&mut self, stat: IntStat, value: i32) {
        match stat {
            IntStat::Stamina => self.stamina = value,
            IntStat::Speed => self.speed = value,
            IntStat::Sharp => self.sharp = value,
        }
    }

    pub fn sum(&self) -> i32 {
        self.stamina + self.speed + self.sharp
    }
}

/// External (trainable) stats on the racing scale 8..=48.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Externals {
    pub start: i32,
    pub corner: i32,
    pub oob: i32,
    pub competing: i32,
    pub tenacious: i32,
    pub spurt: i32,
}

/// Minimum / maximum of the racing external scale.
pub const EXT_MIN: i32 = 8;
pub const EXT_MAX: i32 = 48;

/// Keys into [`Externals`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExtStat {
    Start,
    Corner,
    Oob,
    Competing,
    Tenacious,
    Spurt,
}

impl ExtStat {
    pub const ALL: [ExtStat; 6] = [
        ExtStat::Start,
        ExtStat::Corner,
        ExtStat::Oob,
        ExtStat::Competing,
        ExtStat::Tenacious,
        ExtStat::Spurt,
    ];

    /// Short upper-case label for stat cards.
    pub const fn label(&self) -> &'static str {
        match self {
            ExtStat::Start => "START",
            ExtStat::Corner => "CORNER",
            ExtStat::Oob => "OOB",
            ExtStat::Competing => "COMPETING",
            ExtStat::Tenacious => "TENACIOUS",
            ExtStat::Spurt => "SPURT",
        }
    }

    /// Long label used on the breeding registration card.
    pub const fn card_label(&self) -> &'static str {
        match self {
            ExtStat::Oob => "OUT OF BOX",
            other => other.label(),
        }
    }
}

impl Externals {
    pub fn get(&self, stat: ExtStat) -> i32 {
        match stat {
            ExtStat::Start => self.start,
            ExtStat::Corner => self.corner,
            ExtStat::Oob => self.oob,
            ExtStat::Competing => self.competing,
            ExtStat::Tenacious => self.tenacious,
            ExtStat::Spurt => self.spurt,
        }
    }

    pub fn set(&mut self, stat: ExtStat, value: i32) {
        match stat {
            ExtStat::Start => self.start = value,
            ExtStat::Corner => self.corner = value,
            ExtStat::Oob => self.oob = value,
            ExtStat::Competing => self.competing = value,
            ExtStat::Tenacious => self.tenacious = value,
            ExtStat::Spurt => self.spurt = value,
        }
    }

    pub fn sum(&self) -> i32 {
        ExtStat::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

/// Per-stat deltas reported by training and feeding, in application order.
pub type ExtDeltas = BTreeMap<ExtStat, i32>;

/// Result of one training session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    pub training_id: usize,
    pub training_name: String,
    pub grade: Grade,
    pub deltas: ExtDeltas,
}

/// Result of one feeding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedingResult {
    pub grade_context: Grade,
    pub foods_offered: Vec<String>,
    pub chosen: String,
    pub deltas: ExtDeltas,
    #[serde(default)]
    pub notes: String,
}

/// One runner's line in a timed race result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceRunnerResult {
    pub pos: u32,
    pub horse_id: String,
    pub horse_name: String,
    pub time_seconds: f64,
    pub lengths_behind: f64,
}

/// One entry in a horse's persisted career log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceLogEntry {
    pub round_num: u32,
    pub slot: Slot,
    pub race_name: String,
    pub track: String,
    pub course_code: String,
    pub surface: Surface,
    pub condition: Condition,
    pub distance: u32,
    pub winner_time: f64,
    pub player_pos: u32,
    pub player_time: f64,
    pub player_lengths: f64,
    pub payout: i64,
    pub earnings_total_after: i64,
    pub field: Vec<RaceRunnerResult>,
}

/// Externals on the breeder (0..=16) scale, as stored on registration cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedingExt {
    pub start: i32,
    pub corner: i32,
    pub oob: i32,
    pub competing: i32,
    pub tenacious: i32,
    pub spurt: i32,
}

impl BreedingExt {
    pub fn get(&self, stat: ExtStat) -> i32 {
        match stat {
            ExtStat::Start => self.start,
            ExtStat::Corner => self.corner,
            ExtStat::Oob => self.oob,
            ExtStat::Competing => self.competing,
            ExtStat::Tenacious => self.tenacious,
            ExtStat::Spurt => self.spurt,
        }
    }
}

/// Pedigree metadata kept for the retirement card and the breeding pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pedigree {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sire_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dam_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sire_ext: Option<BreedingExt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dam_ext: Option<BreedingExt>,
    /// Genetic card externals stored at birth: floor((sire + dam) / 2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breeding_ext: Option<BreedingExt>,
}

impl Pedigree {
    pub fn is_empty(&self) -> bool {
        self.sire_name.is_none()
            && self.dam_name.is_none()
            && self.sire_ext.is_none()
            && self.dam_ext.is_none()
            && self.breeding_ext.is_none()
    }
}

/// Cosmetic code/name pair (coat color, personality).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodedName {
    pub code: u8,
    pub name: String,
}

/// Cosmetic metadata not used by the sim core; persisted for card export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extras {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coat: Option<CodedName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<CodedName>,
    /// 1..=5 when set; 0 means "not rolled yet".
    #[serde(default)]
    pub hearts: u8,
}

impl Extras {
    pub fn is_empty(&self) -> bool {
        self.coat.is_none() && self.personality.is_none() && self.hearts == 0
    }
}

/// A race horse: the player's foal or a CPU runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Horse {
    pub id: String,
    pub name: String,
    pub sex: Sex,
    /// Persisted under the historical field name `style`.
    #[serde(rename = "style")]
    pub leg: LegType,
    /// Surface-preference byte, 0 (turf) ..= 255 (dirt).
    pub ac: i32,
    pub internals: Internals,
    pub externals: Externals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_base: Option<f64>,
    #[serde(default)]
    pub genetic_tokens: i32,
    #[serde(default)]
    pub g1_wins: i32,
    #[serde(default)]
    pub pending_g1_superfood: bool,
    #[serde(default)]
    pub career_log: Vec<RaceLogEntry>,
    #[serde(default, skip_serializing_if = "Pedigree::is_empty")]
    pub pedigree: Pedigree,
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub extras: Extras,
    /// Last session results, shown on the stable card. Not persisted.
    #[serde(skip)]
    pub last_training: Option<TrainingResult>,
    #[serde(skip)]
    pub last_feeding: Option<FeedingResult>,
}

impl Horse {
    /// Minimal constructor for a freshly bred horse.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        sex: Sex,
        leg: LegType,
        ac: i32,
        internals: Internals,
        externals: Externals,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sex,
            leg,
            ac,
            internals,
            externals,
            rating_base: None,
            genetic_tokens: 0,
            g1_wins: 0,
            pending_g1_superfood: false,
            career_log: Vec::new(),
            pedigree: Pedigree::default(),
            extras: Extras::default(),
            last_training: None,
            last_feeding: None,
        }
    }

    /// Career wins, derived from the persisted log.
    pub fn wins(&self) -> usize {
        self.career_log.iter().filter(|e| e.player_pos == 1).count()
    }

    /// DOC-style "type" from the highest internal.
    pub fn internal_type(&self) -> IntStat {
        let i = &self.internals;
        if i.stamina >= i.speed && i.stamina >= i.sharp {
            IntStat::Stamina
        } else if i.speed >= i.stamina && i.speed >= i.sharp {
            IntStat::Speed
        } else {
            IntStat::Sharp
        }
    }
}
