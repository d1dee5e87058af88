use std::{fmt::Display, path::PathBuf};

use chrono::NaiveDate;
use garde::Validate;
use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use schemars::JsonSchema;
use serde_derive::{Deserialize, Serialize};
use strum_macros::{EnumString, VariantArray};
use thiserror::Error;

pub mod store;


#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, PartialEq, Eq, Validate)]
#[serde(deny_unknown_fields)]
pub struct Person {
    #[garde(ascii, length(min = 1, max = 32))]
    pub id: String,
    #[garde(length(min = 1, max = 64))]
    pub name: String,
    #[garde(skip)]
    pub birth_date: NaiveDate,
    #[garde(skip)]
    #[serde(default)]
    pub death_date: Option<NaiveDate>,
    #[garde(length(max = 64))]
    #[serde(default)]
    pub role: String,
    #[garde(length(max = 256))]
    #[serde(default)]
    pub bio: String,
    /// Free text of the form "City, Country".
    #[garde(length(min = 1, max = 128))]
    pub location: String,
    #[garde(ascii, length(min = 1, max = 32))]
    #[serde(default)]
    pub spouse_id: Option<String>,
    #[garde(length(max = 2), inner(ascii, length(min = 1, max = 32)))]
    #[serde(default)]
    pub parent_ids: Vec<String>,
    #[garde(inner(ascii, length(min = 1, max = 32)))]
    #[serde(default)]
    pub child_ids: Vec<String>,
    #[garde(length(max = 256))]
    #[serde(default)]
    pub favorite_memory: Option<String>,
    #[garde(length(max = 256))]
    #[serde(default)]
    pub fun_fact: Option<String>,
}

impl Person {
    pub fn is_living(&self) -> bool {
        self.death_date.is_none()
    }
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, PartialEq, Eq, Validate)]
#[serde(deny_unknown_fields)]
pub struct Generation {
    #[garde(range(min = 1))]
    pub number: u32,
    #[garde(length(min = 1), dive)]
    pub members: Vec<Person>,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, Validate)]
#[serde(deny_unknown_fields)]
pub struct FamilyTree {
    #[garde(length(min = 1, max = 128))]
    pub name: String,
    #[garde(dive)]
    pub generations: Vec<Generation>,
}

#[derive(
    Serialize,
    Deserialize,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    JsonSchema,
    VariantArray,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MediaCategory {
    FamilyReunions,
    Celebrations,
    Travels,
    Traditions,
    Generations,
    Candid,
}

impl MediaCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::FamilyReunions => "family-reunions",
            MediaCategory::Celebrations => "celebrations",
            MediaCategory::Travels => "travels",
            MediaCategory::Traditions => "traditions",
            MediaCategory::Generations => "generations",
            MediaCategory::Candid => "candid",
        }
    }
}

impl Display for MediaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, PartialEq, Eq, Validate)]
#[serde(deny_unknown_fields)]
pub struct Photo {
    #[garde(skip)]
    pub id: u32,
    #[garde(length(min = 1, max = 128))]
    pub title: String,
    #[garde(length(max = 512))]
    pub description: String,
    #[garde(skip)]
    pub category: MediaCategory,
    #[garde(skip)]
    pub date: NaiveDate,
    #[garde(length(max = 128))]
    pub location: String,
    /// Person ids, or the marker `all` for whole-family shots.
    #[garde(inner(length(min = 1, max = 32)))]
    #[serde(default)]
    pub people: Vec<String>,
    #[garde(inner(length(min = 1, max = 32)))]
    #[serde(default)]
    pub tags: Vec<String>,
    #[garde(skip)]
    #[serde(default)]
    pub featured: bool,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, PartialEq, Eq, Validate)]
#[serde(deny_unknown_fields)]
pub struct Video {
    #[garde(skip)]
    pub id: u32,
    #[garde(length(min = 1, max = 128))]
    pub title: String,
    #[garde(length(max = 512))]
    pub description: String,
    #[garde(skip)]
    pub category: MediaCategory,
    #[garde(skip)]
    pub date: NaiveDate,
    #[garde(range(min = 1))]
    pub duration_seconds: u32,
    #[garde(length(min = 1, max = 256))]
    pub thumbnail_ref: String,
    #[garde(inner(length(min = 1, max = 32)))]
    #[serde(default)]
    pub tags: Vec<String>,
    #[garde(skip)]
    #[serde(default)]
    pub featured: bool,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, Validate)]
#[serde(deny_unknown_fields)]
pub struct Gallery {
    #[garde(dive)]
    pub photos: Vec<Photo>,
    #[garde(dive)]
    pub videos: Vec<Video>,
}

#[derive(
    Serialize,
    Deserialize,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    JsonSchema,
    VariantArray,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LocationType {
    FamilyHome,
    CurrentResidence,
    Business,
    VacationHome,
    Celebration,
    Heritage,
    Travel,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::FamilyHome => "family-home",
            LocationType::CurrentResidence => "current-residence",
            LocationType::Business => "business",
            LocationType::VacationHome => "vacation-home",
            LocationType::Celebration => "celebration",
            LocationType::Heritage => "heritage",
            LocationType::Travel => "travel",
        }
    }
}

impl Display for LocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, Copy, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct Coordinates {
    #[garde(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[garde(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct MapLocation {
    #[garde(ascii, length(min = 1, max = 64))]
    pub id: String,
    #[garde(length(min = 1, max = 128))]
    pub name: String,
    #[garde(length(max = 512))]
    #[serde(default)]
    pub description: String,
    #[garde(skip)]
    #[serde(rename = "type")]
    pub kind: LocationType,
    #[garde(dive)]
    pub coordinates: Coordinates,
    #[garde(inner(ascii, length(min = 1, max = 32)))]
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[garde(skip)]
    pub year: i32,
    #[garde(length(max = 128))]
    #[serde(default)]
    pub significance: String,
    #[garde(inner(length(min = 1, max = 512)))]
    #[serde(default)]
    pub stories: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, Validate)]
#[serde(deny_unknown_fields)]
pub struct FamilyMap {
    #[garde(dive)]
    pub locations: Vec<MapLocation>,
}

#[derive(
    Serialize,
    Deserialize,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    JsonSchema,
    VariantArray,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum QuizCategory {
    FamilyHistory,
    FamilyMembers,
    Traditions,
    Memories,
}

impl QuizCategory {
    pub fn label(&self) -> &'static str {
        match self {
            QuizCategory::FamilyHistory => "Family History",
            QuizCategory::FamilyMembers => "Family Members",
            QuizCategory::Traditions => "Family Traditions",
            QuizCategory::Memories => "Special Memories",
        }
    }
}

#[derive(
    Serialize,
    Deserialize,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    JsonSchema,
    VariantArray,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, PartialEq, Eq, Validate)]
#[serde(deny_unknown_fields)]
pub struct QuizQuestion {
    #[garde(skip)]
    pub id: u32,
    #[garde(skip)]
    pub category: QuizCategory,
    #[garde(length(min = 1, max = 256))]
    pub prompt: String,
    #[garde(length(min = 2), inner(length(min = 1, max = 128)))]
    pub options: Vec<String>,
    /// Index into `options`; checked against the option count on load.
    #[garde(skip)]
    pub correct_index: usize,
    #[garde(length(max = 512))]
    #[serde(default)]
    pub explanation: String,
    #[garde(skip)]
    pub difficulty: Difficulty,
    #[garde(range(min = 1, max = 10_000))]
    pub points: u32,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, Validate)]
#[serde(deny_unknown_fields)]
pub struct QuizBank {
    #[garde(length(min = 1, max = 128))]
    pub title: String,
    #[garde(length(max = 512))]
    pub description: String,
    #[garde(dive)]
    pub questions: Vec<QuizQuestion>,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, PartialEq, Eq, Validate)]
#[serde(deny_unknown_fields)]
pub struct TriviaQuestion {
    #[garde(skip)]
    pub id: u32,
    #[garde(length(min = 1, max = 256))]
    pub prompt: String,
    #[garde(length(min = 1, max = 128))]
    pub expected_answer: String,
    #[garde(range(min = 1, max = 3_600))]
    pub time_limit_seconds: u32,
    #[garde(range(min = 1, max = 10_000))]
    pub points: u32,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, Validate)]
#[serde(deny_unknown_fields)]
pub struct TriviaSet {
    #[garde(length(min = 1, max = 128))]
    pub title: String,
    #[garde(length(max = 512))]
    pub description: String,
    #[garde(dive)]
    pub questions: Vec<TriviaQuestion>,
}

#[derive(
    Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy, JsonSchema, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SymbolKind {
    Family,
    Location,
    Symbol,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, PartialEq, Eq, Validate)]
#[serde(deny_unknown_fields)]
pub struct MemorySymbol {
    #[garde(skip)]
    pub id: u32,
    #[garde(length(min = 1, max = 32))]
    pub name: String,
    #[garde(skip)]
    pub kind: SymbolKind,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, Validate)]
#[serde(deny_unknown_fields)]
pub struct MemoryDeck {
    #[garde(length(min = 1), dive)]
    pub symbols: Vec<MemorySymbol>,
}

#[derive(
    Serialize,
    Deserialize,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    JsonSchema,
    VariantArray,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimelineCategory {
    Foundation,
    Growth,
    Achievement,
    Expansion,
    Innovation,
    Legacy,
}

impl TimelineCategory {
    pub fn label(&self) -> &'static str {
        match self {
            TimelineCategory::Foundation => "Foundation",
            TimelineCategory::Growth => "Growth",
            TimelineCategory::Achievement => "Achievement",
            TimelineCategory::Expansion => "Expansion",
            TimelineCategory::Innovation => "Innovation",
            TimelineCategory::Legacy => "Legacy",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, PartialEq, Eq, Validate)]
#[serde(deny_unknown_fields)]
pub struct TimelineEvent {
    #[garde(skip)]
    pub id: u32,
    #[garde(skip)]
    pub year: i32,
    #[garde(length(min = 1, max = 128))]
    pub title: String,
    #[garde(length(max = 512))]
    pub description: String,
    #[garde(skip)]
    pub category: TimelineCategory,
    #[garde(length(max = 128))]
    pub location: String,
    #[garde(length(max = 256))]
    #[serde(default)]
    pub significance: String,
    #[garde(inner(length(min = 1, max = 128)))]
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema, Clone, Validate)]
#[serde(deny_unknown_fields)]
pub struct Timeline {
    #[garde(dive)]
    pub events: Vec<TimelineEvent>,
}

#[derive(Debug, Error)]
#[error("Invalid fixture data in '{file}'")]
pub struct FixtureValidationError {
    pub file: String,
    pub src: NamedSource<String>,
    pub labels: Vec<miette::LabeledSpan>,
    #[source]
    pub source: garde::Report,
}

impl Diagnostic for FixtureValidationError {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new("etet::validation::fixture"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new("The following validation errors occurred:"))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(self.labels.iter().cloned()))
    }
}

#[derive(Error, Debug, Diagnostic)]
pub enum DataError {
    #[error("io error reading {path:?}: {source}")]
    #[diagnostic(code(etet::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Fixture file not embedded: {0}")]
    #[diagnostic(code(etet::fixture::missing))]
    Missing(String),

    #[error("Fixture file is not valid UTF-8: {0}")]
    #[diagnostic(code(etet::fixture::utf8))]
    Utf8(String),

    #[error("Error deserializing TOML in '{file}': {source}")]
    #[diagnostic(code(etet::toml))]
    Toml {
        file: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] FixtureValidationError),

    #[error("Inconsistent fixture data in '{file}': {message}")]
    #[diagnostic(code(etet::fixture::integrity))]
    Integrity { file: String, message: String },
}

pub(crate) fn to_labels(content: &str, report: &garde::Report) -> Vec<miette::LabeledSpan> {
    report
        .iter()
        .map(|(path, error)| {
            let path_str = path.to_string();
            let span = find_span(content, &path_str).unwrap_or(SourceSpan::new(0.into(), 0));
            LabeledSpan::new_with_span(Some(error.to_string()), span)
        })
        .collect()
}

fn find_span(content: &str, path: &str) -> Option<SourceSpan> {
    let key = path
        .split(|c| c == '.' || c == '[' || c == ']')
        .filter(|s| !s.is_empty() && !s.chars().all(|c| c.is_ascii_digit()))
        .last()?;

    let pos = content.find(&format!("{key} =")).or_else(|| content.find(key))?;

    // Point at the value after `=` when the key is followed by one on the same line
    let rest = &content[pos + key.len()..];
    let line_end = rest.find(['\n', '\r']).unwrap_or(rest.len());
    if let Some(eq_pos) = rest[..line_end].find('=') {
        let after_eq = &rest[eq_pos + 1..line_end];
        if let Some(val_start) = after_eq.find(|c: char| !c.is_whitespace()) {
            let val_len = after_eq.len() - val_start;
            return Some(SourceSpan::new(
                (pos + key.len() + eq_pos + 1 + val_start).into(),
                val_len,
            ));
        }
    }

    Some(SourceSpan::new(pos.into(), key.len()))
}
