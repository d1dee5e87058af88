//! Immutable fixture store.
//!
//! Every collection the site renders is read from a TOML file, validated with
//! `garde`, checked for cross references, and then only handed out by shared
//! reference. The default set is compiled into the binary.

use std::{
    collections::{BTreeSet, HashMap},
    fs,
    path::Path,
};

use garde::Validate;
use miette::NamedSource;
use rust_embed::Embed;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{
    DataError, FamilyMap, FamilyTree, FixtureValidationError, Gallery, Generation, MapLocation,
    MemoryDeck, MemorySymbol, Person, Photo, QuizBank, QuizQuestion, Timeline, TimelineEvent,
    TriviaQuestion, TriviaSet, Video, to_labels,
};

#[derive(Embed)]
#[folder = "fixtures/"]
struct FixtureDir;

pub const FAMILY_FILE: &str = "family.toml";
pub const GALLERY_FILE: &str = "gallery.toml";
pub const LOCATIONS_FILE: &str = "locations.toml";
pub const QUIZ_FILE: &str = "quiz.toml";
pub const TRIVIA_FILE: &str = "trivia.toml";
pub const MEMORY_FILE: &str = "memory.toml";
pub const TIMELINE_FILE: &str = "timeline.toml";

#[derive(Debug, Clone)]
pub struct Fixtures {
    family: FamilyTree,
    gallery: Gallery,
    map: FamilyMap,
    quiz: QuizBank,
    trivia: TriviaSet,
    memory: MemoryDeck,
    timeline: Timeline,
}

impl Fixtures {
    /// Loads the fixture set compiled into the binary.
    pub fn embedded() -> Result<Self, DataError> {
        Self::load(|name| {
            let file = FixtureDir::get(name).ok_or_else(|| DataError::Missing(name.to_string()))?;
            String::from_utf8(file.data.into_owned()).map_err(|_| DataError::Utf8(name.to_string()))
        })
    }

    /// Loads a fixture set from `dir`, which must hold the same files as the
    /// embedded set.
    pub fn open(dir: &Path) -> Result<Self, DataError> {
        Self::load(|name| {
            let path = dir.join(name);
            fs::read_to_string(&path).map_err(|source| DataError::Io { path, source })
        })
    }

    fn load<F>(read: F) -> Result<Self, DataError>
    where
        F: Fn(&str) -> Result<String, DataError>,
    {
        let fixtures = Self {
            family: parse(FAMILY_FILE, read(FAMILY_FILE)?)?,
            gallery: parse(GALLERY_FILE, read(GALLERY_FILE)?)?,
            map: parse(LOCATIONS_FILE, read(LOCATIONS_FILE)?)?,
            quiz: parse(QUIZ_FILE, read(QUIZ_FILE)?)?,
            trivia: parse(TRIVIA_FILE, read(TRIVIA_FILE)?)?,
            memory: parse(MEMORY_FILE, read(MEMORY_FILE)?)?,
            timeline: parse(TIMELINE_FILE, read(TIMELINE_FILE)?)?,
        };
        fixtures.check_integrity()?;

        debug!(
            persons = fixtures.persons().count(),
            photos = fixtures.gallery.photos.len(),
            videos = fixtures.gallery.videos.len(),
            locations = fixtures.map.locations.len(),
            "fixtures loaded"
        );

        Ok(fixtures)
    }

    pub fn family(&self) -> &FamilyTree {
        &self.family
    }

    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.family.persons()
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn map(&self) -> &FamilyMap {
        &self.map
    }

    pub fn quiz(&self) -> &QuizBank {
        &self.quiz
    }

    pub fn trivia(&self) -> &TriviaSet {
        &self.trivia
    }

    pub fn memory(&self) -> &MemoryDeck {
        &self.memory
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn generations(&self) -> &[Generation] {
        &self.family.generations
    }

    pub fn photos(&self) -> &[Photo] {
        &self.gallery.photos
    }

    pub fn videos(&self) -> &[Video] {
        &self.gallery.videos
    }

    pub fn locations(&self) -> &[MapLocation] {
        &self.map.locations
    }

    pub fn quiz_questions(&self) -> &[QuizQuestion] {
        &self.quiz.questions
    }

    pub fn trivia_questions(&self) -> &[TriviaQuestion] {
        &self.trivia.questions
    }

    pub fn memory_symbols(&self) -> &[MemorySymbol] {
        &self.memory.symbols
    }

    pub fn timeline_events(&self) -> &[TimelineEvent] {
        &self.timeline.events
    }

    fn check_integrity(&self) -> Result<(), DataError> {
        check_family(&self.family)?;

        unique_ids(GALLERY_FILE, "photo", self.gallery.photos.iter().map(|p| p.id))?;
        unique_ids(GALLERY_FILE, "video", self.gallery.videos.iter().map(|v| v.id))?;
        unique_ids(LOCATIONS_FILE, "location", self.map.locations.iter().map(|l| l.id.as_str()))?;
        unique_ids(QUIZ_FILE, "question", self.quiz.questions.iter().map(|q| q.id))?;
        unique_ids(TRIVIA_FILE, "question", self.trivia.questions.iter().map(|q| q.id))?;
        unique_ids(MEMORY_FILE, "symbol", self.memory.symbols.iter().map(|s| s.id))?;
        unique_ids(TIMELINE_FILE, "event", self.timeline.events.iter().map(|e| e.id))?;

        for question in &self.quiz.questions {
            if question.correct_index >= question.options.len() {
                return Err(integrity(
                    QUIZ_FILE,
                    format!(
                        "question {} has correct_index {} but only {} options",
                        question.id,
                        question.correct_index,
                        question.options.len()
                    ),
                ));
            }
        }

        let person_ids: BTreeSet<&str> = self.persons().map(|p| p.id.as_str()).collect();
        for location in &self.map.locations {
            if let Some(unknown) = location
                .member_ids
                .iter()
                .find(|id| !person_ids.contains(id.as_str()))
            {
                return Err(integrity(
                    LOCATIONS_FILE,
                    format!("location '{}' refers to unknown person '{}'", location.id, unknown),
                ));
            }
        }

        Ok(())
    }
}

fn parse<T>(file: &str, content: String) -> Result<T, DataError>
where
    T: DeserializeOwned + Validate<Context = ()>,
{
    let value: T = toml::from_str(&content).map_err(|source| DataError::Toml {
        file: file.to_string(),
        source,
    })?;

    if let Err(e) = value.validate() {
        let labels = to_labels(&content, &e);
        return Err(DataError::Validation(FixtureValidationError {
            file: file.to_string(),
            src: NamedSource::new(file, content),
            labels,
            source: e,
        }));
    }

    Ok(value)
}

fn check_family(family: &FamilyTree) -> Result<(), DataError> {
    let mut previous = 0;
    for generation in &family.generations {
        if generation.number <= previous {
            return Err(integrity(
                FAMILY_FILE,
                format!(
                    "generation {} follows generation {}; numbers must strictly increase",
                    generation.number, previous
                ),
            ));
        }
        previous = generation.number;
    }

    unique_ids(FAMILY_FILE, "person", family.persons().map(|p| p.id.as_str()))?;

    let by_id: HashMap<&str, &Person> = family.persons().map(|p| (p.id.as_str(), p)).collect();
    let lookup = |owner: &Person, id: &str| {
        by_id.get(id).copied().ok_or_else(|| {
            integrity(
                FAMILY_FILE,
                format!("'{}' refers to unknown person '{}'", owner.id, id),
            )
        })
    };

    for person in family.persons() {
        if let Some(spouse_id) = &person.spouse_id {
            let spouse = lookup(person, spouse_id.as_str())?;
            if spouse.spouse_id.as_deref() != Some(person.id.as_str()) {
                return Err(integrity(
                    FAMILY_FILE,
                    format!(
                        "'{}' lists '{}' as spouse but not the other way round",
                        person.id, spouse.id
                    ),
                ));
            }
        }

        for parent_id in &person.parent_ids {
            let parent = lookup(person, parent_id.as_str())?;
            if !parent.child_ids.contains(&person.id) {
                return Err(integrity(
                    FAMILY_FILE,
                    format!(
                        "'{}' lists '{}' as parent but is missing from their children",
                        person.id, parent.id
                    ),
                ));
            }
        }

        for child_id in &person.child_ids {
            let child = lookup(person, child_id.as_str())?;
            if !child.parent_ids.contains(&person.id) {
                return Err(integrity(
                    FAMILY_FILE,
                    format!(
                        "'{}' lists '{}' as child but is missing from their parents",
                        person.id, child.id
                    ),
                ));
            }
        }
    }

    Ok(())
}

fn unique_ids<I, K>(file: &str, kind: &str, ids: I) -> Result<(), DataError>
where
    I: IntoIterator<Item = K>,
    K: Ord + std::fmt::Display,
{
    let mut seen = BTreeSet::new();
    for id in ids {
        if seen.contains(&id) {
            return Err(integrity(file, format!("duplicate {kind} id '{id}'")));
        }
        seen.insert(id);
    }
    Ok(())
}

fn integrity(file: &str, message: String) -> DataError {
    DataError::Integrity {
        file: file.to_string(),
        message,
    }
}
