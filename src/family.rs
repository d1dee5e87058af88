use std::collections::BTreeSet;

use chrono::{Datelike, Local};
use serde_derive::Serialize;

use crate::QueryError;
use crate::data::{FamilyTree, Generation, Person};

#[cfg(test)]
mod tests;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub generation_number: u32,
    pub member_count: usize,
    pub year_range_label: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FamilyStatistics {
    pub total_members: usize,
    pub living_members: usize,
    pub distinct_country_count: usize,
    pub generation_count: usize,
    /// `None` when nobody in the tree is living.
    pub average_age_of_living: Option<u32>,
}

#[derive(Serialize, Debug)]
pub struct Relatives<'a> {
    pub spouse: Option<&'a Person>,
    pub parents: Vec<&'a Person>,
    pub children: Vec<&'a Person>,
}

impl FamilyTree {
    /// All persons, generation by generation, in fixture order.
    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.generations.iter().flat_map(|g| g.members.iter())
    }

    pub fn find_person_by_id(&self, id: &str) -> Result<&Person, QueryError> {
        self.persons()
            .find(|p| p.id == id)
            .ok_or_else(|| QueryError::NotFound {
                kind: "person",
                id: id.to_string(),
            })
    }

    pub fn generation_summaries(&self) -> Vec<GenerationSummary> {
        let mut generations: Vec<&Generation> = self.generations.iter().collect();
        generations.sort_by_key(|g| g.number);

        generations
            .into_iter()
            .map(|g| GenerationSummary {
                generation_number: g.number,
                member_count: g.members.len(),
                year_range_label: year_range_label(&g.members),
            })
            .collect()
    }

    pub fn family_statistics(&self) -> FamilyStatistics {
        self.family_statistics_at(Local::now().year())
    }

    /// Statistics with ages computed against `current_year`.
    pub fn family_statistics_at(&self, current_year: i32) -> FamilyStatistics {
        let total_members = self.persons().count();
        let living: Vec<&Person> = self.persons().filter(|p| p.is_living()).collect();

        let countries: BTreeSet<&str> = self.persons().map(|p| country_of(&p.location)).collect();

        let average_age_of_living = if living.is_empty() {
            None
        } else {
            let total: i64 = living
                .iter()
                .map(|p| i64::from(current_year - p.birth_date.year()))
                .sum();
            let mean = total as f64 / living.len() as f64;
            Some(mean.round().max(0.0) as u32)
        };

        FamilyStatistics {
            total_members,
            living_members: living.len(),
            distinct_country_count: countries.len(),
            generation_count: self.generations.len(),
            average_age_of_living,
        }
    }

    pub fn relatives(&self, id: &str) -> Result<Relatives<'_>, QueryError> {
        let person = self.find_person_by_id(id)?;

        let spouse = match &person.spouse_id {
            Some(spouse_id) => Some(self.find_person_by_id(spouse_id)?),
            None => None,
        };
        let parents = person
            .parent_ids
            .iter()
            .map(|id| self.find_person_by_id(id))
            .collect::<Result<Vec<_>, _>>()?;
        let children = person
            .child_ids
            .iter()
            .map(|id| self.find_person_by_id(id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Relatives {
            spouse,
            parents,
            children,
        })
    }
}

/// The country token of a "City, Country" location: the text after the last
/// comma, or the whole string when there is no comma.
pub fn country_of(location: &str) -> &str {
    match location.rsplit_once(',') {
        Some((_, country)) => country.trim(),
        None => location.trim(),
    }
}

fn year_range_label(members: &[Person]) -> String {
    let Some(first) = members.iter().map(|p| p.birth_date.year()).min() else {
        return String::new();
    };

    if members.iter().any(Person::is_living) {
        return format!("{first}-Present");
    }

    match members.iter().filter_map(|p| p.death_date).map(|d| d.year()).max() {
        Some(last) => format!("{first}-{last}"),
        None => format!("{first}-Present"),
    }
}
