use chrono::NaiveDate;

use super::*;
use crate::Fixtures;

fn person(
    id: &str,
    born: (i32, u32, u32),
    died: Option<(i32, u32, u32)>,
    location: &str,
) -> Person {
    Person {
        id: id.to_string(),
        name: id.to_string(),
        birth_date: NaiveDate::from_ymd_opt(born.0, born.1, born.2).unwrap(),
        death_date: died.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap()),
        role: String::new(),
        bio: String::new(),
        location: location.to_string(),
        spouse_id: None,
        parent_ids: vec![],
        child_ids: vec![],
        favorite_memory: None,
        fun_fact: None,
    }
}

#[test]
fn test_find_person_by_id_round_trip() {
    let fixtures = Fixtures::embedded().unwrap();
    let family = fixtures.family();

    for person in family.persons() {
        let found = family.find_person_by_id(&person.id).unwrap();
        assert_eq!(found, person);
    }
}

#[test]
fn test_find_person_by_id_not_found() {
    let fixtures = Fixtures::embedded().unwrap();

    let err = fixtures.family().find_person_by_id("nobody").unwrap_err();
    assert_eq!(
        err,
        QueryError::NotFound {
            kind: "person",
            id: "nobody".to_string()
        }
    );
}

#[test]
fn test_generation_summaries() {
    let fixtures = Fixtures::embedded().unwrap();
    let summaries = fixtures.family().generation_summaries();

    let numbers: Vec<u32> = summaries.iter().map(|s| s.generation_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);

    for (summary, generation) in summaries.iter().zip(&fixtures.family().generations) {
        assert_eq!(summary.member_count, generation.members.len());
    }

    let labels: Vec<&str> = summaries.iter().map(|s| s.year_range_label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["1925-2010", "1955-Present", "1985-Present", "2015-Present"]
    );
}

#[test]
fn test_family_statistics() {
    let fixtures = Fixtures::embedded().unwrap();
    let stats = fixtures.family().family_statistics_at(2025);

    assert_eq!(stats.total_members, 13);
    assert_eq!(stats.living_members, 11);
    assert_eq!(
        stats.living_members + (stats.total_members - stats.living_members),
        stats.total_members
    );
    // Spain, UK, USA, Germany, Netherlands
    assert_eq!(stats.distinct_country_count, 5);
    assert_eq!(stats.generation_count, 4);
    assert_eq!(stats.average_age_of_living, Some(42));
}

#[test]
fn test_average_age_is_none_without_living_members() {
    let tree = FamilyTree {
        name: "Ancestors".to_string(),
        generations: vec![Generation {
            number: 1,
            members: vec![
                person("a", (1900, 1, 1), Some((1970, 1, 1)), "Seville, Spain"),
                person("b", (1905, 1, 1), Some((1980, 1, 1)), "Lisbon, Portugal"),
            ],
        }],
    };

    let stats = tree.family_statistics_at(2025);
    assert_eq!(stats.living_members, 0);
    assert_eq!(stats.average_age_of_living, None);
    assert_eq!(stats.distinct_country_count, 2);
    assert_eq!(tree.generation_summaries()[0].year_range_label, "1900-1980");
}

#[test]
fn test_country_of() {
    assert_eq!(country_of("Seville, Spain"), "Spain");
    assert_eq!(country_of("New York, NY, USA"), "USA");
    assert_eq!(country_of("Worldwide"), "Worldwide");
}

#[test]
fn test_relatives() {
    let fixtures = Fixtures::embedded().unwrap();
    let relatives = fixtures.family().relatives("antonio").unwrap();

    assert_eq!(relatives.spouse.map(|p| p.id.as_str()), Some("isabel"));

    let parents: Vec<&str> = relatives.parents.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(parents, vec!["carlos", "maria"]);

    let children: Vec<&str> = relatives.children.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(children, vec!["javier", "lucia"]);
}

#[test]
fn test_relatives_of_unmarried_leaf() {
    let fixtures = Fixtures::embedded().unwrap();
    let relatives = fixtures.family().relatives("carla").unwrap();

    assert!(relatives.spouse.is_none());
    assert_eq!(relatives.parents.len(), 2);
    assert!(relatives.children.is_empty());
}
