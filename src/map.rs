use std::collections::{BTreeMap, BTreeSet};

use serde_derive::Serialize;

use crate::QueryError;
use crate::data::{FamilyMap, LocationType, MapLocation};


#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ScreenPosition {
    pub x_percent: f64,
    pub y_percent: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LocationStatistics {
    pub total_locations: usize,
    pub counts_by_type: BTreeMap<LocationType, usize>,
    /// Distinct persons referenced by at least one location.
    pub distinct_member_count: usize,
    pub earliest_year: Option<i32>,
    pub latest_year: Option<i32>,
    pub year_span: Option<i32>,
}

impl FamilyMap {
    pub fn location_by_id(&self, id: &str) -> Result<&MapLocation, QueryError> {
        self.locations
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| QueryError::NotFound {
                kind: "location",
                id: id.to_string(),
            })
    }

    pub fn locations_by_type(&self, kind: LocationType) -> Vec<&MapLocation> {
        self.locations.iter().filter(|l| l.kind == kind).collect()
    }

    pub fn locations_by_member(&self, person_id: &str) -> Vec<&MapLocation> {
        self.locations
            .iter()
            .filter(|l| l.member_ids.iter().any(|id| id == person_id))
            .collect()
    }

    pub fn location_statistics(&self) -> LocationStatistics {
        location_statistics(&self.locations)
    }
}

pub fn location_statistics<'a, I>(locations: I) -> LocationStatistics
where
    I: IntoIterator<Item = &'a MapLocation>,
{
    let mut total_locations = 0;
    let mut counts_by_type = BTreeMap::new();
    let mut members = BTreeSet::new();
    let mut earliest_year: Option<i32> = None;
    let mut latest_year: Option<i32> = None;

    for location in locations {
        total_locations += 1;
        *counts_by_type.entry(location.kind).or_insert(0) += 1;
        members.extend(location.member_ids.iter().map(String::as_str));
        earliest_year = Some(earliest_year.map_or(location.year, |y| y.min(location.year)));
        latest_year = Some(latest_year.map_or(location.year, |y| y.max(location.year)));
    }

    LocationStatistics {
        total_locations,
        counts_by_type,
        distinct_member_count: members.len(),
        earliest_year,
        latest_year,
        year_span: earliest_year.zip(latest_year).map(|(first, last)| last - first),
    }
}

/// Equirectangular projection of a coordinate onto the map canvas, in
/// percent of its width and height.
pub fn project_coordinate_to_screen(
    latitude: f64,
    longitude: f64,
) -> Result<ScreenPosition, QueryError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(QueryError::InvalidArgument(format!(
            "latitude {latitude} outside [-90, 90]"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(QueryError::InvalidArgument(format!(
            "longitude {longitude} outside [-180, 180]"
        )));
    }

    Ok(ScreenPosition {
        x_percent: 50.0 + (longitude / 180.0) * 40.0,
        y_percent: 50.0 - (latitude / 90.0) * 40.0,
    })
}

impl MapLocation {
    pub fn screen_position(&self) -> Result<ScreenPosition, QueryError> {
        project_coordinate_to_screen(self.coordinates.latitude, self.coordinates.longitude)
    }
}
