use std::str::FromStr;

use chrono::NaiveDate;
use serde_derive::Serialize;

use crate::data::{Gallery, MediaCategory, Photo, Video};
use crate::{CONFIG, QueryError};

#[cfg(test)]
mod tests;

impl MediaCategory {
    pub fn label(&self) -> &'static str {
        let categories = &CONFIG.categories;
        match self {
            Self::FamilyReunions => categories.family_reunions.label,
            Self::Celebrations => categories.celebrations.label,
            Self::Travels => categories.travels.label,
            Self::Traditions => categories.traditions.label,
            Self::Generations => categories.generations.label,
            Self::Candid => categories.candid.label,
        }
    }

    pub fn description(&self) -> &'static str {
        let categories = &CONFIG.categories;
        match self {
            Self::FamilyReunions => categories.family_reunions.description,
            Self::Celebrations => categories.celebrations.description,
            Self::Travels => categories.travels.description,
            Self::Traditions => categories.traditions.description,
            Self::Generations => categories.generations.description,
            Self::Candid => categories.candid.description,
        }
    }
}

/// Looks up category metadata by its kebab-case id.
pub fn category_by_id(id: &str) -> Result<MediaCategory, QueryError> {
    MediaCategory::from_str(id).map_err(|_| QueryError::NotFound {
        kind: "category",
        id: id.to_string(),
    })
}

/// Category selector of the gallery; `all` disables category filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(MediaCategory),
}

impl CategoryFilter {
    pub fn matches(&self, category: MediaCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(CategoryFilter::All)
        } else {
            MediaCategory::from_str(s).map(CategoryFilter::Only)
        }
    }
}

/// Common view over photos and videos.
pub trait Media {
    fn id(&self) -> u32;
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn category(&self) -> MediaCategory;
    fn tags(&self) -> &[String];
    fn date(&self) -> NaiveDate;
    fn is_featured(&self) -> bool;
}

impl Media for Photo {
    fn id(&self) -> u32 {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn category(&self) -> MediaCategory {
        self.category
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn is_featured(&self) -> bool {
        self.featured
    }
}

impl Media for Video {
    fn id(&self) -> u32 {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn category(&self) -> MediaCategory {
        self.category
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn is_featured(&self) -> bool {
        self.featured
    }
}

impl<M: Media + ?Sized> Media for &M {
    fn id(&self) -> u32 {
        (**self).id()
    }

    fn title(&self) -> &str {
        (**self).title()
    }

    fn description(&self) -> &str {
        (**self).description()
    }

    fn category(&self) -> MediaCategory {
        (**self).category()
    }

    fn tags(&self) -> &[String] {
        (**self).tags()
    }

    fn date(&self) -> NaiveDate {
        (**self).date()
    }

    fn is_featured(&self) -> bool {
        (**self).is_featured()
    }
}

#[derive(Serialize, Debug)]
pub struct FeaturedMedia<'a> {
    pub photos: Vec<&'a Photo>,
    pub videos: Vec<&'a Video>,
}

impl Gallery {
    pub fn featured_media(&self) -> FeaturedMedia<'_> {
        FeaturedMedia {
            photos: self.photos.iter().filter(|p| p.featured).collect(),
            videos: self.videos.iter().filter(|v| v.featured).collect(),
        }
    }

    pub fn photo_by_id(&self, id: u32) -> Result<&Photo, QueryError> {
        self.photos
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| QueryError::NotFound {
                kind: "photo",
                id: id.to_string(),
            })
    }

    pub fn video_by_id(&self, id: u32) -> Result<&Video, QueryError> {
        self.videos
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| QueryError::NotFound {
                kind: "video",
                id: id.to_string(),
            })
    }
}

/// Keeps the items matching both the category filter and the search term,
/// in their original order.
///
/// The search term is matched case-insensitively as a substring of the title,
/// the description or any tag. An empty term matches everything.
pub fn filter_media<'a, M: Media>(
    items: &'a [M],
    filter: CategoryFilter,
    search: &str,
) -> Vec<&'a M> {
    let needle = search.to_lowercase();

    items
        .iter()
        .filter(|item| filter.matches(item.category()))
        .filter(|item| needle.is_empty() || matches_search(*item, &needle))
        .collect()
}

fn matches_search<M: Media>(item: &M, needle: &str) -> bool {
    item.title().to_lowercase().contains(needle)
        || item.description().to_lowercase().contains(needle)
        || item.tags().iter().any(|tag| tag.to_lowercase().contains(needle))
}

/// Items sorted newest first; ties keep their original order.
pub fn newest_first<'a, M: Media>(items: &'a [M]) -> Vec<&'a M> {
    let mut sorted: Vec<&M> = items.iter().collect();
    sorted.sort_by(|a, b| b.date().cmp(&a.date()));
    sorted
}

/// Distributes items round-robin: the item at index `i` lands in column
/// `i % column_count`.
pub fn build_masonry_columns<M>(
    items: &[M],
    column_count: usize,
) -> Result<Vec<Vec<&M>>, QueryError> {
    if column_count == 0 {
        return Err(QueryError::InvalidArgument("column count must be at least 1".to_string()));
    }

    let mut columns: Vec<Vec<&M>> = (0..column_count).map(|_| Vec::new()).collect();
    for (index, item) in items.iter().enumerate() {
        columns[index % column_count].push(item);
    }

    Ok(columns)
}

/// Number of masonry columns for a viewport width in pixels.
pub fn columns_for_width(width: u32) -> usize {
    match width {
        0..640 => 1,
        640..1024 => 2,
        _ => 3,
    }
}

/// Lightbox navigation: the index after `current`, wrapping to the start.
pub fn next_index(current: usize, len: usize) -> Result<usize, QueryError> {
    check_position(current, len)?;
    Ok((current + 1) % len)
}

/// Lightbox navigation: the index before `current`, wrapping to the end.
pub fn previous_index(current: usize, len: usize) -> Result<usize, QueryError> {
    check_position(current, len)?;
    Ok((current + len - 1) % len)
}

fn check_position(current: usize, len: usize) -> Result<(), QueryError> {
    if len == 0 {
        return Err(QueryError::InvalidArgument("empty media list".to_string()));
    }
    if current >= len {
        return Err(QueryError::InvalidArgument(format!(
            "index {current} out of range for {len} items"
        )));
    }
    Ok(())
}
