use super::*;
use crate::Fixtures;

fn ids<M: Media>(items: &[M]) -> Vec<u32> {
    items.iter().map(|m| m.id()).collect()
}

#[test]
fn test_filter_all_and_empty_search_is_identity() {
    let fixtures = Fixtures::embedded().unwrap();
    let photos = &fixtures.gallery().photos;

    let filtered = filter_media(photos, CategoryFilter::All, "");
    assert_eq!(ids(&filtered), ids(photos));
}

#[test]
fn test_filter_by_category_keeps_order() {
    let fixtures = Fixtures::embedded().unwrap();
    let photos = &fixtures.gallery().photos;

    let filtered = filter_media(photos, CategoryFilter::Only(MediaCategory::Traditions), "");
    assert_eq!(ids(&filtered), vec![3, 10, 12]);
}

#[test]
fn test_search_is_case_insensitive_over_title_description_and_tags() {
    let fixtures = Fixtures::embedded().unwrap();
    let photos = &fixtures.gallery().photos;

    // title
    assert_eq!(ids(&filter_media(photos, CategoryFilter::All, "BEACH")), vec![2]);
    // description
    assert_eq!(ids(&filter_media(photos, CategoryFilter::All, "garden")), vec![6]);
    // tags only
    assert_eq!(ids(&filter_media(photos, CategoryFilter::All, "Milestone")), vec![4, 6]);
}

#[test]
fn test_category_and_search_compose() {
    let fixtures = Fixtures::embedded().unwrap();
    let photos = &fixtures.gallery().photos;

    let filtered = filter_media(
        photos,
        CategoryFilter::Only(MediaCategory::Celebrations),
        "celebration",
    );
    assert_eq!(ids(&filtered), vec![4, 7]);
}

#[test]
fn test_filter_is_idempotent() {
    let fixtures = Fixtures::embedded().unwrap();
    let videos = &fixtures.gallery().videos;
    let filter = CategoryFilter::Only(MediaCategory::Traditions);

    let once = filter_media(videos, filter, "christmas");
    let twice = filter_media(&once, filter, "christmas");
    assert_eq!(ids(&once), vec![4]);
    assert_eq!(ids(&twice), ids(&once));
}

#[test]
fn test_category_filter_from_str() {
    assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
    assert_eq!(
        "family-reunions".parse::<CategoryFilter>().unwrap(),
        CategoryFilter::Only(MediaCategory::FamilyReunions)
    );
    assert!("holidays".parse::<CategoryFilter>().is_err());
}

#[test]
fn test_featured_media() {
    let fixtures = Fixtures::embedded().unwrap();
    let featured = fixtures.gallery().featured_media();

    assert_eq!(ids(&featured.photos), vec![1, 2, 4, 6, 8, 10, 12]);
    assert_eq!(ids(&featured.videos), vec![1, 2, 4, 6]);
}

#[test]
fn test_masonry_columns_round_robin() {
    let items: Vec<u32> = (0..7).collect();
    let columns = build_masonry_columns(&items, 3).unwrap();

    assert_eq!(columns.len(), 3);
    assert_eq!(columns[0], vec![&0, &3, &6]);
    assert_eq!(columns[1], vec![&1, &4]);
    assert_eq!(columns[2], vec![&2, &5]);

    let mut all: Vec<u32> = columns.into_iter().flatten().copied().collect();
    all.sort();
    assert_eq!(all, items);
}

#[test]
fn test_masonry_more_columns_than_items() {
    let items = vec!["a", "b"];
    let columns = build_masonry_columns(&items, 4).unwrap();

    assert_eq!(columns.len(), 4);
    assert!(columns[2].is_empty());
    assert!(columns[3].is_empty());
}

#[test]
fn test_masonry_rejects_zero_columns() {
    let items = vec![1, 2, 3];
    assert!(matches!(
        build_masonry_columns(&items, 0),
        Err(QueryError::InvalidArgument(_))
    ));
}

#[test]
fn test_columns_for_width() {
    assert_eq!(columns_for_width(320), 1);
    assert_eq!(columns_for_width(640), 2);
    assert_eq!(columns_for_width(1023), 2);
    assert_eq!(columns_for_width(1440), 3);
}

#[test]
fn test_lightbox_navigation_wraps() {
    assert_eq!(next_index(11, 12).unwrap(), 0);
    assert_eq!(next_index(3, 12).unwrap(), 4);
    assert_eq!(previous_index(0, 12).unwrap(), 11);
    assert!(next_index(0, 0).is_err());
    assert!(previous_index(5, 5).is_err());
}

#[test]
fn test_newest_first() {
    let fixtures = Fixtures::embedded().unwrap();
    let sorted = newest_first(&fixtures.gallery().videos);

    assert_eq!(ids(&sorted), vec![1, 6, 5, 4, 3, 2]);
}

#[test]
fn test_category_labels_come_from_config() {
    assert_eq!(MediaCategory::Travels.label(), "Family Travels");
    assert_eq!(
        MediaCategory::Candid.description(),
        "Everyday family life"
    );
}

#[test]
fn test_category_by_id() {
    assert_eq!(category_by_id("candid").unwrap(), MediaCategory::Candid);
    assert!(matches!(
        category_by_id("holidays"),
        Err(QueryError::NotFound { kind: "category", .. })
    ));
}
