use super::Coordinates;
use crate::api::PlaceEntry;
use serde_json::Value;
use std::collections::HashSet;

/// A restaurant ready to be rendered as a list row and (optionally) a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceResult {
    /// Provider `place_id`, shared by the list row and its marker
    pub place_id: String,
    pub name: String,
    /// 0-5 stars
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
    pub address: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub website: Option<String>,
    pub photo_reference: Option<String>,
}

impl PlaceResult {
    /// Validate a raw provider entry. Entries without a name or place id are dropped.
    pub fn from_entry(entry: PlaceEntry) -> Option<Self> {
        let place_id = entry.place_id.filter(|id| !id.is_empty())?;
        let name = entry.name.filter(|name| !name.is_empty())?;

        Some(Self {
            place_id,
            name,
            rating: entry.rating,
            rating_count: entry.user_ratings_total,
            address: entry.formatted_address,
            coordinates: entry.geometry.and_then(|g| g.location),
            website: entry.website.filter(|url| !url.is_empty()),
            photo_reference: entry
                .photos
                .into_iter()
                .find_map(|photo| photo.photo_reference),
        })
    }

    /// Rating used for ordering; unrated places sort as 0
    pub fn sort_rating(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    pub fn rating_label(&self) -> String {
        match self.rating {
            Some(rating) => format!("{:.1}", rating),
            None => "N/A".to_string(),
        }
    }

    pub fn address_label(&self) -> &str {
        self.address.as_deref().unwrap_or("Address not available")
    }
}

/// Turn one page of provider entries into the rendered order.
///
/// # Algorithm
/// 1. Drop malformed entries and entries missing `name` or `place_id`
/// 2. Keep only the first entry per `place_id`
/// 3. Stable sort by rating, highest first (ties keep provider order)
pub fn rank_places(entries: Vec<Value>) -> Vec<PlaceResult> {
    let mut seen = HashSet::new();
    let mut places: Vec<PlaceResult> = entries
        .into_iter()
        .filter_map(PlaceEntry::from_value)
        .filter_map(PlaceResult::from_entry)
        .filter(|place| seen.insert(place.place_id.clone()))
        .collect();

    places.sort_by(|a, b| b.sort_rating().total_cmp(&a.sort_rating()));
    places
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(json: &str) -> Vec<Value> {
        serde_json::from_str(json).unwrap()
    }

    fn entry(json: &str) -> PlaceEntry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_from_entry_full() {
        let json = r#"{
            "place_id": "abc",
            "name": "Sofa de Pancho",
            "rating": 4.6,
            "user_ratings_total": 812,
            "formatted_address": "Pylimo g. 1, Vilnius",
            "geometry": {"location": {"lat": 54.68, "lng": 25.28}},
            "website": "https://example.lt",
            "photos": [{"photo_reference": "ph-1"}]
        }"#;
        let place = PlaceResult::from_entry(entry(json)).unwrap();

        assert_eq!(place.place_id, "abc");
        assert_eq!(place.rating, Some(4.6));
        assert_eq!(place.rating_count, Some(812));
        assert_eq!(place.coordinates, Some(Coordinates::new(54.68, 25.28)));
        assert_eq!(place.photo_reference.as_deref(), Some("ph-1"));
        assert_eq!(place.rating_label(), "4.6");
    }

    #[test]
    fn test_invalid_entries_dropped() {
        let json = r#"[
            {"place_id": "a"},
            {"name": "No id"},
            {"place_id": "", "name": "Empty id"},
            {"place_id": "b", "name": ""},
            {"place_id": "c", "name": "Valid"}
        ]"#;
        let ranked = rank_places(entries(json));

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].place_id, "c");
    }

    #[test]
    fn test_wrong_typed_entry_dropped_alone() {
        let json = r#"[
            {"place_id": 42, "name": "Numeric id", "rating": 5.0},
            {"place_id": "nophotos", "name": "No photos", "rating": 3.0, "photos": null},
            {"place_id": "good", "name": "Good", "rating": 4.5}
        ]"#;
        let ids: Vec<String> = rank_places(entries(json))
            .into_iter()
            .map(|p| p.place_id)
            .collect();

        assert_eq!(ids, vec!["good", "nophotos"]);
    }

    #[test]
    fn test_sort_treats_missing_rating_as_zero() {
        let json = r#"[
            {"place_id": "a", "name": "A", "rating": 3.5},
            {"place_id": "b", "name": "B"},
            {"place_id": "c", "name": "C", "rating": 4.8}
        ]"#;
        let ranked = rank_places(entries(json));
        let ratings: Vec<Option<f64>> = ranked.iter().map(|p| p.rating).collect();

        assert_eq!(ratings, vec![Some(4.8), Some(3.5), None]);
    }

    #[test]
    fn test_ties_keep_provider_order() {
        let json = r#"[
            {"place_id": "first", "name": "First", "rating": 4.5},
            {"place_id": "top", "name": "Top", "rating": 4.9},
            {"place_id": "second", "name": "Second", "rating": 4.5},
            {"place_id": "unrated", "name": "Unrated"},
            {"place_id": "zero", "name": "Zero", "rating": 0.0}
        ]"#;
        let ids: Vec<String> = rank_places(entries(json))
            .into_iter()
            .map(|p| p.place_id)
            .collect();

        assert_eq!(ids, vec!["top", "first", "second", "unrated", "zero"]);
    }

    #[test]
    fn test_duplicate_place_ids_keep_first() {
        let json = r#"[
            {"place_id": "dup", "name": "Original", "rating": 3.0},
            {"place_id": "dup", "name": "Copy", "rating": 5.0}
        ]"#;
        let ranked = rank_places(entries(json));

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].name, "Original");
    }

    #[test]
    fn test_labels_for_missing_fields() {
        let place = PlaceResult::from_entry(entry(r#"{"place_id":"x","name":"X"}"#)).unwrap();

        assert_eq!(place.rating_label(), "N/A");
        assert_eq!(place.address_label(), "Address not available");
        assert!(place.coordinates.is_none());
        assert!(place.website.is_none());
    }
}
