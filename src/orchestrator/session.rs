use std::collections::HashMap;

use super::MarkerHandle;
use crate::domain::PlaceResult;

/// Monotonic search counter; results carrying an older value are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

/// How a line of user input should be treated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityInput {
    Blank,
    /// Same city as the one already shown
    Unchanged,
    Search(String),
}

/// Mutable state of the one search session: the current city, the rendered
/// rows and the markers keyed by place id.
///
/// Every marker key is the id of a rendered row. Rows without coordinates
/// have no marker.
pub struct SearchSession<M> {
    current_city: String,
    rows: Vec<PlaceResult>,
    markers: HashMap<String, M>,
    generation: Generation,
}

impl<M: MarkerHandle> SearchSession<M> {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            current_city: city.into(),
            rows: Vec::new(),
            markers: HashMap::new(),
            generation: Generation::default(),
        }
    }

    pub fn current_city(&self) -> &str {
        &self.current_city
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    pub fn classify_input(&self, raw: &str) -> CityInput {
        let city = raw.trim();
        if city.is_empty() {
            CityInput::Blank
        } else if city == self.current_city {
            CityInput::Unchanged
        } else {
            CityInput::Search(city.to_string())
        }
    }

    /// Start a new search cycle: tear down rows and markers, bump the generation.
    pub fn begin(&mut self, city: &str) -> Generation {
        self.teardown();
        self.current_city = city.to_string();
        self.generation = self.generation.next();
        self.generation
    }

    /// Remove every marker from the surface and forget every row
    pub fn teardown(&mut self) {
        for (_, mut marker) in self.markers.drain() {
            marker.remove();
        }
        self.rows.clear();
    }

    pub fn install_rows(&mut self, rows: Vec<PlaceResult>) {
        self.rows = rows;
    }

    /// Track a marker for a rendered row. Returns the marker back if there is
    /// no such row or the row already has one.
    pub fn insert_marker(&mut self, place_id: &str, marker: M) -> Result<(), M> {
        if self.markers.contains_key(place_id) || self.place(place_id).is_none() {
            return Err(marker);
        }
        self.markers.insert(place_id.to_string(), marker);
        Ok(())
    }

    pub fn rows(&self) -> &[PlaceResult] {
        &self.rows
    }

    pub fn place(&self, place_id: &str) -> Option<&PlaceResult> {
        self.rows.iter().find(|place| place.place_id == place_id)
    }

    pub fn marker_mut(&mut self, place_id: &str) -> Option<&mut M> {
        self.markers.get_mut(place_id)
    }

    pub fn has_marker(&self, place_id: &str) -> bool {
        self.markers.contains_key(place_id)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::Animation;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingMarker {
        removed: Rc<Cell<usize>>,
    }

    impl MarkerHandle for CountingMarker {
        fn remove(&mut self) {
            self.removed.set(self.removed.get() + 1);
        }
        fn animate(&mut self, _kind: Animation) {}
        fn stop_animation(&mut self) {}
    }

    fn place(id: &str) -> PlaceResult {
        PlaceResult {
            place_id: id.to_string(),
            name: id.to_uppercase(),
            rating: None,
            rating_count: None,
            address: None,
            coordinates: None,
            website: None,
            photo_reference: None,
        }
    }

    #[test]
    fn test_classify_input() {
        let session: SearchSession<CountingMarker> = SearchSession::new("Vilnius");
        assert_eq!(session.classify_input("   "), CityInput::Blank);
        assert_eq!(session.classify_input(" Vilnius "), CityInput::Unchanged);
        assert_eq!(
            session.classify_input(" Kaunas"),
            CityInput::Search("Kaunas".to_string())
        );
    }

    #[test]
    fn test_begin_tears_down_and_bumps_generation() {
        let removed = Rc::new(Cell::new(0));
        let mut session = SearchSession::new("Vilnius");
        let first = session.begin("Vilnius");

        session.install_rows(vec![place("a"), place("b")]);
        for id in ["a", "b"] {
            let marker = CountingMarker {
                removed: removed.clone(),
            };
            assert!(session.insert_marker(id, marker).is_ok());
        }
        assert_eq!(session.marker_count(), 2);

        let second = session.begin("Kaunas");

        assert!(second > first);
        assert!(!session.is_current(first));
        assert!(session.is_current(second));
        assert_eq!(session.current_city(), "Kaunas");
        assert_eq!(session.marker_count(), 0);
        assert!(session.rows().is_empty());
        assert_eq!(removed.get(), 2);
    }

    #[test]
    fn test_marker_requires_matching_row() {
        let removed = Rc::new(Cell::new(0));
        let mut session = SearchSession::new("Vilnius");
        session.install_rows(vec![place("a")]);

        let orphan = CountingMarker {
            removed: removed.clone(),
        };
        assert!(session.insert_marker("zzz", orphan).is_err());

        let first = CountingMarker {
            removed: removed.clone(),
        };
        let duplicate = CountingMarker {
            removed: removed.clone(),
        };
        assert!(session.insert_marker("a", first).is_ok());
        assert!(session.insert_marker("a", duplicate).is_err());
        assert!(session.has_marker("a"));
        assert_eq!(session.marker_count(), 1);
    }
}
