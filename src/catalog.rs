use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::map::coordinates::WGS84Coordinate;

/// One static landmark entry: a display name, the Wikipedia page it refers
/// to, and where it sits on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
  pub name: String,
  pub page_title: String,
  pub coordinate: WGS84Coordinate,
}

impl Place {
  #[must_use]
  pub fn new(name: &str, page_title: &str, lat: f32, lon: f32) -> Self {
    Self {
      name: name.to_string(),
      page_title: page_title.to_string(),
      coordinate: WGS84Coordinate::new(lat, lon),
    }
  }
}

impl Display for Place {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name)
  }
}

/// The fixed landmark catalog. Insertion order is significant: markers are
/// correlated with places by index.
#[must_use]
pub fn chicago_landmarks() -> Vec<Place> {
  vec![
    Place::new("Hull House", "Hull_House", 41.871_643, -87.647_692),
    Place::new("Shedd Aquarium", "Shedd_Aquarium", 41.867_573, -87.614_038),
    Place::new("Pui Tak Center", "Pui_Tak_Center", 41.852_397, -87.632_291),
    Place::new(
      "Chicago Union Station",
      "Chicago_Union_Station",
      41.878_665,
      -87.639_200,
    ),
    Place::new(
      "Civic Opera House",
      "Civic_Opera_House_(Chicago)",
      41.882_564,
      -87.637_425,
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn catalog_names_are_unique() {
    let places = chicago_landmarks();
    let mut names: Vec<_> = places.iter().map(|p| p.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), places.len());
  }

  #[test]
  fn catalog_coordinates_are_valid() {
    for place in chicago_landmarks() {
      assert!(place.coordinate.is_valid(), "{} out of range", place.name);
    }
  }

  #[test]
  fn catalog_order_is_fixed() {
    let places = chicago_landmarks();
    assert_eq!(places.len(), 5);
    assert_eq!(places[0].name, "Hull House");
    assert_eq!(places[4].name, "Civic Opera House");
  }
}
