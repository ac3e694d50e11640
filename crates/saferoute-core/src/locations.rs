//! Named place catalog used to turn user-entered names into coordinates.

use crate::error::{RouteFailure, RouteResult};
use crate::models::Coordinate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationCategory {
    Residential,
    Commercial,
    Transport,
}

impl LocationCategory {
    pub const ALL: [LocationCategory; 3] = [
        LocationCategory::Residential,
        LocationCategory::Commercial,
        LocationCategory::Transport,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LocationCategory::Residential => "Residential",
            LocationCategory::Commercial => "Commercial",
            LocationCategory::Transport => "Transport",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLocation {
    pub name: String,
    pub category: LocationCategory,
    pub coordinate: Coordinate,
}

/// A resolved name, possibly substituted by the catalog default.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub name: String,
    pub coordinate: Coordinate,
    /// Set when the requested name was unknown and the default was used.
    pub fallback_for: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCatalog {
    locations: Vec<NamedLocation>,
    default_location: NamedLocation,
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl LocationCatalog {
    pub fn new(locations: Vec<NamedLocation>, default_location: NamedLocation) -> Self {
        Self {
            locations,
            default_location,
        }
    }

    /// Chennai places, defaulting to Chennai Central.
    pub fn chennai() -> Self {
        use LocationCategory::*;
        let place = |name: &str, category, lat: f64, lon: f64| NamedLocation {
            name: name.to_string(),
            category,
            coordinate: Coordinate::new(lat, lon),
        };
        let central = place("Chennai Central", Transport, 13.0827, 80.2707);
        Self::new(
            vec![
                place("Kolathur", Residential, 13.0737, 80.2075),
                place("Anna Nagar", Residential, 13.0850, 80.2101),
                place("Adyar", Residential, 13.0012, 80.2565),
                place("Velachery", Residential, 12.9815, 80.2180),
                place("Mylapore", Residential, 13.0368, 80.2676),
                place("Pulianthope", Residential, 13.0970, 80.2680),
                place("T. Nagar", Commercial, 13.0418, 80.2341),
                place("Nungambakkam", Commercial, 13.0569, 80.2425),
                place("Parrys Corner", Commercial, 13.0897, 80.2878),
                place("Guindy Industrial Estate", Commercial, 13.0109, 80.2136),
                place("Tidel Park", Commercial, 12.9893, 80.2483),
                central.clone(),
                place("Chennai Airport", Transport, 12.9941, 80.1709),
                place("Chennai Egmore", Transport, 13.0732, 80.2609),
                place("Koyambedu Bus Terminus", Transport, 13.0694, 80.1948),
                place("Tambaram", Transport, 12.9249, 80.1000),
            ],
            central,
        )
    }

    pub fn locations(&self) -> &[NamedLocation] {
        &self.locations
    }

    pub fn default_location(&self) -> &NamedLocation {
        &self.default_location
    }

    pub fn by_category(
        &self,
        category: LocationCategory,
    ) -> impl Iterator<Item = &NamedLocation> + '_ {
        self.locations
            .iter()
            .filter(move |location| location.category == category)
    }

    /// Case- and whitespace-insensitive lookup.
    pub fn find(&self, name: &str) -> Option<&NamedLocation> {
        let wanted = normalize(name);
        self.locations
            .iter()
            .find(|location| normalize(&location.name) == wanted)
    }

    pub fn resolve(&self, name: &str) -> RouteResult<ResolvedLocation> {
        self.find(name)
            .map(|location| ResolvedLocation {
                name: location.name.clone(),
                coordinate: location.coordinate,
                fallback_for: None,
            })
            .ok_or_else(|| RouteFailure::InputLocationUnknown {
                name: name.to_string(),
            })
    }

    /// Like [`resolve`](Self::resolve), but unknown names map to the default location.
    pub fn resolve_or_default(&self, name: &str) -> ResolvedLocation {
        self.resolve(name).unwrap_or_else(|_| {
            tracing::warn!(
                requested = name,
                fallback = %self.default_location.name,
                "unknown location, using default"
            );
            ResolvedLocation {
                name: self.default_location.name.clone(),
                coordinate: self.default_location.coordinate,
                fallback_for: Some(name.to_string()),
            }
        })
    }
}

impl Default for LocationCatalog {
    fn default() -> Self {
        Self::chennai()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_spacing() {
        let catalog = LocationCatalog::chennai();
        let found = catalog.find("  chennai   AIRPORT ").expect("airport");
        assert_eq!(found.coordinate, Coordinate::new(12.9941, 80.1709));
    }

    #[test]
    fn unknown_name_is_an_error_in_strict_resolution() {
        let catalog = LocationCatalog::chennai();
        assert_eq!(
            catalog.resolve("Atlantis"),
            Err(RouteFailure::InputLocationUnknown {
                name: "Atlantis".to_string()
            })
        );
    }

    #[test]
    fn unknown_name_falls_back_to_default() {
        let catalog = LocationCatalog::chennai();
        let resolved = catalog.resolve_or_default("Atlantis");
        assert_eq!(resolved.name, "Chennai Central");
        assert_eq!(resolved.coordinate, Coordinate::new(13.0827, 80.2707));
        assert_eq!(resolved.fallback_for.as_deref(), Some("Atlantis"));

        let known = catalog.resolve_or_default("Adyar");
        assert_eq!(known.fallback_for, None);
    }

    #[test]
    fn every_category_is_populated() {
        let catalog = LocationCatalog::chennai();
        for category in LocationCategory::ALL {
            assert!(
                catalog.by_category(category).count() >= 3,
                "{} has too few places",
                category.label()
            );
        }
    }
}
