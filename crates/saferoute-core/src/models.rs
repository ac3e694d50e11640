//! Core data models for the route planner.

use crate::spatial::{haversine_distance_km, travel_minutes};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in kilometers.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_distance_km(self.lat, self.lon, other.lat, other.lon)
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        crate::spatial::haversine_distance(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Fixed rectangle covered by the routing grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    /// Greater Chennai, the region the bundled catalogs describe.
    pub const CHENNAI: GeoBounds = GeoBounds {
        min_lat: 12.90,
        max_lat: 13.20,
        min_lon: 80.10,
        max_lon: 80.32,
    };

    pub fn contains(&self, coord: &Coordinate) -> bool {
        coord.lat >= self.min_lat
            && coord.lat <= self.max_lat
            && coord.lon >= self.min_lon
            && coord.lon <= self.max_lon
    }
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self::CHENNAI
    }
}

/// A (row, col) index into the routing grid. Always within grid bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

/// How the traveller moves; selects the speed used for time costs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Car,
    Walk,
    Bike,
}

impl TravelMode {
    pub const ALL: [TravelMode; 3] = [TravelMode::Car, TravelMode::Walk, TravelMode::Bike];

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Car => "car",
            TravelMode::Walk => "walk",
            TravelMode::Bike => "bike",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" | "drive" | "driving" => Ok(TravelMode::Car),
            "walk" | "walking" | "foot" => Ok(TravelMode::Walk),
            "bike" | "bicycle" | "cycling" => Ok(TravelMode::Bike),
            other => Err(format!("unknown travel mode '{other}' (expected car, walk or bike)")),
        }
    }
}

// ========== HAZARD MODELS ==========

/// Why a zone is flagged as unsafe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardCategory {
    HighCrime,
    FloodProne,
    HeavyTraffic,
    /// Crime hotspot rated by a 1-10 severity score.
    CrimeScored,
}

impl HazardCategory {
    pub fn label(&self) -> &'static str {
        match self {
            HazardCategory::HighCrime => "high crime",
            HazardCategory::FloodProne => "flood prone",
            HazardCategory::HeavyTraffic => "heavy traffic",
            HazardCategory::CrimeScored => "crime scored",
        }
    }
}

/// A circular hazard region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardZone {
    pub name: String,
    pub center: Coordinate,
    pub radius_m: f64,
    pub category: HazardCategory,
    /// 1-10, only meaningful for [`HazardCategory::CrimeScored`].
    #[serde(default)]
    pub severity: u8,
}

impl HazardZone {
    pub fn new(
        name: impl Into<String>,
        center: Coordinate,
        radius_m: f64,
        category: HazardCategory,
    ) -> Self {
        Self {
            name: name.into(),
            center,
            radius_m,
            category,
            severity: 0,
        }
    }

    /// A [`HazardCategory::CrimeScored`] zone; severity is clamped to 1-10.
    pub fn scored(name: impl Into<String>, center: Coordinate, radius_m: f64, severity: u8) -> Self {
        Self {
            severity: severity.clamp(1, 10),
            ..Self::new(name, center, radius_m, HazardCategory::CrimeScored)
        }
    }

    /// Distance in meters from `coord` to the zone boundary, 0 when inside.
    pub fn boundary_distance_m(&self, coord: &Coordinate) -> f64 {
        (self.center.distance_m(coord) - self.radius_m).max(0.0)
    }

    pub fn contains(&self, coord: &Coordinate) -> bool {
        self.center.distance_m(coord) <= self.radius_m
    }
}

/// Which hazard categories a single route computation should avoid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardQuery {
    #[serde(default)]
    pub avoid_high_crime: bool,
    #[serde(default)]
    pub avoid_flood_prone: bool,
    #[serde(default)]
    pub avoid_heavy_traffic: bool,
}

impl HazardQuery {
    /// Avoid every category.
    pub const ALL: HazardQuery = HazardQuery {
        avoid_high_crime: true,
        avoid_flood_prone: true,
        avoid_heavy_traffic: true,
    };

    /// Avoid nothing beyond the always-blocking severe zones.
    pub const NONE: HazardQuery = HazardQuery {
        avoid_high_crime: false,
        avoid_flood_prone: false,
        avoid_heavy_traffic: false,
    };
}

// ========== ROUTES ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    /// Time-minimizing; hazards only inflate cost.
    Fastest,
    /// Never enters an active hazard zone.
    Safe,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::Fastest => "fastest",
            RouteKind::Safe => "safe",
        }
    }
}

/// A computed route from start to end, both inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    pub kind: RouteKind,
    pub mode: TravelMode,
    pub waypoints: Vec<Coordinate>,
    pub total_distance_km: f64,
    pub total_time_min: f64,
    pub summary: String,
    /// Grid cells expanded by the search that produced this route.
    pub cells_expanded: usize,
    /// How much of the route runs through costed hazard zones.
    #[serde(default)]
    pub exposure: HazardExposure,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Hazard exposure of a route, used to rank alternatives (lower is better).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HazardExposure {
    /// Legs whose end waypoint lies inside a costed zone.
    pub legs_in_zones: usize,
    /// Total length of those legs.
    pub distance_km: f64,
    /// Sum of leg length times the zone cost multiplier over those legs.
    pub score: f64,
}

impl Route {
    /// Build a route, summing distance and travel time along consecutive waypoints.
    pub fn from_waypoints(
        name: impl Into<String>,
        kind: RouteKind,
        mode: TravelMode,
        speed_kmh: f64,
        waypoints: Vec<Coordinate>,
    ) -> Self {
        let total_distance_km = path_distance_km(&waypoints);
        let total_time_min = waypoints
            .windows(2)
            .map(|pair| travel_minutes(pair[0].distance_km(&pair[1]), speed_kmh))
            .fold(0.0, |total, minutes| total + minutes);
        let summary = match kind {
            RouteKind::Safe => format!(
                "Secure route calculated. Distance: {:.2} km",
                total_distance_km
            ),
            RouteKind::Fastest => format!(
                "Fastest route calculated. Distance: {:.2} km, Time: {:.2} mins",
                total_distance_km, total_time_min
            ),
        };
        Self {
            name: name.into(),
            kind,
            mode,
            waypoints,
            total_distance_km,
            total_time_min,
            summary,
            cells_expanded: 0,
            exposure: HazardExposure::default(),
            warnings: Vec::new(),
        }
    }

    /// One-line description for the map panel.
    pub fn describe(&self) -> String {
        let (from, to) = self
            .name
            .split_once(" to ")
            .unwrap_or((self.name.as_str(), self.name.as_str()));
        format!(
            "Route from {} to {} ({}): {:.2} km, {:.2} mins",
            from, to, self.mode, self.total_distance_km, self.total_time_min
        )
    }

    /// Start, every direction change, and end.
    ///
    /// Grid paths move in one of eight fixed directions, so a waypoint whose
    /// incoming and outgoing steps point the same way carries no information
    /// for a turn-by-turn router.
    pub fn turn_points(&self) -> Vec<Coordinate> {
        if self.waypoints.len() <= 2 {
            return self.waypoints.clone();
        }
        let mut points = vec![self.waypoints[0]];
        for window in self.waypoints.windows(3) {
            let (a, b, c) = (window[0], window[1], window[2]);
            if !continues_straight(&a, &b, &c) {
                points.push(b);
            }
        }
        if let Some(last) = self.waypoints.last() {
            points.push(*last);
        }
        points
    }
}

/// Sum of great-circle distances between consecutive points, in kilometers.
pub fn path_distance_km(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].distance_km(&pair[1]))
        .fold(0.0, |total, km| total + km)
}

/// Order routes by exposure score, least exposed first; ties keep their order.
pub fn sort_by_exposure(routes: &mut [Route]) {
    routes.sort_by(|a, b| a.exposure.score.total_cmp(&b.exposure.score));
}

fn continues_straight(a: &Coordinate, b: &Coordinate, c: &Coordinate) -> bool {
    const EPS: f64 = 1e-9;
    let (ux, uy) = (b.lon - a.lon, b.lat - a.lat);
    let (vx, vy) = (c.lon - b.lon, c.lat - b.lat);
    let cross = ux * vy - uy * vx;
    let dot = ux * vx + uy * vy;
    let scale = (ux.hypot(uy) * vx.hypot(vy)).max(EPS);
    cross.abs() / scale < 1e-6 && dot > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_then_turn() -> Route {
        let waypoints = vec![
            Coordinate::new(13.000, 80.200),
            Coordinate::new(13.005, 80.200),
            Coordinate::new(13.010, 80.200),
            Coordinate::new(13.015, 80.205),
            Coordinate::new(13.020, 80.210),
        ];
        Route::from_waypoints("A to B", RouteKind::Fastest, TravelMode::Car, 40.0, waypoints)
    }

    #[test]
    fn route_totals_sum_consecutive_legs() {
        let route = straight_then_turn();
        let expected: f64 = route
            .waypoints
            .windows(2)
            .map(|w| w[0].distance_km(&w[1]))
            .sum();
        assert!((route.total_distance_km - expected).abs() < 1e-12);
        assert!((route.total_time_min - expected / 40.0 * 60.0).abs() < 1e-9);
    }

    #[test]
    fn single_waypoint_route_is_zero_length() {
        let here = Coordinate::new(13.0827, 80.2707);
        let route = Route::from_waypoints("X to X", RouteKind::Safe, TravelMode::Walk, 5.0, vec![here]);
        assert_eq!(route.total_distance_km, 0.0);
        assert!(route.total_distance_km.is_sign_positive());
        assert!(route.total_time_min.is_sign_positive());
        assert_eq!(route.summary, "Secure route calculated. Distance: 0.00 km");

        let fastest =
            Route::from_waypoints("X to X", RouteKind::Fastest, TravelMode::Car, 40.0, vec![here]);
        assert_eq!(
            fastest.summary,
            "Fastest route calculated. Distance: 0.00 km, Time: 0.00 mins"
        );
        assert!(fastest.describe().ends_with("0.00 km, 0.00 mins"));
    }

    #[test]
    fn turn_points_keep_only_direction_changes() {
        let route = straight_then_turn();
        let turns = route.turn_points();
        assert_eq!(
            turns,
            vec![
                Coordinate::new(13.000, 80.200),
                Coordinate::new(13.010, 80.200),
                Coordinate::new(13.020, 80.210),
            ]
        );
    }

    #[test]
    fn describe_uses_endpoint_names_and_mode() {
        let route = straight_then_turn();
        let line = route.describe();
        assert!(line.starts_with("Route from A to B (car): "), "{line}");
        assert!(line.ends_with(" mins"));
    }

    #[test]
    fn travel_mode_parses_aliases() {
        assert_eq!("Walking".parse::<TravelMode>(), Ok(TravelMode::Walk));
        assert_eq!(" bike ".parse::<TravelMode>(), Ok(TravelMode::Bike));
        assert!("boat".parse::<TravelMode>().is_err());
    }

    #[test]
    fn zone_boundary_distance_is_floored_at_zero() {
        let zone = HazardZone::new(
            "test",
            Coordinate::new(13.0, 80.2),
            500.0,
            HazardCategory::FloodProne,
        );
        assert_eq!(zone.boundary_distance_m(&zone.center), 0.0);
        assert!(zone.contains(&zone.center));
        let far = Coordinate::new(13.02, 80.2);
        assert!(zone.boundary_distance_m(&far) > 1500.0);
    }

    #[test]
    fn scored_zone_severity_is_clamped() {
        let zone = HazardZone::scored("hot", Coordinate::new(13.0, 80.2), 100.0, 42);
        assert_eq!(zone.severity, 10);
        assert_eq!(zone.category, HazardCategory::CrimeScored);
    }

    #[test]
    fn routes_rank_least_exposed_first() {
        let mut exposed = straight_then_turn();
        exposed.name = "exposed".into();
        exposed.exposure.score = 3.0;
        let mut clean = straight_then_turn();
        clean.name = "clean".into();
        let mut routes = vec![exposed, clean];
        sort_by_exposure(&mut routes);
        assert_eq!(routes[0].name, "clean");
        assert_eq!(routes[1].name, "exposed");
    }
}
