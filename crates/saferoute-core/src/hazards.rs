//! Hazard zone catalog and the membership/proximity queries the planners run against it.
//!
//! A zone is *active* for a query when its category toggle is on, or when it
//! is a crime-scored zone at or above [`SEVERE_CRIME_SEVERITY`]. Severe zones
//! are active regardless of the toggles. All radii and distances are meters.

use crate::models::{Coordinate, HazardCategory, HazardExposure, HazardQuery, HazardZone};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Crime-scored zones at or above this severity always block safe routes.
pub const SEVERE_CRIME_SEVERITY: u8 = 7;

/// Default radius for proximity alerts, in meters.
pub const DEFAULT_ALERT_RADIUS_M: f64 = 500.0;

/// Cost multipliers the fastest planner applies inside hazard zones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardCosts {
    /// Inside an active or avoided zone that is not severe.
    pub mild_multiplier: f64,
    /// Inside a severe crime-scored zone.
    pub severe_multiplier: f64,
}

impl Default for HazardCosts {
    fn default() -> Self {
        Self {
            mild_multiplier: 10.0,
            severe_multiplier: 100.0,
        }
    }
}

/// A nearby active zone, reported by [`HazardCatalog::proximity_alerts`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardAlert {
    pub zone: String,
    pub category: HazardCategory,
    pub severity: u8,
    /// Distance to the zone boundary; 0 when already inside.
    pub distance_m: f64,
}

impl HazardAlert {
    pub fn message(&self) -> String {
        if self.distance_m <= 0.0 {
            format!(
                "Warning: you are inside {} ({} area)!",
                self.zone,
                self.category.label()
            )
        } else {
            format!(
                "Warning: you are {:.0} m from {} ({} area)",
                self.distance_m,
                self.zone,
                self.category.label()
            )
        }
    }
}

/// Read-only set of hazard zones, loaded once and shared by every search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HazardCatalog {
    zones: Vec<HazardZone>,
}

pub fn is_severe(zone: &HazardZone) -> bool {
    zone.category == HazardCategory::CrimeScored && zone.severity >= SEVERE_CRIME_SEVERITY
}

/// Whether `zone` blocks safe routes under `query`.
pub fn is_zone_active(zone: &HazardZone, query: &HazardQuery) -> bool {
    match zone.category {
        HazardCategory::HighCrime => query.avoid_high_crime,
        HazardCategory::FloodProne => query.avoid_flood_prone,
        HazardCategory::HeavyTraffic => query.avoid_heavy_traffic,
        HazardCategory::CrimeScored => is_severe(zone),
    }
}

/// Whether the fastest planner should charge extra for `zone` under `query`.
///
/// Everything active counts, plus milder crime-scored zones when crime is
/// being avoided.
fn is_zone_costed(zone: &HazardZone, query: &HazardQuery) -> bool {
    is_zone_active(zone, query)
        || (zone.category == HazardCategory::CrimeScored && query.avoid_high_crime)
}

impl HazardCatalog {
    pub fn new(zones: Vec<HazardZone>) -> Self {
        Self { zones }
    }

    /// An empty catalog; no zone is ever active.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The bundled Chennai catalog.
    pub fn chennai() -> Self {
        use HazardCategory::*;
        let zone = |name: &str, lat: f64, lon: f64, radius_m: f64, category| {
            HazardZone::new(name, Coordinate::new(lat, lon), radius_m, category)
        };
        let scored = |name: &str, lat: f64, lon: f64, radius_m: f64, severity: u8| {
            HazardZone::scored(name, Coordinate::new(lat, lon), radius_m, severity)
        };
        Self::new(vec![
            zone("Washermanpet", 13.1120, 80.2870, 600.0, HighCrime),
            zone("Vyasarpadi", 13.1040, 80.2600, 500.0, HighCrime),
            zone("Kodungaiyur", 13.1330, 80.2480, 700.0, HighCrime),
            zone("Velachery Lake Basin", 12.9790, 80.2200, 900.0, FloodProne),
            zone("Pallikaranai Marsh", 12.9400, 80.2150, 1500.0, FloodProne),
            zone("Adyar Estuary", 13.0130, 80.2750, 700.0, FloodProne),
            zone("Kathipara Junction", 13.0070, 80.2050, 500.0, HeavyTraffic),
            zone("Koyambedu Junction", 13.0700, 80.1950, 600.0, HeavyTraffic),
            zone("Gemini Flyover", 13.0560, 80.2510, 400.0, HeavyTraffic),
            scored("Broadway", 13.0880, 80.2840, 350.0, 8),
            scored("Pulianthope", 13.0970, 80.2680, 500.0, 9),
            scored("Royapuram", 13.1140, 80.2940, 450.0, 7),
            scored("Saidapet Bridge", 13.0230, 80.2230, 400.0, 5),
            scored("Tambaram Market", 12.9250, 80.1180, 500.0, 6),
        ])
    }

    pub fn zones(&self) -> &[HazardZone] {
        &self.zones
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zones active under `query`. The iterator borrows only the catalog.
    pub fn active_zones(&self, query: &HazardQuery) -> impl Iterator<Item = &HazardZone> + '_ {
        let query = *query;
        self.zones
            .iter()
            .filter(move |zone| is_zone_active(zone, &query))
    }

    /// First active zone (in catalog order) that contains `coord`.
    pub fn active_zone_containing(
        &self,
        coord: &Coordinate,
        query: &HazardQuery,
    ) -> Option<&HazardZone> {
        self.active_zones(query).find(|zone| zone.contains(coord))
    }

    pub fn is_inside_any_active_zone(&self, coord: &Coordinate, query: &HazardQuery) -> bool {
        self.active_zone_containing(coord, query).is_some()
    }

    /// Smallest boundary distance to an active zone in meters, floored at 0.
    ///
    /// Infinite when no zone is active.
    pub fn min_distance_to_active_hazard_m(&self, coord: &Coordinate, query: &HazardQuery) -> f64 {
        self.active_zones(query)
            .map(|zone| zone.boundary_distance_m(coord))
            .fold(f64::INFINITY, f64::min)
    }

    /// Time multiplier for entering `coord` with the default cost tiers.
    pub fn cost_multiplier(&self, coord: &Coordinate, query: &HazardQuery) -> f64 {
        self.cost_multiplier_with(coord, query, &HazardCosts::default())
    }

    /// Time multiplier for entering `coord`: 1.0 outside every costed zone,
    /// otherwise the highest tier among the zones containing it.
    pub fn cost_multiplier_with(
        &self,
        coord: &Coordinate,
        query: &HazardQuery,
        costs: &HazardCosts,
    ) -> f64 {
        self.zones
            .iter()
            .filter(|zone| is_zone_costed(zone, query) && zone.contains(coord))
            .map(|zone| {
                if is_severe(zone) {
                    costs.severe_multiplier
                } else {
                    costs.mild_multiplier
                }
            })
            .fold(1.0, f64::max)
    }

    /// Exposure of a waypoint sequence: legs ending in a costed zone,
    /// weighted by the multiplier the fastest planner applies there.
    pub fn exposure(
        &self,
        waypoints: &[Coordinate],
        query: &HazardQuery,
        costs: &HazardCosts,
    ) -> HazardExposure {
        let mut exposure = HazardExposure::default();
        for pair in waypoints.windows(2) {
            let multiplier = self.cost_multiplier_with(&pair[1], query, costs);
            if multiplier > 1.0 {
                let leg_km = pair[0].distance_km(&pair[1]);
                exposure.legs_in_zones += 1;
                exposure.distance_km += leg_km;
                exposure.score += leg_km * multiplier;
            }
        }
        exposure
    }

    /// Active zones whose boundary lies within `within_m` of `coord`, nearest first.
    pub fn proximity_alerts(
        &self,
        coord: &Coordinate,
        within_m: f64,
        query: &HazardQuery,
    ) -> Vec<HazardAlert> {
        let mut alerts: Vec<HazardAlert> = self
            .active_zones(query)
            .filter_map(|zone| {
                let distance_m = zone.boundary_distance_m(coord);
                (distance_m <= within_m).then(|| HazardAlert {
                    zone: zone.name.clone(),
                    category: zone.category,
                    severity: zone.severity,
                    distance_m,
                })
            })
            .collect();
        alerts.sort_by(|a, b| {
            a.distance_m
                .partial_cmp(&b.distance_m)
                .unwrap_or(Ordering::Equal)
        });
        alerts
    }
}
