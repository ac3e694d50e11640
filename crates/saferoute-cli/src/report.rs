//! Plain-text rendering of routes, catalogs and alerts for the CLI binaries.

use saferoute_core::{
    HazardAlert, HazardCatalog, HazardQuery, LocationCatalog, LocationCategory, Route,
};
use std::fmt::Write;

pub fn route_report(route: &Route, turns_only: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", route.summary);
    let _ = writeln!(out, "{}", route.describe());
    let _ = writeln!(
        out,
        "Kind: {}, cells expanded: {}",
        route.kind.as_str(),
        route.cells_expanded
    );
    let _ = writeln!(
        out,
        "Hazard exposure: {:.2} km over {} legs (score {:.2})",
        route.exposure.distance_km, route.exposure.legs_in_zones, route.exposure.score
    );
    for warning in &route.warnings {
        let _ = writeln!(out, "Warning: {}", warning);
    }

    let points = if turns_only {
        route.turn_points()
    } else {
        route.waypoints.clone()
    };
    let _ = writeln!(out, "Waypoints ({}):", points.len());
    for (i, point) in points.iter().enumerate() {
        let _ = writeln!(out, "  [{:3}] ({:.6}, {:.6})", i, point.lat, point.lon);
    }
    out
}

pub fn locations_report(catalog: &LocationCatalog) -> String {
    let mut out = String::new();
    for category in LocationCategory::ALL {
        let _ = writeln!(out, "{}:", category.label());
        for location in catalog.by_category(category) {
            let _ = writeln!(
                out,
                "  {:<26} ({:.4}, {:.4})",
                location.name, location.coordinate.lat, location.coordinate.lon
            );
        }
    }
    let _ = writeln!(out, "Default: {}", catalog.default_location().name);
    out
}

/// Every zone, marking the ones active under `query`.
pub fn hazards_report(catalog: &HazardCatalog, query: &HazardQuery) -> String {
    let active: Vec<&str> = catalog
        .active_zones(query)
        .map(|zone| zone.name.as_str())
        .collect();
    let mut out = String::new();
    for zone in catalog.zones() {
        let marker = if active.contains(&zone.name.as_str()) {
            '*'
        } else {
            ' '
        };
        let _ = writeln!(
            out,
            "{} {:<22} {:<14} sev {:>2}  r {:>5.0} m  ({:.4}, {:.4})",
            marker,
            zone.name,
            zone.category.label(),
            zone.severity,
            zone.radius_m,
            zone.center.lat,
            zone.center.lon
        );
    }
    out
}

pub fn alerts_report(alerts: &[HazardAlert]) -> String {
    if alerts.is_empty() {
        return "No active hazards nearby.\n".to_string();
    }
    let mut out = String::new();
    for alert in alerts {
        let _ = writeln!(out, "{}", alert.message());
    }
    out
}
