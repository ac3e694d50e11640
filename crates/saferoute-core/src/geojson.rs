//! GeoJSON export/import for computed routes.
//!
//! A route becomes a single `Feature` with a `LineString` geometry whose
//! positions are `[lon, lat]`, as GeoJSON requires.

use crate::models::{Coordinate, Route, RouteKind, TravelMode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoJsonError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a Feature, found '{0}'")]
    NotAFeature(String),

    #[error("expected a LineString geometry, found '{0}'")]
    NotALineString(String),

    #[error("position {0} has fewer than two values")]
    ShortPosition(usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteProperties {
    pub name: String,
    pub mode: TravelMode,
    pub kind: RouteKind,
    pub distance_km: f64,
    pub time_min: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Feature<P> {
    #[serde(rename = "type")]
    kind: String,
    geometry: Geometry,
    #[serde(default)]
    properties: P,
}

pub fn to_geojson(route: &Route) -> serde_json::Value {
    let feature = Feature {
        kind: "Feature".to_string(),
        geometry: Geometry {
            kind: "LineString".to_string(),
            coordinates: route
                .waypoints
                .iter()
                .map(|point| vec![point.lon, point.lat])
                .collect(),
        },
        properties: RouteProperties {
            name: route.name.clone(),
            mode: route.mode,
            kind: route.kind,
            distance_km: route.total_distance_km,
            time_min: route.total_time_min,
        },
    };
    serde_json::json!(feature)
}

pub fn to_geojson_string(route: &Route) -> Result<String, GeoJsonError> {
    Ok(serde_json::to_string_pretty(&to_geojson(route))?)
}

/// Ordered waypoints of a LineString feature. Properties are not required.
pub fn waypoints_from_geojson(text: &str) -> Result<Vec<Coordinate>, GeoJsonError> {
    let feature: Feature<serde_json::Value> = serde_json::from_str(text)?;
    if feature.kind != "Feature" {
        return Err(GeoJsonError::NotAFeature(feature.kind));
    }
    if feature.geometry.kind != "LineString" {
        return Err(GeoJsonError::NotALineString(feature.geometry.kind));
    }
    feature
        .geometry
        .coordinates
        .iter()
        .enumerate()
        .map(|(index, position)| match position.as_slice() {
            [lon, lat, ..] => Ok(Coordinate::new(*lat, *lon)),
            _ => Err(GeoJsonError::ShortPosition(index)),
        })
        .collect()
}
