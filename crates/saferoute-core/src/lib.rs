pub mod error;
pub mod geojson;
pub mod grid;
pub mod hazards;
pub mod locations;
pub mod models;
pub mod route_engine;
pub mod safe_route;
pub mod service;
pub mod spatial;

pub use error::{RouteFailure, RouteResult};
pub use geojson::{to_geojson, to_geojson_string, waypoints_from_geojson, GeoJsonError};
pub use grid::{GridIndex, DEFAULT_CELL_SIZE_DEG};
pub use hazards::{HazardAlert, HazardCatalog, HazardCosts, DEFAULT_ALERT_RADIUS_M};
pub use locations::{LocationCatalog, LocationCategory, NamedLocation};
pub use models::{
    sort_by_exposure, Coordinate, GeoBounds, GridCell, HazardCategory, HazardExposure,
    HazardQuery, HazardZone, Route, RouteKind, TravelMode,
};
pub use route_engine::{find_fastest_path, RouteEngineConfig, SearchOutcome};
pub use safe_route::{find_safe_path, verify_path_clear};
pub use service::RouteService;
pub use spatial::{haversine_distance, haversine_distance_km};
