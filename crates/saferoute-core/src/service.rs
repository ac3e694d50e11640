//! Route service: resolves place names, runs a planner and packages the result.

use crate::error::RouteResult;
use crate::grid::GridIndex;
use crate::hazards::HazardCatalog;
use crate::locations::{LocationCatalog, ResolvedLocation};
use crate::models::{Coordinate, HazardQuery, Route, RouteKind, TravelMode};
use crate::route_engine::{find_fastest_path, RouteEngineConfig, SearchOutcome};
use crate::safe_route::find_safe_path;

/// Owns the read-only catalogs and grid; every call is independent, so one
/// service can be shared across threads.
#[derive(Debug, Clone)]
pub struct RouteService {
    grid: GridIndex,
    hazards: HazardCatalog,
    locations: LocationCatalog,
    config: RouteEngineConfig,
    strict_locations: bool,
}

impl RouteService {
    pub fn new(
        grid: GridIndex,
        hazards: HazardCatalog,
        locations: LocationCatalog,
        config: RouteEngineConfig,
    ) -> Self {
        Self {
            grid,
            hazards,
            locations,
            config,
            strict_locations: false,
        }
    }

    /// Chennai grid and catalogs with default engine settings.
    pub fn chennai() -> Self {
        Self::new(
            GridIndex::default(),
            HazardCatalog::chennai(),
            LocationCatalog::chennai(),
            RouteEngineConfig::default(),
        )
    }

    /// Reject unknown place names instead of substituting the default location.
    pub fn with_strict_locations(mut self, strict: bool) -> Self {
        self.strict_locations = strict;
        self
    }

    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    pub fn hazards(&self) -> &HazardCatalog {
        &self.hazards
    }

    pub fn locations(&self) -> &LocationCatalog {
        &self.locations
    }

    pub fn config(&self) -> &RouteEngineConfig {
        &self.config
    }

    pub fn find_fastest_route(
        &self,
        start_name: &str,
        end_name: &str,
        mode: TravelMode,
        query: &HazardQuery,
    ) -> RouteResult<Route> {
        let (start, end) = self.resolve_pair(start_name, end_name)?;
        let mut route = self.fastest_between(&start.coordinate, &end.coordinate, mode, query)?;
        self.label(&mut route, &start, &end);
        Ok(route)
    }

    pub fn find_safe_route(
        &self,
        start_name: &str,
        end_name: &str,
        mode: TravelMode,
        query: &HazardQuery,
    ) -> RouteResult<Route> {
        let (start, end) = self.resolve_pair(start_name, end_name)?;
        let mut route = self.safe_between(&start.coordinate, &end.coordinate, mode, query)?;
        self.label(&mut route, &start, &end);
        Ok(route)
    }

    pub fn fastest_between(
        &self,
        start: &Coordinate,
        end: &Coordinate,
        mode: TravelMode,
        query: &HazardQuery,
    ) -> RouteResult<Route> {
        let outcome = find_fastest_path(
            &self.grid,
            &self.hazards,
            start,
            end,
            mode,
            query,
            &self.config,
        )?;
        Ok(self.build_route(RouteKind::Fastest, mode, query, start, end, outcome))
    }

    pub fn safe_between(
        &self,
        start: &Coordinate,
        end: &Coordinate,
        mode: TravelMode,
        query: &HazardQuery,
    ) -> RouteResult<Route> {
        let outcome = find_safe_path(
            &self.grid,
            &self.hazards,
            start,
            end,
            mode,
            query,
            &self.config,
        )?;
        Ok(self.build_route(RouteKind::Safe, mode, query, start, end, outcome))
    }

    fn resolve_pair(
        &self,
        start_name: &str,
        end_name: &str,
    ) -> RouteResult<(ResolvedLocation, ResolvedLocation)> {
        if self.strict_locations {
            return Ok((
                self.locations.resolve(start_name)?,
                self.locations.resolve(end_name)?,
            ));
        }
        Ok((
            self.locations.resolve_or_default(start_name),
            self.locations.resolve_or_default(end_name),
        ))
    }

    fn build_route(
        &self,
        kind: RouteKind,
        mode: TravelMode,
        query: &HazardQuery,
        start: &Coordinate,
        end: &Coordinate,
        outcome: SearchOutcome,
    ) -> Route {
        let name = format!(
            "({:.4}, {:.4}) to ({:.4}, {:.4})",
            start.lat, start.lon, end.lat, end.lon
        );
        let mut route = Route::from_waypoints(
            name,
            kind,
            mode,
            self.config.speed_kmh(mode),
            outcome.waypoints,
        );
        route.cells_expanded = outcome.cells_expanded;
        route.exposure = self
            .hazards
            .exposure(&route.waypoints, query, &self.config.hazard_costs);
        route
    }

    fn label(&self, route: &mut Route, start: &ResolvedLocation, end: &ResolvedLocation) {
        route.name = format!("{} to {}", start.name, end.name);
        for resolved in [start, end] {
            if let Some(requested) = &resolved.fallback_for {
                route.warnings.push(format!(
                    "Unknown location '{}', using {} instead",
                    requested, resolved.name
                ));
            }
        }
    }
}

impl Default for RouteService {
    fn default() -> Self {
        Self::chennai()
    }
}
