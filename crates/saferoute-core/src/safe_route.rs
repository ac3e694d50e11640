//! Hazard-constrained shortest path search.
//!
//! Uniform-cost search where cells inside an active hazard zone are never
//! entered, and every other cell carries an inverse-distance penalty that
//! pushes the path away from nearby zone boundaries.

use crate::error::{RouteFailure, RouteResult};
use crate::grid::GridIndex;
use crate::hazards::HazardCatalog;
use crate::models::{Coordinate, HazardQuery, TravelMode};
use crate::route_engine::{
    build_outcome, limit_reached, OpenSet, RouteEngineConfig, SearchArena, SearchOutcome,
};
use crate::spatial::travel_minutes;

/// Repulsion cost for a point `distance_m` from the nearest active boundary.
///
/// Zero when no zone is active (infinite distance).
pub fn repulsion_penalty(weight: f64, distance_m: f64) -> f64 {
    if !distance_m.is_finite() {
        return 0.0;
    }
    weight / (distance_m.max(0.0) + 1.0)
}

#[derive(Debug, Clone, Copy)]
enum CellHazard {
    Blocked,
    Open { penalty: f64 },
}

/// Lazily filled per-search view of the hazard catalog, one slot per cell.
struct HazardField<'a> {
    grid: &'a GridIndex,
    hazards: &'a HazardCatalog,
    query: &'a HazardQuery,
    weight: f64,
    cells: Vec<Option<CellHazard>>,
}

impl<'a> HazardField<'a> {
    fn new(
        grid: &'a GridIndex,
        hazards: &'a HazardCatalog,
        query: &'a HazardQuery,
        weight: f64,
    ) -> Self {
        Self {
            grid,
            hazards,
            query,
            weight,
            cells: vec![None; grid.cell_count()],
        }
    }

    fn get(&mut self, index: usize) -> CellHazard {
        if let Some(state) = self.cells[index] {
            return state;
        }
        let point = self.grid.to_coordinate(&self.grid.cell_at(index));
        let state = if self.hazards.is_inside_any_active_zone(&point, self.query) {
            CellHazard::Blocked
        } else {
            let distance_m = self
                .hazards
                .min_distance_to_active_hazard_m(&point, self.query);
            CellHazard::Open {
                penalty: repulsion_penalty(self.weight, distance_m),
            }
        };
        self.cells[index] = Some(state);
        state
    }
}

/// Reject endpoints that sit in an active zone, either directly or once
/// snapped to their cell centre.
fn check_endpoint(
    grid: &GridIndex,
    hazards: &HazardCatalog,
    point: &Coordinate,
    query: &HazardQuery,
) -> Option<String> {
    let snapped = grid.to_coordinate(&grid.to_cell(point));
    hazards
        .active_zone_containing(point, query)
        .or_else(|| hazards.active_zone_containing(&snapped, query))
        .map(|zone| zone.name.clone())
}

/// Re-check every waypoint of a finished path against the active zones.
pub fn verify_path_clear(
    waypoints: &[Coordinate],
    hazards: &HazardCatalog,
    query: &HazardQuery,
) -> RouteResult<()> {
    for (index, point) in waypoints.iter().enumerate() {
        if let Some(zone) = hazards.active_zone_containing(point, query) {
            return Err(RouteFailure::InternalInconsistency {
                index,
                zone: zone.name.clone(),
            });
        }
    }
    Ok(())
}

/// Minimum (time + repulsion) path that never enters an active hazard zone.
pub fn find_safe_path(
    grid: &GridIndex,
    hazards: &HazardCatalog,
    start: &Coordinate,
    end: &Coordinate,
    mode: TravelMode,
    query: &HazardQuery,
    config: &RouteEngineConfig,
) -> RouteResult<SearchOutcome> {
    if let Some(zone) = check_endpoint(grid, hazards, start, query) {
        tracing::debug!(zone = %zone, "safe route rejected: start in hazard");
        return Err(RouteFailure::StartInHazard { zone });
    }
    if let Some(zone) = check_endpoint(grid, hazards, end, query) {
        tracing::debug!(zone = %zone, "safe route rejected: end in hazard");
        return Err(RouteFailure::EndInHazard { zone });
    }

    let speed = config.speed_kmh(mode);
    let start_index = grid.flat_index(&grid.to_cell(start));
    let end_index = grid.flat_index(&grid.to_cell(end));

    let mut field = HazardField::new(grid, hazards, query, config.repulsion_weight);
    let mut arena = SearchArena::new(grid);
    let mut open_set = OpenSet::default();
    arena.relax(start_index, 0.0, 0.0, None);
    open_set.push(start_index, 0.0, 0.0);

    let mut cells_expanded = 0usize;
    let mut reached = false;

    while let Some(current) = open_set.pop() {
        if arena.is_closed(current.index) {
            continue;
        }
        let best = arena.g_cost(current.index);
        if current.g_score.0 > best {
            continue;
        }

        cells_expanded += 1;
        arena.close(current.index);
        if current.index == end_index {
            reached = true;
            break;
        }
        if limit_reached(config, cells_expanded) {
            tracing::debug!(cells_expanded, "safe path search hit expansion limit");
            return Err(RouteFailure::SearchLimitExceeded {
                expanded: cells_expanded - 1,
            });
        }

        let cell = grid.cell_at(current.index);
        let point = grid.to_coordinate(&cell);

        for neighbor in grid.neighbors(&cell) {
            let next_index = grid.flat_index(&neighbor);
            if arena.is_closed(next_index) {
                continue;
            }
            let penalty = match field.get(next_index) {
                CellHazard::Blocked => continue,
                CellHazard::Open { penalty } => penalty,
            };
            let next_point = grid.to_coordinate(&neighbor);
            let step = travel_minutes(point.distance_km(&next_point), speed) + penalty;
            let tentative = best + step;
            if arena.relax(next_index, tentative, 0.0, Some(current.index)) {
                open_set.push(next_index, tentative, tentative);
            }
        }
    }

    if !reached {
        tracing::debug!(cells_expanded, "no secure route found");
        return Err(RouteFailure::NoPathFound);
    }

    let outcome = build_outcome(grid, &arena, end_index, cells_expanded);
    let verified = verify_path_clear(&outcome.waypoints, hazards, query);
    debug_assert!(
        verified.is_ok(),
        "safe path entered an active hazard zone: {verified:?}"
    );
    if let Err(failure) = verified {
        tracing::error!(%failure, "safe path failed hazard verification");
        return Err(failure);
    }

    tracing::debug!(
        mode = %mode,
        cells_expanded,
        path_cells = outcome.cells.len(),
        "safe path found"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoBounds, HazardCategory, HazardZone};
    use crate::route_engine::find_fastest_path;

    fn small_grid() -> GridIndex {
        GridIndex::new(
            GeoBounds {
                min_lat: 13.00,
                max_lat: 13.05,
                min_lon: 80.20,
                max_lon: 80.25,
            },
            0.005,
        )
    }

    fn flood(name: &str, lat: f64, lon: f64, radius_m: f64) -> HazardZone {
        HazardZone::new(
            name,
            Coordinate::new(lat, lon),
            radius_m,
            HazardCategory::FloodProne,
        )
    }

    #[test]
    fn penalty_shrinks_with_distance() {
        assert_eq!(repulsion_penalty(1000.0, f64::INFINITY), 0.0);
        assert_eq!(repulsion_penalty(1000.0, 0.0), 1000.0);
        assert!(repulsion_penalty(1000.0, 100.0) > repulsion_penalty(1000.0, 1000.0));
    }

    #[test]
    fn path_goes_around_blocking_zone() {
        let grid = small_grid();
        let catalog = HazardCatalog::new(vec![flood("pond", 13.0225, 80.2225, 800.0)]);
        let start = Coordinate::new(13.0225, 80.2025);
        let end = Coordinate::new(13.0225, 80.2475);
        let outcome = find_safe_path(
            &grid,
            &catalog,
            &start,
            &end,
            TravelMode::Walk,
            &HazardQuery::ALL,
            &RouteEngineConfig::default(),
        )
        .expect("a detour exists");
        assert!(verify_path_clear(&outcome.waypoints, &catalog, &HazardQuery::ALL).is_ok());
        assert_eq!(outcome.cells.first(), Some(&grid.to_cell(&start)));
        assert_eq!(outcome.cells.last(), Some(&grid.to_cell(&end)));
        for pair in outcome.cells.windows(2) {
            let dr = pair[0].row.abs_diff(pair[1].row);
            let dc = pair[0].col.abs_diff(pair[1].col);
            assert!(dr <= 1 && dc <= 1 && dr + dc > 0, "non-adjacent step {pair:?}");
        }
    }

    #[test]
    fn wall_of_zones_disconnects_grid() {
        let grid = small_grid();
        // A north-south band across the whole grid.
        let wall = (0..12)
            .map(|i| flood("wall", 13.0 + i as f64 * 0.005, 80.2225, 700.0))
            .collect();
        let catalog = HazardCatalog::new(wall);
        let result = find_safe_path(
            &grid,
            &catalog,
            &Coordinate::new(13.0225, 80.2025),
            &Coordinate::new(13.0225, 80.2475),
            TravelMode::Car,
            &HazardQuery::ALL,
            &RouteEngineConfig::default(),
        );
        assert_eq!(result, Err(RouteFailure::NoPathFound));
    }

    #[test]
    fn endpoints_inside_zones_are_rejected() {
        let grid = small_grid();
        let catalog = HazardCatalog::new(vec![
            HazardZone::scored("hotspot", Coordinate::new(13.0025, 80.2025), 300.0, 9),
            flood("basin", 13.0475, 80.2475, 300.0),
        ]);
        let config = RouteEngineConfig::default();
        let start_blocked = find_safe_path(
            &grid,
            &catalog,
            &Coordinate::new(13.0025, 80.2025),
            &Coordinate::new(13.0225, 80.2225),
            TravelMode::Car,
            &HazardQuery::NONE,
            &config,
        );
        assert_eq!(
            start_blocked,
            Err(RouteFailure::StartInHazard {
                zone: "hotspot".to_string()
            })
        );

        let end_blocked = find_safe_path(
            &grid,
            &catalog,
            &Coordinate::new(13.0225, 80.2225),
            &Coordinate::new(13.0475, 80.2475),
            TravelMode::Car,
            &HazardQuery::ALL,
            &config,
        );
        assert_eq!(
            end_blocked,
            Err(RouteFailure::EndInHazard {
                zone: "basin".to_string()
            })
        );

        // Flood toggle off: the basin no longer matters.
        let allowed = find_safe_path(
            &grid,
            &catalog,
            &Coordinate::new(13.0225, 80.2225),
            &Coordinate::new(13.0475, 80.2475),
            TravelMode::Car,
            &HazardQuery::NONE,
            &config,
        );
        assert!(allowed.is_ok());
    }

    #[test]
    fn matches_fastest_cost_without_hazards() {
        let grid = small_grid();
        let empty = HazardCatalog::empty();
        let config = RouteEngineConfig::default();
        let start = Coordinate::new(13.0025, 80.2025);
        let end = Coordinate::new(13.0475, 80.2325);
        let safe = find_safe_path(
            &grid,
            &empty,
            &start,
            &end,
            TravelMode::Bike,
            &HazardQuery::ALL,
            &config,
        )
        .unwrap();
        let fastest = find_fastest_path(
            &grid,
            &empty,
            &start,
            &end,
            TravelMode::Bike,
            &HazardQuery::ALL,
            &config,
        )
        .unwrap();
        let time = |points: &[Coordinate]| {
            points
                .windows(2)
                .map(|w| travel_minutes(w[0].distance_km(&w[1]), config.bike_speed_kmh))
                .sum::<f64>()
        };
        assert!((time(&safe.waypoints) - time(&fastest.waypoints)).abs() < 1e-6);
    }

    #[test]
    fn verification_reports_offending_waypoint() {
        let catalog = HazardCatalog::new(vec![flood("lake", 13.02, 80.22, 200.0)]);
        let path = [
            Coordinate::new(13.00, 80.20),
            Coordinate::new(13.02, 80.22),
            Coordinate::new(13.04, 80.24),
        ];
        assert_eq!(
            verify_path_clear(&path, &catalog, &HazardQuery::ALL),
            Err(RouteFailure::InternalInconsistency {
                index: 1,
                zone: "lake".to_string()
            })
        );
        assert!(verify_path_clear(&path, &catalog, &HazardQuery::NONE).is_ok());
    }

    #[test]
    fn expansion_limit_applies() {
        let grid = small_grid();
        let config = RouteEngineConfig {
            max_expansions: Some(5),
            ..RouteEngineConfig::default()
        };
        let result = find_safe_path(
            &grid,
            &HazardCatalog::empty(),
            &Coordinate::new(13.0025, 80.2025),
            &Coordinate::new(13.0475, 80.2475),
            TravelMode::Walk,
            &HazardQuery::NONE,
            &config,
        );
        assert_eq!(
            result,
            Err(RouteFailure::SearchLimitExceeded { expanded: 5 })
        );
    }
}
