//! Grid route engine: shared search state and the time-weighted A* planner.
//!
//! Both planners run over a [`GridIndex`] and keep their per-call state in a
//! [`SearchArena`]; nothing is shared between invocations except the
//! read-only grid and hazard catalog.

use crate::error::{RouteFailure, RouteResult};
use crate::grid::GridIndex;
use crate::hazards::{HazardCatalog, HazardCosts};
use crate::models::{Coordinate, GridCell, HazardQuery, TravelMode};
use crate::spatial::travel_minutes;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEngineConfig {
    pub car_speed_kmh: f64,
    pub walk_speed_kmh: f64,
    pub bike_speed_kmh: f64,
    pub hazard_costs: HazardCosts,
    /// Numerator of the safe planner's inverse-distance penalty (minutes * meters).
    pub repulsion_weight: f64,
    /// Give up after expanding this many cells.
    #[serde(default)]
    pub max_expansions: Option<usize>,
}

impl Default for RouteEngineConfig {
    fn default() -> Self {
        Self {
            car_speed_kmh: 40.0,
            walk_speed_kmh: 5.0,
            bike_speed_kmh: 15.0,
            hazard_costs: HazardCosts::default(),
            repulsion_weight: 1000.0,
            max_expansions: None,
        }
    }
}

impl RouteEngineConfig {
    pub fn speed_kmh(&self, mode: TravelMode) -> f64 {
        match mode {
            TravelMode::Car => self.car_speed_kmh,
            TravelMode::Walk => self.walk_speed_kmh,
            TravelMode::Bike => self.bike_speed_kmh,
        }
    }
}

/// Cells of a found path, start to end inclusive, and their centres.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub cells: Vec<GridCell>,
    pub waypoints: Vec<Coordinate>,
    pub cells_expanded: usize,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FloatOrd(pub(crate) f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Frontier entry. Ordered by priority, then by push order so equal
/// priorities pop first-found first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OpenNode {
    pub(crate) index: usize,
    pub(crate) g_score: FloatOrd,
    pub(crate) priority: FloatOrd,
    pub(crate) seq: u64,
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.seq.cmp(&other.seq))
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Min-priority frontier with insertion-order tie-breaking.
#[derive(Debug, Default)]
pub(crate) struct OpenSet {
    heap: BinaryHeap<Reverse<OpenNode>>,
    next_seq: u64,
}

impl OpenSet {
    pub(crate) fn push(&mut self, index: usize, g_score: f64, priority: f64) {
        self.heap.push(Reverse(OpenNode {
            index,
            g_score: FloatOrd(g_score),
            priority: FloatOrd(priority),
            seq: self.next_seq,
        }));
        self.next_seq += 1;
    }

    pub(crate) fn pop(&mut self) -> Option<OpenNode> {
        self.heap.pop().map(|Reverse(node)| node)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SearchNode {
    pub(crate) g_cost: f64,
    pub(crate) h_cost: f64,
    /// Flat index of the predecessor cell.
    pub(crate) parent: Option<usize>,
}

/// Per-search node table indexed by flat cell index.
///
/// Parents are stored as indices, and a node is only re-parented on a
/// strict improvement before it is closed, so parent chains never cycle.
#[derive(Debug)]
pub(crate) struct SearchArena {
    nodes: Vec<Option<SearchNode>>,
    closed: Vec<bool>,
}

impl SearchArena {
    pub(crate) fn new(grid: &GridIndex) -> Self {
        Self {
            nodes: vec![None; grid.cell_count()],
            closed: vec![false; grid.cell_count()],
        }
    }

    pub(crate) fn g_cost(&self, index: usize) -> f64 {
        self.nodes[index].map_or(f64::INFINITY, |node| node.g_cost)
    }

    /// `g + h` for a known node, infinite otherwise.
    pub(crate) fn f_cost(&self, index: usize) -> f64 {
        self.nodes[index].map_or(f64::INFINITY, |node| node.g_cost + node.h_cost)
    }

    pub(crate) fn is_closed(&self, index: usize) -> bool {
        self.closed[index]
    }

    pub(crate) fn close(&mut self, index: usize) {
        self.closed[index] = true;
    }

    /// Record `g_cost` for `index` if it strictly improves on what is known.
    pub(crate) fn relax(
        &mut self,
        index: usize,
        g_cost: f64,
        h_cost: f64,
        parent: Option<usize>,
    ) -> bool {
        if self.closed[index] || g_cost >= self.g_cost(index) {
            return false;
        }
        self.nodes[index] = Some(SearchNode {
            g_cost,
            h_cost,
            parent,
        });
        true
    }

    /// Follow parent links back from `end`, returning start..=end.
    pub(crate) fn reconstruct(&self, end: usize) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = Some(end);
        while let Some(index) = current {
            path.push(index);
            current = self.nodes[index].and_then(|node| node.parent);
        }
        path.reverse();
        path
    }
}

pub(crate) fn build_outcome(
    grid: &GridIndex,
    arena: &SearchArena,
    end_index: usize,
    cells_expanded: usize,
) -> SearchOutcome {
    let cells: Vec<GridCell> = arena
        .reconstruct(end_index)
        .into_iter()
        .map(|index| grid.cell_at(index))
        .collect();
    let waypoints = cells.iter().map(|cell| grid.to_coordinate(cell)).collect();
    SearchOutcome {
        cells,
        waypoints,
        cells_expanded,
    }
}

pub(crate) fn limit_reached(config: &RouteEngineConfig, cells_expanded: usize) -> bool {
    config
        .max_expansions
        .is_some_and(|limit| cells_expanded > limit)
}

/// Minimum-time path between the cells containing `start` and `end`.
///
/// Step cost is travel time between cell centres at the mode's speed,
/// multiplied by the hazard cost of the cell being entered. Hazards only
/// make cells expensive; they never block this planner.
pub fn find_fastest_path(
    grid: &GridIndex,
    hazards: &HazardCatalog,
    start: &Coordinate,
    end: &Coordinate,
    mode: TravelMode,
    query: &HazardQuery,
    config: &RouteEngineConfig,
) -> RouteResult<SearchOutcome> {
    let speed = config.speed_kmh(mode);
    let start_cell = grid.to_cell(start);
    let end_cell = grid.to_cell(end);
    let start_index = grid.flat_index(&start_cell);
    let end_index = grid.flat_index(&end_cell);
    let end_point = grid.to_coordinate(&end_cell);

    let heuristic = |point: &Coordinate| travel_minutes(point.distance_km(&end_point), speed);

    let mut arena = SearchArena::new(grid);
    let mut open_set = OpenSet::default();
    let start_h = heuristic(&grid.to_coordinate(&start_cell));
    arena.relax(start_index, 0.0, start_h, None);
    open_set.push(start_index, 0.0, arena.f_cost(start_index));

    let mut cells_expanded = 0usize;

    while let Some(current) = open_set.pop() {
        if arena.is_closed(current.index) {
            continue;
        }
        let best_g = arena.g_cost(current.index);
        if current.g_score.0 > best_g {
            continue;
        }

        cells_expanded += 1;
        if current.index == end_index {
            let outcome = build_outcome(grid, &arena, end_index, cells_expanded);
            tracing::debug!(
                mode = %mode,
                cells_expanded,
                path_cells = outcome.cells.len(),
                "fastest path found"
            );
            return Ok(outcome);
        }
        if limit_reached(config, cells_expanded) {
            tracing::debug!(cells_expanded, "fastest path search hit expansion limit");
            return Err(RouteFailure::SearchLimitExceeded {
                expanded: cells_expanded - 1,
            });
        }

        arena.close(current.index);
        let cell = grid.cell_at(current.index);
        let point = grid.to_coordinate(&cell);

        for neighbor in grid.neighbors(&cell) {
            let next_index = grid.flat_index(&neighbor);
            if arena.is_closed(next_index) {
                continue;
            }
            let next_point = grid.to_coordinate(&neighbor);
            let multiplier =
                hazards.cost_multiplier_with(&next_point, query, &config.hazard_costs);
            let time_cost = travel_minutes(point.distance_km(&next_point), speed) * multiplier;
            let tentative_g = best_g + time_cost;
            if tentative_g < arena.g_cost(next_index) {
                let h_score = heuristic(&next_point);
                arena.relax(next_index, tentative_g, h_score, Some(current.index));
                open_set.push(next_index, tentative_g, arena.f_cost(next_index));
            }
        }
    }

    tracing::debug!(cells_expanded, "fastest path search exhausted the grid");
    Err(RouteFailure::NoPathFound)
}
