//! Elevation models for mesh graphs
//!
//! Assigns a height to every corner and cell of a graph from its water
//! classification: elevation grows with distance from the ocean, stays flat
//! across lakes, and is redistributed so lowlands are common and peaks rare.

pub mod cache;

pub use cache::ElevationCache;

use std::collections::VecDeque;

use thiserror::Error;

use crate::mesh::{Graph, GraphId};
use crate::water::WaterModel;

/// Elevation gained crossing a water corner. Keeps lake surfaces nearly
/// level while still giving the sweep a strict ordering.
const WATER_STEP: f32 = 0.01;

/// Shape parameter for the land elevation redistribution curve.
const REDISTRIBUTION_SCALE: f32 = 1.1;

/// Errors raised while building an elevation model.
#[derive(Debug, Error)]
pub enum ElevationError {
    #[error("graph {0} has no corners")]
    EmptyGraph(GraphId),
    #[error("water model describes graph {water}, not graph {graph}")]
    WaterMismatch { graph: GraphId, water: GraphId },
}

/// Per-corner and per-cell elevations for one graph.
///
/// Immutable once built and safe to share across threads; the pipeline hands
/// it out behind an `Arc`. Elevations are normalized to [0, 1] within the
/// graph; ocean corners sit at 0 and lakes are level.
#[derive(Clone, Debug)]
pub struct ElevationModel {
    graph_id: GraphId,
    corner_elevation: Vec<f32>,
    cell_elevation: Vec<f32>,
}

impl ElevationModel {
    /// Build the elevation model for `graph` from its water classification.
    ///
    /// Algorithm:
    /// 1. Seed a breadth-first sweep at ocean corners (or, in a landlocked
    ///    sector, at the boundary corners) with elevation 0.
    /// 2. Walk the corner adjacency, gaining a full step over land and
    ///    `WATER_STEP` over water, keeping the smallest value per corner.
    /// 3. Redistribute non-ocean elevations along a square-root curve so low
    ///    terrain dominates, clamped to [0, 1]; corners with equal sweep
    ///    values stay equal.
    /// 4. Flatten each lake to the level of its lowest corner.
    /// 5. Cell elevation is the mean of its corners; water cells take the
    ///    minimum instead so shorelines sit at water level.
    pub fn build(graph: &Graph, water: &WaterModel) -> Result<Self, ElevationError> {
        if graph.corner_count() == 0 {
            return Err(ElevationError::EmptyGraph(graph.id()));
        }
        if water.graph_id() != graph.id() {
            return Err(ElevationError::WaterMismatch {
                graph: graph.id(),
                water: water.graph_id(),
            });
        }

        let corner_elevation = sweep_from_coast(graph, water);
        let mut corner_elevation = redistribute(corner_elevation, water);
        flatten_lakes(graph, water, &mut corner_elevation);

        let cell_elevation = graph
            .cells()
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if water.is_cell_water(i) {
                    cell.corners
                        .iter()
                        .map(|&c| corner_elevation[c])
                        .fold(f32::MAX, f32::min)
                } else {
                    let sum: f32 = cell.corners.iter().map(|&c| corner_elevation[c]).sum();
                    sum / cell.corners.len() as f32
                }
            })
            .collect();

        Ok(Self {
            graph_id: graph.id(),
            corner_elevation,
            cell_elevation,
        })
    }

    pub fn graph_id(&self) -> GraphId {
        self.graph_id
    }

    pub fn corner_elevation(&self, index: usize) -> f32 {
        self.corner_elevation[index]
    }

    pub fn cell_elevation(&self, index: usize) -> f32 {
        self.cell_elevation[index]
    }

    pub fn cell_elevations(&self) -> &[f32] {
        &self.cell_elevation
    }

    /// Highest corner elevation in the graph.
    pub fn max_elevation(&self) -> f32 {
        self.corner_elevation.iter().copied().fold(0.0, f32::max)
    }
}

/// Distance-from-coast sweep. Returns raw, unnormalized elevations.
fn sweep_from_coast(graph: &Graph, water: &WaterModel) -> Vec<f32> {
    let n = graph.corner_count();
    let mut elevation = vec![f32::MAX; n];
    let mut queue = VecDeque::new();

    for (i, _) in graph.corners().iter().enumerate() {
        if water.is_corner_ocean(i) {
            elevation[i] = 0.0;
            queue.push_back(i);
        }
    }
    if queue.is_empty() {
        // Landlocked sector: the boundary is the reference level.
        for (i, corner) in graph.corners().iter().enumerate() {
            if corner.is_border {
                elevation[i] = 0.0;
                queue.push_back(i);
            }
        }
    }

    while let Some(i) = queue.pop_front() {
        for &j in &graph.corner(i).adjacent {
            let step = if water.is_corner_water(j) {
                WATER_STEP
            } else {
                1.0
            };
            let candidate = elevation[i] + step;
            if candidate < elevation[j] {
                elevation[j] = candidate;
                queue.push_back(j);
            }
        }
    }

    // Corners a disconnected mesh never reached sit at the reference level.
    for value in &mut elevation {
        if *value == f32::MAX {
            *value = 0.0;
        }
    }

    elevation
}

/// Rank-based remap of non-ocean corner elevations onto a sqrt curve, so
/// that most terrain is low and peaks are rare. Order-preserving, and
/// corners with equal sweep values map to equal heights (ties share the
/// rank of their first member), so the result does not depend on sort
/// order among ties. Ocean corners keep their sweep value of 0.
fn redistribute(mut elevation: Vec<f32>, water: &WaterModel) -> Vec<f32> {
    let mut sorted: Vec<usize> = (0..elevation.len())
        .filter(|&i| !water.is_corner_ocean(i))
        .collect();
    if sorted.is_empty() {
        return elevation;
    }

    sorted.sort_by(|&a, &b| {
        elevation[a]
            .partial_cmp(&elevation[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let raw: Vec<f32> = sorted.iter().map(|&i| elevation[i]).collect();
    let last = (sorted.len() - 1).max(1) as f32;
    let curve = |rank: usize| {
        let x = rank as f32 / last;
        let y = REDISTRIBUTION_SCALE.sqrt() - (REDISTRIBUTION_SCALE * (1.0 - x)).sqrt();
        y.min(1.0)
    };

    let mut group_rank = 0;
    for (rank, &i) in sorted.iter().enumerate() {
        if rank > 0 && raw[rank] != raw[rank - 1] {
            group_rank = rank;
        }
        elevation[i] = curve(group_rank);
    }

    elevation
}

/// Level every lake: each connected component of lake corners takes the
/// elevation of its lowest member.
fn flatten_lakes(graph: &Graph, water: &WaterModel, elevation: &mut [f32]) {
    let mut visited = vec![false; elevation.len()];
    for start in 0..elevation.len() {
        if !water.is_corner_lake(start) || visited[start] {
            continue;
        }

        let mut component = vec![start];
        let mut queue = VecDeque::from([start]);
        visited[start] = true;
        while let Some(i) = queue.pop_front() {
            for &j in &graph.corner(i).adjacent {
                if water.is_corner_lake(j) && !visited[j] {
                    visited[j] = true;
                    component.push(j);
                    queue.push_back(j);
                }
            }
        }

        let level = component
            .iter()
            .map(|&i| elevation[i])
            .fold(f32::MAX, f32::min);
        for &i in &component {
            elevation[i] = level;
        }
    }
}
