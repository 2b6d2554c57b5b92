//! Water classification for mesh graphs
//!
//! Marks each corner and cell of a graph as water or land, and separates
//! ocean (water connected to the sector boundary) from inland lakes via
//! flood fill. One `WaterModel` describes exactly one graph.

use std::collections::VecDeque;

use noise::{NoiseFn, Perlin, Seedable};

use crate::config::WorldConfig;
use crate::mesh::{Graph, GraphId};

/// Water/land classification of one graph.
///
/// Immutable once built; shared between the water facet and every elevation
/// model derived from it.
#[derive(Clone, Debug)]
pub struct WaterModel {
    graph_id: GraphId,
    corner_water: Vec<bool>,
    corner_ocean: Vec<bool>,
    cell_water: Vec<bool>,
}

impl WaterModel {
    /// Build a model from explicit per-corner water flags.
    ///
    /// Ocean/lake separation and cell classification are derived here:
    /// water corners reachable from a wet border corner become ocean, a cell
    /// is water when most of its corners are.
    pub fn from_corner_flags(graph: &Graph, corner_water: Vec<bool>) -> Self {
        assert_eq!(
            corner_water.len(),
            graph.corner_count(),
            "one water flag per corner"
        );

        // Flood fill from wet border corners; everything reached is ocean,
        // remaining water corners belong to lakes.
        let mut corner_ocean = vec![false; corner_water.len()];
        let mut queue = VecDeque::new();
        for (i, corner) in graph.corners().iter().enumerate() {
            if corner.is_border && corner_water[i] {
                corner_ocean[i] = true;
                queue.push_back(i);
            }
        }
        while let Some(i) = queue.pop_front() {
            for &j in &graph.corner(i).adjacent {
                if corner_water[j] && !corner_ocean[j] {
                    corner_ocean[j] = true;
                    queue.push_back(j);
                }
            }
        }

        let cell_water = graph
            .cells()
            .iter()
            .map(|cell| {
                let wet = cell.corners.iter().filter(|&&c| corner_water[c]).count();
                wet * 2 > cell.corners.len()
            })
            .collect();

        Self {
            graph_id: graph.id(),
            corner_water,
            corner_ocean,
            cell_water,
        }
    }

    pub fn graph_id(&self) -> GraphId {
        self.graph_id
    }

    pub fn is_corner_water(&self, index: usize) -> bool {
        self.corner_water[index]
    }

    /// Water connected to the sector boundary.
    pub fn is_corner_ocean(&self, index: usize) -> bool {
        self.corner_ocean[index]
    }

    /// Inland water: wet but not reachable from the boundary.
    pub fn is_corner_lake(&self, index: usize) -> bool {
        self.corner_water[index] && !self.corner_ocean[index]
    }

    pub fn is_cell_water(&self, index: usize) -> bool {
        self.cell_water[index]
    }

    pub fn corner_count(&self) -> usize {
        self.corner_water.len()
    }

    /// Fraction of corners classified as water (for reporting).
    pub fn water_fraction(&self) -> f32 {
        if self.corner_water.is_empty() {
            return 0.0;
        }
        let wet = self.corner_water.iter().filter(|&&w| w).count();
        wet as f32 / self.corner_water.len() as f32
    }
}

/// Classify water for a graph from island noise.
///
/// Samples fBm Perlin noise at world coordinates, so coastlines continue
/// seamlessly across sector boundaries. Corners below the configured
/// threshold become water. Deterministic for a given (graph, seed, config).
pub fn classify_water(graph: &Graph, seed: u64, config: &WorldConfig) -> WaterModel {
    let noise = Perlin::new(1).set_seed(seed as u32);
    let scale = config.island_frequency / config.sector_size as f64;

    let corner_water = graph
        .corners()
        .iter()
        .map(|corner| {
            let nx = corner.position.x as f64 * scale;
            let ny = corner.position.y as f64 * scale;
            fbm(&noise, nx, ny, 4, 0.5, 2.0) < config.water_threshold
        })
        .collect();

    WaterModel::from_corner_flags(graph, corner_water)
}

/// Fractional Brownian Motion - layers multiple octaves of noise for
/// self-similar coastline detail.
fn fbm(noise: &Perlin, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        total += amplitude * noise.get([x * frequency, y * frequency]);
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    total / max_value
}
