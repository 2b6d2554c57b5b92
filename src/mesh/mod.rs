//! Polygon mesh graphs
//!
//! A `Graph` is an immutable planar subdivision of one world sector: polygon
//! cells, their corners, and the adjacency between them. Graphs carry a
//! unique identity assigned at construction; downstream caches key on that
//! identity, so two passes only share cached results when they share the
//! same graph instance.

pub mod grid;

pub use grid::build_grid_graph;

use std::sync::atomic::{AtomicU64, Ordering};

/// Axis-aligned world-space bounds of a graph sector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x as f32
            && px < self.right() as f32
            && py >= self.y as f32
            && py < self.bottom() as f32
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// A point in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Unique identity of a graph instance.
///
/// Assigned from a process-wide counter at construction, never reused.
/// Rebuilding a sector (for example after reseeding) yields a new identity,
/// which is what keeps stale cached results from being served for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GraphId(u64);

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

impl GraphId {
    fn next() -> Self {
        Self(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for GraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A mesh vertex.
#[derive(Clone, Debug)]
pub struct Corner {
    /// World-space position
    pub position: Point,
    /// Indices of corners connected to this one by a mesh edge
    pub adjacent: Vec<usize>,
    /// Indices of cells touching this corner
    pub touches: Vec<usize>,
    /// Whether the corner lies on the sector boundary
    pub is_border: bool,
}

/// A polygon cell.
#[derive(Clone, Debug)]
pub struct Cell {
    /// Centroid of the cell's corners
    pub center: Point,
    /// Corner indices in winding order
    pub corners: Vec<usize>,
    /// Indices of edge-adjacent cells
    pub neighbors: Vec<usize>,
}

/// An immutable planar subdivision of one sector.
pub struct Graph {
    id: GraphId,
    bounds: Rect,
    corners: Vec<Corner>,
    cells: Vec<Cell>,
}

impl Graph {
    pub(crate) fn new(bounds: Rect, corners: Vec<Corner>, cells: Vec<Cell>) -> Self {
        Self {
            id: GraphId::next(),
            bounds,
            corners,
            cells,
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn corners(&self) -> &[Corner] {
        &self.corners
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn corner(&self, index: usize) -> &Corner {
        &self.corners[index]
    }

    pub fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub fn corner_count(&self) -> usize {
        self.corners.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Index of the cell whose center is closest to the given point.
    /// Linear scan; meant for rasterization and picking, not hot loops.
    pub fn nearest_cell(&self, point: Point) -> Option<usize> {
        let mut best = None;
        let mut best_dist = f32::MAX;
        for (i, cell) in self.cells.iter().enumerate() {
            let d = cell.center.distance_squared(point);
            if d < best_dist {
                best_dist = d;
                best = Some(i);
            }
        }
        best
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("bounds", &self.bounds)
            .field("corners", &self.corners.len())
            .field("cells", &self.cells.len())
            .finish()
    }
}
