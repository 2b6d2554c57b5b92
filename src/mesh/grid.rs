//! Grid-based mesh construction
//!
//! Builds a polygon mesh for one sector from a jittered square lattice:
//! interior corners are displaced by deterministic hash noise, border corners
//! stay put so adjacent sectors share identical boundary geometry.

use super::{Cell, Corner, Graph, Point, Rect};

/// Build a jittered-lattice polygon mesh covering `bounds`.
///
/// `cells_per_axis` quad cells along each axis, `(n + 1)^2` corners. The same
/// `(bounds, cells_per_axis, jitter, seed)` always produces the same
/// geometry; only the graph identity differs between calls.
pub fn build_grid_graph(bounds: Rect, cells_per_axis: usize, jitter: f32, seed: u64) -> Graph {
    assert!(cells_per_axis > 0, "mesh needs at least one cell per axis");

    let n = cells_per_axis;
    let step_x = bounds.width as f32 / n as f32;
    let step_y = bounds.height as f32 / n as f32;

    let lattice_x = |cx: usize| bounds.x as f32 + cx as f32 * step_x;
    let lattice_y = |cy: usize| bounds.y as f32 + cy as f32 * step_y;

    let corner_index = |cx: usize, cy: usize| cy * (n + 1) + cx;
    let cell_index = |x: usize, y: usize| y * n + x;

    let mut corners = Vec::with_capacity((n + 1) * (n + 1));
    for cy in 0..=n {
        for cx in 0..=n {
            let is_border = cx == 0 || cy == 0 || cx == n || cy == n;

            let mut px = lattice_x(cx);
            let mut py = lattice_y(cy);
            if !is_border && jitter > 0.0 {
                let gx = bounds.x as i64 + cx as i64;
                let gy = bounds.y as i64 + cy as i64;
                px += (hash01(seed, gx, gy, 0x9e37) - 0.5) * 2.0 * jitter * step_x;
                py += (hash01(seed, gx, gy, 0x79b9) - 0.5) * 2.0 * jitter * step_y;
            }

            let mut adjacent = Vec::with_capacity(4);
            if cx > 0 {
                adjacent.push(corner_index(cx - 1, cy));
            }
            if cx < n {
                adjacent.push(corner_index(cx + 1, cy));
            }
            if cy > 0 {
                adjacent.push(corner_index(cx, cy - 1));
            }
            if cy < n {
                adjacent.push(corner_index(cx, cy + 1));
            }

            let mut touches = Vec::with_capacity(4);
            for dy in 0..2usize {
                for dx in 0..2usize {
                    if cx >= dx && cy >= dy && cx - dx < n && cy - dy < n {
                        touches.push(cell_index(cx - dx, cy - dy));
                    }
                }
            }

            corners.push(Corner {
                position: Point::new(px, py),
                adjacent,
                touches,
                is_border,
            });
        }
    }

    let mut cells = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            // Counter-clockwise winding
            let quad = [
                corner_index(x, y),
                corner_index(x + 1, y),
                corner_index(x + 1, y + 1),
                corner_index(x, y + 1),
            ];

            let mut center = Point::default();
            for &c in &quad {
                center.x += corners[c].position.x;
                center.y += corners[c].position.y;
            }
            center.x /= 4.0;
            center.y /= 4.0;

            let mut neighbors = Vec::with_capacity(4);
            if x > 0 {
                neighbors.push(cell_index(x - 1, y));
            }
            if x < n - 1 {
                neighbors.push(cell_index(x + 1, y));
            }
            if y > 0 {
                neighbors.push(cell_index(x, y - 1));
            }
            if y < n - 1 {
                neighbors.push(cell_index(x, y + 1));
            }

            cells.push(Cell {
                center,
                corners: quad.to_vec(),
                neighbors,
            });
        }
    }

    Graph::new(bounds, corners, cells)
}

/// FNV-style hash of a lattice coordinate, mapped to [0, 1).
fn hash01(seed: u64, gx: i64, gy: i64, salt: u64) -> f32 {
    let mut h = 0xcbf29ce484222325u64;
    for word in [seed, gx as u64, gy as u64, salt] {
        h ^= word;
        h = h.wrapping_mul(0x100000001b3);
    }
    (h >> 40) as f32 / (1u64 << 24) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> Graph {
        build_grid_graph(Rect::new(0, 0, 64, 64), 4, 0.35, 42)
    }

    #[test]
    fn test_counts() {
        let graph = sample_graph();
        assert_eq!(graph.cell_count(), 16);
        assert_eq!(graph.corner_count(), 25);
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let graph = sample_graph();
        for (i, corner) in graph.corners().iter().enumerate() {
            for &j in &corner.adjacent {
                assert!(
                    graph.corner(j).adjacent.contains(&i),
                    "corner {} lists {} but not vice versa",
                    i,
                    j
                );
            }
        }
        for (i, cell) in graph.cells().iter().enumerate() {
            for &j in &cell.neighbors {
                assert!(graph.cell(j).neighbors.contains(&i));
            }
        }
    }

    #[test]
    fn test_border_corners_stay_on_lattice() {
        let graph = sample_graph();
        let bounds = graph.bounds();
        for corner in graph.corners().iter().filter(|c| c.is_border) {
            let on_vertical = corner.position.x == bounds.x as f32
                || corner.position.x == bounds.right() as f32;
            let on_horizontal = corner.position.y == bounds.y as f32
                || corner.position.y == bounds.bottom() as f32;
            assert!(on_vertical || on_horizontal);
        }
    }

    #[test]
    fn test_interior_corners_stay_inside_bounds() {
        let graph = sample_graph();
        let bounds = graph.bounds();
        for corner in graph.corners() {
            assert!(corner.position.x >= bounds.x as f32);
            assert!(corner.position.x <= bounds.right() as f32);
            assert!(corner.position.y >= bounds.y as f32);
            assert!(corner.position.y <= bounds.bottom() as f32);
        }
    }

    #[test]
    fn test_same_seed_same_geometry() {
        let a = build_grid_graph(Rect::new(64, 0, 64, 64), 8, 0.35, 7);
        let b = build_grid_graph(Rect::new(64, 0, 64, 64), 8, 0.35, 7);
        assert_ne!(a.id(), b.id());
        for (ca, cb) in a.corners().iter().zip(b.corners()) {
            assert_eq!(ca.position, cb.position);
        }
    }

    #[test]
    fn test_different_seed_moves_interior_corners() {
        let a = build_grid_graph(Rect::new(0, 0, 64, 64), 8, 0.35, 1);
        let b = build_grid_graph(Rect::new(0, 0, 64, 64), 8, 0.35, 2);
        let moved = a
            .corners()
            .iter()
            .zip(b.corners())
            .filter(|(ca, cb)| ca.position != cb.position)
            .count();
        assert!(moved > 0);
    }

    #[test]
    fn test_every_corner_touches_a_cell() {
        let graph = sample_graph();
        for corner in graph.corners() {
            assert!(!corner.touches.is_empty());
        }
    }

    #[test]
    fn test_nearest_cell_finds_center() {
        let graph = sample_graph();
        let target = graph.cell(5).center;
        assert_eq!(graph.nearest_cell(target), Some(5));
    }
}
