use image::{ImageBuffer, Rgb, RgbImage};

use crate::mesh::Point;
use crate::pipeline::GenRegion;

/// Render the elevation facets of processed regions into one stitched image,
/// one pixel per world unit. Cells are filled by nearest cell center; graphs
/// without an elevation model (failed construction) are drawn as a flat gray
/// placeholder so degraded output stays visible.
pub fn render_elevation(regions: &[GenRegion]) -> Option<RgbImage> {
    // Image bounds come from the graphs, not the regions: sector graphs can
    // overhang a region whose bounds are not sector-aligned.
    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;
    for region in regions {
        let Ok(graphs) = region.graphs() else { continue };
        for graph in graphs.graphs() {
            let bounds = graph.bounds();
            min_x = min_x.min(bounds.x);
            min_y = min_y.min(bounds.y);
            max_x = max_x.max(bounds.right());
            max_y = max_y.max(bounds.bottom());
        }
    }
    if min_x >= max_x || min_y >= max_y {
        return None;
    }

    let width = (max_x - min_x) as u32;
    let height = (max_y - min_y) as u32;
    let mut img: RgbImage = ImageBuffer::new(width, height);

    for region in regions {
        let (Ok(graphs), Ok(water), Ok(elevation)) =
            (region.graphs(), region.water(), region.elevation())
        else {
            continue;
        };

        for graph in graphs.graphs() {
            let bounds = graph.bounds();
            let model = elevation.get(graph.id());
            let water_model = water.get(graph.id());

            for py in bounds.y..bounds.bottom() {
                for px in bounds.x..bounds.right() {
                    let sample = Point::new(px as f32 + 0.5, py as f32 + 0.5);
                    let Some(cell) = graph.nearest_cell(sample) else {
                        continue;
                    };

                    let color = match (model, water_model) {
                        (Some(model), Some(water_model)) => {
                            let elevation = model.cell_elevation(cell);
                            if water_model.is_cell_water(cell) {
                                water_color(elevation)
                            } else {
                                hypsometric_colormap(elevation.clamp(0.0, 1.0))
                            }
                        }
                        // No elevation model: flat placeholder
                        _ => [96, 96, 96],
                    };

                    img.put_pixel((px - min_x) as u32, (py - min_y) as u32, Rgb(color));
                }
            }
        }
    }

    Some(img)
}

/// Render and save the stitched elevation map.
pub fn export_elevation(regions: &[GenRegion], path: &str) -> Result<(), image::ImageError> {
    match render_elevation(regions) {
        Some(img) => img.save(path),
        None => {
            log::warn!("nothing to export: no region covers any area");
            Ok(())
        }
    }
}

/// Hypsometric tint for land: green lowlands through tan uplands to white peaks.
fn hypsometric_colormap(t: f32) -> [u8; 3] {
    let colors: [[f32; 3]; 7] = [
        [0.33, 0.55, 0.25], // Lowland green
        [0.55, 0.70, 0.35], // Light green
        [0.80, 0.78, 0.45], // Yellow-green
        [0.75, 0.60, 0.38], // Tan
        [0.58, 0.44, 0.32], // Brown
        [0.72, 0.68, 0.65], // Gray rock
        [0.96, 0.96, 0.96], // Snow
    ];

    let t_scaled = t * 6.0;
    let idx = (t_scaled as usize).min(5);
    let frac = t_scaled - idx as f32;

    let c1 = colors[idx];
    let c2 = colors[idx + 1];

    [
        ((c1[0] + (c2[0] - c1[0]) * frac) * 255.0) as u8,
        ((c1[1] + (c2[1] - c1[1]) * frac) * 255.0) as u8,
        ((c1[2] + (c2[2] - c1[2]) * frac) * 255.0) as u8,
    ]
}

/// Water shading: deep ocean is dark, lake surfaces near land level are pale.
fn water_color(elevation: f32) -> [u8; 3] {
    let depth = 1.0 - elevation.clamp(0.0, 1.0);
    let deep = [22.0, 60.0, 120.0];
    let shallow = [90.0, 160.0, 200.0];

    [
        (shallow[0] + (deep[0] - shallow[0]) * depth) as u8,
        (shallow[1] + (deep[1] - shallow[1]) * depth) as u8,
        (shallow[2] + (deep[2] - shallow[2]) * depth) as u8,
    ]
}
