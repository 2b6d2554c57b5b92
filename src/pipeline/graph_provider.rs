//! Graph facet provider
//!
//! Splits the world into fixed-size square sectors and builds one mesh graph
//! per sector. Graphs are memoized per sector coordinate, so region passes
//! that overlap receive the same graph instances; downstream caches keyed on
//! graph identity depend on that sharing.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::WorldConfig;
use crate::mesh::{build_grid_graph, Graph, Rect};
use crate::seeds::derive_seed;

use super::facets::GraphFacet;
use super::{FacetKind, FacetProvider, GenRegion, PipelineError};

pub struct GraphProvider {
    config: WorldConfig,
    seed: u64,
    /// Built sector graphs, keyed by sector grid coordinate.
    sectors: Mutex<HashMap<(i32, i32), Arc<Graph>>>,
}

impl GraphProvider {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            seed: 0,
            sectors: Mutex::new(HashMap::new()),
        }
    }

    fn sector_graph(&self, sx: i32, sy: i32) -> Arc<Graph> {
        let size = self.config.sector_size;
        let mut sectors = self.sectors.lock();
        Arc::clone(sectors.entry((sx, sy)).or_insert_with(|| {
            let bounds = Rect::new(sx * size as i32, sy * size as i32, size, size);
            Arc::new(build_grid_graph(
                bounds,
                self.config.cells_per_sector,
                self.config.corner_jitter,
                self.seed,
            ))
        }))
    }
}

impl FacetProvider for GraphProvider {
    fn name(&self) -> &'static str {
        "graphs"
    }

    fn produces(&self) -> &'static [FacetKind] {
        &[FacetKind::Graphs]
    }

    fn requires(&self) -> &'static [FacetKind] {
        &[]
    }

    fn set_seed(&mut self, seed: u64) {
        self.seed = derive_seed(seed, "mesh");
        // Sector geometry depends on the seed; cached graphs are stale now.
        self.sectors.get_mut().clear();
    }

    fn process(&self, region: &mut GenRegion) -> Result<(), PipelineError> {
        let bounds = region.bounds();
        let size = self.config.sector_size as i32;

        let mut facet = GraphFacet::new();
        if bounds.width > 0 && bounds.height > 0 {
            let sx0 = bounds.x.div_euclid(size);
            let sx1 = (bounds.right() - 1).div_euclid(size);
            let sy0 = bounds.y.div_euclid(size);
            let sy1 = (bounds.bottom() - 1).div_euclid(size);

            for sy in sy0..=sy1 {
                for sx in sx0..=sx1 {
                    facet.add(self.sector_graph(sx, sy));
                }
            }
        }

        region.set_graphs(facet);
        Ok(())
    }
}
