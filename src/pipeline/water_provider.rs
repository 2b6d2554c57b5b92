//! Water facet provider
//!
//! Classifies water for every graph in the region's graph set. Models are
//! memoized per graph identity for the lifetime of the provider, matching
//! the sharing of the graphs themselves.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::WorldConfig;
use crate::mesh::{Graph, GraphId};
use crate::seeds::derive_seed;
use crate::water::{classify_water, WaterModel};

use super::facets::WaterFacet;
use super::{FacetKind, FacetProvider, GenRegion, PipelineError};

pub struct WaterProvider {
    config: WorldConfig,
    seed: u64,
    models: Mutex<HashMap<GraphId, Arc<WaterModel>>>,
}

impl WaterProvider {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            seed: 0,
            models: Mutex::new(HashMap::new()),
        }
    }

    fn model_for(&self, graph: &Graph) -> Arc<WaterModel> {
        let mut models = self.models.lock();
        Arc::clone(models.entry(graph.id()).or_insert_with(|| {
            Arc::new(classify_water(graph, self.seed, &self.config))
        }))
    }
}

impl FacetProvider for WaterProvider {
    fn name(&self) -> &'static str {
        "water"
    }

    fn produces(&self) -> &'static [FacetKind] {
        &[FacetKind::Water]
    }

    fn requires(&self) -> &'static [FacetKind] {
        &[FacetKind::Graphs]
    }

    fn set_seed(&mut self, seed: u64) {
        self.seed = derive_seed(seed, "water");
        self.models.get_mut().clear();
    }

    fn process(&self, region: &mut GenRegion) -> Result<(), PipelineError> {
        let mut facet = WaterFacet::new();
        for graph in region.graphs()?.graphs() {
            facet.add(self.model_for(graph));
        }
        region.set_water(facet);
        Ok(())
    }
}
