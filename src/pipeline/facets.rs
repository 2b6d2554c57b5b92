//! Facet data published by pipeline stages
//!
//! A facet is one stage's output for one region pass: the region's graph
//! set, the water model per graph, or the elevation model per graph. Models
//! are shared behind `Arc` so facets of overlapping regions can reference
//! the same instances.

use std::collections::HashMap;
use std::sync::Arc;

use crate::elevation::ElevationModel;
use crate::mesh::{Graph, GraphId};
use crate::water::WaterModel;

/// The set of graphs covering a region.
#[derive(Clone, Debug, Default)]
pub struct GraphFacet {
    graphs: Vec<Arc<Graph>>,
}

impl GraphFacet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, graph: Arc<Graph>) {
        self.graphs.push(graph);
    }

    pub fn graphs(&self) -> &[Arc<Graph>] {
        &self.graphs
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

/// Water classification per graph in the region.
#[derive(Clone, Debug, Default)]
pub struct WaterFacet {
    models: HashMap<GraphId, Arc<WaterModel>>,
}

impl WaterFacet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, model: Arc<WaterModel>) {
        self.models.insert(model.graph_id(), model);
    }

    pub fn get(&self, id: GraphId) -> Option<&Arc<WaterModel>> {
        self.models.get(&id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }
}

/// Elevation models per graph in the region.
///
/// A graph whose model construction failed has no entry; `get` returning
/// `None` for a graph in the region's graph set is how downstream consumers
/// detect degraded output.
#[derive(Clone, Debug, Default)]
pub struct ElevationFacet {
    models: HashMap<GraphId, Arc<ElevationModel>>,
}

impl ElevationFacet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, model: Arc<ElevationModel>) {
        self.models.insert(model.graph_id(), model);
    }

    pub fn get(&self, id: GraphId) -> Option<&Arc<ElevationModel>> {
        self.models.get(&id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Graph identities that have a model.
    pub fn graph_ids(&self) -> impl Iterator<Item = GraphId> + '_ {
        self.models.keys().copied()
    }
}
