//! Elevation facet provider
//!
//! Produces an elevation model for every graph in the region, computing each
//! at most once per graph identity for the lifetime of the provider. A graph
//! whose model cannot be built is logged and omitted from the facet rather
//! than failing the region: one bad graph degrades the output, it does not
//! block terrain generation for the rest of the region.

use std::sync::Arc;

use crate::elevation::{ElevationCache, ElevationError, ElevationModel};
use crate::mesh::Graph;
use crate::water::WaterModel;

use super::facets::ElevationFacet;
use super::{FacetKind, FacetProvider, GenRegion, PipelineError};

type ModelBuilder =
    Box<dyn Fn(&Graph, &WaterModel) -> Result<ElevationModel, ElevationError> + Send + Sync>;

pub struct ElevationProvider {
    cache: ElevationCache,
    build: ModelBuilder,
}

impl ElevationProvider {
    pub fn new() -> Self {
        Self::with_builder(Box::new(|graph, water| ElevationModel::build(graph, water)))
    }

    /// Swap the model construction routine; tests use this to inject
    /// deterministic failures.
    fn with_builder(build: ModelBuilder) -> Self {
        Self {
            cache: ElevationCache::new(),
            build,
        }
    }

    /// Number of elevation models held by the provider's cache.
    pub fn cached_models(&self) -> usize {
        self.cache.len()
    }

    fn get_or_create(
        &self,
        graph: &Graph,
        water: &WaterModel,
    ) -> Result<Arc<ElevationModel>, ElevationError> {
        self.cache
            .get_or_create(graph.id(), || (self.build)(graph, water))
    }
}

impl Default for ElevationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FacetProvider for ElevationProvider {
    fn name(&self) -> &'static str {
        "elevation"
    }

    fn produces(&self) -> &'static [FacetKind] {
        &[FacetKind::Elevation]
    }

    fn requires(&self) -> &'static [FacetKind] {
        &[FacetKind::Graphs, FacetKind::Water]
    }

    fn set_seed(&mut self, _seed: u64) {
        // Elevation is fully determined by the graph and its water model;
        // any randomness was captured when those were built upstream.
    }

    fn process(&self, region: &mut GenRegion) -> Result<(), PipelineError> {
        let graphs = region.graphs()?;
        let water = region.water()?;

        let mut facet = ElevationFacet::new();
        for graph in graphs.graphs() {
            let model = water
                .get(graph.id())
                .ok_or(PipelineError::MissingWaterModel(graph.id()))?;

            match self.get_or_create(graph, model) {
                Ok(elevation) => facet.add(elevation),
                Err(err) => {
                    log::error!(
                        "could not build elevation model for graph {}: {}",
                        graph.id(),
                        err
                    );
                }
            }
        }

        region.set_elevation(facet);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::mesh::{build_grid_graph, Rect};
    use crate::pipeline::facets::{GraphFacet, WaterFacet};

    fn land_graph(x: i32) -> Arc<Graph> {
        Arc::new(build_grid_graph(Rect::new(x, 0, 64, 64), 4, 0.0, 0))
    }

    fn region_for(graphs: &[Arc<Graph>]) -> GenRegion {
        let mut region = GenRegion::new(Rect::new(0, 0, 64, 64));
        let mut graph_facet = GraphFacet::new();
        let mut water_facet = WaterFacet::new();
        for graph in graphs {
            graph_facet.add(Arc::clone(graph));
            water_facet.add(Arc::new(WaterModel::from_corner_flags(
                graph,
                vec![false; graph.corner_count()],
            )));
        }
        region.set_graphs(graph_facet);
        region.set_water(water_facet);
        region
    }

    #[test]
    fn test_one_model_per_graph_in_region() {
        let graphs = [land_graph(0), land_graph(64), land_graph(128)];
        let provider = ElevationProvider::new();

        let mut region = region_for(&graphs);
        provider.process(&mut region).unwrap();

        let facet = region.elevation().unwrap();
        assert_eq!(facet.len(), 3);
        for graph in &graphs {
            assert!(facet.get(graph.id()).is_some());
        }
    }

    #[test]
    fn test_shared_graph_is_built_once_across_regions() {
        let shared = land_graph(0);
        let builds = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&builds);
        let provider = ElevationProvider::with_builder(Box::new(move |graph, water| {
            counter.fetch_add(1, Ordering::SeqCst);
            ElevationModel::build(graph, water)
        }));

        // Two region passes, both covering the shared graph
        let mut first = region_for(&[Arc::clone(&shared), land_graph(64)]);
        provider.process(&mut first).unwrap();
        let mut second = region_for(&[Arc::clone(&shared), land_graph(128)]);
        provider.process(&mut second).unwrap();

        // Three distinct graphs, three builds: the shared one only counted once
        assert_eq!(builds.load(Ordering::SeqCst), 3);
        assert_eq!(provider.cached_models(), 3);

        let a = first.elevation().unwrap().get(shared.id()).unwrap().clone();
        let b = second.elevation().unwrap().get(shared.id()).unwrap().clone();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_one_bad_graph_degrades_but_does_not_abort() {
        let graphs = [land_graph(0), land_graph(64), land_graph(128)];
        let bad = graphs[1].id();

        let provider = ElevationProvider::with_builder(Box::new(move |graph, water| {
            if graph.id() == bad {
                Err(ElevationError::EmptyGraph(graph.id()))
            } else {
                ElevationModel::build(graph, water)
            }
        }));

        let mut region = region_for(&graphs);
        provider.process(&mut region).unwrap();

        let facet = region.elevation().unwrap();
        assert_eq!(facet.len(), 2);
        assert!(facet.get(graphs[0].id()).is_some());
        assert!(facet.get(bad).is_none());
        assert!(facet.get(graphs[2].id()).is_some());
    }

    #[test]
    fn test_failed_build_is_retried_on_a_later_pass() {
        let graph = land_graph(0);
        let attempts = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&attempts);
        let provider = ElevationProvider::with_builder(Box::new(move |graph, water| {
            // Fail the first attempt only, as a transient fault would
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ElevationError::EmptyGraph(graph.id()))
            } else {
                ElevationModel::build(graph, water)
            }
        }));

        let mut first = region_for(std::slice::from_ref(&graph));
        provider.process(&mut first).unwrap();
        assert!(first.elevation().unwrap().is_empty());
        assert_eq!(provider.cached_models(), 0);

        let mut second = region_for(std::slice::from_ref(&graph));
        provider.process(&mut second).unwrap();
        assert_eq!(second.elevation().unwrap().len(), 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_missing_water_model_faults_the_region() {
        let covered = land_graph(0);
        let uncovered = land_graph(64);

        let mut region = GenRegion::new(Rect::new(0, 0, 128, 64));
        let mut graph_facet = GraphFacet::new();
        graph_facet.add(Arc::clone(&covered));
        graph_facet.add(Arc::clone(&uncovered));
        let mut water_facet = WaterFacet::new();
        water_facet.add(Arc::new(WaterModel::from_corner_flags(
            &covered,
            vec![false; covered.corner_count()],
        )));
        region.set_graphs(graph_facet);
        region.set_water(water_facet);

        let provider = ElevationProvider::new();
        let err = provider.process(&mut region).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingWaterModel(id) if id == uncovered.id()
        ));
        // The facet was never published
        assert!(region.elevation().is_err());
    }

    #[test]
    fn test_set_seed_has_no_observable_effect() {
        let graph = land_graph(0);
        let mut provider = ElevationProvider::new();

        let mut before = region_for(std::slice::from_ref(&graph));
        provider.process(&mut before).unwrap();
        let model_before = before.elevation().unwrap().get(graph.id()).unwrap().clone();

        provider.set_seed(0xDEAD_BEEF);

        let mut after = region_for(std::slice::from_ref(&graph));
        provider.process(&mut after).unwrap();
        let model_after = after.elevation().unwrap().get(graph.id()).unwrap().clone();

        assert!(Arc::ptr_eq(&model_before, &model_after));
        assert_eq!(provider.cached_models(), 1);
    }

    #[test]
    fn test_empty_graph_set_publishes_empty_facet() {
        let provider = ElevationProvider::new();
        let mut region = region_for(&[]);
        provider.process(&mut region).unwrap();
        assert!(region.elevation().unwrap().is_empty());
    }
}
