//! Region generation pipeline
//!
//! Stages are facet providers: each declares the facets it produces and the
//! facets it requires, and the orchestrator validates those manifests before
//! any region is processed. A `GenRegion` is one region pass; providers fill
//! in its facets in registration order.
//!
//! Providers are invoked through `&self` and may be driven from several
//! threads at once (one per in-flight region); any state a provider keeps
//! across passes lives behind its own locks.

pub mod facets;

mod elevation_provider;
mod graph_provider;
mod water_provider;

pub use elevation_provider::ElevationProvider;
pub use graph_provider::GraphProvider;
pub use water_provider::WaterProvider;

use thiserror::Error;

use crate::config::WorldConfig;
use crate::mesh::{GraphId, Rect};
use facets::{ElevationFacet, GraphFacet, WaterFacet};

/// The facet kinds a provider can declare in its manifest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacetKind {
    Graphs,
    Water,
    Elevation,
}

impl std::fmt::Display for FacetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacetKind::Graphs => write!(f, "graphs"),
            FacetKind::Water => write!(f, "water"),
            FacetKind::Elevation => write!(f, "elevation"),
        }
    }
}

/// Pipeline wiring and precondition failures.
///
/// These indicate a mis-assembled pipeline or missing upstream data and
/// fault the whole region pass; per-graph computation failures are handled
/// inside the providers instead (logged, entry omitted).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("facet {0} required but not produced for this region")]
    MissingFacet(FacetKind),
    #[error("no water model for graph {0}; the water facet does not cover the region's graph set")]
    MissingWaterModel(GraphId),
    #[error("provider '{provider}' requires facet {facet} but no earlier provider produces it")]
    UnsatisfiedRequirement {
        provider: &'static str,
        facet: FacetKind,
    },
}

/// One pipeline stage.
pub trait FacetProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Facets this stage publishes into the region.
    fn produces(&self) -> &'static [FacetKind];

    /// Facets that must be present before `process` runs.
    fn requires(&self) -> &'static [FacetKind];

    /// Reseed the stage. Called once before any region is processed and
    /// again on explicit reseeds; stages that are seed-independent ignore it.
    fn set_seed(&mut self, seed: u64);

    /// Fill this stage's facets for one region pass.
    fn process(&self, region: &mut GenRegion) -> Result<(), PipelineError>;
}

/// One region generation pass: world bounds plus the facets produced so far.
#[derive(Debug)]
pub struct GenRegion {
    bounds: Rect,
    graphs: Option<GraphFacet>,
    water: Option<WaterFacet>,
    elevation: Option<ElevationFacet>,
}

impl GenRegion {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            graphs: None,
            water: None,
            elevation: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn graphs(&self) -> Result<&GraphFacet, PipelineError> {
        self.graphs
            .as_ref()
            .ok_or(PipelineError::MissingFacet(FacetKind::Graphs))
    }

    pub fn set_graphs(&mut self, facet: GraphFacet) {
        self.graphs = Some(facet);
    }

    pub fn water(&self) -> Result<&WaterFacet, PipelineError> {
        self.water
            .as_ref()
            .ok_or(PipelineError::MissingFacet(FacetKind::Water))
    }

    pub fn set_water(&mut self, facet: WaterFacet) {
        self.water = Some(facet);
    }

    pub fn elevation(&self) -> Result<&ElevationFacet, PipelineError> {
        self.elevation
            .as_ref()
            .ok_or(PipelineError::MissingFacet(FacetKind::Elevation))
    }

    pub fn set_elevation(&mut self, facet: ElevationFacet) {
        self.elevation = Some(facet);
    }
}

/// Orchestrator: owns the providers and runs them, in registration order,
/// over each requested region.
pub struct WorldGenerator {
    providers: Vec<Box<dyn FacetProvider>>,
}

impl std::fmt::Debug for WorldGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldGenerator")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl WorldGenerator {
    /// The standard chain: graphs, then water, then elevation.
    pub fn new(seed: u64, config: WorldConfig) -> Self {
        let providers: Vec<Box<dyn FacetProvider>> = vec![
            Box::new(GraphProvider::new(config.clone())),
            Box::new(WaterProvider::new(config)),
            Box::new(ElevationProvider::new()),
        ];
        // The built-in chain always validates.
        Self::with_providers(seed, providers).expect("standard provider chain is well-formed")
    }

    /// Assemble a custom chain. Fails if any provider requires a facet that
    /// no earlier provider produces. All providers are seeded before the
    /// generator is returned.
    pub fn with_providers(
        seed: u64,
        mut providers: Vec<Box<dyn FacetProvider>>,
    ) -> Result<Self, PipelineError> {
        let mut available: Vec<FacetKind> = Vec::new();
        for provider in &providers {
            for &facet in provider.requires() {
                if !available.contains(&facet) {
                    return Err(PipelineError::UnsatisfiedRequirement {
                        provider: provider.name(),
                        facet,
                    });
                }
            }
            available.extend_from_slice(provider.produces());
        }

        for provider in &mut providers {
            provider.set_seed(seed);
        }
        Ok(Self { providers })
    }

    /// Reseed every provider. Providers drop seed-dependent caches; the
    /// elevation stage is seed-independent and unaffected.
    pub fn reseed(&mut self, seed: u64) {
        for provider in &mut self.providers {
            provider.set_seed(seed);
        }
    }

    /// Run all providers over one region. Safe to call concurrently from
    /// multiple threads against the same generator.
    pub fn generate(&self, bounds: Rect) -> Result<GenRegion, PipelineError> {
        let mut region = GenRegion::new(bounds);
        for provider in &self.providers {
            provider.process(&mut region)?;
        }
        Ok(region)
    }
}
