//! Memoizing elevation cache
//!
//! Guarantees at most one elevation model construction per graph identity
//! for the lifetime of the cache. Entries are never evicted: terrain graphs
//! are bounded and reused across a session, so the table only ever grows.
//! Construction failures are not remembered; a later call for the same graph
//! retries.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::elevation::{ElevationError, ElevationModel};
use crate::mesh::GraphId;

/// One cache slot. The slot mutex serializes construction for its key:
/// a thread that finds the slot empty builds while holding it, so a
/// concurrent request for the same graph blocks until the result (or the
/// failure) is in and never triggers a second build.
#[derive(Default)]
struct Slot {
    model: Mutex<Option<Arc<ElevationModel>>>,
}

/// Graph-keyed table of completed elevation models.
///
/// Shared mutable state of the elevation provider; all methods take `&self`
/// and are safe to call from concurrent region passes.
pub struct ElevationCache {
    slots: Mutex<HashMap<GraphId, Arc<Slot>>>,
}

impl ElevationCache {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached model for `id`, or invoke `build` exactly once and
    /// store its result.
    ///
    /// On `Err` the slot stays empty: the error is returned to this caller
    /// (and any callers blocked on the same slot will rebuild), and a later
    /// call is free to retry.
    pub fn get_or_create<F>(&self, id: GraphId, build: F) -> Result<Arc<ElevationModel>, ElevationError>
    where
        F: FnOnce() -> Result<ElevationModel, ElevationError>,
    {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(id).or_default())
        };

        let mut state = slot.model.lock();
        if let Some(model) = state.as_ref() {
            return Ok(Arc::clone(model));
        }

        let model = Arc::new(build()?);
        *state = Some(Arc::clone(&model));
        Ok(model)
    }

    /// Number of completed entries.
    pub fn len(&self) -> usize {
        let slots = self.slots.lock();
        slots
            .values()
            .filter(|slot| slot.model.lock().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ElevationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::mesh::{build_grid_graph, Graph, Rect};
    use crate::water::WaterModel;

    fn graph_and_water() -> (Graph, WaterModel) {
        let graph = build_grid_graph(Rect::new(0, 0, 64, 64), 4, 0.0, 0);
        let flags = vec![false; graph.corner_count()];
        let water = WaterModel::from_corner_flags(&graph, flags);
        (graph, water)
    }

    #[test]
    fn test_second_lookup_reuses_first_model() {
        let (graph, water) = graph_and_water();
        let cache = ElevationCache::new();
        let builds = AtomicUsize::new(0);

        let build = |g: &Graph, w: &WaterModel| {
            builds.fetch_add(1, Ordering::SeqCst);
            ElevationModel::build(g, w)
        };

        let first = cache.get_or_create(graph.id(), || build(&graph, &water)).unwrap();
        let second = cache.get_or_create(graph.id(), || build(&graph, &water)).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_graphs_get_distinct_entries() {
        let (graph_a, water_a) = graph_and_water();
        let (graph_b, water_b) = graph_and_water();
        let cache = ElevationCache::new();

        let a = cache
            .get_or_create(graph_a.id(), || ElevationModel::build(&graph_a, &water_a))
            .unwrap();
        let b = cache
            .get_or_create(graph_b.id(), || ElevationModel::build(&graph_b, &water_b))
            .unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failure_is_not_cached() {
        let (graph, water) = graph_and_water();
        let cache = ElevationCache::new();
        let attempts = AtomicUsize::new(0);

        // First attempt fails, second succeeds
        let result = cache.get_or_create(graph.id(), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(ElevationError::EmptyGraph(graph.id()))
        });
        assert!(result.is_err());
        assert_eq!(cache.len(), 0);

        let retried = cache.get_or_create(graph.id(), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            ElevationModel::build(&graph, &water)
        });
        assert!(retried.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_requests_build_once() {
        let (graph, water) = graph_and_water();
        let cache = ElevationCache::new();
        let builds = AtomicUsize::new(0);

        let models: Vec<Arc<ElevationModel>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        cache
                            .get_or_create(graph.id(), || {
                                builds.fetch_add(1, Ordering::SeqCst);
                                // Widen the race window
                                std::thread::sleep(std::time::Duration::from_millis(20));
                                ElevationModel::build(&graph, &water)
                            })
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        for model in &models[1..] {
            assert!(Arc::ptr_eq(&models[0], model));
        }
    }
}
