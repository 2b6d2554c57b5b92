//! Seed management for world generation
//!
//! Provides separate seeds for each generation system, so one aspect of the
//! world can be varied while the others stay fixed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeds for the generation systems.
///
/// Each system gets its own seed, derived from a master seed. Elevation has
/// no entry on purpose: elevation is a pure function of the mesh and its
/// water classification, both of which are already seeded upstream.
#[derive(Clone, Copy, Debug)]
pub struct GenSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Mesh graph construction (corner jitter)
    pub mesh: u64,
    /// Water classification (island noise)
    pub water: u64,
}

impl GenSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            mesh: derive_seed(master, "mesh"),
            water: derive_seed(master, "water"),
        }
    }
}

impl Default for GenSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Derive a sub-seed from a master seed and a system name.
/// Uses hashing to ensure different systems get different but deterministic seeds.
pub fn derive_seed(master: u64, system: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    system.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for GenSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GenSeeds {{ master: {}, mesh: {}, water: {} }}",
            self.master, self.mesh, self.water,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_derivation() {
        let seeds1 = GenSeeds::from_master(12345);
        let seeds2 = GenSeeds::from_master(12345);

        assert_eq!(seeds1.mesh, seeds2.mesh);
        assert_eq!(seeds1.water, seeds2.water);
    }

    #[test]
    fn test_different_systems_get_different_seeds() {
        let seeds = GenSeeds::from_master(12345);

        assert_ne!(seeds.mesh, seeds.water);
        assert_ne!(seeds.mesh, seeds.master);
    }

    #[test]
    fn test_different_masters_diverge() {
        let a = GenSeeds::from_master(1);
        let b = GenSeeds::from_master(2);

        assert_ne!(a.mesh, b.mesh);
        assert_ne!(a.water, b.water);
    }
}
