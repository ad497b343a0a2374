//! Seeded broadcast sampler.
//!
//! In broadcast-centric mode the hub draws its listeners at random. Each draw
//! derives a fresh `StdRng` from the seed and the draw counter, so the sampler
//! is reproducible and its whole state fits in a snapshot.

use crate::role::Role;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Listeners drawn per hub broadcast
pub const BROADCAST_FANOUT: usize = 4;

const DRAW_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BroadcastSampler {
    seed: u64,
    draws: u64,
}

impl BroadcastSampler {
    pub fn new(seed: u64) -> Self {
        Self { seed, draws: 0 }
    }

    /// Draw `k` distinct roles from `pool` without replacement.
    pub fn sample(&mut self, pool: &[Role], k: usize) -> Vec<Role> {
        let mut rng = StdRng::seed_from_u64(
            self.seed
                .wrapping_add(self.draws.wrapping_mul(DRAW_STRIDE)),
        );
        self.draws += 1;
        pool.choose_multiple(&mut rng, k).copied().collect()
    }

    /// Hub listeners: every role except the origin, the judiciary and `hub`.
    pub fn broadcast_from(&mut self, hub: Role) -> Vec<Role> {
        let pool: Vec<Role> = Role::ALL
            .iter()
            .copied()
            .filter(|r| !matches!(r, Role::Human | Role::Judge) && *r != hub)
            .collect();
        self.sample(&pool, BROADCAST_FANOUT)
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }
}
