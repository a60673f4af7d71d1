//! Seeded simulation RNG.
//!
//! Every random choice in the simulation (patrol targets, aim error, attack picks,
//! spawn rings) draws from this one resource so a run is reproducible from its seed.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Resource)]
pub struct GameRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(0)
    }
}
