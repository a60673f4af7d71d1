//! Simulation tick ordering.
//!
//! One `FixedUpdate` pass is one simulation tick. Sets run in declaration order:
//!
//! ```text
//! Intent      player input latches, contact bookkeeping, parry window
//! Think       enemy brains, contact reactions, minion spawners
//! Projectiles spawn, steer, reflect, resolve bullet hits
//! Resolve     release, parry rewards, eclipse changes/DOT/regen
//! Apply       damage + heal requests become health changes
//! React       damage/death reactions, rewards, feedback, boss bars
//! Cleanup     timed tasks, pool returns, despawns
//! ```

use bevy::prelude::*;

use super::state::GameState;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatSet {
    Intent,
    Think,
    Projectiles,
    Resolve,
    Apply,
    React,
    Cleanup,
}

pub fn configure(app: &mut App) {
    app.configure_sets(
        FixedUpdate,
        (
            CombatSet::Intent,
            CombatSet::Think,
            CombatSet::Projectiles,
            CombatSet::Resolve,
            CombatSet::Apply,
            CombatSet::React,
            CombatSet::Cleanup,
        )
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
}
