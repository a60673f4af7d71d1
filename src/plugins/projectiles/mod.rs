//! Projectiles: message-based spawning over a fixed pool.
//!
//! # Data flow
//! ```text
//!  FixedUpdate, CombatSet::Projectiles
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ (A) allocate_bullets_from_pool                                       │
//! │     reads SpawnBulletRequest, pops BulletPool, activates the bullet  │
//! │ (B) steer_projectiles                                                │
//! │     lifetime countdown, velocity upkeep for unparried bullets        │
//! │ (C) parry (other module) reflects bullets near the player            │
//! │ (D) process_bullet_collisions                                        │
//! │     reads avian CollisionStart, writes DamageRequest / EclipseChange │
//! │     / ParriedBulletHit / BulletReturned, marks PendingReturn         │
//! └──────────────────────────────────────────────────────────────────────┘
//!  FixedUpdate, CombatSet::Cleanup
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ (E) return_to_pool_commit                                            │
//! │     PendingReturn -> Inactive, pushes the bullet back into the pool  │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Producers never borrow `BulletPool`; the allocator and the commit are its only
//! writers.

pub mod allocator;
pub mod collision;
pub mod commit;
pub mod components;
pub mod flight;
pub mod messages;
pub mod pool;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::{
    schedule::CombatSet,
    state::GameState,
    tunables::{ProjectileTunables, Tunables},
};
use crate::plugins::eclipse::EclipseChange;
use crate::plugins::health::DamageRequest;

/// Ordering handles for systems that must run between steering and hit resolution.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectileSet {
    Spawn,
    Steer,
    Intercept,
    Hits,
}

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        let capacity = app
            .world()
            .get_resource::<Tunables>()
            .map_or_else(|| ProjectileTunables::default().pool_capacity, |t| t.projectile.pool_capacity);

        app.insert_resource(pool::BulletPool::new(capacity))
            .add_message::<messages::SpawnBulletRequest>()
            .add_message::<messages::ParriedBulletHit>()
            .add_message::<messages::BulletReturned>()
            .add_message::<CollisionStart>()
            .add_message::<DamageRequest>()
            .add_message::<EclipseChange>()
            .add_systems(OnEnter(GameState::InGame), pool::init_bullet_pool);

        app.configure_sets(
            FixedUpdate,
            (
                ProjectileSet::Spawn,
                ProjectileSet::Steer,
                ProjectileSet::Intercept,
                ProjectileSet::Hits,
            )
                .chain()
                .in_set(CombatSet::Projectiles),
        );

        app.add_systems(
            FixedUpdate,
            (
                allocator::allocate_bullets_from_pool.in_set(ProjectileSet::Spawn),
                flight::steer_projectiles.in_set(ProjectileSet::Steer),
                collision::process_bullet_collisions.in_set(ProjectileSet::Hits),
                commit::return_to_pool_commit.in_set(CombatSet::Cleanup),
            ),
        );
    }
}

#[cfg(test)]
mod tests;
