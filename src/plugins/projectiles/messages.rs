//! Buffered projectile messages.
//!
//! Shooters never touch the pool. They enqueue a `SpawnBulletRequest`; the allocator
//! is the single writer of `BulletPool`.
//!
//! The collision resolver reports parried hits so the parry reward and the shooter's
//! counter-reaction can run in their own modules.

use bevy::prelude::*;

#[derive(Message, Clone, Copy, Debug)]
pub struct SpawnBulletRequest {
    pub pos: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub damage: f32,
    pub owner: Option<Entity>,
}

/// A reflected bullet struck an enemy.
#[derive(Message, Clone, Copy, Debug)]
pub struct ParriedBulletHit {
    pub target: Entity,
    pub position: Vec2,
    pub strength: u32,
}

/// A reflected bullet struck the enemy that fired it.
#[derive(Message, Clone, Copy, Debug)]
pub struct BulletReturned {
    pub shooter: Entity,
    pub strength: u32,
}
