//! Bullet pool.
//!
//! Every bullet is pre-spawned once per InGame session. Activation and return only
//! mutate component values (state, layers, velocity, visibility), never the archetype.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{layers::Layer, state::GameState, tunables::Tunables};

use super::components::{BulletEntity, BulletState, PooledBullet, Projectile};

#[derive(Resource, Debug)]
pub struct BulletPool {
    free: Vec<BulletEntity>,
    pub capacity: usize,
}

impl BulletPool {
    pub fn new(capacity: usize) -> Self {
        Self { free: Vec::with_capacity(capacity), capacity }
    }

    #[inline]
    pub fn pop_free(&mut self) -> Option<BulletEntity> {
        self.free.pop()
    }

    #[inline]
    pub fn push_free(&mut self, e: BulletEntity) {
        self.free.push(e);
    }

    #[inline]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }
}

/// Enemy fire: hits walls and the player.
#[inline]
pub fn active_enemy_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::EnemyBullet, [Layer::World, Layer::Player])
}

/// Reflected fire: hits walls and enemies, never the player.
#[inline]
pub fn reflected_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PlayerBullet, [Layer::World, Layer::Enemy])
}

/// Empty filters: collides with nothing and generates no events.
#[inline]
pub fn inactive_bullet_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::EnemyBullet, [] as [Layer; 0])
}

pub fn init_bullet_pool(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut pool: ResMut<BulletPool>,
) {
    pool.free.clear();
    let cap = pool.capacity;
    pool.free.reserve(cap);

    let radius = tunables.projectile.radius;

    for _ in 0..cap {
        let e = commands
            .spawn((
                Name::new("Bullet(Pooled)"),
                PooledBullet,
                BulletState::Inactive,
                Projectile::default(),
                Sprite {
                    color: Color::srgb(1.0, 0.85, 0.3),
                    custom_size: Some(Vec2::splat(radius * 2.0)),
                    ..default()
                },
                Transform::from_xyz(0.0, 0.0, 2.0),
                Visibility::Hidden,
                (
                    RigidBody::Dynamic,
                    Collider::circle(radius),
                    Sensor,
                    Mass(0.1),
                    LockedAxes::ROTATION_LOCKED,
                    inactive_bullet_layers(),
                    LinearVelocity(Vec2::ZERO),
                    CollisionEventsEnabled,
                ),
                DespawnOnExit(GameState::InGame),
            ))
            .id();

        pool.free.push(BulletEntity(e));
    }
    info!("Bullet pool ready ({cap} bullets)");
}
