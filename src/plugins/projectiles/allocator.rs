//! Spawn consumer: activate bullets from the pool.
//!
//! An empty pool drops the request. That is a capacity decision, not a failure.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;

use super::components::{bullet_tint, BulletEntity, BulletState, PooledBullet, Projectile};
use super::messages::SpawnBulletRequest;
use super::pool::{active_enemy_layers, BulletPool};

pub fn allocate_bullets_from_pool(
    tunables: Res<Tunables>,
    mut pool: ResMut<BulletPool>,
    mut reader: MessageReader<SpawnBulletRequest>,
    mut q: Query<
        (
            &mut BulletState,
            &mut Projectile,
            &mut Transform,
            &mut LinearVelocity,
            &mut Visibility,
            &mut CollisionLayers,
            &mut Sprite,
        ),
        With<PooledBullet>,
    >,
) {
    let cfg = &tunables.projectile;

    for req in reader.read() {
        let Some(BulletEntity(e)) = pool.pop_free() else {
            debug!("Bullet pool exhausted; dropping spawn request from {:?}", req.owner);
            continue;
        };
        let Ok((mut state, mut projectile, mut tf, mut vel, mut vis, mut layers, mut sprite)) =
            q.get_mut(e)
        else {
            continue;
        };

        projectile.initialize(req.direction, req.speed, req.damage, cfg.lifetime_secs, req.owner);

        *state = BulletState::Active;
        tf.translation = req.pos.extend(2.0);
        vel.0 = projectile.velocity();
        *vis = Visibility::Visible;
        *layers = active_enemy_layers();
        sprite.color = bullet_tint(req.speed, false, cfg);
    }
}
