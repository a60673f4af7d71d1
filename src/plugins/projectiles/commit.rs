//! Return commit: recycle bullets back into the pool.
//!
//! The only place a bullet becomes `Inactive`. A parked bullet is hidden, motionless,
//! filters nothing, sits outside the arena, and forgets its shooter and parry data
//! so nothing stale survives into its next allocation.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{BulletEntity, BulletState, PooledBullet, Projectile};
use super::pool::{inactive_bullet_layers, BulletPool};

/// Off-arena spot for parked bullets.
const PARKED: Vec3 = Vec3::new(0.0, -1000.0, 2.0);

pub fn return_to_pool_commit(
    mut pool: ResMut<BulletPool>,
    mut q: Query<
        (
            Entity,
            &mut BulletState,
            &mut Projectile,
            &mut Transform,
            &mut Visibility,
            &mut LinearVelocity,
            &mut CollisionLayers,
        ),
        With<PooledBullet>,
    >,
) {
    let mut returned = 0;
    for (e, mut state, mut projectile, mut tf, mut vis, mut vel, mut layers) in &mut q {
        if *state != BulletState::PendingReturn {
            continue;
        }

        *state = BulletState::Inactive;
        *projectile = Projectile::default();
        tf.translation = PARKED;
        *vis = Visibility::Hidden;
        vel.0 = Vec2::ZERO;
        *layers = inactive_bullet_layers();

        pool.push_free(BulletEntity(e));
        returned += 1;
    }
    if returned > 0 {
        debug!("Returned {returned} bullet(s); {} free", pool.free_len());
    }
}
