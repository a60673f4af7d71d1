//! Per-tick flight: lifetime countdown and velocity upkeep.
//!
//! Enemy bullets are steered every tick so nothing in the physics step can bend
//! them. A parried bullet keeps whatever velocity it was given on reflect.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::time::Fixed;

use super::components::{BulletState, PooledBullet, Projectile};

pub fn steer_projectiles(
    time: Res<Time<Fixed>>,
    mut q: Query<(&mut Projectile, &mut BulletState, &mut LinearVelocity), With<PooledBullet>>,
) {
    let dt = time.delta();
    for (mut projectile, mut state, mut vel) in &mut q {
        if *state != BulletState::Active {
            continue;
        }

        projectile.lifetime.tick(dt);
        if projectile.lifetime.is_finished() {
            *state = BulletState::PendingReturn;
            continue;
        }

        if !projectile.parried {
            vel.0 = projectile.velocity();
        }
    }
}
