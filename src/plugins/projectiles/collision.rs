//! Bullet hit resolution from avian `CollisionStart` messages.
//!
//! | bullet     | other  | effect                                             |
//! |------------|--------|----------------------------------------------------|
//! | any        | wall   | return                                             |
//! | unparried  | player | damage + eclipse layers, return                    |
//! | parried    | enemy  | reflected damage + `ParriedBulletHit`, return;     |
//! |            |        | `BulletReturned` too if the enemy is the shooter   |
//!
//! Anything else is ignored. A bullet resolves at most one hit: `spent` is set on
//! the first one and the per-run `seen` set drops duplicate contacts.

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::layers::{is_in_layer, Layer};
use crate::common::tunables::Tunables;
use crate::plugins::eclipse::EclipseChange;
use crate::plugins::health::{DamageRequest, DamageSource};

use super::components::{BulletState, PooledBullet, Projectile};
use super::messages::{BulletReturned, ParriedBulletHit};

#[derive(Clone, Copy, Debug)]
struct CollisionTarget {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
fn targets(ev: &CollisionStart) -> (CollisionTarget, CollisionTarget) {
    (
        CollisionTarget { collider: ev.collider1, body: ev.body1 },
        CollisionTarget { collider: ev.collider2, body: ev.body2 },
    )
}

pub fn process_bullet_collisions(
    tunables: Res<Tunables>,
    mut started: MessageReader<CollisionStart>,
    q_is_bullet: Query<(), With<PooledBullet>>,
    mut q_bullets: Query<(&mut Projectile, &mut BulletState, &Transform), With<PooledBullet>>,
    q_layers: Query<&CollisionLayers>,
    mut damage: MessageWriter<DamageRequest>,
    mut eclipse: MessageWriter<EclipseChange>,
    mut parried_hits: MessageWriter<ParriedBulletHit>,
    mut returned: MessageWriter<BulletReturned>,
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();
    let cfg = &tunables.projectile;

    for ev in started.read() {
        let (t1, t2) = targets(ev);

        let b1 = q_is_bullet.contains(t1.collider);
        let b2 = q_is_bullet.contains(t2.collider);
        if !(b1 ^ b2) {
            continue;
        }
        let (bullet_side, other_side) = if b1 { (t1, t2) } else { (t2, t1) };

        if !seen.insert(bullet_side.collider) {
            continue;
        }

        let Ok(other_layers) = q_layers.get(other_side.collider) else {
            continue;
        };
        let Ok((mut projectile, mut state, tf)) = q_bullets.get_mut(bullet_side.collider) else {
            continue;
        };
        if *state != BulletState::Active || projectile.spent {
            continue;
        }

        if is_in_layer(other_layers, Layer::World) {
            projectile.spent = true;
            *state = BulletState::PendingReturn;
            continue;
        }

        let target = other_side.gameplay_owner();

        if is_in_layer(other_layers, Layer::Player) {
            if projectile.parried {
                continue;
            }
            damage.write(DamageRequest {
                target,
                amount: projectile.damage,
                source: DamageSource::Projectile,
            });
            eclipse.write(EclipseChange::add(target, cfg.layers_on_hit));
            projectile.spent = true;
            *state = BulletState::PendingReturn;
            continue;
        }

        if is_in_layer(other_layers, Layer::Enemy) && projectile.parried {
            damage.write(DamageRequest {
                target,
                amount: projectile.reflected_damage(cfg),
                source: DamageSource::ReflectedProjectile,
            });
            parried_hits.write(ParriedBulletHit {
                target,
                position: tf.translation.truncate(),
                strength: projectile.parry_strength,
            });
            if projectile.owner == Some(target) {
                returned.write(BulletReturned { shooter: target, strength: projectile.parry_strength });
            }
            projectile.spent = true;
            *state = BulletState::PendingReturn;
        }
    }
}
