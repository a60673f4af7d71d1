//! Collision layers.
//!
//! Bullets carry their faction in their membership: enemy fire lives on `EnemyBullet`
//! and only hits the player, a reflected bullet is moved to `PlayerBullet` and only
//! hits enemies.

use avian2d::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Default,
    World,
    Player,
    Enemy,
    PlayerBullet,
    EnemyBullet,
}

#[inline]
pub fn is_in_layer(layers: &CollisionLayers, layer: Layer) -> bool {
    layers.memberships.has_all(layer)
}

/// Membership kept, filters cleared: the entity stops generating contacts without
/// any structural change.
#[inline]
pub fn non_interacting(layer: Layer) -> CollisionLayers {
    CollisionLayers::new(layer, [] as [Layer; 0])
}
