//! Enemy/player body contact.
//!
//! Avian reports contact begin and end; we keep a `touching` flag per enemy and let
//! `think_enemies` fire `on_player_collision` while it is set, at most once per the
//! archetype's contact cooldown.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::plugins::player::Player;

use super::Enemy;

#[derive(Component, Debug, Default, Clone, PartialEq)]
pub struct ContactState {
    touching: bool,
    cooldown: f32,
}

impl ContactState {
    #[inline]
    pub fn is_touching(&self) -> bool {
        self.touching
    }

    pub fn set_touching(&mut self, touching: bool) {
        self.touching = touching;
    }

    pub fn tick(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    /// True when touching and off cooldown.
    #[inline]
    pub fn ready(&self) -> bool {
        self.touching && self.cooldown <= 0.0
    }

    pub fn arm(&mut self, secs: f32) {
        self.cooldown = secs.max(0.0);
    }
}

#[inline]
fn owner(collider: Entity, body: Option<Entity>) -> Entity {
    body.unwrap_or(collider)
}

/// Resolves which side of a contact pair is the enemy, given the other side is the player.
fn enemy_of_pair(
    a: Entity,
    b: Entity,
    q_player: &Query<(), With<Player>>,
    q_enemy: &Query<&mut ContactState, With<Enemy>>,
) -> Option<Entity> {
    if q_enemy.contains(a) && q_player.contains(b) {
        Some(a)
    } else if q_enemy.contains(b) && q_player.contains(a) {
        Some(b)
    } else {
        None
    }
}

pub fn track_player_contacts(
    mut started: MessageReader<CollisionStart>,
    mut ended: MessageReader<CollisionEnd>,
    q_player: Query<(), With<Player>>,
    mut q_enemy: Query<&mut ContactState, With<Enemy>>,
) {
    for ev in started.read() {
        let a = owner(ev.collider1, ev.body1);
        let b = owner(ev.collider2, ev.body2);
        if let Some(e) = enemy_of_pair(a, b, &q_player, &q_enemy) {
            if let Ok(mut contact) = q_enemy.get_mut(e) {
                contact.set_touching(true);
            }
        }
    }
    for ev in ended.read() {
        let a = owner(ev.collider1, ev.body1);
        let b = owner(ev.collider2, ev.body2);
        if let Some(e) = enemy_of_pair(a, b, &q_player, &q_enemy) {
            if let Ok(mut contact) = q_enemy.get_mut(e) {
                contact.set_touching(false);
            }
        }
    }
}
