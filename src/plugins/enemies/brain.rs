//! The enemy behaviour contract.
//!
//! Brains never touch the world. Each call gets a [`BrainCtx`] describing what the
//! enemy can see, and answers by editing its [`EnemyControl`] (velocity, flags) and
//! by queuing [`EnemyAction`]s that `apply_enemy_actions` executes later in the tick.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::common::tunables::EnemyTunables;
use crate::plugins::health::DamageSource;

use super::actions::{EnemyAction, EnemyActions};
use super::archetypes::{
    charge_master::ChargeMasterBrain, charger::ChargerBrain, mole::MoleBrain, rush::RushBrain,
    sentinel::SentinelBrain, shadow::ShadowBrain,
};

/// What a brain asks of its body this tick.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct EnemyControl {
    pub velocity: Vec2,
    pub immovable: bool,
    pub can_take_damage: bool,
    pub spawn_eligible: bool,
    /// Set once the brain has asked for its own destruction; it is not run again.
    pub retired: bool,
}

impl Default for EnemyControl {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            immovable: false,
            can_take_damage: true,
            spawn_eligible: false,
            retired: false,
        }
    }
}

impl EnemyControl {
    pub fn halt(&mut self) {
        self.velocity = Vec2::ZERO;
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PlayerView {
    pub entity: Entity,
    pub pos: Vec2,
}

/// Another live enemy, as seen at the start of the tick.
#[derive(Clone, Copy, Debug)]
pub struct EnemySnapshot {
    pub entity: Entity,
    pub pos: Vec2,
}

pub struct BrainCtx<'a> {
    pub me: Entity,
    pub pos: Vec2,
    pub dt: f32,
    pub player: Option<PlayerView>,
    pub others: &'a [EnemySnapshot],
    pub rng: &'a mut ChaCha8Rng,
    pub tunables: &'a EnemyTunables,
    pub control: &'a mut EnemyControl,
    pub actions: &'a mut EnemyActions,
}

impl BrainCtx<'_> {
    #[inline]
    pub fn act(&mut self, action: EnemyAction) {
        self.actions.push(self.me, action);
    }

    pub fn player_pos(&self) -> Option<Vec2> {
        self.player.map(|p| p.pos)
    }

    pub fn distance_to_player(&self) -> Option<f32> {
        self.player_pos().map(|p| p.distance(self.pos))
    }

    pub fn player_within(&self, range: f32) -> bool {
        self.distance_to_player().is_some_and(|d| d <= range)
    }

    /// Unit vector towards the player, or `None` when there is no player or it is on top of us.
    pub fn dir_to_player(&self) -> Option<Vec2> {
        self.player_pos().and_then(|p| (p - self.pos).try_normalize())
    }

    /// Unit vector away from the player; straight up when that is undefined.
    pub fn dir_from_player(&self) -> Vec2 {
        self.dir_to_player().map_or(Vec2::Y, |d| -d)
    }

    /// Contact damage plus eclipse layers on the player.
    pub fn hit_player(&mut self, amount: f32, layers: u32) {
        let Some(player) = self.player else {
            return;
        };
        self.act(EnemyAction::Damage { target: player.entity, amount, source: DamageSource::Contact });
        if layers > 0 {
            self.act(EnemyAction::AddLayers { target: player.entity, layers });
        }
    }

    pub fn self_destruct(&mut self) {
        if self.control.retired {
            return;
        }
        self.control.halt();
        self.control.retired = true;
        self.act(EnemyAction::SelfDestruct);
    }
}

/// Shared interface of every enemy archetype.
pub trait EnemyBehavior {
    fn update(&mut self, ctx: &mut BrainCtx);

    /// Called while touching the player, at most once per [`Self::contact_cooldown_secs`].
    fn on_player_collision(&mut self, _ctx: &mut BrainCtx) {}

    fn contact_cooldown_secs(&self, cfg: &EnemyTunables) -> f32;

    fn on_damaged(&mut self, _ctx: &mut BrainCtx, _amount: f32) {}

    fn on_damage_blocked(&mut self, _ctx: &mut BrainCtx, _amount: f32) {}

    /// One of our own bullets came back after being parried.
    fn on_bullet_returned(&mut self, _ctx: &mut BrainCtx, _strength: u32) {}

    fn state_name(&self) -> &'static str;
}

/// Archetype payloads behind one component.
#[derive(Component, Debug, Clone)]
pub enum EnemyBrain {
    Shadow(ShadowBrain),
    Charger(ChargerBrain),
    Sentinel(SentinelBrain),
    Mole(MoleBrain),
    Rush(RushBrain),
    ChargeMaster(ChargeMasterBrain),
}

impl EnemyBrain {
    pub fn behavior(&self) -> &dyn EnemyBehavior {
        match self {
            EnemyBrain::Shadow(b) => b,
            EnemyBrain::Charger(b) => b,
            EnemyBrain::Sentinel(b) => b,
            EnemyBrain::Mole(b) => b,
            EnemyBrain::Rush(b) => b,
            EnemyBrain::ChargeMaster(b) => b,
        }
    }

    pub fn behavior_mut(&mut self) -> &mut dyn EnemyBehavior {
        match self {
            EnemyBrain::Shadow(b) => b,
            EnemyBrain::Charger(b) => b,
            EnemyBrain::Sentinel(b) => b,
            EnemyBrain::Mole(b) => b,
            EnemyBrain::Rush(b) => b,
            EnemyBrain::ChargeMaster(b) => b,
        }
    }
}
