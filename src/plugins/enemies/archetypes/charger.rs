//! Charger: a parry-bait rammer that cannot be hurt mid-charge.
//!
//! A blocked hit while charging knocks it into `Exposed`: it flies away from the
//! player and detonates on the first enemy it touches, dealing the stored hit times
//! `exposed_damage_multiplier` to everything around it. It stays immune to damage
//! while exposed.

use bevy::prelude::*;

use crate::common::tunables::EnemyTunables;
use crate::plugins::enemies::actions::{EnemyAction, TelegraphKind};
use crate::plugins::enemies::brain::{BrainCtx, EnemyBehavior};
use crate::plugins::enemies::machine::{change_state, NamedState, StateClock, StateMachine};
use crate::plugins::health::DamageSource;
use crate::plugins::visuals::VisualKind;

use super::{jitter, Wander, WanderArea};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargerState {
    Patrol,
    Windup,
    Charging,
    Exposed,
    Rebound,
    Stunned,
    Cooldown,
}

impl NamedState for ChargerState {
    fn name(self) -> &'static str {
        match self {
            ChargerState::Patrol => "patrol",
            ChargerState::Windup => "windup",
            ChargerState::Charging => "charging",
            ChargerState::Exposed => "exposed",
            ChargerState::Rebound => "rebound",
            ChargerState::Stunned => "stunned",
            ChargerState::Cooldown => "cooldown",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChargerBrain {
    clock: StateClock<ChargerState>,
    home: Vec2,
    wander: Wander,
    charge_dir: Vec2,
    charge_speed: f32,
    flee_dir: Vec2,
    stored_damage: f32,
}

impl ChargerBrain {
    pub fn new(home: Vec2) -> Self {
        Self {
            clock: StateClock::new(ChargerState::Patrol),
            home,
            wander: Wander::default(),
            charge_dir: Vec2::X,
            charge_speed: 0.0,
            flee_dir: Vec2::ZERO,
            stored_damage: 0.0,
        }
    }

    pub fn state(&self) -> ChargerState {
        self.clock.state()
    }

    pub fn stored_damage(&self) -> f32 {
        self.stored_damage
    }

    /// Detonate on every other live enemy inside `radius`. Returns false if nobody is there.
    fn try_detonate(&mut self, ctx: &mut BrainCtx, radius: f32, multiplier: f32) -> bool {
        let me = ctx.me;
        let pos = ctx.pos;
        let victims: Vec<Entity> = ctx
            .others
            .iter()
            .filter(|o| o.entity != me && o.pos.distance(pos) <= radius)
            .map(|o| o.entity)
            .collect();
        if victims.is_empty() {
            return false;
        }
        let amount = self.stored_damage * multiplier;
        for target in victims {
            ctx.act(EnemyAction::Damage { target, amount, source: DamageSource::Detonation });
        }
        ctx.act(EnemyAction::Visual { kind: VisualKind::Detonation, scale: 1.0 });
        ctx.self_destruct();
        true
    }
}

impl StateMachine for ChargerBrain {
    type State = ChargerState;

    fn clock(&self) -> &StateClock<ChargerState> {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut StateClock<ChargerState> {
        &mut self.clock
    }

    fn on_enter(&mut self, state: ChargerState, ctx: &mut BrainCtx) {
        match state {
            ChargerState::Patrol => self.wander.reset(),
            ChargerState::Windup => {
                ctx.control.halt();
                ctx.control.immovable = true;
                if let Some(d) = ctx.dir_to_player() {
                    self.charge_dir = d;
                }
                ctx.act(EnemyAction::ShowTelegraph {
                    kind: TelegraphKind::ChargeLane,
                    direction: self.charge_dir,
                });
            }
            ChargerState::Charging => {
                self.charge_speed = 0.0;
                ctx.control.can_take_damage = false;
            }
            // Only the detonation or the timeout ends an exposed charger.
            ChargerState::Exposed => ctx.control.can_take_damage = false,
            _ => {}
        }
    }

    fn on_exit(&mut self, state: ChargerState, ctx: &mut BrainCtx) {
        match state {
            ChargerState::Windup => ctx.control.immovable = false,
            ChargerState::Charging | ChargerState::Exposed => ctx.control.can_take_damage = true,
            _ => {}
        }
    }
}

impl EnemyBehavior for ChargerBrain {
    fn update(&mut self, ctx: &mut BrainCtx) {
        let t = ctx.tunables;
        let cfg = &t.charger;

        self.clock.tick(ctx.dt);
        match self.clock.state() {
            ChargerState::Patrol => {
                if ctx.player_within(cfg.detection_range) {
                    change_state(self, ctx, ChargerState::Windup);
                    return;
                }
                let area = WanderArea::Circle { center: self.home, radius: cfg.patrol_range };
                ctx.control.velocity = self.wander.step(ctx, area, cfg.move_speed, 0.5, 3.0);
            }
            ChargerState::Windup => {
                ctx.control.halt();
                if let Some(d) = ctx.dir_to_player() {
                    self.charge_dir = d;
                    ctx.act(EnemyAction::AimTelegraphs(d));
                }
                if self.clock.at_least(cfg.windup_secs) {
                    change_state(self, ctx, ChargerState::Charging);
                }
            }
            ChargerState::Charging => {
                self.charge_speed =
                    (self.charge_speed + cfg.charge_acceleration * ctx.dt).min(cfg.charge_speed);
                ctx.control.velocity = self.charge_dir * self.charge_speed;
                if self.clock.at_least(cfg.charge_timeout_secs) {
                    if cfg.destroy_on_miss {
                        ctx.act(EnemyAction::Visual { kind: VisualKind::ChargeMiss, scale: 1.0 });
                        ctx.self_destruct();
                    } else {
                        change_state(self, ctx, ChargerState::Cooldown);
                    }
                }
            }
            ChargerState::Exposed => {
                ctx.control.velocity = self.flee_dir * cfg.exposed_speed;
                let radius = cfg.stats.radius * 2.0;
                if self.try_detonate(ctx, radius, cfg.exposed_damage_multiplier) {
                    return;
                }
                if self.clock.at_least(cfg.exposed_secs) {
                    ctx.act(EnemyAction::Visual { kind: VisualKind::Detonation, scale: 1.0 });
                    ctx.self_destruct();
                }
            }
            ChargerState::Rebound => {
                ctx.control.velocity = self.flee_dir * cfg.rebound_speed;
                if self.clock.at_least(cfg.rebound_secs) {
                    change_state(self, ctx, ChargerState::Stunned);
                }
            }
            ChargerState::Stunned => {
                ctx.control.halt();
                if self.clock.at_least(cfg.stun_secs) {
                    change_state(self, ctx, ChargerState::Cooldown);
                }
            }
            ChargerState::Cooldown => {
                ctx.control.halt();
                if self.clock.at_least(cfg.cooldown_secs) {
                    change_state(self, ctx, ChargerState::Patrol);
                }
            }
        }
    }

    fn on_player_collision(&mut self, ctx: &mut BrainCtx) {
        if !self.clock.is(ChargerState::Charging) {
            return;
        }
        let t = ctx.tunables;
        let cfg = &t.charger;
        ctx.hit_player(cfg.stats.collision_damage, cfg.stats.layer_add_amount);
        self.flee_dir = jitter(ctx.dir_from_player(), cfg.rebound_spread_degrees, ctx.rng);
        change_state(self, ctx, ChargerState::Rebound);
    }

    fn contact_cooldown_secs(&self, cfg: &EnemyTunables) -> f32 {
        cfg.charger.contact_cooldown_secs
    }

    fn on_damage_blocked(&mut self, ctx: &mut BrainCtx, amount: f32) {
        if !self.clock.is(ChargerState::Charging) {
            return;
        }
        self.stored_damage = amount;
        self.flee_dir = ctx.dir_from_player();
        change_state(self, ctx, ChargerState::Exposed);
    }

    fn state_name(&self) -> &'static str {
        self.clock.state().name()
    }
}
