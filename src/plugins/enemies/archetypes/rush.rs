//! Rush boss: rests, aims a dash indicator at the player, dashes.
//!
//! Minions are topped up to a hard cap, and only while resting.

use bevy::prelude::*;
use rand::Rng;

use crate::common::tunables::EnemyTunables;
use crate::plugins::enemies::actions::{EnemyAction, TelegraphKind};
use crate::plugins::enemies::brain::{BrainCtx, EnemyBehavior};
use crate::plugins::enemies::machine::{change_state, NamedState, StateClock, StateMachine};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RushState {
    Idle,
    Windup,
    Dash,
}

impl NamedState for RushState {
    fn name(self) -> &'static str {
        match self {
            RushState::Idle => "idle",
            RushState::Windup => "windup",
            RushState::Dash => "dash",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RushBrain {
    clock: StateClock<RushState>,
    aim: Vec2,
    aim_error: f32,
}

impl Default for RushBrain {
    fn default() -> Self {
        Self { clock: StateClock::new(RushState::Idle), aim: Vec2::X, aim_error: 0.0 }
    }
}

impl RushBrain {
    pub fn state(&self) -> RushState {
        self.clock.state()
    }

    pub fn aim(&self) -> Vec2 {
        self.aim
    }

    fn aim_target(&self, ctx: &BrainCtx) -> Option<Vec2> {
        ctx.dir_to_player().map(|d| Vec2::from_angle(self.aim_error).rotate(d))
    }
}

/// Exponential approach of `current` towards `target` at `rate` per second.
pub fn smooth_aim(current: Vec2, target: Vec2, rate: f32, dt: f32) -> Vec2 {
    let alpha = 1.0 - (-rate.max(0.0) * dt).exp();
    current.lerp(target, alpha).try_normalize().unwrap_or(target)
}

impl StateMachine for RushBrain {
    type State = RushState;

    fn clock(&self) -> &StateClock<RushState> {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut StateClock<RushState> {
        &mut self.clock
    }

    fn on_enter(&mut self, state: RushState, ctx: &mut BrainCtx) {
        match state {
            RushState::Idle => {
                ctx.control.immovable = true;
                ctx.control.spawn_eligible = true;
                ctx.act(EnemyAction::RequestMinionCheck);
            }
            RushState::Windup => {
                ctx.control.immovable = true;
                ctx.control.spawn_eligible = false;
                let spread = ctx.tunables.rush.aim_error_degrees.abs().to_radians();
                self.aim_error = if spread > 0.0 { ctx.rng.gen_range(-spread..=spread) } else { 0.0 };
                if let Some(target) = self.aim_target(ctx) {
                    self.aim = target;
                }
                ctx.act(EnemyAction::ShowTelegraph {
                    kind: TelegraphKind::DashIndicator,
                    direction: self.aim,
                });
            }
            RushState::Dash => {
                ctx.control.immovable = false;
                ctx.control.spawn_eligible = false;
            }
        }
    }
}

impl EnemyBehavior for RushBrain {
    fn update(&mut self, ctx: &mut BrainCtx) {
        let t = ctx.tunables;
        let cfg = &t.rush;

        self.clock.tick(ctx.dt);
        match self.clock.state() {
            RushState::Idle => {
                ctx.control.immovable = true;
                ctx.control.spawn_eligible = true;
                ctx.control.halt();
                if self.clock.at_least(cfg.idle_secs) {
                    change_state(self, ctx, RushState::Windup);
                }
            }
            RushState::Windup => {
                ctx.control.halt();
                if let Some(target) = self.aim_target(ctx) {
                    self.aim = smooth_aim(self.aim, target, cfg.indicator_smoothing, ctx.dt);
                    ctx.act(EnemyAction::AimTelegraphs(self.aim));
                }
                if self.clock.at_least(cfg.windup_secs) {
                    change_state(self, ctx, RushState::Dash);
                }
            }
            RushState::Dash => {
                ctx.control.velocity = self.aim * cfg.dash_speed;
                if self.clock.at_least(cfg.dash_secs) {
                    change_state(self, ctx, RushState::Idle);
                }
            }
        }
    }

    fn on_player_collision(&mut self, ctx: &mut BrainCtx) {
        let t = ctx.tunables;
        ctx.hit_player(t.rush.stats.collision_damage, t.rush.stats.layer_add_amount);
    }

    fn contact_cooldown_secs(&self, cfg: &EnemyTunables) -> f32 {
        cfg.rush.contact_interval_secs
    }

    fn state_name(&self) -> &'static str {
        self.clock.state().name()
    }
}
