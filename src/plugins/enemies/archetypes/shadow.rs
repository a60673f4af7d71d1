//! Shadow: the basic chaser, also used as boss minions.
//!
//! ```text
//! Idle ─► Patrol ─(player within range)─► Chase (windup, aim) ─► Attack (dash) ─► Cooldown
//!            ▲                                 ▲                                   │
//!            └──────────── player gone ────────┴──────────── player in range ──────┘
//! any hit ─► Knockback ─► Stunned ─► Cooldown (hit while attacking) | Chase
//! ```

use bevy::prelude::*;

use crate::common::tunables::EnemyTunables;
use crate::plugins::enemies::brain::{BrainCtx, EnemyBehavior};
use crate::plugins::enemies::machine::{change_state, NamedState, StateClock, StateMachine};

use super::{Wander, WanderArea};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowState {
    Idle,
    Patrol,
    Chase,
    Attack,
    Cooldown,
    Knockback,
    Stunned,
}

impl NamedState for ShadowState {
    fn name(self) -> &'static str {
        match self {
            ShadowState::Idle => "idle",
            ShadowState::Patrol => "patrol",
            ShadowState::Chase => "chase",
            ShadowState::Attack => "attack",
            ShadowState::Cooldown => "cooldown",
            ShadowState::Knockback => "knockback",
            ShadowState::Stunned => "stunned",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShadowBrain {
    clock: StateClock<ShadowState>,
    home: Vec2,
    wander: Wander,
    lunge_dir: Vec2,
    knockback_dir: Vec2,
    hit_during_attack: bool,
}

impl ShadowBrain {
    pub fn new(home: Vec2) -> Self {
        Self {
            clock: StateClock::new(ShadowState::Idle),
            home,
            wander: Wander::default(),
            lunge_dir: Vec2::X,
            knockback_dir: Vec2::ZERO,
            hit_during_attack: false,
        }
    }

    pub fn state(&self) -> ShadowState {
        self.clock.state()
    }

    pub fn lunge_dir(&self) -> Vec2 {
        self.lunge_dir
    }

    fn knock_back(&mut self, ctx: &mut BrainCtx, from_attack: bool) {
        self.hit_during_attack = from_attack;
        self.knockback_dir = ctx.dir_from_player();
        change_state(self, ctx, ShadowState::Knockback);
    }
}

impl StateMachine for ShadowBrain {
    type State = ShadowState;

    fn clock(&self) -> &StateClock<ShadowState> {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut StateClock<ShadowState> {
        &mut self.clock
    }

    fn on_enter(&mut self, state: ShadowState, ctx: &mut BrainCtx) {
        match state {
            ShadowState::Patrol => self.wander.reset(),
            ShadowState::Chase => {
                ctx.control.halt();
                if let Some(d) = ctx.dir_to_player() {
                    self.lunge_dir = d;
                }
            }
            _ => {}
        }
    }
}

impl EnemyBehavior for ShadowBrain {
    fn update(&mut self, ctx: &mut BrainCtx) {
        let cfg = &ctx.tunables.shadow;
        let (idle, windup, dash, dash_speed, cooldown) =
            (cfg.idle_secs, cfg.windup_secs, cfg.dash_secs, cfg.dash_speed, cfg.cooldown_secs);
        let (kb_secs, kb_speed, stun) = (cfg.knockback_secs, cfg.knockback_speed, cfg.stun_secs);
        let detection = cfg.detection_range;
        let area = WanderArea::Circle { center: self.home, radius: cfg.patrol_radius };
        let (patrol_speed, arrive, retarget) =
            (cfg.patrol_speed, cfg.patrol_arrive_distance, cfg.patrol_retarget_secs);

        self.clock.tick(ctx.dt);
        match self.clock.state() {
            ShadowState::Idle => {
                ctx.control.halt();
                if self.clock.at_least(idle) {
                    change_state(self, ctx, ShadowState::Patrol);
                }
            }
            ShadowState::Patrol => {
                if ctx.player_within(detection) {
                    change_state(self, ctx, ShadowState::Chase);
                    return;
                }
                ctx.control.velocity = self.wander.step(ctx, area, patrol_speed, arrive, retarget);
            }
            ShadowState::Chase => {
                ctx.control.halt();
                match ctx.dir_to_player() {
                    Some(d) => self.lunge_dir = d,
                    None if ctx.player.is_none() => {
                        change_state(self, ctx, ShadowState::Patrol);
                        return;
                    }
                    None => {}
                }
                if self.clock.at_least(windup) {
                    change_state(self, ctx, ShadowState::Attack);
                }
            }
            ShadowState::Attack => {
                ctx.control.velocity = self.lunge_dir * dash_speed;
                if self.clock.at_least(dash) {
                    change_state(self, ctx, ShadowState::Cooldown);
                }
            }
            ShadowState::Cooldown => {
                ctx.control.halt();
                if self.clock.at_least(cooldown) {
                    let next = if ctx.player_within(detection) {
                        ShadowState::Chase
                    } else {
                        ShadowState::Patrol
                    };
                    change_state(self, ctx, next);
                }
            }
            ShadowState::Knockback => {
                ctx.control.velocity = self.knockback_dir * kb_speed;
                if self.clock.at_least(kb_secs) {
                    change_state(self, ctx, ShadowState::Stunned);
                }
            }
            ShadowState::Stunned => {
                ctx.control.halt();
                if self.clock.at_least(stun) {
                    let next = if self.hit_during_attack {
                        ShadowState::Cooldown
                    } else {
                        ShadowState::Chase
                    };
                    change_state(self, ctx, next);
                }
            }
        }
    }

    fn on_player_collision(&mut self, ctx: &mut BrainCtx) {
        let cfg = &ctx.tunables.shadow;
        match self.clock.state() {
            ShadowState::Attack => {
                let (damage, layers) = (cfg.stats.collision_damage, cfg.stats.layer_add_amount);
                ctx.hit_player(damage, layers);
                self.knock_back(ctx, true);
            }
            ShadowState::Idle | ShadowState::Cooldown => {}
            _ => {
                let (damage, layers) = (cfg.graze_damage, cfg.graze_layers);
                ctx.hit_player(damage, layers);
            }
        }
    }

    fn contact_cooldown_secs(&self, cfg: &EnemyTunables) -> f32 {
        cfg.shadow.contact_cooldown_secs
    }

    fn on_damaged(&mut self, ctx: &mut BrainCtx, _amount: f32) {
        if self.clock.is(ShadowState::Knockback) {
            return;
        }
        let from_attack = self.clock.is(ShadowState::Attack);
        self.knock_back(ctx, from_attack);
    }

    fn state_name(&self) -> &'static str {
        self.clock.state().name()
    }
}
