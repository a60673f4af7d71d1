//! Charge-master boss: alternates charges and aimed shots.
//!
//! Each shot opens a short vulnerability window. A parried shot that comes back
//! during it hurts the boss and staggers it.

use bevy::prelude::*;
use rand::Rng;

use crate::common::tunables::EnemyTunables;
use crate::plugins::enemies::actions::{EnemyAction, TelegraphKind};
use crate::plugins::enemies::brain::{BrainCtx, EnemyBehavior};
use crate::plugins::enemies::machine::{change_state, NamedState, StateClock, StateMachine};
use crate::plugins::health::DamageSource;

use super::{Wander, WanderArea};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargeMasterState {
    Patrol,
    ChargeWindup,
    Charge,
    ShootWindup,
    Shoot,
    Stagger,
    Cooldown,
}

impl NamedState for ChargeMasterState {
    fn name(self) -> &'static str {
        match self {
            ChargeMasterState::Patrol => "patrol",
            ChargeMasterState::ChargeWindup => "charge_windup",
            ChargeMasterState::Charge => "charge",
            ChargeMasterState::ShootWindup => "shoot_windup",
            ChargeMasterState::Shoot => "shoot",
            ChargeMasterState::Stagger => "stagger",
            ChargeMasterState::Cooldown => "cooldown",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShotPattern {
    /// A fast bullet, then a slow one.
    FastSlow,
    Burst,
}

#[derive(Debug, Clone)]
pub struct ChargeMasterBrain {
    clock: StateClock<ChargeMasterState>,
    home: Vec2,
    wander: Wander,
    charge_cd: f32,
    shoot_cd: f32,
    charge_dir: Vec2,
    pattern: ShotPattern,
    shots_fired: u32,
    vulnerable_remaining: f32,
    stagger_secs: f32,
}

impl ChargeMasterBrain {
    pub fn new(home: Vec2) -> Self {
        Self {
            clock: StateClock::new(ChargeMasterState::Patrol),
            home,
            wander: Wander::default(),
            charge_cd: 0.0,
            shoot_cd: 0.0,
            charge_dir: Vec2::X,
            pattern: ShotPattern::Burst,
            shots_fired: 0,
            vulnerable_remaining: 0.0,
            stagger_secs: 0.0,
        }
    }

    pub fn state(&self) -> ChargeMasterState {
        self.clock.state()
    }

    pub fn pattern(&self) -> ShotPattern {
        self.pattern
    }

    pub fn shots_fired(&self) -> u32 {
        self.shots_fired
    }

    /// True while a returned bullet would stagger the boss.
    pub fn is_vulnerable(&self) -> bool {
        self.vulnerable_remaining > 0.0
    }

    fn stagger(&mut self, ctx: &mut BrainCtx, secs: f32) {
        self.stagger_secs = secs;
        change_state(self, ctx, ChargeMasterState::Stagger);
    }

    fn shot_count(&self, cfg: &crate::common::tunables::ChargeMasterTunables) -> u32 {
        match self.pattern {
            ShotPattern::FastSlow => 2,
            ShotPattern::Burst => cfg.bullets_per_burst.max(1),
        }
    }

    fn fire(&mut self, ctx: &mut BrainCtx) {
        let t = ctx.tunables;
        let cfg = &t.charge_master;
        let speed = match (self.pattern, self.shots_fired) {
            (ShotPattern::FastSlow, 0) => cfg.fast_bullet_speed,
            (ShotPattern::FastSlow, _) => cfg.slow_bullet_speed,
            (ShotPattern::Burst, _) => cfg.bullet_speed,
        };
        let direction = ctx.dir_to_player().unwrap_or(self.charge_dir);
        ctx.act(EnemyAction::FireBullet { direction, speed, damage: cfg.bullet_damage });
        self.shots_fired += 1;
        self.vulnerable_remaining = cfg.vulnerability_secs;
    }

    fn pick_attack(&self, ctx: &mut BrainCtx) -> Option<ChargeMasterState> {
        let charge_ready = self.charge_cd <= 0.0;
        let shoot_ready = self.shoot_cd <= 0.0;
        match (charge_ready, shoot_ready) {
            (true, true) if ctx.rng.gen_bool(0.5) => Some(ChargeMasterState::ChargeWindup),
            (true, true) => Some(ChargeMasterState::ShootWindup),
            (true, false) => Some(ChargeMasterState::ChargeWindup),
            (false, true) => Some(ChargeMasterState::ShootWindup),
            (false, false) => None,
        }
    }
}

impl StateMachine for ChargeMasterBrain {
    type State = ChargeMasterState;

    fn clock(&self) -> &StateClock<ChargeMasterState> {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut StateClock<ChargeMasterState> {
        &mut self.clock
    }

    fn on_enter(&mut self, state: ChargeMasterState, ctx: &mut BrainCtx) {
        let t = ctx.tunables;
        let cfg = &t.charge_master;
        match state {
            ChargeMasterState::Patrol => self.wander.reset(),
            ChargeMasterState::ChargeWindup => {
                ctx.control.halt();
                if let Some(d) = ctx.dir_to_player() {
                    self.charge_dir = d;
                }
                ctx.act(EnemyAction::ShowTelegraph {
                    kind: TelegraphKind::ChargeLane,
                    direction: self.charge_dir,
                });
            }
            ChargeMasterState::Charge => self.charge_cd = cfg.charge_cooldown_secs,
            ChargeMasterState::ShootWindup => {
                ctx.control.halt();
                self.pattern = if ctx.rng.gen_bool(cfg.fast_slow_chance.clamp(0.0, 1.0) as f64) {
                    ShotPattern::FastSlow
                } else {
                    ShotPattern::Burst
                };
                let direction = ctx.dir_to_player().unwrap_or(self.charge_dir);
                ctx.act(EnemyAction::ShowTelegraph { kind: TelegraphKind::Muzzle, direction });
            }
            ChargeMasterState::Shoot => {
                self.shoot_cd = cfg.shoot_cooldown_secs;
                self.shots_fired = 0;
                self.fire(ctx);
            }
            ChargeMasterState::Stagger | ChargeMasterState::Cooldown => ctx.control.halt(),
        }
    }
}

impl EnemyBehavior for ChargeMasterBrain {
    fn update(&mut self, ctx: &mut BrainCtx) {
        let t = ctx.tunables;
        let cfg = &t.charge_master;

        self.clock.tick(ctx.dt);
        self.charge_cd = (self.charge_cd - ctx.dt).max(0.0);
        self.shoot_cd = (self.shoot_cd - ctx.dt).max(0.0);
        self.vulnerable_remaining = (self.vulnerable_remaining - ctx.dt).max(0.0);

        match self.clock.state() {
            ChargeMasterState::Patrol => {
                if ctx.player_within(cfg.engage_range) {
                    if let Some(next) = self.pick_attack(ctx) {
                        change_state(self, ctx, next);
                        return;
                    }
                }
                let area = WanderArea::Box {
                    center: self.home,
                    half_extents: Vec2::from(cfg.patrol_box) * 0.5,
                };
                ctx.control.velocity =
                    self.wander.step(ctx, area, cfg.patrol_speed, 0.5, cfg.patrol_retarget_secs);
            }
            ChargeMasterState::ChargeWindup => {
                ctx.control.halt();
                if let Some(d) = ctx.dir_to_player() {
                    self.charge_dir = d;
                    ctx.act(EnemyAction::AimTelegraphs(d));
                }
                if self.clock.at_least(cfg.charge_windup_secs) {
                    change_state(self, ctx, ChargeMasterState::Charge);
                }
            }
            ChargeMasterState::Charge => {
                ctx.control.velocity = self.charge_dir * cfg.charge_speed;
                if self.clock.at_least(cfg.charge_secs) {
                    self.stagger(ctx, cfg.charge_stagger_secs);
                }
            }
            ChargeMasterState::ShootWindup => {
                ctx.control.halt();
                if let Some(d) = ctx.dir_to_player() {
                    ctx.act(EnemyAction::AimTelegraphs(d));
                }
                if self.clock.at_least(cfg.shoot_windup_secs) {
                    change_state(self, ctx, ChargeMasterState::Shoot);
                }
            }
            ChargeMasterState::Shoot => {
                ctx.control.halt();
                let interval = match self.pattern {
                    ShotPattern::FastSlow => cfg.fast_slow_delay_secs,
                    ShotPattern::Burst => cfg.burst_interval_secs,
                };
                let total = self.shot_count(cfg);
                if self.shots_fired < total && self.clock.at_least(interval * self.shots_fired as f32) {
                    self.fire(ctx);
                }
                if self.shots_fired >= total {
                    self.stagger(ctx, cfg.shoot_stagger_secs);
                }
            }
            ChargeMasterState::Stagger => {
                ctx.control.halt();
                if self.clock.at_least(self.stagger_secs) {
                    change_state(self, ctx, ChargeMasterState::Cooldown);
                }
            }
            ChargeMasterState::Cooldown => {
                ctx.control.halt();
                if self.clock.at_least(cfg.cooldown_secs) {
                    change_state(self, ctx, ChargeMasterState::Patrol);
                }
            }
        }
    }

    fn on_player_collision(&mut self, ctx: &mut BrainCtx) {
        let t = ctx.tunables;
        let cfg = &t.charge_master;
        if self.clock.is(ChargeMasterState::Charge) {
            ctx.hit_player(cfg.charge_damage, cfg.charge_layers);
        } else {
            ctx.hit_player(cfg.stats.collision_damage, cfg.stats.layer_add_amount);
        }
    }

    fn contact_cooldown_secs(&self, cfg: &EnemyTunables) -> f32 {
        cfg.charge_master.contact_interval_secs
    }

    fn on_bullet_returned(&mut self, ctx: &mut BrainCtx, strength: u32) {
        let t = ctx.tunables;
        let cfg = &t.charge_master;
        let amount = cfg.bullet_damage
            * cfg.reflect_damage_multiplier
            * (1.0 + strength as f32 * cfg.reflect_damage_per_strength);
        let me = ctx.me;
        ctx.act(EnemyAction::Damage { target: me, amount, source: DamageSource::BossCounter });
        if self.is_vulnerable() {
            self.vulnerable_remaining = 0.0;
            self.stagger(ctx, cfg.reflect_stagger_secs);
        }
    }

    fn state_name(&self) -> &'static str {
        self.clock.state().name()
    }
}
