//! Mole boss: burrows, warns, surfaces.
//!
//! It can only be hurt while `Emerged`. Underground it keeps summoning minions
//! under a soft threshold, and any hit may send it back down early.

use rand::Rng;

use crate::common::tunables::EnemyTunables;
use crate::plugins::enemies::actions::{EnemyAction, TelegraphKind};
use crate::plugins::enemies::brain::{BrainCtx, EnemyBehavior};
use crate::plugins::enemies::machine::{change_state, NamedState, StateClock, StateMachine};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoleState {
    Hidden,
    Warning,
    Emerged,
}

impl NamedState for MoleState {
    fn name(self) -> &'static str {
        match self {
            MoleState::Hidden => "hidden",
            MoleState::Warning => "warning",
            MoleState::Emerged => "emerged",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MoleBrain {
    clock: StateClock<MoleState>,
}

impl Default for MoleBrain {
    fn default() -> Self {
        Self { clock: StateClock::new(MoleState::Hidden) }
    }
}

impl MoleBrain {
    pub fn state(&self) -> MoleState {
        self.clock.state()
    }

    fn apply_flags(&self, ctx: &mut BrainCtx) {
        let emerged = self.clock.is(MoleState::Emerged);
        ctx.control.immovable = true;
        ctx.control.can_take_damage = emerged;
        ctx.control.spawn_eligible = !emerged;
    }
}

impl StateMachine for MoleBrain {
    type State = MoleState;

    fn clock(&self) -> &StateClock<MoleState> {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut StateClock<MoleState> {
        &mut self.clock
    }

    fn on_enter(&mut self, state: MoleState, ctx: &mut BrainCtx) {
        if state == MoleState::Warning {
            ctx.act(EnemyAction::ShowTelegraph {
                kind: TelegraphKind::Burrow,
                direction: bevy::math::Vec2::X,
            });
        }
        self.apply_flags(ctx);
    }
}

impl EnemyBehavior for MoleBrain {
    fn update(&mut self, ctx: &mut BrainCtx) {
        let t = ctx.tunables;
        let cfg = &t.mole;

        ctx.control.halt();
        self.apply_flags(ctx);
        self.clock.tick(ctx.dt);

        let next = match self.clock.state() {
            MoleState::Hidden if self.clock.at_least(cfg.hidden_secs) => Some(MoleState::Warning),
            MoleState::Warning if self.clock.at_least(cfg.warning_secs) => Some(MoleState::Emerged),
            MoleState::Emerged if self.clock.at_least(cfg.emerged_secs) => Some(MoleState::Hidden),
            _ => None,
        };
        if let Some(next) = next {
            change_state(self, ctx, next);
        }
    }

    fn on_player_collision(&mut self, ctx: &mut BrainCtx) {
        if self.clock.is(MoleState::Hidden) {
            return;
        }
        let t = ctx.tunables;
        ctx.hit_player(t.mole.stats.collision_damage, t.mole.stats.layer_add_amount);
    }

    fn contact_cooldown_secs(&self, cfg: &EnemyTunables) -> f32 {
        cfg.mole.contact_interval_secs
    }

    fn on_damaged(&mut self, ctx: &mut BrainCtx, _amount: f32) {
        if !self.clock.is(MoleState::Emerged) {
            return;
        }
        let chance = ctx.tunables.mole.early_hide_chance.clamp(0.0, 1.0) as f64;
        if ctx.rng.gen_bool(chance) {
            change_state(self, ctx, MoleState::Hidden);
        }
    }

    fn state_name(&self) -> &'static str {
        self.clock.state().name()
    }
}
