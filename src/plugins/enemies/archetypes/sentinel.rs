//! Sentinel: an immovable block that burns the player while touched.

use crate::common::tunables::EnemyTunables;
use crate::plugins::enemies::brain::{BrainCtx, EnemyBehavior};
use crate::plugins::enemies::machine::{NamedState, StateClock};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SentinelState {
    Guard,
}

impl NamedState for SentinelState {
    fn name(self) -> &'static str {
        "guard"
    }
}

#[derive(Debug, Clone)]
pub struct SentinelBrain {
    clock: StateClock<SentinelState>,
}

impl Default for SentinelBrain {
    fn default() -> Self {
        Self { clock: StateClock::new(SentinelState::Guard) }
    }
}

impl EnemyBehavior for SentinelBrain {
    fn update(&mut self, ctx: &mut BrainCtx) {
        self.clock.tick(ctx.dt);
        ctx.control.immovable = true;
        ctx.control.halt();
    }

    fn on_player_collision(&mut self, ctx: &mut BrainCtx) {
        let t = ctx.tunables;
        ctx.hit_player(t.sentinel.stats.collision_damage, t.sentinel.pulse_layers);
    }

    fn contact_cooldown_secs(&self, cfg: &EnemyTunables) -> f32 {
        cfg.sentinel.pulse_interval_secs
    }

    fn state_name(&self) -> &'static str {
        self.clock.state().name()
    }
}
