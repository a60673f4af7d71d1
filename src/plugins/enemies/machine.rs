//! Explicit state clocks for enemy brains.
//!
//! A brain owns one `StateClock<S>` over its own state enum. The clock only counts
//! time; transitions go through [`change_state`] so teardown, swap and entry happen in
//! that order within one tick.

use std::fmt::Debug;

use super::actions::EnemyAction;
use super::brain::BrainCtx;

/// A brain state with a stable, lowercase name (used for animation clips and logs).
pub trait NamedState: Copy + Eq + Debug {
    fn name(self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateClock<S> {
    state: S,
    elapsed: f32,
}

impl<S: NamedState> StateClock<S> {
    pub fn new(state: S) -> Self {
        Self { state, elapsed: 0.0 }
    }

    #[inline]
    pub fn state(&self) -> S {
        self.state
    }

    #[inline]
    pub fn is(&self, state: S) -> bool {
        self.state == state
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// True once at least `secs` have been spent in the current state.
    #[inline]
    pub fn at_least(&self, secs: f32) -> bool {
        self.elapsed >= secs
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
    }

    /// Swap state and restart the clock. Returns the previous state.
    fn enter(&mut self, next: S) -> S {
        self.elapsed = 0.0;
        std::mem::replace(&mut self.state, next)
    }
}

/// A brain that runs on a `StateClock`.
pub trait StateMachine {
    type State: NamedState;

    fn clock(&self) -> &StateClock<Self::State>;
    fn clock_mut(&mut self) -> &mut StateClock<Self::State>;

    fn on_exit(&mut self, _state: Self::State, _ctx: &mut BrainCtx) {}
    fn on_enter(&mut self, _state: Self::State, _ctx: &mut BrainCtx) {}
}

/// Exit teardown, telegraph cleanup, swap, then entry.
pub fn change_state<M: StateMachine>(machine: &mut M, ctx: &mut BrainCtx, next: M::State) {
    let prev = machine.clock().state();
    machine.on_exit(prev, ctx);
    ctx.act(EnemyAction::ClearTelegraphs);
    machine.clock_mut().enter(next);
    ctx.act(EnemyAction::StateChanged { from: prev.name(), to: next.name() });
    machine.on_enter(next, ctx);
}
