//! Deferred effects owned by an actor.
//!
//! A deferred effect is a small record: a `Timer` (elapsed + duration) and the
//! action to run when it finishes. Tasks are advanced once per tick by the lifecycle
//! plugin and are cancelled as a batch when their owner dies.

use std::time::Duration;

use bevy::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferredAction {
    /// Remove the owner from the world.
    Despawn,
    /// Put the owner's sprite back to its base tint after a hit flash.
    RestoreTint,
    /// Ask the owner's minion spawner for a top-up.
    RespawnMinions,
}

impl DeferredAction {
    /// Actions that are still meaningful once the owner is dead.
    #[inline]
    pub fn survives_owner_death(self) -> bool {
        matches!(self, DeferredAction::Despawn)
    }
}

#[derive(Clone, Debug)]
pub struct TimedTask {
    timer: Timer,
    action: DeferredAction,
}

impl TimedTask {
    pub fn action(&self) -> DeferredAction {
        self.action
    }

    pub fn remaining_secs(&self) -> f32 {
        self.timer.remaining_secs()
    }
}

/// At most one pending task per action kind; scheduling again restarts it.
#[derive(Component, Debug, Default, Clone)]
pub struct TimedTasks {
    tasks: Vec<TimedTask>,
}

impl TimedTasks {
    pub fn schedule(&mut self, secs: f32, action: DeferredAction) {
        let timer = Timer::from_seconds(secs.max(0.0), TimerMode::Once);
        match self.tasks.iter_mut().find(|t| t.action == action) {
            Some(existing) => existing.timer = timer,
            None => self.tasks.push(TimedTask { timer, action }),
        }
    }

    pub fn cancel(&mut self, action: DeferredAction) {
        self.tasks.retain(|t| t.action != action);
    }

    /// Drops every pending task. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.tasks.len();
        self.tasks.clear();
        n
    }

    pub fn is_scheduled(&self, action: DeferredAction) -> bool {
        self.tasks.iter().any(|t| t.action == action)
    }

    pub fn get(&self, action: DeferredAction) -> Option<&TimedTask> {
        self.tasks.iter().find(|t| t.action == action)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Advance every task and drain the ones that finished, in scheduling order.
    pub fn advance(&mut self, dt: Duration) -> Vec<DeferredAction> {
        let mut done = Vec::new();
        self.tasks.retain_mut(|t| {
            t.timer.tick(dt);
            if t.timer.is_finished() {
                done.push(t.action);
                false
            } else {
                true
            }
        });
        done
    }
}
