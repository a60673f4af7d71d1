//! Eclipse layers: the player's spendable risk stack.
//!
//! Enemies add layers, parry rewards remove them and Release clears them. While the
//! stack is non-empty it burns the holder every DOT interval and, in exchange,
//! regenerates a little health every regen interval.
//!
//! The historical total (`EclipseLayersAccumulated`) is a UI statistic with its own
//! lifecycle; it is never decremented here.

use bevy::prelude::*;
use bevy::time::Fixed;

use crate::common::{schedule::CombatSet, tunables::{EclipseTunables, Tunables}};
use crate::plugins::health::{DamageRequest, DamageSource, Damageable, HealRequest, HealSource, Health};
use crate::plugins::ui::messages::EclipseLayersAccumulated;

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct EclipseStack {
    current: u32,
    max: u32,
}

impl EclipseStack {
    pub fn new(max: u32) -> Self {
        Self { current: 0, max }
    }

    #[inline]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// Clamped at `max`. Returns how many layers were actually added.
    pub fn add_layers(&mut self, n: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_add(n).min(self.max);
        self.current - before
    }

    /// Clamped at 0. Returns how many layers were actually removed.
    pub fn remove_layers(&mut self, n: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_sub(n);
        before - self.current
    }

    /// Empties the stack, returning what it held.
    pub fn clear(&mut self) -> u32 {
        std::mem::take(&mut self.current)
    }
}

/// DOT and regen clocks. Both accumulate continuously and fire on the first tick
/// where they are due and the stack is non-empty.
#[derive(Component, Debug, Clone)]
pub struct EclipseTicks {
    pub dot: Timer,
    pub regen: Timer,
}

impl EclipseTicks {
    pub fn from_tunables(t: &EclipseTunables) -> Self {
        Self {
            dot: Timer::from_seconds(t.dot_interval_secs, TimerMode::Once),
            regen: Timer::from_seconds(t.regen_interval_secs, TimerMode::Once),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerChange {
    Add(u32),
    Remove(u32),
    Clear,
}

#[derive(Message, Clone, Copy, Debug)]
pub struct EclipseChange {
    pub target: Entity,
    pub change: LayerChange,
}

impl EclipseChange {
    pub fn add(target: Entity, n: u32) -> Self {
        Self { target, change: LayerChange::Add(n) }
    }

    pub fn remove(target: Entity, n: u32) -> Self {
        Self { target, change: LayerChange::Remove(n) }
    }
}

/// Damage of one DOT tick.
#[inline]
pub fn dot_damage(max_health: f32, percent_per_layer: f32, layers: u32) -> f32 {
    max_health * (percent_per_layer / 100.0) * layers as f32
}

pub fn plugin(app: &mut App) {
    app.add_message::<EclipseChange>()
        .add_message::<EclipseLayersAccumulated>()
        .add_message::<DamageRequest>()
        .add_message::<HealRequest>()
        .add_systems(
            FixedUpdate,
            (apply_layer_changes, tick_eclipse).chain().in_set(CombatSet::Resolve),
        );
}

pub fn apply_layer_changes(
    mut changes: MessageReader<EclipseChange>,
    mut accumulated: MessageWriter<EclipseLayersAccumulated>,
    mut q: Query<(&mut EclipseStack, Option<&Health>)>,
) {
    for c in changes.read() {
        let Ok((mut stack, health)) = q.get_mut(c.target) else {
            continue;
        };
        if health.is_some_and(|h| !h.is_alive()) {
            continue;
        }
        match c.change {
            LayerChange::Add(n) => {
                stack.add_layers(n);
                // The statistic counts what was inflicted, not what fit.
                accumulated.write(EclipseLayersAccumulated(n));
            }
            LayerChange::Remove(n) => {
                stack.remove_layers(n);
            }
            LayerChange::Clear => {
                stack.clear();
            }
        }
    }
}

pub fn tick_eclipse(
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    mut damage: MessageWriter<DamageRequest>,
    mut heal: MessageWriter<HealRequest>,
    mut q: Query<(Entity, &EclipseStack, &mut EclipseTicks, &Health)>,
) {
    let dt = time.delta();
    let cfg = &tunables.eclipse;

    for (e, stack, mut ticks, health) in &mut q {
        if !health.is_alive() {
            continue;
        }
        ticks.dot.tick(dt);
        ticks.regen.tick(dt);

        if stack.is_empty() {
            continue;
        }

        if ticks.dot.is_finished() {
            ticks.dot.reset();
            damage.write(DamageRequest {
                target: e,
                amount: dot_damage(health.max(), cfg.dot_percent_per_layer, stack.current()),
                source: DamageSource::EclipseDot,
            });
        }
        if ticks.regen.is_finished() {
            ticks.regen.reset();
            heal.write(HealRequest {
                target: e,
                amount: health.max() * cfg.regen_percent / 100.0,
                source: HealSource::Regeneration,
            });
        }
    }
}
