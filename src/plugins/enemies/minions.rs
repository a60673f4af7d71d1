//! Boss-owned minion populations.
//!
//! ```text
//! poll   (0.5 s)  dead minions leave the list; optionally schedule RespawnMinions
//! sweep  (2 s)    handles to entities that no longer exist leave the list
//! spawn           only while the brain marks the boss spawn-eligible:
//!                   HardCap(n)       fills the whole deficit when a check is requested
//!                   SoftThreshold(n) one minion per interval while below n
//! boss death      every minion is despawned and the list cleared
//! ```

use bevy::prelude::*;
use bevy::time::Fixed;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::common::{
    rng::GameRng,
    timers::{DeferredAction, TimedTasks},
    tunables::Tunables,
};
use crate::plugins::health::lifecycle::{PendingDespawn, RespawnMinionsDue};
use crate::plugins::health::{Damageable, Died, Health};
use crate::plugins::visuals::{SpawnVisual, VisualKind};
use crate::plugins::world;

use super::brain::EnemyControl;
use super::spawn::spawn_minion;
use super::Enemy;

const POLL_SECS: f32 = 0.5;
const SWEEP_SECS: f32 = 2.0;
/// Distance kept between a summoned minion and the walls.
pub const WALL_MARGIN: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapPolicy {
    /// Top up to `n` in one go, on request.
    HardCap(usize),
    /// Add one per interval while fewer than `n` are alive.
    SoftThreshold(usize),
}

impl CapPolicy {
    pub fn cap(self) -> usize {
        match self {
            CapPolicy::HardCap(n) | CapPolicy::SoftThreshold(n) => n,
        }
    }
}

/// How many minions to spawn right now.
pub fn spawn_quota(policy: CapPolicy, valid: usize, interval_ready: bool, requested: bool) -> usize {
    match policy {
        CapPolicy::HardCap(n) if requested => n.saturating_sub(valid),
        CapPolicy::HardCap(_) => 0,
        CapPolicy::SoftThreshold(n) => usize::from(interval_ready && valid < n),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MinionPlacement {
    /// A random entry of `offsets`, else a random point on a ring.
    RandomOffset { offsets: Vec<Vec2>, min_radius: f32, max_radius: f32 },
    /// `offsets` cycled by slot, else an even ring of `count` slots.
    CycledOffset { offsets: Vec<Vec2>, radius: f32, count: usize },
}

impl MinionPlacement {
    pub fn offset(&self, slot: usize, rng: &mut ChaCha8Rng) -> Vec2 {
        match self {
            MinionPlacement::RandomOffset { offsets, min_radius, max_radius } => {
                if !offsets.is_empty() {
                    return offsets[rng.gen_range(0..offsets.len())];
                }
                let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                let lo = min_radius.min(*max_radius);
                let hi = max_radius.max(*min_radius);
                let r = if hi > lo { rng.gen_range(lo..hi) } else { lo };
                Vec2::from_angle(angle) * r
            }
            MinionPlacement::CycledOffset { offsets, radius, count } => {
                if !offsets.is_empty() {
                    return offsets[slot % offsets.len()];
                }
                let count = (*count).max(1);
                let angle = (slot % count) as f32 * std::f32::consts::TAU / count as f32;
                Vec2::from_angle(angle) * *radius
            }
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct MinionSpawner {
    policy: CapPolicy,
    placement: MinionPlacement,
    minions: Vec<Entity>,
    interval: Timer,
    poll: Timer,
    sweep: Timer,
    respawn_delay: Option<f32>,
    check_requested: bool,
}

impl MinionSpawner {
    pub fn new(policy: CapPolicy, placement: MinionPlacement) -> Self {
        Self {
            policy,
            placement,
            minions: Vec::new(),
            interval: Timer::from_seconds(1.0, TimerMode::Once),
            poll: Timer::from_seconds(POLL_SECS, TimerMode::Repeating),
            sweep: Timer::from_seconds(SWEEP_SECS, TimerMode::Repeating),
            respawn_delay: None,
            // A hard-capped boss fills its ranks the first time it is eligible.
            check_requested: matches!(policy, CapPolicy::HardCap(_)),
        }
    }

    pub fn with_interval(mut self, secs: f32) -> Self {
        self.interval = Timer::from_seconds(secs, TimerMode::Once);
        self
    }

    pub fn with_respawn_delay(mut self, secs: f32) -> Self {
        self.respawn_delay = Some(secs);
        self
    }

    pub fn policy(&self) -> CapPolicy {
        self.policy
    }

    pub fn minions(&self) -> &[Entity] {
        &self.minions
    }

    pub fn request_check(&mut self) {
        self.check_requested = true;
    }

    pub fn check_requested(&self) -> bool {
        self.check_requested
    }

    /// Drops handles whose minion is dead. Returns how many were dropped.
    fn drop_dead(&mut self, q_health: &Query<&Health, With<Enemy>>) -> usize {
        let before = self.minions.len();
        self.minions
            .retain(|e| q_health.get(*e).map_or(true, |h| h.is_alive()));
        before - self.minions.len()
    }

    fn drop_missing(&mut self, q_health: &Query<&Health, With<Enemy>>) {
        self.minions.retain(|e| q_health.contains(*e));
    }

    fn count_valid(&self, q_health: &Query<&Health, With<Enemy>>) -> usize {
        self.minions
            .iter()
            .filter(|e| q_health.get(**e).is_ok_and(|h| h.is_alive()))
            .count()
    }
}

/// Marker on a spawned minion.
#[derive(Component, Debug, Clone, Copy)]
pub struct Minion {
    pub owner: Entity,
}

pub fn request_respawn_checks(
    mut due: MessageReader<RespawnMinionsDue>,
    mut q: Query<&mut MinionSpawner>,
) {
    for msg in due.read() {
        if let Ok(mut spawner) = q.get_mut(msg.owner) {
            spawner.request_check();
        }
    }
}

pub fn tick_minion_spawners(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut visuals: MessageWriter<SpawnVisual>,
    mut q_bosses: Query<(
        Entity,
        &Transform,
        &mut MinionSpawner,
        &EnemyControl,
        &Health,
        Option<&mut TimedTasks>,
    )>,
    q_health: Query<&Health, With<Enemy>>,
) {
    let dt = time.delta();

    for (boss, tf, mut spawner, control, health, tasks) in &mut q_bosses {
        if !health.is_alive() {
            continue;
        }

        if spawner.poll.tick(dt).just_finished() {
            let dropped = spawner.drop_dead(&q_health);
            if dropped > 0 {
                if let (Some(delay), Some(mut tasks)) = (spawner.respawn_delay, tasks) {
                    tasks.schedule(delay, DeferredAction::RespawnMinions);
                }
            }
        }
        if spawner.sweep.tick(dt).just_finished() {
            spawner.drop_missing(&q_health);
        }
        spawner.interval.tick(dt);

        let requested = std::mem::take(&mut spawner.check_requested);
        if !control.spawn_eligible {
            continue;
        }

        let valid = spawner.count_valid(&q_health);
        let interval_ready = spawner.interval.is_finished();
        let quota = spawn_quota(spawner.policy, valid, interval_ready, requested);
        if quota == 0 {
            if requested {
                debug!("Minion spawn refused for {boss}: {valid}/{} alive", spawner.policy.cap());
            }
            continue;
        }

        let center = tf.translation.truncate();
        for slot in 0..quota {
            let pos = world::clamp_inside(
                center + spawner.placement.offset(slot, &mut rng.rng),
                WALL_MARGIN,
            );
            let minion = spawn_minion(&mut commands, pos, boss, &tunables);
            spawner.minions.push(minion);
            visuals.write(SpawnVisual::at(VisualKind::Summon, pos));
        }
        if matches!(spawner.policy, CapPolicy::SoftThreshold(_)) {
            spawner.interval.reset();
        }
        info!("{boss} summoned {quota} minions");
    }
}

/// A dead boss takes its minions with it.
pub fn clear_minions_on_boss_death(
    mut commands: Commands,
    mut died: MessageReader<Died>,
    mut q: Query<&mut MinionSpawner>,
) {
    for d in died.read() {
        let Ok(mut spawner) = q.get_mut(d.entity) else {
            continue;
        };
        for minion in spawner.minions.drain(..) {
            commands.entity(minion).try_insert(PendingDespawn);
        }
    }
}
