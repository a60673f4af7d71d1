//! Parry: a short player-opened window that reflects nearby enemy bullets.
//!
//! ```text
//! Intent      ParryRequest -> open window (if cooled down)
//!             window tick; a window that closes empty may trigger a release
//! Projectiles reflect every active, unparried bullet within range
//! Resolve     ParriedBulletHit -> heal by layers, then remove layers
//! ```
//!
//! Reflected bullets aim from the player at the nearest live enemy, or straight back
//! along their incoming vector when no enemy is alive.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::time::Fixed;

use crate::common::{schedule::CombatSet, tunables::{ParryTunables, Tunables}};
use crate::plugins::eclipse::{apply_layer_changes, EclipseChange, EclipseStack};
use crate::plugins::enemies::Enemy;
use crate::plugins::health::{Damageable, HealRequest, HealSource, Health};
use crate::plugins::player::Player;
use crate::plugins::projectiles::components::{bullet_tint, BulletState, PooledBullet, Projectile};
use crate::plugins::projectiles::messages::ParriedBulletHit;
use crate::plugins::projectiles::pool::reflected_layers;
use crate::plugins::projectiles::ProjectileSet;
use crate::plugins::release::{perform_release, ReleaseRequest};
use crate::plugins::visuals::{SpawnVisual, VisualKind};

#[derive(Message, Clone, Copy, Debug)]
pub struct ParryRequest {
    pub player: Entity,
}

/// A bullet was reflected.
#[derive(Message, Clone, Copy, Debug)]
pub struct BulletParried {
    pub position: Vec2,
}

/// Window and cooldown of the parry. The cooldown starts when the window opens.
#[derive(Component, Debug, Clone)]
pub struct ParryState {
    window: Timer,
    cooldown: Timer,
    open: bool,
    reflected: u32,
}

/// The window just closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowClosed {
    pub reflected: u32,
}

impl ParryState {
    pub fn from_tunables(cfg: &ParryTunables) -> Self {
        let mut cooldown = Timer::from_seconds(cfg.cooldown_secs, TimerMode::Once);
        cooldown.finish();
        Self {
            window: Timer::from_seconds(cfg.window_secs, TimerMode::Once),
            cooldown,
            open: false,
            reflected: 0,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        !self.open && self.cooldown.is_finished()
    }

    /// Returns false while the window is open or the cooldown runs.
    pub fn try_open(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.open = true;
        self.reflected = 0;
        self.window.reset();
        self.cooldown.reset();
        true
    }

    pub fn note_reflect(&mut self) {
        self.reflected += 1;
    }

    pub fn tick(&mut self, dt: std::time::Duration) -> Option<WindowClosed> {
        self.cooldown.tick(dt);
        if !self.open {
            return None;
        }
        self.window.tick(dt);
        if !self.window.is_finished() {
            return None;
        }
        self.open = false;
        Some(WindowClosed { reflected: std::mem::take(&mut self.reflected) })
    }
}

/// Direction a bullet leaves the parry in.
pub fn reflect_direction(player: Vec2, nearest_enemy: Option<Vec2>, incoming: Vec2) -> Vec2 {
    nearest_enemy
        .map(|enemy| enemy - player)
        .filter(|d| d.length_squared() > 1e-6)
        .map(Vec2::normalize)
        .unwrap_or(-incoming)
}

/// Heal granted by one successful reflected hit.
#[inline]
pub fn parry_heal(max_health: f32, layers: u32, cfg: &ParryTunables) -> f32 {
    max_health * (cfg.heal_percent_per_layer / 100.0) * layers as f32
}

pub fn plugin(app: &mut App) {
    app.add_message::<ParryRequest>()
        .add_message::<BulletParried>()
        .add_message::<ReleaseRequest>()
        .add_message::<HealRequest>()
        .add_message::<EclipseChange>()
        .add_message::<SpawnVisual>()
        .add_systems(
            FixedUpdate,
            (tick_parry_window, open_parry_window).chain().in_set(CombatSet::Intent),
        )
        .add_systems(
            FixedUpdate,
            reflect_bullets_in_window.in_set(ProjectileSet::Intercept),
        )
        .add_systems(
            FixedUpdate,
            reward_parried_hits
                .in_set(CombatSet::Resolve)
                .before(perform_release)
                .before(apply_layer_changes),
        );
}

pub fn tick_parry_window(
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    mut releases: MessageWriter<ReleaseRequest>,
    mut q: Query<(Entity, &mut ParryState, &EclipseStack, &Health), With<Player>>,
) {
    for (e, mut parry, stack, health) in &mut q {
        let Some(closed) = parry.tick(time.delta()) else {
            continue;
        };
        if closed.reflected == 0
            && tunables.parry.release_on_whiff
            && !stack.is_empty()
            && health.is_alive()
        {
            debug!("Parry whiffed with {} layers; releasing", stack.current());
            releases.write(ReleaseRequest { player: e });
        }
    }
}

pub fn open_parry_window(
    mut requests: MessageReader<ParryRequest>,
    mut visuals: MessageWriter<SpawnVisual>,
    mut q: Query<(&mut ParryState, &Transform, &Health), With<Player>>,
) {
    for req in requests.read() {
        let Ok((mut parry, tf, health)) = q.get_mut(req.player) else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }
        if parry.try_open() {
            visuals.write(SpawnVisual::at(VisualKind::ParrySpark, tf.translation.truncate()));
        }
    }
}

pub fn reflect_bullets_in_window(
    tunables: Res<Tunables>,
    mut parried: MessageWriter<BulletParried>,
    mut q_player: Query<(&mut ParryState, &Transform, &EclipseStack), With<Player>>,
    q_enemies: Query<(&Transform, &Health), (With<Enemy>, Without<Player>)>,
    mut q_bullets: Query<
        (
            &mut Projectile,
            &BulletState,
            &Transform,
            &mut LinearVelocity,
            &mut CollisionLayers,
            &mut Sprite,
        ),
        (With<PooledBullet>, Without<Player>, Without<Enemy>),
    >,
) {
    let Ok((mut parry, player_tf, stack)) = q_player.single_mut() else {
        return;
    };
    if !parry.is_open() {
        return;
    }

    let cfg = &tunables.projectile;
    let player_pos = player_tf.translation.truncate();
    let range_sq = tunables.parry.range * tunables.parry.range;

    let nearest_enemy = q_enemies
        .iter()
        .filter(|(_, h)| h.is_alive())
        .map(|(tf, _)| tf.translation.truncate())
        .min_by(|a, b| {
            a.distance_squared(player_pos)
                .total_cmp(&b.distance_squared(player_pos))
        });

    for (mut projectile, state, tf, mut vel, mut layers, mut sprite) in &mut q_bullets {
        if *state != BulletState::Active || projectile.parried {
            continue;
        }
        let pos = tf.translation.truncate();
        if pos.distance_squared(player_pos) > range_sq {
            continue;
        }

        let dir = reflect_direction(player_pos, nearest_enemy, projectile.direction);
        if let Err(e) = projectile.reflect(dir, stack.current(), cfg) {
            debug!("Reflect rejected: {e}");
            continue;
        }

        vel.0 = projectile.velocity();
        *layers = reflected_layers();
        sprite.color = bullet_tint(projectile.speed, true, cfg);
        parry.note_reflect();
        parried.write(BulletParried { position: pos });
    }
}

pub fn reward_parried_hits(
    tunables: Res<Tunables>,
    mut hits: MessageReader<ParriedBulletHit>,
    mut heals: MessageWriter<HealRequest>,
    mut eclipse: MessageWriter<EclipseChange>,
    q_player: Query<(Entity, &Health, &EclipseStack), With<Player>>,
) {
    let Ok((player, health, stack)) = q_player.single() else {
        hits.clear();
        return;
    };
    let cfg = &tunables.parry;

    // Layer removals land later this tick; track what each reward would see.
    let mut layers = stack.current();
    for _ in hits.read() {
        if !health.is_alive() {
            break;
        }
        let heal = parry_heal(health.max(), layers, cfg);
        if heal > 0.0 {
            heals.write(HealRequest { target: player, amount: heal, source: HealSource::ParryReward });
        }
        eclipse.write(EclipseChange::remove(player, cfg.layers_cleared));
        layers = layers.saturating_sub(cfg.layers_cleared);
    }
}
