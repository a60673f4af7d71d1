//! Release: spend the whole eclipse stack in one burst.
//!
//! Damage grows in tiers with the stack so that holding many layers pays off:
//!
//! | layers      | damage                                   |
//! |-------------|------------------------------------------|
//! | `< 6`       | `3 * L`                                  |
//! | `6`         | `base + per * L`                         |
//! | `7..=10`    | `2 * base + per * L`                     |
//! | `> 10`      | `(base + per * L) * (1 + (L - 10) * k)`  |
//!
//! Every live enemy inside the radius takes the same amount. The player heals, the
//! stack drops to zero even when nothing was hit, and the screen effects scale with
//! the layers spent.

use bevy::prelude::*;

use crate::common::{schedule::CombatSet, tunables::{ReleaseTunables, Tunables}};
use crate::plugins::eclipse::{apply_layer_changes, EclipseStack};
use crate::plugins::enemies::Enemy;
use crate::plugins::health::{DamageRequest, DamageSource, Damageable, HealRequest, HealSource, Health};
use crate::plugins::player::Player;
use crate::plugins::screen_fx::{EdgeFlash, FlashScreen, ShakeCamera, TimeSlow};
use crate::plugins::visuals::{SpawnVisual, VisualKind};

#[derive(Message, Clone, Copy, Debug)]
pub struct ReleaseRequest {
    pub player: Entity,
}

/// A release went off.
#[derive(Message, Clone, Copy, Debug)]
pub struct Released {
    pub layers: u32,
    pub enemies_hit: u32,
}

const FLASH_RGB: (f32, f32, f32) = (0.8, 0.3, 1.0);
const EDGE_COLOR: Color = Color::srgba(1.0, 0.6, 0.2, 0.8);

pub fn release_damage(layers: u32, cfg: &ReleaseTunables) -> f32 {
    let l = layers as f32;
    if layers < cfg.additive_tier_from {
        cfg.low_tier_damage_per_layer * l
    } else if layers == cfg.additive_tier_from {
        cfg.base_damage + cfg.damage_per_layer * l
    } else if layers <= cfg.multiplier_tier_above {
        2.0 * cfg.base_damage + cfg.damage_per_layer * l
    } else {
        let over = (layers - cfg.multiplier_tier_above) as f32;
        (cfg.base_damage + cfg.damage_per_layer * l) * (1.0 + over * cfg.multiplier_per_layer)
    }
}

pub fn release_heal(layers: u32, max_health: f32, cfg: &ReleaseTunables) -> f32 {
    let heal = max_health * (cfg.heal_percent_per_layer / 100.0) * layers as f32;
    if layers >= cfg.heal_bonus_from {
        heal * cfg.heal_bonus_multiplier
    } else {
        heal
    }
}

/// Screen feedback for a release of `layers`.
#[derive(Clone, Copy, Debug)]
pub struct ReleaseEffects {
    pub shake: ShakeCamera,
    pub flash: FlashScreen,
    pub edge: Option<EdgeFlash>,
    pub slow: Option<TimeSlow>,
    pub explosion_scale: f32,
}

pub fn release_effects(layers: u32, cfg: &ReleaseTunables) -> ReleaseEffects {
    let l = layers as f32;
    let i = (l / cfg.full_intensity_layers.max(1) as f32).clamp(0.0, 1.0);
    let (r, g, b) = FLASH_RGB;

    let edge = (layers >= cfg.edge_flash_from).then(|| EdgeFlash {
        color: EDGE_COLOR,
        duration: 0.3 + 0.2 * i,
    });

    let slow = (layers >= cfg.time_slow_from).then(|| {
        let span = cfg.full_intensity_layers.saturating_sub(cfg.time_slow_from).max(1) as f32;
        let t = ((l - cfg.time_slow_from as f32) / span).clamp(0.0, 1.0);
        TimeSlow { factor: 0.5 + (0.2 - 0.5) * t, duration: 0.3 + 0.2 * i }
    });

    ReleaseEffects {
        shake: ShakeCamera { duration: 0.3 * (1.0 + 0.5 * i), magnitude: 0.15 * (1.0 + i) },
        flash: FlashScreen {
            color: Color::srgba(r, g, b, 0.8 * (0.5 + 0.5 * i)),
            duration: 0.2 + 0.3 * i,
        },
        edge,
        slow,
        explosion_scale: 1.0 + 0.05 * l,
    }
}

pub fn plugin(app: &mut App) {
    app.add_message::<ReleaseRequest>()
        .add_message::<Released>()
        .add_message::<DamageRequest>()
        .add_message::<HealRequest>()
        .add_message::<ShakeCamera>()
        .add_message::<FlashScreen>()
        .add_message::<EdgeFlash>()
        .add_message::<TimeSlow>()
        .add_message::<SpawnVisual>()
        .add_systems(
            FixedUpdate,
            perform_release
                .in_set(CombatSet::Resolve)
                .before(apply_layer_changes),
        );
}

#[derive(bevy::ecs::system::SystemParam)]
pub struct ReleaseFeedback<'w> {
    shake: MessageWriter<'w, ShakeCamera>,
    flash: MessageWriter<'w, FlashScreen>,
    edge: MessageWriter<'w, EdgeFlash>,
    slow: MessageWriter<'w, TimeSlow>,
    visuals: MessageWriter<'w, SpawnVisual>,
}

impl ReleaseFeedback<'_> {
    fn play(&mut self, fx: &ReleaseEffects, at: Vec2) {
        self.shake.write(fx.shake);
        self.flash.write(fx.flash);
        if let Some(edge) = fx.edge {
            self.edge.write(edge);
        }
        if let Some(slow) = fx.slow {
            self.slow.write(slow);
        }
        self.visuals.write(SpawnVisual {
            kind: VisualKind::ReleaseExplosion,
            position: at,
            scale: fx.explosion_scale,
        });
    }
}

pub fn perform_release(
    tunables: Res<Tunables>,
    mut requests: MessageReader<ReleaseRequest>,
    mut damage: MessageWriter<DamageRequest>,
    mut heals: MessageWriter<HealRequest>,
    mut released: MessageWriter<Released>,
    mut feedback: ReleaseFeedback,
    mut q_player: Query<(&Transform, &Health, &mut EclipseStack), With<Player>>,
    q_enemies: Query<(Entity, &Transform, &Health), (With<Enemy>, Without<Player>)>,
) {
    let cfg = &tunables.release;

    for req in requests.read() {
        let Ok((tf, health, mut stack)) = q_player.get_mut(req.player) else {
            continue;
        };
        if stack.is_empty() || !health.is_alive() {
            continue;
        }

        let layers = stack.current();
        let center = tf.translation.truncate();
        let amount = release_damage(layers, cfg);
        let radius_sq = cfg.radius * cfg.radius;

        let mut enemies_hit = 0;
        for (enemy, etf, ehealth) in &q_enemies {
            if !ehealth.is_alive() || etf.translation.truncate().distance_squared(center) > radius_sq {
                continue;
            }
            damage.write(DamageRequest { target: enemy, amount, source: DamageSource::Release });
            enemies_hit += 1;
        }

        let heal = release_heal(layers, health.max(), cfg);
        heals.write(HealRequest { target: req.player, amount: heal, source: HealSource::Release });

        stack.clear();
        feedback.play(&release_effects(layers, cfg), center);
        released.write(Released { layers, enemies_hit });
        info!("Released {layers} layers: {amount:.1} damage to {enemies_hit} enemies, {heal:.1} heal");
    }
}

#[cfg(test)]
mod tests;
