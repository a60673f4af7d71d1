//! Tunable gameplay constants.
//!
//! Every number the simulation uses lives here with its default. A RON file at
//! [`TUNABLES_PATH`] may override any subset of fields; missing fields keep their
//! defaults through `#[serde(default)]`.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use super::error::ConfigError;

pub const TUNABLES_PATH: &str = "assets/config/tunables.ron";

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Render zoom only. Simulation distances are in world units.
    pub pixels_per_meter: f32,
    pub rng_seed: u64,
    pub actor: ActorTunables,
    pub player: PlayerTunables,
    pub eclipse: EclipseTunables,
    pub projectile: ProjectileTunables,
    pub parry: ParryTunables,
    pub release: ReleaseTunables,
    pub enemies: EnemyTunables,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 40.0,
            rng_seed: 0x5EED_EC11,
            actor: ActorTunables::default(),
            player: PlayerTunables::default(),
            eclipse: EclipseTunables::default(),
            projectile: ProjectileTunables::default(),
            parry: ParryTunables::default(),
            release: ReleaseTunables::default(),
            enemies: EnemyTunables::default(),
        }
    }
}

impl Tunables {
    pub fn from_ron_str(src: &str) -> Result<Self, ConfigError> {
        ron::from_str(src).map_err(|e| ConfigError::Parse {
            path: "<inline>".into(),
            details: e.to_string(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let src = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        ron::from_str(&src).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            details: e.to_string(),
        })
    }

    /// Defaults when the file is absent, defaults plus a warning when it is broken.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(t) => {
                info!("Loaded tunables from {}", path.display());
                t
            }
            Err(ConfigError::NotFound(_)) => Self::default(),
            Err(e) => {
                warn!("{e}; falling back to default tunables");
                Self::default()
            }
        }
    }
}

/// Shared by every actor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActorTunables {
    /// Time between death and removal, long enough for the exit animation.
    pub death_grace_secs: f32,
    pub hit_flash_secs: f32,
}

impl Default for ActorTunables {
    fn default() -> Self {
        Self { death_grace_secs: 1.5, hit_flash_secs: 0.1 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerTunables {
    pub max_health: f32,
    pub move_speed: f32,
    pub radius: f32,
    pub heavy_hit_threshold: f32,
    pub hit_shake_secs: f32,
    pub hit_shake_magnitude: f32,
    pub heavy_shake_secs: f32,
    pub heavy_shake_magnitude: f32,
}

impl Default for PlayerTunables {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            move_speed: 5.0,
            radius: 0.4,
            heavy_hit_threshold: 10.0,
            hit_shake_secs: 0.15,
            hit_shake_magnitude: 0.1,
            heavy_shake_secs: 0.25,
            heavy_shake_magnitude: 0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EclipseTunables {
    pub max_layer: u32,
    pub dot_interval_secs: f32,
    /// Percent of max health per layer per tick.
    pub dot_percent_per_layer: f32,
    pub regen_interval_secs: f32,
    /// Percent of max health healed per regen tick while layered.
    pub regen_percent: f32,
}

impl Default for EclipseTunables {
    fn default() -> Self {
        Self {
            max_layer: 30,
            dot_interval_secs: 1.0,
            dot_percent_per_layer: 0.5,
            regen_interval_secs: 1.0,
            regen_percent: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectileTunables {
    pub pool_capacity: usize,
    pub default_speed: f32,
    pub default_damage: f32,
    pub lifetime_secs: f32,
    pub radius: f32,
    pub reflect_speed_multiplier: f32,
    pub reflect_lifetime_multiplier: f32,
    /// Reflected damage gains this fraction per layer held at parry time.
    pub reflect_damage_per_layer: f32,
    /// Eclipse layers an unparried hit adds to the player.
    pub layers_on_hit: u32,
    /// Below this speed a bullet reads as "slow", above `default_speed` as "fast".
    pub slow_speed_below: f32,
}

impl Default for ProjectileTunables {
    fn default() -> Self {
        Self {
            pool_capacity: 128,
            default_speed: 10.0,
            default_damage: 10.0,
            lifetime_secs: 3.0,
            radius: 0.15,
            reflect_speed_multiplier: 1.5,
            reflect_lifetime_multiplier: 2.0,
            reflect_damage_per_layer: 0.1,
            layers_on_hit: 1,
            slow_speed_below: 6.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParryTunables {
    pub window_secs: f32,
    pub cooldown_secs: f32,
    pub range: f32,
    pub heal_percent_per_layer: f32,
    pub layers_cleared: u32,
    /// A window that closes without a reflect spends the stack. Off by default.
    pub release_on_whiff: bool,
}

impl Default for ParryTunables {
    fn default() -> Self {
        Self {
            window_secs: 0.2,
            cooldown_secs: 0.3,
            range: 2.0,
            heal_percent_per_layer: 1.0,
            layers_cleared: 3,
            release_on_whiff: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReleaseTunables {
    pub radius: f32,
    pub base_damage: f32,
    pub damage_per_layer: f32,
    pub low_tier_damage_per_layer: f32,
    /// Layers below this use the low tier.
    pub additive_tier_from: u32,
    /// Layers above this get the scaling multiplier.
    pub multiplier_tier_above: u32,
    pub multiplier_per_layer: f32,
    pub heal_percent_per_layer: f32,
    pub heal_bonus_from: u32,
    pub heal_bonus_multiplier: f32,
    pub edge_flash_from: u32,
    pub time_slow_from: u32,
    /// Stack size at which feedback intensity saturates.
    pub full_intensity_layers: u32,
}

impl Default for ReleaseTunables {
    fn default() -> Self {
        Self {
            radius: 3.0,
            base_damage: 50.0,
            damage_per_layer: 10.0,
            low_tier_damage_per_layer: 3.0,
            additive_tier_from: 6,
            multiplier_tier_above: 10,
            multiplier_per_layer: 0.05,
            heal_percent_per_layer: 3.0,
            heal_bonus_from: 20,
            heal_bonus_multiplier: 2.0,
            edge_flash_from: 10,
            time_slow_from: 15,
            full_intensity_layers: 30,
        }
    }
}

/// Numbers every enemy archetype has.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EnemyStats {
    pub max_health: f32,
    pub radius: f32,
    pub collision_damage: f32,
    pub layer_add_amount: u32,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self { max_health: 100.0, radius: 0.45, collision_damage: 10.0, layer_add_amount: 3 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnemyTunables {
    pub shadow: ShadowTunables,
    pub charger: ChargerTunables,
    pub sentinel: SentinelTunables,
    pub mole: MoleTunables,
    pub rush: RushTunables,
    pub charge_master: ChargeMasterTunables,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShadowTunables {
    pub stats: EnemyStats,
    pub idle_secs: f32,
    pub patrol_speed: f32,
    pub patrol_radius: f32,
    pub patrol_arrive_distance: f32,
    pub patrol_retarget_secs: f32,
    pub detection_range: f32,
    pub windup_secs: f32,
    pub dash_speed: f32,
    pub dash_secs: f32,
    pub cooldown_secs: f32,
    pub knockback_speed: f32,
    pub knockback_secs: f32,
    pub stun_secs: f32,
    pub contact_cooldown_secs: f32,
    pub graze_damage: f32,
    pub graze_layers: u32,
}

impl Default for ShadowTunables {
    fn default() -> Self {
        Self {
            stats: EnemyStats { max_health: 30.0, radius: 0.4, ..EnemyStats::default() },
            idle_secs: 1.0,
            patrol_speed: 2.0,
            patrol_radius: 5.0,
            patrol_arrive_distance: 0.5,
            patrol_retarget_secs: 3.0,
            detection_range: 8.0,
            windup_secs: 1.0,
            dash_speed: 8.0,
            dash_secs: 0.5,
            cooldown_secs: 2.0,
            knockback_speed: 5.0,
            knockback_secs: 0.2,
            stun_secs: 0.1,
            contact_cooldown_secs: 0.25,
            graze_damage: 2.0,
            graze_layers: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChargerTunables {
    pub stats: EnemyStats,
    pub move_speed: f32,
    pub patrol_range: f32,
    pub detection_range: f32,
    pub windup_secs: f32,
    pub charge_speed: f32,
    pub charge_acceleration: f32,
    /// A charge that has not connected by then counts as a miss.
    pub charge_timeout_secs: f32,
    pub destroy_on_miss: bool,
    pub cooldown_secs: f32,
    pub exposed_speed: f32,
    pub exposed_secs: f32,
    pub exposed_damage_multiplier: f32,
    pub rebound_speed: f32,
    pub rebound_secs: f32,
    pub rebound_spread_degrees: f32,
    pub stun_secs: f32,
    pub contact_cooldown_secs: f32,
}

impl Default for ChargerTunables {
    fn default() -> Self {
        Self {
            stats: EnemyStats { max_health: 40.0, ..EnemyStats::default() },
            move_speed: 2.0,
            patrol_range: 5.0,
            detection_range: 8.0,
            windup_secs: 1.0,
            charge_speed: 15.0,
            charge_acceleration: 20.0,
            charge_timeout_secs: 3.0,
            destroy_on_miss: true,
            cooldown_secs: 1.5,
            exposed_speed: 20.0,
            exposed_secs: 3.0,
            exposed_damage_multiplier: 10.0,
            rebound_speed: 12.0,
            rebound_secs: 0.5,
            rebound_spread_degrees: 30.0,
            stun_secs: 0.3,
            contact_cooldown_secs: 0.8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SentinelTunables {
    pub stats: EnemyStats,
    pub pulse_interval_secs: f32,
    pub pulse_layers: u32,
    pub name: String,
}

impl Default for SentinelTunables {
    fn default() -> Self {
        Self {
            stats: EnemyStats { max_health: 100.0, radius: 0.6, ..EnemyStats::default() },
            pulse_interval_secs: 2.0,
            pulse_layers: 1,
            name: "Sentinel".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MoleTunables {
    pub stats: EnemyStats,
    pub hidden_secs: f32,
    pub warning_secs: f32,
    pub emerged_secs: f32,
    pub early_hide_chance: f32,
    pub spawn_interval_secs: f32,
    pub spawn_threshold: usize,
    /// Offsets from the boss, `[x, y]`. Empty means a random ring.
    pub spawn_offsets: Vec<[f32; 2]>,
    pub ring_min_radius: f32,
    pub ring_max_radius: f32,
    pub contact_interval_secs: f32,
    pub name: String,
}

impl Default for MoleTunables {
    fn default() -> Self {
        Self {
            stats: EnemyStats { max_health: 300.0, radius: 0.8, ..EnemyStats::default() },
            hidden_secs: 4.0,
            warning_secs: 1.0,
            emerged_secs: 3.0,
            early_hide_chance: 0.3,
            spawn_interval_secs: 1.0,
            spawn_threshold: 3,
            spawn_offsets: Vec::new(),
            ring_min_radius: 2.0,
            ring_max_radius: 5.0,
            contact_interval_secs: 0.5,
            name: "Mole King".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RushTunables {
    pub stats: EnemyStats,
    pub idle_secs: f32,
    pub windup_secs: f32,
    pub dash_secs: f32,
    pub dash_speed: f32,
    pub aim_error_degrees: f32,
    pub indicator_smoothing: f32,
    pub minion_count: usize,
    pub summon_radius: f32,
    /// Offsets from the boss, `[x, y]`, cycled. Empty means an even ring.
    pub spawn_points: Vec<[f32; 2]>,
    pub respawn_delay_secs: f32,
    pub contact_interval_secs: f32,
    pub name: String,
}

impl Default for RushTunables {
    fn default() -> Self {
        Self {
            stats: EnemyStats { max_health: 400.0, radius: 0.9, ..EnemyStats::default() },
            idle_secs: 3.0,
            windup_secs: 2.0,
            dash_secs: 1.0,
            dash_speed: 20.0,
            aim_error_degrees: 15.0,
            indicator_smoothing: 5.0,
            minion_count: 3,
            summon_radius: 3.0,
            spawn_points: Vec::new(),
            respawn_delay_secs: 2.0,
            contact_interval_secs: 0.5,
            name: "Rush Titan".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChargeMasterTunables {
    pub stats: EnemyStats,
    pub patrol_speed: f32,
    /// Width and height of the wander box around the spawn point.
    pub patrol_box: [f32; 2],
    pub patrol_retarget_secs: f32,
    pub engage_range: f32,
    pub charge_windup_secs: f32,
    pub charge_speed: f32,
    pub charge_secs: f32,
    pub charge_cooldown_secs: f32,
    pub charge_damage: f32,
    pub charge_layers: u32,
    pub shoot_windup_secs: f32,
    pub shoot_cooldown_secs: f32,
    pub bullets_per_burst: u32,
    pub burst_interval_secs: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    pub fast_bullet_speed: f32,
    pub slow_bullet_speed: f32,
    pub fast_slow_chance: f32,
    pub fast_slow_delay_secs: f32,
    pub vulnerability_secs: f32,
    pub shoot_stagger_secs: f32,
    pub charge_stagger_secs: f32,
    pub reflect_stagger_secs: f32,
    pub reflect_damage_multiplier: f32,
    /// Extra fraction of returned-bullet damage per parry strength.
    pub reflect_damage_per_strength: f32,
    pub cooldown_secs: f32,
    pub contact_interval_secs: f32,
    pub name: String,
}

impl Default for ChargeMasterTunables {
    fn default() -> Self {
        Self {
            stats: EnemyStats { max_health: 500.0, radius: 0.8, ..EnemyStats::default() },
            patrol_speed: 3.0,
            patrol_box: [10.0, 5.0],
            patrol_retarget_secs: 2.0,
            engage_range: 15.0,
            charge_windup_secs: 1.5,
            charge_speed: 8.0,
            charge_secs: 1.5,
            charge_cooldown_secs: 3.0,
            charge_damage: 20.0,
            charge_layers: 3,
            shoot_windup_secs: 0.5,
            shoot_cooldown_secs: 2.0,
            bullets_per_burst: 2,
            burst_interval_secs: 0.3,
            bullet_speed: 7.0,
            bullet_damage: 15.0,
            fast_bullet_speed: 10.0,
            slow_bullet_speed: 4.0,
            fast_slow_chance: 0.3,
            fast_slow_delay_secs: 0.5,
            vulnerability_secs: 0.3,
            shoot_stagger_secs: 0.5,
            charge_stagger_secs: 1.0,
            reflect_stagger_secs: 2.0,
            reflect_damage_multiplier: 2.0,
            reflect_damage_per_strength: 0.1,
            cooldown_secs: 0.5,
            contact_interval_secs: 0.5,
            name: "Charge Master".into(),
        }
    }
}
