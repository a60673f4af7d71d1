use bevy::prelude::*;

use crate::common::error::ReflectError;
use crate::common::tunables::ProjectileTunables;

#[derive(Component, Debug, Clone, Copy)]
pub struct PooledBullet;

/// An entity known to be a pooled bullet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BulletEntity(pub Entity);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulletState {
    #[default]
    Inactive,
    Active,
    PendingReturn,
}

/// Flight data of a bullet. Reset on every allocation.
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    /// Unit vector.
    pub direction: Vec2,
    pub speed: f32,
    pub damage: f32,
    pub parried: bool,
    pub can_be_parried: bool,
    /// Eclipse layers the player held when reflecting this bullet.
    pub parry_strength: u32,
    pub lifetime: Timer,
    pub base_lifetime: f32,
    pub owner: Option<Entity>,
    /// Set on the first resolved hit; later contacts in the same tick are ignored.
    pub spent: bool,
}

impl Default for Projectile {
    fn default() -> Self {
        Self {
            direction: Vec2::X,
            speed: 0.0,
            damage: 0.0,
            parried: false,
            can_be_parried: true,
            parry_strength: 0,
            lifetime: Timer::from_seconds(0.0, TimerMode::Once),
            base_lifetime: 0.0,
            owner: None,
            spent: false,
        }
    }
}

impl Projectile {
    pub fn initialize(
        &mut self,
        direction: Vec2,
        speed: f32,
        damage: f32,
        lifetime_secs: f32,
        owner: Option<Entity>,
    ) {
        *self = Self {
            direction: direction.normalize_or(Vec2::X),
            speed,
            damage,
            lifetime: Timer::from_seconds(lifetime_secs, TimerMode::Once),
            base_lifetime: lifetime_secs,
            owner,
            ..Self::default()
        };
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }

    /// Redirect the bullet for the player. Rejected bullets are left untouched.
    pub fn reflect(
        &mut self,
        direction: Vec2,
        strength: u32,
        cfg: &ProjectileTunables,
    ) -> Result<(), ReflectError> {
        if self.parried {
            return Err(ReflectError::AlreadyParried);
        }
        if !self.can_be_parried {
            return Err(ReflectError::NotParryable);
        }

        self.parried = true;
        self.direction = direction.normalize_or(-self.direction);
        self.speed *= cfg.reflect_speed_multiplier;
        self.parry_strength = strength;
        self.lifetime = Timer::from_seconds(
            self.base_lifetime * cfg.reflect_lifetime_multiplier,
            TimerMode::Once,
        );
        Ok(())
    }

    pub fn reflected_damage(&self, cfg: &ProjectileTunables) -> f32 {
        self.damage * (1.0 + self.parry_strength as f32 * cfg.reflect_damage_per_layer)
    }
}

/// Sprite colour for a bullet: parried bullets are cyan, otherwise by speed class.
pub fn bullet_tint(speed: f32, parried: bool, cfg: &ProjectileTunables) -> Color {
    if parried {
        Color::srgb(0.3, 1.0, 1.0)
    } else if speed > cfg.default_speed {
        Color::srgb(1.0, 0.55, 0.55)
    } else if speed < cfg.slow_speed_below {
        Color::srgb(0.55, 0.7, 1.0)
    } else {
        Color::srgb(1.0, 0.85, 0.3)
    }
}
