//! Messages the simulation writes for the UI/stats layer.
//!
//! All of these are fire-and-forget. The simulation never reads anything back.

use bevy::prelude::*;

/// Which statistic a damage number counts toward.
///
/// Every point of damage the player takes (direct hits and eclipse DOT alike) goes
/// through `PlayerTaken`; there is no second path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageAttribution {
    PlayerTaken,
    Dealt,
    Blocked,
}

#[derive(Message, Clone, Copy, Debug)]
pub struct ShowDamageNumber {
    pub position: Vec2,
    pub amount: f32,
    pub color: Color,
    pub attribution: DamageAttribution,
}

#[derive(Message, Clone, Copy, Debug)]
pub struct ShowHealNumber {
    pub position: Vec2,
    pub amount: f32,
    pub color: Color,
}

#[derive(Message, Clone, Debug)]
pub enum BossHealthBar {
    Show {
        owner: Entity,
        name: String,
        current: f32,
        max: f32,
        color: Color,
    },
    Update {
        owner: Entity,
        current: f32,
        max: f32,
    },
    Hide {
        owner: Entity,
    },
}

/// Historical count of layers inflicted on the player. Never decremented by play.
#[derive(Message, Clone, Copy, Debug)]
pub struct EclipseLayersAccumulated(pub u32);

/// Colours used by damage and heal numbers.
pub mod palette {
    use bevy::prelude::Color;

    pub const PLAYER_HIT: Color = Color::srgb(1.0, 0.15, 0.15);
    pub const ENEMY_HIT: Color = Color::srgb(1.0, 0.8, 0.0);
    pub const RELEASE_HIT: Color = Color::srgb(1.0, 0.0, 0.0);
    pub const ECLIPSE_DOT: Color = Color::srgb(1.0, 0.0, 1.0);
    pub const BLOCKED: Color = Color::srgb(0.5, 0.5, 0.5);
    pub const HEAL: Color = Color::srgb(0.0, 1.0, 0.0);
    pub const REGEN: Color = Color::srgb(0.5, 1.0, 0.5);
}
