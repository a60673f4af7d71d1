//! Health and damage.
//!
//! Every point of damage or healing in the game arrives as a `DamageRequest` /
//! `HealRequest` message and is applied here through the [`Damageable`] contract.
//! The resolver is the only writer of `Health`; everybody else reacts to its output
//! messages (`Damaged`, `DamageBlocked`, `Died`).
//!
//! ```text
//! DamageRequest ──► resolve_damage_requests ──► Damaged / DamageBlocked / Died
//!                                          └──► ShowDamageNumber (UI)
//! HealRequest   ──► resolve_heal_requests   ──► ShowHealNumber (UI)
//! ```

pub mod lifecycle;

use bevy::prelude::*;

use crate::common::schedule::CombatSet;
use crate::plugins::ui::messages::{
    palette, DamageAttribution, ShowDamageNumber, ShowHealNumber,
};

/// Hit points of an actor. Once dead, always dead.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Health {
    current: f32,
    max: f32,
    alive: bool,
    can_take_damage: bool,
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(1.0);
        Self { current: max, max, alive: true, can_take_damage: true }
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Toggle the damage gate. A dead actor stays non-damageable.
    pub fn set_can_take_damage(&mut self, value: bool) {
        if self.alive {
            self.can_take_damage = value;
        }
    }

    /// Kill without going through the damage gate. Returns false if already dead.
    pub fn kill(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.current = 0.0;
        self.alive = false;
        self.can_take_damage = false;
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DamageOutcome {
    /// Dead target or non-positive amount; nothing happened.
    Ignored,
    /// The target refused damage right now.
    Blocked,
    Applied { dealt: f32 },
    Killed { dealt: f32 },
}

/// The one damage/heal contract shared by the player and every enemy.
pub trait Damageable {
    fn take_damage(&mut self, amount: f32) -> DamageOutcome;
    /// Returns the amount actually restored.
    fn heal(&mut self, amount: f32) -> f32;
    fn is_alive(&self) -> bool;
    fn can_take_damage(&self) -> bool;
    fn health_fraction(&self) -> f32;
}

impl Damageable for Health {
    fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if !self.alive || amount <= 0.0 {
            return DamageOutcome::Ignored;
        }
        if !self.can_take_damage {
            return DamageOutcome::Blocked;
        }

        let dealt = amount.min(self.current);
        self.current = (self.current - amount).max(0.0);

        if self.current <= 0.0 {
            self.alive = false;
            self.can_take_damage = false;
            DamageOutcome::Killed { dealt }
        } else {
            DamageOutcome::Applied { dealt }
        }
    }

    fn heal(&mut self, amount: f32) -> f32 {
        if !self.alive || amount <= 0.0 {
            return 0.0;
        }
        let before = self.current;
        self.current = (self.current + amount).min(self.max);
        self.current - before
    }

    #[inline]
    fn is_alive(&self) -> bool {
        self.alive
    }

    #[inline]
    fn can_take_damage(&self) -> bool {
        self.alive && self.can_take_damage
    }

    fn health_fraction(&self) -> f32 {
        (self.current / self.max).clamp(0.0, 1.0)
    }
}

/// Which side an actor fights on. Drives number colours and stat attribution.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Faction {
    Player,
    Enemy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageSource {
    Contact,
    Projectile,
    ReflectedProjectile,
    Release,
    Detonation,
    EclipseDot,
    BossCounter,
    /// Bypasses the damage gate and kills outright.
    SelfDestruct,
}

impl DamageSource {
    pub fn number_color(self, target: Faction) -> Color {
        match (target, self) {
            (Faction::Player, DamageSource::EclipseDot) => palette::ECLIPSE_DOT,
            (Faction::Player, _) => palette::PLAYER_HIT,
            (Faction::Enemy, DamageSource::Release) => palette::RELEASE_HIT,
            (Faction::Enemy, _) => palette::ENEMY_HIT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealSource {
    ParryReward,
    Release,
    Regeneration,
}

impl HealSource {
    pub fn number_color(self) -> Color {
        match self {
            HealSource::Regeneration => palette::REGEN,
            _ => palette::HEAL,
        }
    }
}

#[derive(Message, Clone, Copy, Debug)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: f32,
    pub source: DamageSource,
}

#[derive(Message, Clone, Copy, Debug)]
pub struct HealRequest {
    pub target: Entity,
    pub amount: f32,
    pub source: HealSource,
}

#[derive(Message, Clone, Copy, Debug)]
pub struct Damaged {
    pub target: Entity,
    pub amount: f32,
    pub source: DamageSource,
    pub position: Vec2,
    pub killed: bool,
}

#[derive(Message, Clone, Copy, Debug)]
pub struct DamageBlocked {
    pub target: Entity,
    pub amount: f32,
    pub source: DamageSource,
    pub position: Vec2,
}

#[derive(Message, Clone, Copy, Debug)]
pub struct Died {
    pub entity: Entity,
    pub faction: Faction,
    pub position: Vec2,
}

pub fn plugin(app: &mut App) {
    app.add_message::<DamageRequest>()
        .add_message::<HealRequest>()
        .add_message::<Damaged>()
        .add_message::<DamageBlocked>()
        .add_message::<Died>()
        .add_message::<ShowDamageNumber>()
        .add_message::<ShowHealNumber>()
        .add_systems(
            FixedUpdate,
            (resolve_damage_requests, resolve_heal_requests)
                .chain()
                .in_set(CombatSet::Apply),
        );

    lifecycle::plugin(app);
}

pub fn resolve_damage_requests(
    mut requests: MessageReader<DamageRequest>,
    mut q: Query<(&mut Health, &Transform, &Faction)>,
    mut damaged: MessageWriter<Damaged>,
    mut blocked: MessageWriter<DamageBlocked>,
    mut died: MessageWriter<Died>,
    mut numbers: MessageWriter<ShowDamageNumber>,
) {
    for req in requests.read() {
        let Ok((mut health, tf, faction)) = q.get_mut(req.target) else {
            continue;
        };
        let position = tf.translation.truncate();

        if req.source == DamageSource::SelfDestruct {
            if health.kill() {
                died.write(Died { entity: req.target, faction: *faction, position });
            }
            continue;
        }

        match health.take_damage(req.amount) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Blocked => {
                blocked.write(DamageBlocked {
                    target: req.target,
                    amount: req.amount,
                    source: req.source,
                    position,
                });
                numbers.write(ShowDamageNumber {
                    position,
                    amount: 0.0,
                    color: palette::BLOCKED,
                    attribution: DamageAttribution::Blocked,
                });
            }
            outcome @ (DamageOutcome::Applied { .. } | DamageOutcome::Killed { .. }) => {
                let killed = matches!(outcome, DamageOutcome::Killed { .. });
                damaged.write(Damaged {
                    target: req.target,
                    amount: req.amount,
                    source: req.source,
                    position,
                    killed,
                });
                numbers.write(ShowDamageNumber {
                    position,
                    amount: req.amount,
                    color: req.source.number_color(*faction),
                    attribution: match faction {
                        Faction::Player => DamageAttribution::PlayerTaken,
                        Faction::Enemy => DamageAttribution::Dealt,
                    },
                });
                if killed {
                    info!("{:?} {:?} died ({:?})", faction, req.target, req.source);
                    died.write(Died { entity: req.target, faction: *faction, position });
                }
            }
        }
    }
}

pub fn resolve_heal_requests(
    mut requests: MessageReader<HealRequest>,
    mut q: Query<(&mut Health, &Transform)>,
    mut numbers: MessageWriter<ShowHealNumber>,
) {
    for req in requests.read() {
        let Ok((mut health, tf)) = q.get_mut(req.target) else {
            continue;
        };
        let restored = health.heal(req.amount);
        if restored > 0.0 {
            numbers.write(ShowHealNumber {
                position: tf.translation.truncate(),
                amount: restored,
                color: req.source.number_color(),
            });
        }
    }
}

#[cfg(test)]
mod tests;
