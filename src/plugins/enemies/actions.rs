//! Queued enemy side effects and their single applier.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::eclipse::EclipseChange;
use crate::plugins::health::{DamageRequest, DamageSource, Damageable, Health};
use crate::plugins::projectiles::messages::SpawnBulletRequest;
use crate::plugins::visuals::{PlayAnimation, SpawnVisual, VisualKind};

use super::minions::MinionSpawner;
use super::EnemyStateChanged;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TelegraphKind {
    /// Charge lane in front of a charger or the charge master.
    ChargeLane,
    /// Rush boss dash indicator.
    DashIndicator,
    /// Mole about to surface.
    Burrow,
    /// Charge master about to shoot.
    Muzzle,
}

impl TelegraphKind {
    fn color(self) -> Color {
        match self {
            TelegraphKind::ChargeLane => Color::srgba(1.0, 0.3, 0.2, 0.35),
            TelegraphKind::DashIndicator => Color::srgba(1.0, 0.1, 0.1, 0.45),
            TelegraphKind::Burrow => Color::srgba(0.6, 0.4, 0.2, 0.5),
            TelegraphKind::Muzzle => Color::srgba(1.0, 0.9, 0.3, 0.6),
        }
    }

    fn size(self) -> Vec2 {
        match self {
            TelegraphKind::ChargeLane => Vec2::new(6.0, 0.6),
            TelegraphKind::DashIndicator => Vec2::new(10.0, 0.8),
            TelegraphKind::Burrow => Vec2::splat(2.0),
            TelegraphKind::Muzzle => Vec2::splat(0.6),
        }
    }

    /// Lane telegraphs start at the owner and extend along their direction.
    fn is_lane(self) -> bool {
        matches!(self, TelegraphKind::ChargeLane | TelegraphKind::DashIndicator)
    }
}

/// Child entity that warns about an upcoming attack.
#[derive(Component, Debug, Clone, Copy)]
pub struct Telegraph(pub TelegraphKind);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyAction {
    Damage { target: Entity, amount: f32, source: DamageSource },
    AddLayers { target: Entity, layers: u32 },
    SelfDestruct,
    FireBullet { direction: Vec2, speed: f32, damage: f32 },
    ShowTelegraph { kind: TelegraphKind, direction: Vec2 },
    AimTelegraphs(Vec2),
    ClearTelegraphs,
    Visual { kind: VisualKind, scale: f32 },
    StateChanged { from: &'static str, to: &'static str },
    RequestMinionCheck,
}

/// Ordered per-tick queue of enemy actions.
#[derive(Resource, Debug, Default)]
pub struct EnemyActions {
    queue: Vec<(Entity, EnemyAction)>,
}

impl EnemyActions {
    pub fn push(&mut self, owner: Entity, action: EnemyAction) {
        self.queue.push((owner, action));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Entity, EnemyAction)> {
        self.queue.iter()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, (Entity, EnemyAction)> {
        self.queue.drain(..)
    }
}

#[derive(SystemParam)]
pub struct ActionSink<'w> {
    damage: MessageWriter<'w, DamageRequest>,
    eclipse: MessageWriter<'w, EclipseChange>,
    bullets: MessageWriter<'w, SpawnBulletRequest>,
    visuals: MessageWriter<'w, SpawnVisual>,
    animations: MessageWriter<'w, PlayAnimation>,
    state_changes: MessageWriter<'w, EnemyStateChanged>,
}

#[inline]
fn lane_transform(kind: TelegraphKind, direction: Vec2) -> Transform {
    let dir = direction.try_normalize().unwrap_or(Vec2::X);
    let offset = if kind.is_lane() { dir * kind.size().x * 0.5 } else { Vec2::ZERO };
    Transform::from_translation(offset.extend(-0.1))
        .with_rotation(Quat::from_rotation_z(dir.to_angle()))
}

pub fn apply_enemy_actions(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut actions: ResMut<EnemyActions>,
    mut sink: ActionSink,
    q_owner: Query<(&Transform, Option<&Children>), Without<Telegraph>>,
    mut q_telegraphs: Query<(&Telegraph, &mut Transform)>,
    mut q_spawners: Query<&mut MinionSpawner>,
) {
    // Telegraphs spawned by this pass are not children yet.
    let mut spawned: Vec<(Entity, Entity)> = Vec::new();
    for (owner, action) in actions.drain() {
        let Ok((tf, children)) = q_owner.get(owner) else {
            continue;
        };
        let pos = tf.translation.truncate();

        match action {
            EnemyAction::Damage { target, amount, source } => {
                sink.damage.write(DamageRequest { target, amount, source });
            }
            EnemyAction::AddLayers { target, layers } => {
                sink.eclipse.write(EclipseChange::add(target, layers));
            }
            EnemyAction::SelfDestruct => {
                sink.damage.write(DamageRequest {
                    target: owner,
                    amount: 0.0,
                    source: DamageSource::SelfDestruct,
                });
            }
            EnemyAction::FireBullet { direction, speed, damage } => {
                let muzzle = pos + direction * tunables.projectile.radius * 4.0;
                sink.bullets.write(SpawnBulletRequest {
                    pos: muzzle,
                    direction,
                    speed,
                    damage,
                    owner: Some(owner),
                });
            }
            EnemyAction::ShowTelegraph { kind, direction } => {
                let telegraph = commands
                    .spawn((
                        Name::new("Telegraph"),
                        Telegraph(kind),
                        Sprite {
                            color: kind.color(),
                            custom_size: Some(kind.size()),
                            ..default()
                        },
                        lane_transform(kind, direction),
                        ChildOf(owner),
                    ))
                    .id();
                spawned.push((owner, telegraph));
            }
            EnemyAction::AimTelegraphs(direction) => {
                for child in children.into_iter().flatten() {
                    if let Ok((telegraph, mut ttf)) = q_telegraphs.get_mut(*child) {
                        *ttf = lane_transform(telegraph.0, direction);
                    }
                }
            }
            EnemyAction::ClearTelegraphs => {
                for child in children.into_iter().flatten() {
                    if q_telegraphs.contains(*child) {
                        commands.entity(*child).try_despawn();
                    }
                }
                spawned.retain(|&(o, telegraph)| {
                    if o == owner {
                        commands.entity(telegraph).try_despawn();
                    }
                    o != owner
                });
            }
            EnemyAction::Visual { kind, scale } => {
                sink.visuals.write(SpawnVisual { kind, position: pos, scale });
            }
            EnemyAction::StateChanged { from, to } => {
                sink.state_changes.write(EnemyStateChanged { entity: owner, from, to });
                sink.animations.write(PlayAnimation { entity: owner, clip: to });
            }
            EnemyAction::RequestMinionCheck => {
                if let Ok(mut spawner) = q_spawners.get_mut(owner) {
                    spawner.request_check();
                }
            }
        }
    }
}

/// Telegraphs never outlive their owner's death, whatever pass spawned them.
pub fn clear_telegraphs_of_dead(
    mut commands: Commands,
    q_telegraphs: Query<(Entity, &ChildOf), With<Telegraph>>,
    q_owner: Query<&Health>,
) {
    for (telegraph, parent) in &q_telegraphs {
        if q_owner.get(parent.parent()).is_ok_and(|h| !h.is_alive()) {
            commands.entity(telegraph).try_despawn();
        }
    }
}
