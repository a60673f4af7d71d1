//! Enemy construction and the starting encounter.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{
    layers::Layer,
    state::GameState,
    timers::TimedTasks,
    tunables::{EnemyStats, EnemyTunables, Tunables},
};
use crate::plugins::health::{Faction, Health};
use crate::plugins::visuals::{BaseTint, CurrentAnimation};

use super::archetypes::{
    charge_master::ChargeMasterBrain, charger::ChargerBrain, mole::MoleBrain, rush::RushBrain,
    sentinel::SentinelBrain, shadow::ShadowBrain,
};
use super::brain::{EnemyBrain, EnemyControl};
use super::contact::ContactState;
use super::minions::{CapPolicy, Minion, MinionPlacement, MinionSpawner};
use super::{BossBar, Enemy};

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Shadow,
    Charger,
    Sentinel,
    Mole,
    Rush,
    ChargeMaster,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 6] = [
        EnemyKind::Shadow,
        EnemyKind::Charger,
        EnemyKind::Sentinel,
        EnemyKind::Mole,
        EnemyKind::Rush,
        EnemyKind::ChargeMaster,
    ];

    pub fn stats(self, cfg: &EnemyTunables) -> EnemyStats {
        match self {
            EnemyKind::Shadow => cfg.shadow.stats,
            EnemyKind::Charger => cfg.charger.stats,
            EnemyKind::Sentinel => cfg.sentinel.stats,
            EnemyKind::Mole => cfg.mole.stats,
            EnemyKind::Rush => cfg.rush.stats,
            EnemyKind::ChargeMaster => cfg.charge_master.stats,
        }
    }

    fn tint(self) -> Color {
        match self {
            EnemyKind::Shadow => Color::srgb(0.35, 0.2, 0.45),
            EnemyKind::Charger => Color::srgb(0.9, 0.45, 0.2),
            EnemyKind::Sentinel => Color::srgb(0.25, 0.6, 0.3),
            EnemyKind::Mole => Color::srgb(0.55, 0.4, 0.25),
            EnemyKind::Rush => Color::srgb(0.8, 0.15, 0.15),
            EnemyKind::ChargeMaster => Color::srgb(0.85, 0.65, 0.1),
        }
    }

    fn brain(self, home: Vec2) -> EnemyBrain {
        match self {
            EnemyKind::Shadow => EnemyBrain::Shadow(ShadowBrain::new(home)),
            EnemyKind::Charger => EnemyBrain::Charger(ChargerBrain::new(home)),
            EnemyKind::Sentinel => EnemyBrain::Sentinel(SentinelBrain::default()),
            EnemyKind::Mole => EnemyBrain::Mole(MoleBrain::default()),
            EnemyKind::Rush => EnemyBrain::Rush(RushBrain::default()),
            EnemyKind::ChargeMaster => EnemyBrain::ChargeMaster(ChargeMasterBrain::new(home)),
        }
    }

    /// Boss bar for the archetypes that carry one.
    fn boss_bar(self, cfg: &EnemyTunables) -> Option<BossBar> {
        let (name, color) = match self {
            EnemyKind::Sentinel => (&cfg.sentinel.name, Color::srgb(0.2, 0.8, 0.2)),
            EnemyKind::Mole => (&cfg.mole.name, Color::srgb(0.6, 0.4, 0.2)),
            EnemyKind::Rush => (&cfg.rush.name, Color::srgb(0.9, 0.2, 0.2)),
            EnemyKind::ChargeMaster => (&cfg.charge_master.name, Color::srgb(1.0, 0.6, 0.1)),
            EnemyKind::Shadow | EnemyKind::Charger => return None,
        };
        Some(BossBar { name: name.clone(), color })
    }

    fn minion_spawner(self, cfg: &EnemyTunables) -> Option<MinionSpawner> {
        let to_vecs = |points: &[[f32; 2]]| points.iter().copied().map(Vec2::from).collect::<Vec<_>>();
        match self {
            EnemyKind::Mole => Some(
                MinionSpawner::new(
                    CapPolicy::SoftThreshold(cfg.mole.spawn_threshold),
                    MinionPlacement::RandomOffset {
                        offsets: to_vecs(&cfg.mole.spawn_offsets),
                        min_radius: cfg.mole.ring_min_radius,
                        max_radius: cfg.mole.ring_max_radius,
                    },
                )
                .with_interval(cfg.mole.spawn_interval_secs),
            ),
            EnemyKind::Rush => Some(
                MinionSpawner::new(
                    CapPolicy::HardCap(cfg.rush.minion_count),
                    MinionPlacement::CycledOffset {
                        offsets: to_vecs(&cfg.rush.spawn_points),
                        radius: cfg.rush.summon_radius,
                        count: cfg.rush.minion_count,
                    },
                )
                .with_respawn_delay(cfg.rush.respawn_delay_secs),
            ),
            _ => None,
        }
    }
}

impl std::fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

fn enemy_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Enemy,
        [Layer::World, Layer::Player, Layer::PlayerBullet, Layer::Enemy],
    )
}

pub fn spawn_enemy(commands: &mut Commands, kind: EnemyKind, pos: Vec2, tunables: &Tunables) -> Entity {
    let cfg = &tunables.enemies;
    let stats = kind.stats(cfg);
    let tint = kind.tint();

    let mut entity = commands.spawn((
        Name::new(kind.to_string()),
        Enemy,
        kind,
        Faction::Enemy,
        Health::new(stats.max_health),
        kind.brain(pos),
        EnemyControl::default(),
        ContactState::default(),
        TimedTasks::default(),
        BaseTint(tint),
        CurrentAnimation::default(),
        Sprite {
            color: tint,
            custom_size: Some(Vec2::splat(stats.radius * 2.0)),
            ..default()
        },
        Transform::from_translation(pos.extend(1.0)),
        (
            RigidBody::Dynamic,
            Collider::circle(stats.radius),
            enemy_layers(),
            LockedAxes::ROTATION_LOCKED,
            LinearVelocity::ZERO,
            CollisionEventsEnabled,
        ),
        DespawnOnExit(GameState::InGame),
    ));

    if let Some(bar) = kind.boss_bar(cfg) {
        entity.insert(bar);
    }
    if let Some(spawner) = kind.minion_spawner(cfg) {
        entity.insert(spawner);
    }

    let id = entity.id();
    info!("Spawned {kind} {id} at {pos}");
    id
}

/// A shadow that belongs to `owner`.
pub fn spawn_minion(commands: &mut Commands, pos: Vec2, owner: Entity, tunables: &Tunables) -> Entity {
    let minion = spawn_enemy(commands, EnemyKind::Shadow, pos, tunables);
    commands.entity(minion).insert((Name::new("Shadow Minion"), Minion { owner }));
    minion
}

/// One of each archetype around the arena.
pub const ENCOUNTER: [(EnemyKind, Vec2); 6] = [
    (EnemyKind::Sentinel, Vec2::new(-10.0, -4.0)),
    (EnemyKind::Mole, Vec2::new(10.0, -4.0)),
    (EnemyKind::Rush, Vec2::new(-10.0, 6.0)),
    (EnemyKind::ChargeMaster, Vec2::new(10.0, 6.0)),
    (EnemyKind::Shadow, Vec2::new(-4.0, 6.0)),
    (EnemyKind::Charger, Vec2::new(4.0, 6.0)),
];

pub fn spawn_encounter(mut commands: Commands, tunables: Res<Tunables>) {
    for (kind, pos) in ENCOUNTER {
        spawn_enemy(&mut commands, kind, pos, &tunables);
    }
}
