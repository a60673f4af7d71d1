//! Visual-effect collaborator.
//!
//! Gameplay never builds effect entities itself. It writes:
//! - `SpawnVisual`: a one-shot effect at a position, auto-removed after its lifetime;
//! - `PlayAnimation`: a clip name for an actor, exposed as `CurrentAnimation` for
//!   whatever animation backend the render side attaches.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{
    schedule::CombatSet,
    state::GameState,
    timers::{DeferredAction, TimedTasks},
};

/// Resting sprite colour; hit flashes restore to this.
#[derive(Component, Debug, Clone, Copy)]
pub struct BaseTint(pub Color);

/// Name of the clip an actor should currently play.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentAnimation(pub &'static str);

impl Default for CurrentAnimation {
    fn default() -> Self {
        Self("idle")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualKind {
    ReleaseExplosion,
    ParrySpark,
    Detonation,
    ChargeMiss,
    Summon,
}

impl VisualKind {
    fn color(self) -> Color {
        match self {
            VisualKind::ReleaseExplosion => Color::srgba(0.8, 0.3, 1.0, 0.7),
            VisualKind::ParrySpark => Color::srgba(0.4, 1.0, 1.0, 0.9),
            VisualKind::Detonation => Color::srgba(1.0, 0.55, 0.1, 0.85),
            VisualKind::ChargeMiss => Color::srgba(0.6, 0.6, 0.6, 0.6),
            VisualKind::Summon => Color::srgba(0.3, 0.1, 0.4, 0.7),
        }
    }

    fn base_size(self) -> f32 {
        match self {
            VisualKind::ReleaseExplosion => 6.0,
            VisualKind::ParrySpark => 0.8,
            VisualKind::Detonation => 2.0,
            VisualKind::ChargeMiss => 1.2,
            VisualKind::Summon => 1.0,
        }
    }

    pub fn lifetime_secs(self) -> f32 {
        match self {
            VisualKind::ReleaseExplosion => 1.0,
            VisualKind::ParrySpark => 0.25,
            VisualKind::Detonation => 0.6,
            VisualKind::ChargeMiss => 1.0,
            VisualKind::Summon => 0.5,
        }
    }
}

#[derive(Message, Clone, Copy, Debug)]
pub struct SpawnVisual {
    pub kind: VisualKind,
    pub position: Vec2,
    pub scale: f32,
}

impl SpawnVisual {
    pub fn at(kind: VisualKind, position: Vec2) -> Self {
        Self { kind, position, scale: 1.0 }
    }
}

#[derive(Message, Clone, Copy, Debug)]
pub struct PlayAnimation {
    pub entity: Entity,
    pub clip: &'static str,
}

/// Marker on spawned one-shot effects.
#[derive(Component, Debug, Clone, Copy)]
pub struct VisualEffect(pub VisualKind);

pub fn plugin(app: &mut App) {
    app.add_message::<SpawnVisual>()
        .add_message::<PlayAnimation>()
        .add_systems(
            FixedUpdate,
            (spawn_visuals, apply_animation_requests).in_set(CombatSet::Cleanup),
        );
}

pub fn spawn_visuals(mut commands: Commands, mut requests: MessageReader<SpawnVisual>) {
    for req in requests.read() {
        let mut tasks = TimedTasks::default();
        tasks.schedule(req.kind.lifetime_secs(), DeferredAction::Despawn);

        commands.spawn((
            Name::new(format!("Visual({:?})", req.kind)),
            VisualEffect(req.kind),
            Sprite {
                color: req.kind.color(),
                custom_size: Some(Vec2::splat(req.kind.base_size())),
                ..default()
            },
            Transform::from_translation(req.position.extend(5.0))
                .with_scale(Vec3::splat(req.scale.max(0.01))),
            tasks,
            DespawnOnExit(GameState::InGame),
        ));
    }
}

/// Requests for entities without `CurrentAnimation` (already gone, or never animated)
/// are dropped.
pub fn apply_animation_requests(
    mut requests: MessageReader<PlayAnimation>,
    mut q: Query<&mut CurrentAnimation>,
) {
    for req in requests.read() {
        if let Ok(mut current) = q.get_mut(req.entity) {
            if current.0 != req.clip {
                current.0 = req.clip;
            }
        }
    }
}
