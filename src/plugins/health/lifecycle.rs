//! What happens to an actor after it is hit or killed.
//!
//! - Hit: white flash, tint restored by a timed task, `hit` animation.
//! - Death: collisions off, velocity zeroed, every pending task cancelled, then a
//!   single `Despawn` task for the grace period and a short fade.
//!
//! We never despawn inside the fixed step. A finished `Despawn` task marks
//! `PendingDespawn` and `despawn_marked` removes the entity in PostUpdate.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::time::Fixed;

use crate::common::{
    schedule::CombatSet,
    state::GameState,
    timers::{DeferredAction, TimedTasks},
    tunables::Tunables,
};
use crate::plugins::visuals::{BaseTint, PlayAnimation};

use super::{Damageable, Damaged, Died, Health};

const HIT_FLASH: Color = Color::WHITE;
const DEATH_FADE_SECS: f32 = 0.35;

/// Marker: remove in PostUpdate.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingDespawn;

/// Short fade-out that plays while a dead actor waits for removal.
#[derive(Component, Debug, Clone)]
pub struct Dying {
    pub fade: Timer,
}

/// A `RespawnMinions` task came due on a living owner.
#[derive(Message, Clone, Copy, Debug)]
pub struct RespawnMinionsDue {
    pub owner: Entity,
}

pub fn plugin(app: &mut App) {
    app.add_message::<RespawnMinionsDue>()
        .add_message::<PlayAnimation>()
        .add_systems(
            FixedUpdate,
            (flash_on_damage, handle_deaths).chain().in_set(CombatSet::React),
        )
        .add_systems(
            FixedUpdate,
            (run_timed_tasks, fade_dying).in_set(CombatSet::Cleanup),
        )
        .add_systems(
            PostUpdate,
            despawn_marked.run_if(in_state(GameState::InGame)),
        );
}

pub fn flash_on_damage(
    tunables: Res<Tunables>,
    mut damaged: MessageReader<Damaged>,
    mut anims: MessageWriter<PlayAnimation>,
    mut q: Query<(Option<&mut Sprite>, Option<&mut TimedTasks>), With<BaseTint>>,
) {
    for d in damaged.read() {
        if d.killed {
            continue;
        }
        anims.write(PlayAnimation { entity: d.target, clip: "hit" });

        let Ok((sprite, tasks)) = q.get_mut(d.target) else {
            continue;
        };
        if let Some(mut sprite) = sprite {
            sprite.color = HIT_FLASH;
        }
        if let Some(mut tasks) = tasks {
            tasks.schedule(tunables.actor.hit_flash_secs, DeferredAction::RestoreTint);
        }
    }
}

pub fn handle_deaths(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut died: MessageReader<Died>,
    mut anims: MessageWriter<PlayAnimation>,
    mut q: Query<(
        Option<&mut CollisionLayers>,
        Option<&mut LinearVelocity>,
        Option<&mut TimedTasks>,
    )>,
) {
    for d in died.read() {
        let Ok((layers, velocity, tasks)) = q.get_mut(d.entity) else {
            continue;
        };

        if let Some(mut layers) = layers {
            layers.filters = LayerMask::NONE;
        }
        if let Some(mut v) = velocity {
            v.0 = Vec2::ZERO;
        }

        let grace = tunables.actor.death_grace_secs;
        match tasks {
            Some(mut tasks) => {
                let cancelled = tasks.cancel_all();
                if cancelled > 0 {
                    debug!("Cancelled {cancelled} pending task(s) of {:?}", d.entity);
                }
                tasks.schedule(grace, DeferredAction::Despawn);
            }
            None => {
                let mut tasks = TimedTasks::default();
                tasks.schedule(grace, DeferredAction::Despawn);
                commands.entity(d.entity).insert(tasks);
            }
        }

        commands.entity(d.entity).insert(Dying {
            fade: Timer::from_seconds(DEATH_FADE_SECS.min(grace), TimerMode::Once),
        });
        anims.write(PlayAnimation { entity: d.entity, clip: "death" });
    }
}

/// Advance every actor's deferred tasks and run the ones that finished.
///
/// Anything but `Despawn` is dropped if its owner died in the meantime.
pub fn run_timed_tasks(
    time: Res<Time<Fixed>>,
    mut commands: Commands,
    mut respawns: MessageWriter<RespawnMinionsDue>,
    mut q: Query<
        (
            Entity,
            &mut TimedTasks,
            Option<&Health>,
            Option<&mut Sprite>,
            Option<&BaseTint>,
        ),
        Without<PendingDespawn>,
    >,
) {
    let dt = time.delta();
    for (e, mut tasks, health, mut sprite, base) in &mut q {
        if tasks.is_empty() {
            continue;
        }
        let owner_alive = health.is_none_or(|h| h.is_alive());

        for action in tasks.advance(dt) {
            if !owner_alive && !action.survives_owner_death() {
                continue;
            }
            match action {
                DeferredAction::Despawn => {
                    commands.entity(e).insert(PendingDespawn);
                }
                DeferredAction::RestoreTint => {
                    if let (Some(sprite), Some(base)) = (sprite.as_deref_mut(), base) {
                        sprite.color = base.0;
                    }
                }
                DeferredAction::RespawnMinions => {
                    respawns.write(RespawnMinionsDue { owner: e });
                }
            }
        }
    }
}

pub fn fade_dying(
    time: Res<Time<Fixed>>,
    mut q: Query<(&mut Dying, Option<&mut Sprite>, &mut Transform), Without<PendingDespawn>>,
) {
    for (mut dying, sprite, mut tf) in &mut q {
        if dying.fade.is_finished() {
            continue;
        }
        dying.fade.tick(time.delta());

        let dur = dying.fade.duration().as_secs_f32().max(0.0001);
        let t = (dying.fade.elapsed_secs() / dur).clamp(0.0, 1.0);

        tf.scale = Vec3::splat(1.0 - t);
        if let Some(mut sprite) = sprite {
            let mut c = sprite.color.to_srgba();
            c.alpha = 1.0 - t;
            sprite.color = c.into();
        }
    }
}

pub fn despawn_marked(mut commands: Commands, q: Query<Entity, With<PendingDespawn>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}
