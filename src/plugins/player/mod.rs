//! Player plugin.
//!
//! Pipeline:
//! - Update: sample the keyboard into the `PlayerInput` resource (presses are latched)
//! - Intent: consume the latch into velocity, `ParryRequest` and `ReleaseRequest`
//! - React: camera shake / red flash on hits
//! - Cleanup: a removed or despawning player ends the run
//!
//! Presses are latched because `Update` may run several frames between fixed ticks
//! (or several ticks within one frame); a press must be seen by exactly one tick.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{
    layers::Layer,
    schedule::CombatSet,
    state::GameState,
    timers::TimedTasks,
    tunables::{PlayerTunables, Tunables},
};
use crate::plugins::eclipse::{EclipseStack, EclipseTicks};
use crate::plugins::health::lifecycle::{handle_deaths, run_timed_tasks, PendingDespawn};
use crate::plugins::health::{Damageable, Damaged, Faction, Health};
use crate::plugins::parry::{ParryRequest, ParryState};
use crate::plugins::release::ReleaseRequest;
use crate::plugins::screen_fx::{FlashScreen, ShakeCamera};
use crate::plugins::ui::CombatStats;
use crate::plugins::visuals::{BaseTint, CurrentAnimation};

const PLAYER_COLOR: Color = Color::srgb(0.2, 0.75, 0.9);
const HEAVY_FLASH: Color = Color::srgba(1.0, 0.2, 0.2, 0.5);

#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Player;

/// Handle to the live player, set on spawn.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct PlayerEntity(pub Option<Entity>);

#[derive(Resource, Default, Debug, Clone, PartialEq)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    pub parry: bool,
    pub release: bool,
}

impl PlayerInput {
    /// Returns the latched presses and clears them.
    pub fn take_presses(&mut self) -> (bool, bool) {
        (std::mem::take(&mut self.parry), std::mem::take(&mut self.release))
    }
}

/// Screen feedback for one hit on the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitFeedback {
    pub shake_secs: f32,
    pub shake_magnitude: f32,
    pub flash: Option<(Color, f32)>,
}

/// Shake scales with damage; heavy hits shake harder and flash red.
pub fn hit_feedback(damage: f32, cfg: &PlayerTunables) -> HitFeedback {
    if damage >= cfg.heavy_hit_threshold {
        let k = (damage / 50.0).clamp(0.8, 2.5);
        HitFeedback {
            shake_secs: cfg.heavy_shake_secs * k.clamp(1.0, 2.0),
            shake_magnitude: cfg.heavy_shake_magnitude * k,
            flash: Some((HEAVY_FLASH, 0.2 + damage * 0.005)),
        }
    } else {
        let k = (damage / 30.0).clamp(0.3, 1.5);
        HitFeedback {
            shake_secs: cfg.hit_shake_secs * k.clamp(0.8, 1.5),
            shake_magnitude: cfg.hit_shake_magnitude * k,
            flash: None,
        }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<PlayerInput>()
        .init_resource::<PlayerEntity>()
        .add_message::<ParryRequest>()
        .add_message::<ReleaseRequest>()
        .add_message::<Damaged>()
        .add_message::<ShakeCamera>()
        .add_message::<FlashScreen>()
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(OnEnter(GameState::GameOver), announce_game_over)
        .add_systems(Update, gather_input.run_if(in_state(GameState::InGame)))
        .add_systems(Update, restart_on_key.run_if(in_state(GameState::GameOver)))
        .add_systems(FixedUpdate, consume_input.in_set(CombatSet::Intent))
        .add_systems(FixedUpdate, hit_shake.in_set(CombatSet::React).after(handle_deaths))
        .add_systems(FixedUpdate, detect_game_over.in_set(CombatSet::Cleanup).after(run_timed_tasks));
}

pub fn spawn(mut commands: Commands, tunables: Res<Tunables>, mut handle: ResMut<PlayerEntity>) {
    let cfg = &tunables.player;
    let layers = CollisionLayers::new(
        Layer::Player,
        [Layer::World, Layer::Enemy, Layer::EnemyBullet],
    );

    let e = commands
        .spawn((
            Name::new("Player"),
            Player,
            Faction::Player,
            Health::new(cfg.max_health),
            EclipseStack::new(tunables.eclipse.max_layer),
            EclipseTicks::from_tunables(&tunables.eclipse),
            ParryState::from_tunables(&tunables.parry),
            TimedTasks::default(),
            BaseTint(PLAYER_COLOR),
            CurrentAnimation::default(),
            Sprite {
                color: PLAYER_COLOR,
                custom_size: Some(Vec2::splat(cfg.radius * 2.0)),
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, 1.0),
            (
                RigidBody::Dynamic,
                Collider::circle(cfg.radius),
                layers,
                LockedAxes::ROTATION_LOCKED,
                LinearVelocity::ZERO,
                CollisionEventsEnabled,
            ),
            DespawnOnExit(GameState::InGame),
        ))
        .id();

    handle.0 = Some(e);
    info!("Spawned player {e}");
}

pub fn gather_input(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<PlayerInput>) {
    let mut axis = Vec2::ZERO;

    if keys.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }

    input.move_axis = axis.normalize_or_zero();
    input.parry |= keys.just_pressed(KeyCode::KeyJ);
    input.release |= keys.just_pressed(KeyCode::Space);
}

pub fn consume_input(
    tunables: Res<Tunables>,
    mut input: ResMut<PlayerInput>,
    mut parries: MessageWriter<ParryRequest>,
    mut releases: MessageWriter<ReleaseRequest>,
    mut q_player: Query<(Entity, &Health, &mut LinearVelocity), With<Player>>,
) {
    let (parry, release) = input.take_presses();
    let Ok((player, health, mut vel)) = q_player.single_mut() else {
        return;
    };
    if !health.is_alive() {
        vel.0 = Vec2::ZERO;
        return;
    }

    vel.0 = input.move_axis * tunables.player.move_speed;
    if parry {
        parries.write(ParryRequest { player });
    }
    if release {
        releases.write(ReleaseRequest { player });
    }
}

pub fn hit_shake(
    tunables: Res<Tunables>,
    mut damaged: MessageReader<Damaged>,
    mut shakes: MessageWriter<ShakeCamera>,
    mut flashes: MessageWriter<FlashScreen>,
    q_player: Query<(), With<Player>>,
) {
    for d in damaged.read() {
        if !q_player.contains(d.target) {
            continue;
        }
        let fb = hit_feedback(d.amount, &tunables.player);
        shakes.write(ShakeCamera { duration: fb.shake_secs, magnitude: fb.shake_magnitude });
        if let Some((color, duration)) = fb.flash {
            flashes.write(FlashScreen { color, duration });
        }
    }
}

/// The run ends once the dead player is about to be removed, or is already gone.
pub fn detect_game_over(
    handle: Res<PlayerEntity>,
    q_player: Query<Has<PendingDespawn>, With<Player>>,
    mut next: ResMut<NextState<GameState>>,
) {
    let Some(player) = handle.0 else {
        return;
    };
    let over = match q_player.get(player) {
        Ok(pending) => pending,
        Err(_) => true,
    };
    if over {
        next.set(GameState::GameOver);
    }
}

fn announce_game_over(stats: Res<CombatStats>, mut handle: ResMut<PlayerEntity>) {
    handle.0 = None;
    info!("Game over: {stats:?}");
}

fn restart_on_key(keys: Res<ButtonInput<KeyCode>>, mut next: ResMut<NextState<GameState>>) {
    if keys.just_pressed(KeyCode::KeyR) {
        next.set(GameState::InGame);
    }
}
