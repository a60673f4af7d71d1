//! Camera plugin.
//!
//! The world is in metres; the orthographic scale turns `pixels_per_meter` into the
//! zoom. The camera eases toward the player each frame.
//!
//! `follow_player` reads the player's `Transform` and writes the camera's. The two
//! queries are proven disjoint with `Without<...>` filters (B0001).
//!
//! ```text
//! OnEnter(InGame): spawn MainCamera
//! PostUpdate:      follow_player, then screen_fx applies its shake on top
//! ```

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{state::GameState, tunables::Tunables};
use crate::plugins::player::{Player, PlayerEntity};
use crate::plugins::screen_fx::collect_fx_requests;

#[derive(Component, Debug, Clone, Copy)]
pub struct MainCamera {
    pub responsiveness: f32,
}

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_camera)
        .add_systems(
            PostUpdate,
            follow_player
                .before(collect_fx_requests)
                .before(TransformSystems::Propagate)
                .run_if(in_state(GameState::InGame)),
        );
}

fn spawn_camera(mut commands: Commands, tunables: Res<Tunables>) {
    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        MainCamera { responsiveness: 5.0 },
        Projection::Orthographic(OrthographicProjection {
            scale: 1.0 / tunables.pixels_per_meter.max(1.0),
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_xyz(0.0, 0.0, 999.0),
        DespawnOnExit(GameState::InGame),
    ));
}

/// Exponential smoothing factor for one frame.
#[inline]
pub fn follow_alpha(responsiveness: f32, dt: f32) -> f32 {
    1.0 - (-responsiveness * dt).exp()
}

fn follow_player(
    time: Res<Time>,
    player_e: Res<PlayerEntity>,
    // Disjointness proof: Player entities are not MainCamera entities.
    q_player: Query<&Transform, (With<Player>, Without<MainCamera>)>,
    // Disjointness proof: MainCamera entities are not Player entities.
    mut q_cam: Query<(&mut Transform, &MainCamera), Without<Player>>,
) {
    let Some(tf_player) = player_e.0.and_then(|p| q_player.get(p).ok()) else {
        return;
    };
    let Ok((mut tf_cam, main_cam)) = q_cam.single_mut() else {
        return;
    };

    let alpha = follow_alpha(main_cam.responsiveness, time.delta_secs());
    let target = tf_player.translation.truncate();
    let current = tf_cam.translation.truncate();
    let next = current.lerp(target, alpha);
    tf_cam.translation.x = next.x;
    tf_cam.translation.y = next.y;
}
