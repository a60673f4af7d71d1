//! World plugin: arena walls and floor.
//!
//! The arena is `2 * HALF_W` by `2 * HALF_H` metres centred on the origin.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{layers::Layer, state::GameState};

pub const HALF_W: f32 = 16.0;
pub const HALF_H: f32 = 9.0;
const TILE: f32 = 2.0;
const WALL_THICKNESS: f32 = 0.75;

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), (spawn_arena, spawn_floor));
}

/// Inside the walls, shrunk by `margin`.
pub fn contains(pos: Vec2, margin: f32) -> bool {
    pos.x.abs() <= HALF_W - margin && pos.y.abs() <= HALF_H - margin
}

/// Nearest point to `pos` that satisfies [`contains`] with the same margin.
pub fn clamp_inside(pos: Vec2, margin: f32) -> Vec2 {
    let half = Vec2::new(HALF_W - margin, HALF_H - margin).max(Vec2::ZERO);
    pos.clamp(-half, half)
}

pub fn spawn_arena(mut commands: Commands) {
    let wall_color = Color::srgb(0.25, 0.27, 0.33);
    let t = WALL_THICKNESS;

    let wall_layers = CollisionLayers::new(
        Layer::World,
        [
            Layer::Player,
            Layer::Enemy,
            Layer::PlayerBullet,
            Layer::EnemyBullet,
        ],
    );

    let mut spawn_wall = |name: &'static str, pos: Vec2, size: Vec2| {
        commands.spawn((
            Name::new(name),
            Sprite {
                color: wall_color,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(pos.extend(0.5)),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            wall_layers,
            DespawnOnExit(GameState::InGame),
        ));
    };

    let horizontal = Vec2::new(HALF_W * 2.0 + t * 2.0, t);
    let vertical = Vec2::new(t, HALF_H * 2.0);
    spawn_wall("WallTop", Vec2::new(0.0, HALF_H + t * 0.5), horizontal);
    spawn_wall("WallBottom", Vec2::new(0.0, -HALF_H - t * 0.5), horizontal);
    spawn_wall("WallLeft", Vec2::new(-HALF_W - t * 0.5, 0.0), vertical);
    spawn_wall("WallRight", Vec2::new(HALF_W + t * 0.5, 0.0), vertical);
}

/// Checkerboard floor from solid-colour sprites.
fn spawn_floor(mut commands: Commands) {
    let cols = (HALF_W / TILE) as i32;
    let rows = (HALF_H / TILE) as i32;
    (-rows..=rows)
        .flat_map(|y| (-cols..=cols).map(move |x| (x, y)))
        .for_each(|(x, y)| {
            let color = if (x + y) % 2 == 0 {
                Color::srgb(0.14, 0.14, 0.16)
            } else {
                Color::srgb(0.12, 0.12, 0.14)
            };

            commands.spawn((
                Name::new("Floor"),
                Sprite::from_color(color, Vec2::splat(TILE)),
                Transform::from_xyz(x as f32 * TILE, y as f32 * TILE, 0.0),
                DespawnOnExit(GameState::InGame),
            ));
        });
}
