//! Feature plugins.

use bevy::prelude::*;

use crate::plugins::projectiles::ProjectilesPlugin;

pub mod core;
pub mod eclipse;
pub mod enemies;
pub mod health;
pub mod parry;
pub mod physics;
pub mod player;
pub mod projectiles;
pub mod release;
pub mod world;

// Collaborators
pub mod screen_fx;
pub mod ui;
pub mod visuals;

// Render-only
pub mod camera;

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    world::plugin(app);
    health::plugin(app);
    eclipse::plugin(app);
    player::plugin(app);
    enemies::plugin(app);
    parry::plugin(app);
    release::plugin(app);
    app.add_plugins(ProjectilesPlugin);

    ui::plugin(app);
    screen_fx::plugin(app);
    visuals::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::plugin(app);
}

/// Register all plugins (full app).
pub fn register_all(app: &mut App) {
    register_gameplay(app);
    register_render(app);
}
