//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - `InputPlugin` provides the keyboard resource the player samples.
//! - we then call `eclipse_parry::game::configure_headless` to install gameplay plugins.
//!
//! Virtual time advances a fixed 16 ms per `update`, so every update runs about one
//! fixed tick regardless of how fast the test machine is.

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::input::InputPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use eclipse_parry::plugins::player::PlayerEntity;

pub fn app_headless() -> App {
    let mut app = App::new();

    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        InputPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));

    eclipse_parry::game::configure_headless(&mut app);
    app
}

pub fn run(app: &mut App, updates: usize) {
    for _ in 0..updates {
        app.update();
    }
}

pub fn player(app: &App) -> Entity {
    app.world()
        .resource::<PlayerEntity>()
        .0
        .expect("player spawned on entering InGame")
}
