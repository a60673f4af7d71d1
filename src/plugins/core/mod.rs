//! Core plugin: shared resources, tick ordering and collaborator checks.

use std::path::Path;

use bevy::prelude::*;

use crate::common::{
    rng::GameRng,
    schedule,
    tunables::{Tunables, TUNABLES_PATH},
};
use crate::plugins::screen_fx::ScreenFxAttached;
use crate::plugins::ui::UiAttached;

/// Keeps a `Tunables` resource inserted before this plugin (tests do that).
pub fn plugin(app: &mut App) {
    if !app.world().contains_resource::<Tunables>() {
        app.insert_resource(Tunables::load_or_default(Path::new(TUNABLES_PATH)));
    }
    let seed = app.world().resource::<Tunables>().rng_seed;
    if !app.world().contains_resource::<GameRng>() {
        app.insert_resource(GameRng::new(seed));
    }

    app.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)))
        .add_systems(Startup, report_collaborators);
    schedule::configure(app);
}

/// Messages to an absent collaborator are simply never read.
pub fn report_collaborators(ui: Option<Res<UiAttached>>, fx: Option<Res<ScreenFxAttached>>) {
    if ui.is_none() {
        warn!("No UI collaborator installed; damage numbers and boss bars are dropped");
    }
    if fx.is_none() {
        warn!("No screen-effect collaborator installed; shake, flash and time slow are dropped");
    }
}
