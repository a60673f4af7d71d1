use avian2d::prelude::*;
use bevy::prelude::*;

/// Top-down arena in metres: unit length, no gravity.
pub fn plugin(app: &mut App) {
    app.add_plugins(PhysicsPlugins::default().with_length_unit(1.0));
    app.insert_resource(Gravity(Vec2::ZERO));
}
