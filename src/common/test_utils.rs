//! Test helpers.
//!
//! `World::run_system_once` executes a system without building a schedule. Systems
//! that use `Commands` only enqueue structural changes, so we flush afterwards to
//! make them visible to assertions.

use std::time::{Duration, Instant};

use bevy::ecs::message::{Message, Messages};
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// A `Time<Fixed>` whose last delta is `dt`.
pub fn fixed_time_with_delta(dt: f32) -> Time<Fixed> {
    let mut t = Time::<Fixed>::default();
    t.advance_by(Duration::from_secs_f32(dt));
    t
}

/// A `Time<Real>` whose last delta is `dt`.
pub fn real_time_with_delta(dt: f32) -> Time<Real> {
    let mut t = Time::<Real>::new(Instant::now());
    // The first update only records the start instant.
    t.update_with_duration(Duration::ZERO);
    t.update_with_duration(Duration::from_secs_f32(dt));
    t
}

/// Register message storage for `M` if the world does not have it yet.
pub fn ensure_messages<M: Message>(world: &mut World) {
    if world.get_resource::<Messages<M>>().is_none() {
        world.init_resource::<Messages<M>>();
    }
}

/// Take every pending message of type `M` out of its buffers.
pub fn drain_messages<M: Message>(world: &mut World) -> Vec<M> {
    ensure_messages::<M>(world);
    let mut msgs = world.resource_mut::<Messages<M>>();
    msgs.drain().collect()
}
