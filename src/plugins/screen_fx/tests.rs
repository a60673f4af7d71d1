use std::time::Duration;

use bevy::prelude::*;
use bevy::time::{Real, Virtual};

use crate::common::test_utils::{ensure_messages, real_time_with_delta, run_system_once};
use crate::plugins::camera::MainCamera;

use super::*;

fn fx_world() -> (World, Entity, Entity, Entity) {
    let mut world = World::new();
    world.insert_resource(GlobalFx::default());
    world.insert_resource(FxHandles::default());
    world.insert_resource(real_time_with_delta(0.016));
    world.insert_resource(Time::<Virtual>::default());

    let cam = world
        .spawn((Camera2d, MainCamera { responsiveness: 5.0 }, Transform::default()))
        .id();
    let overlay = world
        .spawn((ScreenFlashOverlay, Sprite::default(), Transform::default(), Visibility::Hidden))
        .id();
    let edge = world
        .spawn((EdgeFlashOverlay, Sprite::default(), Transform::default(), Visibility::Hidden))
        .id();

    {
        let mut h = world.resource_mut::<FxHandles>();
        h.camera = Some(cam);
        h.overlay = Some(overlay);
        h.edge = Some(edge);
    }
    (world, cam, overlay, edge)
}

fn step(world: &mut World, dt: f32) {
    world
        .resource_mut::<Time<Real>>()
        .update_with_duration(Duration::from_secs_f32(dt));
    run_system_once(world, apply_global_fx);
}

#[test]
fn requests_fold_into_global_fx() {
    let mut world = World::new();
    world.insert_resource(GlobalFx::default());
    ensure_messages::<ShakeCamera>(&mut world);
    ensure_messages::<FlashScreen>(&mut world);
    ensure_messages::<EdgeFlash>(&mut world);
    ensure_messages::<TimeSlow>(&mut world);

    world.write_message(ShakeCamera { duration: 0.3, magnitude: 0.15 });
    world.write_message(ShakeCamera { duration: 0.1, magnitude: 0.4 });
    world.write_message(TimeSlow { factor: 0.5, duration: 0.4 });

    run_system_once(&mut world, collect_fx_requests);

    let fx = world.resource::<GlobalFx>();
    assert!((fx.shake_magnitude() - 0.4).abs() < 1e-6);
    assert_eq!(fx.slow_factor(), Some(0.5));
    assert!(!fx.is_idle());
}

#[test]
fn overlapping_slows_keep_the_stronger_factor() {
    let mut fx = GlobalFx::default();
    fx.slow_time(0.5, 0.3);
    fx.slow_time(0.2, 0.1);
    assert_eq!(fx.slow_factor(), Some(0.2));
}

#[test]
fn time_slow_holds_factor_then_returns_to_normal() {
    let (mut world, ..) = fx_world();
    world.resource_mut::<GlobalFx>().slow_time(0.3, 0.4);

    step(&mut world, 0.1);
    let speed = world.resource::<Time<Virtual>>().relative_speed();
    assert!((speed - 0.3).abs() < 1e-5, "speed {speed}");

    step(&mut world, 0.2);
    let speed = world.resource::<Time<Virtual>>().relative_speed();
    assert!(speed > 0.3 && speed <= 1.0, "speed {speed}");

    for _ in 0..10 {
        step(&mut world, 0.1);
    }
    assert_eq!(world.resource::<Time<Virtual>>().relative_speed(), 1.0);
}

#[test]
fn slow_speed_is_bounded_by_factor_and_one() {
    for i in 0..=20 {
        let fraction = i as f32 / 20.0;
        let s = slow_speed(0.2, fraction);
        assert!((0.2 - 1e-6..=1.0 + 1e-6).contains(&s));
    }
    assert!((slow_speed(0.2, 0.0) - 1.0).abs() < 1e-6);
}

#[test]
fn shake_offset_is_removed_once_finished() {
    let (mut world, cam, ..) = fx_world();
    world.resource_mut::<GlobalFx>().shake(0.05, 0.3);

    step(&mut world, 0.016);
    let shaken = world.get::<Transform>(cam).unwrap().translation;
    assert!(shaken.x != 0.0 || shaken.y != 0.0);
    assert!(shaken.truncate().length() <= 0.3 + 1e-5);

    for _ in 0..10 {
        step(&mut world, 0.016);
    }
    let settled = world.get::<Transform>(cam).unwrap().translation;
    assert!(settled.x.abs() < 1e-5 && settled.y.abs() < 1e-5);
}

#[test]
fn flash_and_edge_overlays_show_then_hide() {
    let (mut world, _, overlay, edge) = fx_world();
    {
        let mut fx = world.resource_mut::<GlobalFx>();
        fx.flash(Color::srgba(0.8, 0.3, 1.0, 0.8), 0.2);
        fx.edge_flash(Color::srgba(1.0, 0.6, 0.2, 0.8), 0.3);
    }

    step(&mut world, 0.05);
    assert_eq!(*world.get::<Visibility>(overlay).unwrap(), Visibility::Visible);
    assert_eq!(*world.get::<Visibility>(edge).unwrap(), Visibility::Visible);
    let alpha = world.get::<Sprite>(overlay).unwrap().color.to_srgba().alpha;
    assert!(alpha > 0.0 && alpha < 0.8);

    step(&mut world, 0.2);
    assert_eq!(*world.get::<Visibility>(overlay).unwrap(), Visibility::Hidden);
    assert_eq!(*world.get::<Visibility>(edge).unwrap(), Visibility::Visible);

    step(&mut world, 0.1);
    assert_eq!(*world.get::<Visibility>(edge).unwrap(), Visibility::Hidden);
}

#[test]
fn ensure_fx_handles_spawns_overlays_once() {
    let mut world = World::new();
    world.insert_resource(FxHandles::default());
    let cam = world
        .spawn((Camera2d, MainCamera { responsiveness: 5.0 }, Transform::default()))
        .id();

    run_system_once(&mut world, ensure_fx_handles);
    run_system_once(&mut world, ensure_fx_handles);

    let handles = *world.resource::<FxHandles>();
    assert_eq!(handles.camera, Some(cam));
    assert_eq!(world.query::<&ScreenFlashOverlay>().iter(&world).count(), 1);
    assert_eq!(world.query::<&EdgeFlashOverlay>().iter(&world).count(), 1);
}
