use bevy::prelude::*;

use crate::common::test_utils::{drain_messages, ensure_messages, run_system_once};
use crate::common::tunables::{ReleaseTunables, Tunables};
use crate::plugins::eclipse::EclipseStack;
use crate::plugins::enemies::Enemy;
use crate::plugins::health::{DamageRequest, DamageSource, HealRequest, Health};
use crate::plugins::player::Player;
use crate::plugins::screen_fx::{EdgeFlash, FlashScreen, ShakeCamera, TimeSlow};
use crate::plugins::visuals::SpawnVisual;

use super::*;

fn release_world(layers: u32) -> (World, Entity) {
    let mut world = World::new();
    let tunables = Tunables::default();
    let mut stack = EclipseStack::new(tunables.eclipse.max_layer);
    stack.add_layers(layers);
    let player = world
        .spawn((Player, Transform::default(), Health::new(100.0), stack))
        .id();
    world.insert_resource(tunables);
    ensure_messages::<ReleaseRequest>(&mut world);
    ensure_messages::<Released>(&mut world);
    ensure_messages::<DamageRequest>(&mut world);
    ensure_messages::<HealRequest>(&mut world);
    ensure_messages::<ShakeCamera>(&mut world);
    ensure_messages::<FlashScreen>(&mut world);
    ensure_messages::<EdgeFlash>(&mut world);
    ensure_messages::<TimeSlow>(&mut world);
    ensure_messages::<SpawnVisual>(&mut world);
    (world, player)
}

fn release(world: &mut World, player: Entity) {
    world.write_message(ReleaseRequest { player });
    run_system_once(world, perform_release);
}

#[test]
fn damage_tiers() {
    let cfg = ReleaseTunables::default();
    assert_eq!(release_damage(0, &cfg), 0.0);
    assert_eq!(release_damage(5, &cfg), 15.0);
    assert_eq!(release_damage(6, &cfg), 110.0);
    assert_eq!(release_damage(8, &cfg), 180.0);
    assert_eq!(release_damage(10, &cfg), 200.0);
    assert!((release_damage(11, &cfg) - 168.0).abs() < 1e-3);
    assert!((release_damage(24, &cfg) - 493.0).abs() < 1e-3);
    assert!((release_damage(25, &cfg) - 525.0).abs() < 1e-3);
}

#[test]
fn damage_keeps_growing_above_the_multiplier_tier() {
    let cfg = ReleaseTunables::default();
    for l in 11..30 {
        assert!(release_damage(l + 1, &cfg) > release_damage(l, &cfg));
    }
}

#[test]
fn heal_doubles_at_twenty_layers() {
    let cfg = ReleaseTunables::default();
    assert!((release_heal(10, 100.0, &cfg) - 30.0).abs() < 1e-4);
    assert!((release_heal(19, 100.0, &cfg) - 57.0).abs() < 1e-4);
    assert!((release_heal(20, 100.0, &cfg) - 120.0).abs() < 1e-4);
}

#[test]
fn effect_tiers_follow_thresholds() {
    let cfg = ReleaseTunables::default();

    let low = release_effects(8, &cfg);
    assert!(low.edge.is_none());
    assert!(low.slow.is_none());
    assert!((low.explosion_scale - 1.4).abs() < 1e-5);

    let mid = release_effects(10, &cfg);
    assert!(mid.edge.is_some());
    assert!(mid.slow.is_none());

    let high = release_effects(25, &cfg);
    assert!(high.edge.is_some());
    let slow = high.slow.unwrap();
    // (25 - 15) / 15 of the way from 0.5 to 0.2.
    assert!((slow.factor - 0.3).abs() < 1e-5);
    assert!(high.shake.magnitude > low.shake.magnitude);
    assert!(high.flash.duration > low.flash.duration);

    let full = release_effects(40, &cfg);
    assert!((full.slow.unwrap().factor - 0.2).abs() < 1e-5);
    assert!((full.shake.duration - 0.45).abs() < 1e-5);
}

#[test]
fn release_at_zero_is_a_no_op() {
    let (mut world, player) = release_world(0);
    world.spawn((Enemy, Transform::from_xyz(1.0, 0.0, 0.0), Health::new(50.0)));
    release(&mut world, player);

    assert!(drain_messages::<DamageRequest>(&mut world).is_empty());
    assert!(drain_messages::<HealRequest>(&mut world).is_empty());
    assert!(drain_messages::<Released>(&mut world).is_empty());
    assert!(drain_messages::<ShakeCamera>(&mut world).is_empty());
    assert_eq!(world.get::<EclipseStack>(player).unwrap().current(), 0);
}

#[test]
fn release_clears_the_stack_with_nobody_in_range() {
    let (mut world, player) = release_world(7);
    world.spawn((Enemy, Transform::from_xyz(10.0, 0.0, 0.0), Health::new(50.0)));
    release(&mut world, player);

    assert!(drain_messages::<DamageRequest>(&mut world).is_empty());
    let heals = drain_messages::<HealRequest>(&mut world);
    assert_eq!(heals.len(), 1);
    assert!((heals[0].amount - 21.0).abs() < 1e-4);
    assert_eq!(world.get::<EclipseStack>(player).unwrap().current(), 0);

    let released = drain_messages::<Released>(&mut world);
    assert_eq!(released.len(), 1);
    assert_eq!(released[0].layers, 7);
    assert_eq!(released[0].enemies_hit, 0);
}

#[test]
fn release_hits_every_live_enemy_in_range_once() {
    let (mut world, player) = release_world(25);
    let a = world.spawn((Enemy, Transform::from_xyz(1.0, 0.0, 0.0), Health::new(50.0))).id();
    let b = world.spawn((Enemy, Transform::from_xyz(0.0, -2.5, 0.0), Health::new(50.0))).id();
    let mut dead = Health::new(50.0);
    dead.kill();
    world.spawn((Enemy, Transform::from_xyz(0.5, 0.0, 0.0), dead));

    // A second request in the same tick finds the stack empty.
    world.write_message(ReleaseRequest { player });
    release(&mut world, player);

    let dmg = drain_messages::<DamageRequest>(&mut world);
    assert_eq!(dmg.len(), 2);
    assert!(dmg.iter().all(|d| d.source == DamageSource::Release));
    assert!(dmg.iter().all(|d| (d.amount - 525.0).abs() < 1e-3));
    let mut targets: Vec<_> = dmg.iter().map(|d| d.target).collect();
    targets.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(targets, expected);

    assert_eq!(drain_messages::<EdgeFlash>(&mut world).len(), 1);
    assert_eq!(drain_messages::<TimeSlow>(&mut world).len(), 1);
    assert_eq!(drain_messages::<FlashScreen>(&mut world).len(), 1);
    let visuals = drain_messages::<SpawnVisual>(&mut world);
    assert_eq!(visuals.len(), 1);
    assert!((visuals[0].scale - 2.25).abs() < 1e-5);
    assert_eq!(drain_messages::<Released>(&mut world).len(), 1);
}

#[test]
fn release_at_eight_skips_edge_flash_and_slow() {
    let (mut world, player) = release_world(8);
    release(&mut world, player);

    assert!(drain_messages::<EdgeFlash>(&mut world).is_empty());
    assert!(drain_messages::<TimeSlow>(&mut world).is_empty());
    assert_eq!(drain_messages::<ShakeCamera>(&mut world).len(), 1);
}
