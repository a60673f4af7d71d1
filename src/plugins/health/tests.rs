use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::test_utils::{drain_messages, ensure_messages, fixed_time_with_delta, run_system_once};
use crate::common::timers::{DeferredAction, TimedTasks};
use crate::common::tunables::Tunables;
use crate::plugins::ui::messages::{palette, DamageAttribution, ShowDamageNumber, ShowHealNumber};
use crate::plugins::visuals::{BaseTint, PlayAnimation};

use super::lifecycle::*;
use super::*;

fn damage_world() -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    ensure_messages::<DamageRequest>(&mut world);
    ensure_messages::<HealRequest>(&mut world);
    ensure_messages::<Damaged>(&mut world);
    ensure_messages::<DamageBlocked>(&mut world);
    ensure_messages::<Died>(&mut world);
    ensure_messages::<ShowDamageNumber>(&mut world);
    ensure_messages::<ShowHealNumber>(&mut world);
    ensure_messages::<PlayAnimation>(&mut world);
    ensure_messages::<RespawnMinionsDue>(&mut world);
    world
}

fn spawn_actor(world: &mut World, max: f32, faction: Faction) -> Entity {
    world
        .spawn((
            Health::new(max),
            faction,
            Transform::from_xyz(1.0, 2.0, 0.0),
            TimedTasks::default(),
        ))
        .id()
}

fn hit(world: &mut World, target: Entity, amount: f32, source: DamageSource) {
    world.write_message(DamageRequest { target, amount, source });
    run_system_once(world, resolve_damage_requests);
}

#[test]
fn damage_is_monotonic_and_clamps_at_zero() {
    let mut h = Health::new(100.0);
    let mut last = h.current();
    for amount in [0.0, 5.0, 12.5, -3.0, 40.0, 80.0] {
        h.take_damage(amount);
        assert!(h.current() <= last);
        assert!(h.current() >= 0.0);
        last = h.current();
    }
    assert_eq!(h.current(), 0.0);
    assert!(!h.is_alive());
}

#[test]
fn death_is_idempotent() {
    let mut h = Health::new(10.0);
    assert_eq!(h.take_damage(25.0), DamageOutcome::Killed { dealt: 10.0 });
    assert_eq!(h.take_damage(5.0), DamageOutcome::Ignored);
    assert!(!h.kill());
    assert_eq!(h.heal(50.0), 0.0);
    assert!(!h.can_take_damage());
}

#[test]
fn gate_blocks_without_changing_state() {
    let mut h = Health::new(50.0);
    h.set_can_take_damage(false);
    let before = h.clone();
    assert_eq!(h.take_damage(20.0), DamageOutcome::Blocked);
    assert_eq!(h, before);

    h.set_can_take_damage(true);
    assert_eq!(h.take_damage(20.0), DamageOutcome::Applied { dealt: 20.0 });
}

#[test]
fn heal_clamps_to_max() {
    let mut h = Health::new(100.0);
    h.take_damage(30.0);
    assert_eq!(h.heal(50.0), 30.0);
    assert_eq!(h.current(), 100.0);
    assert_eq!(h.health_fraction(), 1.0);
}

#[test]
fn player_hit_reports_player_taken_in_red() {
    let mut world = damage_world();
    let player = spawn_actor(&mut world, 100.0, Faction::Player);

    hit(&mut world, player, 15.0, DamageSource::Projectile);

    assert_eq!(world.get::<Health>(player).unwrap().current(), 85.0);
    let numbers = drain_messages::<ShowDamageNumber>(&mut world);
    assert_eq!(numbers.len(), 1);
    assert_eq!(numbers[0].attribution, DamageAttribution::PlayerTaken);
    assert_eq!(numbers[0].color, palette::PLAYER_HIT);
    assert_eq!(numbers[0].position, Vec2::new(1.0, 2.0));
}

#[test]
fn dot_damage_uses_the_same_attribution_path_in_magenta() {
    let mut world = damage_world();
    let player = spawn_actor(&mut world, 100.0, Faction::Player);

    hit(&mut world, player, 2.5, DamageSource::EclipseDot);

    let numbers = drain_messages::<ShowDamageNumber>(&mut world);
    assert_eq!(numbers[0].attribution, DamageAttribution::PlayerTaken);
    assert_eq!(numbers[0].color, palette::ECLIPSE_DOT);
}

#[test]
fn blocked_hit_shows_gray_zero_and_reports_block() {
    let mut world = damage_world();
    let enemy = spawn_actor(&mut world, 40.0, Faction::Enemy);
    world.get_mut::<Health>(enemy).unwrap().set_can_take_damage(false);

    hit(&mut world, enemy, 12.0, DamageSource::ReflectedProjectile);

    assert_eq!(world.get::<Health>(enemy).unwrap().current(), 40.0);
    let blocked = drain_messages::<DamageBlocked>(&mut world);
    assert_eq!(blocked.len(), 1);
    assert_eq!(blocked[0].amount, 12.0);
    let numbers = drain_messages::<ShowDamageNumber>(&mut world);
    assert_eq!(numbers[0].amount, 0.0);
    assert_eq!(numbers[0].color, palette::BLOCKED);
    assert!(drain_messages::<Damaged>(&mut world).is_empty());
}

#[test]
fn killing_blow_writes_died_once() {
    let mut world = damage_world();
    let enemy = spawn_actor(&mut world, 10.0, Faction::Enemy);

    world.write_message(DamageRequest { target: enemy, amount: 8.0, source: DamageSource::Release });
    world.write_message(DamageRequest { target: enemy, amount: 8.0, source: DamageSource::Release });
    world.write_message(DamageRequest { target: enemy, amount: 8.0, source: DamageSource::Release });
    run_system_once(&mut world, resolve_damage_requests);

    let died = drain_messages::<Died>(&mut world);
    assert_eq!(died.len(), 1);
    assert_eq!(died[0].faction, Faction::Enemy);
    let damaged = drain_messages::<Damaged>(&mut world);
    assert_eq!(damaged.len(), 2);
    assert!(damaged[1].killed);
    let numbers = drain_messages::<ShowDamageNumber>(&mut world);
    assert!(numbers.iter().all(|n| n.color == palette::RELEASE_HIT));
}

#[test]
fn self_destruct_bypasses_the_gate() {
    let mut world = damage_world();
    let charger = spawn_actor(&mut world, 40.0, Faction::Enemy);
    world.get_mut::<Health>(charger).unwrap().set_can_take_damage(false);

    hit(&mut world, charger, 0.0, DamageSource::SelfDestruct);

    assert!(!world.get::<Health>(charger).unwrap().is_alive());
    assert_eq!(drain_messages::<Died>(&mut world).len(), 1);
    assert!(drain_messages::<ShowDamageNumber>(&mut world).is_empty());
}

#[test]
fn requests_for_missing_targets_are_dropped() {
    let mut world = damage_world();
    let gone = world.spawn_empty().id();
    world.despawn(gone);

    hit(&mut world, gone, 10.0, DamageSource::Contact);
    assert!(drain_messages::<Damaged>(&mut world).is_empty());
}

#[test]
fn heal_request_shows_restored_amount() {
    let mut world = damage_world();
    let player = spawn_actor(&mut world, 100.0, Faction::Player);
    world.get_mut::<Health>(player).unwrap().take_damage(10.0);

    world.write_message(HealRequest { target: player, amount: 25.0, source: HealSource::Release });
    world.write_message(HealRequest { target: player, amount: 1.0, source: HealSource::Regeneration });
    run_system_once(&mut world, resolve_heal_requests);

    let heals = drain_messages::<ShowHealNumber>(&mut world);
    assert_eq!(heals.len(), 1);
    assert_eq!(heals[0].amount, 10.0);
    assert_eq!(heals[0].color, palette::HEAL);
}

#[test]
fn hit_flash_restores_base_tint_after_timer() {
    let mut world = damage_world();
    let base = Color::srgb(0.2, 0.3, 0.9);
    let enemy = world
        .spawn((
            Health::new(30.0),
            Faction::Enemy,
            Transform::default(),
            Sprite { color: base, ..default() },
            BaseTint(base),
            TimedTasks::default(),
        ))
        .id();

    hit(&mut world, enemy, 5.0, DamageSource::Contact);
    run_system_once(&mut world, flash_on_damage);

    assert_eq!(world.get::<Sprite>(enemy).unwrap().color, Color::WHITE);
    let anims = drain_messages::<PlayAnimation>(&mut world);
    assert_eq!(anims[0].clip, "hit");

    world.insert_resource(fixed_time_with_delta(0.11));
    run_system_once(&mut world, run_timed_tasks);
    assert_eq!(world.get::<Sprite>(enemy).unwrap().color, base);
}

#[test]
fn death_cancels_tasks_disables_collisions_and_schedules_removal() {
    let mut world = damage_world();
    let boss = world
        .spawn((
            Health::new(10.0),
            Faction::Enemy,
            Transform::default(),
            CollisionLayers::new(Layer::Enemy, [Layer::World, Layer::Player]),
            LinearVelocity(Vec2::new(3.0, 0.0)),
            TimedTasks::default(),
        ))
        .id();
    {
        let mut tasks = world.get_mut::<TimedTasks>(boss).unwrap();
        tasks.schedule(0.5, DeferredAction::RespawnMinions);
        tasks.schedule(0.1, DeferredAction::RestoreTint);
    }

    hit(&mut world, boss, 50.0, DamageSource::Release);
    run_system_once(&mut world, handle_deaths);

    assert_eq!(world.get::<CollisionLayers>(boss).unwrap().filters, LayerMask::NONE);
    assert_eq!(world.get::<LinearVelocity>(boss).unwrap().0, Vec2::ZERO);
    let tasks = world.get::<TimedTasks>(boss).unwrap();
    assert!(!tasks.is_scheduled(DeferredAction::RespawnMinions));
    assert!(!tasks.is_scheduled(DeferredAction::RestoreTint));
    assert!(tasks.is_scheduled(DeferredAction::Despawn));
    assert!(world.get::<Dying>(boss).is_some());

    // Grace period: still present, then marked.
    world.insert_resource(fixed_time_with_delta(1.0));
    run_system_once(&mut world, run_timed_tasks);
    assert!(world.get::<PendingDespawn>(boss).is_none());
    world.insert_resource(fixed_time_with_delta(0.6));
    run_system_once(&mut world, run_timed_tasks);
    assert!(world.get::<PendingDespawn>(boss).is_some());
    assert!(drain_messages::<RespawnMinionsDue>(&mut world).is_empty());

    run_system_once(&mut world, despawn_marked);
    assert!(world.get_entity(boss).is_err());
}

#[test]
fn tasks_of_dead_owner_other_than_despawn_are_dropped() {
    let mut world = damage_world();
    let mut health = Health::new(10.0);
    health.kill();
    let mut tasks = TimedTasks::default();
    tasks.schedule(0.1, DeferredAction::RespawnMinions);
    let owner = world.spawn((health, tasks)).id();

    world.insert_resource(fixed_time_with_delta(0.2));
    run_system_once(&mut world, run_timed_tasks);

    assert!(drain_messages::<RespawnMinionsDue>(&mut world).is_empty());
    assert!(world.get::<TimedTasks>(owner).unwrap().is_empty());
}

#[test]
fn dying_fade_shrinks_to_zero() {
    let mut world = World::new();
    let e = world
        .spawn((
            Dying { fade: Timer::from_seconds(0.35, TimerMode::Once) },
            Sprite::default(),
            Transform::default(),
        ))
        .id();

    world.insert_resource(fixed_time_with_delta(0.5));
    run_system_once(&mut world, fade_dying);

    assert_eq!(world.get::<Transform>(e).unwrap().scale, Vec3::ZERO);
}
