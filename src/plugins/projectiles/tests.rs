//! Projectile tests.
//!
//! Collisions are not produced by the physics pipeline here. We inject
//! `CollisionStart` messages directly and run the resolver once.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::error::ReflectError;
use crate::common::layers::Layer;
use crate::common::test_utils::{drain_messages, ensure_messages, fixed_time_with_delta, run_system_once};
use crate::common::tunables::{ProjectileTunables, Tunables};
use crate::plugins::eclipse::{EclipseChange, LayerChange};
use crate::plugins::health::{DamageRequest, DamageSource};

use super::components::{BulletState, PooledBullet, Projectile};
use super::messages::{BulletReturned, ParriedBulletHit, SpawnBulletRequest};
use super::{allocator, collision, commit, flight, pool};

fn collision_world() -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    ensure_messages::<CollisionStart>(&mut world);
    ensure_messages::<DamageRequest>(&mut world);
    ensure_messages::<EclipseChange>(&mut world);
    ensure_messages::<ParriedBulletHit>(&mut world);
    ensure_messages::<BulletReturned>(&mut world);
    world
}

fn active_bullet(world: &mut World, damage: f32, owner: Option<Entity>) -> Entity {
    let mut projectile = Projectile::default();
    projectile.initialize(Vec2::X, 10.0, damage, 3.0, owner);
    world
        .spawn((
            PooledBullet,
            BulletState::Active,
            projectile,
            Transform::from_xyz(4.0, 0.0, 2.0),
            pool::active_enemy_layers(),
        ))
        .id()
}

fn hit(world: &mut World, bullet: Entity, other: Entity) {
    world.write_message(CollisionStart {
        collider1: bullet,
        collider2: other,
        body1: Some(bullet),
        body2: Some(other),
    });
}

#[test]
fn reflect_is_idempotent() {
    let cfg = ProjectileTunables::default();
    let mut p = Projectile::default();
    p.initialize(Vec2::new(0.0, -1.0), 10.0, 15.0, 3.0, None);

    assert_eq!(p.reflect(Vec2::Y, 4, &cfg), Ok(()));
    let after_first = p.clone();
    assert_eq!(p.reflect(Vec2::X, 9, &cfg), Err(ReflectError::AlreadyParried));

    assert_eq!(p.direction, after_first.direction);
    assert_eq!(p.speed, 15.0);
    assert_eq!(p.parry_strength, 4);
    assert!((p.lifetime.remaining_secs() - 6.0).abs() < 1e-5);
    assert!((p.reflected_damage(&cfg) - 15.0 * 1.4).abs() < 1e-4);
}

#[test]
fn unparryable_bullet_is_left_untouched() {
    let cfg = ProjectileTunables::default();
    let mut p = Projectile::default();
    p.initialize(Vec2::X, 7.0, 10.0, 3.0, None);
    p.can_be_parried = false;

    assert_eq!(p.reflect(-Vec2::X, 2, &cfg), Err(ReflectError::NotParryable));
    assert!(!p.parried);
    assert_eq!(p.velocity(), Vec2::new(7.0, 0.0));
}

#[test]
fn init_bullet_pool_spawns_capacity_bullets_inactive() {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(pool::BulletPool::new(8));

    run_system_once(&mut world, pool::init_bullet_pool);

    assert_eq!(world.resource::<pool::BulletPool>().free_len(), 8);
    let mut q = world.query::<(&PooledBullet, &BulletState, &Visibility, &CollisionLayers, &CollisionEventsEnabled)>();
    assert_eq!(q.iter(&world).count(), 8);
    for (_, state, vis, layers, _) in q.iter(&world) {
        assert_eq!(*state, BulletState::Inactive);
        assert_eq!(*vis, Visibility::Hidden);
        assert_eq!(layers.filters, LayerMask::NONE);
    }
}

#[test]
fn allocate_activates_enemy_bullet_and_commit_recycles_it() {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(pool::BulletPool::new(1));
    ensure_messages::<SpawnBulletRequest>(&mut world);
    run_system_once(&mut world, pool::init_bullet_pool);

    let shooter = world.spawn_empty().id();
    world.write_message(SpawnBulletRequest {
        pos: Vec2::new(1.0, 2.0),
        direction: Vec2::new(0.0, 2.0),
        speed: 4.0,
        damage: 15.0,
        owner: Some(shooter),
    });
    // Second request finds the pool empty and is dropped.
    world.write_message(SpawnBulletRequest {
        pos: Vec2::ZERO,
        direction: Vec2::X,
        speed: 10.0,
        damage: 15.0,
        owner: Some(shooter),
    });
    run_system_once(&mut world, allocator::allocate_bullets_from_pool);

    let (e, state, p, vel, layers) = world
        .query::<(Entity, &BulletState, &Projectile, &LinearVelocity, &CollisionLayers)>()
        .single(&world)
        .unwrap();
    assert_eq!(*state, BulletState::Active);
    assert_eq!(p.owner, Some(shooter));
    assert_eq!(vel.0, Vec2::new(0.0, 4.0));
    assert!(layers.memberships.has_all(Layer::EnemyBullet));
    assert!(layers.filters.has_all(Layer::Player));
    assert!(!layers.filters.has_all(Layer::Enemy));
    assert_eq!(world.resource::<pool::BulletPool>().free_len(), 0);

    *world.get_mut::<BulletState>(e).unwrap() = BulletState::PendingReturn;
    run_system_once(&mut world, commit::return_to_pool_commit);

    assert_eq!(*world.get::<BulletState>(e).unwrap(), BulletState::Inactive);
    assert_eq!(*world.get::<Visibility>(e).unwrap(), Visibility::Hidden);
    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::ZERO);
    assert_eq!(world.get::<Projectile>(e).unwrap().owner, None);
    assert!(world.get::<Transform>(e).unwrap().translation.y < -100.0, "parked off-arena");
    assert_eq!(world.resource::<pool::BulletPool>().free_len(), 1);
}

#[test]
fn steering_reapplies_velocity_until_parried_and_expires() {
    let mut world = World::new();
    let e = world
        .spawn((PooledBullet, BulletState::Active, Projectile::default(), LinearVelocity(Vec2::ZERO)))
        .id();
    world
        .get_mut::<Projectile>(e)
        .unwrap()
        .initialize(Vec2::X, 10.0, 1.0, 1.0, None);

    world.insert_resource(fixed_time_with_delta(0.1));
    run_system_once(&mut world, flight::steer_projectiles);
    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::new(10.0, 0.0));

    world.get_mut::<Projectile>(e).unwrap().parried = true;
    world.get_mut::<LinearVelocity>(e).unwrap().0 = Vec2::new(0.0, -3.0);
    run_system_once(&mut world, flight::steer_projectiles);
    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::new(0.0, -3.0));

    world.insert_resource(fixed_time_with_delta(1.0));
    run_system_once(&mut world, flight::steer_projectiles);
    assert_eq!(*world.get::<BulletState>(e).unwrap(), BulletState::PendingReturn);
}

#[test]
fn enemy_bullet_hitting_player_deals_damage_and_adds_a_layer() {
    let mut world = collision_world();
    let player = world.spawn(CollisionLayers::new(Layer::Player, [Layer::EnemyBullet])).id();
    let bullet = active_bullet(&mut world, 15.0, None);

    hit(&mut world, bullet, player);
    // Duplicate contact in the same run is ignored.
    hit(&mut world, player, bullet);
    run_system_once(&mut world, collision::process_bullet_collisions);

    let dmg = drain_messages::<DamageRequest>(&mut world);
    assert_eq!(dmg.len(), 1);
    assert_eq!(dmg[0].target, player);
    assert_eq!(dmg[0].amount, 15.0);
    assert_eq!(dmg[0].source, DamageSource::Projectile);

    let layers = drain_messages::<EclipseChange>(&mut world);
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].change, LayerChange::Add(1));
    assert_eq!(*world.get::<BulletState>(bullet).unwrap(), BulletState::PendingReturn);
}

#[test]
fn parried_bullet_never_damages_the_player() {
    let mut world = collision_world();
    let player = world.spawn(CollisionLayers::new(Layer::Player, [Layer::EnemyBullet])).id();
    let bullet = active_bullet(&mut world, 15.0, None);
    world.get_mut::<Projectile>(bullet).unwrap().parried = true;

    hit(&mut world, bullet, player);
    run_system_once(&mut world, collision::process_bullet_collisions);

    assert!(drain_messages::<DamageRequest>(&mut world).is_empty());
    assert_eq!(*world.get::<BulletState>(bullet).unwrap(), BulletState::Active);
}

#[test]
fn parried_bullet_hitting_its_shooter_reports_return() {
    let mut world = collision_world();
    let cfg = ProjectileTunables::default();
    let shooter = world.spawn(CollisionLayers::new(Layer::Enemy, [Layer::PlayerBullet])).id();
    let bystander = world.spawn(CollisionLayers::new(Layer::Enemy, [Layer::PlayerBullet])).id();

    let own = active_bullet(&mut world, 10.0, Some(shooter));
    let other = active_bullet(&mut world, 10.0, Some(shooter));
    for b in [own, other] {
        world.get_mut::<Projectile>(b).unwrap().reflect(-Vec2::X, 5, &cfg).unwrap();
    }

    hit(&mut world, own, shooter);
    hit(&mut world, other, bystander);
    run_system_once(&mut world, collision::process_bullet_collisions);

    let dmg = drain_messages::<DamageRequest>(&mut world);
    assert_eq!(dmg.len(), 2);
    assert!(dmg.iter().all(|d| d.source == DamageSource::ReflectedProjectile));
    assert!(dmg.iter().all(|d| (d.amount - 15.0).abs() < 1e-4));

    assert_eq!(drain_messages::<ParriedBulletHit>(&mut world).len(), 2);
    let returned = drain_messages::<BulletReturned>(&mut world);
    assert_eq!(returned.len(), 1);
    assert_eq!(returned[0].shooter, shooter);
    assert_eq!(returned[0].strength, 5);
}

#[test]
fn walls_return_bullets() {
    let mut world = collision_world();
    let wall = world.spawn(CollisionLayers::new(Layer::World, [Layer::EnemyBullet])).id();
    let bullet = active_bullet(&mut world, 10.0, None);

    hit(&mut world, bullet, wall);
    run_system_once(&mut world, collision::process_bullet_collisions);

    assert_eq!(*world.get::<BulletState>(bullet).unwrap(), BulletState::PendingReturn);
    assert!(drain_messages::<DamageRequest>(&mut world).is_empty());
}
