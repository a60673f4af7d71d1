mod common;

use bevy::prelude::*;
use eclipse_parry::common::state::GameState;
use eclipse_parry::plugins::eclipse::{EclipseChange, EclipseStack};
use eclipse_parry::plugins::enemies::{spawn::EnemyKind, Enemy};
use eclipse_parry::plugins::health::{DamageRequest, DamageSource, Damageable, Health};
use eclipse_parry::plugins::player::PlayerInput;
use eclipse_parry::plugins::projectiles::messages::SpawnBulletRequest;
use eclipse_parry::plugins::ui::CombatStats;

fn enemy_of_kind(app: &mut App, kind: EnemyKind) -> Entity {
    let world = app.world_mut();
    world
        .query::<(Entity, &EnemyKind)>()
        .iter(world)
        .find(|(_, k)| **k == kind)
        .map(|(e, _)| e)
        .expect("encounter spawns every kind")
}

#[test]
fn release_spends_the_stack_on_nearby_enemies() {
    let mut app = common::app_headless();
    common::run(&mut app, 2);
    let player = common::player(&app);

    let shadow = enemy_of_kind(&mut app, EnemyKind::Shadow);
    app.world_mut().get_mut::<Transform>(shadow).unwrap().translation = Vec3::new(2.0, 0.0, 1.0);

    app.world_mut().write_message(EclipseChange::add(player, 6));
    common::run(&mut app, 3);
    assert_eq!(app.world().get::<EclipseStack>(player).unwrap().current(), 6);

    app.world_mut().resource_mut::<PlayerInput>().release = true;
    common::run(&mut app, 4);

    assert_eq!(app.world().get::<EclipseStack>(player).unwrap().current(), 0);
    assert!(!app.world().get::<Health>(shadow).unwrap().is_alive(), "110 damage kills a 30 hp shadow");
    assert_eq!(app.world().resource::<CombatStats>().releases, 1);
}

#[test]
fn parry_reflects_an_incoming_bullet() {
    let mut app = common::app_headless();
    common::run(&mut app, 2);
    let player = common::player(&app);
    let boss = enemy_of_kind(&mut app, EnemyKind::ChargeMaster);

    app.world_mut().write_message(SpawnBulletRequest {
        pos: Vec2::new(1.5, 0.0),
        direction: Vec2::NEG_X,
        speed: 4.0,
        damage: 15.0,
        owner: Some(boss),
    });
    app.world_mut().resource_mut::<PlayerInput>().parry = true;
    common::run(&mut app, 6);

    assert!(app.world().resource::<CombatStats>().parries >= 1);
    assert_eq!(app.world().get::<Health>(player).unwrap().current(), 100.0);
}

#[test]
fn player_death_ends_the_run_and_clears_the_arena() {
    let mut app = common::app_headless();
    common::run(&mut app, 2);
    let player = common::player(&app);

    app.world_mut().write_message(DamageRequest {
        target: player,
        amount: 1000.0,
        source: DamageSource::Contact,
    });
    // Death grace is 1.5 s; give it comfortably more.
    common::run(&mut app, 150);

    assert_eq!(*app.world().resource::<State<GameState>>().get(), GameState::GameOver);
    let world = app.world_mut();
    assert_eq!(world.query_filtered::<Entity, With<Enemy>>().iter(world).count(), 0);
}
