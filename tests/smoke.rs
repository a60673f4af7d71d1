mod common;

use bevy::prelude::*;
use eclipse_parry::common::state::GameState;
use eclipse_parry::plugins::enemies::{spawn::EnemyKind, BossBar, Enemy};
use eclipse_parry::plugins::health::Health;
use eclipse_parry::plugins::player::Player;
use eclipse_parry::plugins::projectiles::pool::BulletPool;

#[test]
fn boots_and_ticks() {
    let mut app = common::app_headless();
    common::run(&mut app, 5);

    assert_eq!(*app.world().resource::<State<GameState>>().get(), GameState::InGame);
}

#[test]
fn encounter_is_spawned_on_enter() {
    let mut app = common::app_headless();
    common::run(&mut app, 3);

    let world = app.world_mut();
    assert_eq!(world.query_filtered::<Entity, With<Player>>().iter(world).count(), 1);

    let kinds = world
        .query_filtered::<&EnemyKind, (With<Enemy>, With<Health>)>()
        .iter(world)
        .count();
    assert_eq!(kinds, EnemyKind::ALL.len());
    assert_eq!(world.query::<&BossBar>().iter(world).count(), 4);
    assert!(world.get_resource::<BulletPool>().is_some());
}
