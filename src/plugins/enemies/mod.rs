//! Enemies: archetype brains, their bodies, contact damage and boss minions.
//!
//! # Tick flow
//! ```text
//!  Intent   track_player_contacts        CollisionStart/End -> ContactState
//!  Think    request_respawn_checks       RespawnMinionsDue -> spawner flag
//!           think_enemies                brain.update + contact hook -> EnemyControl, EnemyActions
//!           drive_enemy_motion           EnemyControl -> RigidBody / LinearVelocity
//!           tick_minion_spawners         poll, sweep, spawn while eligible
//!  React    react_to_hits                Damaged / DamageBlocked / BulletReturned / Died -> brain hooks
//!           apply_enemy_actions          EnemyActions -> messages, telegraphs
//!           boss bars, minion cleanup
//! ```
//!
//! Brains never touch the world; see [`brain`].

pub mod actions;
pub mod archetypes;
pub mod brain;
pub mod contact;
pub mod machine;
pub mod minions;
pub mod spawn;

use avian2d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::time::Fixed;

use crate::common::{rng::GameRng, schedule::CombatSet, state::GameState, tunables::Tunables};
use crate::plugins::eclipse::EclipseChange;
use crate::plugins::health::lifecycle::RespawnMinionsDue;
use crate::plugins::health::{DamageBlocked, DamageRequest, Damageable, Damaged, Died, Health};
use crate::plugins::player::Player;
use crate::plugins::projectiles::messages::{BulletReturned, SpawnBulletRequest};
use crate::plugins::ui::messages::BossHealthBar;
use crate::plugins::visuals::{PlayAnimation, SpawnVisual};

use actions::{EnemyAction, EnemyActions};
use brain::{BrainCtx, EnemyBrain, EnemyControl, EnemySnapshot, PlayerView};
use contact::ContactState;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Enemy;

/// Shown on the boss health bar while alive.
#[derive(Component, Debug, Clone)]
pub struct BossBar {
    pub name: String,
    pub color: Color,
}

#[derive(Message, Clone, Copy, Debug)]
pub struct EnemyStateChanged {
    pub entity: Entity,
    pub from: &'static str,
    pub to: &'static str,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<EnemyActions>()
        .add_message::<EnemyStateChanged>()
        .add_message::<BossHealthBar>()
        .add_message::<CollisionStart>()
        .add_message::<CollisionEnd>()
        .add_message::<DamageRequest>()
        .add_message::<Damaged>()
        .add_message::<DamageBlocked>()
        .add_message::<Died>()
        .add_message::<EclipseChange>()
        .add_message::<SpawnBulletRequest>()
        .add_message::<BulletReturned>()
        .add_message::<SpawnVisual>()
        .add_message::<PlayAnimation>()
        .add_message::<RespawnMinionsDue>()
        .add_systems(OnEnter(GameState::InGame), spawn::spawn_encounter)
        .add_systems(
            FixedUpdate,
            (
                contact::track_player_contacts.in_set(CombatSet::Intent),
                (
                    minions::request_respawn_checks,
                    think_enemies,
                    drive_enemy_motion,
                    minions::tick_minion_spawners,
                )
                    .chain()
                    .in_set(CombatSet::Think),
                (
                    react_to_hits,
                    actions::apply_enemy_actions,
                    show_boss_bars,
                    update_boss_bars,
                    minions::clear_minions_on_boss_death,
                )
                    .chain()
                    .in_set(CombatSet::React),
                (actions::clear_telegraphs_of_dead, log_boss_phases).in_set(CombatSet::Cleanup),
            ),
        );
}

/// Everything a brain call needs besides its own entity.
#[derive(SystemParam)]
pub struct BrainDeps<'w, 's> {
    time: Res<'w, Time<Fixed>>,
    tunables: Res<'w, Tunables>,
    rng: ResMut<'w, GameRng>,
    actions: ResMut<'w, EnemyActions>,
    q_player: Query<'w, 's, (Entity, &'static Transform, &'static Health), (With<Player>, Without<Enemy>)>,
}

impl BrainDeps<'_, '_> {
    #[inline]
    pub fn dt(&self) -> f32 {
        self.time.delta_secs()
    }

    /// The live player, if any.
    pub fn player(&self) -> Option<PlayerView> {
        self.q_player
            .iter()
            .find(|(_, _, h)| h.is_alive())
            .map(|(entity, tf, _)| PlayerView { entity, pos: tf.translation.truncate() })
    }

    pub fn push(&mut self, owner: Entity, action: EnemyAction) {
        self.actions.push(owner, action);
    }

    pub fn with_ctx<R>(
        &mut self,
        me: Entity,
        pos: Vec2,
        others: &[EnemySnapshot],
        control: &mut EnemyControl,
        f: impl FnOnce(&mut BrainCtx) -> R,
    ) -> R {
        let player = self.player();
        let dt = self.dt();
        let mut ctx = BrainCtx {
            me,
            pos,
            dt,
            player,
            others,
            rng: &mut self.rng.rng,
            tunables: &self.tunables.enemies,
            control,
            actions: &mut self.actions,
        };
        f(&mut ctx)
    }
}

pub fn think_enemies(
    mut deps: BrainDeps,
    mut q: Query<
        (
            Entity,
            &Transform,
            &mut EnemyBrain,
            &mut EnemyControl,
            &mut ContactState,
            &mut Health,
        ),
        With<Enemy>,
    >,
    mut others: Local<Vec<EnemySnapshot>>,
) {
    others.clear();
    others.extend(
        q.iter()
            .filter(|(.., health)| health.is_alive())
            .map(|(entity, tf, ..)| EnemySnapshot { entity, pos: tf.translation.truncate() }),
    );

    let dt = deps.dt();
    for (me, tf, mut brain, mut control, mut contact, mut health) in &mut q {
        if !health.is_alive() || control.retired {
            continue;
        }
        contact.tick(dt);

        let behavior = brain.behavior_mut();
        deps.with_ctx(me, tf.translation.truncate(), &others, &mut control, |ctx| {
            behavior.update(ctx);
            if ctx.player.is_some() && contact.ready() && !ctx.control.retired {
                behavior.on_player_collision(ctx);
                contact.arm(behavior.contact_cooldown_secs(ctx.tunables));
            }
        });

        health.set_can_take_damage(control.can_take_damage);
    }
}

/// Immovable enemies become kinematic and stop; everyone else follows the brain.
pub fn drive_enemy_motion(
    mut q: Query<(&EnemyControl, &Health, &mut RigidBody, &mut LinearVelocity), With<Enemy>>,
) {
    for (control, health, mut body, mut velocity) in &mut q {
        if !health.is_alive() {
            continue;
        }
        let wanted = if control.immovable { RigidBody::Kinematic } else { RigidBody::Dynamic };
        if *body != wanted {
            *body = wanted;
        }
        velocity.0 = if control.immovable { Vec2::ZERO } else { control.velocity };
    }
}

pub fn react_to_hits(
    mut deps: BrainDeps,
    mut damaged: MessageReader<Damaged>,
    mut blocked: MessageReader<DamageBlocked>,
    mut returned: MessageReader<BulletReturned>,
    mut died: MessageReader<Died>,
    mut q: Query<(&Transform, &mut EnemyBrain, &mut EnemyControl, &mut Health), With<Enemy>>,
) {
    enum Hit {
        Damaged(f32),
        Blocked(f32),
        Returned(u32),
    }

    let hits = damaged
        .read()
        .filter(|d| !d.killed)
        .map(|d| (d.target, Hit::Damaged(d.amount)))
        .chain(blocked.read().map(|b| (b.target, Hit::Blocked(b.amount))))
        .chain(returned.read().map(|r| (r.shooter, Hit::Returned(r.strength))))
        .collect::<Vec<_>>();

    for (target, hit) in hits {
        let Ok((tf, mut brain, mut control, mut health)) = q.get_mut(target) else {
            continue;
        };
        if !health.is_alive() || control.retired {
            continue;
        }
        let behavior = brain.behavior_mut();
        deps.with_ctx(target, tf.translation.truncate(), &[], &mut control, |ctx| match hit {
            Hit::Damaged(amount) => behavior.on_damaged(ctx, amount),
            Hit::Blocked(amount) => behavior.on_damage_blocked(ctx, amount),
            Hit::Returned(strength) => behavior.on_bullet_returned(ctx, strength),
        });
        health.set_can_take_damage(control.can_take_damage);
    }

    for d in died.read() {
        if q.contains(d.entity) {
            deps.push(d.entity, EnemyAction::ClearTelegraphs);
        }
    }
}

pub fn show_boss_bars(
    q: Query<(Entity, &BossBar, &Health), Added<BossBar>>,
    mut bars: MessageWriter<BossHealthBar>,
) {
    for (owner, bar, health) in &q {
        bars.write(BossHealthBar::Show {
            owner,
            name: bar.name.clone(),
            current: health.current(),
            max: health.max(),
            color: bar.color,
        });
    }
}

pub fn update_boss_bars(
    mut damaged: MessageReader<Damaged>,
    mut died: MessageReader<Died>,
    q: Query<&Health, With<BossBar>>,
    mut bars: MessageWriter<BossHealthBar>,
) {
    for d in damaged.read() {
        if let Ok(health) = q.get(d.target) {
            bars.write(BossHealthBar::Update {
                owner: d.target,
                current: health.current(),
                max: health.max(),
            });
        }
    }
    for d in died.read() {
        if q.contains(d.entity) {
            bars.write(BossHealthBar::Hide { owner: d.entity });
        }
    }
}

pub fn log_boss_phases(
    mut changes: MessageReader<EnemyStateChanged>,
    q: Query<&BossBar>,
) {
    for c in changes.read() {
        if let Ok(bar) = q.get(c.entity) {
            info!("{} {}: {} -> {}", bar.name, c.entity, c.from, c.to);
        }
    }
}
