//! UI/stats collaborator.
//!
//! The simulation only writes messages (see [`messages`]). This plugin is the default
//! consumer: it keeps combat statistics, the boss bar view model, and a pool of
//! floating damage/heal numbers. Removing it leaves gameplay untouched.

pub mod messages;

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::plugins::parry::BulletParried;
use crate::plugins::release::Released;

use messages::{BossHealthBar, DamageAttribution, EclipseLayersAccumulated, ShowDamageNumber, ShowHealNumber};

const INITIAL_NUMBERS: usize = 20;
const NUMBER_SECS: f32 = 0.8;
const NUMBER_RISE_PER_SEC: f32 = 1.2;

/// Present while a UI consumer is installed.
#[derive(Resource, Debug, Default)]
pub struct UiAttached;

/// Aggregate statistics shown on the results screen.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct CombatStats {
    pub damage_dealt: f32,
    pub player_damage_taken: f32,
    pub blocked_hits: u32,
    pub layers_accumulated: u64,
    pub releases: u32,
    pub parries: u32,
}

impl CombatStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BossBarView {
    pub owner: Entity,
    pub name: String,
    pub current: f32,
    pub max: f32,
    pub color: Color,
}

#[derive(Resource, Debug, Default)]
pub struct BossBarState {
    pub shown: Option<BossBarView>,
}

#[derive(Component, Debug, Clone)]
pub struct FloatingNumber {
    pub amount: f32,
    pub color: Color,
    pub remaining: f32,
}

/// Free list of hidden number entities. Never empty from the caller's point of view:
/// `acquire` spawns a fresh entry when the list runs dry.
#[derive(Resource, Debug, Default)]
pub struct DamageNumberPool {
    pub free: Vec<Entity>,
    pub grown: usize,
}

impl DamageNumberPool {
    pub fn acquire(&mut self, commands: &mut Commands) -> Entity {
        if let Some(e) = self.free.pop() {
            return e;
        }
        self.grown += 1;
        debug!("Damage number pool empty, growing (extra: {})", self.grown);
        spawn_hidden_number(commands)
    }
}

pub fn plugin(app: &mut App) {
    app.add_message::<ShowDamageNumber>()
        .add_message::<ShowHealNumber>()
        .add_message::<BossHealthBar>()
        .add_message::<EclipseLayersAccumulated>()
        .init_resource::<UiAttached>()
        .init_resource::<CombatStats>()
        .init_resource::<BossBarState>()
        .init_resource::<DamageNumberPool>()
        .add_systems(OnEnter(GameState::InGame), (reset_stats, init_damage_number_pool))
        .add_systems(
            Update,
            (
                record_stats,
                apply_boss_bar,
                show_numbers,
                float_numbers.after(show_numbers),
            ),
        );
}

fn spawn_hidden_number(commands: &mut Commands) -> Entity {
    commands
        .spawn((
            Name::new("DamageNumber(Pooled)"),
            FloatingNumber { amount: 0.0, color: Color::WHITE, remaining: 0.0 },
            Transform::from_xyz(0.0, 0.0, 20.0),
            Visibility::Hidden,
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

fn reset_stats(mut stats: ResMut<CombatStats>, mut bar: ResMut<BossBarState>) {
    stats.reset();
    bar.shown = None;
}

pub fn init_damage_number_pool(mut commands: Commands, mut pool: ResMut<DamageNumberPool>) {
    pool.free.clear();
    pool.grown = 0;
    for _ in 0..INITIAL_NUMBERS {
        let e = spawn_hidden_number(&mut commands);
        pool.free.push(e);
    }
}

pub fn record_stats(
    mut stats: ResMut<CombatStats>,
    mut damage: MessageReader<ShowDamageNumber>,
    mut layers: MessageReader<EclipseLayersAccumulated>,
    mut releases: MessageReader<Released>,
    mut parries: MessageReader<BulletParried>,
) {
    for n in damage.read() {
        match n.attribution {
            DamageAttribution::PlayerTaken => stats.player_damage_taken += n.amount,
            DamageAttribution::Dealt => stats.damage_dealt += n.amount,
            DamageAttribution::Blocked => stats.blocked_hits += 1,
        }
    }
    for l in layers.read() {
        stats.layers_accumulated += u64::from(l.0);
    }
    stats.releases += releases.read().count() as u32;
    stats.parries += parries.read().count() as u32;
}

pub fn apply_boss_bar(mut bar: ResMut<BossBarState>, mut msgs: MessageReader<BossHealthBar>) {
    for msg in msgs.read() {
        match msg {
            BossHealthBar::Show { owner, name, current, max, color } => {
                bar.shown = Some(BossBarView {
                    owner: *owner,
                    name: name.clone(),
                    current: *current,
                    max: *max,
                    color: *color,
                });
            }
            BossHealthBar::Update { owner, current, max } => {
                if let Some(view) = bar.shown.as_mut().filter(|v| v.owner == *owner) {
                    view.current = *current;
                    view.max = *max;
                }
            }
            BossHealthBar::Hide { owner } => {
                if bar.shown.as_ref().is_some_and(|v| v.owner == *owner) {
                    bar.shown = None;
                }
            }
        }
    }
}

pub fn show_numbers(
    mut commands: Commands,
    mut pool: ResMut<DamageNumberPool>,
    mut damage: MessageReader<ShowDamageNumber>,
    mut heals: MessageReader<ShowHealNumber>,
) {
    let requests = damage
        .read()
        .map(|d| (d.position, d.amount, d.color))
        .chain(heals.read().map(|h| (h.position, h.amount, h.color)))
        .collect::<Vec<_>>();

    for (position, amount, color) in requests {
        let e = pool.acquire(&mut commands);
        commands.entity(e).insert((
            FloatingNumber { amount, color, remaining: NUMBER_SECS },
            Transform::from_translation(position.extend(20.0)),
            Visibility::Visible,
        ));
    }
}

pub fn float_numbers(
    real_time: Res<Time<Real>>,
    mut pool: ResMut<DamageNumberPool>,
    mut q: Query<(Entity, &mut FloatingNumber, &mut Transform, &mut Visibility)>,
) {
    let dt = real_time.delta_secs();
    for (e, mut n, mut tf, mut vis) in &mut q {
        if n.remaining <= 0.0 {
            continue;
        }
        n.remaining = (n.remaining - dt).max(0.0);
        tf.translation.y += NUMBER_RISE_PER_SEC * dt;
        let alpha = (n.remaining / NUMBER_SECS).clamp(0.0, 1.0);
        n.color = n.color.with_alpha(alpha);

        if n.remaining <= 0.0 {
            *vis = Visibility::Hidden;
            pool.free.push(e);
        }
    }
}
