//! Screen-effect collaborator: camera shake, full-screen flash, edge flash and
//! time slow.
//!
//! Gameplay writes the four request messages; `collect_fx_requests` folds them into
//! the single `GlobalFx` resource and `apply_global_fx` is the only writer of the
//! camera shake offset, the overlay sprites and virtual time speed.
//!
//! Timers here tick on real time so they keep running while virtual time is slowed.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy::time::{Real, Virtual};

use crate::common::state::GameState;
use crate::plugins::camera::MainCamera;

#[derive(Message, Clone, Copy, Debug)]
pub struct ShakeCamera {
    pub duration: f32,
    pub magnitude: f32,
}

#[derive(Message, Clone, Copy, Debug)]
pub struct FlashScreen {
    pub color: Color,
    pub duration: f32,
}

#[derive(Message, Clone, Copy, Debug)]
pub struct EdgeFlash {
    pub color: Color,
    pub duration: f32,
}

#[derive(Message, Clone, Copy, Debug)]
pub struct TimeSlow {
    pub factor: f32,
    pub duration: f32,
}

/// Present while a screen-effect consumer is installed.
#[derive(Resource, Debug, Default)]
pub struct ScreenFxAttached;

/// Wall-clock seconds, never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct RealSeconds(f32);

impl RealSeconds {
    #[inline]
    fn new(v: f32) -> Self {
        Self(v.max(0.0))
    }
    #[inline]
    fn get(self) -> f32 {
        self.0
    }
    #[inline]
    fn tick_down(&mut self, dt: f32) {
        self.0 = (self.0 - dt).max(0.0);
    }
    #[inline]
    fn is_positive(self) -> bool {
        self.0 > 0.0
    }
}

/// A timed effect: how long it lasts and how much is left.
#[derive(Clone, Copy, Debug, Default)]
struct Fade {
    remaining: RealSeconds,
    duration: RealSeconds,
}

impl Fade {
    fn start(&mut self, duration: f32) {
        // A weaker request never cuts a running effect short.
        if duration > self.remaining.get() {
            self.remaining = RealSeconds::new(duration);
            self.duration = RealSeconds::new(duration);
        }
    }

    /// 1 at start, 0 when finished.
    fn fraction(&self) -> f32 {
        (self.remaining.get() / self.duration.get().max(0.0001)).clamp(0.0, 1.0)
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct ScreenFlashOverlay;

#[derive(Component, Debug, Clone, Copy)]
pub struct EdgeFlashOverlay;

#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct FxHandles {
    camera: Option<Entity>,
    overlay: Option<Entity>,
    edge: Option<Entity>,
    prev_shake_offset: Vec2,
}

/// Global screen-effect state.
#[derive(Resource, Debug)]
pub struct GlobalFx {
    shake: Fade,
    shake_magnitude: f32,
    shake_phase: f32,

    flash: Fade,
    flash_color: Color,

    edge: Fade,
    edge_color: Color,

    slow: Fade,
    slow_factor: f32,
}

impl Default for GlobalFx {
    fn default() -> Self {
        Self {
            shake: Fade::default(),
            shake_magnitude: 0.0,
            shake_phase: 0.0,
            flash: Fade::default(),
            flash_color: Color::NONE,
            edge: Fade::default(),
            edge_color: Color::NONE,
            slow: Fade::default(),
            slow_factor: 1.0,
        }
    }
}

impl GlobalFx {
    pub fn shake(&mut self, duration: f32, magnitude: f32) {
        self.shake.start(duration);
        self.shake_magnitude = self.shake_magnitude.max(magnitude.max(0.0));
    }

    pub fn flash(&mut self, color: Color, duration: f32) {
        self.flash.start(duration);
        self.flash_color = color;
    }

    pub fn edge_flash(&mut self, color: Color, duration: f32) {
        self.edge.start(duration);
        self.edge_color = color;
    }

    pub fn slow_time(&mut self, factor: f32, duration: f32) {
        let factor = factor.clamp(0.0, 1.0);
        if self.slow.remaining.is_positive() {
            self.slow_factor = self.slow_factor.min(factor);
        } else {
            self.slow_factor = factor;
        }
        self.slow.start(duration);
    }

    pub fn is_idle(&self) -> bool {
        !(self.shake.remaining.is_positive()
            || self.flash.remaining.is_positive()
            || self.edge.remaining.is_positive()
            || self.slow.remaining.is_positive())
    }

    pub fn shake_magnitude(&self) -> f32 {
        if self.shake.remaining.is_positive() { self.shake_magnitude } else { 0.0 }
    }

    pub fn slow_factor(&self) -> Option<f32> {
        self.slow.remaining.is_positive().then_some(self.slow_factor)
    }
}

pub fn plugin(app: &mut App) {
    app.add_message::<ShakeCamera>()
        .add_message::<FlashScreen>()
        .add_message::<EdgeFlash>()
        .add_message::<TimeSlow>()
        .init_resource::<ScreenFxAttached>()
        .init_resource::<GlobalFx>()
        .init_resource::<FxHandles>()
        .add_systems(OnExit(GameState::InGame), reset_fx)
        .add_systems(
            PostUpdate,
            (collect_fx_requests, ensure_fx_handles, apply_global_fx)
                .chain()
                .before(TransformSystems::Propagate)
                .run_if(in_state(GameState::InGame)),
        );
}

fn reset_fx(
    mut fx: ResMut<GlobalFx>,
    mut handles: ResMut<FxHandles>,
    mut virtual_time: ResMut<Time<Virtual>>,
) {
    *fx = GlobalFx::default();
    *handles = FxHandles::default();
    virtual_time.set_relative_speed(1.0);
}

pub fn collect_fx_requests(
    mut fx: ResMut<GlobalFx>,
    mut shakes: MessageReader<ShakeCamera>,
    mut flashes: MessageReader<FlashScreen>,
    mut edges: MessageReader<EdgeFlash>,
    mut slows: MessageReader<TimeSlow>,
) {
    for s in shakes.read() {
        fx.shake(s.duration, s.magnitude);
    }
    for f in flashes.read() {
        fx.flash(f.color, f.duration);
    }
    for e in edges.read() {
        fx.edge_flash(e.color, e.duration);
    }
    for t in slows.read() {
        fx.slow_time(t.factor, t.duration);
    }
}

fn overlay_sprite(size: f32) -> Sprite {
    Sprite {
        color: Color::NONE,
        custom_size: Some(Vec2::splat(size)),
        ..default()
    }
}

/// Cache the camera and spawn both overlays once per InGame session.
pub fn ensure_fx_handles(
    mut commands: Commands,
    mut handles: ResMut<FxHandles>,
    q_main_cam: Query<Entity, With<MainCamera>>,
    q_any_cam: Query<Entity, With<Camera2d>>,
    q_overlay: Query<Entity, With<ScreenFlashOverlay>>,
    q_edge: Query<Entity, With<EdgeFlashOverlay>>,
) {
    if handles.camera.is_none() {
        handles.camera = q_main_cam.single().ok().or_else(|| q_any_cam.iter().next());
    }
    if handles.overlay.is_none() {
        handles.overlay = q_overlay.single().ok().or_else(|| {
            Some(
                commands
                    .spawn((
                        Name::new("ScreenFlashOverlay"),
                        ScreenFlashOverlay,
                        overlay_sprite(500.0),
                        Transform::from_xyz(0.0, 0.0, 900.0),
                        Visibility::Hidden,
                        DespawnOnExit(GameState::InGame),
                    ))
                    .id(),
            )
        });
    }
    if handles.edge.is_none() {
        handles.edge = q_edge.single().ok().or_else(|| {
            Some(
                commands
                    .spawn((
                        Name::new("EdgeFlashOverlay"),
                        EdgeFlashOverlay,
                        overlay_sprite(500.0),
                        Transform::from_xyz(0.0, 0.0, 899.0),
                        Visibility::Hidden,
                        DespawnOnExit(GameState::InGame),
                    ))
                    .id(),
            )
        });
    }
}

/// Quintic ease used for the time-slow recovery tail.
#[inline]
fn smootherstep(x: f32) -> f32 {
    x * x * x * (x * (x * 6.0 - 15.0) + 10.0)
}

/// Virtual time speed for a slow that has `fraction` of its duration left.
/// Holds `factor` for the first half, then eases back to 1.
pub fn slow_speed(factor: f32, fraction: f32) -> f32 {
    let factor = factor.clamp(0.0, 1.0);
    if fraction >= 0.5 {
        return factor;
    }
    let progress = 1.0 - fraction / 0.5;
    factor + (1.0 - factor) * smootherstep(progress)
}

fn fade_alpha(color: Color, fraction: f32) -> Color {
    let base = color.to_srgba().alpha;
    color.with_alpha(base * fraction)
}

pub fn apply_global_fx(
    real_time: Res<Time<Real>>,
    mut virtual_time: ResMut<Time<Virtual>>,
    mut fx: ResMut<GlobalFx>,
    mut handles: ResMut<FxHandles>,
    mut q_cam_tf: Query<
        &mut Transform,
        (With<Camera2d>, Without<ScreenFlashOverlay>, Without<EdgeFlashOverlay>),
    >,
    mut q_overlay: Query<
        (&mut Transform, &mut Sprite, &mut Visibility),
        (With<ScreenFlashOverlay>, Without<Camera2d>, Without<EdgeFlashOverlay>),
    >,
    mut q_edge: Query<
        (&mut Transform, &mut Sprite, &mut Visibility),
        (With<EdgeFlashOverlay>, Without<Camera2d>, Without<ScreenFlashOverlay>),
    >,
) {
    let dt = real_time.delta_secs();

    // Time slow.
    if fx.slow.remaining.is_positive() {
        fx.slow.remaining.tick_down(dt);
        let speed = slow_speed(fx.slow_factor, fx.slow.fraction());
        virtual_time.set_relative_speed(speed);
    } else if virtual_time.relative_speed() != 1.0 {
        virtual_time.set_relative_speed(1.0);
        fx.slow_factor = 1.0;
    }

    let Some(cam_e) = handles.camera else { return; };

    // Camera shake; undo last frame's offset first so the camera never drifts.
    if let Ok(mut cam_tf) = q_cam_tf.get_mut(cam_e) {
        cam_tf.translation.x -= handles.prev_shake_offset.x;
        cam_tf.translation.y -= handles.prev_shake_offset.y;
    }
    handles.prev_shake_offset = Vec2::ZERO;

    if fx.shake.remaining.is_positive() {
        fx.shake.remaining.tick_down(dt);
        fx.shake_phase += dt;
        let amp = fx.shake_magnitude * fx.shake.fraction();

        let x = (fx.shake_phase * 37.0 * std::f32::consts::TAU).sin()
            + 0.5 * (fx.shake_phase * 61.0 * std::f32::consts::TAU).sin();
        let y = (fx.shake_phase * 41.0 * std::f32::consts::TAU).cos()
            + 0.5 * (fx.shake_phase * 53.0 * std::f32::consts::TAU).cos();
        let offset = Vec2::new(x, y).clamp_length_max(1.0) * amp;

        if let Ok(mut cam_tf) = q_cam_tf.get_mut(cam_e) {
            cam_tf.translation.x += offset.x;
            cam_tf.translation.y += offset.y;
            handles.prev_shake_offset = offset;
        }
    } else {
        fx.shake_magnitude = 0.0;
    }

    let cam_pos = q_cam_tf
        .get(cam_e)
        .map(|tf| tf.translation.truncate())
        .unwrap_or_default();

    // Full-screen flash.
    if fx.flash.remaining.is_positive() {
        fx.flash.remaining.tick_down(dt);
    }
    if let Some(overlay) = handles.overlay {
        if let Ok((mut tf, mut sprite, mut vis)) = q_overlay.get_mut(overlay) {
            tf.translation.x = cam_pos.x;
            tf.translation.y = cam_pos.y;
            if fx.flash.remaining.is_positive() {
                *vis = Visibility::Visible;
                sprite.color = fade_alpha(fx.flash_color, fx.flash.fraction());
            } else {
                *vis = Visibility::Hidden;
            }
        }
    }

    // Edge flash.
    if fx.edge.remaining.is_positive() {
        fx.edge.remaining.tick_down(dt);
    }
    if let Some(edge) = handles.edge {
        if let Ok((mut tf, mut sprite, mut vis)) = q_edge.get_mut(edge) {
            tf.translation.x = cam_pos.x;
            tf.translation.y = cam_pos.y;
            if fx.edge.remaining.is_positive() {
                *vis = Visibility::Visible;
                sprite.color = fade_alpha(fx.edge_color, fx.edge.fraction());
            } else {
                *vis = Visibility::Hidden;
            }
        }
    }
}

#[cfg(test)]
mod tests;
