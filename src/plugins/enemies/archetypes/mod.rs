//! Enemy archetypes. Each one is a payload of [`EnemyBrain`](super::brain::EnemyBrain)
//! driven by its own `StateClock`.

pub mod charge_master;
pub mod charger;
pub mod mole;
pub mod rush;
pub mod sentinel;
pub mod shadow;

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::brain::BrainCtx;

/// Where a wandering enemy may pick targets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WanderArea {
    Circle { center: Vec2, radius: f32 },
    Box { center: Vec2, half_extents: Vec2 },
}

impl WanderArea {
    pub fn sample(self, rng: &mut ChaCha8Rng) -> Vec2 {
        match self {
            WanderArea::Circle { center, radius } => {
                let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                // sqrt keeps points uniform over the disc.
                let r = radius.max(0.0) * rng.gen_range(0.0f32..=1.0).sqrt();
                center + Vec2::from_angle(angle) * r
            }
            WanderArea::Box { center, half_extents } => {
                let h = half_extents.abs();
                center
                    + Vec2::new(
                        rng.gen_range(-h.x..=h.x),
                        rng.gen_range(-h.y..=h.y),
                    )
            }
        }
    }
}

/// Patrol target bookkeeping: a new target on arrival or after `retarget_secs`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Wander {
    target: Option<Vec2>,
    since_retarget: f32,
}

impl Wander {
    pub fn reset(&mut self) {
        self.target = None;
        self.since_retarget = 0.0;
    }

    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    /// Advances the patrol and returns the velocity to move with.
    pub fn step(
        &mut self,
        ctx: &mut BrainCtx,
        area: WanderArea,
        speed: f32,
        arrive_distance: f32,
        retarget_secs: f32,
    ) -> Vec2 {
        self.since_retarget += ctx.dt;
        let arrived = self.target.is_some_and(|t| t.distance(ctx.pos) <= arrive_distance);
        if self.target.is_none() || arrived || self.since_retarget >= retarget_secs {
            self.target = Some(area.sample(ctx.rng));
            self.since_retarget = 0.0;
        }
        self.target
            .and_then(|t| (t - ctx.pos).try_normalize())
            .map_or(Vec2::ZERO, |d| d * speed)
    }
}

/// `dir` rotated by a uniform random angle in `[-spread, spread]` degrees.
pub fn jitter(dir: Vec2, spread_degrees: f32, rng: &mut ChaCha8Rng) -> Vec2 {
    let spread = spread_degrees.abs().to_radians();
    if spread == 0.0 {
        return dir;
    }
    Vec2::from_angle(rng.gen_range(-spread..=spread)).rotate(dir)
}
