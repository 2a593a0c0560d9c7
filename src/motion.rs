//! Per-tick building blocks shared by the steppers.

use rand::rngs::StdRng;
use rand::Rng;

use crate::surface::{Bounds, Point, MIN_RADIUS};

/// Random source handed to spawners and steppers.
pub type SceneRng = StdRng;

/// Uniform sample in `[lo, hi)`; a degenerate range yields `lo`.
pub fn between(rng: &mut SceneRng, lo: f64, hi: f64) -> f64 {
    lo + rng.gen::<f64>() * (hi - lo)
}

pub fn pick<T: Copy>(rng: &mut SceneRng, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

/// Sine-driven oscillation around a resting size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Twinkle {
    pub base: f64,
    pub amount: f64,
    pub phase: f64,
    pub speed: f64,
    pub floor: f64,
}

impl Twinkle {
    pub fn new(base: f64, amount: f64, phase: f64, speed: f64) -> Self {
        Self {
            base,
            amount,
            phase,
            speed,
            floor: MIN_RADIUS,
        }
    }

    pub fn with_floor(self, floor: f64) -> Self {
        Self { floor, ..self }
    }

    /// Phase grows without bound; sine takes care of the wrap.
    pub fn advance(&mut self) {
        self.phase += self.speed;
    }

    pub fn wave(&self) -> f64 {
        self.phase.sin()
    }

    pub fn size(&self) -> f64 {
        (self.base + self.wave() * self.amount).max(self.floor.max(MIN_RADIUS))
    }
}

/// What happens when a drifting entity reaches the edge of the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgePolicy {
    /// Reappear on the opposite side once `margin` past the edge.
    Wrap { margin: f64 },
    /// Reverse the velocity component heading out of bounds.
    Bounce,
}

impl EdgePolicy {
    pub fn apply(self, pos: &mut Point, vel: &mut Point, bounds: Bounds) {
        match self {
            EdgePolicy::Wrap { margin } => {
                pos.x = wrap_axis(pos.x, bounds.width, margin);
                pos.y = wrap_axis(pos.y, bounds.height, margin);
            }
            EdgePolicy::Bounce => {
                vel.x = bounce_axis(pos.x, vel.x, bounds.width);
                vel.y = bounce_axis(pos.y, vel.y, bounds.height);
            }
        }
    }
}

fn wrap_axis(v: f64, extent: f64, margin: f64) -> f64 {
    if v < -margin {
        extent + margin
    } else if v > extent + margin {
        -margin
    } else {
        v
    }
}

fn bounce_axis(v: f64, speed: f64, extent: f64) -> f64 {
    if (v < 0.0 && speed < 0.0) || (v > extent && speed > 0.0) {
        -speed
    } else {
        speed
    }
}

/// Smooth 0 -> 1 -> 0 pulse over one period, like a CSS ease-in-out keyframe loop.
pub fn pulse(t: f64, period: f64) -> f64 {
    if period <= 0.0 {
        return 0.0;
    }
    0.5 - 0.5 * (std::f64::consts::TAU * t / period).cos()
}
