use std::f64::consts::TAU;

use crate::motion::{between, SceneRng, Twinkle};
use crate::particles::{Behavior, Population, StepContext};
use crate::surface::{dot, glow, Bounds, Point, Rgba, Surface};

pub struct GlitterStar {
    pos: Point,
    twinkle: Twinkle,
}

/// Always-on twinkling stars in the upper sky.
pub struct Glitter {
    ink: Rgba,
}

impl Glitter {
    pub const POPULATION: Population = Population::Fixed(300);
    /// Share of the height stars are scattered over.
    const SKY: f64 = 0.6;

    pub fn new(ink: Rgba) -> Self {
        Self { ink }
    }
}

impl Behavior for Glitter {
    type Entity = GlitterStar;

    fn spawn(&self, rng: &mut SceneRng, bounds: Bounds, _: usize, _: usize) -> GlitterStar {
        GlitterStar {
            pos: Point::new(
                between(rng, 0.0, bounds.width),
                between(rng, 0.0, bounds.height * Self::SKY),
            ),
            twinkle: Twinkle::new(
                between(rng, 0.5, 2.0),
                between(rng, 0.5, 1.0),
                between(rng, 0.0, TAU),
                between(rng, 0.01, 0.06),
            )
            .with_floor(0.1),
        }
    }

    fn step(&self, star: &mut GlitterStar, _: &StepContext, _: &mut SceneRng) -> bool {
        star.twinkle.advance();
        true
    }

    fn draw(&self, star: &GlitterStar, surface: &mut dyn Surface) {
        let size = star.twinkle.size();
        let opacity = 0.3 + star.twinkle.wave() * 0.5;
        glow(surface, star.pos, size * 2.0, self.ink.with_alpha(opacity));
        dot(surface, star.pos, size, self.ink.with_alpha(0.8));
    }

    fn position(&self, star: &GlitterStar) -> Point {
        star.pos
    }
}
