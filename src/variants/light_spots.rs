use rand::Rng;

use crate::motion::{between, pick, SceneRng};
use crate::particles::{Behavior, Population, StepContext};
use crate::surface::{safe_radius, Bounds, Point, Rgba, Surface};
use crate::theme::Palette;

pub struct LightSpot {
    pos: Point,
    radius: f64,
    max_radius: f64,
    grow_speed: f64,
    growing: bool,
    color: Rgba,
}

impl LightSpot {
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

/// Soft pools of light that swell and shrink, moving on each time they vanish.
pub struct LightSpots {
    brand: [Rgba; 3],
}

impl LightSpots {
    pub const POPULATION: Population = Population::Fixed(10);

    pub fn new(palette: Palette) -> Self {
        Self {
            brand: palette.brand,
        }
    }
}

fn random_point(rng: &mut SceneRng, bounds: Bounds) -> Point {
    Point::new(between(rng, 0.0, bounds.width), between(rng, 0.0, bounds.height))
}

impl Behavior for LightSpots {
    type Entity = LightSpot;

    fn spawn(&self, rng: &mut SceneRng, bounds: Bounds, _: usize, _: usize) -> LightSpot {
        let max_radius = between(rng, 50.0, 200.0);
        let alpha = between(rng, 0.02, 0.07);
        LightSpot {
            pos: random_point(rng, bounds),
            radius: between(rng, 0.0, max_radius),
            max_radius,
            grow_speed: between(rng, 0.1, 0.3),
            growing: rng.gen_bool(0.5),
            color: pick(rng, &self.brand).with_alpha(alpha),
        }
    }

    fn step(&self, spot: &mut LightSpot, ctx: &StepContext, rng: &mut SceneRng) -> bool {
        if spot.growing {
            spot.radius += spot.grow_speed;
            if spot.radius >= spot.max_radius {
                spot.growing = false;
            }
        } else {
            spot.radius -= spot.grow_speed;
            if spot.radius <= 0.0 {
                spot.radius = 0.0;
                spot.growing = true;
                spot.pos = random_point(rng, ctx.bounds);
            }
        }
        true
    }

    fn draw(&self, spot: &LightSpot, surface: &mut dyn Surface) {
        surface.fill_radial_gradient(
            spot.pos,
            safe_radius(spot.radius),
            &[(0.0, spot.color), (1.0, Rgba::rgb(255, 255, 255).with_alpha(0.0))],
        );
    }

    fn position(&self, spot: &LightSpot) -> Point {
        spot.pos
    }
}
