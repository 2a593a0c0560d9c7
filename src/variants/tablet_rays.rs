use std::f64::consts::PI;

use crate::motion::{pulse, SceneRng};
use crate::particles::{Behavior, Population, StepContext};
use crate::surface::{rect, with_transform, Bounds, Point, Rgba, Surface};

const RAY_WIDTH: f64 = 16.0;
const SUNLIGHT: Rgba = Rgba::rgb(253, 224, 71);

pub struct Ray {
    angle: f64,
    period: f64,
    opacity: f64,
}

impl Ray {
    pub fn opacity(&self) -> f64 {
        self.opacity
    }
}

/// Sunlight rays fanning out behind the analytics tablet, each breathing
/// between 0.3 and 0.6 opacity on its own period.
pub struct TabletRays;

impl TabletRays {
    pub const POPULATION: Population = Population::Fixed(12);
}

impl Behavior for TabletRays {
    type Entity = Ray;

    fn spawn(&self, _: &mut SceneRng, _: Bounds, index: usize, total: usize) -> Ray {
        let step = 2.0 * PI / total.max(1) as f64;
        Ray {
            angle: index as f64 * step,
            period: 3.0 + (index % 3) as f64,
            opacity: 0.3,
        }
    }

    fn step(&self, ray: &mut Ray, ctx: &StepContext, _: &mut SceneRng) -> bool {
        ray.opacity = 0.3 + 0.3 * pulse(ctx.elapsed, ray.period);
        true
    }

    fn draw(&self, ray: &Ray, surface: &mut dyn Surface) {
        let bounds = surface.bounds();
        let length = bounds.width.max(bounds.height);
        let peak = SUNLIGHT.with_alpha(0.2 * ray.opacity);
        let clear = SUNLIGHT.with_alpha(0.0);
        // Rays grow from the centre; rotate so "up" points along the ray.
        with_transform(surface, bounds.center(), ray.angle, |s| {
            s.fill_polygon_gradient(
                &rect(Point::new(-RAY_WIDTH / 2.0, -length), RAY_WIDTH, length),
                Point::new(0.0, 0.0),
                Point::new(0.0, -length),
                &[(0.0, clear), (0.5, peak), (1.0, clear)],
            );
        });
    }

    fn position(&self, _: &Ray) -> Point {
        Point::default()
    }
}
