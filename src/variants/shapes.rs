use std::f64::consts::TAU;

use crate::motion::{between, pick, EdgePolicy, SceneRng};
use crate::particles::{Behavior, Population, StepContext};
use crate::surface::{rect, safe_radius, with_transform, Bounds, Point, Rgba, Surface};
use crate::theme::Palette;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
}

impl ShapeKind {
    const ALL: [ShapeKind; 3] = [ShapeKind::Circle, ShapeKind::Square, ShapeKind::Triangle];
}

/// Draw `kind` centred on the current origin.
pub(crate) fn draw_shape(surface: &mut dyn Surface, kind: ShapeKind, size: f64, color: Rgba) {
    let half = size / 2.0;
    match kind {
        ShapeKind::Circle => surface.fill_circle(Point::default(), safe_radius(half), color),
        ShapeKind::Square => surface.fill_polygon(&rect(Point::new(-half, -half), size, size), color),
        ShapeKind::Triangle => surface.fill_polygon(
            &[
                Point::new(0.0, -half),
                Point::new(-half, half),
                Point::new(half, half),
            ],
            color,
        ),
    }
}

pub struct FloatingShape {
    pos: Point,
    vel: Point,
    size: f64,
    kind: ShapeKind,
    rotation: f64,
    spin: f64,
    color: Rgba,
}

/// Large, faint shapes drifting and slowly turning; they wrap at the edges.
pub struct Shapes {
    brand: [Rgba; 3],
}

impl Shapes {
    pub const POPULATION: Population = Population::Fixed(15);

    pub fn new(palette: Palette) -> Self {
        Self {
            brand: palette.brand,
        }
    }
}

impl Behavior for Shapes {
    type Entity = FloatingShape;

    fn spawn(&self, rng: &mut SceneRng, bounds: Bounds, _: usize, _: usize) -> FloatingShape {
        let alpha = between(rng, 0.02, 0.07);
        FloatingShape {
            pos: Point::new(between(rng, 0.0, bounds.width), between(rng, 0.0, bounds.height)),
            vel: Point::new(between(rng, -0.1, 0.1), between(rng, -0.1, 0.1)),
            size: between(rng, 20.0, 60.0),
            kind: pick(rng, &ShapeKind::ALL),
            rotation: between(rng, 0.0, TAU),
            spin: between(rng, -0.001, 0.001),
            color: pick(rng, &self.brand).with_alpha(alpha),
        }
    }

    fn step(&self, shape: &mut FloatingShape, ctx: &StepContext, _: &mut SceneRng) -> bool {
        shape.pos.x += shape.vel.x;
        shape.pos.y += shape.vel.y;
        shape.rotation += shape.spin;
        EdgePolicy::Wrap { margin: shape.size }.apply(&mut shape.pos, &mut shape.vel, ctx.bounds);
        true
    }

    fn draw(&self, shape: &FloatingShape, surface: &mut dyn Surface) {
        with_transform(surface, shape.pos, shape.rotation, |s| {
            draw_shape(s, shape.kind, shape.size, shape.color)
        });
    }

    fn position(&self, shape: &FloatingShape) -> Point {
        shape.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCmd, Recorder};
    use crate::theme::Theme;
    use rand::SeedableRng;

    #[test]
    fn wraps_past_margin() {
        let shapes = Shapes::new(Theme::Light.palette());
        let mut shape = FloatingShape {
            pos: Point::new(-29.95, 10.0),
            vel: Point::new(-0.1, 0.0),
            size: 30.0,
            kind: ShapeKind::Square,
            rotation: 0.0,
            spin: 0.0,
            color: Rgba::rgb(147, 51, 234),
        };
        let ctx = StepContext {
            bounds: Bounds::new(200.0, 100.0),
            elapsed: 0.0,
        };
        shapes.step(&mut shape, &ctx, &mut SceneRng::seed_from_u64(0));
        assert_eq!(shape.pos.x, 230.0);
    }

    #[test]
    fn drawn_inside_a_transform() {
        let shapes = Shapes::new(Theme::Light.palette());
        let shape = FloatingShape {
            pos: Point::new(5.0, 5.0),
            vel: Point::default(),
            size: 20.0,
            kind: ShapeKind::Triangle,
            rotation: 1.0,
            spin: 0.0,
            color: Rgba::rgb(59, 130, 246),
        };
        let mut rec = Recorder::new(Bounds::new(10.0, 10.0));
        shapes.draw(&shape, &mut rec);
        assert_eq!(rec.commands().len(), 3);
        assert!(matches!(rec.commands()[1], DrawCmd::Polygon { vertices: 3, .. }));
        assert_eq!(rec.commands()[2], DrawCmd::PopTransform);
    }
}
