use crate::motion::{between, pick, EdgePolicy, SceneRng};
use crate::particles::{Behavior, Links, ParticleSet, Population, StepContext};
use crate::surface::{dot, Bounds, Point, Rgba, Surface};
use crate::theme::Palette;

/// Pairs closer than this are joined by a line.
const LINK_DISTANCE: f64 = 100.0;

pub struct Node {
    pos: Point,
    vel: Point,
    size: f64,
    color: Rgba,
}

/// Bouncing dots joined by faint lines to their neighbours.
///
/// The link pass is quadratic, which is why the default count stays at 100.
pub struct Network {
    brand: [Rgba; 3],
}

impl Network {
    pub const POPULATION: Population = Population::Fixed(100);

    pub fn set(palette: Palette, population: Population) -> ParticleSet<Network> {
        ParticleSet::new(
            Network {
                brand: palette.brand,
            },
            population,
        )
        .with_links(Links {
            max_distance: LINK_DISTANCE,
            color: palette.brand[0],
            max_alpha: 0.05,
            width: 0.5,
        })
    }
}

impl Behavior for Network {
    type Entity = Node;

    fn spawn(&self, rng: &mut SceneRng, bounds: Bounds, _: usize, _: usize) -> Node {
        let alpha = between(rng, 0.1, 0.4);
        Node {
            pos: Point::new(between(rng, 0.0, bounds.width), between(rng, 0.0, bounds.height)),
            vel: Point::new(between(rng, -0.25, 0.25), between(rng, -0.25, 0.25)),
            size: between(rng, 1.0, 4.0),
            color: pick(rng, &self.brand).with_alpha(alpha),
        }
    }

    fn step(&self, node: &mut Node, ctx: &StepContext, _: &mut SceneRng) -> bool {
        node.pos.x += node.vel.x;
        node.pos.y += node.vel.y;
        EdgePolicy::Bounce.apply(&mut node.pos, &mut node.vel, ctx.bounds);
        true
    }

    fn draw(&self, node: &Node, surface: &mut dyn Surface) {
        dot(surface, node.pos, node.size, node.color);
    }

    fn position(&self, node: &Node) -> Point {
        node.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCmd, Recorder};
    use crate::theme::Theme;
    use rand::SeedableRng;

    #[test]
    fn nodes_stay_near_bounds() {
        let mut rng = SceneRng::seed_from_u64(6);
        let bounds = Bounds::new(200.0, 150.0);
        let mut set = Network::set(Theme::Light.palette(), Population::Fixed(40));
        set.populate(&mut rng, bounds);
        let ctx = StepContext {
            bounds,
            elapsed: 0.0,
        };
        for _ in 0..5000 {
            set.step(&ctx, &mut rng);
        }
        for node in set.entities() {
            assert!(node.pos.x > -1.0 && node.pos.x < 201.0);
            assert!(node.pos.y > -1.0 && node.pos.y < 151.0);
        }
    }

    #[test]
    fn links_fade_with_distance() {
        let mut rng = SceneRng::seed_from_u64(6);
        let mut set = Network::set(Theme::Light.palette(), Population::Fixed(60));
        set.populate(&mut rng, Bounds::new(300.0, 300.0));
        let mut rec = Recorder::new(Bounds::new(300.0, 300.0));
        set.paint(&mut rec);
        let lines: Vec<(f64, f64)> = rec
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Line { from, to, color, .. } => Some((from.distance(*to), color.a)),
                _ => None,
            })
            .collect();
        assert!(!lines.is_empty());
        for (d, a) in lines {
            assert!(d < LINK_DISTANCE);
            assert!((a - 0.05 * (1.0 - d / LINK_DISTANCE)).abs() < 1e-9);
        }
    }
}
