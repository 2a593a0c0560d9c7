use std::f64::consts::PI;

use rand::Rng;

use crate::driver::Scene;
use crate::motion::{between, SceneRng};
use crate::surface::{
    dot, rect, safe_radius, with_transform, Bounds, Point, Rgba, Surface, Viewport,
};

const SKY_TOP: Rgba = Rgba::rgb(0x4A, 0x90, 0xE2);
const SKY_HORIZON: Rgba = Rgba::rgb(0xC4, 0xE0, 0xF9);
const SUN_HALO: Rgba = Rgba::rgb(255, 240, 196);
const WHITE: Rgba = Rgba::rgb(255, 255, 255);
const FAR_RIDGE: Rgba = Rgba::rgb(0x6A, 0x8C, 0xAF);
const NEAR_RIDGE: Rgba = Rgba::rgb(0x2E, 0x5E, 0x3F);
const MIDDLE_RIDGE: Rgba = Rgba::rgb(0x8A, 0xA9, 0xC7);
const GOLD: Rgba = Rgba::rgb(0xDA, 0xA5, 0x20);
const PINE: Rgba = NEAR_RIDGE;
const TRUNK: Rgba = Rgba::rgb(0x5D, 0x40, 0x37);
const RIVER_EDGE: Rgba = Rgba::rgb(0x28, 0x74, 0xA6);
const RIVER_MIDDLE: Rgba = Rgba::rgb(0x5D, 0xAD, 0xE2);
const GRASS: Rgba = Rgba::rgb(0x2E, 0x7D, 0x32);

const SUN_SPIN: f64 = 0.005;
const SUN_RAYS: usize = 12;
const CLOUD_SPEED: f64 = 0.2;
const RIVER_SPEED: f64 = 0.5;
const RIVER_SPARKLES: usize = 20;
const TREES: usize = 30;
const GRASS_PER_BANK: usize = 100;
const BIRDS: usize = 8;
/// Horizon line, as a fraction of the height.
const HORIZON: f64 = 0.7;

/// Cloud anchors as (x, y, size) fractions of the width/height/width.
const CLOUDS: [(f64, f64, f64); 5] = [
    (0.1, 0.15, 0.03),
    (0.3, 0.1, 0.02),
    (0.5, 0.2, 0.025),
    (0.7, 0.15, 0.03),
    (0.9, 0.1, 0.02),
];

/// Tree layout in fractions of the viewport, so a resize rescales it in place.
struct Tree {
    x: f64,
    y: f64,
    height: f64,
    color: Rgba,
}

struct Blade {
    /// Which bank, -1 left or 1 right.
    side: f64,
    dx: f64,
    dy: f64,
    height: f64,
    color: Rgba,
}

struct Bird {
    pos: Point,
    size: f64,
    speed: f64,
    wing: f64,
    wing_dir: f64,
    wing_speed: f64,
}

impl Bird {
    fn spawn(rng: &mut SceneRng, bounds: Bounds) -> Self {
        Bird {
            pos: Point::new(
                between(rng, 0.0, bounds.width),
                between(rng, 0.0, bounds.height * 0.5),
            ),
            size: between(rng, 5.0, 15.0),
            speed: between(rng, 0.5, 1.5),
            wing: 0.0,
            wing_dir: 1.0,
            wing_speed: between(rng, 0.05, 0.15),
        }
    }

    fn step(&mut self, rng: &mut SceneRng, bounds: Bounds) {
        self.pos.x += self.speed;
        if self.pos.x > bounds.width + self.size {
            self.pos = Point::new(
                -self.size * 2.0,
                between(rng, 0.0, bounds.height * 0.5),
            );
        }
        self.wing += self.wing_speed * self.wing_dir;
        if self.wing.abs() > 0.5 {
            self.wing_dir = -self.wing_dir;
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let ink = Rgba::rgb(0, 0, 0).with_alpha(0.7);
        let Point { x, y } = self.pos;
        let s = self.size;
        surface.fill_ellipse(self.pos, s, s / 2.0, ink);
        for side in [-1.0, 1.0] {
            let wing = quadratic(
                Point::new(x + side * s, y),
                Point::new(x + side * s * 2.0, y - s * self.wing),
                Point::new(x + side * s * 3.0, y),
                8,
            );
            surface.fill_polygon(&wing, ink);
        }
    }
}

/// Sample a quadratic Bézier curve into `segments` straight pieces.
fn quadratic(from: Point, control: Point, to: Point, segments: usize) -> Vec<Point> {
    (0..=segments)
        .map(|i| {
            let t = i as f64 / segments as f64;
            let u = 1.0 - t;
            Point::new(
                u * u * from.x + 2.0 * u * t * control.x + t * t * to.x,
                u * u * from.y + 2.0 * u * t * control.y + t * t * to.y,
            )
        })
        .collect()
}

/// Painted valley: sky, spinning sun, drifting clouds, mountains, a forest, a
/// glittering river and a flock of birds.
pub struct Landscape {
    bounds: Bounds,
    rng: SceneRng,
    trees: Vec<Tree>,
    grass: Vec<Blade>,
    birds: Vec<Bird>,
    sparkles: Vec<(Point, f64)>,
    sun_angle: f64,
    cloud_offset: f64,
    river_offset: f64,
}

impl Landscape {
    pub fn new(viewport: Viewport, mut rng: SceneRng) -> Self {
        let bounds = viewport.bounds();
        let trees = (0..TREES)
            .map(|_| {
                let edge = between(&mut rng, 0.0, 0.3);
                Tree {
                    x: if rng.gen_bool(0.5) { edge } else { 1.0 - edge },
                    y: HORIZON - between(&mut rng, 0.0, 0.1),
                    height: between(&mut rng, 0.1, 0.2),
                    color: if rng.gen_bool(0.3) { GOLD } else { PINE },
                }
            })
            .collect();
        let grass = [-1.0, 1.0]
            .into_iter()
            .flat_map(|side| std::iter::repeat(side).take(GRASS_PER_BANK))
            .map(|side| Blade {
                side,
                dx: between(&mut rng, 0.0, 20.0),
                dy: between(&mut rng, 0.0, 20.0),
                height: between(&mut rng, 3.0, 8.0),
                color: if rng.gen_bool(0.3) { GOLD } else { GRASS },
            })
            .collect();
        let birds = (0..BIRDS).map(|_| Bird::spawn(&mut rng, bounds)).collect();
        Self {
            bounds,
            rng,
            trees,
            grass,
            birds,
            sparkles: Vec::new(),
            sun_angle: 0.0,
            cloud_offset: 0.0,
            river_offset: 0.0,
        }
    }

    pub fn sun_angle(&self) -> f64 {
        self.sun_angle
    }

    fn river(&self) -> (f64, f64, f64) {
        let Bounds { width, height } = self.bounds;
        (width * 0.3, height * HORIZON, height * 0.3)
    }

    fn paint_scenery(&self, surface: &mut dyn Surface) {
        let Bounds { width: w, height: h } = self.bounds;

        surface.fill_polygon_gradient(
            &rect(Point::default(), w, h),
            Point::new(0.0, 0.0),
            Point::new(0.0, h),
            &[(0.0, SKY_TOP), (1.0, SKY_HORIZON)],
        );

        let sun = Point::new(w * 0.2, h * 0.2);
        let radius = w * 0.05;
        surface.fill_radial_gradient(
            sun,
            safe_radius(radius * 2.0),
            &[
                (0.0, WHITE),
                (0.2, SUN_HALO.with_alpha(0.8)),
                (1.0, SUN_HALO.with_alpha(0.0)),
            ],
        );
        dot(surface, sun, radius, WHITE.with_alpha(0.9));
        with_transform(surface, sun, self.sun_angle, |s| {
            for i in 1..=SUN_RAYS {
                let a = i as f64 * PI / 6.0;
                let (sin, cos) = a.sin_cos();
                s.stroke_line(
                    Point::new(cos * radius, sin * radius),
                    Point::new(cos * radius * 3.0, sin * radius * 3.0),
                    2.0,
                    WHITE.with_alpha(0.4),
                );
            }
        });

        for (cx, cy, cs) in CLOUDS {
            let size = w * cs;
            let span = w + size * 4.0;
            let x = (w * cx + self.cloud_offset).rem_euclid(span) - size * 2.0;
            cloud(surface, Point::new(x, h * cy), size);
        }

        let ridge = [(0.0, FAR_RIDGE), (1.0, NEAR_RIDGE)];
        let (top, bottom) = (Point::new(0.0, h * 0.3), Point::new(0.0, h * HORIZON));
        let at = |x: f64, y: f64| Point::new(w * x, h * y);
        surface.fill_polygon_gradient(
            &[at(0.0, 0.7), at(0.0, 0.4), at(0.3, 0.3), at(0.5, 0.7)],
            top,
            bottom,
            &ridge,
        );
        surface.fill_polygon_gradient(
            &[at(1.0, 0.7), at(1.0, 0.4), at(0.7, 0.25), at(0.5, 0.7)],
            top,
            bottom,
            &ridge,
        );
        surface.fill_polygon(
            &[at(0.3, 0.7), at(0.3, 0.45), at(0.5, 0.4), at(0.7, 0.45), at(0.7, 0.7)],
            MIDDLE_RIDGE,
        );

        for tree in &self.trees {
            let height = tree.height * h;
            draw_tree(surface, at(tree.x, tree.y), height, height * 0.6, tree.color);
        }

        let (river_w, river_y, river_h) = self.river();
        let (left, right) = (w / 2.0 - river_w / 2.0, w / 2.0 + river_w / 2.0);
        let mut bed = quadratic(
            Point::new(left, river_y),
            Point::new(w / 2.0, river_y + river_h * 0.5),
            Point::new(right, river_y),
            16,
        );
        bed.push(Point::new(right, river_y + river_h));
        bed.push(Point::new(left, river_y + river_h));
        surface.fill_polygon_gradient(
            &bed,
            Point::new(left, river_y),
            Point::new(right, river_y),
            &[(0.0, RIVER_EDGE), (0.5, RIVER_MIDDLE), (1.0, RIVER_EDGE)],
        );

        for blade in &self.grass {
            let x = if blade.side < 0.0 {
                left - blade.dx
            } else {
                right + blade.dx
            };
            let base = Point::new(x, river_y + blade.dy);
            surface.fill_polygon(
                &[base, base.offset(-1.0, -blade.height), base.offset(1.0, 0.0)],
                blade.color,
            );
        }
    }
}

fn cloud(surface: &mut dyn Surface, at: Point, size: f64) {
    let color = WHITE.with_alpha(0.8);
    for (dx, dy, r) in [
        (0.0, 0.0, 1.0),
        (0.5, -0.4, 0.8),
        (1.1, 0.0, 0.9),
        (0.6, 0.4, 0.7),
        (-0.3, 0.2, 0.6),
    ] {
        dot(surface, at.offset(size * dx, size * dy), size * r, color);
    }
}

fn draw_tree(surface: &mut dyn Surface, base: Point, height: f64, width: f64, color: Rgba) {
    surface.fill_polygon(
        &rect(base.offset(-width * 0.1, 0.0), width * 0.2, height * 0.2),
        TRUNK,
    );
    surface.fill_polygon(
        &[
            base.offset(0.0, -height * 0.8),
            base.offset(width * 0.5, 0.0),
            base.offset(-width * 0.5, 0.0),
        ],
        color,
    );
    surface.fill_polygon(
        &[
            base.offset(0.0, -height),
            base.offset(width * 0.4, -height * 0.4),
            base.offset(-width * 0.4, -height * 0.4),
        ],
        color,
    );
}

impl Scene for Landscape {
    fn resize(&mut self, viewport: Viewport) {
        self.bounds = viewport.bounds();
    }

    fn step(&mut self, _now_ms: f64) {
        self.sun_angle += SUN_SPIN;
        self.cloud_offset -= CLOUD_SPEED;
        self.river_offset += RIVER_SPEED;

        let bounds = self.bounds;
        for bird in &mut self.birds {
            bird.step(&mut self.rng, bounds);
        }

        let (river_w, river_y, river_h) = self.river();
        let x0 = bounds.width / 2.0 - river_w / 4.0;
        self.sparkles.clear();
        for _ in 0..RIVER_SPARKLES {
            let x = x0 + between(&mut self.rng, 0.0, river_w / 2.0);
            let y = river_y + between(&mut self.rng, 0.0, river_h);
            let size = between(&mut self.rng, 1.0, 3.0);
            let ripple = (x / 10.0 + self.river_offset).sin() * 5.0;
            self.sparkles.push((Point::new(x, y + ripple), size));
        }
    }

    fn paint(&mut self, surface: &mut dyn Surface) {
        self.paint_scenery(surface);
        for &(at, size) in &self.sparkles {
            dot(surface, at, size, WHITE.with_alpha(0.5));
        }
        for bird in &self.birds {
            bird.draw(surface);
        }
    }

    fn paint_static(&mut self, surface: &mut dyn Surface) -> bool {
        self.paint_scenery(surface);
        for bird in &self.birds {
            bird.draw(surface);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCmd, Recorder};
    use rand::SeedableRng;

    fn valley() -> Landscape {
        Landscape::new(Viewport::new(1280.0, 720.0, 1.0), SceneRng::seed_from_u64(4))
    }

    #[test]
    fn forest_stays_put_between_frames() {
        let mut scene = valley();
        let layout = |s: &Landscape| -> Vec<(f64, f64, f64)> {
            s.trees.iter().map(|t| (t.x, t.y, t.height)).collect()
        };
        let before = layout(&scene);
        scene.step(16.0);
        scene.resize(Viewport::new(640.0, 480.0, 2.0));
        scene.step(32.0);
        assert_eq!(layout(&scene), before);

        let mut rec = Recorder::new(Bounds::new(640.0, 480.0));
        scene.paint(&mut rec);
        let trunks = rec.count(|c| matches!(c, DrawCmd::Polygon { color, .. } if *color == TRUNK));
        assert_eq!(trunks, TREES);
    }

    #[test]
    fn sun_turns_and_sparkles_follow_the_river() {
        let mut scene = valley();
        for i in 0..10 {
            scene.step(i as f64 * 16.0);
        }
        assert!((scene.sun_angle() - 0.05).abs() < 1e-9);
        assert_eq!(scene.sparkles.len(), RIVER_SPARKLES);
        for (p, size) in &scene.sparkles {
            assert!(p.x >= 1280.0 / 2.0 - 1280.0 * 0.3 / 4.0);
            assert!(p.x <= 1280.0 / 2.0 + 1280.0 * 0.3 / 4.0);
            assert!((1.0..=3.0).contains(size));
        }
    }

    #[test]
    fn birds_reenter_from_the_left() {
        let mut scene = valley();
        let bounds = scene.bounds;
        let mut bird = Bird::spawn(&mut scene.rng, bounds);
        bird.pos.x = bounds.width + bird.size;
        bird.step(&mut scene.rng, bounds);
        assert_eq!(bird.pos.x, -bird.size * 2.0);
        assert!(bird.pos.y <= bounds.height * 0.5);
    }

    #[test]
    fn still_frame_has_no_sparkles() {
        let mut scene = valley();
        scene.step(0.0);
        let mut rec = Recorder::new(Bounds::new(1280.0, 720.0));
        assert!(scene.paint_static(&mut rec));
        let glints = rec.count(
            |c| matches!(c, DrawCmd::Circle { color, .. } if *color == WHITE.with_alpha(0.5)),
        );
        assert_eq!(glints, 0);
    }
}
