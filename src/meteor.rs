//! Shooting stars: short-lived, accelerating heads dragging a fading trail.

use std::collections::VecDeque;
use std::f64::consts::{PI, TAU};

use rand::Rng;

use crate::motion::{between, SceneRng};
use crate::surface::{dot, glow, Bounds, Point, Rgba, Surface};

pub const MAX_TRAIL: usize = 30;
/// Exponent of the non-linear tail fade.
const TAIL_CURVE: f64 = 0.6;
const TAIL_THINNING: f64 = 0.97;
/// Segments fainter than this are not worth a stroke.
const MIN_SEGMENT_ALPHA: f64 = 0.03;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    pub pos: Point,
    pub alpha: f64,
    pub width: f64,
}

/// Fraction of the viewport a meteor may start in, from the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRegion {
    pub width: f64,
    pub height: f64,
}

impl SpawnRegion {
    pub const TOP_QUARTER: SpawnRegion = SpawnRegion {
        width: 0.8,
        height: 0.25,
    };
    pub const UPPER_SKY: SpawnRegion = SpawnRegion {
        width: 1.0,
        height: 0.6,
    };
}

#[derive(Clone, Debug)]
pub struct Meteor {
    head: Point,
    angle: f64,
    speed: f64,
    acceleration: f64,
    head_size: f64,
    tail_fade: f64,
    flicker_rate: f64,
    flicker_amount: f64,
    flicker_phase: f64,
    color: Rgba,
    max_trail: usize,
    trail: VecDeque<TrailPoint>,
    active: bool,
}

impl Meteor {
    pub fn spawn(rng: &mut SceneRng, bounds: Bounds, region: SpawnRegion, ink: Rgba) -> Self {
        Self {
            head: Point::new(
                between(rng, 0.0, bounds.width * region.width),
                between(rng, 0.0, bounds.height * region.height),
            ),
            // 20 to 80 degrees below the horizon
            angle: between(rng, PI / 9.0, PI / 9.0 + PI / 3.0),
            speed: between(rng, 6.0, 9.0),
            acceleration: between(rng, 0.08, 0.23),
            head_size: between(rng, 1.0, 2.8),
            tail_fade: between(rng, 0.1, 0.15),
            flicker_rate: between(rng, 0.1, 0.3),
            flicker_amount: between(rng, 0.1, 0.3),
            flicker_phase: between(rng, 0.0, TAU),
            color: ink.tint(between(rng, -0.05, 0.05)),
            max_trail: MAX_TRAIL,
            trail: VecDeque::with_capacity(MAX_TRAIL + 1),
            active: true,
        }
    }

    /// Meteor with explicit motion, for callers that need a known path.
    pub fn launch(head: Point, angle: f64, speed: f64, acceleration: f64, ink: Rgba) -> Self {
        Self {
            head,
            angle,
            speed,
            acceleration,
            head_size: 1.5,
            tail_fade: 0.1,
            flicker_rate: 0.2,
            flicker_amount: 0.0,
            flicker_phase: 0.0,
            color: ink,
            max_trail: MAX_TRAIL,
            trail: VecDeque::with_capacity(MAX_TRAIL + 1),
            active: true,
        }
    }

    pub fn with_max_trail(mut self, max_trail: usize) -> Self {
        self.max_trail = max_trail.max(1);
        self
    }

    pub fn step(&mut self, bounds: Bounds, rng: &mut SceneRng) {
        self.speed += self.acceleration;
        self.head.x += self.angle.cos() * self.speed;
        self.head.y += self.angle.sin() * self.speed;

        self.flicker_phase += self.flicker_rate;
        let flicker = 1.0 + self.flicker_phase.sin() * self.flicker_amount;

        self.trail.push_front(TrailPoint {
            pos: self.head,
            alpha: flicker,
            width: self.head_size * rng.gen_range(0.8..1.2) * flicker,
        });
        while self.trail.len() > self.max_trail {
            self.trail.pop_back();
        }

        let max = self.max_trail as f64;
        for (i, point) in self.trail.iter_mut().enumerate() {
            point.alpha = trail_alpha(i, max, self.tail_fade);
            if i > 0 {
                point.width *= TAIL_THINNING;
            }
        }

        self.active = bounds.contains(self.head);
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        for (point, next) in self.trail.iter().zip(self.trail.iter().skip(1)) {
            if point.alpha < MIN_SEGMENT_ALPHA {
                continue;
            }
            surface.stroke_gradient_line(
                point.pos,
                next.pos,
                point.width,
                self.color.with_alpha(point.alpha),
                self.color.with_alpha(next.alpha),
            );
        }

        if let Some(head) = self.trail.front() {
            glow(surface, head.pos, self.head_size * 4.0, self.color.with_alpha(0.4));
            dot(surface, head.pos, self.head_size, self.color.with_alpha(0.95));
            dot(surface, head.pos, self.head_size * 0.5, self.color.with_alpha(1.0));
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn head(&self) -> Point {
        self.head
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn trail(&self) -> &VecDeque<TrailPoint> {
        &self.trail
    }
}

/// Tail fades faster towards its end than near the head.
pub fn trail_alpha(index: usize, max_len: f64, tail_fade: f64) -> f64 {
    let i = index as f64;
    (1.0 - (i / max_len).powf(TAIL_CURVE) - tail_fade * i).max(0.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnPolicy {
    /// One meteor every `every_ms`, optionally only while none is in flight.
    Interval { every_ms: f64, only_when_idle: bool },
    /// Each frame spawn with probability `per_frame` while under `max_active`.
    Chance { per_frame: f64, max_active: usize },
}

/// The active set of meteors plus the rule for adding new ones.
#[derive(Clone, Debug)]
pub struct MeteorShower {
    policy: SpawnPolicy,
    region: SpawnRegion,
    ink: Rgba,
    active: Vec<Meteor>,
    last_spawn_ms: Option<f64>,
}

impl MeteorShower {
    pub fn new(policy: SpawnPolicy, region: SpawnRegion, ink: Rgba) -> Self {
        Self {
            policy,
            region,
            ink,
            active: Vec::new(),
            last_spawn_ms: None,
        }
    }

    pub fn step(&mut self, now_ms: f64, bounds: Bounds, rng: &mut SceneRng) {
        self.maybe_spawn(now_ms, bounds, rng);
        for meteor in &mut self.active {
            meteor.step(bounds, rng);
        }
        self.active.retain(Meteor::is_active);
    }

    fn maybe_spawn(&mut self, now_ms: f64, bounds: Bounds, rng: &mut SceneRng) {
        match self.policy {
            SpawnPolicy::Interval {
                every_ms,
                only_when_idle,
            } => {
                // The interval counts from the first frame, not from page load.
                let last = *self.last_spawn_ms.get_or_insert(now_ms);
                let due = now_ms - last > every_ms;
                if due && (!only_when_idle || self.active.is_empty()) {
                    self.spawn(bounds, rng);
                    self.last_spawn_ms = Some(now_ms);
                }
            }
            SpawnPolicy::Chance {
                per_frame,
                max_active,
            } => {
                if self.active.len() < max_active && rng.gen::<f64>() < per_frame {
                    self.spawn(bounds, rng);
                }
            }
        }
    }

    fn spawn(&mut self, bounds: Bounds, rng: &mut SceneRng) {
        self.active
            .push(Meteor::spawn(rng, bounds, self.region, self.ink));
    }

    pub fn insert(&mut self, meteor: Meteor) {
        self.active.push(meteor);
    }

    pub fn paint(&self, surface: &mut dyn Surface) {
        for meteor in &self.active {
            meteor.draw(surface);
        }
    }

    pub fn active(&self) -> &[Meteor] {
        &self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCmd, Recorder};
    use rand::SeedableRng;

    fn rng() -> SceneRng {
        SceneRng::seed_from_u64(7)
    }

    #[test]
    fn trail_is_capped_fifo() {
        let mut rng = rng();
        let bounds = Bounds::new(1e9, 1e9);
        let mut m = Meteor::launch(Point::new(0.0, 0.0), 0.0, 1.0, 0.0, Rgba::rgb(255, 255, 255))
            .with_max_trail(5);
        for _ in 0..12 {
            m.step(bounds, &mut rng);
            assert!(m.trail().len() <= 5);
        }
        let xs: Vec<f64> = m.trail().iter().map(|p| p.pos.x).collect();
        // Newest first; the seven oldest positions have been dropped.
        assert_eq!(xs, vec![12.0, 11.0, 10.0, 9.0, 8.0]);
    }

    #[test]
    fn speed_only_grows() {
        let mut rng = rng();
        let mut m = Meteor::spawn(
            &mut rng,
            Bounds::new(800.0, 600.0),
            SpawnRegion::TOP_QUARTER,
            Rgba::rgb(0, 0, 0),
        );
        let mut last = m.speed();
        for _ in 0..10 {
            m.step(Bounds::new(1e9, 1e9), &mut rng);
            assert!(m.speed() > last);
            last = m.speed();
        }
    }

    #[test]
    fn tail_alpha_decays_and_bottoms_out() {
        assert_eq!(trail_alpha(0, 30.0, 0.1), 1.0);
        let alphas: Vec<f64> = (0..30).map(|i| trail_alpha(i, 30.0, 0.1)).collect();
        assert!(alphas.windows(2).all(|w| w[1] <= w[0]));
        assert!(alphas.iter().all(|a| *a >= 0.0));
        assert_eq!(alphas[29], 0.0);
    }

    #[test]
    fn leaving_bounds_removes_on_same_update() {
        let mut rng = rng();
        let bounds = Bounds::new(100.0, 100.0);
        let mut shower = MeteorShower::new(
            SpawnPolicy::Chance {
                per_frame: 0.0,
                max_active: 3,
            },
            SpawnRegion::UPPER_SKY,
            Rgba::rgb(0, 0, 0),
        );
        shower.insert(Meteor::launch(Point::new(95.0, 50.0), 0.0, 3.0, 0.0, Rgba::rgb(0, 0, 0)));
        shower.step(0.0, bounds, &mut rng);
        assert_eq!(shower.active().len(), 1);
        assert_eq!(shower.active()[0].head().x, 98.0);
        shower.step(16.0, bounds, &mut rng);
        assert!(shower.active().is_empty());
    }

    #[test]
    fn interval_waits_and_only_spawns_when_idle() {
        let mut rng = rng();
        let bounds = Bounds::new(800.0, 600.0);
        let mut shower = MeteorShower::new(
            SpawnPolicy::Interval {
                every_ms: 5000.0,
                only_when_idle: true,
            },
            SpawnRegion::TOP_QUARTER,
            Rgba::rgb(255, 255, 255),
        );
        shower.step(1000.0, bounds, &mut rng);
        shower.step(5999.0, bounds, &mut rng);
        assert!(shower.active().is_empty());
        shower.step(6001.0, bounds, &mut rng);
        assert_eq!(shower.active().len(), 1);
        shower.step(12_000.0, bounds, &mut rng);
        assert!(shower.active().len() <= 1);
    }

    #[test]
    fn chance_respects_cap() {
        let mut rng = rng();
        let mut shower = MeteorShower::new(
            SpawnPolicy::Chance {
                per_frame: 1.0,
                max_active: 3,
            },
            SpawnRegion::UPPER_SKY,
            Rgba::rgb(0, 0, 0),
        );
        for frame in 0..200 {
            shower.step(frame as f64 * 16.0, Bounds::new(1e6, 1e6), &mut rng);
            assert!(shower.active().len() <= 3);
        }
        assert_eq!(shower.active().len(), 3);
    }

    #[test]
    fn head_glow_radius_positive() {
        let mut rng = rng();
        let mut m = Meteor::spawn(
            &mut rng,
            Bounds::new(800.0, 600.0),
            SpawnRegion::TOP_QUARTER,
            Rgba::rgb(255, 255, 255),
        );
        m.step(Bounds::new(1e9, 1e9), &mut rng);
        m.step(Bounds::new(1e9, 1e9), &mut rng);
        let mut rec = Recorder::new(Bounds::new(800.0, 600.0));
        m.draw(&mut rec);
        assert_eq!(rec.count(|c| matches!(c, DrawCmd::Gradient { .. })), 1);
        assert!(rec.radii().iter().all(|r| *r > 0.0));
    }
}
