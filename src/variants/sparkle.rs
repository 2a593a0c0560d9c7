use std::f64::consts::{PI, TAU};

use super::elapsed_secs;
use crate::driver::Scene;
use crate::motion::{between, pick, pulse, SceneRng};
use crate::particles::{Behavior, ParticleSet, Population, StepContext};
use crate::surface::{
    dot, glow, rect, safe_radius, with_transform, Bounds, Point, Rgba, Surface, Viewport,
};
use crate::theme::{Theme, BRAND};
use crate::variants::shapes::{draw_shape, ShapeKind};

/// Ease-in-out position of a looping animation that plays forwards then back.
fn ping_pong(elapsed: f64, delay: f64, duration: f64) -> f64 {
    let t = ((elapsed - delay) / duration.max(f64::EPSILON)).max(0.0) % 2.0;
    let p = if t < 1.0 { t } else { 2.0 - t };
    p * p * (3.0 - 2.0 * p)
}

/// Position within a repeating cycle of `duration`, 0 before `delay` has passed.
fn cycle(elapsed: f64, delay: f64, duration: f64) -> Option<f64> {
    let t = elapsed - delay;
    (t >= 0.0 && duration > 0.0).then(|| t % duration)
}

pub struct Floater {
    anchor: Point,
    drift: Point,
    kind: Option<ShapeKind>,
    size: f64,
    rotation: f64,
    spin: f64,
    duration: f64,
    delay: f64,
    color: Rgba,
    eased: f64,
}

/// Blurred-looking shapes swaying around an anchor point.
pub struct Floaters;

impl Behavior for Floaters {
    type Entity = Floater;

    fn spawn(&self, rng: &mut SceneRng, bounds: Bounds, _: usize, _: usize) -> Floater {
        let y = between(rng, 0.0, 1.0);
        // Band colour follows the vertical position.
        let base = if y < 1.0 / 3.0 {
            BRAND[0]
        } else if y < 2.0 / 3.0 {
            BRAND[2]
        } else {
            BRAND[1]
        };
        let kind = pick(
            rng,
            &[
                Some(ShapeKind::Circle),
                Some(ShapeKind::Square),
                Some(ShapeKind::Triangle),
                None,
            ],
        );
        let size = between(rng, 20.0, 80.0);
        Floater {
            anchor: Point::new(between(rng, 0.0, bounds.width), y * bounds.height),
            drift: Point::new(between(rng, -25.0, 25.0), between(rng, -25.0, 25.0)),
            kind,
            // dots are a quarter of the size
            size: if kind.is_some() { size } else { size / 4.0 },
            rotation: between(rng, 0.0, TAU),
            spin: between(rng, -20.0, 20.0).to_radians(),
            duration: between(rng, 30.0, 50.0),
            delay: between(rng, 0.0, 10.0),
            color: base.with_alpha(between(rng, 0.05, 0.2)),
            eased: 0.0,
        }
    }

    fn step(&self, f: &mut Floater, ctx: &StepContext, _: &mut SceneRng) -> bool {
        f.eased = ping_pong(ctx.elapsed, f.delay, f.duration);
        true
    }

    fn draw(&self, f: &Floater, surface: &mut dyn Surface) {
        let pos = self.position(f);
        match f.kind {
            Some(kind) => with_transform(surface, pos, f.rotation + f.spin * f.eased, |s| {
                draw_shape(s, kind, f.size, f.color)
            }),
            None => glow(surface, pos, f.size, f.color),
        }
    }

    fn position(&self, f: &Floater) -> Point {
        f.anchor.offset(f.drift.x * f.eased, f.drift.y * f.eased)
    }
}

pub struct LightRay {
    x: f64,
    width: f64,
    height: f64,
    rotation: f64,
    peak: f64,
    delay: f64,
    repeat_delay: f64,
    opacity: f64,
}

/// Purple shafts hanging from the top edge, fading in and out.
pub struct LightRays;

impl LightRays {
    const SHOW_SECS: f64 = 8.0;
}

impl Behavior for LightRays {
    type Entity = LightRay;

    fn spawn(&self, rng: &mut SceneRng, bounds: Bounds, _: usize, _: usize) -> LightRay {
        LightRay {
            x: between(rng, 0.0, bounds.width),
            width: between(rng, 0.005, 0.015) * bounds.width,
            height: between(rng, 0.2, 0.5) * bounds.height,
            rotation: between(rng, -30.0, 30.0).to_radians(),
            peak: between(rng, 0.05, 0.15),
            delay: between(rng, 0.0, 5.0),
            repeat_delay: between(rng, 5.0, 10.0),
            opacity: 0.0,
        }
    }

    fn step(&self, ray: &mut LightRay, ctx: &StepContext, _: &mut SceneRng) -> bool {
        ray.opacity = match cycle(ctx.elapsed, ray.delay, Self::SHOW_SECS + ray.repeat_delay) {
            Some(t) if t < Self::SHOW_SECS => ray.peak * (PI * t / Self::SHOW_SECS).sin(),
            _ => 0.0,
        };
        true
    }

    fn draw(&self, ray: &LightRay, surface: &mut dyn Surface) {
        let top = BRAND[0].with_alpha(ray.opacity);
        with_transform(surface, Point::new(ray.x, 0.0), ray.rotation, |s| {
            s.fill_polygon_gradient(
                &rect(Point::new(-ray.width / 2.0, 0.0), ray.width, ray.height),
                Point::new(0.0, 0.0),
                Point::new(0.0, ray.height),
                &[(0.0, top), (1.0, top.with_alpha(0.0))],
            )
        });
    }

    fn is_hidden(&self, ray: &LightRay) -> bool {
        ray.opacity <= 0.0
    }

    fn position(&self, ray: &LightRay) -> Point {
        Point::new(ray.x, 0.0)
    }
}

pub struct Mote {
    origin: Point,
    drift: Point,
    size: f64,
    peak: f64,
    duration: f64,
    delay: f64,
    color: Rgba,
    progress: Option<f64>,
}

/// Tiny specks drifting a few pixels while they fade in and out.
pub struct Motes;

impl Behavior for Motes {
    type Entity = Mote;

    fn spawn(&self, rng: &mut SceneRng, bounds: Bounds, _: usize, _: usize) -> Mote {
        Mote {
            origin: Point::new(between(rng, 0.0, bounds.width), between(rng, 0.0, bounds.height)),
            drift: Point::new(between(rng, -15.0, 15.0), between(rng, -15.0, 15.0)),
            size: between(rng, 0.5, 1.5),
            peak: between(rng, 0.2, 0.5),
            duration: between(rng, 15.0, 40.0),
            delay: between(rng, 0.0, 10.0),
            color: pick(rng, &BRAND).with_alpha(between(rng, 0.05, 0.15)),
            progress: None,
        }
    }

    fn step(&self, m: &mut Mote, ctx: &StepContext, _: &mut SceneRng) -> bool {
        m.progress = cycle(ctx.elapsed, m.delay, m.duration).map(|t| t / m.duration);
        true
    }

    fn draw(&self, m: &Mote, surface: &mut dyn Surface) {
        let p = m.progress.unwrap_or(0.0);
        let opacity = m.peak * (PI * p).sin();
        dot(surface, self.position(m), m.size / 2.0, m.color.scale_alpha(opacity));
    }

    fn is_hidden(&self, m: &Mote) -> bool {
        m.progress.is_none()
    }

    fn position(&self, m: &Mote) -> Point {
        let p = m.progress.unwrap_or(0.0);
        m.origin.offset(m.drift.x * p, m.drift.y * p)
    }
}

pub struct Orb {
    pos: Point,
    size: f64,
    duration: f64,
    delay: f64,
    swell: f64,
}

/// Large, barely visible purple orbs that breathe.
pub struct Orbs;

impl Behavior for Orbs {
    type Entity = Orb;

    fn spawn(&self, rng: &mut SceneRng, bounds: Bounds, _: usize, _: usize) -> Orb {
        Orb {
            pos: Point::new(between(rng, 0.0, bounds.width), between(rng, 0.0, bounds.height)),
            size: between(rng, 150.0, 250.0),
            duration: between(rng, 10.0, 20.0),
            delay: between(rng, 0.0, 5.0),
            swell: 0.0,
        }
    }

    fn step(&self, orb: &mut Orb, ctx: &StepContext, _: &mut SceneRng) -> bool {
        orb.swell = pulse((ctx.elapsed - orb.delay).max(0.0), orb.duration);
        true
    }

    fn draw(&self, orb: &Orb, surface: &mut dyn Surface) {
        let scale = 1.0 + 0.2 * orb.swell;
        let opacity = 0.3 + 0.3 * orb.swell;
        let color = BRAND[0].with_alpha(0.05 * opacity);
        surface.fill_radial_gradient(
            orb.pos,
            safe_radius(orb.size / 2.0 * scale),
            &[(0.0, color), (0.7, color.with_alpha(0.0)), (1.0, color.with_alpha(0.0))],
        );
    }

    fn position(&self, orb: &Orb) -> Point {
        orb.pos
    }
}

pub struct NightStar {
    pos: Point,
    size: f64,
    duration: f64,
    delay: f64,
    opacity: f64,
}

/// White points blinking on and off against the night sky.
pub struct NightStars;

impl Behavior for NightStars {
    type Entity = NightStar;

    fn spawn(&self, rng: &mut SceneRng, bounds: Bounds, _: usize, _: usize) -> NightStar {
        NightStar {
            pos: Point::new(between(rng, 0.0, bounds.width), between(rng, 0.0, bounds.height)),
            size: between(rng, 0.5, 2.0),
            duration: between(rng, 1.0, 3.0),
            delay: between(rng, 0.0, 5.0),
            opacity: 0.0,
        }
    }

    fn step(&self, star: &mut NightStar, ctx: &StepContext, _: &mut SceneRng) -> bool {
        // alternate direction: one full blink takes two durations
        star.opacity = if ctx.elapsed < star.delay {
            0.0
        } else {
            pulse(ctx.elapsed - star.delay, star.duration * 2.0)
        };
        true
    }

    fn draw(&self, star: &NightStar, surface: &mut dyn Surface) {
        dot(surface, star.pos, star.size / 2.0, Rgba::rgb(255, 255, 255).with_alpha(star.opacity));
    }

    fn is_hidden(&self, star: &NightStar) -> bool {
        star.opacity <= 0.0
    }

    fn position(&self, star: &NightStar) -> Point {
        star.pos
    }
}

enum Layers {
    Day {
        rays: ParticleSet<LightRays>,
        floaters: ParticleSet<Floaters>,
        motes: ParticleSet<Motes>,
        orbs: ParticleSet<Orbs>,
    },
    Night {
        stars: ParticleSet<NightStars>,
    },
}

/// Ambient page background: rays, floating shapes, motes and orbs by day,
/// blinking stars by night.
pub struct Sparkle {
    layers: Layers,
    rng: SceneRng,
    bounds: Bounds,
    started: Option<f64>,
}

impl Sparkle {
    /// Floating shapes scale with the viewport but stay few.
    pub const FLOATERS: Population = Population::Density {
        area_per_particle: 50_000.0,
        cap: 15,
    };

    pub fn new(theme: Theme, floaters: Population, viewport: Viewport, mut rng: SceneRng) -> Self {
        let bounds = viewport.bounds();
        let layers = match theme {
            Theme::Light => {
                let mut rays = ParticleSet::new(LightRays, Population::Fixed(8));
                let mut floaters = ParticleSet::new(Floaters, floaters);
                let mut motes = ParticleSet::new(Motes, Population::Fixed(50));
                let mut orbs = ParticleSet::new(Orbs, Population::Fixed(5));
                rays.populate(&mut rng, bounds);
                floaters.populate(&mut rng, bounds);
                motes.populate(&mut rng, bounds);
                orbs.populate(&mut rng, bounds);
                Layers::Day {
                    rays,
                    floaters,
                    motes,
                    orbs,
                }
            }
            Theme::Dark => {
                let mut stars = ParticleSet::new(NightStars, Population::Fixed(100));
                stars.populate(&mut rng, bounds);
                Layers::Night { stars }
            }
        };
        Self {
            layers,
            rng,
            bounds,
            started: None,
        }
    }

    pub fn floater_count(&self) -> usize {
        match &self.layers {
            Layers::Day { floaters, .. } => floaters.len(),
            Layers::Night { .. } => 0,
        }
    }
}

impl Scene for Sparkle {
    fn resize(&mut self, viewport: Viewport) {
        self.bounds = viewport.bounds();
    }

    fn step(&mut self, now_ms: f64) {
        let ctx = StepContext {
            bounds: self.bounds,
            elapsed: elapsed_secs(&mut self.started, now_ms),
        };
        let rng = &mut self.rng;
        match &mut self.layers {
            Layers::Day {
                rays,
                floaters,
                motes,
                orbs,
            } => {
                rays.step(&ctx, rng);
                floaters.step(&ctx, rng);
                motes.step(&ctx, rng);
                orbs.step(&ctx, rng);
            }
            Layers::Night { stars } => {
                stars.step(&ctx, rng);
            }
        }
    }

    fn paint(&mut self, surface: &mut dyn Surface) {
        match &self.layers {
            Layers::Day {
                rays,
                floaters,
                motes,
                orbs,
            } => {
                rays.paint(surface);
                floaters.paint(surface);
                motes.paint(surface);
                orbs.paint(surface);
            }
            Layers::Night { stars } => stars.paint(surface),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Recorder;
    use rand::SeedableRng;

    #[test]
    fn floater_count_follows_area() {
        let small = Sparkle::new(
            Theme::Light,
            Sparkle::FLOATERS,
            Viewport::new(500.0, 400.0, 1.0),
            SceneRng::seed_from_u64(1),
        );
        assert_eq!(small.floater_count(), 4);
        let huge = Sparkle::new(
            Theme::Light,
            Sparkle::FLOATERS,
            Viewport::new(3840.0, 2160.0, 1.0),
            SceneRng::seed_from_u64(1),
        );
        assert_eq!(huge.floater_count(), 15);
    }

    #[test]
    fn ping_pong_returns_to_start() {
        assert_eq!(ping_pong(0.0, 0.0, 10.0), 0.0);
        assert!((ping_pong(10.0, 0.0, 10.0) - 1.0).abs() < 1e-12);
        assert!(ping_pong(20.0, 0.0, 10.0).abs() < 1e-12);
        assert_eq!(ping_pong(3.0, 5.0, 10.0), 0.0);
    }

    #[test]
    fn rays_are_dark_between_shows() {
        let rays = LightRays;
        let mut ray = LightRay {
            x: 10.0,
            width: 5.0,
            height: 100.0,
            rotation: 0.0,
            peak: 0.1,
            delay: 1.0,
            repeat_delay: 6.0,
            opacity: 0.0,
        };
        let mut rng = SceneRng::seed_from_u64(0);
        let at = |elapsed| StepContext {
            bounds: Bounds::new(100.0, 100.0),
            elapsed,
        };
        rays.step(&mut ray, &at(0.5), &mut rng);
        assert!(rays.is_hidden(&ray));
        rays.step(&mut ray, &at(5.0), &mut rng);
        assert!((ray.opacity - 0.1).abs() < 1e-12);
        rays.step(&mut ray, &at(12.0), &mut rng);
        assert!(rays.is_hidden(&ray));
    }

    #[test]
    fn night_sky_only_draws_lit_stars() {
        let mut sparkle = Sparkle::new(
            Theme::Dark,
            Sparkle::FLOATERS,
            Viewport::new(800.0, 600.0, 1.0),
            SceneRng::seed_from_u64(3),
        );
        sparkle.step(0.0);
        let mut rec = Recorder::new(Bounds::new(800.0, 600.0));
        sparkle.paint(&mut rec);
        // nothing has passed its delay on the first frame
        assert!(rec.commands().is_empty());
        sparkle.step(6000.0);
        sparkle.paint(&mut rec);
        assert!(!rec.commands().is_empty());
    }
}
