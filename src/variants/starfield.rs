use std::f64::consts::TAU;

use rand::Rng;

use super::elapsed_secs;
use crate::driver::Scene;
use crate::fade::{FadeCycle, FadeState};
use crate::meteor::{MeteorShower, SpawnPolicy, SpawnRegion};
use crate::motion::{between, SceneRng, Twinkle};
use crate::particles::{Behavior, ParticleSet, Population, StepContext};
use crate::surface::{dot, glow, Bounds, Point, Rgba, Surface, Viewport};
use crate::theme::Theme;

/// Stars in one batch share a start delay.
const GROUP_SIZE: usize = 25;
/// Batches are spread over this many seconds.
const STAGGER_SECS: f64 = 10.0;
const METEOR_EVERY_MS: f64 = 5000.0;

pub struct FadingStar {
    pos: Point,
    twinkle: Twinkle,
    opacity: f64,
    color: Rgba,
    fade: FadeCycle,
}

impl FadingStar {
    pub fn fade(&self) -> &FadeCycle {
        &self.fade
    }

    pub fn size(&self) -> f64 {
        self.twinkle.size()
    }
}

/// Stars that fade in, twinkle, fade out and rest, forever.
pub struct FadingStars {
    ink: Rgba,
    glow_factor: f64,
    light: bool,
}

impl FadingStars {
    pub fn new(theme: Theme) -> Self {
        Self {
            ink: theme.palette().ink,
            glow_factor: if theme.is_light() { 2.0 } else { 2.5 },
            light: theme.is_light(),
        }
    }
}

impl Behavior for FadingStars {
    type Entity = FadingStar;

    fn spawn(&self, rng: &mut SceneRng, bounds: Bounds, index: usize, total: usize) -> FadingStar {
        let base = if self.light {
            between(rng, 0.3, 1.0)
        } else {
            between(rng, 0.2, 0.9)
        };
        let groups = total.div_ceil(GROUP_SIZE).max(1);
        let delay = (index / GROUP_SIZE) as f64 / groups as f64 * STAGGER_SECS;
        let state = if rng.gen_bool(0.5) {
            FadeState::Visible
        } else {
            FadeState::Hidden
        };
        FadingStar {
            pos: Point::new(between(rng, 0.0, bounds.width), between(rng, 0.0, bounds.height)),
            twinkle: Twinkle::new(
                base,
                between(rng, 0.1, 0.3),
                between(rng, 0.0, TAU),
                between(rng, 0.01, 0.04),
            ),
            opacity: between(rng, 0.4, 0.8),
            color: self.ink.tint(between(rng, -0.05, 0.05)),
            fade: FadeCycle::new(
                state,
                between(rng, 0.005, 0.015),
                between(rng, 1.0, 3.0),
                between(rng, 2.0, 5.0),
            )
            .delayed(delay),
        }
    }

    fn step(&self, star: &mut FadingStar, ctx: &StepContext, _: &mut SceneRng) -> bool {
        let changed = star.fade.advance(ctx.elapsed);
        if changed && star.fade.state() == FadeState::Visible {
            star.twinkle.advance();
        }
        changed
    }

    fn draw(&self, star: &FadingStar, surface: &mut dyn Surface) {
        let opacity =
            star.opacity * star.fade.opacity_factor() * (0.7 + star.twinkle.wave() * 0.3);
        let size = star.twinkle.size();
        let color = star.color.with_alpha(opacity);
        glow(surface, star.pos, size * self.glow_factor, color);
        dot(surface, star.pos, size * 0.5, color);
    }

    fn is_hidden(&self, star: &FadingStar) -> bool {
        star.fade.is_hidden()
    }

    fn position(&self, star: &FadingStar) -> Point {
        star.pos
    }
}

/// Twinkling starfield with the occasional shooting star.
///
/// Stars are painted into the surface's cached layer and only repainted when one
/// of them changed; the layer is composited every frame.
pub struct Starfield {
    stars: ParticleSet<FadingStars>,
    meteors: MeteorShower,
    rng: SceneRng,
    bounds: Bounds,
    started: Option<f64>,
    dirty: bool,
}

impl Starfield {
    pub fn population(theme: Theme) -> Population {
        Population::Fixed(if theme.is_light() { 450 } else { 350 })
    }

    pub fn new(theme: Theme, population: Population, viewport: Viewport, mut rng: SceneRng) -> Self {
        let bounds = viewport.bounds();
        let mut stars = ParticleSet::new(FadingStars::new(theme), population);
        stars.populate(&mut rng, bounds);
        Self {
            stars,
            meteors: MeteorShower::new(
                SpawnPolicy::Interval {
                    every_ms: METEOR_EVERY_MS,
                    only_when_idle: true,
                },
                SpawnRegion::TOP_QUARTER,
                theme.palette().ink,
            ),
            rng,
            bounds,
            started: None,
            dirty: true,
        }
    }

    pub fn stars(&self) -> &ParticleSet<FadingStars> {
        &self.stars
    }

    pub fn meteors(&self) -> &MeteorShower {
        &self.meteors
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl Scene for Starfield {
    fn resize(&mut self, viewport: Viewport) {
        self.bounds = viewport.bounds();
        self.dirty = true;
    }

    fn step(&mut self, now_ms: f64) {
        let ctx = StepContext {
            bounds: self.bounds,
            elapsed: elapsed_secs(&mut self.started, now_ms),
        };
        self.dirty |= self.stars.step(&ctx, &mut self.rng);
        self.meteors.step(now_ms, self.bounds, &mut self.rng);
    }

    fn paint(&mut self, surface: &mut dyn Surface) {
        let cached = match surface.layer() {
            Some(layer) => {
                if self.dirty {
                    layer.clear();
                    self.stars.paint(layer);
                }
                true
            }
            None => false,
        };
        if cached {
            surface.composite_layer();
        } else {
            self.stars.paint(surface);
        }
        self.dirty = false;
        self.meteors.paint(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCmd, Recorder};
    use rand::SeedableRng;

    fn field(n: usize) -> Starfield {
        Starfield::new(
            Theme::Dark,
            Population::Fixed(n),
            Viewport::new(800.0, 600.0, 1.0),
            SceneRng::seed_from_u64(11),
        )
    }

    #[test]
    fn sizes_stay_positive() {
        let mut sf = field(200);
        for frame in 0..2000 {
            sf.step(frame as f64 * 16.0);
            assert!(sf.stars().entities().iter().all(|s| s.size() >= 0.05));
        }
    }

    #[test]
    fn hidden_stars_are_skipped() {
        let mut sf = field(100);
        sf.step(0.0);
        let visible = sf
            .stars()
            .entities()
            .iter()
            .filter(|s| !s.fade().is_hidden())
            .count();
        let mut rec = Recorder::new(Bounds::new(800.0, 600.0));
        sf.paint(&mut rec);
        // one glow and one core per drawn star
        assert_eq!(rec.count(|c| matches!(c, DrawCmd::Gradient { .. })), visible);
        assert!(visible < 100);
    }

    #[test]
    fn cached_layer_repaints_only_when_dirty() {
        let mut sf = field(10);
        let mut rec = Recorder::layered(Bounds::new(800.0, 600.0));
        sf.paint(&mut rec);
        let first = rec.layer_commands().len();
        assert!(first > 0);
        assert!(!sf.is_dirty());

        // Nothing stepped: the layer is composited but not redrawn.
        rec.reset();
        sf.paint(&mut rec);
        assert!(rec.layer_commands().is_empty());
        assert_eq!(rec.count(|c| *c == DrawCmd::CompositeLayer), 1);

        sf.resize(Viewport::new(400.0, 300.0, 2.0));
        assert!(sf.is_dirty());
        rec.reset();
        sf.paint(&mut rec);
        assert_eq!(rec.layer_commands().first(), Some(&DrawCmd::Clear));
    }

    #[test]
    fn stagger_spreads_groups_over_ten_seconds() {
        let stars = FadingStars::new(Theme::Light);
        let mut rng = SceneRng::seed_from_u64(5);
        let bounds = Bounds::new(100.0, 100.0);
        let mut last = stars.spawn(&mut rng, bounds, 99, 100);
        // The last of four groups waits 7.5 s.
        for _ in 0..10 {
            last.fade.advance(7.4);
        }
        let progress = last.fade.progress();
        let state = last.fade.state();
        last.fade.advance(7.4);
        assert_eq!((last.fade.progress(), last.fade.state()), (progress, state));
        assert!(last.fade.advance(7.5));
    }
}
