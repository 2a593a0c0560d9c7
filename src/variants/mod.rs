//! Concrete backdrops. Each supplies numeric ranges and a draw routine; the
//! particle engine and loop driver do the rest.

mod glitter;
mod image;
mod landscape;
mod light_spots;
mod network;
mod shapes;
mod shooting_stars;
mod sparkle;
mod starfield;
mod tablet_rays;

pub use glitter::Glitter;
pub use image::{cover, ImageBackdrop, Placement};
pub use landscape::Landscape;
pub use light_spots::LightSpots;
pub use network::Network;
pub use shapes::Shapes;
pub use shooting_stars::ShootingStars;
pub use sparkle::Sparkle;
pub use starfield::{FadingStars, Starfield};
pub use tablet_rays::TabletRays;

use crate::config::{BackdropConfig, Variant};
use crate::driver::Scene;
use crate::motion::SceneRng;
use crate::particles::{Behavior, ParticleSet, Population, StepContext};
use crate::surface::{Bounds, Surface, Viewport};
use crate::theme::Theme;

/// Build the scene a canvas asked for, or `None` when its theme gate says the
/// variant stays dark for `theme`.
pub fn build(
    config: &BackdropConfig,
    theme: Theme,
    viewport: Viewport,
    rng: SceneRng,
) -> Option<Box<dyn Scene>> {
    if !config.gate().allows(theme) {
        log::debug!("{} disabled for {} theme", config.variant.name(), theme);
        return None;
    }
    let palette = theme.palette();
    let population = |default: Population| config.population_or(default);

    let scene: Box<dyn Scene> = match config.variant {
        Variant::Starfield => Box::new(Starfield::new(
            theme,
            population(Starfield::population(theme)),
            viewport,
            rng,
        )),
        Variant::Glitter => Box::new(Field::new(
            ParticleSet::new(Glitter::new(palette.ink), population(Glitter::POPULATION)),
            viewport,
            rng,
        )),
        Variant::ShootingStars => Box::new(ShootingStars::new(palette.ink, viewport, rng)),
        Variant::Shapes => Box::new(Field::new(
            ParticleSet::new(Shapes::new(palette), population(Shapes::POPULATION)),
            viewport,
            rng,
        )),
        Variant::LightSpots => Box::new(Field::new(
            ParticleSet::new(LightSpots::new(palette), population(LightSpots::POPULATION)),
            viewport,
            rng,
        )),
        Variant::Network => Box::new(Field::new(
            Network::set(palette, population(Network::POPULATION)),
            viewport,
            rng,
        )),
        Variant::Sparkle => Box::new(Sparkle::new(
            theme,
            population(Sparkle::FLOATERS),
            viewport,
            rng,
        )),
        Variant::Landscape => Box::new(Landscape::new(viewport, rng)),
        Variant::Image => Box::new(ImageBackdrop::new(theme, viewport)),
        Variant::TabletRays => Box::new(Field::new(
            ParticleSet::new(TabletRays, population(TabletRays::POPULATION)),
            viewport,
            rng,
        )),
    };
    Some(scene)
}

/// A scene that is nothing more than one particle set.
pub struct Field<B: Behavior> {
    set: ParticleSet<B>,
    rng: SceneRng,
    bounds: Bounds,
    started: Option<f64>,
}

impl<B: Behavior> Field<B> {
    pub fn new(mut set: ParticleSet<B>, viewport: Viewport, mut rng: SceneRng) -> Self {
        let bounds = viewport.bounds();
        set.populate(&mut rng, bounds);
        Self {
            set,
            rng,
            bounds,
            started: None,
        }
    }

    pub fn set(&self) -> &ParticleSet<B> {
        &self.set
    }
}

impl<B: Behavior> Scene for Field<B> {
    fn resize(&mut self, viewport: Viewport) {
        self.bounds = viewport.bounds();
    }

    fn step(&mut self, now_ms: f64) {
        let ctx = StepContext {
            bounds: self.bounds,
            elapsed: elapsed_secs(&mut self.started, now_ms),
        };
        self.set.step(&ctx, &mut self.rng);
    }

    fn paint(&mut self, surface: &mut dyn Surface) {
        self.set.paint(surface);
    }
}

/// Seconds since the first frame this scene saw.
fn elapsed_secs(started: &mut Option<f64>, now_ms: f64) -> f64 {
    let start = *started.get_or_insert(now_ms);
    ((now_ms - start) / 1000.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{LoopDriver, Start, Tick};
    use crate::surface::{DrawCmd, Recorder};
    use crate::theme::ThemeGate;
    use rand::SeedableRng;

    #[test]
    fn gate_blocks_scene() {
        let config = BackdropConfig::for_variant(Variant::Network);
        let vp = Viewport::new(800.0, 600.0, 1.0);
        assert!(build(&config, Theme::Dark, vp, SceneRng::seed_from_u64(1)).is_none());
        assert!(build(&config, Theme::Light, vp, SceneRng::seed_from_u64(1)).is_some());

        let open = BackdropConfig {
            gate: Some(ThemeGate::Any),
            ..config
        };
        assert!(build(&open, Theme::Dark, vp, SceneRng::seed_from_u64(1)).is_some());
    }

    #[test]
    fn every_variant_survives_frames_and_resize() {
        let vp = Viewport::new(640.0, 480.0, 2.0);
        for variant in Variant::ALL {
            for theme in [Theme::Light, Theme::Dark] {
                let config = BackdropConfig {
                    gate: Some(ThemeGate::Any),
                    ..BackdropConfig::for_variant(variant)
                };
                let mut scene = build(&config, theme, vp, SceneRng::seed_from_u64(3))
                    .expect("gate is open");
                let mut rec = Recorder::layered(vp.bounds());
                for frame in 0..240 {
                    if frame == 120 {
                        scene.resize(Viewport::new(320.0, 900.0, 1.0));
                        rec.resize(Bounds::new(320.0, 900.0));
                    }
                    scene.step(frame as f64 * 16.7);
                    scene.paint(&mut rec);
                }
                let radii = rec.radii();
                assert!(
                    radii.iter().all(|r| *r > 0.0),
                    "{} / {}: non-positive radius",
                    variant.name(),
                    theme
                );
            }
        }
    }

    #[test]
    fn oversized_network_is_held_to_its_limit() {
        let config = BackdropConfig::from_attributes(
            Some("network"),
            Some(r#"{"population":{"fixed":20000}}"#),
        )
        .unwrap();
        let vp = Viewport::new(1920.0, 1080.0, 1.0);
        let mut scene = build(&config, Theme::Light, vp, SceneRng::seed_from_u64(4)).unwrap();
        let mut rec = Recorder::new(vp.bounds());
        scene.step(0.0);
        scene.paint(&mut rec);
        let nodes = rec.count(|c| matches!(c, DrawCmd::Circle { .. }));
        let links = rec.count(|c| matches!(c, DrawCmd::Line { .. }));
        assert_eq!(nodes, 100);
        assert!(links <= 100 * 99 / 2);
    }

    #[test]
    fn zero_population_paints_nothing() {
        let config = BackdropConfig {
            population: Some(Population::Fixed(0)),
            gate: Some(ThemeGate::Any),
            ..BackdropConfig::for_variant(Variant::Network)
        };
        let vp = Viewport::new(800.0, 600.0, 1.0);
        let scene = build(&config, Theme::Light, vp, SceneRng::seed_from_u64(9)).unwrap();
        let mut driver = LoopDriver::new(scene);
        let mut rec = Recorder::new(vp.bounds());
        assert_eq!(driver.start(false, &mut rec), Start::Animate);
        for frame in 0..30 {
            rec.reset();
            assert_eq!(driver.frame(&mut rec, frame as f64 * 16.7), Tick::Continue);
            assert_eq!(rec.commands(), &[DrawCmd::Clear]);
        }
    }
}
