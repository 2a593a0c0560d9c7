//! Whole scenes driven through the loop driver against a recording surface.

use backdrop_wasm::driver::{LoopDriver, LoopState, Start, Tick};
use backdrop_wasm::motion::SceneRng;
use backdrop_wasm::surface::{Bounds, DrawCmd, Recorder, Viewport};
use backdrop_wasm::theme::{Theme, ThemeGate};
use backdrop_wasm::variants;
use backdrop_wasm::{BackdropConfig, Variant};
use rand::SeedableRng;

fn driver(variant: Variant, theme: Theme, viewport: Viewport) -> Option<LoopDriver> {
    let config = BackdropConfig::for_variant(variant);
    variants::build(&config, theme, viewport, SceneRng::seed_from_u64(42)).map(LoopDriver::new)
}

#[test]
fn backing_store_follows_pixel_ratio() {
    assert_eq!(Viewport::new(1280.0, 720.0, 2.0).backing_size(), (2560, 1440));
    assert_eq!(Viewport::new(333.3, 100.0, 1.5).backing_size(), (500, 150));
    // Broken ratios fall back to 1 and empty windows still get one pixel.
    assert_eq!(Viewport::new(800.0, 600.0, f64::NAN).backing_size(), (800, 600));
    assert_eq!(Viewport::new(0.0, 0.0, 0.0).backing_size(), (1, 1));
    assert_eq!(
        Viewport::new(1280.0, 720.0, 3.0).bounds(),
        Bounds::new(1280.0, 720.0)
    );
}

#[test]
fn starfield_runs_in_both_themes() {
    let vp = Viewport::new(1024.0, 768.0, 1.0);
    for theme in [Theme::Light, Theme::Dark] {
        let mut d = driver(Variant::Starfield, theme, vp).expect("starfield is never gated");
        let mut rec = Recorder::layered(vp.bounds());
        assert_eq!(d.start(false, &mut rec), Start::Animate);
        for frame in 0..600 {
            rec.reset();
            assert_eq!(d.frame(&mut rec, frame as f64 * 16.0), Tick::Continue);
            assert_eq!(rec.commands().first(), Some(&DrawCmd::Clear));
            assert_eq!(rec.count(|c| *c == DrawCmd::CompositeLayer), 1);
        }
        assert!(rec.radii().iter().all(|r| *r > 0.0));
    }
}

#[test]
fn light_only_variants_stay_dark_at_night() {
    let vp = Viewport::new(800.0, 600.0, 1.0);
    for variant in Variant::ALL {
        let built = driver(variant, Theme::Dark, vp).is_some();
        assert_eq!(
            built,
            variant.default_gate() != ThemeGate::LightOnly,
            "{}",
            variant.name()
        );
    }
}

#[test]
fn reduced_motion_landscape_is_a_still() {
    let vp = Viewport::new(800.0, 600.0, 1.0);
    let mut d = driver(Variant::Landscape, Theme::Light, vp).unwrap();
    let mut rec = Recorder::new(vp.bounds());
    assert_eq!(d.start(true, &mut rec), Start::StaticFrame);
    assert_eq!(d.state(), LoopState::Static);
    assert!(rec.commands().len() > 1);

    rec.reset();
    assert_eq!(d.frame(&mut rec, 16.0), Tick::Halt);
    assert!(rec.commands().is_empty());

    // A resize repaints the still at the new size.
    rec.resize(Bounds::new(400.0, 300.0));
    d.resize(Viewport::new(400.0, 300.0, 1.0), &mut rec);
    assert_eq!(rec.commands().first(), Some(&DrawCmd::Clear));
}

#[test]
fn reduced_motion_image_shows_once_loaded() {
    let vp = Viewport::new(800.0, 600.0, 1.0);
    let mut d = driver(Variant::Image, Theme::Dark, vp).expect("image runs in both themes");
    let mut loading = Recorder::new(vp.bounds());
    assert_eq!(d.start(true, &mut loading), Start::StaticFrame);
    assert_eq!(loading.commands(), &[DrawCmd::Clear]);

    // The load event refits like a resize and the still now carries the picture.
    let mut loaded = Recorder::new(vp.bounds()).with_picture(1920.0, 1080.0);
    d.resize(vp, &mut loaded);
    assert_eq!(
        loaded.count(|c| matches!(c, DrawCmd::Picture { .. })),
        1
    );
    assert_eq!(d.frame(&mut loaded, 16.0), Tick::Halt);
}

#[test]
fn reduced_motion_glitter_draws_nothing() {
    let vp = Viewport::new(800.0, 600.0, 1.0);
    let mut d = driver(Variant::Glitter, Theme::Light, vp).unwrap();
    let mut rec = Recorder::new(vp.bounds());
    assert_eq!(d.start(true, &mut rec), Start::Skip);
    assert_eq!(d.frame(&mut rec, 0.0), Tick::Halt);
    assert_eq!(rec.commands(), &[DrawCmd::Clear]);
}

#[test]
fn stop_freezes_the_scene() {
    let vp = Viewport::new(800.0, 600.0, 1.0);
    let mut d = driver(Variant::Network, Theme::Light, vp).unwrap();
    let mut rec = Recorder::new(vp.bounds());
    d.start(false, &mut rec);
    d.frame(&mut rec, 0.0);
    d.stop();
    rec.reset();
    for i in 1..10 {
        assert_eq!(d.frame(&mut rec, i as f64 * 16.0), Tick::Halt);
    }
    assert!(rec.commands().is_empty());
}
