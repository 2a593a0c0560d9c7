use crate::driver::Scene;
use crate::meteor::{MeteorShower, SpawnPolicy, SpawnRegion};
use crate::motion::SceneRng;
use crate::surface::{Bounds, Rgba, Surface, Viewport};

const SPAWN_CHANCE: f64 = 0.01;
const MAX_ACTIVE: usize = 3;

/// Standalone shooting stars: a few at a time, spawned at random.
pub struct ShootingStars {
    shower: MeteorShower,
    rng: SceneRng,
    bounds: Bounds,
}

impl ShootingStars {
    pub fn new(ink: Rgba, viewport: Viewport, rng: SceneRng) -> Self {
        Self {
            shower: MeteorShower::new(
                SpawnPolicy::Chance {
                    per_frame: SPAWN_CHANCE,
                    max_active: MAX_ACTIVE,
                },
                SpawnRegion::UPPER_SKY,
                ink,
            ),
            rng,
            bounds: viewport.bounds(),
        }
    }

    pub fn shower(&self) -> &MeteorShower {
        &self.shower
    }
}

impl Scene for ShootingStars {
    fn resize(&mut self, viewport: Viewport) {
        self.bounds = viewport.bounds();
    }

    fn step(&mut self, now_ms: f64) {
        self.shower.step(now_ms, self.bounds, &mut self.rng);
    }

    fn paint(&mut self, surface: &mut dyn Surface) {
        self.shower.paint(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn never_more_than_three() {
        let mut s = ShootingStars::new(
            Rgba::rgb(0, 0, 0),
            Viewport::new(1280.0, 720.0, 1.0),
            SceneRng::seed_from_u64(4),
        );
        let mut seen = 0;
        for frame in 0..5000 {
            s.step(frame as f64 * 16.0);
            assert!(s.shower().active().len() <= MAX_ACTIVE);
            seen = seen.max(s.shower().active().len());
        }
        assert!(seen > 0);
    }
}
