//! Generic particle set: one engine, variants supply only a [`Behavior`].

use serde::{Deserialize, Serialize};

use crate::motion::SceneRng;
use crate::surface::{Bounds, Point, Rgba, Surface};

/// Everything a stepper may read about the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepContext {
    pub bounds: Bounds,
    /// Seconds since the scene started animating.
    pub elapsed: f64,
}

pub trait Behavior {
    type Entity;

    fn spawn(&self, rng: &mut SceneRng, bounds: Bounds, index: usize, total: usize) -> Self::Entity;

    /// Advance one tick. Returns whether anything draw-relevant changed.
    fn step(&self, entity: &mut Self::Entity, ctx: &StepContext, rng: &mut SceneRng) -> bool;

    fn draw(&self, entity: &Self::Entity, surface: &mut dyn Surface);

    /// Hidden entities are skipped by the painter entirely.
    fn is_hidden(&self, _entity: &Self::Entity) -> bool {
        false
    }

    fn position(&self, entity: &Self::Entity) -> Point;
}

/// How many entities a set holds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Population {
    Fixed(usize),
    /// One entity per `area_per_particle` square pixels, at most `cap`.
    Density { area_per_particle: f64, cap: usize },
}

impl Population {
    pub fn resolve(self, bounds: Bounds) -> usize {
        match self {
            Population::Fixed(n) => n,
            Population::Density {
                area_per_particle,
                cap,
            } => {
                if area_per_particle <= 0.0 {
                    return cap;
                }
                ((bounds.area() / area_per_particle).floor() as usize).min(cap)
            }
        }
    }

    /// The same population with its count bounded by `max`.
    pub fn capped(self, max: usize) -> Self {
        match self {
            Population::Fixed(n) => Population::Fixed(n.min(max)),
            Population::Density {
                area_per_particle,
                cap,
            } => Population::Density {
                area_per_particle,
                cap: cap.min(max),
            },
        }
    }
}

/// Connective pass: a line between every pair closer than `max_distance`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Links {
    pub max_distance: f64,
    pub color: Rgba,
    pub max_alpha: f64,
    pub width: f64,
}

impl Links {
    pub fn alpha(&self, distance: f64) -> Option<f64> {
        (distance < self.max_distance)
            .then(|| self.max_alpha * (1.0 - distance / self.max_distance))
    }
}

pub struct ParticleSet<B: Behavior> {
    behavior: B,
    population: Population,
    entities: Vec<B::Entity>,
    links: Option<Links>,
}

impl<B: Behavior> ParticleSet<B> {
    pub fn new(behavior: B, population: Population) -> Self {
        Self {
            behavior,
            population,
            entities: Vec::new(),
            links: None,
        }
    }

    pub fn with_links(mut self, links: Links) -> Self {
        self.links = Some(links);
        self
    }

    /// Replace the entities with a fresh batch sized for `bounds`.
    pub fn populate(&mut self, rng: &mut SceneRng, bounds: Bounds) {
        let total = self.population.resolve(bounds);
        self.entities = (0..total)
            .map(|i| self.behavior.spawn(rng, bounds, i, total))
            .collect();
    }

    /// Full stepper pass over every entity.
    pub fn step(&mut self, ctx: &StepContext, rng: &mut SceneRng) -> bool {
        let mut changed = false;
        for entity in &mut self.entities {
            changed |= self.behavior.step(entity, ctx, rng);
        }
        changed
    }

    /// Draw in insertion order, then the link pass if configured.
    pub fn paint(&self, surface: &mut dyn Surface) {
        for entity in &self.entities {
            if self.behavior.is_hidden(entity) {
                continue;
            }
            self.behavior.draw(entity, surface);
        }
        if let Some(links) = self.links {
            self.paint_links(&links, surface);
        }
    }

    fn paint_links(&self, links: &Links, surface: &mut dyn Surface) {
        for (i, a) in self.entities.iter().enumerate() {
            let pa = self.behavior.position(a);
            for b in &self.entities[i + 1..] {
                let pb = self.behavior.position(b);
                if let Some(alpha) = links.alpha(pa.distance(pb)) {
                    surface.stroke_line(pa, pb, links.width, links.color.with_alpha(alpha));
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[B::Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [B::Entity] {
        &mut self.entities
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }
}
