//! A picture scaled to cover the viewport, bobbing a few pixels up and down
//! under a thin theme-coloured veil.

use crate::driver::Scene;
use crate::surface::{rect, Bounds, Point, Rgba, Surface, Viewport};
use crate::theme::Theme;

/// Radians added to the bob phase each frame.
const BOB_STEP: f64 = 0.0005;
const BOB_AMPLITUDE: f64 = 5.0;
/// Overscan so the edges stay hidden while the picture moves.
const OVERSCAN: f64 = 1.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

/// Fit a `picture` (natural width, height) over `bounds` keeping its aspect
/// ratio, then grow it by the overscan around its own centre.
pub fn cover(bounds: Bounds, picture: (f64, f64)) -> Option<Placement> {
    let (pw, ph) = picture;
    if pw <= 0.0 || ph <= 0.0 || bounds.width <= 0.0 || bounds.height <= 0.0 {
        return None;
    }
    let ratio = pw / ph;
    let (width, height, x, y) = if bounds.width / bounds.height > ratio {
        let h = bounds.width / ratio;
        (bounds.width, h, 0.0, (bounds.height - h) / 2.0)
    } else {
        let w = bounds.height * ratio;
        (w, bounds.height, (bounds.width - w) / 2.0, 0.0)
    };
    let (width, height) = (width * OVERSCAN, height * OVERSCAN);
    Some(Placement {
        origin: Point::new(
            x - width * (OVERSCAN - 1.0) / 2.0,
            y - height * (OVERSCAN - 1.0) / 2.0,
        ),
        width,
        height,
    })
}

pub struct ImageBackdrop {
    veil: Rgba,
    phase: f64,
    bounds: Bounds,
}

impl ImageBackdrop {
    pub fn new(theme: Theme, viewport: Viewport) -> Self {
        let veil = match theme {
            Theme::Light => Rgba::rgb(255, 255, 255).with_alpha(0.1),
            Theme::Dark => Rgba::rgb(0, 0, 0).with_alpha(0.2),
        };
        Self {
            veil,
            phase: 0.0,
            bounds: viewport.bounds(),
        }
    }

    pub fn offset(&self) -> f64 {
        self.phase.sin() * BOB_AMPLITUDE
    }

    /// Nothing is drawn until the surface reports a loaded picture.
    fn draw(&self, surface: &mut dyn Surface, dy: f64) {
        let Some(place) = surface
            .picture_size()
            .and_then(|size| cover(self.bounds, size))
        else {
            return;
        };
        surface.draw_picture(place.origin.offset(0.0, dy), place.width, place.height);
        surface.fill_polygon(
            &rect(Point::default(), self.bounds.width, self.bounds.height),
            self.veil,
        );
    }
}

impl Scene for ImageBackdrop {
    fn resize(&mut self, viewport: Viewport) {
        self.bounds = viewport.bounds();
    }

    fn step(&mut self, _now_ms: f64) {
        self.phase += BOB_STEP;
    }

    fn paint(&mut self, surface: &mut dyn Surface) {
        self.draw(surface, self.offset());
    }

    /// The still frame is the picture at rest; it shows up once the picture
    /// loads and the platform asks for a redraw.
    fn paint_static(&mut self, surface: &mut dyn Surface) -> bool {
        self.draw(surface, 0.0);
        true
    }
}
