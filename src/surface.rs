//! Drawing surface shared by every backdrop.
//!
//! Painters only ever talk to [`Surface`]; the browser canvas lives behind it in
//! `wasm::canvas`, and [`Recorder`] stands in for it on the host.

use std::fmt;

/// Smallest radius handed to a gradient or arc. Canvas rejects r < 0 and a zero
/// radius produces an empty gradient.
pub const MIN_RADIUS: f64 = 0.05;

pub fn safe_radius(r: f64) -> f64 {
    if r.is_finite() {
        r.max(MIN_RADIUS)
    } else {
        MIN_RADIUS
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        let a = if a.is_finite() { a.clamp(0.0, 1.0) } else { 0.0 };
        Self { a, ..self }
    }

    pub fn scale_alpha(self, k: f64) -> Self {
        self.with_alpha(self.a * k)
    }

    /// Shift every channel by `variation` of itself, so black stays black.
    pub fn tint(self, variation: f64) -> Self {
        let shift = |c: u8| (c as f64 * (1.0 + variation)).clamp(0.0, 255.0).round() as u8;
        Self {
            r: shift(self.r),
            g: shift(self.g),
            b: shift(self.b),
            a: self.a,
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Logical drawing area in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Window size plus device pixel ratio, as reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width.max(0.0), self.height.max(0.0))
    }

    /// Backing store size in device pixels; never zero so the context stays valid.
    pub fn backing_size(&self) -> (u32, u32) {
        let r = self.ratio();
        let px = |v: f64| ((v.max(0.0) * r).ceil() as u32).max(1);
        (px(self.width), px(self.height))
    }
}

/// Colour stops for a gradient, offsets in `0.0..=1.0`.
pub type Stops<'a> = &'a [(f64, Rgba)];

pub trait Surface {
    /// Logical size painters should lay out against.
    fn bounds(&self) -> Bounds;

    fn clear(&mut self);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba);

    fn fill_radial_gradient(&mut self, center: Point, radius: f64, stops: Stops<'_>);

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgba);

    fn stroke_gradient_line(&mut self, from: Point, to: Point, width: f64, start: Rgba, end: Rgba);

    fn fill_polygon(&mut self, points: &[Point], color: Rgba);

    /// Fill a polygon with a linear gradient running from `from` to `to`.
    fn fill_polygon_gradient(&mut self, points: &[Point], from: Point, to: Point, stops: Stops<'_>);

    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, color: Rgba);

    /// Move the origin to `origin` and rotate by `angle` radians until the matching pop.
    fn push_transform(&mut self, origin: Point, angle: f64);

    fn pop_transform(&mut self);

    /// Offscreen layer that survives between frames, if the backend keeps one.
    fn layer(&mut self) -> Option<&mut dyn Surface> {
        None
    }

    /// Copy the offscreen layer onto this surface.
    fn composite_layer(&mut self) {}

    /// Natural size of the picture attached to this surface, once it has loaded.
    fn picture_size(&self) -> Option<(f64, f64)> {
        None
    }

    /// Draw the attached picture stretched over the given rectangle.
    fn draw_picture(&mut self, _origin: Point, _width: f64, _height: f64) {}
}

/// Soft glow: `color` at the centre fading to transparent at `radius`.
pub fn glow(surface: &mut dyn Surface, center: Point, radius: f64, color: Rgba) {
    surface.fill_radial_gradient(
        center,
        safe_radius(radius),
        &[(0.0, color), (1.0, color.with_alpha(0.0))],
    );
}

/// Opaque core drawn over a glow.
pub fn dot(surface: &mut dyn Surface, center: Point, radius: f64, color: Rgba) {
    surface.fill_circle(center, safe_radius(radius), color);
}

pub fn rect(origin: Point, width: f64, height: f64) -> [Point; 4] {
    [
        origin,
        origin.offset(width, 0.0),
        origin.offset(width, height),
        origin.offset(0.0, height),
    ]
}

pub fn with_transform(
    surface: &mut dyn Surface,
    origin: Point,
    angle: f64,
    draw: impl FnOnce(&mut dyn Surface),
) {
    surface.push_transform(origin, angle);
    draw(&mut *surface);
    surface.pop_transform();
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    Clear,
    Circle { center: Point, radius: f64, color: Rgba },
    Gradient { center: Point, radius: f64 },
    Line { from: Point, to: Point, width: f64, color: Rgba },
    GradientLine { from: Point, to: Point, width: f64 },
    Polygon { vertices: usize, color: Rgba },
    GradientPolygon { vertices: usize },
    Ellipse { center: Point, rx: f64, ry: f64 },
    PushTransform { origin: Point, angle: f64 },
    PopTransform,
    CompositeLayer,
    Picture { origin: Point, width: f64, height: f64 },
}

/// Headless surface that records every call; lets frames be inspected without a
/// browser.
#[derive(Debug, Default)]
pub struct Recorder {
    bounds: Bounds,
    commands: Vec<DrawCmd>,
    layer: Option<Box<Recorder>>,
    picture: Option<(f64, f64)>,
}

impl Recorder {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            commands: Vec::new(),
            layer: None,
            picture: None,
        }
    }

    /// Pretend a picture of the given natural size has finished loading.
    pub fn with_picture(mut self, width: f64, height: f64) -> Self {
        self.picture = Some((width, height));
        self
    }

    /// Recorder that also offers a cached layer, like the browser backend.
    pub fn layered(bounds: Bounds) -> Self {
        Self {
            layer: Some(Box::new(Recorder::new(bounds))),
            ..Self::new(bounds)
        }
    }

    pub fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        if let Some(layer) = self.layer.as_mut() {
            layer.resize(bounds);
        }
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    pub fn layer_commands(&self) -> &[DrawCmd] {
        self.layer.as_ref().map_or(&[], |l| l.commands())
    }

    /// Drop recorded commands on this surface and its layer.
    pub fn reset(&mut self) {
        self.commands.clear();
        if let Some(layer) = self.layer.as_mut() {
            layer.reset();
        }
    }

    pub fn count(&self, pred: impl Fn(&DrawCmd) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    /// Every radius passed to an arc or gradient, including the layer's.
    pub fn radii(&self) -> Vec<f64> {
        self.commands
            .iter()
            .chain(self.layer_commands())
            .filter_map(|c| match c {
                DrawCmd::Circle { radius, .. } | DrawCmd::Gradient { radius, .. } => Some(*radius),
                DrawCmd::Ellipse { rx, ry, .. } => Some(rx.min(*ry)),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, cmd: DrawCmd) {
        self.commands.push(cmd);
    }
}

impl Surface for Recorder {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn clear(&mut self) {
        self.push(DrawCmd::Clear);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.push(DrawCmd::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_radial_gradient(&mut self, center: Point, radius: f64, _stops: Stops<'_>) {
        self.push(DrawCmd::Gradient { center, radius });
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgba) {
        self.push(DrawCmd::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn stroke_gradient_line(&mut self, from: Point, to: Point, width: f64, _: Rgba, _: Rgba) {
        self.push(DrawCmd::GradientLine { from, to, width });
    }

    fn fill_polygon(&mut self, points: &[Point], color: Rgba) {
        self.push(DrawCmd::Polygon {
            vertices: points.len(),
            color,
        });
    }

    fn fill_polygon_gradient(&mut self, points: &[Point], _: Point, _: Point, _: Stops<'_>) {
        self.push(DrawCmd::GradientPolygon {
            vertices: points.len(),
        });
    }

    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, _color: Rgba) {
        self.push(DrawCmd::Ellipse { center, rx, ry });
    }

    fn push_transform(&mut self, origin: Point, angle: f64) {
        self.push(DrawCmd::PushTransform { origin, angle });
    }

    fn pop_transform(&mut self) {
        self.push(DrawCmd::PopTransform);
    }

    fn layer(&mut self) -> Option<&mut dyn Surface> {
        match self.layer.as_deref_mut() {
            Some(layer) => Some(layer as &mut dyn Surface),
            None => None,
        }
    }

    fn composite_layer(&mut self) {
        if self.layer.is_some() {
            self.push(DrawCmd::CompositeLayer);
        }
    }

    fn picture_size(&self) -> Option<(f64, f64)> {
        self.picture
    }

    fn draw_picture(&mut self, origin: Point, width: f64, height: f64) {
        if self.picture.is_some() {
            self.push(DrawCmd::Picture {
                origin,
                width,
                height,
            });
        }
    }
}
