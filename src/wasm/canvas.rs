//! [`Surface`] over a 2d canvas context.

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasGradient, CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::surface::{Bounds, Point, Rgba, Stops, Surface, Viewport};

/// Canvas calls only fail on bad arguments, which the painters already guard
/// against; a failure drops that one primitive.
fn traced(result: Result<(), JsValue>, what: &str) {
    if let Err(err) = result {
        log::trace!("canvas {what} failed: {err:?}");
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<Option<CanvasRenderingContext2d>, JsValue> {
    match canvas.get_context("2d")? {
        Some(ctx) => Ok(Some(ctx.dyn_into()?)),
        None => Ok(None),
    }
}

pub struct Canvas2d {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    bounds: Bounds,
    cache: Option<Box<Canvas2d>>,
    picture: Option<HtmlImageElement>,
}

impl Canvas2d {
    /// Wrap `canvas`, or `None` when the browser refuses a 2d context.
    pub fn attach(canvas: HtmlCanvasElement) -> Result<Option<Self>, JsValue> {
        let Some(ctx) = context_2d(&canvas)? else {
            return Ok(None);
        };
        let cache = detached(&canvas)?.map(Box::new);
        Ok(Some(Self {
            canvas,
            ctx,
            bounds: Bounds::default(),
            cache,
            picture: None,
        }))
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Picture drawn by [`Surface::draw_picture`]; it may still be loading.
    pub fn set_picture(&mut self, picture: HtmlImageElement) {
        self.picture = Some(picture);
    }

    /// Erase the whole backing store whatever the current transform.
    pub fn wipe(&self) {
        self.ctx.save();
        traced(self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0), "set_transform");
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
        self.ctx.restore();
    }

    /// Size the backing store in device pixels and scale drawing back to CSS
    /// pixels. Resizing a canvas resets its transform, so it is set again here.
    pub fn resize(&mut self, viewport: Viewport) {
        let (w, h) = viewport.backing_size();
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        let r = viewport.ratio();
        traced(self.ctx.set_transform(r, 0.0, 0.0, r, 0.0, 0.0), "set_transform");
        self.bounds = viewport.bounds();
        if let Some(cache) = self.cache.as_mut() {
            cache.resize(viewport);
        }
    }

    #[allow(deprecated)]
    fn fill_with(&self, style: &JsValue) {
        self.ctx.set_fill_style(style);
    }

    #[allow(deprecated)]
    fn stroke_with(&self, style: &JsValue) {
        self.ctx.set_stroke_style(style);
    }

    fn fill_color(&self, color: Rgba) {
        self.fill_with(&JsValue::from_str(&color.to_string()));
    }

    fn trace_path(&self, points: &[Point]) -> bool {
        let Some((first, rest)) = points.split_first() else {
            return false;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        self.ctx.close_path();
        true
    }

    fn linear(&self, from: Point, to: Point, stops: Stops<'_>) -> CanvasGradient {
        let gradient = self.ctx.create_linear_gradient(from.x, from.y, to.x, to.y);
        add_stops(&gradient, stops);
        gradient
    }
}

/// Offscreen twin of `canvas`, never attached to the document.
fn detached(canvas: &HtmlCanvasElement) -> Result<Option<Canvas2d>, JsValue> {
    let Some(document) = canvas.owner_document() else {
        return Ok(None);
    };
    let cache: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    let Some(ctx) = context_2d(&cache)? else {
        return Ok(None);
    };
    Ok(Some(Canvas2d {
        canvas: cache,
        ctx,
        bounds: Bounds::default(),
        cache: None,
        picture: None,
    }))
}

fn add_stops(gradient: &CanvasGradient, stops: Stops<'_>) {
    for (offset, color) in stops {
        traced(
            gradient.add_color_stop(offset.clamp(0.0, 1.0) as f32, &color.to_string()),
            "add_color_stop",
        );
    }
}

impl Surface for Canvas2d {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.bounds.width, self.bounds.height);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.fill_color(color);
        self.ctx.begin_path();
        traced(self.ctx.arc(center.x, center.y, radius, 0.0, TAU), "arc");
        self.ctx.fill();
    }

    fn fill_radial_gradient(&mut self, center: Point, radius: f64, stops: Stops<'_>) {
        let gradient = self
            .ctx
            .create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, radius);
        let gradient = match gradient {
            Ok(g) => g,
            Err(err) => {
                log::trace!("canvas radial gradient failed: {err:?}");
                return;
            }
        };
        add_stops(&gradient, stops);
        self.fill_with(&gradient);
        self.ctx.begin_path();
        traced(self.ctx.arc(center.x, center.y, radius, 0.0, TAU), "arc");
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgba) {
        self.stroke_with(&JsValue::from_str(&color.to_string()));
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn stroke_gradient_line(&mut self, from: Point, to: Point, width: f64, start: Rgba, end: Rgba) {
        let gradient = self.linear(from, to, &[(0.0, start), (1.0, end)]);
        self.stroke_with(&gradient);
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_polygon(&mut self, points: &[Point], color: Rgba) {
        if self.trace_path(points) {
            self.fill_color(color);
            self.ctx.fill();
        }
    }

    fn fill_polygon_gradient(&mut self, points: &[Point], from: Point, to: Point, stops: Stops<'_>) {
        if self.trace_path(points) {
            let gradient = self.linear(from, to, stops);
            self.fill_with(&gradient);
            self.ctx.fill();
        }
    }

    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, color: Rgba) {
        self.fill_color(color);
        self.ctx.begin_path();
        traced(
            self.ctx.ellipse(center.x, center.y, rx, ry, 0.0, 0.0, TAU),
            "ellipse",
        );
        self.ctx.fill();
    }

    fn push_transform(&mut self, origin: Point, angle: f64) {
        self.ctx.save();
        traced(self.ctx.translate(origin.x, origin.y), "translate");
        traced(self.ctx.rotate(angle), "rotate");
    }

    fn pop_transform(&mut self) {
        self.ctx.restore();
    }

    fn layer(&mut self) -> Option<&mut dyn Surface> {
        self.cache.as_deref_mut().map(|c| c as &mut dyn Surface)
    }

    fn composite_layer(&mut self) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        traced(
            self.ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
                &cache.canvas,
                0.0,
                0.0,
                self.bounds.width,
                self.bounds.height,
            ),
            "draw_image",
        );
    }

    fn picture_size(&self) -> Option<(f64, f64)> {
        let picture = self.picture.as_ref().filter(|p| p.complete())?;
        let (w, h) = (picture.natural_width(), picture.natural_height());
        (w > 0 && h > 0).then_some((w as f64, h as f64))
    }

    fn draw_picture(&mut self, origin: Point, width: f64, height: f64) {
        let Some(picture) = self.picture.as_ref() else {
            return;
        };
        traced(
            self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
                picture, origin.x, origin.y, width, height,
            ),
            "draw_image",
        );
    }
}
