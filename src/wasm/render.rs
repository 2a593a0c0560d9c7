//! Browser mounting: one animation loop per `canvas[data-backdrop]`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{window, Document, HtmlCanvasElement, HtmlImageElement, Window};

use super::canvas::Canvas2d;
use crate::config::{BackdropConfig, Variant};
use crate::driver::{LoopDriver, Start, Tick};
use crate::motion::SceneRng;
use crate::surface::Viewport;
use crate::theme::{Theme, STORAGE_KEY};
use crate::variants;

const SELECTOR: &str = "canvas[data-backdrop]";
const REDUCED_MOTION: &str = "(prefers-reduced-motion: reduce)";
const PREFERS_LIGHT: &str = "(prefers-color-scheme: light)";

thread_local! {
    static MOUNTED: RefCell<Vec<Slot>> = const { RefCell::new(Vec::new()) };
    static NEXT_ID: Cell<u32> = const { Cell::new(0) };
}

fn js_error(err: crate::error::Error) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn browser() -> Result<(Window, Document), JsValue> {
    let window = window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    Ok((window, document))
}

fn viewport(window: &Window) -> Viewport {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Viewport::new(
        dim(window.inner_width()),
        dim(window.inner_height()),
        window.device_pixel_ratio(),
    )
}

fn matches(window: &Window, query: &str) -> bool {
    matches!(window.match_media(query), Ok(Some(list)) if list.matches())
}

/// Stored choice first, then the class on `<html>`, then the OS preference.
pub fn current_theme(window: &Window, document: &Document) -> Theme {
    let stored = window
        .local_storage()
        .ok()
        .flatten()
        .and_then(|s| s.get_item(STORAGE_KEY).ok().flatten());
    if let Some(stored) = stored {
        match stored.parse() {
            Ok(theme) => return theme,
            Err(err) => log::warn!("ignoring stored theme: {err}"),
        }
    }
    if let Some(root) = document.document_element() {
        let classes = root.class_list();
        if classes.contains(Theme::Light.as_str()) {
            return Theme::Light;
        }
        if classes.contains(Theme::Dark.as_str()) {
            return Theme::Dark;
        }
    }
    if matches(window, PREFERS_LIGHT) {
        Theme::Light
    } else {
        Theme::Dark
    }
}

fn store_theme(window: &Window, document: &Document, theme: Theme) -> Result<(), JsValue> {
    if let Some(storage) = window.local_storage()? {
        storage.set_item(STORAGE_KEY, theme.as_str())?;
    }
    if let Some(root) = document.document_element() {
        let classes = root.class_list();
        classes.remove_1(theme.toggle().as_str())?;
        classes.add_1(theme.as_str())?;
    }
    Ok(())
}

struct Live {
    driver: LoopDriver,
    surface: Canvas2d,
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Leave `canvas` showing nothing: no pixels, no styling from a previous mount.
fn blank(canvas: &HtmlCanvasElement, surface: &Canvas2d) {
    surface.wipe();
    let style = canvas.style();
    for property in ["opacity", "filter"] {
        if let Err(err) = style.remove_property(property) {
            log::trace!("removing {property} failed: {err:?}");
        }
    }
}

/// A running backdrop and everything the browser holds on its behalf.
struct Mount {
    label: &'static str,
    scene: Rc<RefCell<Live>>,
    frame: FrameCallback,
    pending: Rc<Cell<Option<i32>>>,
    on_refit: Option<Closure<dyn FnMut()>>,
    picture: Option<HtmlImageElement>,
}

impl Mount {
    fn attach(canvas: HtmlCanvasElement, theme: Theme) -> Result<Option<Self>, JsValue> {
        let (window, _) = browser()?;
        let config = match BackdropConfig::from_attributes(
            canvas.get_attribute("data-backdrop").as_deref(),
            canvas.get_attribute("data-config").as_deref(),
        ) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("bad backdrop config, using defaults: {err}");
                BackdropConfig::default()
            }
        };
        let label = config.variant.name();

        let Some(mut surface) = Canvas2d::attach(canvas.clone())? else {
            log::info!("{label}: no 2d context, skipping");
            return Ok(None);
        };
        let viewport = viewport(&window);
        let Some(scene) = variants::build(&config, theme, viewport, SceneRng::from_entropy())
        else {
            blank(&canvas, &surface);
            return Ok(None);
        };
        let picture = match (config.variant, config.src.as_deref()) {
            (Variant::Image, Some(src)) => {
                let picture = HtmlImageElement::new()?;
                picture.set_cross_origin(Some("anonymous"));
                picture.set_src(src);
                surface.set_picture(picture.clone());
                Some(picture)
            }
            (Variant::Image, None) => {
                log::warn!("{label}: no src in data-config, skipping");
                blank(&canvas, &surface);
                return Ok(None);
            }
            _ => None,
        };
        surface.resize(viewport);
        let style = canvas.style();
        style.set_property("opacity", &config.opacity(theme).to_string())?;
        if let Some(blur) = config.blur() {
            style.set_property("filter", &format!("blur({blur}px)"))?;
        }

        let mut driver = LoopDriver::new(scene);
        let start = driver.start(matches(&window, REDUCED_MOTION), &mut surface);
        let mut mount = Self {
            label,
            scene: Rc::new(RefCell::new(Live { driver, surface })),
            frame: Rc::new(RefCell::new(None)),
            pending: Rc::new(Cell::new(None)),
            on_refit: None,
            picture,
        };
        match start {
            Start::Skip => {
                // Dropping the mount blanks the canvas again.
                log::info!("{label}: reduced motion, nothing to show");
                return Ok(None);
            }
            Start::StaticFrame => log::info!("{label}: reduced motion, static frame"),
            Start::Animate => {
                mount.animate(&window)?;
                log::info!("{label}: mounted for {theme} theme");
            }
        }
        mount.listen_refit(&window)?;
        Ok(Some(mount))
    }

    fn animate(&mut self, window: &Window) -> Result<(), JsValue> {
        // `frame` holds the closure so it can hand itself to the next
        // request_animation_frame call; `unmount` breaks the cycle.
        let scene = self.scene.clone();
        let pending = self.pending.clone();
        let next = self.frame.clone();
        *self.frame.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
            pending.set(None);
            let tick = {
                let mut scene = scene.borrow_mut();
                let Live { driver, surface } = &mut *scene;
                driver.frame(surface, now)
            };
            if tick == Tick::Halt {
                return;
            }
            let Some(window) = web_sys::window() else { return };
            if let Some(cb) = next.borrow().as_ref() {
                match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Ok(id) => pending.set(Some(id)),
                    Err(err) => log::warn!("request_animation_frame failed: {err:?}"),
                }
            }
        }) as Box<dyn FnMut(f64)>));

        if let Some(cb) = self.frame.borrow().as_ref() {
            let id = window.request_animation_frame(cb.as_ref().unchecked_ref())?;
            self.pending.set(Some(id));
        }
        Ok(())
    }

    /// Re-allocate the surface on window resize, and once more when a picture
    /// finishes loading so a still frame can show it.
    fn listen_refit(&mut self, window: &Window) -> Result<(), JsValue> {
        let scene = self.scene.clone();
        let on_refit = Closure::wrap(Box::new(move || {
            let Some(window) = web_sys::window() else { return };
            let viewport = viewport(&window);
            let mut scene = scene.borrow_mut();
            let Live { driver, surface } = &mut *scene;
            surface.resize(viewport);
            driver.resize(viewport, surface);
        }) as Box<dyn FnMut()>);
        window.add_event_listener_with_callback("resize", on_refit.as_ref().unchecked_ref())?;
        if let Some(picture) = self.picture.as_ref() {
            picture.set_onload(Some(on_refit.as_ref().unchecked_ref()));
        }
        self.on_refit = Some(on_refit);
        Ok(())
    }

    fn unmount(&mut self) {
        {
            let mut live = self.scene.borrow_mut();
            live.driver.stop();
            blank(live.surface.canvas(), &live.surface);
        }
        let window = window();
        if let (Some(id), Some(window)) = (self.pending.take(), window.as_ref()) {
            if let Err(err) = window.cancel_animation_frame(id) {
                log::warn!("cancel_animation_frame failed: {err:?}");
            }
        }
        if let Some(picture) = self.picture.take() {
            picture.set_onload(None);
        }
        if let (Some(cb), Some(window)) = (self.on_refit.take(), window.as_ref()) {
            if let Err(err) =
                window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
            {
                log::warn!("removing resize listener failed: {err:?}");
            }
        }
        self.frame.borrow_mut().take();
        log::debug!("{}: unmounted", self.label);
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// One canvas this module has been asked to drive. A canvas has at most one
/// slot, and a slot at most one [`Mount`].
struct Slot {
    id: u32,
    canvas: HtmlCanvasElement,
    mount: Option<Mount>,
}

/// Tear down whatever runs on `canvas` and attach it afresh. Returns the
/// canvas's slot id and whether it is now active.
fn remount(canvas: HtmlCanvasElement, theme: Theme) -> Result<(u32, bool), JsValue> {
    let (id, previous) = MOUNTED.with(|m| {
        let mut slots = m.borrow_mut();
        match slots.iter_mut().find(|s| s.canvas == canvas) {
            Some(slot) => (slot.id, slot.mount.take()),
            None => {
                let id = NEXT_ID.with(|n| {
                    let id = n.get();
                    n.set(id.wrapping_add(1));
                    id
                });
                slots.push(Slot {
                    id,
                    canvas: canvas.clone(),
                    mount: None,
                });
                (id, None)
            }
        }
    });
    drop(previous);

    let mount = Mount::attach(canvas, theme)?;
    let active = mount.is_some();
    MOUNTED.with(|m| {
        if let Some(slot) = m.borrow_mut().iter_mut().find(|s| s.id == id) {
            slot.mount = mount;
        }
    });
    Ok((id, active))
}

fn release(id: u32) {
    let slot = MOUNTED.with(|m| {
        let mut slots = m.borrow_mut();
        let at = slots.iter().position(|s| s.id == id)?;
        Some(slots.remove(at))
    });
    drop(slot);
}

/// Handle to one mounted backdrop. Dropping it also tears the backdrop down.
#[wasm_bindgen]
pub struct BackdropHandle {
    id: Option<u32>,
}

#[wasm_bindgen]
impl BackdropHandle {
    /// Whether an animation loop or still frame is attached.
    #[wasm_bindgen(getter)]
    pub fn active(&self) -> bool {
        let Some(id) = self.id else { return false };
        MOUNTED.with(|m| {
            m.borrow()
                .iter()
                .any(|s| s.id == id && s.mount.is_some())
        })
    }

    /// Frames per second over the last full second, 0 when idle.
    pub fn fps(&self) -> u32 {
        let Some(id) = self.id else { return 0 };
        MOUNTED.with(|m| {
            m.borrow()
                .iter()
                .find(|s| s.id == id)
                .and_then(|s| s.mount.as_ref())
                .map_or(0, |mount| mount.scene.borrow().driver.fps())
        })
    }

    pub fn unmount(&mut self) {
        if let Some(id) = self.id.take() {
            release(id);
        }
    }
}

impl Drop for BackdropHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Mount a single canvas with the current theme, replacing any backdrop already
/// running on it. A canvas without a 2d context, or whose variant is gated off,
/// yields an inactive handle that becomes active if a later theme allows it.
#[wasm_bindgen(js_name = mountCanvas)]
pub fn mount_canvas(canvas: HtmlCanvasElement) -> Result<BackdropHandle, JsValue> {
    let (window, document) = browser()?;
    let theme = current_theme(&window, &document);
    let (id, _) = remount(canvas, theme)?;
    Ok(BackdropHandle { id: Some(id) })
}

/// Mount every `canvas[data-backdrop]` on the page, plus any canvas mounted
/// earlier by hand. Calling it again restarts each canvas rather than stacking
/// a second loop. Returns how many animate or show a still frame.
#[wasm_bindgen(js_name = mountAll)]
pub fn mount_all() -> Result<u32, JsValue> {
    let (window, document) = browser()?;
    let theme = current_theme(&window, &document);
    let mut canvases: Vec<HtmlCanvasElement> =
        MOUNTED.with(|m| m.borrow().iter().map(|s| s.canvas.clone()).collect());
    let nodes = document.query_selector_all(SELECTOR)?;
    for i in 0..nodes.length() {
        let Some(canvas) = nodes
            .item(i)
            .and_then(|n| n.dyn_into::<HtmlCanvasElement>().ok())
        else {
            continue;
        };
        if !canvases.contains(&canvas) {
            canvases.push(canvas);
        }
    }
    let mut count = 0;
    for canvas in canvases {
        if remount(canvas, theme)?.1 {
            count += 1;
        }
    }
    log::debug!("{count} backdrops mounted");
    Ok(count)
}

/// Number of canvases currently animating or showing a still frame.
#[wasm_bindgen(js_name = mountedCount)]
pub fn mounted_count() -> u32 {
    MOUNTED.with(|m| m.borrow().iter().filter(|s| s.mount.is_some()).count() as u32)
}

#[wasm_bindgen(js_name = unmountAll)]
pub fn unmount_all() {
    let slots = MOUNTED.with(|m| std::mem::take(&mut *m.borrow_mut()));
    drop(slots);
}

/// Persist `name` as the page theme and remount every backdrop with it.
#[wasm_bindgen(js_name = setTheme)]
pub fn set_theme(name: &str) -> Result<(), JsValue> {
    let theme: Theme = name.parse().map_err(js_error)?;
    let (window, document) = browser()?;
    store_theme(&window, &document, theme)?;
    mount_all()?;
    Ok(())
}

/// Flip the page theme; returns the new theme name.
#[wasm_bindgen(js_name = toggleTheme)]
pub fn toggle_theme() -> Result<String, JsValue> {
    let (window, document) = browser()?;
    let next = current_theme(&window, &document).toggle();
    set_theme(next.as_str())?;
    Ok(next.as_str().to_string())
}

#[wasm_bindgen(js_name = currentTheme)]
pub fn theme() -> Result<String, JsValue> {
    let (window, document) = browser()?;
    Ok(current_theme(&window, &document).as_str().to_string())
}
