#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Animated canvas backdrops for a marketing site: starfields, shooting stars,
//! glitter, drifting shapes and friends.
//!
//! Everything up to [`driver`] is plain Rust and runs on the host against a
//! [`surface::Recorder`]; the browser glue is only compiled for wasm32.

pub mod config;
pub mod driver;
pub mod error;
pub mod fade;
pub mod meteor;
pub mod motion;
pub mod particles;
pub mod surface;
pub mod theme;
pub mod variants;

pub use config::{BackdropConfig, Variant};
pub use driver::{LoopDriver, LoopState, Scene, Start, Tick};
pub use error::{Error, Result};
pub use surface::{Bounds, Point, Recorder, Rgba, Surface, Viewport};
pub use theme::{Theme, ThemeGate};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use wasm_bindgen::prelude::*;

    mod canvas;
    mod render;

    pub use canvas::Canvas2d;
    pub use render::{
        mount_all, mount_canvas, mounted_count, set_theme, theme, toggle_theme, unmount_all,
        BackdropHandle,
    };

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        let mounted = render::mount_all()?;
        log::info!("backdrop ready, {mounted} mounted");
        Ok(())
    }
}
