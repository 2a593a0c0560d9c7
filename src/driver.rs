//! Loop driver: clear, step, paint, once per display refresh, until stopped.
//!
//! The driver owns no timer. The platform calls [`LoopDriver::frame`] from its
//! refresh callback and schedules the next one only when it gets
//! [`Tick::Continue`] back, so stopping the driver is enough to end the loop.

use crate::surface::{Surface, Viewport};

/// One animated backdrop.
pub trait Scene {
    fn resize(&mut self, viewport: Viewport);

    /// Advance every entity. `now_ms` is the platform's frame timestamp.
    fn step(&mut self, now_ms: f64);

    fn paint(&mut self, surface: &mut dyn Surface);

    /// Draw a still frame for reduced-motion users. Returns false when the scene
    /// has nothing meaningful to show without animation.
    fn paint_static(&mut self, _surface: &mut dyn Surface) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
    /// Showing a single still frame; never schedules another.
    Static,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Start {
    /// Caller should request the first frame.
    Animate,
    StaticFrame,
    /// Nothing to render.
    Skip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Halt,
}

pub struct LoopDriver {
    scene: Box<dyn Scene>,
    state: LoopState,
    stats: FrameStats,
}

impl LoopDriver {
    pub fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            state: LoopState::Stopped,
            stats: FrameStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn start(&mut self, reduced_motion: bool, surface: &mut dyn Surface) -> Start {
        match self.state {
            LoopState::Running => return Start::Animate,
            LoopState::Static => return Start::StaticFrame,
            LoopState::Stopped => {}
        }
        if !reduced_motion {
            self.state = LoopState::Running;
            return Start::Animate;
        }
        surface.clear();
        if self.scene.paint_static(surface) {
            self.state = LoopState::Static;
            Start::StaticFrame
        } else {
            Start::Skip
        }
    }

    pub fn frame(&mut self, surface: &mut dyn Surface, now_ms: f64) -> Tick {
        if self.state != LoopState::Running {
            return Tick::Halt;
        }
        surface.clear();
        self.scene.step(now_ms);
        self.scene.paint(surface);
        self.stats.record(now_ms);
        Tick::Continue
    }

    /// The surface has already been re-allocated; a still frame is redrawn at once,
    /// a running loop picks the new size up on its next frame.
    pub fn resize(&mut self, viewport: Viewport, surface: &mut dyn Surface) {
        self.scene.resize(viewport);
        if self.state == LoopState::Static {
            surface.clear();
            self.scene.paint_static(surface);
        }
    }

    pub fn stop(&mut self) {
        if self.state != LoopState::Stopped {
            log::debug!("loop stopped after {} frames", self.stats.total);
        }
        self.state = LoopState::Stopped;
    }

    pub fn fps(&self) -> u32 {
        self.stats.fps
    }
}

/// Frame counter reporting frames per second once a second.
#[derive(Clone, Debug, Default)]
pub struct FrameStats {
    window_start: Option<f64>,
    frames: u32,
    fps: u32,
    total: u64,
}

impl FrameStats {
    /// The first frame only opens the window; later frames count towards it.
    pub fn record(&mut self, now_ms: f64) {
        self.total += 1;
        let Some(start) = self.window_start else {
            self.window_start = Some(now_ms);
            return;
        };
        self.frames += 1;
        if now_ms - start >= 1000.0 {
            self.fps = self.frames;
            self.frames = 0;
            self.window_start = Some(now_ms);
            log::debug!("fps: {}", self.fps);
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}
