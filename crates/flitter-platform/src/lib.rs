//! Host seams so `flitter-core` stays free of any windowing or GPU stack.

use std::time::Duration;

use flitter_core::FrameView;
use serde::{Deserialize, Serialize};

mod scheduler;

pub use scheduler::FixedRateScheduler;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Drawable area in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    /// Width over height; a zero height is treated as one pixel.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Notifications from the host, delivered between frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HostEvent {
    Resized(Viewport),
    PointerMoved { x: f32, y: f32 },
    HoverChanged(bool),
    /// Stop scheduling frames.
    Stop,
}

/// Whether the scheduler should call back again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Stop,
}

/// Everything a frame callback receives.
#[derive(Debug, Clone)]
pub struct FrameTick {
    pub index: u64,
    /// Measured time since the previous callback.
    pub elapsed: Duration,
    /// Host events received since the previous callback, oldest first.
    pub events: Vec<HostEvent>,
}

/// Drives a per-frame callback until it asks to stop.
pub trait FrameScheduler {
    fn run(&mut self, on_frame: &mut dyn FnMut(&FrameTick) -> FrameControl) -> Result<()>;
}

/// Consumer of the per-frame particle arrays and entity pose.
///
/// Implementations must draw with whatever texture state they have; a
/// texture that has not finished loading is not an error.
pub trait FrameRenderer: Send {
    fn init(&mut self) -> Result<()>;
    fn render_frame(&mut self, frame: &FrameView<'_>) -> Result<()>;
    fn resize(&mut self, _viewport: Viewport) -> Result<()> {
        Ok(())
    }
    /// Frees GPU-side buffers and textures.
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect() {
        assert_eq!(Viewport::new(1920, 1080).aspect(), 1920.0 / 1080.0);
        assert_eq!(Viewport::new(100, 0).aspect(), 100.0);
    }
}
