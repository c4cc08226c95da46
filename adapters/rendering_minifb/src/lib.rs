#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Native windowing backend for Tanks Grid World built on `minifb`.
//!
//! Presenting a frame through [`minifb::Window::update_with_buffer`] also
//! services the platform event pump, so the window stays responsive between
//! the slow-paced frames of the grid renderer.

use minifb::{Window, WindowOptions};

use tanks_grid_world_rendering::{
    FrameBuffer, RenderingError, Surface, SurfaceFactory, SurfaceSize,
};

/// Opens native presentation windows through the `minifb` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinifbSurfaceFactory;

impl MinifbSurfaceFactory {
    /// Creates a new factory.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SurfaceFactory for MinifbSurfaceFactory {
    fn open(&mut self, title: &str, size: SurfaceSize) -> Result<Box<dyn Surface>, RenderingError> {
        let window = Window::new(
            title,
            size.width() as usize,
            size.height() as usize,
            WindowOptions::default(),
        )
        .map_err(|source| RenderingError::Unavailable {
            reason: source.to_string(),
        })?;

        Ok(Box::new(MinifbSurface { window }))
    }
}

struct MinifbSurface {
    window: Window,
}

impl Surface for MinifbSurface {
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), RenderingError> {
        self.window
            .update_with_buffer(
                frame.pixels(),
                frame.width() as usize,
                frame.height() as usize,
            )
            .map_err(|source| RenderingError::PresentFailed {
                reason: source.to_string(),
            })
    }
}
