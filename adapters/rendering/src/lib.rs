#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tanks Grid World adapters.

use std::{
    error::Error,
    fmt, thread,
    time::{Duration, Instant},
};

use tracing::debug;

use tanks_grid_world_core::{
    Cell, CellGrid, UnknownCellCode, ENVIRONMENT_NAME, GRID_COLUMNS, GRID_ROWS,
};

const DEFAULT_CELL_SIZE: u32 = 50;
const DEFAULT_TARGET_FPS: u32 = 1;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Packs the color into a single `0xAARRGGBB` pixel.
    #[must_use]
    pub fn to_argb_u32(self) -> u32 {
        let alpha = channel_to_byte(self.alpha);
        let red = channel_to_byte(self.red);
        let green = channel_to_byte(self.green);
        let blue = channel_to_byte(self.blue);
        (alpha << 24) | (red << 16) | (green << 8) | blue
    }
}

fn channel_to_byte(channel: f32) -> u32 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u32
}

/// Display color assigned to a cell code.
///
/// The mapping is total over the taxonomy and assigns every code a distinct
/// color.
#[must_use]
pub const fn cell_color(cell: Cell) -> Color {
    match cell {
        Cell::Empty => Color::from_rgb_u8(0, 0, 0),
        Cell::Brick => Color::from_rgb_u8(205, 133, 63),
        Cell::Forest => Color::from_rgb_u8(154, 205, 50),
        Cell::Metal => Color::from_rgb_u8(255, 255, 255),
        Cell::Water => Color::from_rgb_u8(100, 149, 237),
        Cell::Tank => Color::from_rgb_u8(255, 215, 0),
        Cell::Enemy => Color::from_rgb_u8(255, 99, 71),
        Cell::Bullet => Color::from_rgb_u8(169, 169, 169),
    }
}

/// Display color assigned to a raw cell code.
///
/// Returns an error for any value outside the taxonomy.
pub fn color_of_code(code: u8) -> Result<Color, UnknownCellCode> {
    Cell::from_code(code).map(cell_color)
}

/// Pixel dimensions of a presentation surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    width: u32,
    height: u32,
}

impl SurfaceSize {
    /// Creates a new size descriptor with explicit pixel dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the surface in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the surface in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Dense pixel buffer composed before presentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    /// Creates a buffer of the provided size filled with opaque black.
    #[must_use]
    pub fn new(size: SurfaceSize) -> Self {
        let capacity_u64 = u64::from(size.width()) * u64::from(size.height());
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width: size.width(),
            height: size.height(),
            pixels: vec![0xFF00_0000; capacity],
        }
    }

    /// Width of the buffer in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the buffer in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Packed `0xAARRGGBB` pixels in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixel at the provided coordinates, or `None` outside the buffer.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).and_then(|index| self.pixels.get(index).copied())
    }

    /// Fills a rectangle with the provided color, clipping at the buffer
    /// edges.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Color) {
        let pixel = color.to_argb_u32();
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);

        for row in y..y_end {
            for column in x..x_end {
                if let Some(index) = self.index(column, row) {
                    if let Some(slot) = self.pixels.get_mut(index) {
                        *slot = pixel;
                    }
                }
            }
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            let row = usize::try_from(y).ok()?;
            let column = usize::try_from(x).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Presentation target opened by a windowing backend.
pub trait Surface {
    /// Presents a composed frame, keeping the window responsive.
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), RenderingError>;
}

/// Windowing collaborator that opens presentation surfaces on demand.
pub trait SurfaceFactory {
    /// Opens a surface with the provided window title and pixel size.
    ///
    /// Fails with [`RenderingError::Unavailable`] when the backend cannot be
    /// initialized.
    fn open(&mut self, title: &str, size: SurfaceSize) -> Result<Box<dyn Surface>, RenderingError>;
}

/// Blocks frame presentation to a fixed cadence.
#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    last_frame: Option<Instant>,
}

impl FramePacer {
    /// Creates a pacer targeting the provided number of frames per second.
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let target_fps = if target_fps == 0 { 1 } else { target_fps };
        Self {
            interval: Duration::from_secs(1) / target_fps,
            last_frame: None,
        }
    }

    /// Blocks until the configured interval has elapsed since the previous
    /// frame.
    ///
    /// The first call returns immediately and starts the cadence.
    pub fn pace(&mut self) {
        if let Some(last) = self.last_frame {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                thread::sleep(self.interval - elapsed);
            }
        }
        self.last_frame = Some(Instant::now());
    }
}

/// Configuration parameters required to construct a grid renderer.
#[derive(Clone, Debug)]
pub struct RendererConfig {
    cell_size: u32,
    target_fps: u32,
    window_title: String,
}

impl RendererConfig {
    /// Creates a new configuration using the provided geometry and cadence.
    ///
    /// Returns an error when `cell_size` or `target_fps` is zero.
    pub fn new<T>(cell_size: u32, target_fps: u32, window_title: T) -> Result<Self, RenderingError>
    where
        T: Into<String>,
    {
        if cell_size == 0 {
            return Err(RenderingError::InvalidCellSize { cell_size });
        }
        if target_fps == 0 {
            return Err(RenderingError::InvalidFrameRate { target_fps });
        }

        Ok(Self {
            cell_size,
            target_fps,
            window_title: window_title.into(),
        })
    }

    /// Canonical presentation parameters: 50 pixel cells presented at one
    /// frame per second under the standard window title.
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            target_fps: DEFAULT_TARGET_FPS,
            window_title: String::from(ENVIRONMENT_NAME),
        }
    }

    /// Side length of one rasterized grid cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Target presentation cadence in frames per second.
    #[must_use]
    pub const fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Title assigned to the presentation window.
    #[must_use]
    pub fn window_title(&self) -> &str {
        &self.window_title
    }
}

/// Rasterizes observations into frames and presents them through a lazily
/// acquired surface.
///
/// The factory opens the surface on the first draw and later frames reuse
/// it. [`GridRenderer::release`] gives the surface back and may be called
/// repeatedly; drawing after a release acquires a fresh surface.
pub struct GridRenderer {
    config: RendererConfig,
    factory: Box<dyn SurfaceFactory>,
    surface: Option<Box<dyn Surface>>,
    pacer: FramePacer,
}

impl GridRenderer {
    /// Creates a renderer that acquires its surface on first use.
    #[must_use]
    pub fn new(config: RendererConfig, factory: Box<dyn SurfaceFactory>) -> Self {
        let pacer = FramePacer::new(config.target_fps());
        Self {
            config,
            factory,
            surface: None,
            pacer,
        }
    }

    /// Rasterizes the cell grid and presents it as one frame.
    ///
    /// Acquires the surface on demand, then blocks until the configured
    /// frame interval has elapsed. Fails fast when the windowing backend is
    /// unavailable; the failure is surfaced, never retried.
    pub fn draw_frame(&mut self, cells: &CellGrid) -> Result<(), RenderingError> {
        if self.surface.is_none() {
            debug!(
                title = self.config.window_title(),
                "acquiring presentation surface"
            );
            let surface = self
                .factory
                .open(self.config.window_title(), surface_size(self.config.cell_size()))?;
            self.surface = Some(surface);
        }

        let frame = rasterize(cells, self.config.cell_size());
        if let Some(surface) = self.surface.as_mut() {
            surface.present(&frame)?;
        }
        self.pacer.pace();
        Ok(())
    }

    /// Releases the surface if one was acquired; safe to call repeatedly.
    pub fn release(&mut self) {
        if self.surface.take().is_some() {
            debug!("presentation surface released");
        }
    }

    /// Reports whether a surface is currently held.
    #[must_use]
    pub fn is_acquired(&self) -> bool {
        self.surface.is_some()
    }

    /// Active presentation configuration.
    #[must_use]
    pub const fn config(&self) -> &RendererConfig {
        &self.config
    }
}

impl fmt::Debug for GridRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridRenderer")
            .field("config", &self.config)
            .field("acquired", &self.surface.is_some())
            .finish()
    }
}

fn surface_size(cell_size: u32) -> SurfaceSize {
    SurfaceSize::new(
        GRID_COLUMNS as u32 * cell_size,
        GRID_ROWS as u32 * cell_size,
    )
}

fn rasterize(cells: &CellGrid, cell_size: u32) -> FrameBuffer {
    let mut frame = FrameBuffer::new(surface_size(cell_size));
    for (row, row_cells) in cells.iter().enumerate() {
        for (column, cell) in row_cells.iter().enumerate() {
            frame.fill_rect(
                column as u32 * cell_size,
                row as u32 * cell_size,
                cell_size,
                cell_size,
                cell_color(*cell),
            );
        }
    }
    frame
}

/// Errors that can occur when composing or presenting frames.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// The windowing backend cannot be initialized.
    Unavailable {
        /// Backend-provided description of the failure.
        reason: String,
    },
    /// The surface rejected a composed frame.
    PresentFailed {
        /// Backend-provided description of the failure.
        reason: String,
    },
    /// Cell size must be positive to avoid a zero-area frame.
    InvalidCellSize {
        /// Provided cell size that failed validation.
        cell_size: u32,
    },
    /// Frame rate must be positive to derive a pacing interval.
    InvalidFrameRate {
        /// Provided frame rate that failed validation.
        target_fps: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => {
                write!(f, "display backend unavailable: {reason}")
            }
            Self::PresentFailed { reason } => {
                write!(f, "failed to present frame: {reason}")
            }
            Self::InvalidCellSize { cell_size } => {
                write!(f, "cell_size must be positive (received {cell_size})")
            }
            Self::InvalidFrameRate { target_fps } => {
                write!(f, "target_fps must be positive (received {target_fps})")
            }
        }
    }
}

impl Error for RenderingError {}
