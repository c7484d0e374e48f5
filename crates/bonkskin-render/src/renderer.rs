//! Renderer trait abstraction.

use bonkskin_core::scene::SkinDocument;
use bonkskin_core::selection::TransformAffordance;
use kurbo::{Point, Size};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid output size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Circular clip applied to the finished frame, in stage coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleClip {
    pub center: Point,
    pub radius: f64,
}

impl CircleClip {
    /// The skin circle: radius half the stage width, centred on the stage.
    pub fn for_stage(stage: Size) -> Self {
        Self {
            center: Point::new(stage.width / 2.0, stage.height / 2.0),
            radius: stage.width / 2.0,
        }
    }
}

/// Context for a single render.
pub struct RenderContext<'a> {
    /// The scene to render.
    pub document: &'a SkinDocument,
    /// Stage size in logical pixels.
    pub stage_size: Size,
    /// Output pixels per logical pixel.
    pub pixel_ratio: f64,
    /// Optional circular clip.
    pub clip: Option<CircleClip>,
    /// Affordance to draw over the selected shape.
    pub affordance: Option<&'a TransformAffordance>,
    /// Affordance outline colour.
    pub selection_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(document: &'a SkinDocument, stage_size: Size) -> Self {
        Self {
            document,
            stage_size,
            pixel_ratio: 1.0,
            clip: None,
            affordance: None,
            selection_color: Color::from_rgba8(0, 161, 255, 255),
        }
    }

    /// Set the supersampling factor.
    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn with_clip(mut self, clip: Option<CircleClip>) -> Self {
        self.clip = clip;
        self
    }

    /// Draw this affordance (hidden affordances are skipped).
    pub fn with_affordance(mut self, affordance: Option<&'a TransformAffordance>) -> Self {
        self.affordance = affordance;
        self
    }

    /// Output size in physical pixels.
    pub fn output_size(&self) -> (u32, u32) {
        (
            (self.stage_size.width * self.pixel_ratio).round() as u32,
            (self.stage_size.height * self.pixel_ratio).round() as u32,
        )
    }
}

/// Straight-alpha RGBA8 frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    /// RGBA pixel data (4 bytes per pixel).
    pub rgba_data: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl RenderedImage {
    /// RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.rgba_data
            .get(i..i + 4)
            .and_then(|p| <[u8; 4]>::try_from(p).ok())
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Rasterize the scene described by `ctx`.
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<RenderedImage>;
}
