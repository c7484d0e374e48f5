//! Import of uploaded skin images (PNG or SVG).

use crate::registry::ShapeRole;
use crate::scene::Node;
use crate::shapes::{Image, ImageFormat, Shape, ShapeId};
use kurbo::{Point, Size};
use thiserror::Error;

/// Share of the smaller stage side a raster import may occupy.
pub const RASTER_FIT_FRACTION: f64 = 0.9;
/// Share of the smaller stage side a vector import may occupy.
pub const VECTOR_FIT_FRACTION: f64 = 0.8;

/// Import errors.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Only PNG or SVG files allowed!")]
    UnsupportedExtension(String),
    #[error("Could not decode {file_name}: {reason}")]
    Decode { file_name: String, reason: String },
}

/// A validated upload whose bytes are still being read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTicket {
    pub(crate) generation: u64,
    pub format: ImageFormat,
    pub file_name: String,
}

/// Result of completing an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The image was placed on the stage and selected.
    Applied(ShapeId),
    /// A newer import started meanwhile; nothing was changed.
    Superseded,
}

/// Validate an upload by its file name.
pub fn check_file_name(file_name: &str) -> Result<ImageFormat, ImportError> {
    ImageFormat::from_file_name(file_name)
        .ok_or_else(|| ImportError::UnsupportedExtension(file_name.to_string()))
}

/// Intrinsic size of an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Decode far enough to know the intrinsic size.
pub fn decode(format: ImageFormat, file_name: &str, bytes: &[u8]) -> Result<DecodedImage, ImportError> {
    let fail = |reason: String| ImportError::Decode {
        file_name: file_name.to_string(),
        reason,
    };
    let (width, height) = match format {
        ImageFormat::Png => {
            let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
                .map_err(|e| fail(e.to_string()))?;
            (img.width(), img.height())
        }
        ImageFormat::Svg => {
            let tree = resvg::usvg::Tree::from_data(bytes, &resvg::usvg::Options::default())
                .map_err(|e| fail(e.to_string()))?;
            let size = tree.size();
            (size.width().ceil() as u32, size.height().ceil() as u32)
        }
    };
    if width == 0 || height == 0 {
        return Err(fail("image has no area".to_string()));
    }
    Ok(DecodedImage {
        format,
        width,
        height,
    })
}

/// The main image node, fitted into the stage and centred on it.
pub fn main_image_node(decoded: DecodedImage, bytes: &[u8], stage: Size) -> Node {
    let (fraction, name) = if decoded.format.is_vector() {
        (VECTOR_FIT_FRACTION, "Skin SVG")
    } else {
        (RASTER_FIT_FRACTION, "Skin Image")
    };
    let max_side = stage.width.min(stage.height) * fraction;
    let image = Image::new(Point::ZERO, bytes, decoded.width, decoded.height, decoded.format)
        .fit_within(max_side, max_side)
        .centered_on(Point::new(stage.width / 2.0, stage.height / 2.0));
    Node::new(name, ShapeRole::MainImage, Shape::Image(image))
}
