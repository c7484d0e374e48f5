//! Image shape for embedding an uploaded raster or vector skin.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    /// PNG raster image.
    Png,
    /// SVG vector image.
    Svg,
}

impl ImageFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "svg" => Some(ImageFormat::Svg),
            _ => None,
        }
    }

    /// Detect format from the extension of a file name (`skin.PNG` → Png).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Whether this is a vector format.
    pub fn is_vector(&self) -> bool {
        matches!(self, ImageFormat::Svg)
    }
}

/// An image shape that displays a decoded skin image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    /// Intrinsic image width.
    pub source_width: u32,
    /// Intrinsic image height.
    pub source_height: u32,
    /// Image format.
    pub format: ImageFormat,
    /// Image data as base64-encoded string, so snapshots stay plain JSON text.
    pub data_base64: String,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
    /// Style properties (unused for fill; kept for a uniform shape API).
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Image {
    /// Create a new image shape from raw image bytes, displayed at intrinsic size.
    pub fn new(
        position: Point,
        data: &[u8],
        source_width: u32,
        source_height: u32,
        format: ImageFormat,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: source_width as f64,
            height: source_height as f64,
            source_width,
            source_height,
            format,
            data_base64: STANDARD.encode(data),
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }

    /// Scale uniformly so the image fits within `max_width` × `max_height`.
    pub fn fit_within(mut self, max_width: f64, max_height: f64) -> Self {
        let scale = uniform_fit_scale(
            self.source_width as f64,
            self.source_height as f64,
            max_width,
            max_height,
        );
        self.width = self.source_width as f64 * scale;
        self.height = self.source_height as f64 * scale;
        self
    }

    /// Move the image so its center sits on `center`.
    pub fn centered_on(mut self, center: Point) -> Self {
        self.position = Point::new(center.x - self.width / 2.0, center.y - self.height / 2.0);
        self
    }

    /// Get the raw image data (decoded from base64).
    pub fn data(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.data_base64).ok()
    }

    /// Get the bounding rectangle.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }
}

/// Largest scale that fits `width` × `height` inside `max_width` × `max_height`.
pub fn uniform_fit_scale(width: f64, height: f64, max_width: f64, max_height: f64) -> f64 {
    if width <= 0.0 || height <= 0.0 {
        return 1.0;
    }
    (max_width / width).min(max_height / height)
}

impl ShapeTrait for Image {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_rect().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.position = Point::new(bounds.x0, bounds.y0);
        self.width = bounds.width();
        self.height = bounds.height();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_extension("png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("svg"), Some(ImageFormat::Svg));
        assert_eq!(ImageFormat::from_extension("jpg"), None);
        assert_eq!(ImageFormat::from_file_name("my.skin.Svg"), Some(ImageFormat::Svg));
        assert_eq!(ImageFormat::from_file_name("notes.txt"), None);
        assert_eq!(ImageFormat::from_file_name("png"), None);
    }

    #[test]
    fn test_fit_within() {
        let img = Image::new(Point::ZERO, &[0u8; 10], 1000, 500, ImageFormat::Png);
        let fitted = img.fit_within(450.0, 450.0);
        assert!((fitted.width - 450.0).abs() < 0.01);
        assert!((fitted.height - 225.0).abs() < 0.01);
    }

    #[test]
    fn test_centered_on() {
        let img = Image::new(Point::ZERO, &[1, 2, 3], 100, 50, ImageFormat::Png)
            .centered_on(Point::new(250.0, 250.0));
        assert!((img.position.x - 200.0).abs() < f64::EPSILON);
        assert!((img.position.y - 225.0).abs() < f64::EPSILON);
        assert_eq!(img.data(), Some(vec![1, 2, 3]));
    }
}
