//! Shape definitions for the skin canvas.

mod circle;
mod image;
mod rectangle;
mod triangle;

pub use circle::Circle;
pub use image::{Image, ImageFormat};
pub use rectangle::Rectangle;
pub use triangle::Triangle;

use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Parse `#rrggbb`, `#rrggbbaa` or `#rgb` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16)? as u8;
                    out[i] = v * 17;
                }
                Some(Self::rgb(out[0], out[1], out[2]))
            }
            6 => Some(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb` (alpha is dropped when opaque).
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties for shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
    /// Stroke color (None = no outline).
    #[serde(default)]
    pub stroke_color: Option<SerializableColor>,
    /// Stroke width.
    #[serde(default)]
    pub stroke_width: f64,
}

impl ShapeStyle {
    /// A filled style without outline.
    pub fn filled(color: SerializableColor) -> Self {
        Self {
            fill_color: Some(color),
            stroke_color: None,
            stroke_width: 0.0,
        }
    }

    /// Add an outline.
    pub fn with_stroke(mut self, color: SerializableColor, width: f64) -> Self {
        self.stroke_color = Some(color);
        self.stroke_width = width;
        self
    }

    /// Whether an outline is drawn.
    pub fn has_stroke(&self) -> bool {
        self.stroke_color.is_some() && self.stroke_width > 0.0
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill_color: None,
            stroke_color: None,
            stroke_width: 0.0,
        }
    }
}

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the unrotated bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in the shape's unrotated frame) hits this shape.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Get the unrotated outline for rendering.
    fn to_path(&self) -> BezPath;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Move the shape by a delta.
    fn translate(&mut self, delta: Vec2);

    /// Fit the shape into a new unrotated bounding box.
    fn set_bounds(&mut self, bounds: Rect);
}

/// Enum wrapper for all shape types (for serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle(Circle),
    Rectangle(Rectangle),
    Triangle(Triangle),
    Image(Image),
}

impl Shape {
    fn inner(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Circle(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Triangle(s) => s,
            Shape::Image(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Circle(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Triangle(s) => s,
            Shape::Image(s) => s,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.inner().id()
    }

    pub fn bounds(&self) -> Rect {
        self.inner().bounds()
    }

    pub fn to_path(&self) -> BezPath {
        self.inner().to_path()
    }

    pub fn style(&self) -> &ShapeStyle {
        self.inner().style()
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        self.inner_mut().style_mut()
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.inner_mut().translate(delta);
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.inner_mut().set_bounds(bounds);
    }

    /// Hit test in world coordinates, undoing the shape's rotation first.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let local = self.transform().inverse() * point;
        self.inner().hit_test(local, tolerance)
    }

    /// Get the rotation angle in radians (around the bounds center).
    pub fn rotation(&self) -> f64 {
        match self {
            Shape::Circle(s) => s.rotation,
            Shape::Rectangle(s) => s.rotation,
            Shape::Triangle(s) => s.rotation,
            Shape::Image(s) => s.rotation,
        }
    }

    /// Set the rotation angle in radians.
    pub fn set_rotation(&mut self, rotation: f64) {
        match self {
            Shape::Circle(s) => s.rotation = rotation,
            Shape::Rectangle(s) => s.rotation = rotation,
            Shape::Triangle(s) => s.rotation = rotation,
            Shape::Image(s) => s.rotation = rotation,
        }
    }

    /// Transform from the unrotated frame into world coordinates.
    pub fn transform(&self) -> Affine {
        Affine::rotate_about(self.rotation(), self.bounds().center())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_hex_round_trip() {
        let color = SerializableColor::from_hex("#00c3ff").unwrap();
        assert_eq!(color, SerializableColor::rgb(0x00, 0xc3, 0xff));
        assert_eq!(color.to_hex(), "#00c3ff");
    }

    #[test]
    fn test_hex_short_and_alpha() {
        assert_eq!(
            SerializableColor::from_hex("fff"),
            Some(SerializableColor::white())
        );
        let translucent = SerializableColor::from_hex("#22222280").unwrap();
        assert_eq!(translucent.a, 0x80);
        assert_eq!(translucent.to_hex(), "#22222280");
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert_eq!(SerializableColor::from_hex("#12"), None);
        assert_eq!(SerializableColor::from_hex("#zzzzzz"), None);
        assert_eq!(SerializableColor::from_hex("#ééé"), None);
    }

    #[test]
    fn test_peniko_conversion() {
        let color = SerializableColor::rgb(10, 20, 30);
        let peniko_color: Color = color.into();
        assert_eq!(SerializableColor::from(peniko_color), color);
    }

    #[test]
    fn test_rotated_hit_test() {
        let mut shape = Shape::Rectangle(Rectangle::new(Point::new(0.0, 40.0), 100.0, 20.0));
        // Unrotated: the bar is horizontal.
        assert!(shape.hit_test(Point::new(90.0, 50.0), 0.0));
        assert!(!shape.hit_test(Point::new(50.0, 90.0), 0.0));

        shape.set_rotation(FRAC_PI_2);
        // Rotated a quarter turn about (50, 50): the bar is now vertical.
        assert!(!shape.hit_test(Point::new(90.0, 50.0), 0.0));
        assert!(shape.hit_test(Point::new(50.0, 90.0), 0.0));
    }

    #[test]
    fn test_set_bounds_dispatch() {
        let mut shape = Shape::Circle(Circle::new(Point::new(50.0, 50.0), 10.0));
        shape.set_bounds(Rect::new(0.0, 0.0, 40.0, 20.0));
        let bounds = shape.bounds();
        assert!((bounds.width() - 40.0).abs() < 1e-9);
        assert!((bounds.height() - 20.0).abs() < 1e-9);
    }
}
