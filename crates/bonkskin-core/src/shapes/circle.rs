//! Circle shape (an ellipse once resized non-uniformly).

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Ellipse as KurboEllipse, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ShapeId,
    /// Center point.
    pub center: Point,
    /// Horizontal radius.
    pub radius_x: f64,
    /// Vertical radius.
    pub radius_y: f64,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Circle {
    /// Create a new circle.
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius_x: radius,
            radius_y: radius,
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }

    /// Set the style.
    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    /// Get as a kurbo Ellipse.
    pub fn as_kurbo(&self) -> KurboEllipse {
        KurboEllipse::new(self.center, (self.radius_x, self.radius_y), 0.0)
    }
}

impl ShapeTrait for Circle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius_x,
            self.center.y - self.radius_y,
            self.center.x + self.radius_x,
            self.center.y + self.radius_y,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let half_sw = self.style.stroke_width / 2.0;
        let rx = self.radius_x + tolerance + half_sw;
        let ry = self.radius_y + tolerance + half_sw;
        if rx < f64::EPSILON || ry < f64::EPSILON {
            return false;
        }
        let dx = (point.x - self.center.x) / rx;
        let dy = (point.y - self.center.y) / ry;
        dx * dx + dy * dy <= 1.0
    }

    fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.center = bounds.center();
        self.radius_x = bounds.width() / 2.0;
        self.radius_y = bounds.height() / 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_creation() {
        let circle = Circle::new(Point::new(250.0, 250.0), 50.0);
        assert!((circle.radius_x - circle.radius_y).abs() < f64::EPSILON);
        assert!((circle.center.x - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_edge() {
        let circle = Circle::new(Point::new(0.0, 0.0), 10.0);
        assert!(circle.hit_test(Point::new(0.0, 0.0), 0.0));
        assert!(circle.hit_test(Point::new(10.0, 0.0), 0.0));
        assert!(!circle.hit_test(Point::new(15.0, 0.0), 0.0));
        assert!(circle.hit_test(Point::new(15.0, 0.0), 6.0));
    }

    #[test]
    fn test_bounds() {
        let circle = Circle::new(Point::new(50.0, 50.0), 30.0);
        let bounds = circle.bounds();
        assert!((bounds.x0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_translate_and_set_bounds() {
        let mut circle = Circle::new(Point::new(50.0, 50.0), 30.0);
        circle.translate(Vec2::new(10.0, -5.0));
        assert!((circle.center.x - 60.0).abs() < f64::EPSILON);
        assert!((circle.center.y - 45.0).abs() < f64::EPSILON);

        circle.set_bounds(Rect::new(0.0, 0.0, 100.0, 40.0));
        assert!((circle.radius_x - 50.0).abs() < f64::EPSILON);
        assert!((circle.radius_y - 20.0).abs() < f64::EPSILON);
        assert!((circle.center.y - 20.0).abs() < f64::EPSILON);
    }
}
