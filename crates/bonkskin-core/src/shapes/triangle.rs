//! Triangle shape: a three-sided regular polygon with its first vertex up.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SIN_60: f64 = 0.866_025_403_784_438_6;

/// An equilateral triangle inscribed in a circle of `radius`, stretched by
/// `scale_x`/`scale_y` after resizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub(crate) id: ShapeId,
    /// Center of the circumscribed circle.
    pub center: Point,
    /// Circumradius before scaling.
    pub radius: f64,
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    /// Rotation angle in radians (around the bounds center).
    #[serde(default)]
    pub rotation: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

fn one() -> f64 {
    1.0
}

impl Triangle {
    /// Create a new triangle.
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }

    /// Set the style.
    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    /// The three vertices: top, bottom-right, bottom-left.
    pub fn vertices(&self) -> [Point; 3] {
        let rx = self.radius * self.scale_x;
        let ry = self.radius * self.scale_y;
        [
            Point::new(self.center.x, self.center.y - ry),
            Point::new(self.center.x + rx * SIN_60, self.center.y + ry * 0.5),
            Point::new(self.center.x - rx * SIN_60, self.center.y + ry * 0.5),
        ]
    }
}

impl ShapeTrait for Triangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let [top, right, left] = self.vertices();
        Rect::new(left.x, top.y, right.x, right.y)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let [a, b, c] = self.vertices();
        let cross = |o: Point, p: Point, q: Point| -> f64 {
            (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x)
        };
        let d1 = cross(a, b, point);
        let d2 = cross(b, c, point);
        let d3 = cross(c, a, point);
        let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
        if !(has_neg && has_pos) {
            return true;
        }
        if tolerance <= 0.0 {
            return false;
        }
        [(a, b), (b, c), (c, a)]
            .iter()
            .any(|&(p, q)| point_to_segment_dist(point, p, q) <= tolerance)
    }

    fn to_path(&self) -> BezPath {
        let [a, b, c] = self.vertices();
        let mut path = BezPath::new();
        path.move_to(a);
        path.line_to(b);
        path.line_to(c);
        path.close_path();
        path
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
        if self.radius <= f64::EPSILON {
            return;
        }
        self.scale_x = bounds.width() / (2.0 * self.radius * SIN_60);
        self.scale_y = bounds.height() / (1.5 * self.radius);
        self.center = Point::new(
            bounds.center().x,
            bounds.y0 + self.radius * self.scale_y,
        );
    }
}

/// Distance from a point to a line segment (a→b).
fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    (point - (a + seg * t)).hypot()
}
