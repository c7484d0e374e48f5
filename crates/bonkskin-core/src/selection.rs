//! Selection and the transform affordance attached to the selected shape.

use crate::shapes::{Shape, ShapeId};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Handle size in screen pixels.
pub const HANDLE_SIZE: f64 = 10.0;
/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 12.0;
/// Distance from shape edge to rotation handle (in world units).
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;
/// Smallest width and height the affordance lets a shape shrink to.
pub const DEFAULT_MIN_SIZE: f64 = 10.0;

/// What toolbar mode the transform affordance is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveMode {
    /// Drag to move.
    #[default]
    Move,
    /// Drag the rotation handle.
    Rotate,
    /// Drag the corner anchors.
    Resize,
}

impl ActiveMode {
    pub fn name(self) -> &'static str {
        match self {
            ActiveMode::Move => "move",
            ActiveMode::Rotate => "rotate",
            ActiveMode::Resize => "resize",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "move" => Some(ActiveMode::Move),
            "rotate" => Some(ActiveMode::Rotate),
            "resize" => Some(ActiveMode::Resize),
            _ => None,
        }
    }
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "top-left" | "tl" => Some(Corner::TopLeft),
            "top-right" | "tr" => Some(Corner::TopRight),
            "bottom-left" | "bl" => Some(Corner::BottomLeft),
            "bottom-right" | "br" => Some(Corner::BottomRight),
            _ => None,
        }
    }

    /// The corner diagonally across, which stays put while this one is dragged.
    pub fn opposite(self) -> Self {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }
}

/// Type of affordance handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Corner resize anchor.
    Corner(Corner),
    /// Rotation handle (positioned above the shape).
    Rotate,
}

/// A handle with its position and type.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in world coordinates.
    pub position: Point,
    /// Handle type.
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in world coordinates) hits this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// Resize/rotate affordance bound to one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformAffordance {
    target: ShapeId,
    /// Corner anchors that may be dragged.
    pub enabled_anchors: Vec<Corner>,
    /// Whether the rotation handle is shown.
    pub rotate_enabled: bool,
    /// Whether corner drags keep the aspect ratio.
    pub keep_ratio: bool,
    /// Hidden while exporting.
    pub visible: bool,
    min_size: f64,
}

impl TransformAffordance {
    /// Create an affordance for `target` configured for `mode`.
    pub fn new(target: ShapeId, mode: ActiveMode, min_size: f64) -> Self {
        let mut affordance = Self {
            target,
            enabled_anchors: Vec::new(),
            rotate_enabled: false,
            keep_ratio: false,
            visible: true,
            min_size,
        };
        affordance.configure(mode);
        affordance
    }

    pub fn target(&self) -> ShapeId {
        self.target
    }

    /// Enable the handles that belong to `mode`.
    pub fn configure(&mut self, mode: ActiveMode) {
        match mode {
            ActiveMode::Move => {
                self.enabled_anchors.clear();
                self.rotate_enabled = false;
            }
            ActiveMode::Resize => {
                self.enabled_anchors = Corner::ALL.to_vec();
                self.rotate_enabled = false;
            }
            ActiveMode::Rotate => {
                self.enabled_anchors.clear();
                self.rotate_enabled = true;
            }
        }
    }

    pub fn can_resize(&self, corner: Corner) -> bool {
        self.enabled_anchors.contains(&corner)
    }

    /// Accept a proposed box or keep the old one when it is too small.
    pub fn bound_box(&self, old: Rect, proposed: Rect) -> Rect {
        if proposed.width() < self.min_size || proposed.height() < self.min_size {
            old
        } else {
            proposed
        }
    }

    /// Handles to draw around `shape`, rotated with it.
    pub fn handles(&self, shape: &Shape) -> Vec<Handle> {
        let bounds = shape.bounds();
        let transform = shape.transform();
        let mut handles: Vec<Handle> = self
            .enabled_anchors
            .iter()
            .map(|&corner| {
                Handle::new(transform * corner_point(bounds, corner), HandleKind::Corner(corner))
            })
            .collect();
        if self.rotate_enabled {
            let top = Point::new(bounds.center().x, bounds.y0 - ROTATE_HANDLE_OFFSET);
            handles.push(Handle::new(transform * top, HandleKind::Rotate));
        }
        handles
    }

    /// Find which handle (if any) is hit at the given point.
    pub fn hit_test(&self, shape: &Shape, point: Point, tolerance: f64) -> Option<HandleKind> {
        self.handles(shape)
            .into_iter()
            .find(|h| h.hit_test(point, tolerance))
            .map(|h| h.kind)
    }
}

/// Position of a corner on a bounding box.
pub fn corner_point(bounds: Rect, corner: Corner) -> Point {
    match corner {
        Corner::TopLeft => Point::new(bounds.x0, bounds.y0),
        Corner::TopRight => Point::new(bounds.x1, bounds.y0),
        Corner::BottomLeft => Point::new(bounds.x0, bounds.y1),
        Corner::BottomRight => Point::new(bounds.x1, bounds.y1),
    }
}

/// Bounding box after dragging `corner` by `delta` (normalized, may be tiny).
pub fn resize_bounds(bounds: Rect, corner: Corner, delta: Vec2) -> Rect {
    let (x0, y0, x1, y1) = match corner {
        Corner::TopLeft => (bounds.x0 + delta.x, bounds.y0 + delta.y, bounds.x1, bounds.y1),
        Corner::TopRight => (bounds.x0, bounds.y0 + delta.y, bounds.x1 + delta.x, bounds.y1),
        Corner::BottomLeft => (bounds.x0 + delta.x, bounds.y0, bounds.x1, bounds.y1 + delta.y),
        Corner::BottomRight => (bounds.x0, bounds.y0, bounds.x1 + delta.x, bounds.y1 + delta.y),
    };
    Rect::new(x0, y0, x1, y1).abs()
}

/// Rotation angle that points the rotation handle at `cursor`.
/// `snap_to_15deg` rounds to 15° increments.
pub fn rotation_towards(center: Point, cursor: Point, snap_to_15deg: bool) -> f64 {
    let dx = cursor.x - center.x;
    let dy = cursor.y - center.y;
    // Offset so 0° is up
    let mut angle = dy.atan2(dx) + std::f64::consts::FRAC_PI_2;
    if snap_to_15deg {
        let step = std::f64::consts::PI / 12.0;
        angle = (angle / step).round() * step;
    }
    angle
}

/// Tracks the active shape and its single transform affordance.
#[derive(Debug, Clone)]
pub struct SelectionController {
    active: Option<ShapeId>,
    affordance: Option<TransformAffordance>,
    mode: ActiveMode,
    min_size: f64,
    needs_redraw: bool,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SIZE)
    }
}

impl SelectionController {
    pub fn new(min_size: f64) -> Self {
        Self {
            active: None,
            affordance: None,
            mode: ActiveMode::default(),
            min_size,
            needs_redraw: false,
        }
    }

    /// Make `id` the active shape. Any previous affordance is dropped before
    /// a new one is attached, so at most one exists.
    pub fn select(&mut self, id: Option<ShapeId>) {
        if let Some(previous) = self.active {
            log::debug!("Deselect {previous}");
        }
        self.affordance = None;
        self.active = id;
        if let Some(id) = id {
            self.affordance = Some(TransformAffordance::new(id, self.mode, self.min_size));
            log::debug!("Select {id} ({} mode)", self.mode.name());
        }
        self.needs_redraw = true;
    }

    pub fn active(&self) -> Option<ShapeId> {
        self.active
    }

    pub fn affordance(&self) -> Option<&TransformAffordance> {
        self.affordance.as_ref()
    }

    pub fn mode(&self) -> ActiveMode {
        self.mode
    }

    /// Switch toolbar mode and reconfigure the live affordance.
    pub fn set_mode(&mut self, mode: ActiveMode) {
        self.mode = mode;
        if let Some(affordance) = self.affordance.as_mut() {
            affordance.configure(mode);
        }
        self.needs_redraw = true;
    }

    /// Show or hide the affordance; returns the previous visibility.
    pub fn set_affordance_visible(&mut self, visible: bool) -> bool {
        match self.affordance.as_mut() {
            Some(affordance) => std::mem::replace(&mut affordance.visible, visible),
            None => false,
        }
    }

    /// Take the pending redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rectangle;
    use uuid::Uuid;

    #[test]
    fn test_bound_box_clamps_below_minimum() {
        let affordance = TransformAffordance::new(Uuid::new_v4(), ActiveMode::Resize, 10.0);
        let old = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert_eq!(affordance.bound_box(old, Rect::new(0.0, 0.0, 9.0, 40.0)), old);
        assert_eq!(affordance.bound_box(old, Rect::new(0.0, 0.0, 40.0, 9.9)), old);
        let ok = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(affordance.bound_box(old, ok), ok);
    }

    #[test]
    fn test_mode_configures_handles() {
        let shape = Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), 100.0, 50.0));
        let mut affordance = TransformAffordance::new(shape.id(), ActiveMode::Move, 10.0);
        assert!(affordance.handles(&shape).is_empty());

        affordance.configure(ActiveMode::Resize);
        let handles = affordance.handles(&shape);
        assert_eq!(handles.len(), 4);
        assert!(affordance.can_resize(Corner::BottomRight));

        affordance.configure(ActiveMode::Rotate);
        let handles = affordance.handles(&shape);
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].kind, HandleKind::Rotate);
        assert!((handles[0].position.y - (-ROTATE_HANDLE_OFFSET)).abs() < 1e-9);
    }

    #[test]
    fn test_handle_hit_test() {
        let shape = Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0));
        let affordance = TransformAffordance::new(shape.id(), ActiveMode::Resize, 10.0);
        assert_eq!(
            affordance.hit_test(&shape, Point::new(98.0, 103.0), HANDLE_HIT_TOLERANCE),
            Some(HandleKind::Corner(Corner::BottomRight))
        );
        assert_eq!(affordance.hit_test(&shape, Point::new(50.0, 50.0), HANDLE_HIT_TOLERANCE), None);
    }

    #[test]
    fn test_resize_bounds_normalizes() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let grown = resize_bounds(bounds, Corner::BottomRight, Vec2::new(50.0, 25.0));
        assert_eq!(grown, Rect::new(0.0, 0.0, 150.0, 125.0));
        let flipped = resize_bounds(bounds, Corner::TopLeft, Vec2::new(150.0, 0.0));
        assert_eq!(flipped, Rect::new(100.0, 0.0, 150.0, 100.0));
    }

    #[test]
    fn test_rotation_towards() {
        let center = Point::new(0.0, 0.0);
        assert!(rotation_towards(center, Point::new(0.0, -10.0), false).abs() < 1e-9);
        let right = rotation_towards(center, Point::new(10.0, 0.5), true);
        assert!((right - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_single_affordance_follows_selection() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = SelectionController::default();
        selection.select(Some(a));
        selection.select(Some(b));
        assert_eq!(selection.active(), Some(b));
        assert_eq!(selection.affordance().map(|t| t.target()), Some(b));

        selection.select(None);
        assert!(selection.affordance().is_none());
        assert!(selection.take_redraw());
        assert!(!selection.take_redraw());
    }

    #[test]
    fn test_set_mode_reconfigures_live_affordance() {
        let mut selection = SelectionController::default();
        selection.select(Some(Uuid::new_v4()));
        assert!(!selection.affordance().unwrap().rotate_enabled);
        selection.set_mode(ActiveMode::Rotate);
        assert!(selection.affordance().unwrap().rotate_enabled);
        assert_eq!(ActiveMode::from_name("RESIZE"), Some(ActiveMode::Resize));
    }

    #[test]
    fn test_affordance_visibility() {
        let mut selection = SelectionController::default();
        assert!(!selection.set_affordance_visible(false));
        selection.select(Some(Uuid::new_v4()));
        assert!(selection.set_affordance_visible(false));
        assert!(!selection.affordance().unwrap().visible);
        assert!(!selection.set_affordance_visible(true));
    }
}
