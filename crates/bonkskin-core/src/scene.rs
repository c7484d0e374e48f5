//! Skin scene document: the ordered set of nodes drawn on the stage.

use crate::config::EditorConfig;
use crate::history::Snapshot;
use crate::registry::{ShapeDescriptor, ShapeRole};
use crate::shapes::{Circle, Shape, ShapeId, ShapeStyle};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scene errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Snapshot could not be encoded: {0}")]
    Encode(String),
    #[error("Snapshot could not be decoded: {0}")]
    Decode(String),
    #[error("Snapshot contains duplicate shape id {0}")]
    DuplicateId(ShapeId),
}

/// A drawable node: a shape plus the descriptor data the layer list shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Display name shown in the layer list.
    pub name: String,
    /// Role tag.
    pub role: ShapeRole,
    /// Whether the node can be dragged around.
    #[serde(default = "default_draggable")]
    pub draggable: bool,
    /// Geometry and style.
    pub shape: Shape,
}

fn default_draggable() -> bool {
    true
}

impl Node {
    /// Create a node; backgrounds are never draggable.
    pub fn new(name: impl Into<String>, role: ShapeRole, shape: Shape) -> Self {
        Self {
            name: name.into(),
            draggable: role != ShapeRole::Background,
            role,
            shape,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.shape.id()
    }

    /// Descriptor mirrored by the layer list.
    pub fn descriptor(&self) -> ShapeDescriptor {
        ShapeDescriptor::new(self.id(), self.name.clone(), self.role)
    }
}

/// The scene: nodes in z-order (back to front).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinDocument {
    nodes: Vec<Node>,
}

impl SkinDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node on top of the z-order.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Remove a node from the document.
    pub fn remove_node(&mut self, id: ShapeId) -> Option<Node> {
        let pos = self.position(id)?;
        Some(self.nodes.remove(pos))
    }

    /// Clear all nodes.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn node(&self, id: ShapeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn node_mut(&mut self, id: ShapeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id() == id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: ShapeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id() == id)
    }

    /// Nodes in z-order (back to front).
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Find nodes at a point, front to back.
    pub fn nodes_at_point(&self, point: Point, tolerance: f64) -> Vec<ShapeId> {
        self.nodes
            .iter()
            .rev()
            .filter(|n| n.shape.hit_test(point, tolerance))
            .map(|n| n.id())
            .collect()
    }

    /// Move a node one layer forward (towards front).
    /// Returns true if the node was moved, false if already at front.
    pub fn bring_forward(&mut self, id: ShapeId) -> bool {
        if let Some(pos) = self.position(id) {
            if pos + 1 < self.nodes.len() {
                self.nodes.swap(pos, pos + 1);
                return true;
            }
        }
        false
    }

    /// Move a node one layer backward, never below a background node.
    /// Returns true if the node was moved.
    pub fn send_backward(&mut self, id: ShapeId) -> bool {
        if let Some(pos) = self.position(id) {
            if pos > 0 && self.nodes[pos - 1].role != ShapeRole::Background {
                self.nodes.swap(pos, pos - 1);
                return true;
            }
        }
        false
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Serialize the whole scene into a self-contained snapshot.
    pub fn to_snapshot(&self) -> Result<Snapshot, SceneError> {
        serde_json::to_string(self)
            .map(Snapshot::new)
            .map_err(|e| SceneError::Encode(e.to_string()))
    }

    /// Rebuild a scene from a snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, SceneError> {
        let doc: Self = serde_json::from_str(snapshot.as_str())
            .map_err(|e| SceneError::Decode(e.to_string()))?;
        let mut seen = std::collections::HashSet::new();
        for node in &doc.nodes {
            if !seen.insert(node.id()) {
                return Err(SceneError::DuplicateId(node.id()));
            }
        }
        Ok(doc)
    }
}

/// Background disc filling the stage circle.
pub fn background_node(stage: Size, config: &EditorConfig) -> Node {
    let center = Point::new(stage.width / 2.0, stage.height / 2.0);
    let radius = (stage.width / 2.0 - config.background_inset).max(0.0);
    let circle = Circle::new(center, radius).with_style(ShapeStyle::filled(config.background_fill));
    Node::new("Background", ShapeRole::Background, Shape::Circle(circle))
}

/// The decorative circle of the default skin.
pub fn default_circle_node(stage: Size, config: &EditorConfig) -> Node {
    let center = Point::new(stage.width / 2.0, stage.height / 2.0);
    let style = ShapeStyle::filled(config.default_fill)
        .with_stroke(crate::shapes::SerializableColor::white(), 2.0);
    let circle = Circle::new(center, stage.width / 4.0).with_style(style);
    Node::new("Circle", ShapeRole::GenericElement, Shape::Circle(circle))
}
