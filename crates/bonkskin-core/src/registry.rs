//! Shape registry: the ordered layer list shown next to the stage.

use crate::scene::SkinDocument;
use crate::shapes::ShapeId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a shape in the skin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeRole {
    /// The circular backdrop; never selectable or deletable.
    Background,
    /// An uploaded skin image.
    MainImage,
    /// Any shape added from the toolbar.
    GenericElement,
}

impl ShapeRole {
    /// Whether clicks and the layer list may select this shape.
    pub fn is_selectable(self) -> bool {
        match self {
            ShapeRole::Background => false,
            ShapeRole::MainImage | ShapeRole::GenericElement => true,
        }
    }

    /// Whether the shape may be deleted on its own.
    pub fn is_deletable(self) -> bool {
        match self {
            ShapeRole::Background => false,
            ShapeRole::MainImage | ShapeRole::GenericElement => true,
        }
    }
}

/// What the layer list knows about a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeDescriptor {
    pub id: ShapeId,
    pub name: String,
    pub role: ShapeRole,
}

impl ShapeDescriptor {
    pub fn new(id: ShapeId, name: impl Into<String>, role: ShapeRole) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }
}

/// Layer list entry as stored in project files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub id: String,
    pub name: String,
}

/// Registry errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Shape {0} is already in the layer list")]
    DuplicateId(ShapeId),
}

/// Ordered list of shape descriptors with at most one highlighted entry.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    entries: Vec<ShapeDescriptor>,
    highlighted: Option<ShapeId>,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a descriptor. Ids must be unique.
    pub fn add(&mut self, descriptor: ShapeDescriptor) -> Result<(), RegistryError> {
        if self.contains(descriptor.id) {
            return Err(RegistryError::DuplicateId(descriptor.id));
        }
        self.entries.push(descriptor);
        Ok(())
    }

    /// Remove an entry, dropping its highlight.
    pub fn remove(&mut self, id: ShapeId) -> Option<ShapeDescriptor> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        if self.highlighted == Some(id) {
            self.highlighted = None;
        }
        Some(self.entries.remove(pos))
    }

    /// Empty the list.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.highlighted = None;
    }

    /// Resolve a layer-list entry by id.
    pub fn resolve(&self, id: ShapeId) -> Option<&ShapeDescriptor> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.resolve(id).is_some()
    }

    pub fn entries(&self) -> &[ShapeDescriptor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highlight one entry (or none). Unknown ids clear the highlight.
    pub fn set_highlight(&mut self, id: Option<ShapeId>) {
        self.highlighted = id.filter(|&id| self.contains(id));
    }

    pub fn highlighted(&self) -> Option<ShapeId> {
        self.highlighted
    }

    /// Replace the list with one entry per scene node, in z-order.
    pub fn rebuild_from(&mut self, document: &SkinDocument) {
        self.entries = document.nodes().map(|n| n.descriptor()).collect();
        self.highlighted = None;
    }

    /// Export the `{id, name}` list stored in project files.
    pub fn layer_info(&self) -> Vec<LayerInfo> {
        self.entries
            .iter()
            .map(|e| LayerInfo {
                id: e.id.to_string(),
                name: e.name.clone(),
            })
            .collect()
    }
}
