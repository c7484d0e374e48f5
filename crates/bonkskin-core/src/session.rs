//! The editor session: one owner for the scene, the layer list, the
//! selection, and the undo history.

use crate::config::EditorConfig;
use crate::history::{History, Snapshot};
use crate::import::{self, ImportError, ImportOutcome, ImportTicket};
use crate::project::{ProjectError, ProjectFile};
use crate::registry::{RegistryError, ShapeRegistry, ShapeRole};
use crate::scene::{Node, SceneError, SkinDocument, background_node, default_circle_node};
use crate::selection::{
    ActiveMode, Corner, HANDLE_HIT_TOLERANCE, HandleKind, SelectionController, corner_point,
    resize_bounds, rotation_towards,
};
use crate::shapes::{
    Circle, Rectangle, SerializableColor, Shape, ShapeId, ShapeStyle, Triangle,
};
use crate::storage::{AutoSaveBridge, Storage};
use kurbo::{Point, Size, Vec2};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Snapshot(#[from] SceneError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type for session operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Shapes the toolbar can add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewShape {
    Circle,
    Rect,
    Triangle,
}

impl NewShape {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "circle" => Some(NewShape::Circle),
            "rect" | "rectangle" => Some(NewShape::Rect),
            "triangle" => Some(NewShape::Triangle),
            _ => None,
        }
    }

    /// Layer list name.
    pub fn display_name(self) -> &'static str {
        match self {
            NewShape::Circle => "Circle",
            NewShape::Rect => "Rect",
            NewShape::Triangle => "Triangle",
        }
    }

    fn build(self, center: Point, style: ShapeStyle) -> Shape {
        match self {
            NewShape::Circle => Shape::Circle(Circle::new(center, 50.0).with_style(style)),
            NewShape::Rect => {
                Shape::Rectangle(Rectangle::centered(center, 100.0, 100.0).with_style(style))
            }
            NewShape::Triangle => Shape::Triangle(Triangle::new(center, 50.0).with_style(style)),
        }
    }
}

/// Live editor state.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    stage_size: Size,
    document: SkinDocument,
    registry: ShapeRegistry,
    selection: SelectionController,
    history: History,
    autosave: Option<AutoSaveBridge>,
    current_fill: SerializableColor,
    import_generation: u64,
}

impl EditorSession {
    /// An empty session without autosave.
    pub fn new(config: EditorConfig) -> Self {
        Self {
            stage_size: config.stage_size,
            selection: SelectionController::new(config.min_transform_size),
            history: History::new(config.history_limit),
            current_fill: config.default_fill,
            document: SkinDocument::new(),
            registry: ShapeRegistry::new(),
            autosave: None,
            import_generation: 0,
            config,
        }
    }

    /// A session showing the default skin, recorded as the first history entry.
    pub fn with_default_skin(config: EditorConfig) -> EditorResult<Self> {
        let mut session = Self::new(config);
        session.add_default_skin()?;
        Ok(session)
    }

    /// Start a session backed by `storage`, restoring the autosaved scene
    /// when there is a valid one and falling back to the default skin.
    pub fn open(config: EditorConfig, storage: Arc<dyn Storage>) -> EditorResult<Self> {
        let bridge = AutoSaveBridge::new(storage, config.autosave_key.clone());
        let restored = bridge.restore();
        let mut session = Self::new(config);
        session.autosave = Some(bridge);

        if let Some(snapshot) = restored {
            match SkinDocument::from_snapshot(&snapshot) {
                Ok(document) => {
                    log::info!("Restored autosaved skin ({} shapes)", document.len());
                    session.replace_document(document);
                    session.commit()?;
                    return Ok(session);
                }
                Err(e) => log::warn!("Could not load autosaved content: {}", e),
            }
        }
        session.add_default_skin()?;
        Ok(session)
    }

    fn add_default_skin(&mut self) -> EditorResult<()> {
        let background = background_node(self.stage_size, &self.config);
        let circle = default_circle_node(self.stage_size, &self.config);
        let circle_id = circle.id();
        self.insert_node(background)?;
        self.insert_node(circle)?;
        self.apply_selection(Some(circle_id));
        self.commit()
    }

    fn insert_node(&mut self, node: Node) -> EditorResult<ShapeId> {
        let id = node.id();
        self.registry.add(node.descriptor())?;
        self.document.add_node(node);
        Ok(id)
    }

    /// Swap in a restored scene; the layer list is rebuilt and nothing is selected.
    fn replace_document(&mut self, document: SkinDocument) {
        self.document = document;
        self.registry.rebuild_from(&self.document);
        self.apply_selection(None);
    }

    fn clear_scene(&mut self) {
        self.document.clear();
        self.registry.clear();
        self.apply_selection(None);
    }

    fn apply_selection(&mut self, id: Option<ShapeId>) {
        self.selection.select(id);
        self.registry.set_highlight(id);
    }

    /// Record the live scene in history and mirror it to autosave.
    fn commit(&mut self) -> EditorResult<()> {
        let snapshot = self.document.to_snapshot()?;
        if let Some(autosave) = &self.autosave {
            autosave.persist(&snapshot);
        }
        self.history.push(snapshot);
        Ok(())
    }

    // --- Shapes ---

    /// Add a toolbar shape at the stage centre, filled with the current colour,
    /// and select it.
    pub fn add_shape(&mut self, kind: NewShape) -> EditorResult<ShapeId> {
        let center = Point::new(self.stage_size.width / 2.0, self.stage_size.height / 2.0);
        let shape = kind.build(center, ShapeStyle::filled(self.current_fill));
        let id = self.insert_node(Node::new(
            kind.display_name(),
            ShapeRole::GenericElement,
            shape,
        ))?;
        log::debug!("Added {} {}", kind.display_name(), id);
        self.apply_selection(Some(id));
        self.commit()?;
        Ok(id)
    }

    /// Delete the selected shape. Returns false when nothing deletable is selected.
    pub fn delete_selected(&mut self) -> EditorResult<bool> {
        let Some(node) = self.selected_node() else {
            return Ok(false);
        };
        if !node.role.is_deletable() {
            return Ok(false);
        }
        let id = node.id();
        self.document.remove_node(id);
        self.registry.remove(id);
        self.apply_selection(None);
        self.commit()?;
        Ok(true)
    }

    // --- Selection ---

    /// Select a shape (or clear the selection with `None`). Returns false,
    /// changing nothing, for unknown ids and the background.
    pub fn select(&mut self, id: Option<ShapeId>) -> bool {
        if let Some(id) = id {
            let selectable = self
                .document
                .node(id)
                .is_some_and(|n| n.role.is_selectable());
            if !selectable {
                return false;
            }
        }
        self.apply_selection(id);
        true
    }

    /// Layer-list click.
    pub fn select_layer(&mut self, id: ShapeId) -> bool {
        self.registry.contains(id) && self.select(Some(id))
    }

    /// Stage click: select the front-most selectable shape under `point`.
    /// Clicking empty stage or the background leaves the selection alone.
    pub fn select_at(&mut self, point: Point) -> Option<ShapeId> {
        let hit = self
            .document
            .nodes_at_point(point, 0.0)
            .into_iter()
            .find(|&id| {
                self.document
                    .node(id)
                    .is_some_and(|n| n.role.is_selectable())
            })?;
        self.apply_selection(Some(hit));
        Some(hit)
    }

    pub fn set_mode(&mut self, mode: ActiveMode) {
        log::debug!("Mode: {}", mode.name());
        self.selection.set_mode(mode);
    }

    /// Set the picker colour. The selected shape, if any, is recoloured.
    pub fn set_fill_color(&mut self, color: SerializableColor) -> EditorResult<bool> {
        self.current_fill = color;
        let Some(id) = self.selection.active() else {
            return Ok(false);
        };
        let Some(node) = self.document.node_mut(id) else {
            return Ok(false);
        };
        node.shape.style_mut().fill_color = Some(color);
        self.commit()?;
        Ok(true)
    }

    // --- Transforms ---

    /// Drag the selected shape.
    pub fn translate_selected(&mut self, delta: Vec2) -> EditorResult<bool> {
        let Some(id) = self.selection.active() else {
            return Ok(false);
        };
        match self.document.node_mut(id) {
            Some(node) if node.draggable => node.shape.translate(delta),
            _ => return Ok(false),
        }
        self.commit()?;
        Ok(true)
    }

    /// Drag a corner anchor by `delta` (world units). Only available in
    /// resize mode; boxes under the minimum size are refused.
    pub fn resize_selected(&mut self, corner: Corner, delta: Vec2) -> EditorResult<bool> {
        let Some(affordance) = self.selection.affordance() else {
            return Ok(false);
        };
        if !affordance.can_resize(corner) {
            return Ok(false);
        }
        let affordance = affordance.clone();
        let Some(node) = self.document.node_mut(affordance.target()) else {
            return Ok(false);
        };
        // Corner drags happen in the shape's own (unrotated) frame.
        let (sin, cos) = (-node.shape.rotation()).sin_cos();
        let local = Vec2::new(delta.x * cos - delta.y * sin, delta.x * sin + delta.y * cos);

        let old = node.shape.bounds();
        let new = affordance.bound_box(old, resize_bounds(old, corner, local));
        if new == old {
            return Ok(false);
        }
        // The rotation pivot follows the box centre, so pin the opposite
        // corner back to where it was on screen.
        let anchor = corner_point(old, corner.opposite());
        let pinned = node.shape.transform() * anchor;
        node.shape.set_bounds(new);
        let moved = node.shape.transform() * anchor;
        node.shape.translate(pinned - moved);
        self.commit()?;
        Ok(true)
    }

    /// The handle of the live affordance under `point`, if any.
    pub fn handle_at(&self, point: Point) -> Option<HandleKind> {
        let affordance = self.selection.affordance()?;
        let node = self.document.node(affordance.target())?;
        affordance.hit_test(&node.shape, point, HANDLE_HIT_TOLERANCE)
    }

    /// Point the rotation handle at `cursor`. Only available in rotate mode.
    pub fn rotate_selected(&mut self, cursor: Point, snap: bool) -> EditorResult<bool> {
        let Some(affordance) = self.selection.affordance() else {
            return Ok(false);
        };
        if !affordance.rotate_enabled {
            return Ok(false);
        }
        let target = affordance.target();
        let Some(node) = self.document.node_mut(target) else {
            return Ok(false);
        };
        let angle = rotation_towards(node.shape.bounds().center(), cursor, snap);
        node.shape.set_rotation(angle);
        self.commit()?;
        Ok(true)
    }

    // --- Z-order ---

    pub fn bring_forward(&mut self) -> EditorResult<bool> {
        self.reorder_selected(SkinDocument::bring_forward)
    }

    pub fn send_backward(&mut self) -> EditorResult<bool> {
        self.reorder_selected(SkinDocument::send_backward)
    }

    fn reorder_selected(
        &mut self,
        op: fn(&mut SkinDocument, ShapeId) -> bool,
    ) -> EditorResult<bool> {
        let Some(id) = self.selection.active() else {
            return Ok(false);
        };
        if !op(&mut self.document, id) {
            return Ok(false);
        }
        self.registry.rebuild_from(&self.document);
        self.registry.set_highlight(Some(id));
        self.commit()?;
        Ok(true)
    }

    // --- History ---

    /// Step back one entry. Returns false at the start of history. A snapshot
    /// that cannot be restored leaves both the scene and the cursor unchanged.
    pub fn undo(&mut self) -> EditorResult<bool> {
        let Some(snapshot) = self.history.undo().cloned() else {
            return Ok(false);
        };
        if let Err(e) = self.restore(&snapshot) {
            self.history.redo();
            return Err(e);
        }
        Ok(true)
    }

    /// Step forward one entry. Returns false at the end of history.
    pub fn redo(&mut self) -> EditorResult<bool> {
        let Some(snapshot) = self.history.redo().cloned() else {
            return Ok(false);
        };
        if let Err(e) = self.restore(&snapshot) {
            self.history.undo();
            return Err(e);
        }
        Ok(true)
    }

    fn restore(&mut self, snapshot: &Snapshot) -> EditorResult<()> {
        let document = SkinDocument::from_snapshot(snapshot)?;
        self.replace_document(document);
        if let Some(autosave) = &self.autosave {
            autosave.persist(snapshot);
        }
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Clear the stage and the layer list. Recorded in history.
    pub fn reset(&mut self) -> EditorResult<()> {
        log::info!("Reset canvas");
        self.clear_scene();
        self.commit()
    }

    // --- Import ---

    /// Validate an upload and clear the stage for it. Unsupported files
    /// change nothing.
    pub fn begin_import(&mut self, file_name: &str) -> EditorResult<ImportTicket> {
        let format = import::check_file_name(file_name)?;
        self.import_generation += 1;
        self.clear_scene();
        log::info!("Importing {} (#{})", file_name, self.import_generation);
        Ok(ImportTicket {
            generation: self.import_generation,
            format,
            file_name: file_name.to_string(),
        })
    }

    /// Place the decoded upload. Completions of superseded imports are dropped.
    pub fn finish_import(
        &mut self,
        ticket: &ImportTicket,
        bytes: &[u8],
    ) -> EditorResult<ImportOutcome> {
        if ticket.generation != self.import_generation {
            log::info!(
                "Dropping import of {} superseded by #{}",
                ticket.file_name,
                self.import_generation
            );
            return Ok(ImportOutcome::Superseded);
        }
        let decoded = import::decode(ticket.format, &ticket.file_name, bytes)?;

        self.clear_scene();
        self.insert_node(background_node(self.stage_size, &self.config))?;
        let id = self.insert_node(import::main_image_node(decoded, bytes, self.stage_size))?;
        self.apply_selection(Some(id));
        self.commit()?;
        log::info!(
            "Imported {} ({}x{})",
            ticket.file_name,
            decoded.width,
            decoded.height
        );
        Ok(ImportOutcome::Applied(id))
    }

    /// Import in one step.
    pub fn import_file(&mut self, file_name: &str, bytes: &[u8]) -> EditorResult<ImportOutcome> {
        let ticket = self.begin_import(file_name)?;
        self.finish_import(&ticket, bytes)
    }

    // --- Project files ---

    /// Serialize the scene and layer list as a project file.
    pub fn export_project(&self) -> EditorResult<String> {
        let snapshot = self.document.to_snapshot()?;
        let file = ProjectFile::new(&snapshot, &self.registry.layer_info())?;
        Ok(file.to_json()?)
    }

    /// Replace the scene with a project file. Any failure leaves the session
    /// untouched.
    pub fn load_project(&mut self, json: &str) -> EditorResult<()> {
        let file = ProjectFile::from_json(json)?;
        let document =
            SkinDocument::from_snapshot(&file.snapshot()).map_err(ProjectError::corrupted)?;
        let layers = file.layers()?;

        self.clear_scene();
        self.document = document;
        match layers {
            Some(layers) => {
                for info in layers {
                    let Some(node) = info
                        .id
                        .parse::<ShapeId>()
                        .ok()
                        .and_then(|id| self.document.node_mut(id))
                    else {
                        log::warn!("Skipping layer '{}': no such shape", info.name);
                        continue;
                    };
                    // Saved layer names win over the names stored in the scene.
                    node.name = info.name;
                    if let Err(e) = self.registry.add(node.descriptor()) {
                        log::warn!("Skipping layer: {}", e);
                    }
                }
            }
            None => self.registry.rebuild_from(&self.document),
        }
        self.commit()?;
        log::info!("Loaded project ({} shapes)", self.document.len());
        Ok(())
    }

    /// Change the stage size. Content is not moved and history is untouched.
    pub fn resize_stage(&mut self, width: f64, height: f64) {
        self.stage_size = Size::new(width, height);
    }

    /// Show or hide the transform affordance; returns the previous visibility.
    pub fn set_affordance_visible(&mut self, visible: bool) -> bool {
        self.selection.set_affordance_visible(visible)
    }

    // --- Accessors ---

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn stage_size(&self) -> Size {
        self.stage_size
    }

    pub fn document(&self) -> &SkinDocument {
        &self.document
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn mode(&self) -> ActiveMode {
        self.selection.mode()
    }

    pub fn current_fill(&self) -> SerializableColor {
        self.current_fill
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selection.active()
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.selection.active().and_then(|id| self.document.node(id))
    }

    /// Take the pending redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        self.selection.take_redraw()
    }
}
