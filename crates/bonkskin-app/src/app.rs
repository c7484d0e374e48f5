//! Application shell: routes UI actions to the editor session.

use crate::ui::{UiAction, UiState};
use bonkskin_core::storage::FileStorage;
use bonkskin_core::import;
use bonkskin_core::{EditorConfig, EditorError, EditorSession, HandleKind, Storage, StorageError};
use bonkskin_render::{CpuRenderer, DEFAULT_PNG_NAME, RendererError, export_png};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Default download name for project files.
pub const DEFAULT_PROJECT_NAME: &str = "bonkverse_skin_project.json";

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("Export failed: {0}")]
    Render(#[from] RendererError),
    #[error("Storage unavailable: {0}")]
    Storage(#[from] StorageError),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("No layer at position {0}")]
    NoSuchLayer(usize),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where exports are written.
    pub out_dir: PathBuf,
    pub png_name: String,
    pub project_name: String,
    /// Autosave directory (`None` = platform data dir).
    pub storage_dir: Option<PathBuf>,
    pub editor: EditorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            png_name: DEFAULT_PNG_NAME.to_string(),
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            storage_dir: None,
            editor: EditorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read the editor section from a JSON file.
    pub fn with_editor_config_file(mut self, path: &Path) -> Result<Self, AppError> {
        let json = file_ops::read_text(path)?;
        self.editor = EditorConfig::from_json(&json)?;
        Ok(self)
    }

    pub fn png_path(&self) -> PathBuf {
        self.out_dir.join(&self.png_name)
    }

    pub fn project_path(&self) -> PathBuf {
        self.out_dir.join(&self.project_name)
    }
}

mod file_ops {
    use super::AppError;
    use std::path::Path;

    pub fn read_text(path: &Path) -> Result<String, AppError> {
        std::fs::read_to_string(path).map_err(|source| {
            log::error!("Failed to read {}: {}", path.display(), source);
            AppError::Io {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn read_bytes(path: &Path) -> Result<Vec<u8>, AppError> {
        std::fs::read(path).map_err(|source| {
            log::error!("Failed to read {}: {}", path.display(), source);
            AppError::Io {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn write(path: &Path, data: &[u8]) -> Result<(), AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| AppError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, data).map_err(|source| {
            log::error!("Failed to write {}: {}", path.display(), source);
            AppError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        log::info!("Wrote {}", path.display());
        Ok(())
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    session: EditorSession,
    renderer: CpuRenderer,
    ui: UiState,
}

impl App {
    /// Open the app with file-backed autosave.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let storage = match &config.storage_dir {
            Some(dir) => FileStorage::new(dir.clone())?,
            None => FileStorage::default_location()?,
        };
        Self::with_storage(config, Arc::new(storage))
    }

    /// Open the app on any storage backend.
    pub fn with_storage(config: AppConfig, storage: Arc<dyn Storage>) -> Result<Self, AppError> {
        let session = EditorSession::open(config.editor.clone(), storage)?;
        let mut ui = UiState::default();
        ui.sync(&session);
        Ok(Self {
            config,
            session,
            renderer: CpuRenderer::new(),
            ui,
        })
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Apply one action. Failures end up in `UiState::message`.
    pub fn handle(&mut self, action: UiAction) {
        self.ui.message = None;
        if let Err(e) = self.apply(action) {
            log::warn!("{}", e);
            self.ui.message = Some(e.to_string());
        }
        self.ui.sync(&self.session);
        self.session.take_redraw();
    }

    fn apply(&mut self, action: UiAction) -> Result<(), AppError> {
        match action {
            UiAction::SetMode(mode) => self.session.set_mode(mode),
            UiAction::AddShape(kind) => {
                self.session.add_shape(kind)?;
            }
            UiAction::Undo => {
                if !self.session.undo()? {
                    log::info!("Nothing to undo");
                }
            }
            UiAction::Redo => {
                if !self.session.redo()? {
                    log::info!("Nothing to redo");
                }
            }
            UiAction::ExportPng => {
                let png = export_png(&mut self.session, &mut self.renderer)?;
                let path = self.config.png_path();
                file_ops::write(&path, &png)?;
                self.ui.message = Some(format!("Exported {}", path.display()));
            }
            UiAction::ExportProject => {
                let json = self.session.export_project()?;
                let path = self.config.project_path();
                file_ops::write(&path, json.as_bytes())?;
                self.ui.message = Some(format!("Saved {}", path.display()));
            }
            UiAction::LoadProject(path) => {
                let json = file_ops::read_text(&path)?;
                self.session.load_project(&json)?;
            }
            UiAction::Import(path) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                // Unsupported names are refused before touching the disk, and
                // the canvas is only cleared once the bytes are in hand.
                import::check_file_name(&file_name).map_err(EditorError::from)?;
                let bytes = file_ops::read_bytes(&path)?;
                self.session.import_file(&file_name, &bytes)?;
            }
            UiAction::RequestReset => {
                self.ui.pending_reset = true;
                self.ui.message =
                    Some("Reset the canvas? All unsaved changes will be lost.".to_string());
            }
            UiAction::ConfirmReset => {
                if std::mem::take(&mut self.ui.pending_reset) {
                    self.session.reset()?;
                }
            }
            UiAction::CancelReset => self.ui.pending_reset = false,
            UiAction::SetFillColor(color) => {
                self.session.set_fill_color(color)?;
            }
            UiAction::SelectLayer(index) => {
                let id = self
                    .session
                    .registry()
                    .entries()
                    .get(index)
                    .map(|e| e.id)
                    .ok_or(AppError::NoSuchLayer(index))?;
                self.session.select_layer(id);
            }
            UiAction::DeleteSelected => {
                self.session.delete_selected()?;
            }
            UiAction::BringForward => {
                self.session.bring_forward()?;
            }
            UiAction::SendBackward => {
                self.session.send_backward()?;
            }
            UiAction::ClickStage(point) => {
                self.session.select_at(point);
            }
            UiAction::Drag(delta) => {
                self.session.translate_selected(delta)?;
            }
            UiAction::DragAnchor(corner, delta) => {
                self.session.resize_selected(corner, delta)?;
            }
            UiAction::DragRotate(point) => {
                self.session.rotate_selected(point, false)?;
            }
            UiAction::PointerDrag { from, by } => match self.session.handle_at(from) {
                Some(HandleKind::Corner(corner)) => {
                    self.session.resize_selected(corner, by)?;
                }
                Some(HandleKind::Rotate) => {
                    self.session.rotate_selected(from + by, false)?;
                }
                None => {
                    if self.session.select_at(from).is_some() {
                        self.session.translate_selected(by)?;
                    }
                }
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonkskin_core::{ActiveMode, MemoryStorage, NewShape};
    use kurbo::{Point, Vec2};
    use tempfile::tempdir;

    fn app(out_dir: &Path) -> App {
        let config = AppConfig {
            out_dir: out_dir.to_path_buf(),
            ..AppConfig::default()
        };
        App::with_storage(config, Arc::new(MemoryStorage::new())).unwrap()
    }

    #[test]
    fn test_undo_redo_buttons() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());
        assert!(!app.ui().undo_enabled);
        app.handle(UiAction::AddShape(NewShape::Circle));
        assert!(app.ui().undo_enabled);
        app.handle(UiAction::Undo);
        assert!(!app.ui().undo_enabled);
        assert!(app.ui().redo_enabled);
    }

    #[test]
    fn test_reset_needs_confirmation() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());
        app.handle(UiAction::ConfirmReset);
        assert_eq!(app.session().document().len(), 2);

        app.handle(UiAction::RequestReset);
        assert!(app.ui().pending_reset);
        app.handle(UiAction::CancelReset);
        app.handle(UiAction::ConfirmReset);
        assert_eq!(app.session().document().len(), 2);

        app.handle(UiAction::RequestReset);
        app.handle(UiAction::ConfirmReset);
        assert!(app.session().document().is_empty());
        assert!(app.ui().layers.is_empty());
    }

    #[test]
    fn test_rejected_import_message() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());
        app.handle(UiAction::Import(dir.path().join("notes.txt")));
        assert_eq!(app.ui().message.as_deref(), Some("Only PNG or SVG files allowed!"));
        assert_eq!(app.session().document().len(), 2);
    }

    #[test]
    fn test_unreadable_import_keeps_canvas() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());
        app.handle(UiAction::Import(dir.path().join("missing.png")));
        assert!(app.ui().message.as_deref().is_some_and(|m| m.contains("missing.png")));
        assert_eq!(app.session().document().len(), 2);
        assert_eq!(app.session().history().len(), 1);
        let names: Vec<_> = app.ui().layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Background", "Circle"]);
    }

    #[test]
    fn test_pointer_drag_uses_handles() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());
        let circle = app.session().selected().unwrap();
        let bounds = |app: &App| app.session().document().node(circle).unwrap().shape.bounds();

        // Move mode: pressing on the circle drags it.
        app.handle(UiAction::PointerDrag {
            from: Point::new(250.0, 250.0),
            by: Vec2::new(10.0, 0.0),
        });
        assert!((bounds(&app).center().x - 260.0).abs() < 1e-9);

        // Resize mode: pressing the bottom-right anchor grows the box.
        app.handle(UiAction::SetMode(ActiveMode::Resize));
        let corner = Point::new(bounds(&app).x1, bounds(&app).y1);
        app.handle(UiAction::PointerDrag {
            from: corner,
            by: Vec2::new(20.0, 20.0),
        });
        assert!((bounds(&app).width() - 270.0).abs() < 1e-9);
        assert!((bounds(&app).x0 - 135.0).abs() < 1e-9);
    }

    #[test]
    fn test_key_combo_action() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());
        app.handle("key=c".parse().unwrap());
        assert_eq!(app.session().document().len(), 3);
        app.handle("key=ctrl+z".parse().unwrap());
        assert_eq!(app.session().document().len(), 2);
    }

    #[test]
    fn test_import_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("skin.png");
        image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 255, 255]))
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();
        let mut app = app(dir.path());
        app.handle(UiAction::Import(path));
        assert_eq!(app.ui().message, None);
        let names: Vec<_> = app.ui().layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Background", "Skin Image"]);
    }

    #[test]
    fn test_export_files() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());
        app.handle(UiAction::ExportPng);
        app.handle(UiAction::ExportProject);
        assert!(dir.path().join("bonkverse_skin.png").exists());
        let project = dir.path().join("bonkverse_skin_project.json");
        assert!(project.exists());

        app.handle(UiAction::AddShape(NewShape::Rect));
        let len = app.session().history().len();
        app.handle(UiAction::LoadProject(project));
        assert_eq!(app.session().history().len(), len + 1);
        assert_eq!(app.session().document().len(), 2);
    }

    #[test]
    fn test_corrupted_project_message() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ nope").unwrap();
        let mut app = app(dir.path());
        app.handle(UiAction::LoadProject(path));
        assert_eq!(
            app.ui().message.as_deref(),
            Some("Error loading project. File may be corrupted.")
        );
    }

    #[test]
    fn test_select_layer_by_position() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());
        app.handle(UiAction::AddShape(NewShape::Rect));
        app.handle(UiAction::SelectLayer(1));
        assert!(app.ui().layers[1].highlighted);
        app.handle(UiAction::SelectLayer(9));
        assert_eq!(app.ui().message.as_deref(), Some("No layer at position 9"));
    }

    #[test]
    fn test_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("editor.json");
        std::fs::write(&path, r#"{"history_limit": 3}"#).unwrap();
        let config = AppConfig::default().with_editor_config_file(&path).unwrap();
        assert_eq!(config.editor.history_limit, 3);
    }
}
