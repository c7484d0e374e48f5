//! Toolbar actions and the UI state mirrored from the editor session.

use crate::shortcuts::ShortcutRegistry;
use bonkskin_core::shapes::SerializableColor;
use bonkskin_core::{ActiveMode, Corner, EditorSession, NewShape};
use kurbo::{Point, Vec2};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Actions that can be triggered by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// Switch the transform mode.
    SetMode(ActiveMode),
    /// Add a shape at the stage centre.
    AddShape(NewShape),
    Undo,
    Redo,
    /// Export the flattened skin as PNG.
    ExportPng,
    /// Save the project JSON.
    ExportProject,
    /// Load a project JSON file.
    LoadProject(PathBuf),
    /// Upload a PNG or SVG skin image.
    Import(PathBuf),
    /// Ask for confirmation before clearing the canvas.
    RequestReset,
    ConfirmReset,
    CancelReset,
    /// Colour picker change.
    SetFillColor(SerializableColor),
    /// Click on a layer list row (by position).
    SelectLayer(usize),
    DeleteSelected,
    BringForward,
    SendBackward,
    /// Click on the stage.
    ClickStage(Point),
    /// Drag the selected shape.
    Drag(Vec2),
    /// Drag a corner anchor.
    DragAnchor(Corner, Vec2),
    /// Drag the rotation handle to a stage point.
    DragRotate(Point),
    /// Press at a stage point and drag: handles resize or rotate, anything
    /// else picks the shape under the pointer and moves it.
    PointerDrag { from: Point, by: Vec2 },
}

/// Failure to parse a textual action.
#[derive(Debug, Error, PartialEq)]
pub enum UiActionParseError {
    #[error("Unknown action '{0}'")]
    Unknown(String),
    #[error("Action '{action}' needs a value ({expected})")]
    MissingValue {
        action: String,
        expected: &'static str,
    },
    #[error("Invalid value '{value}' for '{action}'")]
    InvalidValue { action: String, value: String },
}

/// Resolve `ctrl+shift+z` style key combos through the shortcut table.
fn parse_key(action: &str, value: &str) -> Result<UiAction, UiActionParseError> {
    let (mut ctrl, mut shift) = (false, false);
    let mut parts: Vec<&str> = value.split('+').map(str::trim).collect();
    let key = parts.pop().unwrap_or_default();
    for modifier in parts {
        match modifier.to_lowercase().as_str() {
            "ctrl" | "cmd" => ctrl = true,
            "shift" => shift = true,
            _ => {
                return Err(UiActionParseError::InvalidValue {
                    action: action.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }
    ShortcutRegistry::lookup(key, ctrl, shift).ok_or_else(|| UiActionParseError::InvalidValue {
        action: action.to_string(),
        value: value.to_string(),
    })
}

fn parse_pair(action: &str, value: &str) -> Result<(f64, f64), UiActionParseError> {
    let invalid = || UiActionParseError::InvalidValue {
        action: action.to_string(),
        value: value.to_string(),
    };
    let (x, y) = value.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok((x, y))
}

impl FromStr for UiAction {
    type Err = UiActionParseError;

    /// Parse `name` or `name=value`, e.g. `add=circle`, `color=#ff0000`,
    /// `resize=br:10,10`, `key=ctrl+z`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = match s.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (s.trim(), None),
        };
        let invalid = |value: &str| UiActionParseError::InvalidValue {
            action: name.to_string(),
            value: value.to_string(),
        };
        let require = |expected: &'static str| {
            value.ok_or_else(|| UiActionParseError::MissingValue {
                action: name.to_string(),
                expected,
            })
        };

        let action = match name {
            "mode" => {
                let v = require("move|rotate|resize")?;
                UiAction::SetMode(ActiveMode::from_name(v).ok_or_else(|| invalid(v))?)
            }
            "add" => {
                let v = require("circle|rect|triangle")?;
                UiAction::AddShape(NewShape::from_name(v).ok_or_else(|| invalid(v))?)
            }
            "undo" => UiAction::Undo,
            "redo" => UiAction::Redo,
            "export-png" => UiAction::ExportPng,
            "export-project" => UiAction::ExportProject,
            "load" => UiAction::LoadProject(PathBuf::from(require("path")?)),
            "import" => UiAction::Import(PathBuf::from(require("path")?)),
            "reset" => UiAction::RequestReset,
            "confirm-reset" => UiAction::ConfirmReset,
            "cancel-reset" => UiAction::CancelReset,
            "color" => {
                let v = require("#rrggbb")?;
                UiAction::SetFillColor(SerializableColor::from_hex(v).ok_or_else(|| invalid(v))?)
            }
            "select" => {
                let v = require("layer index")?;
                UiAction::SelectLayer(v.parse().map_err(|_| invalid(v))?)
            }
            "delete" => UiAction::DeleteSelected,
            "forward" => UiAction::BringForward,
            "backward" => UiAction::SendBackward,
            "click" => {
                let (x, y) = parse_pair(name, require("x,y")?)?;
                UiAction::ClickStage(Point::new(x, y))
            }
            "move" => {
                let (dx, dy) = parse_pair(name, require("dx,dy")?)?;
                UiAction::Drag(Vec2::new(dx, dy))
            }
            "resize" => {
                let v = require("corner:dx,dy")?;
                let (corner, delta) = v.split_once(':').ok_or_else(|| invalid(v))?;
                let corner = Corner::from_name(corner).ok_or_else(|| invalid(v))?;
                let (dx, dy) = parse_pair(name, delta)?;
                UiAction::DragAnchor(corner, Vec2::new(dx, dy))
            }
            "rotate" => {
                let (x, y) = parse_pair(name, require("x,y")?)?;
                UiAction::DragRotate(Point::new(x, y))
            }
            "drag" => {
                let v = require("x,y:dx,dy")?;
                let (from, by) = v.split_once(':').ok_or_else(|| invalid(v))?;
                let (x, y) = parse_pair(name, from)?;
                let (dx, dy) = parse_pair(name, by)?;
                UiAction::PointerDrag {
                    from: Point::new(x, y),
                    by: Vec2::new(dx, dy),
                }
            }
            "key" => parse_key(name, require("key combo")?)?,
            _ => return Err(UiActionParseError::Unknown(name.to_string())),
        };
        Ok(action)
    }
}

/// One row of the layer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRow {
    pub name: String,
    pub highlighted: bool,
}

/// UI state that persists across frames.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Whether the undo button is enabled.
    pub undo_enabled: bool,
    /// Whether the redo button is enabled.
    pub redo_enabled: bool,
    /// Active toolbar mode.
    pub mode: ActiveMode,
    /// Colour picker value.
    pub fill_color: Option<SerializableColor>,
    /// Layer list rows, back to front.
    pub layers: Vec<LayerRow>,
    /// A reset is waiting for confirmation.
    pub pending_reset: bool,
    /// Last user-visible message (errors and confirmations).
    pub message: Option<String>,
}

impl UiState {
    /// Refresh everything derived from the session.
    pub fn sync(&mut self, session: &EditorSession) {
        self.undo_enabled = session.can_undo();
        self.redo_enabled = session.can_redo();
        self.mode = session.mode();
        self.fill_color = Some(session.current_fill());
        let highlighted = session.registry().highlighted();
        self.layers = session
            .registry()
            .entries()
            .iter()
            .map(|e| LayerRow {
                name: e.name.clone(),
                highlighted: highlighted == Some(e.id),
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonkskin_core::EditorConfig;

    #[test]
    fn test_parse_simple_actions() {
        assert_eq!("undo".parse::<UiAction>(), Ok(UiAction::Undo));
        assert_eq!("mode=Rotate".parse::<UiAction>(), Ok(UiAction::SetMode(ActiveMode::Rotate)));
        assert_eq!("add=triangle".parse::<UiAction>(), Ok(UiAction::AddShape(NewShape::Triangle)));
        assert_eq!(
            "color=#ff0000".parse::<UiAction>(),
            Ok(UiAction::SetFillColor(SerializableColor::rgb(255, 0, 0)))
        );
        assert_eq!("select=2".parse::<UiAction>(), Ok(UiAction::SelectLayer(2)));
        assert_eq!(
            "import=skin.png".parse::<UiAction>(),
            Ok(UiAction::Import(PathBuf::from("skin.png")))
        );
    }

    #[test]
    fn test_parse_geometry_actions() {
        assert_eq!(
            "resize=br:10,-5".parse::<UiAction>(),
            Ok(UiAction::DragAnchor(Corner::BottomRight, Vec2::new(10.0, -5.0)))
        );
        assert_eq!("move=3, 4".parse::<UiAction>(), Ok(UiAction::Drag(Vec2::new(3.0, 4.0))));
        assert_eq!(
            "click=250,250".parse::<UiAction>(),
            Ok(UiAction::ClickStage(Point::new(250.0, 250.0)))
        );
    }

    #[test]
    fn test_parse_pointer_drag() {
        assert_eq!(
            "drag=375,375:20,0".parse::<UiAction>(),
            Ok(UiAction::PointerDrag {
                from: Point::new(375.0, 375.0),
                by: Vec2::new(20.0, 0.0),
            })
        );
        assert!(matches!(
            "drag=375,375".parse::<UiAction>(),
            Err(UiActionParseError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_parse_key_combos() {
        assert_eq!("key=ctrl+z".parse::<UiAction>(), Ok(UiAction::Undo));
        assert_eq!("key=Ctrl+Shift+Z".parse::<UiAction>(), Ok(UiAction::Redo));
        assert_eq!("key=t".parse::<UiAction>(), Ok(UiAction::AddShape(NewShape::Triangle)));
        assert!(matches!(
            "key=alt+z".parse::<UiAction>(),
            Err(UiActionParseError::InvalidValue { .. })
        ));
        assert!(matches!(
            "key=q".parse::<UiAction>(),
            Err(UiActionParseError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "zoom".parse::<UiAction>(),
            Err(UiActionParseError::Unknown("zoom".to_string()))
        );
        assert!(matches!(
            "add".parse::<UiAction>(),
            Err(UiActionParseError::MissingValue { .. })
        ));
        assert!(matches!(
            "add=hexagon".parse::<UiAction>(),
            Err(UiActionParseError::InvalidValue { .. })
        ));
        assert!(matches!(
            "move=3".parse::<UiAction>(),
            Err(UiActionParseError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_sync_from_session() {
        let mut session = EditorSession::with_default_skin(EditorConfig::default()).unwrap();
        session.add_shape(NewShape::Rect).unwrap();
        let mut ui = UiState::default();
        ui.sync(&session);
        assert!(ui.undo_enabled);
        assert!(!ui.redo_enabled);
        let names: Vec<_> = ui.layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Background", "Circle", "Rect"]);
        assert!(ui.layers[2].highlighted);
        assert!(!ui.layers[1].highlighted);
    }
}
