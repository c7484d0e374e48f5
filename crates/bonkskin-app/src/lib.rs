//! Bonkskin Application
//!
//! The application shell: toolbar actions, UI state, keyboard shortcuts and
//! file operations around an editor session.

mod app;
mod shortcuts;
mod ui;

pub use app::{App, AppConfig, AppError, DEFAULT_PROJECT_NAME};
pub use shortcuts::{Shortcut, ShortcutRegistry};
pub use ui::{LayerRow, UiAction, UiActionParseError, UiState};
