//! Keyboard shortcut registry and documentation.

use crate::ui::UiAction;
use bonkskin_core::{ActiveMode, NewShape};

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
    pub action: UiAction,
}

impl Shortcut {
    pub fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        description: &'static str,
        action: UiAction,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
            action,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+S").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, "Undo", UiAction::Undo),
            Shortcut::new("Z", true, true, "Redo", UiAction::Redo),
            Shortcut::new("Y", true, false, "Redo", UiAction::Redo),
            Shortcut::new("E", true, false, "Export to PNG", UiAction::ExportPng),
            Shortcut::new("S", true, false, "Save project", UiAction::ExportProject),
            Shortcut::new("Delete", false, false, "Delete selected shape", UiAction::DeleteSelected),
            Shortcut::new("Backspace", false, false, "Delete selected shape", UiAction::DeleteSelected),
            Shortcut::new("V", false, false, "Move mode", UiAction::SetMode(ActiveMode::Move)),
            Shortcut::new("R", false, false, "Rotate mode", UiAction::SetMode(ActiveMode::Rotate)),
            Shortcut::new("S", false, false, "Resize mode", UiAction::SetMode(ActiveMode::Resize)),
            Shortcut::new("C", false, false, "Add circle", UiAction::AddShape(NewShape::Circle)),
            Shortcut::new("B", false, false, "Add rectangle", UiAction::AddShape(NewShape::Rect)),
            Shortcut::new("T", false, false, "Add triangle", UiAction::AddShape(NewShape::Triangle)),
            Shortcut::new("]", false, false, "Bring forward", UiAction::BringForward),
            Shortcut::new("[", false, false, "Send backward", UiAction::SendBackward),
        ]
    }

    /// Action bound to a key press, if any.
    pub fn lookup(key: &str, ctrl: bool, shift: bool) -> Option<UiAction> {
        Self::all()
            .into_iter()
            .find(|s| s.key.eq_ignore_ascii_case(key) && s.ctrl == ctrl && s.shift == shift)
            .map(|s| s.action)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let shortcut = Shortcut::new("Z", true, true, "Redo", UiAction::Redo);
        assert_eq!(shortcut.format(), "Ctrl+Shift+Z");
    }

    #[test]
    fn test_lookup() {
        assert_eq!(ShortcutRegistry::lookup("z", true, false), Some(UiAction::Undo));
        assert_eq!(ShortcutRegistry::lookup("Z", true, true), Some(UiAction::Redo));
        assert_eq!(
            ShortcutRegistry::lookup("s", false, false),
            Some(UiAction::SetMode(ActiveMode::Resize))
        );
        assert_eq!(ShortcutRegistry::lookup("Q", false, false), None);
    }

    #[test]
    fn test_bindings_are_unique() {
        let all = ShortcutRegistry::all();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert!(
                    !(a.key == b.key && a.ctrl == b.ctrl && a.shift == b.shift),
                    "duplicate binding {}",
                    a.format()
                );
            }
        }
    }
}
