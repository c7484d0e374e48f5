//! Bonkskin Core Library
//!
//! Platform-agnostic data structures and editing logic for the Bonkverse
//! skin editor.

pub mod config;
pub mod history;
pub mod import;
pub mod project;
pub mod registry;
pub mod scene;
pub mod selection;
pub mod session;
pub mod shapes;
pub mod storage;

pub use config::EditorConfig;
pub use history::{History, Snapshot};
pub use import::{ImportError, ImportOutcome, ImportTicket};
pub use project::{ProjectError, ProjectFile};
pub use registry::{LayerInfo, ShapeDescriptor, ShapeRegistry, ShapeRole};
pub use scene::{Node, SceneError, SkinDocument};
pub use selection::{ActiveMode, Corner, HandleKind, SelectionController, TransformAffordance};
pub use session::{EditorError, EditorResult, EditorSession, NewShape};
pub use storage::{AutoSaveBridge, MemoryStorage, Storage, StorageError};
