//! Re-loadable project files.
//!
//! A project is a small JSON envelope around the scene snapshot and the layer
//! list, both stored as JSON strings.

use crate::history::Snapshot;
use crate::registry::LayerInfo;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only project version this editor reads and writes.
pub const PROJECT_VERSION: &str = "1.0";

/// Project file errors.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Error loading project. File may be corrupted.")]
    Corrupted { reason: String },
    #[error("Project could not be written: {0}")]
    Encode(String),
}

impl ProjectError {
    pub(crate) fn corrupted(reason: impl ToString) -> Self {
        ProjectError::Corrupted {
            reason: reason.to_string(),
        }
    }
}

/// On-disk project envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub version: String,
    /// Scene snapshot JSON.
    pub stage: String,
    /// JSON array of `{id, name}` layer entries.
    #[serde(rename = "layerInfo", default, skip_serializing_if = "Option::is_none")]
    pub layer_info: Option<String>,
}

impl ProjectFile {
    pub fn new(snapshot: &Snapshot, layers: &[LayerInfo]) -> Result<Self, ProjectError> {
        let layer_info =
            serde_json::to_string(layers).map_err(|e| ProjectError::Encode(e.to_string()))?;
        Ok(Self {
            version: PROJECT_VERSION.to_string(),
            stage: snapshot.as_str().to_string(),
            layer_info: Some(layer_info),
        })
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        serde_json::to_string(self).map_err(|e| ProjectError::Encode(e.to_string()))
    }

    /// Parse and check the envelope. The inner scene is not decoded here.
    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        let file: Self = serde_json::from_str(json).map_err(ProjectError::corrupted)?;
        if file.version != PROJECT_VERSION {
            return Err(ProjectError::corrupted(format!(
                "unsupported version {}",
                file.version
            )));
        }
        Ok(file)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.stage.clone())
    }

    /// The stored layer list, or `None` when the file has none.
    pub fn layers(&self) -> Result<Option<Vec<LayerInfo>>, ProjectError> {
        self.layer_info
            .as_deref()
            .map(|text| serde_json::from_str(text).map_err(ProjectError::corrupted))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let layers = vec![LayerInfo {
            id: "abc".to_string(),
            name: "Circle".to_string(),
        }];
        let file = ProjectFile::new(&Snapshot::new("{\"nodes\":[]}"), &layers).unwrap();
        let json = file.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["stage"], "{\"nodes\":[]}");
        assert_eq!(value["layerInfo"], "[{\"id\":\"abc\",\"name\":\"Circle\"}]");

        let parsed = ProjectFile::from_json(&json).unwrap();
        assert_eq!(parsed.layers().unwrap(), Some(layers));
    }

    #[test]
    fn test_missing_layer_info() {
        let file = ProjectFile::from_json(r#"{"version":"1.0","stage":"{}"}"#).unwrap();
        assert_eq!(file.layers().unwrap(), None);
    }

    #[test]
    fn test_corrupted_inputs() {
        for bad in [
            "not json",
            r#"{"version":"2.0","stage":"{}"}"#,
            r#"{"version":"1.0"}"#,
        ] {
            let err = ProjectFile::from_json(bad).unwrap_err();
            assert_eq!(err.to_string(), "Error loading project. File may be corrupted.");
        }
        let file = ProjectFile::from_json(r#"{"version":"1.0","stage":"{}","layerInfo":"[1"}"#)
            .unwrap();
        assert!(matches!(file.layers(), Err(ProjectError::Corrupted { .. })));
    }
}
