//! Scene files: a view, renderer options and a list of labels, in YAML or
//! JSON.
//!
//! ```yaml
//! view:
//!   center: [48.85, 2.35]
//!   zoom: 12
//!   size: [800, 600]
//! renderer:
//!   padding: 0.1
//! labels:
//!   - position: [48.8584, 2.2945]
//!     text: Eiffel Tower
//!     style: { color: "#333", rotation: 0.3, textAlign: left }
//! ```

use std::path::Path;

use maptext_common::LatLng;
use maptext_overlay::{OverlayError, TextOverlay, TextStyle};
use maptext_render::{RendererConfig, TextRenderer};
use serde::{Deserialize, Serialize};

use crate::map::Map;
use crate::view::ViewConfig;

/// Errors from loading a scene or building its overlays.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("label {index}: {source}")]
    Label {
        index: usize,
        #[source]
        source: OverlayError,
    },
    #[error("unsupported scene format: {0}")]
    UnsupportedFormat(String),
}

/// One label entry. `text` is kept loosely typed so that a non-string value
/// is reported against its label instead of failing the whole parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSpec {
    #[serde(alias = "latlng")]
    pub position: LatLng,
    #[serde(default)]
    pub text: serde_json::Value,
    #[serde(default)]
    pub style: TextStyle,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub view: ViewConfig,
    pub renderer: RendererConfig,
    pub labels: Vec<LabelSpec>,
}

impl Scene {
    /// Load a scene, picking the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let source = std::fs::read_to_string(path)?;
        let scene = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&source)?,
            "json" => Self::from_json_str(&source)?,
            other => return Err(SceneError::UnsupportedFormat(other.to_string())),
        };
        tracing::debug!(path = %path.display(), labels = scene.labels.len(), "scene loaded");
        Ok(scene)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, SceneError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Build one overlay per label. Fails on the first invalid label.
    pub fn overlays(&self) -> Result<Vec<TextOverlay>, SceneError> {
        self.labels
            .iter()
            .enumerate()
            .map(|(index, label)| {
                TextOverlay::from_value(label.position, &label.text, label.style.clone())
                    .map_err(|source| SceneError::Label { index, source })
            })
            .collect()
    }

    /// Build a map over `renderer` with every label added.
    pub fn build_map<R: TextRenderer>(&self, renderer: R) -> Result<Map<R>, SceneError> {
        let overlays = self.overlays()?;
        let mut map = Map::new(&self.view, renderer);
        for overlay in overlays {
            map.add_overlay(overlay);
        }
        Ok(map)
    }
}
