//! Export options.
//!
//! Options are usually supplied by the host application, but can also be
//! loaded from a YAML or JSON file using the same camelCase field names.

use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_true() -> bool {
    true
}

fn default_width() -> f64 {
    1920.0
}

fn default_height() -> f64 {
    1080.0
}

/// Caller-controlled switches for one export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    /// Declare `edgedefault="directed"` on every graph section.
    #[serde(default = "default_true")]
    pub use_directed_edges: bool,
    /// Project normalized layout coordinates into pixel space.
    #[serde(default = "default_true")]
    pub use_screen_layout_coordinates: bool,
    #[serde(default = "default_width")]
    pub screen_layout_width: f64,
    #[serde(default = "default_height")]
    pub screen_layout_height: f64,
    /// Combine all sessions into one document with per-session graph sections.
    #[serde(default)]
    pub unify_networks: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            use_directed_edges: true,
            use_screen_layout_coordinates: true,
            screen_layout_width: default_width(),
            screen_layout_height: default_height(),
            unify_networks: false,
        }
    }
}

impl ExportOptions {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Self = serde_yaml::from_str(yaml)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a `.yaml`/`.yml` or `.json` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ExportError::io(path, e))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            other => Err(ExportError::InvalidOptions(format!(
                "unsupported options file extension: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    /// Screen dimensions must be usable whenever screen coordinates are requested.
    pub fn validate(&self) -> Result<()> {
        if !self.use_screen_layout_coordinates {
            return Ok(());
        }
        for (label, value) in [
            ("screenLayoutWidth", self.screen_layout_width),
            ("screenLayoutHeight", self.screen_layout_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ExportError::InvalidOptions(format!(
                    "{} must be a positive number, got {}",
                    label, value
                )));
            }
        }
        Ok(())
    }

    pub fn edge_default(&self) -> &'static str {
        if self.use_directed_edges {
            "directed"
        } else {
            "undirected"
        }
    }
}
