//! JSON adapter for the resolved source model.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::domain::model::SourceModel;
use crate::domain::ports::ModelSource;

/// Loads a [`SourceModel`] from a JSON file produced by the upstream
/// parser/resolver.
pub struct JsonModelSource {
    path: PathBuf,
}

impl JsonModelSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl ModelSource for JsonModelSource {
    fn load(&self) -> Result<SourceModel> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read model file: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse source model JSON: {}", self.path.display()))
    }
}
