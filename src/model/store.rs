use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{DashboardError, Result};

use super::{Classifier, GbdtModel};

/// Reads the serialized classifier from disk.
///
/// Loading is not cached: the caller loads once at startup and shares the
/// returned `Arc` for both scoring and explanation.
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ModelStore { path: path.into() }
    }

    pub fn load(&self) -> Result<Arc<dyn Classifier>> {
        let bytes = std::fs::read(&self.path).map_err(|e| DashboardError::io(&self.path, e))?;
        let model = GbdtModel::from_json(&bytes)?;
        log::info!(
            "Loaded model with {} trees over {} features from {}",
            model.trees().len(),
            model.num_features(),
            self.path.display()
        );
        Ok(Arc::new(model))
    }
}
