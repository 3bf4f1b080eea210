use crate::error::{Result, StagegateError};
use crate::io;
use crate::paths;
use crate::types::FeatureStatus;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Feature
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub title: String,
    pub status: FeatureStatus,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The authoritative list of features, persisted in registration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Registry {
    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Missing file ⇒ empty registry.
    pub fn load(root: &Path) -> Result<Self> {
        io::load_yaml_or_default(&paths::registry_path(root))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        io::save_yaml(&paths::registry_path(root), self)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn get(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn require(&self, id: &str) -> Result<&Feature> {
        self.get(id)
            .ok_or_else(|| StagegateError::FeatureNotFound(id.to_string()))
    }

    pub fn ids(&self) -> Vec<String> {
        self.features.iter().map(|f| f.id.clone()).collect()
    }

    /// Features that are neither planned nor deferred.
    pub fn tracked(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter().filter(|f| f.status.is_tracked())
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn register(
        &mut self,
        id: &str,
        title: impl Into<String>,
        status: FeatureStatus,
    ) -> Result<&Feature> {
        paths::validate_feature_id(id)?;
        if self.contains(id) {
            return Err(StagegateError::FeatureExists(id.to_string()));
        }
        self.features.push(Feature {
            id: id.to_string(),
            title: title.into(),
            status,
        });
        Ok(&self.features[self.features.len() - 1])
    }

    pub fn remove(&mut self, id: &str) -> Result<Feature> {
        let pos = self
            .features
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| StagegateError::FeatureNotFound(id.to_string()))?;
        Ok(self.features.remove(pos))
    }

    pub fn set_status(&mut self, id: &str, status: FeatureStatus) -> Result<()> {
        self.find_mut(id)?.status = status;
        Ok(())
    }

    pub fn set_title(&mut self, id: &str, title: impl Into<String>) -> Result<()> {
        self.find_mut(id)?.title = title.into();
        Ok(())
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Feature> {
        self.features
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| StagegateError::FeatureNotFound(id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
