use crate::error::Result;
use crate::io;
use crate::paths;
use crate::types::{ArtifactKind, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// StageScore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageScore {
    /// 0-10 inclusive.
    pub value: u8,
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// FeatureState
// ---------------------------------------------------------------------------

/// Persisted progress for one feature. BTreeMaps keep the on-disk key order
/// stable so repeated saves of unchanged state are byte-identical.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fingerprints: BTreeMap<ArtifactKind, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scores: BTreeMap<Stage, StageScore>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_mappings: Vec<String>,
}

impl FeatureState {
    /// Move the stage forward to `stage`. Returns true if it changed.
    /// Never lowers the stage.
    pub fn advance_to(&mut self, stage: Stage) -> bool {
        match self.stage {
            Some(current) if current >= stage => false,
            _ => {
                self.stage = Some(stage);
                true
            }
        }
    }

    pub fn score_for(&self, stage: Stage) -> Option<&StageScore> {
        self.scores.get(&stage)
    }

    /// Add `path` to the test mappings unless already present.
    pub fn add_test_mapping(&mut self, path: &str) -> bool {
        if self.test_mappings.iter().any(|p| p == path) {
            return false;
        }
        self.test_mappings.push(path.to_string());
        true
    }

    pub fn remove_test_mapping(&mut self, path: &str) -> bool {
        let before = self.test_mappings.len();
        self.test_mappings.retain(|p| p != path);
        self.test_mappings.len() != before
    }
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateStore {
    #[serde(default)]
    pub features: BTreeMap<String, FeatureState>,
}

impl StateStore {
    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Missing file ⇒ empty store. A present file that cannot be read or
    /// parsed is surfaced as an error.
    pub fn load(root: &Path) -> Result<Self> {
        io::load_yaml_or_default(&paths::state_path(root))
    }

    /// Rewrite the whole store atomically.
    pub fn save(&self, root: &Path) -> Result<()> {
        io::save_yaml(&paths::state_path(root), self)
    }

    // -----------------------------------------------------------------------
    // Access
    // -----------------------------------------------------------------------

    pub fn get(&self, feature: &str) -> Option<&FeatureState> {
        self.features.get(feature)
    }

    pub fn get_mut(&mut self, feature: &str) -> Option<&mut FeatureState> {
        self.features.get_mut(feature)
    }

    /// The state for `feature`, created empty if absent.
    pub fn entry(&mut self, feature: &str) -> &mut FeatureState {
        self.features.entry(feature.to_string()).or_default()
    }

    pub fn stage_of(&self, feature: &str) -> Option<Stage> {
        self.get(feature).and_then(|s| s.stage)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn record_score(&mut self, feature: &str, stage: Stage, value: u8) {
        self.entry(feature).scores.insert(
            stage,
            StageScore {
                value,
                recorded_at: Utc::now(),
            },
        );
    }

    pub fn set_test_mappings(&mut self, feature: &str, paths: Vec<String>) {
        let mut deduped: Vec<String> = Vec::with_capacity(paths.len());
        for p in paths {
            if !deduped.contains(&p) {
                deduped.push(p);
            }
        }
        self.entry(feature).test_mappings = deduped;
    }

    pub fn remove_feature(&mut self, feature: &str) -> Option<FeatureState> {
        self.features.remove(feature)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
