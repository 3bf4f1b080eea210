//! Lightweight agent-facing projection of each feature's progress. Kept apart
//! from [`crate::store::StateStore`]: the stage recorded here only ever moves
//! forward, even when the regression detector downgrades the full state.

use crate::error::Result;
use crate::io;
use crate::paths;
use crate::types::{ReviewVerdict, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewStatusEntry {
    pub stage: Stage,
    #[serde(default)]
    pub tests_written: bool,
    #[serde(default)]
    pub review_verdict: ReviewVerdict,
    #[serde(default)]
    pub issue_count: u32,
}

impl Default for ReviewStatusEntry {
    fn default() -> Self {
        Self {
            stage: Stage::Prd,
            tests_written: false,
            review_verdict: ReviewVerdict::Pending,
            issue_count: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewStatus {
    #[serde(default)]
    pub features: BTreeMap<String, ReviewStatusEntry>,
}

impl ReviewStatus {
    /// Missing file ⇒ empty.
    pub fn load(root: &Path) -> Result<Self> {
        io::load_yaml_or_default(&paths::review_status_path(root))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        io::save_yaml(&paths::review_status_path(root), self)
    }

    pub fn get(&self, feature: &str) -> Option<&ReviewStatusEntry> {
        self.features.get(feature)
    }

    pub fn entry(&mut self, feature: &str) -> &mut ReviewStatusEntry {
        self.features.entry(feature.to_string()).or_default()
    }

    /// Record a reviewer's verdict for the feature's current stage.
    pub fn set_verdict(&mut self, feature: &str, verdict: ReviewVerdict, issue_count: u32) {
        let entry = self.entry(feature);
        entry.review_verdict = verdict;
        entry.issue_count = issue_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut rs = ReviewStatus::default();
        let e = rs.entry("auth");
        e.stage = Stage::Tests;
        e.tests_written = true;
        rs.set_verdict("auth", ReviewVerdict::Failed, 3);
        rs.save(dir.path()).unwrap();

        let loaded = ReviewStatus::load(dir.path()).unwrap();
        let e = loaded.get("auth").unwrap();
        assert_eq!(e.stage, Stage::Tests);
        assert!(e.tests_written);
        assert_eq!(e.review_verdict, ReviewVerdict::Failed);
        assert_eq!(e.issue_count, 3);
    }

    #[test]
    fn minimal_entry_uses_defaults() {
        let yaml = "features:\n  auth:\n    stage: bdd\n";
        let rs: ReviewStatus = serde_yaml::from_str(yaml).unwrap();
        let e = rs.get("auth").unwrap();
        assert_eq!(e.stage, Stage::Bdd);
        assert!(!e.tests_written);
        assert_eq!(e.review_verdict, ReviewVerdict::Pending);
    }
}
