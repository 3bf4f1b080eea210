//! Auto-track: advance a feature's recorded stage when one of its artifacts
//! is written. Stages only move forward here.

use crate::classify::{classify, PathKind};
use crate::error::Result;
use crate::project::Project;
use crate::registry::Registry;
use crate::review_status::ReviewStatus;
use crate::store::StateStore;
use crate::types::{ReviewVerdict, Stage};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackOutcome {
    pub feature: String,
    /// The feature's review-status stage after tracking.
    pub stage: Stage,
    pub tests_written: bool,
    pub updated: bool,
}

/// Record that `path` was written. `None` when the path is not a stage
/// artifact of any registered feature.
pub fn track(project: &Project, path: &Path) -> Result<Option<TrackOutcome>> {
    let root = project.root();
    let registry = Registry::load(root)?;
    let classified = classify(project, path, &registry.ids());

    let (Some(stage), Some(feature)) = (classified.kind.stage(), classified.feature) else {
        debug!(path = %classified.path, "not a tracked artifact");
        return Ok(None);
    };
    let is_test = classified.kind == PathKind::Test;

    let mut status = ReviewStatus::load(root)?;
    let mut status_changed = false;
    let entry = status.entry(&feature);
    if stage > entry.stage {
        entry.stage = stage;
        entry.review_verdict = ReviewVerdict::Pending;
        entry.issue_count = 0;
        status_changed = true;
    }
    if is_test && !entry.tests_written {
        entry.tests_written = true;
        status_changed = true;
    }
    let outcome_stage = entry.stage;
    let tests_written = entry.tests_written;

    let mut store = StateStore::load(root)?;
    let state = store.entry(&feature);
    let mut state_changed = state.advance_to(stage);
    if is_test {
        state_changed |= state.add_test_mapping(&classified.path);
    }

    if status_changed {
        status.save(root)?;
    }
    if state_changed {
        store.save(root)?;
    }
    let updated = status_changed || state_changed;
    if updated {
        info!(%feature, stage = %outcome_stage, path = %classified.path, "tracked artifact");
    }

    Ok(Some(TrackOutcome {
        feature,
        stage: outcome_stage,
        tests_written,
        updated,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
