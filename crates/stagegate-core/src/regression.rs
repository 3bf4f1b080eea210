//! Detects edits to artifacts of stages a feature has already passed, and
//! reacts by severity. Only a requirements change ever lowers a stage.

use crate::artifact;
use crate::error::Result;
use crate::project::Project;
use crate::registry::Registry;
use crate::store::StateStore;
use crate::types::{ArtifactKind, Severity, Stage};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegressionWarning {
    pub feature: String,
    pub artifact_path: String,
    pub artifact_kind: ArtifactKind,
    pub severity: Severity,
    pub message: String,
}

/// Compare every tracked artifact against its stored fingerprint, apply the
/// regression rules to `store`, and refresh all fingerprints. Does not save.
///
/// Features are visited in registry order, artifact kinds in stage order. A
/// requirements change lowers the running stage to `prd` for the rest of that
/// feature's pass, so later edits in the same pass are silent updates.
pub fn detect_and_reconcile(
    project: &Project,
    registry: &Registry,
    store: &mut StateStore,
) -> Result<Vec<RegressionWarning>> {
    let ids = registry.ids();
    let mut warnings = Vec::new();

    for feature in &registry.features {
        let Some(mut current) = store.stage_of(&feature.id) else {
            continue;
        };
        // Test mappings are read while fingerprints are being rewritten.
        let snapshot = store.get(&feature.id).cloned();

        for &kind in ArtifactKind::all() {
            let Some(seen) = artifact::observe(project, &feature.id, kind, &ids, snapshot.as_ref())?
            else {
                continue;
            };
            let state = store.entry(&feature.id);
            let previous = state.fingerprints.insert(kind, seen.fingerprint.clone());
            let Some(previous) = previous else {
                debug!(feature = %feature.id, kind = %kind, "recorded baseline fingerprint");
                continue;
            };
            if previous == seen.fingerprint || kind.stage() >= current {
                continue;
            }

            let (severity, message) = match kind {
                ArtifactKind::RequirementsAnchor => {
                    let message = format!(
                        "requirements for '{}' changed after the feature reached '{current}'; \
                         stage reset to prd, revisit seed, scenarios, tests and implementation",
                        feature.id
                    );
                    state.stage = Some(Stage::Prd);
                    current = Stage::Prd;
                    (Severity::Error, message)
                }
                ArtifactKind::TestFile => (
                    Severity::Warn,
                    format!(
                        "tests for '{}' changed after implementation; re-run the test suite",
                        feature.id
                    ),
                ),
                ArtifactKind::SeedManifest | ArtifactKind::ScenarioFile => (
                    Severity::Warn,
                    format!(
                        "{} for '{}' changed while the feature is at '{current}'; \
                         downstream artifacts may be stale",
                        kind.as_str().replace('_', " "),
                        feature.id
                    ),
                ),
                // Implementation is the last stage; nothing sits above it.
                ArtifactKind::ImplementationFile => continue,
            };
            warn!(feature = %feature.id, kind = %kind, %severity, "regression detected");
            warnings.push(RegressionWarning {
                feature: feature.id.clone(),
                artifact_path: seen.path,
                artifact_kind: kind,
                severity,
                message,
            });
        }
    }

    Ok(warnings)
}

/// Load the registry and state, run detection, and persist the result.
pub fn reconcile(project: &Project) -> Result<Vec<RegressionWarning>> {
    let registry = Registry::load(project.root())?;
    let mut store = StateStore::load(project.root())?;
    let warnings = detect_and_reconcile(project, &registry, &mut store)?;
    store.save(project.root())?;
    info!(count = warnings.len(), "reconciled artifact fingerprints");
    Ok(warnings)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
