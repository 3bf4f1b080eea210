//! Write authorization: may this path be written given which prerequisite
//! artifacts exist? Called from editor hooks, so it never mutates state.

use crate::artifact;
use crate::classify::{classify, PathKind};
use crate::error::Result;
use crate::project::Project;
use crate::registry::Registry;
use crate::review_status::ReviewStatus;
use crate::store::StateStore;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateCheckResult {
    pub allowed: bool,
    pub reason: String,
    /// Inferred feature, empty when none could be inferred.
    pub feature: String,
}

impl GateCheckResult {
    fn allow(reason: impl Into<String>, feature: &str) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
            feature: feature.to_string(),
        }
    }

    fn deny(reason: String, feature: &str) -> Self {
        Self {
            allowed: false,
            reason,
            feature: feature.to_string(),
        }
    }
}

pub fn check(project: &Project, path: &Path) -> Result<GateCheckResult> {
    let registry = Registry::load(project.root())?;
    let ids = registry.ids();
    let classified = classify(project, path, &ids);
    let layout = &project.config().layout;

    let result = match classified.kind {
        PathKind::Management => GateCheckResult::allow("stagegate management file", ""),
        PathKind::Requirements => GateCheckResult::allow("requirements document", ""),
        PathKind::Unclassified => GateCheckResult::allow("not a pipeline artifact", ""),
        kind => match classified.feature.as_deref() {
            None => GateCheckResult::allow("no feature could be inferred from the path", ""),
            Some(feature) => match kind {
                PathKind::SeedManifest => {
                    if artifact::anchor_for(project, feature)?.is_some() {
                        GateCheckResult::allow("requirements anchor present", feature)
                    } else {
                        GateCheckResult::deny(
                            format!(
                                "seed data for '{feature}' needs a requirements anchor first: \
                                 add a heading ending in {{#{feature}}} to {}",
                                layout.prd
                            ),
                            feature,
                        )
                    }
                }
                PathKind::Scenario => {
                    if !artifact::seed_files(project, feature, &ids)?.is_empty() {
                        GateCheckResult::allow("seed manifest present", feature)
                    } else {
                        GateCheckResult::deny(
                            format!(
                                "scenarios for '{feature}' need a seed manifest first: \
                                 create {}/{feature}.yaml",
                                layout.seeds_dir
                            ),
                            feature,
                        )
                    }
                }
                PathKind::Test => {
                    if !artifact::scenario_files(project, feature, &ids)?.is_empty() {
                        GateCheckResult::allow("scenario file present", feature)
                    } else {
                        GateCheckResult::deny(
                            format!(
                                "tests for '{feature}' need a scenario file first: \
                                 create {}/{feature}.feature",
                                layout.bdd_dir
                            ),
                            feature,
                        )
                    }
                }
                PathKind::Implementation => {
                    if has_tests(project, feature, &ids)? {
                        GateCheckResult::allow("tests present", feature)
                    } else {
                        GateCheckResult::deny(
                            format!(
                                "implementation for '{feature}' needs tests first: \
                                 write a test file such as {}/{feature}_test.<ext>",
                                layout.tests_dirs.first().map_or("tests", String::as_str)
                            ),
                            feature,
                        )
                    }
                }
                PathKind::Management | PathKind::Requirements | PathKind::Unclassified => {
                    GateCheckResult::allow("not a pipeline artifact", feature)
                }
            },
        },
    };

    if result.allowed {
        debug!(path = %classified.path, feature = %result.feature, "write allowed");
    } else {
        warn!(path = %classified.path, feature = %result.feature, "write denied");
    }
    Ok(result)
}

/// A `tests_written` flag or a recorded mapping settles it; otherwise the tree
/// is scanned. Score-only records say nothing about tests.
fn has_tests(project: &Project, feature: &str, ids: &[String]) -> Result<bool> {
    let status = ReviewStatus::load(project.root())?;
    let store = StateStore::load(project.root())?;

    if status.get(feature).is_some_and(|e| e.tests_written)
        || store.get(feature).is_some_and(|s| !s.test_mappings.is_empty())
    {
        return Ok(true);
    }
    Ok(!artifact::structural_test_files(project, feature, ids)?.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io;
    use crate::types::FeatureStatus;
    use tempfile::TempDir;

    fn setup(ids: &[&str]) -> (TempDir, Project) {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path(), "t").unwrap();
        let mut registry = Registry::default();
        for id in ids {
            registry.register(id, *id, FeatureStatus::Active).unwrap();
        }
        registry.save(dir.path()).unwrap();
        (dir, project)
    }

    fn write(dir: &TempDir, rel: &str, content: &str) {
        io::atomic_write(&dir.path().join(rel), content.as_bytes()).unwrap();
    }

    fn check_rel(project: &Project, rel: &str) -> GateCheckResult {
        check(project, &project.root().join(rel)).unwrap()
    }

    #[test]
    fn scenario_without_seed_is_denied() {
        let (_dir, project) = setup(&["auth"]);
        let r = check_rel(&project, "bdd/auth.feature");
        assert!(!r.allowed);
        assert_eq!(r.feature, "auth");
        assert!(r.reason.contains("seed"));
    }

    #[test]
    fn scenario_with_seed_is_allowed() {
        let (dir, project) = setup(&["auth"]);
        write(&dir, "seeds/auth.yaml", "users: 1\n");
        assert!(check_rel(&project, "bdd/auth.feature").allowed);
    }

    #[test]
    fn seed_needs_anchor() {
        let (dir, project) = setup(&["auth"]);
        let r = check_rel(&project, "seeds/auth.yaml");
        assert!(!r.allowed);
        assert!(r.reason.contains("{#auth}"));

        write(&dir, "docs/PRD.md", "## Auth {#auth}\n");
        assert!(check_rel(&project, "seeds/auth.yaml").allowed);
    }

    #[test]
    fn nested_artifacts_satisfy_the_next_stage() {
        let (dir, project) = setup(&["auth"]);
        write(&dir, "docs/PRD.md", "## Auth {#auth}\n");
        write(&dir, "seeds/auth/users.yaml", "users: 1\n");
        assert!(check_rel(&project, "bdd/auth.feature").allowed);

        write(&dir, "bdd/auth/login.feature", "Feature: login\n");
        let r = check_rel(&project, "tests/auth_test.go");
        assert!(r.allowed, "{}", r.reason);
    }

    #[test]
    fn tests_need_scenario() {
        let (dir, project) = setup(&["auth"]);
        assert!(!check_rel(&project, "tests/auth_test.go").allowed);
        write(&dir, "bdd/auth.feature", "Feature: auth\n");
        assert!(check_rel(&project, "tests/auth_test.go").allowed);
    }

    #[test]
    fn implementation_needs_tests() {
        let (dir, project) = setup(&["auth"]);
        let r = check_rel(&project, "src/auth.rs");
        assert!(!r.allowed);
        assert!(r.reason.contains("tests"));

        write(&dir, "tests/auth_test.rs", "#[test] fn t() {}\n");
        assert!(check_rel(&project, "src/auth.rs").allowed);
    }

    #[test]
    fn review_records_do_not_hide_tests_on_disk() {
        let (dir, project) = setup(&["auth"]);
        write(&dir, "docs/PRD.md", "## Auth {#auth}\n");
        write(&dir, "tests/auth_test.rs", "#[test] fn t() {}\n");
        assert!(check_rel(&project, "src/auth.rs").allowed);

        crate::review::record_review(&project, "auth", "prd", 8).unwrap();
        let r = check_rel(&project, "src/auth.rs");
        assert!(r.allowed, "{}", r.reason);

        let mut status = ReviewStatus::default();
        status.entry("auth");
        status.save(dir.path()).unwrap();
        assert!(check_rel(&project, "src/auth.rs").allowed);
    }

    #[test]
    fn tests_written_flag_allows_without_test_files() {
        let (dir, project) = setup(&["auth"]);
        assert!(!check_rel(&project, "src/auth.rs").allowed);

        let mut status = ReviewStatus::default();
        status.entry("auth").tests_written = true;
        status.save(dir.path()).unwrap();
        assert!(check_rel(&project, "src/auth.rs").allowed);
    }

    #[test]
    fn implementation_allowed_by_test_mapping() {
        let (dir, project) = setup(&["auth"]);
        let mut store = StateStore::default();
        store.entry("auth").add_test_mapping("e2e/login.spec.ts");
        store.save(dir.path()).unwrap();
        assert!(check_rel(&project, "src/auth.rs").allowed);
    }

    #[test]
    fn longest_match_picks_the_right_feature() {
        let (dir, project) = setup(&["auth", "authorization"]);
        write(&dir, "bdd/auth.feature", "Feature: auth\n");
        let r = check_rel(&project, "tests/authorization_test.go");
        assert_eq!(r.feature, "authorization");
        assert!(!r.allowed);
    }

    #[test]
    fn always_allowed_paths() {
        let (_dir, project) = setup(&["auth"]);
        for rel in [".stagegate/state.yaml", "docs/PRD.md", "README.md", "src/main.rs"] {
            let r = check_rel(&project, rel);
            assert!(r.allowed, "{rel}: {}", r.reason);
            assert_eq!(r.feature, "", "{rel}");
        }
    }
}
