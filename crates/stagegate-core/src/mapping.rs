//! Explicit test-file mappings. These override structural inference when
//! resolving a feature's tests.

use crate::artifact;
use crate::error::Result;
use crate::project::Project;
use crate::registry::Registry;
use crate::store::StateStore;
use std::path::Path;
use tracing::info;

/// Map `path` to `feature`. Returns false when it was already mapped.
pub fn map_test(project: &Project, feature: &str, path: &Path) -> Result<bool> {
    Registry::load(project.root())?.require(feature)?;
    let rel = project.relative(path);
    let mut store = StateStore::load(project.root())?;
    let added = store.entry(feature).add_test_mapping(&rel);
    if added {
        store.save(project.root())?;
        info!(feature, path = %rel, "mapped test file");
    }
    Ok(added)
}

/// Returns false when `path` was not mapped.
pub fn unmap_test(project: &Project, feature: &str, path: &Path) -> Result<bool> {
    Registry::load(project.root())?.require(feature)?;
    let rel = project.relative(path);
    let mut store = StateStore::load(project.root())?;
    let removed = store
        .get_mut(feature)
        .is_some_and(|s| s.remove_test_mapping(&rel));
    if removed {
        store.save(project.root())?;
    }
    Ok(removed)
}

pub fn mapped_tests(project: &Project, feature: &str) -> Result<Vec<String>> {
    Registry::load(project.root())?.require(feature)?;
    let store = StateStore::load(project.root())?;
    Ok(store
        .get(feature)
        .map(|s| s.test_mappings.clone())
        .unwrap_or_default())
}

/// Replace the feature's mappings with what a structural scan finds.
pub fn resolve_tests(project: &Project, feature: &str) -> Result<Vec<String>> {
    let registry = Registry::load(project.root())?;
    registry.require(feature)?;
    let found = artifact::structural_test_files(project, feature, &registry.ids())?;
    let mut store = StateStore::load(project.root())?;
    store.set_test_mappings(feature, found.clone());
    store.save(project.root())?;
    info!(feature, count = found.len(), "resolved test files");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::io;
    use crate::types::FeatureStatus;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Project) {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path(), "t").unwrap();
        let mut registry = Registry::default();
        registry.register("auth", "Auth", FeatureStatus::Active).unwrap();
        registry.register("billing", "Billing", FeatureStatus::Active).unwrap();
        registry.save(dir.path()).unwrap();
        (dir, project)
    }

    #[test]
    fn map_and_unmap() {
        let (dir, project) = setup();
        let path = dir.path().join("e2e/login.spec.ts");
        assert!(map_test(&project, "auth", &path).unwrap());
        assert!(!map_test(&project, "auth", &path).unwrap());
        assert_eq!(mapped_tests(&project, "auth").unwrap(), vec!["e2e/login.spec.ts"]);

        assert!(unmap_test(&project, "auth", Path::new("e2e/login.spec.ts")).unwrap());
        assert!(!unmap_test(&project, "auth", &path).unwrap());
        assert!(mapped_tests(&project, "auth").unwrap().is_empty());
    }

    #[test]
    fn unknown_feature_is_validation_error() {
        let (dir, project) = setup();
        let err = map_test(&project, "ghost", &dir.path().join("t_test.go")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn resolve_replaces_with_structural_scan() {
        let (dir, project) = setup();
        io::atomic_write(&dir.path().join("tests/auth_test.go"), b"x").unwrap();
        io::atomic_write(&dir.path().join("tests/billing_test.go"), b"y").unwrap();
        map_test(&project, "auth", &dir.path().join("old/auth.spec.ts")).unwrap();

        let found = resolve_tests(&project, "auth").unwrap();
        assert_eq!(found, vec!["tests/auth_test.go"]);
        assert_eq!(mapped_tests(&project, "auth").unwrap(), found);
    }
}
