//! Path → artifact kind and owning feature. Gate-check and auto-track share
//! this so a path is never classified two different ways.

use crate::paths::STAGEGATE_DIR;
use crate::project::Project;
use crate::types::{ArtifactKind, Stage};
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// PathKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    /// Files under `.stagegate/`; always writable.
    Management,
    /// The requirements document itself.
    Requirements,
    SeedManifest,
    Scenario,
    Test,
    Implementation,
    Unclassified,
}

impl PathKind {
    pub fn artifact_kind(self) -> Option<ArtifactKind> {
        match self {
            PathKind::Requirements => Some(ArtifactKind::RequirementsAnchor),
            PathKind::SeedManifest => Some(ArtifactKind::SeedManifest),
            PathKind::Scenario => Some(ArtifactKind::ScenarioFile),
            PathKind::Test => Some(ArtifactKind::TestFile),
            PathKind::Implementation => Some(ArtifactKind::ImplementationFile),
            PathKind::Management | PathKind::Unclassified => None,
        }
    }

    pub fn stage(self) -> Option<Stage> {
        self.artifact_kind().map(ArtifactKind::stage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classified {
    pub kind: PathKind,
    /// Path relative to the project root, forward-slashed.
    pub path: String,
    pub feature: Option<String>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

pub fn classify(project: &Project, path: &Path, feature_ids: &[String]) -> Classified {
    let rel = project.relative(path);
    let layout = &project.config().layout;

    let kind = if rel == STAGEGATE_DIR || is_under(&rel, STAGEGATE_DIR) {
        PathKind::Management
    } else if rel == layout.prd.trim_start_matches("./") {
        PathKind::Requirements
    } else if is_under(&rel, &layout.bdd_dir) && rel.ends_with(".feature") {
        PathKind::Scenario
    } else if is_under(&rel, &layout.seeds_dir) {
        PathKind::SeedManifest
    } else if is_test_path(&rel, &layout.tests_dirs) {
        PathKind::Test
    } else if layout.src_dirs.iter().any(|d| is_under(&rel, d)) {
        PathKind::Implementation
    } else {
        PathKind::Unclassified
    };

    let feature = match kind {
        PathKind::Management | PathKind::Requirements | PathKind::Unclassified => None,
        _ => infer_feature(&rel, feature_ids),
    };

    Classified {
        kind,
        path: rel,
        feature,
    }
}

fn is_under(rel: &str, dir: &str) -> bool {
    let dir = dir.trim_start_matches("./").trim_end_matches('/');
    !dir.is_empty()
        && rel.len() > dir.len()
        && rel.starts_with(dir)
        && rel.as_bytes()[dir.len()] == b'/'
}

static TEST_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn test_name_re() -> &'static Regex {
    TEST_NAME_RE.get_or_init(|| {
        Regex::new(r"(?i)^(test_.+|.+_test\.[a-z0-9]+|.+_spec\.[a-z0-9]+|.+\.(test|spec)\.[a-z0-9]+)$")
            .expect("static regex")
    })
}

/// Test files are recognized by name (`*_test.*`, `*.test.*`, `*.spec.*`,
/// `test_*`) or by living under one of the configured test directories.
pub fn is_test_path(rel: &str, tests_dirs: &[String]) -> bool {
    let name = rel.rsplit('/').next().unwrap_or(rel);
    test_name_re().is_match(name) || tests_dirs.iter().any(|d| is_under(rel, d))
}

// ---------------------------------------------------------------------------
// Feature inference
// ---------------------------------------------------------------------------

/// Infer which feature a path belongs to.
///
/// Exact matches win (file stem, then directory names deepest-first). Only
/// then is the longest id contained in the path chosen, so `auth` never
/// claims a file that names `authorization`.
pub fn infer_feature(rel: &str, feature_ids: &[String]) -> Option<String> {
    let rel = rel.to_ascii_lowercase();
    let mut parts: Vec<&str> = rel.split('/').filter(|p| !p.is_empty()).collect();
    let file = parts.pop()?;
    let stem = feature_stem(file);

    if let Some(id) = feature_ids.iter().find(|id| same_id(id, &stem)) {
        return Some(id.clone());
    }
    for dir in parts.iter().rev() {
        if let Some(id) = feature_ids.iter().find(|id| same_id(id, dir)) {
            return Some(id.clone());
        }
    }

    longest_contained(&stem, feature_ids).or_else(|| {
        let without_ext = match rel.rfind('.') {
            Some(i) if i > rel.rfind('/').map_or(0, |s| s + 1) => &rel[..i],
            _ => rel.as_str(),
        };
        longest_contained(without_ext, feature_ids)
    })
}

/// File name up to its first dot, with test markers stripped:
/// `authorization_test.go` → `authorization`, `test_auth.py` → `auth`.
fn feature_stem(file: &str) -> String {
    let base = file.split('.').next().unwrap_or(file);
    let base = base.strip_prefix("test_").unwrap_or(base);
    let base = base
        .strip_suffix("_test")
        .or_else(|| base.strip_suffix("_spec"))
        .unwrap_or(base);
    base.to_string()
}

fn normalize(s: &str) -> String {
    s.to_ascii_lowercase().replace('-', "_")
}

fn same_id(id: &str, token: &str) -> bool {
    normalize(id) == normalize(token)
}

fn longest_contained(haystack: &str, feature_ids: &[String]) -> Option<String> {
    let haystack = normalize(haystack);
    feature_ids
        .iter()
        .filter(|id| haystack.contains(&normalize(id)))
        .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
        .cloned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn project() -> Project {
        Project::with_config(Path::new("/proj"), Config::new("t"))
    }

    #[test]
    fn exact_beats_substring() {
        let ids = ids(&["auth", "authorization"]);
        assert_eq!(
            infer_feature("authorization_test.go", &ids).as_deref(),
            Some("authorization")
        );
        assert_eq!(infer_feature("tests/auth_test.go", &ids).as_deref(), Some("auth"));
    }

    #[test]
    fn longest_substring_when_no_exact() {
        let ids = ids(&["auth", "authorization"]);
        assert_eq!(
            infer_feature("authorization_flow_test.go", &ids).as_deref(),
            Some("authorization")
        );
        assert_eq!(
            infer_feature("src/oauth_helpers.rs", &ids).as_deref(),
            Some("auth")
        );
    }

    #[test]
    fn directory_names_match_exactly() {
        let ids = ids(&["billing", "auth"]);
        assert_eq!(
            infer_feature("src/billing/handler.go", &ids).as_deref(),
            Some("billing")
        );
        assert_eq!(
            infer_feature("seeds/auth/manifest.yaml", &ids).as_deref(),
            Some("auth")
        );
    }

    #[test]
    fn hyphen_and_underscore_are_equivalent() {
        let ids = ids(&["user-profile"]);
        assert_eq!(
            infer_feature("tests/user_profile_test.py", &ids).as_deref(),
            Some("user-profile")
        );
    }

    #[test]
    fn no_match_is_none() {
        assert!(infer_feature("src/main.rs", &ids(&["auth"])).is_none());
    }

    #[test]
    fn classify_kinds() {
        let p = project();
        let ids = ids(&["auth"]);
        let cases = [
            ("/proj/.stagegate/state.yaml", PathKind::Management),
            ("/proj/docs/PRD.md", PathKind::Requirements),
            ("/proj/bdd/auth.feature", PathKind::Scenario),
            ("/proj/seeds/auth.yaml", PathKind::SeedManifest),
            ("/proj/tests/auth_flow.rs", PathKind::Test),
            ("/proj/src/auth_test.go", PathKind::Test),
            ("/proj/web/auth.test.ts", PathKind::Test),
            ("/proj/src/auth.rs", PathKind::Implementation),
            ("/proj/README.md", PathKind::Unclassified),
            ("/proj/bdd/notes.md", PathKind::Unclassified),
        ];
        for (path, kind) in cases {
            assert_eq!(classify(&p, Path::new(path), &ids).kind, kind, "{path}");
        }
    }

    #[test]
    fn classify_relative_paths() {
        let p = project();
        let c = classify(&p, Path::new("bdd/auth.feature"), &ids(&["auth"]));
        assert_eq!(c.kind, PathKind::Scenario);
        assert_eq!(c.path, "bdd/auth.feature");
        assert_eq!(c.feature.as_deref(), Some("auth"));
    }

    #[test]
    fn srcdir_prefix_is_not_a_partial_name_match() {
        let p = project();
        let c = classify(&p, Path::new("/proj/srcgen/auth.rs"), &ids(&["auth"]));
        assert_eq!(c.kind, PathKind::Unclassified);
    }

    #[test]
    fn management_files_have_no_feature() {
        let p = project();
        let c = classify(&p, Path::new("/proj/.stagegate/auth.yaml"), &ids(&["auth"]));
        assert_eq!(c.kind, PathKind::Management);
        assert!(c.feature.is_none());
    }

    #[test]
    fn kind_to_stage() {
        assert_eq!(PathKind::Scenario.stage(), Some(Stage::Bdd));
        assert_eq!(PathKind::Test.stage(), Some(Stage::Tests));
        assert_eq!(PathKind::Unclassified.stage(), None);
    }
}
