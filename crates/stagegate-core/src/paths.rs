use crate::error::{Result, StagegateError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const STAGEGATE_DIR: &str = ".stagegate";

pub const CONFIG_FILE: &str = ".stagegate/config.yaml";
pub const REGISTRY_FILE: &str = ".stagegate/features.yaml";
pub const STATE_FILE: &str = ".stagegate/state.yaml";
pub const REVIEW_STATUS_FILE: &str = ".stagegate/review-status.yaml";
pub const TASKS_FILE: &str = ".stagegate/tasks.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn stagegate_dir(root: &Path) -> PathBuf {
    root.join(STAGEGATE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn registry_path(root: &Path) -> PathBuf {
    root.join(REGISTRY_FILE)
}

pub fn state_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

pub fn review_status_path(root: &Path) -> PathBuf {
    root.join(REVIEW_STATUS_FILE)
}

pub fn tasks_path(root: &Path) -> PathBuf {
    root.join(TASKS_FILE)
}

/// Render `path` relative to `root` with forward slashes. Paths outside
/// `root` are returned as given.
pub fn relative_to(root: &Path, path: &Path) -> String {
    let rel = if path.is_absolute() {
        path.strip_prefix(root).unwrap_or(path)
    } else {
        path
    };
    let s = rel.to_string_lossy().replace('\\', "/");
    s.trim_start_matches("./").to_string()
}

// ---------------------------------------------------------------------------
// Feature id validation
// ---------------------------------------------------------------------------

static ID_RE: OnceLock<Regex> = OnceLock::new();

fn id_re() -> &'static Regex {
    ID_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9_\-]*[a-z0-9]$|^[a-z0-9]$").expect("static regex")
    })
}

pub fn validate_feature_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !id_re().is_match(id) {
        return Err(StagegateError::InvalidFeatureId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ids() {
        for id in ["auth", "a", "user-profile", "user_profile", "x1"] {
            validate_feature_id(id).unwrap_or_else(|_| panic!("expected valid: {id}"));
        }
    }

    #[test]
    fn invalid_ids() {
        for id in ["", "-auth", "auth-", "has spaces", "UPPER", "a/b"] {
            assert!(validate_feature_id(id).is_err(), "expected invalid: {id}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            state_path(root),
            PathBuf::from("/tmp/proj/.stagegate/state.yaml")
        );
        assert_eq!(
            review_status_path(root),
            PathBuf::from("/tmp/proj/.stagegate/review-status.yaml")
        );
    }

    #[test]
    fn relative_rendering() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            relative_to(root, Path::new("/tmp/proj/bdd/auth.feature")),
            "bdd/auth.feature"
        );
        assert_eq!(relative_to(root, Path::new("./src/a.rs")), "src/a.rs");
        assert_eq!(relative_to(root, Path::new("/elsewhere/x")), "/elsewhere/x");
    }
}
