//! The explicit context every component receives: the project root and its
//! configuration. Nothing in the engine reaches for global state.

use crate::config::Config;
use crate::error::{Result, StagegateError};
use crate::io;
use crate::paths;
use crate::registry::Registry;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Open an initialized project. Fails with `NotInitialized` when
    /// `.stagegate/` does not exist.
    pub fn open(root: &Path) -> Result<Self> {
        if !paths::stagegate_dir(root).is_dir() {
            return Err(StagegateError::NotInitialized);
        }
        let config = Config::load(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    /// Build a project around an in-memory config without touching disk.
    pub fn with_config(root: &Path, config: Config) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
        }
    }

    /// Create `.stagegate/`, a default config, an empty registry, and the
    /// layout directories. Existing files are left untouched.
    pub fn init(root: &Path, project_name: &str) -> Result<Self> {
        io::ensure_dir(&paths::stagegate_dir(root))?;

        let config_path = paths::config_path(root);
        if !config_path.exists() {
            Config::new(project_name).save(root)?;
        }
        if !paths::registry_path(root).exists() {
            Registry::default().save(root)?;
        }

        let project = Self::open(root)?;
        let layout = &project.config.layout;
        let mut dirs: Vec<&str> = vec![layout.seeds_dir.as_str(), layout.bdd_dir.as_str()];
        dirs.extend(layout.tests_dirs.iter().map(String::as_str));
        dirs.extend(layout.src_dirs.iter().map(String::as_str));
        if let Some(parent) = Path::new(&layout.prd).parent() {
            if !parent.as_os_str().is_empty() {
                io::ensure_dir(&root.join(parent))?;
            }
        }
        for dir in dirs {
            io::ensure_dir(&root.join(dir))?;
        }
        Ok(project)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `path` relative to the project root, forward-slashed.
    pub fn relative(&self, path: &Path) -> String {
        paths::relative_to(&self.root, path)
    }

    pub fn prd_path(&self) -> PathBuf {
        self.root.join(&self.config.layout.prd)
    }

    pub fn tests_dirs(&self) -> Vec<PathBuf> {
        self.config
            .layout
            .tests_dirs
            .iter()
            .map(|d| self.root.join(d))
            .collect()
    }

    pub fn src_dirs(&self) -> Vec<PathBuf> {
        self.config
            .layout
            .src_dirs
            .iter()
            .map(|d| self.root.join(d))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_uninitialized_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Project::open(dir.path()),
            Err(StagegateError::NotInitialized)
        ));
    }

    #[test]
    fn init_is_idempotent_and_keeps_config() {
        let dir = TempDir::new().unwrap();
        let p = Project::init(dir.path(), "demo").unwrap();
        assert_eq!(p.config().project.name, "demo");
        assert!(dir.path().join("bdd").is_dir());
        assert!(dir.path().join("seeds").is_dir());
        assert!(dir.path().join("docs").is_dir());
        assert!(dir.path().join(".stagegate/features.yaml").exists());

        let mut cfg = p.config().clone();
        cfg.review.min_score = 9;
        cfg.save(dir.path()).unwrap();

        let p = Project::init(dir.path(), "other").unwrap();
        assert_eq!(p.config().review.min_score, 9);
        assert_eq!(p.config().project.name, "demo");
    }

    #[test]
    fn layout_paths() {
        let dir = TempDir::new().unwrap();
        let p = Project::with_config(dir.path(), Config::new("x"));
        assert_eq!(p.prd_path(), dir.path().join("docs/PRD.md"));
        assert_eq!(p.tests_dirs(), vec![dir.path().join("tests")]);
        assert_eq!(p.relative(&dir.path().join("src/a.rs")), "src/a.rs");
    }
}
