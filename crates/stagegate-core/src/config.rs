use crate::error::{Result, StagegateError};
use crate::paths;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ReviewConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Minimum score (0-10) a stage review must reach to pass its gate.
    #[serde(default = "default_min_score")]
    pub min_score: u8,
    /// Queue a remediation task when a review lands below `min_score`.
    #[serde(default = "default_auto_redo")]
    pub auto_redo: bool,
}

fn default_min_score() -> u8 {
    7
}

fn default_auto_redo() -> bool {
    true
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            auto_redo: default_auto_redo(),
        }
    }
}

// ---------------------------------------------------------------------------
// LayoutConfig
// ---------------------------------------------------------------------------

/// Where each stage's artifacts live, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_prd")]
    pub prd: String,
    #[serde(default = "default_seeds_dir")]
    pub seeds_dir: String,
    #[serde(default = "default_bdd_dir")]
    pub bdd_dir: String,
    #[serde(default = "default_tests_dirs")]
    pub tests_dirs: Vec<String>,
    #[serde(default = "default_src_dirs")]
    pub src_dirs: Vec<String>,
}

fn default_prd() -> String {
    "docs/PRD.md".to_string()
}

fn default_seeds_dir() -> String {
    "seeds".to_string()
}

fn default_bdd_dir() -> String {
    "bdd".to_string()
}

fn default_tests_dirs() -> Vec<String> {
    vec!["tests".to_string()]
}

fn default_src_dirs() -> Vec<String> {
    vec!["src".to_string()]
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            prd: default_prd(),
            seeds_dir: default_seeds_dir(),
            bdd_dir: default_bdd_dir(),
            tests_dirs: default_tests_dirs(),
            src_dirs: default_src_dirs(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "project".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Regexes that flag test doubles / mocking inside test files.
    #[serde(default = "default_forbidden_patterns")]
    pub forbidden_patterns: Vec<String>,
}

fn default_version() -> u32 {
    1
}

fn default_forbidden_patterns() -> Vec<String> {
    [
        r"\bjest\.mock\(",
        r"\bjest\.fn\(",
        r"\bunittest\.mock\b",
        r"\bMagicMock\b",
        r"\bmock\.patch\b",
        r"\bgomock\b",
        r"\bsinon\.(stub|mock|fake)\b",
        r"\bmockito\b",
        r"\bmockall\b",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self::new(ProjectConfig::default().name)
    }
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
            },
            review: ReviewConfig::default(),
            layout: LayoutConfig::default(),
            forbidden_patterns: default_forbidden_patterns(),
        }
    }

    /// Load `.stagegate/config.yaml`. A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        crate::io::load_yaml_or_default(&paths::config_path(root))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        crate::io::save_yaml(&paths::config_path(root), self)
    }

    /// Compile `forbidden_patterns`. An invalid regex is a user error.
    pub fn compiled_patterns(&self) -> Result<Vec<Regex>> {
        self.forbidden_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| StagegateError::InvalidPattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.review.min_score > 10 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "review.min_score={} can never be reached (scores are 0-10)",
                    self.review.min_score
                ),
            });
        } else if self.review.min_score == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "review.min_score=0 lets every review pass".to_string(),
            });
        }

        for pattern in &self.forbidden_patterns {
            if pattern.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: "forbidden_patterns contains an empty pattern".to_string(),
                });
            } else if let Err(e) = Regex::new(pattern) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("forbidden pattern '{pattern}' is not a valid regex: {e}"),
                });
            }
        }

        // A directory that is both a source and a seeds/bdd dir makes
        // classification ambiguous.
        let stage_dirs = [&self.layout.seeds_dir, &self.layout.bdd_dir];
        for dir in self.layout.src_dirs.iter().chain(&self.layout.tests_dirs) {
            if stage_dirs.iter().any(|d| *d == dir) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("layout directory '{dir}' is used for more than one stage"),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
