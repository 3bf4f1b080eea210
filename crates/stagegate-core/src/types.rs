use crate::error::StagegateError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// The five pipeline stages, in their fixed total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Prd,
    Seed,
    Bdd,
    Tests,
    Impl,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Prd => "prd",
            Stage::Seed => "seed",
            Stage::Bdd => "bdd",
            Stage::Tests => "tests",
            Stage::Impl => "impl",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = StagegateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prd" | "requirements" => Ok(Stage::Prd),
            "seed" | "seeds" => Ok(Stage::Seed),
            "bdd" | "scenarios" | "scenario" => Ok(Stage::Bdd),
            "tests" | "test" => Ok(Stage::Tests),
            "impl" | "implementation" => Ok(Stage::Impl),
            _ => Err(StagegateError::InvalidStage(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    RequirementsAnchor,
    SeedManifest,
    ScenarioFile,
    TestFile,
    ImplementationFile,
}

impl ArtifactKind {
    /// All kinds, ordered by the stage they belong to.
    pub fn all() -> &'static [ArtifactKind] {
        &[
            ArtifactKind::RequirementsAnchor,
            ArtifactKind::SeedManifest,
            ArtifactKind::ScenarioFile,
            ArtifactKind::TestFile,
            ArtifactKind::ImplementationFile,
        ]
    }

    pub fn stage(self) -> Stage {
        match self {
            ArtifactKind::RequirementsAnchor => Stage::Prd,
            ArtifactKind::SeedManifest => Stage::Seed,
            ArtifactKind::ScenarioFile => Stage::Bdd,
            ArtifactKind::TestFile => Stage::Tests,
            ArtifactKind::ImplementationFile => Stage::Impl,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::RequirementsAnchor => "requirements_anchor",
            ArtifactKind::SeedManifest => "seed_manifest",
            ArtifactKind::ScenarioFile => "scenario_file",
            ArtifactKind::TestFile => "test_file",
            ArtifactKind::ImplementationFile => "implementation_file",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FeatureStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureStatus {
    Planned,
    Active,
    InProgress,
    Deferred,
    Implemented,
}

impl FeatureStatus {
    /// Planned and deferred features are outside the pipeline's checks.
    pub fn is_tracked(self) -> bool {
        !matches!(self, FeatureStatus::Planned | FeatureStatus::Deferred)
    }

    /// Features currently being worked on.
    pub fn is_active(self) -> bool {
        matches!(self, FeatureStatus::Active | FeatureStatus::InProgress)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureStatus::Planned => "planned",
            FeatureStatus::Active => "active",
            FeatureStatus::InProgress => "in-progress",
            FeatureStatus::Deferred => "deferred",
            FeatureStatus::Implemented => "implemented",
        }
    }
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FeatureStatus {
    type Err = StagegateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(FeatureStatus::Planned),
            "active" => Ok(FeatureStatus::Active),
            "in-progress" | "in_progress" => Ok(FeatureStatus::InProgress),
            "deferred" => Ok(FeatureStatus::Deferred),
            "implemented" => Ok(FeatureStatus::Implemented),
            _ => Err(StagegateError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ReviewVerdict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewVerdict {
    #[default]
    Pending,
    Passed,
    Failed,
}

impl fmt::Display for ReviewVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReviewVerdict::Pending => "pending",
            ReviewVerdict::Passed => "passed",
            ReviewVerdict::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for ReviewVerdict {
    type Err = StagegateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReviewVerdict::Pending),
            "passed" | "pass" => Ok(ReviewVerdict::Passed),
            "failed" | "fail" => Ok(ReviewVerdict::Failed),
            _ => Err(StagegateError::InvalidVerdict(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warn,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
        })
    }
}

// ---------------------------------------------------------------------------
// TaskStatus / Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn is_done(self) -> bool {
        self == TaskStatus::Completed
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Normal,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Priority {
    type Err = StagegateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "urgent" => Ok(Priority::Urgent),
            "high" => Ok(Priority::High),
            "normal" => Ok(Priority::Normal),
            "low" => Ok(Priority::Low),
            _ => Err(StagegateError::InvalidPriority(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn stage_ordering() {
        assert!(Stage::Prd < Stage::Seed);
        assert!(Stage::Seed < Stage::Bdd);
        assert!(Stage::Bdd < Stage::Tests);
        assert!(Stage::Tests < Stage::Impl);
    }

    #[test]
    fn stage_parse_aliases() {
        assert_eq!(Stage::from_str("requirements").unwrap(), Stage::Prd);
        assert_eq!(Stage::from_str("Implementation").unwrap(), Stage::Impl);
        assert!(matches!(
            Stage::from_str("qa"),
            Err(StagegateError::InvalidStage(_))
        ));
    }

    #[test]
    fn kinds_are_in_stage_order() {
        let stages: Vec<Stage> = ArtifactKind::all().iter().map(|k| k.stage()).collect();
        assert_eq!(
            stages,
            [Stage::Prd, Stage::Seed, Stage::Bdd, Stage::Tests, Stage::Impl]
        );
    }

    #[test]
    fn feature_status_kebab_case() {
        let yaml = serde_yaml::to_string(&FeatureStatus::InProgress).unwrap();
        assert_eq!(yaml.trim(), "in-progress");
        assert!(!FeatureStatus::Planned.is_tracked());
        assert!(!FeatureStatus::Deferred.is_tracked());
        assert!(FeatureStatus::Implemented.is_tracked());
        assert!(FeatureStatus::InProgress.is_active());
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::Urgent < Priority::Normal);
        assert_eq!(Priority::from_str("urgent").unwrap(), Priority::Urgent);
        assert!(Priority::from_str("asap").is_err());
    }
}
