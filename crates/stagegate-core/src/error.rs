use thiserror::Error;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Coarse classification callers use to decide how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid input to a public operation. Rejected before any mutation.
    User,
    /// A referenced entity does not exist (or already exists).
    Validation,
    /// Underlying read/write or decode failure.
    Io,
}

// ---------------------------------------------------------------------------
// StagegateError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StagegateError {
    #[error("not initialized: run 'stagegate init'")]
    NotInitialized,

    #[error("feature not found: {0}")]
    FeatureNotFound(String),

    #[error("feature already exists: {0}")]
    FeatureExists(String),

    #[error("invalid feature id '{0}': must be lowercase alphanumeric with hyphens or underscores")]
    InvalidFeatureId(String),

    #[error("invalid feature status: {0}")]
    InvalidStatus(String),

    #[error("invalid stage '{0}': expected one of prd, seed, bdd, tests, impl")]
    InvalidStage(String),

    #[error("score {0} is out of range: must be between 0 and 10")]
    ScoreOutOfRange(i64),

    #[error("invalid review verdict: {0}")]
    InvalidVerdict(String),

    #[error("invalid task priority: {0}")]
    InvalidPriority(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("invalid forbidden pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl StagegateError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StagegateError::InvalidFeatureId(_)
            | StagegateError::InvalidStatus(_)
            | StagegateError::InvalidStage(_)
            | StagegateError::ScoreOutOfRange(_)
            | StagegateError::InvalidVerdict(_)
            | StagegateError::InvalidPriority(_)
            | StagegateError::InvalidPattern { .. } => ErrorCategory::User,
            StagegateError::NotInitialized
            | StagegateError::FeatureNotFound(_)
            | StagegateError::FeatureExists(_)
            | StagegateError::TaskNotFound(_) => ErrorCategory::Validation,
            StagegateError::Io(_) | StagegateError::Yaml(_) => ErrorCategory::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, StagegateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(
            StagegateError::ScoreOutOfRange(11).category(),
            ErrorCategory::User
        );
        assert_eq!(
            StagegateError::InvalidStage("qa".into()).category(),
            ErrorCategory::User
        );
        assert_eq!(
            StagegateError::FeatureNotFound("auth".into()).category(),
            ErrorCategory::Validation
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(StagegateError::from(io).category(), ErrorCategory::Io);
    }

    #[test]
    fn stage_error_lists_valid_names() {
        let msg = StagegateError::InvalidStage("qa".into()).to_string();
        assert!(msg.contains("prd, seed, bdd, tests, impl"));
    }
}
