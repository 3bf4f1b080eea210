//! Review scores and the advancement gate built on them.

use crate::error::{Result, StagegateError};
use crate::project::Project;
use crate::registry::Registry;
use crate::review_status::ReviewStatus;
use crate::store::StateStore;
use crate::task::TaskList;
use crate::types::{Priority, ReviewVerdict, Stage};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub feature: String,
    pub stage: Stage,
    pub score: u8,
    pub passed: bool,
    /// Id of the redo task queued by this review, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redo_task: Option<String>,
}

pub fn redo_title(feature: &str, stage: Stage) -> String {
    format!("redo {stage} for {feature}")
}

/// Record a 0-10 review score for `feature` at `stage_name`.
///
/// All arguments are validated before anything is written. A failing score
/// queues an urgent redo task when `review.auto_redo` is on, unless an
/// identical redo task is still open.
pub fn record_review(
    project: &Project,
    feature: &str,
    stage_name: &str,
    score: i64,
) -> Result<ReviewOutcome> {
    let stage: Stage = stage_name.parse()?;
    let value = u8::try_from(score)
        .ok()
        .filter(|v| *v <= 10)
        .ok_or(StagegateError::ScoreOutOfRange(score))?;
    Registry::load(project.root())?.require(feature)?;

    let root = project.root();
    let review = &project.config().review;
    let passed = value >= review.min_score;

    let mut store = StateStore::load(root)?;
    store.record_score(feature, stage, value);
    store.save(root)?;

    let mut status = ReviewStatus::load(root)?;
    if let Some(entry) = status.features.get_mut(feature) {
        if entry.stage == stage {
            entry.review_verdict = if passed {
                ReviewVerdict::Passed
            } else {
                ReviewVerdict::Failed
            };
            status.save(root)?;
        }
    }

    let mut redo_task = None;
    if review.auto_redo && !passed {
        let title = redo_title(feature, stage);
        let mut tasks = TaskList::load(root)?;
        if !tasks.has_pending_titled(&title) {
            let id = tasks.add(feature, title, Priority::Urgent);
            tasks.save(root)?;
            redo_task = Some(id);
        }
    }

    info!(feature, %stage, score = value, passed, "recorded review");
    Ok(ReviewOutcome {
        feature: feature.to_string(),
        stage,
        score: value,
        passed,
        redo_task,
    })
}

/// True iff a score is recorded for `feature` at `stage` and meets
/// `review.min_score`.
pub fn check_gate(project: &Project, feature: &str, stage: Stage) -> Result<bool> {
    let store = StateStore::load(project.root())?;
    Ok(gate_passes(project, &store, feature, stage))
}

pub(crate) fn gate_passes(
    project: &Project,
    store: &StateStore,
    feature: &str,
    stage: Stage,
) -> bool {
    store
        .get(feature)
        .and_then(|s| s.score_for(stage))
        .is_some_and(|s| s.value >= project.config().review.min_score)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::types::FeatureStatus;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Project) {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path(), "t").unwrap();
        let mut registry = Registry::default();
        registry.register("auth", "Auth", FeatureStatus::Active).unwrap();
        registry.save(dir.path()).unwrap();
        (dir, project)
    }

    #[test]
    fn gate_boundary() {
        let (_dir, project) = setup();
        let min = project.config().review.min_score;

        record_review(&project, "auth", "bdd", i64::from(min)).unwrap();
        assert!(check_gate(&project, "auth", Stage::Bdd).unwrap());

        record_review(&project, "auth", "bdd", i64::from(min) - 1).unwrap();
        assert!(!check_gate(&project, "auth", Stage::Bdd).unwrap());
    }

    #[test]
    fn gate_false_without_score_or_feature() {
        let (_dir, project) = setup();
        assert!(!check_gate(&project, "auth", Stage::Tests).unwrap());
        assert!(!check_gate(&project, "ghost", Stage::Tests).unwrap());
    }

    #[test]
    fn failing_review_queues_one_redo_task() {
        let (dir, project) = setup();
        let first = record_review(&project, "auth", "prd", 5).unwrap();
        assert!(!first.passed);
        assert_eq!(first.redo_task.as_deref(), Some("T1"));

        let second = record_review(&project, "auth", "prd", 5).unwrap();
        assert!(second.redo_task.is_none());

        let tasks = TaskList::load(dir.path()).unwrap();
        assert_eq!(tasks.tasks.len(), 1);
        assert_eq!(tasks.tasks[0].title, "redo prd for auth");
        assert_eq!(tasks.tasks[0].priority, Priority::Urgent);
    }

    #[test]
    fn no_redo_when_disabled() {
        let (dir, project) = setup();
        let mut config = project.config().clone();
        config.review.auto_redo = false;
        let project = Project::with_config(dir.path(), config);
        let out = record_review(&project, "auth", "seed", 1).unwrap();
        assert!(out.redo_task.is_none());
        assert!(TaskList::load(dir.path()).unwrap().tasks.is_empty());
    }

    #[test]
    fn invalid_input_mutates_nothing() {
        let (dir, project) = setup();

        let err = record_review(&project, "auth", "deploy", 8).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::User);

        let err = record_review(&project, "auth", "bdd", 11).unwrap_err();
        assert!(matches!(err, StagegateError::ScoreOutOfRange(11)));
        let err = record_review(&project, "auth", "bdd", -1).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::User);

        let err = record_review(&project, "ghost", "bdd", 8).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);

        assert!(!dir.path().join(".stagegate/state.yaml").exists());
    }

    #[test]
    fn verdict_follows_score_at_current_stage() {
        let (dir, project) = setup();
        let mut status = ReviewStatus::default();
        status.entry("auth").stage = Stage::Impl;
        status.save(dir.path()).unwrap();

        record_review(&project, "auth", "impl", 9).unwrap();
        let status = ReviewStatus::load(dir.path()).unwrap();
        assert_eq!(status.get("auth").unwrap().review_verdict, ReviewVerdict::Passed);

        // A score for another stage leaves the verdict alone.
        record_review(&project, "auth", "bdd", 2).unwrap();
        let status = ReviewStatus::load(dir.path()).unwrap();
        assert_eq!(status.get("auth").unwrap().review_verdict, ReviewVerdict::Passed);
    }

    #[test]
    fn stage_aliases_are_accepted() {
        let (_dir, project) = setup();
        let out = record_review(&project, "auth", "implementation", 10).unwrap();
        assert_eq!(out.stage, Stage::Impl);
    }
}
