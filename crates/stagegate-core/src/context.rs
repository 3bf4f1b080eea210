use crate::artifact;
use crate::error::Result;
use crate::project::Project;
use crate::registry::{Feature, Registry};
use crate::review_status::ReviewStatus;
use crate::store::StateStore;
use crate::task::TaskList;
use crate::types::{FeatureStatus, Priority, ReviewVerdict, Stage, TaskStatus};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// NextAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NextAction {
    WriteSeed,
    WriteScenarios,
    WriteTests,
    WriteImplementation,
    ReviewImplementation,
}

impl NextAction {
    /// The step that follows a feature sitting at `stage` with nothing
    /// blocking it. `impl` has no table entry; it is either done or awaiting
    /// review.
    pub fn after(stage: Stage) -> Option<NextAction> {
        match stage {
            Stage::Prd => Some(NextAction::WriteSeed),
            Stage::Seed => Some(NextAction::WriteScenarios),
            Stage::Bdd => Some(NextAction::WriteTests),
            Stage::Tests => Some(NextAction::WriteImplementation),
            Stage::Impl => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NextAction::WriteSeed => "write-seed",
            NextAction::WriteScenarios => "write-scenarios",
            NextAction::WriteTests => "write-tests",
            NextAction::WriteImplementation => "write-implementation",
            NextAction::ReviewImplementation => "review-implementation",
        }
    }
}

impl fmt::Display for NextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    Blocked { reason: String },
    Done,
    Next { action: NextAction },
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Blocked { reason } => write!(f, "blocked: {reason}"),
            Recommendation::Done => f.write_str("done"),
            Recommendation::Next { action } => write!(f, "next: {action}"),
        }
    }
}

/// Where a feature's stage came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageSource {
    ReviewStatus,
    State,
    Structural,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct FeatureContext {
    pub feature: String,
    pub title: String,
    pub status: FeatureStatus,
    pub stage: Stage,
    pub verdict: ReviewVerdict,
    pub stage_source: StageSource,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskLine {
    pub id: String,
    pub feature: String,
    pub title: String,
    pub priority: Priority,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ContextReport {
    pub features: Vec<FeatureContext>,
    pub tasks: Vec<TaskLine>,
}

impl ContextReport {
    pub fn feature(&self, id: &str) -> Option<&FeatureContext> {
        self.features.iter().find(|f| f.feature == id)
    }
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

pub fn build(project: &Project) -> Result<ContextReport> {
    let root = project.root();
    let registry = Registry::load(root)?;
    let status = ReviewStatus::load(root)?;
    let store = StateStore::load(root)?;
    let tasks = TaskList::load(root)?;
    let ids = registry.ids();

    let mut report = ContextReport::default();
    for feature in registry.tracked() {
        let recorded = (status.get(&feature.id), store.stage_of(&feature.id));
        let (stage, verdict, stage_source) = match recorded {
            (Some(entry), _) => (
                entry.stage,
                entry.review_verdict,
                StageSource::ReviewStatus,
            ),
            (None, Some(stage)) => (stage, ReviewVerdict::Pending, StageSource::State),
            (None, None) => (
                structural_stage(project, &feature.id, &ids)?,
                ReviewVerdict::Pending,
                StageSource::Structural,
            ),
        };
        let recommendation = recommend(project, feature, stage, verdict, &status, &ids)?;
        report.features.push(FeatureContext {
            feature: feature.id.clone(),
            title: feature.title.clone(),
            status: feature.status,
            stage,
            verdict,
            stage_source,
            recommendation,
        });
    }

    report.tasks = tasks
        .pending()
        .into_iter()
        .map(|t| TaskLine {
            id: t.id.clone(),
            feature: t.feature.clone(),
            title: t.title.clone(),
            priority: t.priority,
            status: t.status,
        })
        .collect();
    Ok(report)
}

/// The furthest stage whose artifact exists on disk, `prd` when none do.
pub fn structural_stage(project: &Project, feature: &str, ids: &[String]) -> Result<Stage> {
    if !artifact::implementation_files(project, feature, ids)?.is_empty() {
        return Ok(Stage::Impl);
    }
    if !artifact::structural_test_files(project, feature, ids)?.is_empty() {
        return Ok(Stage::Tests);
    }
    if !artifact::scenario_files(project, feature, ids)?.is_empty() {
        return Ok(Stage::Bdd);
    }
    if !artifact::seed_files(project, feature, ids)?.is_empty() {
        return Ok(Stage::Seed);
    }
    Ok(Stage::Prd)
}

fn recommend(
    project: &Project,
    feature: &Feature,
    stage: Stage,
    verdict: ReviewVerdict,
    status: &ReviewStatus,
    ids: &[String],
) -> Result<Recommendation> {
    let layout = &project.config().layout;
    if verdict == ReviewVerdict::Failed {
        let issues = status.get(&feature.id).map_or(0, |e| e.issue_count);
        return Ok(Recommendation::Blocked {
            reason: format!(
                "review of stage '{stage}' failed with {issues} issue(s); fix and re-review"
            ),
        });
    }
    if stage == Stage::Bdd && artifact::seed_files(project, &feature.id, ids)?.is_empty() {
        return Ok(Recommendation::Blocked {
            reason: format!(
                "at bdd with no seed manifest; create {}/{}.yaml",
                layout.seeds_dir, feature.id
            ),
        });
    }
    if stage == Stage::Tests && artifact::scenario_files(project, &feature.id, ids)?.is_empty() {
        return Ok(Recommendation::Blocked {
            reason: format!(
                "at tests with no scenario file; create {}/{}.feature",
                layout.bdd_dir, feature.id
            ),
        });
    }
    Ok(match (stage, verdict) {
        (Stage::Impl, ReviewVerdict::Passed) => Recommendation::Done,
        (Stage::Impl, _) => Recommendation::Next {
            action: NextAction::ReviewImplementation,
        },
        (stage, _) => match NextAction::after(stage) {
            Some(action) => Recommendation::Next { action },
            None => Recommendation::Done,
        },
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io;
    use crate::review_status::ReviewStatusEntry;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, content: &str) {
        io::atomic_write(&dir.path().join(rel), content.as_bytes()).unwrap();
    }

    fn setup(features: &[(&str, FeatureStatus)]) -> (TempDir, Project) {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path(), "t").unwrap();
        let mut registry = Registry::default();
        for (id, status) in features {
            registry.register(id, *id, *status).unwrap();
        }
        registry.save(dir.path()).unwrap();
        (dir, project)
    }

    fn set_status(dir: &TempDir, feature: &str, stage: Stage, verdict: ReviewVerdict) {
        let mut status = ReviewStatus::load(dir.path()).unwrap();
        status.features.insert(
            feature.to_string(),
            ReviewStatusEntry {
                stage,
                review_verdict: verdict,
                issue_count: 2,
                ..Default::default()
            },
        );
        status.save(dir.path()).unwrap();
    }

    #[test]
    fn next_action_table() {
        let (dir, project) = setup(&[("auth", FeatureStatus::Active)]);
        write(&dir, "seeds/auth.yaml", "");
        write(&dir, "bdd/auth.feature", "");
        let expected = [
            (Stage::Prd, NextAction::WriteSeed),
            (Stage::Seed, NextAction::WriteScenarios),
            (Stage::Bdd, NextAction::WriteTests),
            (Stage::Tests, NextAction::WriteImplementation),
            (Stage::Impl, NextAction::ReviewImplementation),
        ];
        for (stage, action) in expected {
            set_status(&dir, "auth", stage, ReviewVerdict::Pending);
            let report = build(&project).unwrap();
            assert_eq!(
                report.feature("auth").unwrap().recommendation,
                Recommendation::Next { action },
                "{stage}"
            );
        }
    }

    #[test]
    fn done_when_impl_passed() {
        let (dir, project) = setup(&[("auth", FeatureStatus::Active)]);
        set_status(&dir, "auth", Stage::Impl, ReviewVerdict::Passed);
        let report = build(&project).unwrap();
        assert_eq!(report.feature("auth").unwrap().recommendation, Recommendation::Done);
    }

    #[test]
    fn failed_verdict_blocks_first() {
        let (dir, project) = setup(&[("auth", FeatureStatus::Active)]);
        set_status(&dir, "auth", Stage::Impl, ReviewVerdict::Failed);
        let report = build(&project).unwrap();
        match &report.feature("auth").unwrap().recommendation {
            Recommendation::Blocked { reason } => assert!(reason.contains("2 issue")),
            other => panic!("expected blocked, got {other:?}"),
        }
    }

    #[test]
    fn missing_prerequisites_block() {
        let (dir, project) = setup(&[
            ("auth", FeatureStatus::Active),
            ("billing", FeatureStatus::Active),
        ]);
        set_status(&dir, "auth", Stage::Bdd, ReviewVerdict::Pending);
        set_status(&dir, "billing", Stage::Tests, ReviewVerdict::Pending);
        let report = build(&project).unwrap();
        let auth = &report.feature("auth").unwrap().recommendation;
        assert!(matches!(auth, Recommendation::Blocked { reason } if reason.contains("seed")));
        let billing = &report.feature("billing").unwrap().recommendation;
        assert!(
            matches!(billing, Recommendation::Blocked { reason } if reason.contains("scenario"))
        );
    }

    #[test]
    fn nested_scenarios_unblock_tests_stage() {
        let (dir, project) = setup(&[("auth", FeatureStatus::Active)]);
        write(&dir, "seeds/auth/users.yaml", "");
        write(&dir, "bdd/auth/login.feature", "");
        set_status(&dir, "auth", Stage::Tests, ReviewVerdict::Pending);
        let report = build(&project).unwrap();
        assert_eq!(
            report.feature("auth").unwrap().recommendation,
            Recommendation::Next {
                action: NextAction::WriteImplementation
            }
        );
    }

    #[test]
    fn stage_falls_back_to_state_then_structure() {
        let (dir, project) = setup(&[
            ("auth", FeatureStatus::Active),
            ("billing", FeatureStatus::Active),
            ("search", FeatureStatus::Active),
            ("later", FeatureStatus::Planned),
        ]);
        let mut store = StateStore::default();
        store.entry("auth").stage = Some(Stage::Seed);
        store.save(dir.path()).unwrap();
        write(&dir, "seeds/billing.yaml", "");
        write(&dir, "bdd/billing.feature", "");

        let report = build(&project).unwrap();
        assert_eq!(report.features.len(), 3);

        let auth = report.feature("auth").unwrap();
        assert_eq!(auth.stage, Stage::Seed);
        assert_eq!(auth.stage_source, StageSource::State);
        let billing = report.feature("billing").unwrap();
        assert_eq!(billing.stage, Stage::Bdd);
        assert_eq!(billing.stage_source, StageSource::Structural);
        let search = report.feature("search").unwrap();
        assert_eq!(search.stage, Stage::Prd);
        assert_eq!(search.verdict, ReviewVerdict::Pending);
    }

    #[test]
    fn lists_only_open_tasks() {
        let (dir, project) = setup(&[("auth", FeatureStatus::Active)]);
        let mut tasks = TaskList::default();
        let done = tasks.add("auth", "old", Priority::Normal);
        tasks.add("auth", "redo prd for auth", Priority::Urgent);
        tasks.complete(&done).unwrap();
        tasks.save(dir.path()).unwrap();

        let report = build(&project).unwrap();
        assert_eq!(report.tasks.len(), 1);
        assert_eq!(report.tasks[0].title, "redo prd for auth");
        assert_eq!(report.tasks[0].feature, "auth");
    }
}
