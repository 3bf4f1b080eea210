//! One pass over the whole project that collects every pipeline problem.

use crate::artifact;
use crate::error::Result;
use crate::io;
use crate::project::Project;
use crate::regression;
use crate::registry::Registry;
use crate::review;
use crate::store::StateStore;
use crate::types::Stage;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::info;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationCategory {
    MissingAnchor,
    OrphanAnchor,
    MissingSeed,
    MissingTests,
    ReviewGate,
    Regression,
    ForbiddenPattern,
}

impl fmt::Display for ValidationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValidationCategory::MissingAnchor => "missing-anchor",
            ValidationCategory::OrphanAnchor => "orphan-anchor",
            ValidationCategory::MissingSeed => "missing-seed",
            ValidationCategory::MissingTests => "missing-tests",
            ValidationCategory::ReviewGate => "review-gate",
            ValidationCategory::Regression => "regression",
            ValidationCategory::ForbiddenPattern => "forbidden-pattern",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// `None` when the problem cannot be tied to a feature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    pub category: ValidationCategory,
    pub message: String,
}

impl ValidationError {
    fn new(feature: Option<&str>, category: ValidationCategory, message: String) -> Self {
        Self {
            feature: feature.map(str::to_string),
            category,
            message,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    /// Reported but never fatal (orphaned anchors).
    pub warnings: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn count(&self, category: ValidationCategory) -> usize {
        self.errors
            .iter()
            .chain(&self.warnings)
            .filter(|e| e.category == category)
            .count()
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

/// Run every check and report all problems. The regression pass persists
/// refreshed fingerprints, as `reconcile` does.
pub fn validate(project: &Project) -> Result<ValidationReport> {
    let root = project.root();
    let registry = Registry::load(root)?;
    let mut store = StateStore::load(root)?;
    let ids = registry.ids();
    let mut report = ValidationReport::default();

    check_anchors(project, &registry, &mut report)?;
    check_prerequisites(project, &registry, &store, &ids, &mut report)?;
    check_review_gates(project, &registry, &store, &mut report);

    let regressions = regression::detect_and_reconcile(project, &registry, &mut store)?;
    store.save(root)?;
    for w in regressions {
        report.errors.push(ValidationError::new(
            Some(&w.feature),
            ValidationCategory::Regression,
            format!("[{}] {}: {}", w.severity, w.artifact_path, w.message),
        ));
    }

    check_forbidden_patterns(project, &ids, &mut report)?;

    info!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validation finished"
    );
    Ok(report)
}

/// (a) Every tracked feature has an anchor; every anchor has a feature.
fn check_anchors(
    project: &Project,
    registry: &Registry,
    report: &mut ValidationReport,
) -> Result<()> {
    let anchors = artifact::read_anchors(project)?;
    let anchored: BTreeSet<&str> = anchors.iter().map(|a| a.id.as_str()).collect();
    let prd = &project.config().layout.prd;

    for feature in registry.tracked() {
        if !anchored.contains(feature.id.as_str()) {
            report.errors.push(ValidationError::new(
                Some(&feature.id),
                ValidationCategory::MissingAnchor,
                format!("no requirements anchor {{#{}}} in {prd}", feature.id),
            ));
        }
    }
    for anchor in &anchors {
        if !registry.contains(&anchor.id) {
            report.warnings.push(ValidationError::new(
                None,
                ValidationCategory::OrphanAnchor,
                format!(
                    "{prd}:{} anchor {{#{}}} matches no registered feature",
                    anchor.line, anchor.id
                ),
            ));
        }
    }
    Ok(())
}

/// (b) Scenarios need seeds; past the scenario stage they need tests too.
fn check_prerequisites(
    project: &Project,
    registry: &Registry,
    store: &StateStore,
    ids: &[String],
    report: &mut ValidationReport,
) -> Result<()> {
    for feature in registry.features.iter().filter(|f| f.status.is_active()) {
        let scenarios = artifact::scenario_files(project, &feature.id, ids)?;
        let Some(scenario) = scenarios.first() else {
            continue;
        };

        if artifact::seed_files(project, &feature.id, ids)?.is_empty() {
            report.errors.push(ValidationError::new(
                Some(&feature.id),
                ValidationCategory::MissingSeed,
                format!("{scenario} exists but no seed manifest was found"),
            ));
        }

        let past_scenarios = store.stage_of(&feature.id).is_some_and(|s| s > Stage::Bdd);
        if past_scenarios
            && artifact::resolve_test_files(project, &feature.id, ids, store.get(&feature.id))?
                .is_empty()
        {
            report.errors.push(ValidationError::new(
                Some(&feature.id),
                ValidationCategory::MissingTests,
                format!("{scenario} exists but no test files could be resolved"),
            ));
        }
    }
    Ok(())
}

/// (c) A recorded stage must have a passing review score.
fn check_review_gates(
    project: &Project,
    registry: &Registry,
    store: &StateStore,
    report: &mut ValidationReport,
) {
    let min = project.config().review.min_score;
    for feature in registry.tracked() {
        let Some(stage) = store.stage_of(&feature.id) else {
            continue;
        };
        if review::gate_passes(project, store, &feature.id, stage) {
            continue;
        }
        let detail = match store.get(&feature.id).and_then(|s| s.score_for(stage)) {
            Some(score) => format!("scored {}/10, needs {min}", score.value),
            None => format!("no review score recorded, needs {min}"),
        };
        report.errors.push(ValidationError::new(
            Some(&feature.id),
            ValidationCategory::ReviewGate,
            format!("review gate for stage '{stage}' not passed: {detail}"),
        ));
    }
}

/// (e) Test doubles are not allowed in test files.
fn check_forbidden_patterns(
    project: &Project,
    ids: &[String],
    report: &mut ValidationReport,
) -> Result<()> {
    let patterns = project.config().compiled_patterns()?;
    if patterns.is_empty() {
        return Ok(());
    }
    for (path, feature) in artifact::scan_test_files(project, ids)? {
        let Some(bytes) = io::read_optional(&project.root().join(&path))? else {
            continue;
        };
        let text = String::from_utf8_lossy(&bytes);
        for re in &patterns {
            let hit = text
                .lines()
                .enumerate()
                .find(|(_, line)| re.is_match(line));
            if let Some((n, _)) = hit {
                report.errors.push(ValidationError::new(
                    feature.as_deref(),
                    ValidationCategory::ForbiddenPattern,
                    format!("{path}:{} matches forbidden pattern '{}'", n + 1, re.as_str()),
                ));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
