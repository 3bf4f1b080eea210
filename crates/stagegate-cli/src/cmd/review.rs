use crate::cmd::open_project;
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use stagegate_core::{
    registry::Registry, review, review_status::ReviewStatus, types::ReviewVerdict, types::Stage,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum ReviewSubcommand {
    /// Record a 0-10 review score for a feature's stage
    Record {
        feature: String,
        /// prd, seed, bdd, tests or impl
        stage: String,
        #[arg(allow_negative_numbers = true)]
        score: i64,
    },
    /// Set the review verdict for the feature's current stage
    Verdict {
        feature: String,
        /// pending, passed or failed
        verdict: String,
        /// Number of open review issues
        #[arg(long, default_value_t = 0)]
        issues: u32,
    },
    /// Check whether a stage's review gate passes (exit 1 when it does not)
    Gate { feature: String, stage: String },
}

pub fn run(root: &Path, subcmd: ReviewSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ReviewSubcommand::Record {
            feature,
            stage,
            score,
        } => record(root, &feature, &stage, score, json),
        ReviewSubcommand::Verdict {
            feature,
            verdict,
            issues,
        } => self::verdict(root, &feature, &verdict, issues, json),
        ReviewSubcommand::Gate { feature, stage } => gate(root, &feature, &stage, json),
    }
}

fn record(root: &Path, feature: &str, stage: &str, score: i64, json: bool) -> anyhow::Result<()> {
    let project = open_project(root)?;
    let outcome = review::record_review(&project, feature, stage, score)
        .with_context(|| format!("failed to record review for '{feature}'"))?;

    if json {
        print_json(&outcome)?;
        return Ok(());
    }

    let min = project.config().review.min_score;
    let result = if outcome.passed { "passed" } else { "failed" };
    println!(
        "{feature}: {} scored {}/10 ({result}, gate {min})",
        outcome.stage, outcome.score
    );
    if let Some(id) = &outcome.redo_task {
        println!("Queued [{id}] {}", review::redo_title(feature, outcome.stage));
    }
    Ok(())
}

fn verdict(
    root: &Path,
    feature: &str,
    verdict: &str,
    issues: u32,
    json: bool,
) -> anyhow::Result<()> {
    open_project(root)?;
    let verdict: ReviewVerdict = verdict.parse()?;
    Registry::load(root)
        .context("failed to load registry")?
        .require(feature)?;

    let mut status = ReviewStatus::load(root).context("failed to load review status")?;
    status.set_verdict(feature, verdict, issues);
    status.save(root).context("failed to save review status")?;
    let entry = status.entry(feature).clone();

    if json {
        print_json(&serde_json::json!({ "feature": feature, "entry": entry }))?;
    } else {
        println!(
            "{feature}: {} at {} ({} issues)",
            entry.review_verdict, entry.stage, entry.issue_count
        );
    }
    Ok(())
}

fn gate(root: &Path, feature: &str, stage: &str, json: bool) -> anyhow::Result<()> {
    let project = open_project(root)?;
    let stage: Stage = stage.parse()?;
    let passed = review::check_gate(&project, feature, stage)?;

    if json {
        print_json(&serde_json::json!({
            "feature": feature,
            "stage": stage,
            "passed": passed,
        }))?;
    } else {
        println!(
            "{feature}: {stage} gate {}",
            if passed { "passed" } else { "not passed" }
        );
    }
    if !passed {
        anyhow::bail!("review gate for '{feature}' at {stage} not passed");
    }
    Ok(())
}
