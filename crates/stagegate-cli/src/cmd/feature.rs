use crate::cmd::open_project;
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use stagegate_core::{
    context, registry::Registry, review_status::ReviewStatus, store::StateStore,
    types::FeatureStatus,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum FeatureSubcommand {
    /// Register a new feature
    Add {
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// planned, active, in-progress, deferred or implemented
        #[arg(long, default_value = "active")]
        status: String,
    },
    /// List registered features
    List,
    /// Show one feature with its recorded progress
    Show { id: String },
    /// Change a feature's status
    Status { id: String, status: String },
    /// Rename a feature
    Title {
        id: String,
        #[arg(required = true)]
        title: Vec<String>,
    },
    /// Remove a feature and its recorded state
    Remove { id: String },
}

pub fn run(root: &Path, subcmd: FeatureSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        FeatureSubcommand::Add { id, title, status } => add(root, &id, title, &status, json),
        FeatureSubcommand::List => list(root, json),
        FeatureSubcommand::Show { id } => show(root, &id, json),
        FeatureSubcommand::Status { id, status } => set_status(root, &id, &status, json),
        FeatureSubcommand::Title { id, title } => set_title(root, &id, &title.join(" "), json),
        FeatureSubcommand::Remove { id } => remove(root, &id, json),
    }
}

fn add(
    root: &Path,
    id: &str,
    title: Option<String>,
    status: &str,
    json: bool,
) -> anyhow::Result<()> {
    open_project(root)?;
    let status: FeatureStatus = status.parse()?;
    let title = title.unwrap_or_else(|| id.replace(['-', '_'], " "));

    let mut registry = Registry::load(root).context("failed to load registry")?;
    let feature = registry
        .register(id, title, status)
        .with_context(|| format!("failed to register feature '{id}'"))?
        .clone();
    registry.save(root).context("failed to save registry")?;

    if json {
        print_json(&feature)?;
    } else {
        println!("Registered feature: {} [{}] {}", feature.id, feature.status, feature.title);
        println!("Next: add a heading ending in {{#{id}}} to the requirements document");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    open_project(root)?;
    let registry = Registry::load(root).context("failed to load registry")?;
    let store = StateStore::load(root).context("failed to load state")?;

    if json {
        let rows: Vec<_> = registry
            .features
            .iter()
            .map(|f| {
                serde_json::json!({
                    "id": f.id,
                    "title": f.title,
                    "status": f.status,
                    "stage": store.stage_of(&f.id),
                })
            })
            .collect();
        print_json(&rows)?;
        return Ok(());
    }

    if registry.features.is_empty() {
        println!("No features registered.");
        return Ok(());
    }

    let rows = registry
        .features
        .iter()
        .map(|f| {
            vec![
                f.id.clone(),
                f.status.to_string(),
                store
                    .stage_of(&f.id)
                    .map_or_else(|| "-".to_string(), |s| s.to_string()),
                f.title.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "STATUS", "STAGE", "TITLE"], rows);
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let project = open_project(root)?;
    let registry = Registry::load(root).context("failed to load registry")?;
    let feature = registry.require(id)?.clone();
    let store = StateStore::load(root).context("failed to load state")?;
    let status = ReviewStatus::load(root).context("failed to load review status")?;
    let report = context::build(&project).context("failed to build context")?;
    let ctx = report.feature(id);

    if json {
        print_json(&serde_json::json!({
            "feature": feature,
            "state": store.get(id),
            "review": status.get(id),
            "recommendation": ctx.map(|c| &c.recommendation),
        }))?;
        return Ok(());
    }

    println!("Feature: {} — {}", feature.id, feature.title);
    println!("Status:  {}", feature.status);
    if let Some(state) = store.get(id) {
        if let Some(stage) = state.stage {
            println!("Stage:   {stage}");
        }
        if !state.scores.is_empty() {
            println!("\nScores:");
            for (stage, score) in &state.scores {
                println!(
                    "  {:<6} {:>2}/10  {}",
                    stage.to_string(),
                    score.value,
                    score.recorded_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        if !state.test_mappings.is_empty() {
            println!("\nTests:");
            for path in &state.test_mappings {
                println!("  {path}");
            }
        }
    }
    if let Some(entry) = status.get(id) {
        println!(
            "\nReview:  {} at {} ({} issues, tests written: {})",
            entry.review_verdict, entry.stage, entry.issue_count, entry.tests_written
        );
    }
    if let Some(ctx) = ctx {
        println!("\n{}", ctx.recommendation);
    }
    Ok(())
}

fn set_status(root: &Path, id: &str, status: &str, json: bool) -> anyhow::Result<()> {
    open_project(root)?;
    let status: FeatureStatus = status.parse()?;
    let mut registry = Registry::load(root).context("failed to load registry")?;
    registry.set_status(id, status)?;
    registry.save(root).context("failed to save registry")?;

    if json {
        print_json(&serde_json::json!({ "id": id, "status": status }))?;
    } else {
        println!("{id}: status → {status}");
    }
    Ok(())
}

fn set_title(root: &Path, id: &str, title: &str, json: bool) -> anyhow::Result<()> {
    open_project(root)?;
    let mut registry = Registry::load(root).context("failed to load registry")?;
    registry.set_title(id, title)?;
    registry.save(root).context("failed to save registry")?;

    if json {
        print_json(&serde_json::json!({ "id": id, "title": title }))?;
    } else {
        println!("{id}: title → {title}");
    }
    Ok(())
}

fn remove(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    open_project(root)?;
    let mut registry = Registry::load(root).context("failed to load registry")?;
    let removed = registry.remove(id)?;
    registry.save(root).context("failed to save registry")?;

    let mut store = StateStore::load(root).context("failed to load state")?;
    if store.remove_feature(id).is_some() {
        store.save(root).context("failed to save state")?;
    }
    let mut status = ReviewStatus::load(root).context("failed to load review status")?;
    if status.features.remove(id).is_some() {
        status.save(root).context("failed to save review status")?;
    }

    if json {
        print_json(&removed)?;
    } else {
        println!("Removed feature: {}", removed.id);
    }
    Ok(())
}
