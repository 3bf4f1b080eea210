use crate::cmd::open_project;
use crate::output::print_json;
use anyhow::Context;
use stagegate_core::context;
use std::path::Path;

pub fn run(root: &Path, feature: Option<&str>, json: bool) -> anyhow::Result<()> {
    let project = open_project(root)?;
    let mut report = context::build(&project).context("failed to build context")?;

    if let Some(id) = feature {
        report.features.retain(|f| f.feature == id);
        report.tasks.retain(|t| t.feature == id);
        if report.features.is_empty() {
            anyhow::bail!("feature '{id}' is not registered or not being tracked");
        }
    }

    if json {
        print_json(&report)?;
        return Ok(());
    }

    if report.features.is_empty() {
        println!("No active features.");
    }
    for f in &report.features {
        println!(
            "{} [{} / {}] {}",
            f.feature, f.stage, f.verdict, f.recommendation
        );
    }
    if !report.tasks.is_empty() {
        println!("\nOpen tasks:");
        for t in &report.tasks {
            println!("  [{}] {} ({}, {}) {}", t.id, t.feature, t.priority, t.status, t.title);
        }
    }
    Ok(())
}
