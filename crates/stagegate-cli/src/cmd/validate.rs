use crate::cmd::open_project;
use crate::output::print_json;
use anyhow::Context;
use stagegate_core::validate::{self, ValidationError};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let project = open_project(root)?;
    let report = validate::validate(&project).context("validation could not run")?;

    if json {
        print_json(&serde_json::json!({
            "passed": report.passed(),
            "errors": report.errors,
            "warnings": report.warnings,
        }))?;
    } else {
        for e in &report.errors {
            println!("[error] {}", describe(e));
        }
        for w in &report.warnings {
            println!("[warning] {}", describe(w));
        }
        if report.passed() {
            println!("Pipeline is valid.");
        }
    }

    if !report.passed() {
        anyhow::bail!("validation found {} error(s)", report.errors.len());
    }
    Ok(())
}

fn describe(e: &ValidationError) -> String {
    match &e.feature {
        Some(f) => format!("{f}: {}: {}", e.category, e.message),
        None => format!("{}: {}", e.category, e.message),
    }
}
