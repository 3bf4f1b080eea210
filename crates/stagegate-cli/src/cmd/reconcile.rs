use crate::cmd::open_project;
use crate::output::{print_json, print_table};
use anyhow::Context;
use stagegate_core::regression;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let project = open_project(root)?;
    let warnings = regression::reconcile(&project).context("failed to reconcile state")?;

    if json {
        print_json(&warnings)?;
        return Ok(());
    }
    if warnings.is_empty() {
        println!("No regressions.");
        return Ok(());
    }

    let rows = warnings
        .iter()
        .map(|w| {
            vec![
                w.severity.to_string(),
                w.feature.clone(),
                w.artifact_path.clone(),
                w.message.clone(),
            ]
        })
        .collect();
    print_table(&["SEVERITY", "FEATURE", "ARTIFACT", "MESSAGE"], rows);
    Ok(())
}
