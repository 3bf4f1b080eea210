use crate::cmd::open_project;
use crate::output::print_json;
use anyhow::Context;
use stagegate_core::track;
use std::path::Path;

pub fn run(root: &Path, path: &Path, json: bool) -> anyhow::Result<()> {
    let project = open_project(root)?;
    let outcome = track::track(&project, path)
        .with_context(|| format!("failed to track {}", path.display()))?;

    if json {
        print_json(&outcome)?;
        return Ok(());
    }

    match outcome {
        None => println!("untracked: {}", path.display()),
        Some(o) if o.updated => println!("{}: stage {} (updated)", o.feature, o.stage),
        Some(o) => println!("{}: stage {}", o.feature, o.stage),
    }
    Ok(())
}
