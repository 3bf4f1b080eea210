use crate::output::print_json;
use anyhow::Context;
use stagegate_core::{paths, Project};
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let project_name = name.map(str::to_string).unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    });

    let existed = paths::stagegate_dir(root).is_dir();
    let project = Project::init(root, &project_name)
        .with_context(|| format!("failed to initialize {}", root.display()))?;
    let layout = &project.config().layout;

    if json {
        print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "project": project.config().project.name,
            "created": !existed,
        }))?;
        return Ok(());
    }

    if existed {
        println!("Already initialized: {}", root.display());
    } else {
        println!("Initialized stagegate in: {}", root.display());
    }
    println!("  requirements: {}", layout.prd);
    println!("  seeds:        {}/", layout.seeds_dir);
    println!("  scenarios:    {}/", layout.bdd_dir);
    println!("  tests:        {}", layout.tests_dirs.join(", "));
    println!("  source:       {}", layout.src_dirs.join(", "));
    println!("\nNext: stagegate feature add <id> --title \"...\"");
    Ok(())
}
