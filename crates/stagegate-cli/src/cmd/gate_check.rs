use crate::output::print_json;
use stagegate_core::{gate_check, Project, StagegateError};
use std::path::Path;

/// Exit status for a denied write, distinct from a command failure.
pub const EXIT_DENIED: i32 = 2;

pub fn run(root: &Path, path: &Path, json: bool) -> anyhow::Result<()> {
    let project = match Project::open(root) {
        Ok(p) => p,
        // Nothing to enforce outside a stagegate project.
        Err(StagegateError::NotInitialized) => {
            if json {
                print_json(&serde_json::json!({
                    "allowed": true,
                    "reason": "not a stagegate project",
                    "feature": "",
                }))?;
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let result = gate_check::check(&project, path)?;
    if json {
        print_json(&result)?;
    } else if !result.allowed {
        eprintln!("denied: {}", result.reason);
    }

    if !result.allowed {
        std::process::exit(EXIT_DENIED);
    }
    Ok(())
}
