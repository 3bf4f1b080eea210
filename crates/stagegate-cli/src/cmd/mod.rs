pub mod config;
pub mod context;
pub mod feature;
pub mod gate_check;
pub mod init;
pub mod mapping;
pub mod reconcile;
pub mod review;
pub mod state;
pub mod task;
pub mod track;
pub mod validate;

use anyhow::Context;
use stagegate_core::Project;
use std::path::Path;

/// Open the project at `root`, failing with a hint when it is not initialized.
pub fn open_project(root: &Path) -> anyhow::Result<Project> {
    Project::open(root).with_context(|| format!("cannot open project at {}", root.display()))
}
