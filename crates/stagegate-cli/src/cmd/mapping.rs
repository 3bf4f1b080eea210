use crate::cmd::open_project;
use crate::output::print_json;
use clap::Subcommand;
use stagegate_core::mapping;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum TestsSubcommand {
    /// Map a test file to a feature
    Map { feature: String, path: PathBuf },
    /// Remove a test-file mapping
    Unmap { feature: String, path: PathBuf },
    /// List a feature's mapped test files
    List { feature: String },
    /// Replace a feature's mappings with the test files found by name
    Resolve { feature: String },
}

pub fn run(root: &Path, subcmd: TestsSubcommand, json: bool) -> anyhow::Result<()> {
    let project = open_project(root)?;
    match subcmd {
        TestsSubcommand::Map { feature, path } => {
            let added = mapping::map_test(&project, &feature, &path)?;
            let rel = project.relative(&path);
            if json {
                print_json(&serde_json::json!({
                    "feature": feature,
                    "path": rel,
                    "added": added,
                }))?;
            } else if added {
                println!("{feature}: mapped {rel}");
            } else {
                println!("{feature}: {rel} already mapped");
            }
        }
        TestsSubcommand::Unmap { feature, path } => {
            let removed = mapping::unmap_test(&project, &feature, &path)?;
            let rel = project.relative(&path);
            if json {
                print_json(&serde_json::json!({
                    "feature": feature,
                    "path": rel,
                    "removed": removed,
                }))?;
            } else if removed {
                println!("{feature}: unmapped {rel}");
            } else {
                println!("{feature}: {rel} was not mapped");
            }
        }
        TestsSubcommand::List { feature } => {
            let paths = mapping::mapped_tests(&project, &feature)?;
            print_paths(&feature, &paths, json)?;
        }
        TestsSubcommand::Resolve { feature } => {
            let paths = mapping::resolve_tests(&project, &feature)?;
            print_paths(&feature, &paths, json)?;
        }
    }
    Ok(())
}

fn print_paths(feature: &str, paths: &[String], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&serde_json::json!({ "feature": feature, "tests": paths }));
    }
    if paths.is_empty() {
        println!("{feature}: no test files");
    }
    for p in paths {
        println!("{p}");
    }
    Ok(())
}
