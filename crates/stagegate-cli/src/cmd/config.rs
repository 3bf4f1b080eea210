use crate::cmd::open_project;
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use stagegate_core::config::{Config, WarnLevel};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let project = open_project(root)?;
    let config = project.config();
    if json {
        print_json(config)?;
        return Ok(());
    }
    println!("project:       {}", config.project.name);
    println!("min_score:     {}", config.review.min_score);
    println!("auto_redo:     {}", config.review.auto_redo);
    println!("requirements:  {}", config.layout.prd);
    println!("seeds_dir:     {}", config.layout.seeds_dir);
    println!("bdd_dir:       {}", config.layout.bdd_dir);
    println!("tests_dirs:    {}", config.layout.tests_dirs.join(", "));
    println!("src_dirs:      {}", config.layout.src_dirs.join(", "));
    println!("forbidden:     {} pattern(s)", config.forbidden_patterns.len());
    Ok(())
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
