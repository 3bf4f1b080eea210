use crate::cmd::open_project;
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use stagegate_core::{registry::Registry, task::TaskList, types::Priority};
use std::path::Path;

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Add a task for a feature
    Add {
        feature: String,
        #[arg(required = true)]
        title: Vec<String>,
        /// urgent, high, normal or low
        #[arg(long, default_value = "normal")]
        priority: String,
    },
    /// List open tasks (all tasks with --all)
    List {
        #[arg(long)]
        all: bool,
    },
    /// Start a task
    Start { task_id: String },
    /// Complete a task
    Complete { task_id: String },
}

pub fn run(root: &Path, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TaskSubcommand::Add {
            feature,
            title,
            priority,
        } => add(root, &feature, &title.join(" "), &priority, json),
        TaskSubcommand::List { all } => list(root, all, json),
        TaskSubcommand::Start { task_id } => start(root, &task_id, json),
        TaskSubcommand::Complete { task_id } => complete(root, &task_id, json),
    }
}

fn add(root: &Path, feature: &str, title: &str, priority: &str, json: bool) -> anyhow::Result<()> {
    open_project(root)?;
    let priority: Priority = priority.parse()?;
    Registry::load(root)
        .context("failed to load registry")?
        .require(feature)?;

    let mut tasks = TaskList::load(root).context("failed to load tasks")?;
    let id = tasks.add(feature, title, priority);
    tasks.save(root).context("failed to save tasks")?;

    if json {
        print_json(&serde_json::json!({ "id": id, "feature": feature, "title": title }))?;
    } else {
        println!("Added [{id}] {title}");
    }
    Ok(())
}

fn list(root: &Path, all: bool, json: bool) -> anyhow::Result<()> {
    open_project(root)?;
    let tasks = TaskList::load(root).context("failed to load tasks")?;
    let shown: Vec<_> = if all {
        tasks.tasks.iter().collect()
    } else {
        tasks.pending()
    };

    if json {
        print_json(&shown)?;
        return Ok(());
    }
    if shown.is_empty() {
        println!("No tasks.");
        return Ok(());
    }

    let rows = shown
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.feature.clone(),
                t.priority.to_string(),
                t.status.to_string(),
                t.title.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "FEATURE", "PRIORITY", "STATUS", "TITLE"], rows);
    println!("\n{}", tasks.summarize());
    Ok(())
}

fn start(root: &Path, task_id: &str, json: bool) -> anyhow::Result<()> {
    open_project(root)?;
    let mut tasks = TaskList::load(root).context("failed to load tasks")?;
    tasks.start(task_id)?;
    tasks.save(root).context("failed to save tasks")?;

    if json {
        print_json(&serde_json::json!({ "id": task_id, "status": "in_progress" }))?;
    } else {
        println!("Started [{task_id}]");
    }
    Ok(())
}

fn complete(root: &Path, task_id: &str, json: bool) -> anyhow::Result<()> {
    open_project(root)?;
    let mut tasks = TaskList::load(root).context("failed to load tasks")?;
    tasks.complete(task_id)?;
    tasks.save(root).context("failed to save tasks")?;

    if json {
        print_json(&serde_json::json!({ "id": task_id, "status": "completed" }))?;
    } else {
        println!("Completed [{task_id}]");
    }
    Ok(())
}
