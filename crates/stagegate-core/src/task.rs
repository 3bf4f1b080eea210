use crate::error::{Result, StagegateError};
use crate::io;
use crate::paths;
use crate::types::{Priority, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    /// Feature the task belongs to. Empty for project-wide work.
    #[serde(default)]
    pub feature: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        feature: impl Into<String>,
        title: impl Into<String>,
        priority: Priority,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            feature: feature.into(),
            status: TaskStatus::Pending,
            priority,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// TaskList
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskList {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl TaskList {
    /// Missing file ⇒ empty list.
    pub fn load(root: &Path) -> Result<Self> {
        io::load_yaml_or_default(&paths::tasks_path(root))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        io::save_yaml(&paths::tasks_path(root), self)
    }

    /// Append a task with the next sequential id (`T1`, `T2`, ...).
    pub fn add(
        &mut self,
        feature: impl Into<String>,
        title: impl Into<String>,
        priority: Priority,
    ) -> String {
        let id = format!("T{}", self.next_seq());
        self.tasks.push(Task::new(id.clone(), feature, title, priority));
        id
    }

    fn next_seq(&self) -> u32 {
        self.tasks
            .iter()
            .filter_map(|t| t.id.strip_prefix('T').and_then(|n| n.parse::<u32>().ok()))
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn start(&mut self, id: &str) -> Result<()> {
        let task = self.find_mut(id)?;
        task.status = TaskStatus::InProgress;
        task.started_at = Some(Utc::now());
        Ok(())
    }

    pub fn complete(&mut self, id: &str) -> Result<()> {
        let task = self.find_mut(id)?;
        task.status = TaskStatus::Completed;
        task.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Tasks that are not done, urgent first, then by id order.
    pub fn pending(&self) -> Vec<&Task> {
        let mut out: Vec<&Task> = self.tasks.iter().filter(|t| !t.status.is_done()).collect();
        out.sort_by_key(|t| t.priority);
        out
    }

    pub fn has_pending_titled(&self, title: &str) -> bool {
        self.tasks
            .iter()
            .any(|t| !t.status.is_done() && t.title == title)
    }

    /// "3/5 completed, 1 in progress"
    pub fn summarize(&self) -> String {
        let total = self.tasks.len();
        let done = self.tasks.iter().filter(|t| t.status.is_done()).count();
        let in_progress = self
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::InProgress)
            .count();
        format!("{done}/{total} completed, {in_progress} in progress")
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StagegateError::TaskNotFound(id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
