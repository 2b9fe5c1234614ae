use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::wall_clock;

/// Task priority. Variant order is scheduling order: `High < Medium < Low`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<SubTask>,
    #[serde(default)]
    pub priority: Priority,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u32>,
    /// ISO date or timestamp, kept as sent by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Parses `deadline` for ordering, as local wall-clock time.
    ///
    /// Accepts RFC 3339 (converted to local time), naive timestamps and bare dates
    /// (local midnight). Unparseable deadlines count as "no deadline".
    pub fn deadline_at(&self) -> Option<NaiveDateTime> {
        let raw = self.deadline.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        wall_clock::parse_timestamp_or_date(raw)
    }

    /// Sets one subtask's completion flag. Returns `false` when the subtask is unknown.
    ///
    /// Completing the last open subtask flips the task to `Completed`. Reopening a
    /// subtask does not move the task back.
    pub fn set_subtask_completed(&mut self, subtask_id: &str, completed: bool) -> bool {
        let Some(subtask) = self.subtasks.iter_mut().find(|st| st.id == subtask_id) else {
            return false;
        };
        subtask.completed = completed;
        self.updated_at = Utc::now();

        if self.subtasks.iter().all(|st| st.completed) {
            self.status = TaskStatus::Completed;
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn task(id: &str, priority: Priority, minutes: Option<u32>) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {id}"),
            description: None,
            subtasks: vec![],
            priority,
            estimated_time: minutes,
            deadline: None,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn subtask(id: &str, completed: bool) -> SubTask {
        SubTask {
            id: id.to_string(),
            title: format!("Step {id}"),
            completed,
            estimated_time: Some(15),
        }
    }
}
