use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::wall_clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Task,
    Break,
    Meeting,
    Personal,
}

/// A contiguous slice of one day. Times are local wall-clock timestamps
/// (`2025-03-01T09:00:00`), without an offset; see [`wall_clock`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBlock {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub title: String,
    #[serde(deserialize_with = "wall_clock::deserialize")]
    pub start_time: NaiveDateTime,
    #[serde(deserialize_with = "wall_clock::deserialize")]
    pub end_time: NaiveDateTime,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub completed: bool,
}

impl ScheduleBlock {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleFeedback {
    /// 1 – 5
    pub rating: u8,
    pub completed_tasks: u32,
    pub total_tasks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One schedule per calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySchedule {
    pub date: NaiveDate,
    #[serde(default)]
    pub blocks: Vec<ScheduleBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<ScheduleFeedback>,
}

impl DailySchedule {
    /// Builds a review of the day: counts come from the task blocks.
    pub fn review(&self, rating: u8, notes: Option<String>) -> ScheduleFeedback {
        let task_blocks = self
            .blocks
            .iter()
            .filter(|b| b.block_type == BlockType::Task);
        let (completed, total) = task_blocks.fold((0u32, 0u32), |(done, total), b| {
            (done + u32::from(b.completed), total + 1)
        });
        ScheduleFeedback {
            rating,
            completed_tasks: completed,
            total_tasks: total,
            notes,
        }
    }
}
