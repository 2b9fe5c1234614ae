//! Schedule Optimizer: packs a day's open tasks into the work window.
//!
//! # Placement rules
//! - Completed tasks are dropped.
//! - Order: priority (high → low), then earliest deadline; tasks without a
//!   deadline go after those with one. Ties keep input order.
//! - A task that would end past the window is skipped; later (shorter) tasks
//!   still get a chance at the same cursor.
//! - After each task a break is inserted when it fits entirely in the window.
//!
//! Pure and synchronous: no I/O, no clock.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::schedule::{BlockType, ScheduleBlock};
use crate::models::task::{Task, TaskStatus};

/// Minutes given to a task with no (or a zero) estimate.
pub const DEFAULT_TASK_MINUTES: u32 = 60;
pub const BREAK_TITLE: &str = "休憩";

#[derive(Debug, Error, PartialEq)]
pub enum WindowError {
    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid time '{0}' (expected HH:MM)")]
    InvalidTime(String),
}

/// The work window of one day, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl WorkWindow {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start: date.and_time(start),
            end: date.and_time(end),
        }
    }

    /// Parses a `YYYY-MM-DD` date and two `HH:MM` times. A window whose start is not
    /// before its end is valid; it just has no room.
    pub fn parse(date: &str, start: &str, end: &str) -> Result<Self, WindowError> {
        let date = parse_date(date)?;
        Ok(Self::new(date, parse_time(start)?, parse_time(end)?))
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, WindowError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| WindowError::InvalidDate(raw.to_string()))
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, WindowError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| WindowError::InvalidTime(raw.to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOutcome {
    /// Chronological, non-overlapping.
    pub blocks: Vec<ScheduleBlock>,
    /// Ids of open tasks that did not fit, in placement order.
    pub unscheduled: Vec<String>,
}

/// Orders open tasks for placement. Stable, so equal keys keep input order.
fn placement_order(tasks: &[Task]) -> Vec<&Task> {
    let mut open: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Completed)
        .collect();
    open.sort_by_cached_key(|t| {
        let deadline = t.deadline_at();
        (t.priority, deadline.is_none(), deadline)
    });
    open
}

fn task_minutes(task: &Task) -> u32 {
    task.estimated_time
        .filter(|m| *m > 0)
        .unwrap_or(DEFAULT_TASK_MINUTES)
}

/// Greedy single pass over the ordered tasks with one cursor.
pub fn optimize_schedule(
    tasks: &[Task],
    window: &WorkWindow,
    break_minutes: u32,
) -> ScheduleOutcome {
    let mut outcome = ScheduleOutcome::default();
    let break_length = Duration::minutes(i64::from(break_minutes));
    let mut cursor = window.start;

    for task in placement_order(tasks) {
        if cursor >= window.end {
            outcome.unscheduled.push(task.id.clone());
            continue;
        }

        let end = cursor + Duration::minutes(i64::from(task_minutes(task)));
        if end > window.end {
            debug!("Task {} does not fit after {}, skipping", task.id, cursor.time());
            outcome.unscheduled.push(task.id.clone());
            continue;
        }

        outcome.blocks.push(ScheduleBlock {
            id: Uuid::new_v4().to_string(),
            task_id: Some(task.id.clone()),
            title: task.title.clone(),
            start_time: cursor,
            end_time: end,
            block_type: BlockType::Task,
            completed: false,
        });
        cursor = end;

        if break_minutes > 0 && cursor + break_length <= window.end {
            outcome.blocks.push(ScheduleBlock {
                id: Uuid::new_v4().to_string(),
                task_id: None,
                title: BREAK_TITLE.to_string(),
                start_time: cursor,
                end_time: cursor + break_length,
                block_type: BlockType::Break,
                completed: false,
            });
            cursor += break_length;
        }
    }

    let scheduled_minutes: i64 = outcome
        .blocks
        .iter()
        .filter(|b| b.block_type == BlockType::Task)
        .map(ScheduleBlock::duration_minutes)
        .sum();
    debug!(
        "Optimized {}: {} blocks, {} task minutes, {} unscheduled",
        window.start.date(),
        outcome.blocks.len(),
        scheduled_minutes,
        outcome.unscheduled.len()
    );

    outcome
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::fixtures::task;
    use crate::models::task::Priority;

    fn window() -> WorkWindow {
        WorkWindow::parse("2025-03-01", "09:00", "18:00").unwrap()
    }

    fn hm(block: &ScheduleBlock) -> (String, String) {
        (
            block.start_time.format("%H:%M").to_string(),
            block.end_time.format("%H:%M").to_string(),
        )
    }

    fn task_ids(outcome: &ScheduleOutcome) -> Vec<&str> {
        outcome
            .blocks
            .iter()
            .filter_map(|b| b.task_id.as_deref())
            .collect()
    }

    #[test]
    fn test_full_day_task_gets_no_break() {
        let tasks = vec![task("long", Priority::High, Some(540))];
        let outcome = optimize_schedule(&tasks, &window(), 15);

        assert_eq!(outcome.blocks.len(), 1);
        assert_eq!(hm(&outcome.blocks[0]), ("09:00".to_string(), "18:00".to_string()));
        assert!(outcome.unscheduled.is_empty());
    }

    #[test]
    fn test_two_hour_tasks_with_breaks() {
        let tasks = vec![
            task("a", Priority::Medium, Some(60)),
            task("b", Priority::Medium, Some(60)),
        ];
        let outcome = optimize_schedule(&tasks, &window(), 15);

        let kinds: Vec<BlockType> = outcome.blocks.iter().map(|b| b.block_type).collect();
        assert_eq!(
            kinds,
            vec![BlockType::Task, BlockType::Break, BlockType::Task, BlockType::Break]
        );
        let starts: Vec<String> = outcome.blocks.iter().map(|b| hm(b).0).collect();
        assert_eq!(starts, vec!["09:00", "10:00", "10:15", "11:15"]);
        assert_eq!(outcome.blocks[1].title, BREAK_TITLE);
        assert!(outcome.blocks[1].task_id.is_none());
    }

    #[test]
    fn test_priority_then_deadline_order() {
        let mut low = task("low", Priority::Low, Some(30));
        low.deadline = Some("2025-03-01".to_string());
        let undated = task("high-undated", Priority::High, Some(30));
        let mut later = task("high-later", Priority::High, Some(30));
        later.deadline = Some("2025-03-05".to_string());
        let mut sooner = task("high-sooner", Priority::High, Some(30));
        sooner.deadline = Some("2025-03-02T12:00:00".to_string());

        let outcome = optimize_schedule(&[low, undated, later, sooner], &window(), 0);
        assert_eq!(
            task_ids(&outcome),
            vec!["high-sooner", "high-later", "high-undated", "low"]
        );
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let tasks = vec![
            task("first", Priority::Medium, Some(30)),
            task("second", Priority::Medium, Some(30)),
            task("third", Priority::Medium, Some(30)),
        ];
        let outcome = optimize_schedule(&tasks, &window(), 0);
        assert_eq!(task_ids(&outcome), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_completed_tasks_are_dropped() {
        let mut done = task("done", Priority::High, Some(30));
        done.status = TaskStatus::Completed;
        let outcome = optimize_schedule(&[done], &window(), 15);
        assert!(outcome.blocks.is_empty());
        assert!(outcome.unscheduled.is_empty());
    }

    #[test]
    fn test_missing_or_zero_estimate_defaults_to_an_hour() {
        let tasks = vec![
            task("none", Priority::High, None),
            task("zero", Priority::High, Some(0)),
        ];
        let outcome = optimize_schedule(&tasks, &window(), 0);
        assert!(outcome.blocks.iter().all(|b| b.duration_minutes() == 60));
    }

    #[test]
    fn test_oversized_task_is_skipped_and_walk_continues() {
        let tasks = vec![
            task("fits", Priority::High, Some(480)),
            task("too-big", Priority::High, Some(120)),
            task("small", Priority::Medium, Some(30)),
        ];
        let outcome = optimize_schedule(&tasks, &window(), 15);

        assert_eq!(task_ids(&outcome), vec!["fits", "small"]);
        assert_eq!(outcome.unscheduled, vec!["too-big"]);
        let small = outcome
            .blocks
            .iter()
            .find(|b| b.task_id.as_deref() == Some("small"))
            .unwrap();
        assert_eq!(hm(small), ("17:15".to_string(), "17:45".to_string()));
    }

    #[test]
    fn test_tasks_after_a_full_window_are_unscheduled() {
        let tasks = vec![
            task("all-day", Priority::High, Some(540)),
            task("late", Priority::Low, Some(5)),
        ];
        let outcome = optimize_schedule(&tasks, &window(), 15);
        assert_eq!(outcome.unscheduled, vec!["late"]);
    }

    #[test]
    fn test_blocks_are_chronological_and_inside_window() {
        let tasks: Vec<Task> = (0..12)
            .map(|i| task(&format!("t{i}"), Priority::Medium, Some(45)))
            .collect();
        let w = window();
        let outcome = optimize_schedule(&tasks, &w, 10);

        for pair in outcome.blocks.windows(2) {
            assert!(pair[0].end_time <= pair[1].start_time);
        }
        assert!(outcome
            .blocks
            .iter()
            .all(|b| b.start_time >= w.start && b.end_time <= w.end));
        assert_eq!(
            task_ids(&outcome).len() + outcome.unscheduled.len(),
            tasks.len()
        );
    }

    #[test]
    fn test_inverted_window_yields_nothing() {
        let w = WorkWindow::parse("2025-03-01", "18:00", "09:00").unwrap();
        assert!(w.is_empty());
        let outcome = optimize_schedule(&[task("a", Priority::High, Some(30))], &w, 15);
        assert!(outcome.blocks.is_empty());
        assert_eq!(outcome.unscheduled, vec!["a"]);
    }

    #[test]
    fn test_no_tasks_yields_nothing() {
        assert_eq!(optimize_schedule(&[], &window(), 15), ScheduleOutcome::default());
    }

    #[test]
    fn test_window_parse_errors() {
        assert_eq!(
            WorkWindow::parse("03/01/2025", "09:00", "18:00"),
            Err(WindowError::InvalidDate("03/01/2025".to_string()))
        );
        assert_eq!(
            WorkWindow::parse("2025-03-01", "9am", "18:00"),
            Err(WindowError::InvalidTime("9am".to_string()))
        );
    }
}
