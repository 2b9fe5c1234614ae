use chrono::NaiveDate;

use crate::models::schedule::{DailySchedule, ScheduleBlock};
use crate::storage::{Storage, StorageKey, StoreError};

/// All stored schedules, oldest day first.
pub async fn list_schedules(storage: &Storage) -> Result<Vec<DailySchedule>, StoreError> {
    let mut schedules: Vec<DailySchedule> = storage.load_collection(StorageKey::Schedules).await?;
    schedules.sort_by_key(|s| s.date);
    Ok(schedules)
}

pub async fn get_schedule(
    storage: &Storage,
    date: NaiveDate,
) -> Result<Option<DailySchedule>, StoreError> {
    Ok(storage
        .load_collection::<DailySchedule>(StorageKey::Schedules)
        .await?
        .into_iter()
        .find(|s| s.date == date))
}

/// Upserts by date: a day has at most one schedule.
pub async fn save_schedule(
    storage: &Storage,
    schedule: DailySchedule,
) -> Result<DailySchedule, StoreError> {
    storage
        .update_collection(StorageKey::Schedules, move |schedules: &mut Vec<DailySchedule>| {
            match schedules.iter_mut().find(|s| s.date == schedule.date) {
                Some(existing) => *existing = schedule.clone(),
                None => schedules.push(schedule.clone()),
            }
            (schedule, true)
        })
        .await
}

#[derive(Debug, PartialEq)]
pub enum BlockUpdate {
    Updated {
        schedule: DailySchedule,
        block: ScheduleBlock,
    },
    ScheduleNotFound,
    BlockNotFound,
}

pub async fn update_block_completion(
    storage: &Storage,
    date: NaiveDate,
    block_id: &str,
    completed: bool,
) -> Result<BlockUpdate, StoreError> {
    storage
        .update_collection(StorageKey::Schedules, |schedules: &mut Vec<DailySchedule>| {
            let Some(schedule) = schedules.iter_mut().find(|s| s.date == date) else {
                return (BlockUpdate::ScheduleNotFound, false);
            };
            let Some(block) = schedule.blocks.iter_mut().find(|b| b.id == block_id) else {
                return (BlockUpdate::BlockNotFound, false);
            };
            block.completed = completed;
            let block = block.clone();
            (
                BlockUpdate::Updated {
                    schedule: schedule.clone(),
                    block,
                },
                true,
            )
        })
        .await
}

/// Attaches a review to the day. Counts are derived from the stored blocks.
pub async fn add_feedback(
    storage: &Storage,
    date: NaiveDate,
    rating: u8,
    notes: Option<String>,
) -> Result<Option<DailySchedule>, StoreError> {
    storage
        .update_collection(StorageKey::Schedules, |schedules: &mut Vec<DailySchedule>| {
            match schedules.iter_mut().find(|s| s.date == date) {
                Some(schedule) => {
                    schedule.feedback = Some(schedule.review(rating, notes));
                    (Some(schedule.clone()), true)
                }
                None => (None, false),
            }
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::BlockType;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn schedule(d: u32, blocks: Vec<ScheduleBlock>) -> DailySchedule {
        DailySchedule {
            date: day(d),
            blocks,
            feedback: None,
        }
    }

    fn task_block(id: &str, task_id: &str) -> ScheduleBlock {
        ScheduleBlock {
            id: id.to_string(),
            task_id: Some(task_id.to_string()),
            title: id.to_string(),
            start_time: day(1).and_hms_opt(9, 0, 0).unwrap(),
            end_time: day(1).and_hms_opt(10, 0, 0).unwrap(),
            block_type: BlockType::Task,
            completed: false,
        }
    }

    #[tokio::test]
    async fn test_one_schedule_per_day() {
        let storage = Storage::in_memory();
        save_schedule(&storage, schedule(2, vec![])).await.unwrap();
        save_schedule(&storage, schedule(1, vec![])).await.unwrap();
        save_schedule(&storage, schedule(2, vec![task_block("b", "t")]))
            .await
            .unwrap();

        let all = list_schedules(&storage).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].date, day(1));
        assert_eq!(all[1].blocks.len(), 1);
    }

    #[tokio::test]
    async fn test_block_completion() {
        let storage = Storage::in_memory();
        save_schedule(&storage, schedule(1, vec![task_block("b1", "t1")]))
            .await
            .unwrap();

        let result = update_block_completion(&storage, day(1), "b1", true)
            .await
            .unwrap();
        let BlockUpdate::Updated { block, .. } = result else {
            panic!("expected update, got {result:?}");
        };
        assert!(block.completed);
        assert_eq!(block.task_id.as_deref(), Some("t1"));

        assert_eq!(
            update_block_completion(&storage, day(1), "nope", true)
                .await
                .unwrap(),
            BlockUpdate::BlockNotFound
        );
        assert_eq!(
            update_block_completion(&storage, day(9), "b1", true)
                .await
                .unwrap(),
            BlockUpdate::ScheduleNotFound
        );
    }

    #[tokio::test]
    async fn test_feedback_counts_stored_blocks() {
        let storage = Storage::in_memory();
        let mut done = task_block("b1", "t1");
        done.completed = true;
        save_schedule(&storage, schedule(1, vec![done, task_block("b2", "t2")]))
            .await
            .unwrap();

        let updated = add_feedback(&storage, day(1), 3, None)
            .await
            .unwrap()
            .unwrap();
        let feedback = updated.feedback.unwrap();
        assert_eq!((feedback.completed_tasks, feedback.total_tasks), (1, 2));

        assert!(add_feedback(&storage, day(5), 3, None).await.unwrap().is_none());
    }
}
