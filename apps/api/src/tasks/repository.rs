use chrono::Utc;

use crate::models::task::{Task, TaskStatus};
use crate::storage::{Storage, StorageKey, StoreError};

pub async fn list_tasks(storage: &Storage) -> Result<Vec<Task>, StoreError> {
    storage.load_collection(StorageKey::Tasks).await
}

pub async fn get_task(storage: &Storage, id: &str) -> Result<Option<Task>, StoreError> {
    Ok(list_tasks(storage).await?.into_iter().find(|t| t.id == id))
}

/// Upserts by id and stamps `updated_at`.
pub async fn save_task(storage: &Storage, task: Task) -> Result<Task, StoreError> {
    storage
        .update_collection(StorageKey::Tasks, move |tasks: &mut Vec<Task>| {
            let mut task = task;
            task.updated_at = Utc::now();
            match tasks.iter_mut().find(|t| t.id == task.id) {
                Some(existing) => *existing = task.clone(),
                None => tasks.push(task.clone()),
            }
            (task, true)
        })
        .await
}

/// Returns `false` when no task had that id.
pub async fn delete_task(storage: &Storage, id: &str) -> Result<bool, StoreError> {
    storage
        .update_collection(StorageKey::Tasks, |tasks: &mut Vec<Task>| {
            let before = tasks.len();
            tasks.retain(|t| t.id != id);
            let removed = tasks.len() != before;
            (removed, removed)
        })
        .await
}

pub async fn set_status(
    storage: &Storage,
    id: &str,
    status: TaskStatus,
) -> Result<Option<Task>, StoreError> {
    storage
        .update_collection(StorageKey::Tasks, |tasks: &mut Vec<Task>| {
            match tasks.iter_mut().find(|t| t.id == id) {
                Some(task) => {
                    task.status = status;
                    task.updated_at = Utc::now();
                    (Some(task.clone()), true)
                }
                None => (None, false),
            }
        })
        .await
}

#[derive(Debug, PartialEq)]
pub enum SubtaskUpdate {
    Updated(Task),
    TaskNotFound,
    SubtaskNotFound,
}

/// Flips one subtask and, when it was the last open one, the task's status too.
/// Both changes land in a single write.
pub async fn update_subtask(
    storage: &Storage,
    task_id: &str,
    subtask_id: &str,
    completed: bool,
) -> Result<SubtaskUpdate, StoreError> {
    storage
        .update_collection(StorageKey::Tasks, |tasks: &mut Vec<Task>| {
            let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) else {
                return (SubtaskUpdate::TaskNotFound, false);
            };
            if task.set_subtask_completed(subtask_id, completed) {
                (SubtaskUpdate::Updated(task.clone()), true)
            } else {
                (SubtaskUpdate::SubtaskNotFound, false)
            }
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::fixtures::{subtask, task};
    use crate::models::task::Priority;

    #[tokio::test]
    async fn test_save_is_an_upsert() {
        let storage = Storage::in_memory();
        let first = save_task(&storage, task("t1", Priority::High, Some(30)))
            .await
            .unwrap();

        let mut edited = first.clone();
        edited.title = "Renamed".to_string();
        let second = save_task(&storage, edited).await.unwrap();

        let tasks = list_tasks(&storage).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Renamed");
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn test_delete_reports_missing_ids() {
        let storage = Storage::in_memory();
        save_task(&storage, task("t1", Priority::Low, None)).await.unwrap();

        assert!(!delete_task(&storage, "nope").await.unwrap());
        assert!(delete_task(&storage, "t1").await.unwrap());
        assert!(get_task(&storage, "t1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_status() {
        let storage = Storage::in_memory();
        save_task(&storage, task("t1", Priority::Low, None)).await.unwrap();

        let updated = set_status(&storage, "t1", TaskStatus::InProgress)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert!(set_status(&storage, "t2", TaskStatus::Completed)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_last_subtask_completes_task_in_one_write() {
        let storage = Storage::in_memory();
        let mut t = task("t1", Priority::Medium, None);
        t.subtasks = vec![subtask("a", true), subtask("b", false)];
        save_task(&storage, t).await.unwrap();

        let result = update_subtask(&storage, "t1", "b", true).await.unwrap();
        let SubtaskUpdate::Updated(updated) = result else {
            panic!("expected an update, got {result:?}");
        };
        assert_eq!(updated.status, TaskStatus::Completed);

        let stored = get_task(&storage, "t1").await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Completed);
        assert!(stored.subtasks.iter().all(|s| s.completed));
    }

    #[tokio::test]
    async fn test_unknown_subtask_or_task() {
        let storage = Storage::in_memory();
        let mut t = task("t1", Priority::Medium, None);
        t.subtasks = vec![subtask("a", false)];
        save_task(&storage, t).await.unwrap();

        assert_eq!(
            update_subtask(&storage, "t1", "zzz", true).await.unwrap(),
            SubtaskUpdate::SubtaskNotFound
        );
        assert_eq!(
            update_subtask(&storage, "t9", "a", true).await.unwrap(),
            SubtaskUpdate::TaskNotFound
        );
    }
}
