use chrono::Utc;

use crate::models::resume::ResumeData;
use crate::storage::{Storage, StorageKey, StoreError};

pub async fn get_resume(storage: &Storage) -> Result<Option<ResumeData>, StoreError> {
    storage.get_singleton(StorageKey::Resume).await
}

/// Replaces the stored resume and stamps `updated_at`.
pub async fn save_resume(storage: &Storage, mut resume: ResumeData) -> Result<ResumeData, StoreError> {
    resume.updated_at = Utc::now();
    storage.save_singleton(StorageKey::Resume, &resume).await?;
    Ok(resume)
}

pub async fn clear_resume(storage: &Storage) -> Result<(), StoreError> {
    storage.clear_singleton(StorageKey::Resume).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resume() -> ResumeData {
        serde_json::from_str(r#"{"personalInfo": {"name": "Taro"}}"#).unwrap()
    }

    #[tokio::test]
    async fn test_save_get_clear() {
        let storage = Storage::in_memory();
        assert!(get_resume(&storage).await.unwrap().is_none());

        let saved = save_resume(&storage, resume()).await.unwrap();
        let loaded = get_resume(&storage).await.unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.personal_info.name, "Taro");

        clear_resume(&storage).await.unwrap();
        assert!(get_resume(&storage).await.unwrap().is_none());
    }
}
