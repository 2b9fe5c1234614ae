use crate::models::settings::AppSettings;
use crate::storage::{Storage, StorageKey, StoreError};

/// Stored settings, or the defaults when none were saved yet.
pub async fn get_settings(storage: &Storage) -> Result<AppSettings, StoreError> {
    Ok(storage
        .get_singleton(StorageKey::Settings)
        .await?
        .unwrap_or_default())
}

pub async fn save_settings(
    storage: &Storage,
    settings: AppSettings,
) -> Result<AppSettings, StoreError> {
    storage.save_singleton(StorageKey::Settings, &settings).await?;
    Ok(settings)
}
