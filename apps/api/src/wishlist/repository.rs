use chrono::Utc;
use tracing::info;

use crate::models::wishlist::{WishlistBudget, WishlistItem, WishlistStatus};
use crate::storage::{Storage, StorageKey, StoreError};
use crate::wishlist::scoring::priority_score;

pub async fn list_items(storage: &Storage) -> Result<Vec<WishlistItem>, StoreError> {
    storage.load_collection(StorageKey::Wishlist).await
}

/// Upserts by id. Every save stamps `updated_at`, so saving the same item twice
/// leaves one entry carrying the later timestamp.
pub async fn save_item(storage: &Storage, item: WishlistItem) -> Result<WishlistItem, StoreError> {
    storage
        .update_collection(StorageKey::Wishlist, move |items: &mut Vec<WishlistItem>| {
            let mut item = item;
            item.updated_at = Utc::now();
            match items.iter_mut().find(|i| i.id == item.id) {
                Some(existing) => *existing = item.clone(),
                None => items.push(item.clone()),
            }
            (item, true)
        })
        .await
}

/// Returns `false` when no item had that id.
pub async fn delete_item(storage: &Storage, id: &str) -> Result<bool, StoreError> {
    storage
        .update_collection(StorageKey::Wishlist, |items: &mut Vec<WishlistItem>| {
            let before = items.len();
            items.retain(|i| i.id != id);
            let removed = items.len() != before;
            (removed, removed)
        })
        .await
}

/// The stored budget, or the default 50 000 budget when none was saved yet.
pub async fn get_budget(storage: &Storage) -> Result<WishlistBudget, StoreError> {
    Ok(budget_or_default(
        storage.get_singleton(StorageKey::WishlistBudget).await?,
    ))
}

fn budget_or_default(stored: Option<WishlistBudget>) -> WishlistBudget {
    stored.map(WishlistBudget::normalized).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    Purchased {
        item: WishlistItem,
        budget: WishlistBudget,
    },
    ItemNotFound,
    NotWanted,
    InsufficientBudget { price: f64, remaining: f64 },
}

/// Marks a wanted item purchased and charges its price to the budget.
///
/// The status check, the status change and the budget charge happen under one
/// storage lock, so concurrent purchases cannot double-charge or lose spending.
pub async fn purchase_item(storage: &Storage, id: &str) -> Result<PurchaseOutcome, StoreError> {
    let locked = storage.lock().await;
    let budget = budget_or_default(locked.get_singleton(StorageKey::WishlistBudget).await?);
    let mut items: Vec<WishlistItem> = locked.load_collection(StorageKey::Wishlist).await?;

    let Some(item) = items.iter_mut().find(|i| i.id == id) else {
        return Ok(PurchaseOutcome::ItemNotFound);
    };
    if item.status != WishlistStatus::Wanted {
        return Ok(PurchaseOutcome::NotWanted);
    }
    if item.price > budget.remaining {
        return Ok(PurchaseOutcome::InsufficientBudget {
            price: item.price,
            remaining: budget.remaining,
        });
    }

    item.status = WishlistStatus::Purchased;
    item.updated_at = Utc::now();
    let item = item.clone();
    let budget = budget.record_purchase(item.price);

    locked.write(StorageKey::Wishlist, &items).await?;
    locked.write(StorageKey::WishlistBudget, &budget).await?;

    info!(
        "Purchased wishlist item {} for {}; remaining budget {}",
        item.id, item.price, budget.remaining
    );
    Ok(PurchaseOutcome::Purchased { item, budget })
}

/// Changes the budget total and refreshes every item's cached priority score.
pub async fn set_budget_total(
    storage: &Storage,
    total: f64,
) -> Result<(WishlistBudget, Vec<WishlistItem>), StoreError> {
    let locked = storage.lock().await;
    let budget = budget_or_default(locked.get_singleton(StorageKey::WishlistBudget).await?)
        .with_total(total);
    locked.write(StorageKey::WishlistBudget, &budget).await?;

    let mut items: Vec<WishlistItem> = locked.load_collection(StorageKey::Wishlist).await?;
    if !items.is_empty() {
        let now = Utc::now();
        let remaining = budget.remaining;
        for item in items.iter_mut() {
            item.priority_score = Some(priority_score(item.enthusiasm, item.price, remaining));
            item.updated_at = now;
        }
        locked.write(StorageKey::Wishlist, &items).await?;
    }

    Ok((budget, items))
}
