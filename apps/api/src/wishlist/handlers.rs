//! Axum route handlers for the Wishlist API.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::models::wishlist::{WishlistBudget, WishlistItem, WishlistStatus};
use crate::routes::{ApiJson, ApiQuery};
use crate::state::AppState;
use crate::wishlist::repository::{self, PurchaseOutcome};
use crate::wishlist::scoring::{priority_score, rank_wanted};

const DEFAULT_CATEGORY: &str = "その他";
const DEFAULT_ENTHUSIASM: u8 = 5;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PriorityRequest {
    pub items: Option<Vec<WishlistItem>>,
    pub budget: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWishlistItem {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    pub enthusiasm: Option<u8>,
    pub category: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WishlistSort {
    Priority,
    Price,
    Enthusiasm,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub sort: Option<WishlistSort>,
}

#[derive(Debug, Deserialize)]
pub struct BudgetUpdate {
    pub total: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub item: WishlistItem,
    pub budget: WishlistBudget,
}

#[derive(Debug, Serialize)]
pub struct BudgetResponse {
    pub budget: WishlistBudget,
    pub items: Vec<WishlistItem>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::validation("Item price must be greater than zero"));
    }
    Ok(())
}

fn validate_enthusiasm(enthusiasm: u8) -> Result<(), AppError> {
    if !(1..=10).contains(&enthusiasm) {
        return Err(AppError::validation("Enthusiasm must be between 1 and 10"));
    }
    Ok(())
}

/// Sorts wanted items for display, the way the wishlist view orders them.
fn sort_for_display(items: Vec<WishlistItem>, sort: WishlistSort) -> Vec<WishlistItem> {
    let mut wanted: Vec<WishlistItem> = items
        .into_iter()
        .filter(|i| i.status == WishlistStatus::Wanted)
        .collect();
    match sort {
        WishlistSort::Priority => wanted.sort_by(|a, b| {
            b.priority_score
                .unwrap_or(0)
                .cmp(&a.priority_score.unwrap_or(0))
        }),
        WishlistSort::Price => wanted.sort_by(|a, b| a.price.total_cmp(&b.price)),
        WishlistSort::Enthusiasm => wanted.sort_by(|a, b| b.enthusiasm.cmp(&a.enthusiasm)),
    }
    wanted
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/wishlist/priority
///
/// Scores the wanted items against `budget` and returns them by descending score.
pub async fn handle_priority(
    ApiJson(request): ApiJson<PriorityRequest>,
) -> Result<Json<ApiResponse<Vec<WishlistItem>>>, AppError> {
    let items = match request.items {
        Some(items) if !items.is_empty() => items,
        _ => return Err(AppError::validation("Items are required")),
    };
    let budget = match request.budget {
        Some(b) if b.is_finite() && b >= 0.0 => b,
        _ => return Err(AppError::validation("Valid budget is required")),
    };

    for item in items.iter().filter(|i| i.status == WishlistStatus::Wanted) {
        validate_price(item.price)?;
        validate_enthusiasm(item.enthusiasm)?;
    }

    Ok(ApiResponse::ok(rank_wanted(items, budget)))
}

/// GET /api/wishlist?sort=priority|price|enthusiasm
///
/// Without `sort` every stored item is returned in insertion order.
pub async fn handle_list_items(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<ApiResponse<Vec<WishlistItem>>>, AppError> {
    let items = repository::list_items(&state.storage).await?;
    let items = match query.sort {
        Some(sort) => sort_for_display(items, sort),
        None => items,
    };
    Ok(ApiResponse::ok(items))
}

/// POST /api/wishlist
pub async fn handle_add_item(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewWishlistItem>,
) -> Result<Json<ApiResponse<WishlistItem>>, AppError> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::validation("Item name is required"));
    }
    validate_price(request.price)?;
    let enthusiasm = request.enthusiasm.unwrap_or(DEFAULT_ENTHUSIASM);
    validate_enthusiasm(enthusiasm)?;

    let budget = repository::get_budget(&state.storage).await?;
    let now = Utc::now();
    let item = WishlistItem {
        id: Uuid::new_v4().to_string(),
        name,
        description: request.description,
        price: request.price,
        enthusiasm,
        category: request
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        url: request.url,
        image_url: request.image_url,
        priority_score: Some(priority_score(enthusiasm, request.price, budget.remaining)),
        status: WishlistStatus::Wanted,
        created_at: now,
        updated_at: now,
    };

    let item = repository::save_item(&state.storage, item).await?;
    info!("Added wishlist item {} (score {:?})", item.id, item.priority_score);
    Ok(ApiResponse::ok(item))
}

/// DELETE /api/wishlist/:id
pub async fn handle_delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>, AppError> {
    if !repository::delete_item(&state.storage, &id).await? {
        return Err(AppError::NotFound(format!("Wishlist item {id} not found")));
    }
    Ok(ApiResponse::ok(DeletedResponse { id }))
}

/// POST /api/wishlist/:id/purchase
///
/// Only wanted items whose price fits the remaining budget can be bought.
pub async fn handle_purchase(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PurchaseResponse>>, AppError> {
    match repository::purchase_item(&state.storage, &id).await? {
        PurchaseOutcome::Purchased { item, budget } => {
            Ok(ApiResponse::ok(PurchaseResponse { item, budget }))
        }
        PurchaseOutcome::ItemNotFound => {
            Err(AppError::NotFound(format!("Wishlist item {id} not found")))
        }
        PurchaseOutcome::NotWanted => {
            Err(AppError::validation("Only wanted items can be purchased"))
        }
        PurchaseOutcome::InsufficientBudget { price, remaining } => {
            info!(
                "Refused purchase of {}: price {} exceeds remaining {}",
                id, price, remaining
            );
            Err(AppError::validation("Insufficient budget"))
        }
    }
}

/// GET /api/wishlist/budget
pub async fn handle_get_budget(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<WishlistBudget>>, AppError> {
    Ok(ApiResponse::ok(repository::get_budget(&state.storage).await?))
}

/// PUT /api/wishlist/budget
///
/// Sets the budget total; `remaining` and every cached priority score follow.
pub async fn handle_set_budget(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BudgetUpdate>,
) -> Result<Json<ApiResponse<BudgetResponse>>, AppError> {
    let total = match request.total {
        Some(t) if t.is_finite() && t >= 0.0 => t,
        _ => return Err(AppError::validation("Valid budget is required")),
    };
    let (budget, items) = repository::set_budget_total(&state.storage, total).await?;
    Ok(ApiResponse::ok(BudgetResponse { budget, items }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, enthusiasm: u8, price: f64, score: Option<u32>) -> WishlistItem {
        WishlistItem {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            price,
            enthusiasm,
            category: "misc".to_string(),
            url: None,
            image_url: None,
            priority_score: score,
            status: WishlistStatus::Wanted,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sort_by_price_ascending() {
        let items = vec![item("a", 5, 300.0, None), item("b", 5, 100.0, None)];
        let sorted = sort_for_display(items, WishlistSort::Price);
        assert_eq!(sorted[0].id, "b");
    }

    #[test]
    fn test_sort_by_priority_treats_missing_score_as_zero() {
        let items = vec![item("a", 5, 300.0, None), item("b", 5, 100.0, Some(12))];
        let sorted = sort_for_display(items, WishlistSort::Priority);
        assert_eq!(sorted[0].id, "b");
    }

    #[test]
    fn test_sort_drops_purchased_items() {
        let mut bought = item("a", 9, 300.0, Some(90));
        bought.status = WishlistStatus::Purchased;
        let sorted = sort_for_display(
            vec![bought, item("b", 2, 100.0, None)],
            WishlistSort::Enthusiasm,
        );
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].id, "b");
    }

    #[test]
    fn test_price_validation() {
        assert!(validate_price(0.0).is_err());
        assert!(validate_price(-5.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(0.5).is_ok());
    }

    #[test]
    fn test_enthusiasm_validation() {
        assert!(validate_enthusiasm(0).is_err());
        assert!(validate_enthusiasm(11).is_err());
        assert!(validate_enthusiasm(1).is_ok());
        assert!(validate_enthusiasm(10).is_ok());
    }
}
