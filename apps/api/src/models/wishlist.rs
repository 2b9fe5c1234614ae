use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BUDGET_TOTAL: f64 = 50_000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WishlistStatus {
    #[default]
    Wanted,
    Purchased,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    /// 1 – 10
    pub enthusiasm: u8,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Cached output of `wishlist::scoring::priority_score`; refreshed when the budget changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<u32>,
    #[serde(default)]
    pub status: WishlistStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Spending budget. `remaining` is always `total - spent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WishlistBudget {
    pub total: f64,
    pub spent: f64,
    pub remaining: f64,
}

impl WishlistBudget {
    pub fn new(total: f64, spent: f64) -> Self {
        Self {
            total,
            spent,
            remaining: total - spent,
        }
    }

    pub fn with_total(self, total: f64) -> Self {
        Self::new(total, self.spent)
    }

    pub fn record_purchase(self, price: f64) -> Self {
        Self::new(self.total, self.spent + price)
    }

    /// Recomputes `remaining` from a possibly stale stored document.
    pub fn normalized(self) -> Self {
        Self::new(self.total, self.spent)
    }
}

impl Default for WishlistBudget {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET_TOTAL, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        let budget = WishlistBudget::default();
        assert_eq!(budget.total, 50_000.0);
        assert_eq!(budget.spent, 0.0);
        assert_eq!(budget.remaining, 50_000.0);
    }

    #[test]
    fn test_purchase_recomputes_remaining() {
        let budget = WishlistBudget::new(10_000.0, 2_000.0).record_purchase(3_000.0);
        assert_eq!(budget.spent, 5_000.0);
        assert_eq!(budget.remaining, 5_000.0);
    }

    #[test]
    fn test_total_change_recomputes_remaining() {
        let budget = WishlistBudget::new(10_000.0, 4_000.0).with_total(3_000.0);
        assert_eq!(budget.remaining, -1_000.0);
    }

    #[test]
    fn test_normalized_fixes_stale_remaining() {
        let stale = WishlistBudget {
            total: 100.0,
            spent: 40.0,
            remaining: 100.0,
        };
        assert_eq!(stale.normalized().remaining, 60.0);
    }
}
