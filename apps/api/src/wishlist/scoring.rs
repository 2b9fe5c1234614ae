use crate::models::wishlist::{WishlistItem, WishlistStatus};

const ENTHUSIASM_WEIGHT: f64 = 0.6;
const AFFORDABILITY_WEIGHT: f64 = 0.4;

/// Budget-aware desirability: `round(100 × (0.6 × enthusiasm/10 + 0.4 × affordability))`.
///
/// `affordability = min(1, remaining / price)`, floored at 0 so an overspent budget
/// cannot push the score negative. A zero price counts as fully affordable.
/// Callers reject non-positive prices before getting here.
pub fn priority_score(enthusiasm: u8, price: f64, remaining_budget: f64) -> u32 {
    let normalized_enthusiasm = (f64::from(enthusiasm) / 10.0).clamp(0.0, 1.0);
    let affordability = if price <= 0.0 {
        1.0
    } else {
        (remaining_budget / price).clamp(0.0, 1.0)
    };

    let score = 100.0
        * (ENTHUSIASM_WEIGHT * normalized_enthusiasm + AFFORDABILITY_WEIGHT * affordability);
    score.round().clamp(0.0, 100.0) as u32
}

/// Scores every wanted item against `remaining_budget` and sorts by descending score.
/// Items with any other status are dropped. Ties keep input order.
pub fn rank_wanted(items: Vec<WishlistItem>, remaining_budget: f64) -> Vec<WishlistItem> {
    let mut ranked: Vec<WishlistItem> = items
        .into_iter()
        .filter(|item| item.status == WishlistStatus::Wanted)
        .map(|mut item| {
            item.priority_score = Some(priority_score(
                item.enthusiasm,
                item.price,
                remaining_budget,
            ));
            item
        })
        .collect();
    ranked.sort_by(|a, b| b.priority_score.cmp(&a.priority_score));
    ranked
}
