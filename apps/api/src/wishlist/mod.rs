// Wishlist: budget-aware ranking of things the user wants to buy.
// Scoring is a pure formula; no LLM involvement.

pub mod handlers;
pub mod repository;
pub mod scoring;
