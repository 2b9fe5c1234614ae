// Schedules: one plan per day, built by the greedy optimizer from open tasks.

pub mod handlers;
pub mod optimizer;
pub mod repository;
