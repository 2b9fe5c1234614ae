// User preferences: work hours and break length used by schedule generation.

pub mod handlers;
pub mod repository;
