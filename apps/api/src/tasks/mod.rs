// Tasks: storage of user tasks and decomposition of a free-text task into subtasks.
// Decomposition goes through the LLM when configured, with a keyword table as fallback.

pub mod decomposer;
pub mod handlers;
pub mod prompts;
pub mod repository;
