// Resume: the single stored resume and tailored content generation for a target job.
// Generation uses the LLM when configured and the markdown formatter otherwise.

pub mod formatter;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod repository;
