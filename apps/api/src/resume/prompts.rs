// LLM prompt templates for resume content generation.

/// System prompt. Replace `{style}` before sending.
pub const RESUME_SYSTEM_TEMPLATE: &str = "You are a professional resume writer. \
    Generate tailored resume content.\n\
    Style: {style}\n\
    Focus on relevant experience and skills for the target job.";

/// User prompt. Replace `{target_job}` and `{resume_json}` before sending.
pub const RESUME_PROMPT_TEMPLATE: &str =
    "Generate resume content for: {target_job}\n\nResume Data:\n{resume_json}";
