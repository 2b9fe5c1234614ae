use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// System prompt for task decomposition. The JSON shape is mandatory.
pub fn decompose_system() -> String {
    format!(
        "You are a task management assistant. Decompose tasks into actionable subtasks. \
        Return JSON format: {{ \"subtasks\": [{{\"title\": \"...\", \"estimatedTime\": <minutes>}}], \
        \"estimatedTotalTime\": <minutes>, \"suggestedPriority\": \"high\"|\"medium\"|\"low\" }}. \
        {JSON_ONLY_INSTRUCTION}"
    )
}

/// User prompt: the task, plus free-text context when the caller gave any.
pub fn decompose_prompt(task: &str, context: Option<&str>) -> String {
    match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!("Task: {task}\nContext: {context}"),
        None => format!("Task: {task}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_context() {
        assert_eq!(decompose_prompt("Write report", None), "Task: Write report");
        assert_eq!(decompose_prompt("Write report", Some("  ")), "Task: Write report");
    }

    #[test]
    fn test_prompt_with_context() {
        assert_eq!(
            decompose_prompt("Write report", Some("due Friday")),
            "Task: Write report\nContext: due Friday"
        );
    }

    #[test]
    fn test_system_prompt_names_every_field() {
        let system = decompose_system();
        for field in ["subtasks", "estimatedTime", "estimatedTotalTime", "suggestedPriority"] {
            assert!(system.contains(field), "missing {field}");
        }
    }
}
