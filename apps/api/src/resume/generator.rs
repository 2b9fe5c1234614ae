//! Resume content generation.
//!
//! One LLM call when a client is configured; the markdown formatter otherwise, or
//! when that call fails. Generation itself never fails.

use tracing::{info, warn};

use crate::llm_client::{LlmClient, LlmError};
use crate::models::resume::{ResumeData, ResumeStyle};
use crate::resume::formatter::format_resume;
use crate::resume::prompts::{RESUME_PROMPT_TEMPLATE, RESUME_SYSTEM_TEMPLATE};

/// Where the generated text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    Llm,
    Formatter,
}

pub async fn generate_resume_content(
    llm: Option<&LlmClient>,
    resume: &ResumeData,
    target_job: &str,
    style: ResumeStyle,
) -> (String, ContentSource) {
    let Some(llm) = llm else {
        return (format_resume(resume, target_job), ContentSource::Formatter);
    };

    match call_llm(llm, resume, target_job, style).await {
        Ok(content) => {
            info!(
                "Generated {} resume for '{}' with {}",
                style.as_str(),
                target_job,
                llm.model()
            );
            (content, ContentSource::Llm)
        }
        Err(e) => {
            warn!("LLM resume generation failed, using formatter: {e}");
            (format_resume(resume, target_job), ContentSource::Formatter)
        }
    }
}

async fn call_llm(
    llm: &LlmClient,
    resume: &ResumeData,
    target_job: &str,
    style: ResumeStyle,
) -> Result<String, LlmError> {
    let resume_json = serde_json::to_string_pretty(resume)?;
    let system = RESUME_SYSTEM_TEMPLATE.replace("{style}", style.as_str());
    let prompt = RESUME_PROMPT_TEMPLATE
        .replace("{target_job}", target_job)
        .replace("{resume_json}", &resume_json);
    llm.call_text(&prompt, &system).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::PersonalInfo;
    use chrono::Utc;

    fn resume() -> ResumeData {
        ResumeData {
            id: "r1".to_string(),
            personal_info: PersonalInfo {
                name: "Taro".to_string(),
                email: "taro@example.com".to_string(),
                ..PersonalInfo::default()
            },
            summary: String::new(),
            experience: vec![],
            education: vec![],
            skills: vec!["Go".to_string()],
            target_job: None,
            generated_content: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_without_llm_uses_formatter() {
        let r = resume();
        let (content, source) =
            generate_resume_content(None, &r, "Data Engineer", ResumeStyle::Creative).await;
        assert_eq!(source, ContentSource::Formatter);
        assert_eq!(content, format_resume(&r, "Data Engineer"));
    }

    #[tokio::test]
    async fn test_unreachable_llm_falls_back() {
        let llm = LlmClient::new(
            "test-key".to_string(),
            "http://127.0.0.1:9/v1/chat/completions".to_string(),
            "gpt-4o-mini".to_string(),
            2,
        )
        .unwrap();
        let r = resume();
        let (content, source) =
            generate_resume_content(Some(&llm), &r, "Data Engineer", ResumeStyle::Technical)
                .await;
        assert_eq!(source, ContentSource::Formatter);
        assert!(content.starts_with("# Taro"));
    }

    #[test]
    fn test_templates_take_style_and_job() {
        let system = RESUME_SYSTEM_TEMPLATE.replace("{style}", ResumeStyle::Technical.as_str());
        assert!(system.contains("Style: technical"));
        let prompt = RESUME_PROMPT_TEMPLATE
            .replace("{target_job}", "SRE")
            .replace("{resume_json}", "{}");
        assert!(prompt.starts_with("Generate resume content for: SRE"));
    }
}
