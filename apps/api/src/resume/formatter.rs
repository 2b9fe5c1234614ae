//! Markdown resume rendering used when no LLM is available.
//!
//! Deterministic: the same resume and target job always render the same text.
//! Sections with nothing in them are left out, except the summary, which falls
//! back to a generic sentence about the target job.

use std::fmt::Write;

use crate::models::resume::{Education, Experience, ResumeData};

const ONGOING: &str = "現在";

fn generic_summary(target_job: &str) -> String {
    format!("{target_job}のポジションに強い関心を持つプロフェッショナルです。")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn format_resume(resume: &ResumeData, target_job: &str) -> String {
    let mut out = String::new();
    let info = &resume.personal_info;

    let _ = writeln!(out, "# {}\n", info.name.trim());

    let contact: Vec<&str> = [
        non_blank(Some(info.email.as_str())),
        non_blank(info.phone.as_deref()),
        non_blank(info.location.as_deref()),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !contact.is_empty() {
        let _ = writeln!(out, "{}\n", contact.join(" | "));
    }

    let summary = match non_blank(Some(resume.summary.as_str())) {
        Some(summary) => summary.to_string(),
        None => generic_summary(target_job),
    };
    let _ = writeln!(out, "## 概要\n{summary}\n");

    if !resume.experience.is_empty() {
        out.push_str("## 職歴\n");
        for exp in &resume.experience {
            write_experience(&mut out, exp);
        }
    }

    if !resume.education.is_empty() {
        out.push_str("## 学歴\n");
        for edu in &resume.education {
            write_education(&mut out, edu);
        }
    }

    if !resume.skills.is_empty() {
        let _ = writeln!(out, "## スキル\n{}", resume.skills.join(", "));
    }

    out
}

fn write_experience(out: &mut String, exp: &Experience) {
    let end = if exp.current {
        ONGOING
    } else {
        exp.end_date.as_deref().unwrap_or_default()
    };
    let _ = writeln!(out, "### {} @ {}", exp.position, exp.company);
    let _ = writeln!(out, "{} - {}\n", exp.start_date, end);
    if let Some(description) = non_blank(Some(exp.description.as_str())) {
        let _ = writeln!(out, "{description}");
    }
    if !exp.achievements.is_empty() {
        out.push_str("\n**主な実績:**\n");
        for achievement in &exp.achievements {
            let _ = writeln!(out, "- {achievement}");
        }
    }
    out.push('\n');
}

fn write_education(out: &mut String, edu: &Education) {
    let end = non_blank(edu.end_date.as_deref()).unwrap_or(ONGOING);
    let _ = writeln!(out, "### {} - {}", edu.degree, edu.field);
    let _ = writeln!(
        out,
        "{} ({} - {})\n",
        edu.institution, edu.start_date, end
    );
}
