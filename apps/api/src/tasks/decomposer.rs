//! Task decomposition: pluggable, trait-based splitter of a task into subtasks.
//!
//! Default: `KeywordDecomposer` (fixed pattern table, deterministic, no network).
//! With an API key: `LlmDecomposer`, which asks the LLM once and falls back to the
//! keyword table on any failure.
//!
//! `AppState` holds an `Arc<dyn TaskDecomposer>`, chosen at startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm_client::{LlmClient, LlmError};
use crate::models::task::{Priority, SubTask};
use crate::tasks::prompts::{decompose_prompt, decompose_system};

/// Minutes given to an LLM subtask that came back without an estimate.
const DEFAULT_LLM_STEP_MINUTES: u32 = 15;

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decomposition {
    pub subtasks: Vec<SubTask>,
    /// Minutes.
    pub estimated_total_time: u32,
    pub suggested_priority: Priority,
}

#[async_trait]
pub trait TaskDecomposer: Send + Sync {
    /// Never fails and never returns an empty subtask list.
    async fn decompose(&self, description: &str, context: Option<&str>) -> Decomposition;

    /// "keyword" | "llm", for logs and the health endpoint.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordDecomposer
// ────────────────────────────────────────────────────────────────────────────

struct Pattern {
    keywords: &'static [&'static str],
    subtasks: &'static [&'static str],
    total_minutes: u32,
    priority: Priority,
}

/// Evaluated in order; the first pattern with any keyword in the description wins.
const PATTERNS: &[Pattern] = &[
    Pattern {
        keywords: &["プレゼン", "presentation", "プレゼンテーション"],
        subtasks: &[
            "テーマと目的を明確化",
            "リサーチと情報収集",
            "アウトライン作成",
            "スライド作成",
            "リハーサル",
        ],
        total_minutes: 180,
        priority: Priority::High,
    },
    Pattern {
        keywords: &["レポート", "report", "報告書"],
        subtasks: &[
            "要件確認",
            "データ収集",
            "アウトライン作成",
            "本文執筆",
            "レビューと修正",
        ],
        total_minutes: 120,
        priority: Priority::Medium,
    },
    Pattern {
        keywords: &["meeting", "会議", "ミーティング"],
        subtasks: &[
            "アジェンダ確認",
            "資料準備",
            "参加者に連絡",
            "会議実施",
            "議事録作成",
        ],
        total_minutes: 90,
        priority: Priority::High,
    },
    Pattern {
        keywords: &["勉強", "study", "学習", "learn"],
        subtasks: &[
            "学習目標設定",
            "教材準備",
            "学習セッション",
            "復習とノート整理",
            "進捗確認",
        ],
        total_minutes: 120,
        priority: Priority::Medium,
    },
    Pattern {
        keywords: &["開発", "develop", "コーディング", "coding", "実装"],
        subtasks: &["要件分析", "設計", "実装", "テスト", "コードレビュー"],
        total_minutes: 240,
        priority: Priority::High,
    },
];

const GENERIC_SUBTASKS: &[&str] = &["計画と準備", "実行", "確認とレビュー", "完了報告"];
const GENERIC_STEP_MINUTES: u32 = 15;

pub struct KeywordDecomposer;

#[async_trait]
impl TaskDecomposer for KeywordDecomposer {
    async fn decompose(&self, description: &str, _context: Option<&str>) -> Decomposition {
        decompose_by_keywords(description)
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

/// Pattern-table decomposition. Every subtask of a matched pattern gets an equal
/// share of the pattern's total, rounded to whole minutes.
pub fn decompose_by_keywords(description: &str) -> Decomposition {
    let lowered = description.to_lowercase();

    if let Some(pattern) = PATTERNS
        .iter()
        .find(|p| p.keywords.iter().any(|kw| lowered.contains(kw)))
    {
        let step_minutes =
            (f64::from(pattern.total_minutes) / pattern.subtasks.len() as f64).round() as u32;
        return Decomposition {
            subtasks: build_subtasks(pattern.subtasks, step_minutes),
            estimated_total_time: pattern.total_minutes,
            suggested_priority: pattern.priority,
        };
    }

    Decomposition {
        subtasks: build_subtasks(GENERIC_SUBTASKS, GENERIC_STEP_MINUTES),
        estimated_total_time: GENERIC_STEP_MINUTES * GENERIC_SUBTASKS.len() as u32,
        suggested_priority: Priority::Medium,
    }
}

fn build_subtasks(titles: &[&str], minutes: u32) -> Vec<SubTask> {
    titles
        .iter()
        .map(|title| SubTask {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            completed: false,
            estimated_time: Some(minutes),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// LlmDecomposer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmPlan {
    #[serde(default)]
    subtasks: Vec<LlmStep>,
    estimated_total_time: Option<f64>,
    suggested_priority: Option<Priority>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmStep {
    title: String,
    estimated_time: Option<f64>,
}

pub struct LlmDecomposer(pub LlmClient);

#[async_trait]
impl TaskDecomposer for LlmDecomposer {
    async fn decompose(&self, description: &str, context: Option<&str>) -> Decomposition {
        let prompt = decompose_prompt(description, context);
        let result = self
            .0
            .call_json::<LlmPlan>(&prompt, &decompose_system())
            .await
            .and_then(plan_to_decomposition);

        match result {
            Ok(decomposition) => {
                info!(
                    "LLM decomposed task into {} subtasks",
                    decomposition.subtasks.len()
                );
                decomposition
            }
            Err(e) => {
                warn!("LLM decomposition failed, using keyword fallback: {e}");
                decompose_by_keywords(description)
            }
        }
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

fn whole_minutes(value: f64) -> Option<u32> {
    (value.is_finite() && value > 0.0).then(|| value.round() as u32)
}

/// Turns the model's JSON into a decomposition. An empty plan counts as a failure.
fn plan_to_decomposition(plan: LlmPlan) -> Result<Decomposition, LlmError> {
    let subtasks: Vec<SubTask> = plan
        .subtasks
        .into_iter()
        .filter(|step| !step.title.trim().is_empty())
        .map(|step| SubTask {
            id: Uuid::new_v4().to_string(),
            title: step.title.trim().to_string(),
            completed: false,
            estimated_time: Some(
                step.estimated_time
                    .and_then(whole_minutes)
                    .unwrap_or(DEFAULT_LLM_STEP_MINUTES),
            ),
        })
        .collect();

    if subtasks.is_empty() {
        return Err(LlmError::EmptyContent);
    }

    let estimated_total_time = plan
        .estimated_total_time
        .and_then(whole_minutes)
        .unwrap_or_else(|| subtasks.iter().filter_map(|s| s.estimated_time).sum());

    Ok(Decomposition {
        subtasks,
        estimated_total_time,
        suggested_priority: plan.suggested_priority.unwrap_or_default(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
