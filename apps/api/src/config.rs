use anyhow::{bail, Context, Result};

const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Where the key/value store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres { database_url: String },
    Redis { redis_url: String },
}

impl StorageBackend {
    /// Resolves the backend from `STORAGE_BACKEND` and the matching connection URL.
    pub fn from_parts(
        kind: &str,
        database_url: Option<String>,
        redis_url: Option<String>,
    ) -> Result<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "" | "memory" => Ok(StorageBackend::Memory),
            "postgres" => Ok(StorageBackend::Postgres {
                database_url: database_url
                    .context("STORAGE_BACKEND=postgres requires DATABASE_URL")?,
            }),
            "redis" => Ok(StorageBackend::Redis {
                redis_url: redis_url.context("STORAGE_BACKEND=redis requires REDIS_URL")?,
            }),
            other => bail!("Unknown STORAGE_BACKEND '{other}' (expected memory, postgres or redis)"),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Postgres { .. } => "postgres",
            StorageBackend::Redis { .. } => "redis",
        }
    }
}

/// Application configuration loaded from environment variables.
/// The LLM key is optional: without it every AI operation runs its local fallback.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub llm_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub storage: StorageBackend,
    pub storage_prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let storage = StorageBackend::from_parts(
            &optional_env("STORAGE_BACKEND").unwrap_or_default(),
            optional_env("DATABASE_URL"),
            optional_env("REDIS_URL"),
        )?;

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            llm_api_key: optional_env("OPENAI_API_KEY"),
            llm_api_url: optional_env("LLM_API_URL")
                .unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            storage,
            storage_prefix: optional_env("STORAGE_PREFIX")
                .unwrap_or_else(|| "secretary".to_string()),
        })
    }
}

#[cfg(test)]
impl Config {
    /// In-memory storage, no LLM key.
    pub fn for_tests() -> Self {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            llm_api_key: None,
            llm_api_url: DEFAULT_LLM_API_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_timeout_secs: 5,
            storage: StorageBackend::Memory,
            storage_prefix: "test".to_string(),
        }
    }
}

/// Reads an env var, treating unset and blank values alike.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_backend_defaults_to_memory() {
        let backend = StorageBackend::from_parts("", None, None).unwrap();
        assert_eq!(backend, StorageBackend::Memory);
    }

    #[test]
    fn test_postgres_backend_requires_database_url() {
        assert!(StorageBackend::from_parts("postgres", None, None).is_err());

        let backend = StorageBackend::from_parts(
            "Postgres",
            Some("postgres://localhost/secretary".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(backend.name(), "postgres");
    }

    #[test]
    fn test_redis_backend_requires_redis_url() {
        assert!(StorageBackend::from_parts("redis", Some("postgres://x".to_string()), None).is_err());
        let backend =
            StorageBackend::from_parts("redis", None, Some("redis://127.0.0.1/".to_string()))
                .unwrap();
        assert_eq!(
            backend,
            StorageBackend::Redis {
                redis_url: "redis://127.0.0.1/".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let err = StorageBackend::from_parts("sqlite", None, None).unwrap_err();
        assert!(err.to_string().contains("sqlite"));
    }
}
