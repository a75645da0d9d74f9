//! Application settings
//!
//! Read once from the environment (and `.env`) and passed down explicitly.

use crate::error::AgentError;
use crate::llm::huggingface::DEFAULT_API_URL;
use crate::llm::{HuggingFaceClient, ModelSelector, TextGenerator};
use crate::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://career_architect.db?mode=rwc";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct HuggingFaceSettings {
    pub api_key: Option<String>,
    /// Model id used for generation; catalogue keys such as `phi-2` are resolved to ids
    pub default_llm_model: String,
    pub api_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub env: String,
    pub log_level: String,
    pub huggingface: HuggingFaceSettings,
    pub database_url: String,
    /// Rendered portfolio sites land under `{output_dir}/site` unless the CLI is given a directory
    pub output_dir: PathBuf,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: "development".to_string(),
            log_level: "info".to_string(),
            huggingface: HuggingFaceSettings {
                api_key: None,
                default_llm_model: ModelSelector::new().for_headline().id.to_string(),
                api_url: DEFAULT_API_URL.to_string(),
            },
            database_url: DEFAULT_DATABASE_URL.to_string(),
            output_dir: PathBuf::from("./output"),
            port: DEFAULT_PORT,
        }
    }
}

fn resolve_model(raw: &str) -> String {
    let raw = raw.trim();
    match ModelSelector::new().get(raw) {
        Some(info) => info.id.to_string(),
        None => raw.to_string(),
    }
}

impl Settings {
    /// Load from the process environment after reading `.env` if present
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT").or_else(|| get("API_PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| AgentError::Config(format!("PORT must be a port number, got '{}': {}", raw, e)))?,
            None => defaults.port,
        };

        let hf = defaults.huggingface;
        Ok(Self {
            env: get("APP_ENV").unwrap_or(defaults.env),
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level).to_lowercase(),
            huggingface: HuggingFaceSettings {
                api_key: get("HUGGINGFACE_API_KEY"),
                default_llm_model: get("DEFAULT_LLM_MODEL")
                    .map(|raw| resolve_model(&raw))
                    .unwrap_or(hf.default_llm_model),
                api_url: get("HUGGINGFACE_API_URL").unwrap_or(hf.api_url),
            },
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            output_dir: get("OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir),
            port,
        })
    }

    pub fn site_dir(&self) -> PathBuf {
        self.output_dir.join("site")
    }

    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }

    /// Hosted text generation, or `None` to run every agent on templates
    pub fn text_generator(&self) -> Result<Option<Arc<dyn TextGenerator>>> {
        let Some(key) = self.huggingface.api_key.as_deref() else {
            info!("No Hugging Face API key configured, using templates");
            return Ok(None);
        };

        let client = HuggingFaceClient::new(key, self.huggingface.default_llm_model.as_str())?
            .with_api_url(self.huggingface.api_url.as_str());
        info!(model = %self.huggingface.default_llm_model, "Hugging Face text generation enabled");
        Ok(Some(Arc::new(client)))
    }
}
