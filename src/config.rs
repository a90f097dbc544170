use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `llm.api_key`
pub const API_KEY_ENV: &str = "WATTBUDDY_API_KEY";

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-exp:free";
pub const DEFAULT_REFERER: &str = "http://localhost:8000";
pub const DEFAULT_TITLE: &str = "Smart Energy Monitor";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

/// Chat-completions service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_referer() -> String {
    DEFAULT_REFERER.to_string()
}
fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            referer: default_referer(),
            title: default_title(),
            api_key: None,
        }
    }
}

/// Orchestrator pacing and conversation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pause before the analysis update (0 disables)
    #[serde(default = "default_analyze_delay")]
    pub analyze_delay_ms: u64,
    /// Pause before retrieval (0 disables)
    #[serde(default = "default_retrieve_delay")]
    pub retrieve_delay_ms: u64,
    /// Seed the conversation with the assistant greeting
    #[serde(default = "default_greeting")]
    pub greeting: bool,
}

fn default_analyze_delay() -> u64 {
    600
}
fn default_retrieve_delay() -> u64 {
    800
}
fn default_greeting() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            analyze_delay_ms: default_analyze_delay(),
            retrieve_delay_ms: default_retrieve_delay(),
            greeting: default_greeting(),
        }
    }
}

impl PipelineConfig {
    /// No pacing delays, no greeting
    pub fn immediate() -> Self {
        Self {
            analyze_delay_ms: 0,
            retrieve_delay_ms: 0,
            greeting: false,
        }
    }

    pub fn analyze_delay(&self) -> Duration {
        Duration::from_millis(self.analyze_delay_ms)
    }

    pub fn retrieve_delay(&self) -> Duration {
        Duration::from_millis(self.retrieve_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KnowledgeConfig {
    /// TOML document set replacing the built-in corpus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Config::default();
            config.save_to(&config_path)?;
            return Ok(config.with_env_overrides());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, toml_string).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;

        Ok(home.join(".wattbuddy").join("config.toml"))
    }

    /// Apply `WATTBUDDY_API_KEY`, which wins over the file
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.llm.api_key = Some(key);
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.llm.endpoint)
            .with_context(|| format!("Invalid LLM endpoint: {}", self.llm.endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("LLM endpoint must be http(s), got {}", url.scheme());
        }
        if self.llm.model.trim().is_empty() {
            bail!("LLM model must not be empty");
        }
        Ok(())
    }

    /// API key with all but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        match self.llm.api_key.as_deref() {
            None => "(not set)".to_string(),
            Some(key) => {
                let chars: Vec<char> = key.chars().collect();
                let visible: String = chars[chars.len().saturating_sub(4)..].iter().collect();
                format!("****{}", visible)
            }
        }
    }
}
