//! Travel agent configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::LlmError;

/// Main travel agent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Web search tool configuration
    pub search: SearchConfig,

    /// Pipeline limits
    pub pipeline: PipelineConfig,

    /// Preference memory
    pub memory: MemoryConfig,

    /// Where finished plans go
    pub output: OutputConfig,

    /// Log level (overridden by --log-level)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Environment variables the configured services need but are not set
    pub fn missing_keys(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if env_unset(&self.llm.api_key_env) {
            missing.push(self.llm.api_key_env.clone());
        }
        if self.search.enabled && env_unset(&self.search.api_key_env) {
            missing.push(self.search.api_key_env.clone());
        }
        missing
    }

    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_keys();
        if !missing.is_empty() {
            return Err(eyre::eyre!(
                "Missing required API keys. Set the following environment variable(s): {}",
                missing.join(", ")
            ));
        }
        if self.pipeline.max_tool_rounds == 0 {
            return Err(eyre::eyre!("pipeline.max-tool-rounds must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .travelagent.yml
        let local_config = PathBuf::from(".travelagent.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/travelagent/travelagent.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("travelagent").join("travelagent.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is initialised
    ///
    /// Errors are swallowed: a broken config is reported properly by `load`.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates: Vec<PathBuf> = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".travelagent.yml")];
                if let Some(config_dir) = dirs::config_dir() {
                    paths.push(config_dir.join("travelagent").join("travelagent.yml"));
                }
                paths
            }
        };

        candidates
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

fn env_unset(name: &str) -> bool {
    std::env::var(name).map(|v| v.trim().is_empty()).unwrap_or(true)
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "anthropic" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String, LlmError> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(LlmError::MissingApiKey(self.api_key_env.clone())),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            timeout_ms: 300_000,
        }
    }
}

/// Web search (Tavily) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Register the web_search tool at all
    pub enabled: bool,

    /// Environment variable containing the Tavily API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Default number of results when the model does not ask for a count
    #[serde(rename = "max-results")]
    pub max_results: u32,

    /// "basic" or "advanced"
    #[serde(rename = "search-depth")]
    pub search_depth: String,

    /// Ask Tavily for its synthesized answer
    #[serde(rename = "include-answer")]
    pub include_answer: bool,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: "TAVILY_API_KEY".to_string(),
            base_url: "https://api.tavily.com".to_string(),
            max_results: 5,
            search_depth: "advanced".to_string(),
            include_answer: true,
            timeout_ms: 30_000,
        }
    }
}

/// Pipeline limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Tool rounds allowed per step before giving up
    #[serde(rename = "max-tool-rounds")]
    pub max_tool_rounds: u32,

    /// Retries of a rate-limited LLM call
    #[serde(rename = "rate-limit-retries")]
    pub rate_limit_retries: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: 10,
            rate_limit_retries: 2,
        }
    }
}

/// Preference memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Remember preferences between runs
    pub enabled: bool,

    /// Directory of per-user preference records
    #[serde(rename = "store-dir")]
    pub store_dir: PathBuf,

    /// How many past destinations to keep
    #[serde(rename = "max-destinations")]
    pub max_destinations: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            store_dir: prefstore::config::default_store_path(),
            max_destinations: prefstore::DEFAULT_MAX_DESTINATIONS,
        }
    }
}

/// Plan output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory plans are saved to
    pub dir: PathBuf,

    /// Save the plan to a file after printing it
    #[serde(rename = "save-plan")]
    pub save_plan: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            save_plan: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
        assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.search.search_depth, "advanced");
        assert!(config.search.include_answer);
        assert_eq!(config.pipeline.max_tool_rounds, 10);
        assert_eq!(config.pipeline.rate_limit_retries, 2);
        assert_eq!(config.memory.max_destinations, 5);
        assert!(config.output.save_plan);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
llm:
  model: claude-haiku
  max-tokens: 2048
pipeline:
  max-tool-rounds: 3
search:
  enabled: false
log-level: debug
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "claude-haiku");
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.pipeline.max_tool_rounds, 3);
        assert_eq!(config.pipeline.rate_limit_retries, 2);
        assert!(!config.search.enabled);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.yml");
        fs::write(&path, "output:\n  dir: /tmp/plans\n  save-plan: false\nlog-level: warn\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("/tmp/plans"));
        assert!(!config.output.save_plan);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_path_missing_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    #[serial]
    fn test_missing_keys_names_variables() {
        let mut config = Config::default();
        config.llm.api_key_env = "TA_TEST_LLM_KEY_UNSET".to_string();
        config.search.api_key_env = "TA_TEST_SEARCH_KEY_UNSET".to_string();
        unsafe {
            std::env::remove_var("TA_TEST_LLM_KEY_UNSET");
            std::env::remove_var("TA_TEST_SEARCH_KEY_UNSET");
        }

        assert_eq!(
            config.missing_keys(),
            vec!["TA_TEST_LLM_KEY_UNSET", "TA_TEST_SEARCH_KEY_UNSET"]
        );
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("TA_TEST_LLM_KEY_UNSET"));

        // Search key only matters when search is enabled
        config.search.enabled = false;
        assert_eq!(config.missing_keys(), vec!["TA_TEST_LLM_KEY_UNSET"]);
    }

    #[test]
    #[serial]
    fn test_get_api_key() {
        let config = LlmConfig {
            api_key_env: "TA_TEST_LLM_KEY_SET".to_string(),
            ..Default::default()
        };
        unsafe {
            std::env::set_var("TA_TEST_LLM_KEY_SET", " sk-test ");
        }
        assert_eq!(config.get_api_key().unwrap(), "sk-test");

        unsafe {
            std::env::set_var("TA_TEST_LLM_KEY_SET", "");
        }
        assert!(matches!(config.get_api_key(), Err(LlmError::MissingApiKey(_))));

        unsafe {
            std::env::remove_var("TA_TEST_LLM_KEY_SET");
        }
    }
}
