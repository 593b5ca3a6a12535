//! CollabLab configuration types and loading

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::{DEFAULT_CHAIN_LENGTH, MAX_CHAIN_LENGTH, MIN_CHAIN_LENGTH};

/// Main CollabLab configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Pipeline defaults
    pub pipeline: PipelineConfig,

    /// Prompt template overrides
    pub prompts: PromptsConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        debug!("Config::validate: called");
        self.llm.get_api_key()?;

        let length = self.pipeline.chain_length;
        if !(MIN_CHAIN_LENGTH..=MAX_CHAIN_LENGTH).contains(&length) {
            return Err(eyre!(
                "pipeline.chain-length must be between {} and {}, got {}",
                MIN_CHAIN_LENGTH,
                MAX_CHAIN_LENGTH,
                length
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .collablab.yml
        let local_config = PathBuf::from(".collablab.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/collablab/collablab.yml
        if let Some(user_config) = user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed; the full load reports them once logging is up.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates: Vec<PathBuf> = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".collablab.yml")];
                paths.extend(user_config_path());
                paths
            }
        };

        candidates
            .into_iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(&p).ok())
            .and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("collablab").join("collablab.yml"))
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("anthropic" or "openai")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// File containing the API key, used when the env var is unset
    #[serde(rename = "api-key-file")]
    pub api_key_file: Option<PathBuf>,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key_file: None,
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 2048,
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from the environment, then the key file
    pub fn get_api_key(&self) -> Result<String> {
        debug!(api_key_env = %self.api_key_env, "LlmConfig::get_api_key: called");
        if let Ok(key) = std::env::var(&self.api_key_env) {
            let key = key.trim().to_string();
            if !key.is_empty() {
                debug!("LlmConfig::get_api_key: found in environment");
                return Ok(key);
            }
        }

        if let Some(ref path) = self.api_key_file {
            debug!(?path, "LlmConfig::get_api_key: reading key file");
            let key = fs::read_to_string(path)
                .with_context(|| format!("Failed to read API key file {}", path.display()))?;
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok(key);
            }
            return Err(eyre!("API key file {} is empty", path.display()));
        }

        Err(eyre!(
            "LLM API key not found. Set the {} environment variable.",
            self.api_key_env
        ))
    }
}

/// Pipeline defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of dependent rewrites in the orchestration chain
    #[serde(rename = "chain-length")]
    pub chain_length: u32,

    /// Deadline for the chain, checked between iterations
    #[serde(rename = "deadline-ms")]
    pub deadline_ms: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chain_length: DEFAULT_CHAIN_LENGTH,
            deadline_ms: None,
        }
    }
}

/// Prompt template overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory searched first for `{name}.pmt` overrides
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.pipeline.chain_length, 3);
        assert!(config.pipeline.deadline_ms.is_none());
        assert!(config.prompts.dir.is_none());
    }

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::default();

        assert_eq!(config.provider, "anthropic");
        assert!(config.model.contains("sonnet"));
        assert_eq!(config.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.base_url, "https://api.anthropic.com");
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: openai
  model: gpt-4o
  api-key-env: MY_API_KEY
  base-url: https://api.example.com
  max-tokens: 1024
  timeout-ms: 60000

pipeline:
  chain-length: 5
  deadline-ms: 90000

prompts:
  dir: /tmp/prompts

log-level: debug
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.pipeline.chain_length, 5);
        assert_eq!(config.pipeline.deadline_ms, Some(90_000));
        assert_eq!(config.prompts.dir, Some(PathBuf::from("/tmp/prompts")));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: claude-haiku
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.llm.model, "claude-haiku");

        // Defaults for unspecified
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.pipeline.chain_length, 3);
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pipeline:\n  chain-length: 7").unwrap();

        let config = Config::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.pipeline.chain_length, 7);
    }

    #[test]
    fn test_load_explicit_path_missing_fails() {
        let path = PathBuf::from("/nonexistent/collablab.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_log_level() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log-level: TRACE").unwrap();

        let level = Config::load_log_level(Some(&file.path().to_path_buf()));
        assert_eq!(level.as_deref(), Some("TRACE"));
    }

    #[test]
    #[serial]
    fn test_get_api_key_from_env() {
        let config = LlmConfig {
            api_key_env: "COLLABLAB_TEST_KEY".to_string(),
            ..Default::default()
        };

        unsafe { std::env::set_var("COLLABLAB_TEST_KEY", "  sk-test  ") };
        assert_eq!(config.get_api_key().unwrap(), "sk-test");
        unsafe { std::env::remove_var("COLLABLAB_TEST_KEY") };
    }

    #[test]
    #[serial]
    fn test_get_api_key_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sk-from-file").unwrap();

        let config = LlmConfig {
            api_key_env: "COLLABLAB_TEST_KEY_UNSET".to_string(),
            api_key_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        unsafe { std::env::remove_var("COLLABLAB_TEST_KEY_UNSET") };
        assert_eq!(config.get_api_key().unwrap(), "sk-from-file");
    }

    #[test]
    #[serial]
    fn test_validate_missing_key() {
        let mut config = Config::default();
        config.llm.api_key_env = "COLLABLAB_TEST_KEY_MISSING".to_string();

        unsafe { std::env::remove_var("COLLABLAB_TEST_KEY_MISSING") };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("COLLABLAB_TEST_KEY_MISSING"));
    }

    #[test]
    #[serial]
    fn test_validate_chain_length_out_of_range() {
        let mut config = Config::default();
        config.llm.api_key_env = "COLLABLAB_TEST_KEY_RANGE".to_string();
        config.pipeline.chain_length = 11;

        unsafe { std::env::set_var("COLLABLAB_TEST_KEY_RANGE", "sk") };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("chain-length"));
        unsafe { std::env::remove_var("COLLABLAB_TEST_KEY_RANGE") };
    }
}
