//! Configuration model, loading, and validation for sketch-studio
//!
//! Configuration is resolved with precedence: CLI flags > config file >
//! built-in defaults. The config file is plain TOML with one table per
//! concern (`[llm]`, `[compiler]`, `[output]`, `[budgets]`). Retry and
//! continuation budgets are explicit configuration values handed to the
//! engine at construction; nothing reads them from ambient state.

use std::fs;
use std::path::Path;

use camino::Utf8PathBuf;
use serde::Deserialize;
use thiserror::Error;

/// Errors produced while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration for the studio
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudioConfig {
    /// LLM provider settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// External compiler settings
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Output layout settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Retry and continuation budgets
    #[serde(default)]
    pub budgets: BudgetConfig,

    /// Enable verbose output (raw responses and failed attempts are persisted)
    #[serde(default)]
    pub verbose: bool,
}

/// LLM provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model to use for completions
    #[serde(default = "default_model")]
    pub model: String,

    /// Custom API base URL (defaults to the Anthropic Messages endpoint)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Output token budget per completion request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: None,
            max_tokens: default_max_tokens(),
            temperature: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// External compiler configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    /// Path to the sketchlang compiler binary. When unset, PATH is searched.
    #[serde(default)]
    pub path: Option<Utf8PathBuf>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self { path: None }
    }
}

/// Output layout configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Base directory for generated sketches
    #[serde(default = "default_output_dir")]
    pub dir: Utf8PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// Retry and continuation budgets for the generation pipeline
///
/// `max_retries` bounds the orchestrator's corrective re-prompting: an
/// invocation performs at most `max_retries + 1` attempts. Continuations
/// repair transport-level truncation and never count against that budget.
/// `transport_retries` is the gateway's own low-level retry count for
/// retryable HTTP failures, independent of both.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetConfig {
    /// Corrective re-prompt budget per orchestrator invocation
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Continuation requests allowed per attempt when responses truncate
    #[serde(default = "default_max_continuations")]
    pub max_continuations: u32,

    /// Low-level gateway retries for retryable transport failures
    #[serde(default = "default_transport_retries")]
    pub transport_retries: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            max_continuations: default_max_continuations(),
            transport_retries: default_transport_retries(),
        }
    }
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_model() -> String {
    "claude-opus-4-5".to_string()
}

fn default_max_tokens() -> u32 {
    16384
}

fn default_request_timeout_secs() -> u64 {
    600
}

fn default_output_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("./output")
}

fn default_max_retries() -> u32 {
    2
}

fn default_max_continuations() -> u32 {
    3
}

fn default_transport_retries() -> u32 {
    2
}

impl StudioConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read and
    /// `ConfigError::Parse` if it is not valid TOML for this model.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        Ok(config)
    }

    /// Validate the configuration, rejecting values the pipeline cannot run with
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.api_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "llm.api_key_env must not be empty".to_string(),
            ));
        }

        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "llm.model must not be empty".to_string(),
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "llm.max_tokens must be greater than zero".to_string(),
            ));
        }

        if self.output.dir.as_str().trim().is_empty() {
            return Err(ConfigError::Invalid(
                "output.dir must not be empty".to_string(),
            ));
        }

        if let Some(temperature) = self.llm.temperature
            && !(0.0..=1.0).contains(&temperature)
        {
            return Err(ConfigError::Invalid(format!(
                "llm.temperature must be within [0.0, 1.0], got {temperature}"
            )));
        }

        Ok(())
    }

    /// Minimal configuration for unit tests
    ///
    /// Small budgets keep retry-loop tests fast and deterministic.
    #[must_use]
    pub fn minimal_for_testing() -> Self {
        Self {
            llm: LlmConfig {
                api_key_env: "SKETCH_STUDIO_TEST_KEY".to_string(),
                model: "test-model".to_string(),
                base_url: None,
                max_tokens: 256,
                temperature: None,
                request_timeout_secs: 5,
            },
            compiler: CompilerConfig {
                path: Some(Utf8PathBuf::from("/nonexistent/sketchlang")),
            },
            output: OutputConfig {
                dir: Utf8PathBuf::from("./test-output"),
            },
            budgets: BudgetConfig {
                max_retries: 1,
                max_continuations: 1,
                transport_retries: 0,
            },
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = StudioConfig::default();

        assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.llm.model, "claude-opus-4-5");
        assert_eq!(config.llm.max_tokens, 16384);
        assert_eq!(config.output.dir, Utf8PathBuf::from("./output"));
        assert_eq!(config.budgets.max_retries, 2);
        assert_eq!(config.budgets.max_continuations, 3);
        assert_eq!(config.budgets.transport_retries, 2);
        assert!(!config.verbose);
    }

    #[test]
    fn test_defaults_pass_validation() {
        let config = StudioConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[llm]
model = "claude-sonnet-4-5"

[budgets]
max_retries = 5
"#
        )
        .unwrap();

        let config = StudioConfig::load(file.path()).unwrap();

        assert_eq!(config.llm.model, "claude-sonnet-4-5");
        assert_eq!(config.llm.max_tokens, 16384, "unset fields keep defaults");
        assert_eq!(config.budgets.max_retries, 5);
        assert_eq!(config.budgets.max_continuations, 3);
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[llm]\nmodle = \"typo\"").unwrap();

        let result = StudioConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let result = StudioConfig::load(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let mut config = StudioConfig::minimal_for_testing();
        config.llm.model = "  ".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("llm.model"));
    }

    #[test]
    fn test_validate_rejects_zero_max_tokens() {
        let mut config = StudioConfig::minimal_for_testing();
        config.llm.max_tokens = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_temperature() {
        let mut config = StudioConfig::minimal_for_testing();
        config.llm.temperature = Some(1.5);

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_zero_retry_budget_is_valid() {
        let mut config = StudioConfig::minimal_for_testing();
        config.budgets.max_retries = 0;

        assert!(config.validate().is_ok(), "R = 0 means exactly one attempt");
    }
}
