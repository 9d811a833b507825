//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Characters of extracted document text sent to the completion provider.
/// Anything past this is dropped from the prompt.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 15_000;

/// Below this many characters a document is treated as empty.
pub const DEFAULT_MIN_DOCUMENT_CHARS: usize = 10;

/// Environment variables consulted for the Gemini API key, in order.
pub const GEMINI_API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "AI_INTEGRATIONS_GEMINI_API_KEY"];

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub parsing: ParsingConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&paths.config_file)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the parser cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.parsing.max_prompt_chars == 0 {
            return Err(ConfigError::Invalid(
                "parsing.max_prompt_chars must be greater than zero".to_string(),
            ));
        }
        if self.llm.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "llm.timeout_seconds must be greater than zero".to_string(),
            ));
        }
        if !(self.parsing.cost_mismatch_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(
                "parsing.cost_mismatch_tolerance must be zero or positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Set a single value by dotted key, e.g. `llm.ollama.model`. On error the
    /// config is left unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let mut updated = self.clone();
        updated.apply(key, value)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn apply(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("invalid value for {}: {}", key, value)))
        }

        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["llm", "provider"] => self.llm.provider = value.parse()?,
            ["llm", "timeout_seconds"] => self.llm.timeout_seconds = parse(key, value)?,
            ["llm", "gemini", "base_url"] => self.llm.gemini.base_url = value.to_string(),
            ["llm", "gemini", "model"] => self.llm.gemini.model = value.to_string(),
            ["llm", "gemini", "api_key"] => {
                self.llm.gemini.api_key = (!value.is_empty()).then(|| value.to_string())
            }
            ["llm", "ollama", "host"] => self.llm.ollama.host = value.to_string(),
            ["llm", "ollama", "model"] => self.llm.ollama.model = value.to_string(),
            ["parsing", "max_prompt_chars"] => self.parsing.max_prompt_chars = parse(key, value)?,
            ["parsing", "min_document_chars"] => {
                self.parsing.min_document_chars = parse(key, value)?
            }
            ["parsing", "warn_on_cost_mismatch"] => {
                self.parsing.warn_on_cost_mismatch = parse(key, value)?
            }
            ["parsing", "cost_mismatch_tolerance"] => {
                self.parsing.cost_mismatch_tolerance = parse(key, value)?
            }
            ["ui", "color"] => self.ui.color = parse(key, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        let default_config = Self::default_config_string();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_config)?;
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Sowline Configuration
# Scope-of-work document parsing

[llm]
# Completion provider used when column-based parsing is not possible
# Options: gemini, ollama
provider = "gemini"

# Deadline for a single AI call, in seconds
timeout_seconds = 30

[llm.gemini]
base_url = "https://generativelanguage.googleapis.com"
model = "gemini-2.0-flash"
# Leave unset to read GEMINI_API_KEY or AI_INTEGRATIONS_GEMINI_API_KEY
# api_key = ""

[llm.ollama]
host = "http://localhost:11434"
model = "gpt-oss:20b"

[parsing]
# Characters of document text included in the AI prompt
max_prompt_chars = 15000

# Documents shorter than this are reported as empty
min_document_chars = 10

# Warn when labor + material differs from the line item budget
warn_on_cost_mismatch = true
cost_mismatch_tolerance = 0.01   # fraction of the budget

[ui]
# Enable colored output
color = true
"#
        .to_string()
    }
}

/// Which completion provider backs the AI fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Ollama => "ollama",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(ConfigError::Invalid(format!("unknown provider '{}'", other))),
        }
    }
}

/// Completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub timeout_seconds: u64,
    pub gemini: GeminiConfig,
    pub ollama: OllamaConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            timeout_seconds: 30,
            gemini: GeminiConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

/// Google Gemini settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl GeminiConfig {
    /// The configured key, or the first non-empty key from the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                GEMINI_API_KEY_VARS
                    .iter()
                    .filter_map(|var| std::env::var(var).ok())
                    .find(|key| !key.trim().is_empty())
            })
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
        }
    }
}

/// Ollama LLM settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "gpt-oss:20b".to_string(),
        }
    }
}

/// Document parsing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    pub max_prompt_chars: usize,
    pub min_document_chars: usize,
    pub warn_on_cost_mismatch: bool,
    pub cost_mismatch_tolerance: f64,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            min_document_chars: DEFAULT_MIN_DOCUMENT_CHARS,
            warn_on_cost_mismatch: true,
            cost_mismatch_tolerance: 0.01,
        }
    }
}

/// UI/Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { color: true }
    }
}
