//! Advisory configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/budgetcheck/config/advisor.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Every key is optional; missing keys keep their default value.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::aggregate::{TOP_DISCRETIONARY_LIMIT, TOP_DISCRETIONARY_RANGE};
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/advisor.toml");

/// Which advisory backend to call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Gemini,
    OpenAICompatible,
    Mock,
    /// Never call out; always use fallback advice
    Disabled,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAICompatible => "openai_compatible",
            Self::Mock => "mock",
            Self::Disabled => "none",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai_compatible" | "openai" => Ok(Self::OpenAICompatible),
            "mock" => Ok(Self::Mock),
            "none" | "off" | "disabled" => Ok(Self::Disabled),
            _ => Err(format!("Unknown advisory backend: {}", s)),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sampling parameters sent with each advisory request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 300,
        }
    }
}

/// Advisory configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    pub backend: BackendKind,
    /// Model name; backends fall back to their own default when this is empty
    pub model: String,
    /// Bound on the single advisory request
    pub timeout: Duration,
    pub generation: GenerationConfig,
    /// Length of the top discretionary list, within 3..=5
    pub top_categories: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Gemini,
            model: "gemini-2.5-flash".to_string(),
            timeout: Duration::from_secs(15),
            generation: GenerationConfig::default(),
            top_categories: TOP_DISCRETIONARY_LIMIT,
        }
    }
}

impl AdvisorConfig {
    /// Load from the data-dir override if present, else the embedded default
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit file, falling back to the embedded default when
    /// the file does not exist
    pub fn from_path(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Same as [`AdvisorConfig::with_timeout`] but in seconds
    pub fn with_timeout_secs(self, secs: u64) -> Self {
        self.with_timeout(Duration::from_secs(secs))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("budgetcheck").join("config").join("advisor.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<AdvisorConfig> {
    let path = match override_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let content = match path {
        Some(path) if path.exists() => {
            tracing::debug!(path = %path.display(), "Loading advisor config override");
            fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
        }
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    advisor: Option<RawAdvisor>,
    generation: Option<RawGeneration>,
    analysis: Option<RawAnalysis>,
}

#[derive(Debug, Deserialize)]
struct RawAdvisor {
    backend: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawGeneration {
    temperature: Option<f32>,
    top_p: Option<f32>,
    top_k: Option<u32>,
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    top_categories: Option<usize>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<AdvisorConfig> {
    let raw: RawConfig = toml::from_str(content)?;
    let mut config = AdvisorConfig::default();

    if let Some(advisor) = raw.advisor {
        if let Some(backend) = advisor.backend {
            config.backend = backend.parse().map_err(Error::Config)?;
        }
        if let Some(model) = advisor.model {
            config.model = model;
        }
        if let Some(secs) = advisor.timeout_secs {
            if secs == 0 {
                return Err(Error::Config("timeout_secs must be at least 1".into()));
            }
            config.timeout = Duration::from_secs(secs);
        }
    }

    if let Some(generation) = raw.generation {
        if let Some(temperature) = generation.temperature {
            config.generation.temperature = temperature;
        }
        if let Some(top_p) = generation.top_p {
            config.generation.top_p = top_p;
        }
        if let Some(top_k) = generation.top_k {
            config.generation.top_k = top_k;
        }
        if let Some(max) = generation.max_output_tokens {
            config.generation.max_output_tokens = max;
        }
    }

    if let Some(analysis) = raw.analysis {
        if let Some(top) = analysis.top_categories {
            if !TOP_DISCRETIONARY_RANGE.contains(&top) {
                return Err(Error::Config(format!(
                    "top_categories must be between {} and {}, got {}",
                    TOP_DISCRETIONARY_RANGE.start(),
                    TOP_DISCRETIONARY_RANGE.end(),
                    top
                )));
            }
            config.top_categories = top;
        }
    }

    Ok(config)
}
