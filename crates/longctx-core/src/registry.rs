use serde::{Deserialize, Serialize};

use crate::error::{LcError, Result};

/// Which provider API a model is served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    DeepSeek,
}

impl Provider {
    /// Environment variable holding the API credential for this provider.
    pub fn credential_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }

    /// Default API base URL. Individual models may override it.
    pub fn base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com",
            Self::DeepSeek => "https://api.deepseek.com",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::DeepSeek => "DeepSeek",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Static pricing/capability descriptor for one queryable model.
///
/// Prices are integer nanodollars (1e-9 USD) per token, converted from the
/// $/1M figures in models.toml. Integer math keeps cost accounting exact;
/// dollars only appear at presentation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSpec {
    pub id: String,
    pub display_name: String,
    pub provider: Provider,
    pub input_nanos_per_token: i64,
    pub output_nanos_per_token: i64,
    pub context_window: u64,
    /// Endpoint override for models pinned to a non-default base URL.
    pub base_url: Option<String>,
    /// Model id sent on the wire when it differs from the registry id
    /// (e.g. a dated snapshot served under a generic API name).
    pub api_model: Option<String>,
}

impl ModelSpec {
    /// Effective API base URL for this model.
    pub fn endpoint(&self) -> &str {
        self.base_url.as_deref().unwrap_or(self.provider.base_url())
    }

    /// Model id to send in requests.
    pub fn api_model(&self) -> &str {
        self.api_model.as_deref().unwrap_or(&self.id)
    }
}

/// Raw entry as written in models.toml, prices in $/1M tokens.
#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
    display_name: String,
    provider: Provider,
    input_usd_per_m: f64,
    output_usd_per_m: f64,
    context_window: u64,
    base_url: Option<String>,
    api_model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsFile {
    model: Vec<ModelEntry>,
}

/// Convert a $/1M-token price to nanodollars per token.
/// $2.50/1M tokens is 2500 nanodollars per token.
fn usd_per_m_to_nanos(usd_per_m: f64) -> i64 {
    (usd_per_m * 1000.0).round() as i64
}

/// Read-only model registry, populated once at startup.
///
/// File order is preserved (`[[model]]` array of tables), so listings show
/// models in the order they were declared.
#[derive(Debug, Clone)]
pub struct Registry {
    models: Vec<ModelSpec>,
}

impl Registry {
    /// Load the bundled models.toml from the data/ directory.
    pub fn bundled() -> Result<Self> {
        Self::parse(include_str!("../../../data/models.toml"))
    }

    /// Load a registry override from a file on disk.
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LcError::Io(e.to_string()))?;
        Self::parse(&content)
    }

    /// Parse registry entries from TOML.
    pub fn parse(toml_str: &str) -> Result<Self> {
        let file: ModelsFile =
            toml::from_str(toml_str).map_err(|e| LcError::Config(e.to_string()))?;

        let mut models = Vec::with_capacity(file.model.len());
        for entry in file.model {
            if entry.input_usd_per_m < 0.0 || entry.output_usd_per_m < 0.0 {
                return Err(LcError::Config(format!(
                    "{}: prices must be non-negative",
                    entry.id
                )));
            }
            if entry.context_window == 0 {
                return Err(LcError::Config(format!(
                    "{}: context_window must be positive",
                    entry.id
                )));
            }
            if models.iter().any(|m: &ModelSpec| m.id == entry.id) {
                return Err(LcError::Config(format!("duplicate model id: {}", entry.id)));
            }
            models.push(ModelSpec {
                id: entry.id,
                display_name: entry.display_name,
                provider: entry.provider,
                input_nanos_per_token: usd_per_m_to_nanos(entry.input_usd_per_m),
                output_nanos_per_token: usd_per_m_to_nanos(entry.output_usd_per_m),
                context_window: entry.context_window,
                base_url: entry.base_url,
                api_model: entry.api_model,
            });
        }
        Ok(Self { models })
    }

    /// Look up a model by registry id.
    pub fn lookup(&self, id: &str) -> Result<&ModelSpec> {
        self.models
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| LcError::UnknownModel(id.to_string()))
    }

    pub fn models(&self) -> &[ModelSpec] {
        &self.models
    }

    /// All registry ids, in file order.
    pub fn ids(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.id.as_str()).collect()
    }
}
