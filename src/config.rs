use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One entry of the model capability registry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Registry key used by experiments
    pub name: String,
    /// OpenAI-compatible API endpoint
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,
    /// Environment variable name containing the API key
    #[serde(default = "default_env_var_api_key")]
    pub env_var_api_key: String,
    /// Model id sent to the API, defaults to `name`
    #[serde(default)]
    pub api_model: Option<String>,
    /// Whether the API can return token log-probabilities
    #[serde(default)]
    pub supports_logprobs: bool,
    /// Rate limit for API requests per second
    #[serde(default = "default_rate_limit")]
    pub rate_limit_rps: f64,
    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Sampling parameters forwarded untouched to the conversation client
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GenerationParams {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub top_p: Option<f64>,
    #[serde(default)]
    pub seed: Option<i64>,
}

/// Configuration for a single consistency experiment
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExperimentConfig {
    pub title: String,
    /// Model to sample, must be listed under [[models]]
    pub model: String,
    /// Second model; turns the experiment into a cross-model comparison
    #[serde(default)]
    pub compare_with: Option<String>,
    /// User prompts, one assistant reply per prompt
    pub user_prompts: Vec<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Reference texts, one per user prompt
    #[serde(default)]
    pub reference: Option<Vec<String>>,
    /// Number of independent conversation runs
    #[serde(default = "default_n_runs")]
    pub n_runs: usize,
    /// Ask for log-probabilities when the model supports them
    #[serde(default = "default_true")]
    pub request_logprobs: bool,
    #[serde(default = "default_true")]
    pub show_progress: bool,
    /// Optional local path to store the result table as JSON
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(flatten)]
    pub generation: GenerationParams,
}

fn default_api_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_env_var_api_key() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_rate_limit() -> f64 {
    10.0
}

fn default_request_timeout() -> u64 {
    120
}

fn default_n_runs() -> usize {
    5
}

fn default_true() -> bool {
    true
}

/// Root configuration: the model registry and the experiments to run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub models: Vec<ModelConfig>,
    #[serde(default)]
    pub experiments: Vec<ExperimentConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }
}
