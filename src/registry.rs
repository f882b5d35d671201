use crate::config::ModelConfig;
use crate::error::ConsistencyError;
use anyhow::{Result, bail};
use std::collections::HashMap;

/// What the engine needs to know about a model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCapabilities {
    pub name: String,
    pub api_endpoint: String,
    pub env_var_api_key: String,
    pub api_model: String,
    pub supports_logprobs: bool,
    pub rate_limit_rps: f64,
    pub request_timeout_secs: u64,
}

impl From<&ModelConfig> for ModelCapabilities {
    fn from(config: &ModelConfig) -> Self {
        Self {
            name: config.name.clone(),
            api_endpoint: config.api_endpoint.clone(),
            env_var_api_key: config.env_var_api_key.clone(),
            api_model: config.api_model.clone().unwrap_or_else(|| config.name.clone()),
            supports_logprobs: config.supports_logprobs,
            rate_limit_rps: config.rate_limit_rps,
            request_timeout_secs: config.request_timeout_secs,
        }
    }
}

/// Explicitly constructed set of known models, passed to each engine.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelCapabilities>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the [[models]] table, rejecting duplicate names.
    pub fn from_configs(configs: &[ModelConfig]) -> Result<Self> {
        let mut registry = Self::new();
        for config in configs {
            if registry.models.contains_key(&config.name) {
                bail!("Model '{}' is listed more than once", config.name);
            }
            registry.register(ModelCapabilities::from(config));
        }
        Ok(registry)
    }

    pub fn register(&mut self, capabilities: ModelCapabilities) {
        self.models.insert(capabilities.name.clone(), capabilities);
    }

    pub fn get(&self, name: &str) -> Result<&ModelCapabilities, ConsistencyError> {
        self.models
            .get(name)
            .ok_or_else(|| ConsistencyError::UnknownModel(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_config(name: &str) -> ModelConfig {
        ModelConfig {
            name: name.to_string(),
            api_endpoint: "https://api.openai.com/v1".to_string(),
            env_var_api_key: "OPENAI_API_KEY".to_string(),
            api_model: None,
            supports_logprobs: true,
            rate_limit_rps: 10.0,
            request_timeout_secs: 120,
        }
    }

    #[test]
    fn test_registry_lookup() {
        let registry = ModelRegistry::from_configs(&[model_config("gpt-4.1")]).unwrap();
        let caps = registry.get("gpt-4.1").unwrap();
        assert_eq!(caps.api_model, "gpt-4.1");
        assert!(caps.supports_logprobs);
    }

    #[test]
    fn test_unknown_model() {
        let registry = ModelRegistry::new();
        let err = registry.get("missing").unwrap_err();
        assert!(matches!(err, ConsistencyError::UnknownModel(name) if name == "missing"));
    }

    #[test]
    fn test_api_model_override() {
        let mut config = model_config("haiku");
        config.api_model = Some("claude-3-5-haiku-latest".to_string());
        let caps = ModelCapabilities::from(&config);
        assert_eq!(caps.name, "haiku");
        assert_eq!(caps.api_model, "claude-3-5-haiku-latest");
    }

    #[test]
    fn test_duplicate_models_rejected() {
        let err = ModelRegistry::from_configs(&[model_config("a"), model_config("a")]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}
