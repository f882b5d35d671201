use crate::client::ConversationClient;
use crate::config::{Config, ExperimentConfig};
use crate::engine::{ConsistencyEngine, ConsistencyRequest};
use crate::models::ExperimentResult;
use crate::report::{summarize_external, summarize_internal};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Main runner that works through the configured experiments in order
pub struct Runner<C> {
    config: Config,
    engine: ConsistencyEngine<C>,
}

impl<C: ConversationClient> Runner<C> {
    /// Create a new runner with the given configuration
    pub fn new(config: Config, engine: ConsistencyEngine<C>) -> Self {
        Self { config, engine }
    }

    /// Run all experiments defined in the configuration
    pub async fn run_experiments(&self) -> Result<Vec<ExperimentResult>> {
        let mut all_results = Vec::new();
        let total_experiments = self.config.experiments.len();

        for (index, experiment) in self.config.experiments.iter().enumerate() {
            let result = self
                .run_single_experiment(experiment, index + 1, total_experiments)
                .await
                .with_context(|| format!("Experiment '{}' failed", experiment.title))?;
            all_results.push(result);
        }

        Ok(all_results)
    }

    /// Run one experiment and store its result if configured
    async fn run_single_experiment(
        &self,
        experiment: &ExperimentConfig,
        experiment_num: usize,
        total_experiments: usize,
    ) -> Result<ExperimentResult> {
        info!(
            title = %experiment.title,
            "Running experiment {}/{}", experiment_num, total_experiments
        );
        let request = ConsistencyRequest::from(experiment);

        let result = match &experiment.compare_with {
            Some(other) => {
                let table = self
                    .engine
                    .external_consistency(&experiment.model, other, &request)
                    .await?;
                let summary = summarize_external(&table, &experiment.model, other);
                ExperimentResult {
                    title: experiment.title.clone(),
                    model: experiment.model.clone(),
                    compare_with: Some(other.clone()),
                    table,
                    summary,
                }
            }
            None => {
                let table = self
                    .engine
                    .internal_consistency(&experiment.model, &request)
                    .await?;
                let summary = summarize_internal(&table, None);
                ExperimentResult {
                    title: experiment.title.clone(),
                    model: experiment.model.clone(),
                    compare_with: None,
                    table,
                    summary,
                }
            }
        };

        if let Some(storage_path) = &experiment.storage_path {
            info!(
                "Storing results for experiment {}/{} to {}",
                experiment_num, total_experiments, storage_path
            );
            self.store_results(&result, storage_path)?;
        }

        info!(title = %experiment.title, "Finished experiment {}/{}", experiment_num, total_experiments);
        Ok(result)
    }

    /// Store an experiment result to a JSON file
    fn store_results(&self, result: &ExperimentResult, storage_path: &str) -> Result<()> {
        let path = Path::new(storage_path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
        }

        let json = serde_json::to_string_pretty(result).context("Failed to serialize results")?;

        std::fs::write(path, json)
            .with_context(|| format!("Failed to write results to: {}", storage_path))?;

        Ok(())
    }
}
