//! Consistency engine: samples a model repeatedly and measures how stable
//! its replies are, per segment of the conversation.

use crate::client::{ConversationClient, ConversationRequest};
use crate::config::{ExperimentConfig, GenerationParams};
use crate::error::ConsistencyError;
use crate::metrics::MetricFamily;
use crate::models::{MetricTable, MetricTableBuilder};
use crate::registry::{ModelCapabilities, ModelRegistry};
use crate::segments::{SegmentBucket, SegmentBuckets};
use crate::stats::mean_std;
use crate::text::{lexical_diversity, split_sentences, tokenize};
use crate::toolkit::AnalysisToolkit;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

/// Per-text features summarised as `<name>_mean` / `<name>_std` rows
const DESCRIPTIVE_FEATURES: [&str; 7] = [
    "length_chars",
    "length_tokens",
    "num_sentences",
    "ttr",
    "avg_sentence_length",
    "readability_flesch",
    "readability_kincaid",
];

const CONFIDENCE_FEATURE: &str = "confidence_avg_logprob";

/// Inputs of one engine invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyRequest {
    pub user_prompts: Vec<String>,
    pub system_prompt: Option<String>,
    /// One reference text per user prompt
    pub reference: Option<Vec<String>>,
    pub n_runs: usize,
    pub generation: GenerationParams,
    /// Capture log-probabilities when the model supports them
    pub request_logprobs: bool,
    pub show_progress: bool,
    /// Explicit credential, otherwise the model's environment variable is used
    pub api_key: Option<String>,
}

impl Default for ConsistencyRequest {
    fn default() -> Self {
        Self {
            user_prompts: Vec::new(),
            system_prompt: None,
            reference: None,
            n_runs: 5,
            generation: GenerationParams::default(),
            request_logprobs: true,
            show_progress: true,
            api_key: None,
        }
    }
}

impl From<&ExperimentConfig> for ConsistencyRequest {
    fn from(config: &ExperimentConfig) -> Self {
        Self {
            user_prompts: config.user_prompts.clone(),
            system_prompt: config.system_prompt.clone(),
            reference: config.reference.clone(),
            n_runs: config.n_runs,
            generation: config.generation.clone(),
            request_logprobs: config.request_logprobs,
            show_progress: config.show_progress,
            api_key: None,
        }
    }
}

impl ConsistencyRequest {
    fn validate(&self) -> Result<(), ConsistencyError> {
        if self.user_prompts.is_empty() {
            return Err(ConsistencyError::InvalidInput(
                "user_prompts must contain at least one prompt".to_string(),
            ));
        }
        if self.n_runs == 0 {
            return Err(ConsistencyError::InvalidInput(
                "n_runs must be a positive integer".to_string(),
            ));
        }
        if let Some(reference) = &self.reference {
            if reference.len() != self.user_prompts.len() {
                return Err(ConsistencyError::InvalidInput(format!(
                    "reference has {} texts but there are {} user prompts",
                    reference.len(),
                    self.user_prompts.len()
                )));
            }
        }
        Ok(())
    }
}

pub struct ConsistencyEngine<C> {
    registry: ModelRegistry,
    client: C,
    toolkit: AnalysisToolkit,
}

impl<C: ConversationClient> ConsistencyEngine<C> {
    pub fn new(registry: ModelRegistry, client: C, toolkit: AnalysisToolkit) -> Self {
        Self {
            registry,
            client,
            toolkit,
        }
    }

    /// Run the conversation `n_runs` times against `model` and measure how
    /// consistent the replies are, one column per segment.
    pub async fn internal_consistency(
        &self,
        model: &str,
        request: &ConsistencyRequest,
    ) -> Result<MetricTable, ConsistencyError> {
        request.validate()?;
        let capabilities = self.registry.get(model)?;

        let buckets = self.collect_runs(capabilities, request).await?;
        Ok(self.build_table(&buckets, capabilities.supports_logprobs))
    }

    /// Measure both models on the same conversation, then compare their
    /// replies with each other.
    ///
    /// Rows of each model are suffixed `_model_a` / `_model_b`, followed by one
    /// `<family>_between_models` row per similarity family.
    pub async fn external_consistency(
        &self,
        model_a: &str,
        model_b: &str,
        request: &ConsistencyRequest,
    ) -> Result<MetricTable, ConsistencyError> {
        request.validate()?;
        let capabilities_a = self.registry.get(model_a)?;
        let capabilities_b = self.registry.get(model_b)?;

        let buckets_a = self.collect_runs(capabilities_a, request).await?;
        let buckets_b = self.collect_runs(capabilities_b, request).await?;

        let table_a = self.build_table(&buckets_a, capabilities_a.supports_logprobs);
        let table_b = self.build_table(&buckets_b, capabilities_b.supports_logprobs);

        let mut builder = MetricTableBuilder::new(buckets_a.labels().to_vec());
        builder.rows_from(&table_a, "_model_a");
        builder.rows_from(&table_b, "_model_b");

        for family in MetricFamily::ALL {
            let values = buckets_a
                .iter()
                .zip(buckets_b.iter())
                .map(|((_, a), (_, b))| {
                    family
                        .between(&a.texts, &b.texts, &self.toolkit)
                        .unwrap_or(f64::NAN)
                })
                .collect();
            builder.row(format!("{}_between_models", family.name()), values);
        }

        Ok(builder.build())
    }

    /// Execute every run sequentially and fold the replies into segment buckets.
    async fn collect_runs(
        &self,
        capabilities: &ModelCapabilities,
        request: &ConsistencyRequest,
    ) -> Result<SegmentBuckets, ConsistencyError> {
        let capture_confidence = capabilities.supports_logprobs && request.request_logprobs;
        let logprob_flags = vec![capture_confidence; request.user_prompts.len()];
        let conversation = ConversationRequest {
            user_prompts: &request.user_prompts,
            system_prompt: request.system_prompt.as_deref(),
            api_key: request.api_key.as_deref(),
            request_logprobs: &logprob_flags,
            generation: &request.generation,
        };

        let mut buckets =
            SegmentBuckets::new(request.user_prompts.len(), request.reference.as_deref());
        let progress = self.progress_bar(&capabilities.name, request);
        info!(
            model = %capabilities.name,
            runs = request.n_runs,
            logprobs = capture_confidence,
            "sampling conversations"
        );

        for run in 1..=request.n_runs {
            debug!(model = %capabilities.name, run, total = request.n_runs, "starting run");
            let result = self
                .client
                .run_conversation(capabilities, &conversation)
                .await
                .map_err(|source| {
                    progress.abandon();
                    ConsistencyError::Conversation {
                        run,
                        total: request.n_runs,
                        source,
                    }
                })?;

            buckets.absorb(&result, capture_confidence);
            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok(buckets)
    }

    fn progress_bar(&self, model: &str, request: &ConsistencyRequest) -> ProgressBar {
        if !request.show_progress || request.n_runs <= 1 {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(request.n_runs as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("  {msg}: [{bar:30}] {pos}/{len} runs ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress.set_message(model.to_string());
        progress
    }

    /// One column per segment, rows in their fixed order. Confidence rows are
    /// only present when the model supports log-probabilities and at least one
    /// value was captured.
    fn build_table(&self, buckets: &SegmentBuckets, supports_logprobs: bool) -> MetricTable {
        let include_confidence = supports_logprobs && buckets.has_confidence();
        let columns: Vec<Vec<(String, f64)>> = buckets
            .iter()
            .map(|(label, bucket)| {
                debug!(segment = label, runs = bucket.texts.len(), "measuring segment");
                self.segment_column(bucket, include_confidence)
            })
            .collect();

        let mut builder = MetricTableBuilder::new(buckets.labels().to_vec());
        if let Some(first) = columns.first() {
            for (index, (metric, _)) in first.iter().enumerate() {
                let values = columns.iter().map(|column| column[index].1).collect();
                builder.row(metric.clone(), values);
            }
        }
        builder.build()
    }

    fn segment_column(&self, bucket: &SegmentBucket, include_confidence: bool) -> Vec<(String, f64)> {
        let mut column = Vec::new();

        let features: Vec<[f64; 7]> = bucket
            .texts
            .iter()
            .map(|text| self.descriptive_features(text))
            .collect();
        for (index, name) in DESCRIPTIVE_FEATURES.iter().enumerate() {
            let values: Vec<f64> = features.iter().map(|f| f[index]).collect();
            let (mean, std) = mean_std(&values);
            column.push((format!("{}_mean", name), mean));
            column.push((format!("{}_std", name), std));
        }

        for family in MetricFamily::ALL {
            let internal = family.internal(&bucket.texts, &self.toolkit);
            let reference = family.reference(&bucket.texts, bucket.anchor.as_deref(), &self.toolkit);
            column.push((format!("{}_internal", family.name()), internal.unwrap_or(f64::NAN)));
            column.push((format!("{}_reference", family.name()), reference.unwrap_or(f64::NAN)));
        }

        if include_confidence {
            let (mean, std) = mean_std(&bucket.confidences);
            column.push((format!("{}_mean", CONFIDENCE_FEATURE), mean));
            column.push((format!("{}_std", CONFIDENCE_FEATURE), std));
        }

        column
    }

    /// Features in `DESCRIPTIVE_FEATURES` order
    fn descriptive_features(&self, text: &str) -> [f64; 7] {
        let diversity = lexical_diversity(text);
        let (flesch, kincaid) = self.toolkit.readability(text);
        [
            text.chars().count() as f64,
            tokenize(text).len() as f64,
            split_sentences(text).len() as f64,
            diversity.type_token_ratio,
            diversity.avg_sentence_length,
            flesch,
            kincaid,
        ]
    }
}
