use crate::config::GenerationParams;
use crate::models::{AssistantMessage, ConversationResult, TokenLogprob};
use crate::registry::ModelCapabilities;
use anyhow::{Context, Result};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
};
use async_openai::{Client, config::OpenAIConfig};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

/// Everything needed to play one conversation against a model
#[derive(Debug, Clone, Copy)]
pub struct ConversationRequest<'a> {
    pub user_prompts: &'a [String],
    pub system_prompt: Option<&'a str>,
    /// Explicit credential; falls back to the model's environment variable
    pub api_key: Option<&'a str>,
    /// Log-probability capture per turn, the last flag repeats
    pub request_logprobs: &'a [bool],
    pub generation: &'a GenerationParams,
}

impl ConversationRequest<'_> {
    pub fn logprobs_for_turn(&self, turn: usize) -> bool {
        self.request_logprobs
            .get(turn)
            .or(self.request_logprobs.last())
            .copied()
            .unwrap_or(false)
    }
}

/// Executes one full multi-turn conversation. Failures propagate as-is,
/// there are no retries at this level.
#[async_trait]
pub trait ConversationClient: Send + Sync {
    async fn run_conversation(
        &self,
        model: &ModelCapabilities,
        request: &ConversationRequest<'_>,
    ) -> Result<ConversationResult>;
}

/// Conversation client for OpenAI-compatible chat completion APIs,
/// rate limited per model
pub struct OpenAiConversationClient {
    /// Last request time per model name
    last_requests: Mutex<HashMap<String, Option<Instant>>>,
}

impl OpenAiConversationClient {
    pub fn new() -> Self {
        Self {
            last_requests: Mutex::new(HashMap::new()),
        }
    }

    /// Enforce rate limiting for API requests
    async fn enforce_rate_limit(last_request: &mut Option<Instant>, rate_limit_rps: f64) {
        if rate_limit_rps <= 0.0 {
            return;
        }

        let min_interval = Duration::from_secs_f64(1.0 / rate_limit_rps);

        if let Some(last_time) = *last_request {
            let elapsed = last_time.elapsed();
            if elapsed < min_interval {
                sleep(min_interval - elapsed).await;
            }
        }

        *last_request = Some(Instant::now());
    }

    async fn wait_for_slot(&self, model: &ModelCapabilities) {
        let mut last_requests = self.last_requests.lock().await;
        let last_request = last_requests.entry(model.name.clone()).or_insert(None);
        Self::enforce_rate_limit(last_request, model.rate_limit_rps).await;
    }

    /// Create the OpenAI client for a model
    fn create_client(
        &self,
        model: &ModelCapabilities,
        api_key: Option<&str>,
    ) -> Result<Client<OpenAIConfig>> {
        let api_key = match api_key {
            Some(key) => key.to_string(),
            None => std::env::var(&model.env_var_api_key).with_context(|| {
                format!("Environment variable {} not found", model.env_var_api_key)
            })?,
        };

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&model.api_endpoint);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(model.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Client::with_config(openai_config).with_http_client(http_client))
    }

    /// Opening messages of the history
    fn initial_history(
        &self,
        system_prompt: Option<&str>,
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut history = Vec::new();
        if let Some(system_prompt) = system_prompt {
            history.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt.to_string())
                    .build()
                    .context("Failed to build system message")?
                    .into(),
            );
        }
        Ok(history)
    }

    /// Build the chat completion request for one turn
    fn build_turn_request(
        &self,
        model: &ModelCapabilities,
        history: &[ChatCompletionRequestMessage],
        generation: &GenerationParams,
        logprobs: bool,
    ) -> Result<CreateChatCompletionRequest> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&model.api_model).messages(history.to_vec());

        if let Some(temperature) = generation.temperature {
            args.temperature(temperature as f32);
        }
        if let Some(max_tokens) = generation.max_tokens {
            args.max_tokens(max_tokens);
        }
        if let Some(top_p) = generation.top_p {
            args.top_p(top_p as f32);
        }
        if let Some(seed) = generation.seed {
            args.seed(seed);
        }
        if logprobs {
            args.logprobs(true);
        }

        args.build().context("Failed to build chat completion request")
    }

    /// Extract the assistant reply from the API response
    fn extract_assistant_message(&self, response: CreateChatCompletionResponse) -> AssistantMessage {
        let Some(choice) = response.choices.into_iter().next() else {
            return AssistantMessage::default();
        };

        let token_logprobs = choice
            .logprobs
            .and_then(|logprobs| logprobs.content)
            .unwrap_or_default()
            .into_iter()
            .map(|t| TokenLogprob {
                token: t.token,
                logprob: f64::from(t.logprob),
            })
            .collect();

        AssistantMessage {
            content: choice.message.content.unwrap_or_default(),
            token_logprobs,
        }
    }
}

impl Default for OpenAiConversationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationClient for OpenAiConversationClient {
    async fn run_conversation(
        &self,
        model: &ModelCapabilities,
        request: &ConversationRequest<'_>,
    ) -> Result<ConversationResult> {
        let client = self.create_client(model, request.api_key)?;
        let mut history = self.initial_history(request.system_prompt)?;
        let mut assistant_messages = Vec::with_capacity(request.user_prompts.len());

        for (turn, prompt) in request.user_prompts.iter().enumerate() {
            history.push(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt.clone())
                    .build()
                    .context("Failed to build user message")?
                    .into(),
            );

            let chat_request = self.build_turn_request(
                model,
                &history,
                request.generation,
                request.logprobs_for_turn(turn),
            )?;

            self.wait_for_slot(model).await;
            debug!(model = %model.name, turn = turn + 1, "requesting completion");
            let response = client
                .chat()
                .create(chat_request)
                .await
                .with_context(|| format!("Failed to generate response for turn {}", turn + 1))?;

            let message = self.extract_assistant_message(response);
            history.push(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(message.content.clone())
                    .build()
                    .context("Failed to build assistant message")?
                    .into(),
            );
            assistant_messages.push(message);
        }

        Ok(ConversationResult { assistant_messages })
    }
}
