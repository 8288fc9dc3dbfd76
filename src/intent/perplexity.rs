// Perplexity chat-completions client used for intent parsing and small talk
//
// Every remote failure (transport, status, malformed completion) is logged
// and answered locally by the fallback classifier, so callers never observe
// the service being down.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::cache::IntentCache;
use super::fallback::{classify, fallback_response};
use super::prompts::{library, PromptTemplate};
use super::{Intent, IntentService};
use crate::agents::errors::{AgentError, AgentResult};

/// Chat completions endpoint
pub const PERPLEXITY_API_URL: &str = "https://api.perplexity.ai/chat/completions";

/// Fastest available model
pub const DEFAULT_MODEL: &str = "sonar";

/// Default request timeout in seconds
pub const INTENT_TIMEOUT_SECS_DEFAULT: u64 = 10;

#[derive(Clone)]
pub struct PerplexityConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

// Keep the key out of logs
impl fmt::Debug for PerplexityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerplexityConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

impl PerplexityConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: PERPLEXITY_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(INTENT_TIMEOUT_SECS_DEFAULT),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

pub struct PerplexityClient {
    client: Client,
    config: PerplexityConfig,
    cache: IntentCache,
}

impl PerplexityClient {
    pub fn new(config: PerplexityConfig, cache: IntentCache) -> AgentResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::ConfigError(format!("HTTP client: {}", e)))?;

        info!(config = ?config, "Intent service initialized");
        Ok(Self {
            client,
            config,
            cache,
        })
    }

    async fn complete(
        &self,
        template: &PromptTemplate,
        input: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> AgentResult<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: template.system.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: template.render_input(input),
                },
            ],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(&self.config.base_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ClassificationUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail: String = detail.chars().take(200).collect();
            return Err(AgentError::ClassificationUnavailable(format!(
                "HTTP {}: {}",
                status, detail
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ClassificationUnavailable(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AgentError::ClassificationUnavailable("empty completion".to_string()))
    }

    async fn request_intent(&self, text: &str) -> AgentResult<Intent> {
        let content = self
            .complete(&library::intent_parsing(), text, 0.0, 150)
            .await?;
        debug!(completion = %content, "Intent completion received");
        decode_intent(&content)
    }
}

/// Decode the first JSON object embedded in a completion
///
/// The model sometimes wraps the JSON in prose; everything between the first
/// `{` and the last `}` is taken. An `unknown` action is read as a greeting.
pub fn decode_intent(content: &str) -> AgentResult<Intent> {
    let block = match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => {
            return Err(AgentError::ClassificationUnavailable(
                "no JSON object in completion".to_string(),
            ))
        }
    };

    let mut intent: Intent = serde_json::from_str(block)?;
    if intent.action == "unknown" {
        intent.action = "greeting".to_string();
    }
    Ok(intent)
}

#[async_trait]
impl IntentService for PerplexityClient {
    fn name(&self) -> &'static str {
        "perplexity"
    }

    async fn parse_intent(&self, text: &str) -> Intent {
        if let Some(intent) = self.cache.get(text) {
            debug!("Intent cache hit");
            return intent;
        }

        match self.request_intent(text).await {
            Ok(intent) => {
                self.cache.insert(text, intent.clone());
                intent
            }
            Err(e) => {
                warn!(error = %e, "Intent service failed, falling back to keyword matching");
                classify(text)
            }
        }
    }

    async fn conversational_response(&self, text: &str) -> String {
        match self.complete(&library::conversation(), text, 0.7, 80).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Conversational response failed, using canned reply");
                fallback_response(text).to_string()
            }
        }
    }

    fn cached_intents(&self) -> usize {
        self.cache.len()
    }
}
