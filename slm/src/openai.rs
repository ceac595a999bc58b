//! Client for OpenAI-compatible chat completion endpoints (LiteLLM, vLLM,
//! hosted gateways). One user message per request, no streaming.

use crate::generator::{GenerationError, TextGenerator};
use async_trait::async_trait;
use medbrief_core::config::LlmConfig;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [RequestMessage<'a>; 1],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiCompatClient {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    timeout_secs: u64,
}

impl OpenAiCompatClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, GenerationError> {
        let endpoint = completions_url(&config.base_url)?;
        if config.model.trim().is_empty() {
            return Err(GenerationError::Configuration("model name is empty".to_string()));
        }
        if config.accept_invalid_certs {
            warn!(endpoint = %endpoint, "TLS certificate verification disabled");
        }

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| GenerationError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn map_send_error(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            GenerationError::Connection(err.to_string())
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [RequestMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            temperature: self.temperature,
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "sending chat completion");
        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        if !status.is_success() {
            let mut text = response.text().await.unwrap_or_default();
            truncate_at_char_boundary(&mut text, MAX_ERROR_BODY);
            warn!(status = status.as_u16(), "chat completion rejected");
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout {
                    secs: self.timeout_secs,
                }
            } else {
                GenerationError::ResponseParsing(e.to_string())
            }
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        info!(model = %self.model, chars = content.len(), "chat completion received");
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// `{base_url}/chat/completions`, accepting only http(s) URLs without
/// embedded credentials.
fn completions_url(base_url: &str) -> Result<Url, GenerationError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed)
        .map_err(|e| GenerationError::Configuration(format!("invalid base_url {trimmed:?}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(GenerationError::Configuration(format!(
            "base_url must use http or https, got {}",
            parsed.scheme()
        )));
    }
    if !parsed.username().is_empty() || parsed.password().is_some() {
        return Err(GenerationError::Configuration(
            "base_url must not embed credentials; set llm.api_key instead".to_string(),
        ));
    }

    Url::parse(&format!("{trimmed}/chat/completions"))
        .map_err(|e| GenerationError::Configuration(e.to_string()))
}

fn truncate_at_char_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}
