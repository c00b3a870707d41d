use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::api::{extract_reply_text, GenerateContentRequest};
use crate::core::message::Turn;
use crate::utils::url::generate_content_url;

/// Why a completion round trip produced no reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// The request never got an HTTP response (DNS, connect, TLS, reset).
    NetworkFailure(String),
    /// The provider answered with a failure status or an unreadable body.
    ProviderError { status: Option<u16>, message: String },
    /// No answer arrived within the configured bound.
    Timeout(Duration),
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::NetworkFailure(detail) => write!(f, "Network failure: {detail}"),
            CompletionError::ProviderError {
                status: Some(status),
                message,
            } => write!(f, "Provider error ({status}): {message}"),
            CompletionError::ProviderError {
                status: None,
                message,
            } => write!(f, "Provider error: {message}"),
            CompletionError::Timeout(after) => {
                write!(f, "Timed out after {:.1}s", after.as_secs_f64())
            }
        }
    }
}

impl StdError for CompletionError {}

/// Source of assistant replies.
///
/// `history` holds every turn that precedes the prompt. Implementations are
/// free to ignore it.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str, history: &[Turn]) -> Result<String, CompletionError>;
}

/// The provider credential. Its value never shows up in `Debug` output.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    pub model: String,
    pub system_instruction: String,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
}

/// Single-turn client for the `generateContent` endpoint.
///
/// Each call sends the system instruction followed by the prompt. Earlier
/// turns are not transmitted, so the model has no memory of the conversation.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: ApiKey,
    system_instruction: String,
    timeout: Option<Duration>,
}

impl GeminiClient {
    pub fn new(api_key: ApiKey, settings: GeminiSettings) -> Self {
        Self::with_http_client(reqwest::Client::new(), api_key, settings)
    }

    pub fn with_http_client(
        http: reqwest::Client,
        api_key: ApiKey,
        settings: GeminiSettings,
    ) -> Self {
        Self {
            http,
            endpoint: generate_content_url(&settings.base_url, &settings.model),
            api_key,
            system_instruction: settings.system_instruction,
            timeout: settings.timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = GenerateContentRequest::single_turn(&self.system_instruction, prompt);

        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        let status = response.status();
        debug!(status = status.as_u16(), "Completion response received");

        let body = response
            .text()
            .await
            .map_err(|err| self.transport_error(err))?;

        if !status.is_success() {
            return Err(CompletionError::ProviderError {
                status: Some(status.as_u16()),
                message: summarize_error_body(&body),
            });
        }

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|err| CompletionError::ProviderError {
                status: Some(status.as_u16()),
                message: format!("malformed response body: {err}"),
            })?;

        Ok(extract_reply_text(&value))
    }

    fn transport_error(&self, err: reqwest::Error) -> CompletionError {
        // reqwest error text can include the request URL; it never includes
        // headers, so the key stays out of it.
        if err.is_timeout() {
            CompletionError::Timeout(self.timeout.unwrap_or_default())
        } else if err.is_decode() || err.is_body() {
            CompletionError::ProviderError {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        } else {
            CompletionError::NetworkFailure(err.to_string())
        }
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str, history: &[Turn]) -> Result<String, CompletionError> {
        debug!(
            prompt_chars = prompt.chars().count(),
            history_turns = history.len(),
            "Sending completion request"
        );

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, self.send(prompt)).await {
                Ok(result) => result,
                Err(_) => Err(CompletionError::Timeout(limit)),
            },
            None => self.send(prompt).await,
        };

        if let Err(err) = &result {
            warn!(error = %err, "Completion request failed");
        }
        result
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .or_else(|| value.get("error").and_then(|v| v.as_str()))
        .or_else(|| value.get("message").and_then(|v| v.as_str()))?;

    let collapsed = summary.split_whitespace().collect::<Vec<_>>().join(" ");
    Some(collapsed)
}

/// One-line description of a failure body, preferring the provider's own
/// `error.message`.
pub(crate) fn summarize_error_body(body: &str) -> String {
    const MAX_CHARS: usize = 200;

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&value).filter(|s| !s.is_empty()) {
            return summary;
        }
    }

    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_CHARS {
        let cut: String = collapsed.chars().take(MAX_CHARS).collect();
        format!("{cut}…")
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests;
