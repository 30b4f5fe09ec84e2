//! The single outbound call to the completion endpoint.

use crate::config::ApiConfig;
use crate::core::credential::Credential;
use crate::core::session::ConversationSession;
use crate::core::settings::Settings;
use crate::error::{self, ApiError, Error};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fallback message when an error response carries no usable message.
pub const GENERIC_FAILURE: &str = "API request failed";

/// Produces the next assistant turn for a conversation.
pub trait CompletionClient: Send + Sync {
    /// Send the whole conversation and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingCredential` without any network activity
    /// when `credential` is `None`; otherwise the classified failure.
    fn complete(
        &self,
        session: &ConversationSession,
        settings: &Settings,
        credential: Option<&Credential>,
    ) -> Result<String, ApiError>;
}

/// Request body of the chat completions endpoint.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Build the request body carrying the full conversation history.
#[must_use]
pub fn build_request<'a>(session: &'a ConversationSession, settings: &'a Settings) -> ChatRequest<'a> {
    ChatRequest {
        model: &settings.model,
        messages: session
            .turns()
            .iter()
            .map(|t| WireMessage {
                role: t.role.as_str(),
                content: &t.content,
            })
            .collect(),
        temperature: settings.temperature,
        max_tokens: settings.max_tokens,
        stream: false,
    }
}

/// Extract `error.message` from an error body, or the generic fallback.
#[must_use]
pub fn remote_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

/// Extract `choices[0].message.content` from a success body.
///
/// # Errors
///
/// Returns `ApiError::MalformedResponse` if the body is not JSON or has no
/// first choice with text content.
pub fn parse_reply(body: &str) -> Result<String, ApiError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::MalformedResponse("no choices in response".to_string()))?;

    choice
        .message
        .and_then(|m| m.content)
        .ok_or_else(|| ApiError::MalformedResponse("first choice has no content".to_string()))
}

/// Completion client speaking the OpenAI-compatible chat protocol over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    endpoint: String,
    client: Client,
}

impl HttpCompletionClient {
    /// Create a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the TLS backend cannot be initialized.
    pub fn new(config: &ApiConfig) -> error::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(
        &self,
        session: &ConversationSession,
        settings: &Settings,
        credential: Option<&Credential>,
    ) -> Result<String, ApiError> {
        let credential = credential.ok_or(ApiError::MissingCredential)?;
        let body = build_request(session, settings);

        tracing::debug!(
            endpoint = %self.endpoint,
            model = %settings.model,
            turns = body.messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .map_err(|e| ApiError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| ApiError::Transport(e.without_url().to_string()))?;

        if !status.is_success() {
            tracing::debug!(%status, "completion request rejected");
            return Err(ApiError::Remote(remote_error_message(&text)));
        }

        parse_reply(&text)
    }
}
