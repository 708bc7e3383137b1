//! Chat-completions client for document identifier extraction.
//!
//! Sends one multimodal request per extraction: the fixed system instruction
//! plus a user turn carrying the subject's name and the document URL. The
//! answer is `choices[0].message.content`, trimmed and returned verbatim.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use super::errors::InferenceError;
use super::types::{
    ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart, ImageUrl,
};
use crate::config::ModelConfig;
use crate::messages::Locale;

// ─── Extractor ───────────────────────────────────────────────────────────────

/// Anything that can turn `(name, document URL)` into an answer string.
///
/// The workflow depends on this trait rather than on the HTTP client so the
/// remote call can be replaced in tests.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, name: &str, document_url: &str) -> Result<String, InferenceError>;
}

// ─── ExtractionClient ────────────────────────────────────────────────────────

/// HTTP client for the remote extraction model.
pub struct ExtractionClient {
    http: HttpClient,
    url: String,
    api_key: String,
    model: String,
    locale: Locale,
    timeout: Duration,
}

impl ExtractionClient {
    /// Create a client from the model configuration.
    ///
    /// Does NOT check connectivity; that happens on the first request.
    pub fn from_config(model: &ModelConfig, locale: Locale) -> Result<Self, InferenceError> {
        let http = HttpClient::builder()
            .connect_timeout(model.connect_timeout())
            .timeout(model.request_timeout())
            .build()
            .map_err(|e| InferenceError::ConfigError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self::with_http_client(model, locale, http))
    }

    /// Create a client around a pre-built HTTP client.
    pub fn with_http_client(model: &ModelConfig, locale: Locale, http: HttpClient) -> Self {
        Self {
            http,
            url: model.completions_url(),
            api_key: model.api_key.clone(),
            model: model.endpoint_id.clone(),
            locale,
            timeout: model.request_timeout(),
        }
    }

    /// The chat-completions URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.url
    }

    pub fn build_request(&self, name: &str, document_url: &str) -> ChatCompletionRequest {
        build_extraction_request(&self.model, self.locale, name, document_url)
    }

    fn map_send_error(&self, e: reqwest::Error) -> InferenceError {
        if e.is_timeout() {
            InferenceError::Timeout {
                duration_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            InferenceError::ConnectionFailed {
                endpoint: self.url.clone(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl Extractor for ExtractionClient {
    async fn extract(&self, name: &str, document_url: &str) -> Result<String, InferenceError> {
        let body = self.build_request(name, document_url);

        // The document URL is a short-lived credential and the model id is a
        // deployment secret; neither is logged.
        tracing::info!(
            url = %self.url,
            message_count = body.messages.len(),
            name_chars = name.chars().count(),
            "=== EXTRACTION REQUEST ==="
        );

        let started = Instant::now();
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body_text = response.text().await.map_err(|e| self.map_send_error(e))?;

        tracing::info!(
            status = status.as_u16(),
            latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            body_len = body_text.len(),
            "=== EXTRACTION RESPONSE ==="
        );

        parse_response_with_status(status.as_u16(), &body_text)
    }
}

// ─── Request building ────────────────────────────────────────────────────────

/// Build the extraction request: system instruction, then a user turn made of
/// the name-bearing instruction followed by the document reference.
pub fn build_extraction_request(
    model: &str,
    locale: Locale,
    name: &str,
    document_url: &str,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(locale.system_prompt()),
            ChatMessage::user_parts(vec![
                ContentPart::Text {
                    text: locale.user_prompt(name),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: document_url.to_string(),
                    },
                },
            ]),
        ],
    }
}

// ─── Response parsing ────────────────────────────────────────────────────────

/// Parse a response body received with the given HTTP status.
///
/// An `error` object wins regardless of status. A non-2xx response without
/// one becomes `HttpError`.
pub fn parse_response_with_status(status: u16, body: &str) -> Result<String, InferenceError> {
    if (200..300).contains(&status) {
        return parse_extraction_response(body);
    }
    match serde_json::from_str::<ChatCompletionResponse>(body) {
        Ok(ChatCompletionResponse {
            error: Some(error), ..
        }) => Err(remote_error(error)),
        _ => Err(InferenceError::HttpError {
            status,
            body: body.to_string(),
        }),
    }
}

/// Extract the trimmed answer from a chat-completions envelope.
pub fn parse_extraction_response(body: &str) -> Result<String, InferenceError> {
    let resp: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| InferenceError::MalformedResponse {
            reason: format!("response is not valid JSON: {e}"),
        })?;

    if let Some(error) = resp.error {
        return Err(remote_error(error));
    }

    let choices = resp.choices.ok_or(InferenceError::MalformedResponse {
        reason: "missing choices".into(),
    })?;
    let choice = choices.into_iter().next().ok_or(InferenceError::MalformedResponse {
        reason: "empty choices array".into(),
    })?;
    tracing::debug!(
        finish_reason = choice.finish_reason.as_deref().unwrap_or("none"),
        "extraction answer received"
    );
    let content = choice
        .message
        .and_then(|m| m.content)
        .ok_or(InferenceError::MalformedResponse {
            reason: "missing choices[0].message.content".into(),
        })?;

    Ok(content.trim().to_string())
}

fn remote_error(error: ApiError) -> InferenceError {
    tracing::warn!(code = ?error.code, "service returned an error object");
    InferenceError::RemoteError {
        message: error
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "unknown remote error".to_string()),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
