//! Wire types for the chat-completions API.
//!
//! Request types cover the multimodal subset the extraction call uses: a
//! plain-text system message and a user message made of content parts.
//! Response types make every level optional so that a missing path becomes
//! a typed error instead of a deserialization failure.

use serde::{Deserialize, Serialize};

// ─── Request Types ───────────────────────────────────────────────────────────

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One content part of a multimodal user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// Reference to a fetchable image or document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Message content: a bare string or an ordered list of parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }
}

/// Request body for `POST {base_url}/chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

// ─── Response Types ──────────────────────────────────────────────────────────

/// Response envelope: either an `error` object or a `choices` list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub error: Option<ApiError>,
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
}

/// Service-reported error object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: Option<String>,
    /// Service-specific code, string or number. Logged, never shown.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_to_wire_shape() {
        let req = ChatCompletionRequest {
            model: "ep-1".into(),
            messages: vec![
                ChatMessage::system("role"),
                ChatMessage::user_parts(vec![
                    ContentPart::Text { text: "who".into() },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "https://files/1.pdf".into(),
                        },
                    },
                ]),
            ],
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "ep-1",
                "messages": [
                    {"role": "system", "content": "role"},
                    {"role": "user", "content": [
                        {"type": "text", "text": "who"},
                        {"type": "image_url", "image_url": {"url": "https://files/1.pdf"}}
                    ]}
                ]
            })
        );
    }

    #[test]
    fn test_response_tolerates_missing_levels() {
        let resp: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[{}]}"#).unwrap();
        let choices = resp.choices.unwrap();
        assert!(choices[0].message.is_none());

        let resp: ChatCompletionResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(resp.choices.is_none());
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_error_code_may_be_string_or_number() {
        let resp: ChatCompletionResponse =
            serde_json::from_str(r#"{"error":{"message":"m","code":401}}"#).unwrap();
        assert_eq!(resp.error.unwrap().code, Some(json!(401)));
        let resp: ChatCompletionResponse =
            serde_json::from_str(r#"{"error":{"message":"m","code":"AuthenticationError"}}"#)
                .unwrap();
        assert_eq!(resp.error.unwrap().code, Some(json!("AuthenticationError")));
    }
}
