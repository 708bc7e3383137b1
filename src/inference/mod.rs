//! Extraction client: OpenAI-compatible chat-completions API.
//!
//! This module handles all communication with the remote vision model:
//! - Building the multimodal request (system role + name prompt + document URL)
//! - Bearer-authenticated POST with connect and request timeouts
//! - Structural validation of the response envelope
//!
//! The model is addressed by an endpoint id from configuration, so switching
//! models is a config change, not a code change.

pub mod client;
pub mod errors;
pub mod types;

// Re-exports for convenience
pub use client::{ExtractionClient, Extractor};
pub use errors::InferenceError;
pub use types::{ChatCompletionRequest, ChatMessage, ContentPart, Role};
