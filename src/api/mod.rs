//! Wire payloads for the `generateContent` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::constants::NO_RESPONSE_TEXT;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ContentPart {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Content {
    pub role: String,
    pub parts: Vec<ContentPart>,
}

impl Content {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![ContentPart { text: text.into() }],
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// The instruction and the prompt travel as two consecutive user contents.
    pub fn single_turn(system_instruction: &str, prompt: &str) -> Self {
        Self {
            contents: vec![
                Content::user_text(system_instruction),
                Content::user_text(prompt),
            ],
        }
    }
}

/// Pulls the reply out of a `generateContent` response body.
///
/// Only `candidates[0].content.parts[0].text` is read. Any other shape, or an
/// empty text, degrades to [`NO_RESPONSE_TEXT`].
pub fn extract_reply_text(body: &Value) -> String {
    body.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .unwrap_or(NO_RESPONSE_TEXT)
        .to_string()
}
