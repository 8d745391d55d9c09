//! Anthropic Messages API adapter.

use serde::{Deserialize, Serialize};

use super::{classify_status, network_error, ChatOutcome, Usage};
use crate::comparison::QueryError;
use crate::registry::ModelSpec;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Option<MessagesUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessagesUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Normalize a parsed response body: concatenate text blocks, lift usage.
pub fn normalize(resp: MessagesResponse) -> Result<ChatOutcome, QueryError> {
    let answer: String = resp
        .content
        .iter()
        .filter(|b| b.block_type == "text")
        .filter_map(|b| b.text.as_deref())
        .collect::<Vec<_>>()
        .join("");
    if answer.is_empty() {
        return Err(QueryError::Api {
            status: 200,
            body: "response had no text content".into(),
        });
    }
    let usage = resp.usage.map(|u| Usage {
        input_tokens: u.input_tokens,
        output_tokens: u.output_tokens,
    });
    Ok(ChatOutcome { answer, usage })
}

pub async fn messages(
    http: &reqwest::Client,
    spec: &ModelSpec,
    api_key: &str,
    system: &str,
    question: &str,
) -> Result<ChatOutcome, QueryError> {
    let url = format!("{}/v1/messages", spec.endpoint().trim_end_matches('/'));
    let request = MessagesRequest {
        model: spec.api_model(),
        max_tokens: MAX_TOKENS,
        system,
        messages: vec![Message {
            role: "user",
            content: question,
        }],
        temperature: 0.0,
    };

    let resp = http
        .post(&url)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .json(&request)
        .send()
        .await
        .map_err(network_error)?;

    let status = resp.status().as_u16();
    if !resp.status().is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(classify_status(spec, status, &body));
    }

    let parsed: MessagesResponse = resp.json().await.map_err(network_error)?;
    normalize(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_joins_text_blocks_and_lifts_usage() {
        let resp: MessagesResponse = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "text", "text": "part one, "},
                {"type": "tool_use", "id": "t1", "name": "noop"},
                {"type": "text", "text": "part two"}
            ],
            "usage": {"input_tokens": 95000, "output_tokens": 120}
        }))
        .unwrap();
        let out = normalize(resp).unwrap();
        assert_eq!(out.answer, "part one, part two");
        let usage = out.usage.unwrap();
        assert_eq!(usage.input_tokens, 95_000);
        assert_eq!(usage.output_tokens, 120);
    }

    #[test]
    fn normalize_empty_content_is_api_error() {
        let resp: MessagesResponse =
            serde_json::from_value(serde_json::json!({"content": []})).unwrap();
        assert!(matches!(normalize(resp), Err(QueryError::Api { .. })));
    }
}
