//! OpenAI-compatible chat completions, used for OpenAI itself and for
//! DeepSeek (same wire format, different base URL).

use serde::{Deserialize, Serialize};

use super::{classify_status, network_error, ChatOutcome, Usage};
use crate::comparison::QueryError;
use crate::registry::ModelSpec;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Normalize a parsed response body.
pub fn normalize(resp: ChatResponse) -> Result<ChatOutcome, QueryError> {
    let answer = resp
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(QueryError::Api {
            status: 200,
            body: "response had no choices".into(),
        })?;
    let usage = resp.usage.map(|u| Usage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    });
    Ok(ChatOutcome { answer, usage })
}

pub async fn chat_completion(
    http: &reqwest::Client,
    spec: &ModelSpec,
    api_key: &str,
    system: &str,
    question: &str,
) -> Result<ChatOutcome, QueryError> {
    let url = format!("{}/chat/completions", spec.endpoint().trim_end_matches('/'));
    let request = ChatRequest {
        model: spec.api_model(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: question,
            },
        ],
        temperature: 0.0,
    };

    let resp = http
        .post(&url)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await
        .map_err(network_error)?;

    let status = resp.status().as_u16();
    if !resp.status().is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(classify_status(spec, status, &body));
    }

    let parsed: ChatResponse = resp.json().await.map_err(network_error)?;
    normalize(parsed)
}
