//! Provider wire adapters.
//!
//! Each provider's request/response shapes stay inside its own module and
//! are normalized into [`ChatOutcome`] here, so the metrics side never
//! branches on provider-specific JSON.

pub mod anthropic;
pub mod balance;
pub mod openai;

use crate::comparison::QueryError;
use crate::registry::{ModelSpec, Provider};

/// Token usage as reported by the provider.
#[derive(Debug, Clone, Copy)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Normalized completion: answer text plus usage metadata when the
/// provider supplied it.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub answer: String,
    pub usage: Option<Usage>,
}

/// One blocking completion call for `spec`'s provider.
pub async fn chat(
    http: &reqwest::Client,
    spec: &ModelSpec,
    api_key: &str,
    system: &str,
    question: &str,
) -> Result<ChatOutcome, QueryError> {
    match spec.provider {
        Provider::OpenAi | Provider::DeepSeek => {
            openai::chat_completion(http, spec, api_key, system, question).await
        }
        Provider::Anthropic => anthropic::messages(http, spec, api_key, system, question).await,
    }
}

/// Classify a non-success HTTP response into a [`QueryError`].
pub(crate) fn classify_status(spec: &ModelSpec, status: u16, body: &str) -> QueryError {
    let credential = spec.provider.credential_var().to_string();
    match status {
        401 | 403 => QueryError::Auth(credential),
        402 => QueryError::InsufficientBalance,
        429 => QueryError::RateLimit(truncate(body)),
        400 if looks_like_context_overflow(body) => QueryError::ContextLength(truncate(body)),
        _ if body.contains("Insufficient Balance") => QueryError::InsufficientBalance,
        _ => QueryError::Api {
            status,
            body: truncate(body),
        },
    }
}

pub(crate) fn network_error(e: reqwest::Error) -> QueryError {
    QueryError::Network(e.to_string())
}

fn looks_like_context_overflow(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.contains("context length")
        || lower.contains("context_length")
        || lower.contains("maximum context")
        || lower.contains("prompt is too long")
}

fn truncate(body: &str) -> String {
    const MAX: usize = 300;
    let trimmed = body.trim();
    if trimmed.len() <= MAX {
        trimmed.to_string()
    } else {
        let mut end = MAX;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &trimmed[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    fn spec() -> ModelSpec {
        Registry::bundled().unwrap().lookup("gpt-5").unwrap().clone()
    }

    #[test]
    fn status_classification() {
        let s = spec();
        assert!(matches!(classify_status(&s, 401, ""), QueryError::Auth(_)));
        assert!(matches!(classify_status(&s, 403, ""), QueryError::Auth(_)));
        assert!(matches!(
            classify_status(&s, 402, ""),
            QueryError::InsufficientBalance
        ));
        assert!(matches!(
            classify_status(&s, 429, "slow down"),
            QueryError::RateLimit(_)
        ));
        assert!(matches!(
            classify_status(&s, 400, "This model's maximum context length is 400000 tokens"),
            QueryError::ContextLength(_)
        ));
        assert!(matches!(
            classify_status(&s, 500, "boom"),
            QueryError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn balance_message_in_body_wins_over_generic_api_error() {
        let s = spec();
        assert!(matches!(
            classify_status(&s, 500, "Error: Insufficient Balance"),
            QueryError::InsufficientBalance
        ));
    }

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate("  short  "), "short");
        let long = "x".repeat(500);
        let t = truncate(&long);
        assert!(t.len() < 320);
        assert!(t.ends_with("..."));
    }
}
