use serde::Serialize;

use crate::metrics::CostEfficiency;

/// Where a result's token counts came from.
///
/// Provider-reported usage metadata is the source of truth; the local
/// tokenizer estimate is a flagged fallback, never silently mixed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    Reported,
    Estimated,
}

/// Classified per-model failure, recorded as data inside the comparison
/// loop. Failures never abort sibling model queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum QueryError {
    #[error("no API key: set ${0}")]
    MissingCredential(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("invalid API key: check ${0}")]
    Auth(String),

    #[error("rate limited: {0}")]
    RateLimit(String),

    #[error("insufficient balance: add credits to your provider account")]
    InsufficientBalance,

    #[error("context length exceeded: {0}")]
    ContextLength(String),

    #[error("provider error (HTTP {status}): {body}")]
    Api { status: u16, body: String },
}

/// Successful completion with its accounting.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_nanos: i64,
    pub token_source: TokenSource,
}

/// One (model, question) invocation. Created once, never mutated.
///
/// The outcome is a tagged variant, so a result either has an answer with
/// token counts and a cost, or a classified error and neither. Failed calls
/// contribute no cost.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub model_id: String,
    pub model_name: String,
    pub question: String,
    /// Wall-clock seconds from just before the provider call to the full
    /// response (or the failure).
    pub latency_s: f64,
    pub outcome: Result<Answer, QueryError>,
}

impl QueryResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn answer(&self) -> Option<&Answer> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&QueryError> {
        self.outcome.as_ref().err()
    }

    pub fn cost_nanos(&self) -> Option<i64> {
        self.answer().map(|a| a.cost_nanos)
    }

    pub fn total_tokens(&self) -> Option<u64> {
        self.answer().map(|a| a.input_tokens + a.output_tokens)
    }

    pub fn cost_efficiency(&self) -> Option<CostEfficiency> {
        self.answer()
            .map(|a| CostEfficiency::compute(a.cost_nanos, self.latency_s))
    }
}

/// Ordered results for one question across the selected models.
///
/// Entries keep invocation order; nothing is deduplicated, so querying the
/// same model twice leaves two entries.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSet {
    pub question: String,
    pub results: Vec<QueryResult>,
}

impl ComparisonSet {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            results: Vec::new(),
        }
    }

    /// Append a result. All entries must share the set's question.
    pub fn push(&mut self, result: QueryResult) {
        debug_assert_eq!(result.question, self.question);
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &QueryResult> {
        self.results.iter().filter(|r| r.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &QueryResult> {
        self.results.iter().filter(|r| !r.is_ok())
    }

    /// Total cost across successful results.
    pub fn total_cost_nanos(&self) -> i64 {
        self.succeeded().filter_map(|r| r.cost_nanos()).sum()
    }

    /// Cheapest successful result.
    pub fn cheapest(&self) -> Option<&QueryResult> {
        self.succeeded().min_by_key(|r| r.cost_nanos())
    }

    /// Fastest successful result.
    pub fn fastest(&self) -> Option<&QueryResult> {
        self.succeeded().min_by(|a, b| {
            a.latency_s
                .partial_cmp(&b.latency_s)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn ok_result(model: &str, question: &str, cost_nanos: i64, latency_s: f64) -> QueryResult {
        QueryResult {
            model_id: model.into(),
            model_name: model.to_uppercase(),
            question: question.into(),
            latency_s,
            outcome: Ok(Answer {
                text: "an answer".into(),
                input_tokens: 1_000,
                output_tokens: 100,
                cost_nanos,
                token_source: TokenSource::Reported,
            }),
        }
    }

    #[test]
    fn cheapest_and_fastest_skip_failures() {
        let mut set = ComparisonSet::new("q");
        set.push(ok_result("slow-cheap", "q", 100, 9.0));
        set.push(QueryResult {
            model_id: "broken".into(),
            model_name: "Broken".into(),
            question: "q".into(),
            latency_s: 0.1,
            outcome: Err(QueryError::RateLimit("429".into())),
        });
        set.push(ok_result("fast-pricey", "q", 5_000, 0.5));

        assert_eq!(set.cheapest().unwrap().model_id, "slow-cheap");
        assert_eq!(set.fastest().unwrap().model_id, "fast-pricey");
        assert_eq!(set.total_cost_nanos(), 5_100);
    }

    #[test]
    fn duplicate_model_keeps_both_entries() {
        let mut set = ComparisonSet::new("q");
        set.push(ok_result("m", "q", 1, 1.0));
        set.push(ok_result("m", "q", 2, 1.0));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn failed_result_has_no_cost_or_tokens() {
        let r = QueryResult {
            model_id: "m".into(),
            model_name: "M".into(),
            question: "q".into(),
            latency_s: 1.2,
            outcome: Err(QueryError::MissingCredential("OPENAI_API_KEY".into())),
        };
        assert!(r.cost_nanos().is_none());
        assert!(r.total_tokens().is_none());
        assert!(r.cost_efficiency().is_none());
        assert!(r.error().is_some());
    }
}
