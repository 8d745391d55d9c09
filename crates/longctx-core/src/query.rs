use std::time::{Duration, Instant};

use crate::comparison::{Answer, ComparisonSet, QueryError, QueryResult, TokenSource};
use crate::corpus::Corpus;
use crate::error::Result;
use crate::metrics::cost_nanos;
use crate::providers;
use crate::registry::{ModelSpec, Registry};
use crate::tokenize::count_tokens;

/// Fixed instruction prepended to the document context.
const SYSTEM_INSTRUCTION: &str = "Use the given context to answer the question.\n\
If you don't know the answer, say you don't know. Keep the answer concise.";

/// Runs the comparison loop: one provider call per selected model,
/// sequential, with wall-clock timing and cost accounting per call.
pub struct Executor {
    http: reqwest::Client,
    registry: Registry,
}

impl Executor {
    pub fn new(registry: Registry) -> Self {
        Self {
            // Long-context completions are slow; leave generous room before
            // treating a call as dead.
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(600))
                .build()
                .expect("failed to build HTTP client"),
            registry,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Reproducible prompt layout: context first, then the question as the
    /// user message.
    fn system_prompt(corpus: &Corpus) -> String {
        format!("{SYSTEM_INSTRUCTION}\n\nContext:\n{}", corpus.combined_text)
    }

    /// Query one model. Provider failures come back as data on the result,
    /// never as an `Err`, so the comparison loop tolerates partial failure.
    pub async fn execute(&self, corpus: &Corpus, question: &str, spec: &ModelSpec) -> QueryResult {
        let make = |latency_s: f64, outcome| QueryResult {
            model_id: spec.id.clone(),
            model_name: spec.display_name.clone(),
            question: question.to_string(),
            latency_s,
            outcome,
        };

        let var = spec.provider.credential_var();
        let Ok(api_key) = std::env::var(var) else {
            return make(0.0, Err(QueryError::MissingCredential(var.to_string())));
        };

        let system = Self::system_prompt(corpus);

        tracing::info!(model = %spec.id, provider = %spec.provider, "querying");
        let start = Instant::now();
        let outcome = providers::chat(&self.http, spec, &api_key, &system, question).await;
        let latency_s = start.elapsed().as_secs_f64();

        match outcome {
            Ok(reply) => {
                let (input_tokens, output_tokens, token_source) = match reply.usage {
                    Some(u) => (u.input_tokens, u.output_tokens, TokenSource::Reported),
                    None => {
                        tracing::warn!(
                            model = %spec.id,
                            "no usage metadata in response, falling back to local token estimate"
                        );
                        (
                            (count_tokens(&system) + count_tokens(question)) as u64,
                            count_tokens(&reply.answer) as u64,
                            TokenSource::Estimated,
                        )
                    }
                };
                make(
                    latency_s,
                    Ok(Answer {
                        text: reply.answer,
                        input_tokens,
                        output_tokens,
                        cost_nanos: cost_nanos(input_tokens, output_tokens, spec),
                        token_source,
                    }),
                )
            }
            Err(e) => {
                tracing::warn!(model = %spec.id, error = %e, "query failed");
                make(latency_s, Err(e))
            }
        }
    }

    /// Run one question across the selected models, in order.
    ///
    /// All ids are resolved up front, so an unregistered id aborts before
    /// any network call. After that, each model's failure is recorded and
    /// the loop continues.
    pub async fn run(&self, corpus: &Corpus, question: &str, ids: &[String]) -> Result<ComparisonSet> {
        let specs: Vec<&ModelSpec> = ids
            .iter()
            .map(|id| self.registry.lookup(id))
            .collect::<Result<_>>()?;

        let mut set = ComparisonSet::new(question);
        for spec in specs {
            let result = self.execute(corpus, question, spec).await;
            set.push(result);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;
    use crate::error::LcError;

    fn corpus() -> Corpus {
        Corpus::from_documents(vec![Document {
            name: "a.pdf".into(),
            text: "attention is all you need".into(),
            tokens: 5,
        }])
    }

    #[test]
    fn prompt_puts_context_before_question_slot() {
        let prompt = Executor::system_prompt(&corpus());
        assert!(prompt.starts_with(SYSTEM_INSTRUCTION));
        let ctx = prompt.find("Context:").unwrap();
        let doc = prompt.find("=== Document: a.pdf ===").unwrap();
        assert!(ctx < doc);
    }

    #[tokio::test]
    async fn unknown_model_aborts_before_any_query() {
        let exec = Executor::new(Registry::bundled().unwrap());
        let err = exec
            .run(&corpus(), "q", &["gpt-5".into(), "not-a-model".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, LcError::UnknownModel(id) if id == "not-a-model"));
    }

    #[tokio::test]
    async fn missing_credential_is_a_failed_result_not_an_error() {
        let exec = Executor::new(Registry::bundled().unwrap());
        let spec = exec.registry().lookup("deepseek-chat").unwrap().clone();
        // The variable is only read, never written, by the executor; make
        // sure it is absent for this test.
        std::env::remove_var("DEEPSEEK_API_KEY");
        let result = exec.execute(&corpus(), "q", &spec).await;
        assert!(matches!(
            result.error(),
            Some(QueryError::MissingCredential(var)) if var == "DEEPSEEK_API_KEY"
        ));
        assert!(result.cost_nanos().is_none());
    }
}
