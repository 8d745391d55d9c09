use std::sync::OnceLock;

use tiktoken_rs::{o200k_base, CoreBPE};

/// Process-wide tokenizer. Building the BPE tables is expensive, so it is
/// done once and shared.
fn bpe() -> &'static CoreBPE {
    static BPE: OnceLock<CoreBPE> = OnceLock::new();
    BPE.get_or_init(|| o200k_base().expect("bundled o200k_base tables should build"))
}

/// Count tokens with a single fixed scheme (o200k_base).
///
/// Every model in a comparison is counted the same way, so corpus sizes and
/// estimated prompts are comparable across providers. Real provider
/// tokenizers differ; this is an accepted approximation, and results carry
/// a [`TokenSource`](crate::comparison::TokenSource) flag whenever an estimate
/// stands in for provider-reported usage.
pub fn count_tokens(text: &str) -> usize {
    bpe().encode_with_special_tokens(text).len()
}
