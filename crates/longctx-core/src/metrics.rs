use serde::Serialize;

use crate::registry::ModelSpec;

/// Exact cost of a call in nanodollars (1e-9 USD).
///
/// Integer arithmetic end to end: token counts times per-token nanodollar
/// prices. Deterministic given (input_tokens, output_tokens, spec), and
/// monotone non-decreasing in both token counts. Rounding to currency
/// precision happens only in [`format_usd`].
pub fn cost_nanos(input_tokens: u64, output_tokens: u64, spec: &ModelSpec) -> i64 {
    input_tokens as i64 * spec.input_nanos_per_token
        + output_tokens as i64 * spec.output_nanos_per_token
}

/// Render a nanodollar amount as dollars for display.
pub fn format_usd(nanos: i64) -> String {
    format!("${:.4}", nanos as f64 / 1e9)
}

/// Cost divided by latency, a derived comparison metric.
///
/// Undefined when latency is zero; callers must show the flag rather than
/// coerce to zero or infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostEfficiency {
    DollarsPerSecond(f64),
    Undefined,
}

impl CostEfficiency {
    pub fn compute(cost_nanos: i64, latency_s: f64) -> Self {
        if latency_s <= 0.0 {
            Self::Undefined
        } else {
            Self::DollarsPerSecond(cost_nanos as f64 / 1e9 / latency_s)
        }
    }
}

impl std::fmt::Display for CostEfficiency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DollarsPerSecond(v) => write!(f, "${v:.4}/s"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Provider;

    fn spec(input_nanos: i64, output_nanos: i64) -> ModelSpec {
        ModelSpec {
            id: "test".into(),
            display_name: "Test".into(),
            provider: Provider::OpenAi,
            input_nanos_per_token: input_nanos,
            output_nanos_per_token: output_nanos,
            context_window: 128_000,
            base_url: None,
            api_model: None,
        }
    }

    #[test]
    fn zero_tokens_zero_cost() {
        assert_eq!(cost_nanos(0, 0, &spec(2_500, 10_000)), 0);
    }

    #[test]
    fn cost_monotone_in_both_counts() {
        let s = spec(2_500, 10_000);
        let base = cost_nanos(1_000, 1_000, &s);
        assert!(cost_nanos(1_001, 1_000, &s) >= base);
        assert!(cost_nanos(1_000, 1_001, &s) >= base);
        assert!(cost_nanos(2_000, 2_000, &s) >= base);
    }

    #[test]
    fn format_rounds_only_at_presentation() {
        // 140_000_000 nanos is exactly $0.14; no drift from accumulation.
        assert_eq!(format_usd(140_000_000), "$0.1400");
        assert_eq!(format_usd(12_500_000_000), "$12.5000");
        assert_eq!(format_usd(0), "$0.0000");
    }

    #[test]
    fn efficiency_zero_latency_is_undefined() {
        assert_eq!(
            CostEfficiency::compute(1_000_000, 0.0),
            CostEfficiency::Undefined
        );
    }

    #[test]
    fn efficiency_positive_latency() {
        match CostEfficiency::compute(2_000_000_000, 4.0) {
            CostEfficiency::DollarsPerSecond(v) => assert!((v - 0.5).abs() < 1e-12),
            CostEfficiency::Undefined => panic!("should be defined"),
        }
    }
}
