use longctx_core::metrics::{cost_nanos, format_usd, CostEfficiency};
use longctx_core::registry::Registry;

#[test]
fn gpt5_one_million_each_way_is_12_50() {
    let reg = Registry::bundled().unwrap();
    let spec = reg.lookup("gpt-5").unwrap();
    let cost = cost_nanos(1_000_000, 1_000_000, spec);
    // $2.50 input + $10.00 output, exact in nanodollars.
    assert_eq!(cost, 12_500_000_000);
    assert_eq!(format_usd(cost), "$12.5000");
}

#[test]
fn deepseek_v32_half_million_input_is_0_14() {
    let reg = Registry::bundled().unwrap();
    let spec = reg.lookup("deepseek-chat").unwrap();
    let cost = cost_nanos(500_000, 0, spec);
    assert_eq!(cost, 140_000_000);
    assert_eq!(format_usd(cost), "$0.1400");
}

#[test]
fn claude_sonnet_prices_exact() {
    let reg = Registry::bundled().unwrap();
    let spec = reg.lookup("claude-sonnet-4-5-20250929").unwrap();
    assert_eq!(spec.input_nanos_per_token, 3_000);
    assert_eq!(spec.output_nanos_per_token, 15_000);
    assert_eq!(cost_nanos(1_000_000, 1_000_000, spec), 18_000_000_000);
}

#[test]
fn cost_monotone_over_token_grid() {
    let reg = Registry::bundled().unwrap();
    for spec in reg.models() {
        let counts = [0u64, 1, 999, 1_000, 500_000, 1_000_000];
        for window in counts.windows(2) {
            let (lo, hi) = (window[0], window[1]);
            assert!(
                cost_nanos(hi, 0, spec) >= cost_nanos(lo, 0, spec),
                "{}: input cost must not decrease",
                spec.id
            );
            assert!(
                cost_nanos(0, hi, spec) >= cost_nanos(0, lo, spec),
                "{}: output cost must not decrease",
                spec.id
            );
        }
        assert!(cost_nanos(1_000_000, 1_000_000, spec) >= 0);
    }
}

#[test]
fn zero_latency_with_positive_cost_is_flagged_undefined() {
    let eff = CostEfficiency::compute(140_000_000, 0.0);
    assert_eq!(eff, CostEfficiency::Undefined);
    assert_eq!(eff.to_string(), "undefined");
}

#[test]
fn efficiency_is_finite_for_positive_latency() {
    match CostEfficiency::compute(12_500_000_000, 25.0) {
        CostEfficiency::DollarsPerSecond(v) => {
            assert!(v.is_finite());
            assert!((v - 0.5).abs() < 1e-12);
        }
        CostEfficiency::Undefined => panic!("should be defined"),
    }
}
