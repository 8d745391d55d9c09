//! DeepSeek account balance diagnostic.

use serde::Deserialize;

use crate::error::Result;
use crate::registry::Provider;

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceReport {
    pub is_available: bool,
    #[serde(default)]
    pub balance_infos: Vec<BalanceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceEntry {
    pub currency: String,
    pub total_balance: String,
}

/// Check the DeepSeek account balance. Returns `None` when no credential is
/// set or the endpoint is unreachable; this is a diagnostic, not a hard
/// dependency of any query.
pub async fn deepseek_balance(http: &reqwest::Client) -> Result<Option<BalanceReport>> {
    let Ok(api_key) = std::env::var(Provider::DeepSeek.credential_var()) else {
        return Ok(None);
    };

    let resp = http
        .get(format!("{}/user/balance", Provider::DeepSeek.base_url()))
        .bearer_auth(&api_key)
        .send()
        .await;

    match resp {
        Ok(r) if r.status().is_success() => Ok(Some(r.json().await?)),
        Ok(r) => {
            tracing::debug!(status = r.status().as_u16(), "balance check failed");
            Ok(None)
        }
        Err(e) => {
            tracing::debug!(error = %e, "balance check unreachable");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_parses_wire_shape() {
        let report: BalanceReport = serde_json::from_value(serde_json::json!({
            "is_available": true,
            "balance_infos": [
                {"currency": "USD", "total_balance": "12.48", "granted_balance": "0.00"}
            ]
        }))
        .unwrap();
        assert!(report.is_available);
        assert_eq!(report.balance_infos[0].total_balance, "12.48");
        assert_eq!(report.balance_infos[0].currency, "USD");
    }

    #[test]
    fn missing_balance_infos_defaults_empty() {
        let report: BalanceReport =
            serde_json::from_value(serde_json::json!({"is_available": false})).unwrap();
        assert!(report.balance_infos.is_empty());
    }
}
