//! Monthly finance report.

use botelho_core::Finances;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::fetch::Fetcher;

/// Default finance endpoint.
pub const DEFAULT_FINANCE_URL: &str = "http://beta.lhc.rennerocha.com/status";

/// Wire format: every amount is a decimal string.
#[derive(Debug, Deserialize)]
struct FinanceReport {
    actual_expenses: String,
    actual_incomes: String,
    regular_expenses_estimate: String,
}

fn parse_amount(field: &str, value: &str) -> ProviderResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| ProviderError::decode(format!("{field}: invalid amount {value:?}")).with_source(e))
}

impl FinanceReport {
    fn into_finances(self) -> ProviderResult<Finances> {
        let income = parse_amount("actual_incomes", &self.actual_incomes)?;
        let estimate = parse_amount("regular_expenses_estimate", &self.regular_expenses_estimate)?;
        let actual = parse_amount("actual_expenses", &self.actual_expenses)?;
        Ok(Finances::new(income, actual + estimate))
    }
}

/// Client for the finance endpoint.
#[derive(Debug, Clone)]
pub struct FinanceClient {
    fetcher: Fetcher,
    url: String,
}

impl FinanceClient {
    /// Creates a client for `url`.
    pub fn new(fetcher: Fetcher, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }

    /// Fetches this month's finances.
    pub async fn finances(&self) -> ProviderResult<Finances> {
        let report: FinanceReport = self
            .fetcher
            .get_json(&self.url)
            .await
            .map_err(|e| e.with_provider("finance"))?;
        let finances = report
            .into_finances()
            .map_err(|e| e.with_provider("finance"))?;
        debug!(income = finances.income, expenses = finances.expenses, "finances");
        Ok(finances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::fetch::FetchConfig;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn expenses_include_estimate() {
        let report = FinanceReport {
            actual_expenses: "1200.50".into(),
            actual_incomes: "3000".into(),
            regular_expenses_estimate: "2000.00".into(),
        };
        let finances = report.into_finances().unwrap();
        assert_eq!(finances.income, 3000.0);
        assert_eq!(finances.expenses, 3200.5);
    }

    #[test]
    fn invalid_amount_is_decode_error() {
        let report = FinanceReport {
            actual_expenses: "n/a".into(),
            actual_incomes: "3000".into(),
            regular_expenses_estimate: "2000.00".into(),
        };
        let err = report.into_finances().unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Decode);
        assert!(err.message().contains("actual_expenses"));
    }

    #[tokio::test]
    async fn fetches_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"actual_expenses":"100.00","actual_incomes":"500.25","regular_expenses_estimate":"400.00","extra":1}"#,
            ))
            .mount(&server)
            .await;

        let client = FinanceClient::new(Fetcher::new(&FetchConfig::default()).unwrap(), server.uri());
        let finances = client.finances().await.unwrap();
        assert_eq!(finances, Finances::new(500.25, 500.0));
        assert!(finances.has_positive_cash_flow());
    }
}
