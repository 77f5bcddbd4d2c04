use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::error::{InvoiceError, Result};
use crate::core::rates::{ExchangeRateProvider, RateQuery};

/// Client for exchangeratesapi.io style historical rate endpoints.
pub struct ExchangeRatesApiProvider {
    base_url: String,
}

impl ExchangeRatesApiProvider {
    pub fn new(base_url: &str) -> Self {
        ExchangeRatesApiProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: Option<HashMap<String, f64>>,
    error: Option<Value>,
}

// The service reports errors either as a bare string or as an object.
fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("info")
            .or_else(|| fields.get("message"))
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_string),
        other => other.to_string(),
    }
}

#[async_trait]
impl ExchangeRateProvider for ExchangeRatesApiProvider {
    #[instrument(
        name = "ExchangeRatesFetch",
        skip(self, query),
        fields(base = %query.base_currency, symbols = %query.symbols())
    )]
    async fn fetch_rates(&self, query: &RateQuery) -> Result<HashMap<String, f64>> {
        let url = query.to_url(&self.base_url);
        debug!("Requesting exchange rates from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("fxinvoice/0.1")
            .build()
            .map_err(|e| InvoiceError::RateService(e.to_string()))?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| InvoiceError::RateService(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| InvoiceError::RateService(e.to_string()))?;
        debug!(%status, body = %text, "Received rates response");

        let payload = serde_json::from_str::<RatesResponse>(&text);

        if !status.is_success() {
            if let Ok(RatesResponse {
                error: Some(error), ..
            }) = &payload
            {
                return Err(InvoiceError::RateService(error_message(error)));
            }
            return Err(InvoiceError::RateService(format!(
                "Request failed with status code {}",
                status.as_u16()
            )));
        }

        let payload = payload.map_err(|e| {
            InvoiceError::RateService(format!("Failed to parse rates response: {e}"))
        })?;

        if let Some(error) = &payload.error {
            return Err(InvoiceError::RateService(error_message(error)));
        }

        payload
            .rates
            .ok_or_else(|| InvoiceError::RateService("No rates found in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn usd_eur_query() -> RateQuery {
        RateQuery {
            date: "2020/08/05".to_string(),
            base_currency: "AUD".to_string(),
            currencies: vec!["USD".to_string(), "EUR".to_string()],
        }
    }

    async fn create_mock_server(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/2020/08/05"))
            .and(query_param("base", "AUD"))
            .and(query_param("symbols", "USD,EUR"))
            .respond_with(template)
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "rates": { "USD": 0.6541, "EUR": 0.9 },
            "base": "AUD",
            "date": "2020-08-05"
        }"#;
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(mock_response)).await;

        let provider = ExchangeRatesApiProvider::new(&mock_server.uri());
        let rates = provider.fetch_rates(&usd_eur_query()).await.unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates["USD"], 0.6541);
        assert_eq!(rates["EUR"], 0.9);
    }

    #[tokio::test]
    async fn test_structured_error_is_passed_through() {
        let mock_response = r#"{"error": "Symbols 'USD,EUR' are invalid for date 2020-08-05."}"#;
        let mock_server =
            create_mock_server(ResponseTemplate::new(400).set_body_string(mock_response)).await;

        let provider = ExchangeRatesApiProvider::new(&mock_server.uri());
        let err = provider.fetch_rates(&usd_eur_query()).await.unwrap_err();
        assert!(matches!(err, InvoiceError::RateService(_)));
        assert_eq!(
            err.to_string(),
            "Symbols 'USD,EUR' are invalid for date 2020-08-05."
        );
    }

    #[tokio::test]
    async fn test_object_error_uses_info() {
        let mock_response =
            r#"{"success": false, "error": {"code": 101, "info": "You have not supplied an API Access Key."}}"#;
        let mock_server =
            create_mock_server(ResponseTemplate::new(401).set_body_string(mock_response)).await;

        let provider = ExchangeRatesApiProvider::new(&mock_server.uri());
        let err = provider.fetch_rates(&usd_eur_query()).await.unwrap_err();
        assert_eq!(err.to_string(), "You have not supplied an API Access Key.");
    }

    #[tokio::test]
    async fn test_unstructured_error_reports_status() {
        let mock_server = create_mock_server(ResponseTemplate::new(500)).await;

        let provider = ExchangeRatesApiProvider::new(&mock_server.uri());
        let err = provider.fetch_rates(&usd_eur_query()).await.unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status code 500");
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string("not json")).await;

        let provider = ExchangeRatesApiProvider::new(&mock_server.uri());
        let err = provider.fetch_rates(&usd_eur_query()).await.unwrap_err();
        assert!(
            err.to_string()
                .starts_with("Failed to parse rates response")
        );
    }

    #[tokio::test]
    async fn test_success_body_without_rates() {
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(r#"{"base": "AUD"}"#))
                .await;

        let provider = ExchangeRatesApiProvider::new(&mock_server.uri());
        let err = provider.fetch_rates(&usd_eur_query()).await.unwrap_err();
        assert_eq!(err.to_string(), "No rates found in response");
    }

    #[tokio::test]
    async fn test_transport_failure() {
        // Nothing listens on the discard port.
        let provider = ExchangeRatesApiProvider::new("http://127.0.0.1:9");
        let err = provider.fetch_rates(&usd_eur_query()).await.unwrap_err();
        assert!(matches!(err, InvoiceError::RateService(_)));
    }

    #[test]
    fn test_error_message_fallback() {
        assert_eq!(error_message(&serde_json::json!(42)), "42");
        assert_eq!(
            error_message(&serde_json::json!({"message": "bad base"})),
            "bad base"
        );
    }
}
