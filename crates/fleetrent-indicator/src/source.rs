//! # Indicator Source
//!
//! One lookup for one date. The backward scan lives in the resolver; a
//! source only answers "what was published for exactly this date".
//!
//! ## Wire Format
//! ```text
//! GET {base_url}/{code}/{DD-MM-YYYY}
//!
//! 200 {"codigo": "uf", "serie": [{"fecha": "2025-01-03T03:00:00.000Z", "valor": 38416.69}]}
//!       → Ok(Some(quote dated 2025-01-03))
//! 200 {"codigo": "uf", "serie": []}          → Ok(None)   weekend / holiday
//! 200 {"codigo": "uf"}                       → Ok(None)
//! 200 <anything else>                        → MalformedPayload
//! 5xx / 4xx                                  → ServerError(status)
//! connect refused / reset / DNS              → ConnectionFailure
//! no answer within timeout                   → Timeout
//! ```

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use fleetrent_core::validation::{format_indicator_date, ISO_DATE_FORMAT};
use fleetrent_core::{IndicatorError, IndicatorQuote, IndicatorResult};

use crate::config::{ConfigError, IndicatorConfig};

const USER_AGENT: &str = concat!("fleetrent/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Source Trait
// =============================================================================

/// A single-date indicator lookup.
///
/// `Ok(None)` means the source answered well-formed but has no data point
/// for that date. Every `Err` means the scan must stop.
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    async fn fetch(&self, code: &str, date: NaiveDate) -> IndicatorResult<Option<IndicatorQuote>>;
}

// =============================================================================
// HTTP Source
// =============================================================================

/// Indicator source backed by a JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpIndicatorSource {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpIndicatorSource {
    /// Creates a source with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Creates a source from the `[indicator]` config section.
    pub fn from_config(config: &IndicatorConfig) -> Result<Self, ConfigError> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    /// Request URL for a code and date.
    pub fn url_for(&self, code: &str, date: NaiveDate) -> String {
        format!("{}/{}/{}", self.base_url, code, format_indicator_date(date))
    }

    fn classify(&self, err: reqwest::Error) -> IndicatorError {
        if err.is_timeout() {
            IndicatorError::Timeout {
                after: self.timeout,
            }
        } else if err.is_decode() {
            IndicatorError::MalformedPayload(err.to_string())
        } else {
            IndicatorError::ConnectionFailure(err.to_string())
        }
    }
}

#[async_trait]
impl IndicatorSource for HttpIndicatorSource {
    async fn fetch(&self, code: &str, date: NaiveDate) -> IndicatorResult<Option<IndicatorQuote>> {
        let url = self.url_for(code, date);
        debug!(url = %url, "Requesting indicator value");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndicatorError::ServerError {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        parse_payload(&body, code)
    }
}

// =============================================================================
// Payload Parsing
// =============================================================================

#[derive(Debug, Deserialize)]
struct IndicatorPayload {
    #[serde(default)]
    codigo: Option<String>,
    #[serde(default)]
    serie: Option<Vec<SeriesPoint>>,
}

#[derive(Debug, Deserialize)]
struct SeriesPoint {
    fecha: String,
    valor: serde_json::Number,
}

/// Parses a response body into the first published data point.
///
/// `code` is used when the payload does not name its own indicator.
pub fn parse_payload(body: &str, code: &str) -> IndicatorResult<Option<IndicatorQuote>> {
    let payload: IndicatorPayload = serde_json::from_str(body)
        .map_err(|e| IndicatorError::MalformedPayload(e.to_string()))?;

    let Some(point) = payload.serie.and_then(|serie| serie.into_iter().next()) else {
        return Ok(None);
    };

    let date = parse_fecha(&point.fecha)?;
    let value = parse_valor(&point.valor)?;
    let quote_code = payload.codigo.unwrap_or_else(|| code.to_string());

    IndicatorQuote::new(quote_code, date, value)
        .map(Some)
        .map_err(|e| IndicatorError::MalformedPayload(e.to_string()))
}

/// `fecha` is an ISO-8601 timestamp; its UTC calendar date is the quote date.
/// A bare `YYYY-MM-DD` is accepted too.
fn parse_fecha(fecha: &str) -> IndicatorResult<NaiveDate> {
    DateTime::parse_from_rfc3339(fecha)
        .map(|ts| ts.with_timezone(&Utc).date_naive())
        .or_else(|_| NaiveDate::parse_from_str(fecha, ISO_DATE_FORMAT))
        .map_err(|e| IndicatorError::MalformedPayload(format!("bad fecha '{}': {}", fecha, e)))
}

fn parse_valor(valor: &serde_json::Number) -> IndicatorResult<Decimal> {
    let raw = valor.to_string();
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|e| IndicatorError::MalformedPayload(format!("bad valor '{}': {}", raw, e)))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn source(server: &MockServer) -> HttpIndicatorSource {
        HttpIndicatorSource::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    // -------------------------------------------------------------------------
    // parse_payload
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_first_point() {
        let body = r#"{
            "version": "1.7.0",
            "codigo": "uf",
            "nombre": "Unidad de fomento (UF)",
            "unidad_medida": "Pesos",
            "serie": [
                {"fecha": "2025-01-03T03:00:00.000Z", "valor": 38416.69},
                {"fecha": "2025-01-02T03:00:00.000Z", "valor": 38410.00}
            ]
        }"#;
        let quote = parse_payload(body, "uf").unwrap().unwrap();
        assert_eq!(quote.code(), "uf");
        assert_eq!(quote.date(), day(2025, 1, 3));
        assert_eq!(quote.value(), dec!(38416.69));
    }

    #[test]
    fn test_parse_empty_or_missing_series_is_no_data() {
        assert_eq!(parse_payload(r#"{"codigo":"uf","serie":[]}"#, "uf"), Ok(None));
        assert_eq!(parse_payload(r#"{"codigo":"uf"}"#, "uf"), Ok(None));
        assert_eq!(parse_payload(r#"{"serie":null}"#, "uf"), Ok(None));
    }

    #[test]
    fn test_parse_payload_code_wins() {
        let body = r#"{"codigo":"dolar","serie":[{"fecha":"2025-01-03","valor":950.5}]}"#;
        let quote = parse_payload(body, "uf").unwrap().unwrap();
        assert_eq!(quote.code(), "dolar");

        let body = r#"{"serie":[{"fecha":"2025-01-03","valor":950.5}]}"#;
        assert_eq!(parse_payload(body, "uf").unwrap().unwrap().code(), "uf");
    }

    #[test]
    fn test_parse_malformed_shapes() {
        for body in [
            "not json",
            "[1, 2, 3]",
            r#"{"serie": "oops"}"#,
            r#"{"serie": [{"fecha": "yesterday", "valor": 1}]}"#,
            r#"{"serie": [{"fecha": "2025-01-03T03:00:00Z", "valor": "38416"}]}"#,
            r#"{"serie": [{"fecha": "2025-01-03T03:00:00Z"}]}"#,
            r#"{"serie": [{"fecha": "2025-01-03T03:00:00Z", "valor": -5}]}"#,
            r#"{"serie": [{"fecha": "2025-01-03T03:00:00Z", "valor": 0}]}"#,
        ] {
            assert!(
                matches!(parse_payload(body, "uf"), Err(IndicatorError::MalformedPayload(_))),
                "expected MalformedPayload for {body}"
            );
        }
    }

    // -------------------------------------------------------------------------
    // HTTP
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_fetch_builds_dd_mm_yyyy_path() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/uf/05-01-2025"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "codigo": "uf",
                "serie": [{"fecha": "2025-01-05T03:00:00.000Z", "valor": 38425.12}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let quote = source(&mock_server)
            .fetch("uf", day(2025, 1, 5))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(quote.date(), day(2025, 1, 5));
        assert_eq!(quote.value(), dec!(38425.12));
    }

    #[tokio::test]
    async fn test_fetch_empty_series() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/uf/04-01-2025"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"codigo": "uf", "serie": []})),
            )
            .mount(&mock_server)
            .await;

        let result = source(&mock_server).fetch("uf", day(2025, 1, 4)).await;
        assert_eq!(result, Ok(None));
    }

    #[tokio::test]
    async fn test_fetch_non_2xx_is_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/uf/05-01-2025"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let err = source(&mock_server)
            .fetch("uf", day(2025, 1, 5))
            .await
            .unwrap_err();
        assert_eq!(err, IndicatorError::ServerError { status: 503 });

        // Unmatched path: wiremock answers 404
        let err = source(&mock_server)
            .fetch("uf", day(2025, 1, 6))
            .await
            .unwrap_err();
        assert_eq!(err, IndicatorError::ServerError { status: 404 });
    }

    #[tokio::test]
    async fn test_fetch_non_json_body_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/uf/05-01-2025"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&mock_server)
            .await;

        let err = source(&mock_server)
            .fetch("uf", day(2025, 1, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, IndicatorError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/uf/05-01-2025"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"serie": []}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let source = HttpIndicatorSource::new(mock_server.uri(), Duration::from_millis(200)).unwrap();
        let err = source.fetch("uf", day(2025, 1, 5)).await.unwrap_err();
        assert_eq!(
            err,
            IndicatorError::Timeout {
                after: Duration::from_millis(200)
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let source = HttpIndicatorSource::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = source.fetch("uf", day(2025, 1, 5)).await.unwrap_err();
        assert!(matches!(err, IndicatorError::ConnectionFailure(_)));
        assert!(err.is_source_unavailable());
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let source =
            HttpIndicatorSource::new("https://mindicador.cl/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            source.url_for("uf", day(2025, 12, 31)),
            "https://mindicador.cl/api/uf/31-12-2025"
        );
    }
}
