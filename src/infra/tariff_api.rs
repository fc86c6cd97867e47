//! Thin asynchronous client for the UK Trade Tariff API v2.
//!
//! One endpoint matters here: `commodities/{code}`, whose payload carries an
//! `included` array of typed entries. The first duty measure with a formatted
//! duty expression supplies the rate. Everything that can go wrong maps onto
//! [`LookupError`]; the resolver treats them all as "no answer".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::{LookupError, TariffLookup};

pub const DEFAULT_BASE_URL: &str = "https://www.trade-tariff.service.gov.uk/api/v2/";
const USER_AGENT: &str = "steel-landed-cost/0.1.0";

/// Default request timeout; overridable from the CLI. Failures, including
/// timeouts, fall through to the reference table downstream.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TariffApiError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct TariffApiClient {
    http: Client,
    base_url: Url,
}

impl TariffApiClient {
    pub fn new() -> Result<Self, TariffApiError> {
        Self::with_base_url(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_base_url(base: &str, timeout: Duration) -> Result<Self, TariffApiError> {
        let base_url = Url::parse(base)?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl TariffLookup for TariffApiClient {
    async fn rate_for(&self, code: &str) -> Result<f64, LookupError> {
        let url = self
            .base_url
            .join(&format!("commodities/{code}"))
            .map_err(|error| LookupError::Transport(error.to_string()))?;

        debug!(%url, "querying tariff service");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|error| LookupError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let payload: CommodityResponse = response
            .json()
            .await
            .map_err(|error| LookupError::MalformedPayload(error.to_string()))?;

        duty_rate_from(&payload)
    }
}

#[derive(Debug, Deserialize)]
struct CommodityResponse {
    #[serde(default)]
    included: Vec<IncludedEntry>,
}

#[derive(Debug, Deserialize)]
struct IncludedEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    attributes: Option<EntryAttributes>,
}

#[derive(Debug, Deserialize)]
struct EntryAttributes {
    #[serde(default)]
    duty_expression: Option<DutyExpression>,
}

#[derive(Debug, Deserialize)]
struct DutyExpression {
    #[serde(default)]
    formatted: Option<String>,
}

/// Pick the first measure entry with a non-empty formatted duty expression
/// and parse its rate.
fn duty_rate_from(payload: &CommodityResponse) -> Result<f64, LookupError> {
    let formatted = payload
        .included
        .iter()
        .filter(|entry| entry.kind == "measure")
        .find_map(|entry| {
            entry
                .attributes
                .as_ref()
                .and_then(|attrs| attrs.duty_expression.as_ref())
                .and_then(|duty| duty.formatted.as_deref())
                .filter(|text| !text.is_empty())
        })
        .ok_or(LookupError::NoDutyMeasure)?;

    parse_duty_rate(formatted)
}

/// Strip the percent sign and surrounding whitespace, then parse as decimal.
fn parse_duty_rate(formatted: &str) -> Result<f64, LookupError> {
    formatted
        .replace('%', "")
        .trim()
        .parse::<f64>()
        .map_err(|_| LookupError::UnparseableRate(formatted.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> CommodityResponse {
        serde_json::from_str(json).expect("test payload must deserialize")
    }

    #[test]
    fn picks_first_measure_with_a_formatted_duty() {
        let response = payload(
            r#"{
                "data": {"id": "7208", "type": "commodity"},
                "included": [
                    {"type": "footnote", "attributes": {}},
                    {"type": "measure", "attributes": {"duty_expression": {"formatted": ""}}},
                    {"type": "measure", "attributes": {"duty_expression": {"formatted": "8.00 %"}}},
                    {"type": "measure", "attributes": {"duty_expression": {"formatted": "12.00 %"}}}
                ]
            }"#,
        );

        assert_eq!(duty_rate_from(&response).unwrap(), 8.0);
    }

    #[test]
    fn non_measure_entries_are_ignored() {
        let response = payload(
            r#"{
                "included": [
                    {"type": "duty_expression", "attributes": {"duty_expression": {"formatted": "99 %"}}}
                ]
            }"#,
        );

        assert!(matches!(
            duty_rate_from(&response),
            Err(LookupError::NoDutyMeasure)
        ));
    }

    #[test]
    fn missing_included_array_means_no_duty_measure() {
        let response = payload(r#"{"data": {"id": "7208", "type": "commodity"}}"#);

        assert!(matches!(
            duty_rate_from(&response),
            Err(LookupError::NoDutyMeasure)
        ));
    }

    #[test]
    fn garbage_duty_expression_is_a_lookup_failure() {
        let response = payload(
            r#"{
                "included": [
                    {"type": "measure", "attributes": {"duty_expression": {"formatted": "8.00 % + 25.00 GBP / 100 kg"}}}
                ]
            }"#,
        );

        assert!(matches!(
            duty_rate_from(&response),
            Err(LookupError::UnparseableRate(_))
        ));
    }

    #[test]
    fn percent_sign_and_whitespace_are_stripped() {
        assert_eq!(parse_duty_rate("8.00 %").unwrap(), 8.0);
        assert_eq!(parse_duty_rate("  0 %  ").unwrap(), 0.0);
        assert_eq!(parse_duty_rate("25").unwrap(), 25.0);
        assert!(parse_duty_rate("free").is_err());
    }
}
