//! HTTP client for the data provider (aktools-style JSON API).

use serde_json::Value;
use url::Url;

use super::errors::{DataError, DataResult};
use super::series::{DateParams, RawResult, Record, SeriesSource, SeriesSpec};
use super::window::RunWindow;
use crate::config::PipelineConfig;

pub struct ProviderClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ProviderClient {
    pub fn new(config: &PipelineConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.fetch_timeout_seconds))
            .user_agent("daybrief/0.1.0")
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = Url::parse(&config.provider_base_url)
            .context("Invalid PROVIDER_BASE_URL value")?;

        Ok(Self { client, base_url })
    }

    fn endpoint_url(&self, spec: &SeriesSpec, window: &RunWindow) -> DataResult<Url> {
        let mut url = self
            .base_url
            .join(&format!("api/public/{}", spec.endpoint))
            .map_err(|e| DataError::parse_error(format!("invalid endpoint URL: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            for (key, value) in spec.params {
                query.append_pair(key, value);
            }
            match spec.dated {
                DateParams::None => {}
                DateParams::StartEnd => {
                    query.append_pair("start_date", &window.start_compact());
                    query.append_pair("end_date", &window.end_compact());
                }
                DateParams::EndOnly => {
                    query.append_pair("start_date", &window.end_compact());
                    query.append_pair("end_date", &window.end_compact());
                }
            }
        }

        Ok(url)
    }
}

impl SeriesSource for ProviderClient {
    async fn fetch(&self, spec: &SeriesSpec, window: &RunWindow) -> DataResult<RawResult> {
        let url = self.endpoint_url(spec, window)?;
        tracing::debug!(series = spec.id, %url, "provider request");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());

            tracing::debug!(series = spec.id, status_code, "provider request failed");
            return Err(DataError::Api {
                status_code,
                message,
            });
        }

        let payload: Value = response.json().await?;

        let rows = match payload {
            // The provider answers `null` when a series has nothing for the
            // requested window (e.g. non-trading days).
            Value::Null => {
                return Err(DataError::NoData {
                    series: spec.id.to_string(),
                    start: window.start_compact(),
                    end: window.end_compact(),
                })
            }
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Ok(map),
                    other => Err(DataError::parse_error(format!(
                        "expected object rows for {}, got {}",
                        spec.id,
                        type_name(&other)
                    ))),
                })
                .collect::<DataResult<Vec<Record>>>()?,
            // A few endpoints return a single record instead of an array.
            Value::Object(map) => vec![map],
            other => {
                return Err(DataError::parse_error(format!(
                    "unexpected payload shape for {}: {}",
                    spec.id,
                    type_name(&other)
                )))
            }
        };

        tracing::debug!(series = spec.id, rows = rows.len(), "provider response");
        Ok(RawResult { rows })
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
