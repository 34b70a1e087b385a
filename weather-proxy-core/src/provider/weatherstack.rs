use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::{sync::Arc, time::Duration};

use crate::{
    audit::{AuditSink, LogStatus},
    model::{QueryConfig, Units, WeatherReading},
    provider::{FetchError, SourceId},
};

use super::WeatherProvider;

/// Base URL used when the configuration does not set one.
pub const DEFAULT_BASE_URL: &str = "http://api.weatherstack.com/current";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetch-and-normalize against the Weatherstack current-weather API.
///
/// Holds the process-start defaults for base URL and access key; per-request
/// overrides are resolved into call-local values and never stored back here,
/// so concurrent requests cannot observe each other's overrides.
#[derive(Debug, Clone)]
pub struct WeatherstackProvider {
    base_url: String,
    access_key: String,
    http: Client,
    audit: Arc<dyn AuditSink>,
}

impl WeatherstackProvider {
    pub fn new(
        base_url: String,
        access_key: String,
        audit: Arc<dyn AuditSink>,
    ) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { base_url, access_key, http, audit })
    }

    /// Effective configuration for one call: an override field wins only when
    /// it is present and non-empty.
    fn effective_config<'a>(&'a self, overrides: Option<&'a QueryConfig>) -> (&'a str, &'a str) {
        let base_url = overrides
            .and_then(|c| non_empty(c.base_url.as_deref()))
            .unwrap_or(&self.base_url);
        let access_key = overrides
            .and_then(|c| non_empty(c.api_key.as_deref()))
            .unwrap_or(&self.access_key);

        (base_url, access_key)
    }

    /// Record a failed attempt, then hand the error back to the caller.
    async fn fail(&self, city: &str, err: FetchError) -> FetchError {
        tracing::warn!(city, error = %err, "weatherstack fetch failed");
        self.audit
            .save_log(city, LogStatus::Fail, SourceId::Weatherstack.as_str(), Some(err.to_string()))
            .await;
        err
    }
}

#[async_trait]
impl WeatherProvider for WeatherstackProvider {
    async fn current_weather(
        &self,
        city: &str,
        overrides: Option<&QueryConfig>,
    ) -> Result<WeatherReading, FetchError> {
        let (base_url, access_key) = self.effective_config(overrides);

        tracing::debug!(city, base_url, "requesting current weather from weatherstack");

        let res = self
            .http
            .get(base_url)
            .query(&[
                ("query", city),
                ("access_key", access_key),
                ("units", self.units().query_value()),
            ])
            .send()
            .await
            .and_then(|res| res.error_for_status());

        let body = match res {
            Ok(res) => match res.text().await {
                Ok(body) => body,
                Err(err) => {
                    return Err(self.fail(city, FetchError::Transport(err.to_string())).await);
                }
            },
            Err(err) => {
                return Err(self.fail(city, FetchError::Transport(err.to_string())).await);
            }
        };

        let payload: Value = match serde_json::from_str(&body) {
            Ok(payload) => payload,
            Err(err) => return Err(self.fail(city, FetchError::Parse(err.to_string())).await),
        };

        // Weatherstack reports its own errors as 200 responses carrying
        // `success: false`.
        if payload.is_null() || payload.get("success").and_then(Value::as_bool) == Some(false) {
            let err = FetchError::Upstream(format!("Invalid response: {body}"));
            return Err(self.fail(city, err).await);
        }

        match reading_from_payload(&payload) {
            Ok(reading) => Ok(reading),
            Err(err) => Err(self.fail(city, err).await),
        }
    }
}

/// Normalize a well-formed Weatherstack payload into a reading.
fn reading_from_payload(payload: &Value) -> Result<WeatherReading, FetchError> {
    let current = payload.get("current");

    let descriptions: Vec<&str> = current
        .and_then(|c| c.get("weather_descriptions"))
        .and_then(Value::as_array)
        .map(|descs| descs.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let condition = if descriptions.is_empty() {
        "Unknown".to_string()
    } else {
        descriptions.join(", ")
    };

    let temperature = integer_field(current, "temperature")?;
    let wind_speed = integer_field(current, "wind_speed")?;

    Ok(WeatherReading { temperature, condition, wind_speed })
}

fn integer_field(current: Option<&Value>, name: &str) -> Result<i64, FetchError> {
    let value = current
        .and_then(|c| c.get(name))
        .ok_or_else(|| FetchError::Parse(format!("missing field: current.{name}")))?;

    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .ok_or_else(|| FetchError::Parse(format!("non-numeric field: current.{name}")))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
