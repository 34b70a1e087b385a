use crate::{
    Config,
    audit::AuditSink,
    model::{QueryConfig, Units, WeatherReading},
    provider::{mock::MockProvider, weatherstack::WeatherstackProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};
use thiserror::Error;

pub mod mock;
pub mod weatherstack;

/// Identifier selecting which upstream implementation services a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    Weatherstack,
    Mock,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Weatherstack => "weatherstack",
            SourceId::Mock => "mock",
        }
    }

    pub const fn all() -> &'static [SourceId] {
        &[SourceId::Weatherstack, SourceId::Mock]
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SourceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "weatherstack" => Ok(SourceId::Weatherstack),
            "mock" => Ok(SourceId::Mock),
            _ => Err(anyhow::anyhow!(
                "Unknown source '{value}'. Supported sources: weatherstack, mock."
            )),
        }
    }
}

/// Failure of a single fetch attempt.
///
/// `Transport`, `Parse` and `Upstream` are fetch failures: the provider
/// records each of them to the audit sink before returning. `NotFound` means
/// the provider had no data for a valid request and is not a failure, so it
/// produces no audit entry.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure talking to the upstream provider.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// Malformed JSON, or a required field missing or of the wrong type.
    #[error("{0}")]
    Parse(String),

    /// Well-formed JSON in which the provider signaled failure.
    #[error("{0}")]
    Upstream(String),

    /// The provider had no data for the requested city.
    #[error("no weather data for the requested city")]
    NotFound,
}

/// Capability interface over upstream weather sources.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch and normalize the current weather for `city`.
    ///
    /// `overrides`, when present, supersedes the provider's defaults for this
    /// call only. Exactly one upstream call is made per invocation; there are
    /// no retries.
    async fn current_weather(
        &self,
        city: &str,
        overrides: Option<&QueryConfig>,
    ) -> Result<WeatherReading, FetchError>;

    /// Units this provider requests upstream; DTO unit labels derive from it.
    fn units(&self) -> Units {
        Units::Metric
    }
}

/// Construct a provider from config and explicit SourceId.
pub fn provider_from_source(
    id: SourceId,
    config: &Config,
    audit: Arc<dyn AuditSink>,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let boxed: Box<dyn WeatherProvider> = match id {
        SourceId::Weatherstack => {
            let source = config.source_config(id).ok_or_else(|| {
                anyhow::anyhow!(
                    "No access key configured for source '{id}'.\n\
                     Hint: run `weather-proxy configure {id}` and enter your access key."
                )
            })?;

            let base_url = source
                .base_url
                .clone()
                .unwrap_or_else(|| weatherstack::DEFAULT_BASE_URL.to_string());

            Box::new(WeatherstackProvider::new(base_url, source.access_key.clone(), audit)?)
        }
        SourceId::Mock => Box::new(MockProvider),
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_source` field.
pub fn default_provider_from_config(
    config: &Config,
    audit: Arc<dyn AuditSink>,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_source_id()?;
    provider_from_source(id, config, audit)
}
