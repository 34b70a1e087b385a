use async_trait::async_trait;

use crate::{
    model::{QueryConfig, WeatherReading},
    provider::FetchError,
};

use super::WeatherProvider;

/// Canned provider for testing and offline use.
///
/// Returns a fixed reading for every city except `"Unknown"`, which maps to
/// [`FetchError::NotFound`]. Never touches the network or the audit sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockProvider;

#[async_trait]
impl WeatherProvider for MockProvider {
    async fn current_weather(
        &self,
        city: &str,
        _overrides: Option<&QueryConfig>,
    ) -> Result<WeatherReading, FetchError> {
        if city == "Unknown" {
            return Err(FetchError::NotFound);
        }

        Ok(WeatherReading {
            temperature: 15,
            condition: "Cloudy".to_string(),
            wind_speed: 5,
        })
    }
}
