//! Dispatch service: runs one fetch, records the outcome, maps to the DTO.

use std::sync::Arc;
use thiserror::Error;

use crate::{
    audit::{AuditSink, LogStatus},
    model::{CurrentWeatherDto, QueryConfig, TemperatureDto, Units, WeatherReading, WindDto},
    provider::{FetchError, SourceId, WeatherProvider},
};

/// Failure of one dispatched weather query.
///
/// "No data for this city" and "the fetch itself failed" are deliberately
/// distinct outcomes; collapsing them would hide transport and parse problems
/// behind a not-found answer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The provider had no data for a valid request. Not logged as a fetch
    /// failure.
    #[error("no weather data found for the requested city")]
    NotFound,

    /// Transport, parse, or upstream failure. Already recorded to the audit
    /// log by the provider.
    #[error(transparent)]
    Fetch(FetchError),
}

/// Runs weather queries against one selected provider.
pub struct WeatherService {
    source: SourceId,
    provider: Box<dyn WeatherProvider>,
    audit: Arc<dyn AuditSink>,
}

impl WeatherService {
    pub fn new(source: SourceId, provider: Box<dyn WeatherProvider>, audit: Arc<dyn AuditSink>) -> Self {
        Self { source, provider, audit }
    }

    /// Fetch the current weather for `city` and return the response DTO.
    ///
    /// A successful fetch writes exactly one `success` audit entry; fetch
    /// failures were already recorded by the provider before they surface
    /// here. Entries are never deduplicated across calls.
    pub async fn current_weather(
        &self,
        city: &str,
        overrides: Option<&QueryConfig>,
    ) -> Result<CurrentWeatherDto, ServiceError> {
        let reading = match self.provider.current_weather(city, overrides).await {
            Ok(reading) => reading,
            Err(FetchError::NotFound) => return Err(ServiceError::NotFound),
            Err(err) => return Err(ServiceError::Fetch(err)),
        };

        self.audit
            .save_log(city, LogStatus::Success, self.source.as_str(), None)
            .await;

        Ok(to_dto(city, &reading, self.provider.units()))
    }
}

/// Map a normalized reading to the response shape. Pure; unit labels follow
/// the units the request asked for.
pub fn to_dto(city: &str, reading: &WeatherReading, units: Units) -> CurrentWeatherDto {
    CurrentWeatherDto {
        city: city.to_string(),
        temperature: TemperatureDto {
            value: reading.temperature,
            unit: units.temperature_unit().to_string(),
        },
        condition: reading.condition.clone(),
        wind: WindDto {
            speed: reading.wind_speed,
            unit: units.wind_speed_unit().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::provider::mock::MockProvider;

    fn mock_service(audit: Arc<MemoryAuditSink>) -> WeatherService {
        WeatherService::new(SourceId::Mock, Box::new(MockProvider), audit)
    }

    #[test]
    fn to_dto_maps_reading_and_city_exactly() {
        let reading = WeatherReading {
            temperature: 15,
            condition: "Cloudy".to_string(),
            wind_speed: 5,
        };

        let dto = to_dto("Paris", &reading, Units::Metric);

        assert_eq!(
            dto,
            CurrentWeatherDto {
                city: "Paris".to_string(),
                temperature: TemperatureDto { value: 15, unit: "°C".to_string() },
                condition: "Cloudy".to_string(),
                wind: WindDto { speed: 5, unit: "km/h".to_string() },
            }
        );
    }

    #[test]
    fn dto_serializes_to_the_documented_shape() {
        let reading = WeatherReading {
            temperature: 15,
            condition: "Cloudy".to_string(),
            wind_speed: 5,
        };

        let json = serde_json::to_value(to_dto("Paris", &reading, Units::Metric))
            .expect("dto serializes");

        assert_eq!(
            json,
            serde_json::json!({
                "city": "Paris",
                "temperature": { "value": 15, "unit": "°C" },
                "condition": "Cloudy",
                "wind": { "speed": 5, "unit": "km/h" },
            })
        );
    }

    #[tokio::test]
    async fn successful_dispatch_logs_exactly_one_success_entry() {
        let audit = Arc::new(MemoryAuditSink::new());
        let service = mock_service(Arc::clone(&audit));

        let dto = service.current_weather("London", None).await.expect("mock succeeds");

        assert_eq!(dto.city, "London");
        assert_eq!(dto.temperature.value, 15);
        assert_eq!(dto.condition, "Cloudy");
        assert_eq!(dto.wind.speed, 5);

        let entries = audit.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, LogStatus::Success);
        assert_eq!(entries[0].source, "mock");
        assert_eq!(entries[0].city, "London");
        assert!(entries[0].error.is_none());
    }

    #[tokio::test]
    async fn not_found_writes_no_audit_entry() {
        let audit = Arc::new(MemoryAuditSink::new());
        let service = mock_service(Arc::clone(&audit));

        let err = service.current_weather("Unknown", None).await.unwrap_err();

        assert!(matches!(err, ServiceError::NotFound));
        assert!(audit.entries().is_empty());
    }

    #[tokio::test]
    async fn repeated_dispatches_log_independent_entries() {
        let audit = Arc::new(MemoryAuditSink::new());
        let service = mock_service(Arc::clone(&audit));

        let first = service.current_weather("London", None).await.expect("mock succeeds");
        let second = service.current_weather("London", None).await.expect("mock succeeds");

        assert_eq!(first, second);

        let entries = audit.entries();
        assert_eq!(entries.len(), 2);
        assert_ne!(entries[0].id, entries[1].id);
    }
}
