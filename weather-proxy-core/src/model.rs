use serde::{Deserialize, Serialize};

/// Per-request override for the upstream call.
///
/// Deserialized from the caller-supplied JSON payload. A field only takes
/// effect when it is present and non-empty; anything else falls back to the
/// process-wide defaults. Overrides are applied as call-local values and are
/// never written back to shared configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// Units requested from the upstream provider.
///
/// The unit labels on the outgoing DTO are derived from whichever units the
/// request asked for, so a provider that requests something other than metric
/// cannot silently mislabel its readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Metric,
}

impl Units {
    /// Value of the `units` query parameter sent upstream.
    pub fn query_value(self) -> &'static str {
        match self {
            Units::Metric => "m",
        }
    }

    pub fn temperature_unit(self) -> &'static str {
        match self {
            Units::Metric => "°C",
        }
    }

    pub fn wind_speed_unit(self) -> &'static str {
        match self {
            Units::Metric => "km/h",
        }
    }
}

/// Normalized weather reading produced by a successful fetch.
///
/// Request-scoped value with no identity of its own; temperature and wind
/// speed are in the units the request asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherReading {
    pub temperature: i64,
    pub condition: String,
    pub wind_speed: i64,
}

/// The externally returned weather shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentWeatherDto {
    pub city: String,
    pub temperature: TemperatureDto,
    pub condition: String,
    pub wind: WindDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureDto {
    pub value: i64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindDto {
    pub speed: i64,
    pub unit: String,
}
