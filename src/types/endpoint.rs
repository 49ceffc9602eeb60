//! Defines the Open-Meteo endpoints the pipeline talks to and the hourly
//! fields requested from each.

use crate::types::columns::{AIR_QUALITY_FIELDS, WEATHER_FIELDS};
use std::fmt;

pub const WEATHER_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
pub const WEATHER_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";

/// One of the three hourly endpoints. All share the same query shape
/// (`latitude, longitude, start_date, end_date, hourly`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Historical weather observations.
    WeatherArchive,
    /// Forward-looking weather forecast.
    WeatherForecast,
    /// Air-quality observations and forecasts, including `us_aqi`.
    AirQuality,
}

/// Which weather endpoint to pair with the air-quality endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherSource {
    Archive,
    Forecast,
}

impl WeatherSource {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            WeatherSource::Archive => Endpoint::WeatherArchive,
            WeatherSource::Forecast => Endpoint::WeatherForecast,
        }
    }
}

impl Endpoint {
    pub(crate) fn hourly_fields(&self) -> &'static [&'static str] {
        match self {
            Endpoint::WeatherArchive | Endpoint::WeatherForecast => &WEATHER_FIELDS,
            Endpoint::AirQuality => &AIR_QUALITY_FIELDS,
        }
    }

    /// Comma-separated value for the `hourly` query parameter.
    pub(crate) fn hourly_param(&self) -> String {
        self.hourly_fields().join(",")
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Endpoint::WeatherArchive => "weather-archive",
            Endpoint::WeatherForecast => "weather-forecast",
            Endpoint::AirQuality => "air-quality",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Base URLs for each endpoint. Overridable for mirrors and self-hosted instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointUrls {
    pub weather_archive: String,
    pub weather_forecast: String,
    pub air_quality: String,
}

impl EndpointUrls {
    pub fn url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::WeatherArchive => &self.weather_archive,
            Endpoint::WeatherForecast => &self.weather_forecast,
            Endpoint::AirQuality => &self.air_quality,
        }
    }
}

impl Default for EndpointUrls {
    fn default() -> Self {
        Self {
            weather_archive: WEATHER_ARCHIVE_URL.to_string(),
            weather_forecast: WEATHER_FORECAST_URL.to_string(),
            air_quality: AIR_QUALITY_URL.to_string(),
        }
    }
}
