//! Column names shared by the fetcher, the feature processor, the store and the models.

/// Timestamp column; naive UTC `Datetime(Milliseconds, None)`.
pub const TIME: &str = "time";

/// Prediction target.
pub const TARGET: &str = "us_aqi";

/// Column appended by the forecaster.
pub const PREDICTED: &str = "predicted_aqi";

pub const HOUR: &str = "hour";
pub const DAY: &str = "day";
pub const MONTH: &str = "month";
pub const DAY_OF_WEEK: &str = "dayofweek";

/// Calendar features derived from [`TIME`], in output order.
pub const DERIVED: [&str; 4] = [HOUR, DAY, MONTH, DAY_OF_WEEK];

/// Hourly fields requested from the weather endpoints.
pub const WEATHER_FIELDS: [&str; 3] = ["temperature_2m", "relative_humidity_2m", "wind_speed_10m"];

/// Hourly fields requested from the air-quality endpoint.
pub const AIR_QUALITY_FIELDS: [&str; 7] = [
    "pm10",
    "pm2_5",
    "carbon_monoxide",
    "nitrogen_dioxide",
    "sulphur_dioxide",
    "ozone",
    TARGET,
];

/// Columns never used as model inputs.
pub const NON_FEATURES: [&str; 3] = [TIME, TARGET, PREDICTED];
