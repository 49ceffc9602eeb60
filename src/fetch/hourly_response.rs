//! Converts an Open-Meteo `hourly` response body into a polars `DataFrame`.
//!
//! The body carries an `hourly` object of parallel arrays keyed by field name,
//! one of which is `time`. The frame gets a naive-UTC millisecond `time` column
//! followed by one nullable `Float64` column per remaining key.

use crate::fetch::error::FetchError;
use crate::types::columns::TIME;
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Parses the timestamps Open-Meteo emits (`2024-01-01T00:00`), tolerating a
/// trailing `Z`, seconds, or a full RFC 3339 offset.
pub(crate) fn parse_api_time(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    let trimmed = raw.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Body of an Open-Meteo hourly response. Only the `hourly` block is read.
#[derive(Debug, Deserialize)]
pub struct HourlyBody {
    hourly: Option<BTreeMap<String, Vec<Value>>>,
}

impl HourlyBody {
    pub fn into_frame(self, url: &str) -> Result<DataFrame, FetchError> {
        let mut hourly = self.hourly.ok_or_else(|| FetchError::MissingField {
            url: url.to_string(),
            field: "hourly".to_string(),
        })?;
        let times = hourly.remove(TIME).ok_or_else(|| FetchError::MissingField {
            url: url.to_string(),
            field: format!("hourly.{TIME}"),
        })?;

        let millis = times
            .iter()
            .map(|value| {
                value
                    .as_str()
                    .and_then(parse_api_time)
                    .map(|t| t.and_utc().timestamp_millis())
                    .ok_or_else(|| FetchError::InvalidValue {
                        url: url.to_string(),
                        column: TIME.to_string(),
                        value: value.to_string(),
                    })
            })
            .collect::<Result<Vec<i64>, _>>()?;
        let expected = millis.len();

        let frame_err = |source: PolarsError| FetchError::Frame {
            url: url.to_string(),
            source,
        };

        let mut columns = Vec::with_capacity(hourly.len() + 1);
        let time = Series::new(TIME.into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .map_err(frame_err)?;
        columns.push(time.into_column());

        for (name, values) in hourly {
            if values.len() != expected {
                return Err(FetchError::LengthMismatch {
                    url: url.to_string(),
                    column: name,
                    expected,
                    found: values.len(),
                });
            }
            let parsed = values
                .iter()
                .map(|value| match value {
                    Value::Null => Ok(None),
                    Value::Number(number) => Ok(number.as_f64()),
                    other => Err(FetchError::InvalidValue {
                        url: url.to_string(),
                        column: name.clone(),
                        value: other.to_string(),
                    }),
                })
                .collect::<Result<Vec<Option<f64>>, _>>()?;
            columns.push(Series::new(name.as_str().into(), parsed).into_column());
        }

        DataFrame::new(columns).map_err(frame_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    const URL: &str = "http://test.invalid/v1/archive";

    fn frame(body: Value) -> Result<DataFrame, FetchError> {
        serde_json::from_value::<HourlyBody>(body)
            .unwrap()
            .into_frame(URL)
    }

    #[test]
    fn test_parse_api_time_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap();
        assert_eq!(parse_api_time("2024-01-01T01:00"), Some(expected));
        assert_eq!(parse_api_time("2024-01-01T01:00Z"), Some(expected));
        assert_eq!(parse_api_time("2024-01-01T01:00:00"), Some(expected));
        assert_eq!(parse_api_time("2024-01-01T06:00:00+05:00"), Some(expected));
        assert_eq!(parse_api_time("yesterday"), None);
    }

    #[test]
    fn test_frame_from_hourly_body() -> Result<(), Box<dyn std::error::Error>> {
        let body = json!({
            "latitude": 24.86,
            "hourly": {
                "time": ["2024-01-01T00:00", "2024-01-01T01:00", "2024-01-01T02:00"],
                "temperature_2m": [18.5, null, 17.25],
                "wind_speed_10m": [3, 4, 5]
            }
        });

        let df = frame(body)?;
        assert_eq!(df.shape(), (3, 3));
        assert_eq!(df.get_column_names()[0].as_str(), TIME);
        assert!(matches!(
            df.column(TIME)?.dtype(),
            DataType::Datetime(TimeUnit::Milliseconds, None)
        ));

        let temp = df.column("temperature_2m")?.f64()?;
        assert_eq!(temp.get(0), Some(18.5));
        assert_eq!(temp.get(1), None);
        assert_eq!(df.column("wind_speed_10m")?.f64()?.get(2), Some(5.0));
        Ok(())
    }

    #[test]
    fn test_missing_hourly_is_an_error() {
        let body = json!({ "error": true, "reason": "Parameter 'hourly' is invalid" });
        let err = frame(body).unwrap_err();
        assert!(matches!(err, FetchError::MissingField { ref field, .. } if field == "hourly"));
    }

    #[test]
    fn test_non_array_field_fails_to_deserialize() {
        let body = json!({ "hourly": { "time": ["2024-01-01T00:00"], "pm10": 3.0 } });
        assert!(serde_json::from_value::<HourlyBody>(body).is_err());
    }

    #[test]
    fn test_missing_time_is_an_error() {
        let body = json!({ "hourly": { "pm10": [1.0] } });
        let err = frame(body).unwrap_err();
        assert!(matches!(err, FetchError::MissingField { .. }));
    }

    #[test]
    fn test_ragged_arrays_are_rejected() {
        let body = json!({
            "hourly": {
                "time": ["2024-01-01T00:00", "2024-01-01T01:00"],
                "pm10": [1.0]
            }
        });
        let err = frame(body).unwrap_err();
        assert!(matches!(
            err,
            FetchError::LengthMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        let body = json!({
            "hourly": {
                "time": ["2024-01-01T00:00"],
                "pm10": ["high"]
            }
        });
        assert!(matches!(
            frame(body),
            Err(FetchError::InvalidValue { .. })
        ));
    }
}
