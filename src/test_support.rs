//! Frame builders shared by the unit tests.

use crate::types::columns::{AIR_QUALITY_FIELDS, TARGET, TIME, WEATHER_FIELDS};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;

pub(crate) fn hour(offset: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::hours(offset)
}

/// A frame with a naive-UTC `time` column at the given hour offsets from
/// 2024-01-01T00:00 and one nullable `Float64` column per entry of `columns`.
pub(crate) fn frame_at(offsets: &[i64], columns: &[(&str, Vec<Option<f64>>)]) -> DataFrame {
    let millis: Vec<i64> = offsets
        .iter()
        .map(|o| hour(*o).and_utc().timestamp_millis())
        .collect();
    let mut out = vec![Series::new(TIME.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .unwrap()
        .into_column()];
    for (name, values) in columns {
        out.push(Series::new((*name).into(), values.clone()).into_column());
    }
    DataFrame::new(out).unwrap()
}

/// `n` hourly observations with every weather and air-quality field populated
/// and `us_aqi` a noise-free linear function of the pollutants.
pub(crate) fn synthetic_observations(n: usize) -> DataFrame {
    let offsets: Vec<i64> = (0..n as i64).collect();
    let mut columns: Vec<(&str, Vec<Option<f64>>)> = Vec::new();
    for (k, name) in WEATHER_FIELDS.iter().enumerate() {
        let values = (0..n)
            .map(|i| Some(10.0 + k as f64 + ((i * (k + 3)) % 17) as f64))
            .collect();
        columns.push((*name, values));
    }
    for (k, name) in AIR_QUALITY_FIELDS
        .iter()
        .filter(|name| **name != TARGET)
        .enumerate()
    {
        let values = (0..n)
            .map(|i| Some(5.0 + ((i * (k + 2) + k) % 23) as f64))
            .collect();
        columns.push((*name, values));
    }
    let target = (0..n)
        .map(|i| {
            let pm25 = 5.0 + ((i * 3 + 1) % 23) as f64;
            let pm10 = 5.0 + ((i * 2) % 23) as f64;
            Some(2.0 * pm25 + 0.5 * pm10 + 10.0)
        })
        .collect();
    columns.push((TARGET, target));
    frame_at(&offsets, &columns)
}
