//! Cleans merged observations and derives calendar features.
//!
//! Medians are computed over the batch handed to [`process`]; the same rows
//! processed as part of a different batch can therefore be imputed differently.

use crate::types::columns::{DERIVED, TARGET, TIME};
use log::{debug, info};
use polars::prelude::*;

pub(crate) fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Names and dtypes of the numeric columns of `df`, skipping `exclude`.
pub(crate) fn numeric_columns(df: &DataFrame, exclude: &[&str]) -> Vec<(String, DataType)> {
    df.get_columns()
        .iter()
        .filter(|c| is_numeric(c.dtype()) && !exclude.contains(&c.name().as_str()))
        .map(|c| (c.name().to_string(), c.dtype().clone()))
        .collect()
}

/// One expression per column replacing nulls with the column median. A column
/// with no values at all falls back to zero. Dtypes are preserved; integer
/// columns take the median rounded to the nearest integer.
pub(crate) fn median_imputation(columns: &[(String, DataType)]) -> Vec<Expr> {
    columns
        .iter()
        .map(|(name, dtype)| {
            let median = col(name.as_str()).median();
            let median = if dtype.is_float() {
                median
            } else {
                median.round(0)
            };
            col(name.as_str())
                .fill_null(median)
                .fill_null(lit(0))
                .cast(dtype.clone())
                .alias(name.as_str())
        })
        .collect()
}

/// hour, day, month and day-of-week (Monday = 0) derived from `time`.
fn calendar_features() -> Vec<Expr> {
    [
        col(TIME).dt().hour().cast(DataType::Int32),
        col(TIME).dt().day().cast(DataType::Int32),
        col(TIME).dt().month().cast(DataType::Int32),
        col(TIME).dt().weekday().cast(DataType::Int32) - lit(1),
    ]
    .into_iter()
    .zip(DERIVED)
    .map(|(expr, name)| expr.alias(name))
    .collect()
}

/// Turns merged observations into feature records.
///
/// * An empty frame is returned unchanged.
/// * Rows with a null `us_aqi` are dropped, but only when the column exists and
///   has at least one value. An all-null target (the forecast placeholder)
///   keeps every row.
/// * Nulls in every other numeric column are replaced by that column's median
///   over this batch.
/// * `hour`, `day`, `month` and `dayofweek` are added and rows are sorted by `time`.
pub fn process(raw: DataFrame) -> PolarsResult<DataFrame> {
    if raw.height() == 0 {
        debug!("Empty frame, nothing to preprocess");
        return Ok(raw);
    }
    let rows_in = raw.height();

    let drop_missing_target = raw
        .column(TARGET)
        .map(|target| target.null_count() < target.len())
        .unwrap_or(false);
    let to_impute = numeric_columns(&raw, &[TIME, TARGET]);

    let mut frame = raw.lazy();
    if drop_missing_target {
        frame = frame.filter(col(TARGET).is_not_null());
    }
    let processed = frame
        .with_columns(median_imputation(&to_impute))
        .with_columns(calendar_features())
        .sort([TIME], SortMultipleOptions::default())
        .collect()?;

    info!(
        "Preprocessed {} of {} records with {} columns",
        processed.height(),
        rows_in,
        processed.width()
    );
    Ok(processed)
}

/// Adds an all-null `us_aqi` column when the frame has none, so that
/// [`process`] keeps every row of a forecast batch.
pub fn with_target_placeholder(mut df: DataFrame) -> PolarsResult<DataFrame> {
    if df.column(TARGET).is_err() {
        debug!("No '{}' column, adding null placeholder", TARGET);
        let placeholder = Series::full_null(TARGET.into(), df.height(), &DataType::Float64);
        df.with_column(placeholder)?;
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{frame_at, synthetic_observations};
    use crate::types::columns::{DAY, DAY_OF_WEEK, HOUR, MONTH};

    fn nulls_outside_target(df: &DataFrame) -> usize {
        df.get_columns()
            .iter()
            .filter(|c| c.name().as_str() != TARGET)
            .map(|c| c.null_count())
            .sum()
    }

    #[test]
    fn test_empty_frame_is_returned_unchanged() -> PolarsResult<()> {
        let empty = frame_at(&[], &[("pm10", vec![]), (TARGET, vec![])]);
        let processed = process(empty.clone())?;
        assert_eq!(processed.height(), 0);
        assert_eq!(processed.width(), empty.width());
        Ok(())
    }

    #[test]
    fn test_median_imputation_uses_batch_median() -> PolarsResult<()> {
        let df = frame_at(
            &[0, 1, 2, 3],
            &[
                ("pm10", vec![Some(1.0), None, Some(3.0), Some(10.0)]),
                (TARGET, vec![Some(50.0), Some(60.0), Some(70.0), Some(80.0)]),
            ],
        );
        let processed = process(df)?;

        let pm10 = processed.column("pm10")?.f64()?;
        assert_eq!(pm10.get(1), Some(3.0));
        assert_eq!(nulls_outside_target(&processed), 0);
        Ok(())
    }

    #[test]
    fn test_all_null_column_falls_back_to_zero() -> PolarsResult<()> {
        let df = frame_at(
            &[0, 1],
            &[
                ("ozone", vec![None, None]),
                (TARGET, vec![Some(50.0), Some(60.0)]),
            ],
        );
        let processed = process(df)?;
        let ozone = processed.column("ozone")?.f64()?;
        assert_eq!(ozone.get(0), Some(0.0));
        assert_eq!(ozone.get(1), Some(0.0));
        Ok(())
    }

    #[test]
    fn test_training_batch_drops_rows_missing_target() -> PolarsResult<()> {
        let df = frame_at(
            &[0, 1, 2],
            &[
                ("pm10", vec![Some(10.0), Some(20.0), Some(30.0)]),
                (TARGET, vec![Some(50.0), None, Some(70.0)]),
            ],
        );
        let processed = process(df)?;
        assert_eq!(processed.height(), 2);
        assert_eq!(processed.column(TARGET)?.null_count(), 0);
        Ok(())
    }

    #[test]
    fn test_forecast_placeholder_keeps_rows() -> PolarsResult<()> {
        let df = frame_at(
            &[0, 1, 2],
            &[("pm10", vec![Some(10.0), None, Some(30.0)])],
        );
        let df = with_target_placeholder(df)?;
        assert_eq!(df.column(TARGET)?.null_count(), 3);

        let processed = process(df)?;
        assert_eq!(processed.height(), 3);
        assert_eq!(processed.column(TARGET)?.null_count(), 3);
        assert_eq!(nulls_outside_target(&processed), 0);
        Ok(())
    }

    #[test]
    fn test_placeholder_leaves_existing_target_alone() -> PolarsResult<()> {
        let df = frame_at(&[0], &[(TARGET, vec![Some(42.0)])]);
        let df = with_target_placeholder(df)?;
        assert_eq!(df.column(TARGET)?.f64()?.get(0), Some(42.0));
        Ok(())
    }

    #[test]
    fn test_integer_median_is_rounded() -> PolarsResult<()> {
        let mut df = frame_at(&[0, 1, 2, 3, 4], &[]);
        df.with_column(Series::new(
            "visibility_km".into(),
            [Some(1i32), Some(2), None, Some(5), Some(6)],
        ))?;
        let processed = process(df)?;
        let filled = processed.column("visibility_km")?;
        assert_eq!(filled.dtype(), &DataType::Int32);
        assert_eq!(filled.i32()?.get(2), Some(4));
        Ok(())
    }

    #[test]
    fn test_calendar_features() -> PolarsResult<()> {
        // 2024-01-01 is a Monday; offset 53h is Wednesday 2024-01-03 05:00.
        let df = frame_at(
            &[0, 53],
            &[(TARGET, vec![Some(1.0), Some(2.0)])],
        );
        let processed = process(df)?;

        let hour = processed.column(HOUR)?.i32()?;
        let day = processed.column(DAY)?.i32()?;
        let month = processed.column(MONTH)?.i32()?;
        let dow = processed.column(DAY_OF_WEEK)?.i32()?;
        assert_eq!((hour.get(0), day.get(0), month.get(0), dow.get(0)), (Some(0), Some(1), Some(1), Some(0)));
        assert_eq!((hour.get(1), day.get(1), month.get(1), dow.get(1)), (Some(5), Some(3), Some(1), Some(2)));
        Ok(())
    }

    #[test]
    fn test_output_sorted_and_order_insensitive() -> PolarsResult<()> {
        let ordered = frame_at(
            &[0, 1, 2, 3],
            &[
                ("pm10", vec![Some(1.0), None, Some(5.0), Some(7.0)]),
                (TARGET, vec![Some(10.0), Some(20.0), Some(30.0), Some(40.0)]),
            ],
        );
        let shuffled = frame_at(
            &[3, 1, 0, 2],
            &[
                ("pm10", vec![Some(7.0), None, Some(1.0), Some(5.0)]),
                (TARGET, vec![Some(40.0), Some(20.0), Some(10.0), Some(30.0)]),
            ],
        );

        let a = process(ordered)?;
        let b = process(shuffled)?;
        assert!(a.equals_missing(&b));

        let times = a.column(TIME)?.cast(&DataType::Int64)?;
        let times: Vec<i64> = times.i64()?.into_no_null_iter().collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        Ok(())
    }

    #[test]
    fn test_full_batch_has_no_missing_features() -> PolarsResult<()> {
        let mut df = synthetic_observations(48);
        let with_gaps = Series::new(
            "pm2_5".into(),
            (0..48)
                .map(|i| if i % 5 == 0 { None } else { Some(i as f64) })
                .collect::<Vec<_>>(),
        );
        df.with_column(with_gaps)?;

        let processed = process(df)?;
        assert_eq!(processed.height(), 48);
        assert_eq!(nulls_outside_target(&processed), 0);
        Ok(())
    }
}
