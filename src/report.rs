//! Day-level summaries of hourly predictions.

use crate::types::columns::{PREDICTED, TIME};
use polars::prelude::*;

pub const DATE: &str = "date";
pub const AVG_AQI: &str = "avg_aqi";

/// Mean `predicted_aqi` per UTC calendar date, as `date` / `avg_aqi` sorted by date.
pub fn daily_average(predictions: &DataFrame) -> PolarsResult<DataFrame> {
    predictions
        .clone()
        .lazy()
        .group_by([col(TIME).dt().date().alias(DATE)])
        .agg([col(PREDICTED).mean().alias(AVG_AQI)])
        .sort([DATE], SortMultipleOptions::default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::frame_at;

    #[test]
    fn test_groups_hours_by_calendar_date() -> PolarsResult<()> {
        // 2024-01-01T22:00, 23:00, then 2024-01-02T00:00, 01:00
        let predictions = frame_at(
            &[25, 24, 23, 22],
            &[(PREDICTED, vec![Some(40.0), Some(30.0), Some(20.0), Some(10.0)])],
        );
        let daily = daily_average(&predictions)?;
        assert_eq!(daily.height(), 2);
        assert_eq!(daily.get_column_names_str(), vec![DATE, AVG_AQI]);

        let averages: Vec<f64> = daily
            .column(AVG_AQI)?
            .as_materialized_series()
            .f64()?
            .into_no_null_iter()
            .collect();
        assert_eq!(averages, vec![15.0, 35.0]);
        Ok(())
    }

    #[test]
    fn test_month_boundary_stays_in_order() -> PolarsResult<()> {
        // 2024-01-31T00:00 and 2024-02-01T00:00
        let predictions = frame_at(&[31 * 24, 30 * 24], &[(PREDICTED, vec![Some(2.0), Some(1.0)])]);
        let daily = daily_average(&predictions)?;
        let dates = daily.column(DATE)?.as_materialized_series().date()?.clone();
        let days: Vec<i32> = dates.physical().into_no_null_iter().collect();
        assert!(days[0] < days[1]);
        assert_eq!(
            daily.column(AVG_AQI)?.as_materialized_series().f64()?.get(0),
            Some(1.0)
        );
        Ok(())
    }
}
