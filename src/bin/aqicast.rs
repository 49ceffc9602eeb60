//! Command-line front end for the AQI pipeline.
//!
//! Usage:
//!   aqicast ingest [--days N | --today] [--raw-csv PATH]
//!   aqicast train [--start DATE] [--end DATE]
//!   aqicast predict [--daily]
//!   aqicast metrics

use anyhow::{Context, Result};
use aqicast::{
    daily_average, AqiCast, AqiCastError, LatLon, MetricsRecord, Settings, AVG_AQI, DATE,
    DEFAULT_LOCATION, PREDICTED, TIME,
};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use polars::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Forecast the US AQI from Open-Meteo weather and air-quality data.
#[derive(Parser)]
#[command(name = "aqicast")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding the feature store
    #[arg(long, env = "AQICAST_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Directory holding the model, scaler and metrics files
    #[arg(long, env = "AQICAST_ARTIFACT_DIR", global = true)]
    artifact_dir: Option<PathBuf>,

    #[arg(long, env = "AQICAST_LATITUDE", default_value_t = DEFAULT_LOCATION.0, global = true)]
    latitude: f64,

    #[arg(long, env = "AQICAST_LONGITUDE", default_value_t = DEFAULT_LOCATION.1, global = true)]
    longitude: f64,

    /// Timeout for every HTTP request, in seconds
    #[arg(long, env = "AQICAST_TIMEOUT_SECS", default_value_t = 30, global = true)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch observations, process them and upsert them into the feature store
    Ingest {
        /// Days of history to fetch, ending today
        #[arg(long, conflicts_with = "today")]
        days: Option<u32>,

        /// Only fetch today's observations
        #[arg(long)]
        today: bool,

        /// Also save the raw merged batch as CSV
        #[arg(long)]
        raw_csv: Option<PathBuf>,
    },
    /// Train all candidate models on stored features and keep the best
    Train {
        /// First day to train on (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day to train on, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Forecast the coming days with the trained model
    Predict {
        /// Print one average per day instead of hourly values
        #[arg(long)]
        daily: bool,
    },
    /// Show the metrics of the last training run
    Metrics,
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_milli_opt(23, 59, 59, 999).map(|dt| dt.and_utc())
}

fn settings(cli: &Cli) -> Settings {
    Settings::builder()
        .location(LatLon(cli.latitude, cli.longitude))
        .maybe_data_dir(cli.data_dir.clone())
        .maybe_artifact_dir(cli.artifact_dir.clone())
        .request_timeout(Duration::from_secs(cli.timeout_secs))
        .build()
}

fn print_metrics(metrics: &MetricsRecord) {
    println!("{:<20} {:>10} {:>10} {:>10}", "model", "MAE", "RMSE", "R2");
    for (name, scores) in metrics.iter() {
        println!(
            "{:<20} {:>10.3} {:>10.3} {:>10.4}",
            name, scores.mae, scores.rmse, scores.r2
        );
    }
}

fn print_hourly(predictions: &DataFrame) -> Result<()> {
    let view = predictions.select([TIME, PREDICTED])?;
    let times = view.column(TIME)?.as_materialized_series().datetime()?;
    let values = view.column(PREDICTED)?.as_materialized_series().f64()?;
    for (millis, value) in times.physical().into_iter().zip(values) {
        let (Some(millis), Some(value)) = (millis, value) else {
            continue;
        };
        if let Some(time) = DateTime::<Utc>::from_timestamp_millis(millis) {
            println!("{}  {:>7.1}", time.format("%Y-%m-%d %H:%M"), value);
        }
    }
    Ok(())
}

fn print_daily(daily: &DataFrame) -> Result<()> {
    let dates = daily.column(DATE)?.cast(&DataType::String)?;
    let dates = dates.as_materialized_series().str()?;
    let values = daily.column(AVG_AQI)?.as_materialized_series().f64()?;
    for (date, value) in dates.into_iter().zip(values) {
        if let (Some(date), Some(value)) = (date, value) {
            println!("{}  {:>7.1}", date, value);
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let client = AqiCast::with_settings(settings(&cli)).context("Failed to set up aqicast")?;

    match cli.command {
        Commands::Ingest {
            days,
            today,
            raw_csv,
        } => {
            let summary = client
                .ingest()
                .maybe_days(days)
                .today_only(today)
                .maybe_raw_csv(raw_csv)
                .call()
                .await?;
            println!(
                "Stored {} new and {} updated records ({} total)",
                summary.inserted, summary.updated, summary.total
            );
        }
        Commands::Train { start, end } => {
            let outcome = client
                .train()
                .maybe_start(start.and_then(start_of_day))
                .maybe_end(end.and_then(end_of_day))
                .call()
                .await?;
            print_metrics(&outcome.metrics);
            println!("Best model: {}", outcome.best_model_name);
        }
        Commands::Predict { daily } => {
            let predictions = client.forecast().await?;
            if daily {
                print_daily(&daily_average(&predictions)?)?;
            } else {
                print_hourly(&predictions)?;
            }
        }
        Commands::Metrics => match client.metrics()? {
            Some(metrics) => print_metrics(&metrics),
            None => println!("Metrics file not found."),
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<AqiCastError>() {
                Some(AqiCastError::ModelNotFound(_)) => {
                    eprintln!("Error: {}. Run `aqicast train` first.", e)
                }
                _ => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}
