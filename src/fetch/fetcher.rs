use crate::config::{LatLon, Settings};
use crate::fetch::error::FetchError;
use crate::fetch::hourly_response::HourlyBody;
use crate::types::columns::TIME;
use crate::types::date_window::DateWindow;
use crate::types::endpoint::{Endpoint, EndpointUrls, WeatherSource};
use log::{debug, info, warn};
use polars::prelude::*;
use reqwest::Client;
use std::time::Duration;

/// Inner join of a weather frame and an air-quality frame on `time`.
///
/// Rows whose timestamp appears in only one input are dropped. A timestamp
/// repeated in both inputs yields the cross product of its rows.
pub fn merge_on_time(weather: DataFrame, air: DataFrame) -> PolarsResult<DataFrame> {
    weather
        .lazy()
        .inner_join(air.lazy(), col(TIME), col(TIME))
        .collect()
}

/// Downloads hourly observations for a fixed location from the Open-Meteo
/// weather and air-quality endpoints.
#[derive(Debug, Clone)]
pub struct ObservationFetcher {
    client: Client,
    location: LatLon,
    urls: EndpointUrls,
}

impl ObservationFetcher {
    pub fn new(location: LatLon, urls: EndpointUrls, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self {
            client,
            location,
            urls,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        Self::new(
            settings.location,
            settings.endpoints.clone(),
            settings.request_timeout,
        )
    }

    pub fn location(&self) -> LatLon {
        self.location
    }

    /// Fetches one endpoint for `window` and returns its `hourly` block as a frame.
    pub async fn fetch_hourly(
        &self,
        endpoint: Endpoint,
        window: DateWindow,
    ) -> Result<DataFrame, FetchError> {
        let url = self.urls.url(endpoint).to_string();
        info!("Fetching {} data for {} from {}", endpoint, window, url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", self.location.0.to_string()),
                ("longitude", self.location.1.to_string()),
                ("start_date", window.start_param()),
                ("end_date", window.end_param()),
                ("hourly", endpoint.hourly_param()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    FetchError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    FetchError::NetworkRequest(url, e)
                });
            }
        };

        let body: HourlyBody = response
            .json()
            .await
            .map_err(|e| FetchError::JsonDecode(url.clone(), e))?;
        let frame = body.into_frame(&url)?;
        debug!(
            "Parsed {} rows x {} columns from {}",
            frame.height(),
            frame.width(),
            endpoint
        );
        Ok(frame)
    }

    /// Fetches weather (from `source`) and air quality for `window` and merges them on time.
    pub async fn fetch_observations(
        &self,
        window: DateWindow,
        source: WeatherSource,
    ) -> Result<DataFrame, FetchError> {
        let weather = self.fetch_hourly(source.endpoint(), window).await?;
        let air = self.fetch_hourly(Endpoint::AirQuality, window).await?;
        let merged = merge_on_time(weather, air).map_err(FetchError::Merge)?;
        info!("Retrieved {} hourly records for {}", merged.height(), window);
        Ok(merged)
    }

    /// Fetches archived observations for `window` in consecutive chunks of
    /// `chunk_days` days. Any failing chunk fails the whole call.
    pub async fn fetch_history(
        &self,
        window: DateWindow,
        chunk_days: u32,
    ) -> Result<DataFrame, FetchError> {
        let chunks = window.chunks(chunk_days);
        let mut frames = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            frames.push(self.fetch_observations(chunk, WeatherSource::Archive).await?);
        }
        let history = concat_frames(frames).map_err(FetchError::Merge)?;
        info!(
            "Fetched {} hourly records of history for {}",
            history.height(),
            window
        );
        Ok(history)
    }
}

/// Stacks frames vertically, unioning their columns.
pub(crate) fn concat_frames(frames: Vec<DataFrame>) -> PolarsResult<DataFrame> {
    if frames.is_empty() {
        return Ok(DataFrame::empty());
    }
    let lazy_frames: Vec<LazyFrame> = frames.into_iter().map(DataFrame::lazy).collect();
    concat_lf_diagonal(
        lazy_frames,
        UnionArgs {
            to_supertypes: true,
            ..Default::default()
        },
    )?
    .collect()
}
