pub mod error;
pub mod fetcher;
pub mod hourly_response;

pub use error::FetchError;
pub use fetcher::{merge_on_time, ObservationFetcher};
