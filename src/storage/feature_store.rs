use crate::fetch::fetcher::concat_frames;
use crate::storage::error::PersistenceError;
use crate::types::columns::TIME;
use chrono::{DateTime, Utc};
use log::{debug, info};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const FEATURES_FILE_NAME: &str = "features.parquet";

/// What an [`FeatureStore::upsert`] call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
    pub total: usize,
}

/// Persistent collection of feature records keyed by `time`.
pub trait FeatureStore {
    /// Replaces records whose timestamp already exists and inserts the rest.
    /// Within one batch the last row for a timestamp wins.
    fn upsert(&self, records: &DataFrame) -> Result<UpsertSummary, PersistenceError>;

    /// Records with `start <= time <= end`, sorted by time. A missing bound is
    /// unbounded on that side.
    fn query(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<DataFrame, PersistenceError>;
}

/// Feature store backed by a single parquet file.
#[derive(Debug, Clone)]
pub struct ParquetFeatureStore {
    path: PathBuf,
}

impl ParquetFeatureStore {
    /// Opens (creating the directory if needed) the store under `dir`.
    pub fn open(dir: &Path) -> Result<Self, PersistenceError> {
        fs::create_dir_all(dir).map_err(|e| PersistenceError::DirCreation(dir.to_path_buf(), e))?;
        let path = dir.join(FEATURES_FILE_NAME);
        debug!("Feature store at {:?}", path);
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Option<DataFrame>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        LazyFrame::scan_parquet(&self.path, Default::default())
            .and_then(LazyFrame::collect)
            .map(Some)
            .map_err(|e| PersistenceError::Parquet(self.path.clone(), e))
    }

    fn write_all(&self, mut df: DataFrame) -> Result<(), PersistenceError> {
        let dir = self.path.parent().unwrap_or(Path::new("."));
        let mut staged =
            NamedTempFile::new_in(dir).map_err(|e| PersistenceError::Write(self.path.clone(), e))?;
        ParquetWriter::new(staged.as_file_mut())
            .with_compression(ParquetCompression::Snappy)
            .finish(&mut df)
            .map_err(|e| PersistenceError::Parquet(self.path.clone(), e))?;
        staged
            .persist(&self.path)
            .map_err(|e| PersistenceError::Persist(self.path.clone(), e.error))?;
        Ok(())
    }

    fn invalid(&self, e: PolarsError) -> PersistenceError {
        PersistenceError::InvalidFrame(self.path.clone(), e.to_string())
    }
}

impl FeatureStore for ParquetFeatureStore {
    fn upsert(&self, records: &DataFrame) -> Result<UpsertSummary, PersistenceError> {
        let existing = self.read_all()?;
        if records.height() == 0 {
            debug!("Empty batch, store left untouched");
            let total = existing.map(|df| df.height()).unwrap_or(0);
            return Ok(UpsertSummary {
                total,
                ..Default::default()
            });
        }

        let batch_keys = records
            .clone()
            .lazy()
            .select([col(TIME)])
            .filter(col(TIME).is_not_null())
            .unique(None, UniqueKeepStrategy::Any);
        let batch_unique = batch_keys
            .clone()
            .collect()
            .map_err(|e| self.invalid(e))?
            .height();
        let updated = match &existing {
            Some(df) => batch_keys
                .semi_join(df.clone().lazy().select([col(TIME)]), col(TIME), col(TIME))
                .collect()
                .map_err(|e| self.invalid(e))?
                .height(),
            None => 0,
        };
        let inserted = batch_unique - updated;

        let mut frames = Vec::with_capacity(2);
        if let Some(df) = existing {
            frames.push(df);
        }
        frames.push(records.clone());
        let merged = concat_frames(frames)
            .and_then(|df| {
                df.lazy()
                    .filter(col(TIME).is_not_null())
                    .unique_stable(Some(vec![TIME.into()]), UniqueKeepStrategy::Last)
                    .sort([TIME], SortMultipleOptions::default())
                    .collect()
            })
            .map_err(|e| self.invalid(e))?;

        let total = merged.height();
        self.write_all(merged)?;
        info!(
            "Upserted {} records into {:?} ({} new, {} replaced, {} total)",
            batch_unique,
            self.path,
            inserted,
            updated,
            total
        );
        Ok(UpsertSummary {
            inserted,
            updated,
            total,
        })
    }

    fn query(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<DataFrame, PersistenceError> {
        let Some(df) = self.read_all()? else {
            debug!("No feature file at {:?} yet", self.path);
            return Ok(DataFrame::empty());
        };

        let mut frame = df.lazy();
        if let Some(start) = start {
            frame = frame.filter(
                col(TIME)
                    .cast(DataType::Int64)
                    .gt_eq(lit(start.timestamp_millis())),
            );
        }
        if let Some(end) = end {
            frame = frame.filter(
                col(TIME)
                    .cast(DataType::Int64)
                    .lt_eq(lit(end.timestamp_millis())),
            );
        }
        let result = frame
            .sort([TIME], SortMultipleOptions::default())
            .collect()
            .map_err(|e| PersistenceError::Parquet(self.path.clone(), e))?;
        debug!("Query returned {} records", result.height());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{frame_at, hour};
    use tempfile::tempdir;

    fn pm10(df: &DataFrame) -> Vec<Option<f64>> {
        df.column("pm10")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_upsert_is_idempotent() -> Result<(), PersistenceError> {
        let dir = tempdir().unwrap();
        let store = ParquetFeatureStore::open(dir.path())?;
        let batch = frame_at(&[0, 1, 2], &[("pm10", vec![Some(1.0), Some(2.0), Some(3.0)])]);

        let first = store.upsert(&batch)?;
        assert_eq!((first.inserted, first.updated, first.total), (3, 0, 3));
        let second = store.upsert(&batch)?;
        assert_eq!((second.inserted, second.updated, second.total), (0, 3, 3));

        let stored = store.query(None, None)?;
        assert_eq!(stored.height(), 3);
        assert!(stored.equals_missing(&batch));
        Ok(())
    }

    #[test]
    fn test_upsert_overwrites_matching_timestamps() -> Result<(), PersistenceError> {
        let dir = tempdir().unwrap();
        let store = ParquetFeatureStore::open(dir.path())?;
        store.upsert(&frame_at(&[0, 1], &[("pm10", vec![Some(1.0), Some(2.0)])]))?;
        let summary = store.upsert(&frame_at(&[2, 1], &[("pm10", vec![Some(30.0), Some(20.0)])]))?;
        assert_eq!((summary.inserted, summary.updated, summary.total), (1, 1, 3));

        let stored = store.query(None, None)?;
        assert_eq!(pm10(&stored), vec![Some(1.0), Some(20.0), Some(30.0)]);
        Ok(())
    }

    #[test]
    fn test_duplicate_in_batch_keeps_last() -> Result<(), PersistenceError> {
        let dir = tempdir().unwrap();
        let store = ParquetFeatureStore::open(dir.path())?;
        let batch = frame_at(&[5, 5, 6], &[("pm10", vec![Some(1.0), Some(9.0), Some(2.0)])]);
        let summary = store.upsert(&batch)?;
        assert_eq!(summary.total, 2);
        assert_eq!(pm10(&store.query(None, None)?), vec![Some(9.0), Some(2.0)]);
        Ok(())
    }

    #[test]
    fn test_repeated_existing_timestamp_counts_once() -> Result<(), PersistenceError> {
        let dir = tempdir().unwrap();
        let store = ParquetFeatureStore::open(dir.path())?;
        store.upsert(&frame_at(&[0, 1], &[("pm10", vec![Some(1.0), Some(2.0)])]))?;
        let batch = frame_at(
            &[1, 1, 2],
            &[("pm10", vec![Some(10.0), Some(11.0), Some(12.0)])],
        );
        let summary = store.upsert(&batch)?;
        assert_eq!((summary.inserted, summary.updated, summary.total), (1, 1, 3));
        assert_eq!(
            pm10(&store.query(None, None)?),
            vec![Some(1.0), Some(11.0), Some(12.0)]
        );
        Ok(())
    }

    #[test]
    fn test_query_ranges_are_inclusive() -> Result<(), PersistenceError> {
        let dir = tempdir().unwrap();
        let store = ParquetFeatureStore::open(dir.path())?;
        let values = (0..5).map(|v| Some(v as f64)).collect();
        store.upsert(&frame_at(&[0, 1, 2, 3, 4], &[("pm10", values)]))?;

        let start = hour(1).and_utc();
        let end = hour(3).and_utc();
        assert_eq!(store.query(Some(start), Some(end))?.height(), 3);
        assert_eq!(store.query(Some(start), None)?.height(), 4);
        assert_eq!(store.query(None, Some(end))?.height(), 4);
        assert_eq!(store.query(Some(end), Some(start))?.height(), 0);
        Ok(())
    }

    #[test]
    fn test_query_on_fresh_store_is_empty() -> Result<(), PersistenceError> {
        let dir = tempdir().unwrap();
        let store = ParquetFeatureStore::open(&dir.path().join("nested"))?;
        assert_eq!(store.query(None, None)?.height(), 0);
        assert_eq!(store.upsert(&DataFrame::empty())?.total, 0);
        assert!(!store.path().exists());
        Ok(())
    }
}
