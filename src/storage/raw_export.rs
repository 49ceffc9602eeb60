use crate::storage::error::PersistenceError;
use log::info;
use polars::prelude::*;
use std::fs;
use std::path::Path;

/// Writes a raw merged batch as CSV with a header row, creating parent
/// directories as needed.
pub fn write_raw_csv(df: &DataFrame, path: &Path) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| PersistenceError::DirCreation(parent.to_path_buf(), e))?;
    }
    let file = fs::File::create(path).map_err(|e| PersistenceError::Write(path.to_path_buf(), e))?;
    let mut df = df.clone();
    CsvWriter::new(file)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| PersistenceError::Csv(path.to_path_buf(), e))?;
    info!("Saved {} raw records to {:?}", df.height(), path);
    Ok(())
}
