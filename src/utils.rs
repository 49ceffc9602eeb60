use std::io;
use std::path::{Path, PathBuf};

const DATA_DIR_NAME: &str = "aqicast";
const STORE_DIR_NAME: &str = "features";
const ARTIFACT_DIR_NAME: &str = "artifacts";

/// `<system data dir>/aqicast`, e.g. `~/.local/share/aqicast` on Linux.
pub fn get_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(DATA_DIR_NAME))
}

/// Where the feature store lives when nothing else is configured. Falls back to
/// a relative `data/` directory when the platform has no data dir.
pub fn default_store_dir() -> PathBuf {
    get_data_dir()
        .map(|p| p.join(STORE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Where model artifacts live when nothing else is configured.
pub fn default_artifact_dir() -> PathBuf {
    get_data_dir()
        .map(|p| p.join(ARTIFACT_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(ARTIFACT_DIR_NAME))
}

/// Creates `path` (and parents) if missing; errors if it exists but is not a directory.
pub fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    match std::fs::metadata(path) {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("Path exists but is not a directory: {}", path.display()),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("Creating directory: {}", path.display());
            std::fs::create_dir_all(path)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dir_exists_creates_nested() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
        // Second call is a no-op.
        ensure_dir_exists(&nested).unwrap();
    }

    #[test]
    fn test_ensure_dir_exists_rejects_file() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        assert!(ensure_dir_exists(&file).is_err());
    }
}
