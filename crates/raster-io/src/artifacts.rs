//! JSON artifact files.
//!
//! Writers go through a temporary file in the destination directory followed
//! by a rename, so a reader sees either the previous file or the complete new
//! one.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use heat_common::{DetectionResult, StoredDetection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{RasterError, Result};
use crate::geotiff::encode_geotiff;
use crate::raster::Raster;

/// Parse a JSON artifact.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RasterError::NotFound(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|e| RasterError::json(path, e))
}

/// Serialize `value` as pretty JSON and atomically replace `path`.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let body = serde_json::to_vec_pretty(value).map_err(|e| RasterError::json(path, e))?;
    persist_atomic(path, |file| {
        file.write_all(&body)?;
        Ok(())
    })
}

/// Encode `raster` as GeoTIFF and atomically replace `path`.
pub fn write_geotiff_atomic(path: impl AsRef<Path>, raster: &Raster) -> Result<()> {
    persist_atomic(path.as_ref(), |file| encode_geotiff(raster, file))
}

fn persist_atomic<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    fill(tmp.as_file_mut())?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| RasterError::Io(e.error))?;
    debug!(path = %path.display(), "Persisted artifact");
    Ok(())
}

/// Load a heat island artifact in either the current or the legacy list
/// shape, normalized to a [`DetectionResult`].
pub fn load_detection(path: impl AsRef<Path>) -> Result<DetectionResult> {
    let stored: StoredDetection = read_json(path)?;
    Ok(stored.into_result())
}

#[cfg(test)]
mod tests {
    use super::*;
    use heat_common::{GeoPoint, HeatIsland, Severity};

    #[test]
    fn test_write_then_read_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let value = serde_json::json!({"min": 20.5, "max": 41.2});
        write_json_atomic(&path, &value).unwrap();

        let back: serde_json::Value = read_json(&path).unwrap();
        assert_eq!(back, value);
        // Only the artifact remains, no temp files
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json::<serde_json::Value>(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, RasterError::NotFound(_)));
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heat_islands.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(matches!(
            load_detection(&path),
            Err(RasterError::Json { .. })
        ));
    }

    #[test]
    fn test_load_detection_current_and_legacy() {
        let dir = tempfile::tempdir().unwrap();
        let islands = vec![
            HeatIsland::new(1, 28.0, 29.0, 2.5, Severity::Medium, 11, None),
            HeatIsland::new(2, 31.0, 33.0, 5.5, Severity::High, 20, Some(GeoPoint::new(-118.2, 34.0))),
        ];

        let legacy = dir.path().join("legacy.json");
        write_json_atomic(&legacy, &islands).unwrap();
        let result = load_detection(&legacy).unwrap();
        assert_eq!(result.total_count, 2);
        assert_eq!(result.heat_islands[0].id, "hi_2");

        let current = dir.path().join("current.json");
        write_json_atomic(&current, &result).unwrap();
        assert_eq!(load_detection(&current).unwrap(), result);
    }
}
