use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::EnrichedCollection;
use crate::error::{BuildError, Result};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// What the writer produced, for the final report
#[derive(Debug, Clone, PartialEq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub bytes: u64,
    pub features: usize,
}

impl WriteSummary {
    pub fn megabytes(&self) -> f64 {
        self.bytes as f64 / BYTES_PER_MB
    }
}

/// Serialize a collection as compact UTF-8 JSON
pub fn to_json_bytes(collection: &EnrichedCollection) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(collection)
}

/// Write the collection to `path`, replacing any existing file.
///
/// The document is serialized in full before the file is created, so a
/// serialization failure never leaves a truncated file behind.
pub fn write_collection(path: &Path, collection: &EnrichedCollection) -> Result<WriteSummary> {
    let io_err = |source: std::io::Error| BuildError::Io {
        path: path.to_path_buf(),
        source,
    };

    let bytes = to_json_bytes(collection).map_err(|e| io_err(e.into()))?;

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes).map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    Ok(WriteSummary {
        path: path.to_path_buf(),
        bytes: bytes.len() as u64,
        features: collection.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EnrichedFeature, EnrichedProperties};
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn sample() -> EnrichedCollection {
        let props = EnrichedProperties {
            name: "Türkiye".to_string(),
            population: 85_000_000,
            gdp: 900_000_000_000,
            water_score: 6,
            water_resources: "Türkiye su kaynakları orta düzeyde; bölgesel farklılıklar mevcut."
                .to_string(),
            center: [39.0, 35.0],
        };
        EnrichedCollection::new(vec![EnrichedFeature::new(
            props,
            Some(json!({"type": "Point", "coordinates": [35.0, 39.0]})),
        )])
    }

    #[test]
    fn test_write_collection_size_matches_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("world.json");

        let summary = write_collection(&path, &sample()).unwrap();

        let metadata = fs::metadata(&path).unwrap();
        assert_eq!(metadata.len(), summary.bytes);
        assert_eq!(summary.features, 1);
        assert_eq!(summary.path, path);
    }

    #[test]
    fn test_output_is_compact_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("world.json");
        write_collection(&path, &sample()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"name\":\"Türkiye\""));
        assert!(!text.contains("\\u00fc"));
        assert!(!text.contains('\n'));
        assert!(!text.contains(": "));

        let back: EnrichedCollection = serde_json::from_str(&text).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_megabytes() {
        let summary = WriteSummary {
            path: PathBuf::from("world.json"),
            bytes: 3 * 1024 * 1024 / 2,
            features: 0,
        };
        assert!((summary.megabytes() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_write_to_missing_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no").join("such").join("world.json");
        let err = write_collection(&path, &sample()).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }
}
