use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::SourceConfig;
use crate::error::{BuildError, Result};

/// Natural Earth scale of the boundary dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(try_from = "u32")]
pub enum Resolution {
    /// 1:50m
    #[default]
    #[value(name = "50")]
    High,
    /// 1:110m
    #[value(name = "110")]
    Medium,
}

impl Resolution {
    pub fn scale(self) -> u32 {
        match self {
            Resolution::High => 50,
            Resolution::Medium => 110,
        }
    }
}

impl TryFrom<u32> for Resolution {
    type Error = String;

    fn try_from(scale: u32) -> std::result::Result<Self, Self::Error> {
        match scale {
            50 => Ok(Resolution::High),
            110 => Ok(Resolution::Medium),
            other => Err(format!("unsupported scale {other}, expected 50 or 110")),
        }
    }
}

/// Somewhere a raw FeatureCollection document can be loaded from
pub trait Source {
    fn load(&self) -> Result<Value>;

    /// Human-readable origin, for progress output
    fn describe(&self) -> String;
}

/// A GeoJSON file already on disk
#[derive(Debug, Clone)]
pub struct CacheFile {
    pub path: PathBuf,
}

impl CacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl Source for CacheFile {
    fn load(&self) -> Result<Value> {
        read_json_file(&self.path)
    }

    fn describe(&self) -> String {
        format!("local file {}", self.path.display())
    }
}

fn read_json_file(path: &Path) -> Result<Value> {
    let bytes = std::fs::read(path).map_err(|source| BuildError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| BuildError::Parse {
        origin: path.display().to_string(),
        source,
    })
}

/// Blocking HTTP GET of the upstream dataset
#[derive(Debug, Clone)]
pub struct HttpSource {
    pub url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            user_agent: user_agent.into(),
            timeout,
        }
    }

    fn fetch_error(&self, source: reqwest::Error) -> BuildError {
        BuildError::Fetch {
            url: self.url.clone(),
            source,
        }
    }
}

impl Source for HttpSource {
    fn load(&self) -> Result<Value> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.timeout)
            .build()
            .map_err(|e| self.fetch_error(e))?;

        log::debug!("GET {}", self.url);
        let response = client
            .get(&self.url)
            .send()
            .map_err(|e| self.fetch_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BuildError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        // Read the body first so a bad document is a parse error, not a fetch error
        let body = response.bytes().map_err(|e| self.fetch_error(e))?;
        log::debug!("Downloaded {} bytes from {}", body.len(), self.url);

        serde_json::from_slice(&body).map_err(|source| BuildError::Parse {
            origin: self.url.clone(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Use the local cache file when present, otherwise fall back to `fetch`
#[derive(Debug, Clone)]
pub struct CacheThenFetch<F> {
    pub cache: CacheFile,
    pub fetch: F,
}

impl<F: Source> CacheThenFetch<F> {
    pub fn new(cache: CacheFile, fetch: F) -> Self {
        Self { cache, fetch }
    }
}

impl<F: Source> Source for CacheThenFetch<F> {
    fn load(&self) -> Result<Value> {
        if self.cache.exists() {
            log::info!("Using cached dataset {}", self.cache.path.display());
            return self.cache.load();
        }
        log::info!(
            "No cached dataset at {}, downloading {}",
            self.cache.path.display(),
            self.fetch.describe()
        );
        self.fetch.load()
    }

    fn describe(&self) -> String {
        if self.cache.exists() {
            self.cache.describe()
        } else {
            self.fetch.describe()
        }
    }
}

/// Build the configured source strategy for a resolution
pub fn source_for(config: &SourceConfig, resolution: Resolution) -> Box<dyn Source> {
    let http = HttpSource::new(
        config.url_for(resolution),
        config.user_agent.as_str(),
        Duration::from_secs(config.timeout_secs),
    );

    if config.use_cache {
        let cache = CacheFile::new(config.cache_path(resolution));
        Box::new(CacheThenFetch::new(cache, http))
    } else {
        Box::new(http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;
    use std::fs;
    use std::net::TcpListener;
    use tempfile::tempdir;

    /// In-memory stand-in for the network source that counts calls
    struct FakeFetch {
        doc: Value,
        calls: Cell<usize>,
    }

    impl Source for FakeFetch {
        fn load(&self) -> Result<Value> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.doc.clone())
        }

        fn describe(&self) -> String {
            "fake".to_string()
        }
    }

    fn fake(doc: Value) -> FakeFetch {
        FakeFetch {
            doc,
            calls: Cell::new(0),
        }
    }

    #[test]
    fn test_resolution_from_scale() {
        assert_eq!(Resolution::try_from(50), Ok(Resolution::High));
        assert_eq!(Resolution::try_from(110), Ok(Resolution::Medium));
        assert!(Resolution::try_from(10).is_err());
        assert_eq!(Resolution::Medium.scale(), 110);
        assert_eq!(Resolution::default(), Resolution::High);
    }

    #[test]
    fn test_cache_file_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("world.geojson");
        fs::write(&path, r#"{"type":"FeatureCollection","features":[]}"#).unwrap();

        let doc = CacheFile::new(&path).load().unwrap();
        assert_eq!(doc["type"], "FeatureCollection");
    }

    #[test]
    fn test_cache_file_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("world.geojson");
        fs::write(&path, "{not json").unwrap();

        let err = CacheFile::new(&path).load().unwrap_err();
        assert!(matches!(err, BuildError::Parse { .. }));
        assert!(!err.is_fetch_failure());
    }

    #[test]
    fn test_cache_file_missing() {
        let dir = tempdir().unwrap();
        let err = CacheFile::new(dir.path().join("absent.geojson"))
            .load()
            .unwrap_err();
        assert!(matches!(err, BuildError::Read { .. }));
    }

    #[test]
    fn test_cache_preferred_over_fetch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ne_50m_admin_0_countries.geojson");
        fs::write(&path, r#"{"features":[{"properties":{"NAME":"Cached"}}]}"#).unwrap();

        let source = CacheThenFetch::new(CacheFile::new(&path), fake(json!({"features": []})));
        let doc = source.load().unwrap();

        assert_eq!(doc["features"][0]["properties"]["NAME"], "Cached");
        assert_eq!(source.fetch.calls.get(), 0);
        assert!(source.describe().starts_with("local file"));
    }

    #[test]
    fn test_fetch_when_cache_absent() {
        let dir = tempdir().unwrap();
        let cache = CacheFile::new(dir.path().join("missing.geojson"));
        let source = CacheThenFetch::new(cache, fake(json!({"features": [1]})));

        let doc = source.load().unwrap();
        assert_eq!(doc["features"][0], 1);
        assert_eq!(source.fetch.calls.get(), 1);
        assert_eq!(source.describe(), "fake");
    }

    #[test]
    fn test_http_connection_failure_is_fetch_error() {
        // Bind an ephemeral port and release it so it is known to be closed
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let source = HttpSource::new(
            format!("http://127.0.0.1:{port}/world.geojson"),
            "worldjson-test",
            Duration::from_secs(5),
        );
        let err = source.load().unwrap_err();
        assert!(err.is_fetch_failure());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_source_for_respects_use_cache() {
        let dir = tempdir().unwrap();
        let config = SourceConfig {
            cache_dir: dir.path().to_path_buf(),
            ..SourceConfig::default()
        };
        fs::write(
            dir.path().join("ne_110m_admin_0_countries.geojson"),
            r#"{"features":[]}"#,
        )
        .unwrap();

        let source = source_for(&config, Resolution::Medium);
        assert!(source.describe().starts_with("local file"));
        assert_eq!(source.load().unwrap()["features"], json!([]));

        let no_cache = SourceConfig {
            use_cache: false,
            ..config
        };
        let source = source_for(&no_cache, Resolution::Medium);
        assert_eq!(source.describe(), no_cache.url_for(Resolution::Medium));
    }
}
