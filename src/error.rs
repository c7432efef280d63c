use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a whole build.
///
/// Per-feature problems (bad geometry, missing names) never surface here;
/// they degrade to defaults inside the enricher.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Transport-level failure talking to the upstream dataset host
    #[error("failed to download {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered, but not with a success status
    #[error("{url} returned error status: {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// Top-level document is not a usable FeatureCollection
    #[error("malformed FeatureCollection: {0}")]
    Malformed(String),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BuildError {
    /// True for failures caused by the network source rather than local data
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, BuildError::Fetch { .. } | BuildError::HttpStatus { .. })
    }

    /// Process exit code for this failure kind.
    ///
    /// Download failures exit with 2, everything else with 1.
    pub fn exit_code(&self) -> u8 {
        if self.is_fetch_failure() { 2 } else { 1 }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let status = BuildError::HttpStatus {
            url: "https://example.invalid/world.geojson".to_string(),
            status: 503,
        };
        assert!(status.is_fetch_failure());
        assert_eq!(status.exit_code(), 2);

        let malformed = BuildError::Malformed("missing `features`".to_string());
        assert!(!malformed.is_fetch_failure());
        assert_eq!(malformed.exit_code(), 1);
    }

    #[test]
    fn test_display_includes_context() {
        let err = BuildError::HttpStatus {
            url: "https://example.invalid/a".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "https://example.invalid/a returned error status: 404"
        );
    }
}
