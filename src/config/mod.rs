use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::Resolution;
use crate::error::{BuildError, Result};
use crate::synth::{Locale, NameHash};

/// Upstream dataset for the 1:50m (high) scale
pub const DEFAULT_HIGH_URL: &str =
    "https://raw.githubusercontent.com/datasets/geo-countries/master/data/countries.geojson";

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_cache_file() -> String {
    "ne_{scale}m_admin_0_countries.geojson".to_string()
}
fn default_use_cache() -> bool {
    true
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_user_agent() -> String {
    format!(
        "Mozilla/5.0 (compatible; worldjson/{})",
        env!("CARGO_PKG_VERSION")
    )
}
fn default_high_url() -> String {
    DEFAULT_HIGH_URL.to_string()
}
fn default_name_keys() -> Vec<String> {
    ["NAME_EN", "ADMIN", "NAME", "name"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

/// Settings read from `worldjson.toml`. Every field is optional so the CLI
/// can tell "not set" apart from a value that happens to equal the default.
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub scale: Option<Resolution>,
    #[serde(default)]
    pub out: Option<PathBuf>,
    #[serde(default)]
    pub locale: Option<Locale>,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub source: Option<SourceConfig>,
    #[serde(default)]
    pub names: Option<NameKeys>,
    #[serde(default)]
    pub synth: Option<SynthConfig>,
}

/// Dataset URLs by resolution
#[derive(Debug, Deserialize, Clone)]
pub struct SourceUrls {
    #[serde(rename = "50m", default = "default_high_url")]
    pub high: String,
    #[serde(rename = "110m", default)]
    pub medium: Option<String>,
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            high: default_high_url(),
            medium: Some(DEFAULT_HIGH_URL.to_string()),
        }
    }
}

impl SourceUrls {
    /// URL for a resolution; a missing 110m entry falls back to the 50m one
    pub fn url_for(&self, resolution: Resolution) -> &str {
        match resolution {
            Resolution::High => &self.high,
            Resolution::Medium => self.medium.as_deref().unwrap_or(&self.high),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default)]
    pub urls: SourceUrls,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// File name inside `cache_dir`; `{scale}` is replaced with 50 or 110
    #[serde(default = "default_cache_file")]
    pub cache_file: String,
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            urls: SourceUrls::default(),
            cache_dir: default_cache_dir(),
            cache_file: default_cache_file(),
            use_cache: default_use_cache(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl SourceConfig {
    pub fn url_for(&self, resolution: Resolution) -> &str {
        self.urls.url_for(resolution)
    }

    pub fn cache_path(&self, resolution: Resolution) -> PathBuf {
        let file = self
            .cache_file
            .replace("{scale}", &resolution.scale().to_string());
        self.cache_dir.join(file)
    }

    pub fn validate(&self) -> Result<()> {
        for url in [Some(self.urls.high.as_str()), self.urls.medium.as_deref()]
            .into_iter()
            .flatten()
        {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(BuildError::Config(format!(
                    "source URL must be http(s): {url:?}"
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(BuildError::Config(
                "source.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.cache_file.is_empty() {
            return Err(BuildError::Config(
                "source.cache_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Property keys tried, in order, when picking a feature's display name
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct NameKeys {
    #[serde(default = "default_name_keys")]
    pub keys: Vec<String>,
}

impl Default for NameKeys {
    fn default() -> Self {
        Self {
            keys: default_name_keys(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthConfig {
    #[serde(default)]
    pub hash: NameHash,
}

/// Everything the enricher needs, resolved from defaults, file and flags
#[derive(Debug, Clone, Default)]
pub struct EnrichConfig {
    pub names: NameKeys,
    pub synth: SynthConfig,
    pub locale: Locale,
}

/// Values given on the command line. `None` or `false` means "not given",
/// so the config file (then the built-in default) decides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub scale: Option<Resolution>,
    pub out: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub no_cache: bool,
    pub locale: Option<Locale>,
    pub verbose: bool,
}

/// Final settings for one run
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub resolution: Resolution,
    pub output: PathBuf,
    pub verbose: bool,
    pub source: SourceConfig,
    pub enrich: EnrichConfig,
}

pub const DEFAULT_OUTPUT: &str = "world.json";

/// Merge flags over the config file over built-in defaults
pub fn resolve(cli: &CliOverrides, file: FileConfig) -> ResolvedConfig {
    let mut source = file.source.unwrap_or_default();
    if let Some(dir) = &cli.cache_dir {
        source.cache_dir = dir.clone();
    }
    if cli.no_cache {
        source.use_cache = false;
    }

    ResolvedConfig {
        resolution: cli.scale.or(file.scale).unwrap_or_default(),
        output: cli
            .out
            .clone()
            .or(file.out)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
        verbose: cli.verbose || file.verbose,
        source,
        enrich: EnrichConfig {
            names: file.names.unwrap_or_default(),
            synth: file.synth.unwrap_or_default(),
            locale: cli.locale.or(file.locale).unwrap_or_default(),
        },
    }
}

impl FileConfig {
    /// Read an explicit config file. Unlike [`FileConfig::load`], a missing or
    /// unparsable file is an error.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BuildError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let contents = std::fs::read_to_string(path).map_err(|source| BuildError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents)
            .map_err(|e| BuildError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Search the standard locations and return the first config that parses
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => {
                        log::debug!("Loaded config from {}", path.display());
                        return Some(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to parse config file {}: {}", path.display(), e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("worldjson.toml"));
    paths.push(PathBuf::from(".worldjson.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("worldjson").join("config.toml"));
        paths.push(config_dir.join("worldjson.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".worldjson.toml"));
        paths.push(home.join(".config").join("worldjson").join("config.toml"));
    }

    paths
}
