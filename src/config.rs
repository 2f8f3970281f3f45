// src/config.rs
//! Configuration file parsing
//!
//! Settings come from, in order of precedence: command-line flags (applied
//! by the command layer), environment variables, a TOML file, built-in
//! defaults. The file is `--config PATH` when given, otherwise
//! `$XDG_CONFIG_HOME/bioarch-sync/config.toml` if it exists:
//!
//! ```toml
//! db_path = "/var/lib/bioarch-sync/sqlite.db"
//! bioarch_path = "/home/builder/BioArchLinux"
//! meta_path = "/srv/bioc-meta"
//! bioc_min_ver = "3.0"
//! bioc_meta_mirror = "https://bioconductor.org"
//! bioc_mirror = "https://bioconductor.org"
//! cran_mirror = "https://cran.r-project.org"
//! jobs = 4
//! ```

use crate::error::{Error, Result};
use crate::version::BiocVersion;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding `meta_path`
pub const META_PATH_ENV: &str = "BIO_META_PATH";

/// Environment variable overriding `db_path`
pub const DB_PATH_ENV: &str = "BIOARCH_SYNC_DB";

/// Tool settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Metadata database file
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Root of the recipe tree, one directory per package
    #[serde(default = "default_bioarch_path")]
    pub bioarch_path: PathBuf,

    /// Local metadata mirror
    #[serde(default = "default_meta_path")]
    pub meta_path: PathBuf,

    /// Oldest Bioconductor release to mirror and index
    #[serde(default = "default_bioc_min_ver")]
    pub bioc_min_ver: String,

    /// Server publishing the `bioc_version` release list
    #[serde(default = "default_bioc_mirror")]
    pub bioc_meta_mirror: String,

    /// Bioconductor mirror for `PACKAGES` indexes
    #[serde(default = "default_bioc_mirror")]
    pub bioc_mirror: String,

    /// CRAN mirror for `PACKAGES` indexes
    #[serde(default = "default_cran_mirror")]
    pub cran_mirror: String,

    /// Worker threads for batch updates (0 = one per CPU)
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bioarch_path: default_bioarch_path(),
            meta_path: default_meta_path(),
            bioc_min_ver: default_bioc_min_ver(),
            bioc_meta_mirror: default_bioc_mirror(),
            bioc_mirror: default_bioc_mirror(),
            cran_mirror: default_cran_mirror(),
            jobs: default_jobs(),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("bioarch-sync").join("sqlite.db"))
        .unwrap_or_else(|| PathBuf::from("sqlite.db"))
}

fn default_bioarch_path() -> PathBuf {
    PathBuf::from("BioArchLinux")
}

fn default_meta_path() -> PathBuf {
    PathBuf::from("bioc")
}

fn default_bioc_min_ver() -> String {
    "3.0".to_string()
}

fn default_bioc_mirror() -> String {
    "https://bioconductor.org".to_string()
}

fn default_cran_mirror() -> String {
    "https://cran.r-project.org".to_string()
}

fn default_jobs() -> usize {
    1
}

impl Config {
    /// Load settings from `path`, or from the default location
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    /// Environment overrides are applied before validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No configuration file, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::parse(&content)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// `$XDG_CONFIG_HOME/bioarch-sync/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bioarch-sync").join("config.toml"))
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(meta) = lookup(META_PATH_ENV).filter(|v| !v.is_empty()) {
            self.meta_path = PathBuf::from(meta);
        }
        if let Some(db) = lookup(DB_PATH_ENV).filter(|v| !v.is_empty()) {
            self.db_path = PathBuf::from(db);
        }
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        self.min_bioc_version()?;
        for (key, url) in [
            ("bioc_meta_mirror", &self.bioc_meta_mirror),
            ("bioc_mirror", &self.bioc_mirror),
            ("cran_mirror", &self.cran_mirror),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::ConfigError(format!(
                    "{} must be an http(s) url, got '{}'",
                    key, url
                )));
            }
        }
        Ok(())
    }

    /// `bioc_min_ver` as a version
    pub fn min_bioc_version(&self) -> Result<BiocVersion> {
        BiocVersion::parse(&self.bioc_min_ver)
            .map_err(|e| Error::ConfigError(format!("bioc_min_ver: {}", e)))
    }
}
