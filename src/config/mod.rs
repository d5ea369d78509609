//! Build configuration, read from `galley.toml` in the project directory.
//!
//! If the file doesn't exist, a commented default is written and defaults are
//! used. Missing fields fall back to their defaults, so a minimal file only
//! needs the values that differ. The loaded [`Config`] is constructed once
//! and passed by reference into the repository and feed steps; nothing reads
//! process-wide state.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteMeta,
    pub api: ApiConfig,
    pub build: BuildConfig,
}

/// Site metadata consumed by the feed artifact.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteMeta {
    pub title: String,
    pub description: String,
    /// Canonical base URL entries link back to.
    pub url: Url,
    pub language: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "My Site".to_string(),
            description: String::new(),
            url: Url::parse("http://localhost:9877").expect("default site url"),
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the content service.
    pub base_url: String,
    pub timeout_secs: u64,
    /// Page size used when draining the post list.
    pub page_size: u32,
    /// Resource path the post endpoints live under.
    pub posts_resource: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 10,
            page_size: 10,
            posts_resource: "v1/posts".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub output_dir: PathBuf,
    pub feed_filename: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dist"),
            feed_filename: "atom.xml".to_string(),
        }
    }
}

impl BuildConfig {
    /// Directory the index artifacts are written to.
    pub fn data_dir(&self) -> PathBuf {
        self.output_dir.join("data")
    }

    pub fn feed_path(&self) -> PathBuf {
        self.output_dir.join(&self.feed_filename)
    }
}

impl Config {
    /// Load configuration from `path`, creating a commented default file if
    /// none exists. Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# Galley site configuration

[site]
# Shown as the feed title and used for canonical links.
title = "My Site"
description = ""
url = "http://localhost:9877"
language = "en"

[api]
# Content service the posts are fetched from.
base_url = "http://127.0.0.1:8000"
timeout_secs = 10
page_size = 10
posts_resource = "v1/posts"

[build]
output_dir = "dist"
feed_filename = "atom.xml"
"##
    }
}
