//! Configuration file support for scoutviz
//!
//! Reads from scoutviz.toml

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "scoutviz.toml";

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Config {
    /// Measures file and category selection
    #[serde(default)]
    pub data: DataConfig,

    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Page headings
    #[serde(default)]
    pub page: PageConfig,

    /// Data table settings
    #[serde(default)]
    pub table: TableConfig,

    /// Histogram labels
    #[serde(default)]
    pub chart: ChartConfig,

    /// Directory the config file was read from; relative data paths resolve against it
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DataConfig {
    /// Feather / Arrow IPC file holding the team measures
    /// Default: "team-measures.feather"
    #[serde(default = "default_data_path")]
    pub path: PathBuf,

    /// Tasks starting with this prefix are totalled
    /// Default: "cube"
    #[serde(default = "default_task_prefix")]
    pub task_prefix: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PageConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_subtitle")]
    pub subtitle: String,
}

/// Which table seeds the interactive data table
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableSource {
    /// Per team/match/phase category totals
    #[default]
    Summary,
    /// The raw measures as loaded
    Measures,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TableConfig {
    #[serde(default)]
    pub source: TableSource,

    /// Rows per table page
    /// Default: 15
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChartConfig {
    /// Plural name of the counted game piece, used in titles and axis labels
    /// Default: "Cubes"
    #[serde(default = "default_category_label")]
    pub category_label: String,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("team-measures.feather")
}

fn default_task_prefix() -> String {
    "cube".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8050
}

fn default_title() -> String {
    "Example Scouting Dashboard".to_string()
}

fn default_subtitle() -> String {
    "Scouting Data from Galileo Division, 2023".to_string()
}

fn default_page_size() -> usize {
    15
}

fn default_category_label() -> String {
    "Cubes".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            task_prefix: default_task_prefix(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: default_subtitle(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            source: TableSource::default(),
            page_size: default_page_size(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            category_label: default_category_label(),
        }
    }
}

impl Config {
    /// Load config from the nearest scoutviz.toml
    /// Returns default config if no file is found or it doesn't parse
    pub fn load() -> Self {
        if let Some(path) = Self::find_config_path() {
            match Self::load_from(&path) {
                Ok(config) => return config,
                Err(e) => log::warn!("Ignoring {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Storage {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&contents).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Find scoutviz.toml by walking up directory tree
    fn find_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut dir = current_dir.as_path();

        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
        None
    }

    /// Measures file location, relative paths anchored at the config file's directory
    pub fn data_path(&self) -> PathBuf {
        match &self.base_dir {
            Some(base) if self.data.path.is_relative() => base.join(&self.data.path),
            _ => self.data.path.clone(),
        }
    }

    /// Address the dashboard listens on
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
