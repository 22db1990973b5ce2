//! Error type shared by the loader, the aggregations and the dashboard shell

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The measures file could not be opened or read.
    #[error("Failed to read {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was readable but is not a valid Arrow IPC / Feather table.
    #[error("Failed to decode {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: polars::prelude::PolarsError,
    },

    #[error("Table is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("Invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No callback is bound to component '{0}'")]
    UnknownComponent(String),

    #[error("Failed to render page: {0}")]
    Render(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
