use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::ChartId;
use crate::reactive::SelectorId;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("failed to open dataset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: io::Error,
    },

    #[error("malformed dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset is missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("dataset contains no records")]
    EmptyDataset,

    #[error("no {selector} named `{key}`")]
    NotFound { selector: SelectorId, key: String },

    #[error("chart `{chart}` is not bound to the {selector} selector")]
    SelectorMismatch { chart: ChartId, selector: SelectorId },

    #[error("chart `{0}` is static and has no selector")]
    NotReactive(ChartId),

    #[error("failed to open log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        source: io::Error,
    },

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        source: io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl DashError {
    /// Whether the error belongs to a single selection rather than to startup.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DashError::NotFound { .. })
    }
}
