//! Error types for the ambient parts of the crate. The scoring engine itself
//! is total and never returns these.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("corpus not found: {name}")]
    NotFound { name: String },

    #[error("corpus {name} is not valid utf-8")]
    Encoding { name: String },

    #[error("corpus {name} could not be parsed: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("corpus {name} has no entries")]
    Empty { name: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("no data directory available for round history")]
    NoDataDir,

    #[error("history io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history csv error: {0}")]
    Csv(#[from] csv::Error),
}
