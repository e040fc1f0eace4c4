use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading one of the two source datasets.
///
/// Every variant is fatal: the dashboard cannot start without a joined table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension .{extension} ({path})")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("malformed {format} in {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("{path} has no worksheet")]
    NoWorksheet { path: PathBuf },

    #[error("{path} is missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },
}

impl LoadError {
    pub(crate) fn parse(path: &std::path::Path, format: &'static str, err: impl ToString) -> Self {
        LoadError::Parse {
            path: path.to_path_buf(),
            format,
            message: err.to_string(),
        }
    }
}
