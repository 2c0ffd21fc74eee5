use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures that abort a whole batch run.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("input file {} not found", path.display())]
    NotFound { path: PathBuf },
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("column '{column}' not found (available: {available})")]
    MissingColumn { column: String, available: String },
    #[error("malformed CSV: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },
    #[error("{results} results for {rows} rows")]
    RowMismatch { rows: usize, results: usize },
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BatchError {
    pub(crate) fn open(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Open {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub(crate) fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<csv::Error> for BatchError {
    fn from(source: csv::Error) -> Self {
        Self::Csv { source }
    }
}
