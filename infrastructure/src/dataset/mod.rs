//! Dataset files
//!
//! A dataset is a JSON document with one array per table, in the shape of
//! [`Dataset`]. Every array is optional:
//!
//! ```json
//! {
//!   "organizations": [{ "id": 1, "name": "Dalhousie University", "address": "Halifax" }],
//!   "researchers": [{ "id": 1, "first_name": "Ada", "last_name": "Lovelace",
//!                     "email": "ada@example.org", "organization": 1 }],
//!   "reviewers": [1]
//! }
//! ```

use council_application::Dataset;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading a dataset file.
#[derive(Error, Debug)]
pub enum DatasetFileError {
    #[error("Cannot read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dataset {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and parse a dataset file.
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Dataset, DatasetFileError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| DatasetFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DatasetFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
