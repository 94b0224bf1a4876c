use std::path::PathBuf;

use thiserror::Error;

/// Result alias for the data layer.
pub type Result<T> = std::result::Result<T, LoadError>;

// ---------------------------------------------------------------------------
// LoadError – everything that can go wrong while reading a dataset folder
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read table {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read WAV file {path}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// The `timestamps_<name>.txt` companion of an audio file is absent.
    #[error("Timestamp file not found: {0}")]
    MissingTimestamps(PathBuf),

    #[error("{path}: column '{column}' not found")]
    MissingColumn { path: PathBuf, column: String },

    #[error("{path}, row {row}, column '{column}': cannot parse '{value}'")]
    Parse {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    #[error("{path}, row {row}: invalid date/time")]
    InvalidTimestamp { path: PathBuf, row: usize },

    #[error("{path}, row {row}: expected {expected} fields, found {found}")]
    RaggedTable {
        path: PathBuf,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{path}: cannot read microphone index from column '{column}'")]
    MalformedMicColumn { path: PathBuf, column: String },

    #[error("Unsupported audio format in {path}: {detail}")]
    UnsupportedFormat { path: PathBuf, detail: String },

    /// The folder does not hold the audio files its mode requires.
    #[error("Unexpected audio file in folder {}", .dir.display())]
    UnexpectedAudio { dir: PathBuf },
}

impl LoadError {
    /// Fatal errors end the process; the caller decides how.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LoadError::UnexpectedAudio { .. })
    }
}
