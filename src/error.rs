use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a rename pass.
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("could not create output directory {path}: {source}")]
    CreateOutputDir { path: PathBuf, source: io::Error },
    #[error("could not rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("could not copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("{path} has no file name")]
    NoFileName { path: PathBuf },
    #[error("{path} has no parent directory")]
    NoParent { path: PathBuf },
    #[error("no sequence number left for {path} after {last}")]
    NumbersExhausted { path: PathBuf, last: i64 },
}

/// Rejected pass configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("output path {0} exists and is not a directory")]
    OutputNotDirectory(PathBuf),
}
