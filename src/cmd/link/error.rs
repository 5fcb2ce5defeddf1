use {
    std::{io, path::PathBuf},
    thiserror::Error,
};

/// Errors raised while linking. Every one of them aborts the run.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("expected a file, got: {0:?}")]
    NotAFile(PathBuf),

    #[error("invalid configuration in {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("module {reference:?} not found in any search root")]
    ModuleNotFound { reference: String },

    #[error("module file {0:?} is outside of the entry directory")]
    OutsideBase(PathBuf),

    #[error("failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
