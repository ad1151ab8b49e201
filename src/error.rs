use std::path::PathBuf;
use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, ProbeError>;

#[derive(ThisError,Debug)]
pub enum ProbeError {
    #[error("DlOpen Error: {0}")]
    DlOpenError(#[from] dlopen2::Error),
    #[error("Unable to dlopen: {}: {reason}", .path.display())]
    OpenLibrary { path: PathBuf, reason: String },
    #[error("Unable to find {symbol} symbol in {}", .path.display())]
    MissingSymbol { symbol: &'static str, path: PathBuf },
    #[error("oftr_call: invalid arguments")]
    InvalidArguments,
    #[error("oftr_call: internal error")]
    InternalError,
    #[error("oftr_call: {0}")]
    CallFailed(String),
    #[error("oftr_call: output needs {0} bytes")]
    BufferTooSmall(usize),
    #[error("'{actual}' does not match '{pattern}'")]
    VersionMismatch { actual: String, pattern: &'static str },
}
