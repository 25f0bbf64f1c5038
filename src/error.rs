//! Error types for the snapshot pipeline and verifiers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting or verifying a document
#[derive(Error, Debug)]
pub enum Error {
    /// Classification and filtering left nothing to emit
    #[error("No visible elements found in the rendered page")]
    NoVisibleUnits,

    /// A readiness wait did not settle in time
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Reading the input or writing the output failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The in-page capture returned something that is not a rendered tree
    #[error("Capture failed: {0}")]
    Capture(String),

    /// Unexpected failure while analyzing an emitted document
    #[error("Verification failed: {0}")]
    Verify(String),

    /// The page automation session could not be started or driven
    #[error("Session error: {0}")]
    Session(String),

    /// The browser rejected or failed a protocol command
    #[cfg(feature = "cdp")]
    #[error("CDP error: {0}")]
    CdpError(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::CdpError(format!("{:#}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Capture(err.to_string())
    }
}
