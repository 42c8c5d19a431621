//! Error type shared by every calculator in the crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RfError>;

#[derive(Debug, Error)]
pub enum RfError {
    /// Input rejected by a domain check (non-positive length, VSWR < 1,
    /// invalid waveguide mode, duplicate cable frequency, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A synthesis target that cannot be reached with physical dimensions.
    #[error("target unreachable: {0}")]
    Unreachable(String),

    /// Raw pattern text without usable rows.
    #[error("pattern parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RfError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        RfError::InvalidInput(msg.into())
    }
}
