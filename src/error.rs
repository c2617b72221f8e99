//! Error types shared across the crate

use thiserror::Error;

use crate::control::HRCC_MAX;

/// Errors raised by the control model and the connection layer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HrccError {
    /// Value does not fit in 14 bits
    #[error("value {0} is outside the 14-bit range 0-{max}", max = HRCC_MAX)]
    ValueOutOfRange(i64),

    /// Text could not be parsed as an integer value
    #[error("'{0}' is not an integer value")]
    InvalidValue(String),

    /// No control with this name exists
    #[error("unknown control '{0}'")]
    UnknownControl(String),

    /// Control names must be non-empty
    #[error("control name cannot be empty")]
    EmptyName,

    /// A message could not be encoded as a JSON frame
    #[error("failed to encode frame: {0}")]
    Encode(String),

    /// The transport has no live socket to write to
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),
}

impl From<serde_json::Error> for HrccError {
    fn from(e: serde_json::Error) -> Self {
        HrccError::Encode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HrccError>;
