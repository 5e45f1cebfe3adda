//! Errors reported by the mapping platform.

use thiserror::Error;

/// Closed classification of a platform failure.
///
/// The platform's own error hierarchy is open-ended; everything this crate
/// does not explicitly recognise lands in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformErrorKind {
    /// The device has no usable network connection.
    NoInternet,
    /// Authentication failed; carries the platform's failure code.
    Authentication(String),
    /// A requested resource does not exist.
    NotFound,
    /// Anything else.
    Other,
}

/// An error returned by a platform operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PlatformError {
    pub kind: PlatformErrorKind,
    pub message: String,
}

impl PlatformError {
    pub fn new(kind: PlatformErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn no_internet(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorKind::NoInternet, message)
    }

    pub fn authentication(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(PlatformErrorKind::Authentication(code.into()), message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorKind::Other, message)
    }

    /// Whether this error signals a connectivity failure.
    pub fn is_no_internet(&self) -> bool {
        self.kind == PlatformErrorKind::NoInternet
    }
}
