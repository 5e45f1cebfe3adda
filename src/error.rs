//! User-facing error taxonomy.
//!
//! Every failure that reaches the view state is one of these variants. Each
//! carries a stable display string (`user_message`) for the presentation
//! layer and a diagnostic string (`details`) for logs.

use thiserror::Error;

use crate::platform::{PlatformError, PlatformErrorKind};

/// Authentication failure sub-kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorKind {
    CredentialCannotBeShared,
    Forbidden,
    InvalidApiKey,
    InvalidCredentials,
    InvalidToken,
    SslRequired,
    TokenExpired,
    TokenRequired,
    UnableToResolveTokenEndpoint,
    UserCancelled,
    /// A failure code this crate does not recognise.
    Other(String),
}

impl AuthErrorKind {
    /// Classify a platform authentication failure code.
    ///
    /// Matching is case-insensitive and accepts `-`, `_` or no separator.
    /// Unknown codes never fail; they become `Other`.
    pub fn classify(code: &str) -> Self {
        let normalized: String = code
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "credentialcannotbeshared" => AuthErrorKind::CredentialCannotBeShared,
            "forbidden" => AuthErrorKind::Forbidden,
            "invalidapikey" => AuthErrorKind::InvalidApiKey,
            "invalidcredentials" => AuthErrorKind::InvalidCredentials,
            "invalidtoken" => AuthErrorKind::InvalidToken,
            "sslrequired" => AuthErrorKind::SslRequired,
            "tokenexpired" => AuthErrorKind::TokenExpired,
            "tokenrequired" => AuthErrorKind::TokenRequired,
            "unabletoresolvetokenendpoint" => AuthErrorKind::UnableToResolveTokenEndpoint,
            "usercancelled" | "usercanceled" => AuthErrorKind::UserCancelled,
            _ => AuthErrorKind::Other(code.to_string()),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            AuthErrorKind::CredentialCannotBeShared => "These credentials cannot be shared",
            AuthErrorKind::Forbidden => "Access to this resource is forbidden",
            AuthErrorKind::InvalidApiKey => "The API key is invalid",
            AuthErrorKind::InvalidCredentials => "The username or password is incorrect",
            AuthErrorKind::InvalidToken => "The access token is invalid",
            AuthErrorKind::SslRequired => "A secure (SSL) connection is required",
            AuthErrorKind::TokenExpired => "The access token has expired",
            AuthErrorKind::TokenRequired => "An access token is required",
            AuthErrorKind::UnableToResolveTokenEndpoint => {
                "Unable to resolve the token endpoint"
            }
            AuthErrorKind::UserCancelled => "Sign-in was cancelled",
            AuthErrorKind::Other(_) => "Authentication failed",
        }
    }
}

/// Errors surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// A load failed because the device is offline.
    #[error("No internet connection")]
    Connectivity,

    /// Any other load failure during startup.
    #[error("Failed to load: {reason}")]
    GenericLoad { reason: String },

    /// The positioning table or pathways layer is missing from the map.
    #[error("Resource not found: {name}")]
    ResourceNotFound { name: String },

    /// The indoor location data source could not start.
    #[error("Data source failed to start{}", .reason.as_ref().map(|r| format!(": {}", r)).unwrap_or_default())]
    DataSourceFailedToStart { reason: Option<String> },

    /// Authentication against the portal failed.
    #[error("Authentication failed: {}", .0.user_message())]
    Authentication(AuthErrorKind),
}

impl AppError {
    /// Classify an error reported while loading a startup resource.
    pub fn from_platform(err: &PlatformError) -> Self {
        match &err.kind {
            PlatformErrorKind::NoInternet => AppError::Connectivity,
            PlatformErrorKind::Authentication(code) => {
                AppError::Authentication(AuthErrorKind::classify(code))
            }
            PlatformErrorKind::NotFound | PlatformErrorKind::Other => AppError::GenericLoad {
                reason: err.message.clone(),
            },
        }
    }

    /// User-friendly message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Connectivity => "No internet connection",
            AppError::GenericLoad { .. } => "Failed to load the map",
            AppError::ResourceNotFound { .. } => "Indoor positioning data is missing from the map",
            AppError::DataSourceFailedToStart { .. } => "Indoor positioning failed to start",
            AppError::Authentication(kind) => kind.user_message(),
        }
    }

    /// Technical details for diagnostics.
    pub fn details(&self) -> String {
        match self {
            AppError::Authentication(AuthErrorKind::Other(code)) => {
                format!("Unrecognised authentication failure '{}'", code)
            }
            other => other.to_string(),
        }
    }
}

/// Error as stored in the view state: the classified error plus its
/// rendered strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub error: AppError,
    pub message: String,
    pub details: String,
}

impl From<AppError> for ErrorDescriptor {
    fn from(error: AppError) -> Self {
        Self {
            message: error.user_message().to_string(),
            details: error.details(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_known_auth_codes() {
        assert_eq!(AuthErrorKind::classify("forbidden"), AuthErrorKind::Forbidden);
        assert_eq!(
            AuthErrorKind::classify("TOKEN_EXPIRED"),
            AuthErrorKind::TokenExpired
        );
        assert_eq!(
            AuthErrorKind::classify("unable-to-resolve-token-endpoint"),
            AuthErrorKind::UnableToResolveTokenEndpoint
        );
        assert_eq!(
            AuthErrorKind::classify("userCanceled"),
            AuthErrorKind::UserCancelled
        );
    }

    #[test]
    fn unknown_auth_code_falls_back() {
        let kind = AuthErrorKind::classify("quantum_lockout");
        assert_eq!(kind, AuthErrorKind::Other("quantum_lockout".into()));
        assert_eq!(kind.user_message(), "Authentication failed");

        let err = AppError::Authentication(kind);
        assert!(err.details().contains("quantum_lockout"));
    }

    #[test]
    fn platform_errors_classify_into_taxonomy() {
        assert_eq!(
            AppError::from_platform(&PlatformError::no_internet("offline")),
            AppError::Connectivity
        );
        assert_eq!(
            AppError::from_platform(&PlatformError::authentication("invalid_token", "bad")),
            AppError::Authentication(AuthErrorKind::InvalidToken)
        );
        assert!(matches!(
            AppError::from_platform(&PlatformError::other("boom")),
            AppError::GenericLoad { reason } if reason == "boom"
        ));
    }

    #[test]
    fn descriptor_carries_display_strings() {
        let descriptor = ErrorDescriptor::from(AppError::DataSourceFailedToStart {
            reason: Some("bluetooth off".into()),
        });
        assert_eq!(descriptor.message, "Indoor positioning failed to start");
        assert_eq!(descriptor.details, "Data source failed to start: bluetooth off");
    }
}
