//! Answers platform authentication challenges.
//!
//! Credentials come from [`AuthConfig`]; nothing is hard-coded.

use crate::config::{AuthConfig, CredentialStatus, SecureString};
use crate::platform::AuthChallenge;

/// Username/password pair handed to the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub username: String,
    pub password: SecureString,
}

/// What to do with an authentication challenge.
#[derive(Debug, Clone, PartialEq)]
pub enum ChallengeDisposition {
    /// Retry the request with this credential.
    UseCredential(Credential),
    /// Let the request continue and fail with an authentication error.
    ContinueAndFail,
}

/// Handles authentication challenges raised by the platform.
pub trait ChallengeHandler: Send + Sync {
    fn handle(&self, challenge: &AuthChallenge) -> ChallengeDisposition;
}

/// Challenge handler backed by the `[auth]` configuration section.
pub struct CredentialChallengeHandler {
    config: AuthConfig,
}

impl CredentialChallengeHandler {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }
}

impl ChallengeHandler for CredentialChallengeHandler {
    fn handle(&self, challenge: &AuthChallenge) -> ChallengeDisposition {
        if challenge.previous_failures >= self.config.max_attempts {
            tracing::warn!(
                url = %challenge.url,
                failures = challenge.previous_failures,
                "Credentials rejected too many times, giving up"
            );
            return ChallengeDisposition::ContinueAndFail;
        }

        match self.config.resolve_credentials() {
            CredentialStatus::Configured { username, password } => {
                tracing::debug!(url = %challenge.url, %username, "Answering auth challenge");
                ChallengeDisposition::UseCredential(Credential { username, password })
            }
            CredentialStatus::Unconfigured { reason } => {
                tracing::warn!(url = %challenge.url, "Cannot answer auth challenge: {}", reason);
                ChallengeDisposition::ContinueAndFail
            }
            CredentialStatus::NoAuth => ChallengeDisposition::ContinueAndFail,
        }
    }
}
