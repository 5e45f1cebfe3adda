//! Credential resolution from configuration.
//!
//! Passwords are never compiled in. They come from the config file or,
//! preferably, from the environment variable named by `auth.password_env`.

use super::types::AuthConfig;

/// Wrapper for sensitive strings that prevents accidental logging.
///
/// The inner value is never exposed via Debug or Display traits.
/// Use `expose()` to access the actual value when needed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecureString(String);

impl SecureString {
    /// Create a new secure string.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Expose the inner value.
    ///
    /// Use sparingly and only when actually answering a challenge.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString(••••••••)")
    }
}

impl std::fmt::Display for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "••••••••")
    }
}

/// Status of credential resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialStatus {
    /// Username and password resolved.
    Configured {
        username: String,
        password: SecureString,
    },
    /// Username is set but no password could be found.
    Unconfigured {
        /// Reason for missing configuration.
        reason: String,
    },
    /// No username configured; challenges are not answered.
    NoAuth,
}

impl AuthConfig {
    /// Resolve credentials from the config and the process environment.
    ///
    /// This is called on-demand and NOT cached, so a password exported
    /// after startup is picked up on the next challenge.
    pub fn resolve_credentials(&self) -> CredentialStatus {
        self.resolve_credentials_with(|name| std::env::var(name).ok())
    }

    /// Same as [`resolve_credentials`](Self::resolve_credentials) with an
    /// explicit environment lookup.
    pub fn resolve_credentials_with<F>(&self, lookup: F) -> CredentialStatus
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(username) = self.username.as_ref().filter(|u| !u.is_empty()) else {
            return CredentialStatus::NoAuth;
        };

        let password = lookup(&self.password_env)
            .filter(|p| !p.is_empty())
            .or_else(|| self.password.clone().filter(|p| !p.is_empty()));

        match password {
            Some(password) => CredentialStatus::Configured {
                username: username.clone(),
                password: SecureString::new(password),
            },
            None => CredentialStatus::Unconfigured {
                reason: format!(
                    "no password in ${} or auth.password",
                    self.password_env
                ),
            },
        }
    }
}
