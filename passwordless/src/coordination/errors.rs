use thiserror::Error;

use crate::api::ApiError;
use crate::authenticator::AuthenticatorError;
use crate::config::ConfigError;

/// Errors returned by a ceremony.
///
/// A ceremony stops at its first failure, so this carries exactly the error of
/// the step that failed.
#[derive(Error, Debug)]
pub enum CeremonyError {
    /// The client could not be set up
    #[error("Configuration error: {0}")]
    Config(ConfigError),

    /// A begin or complete call failed
    #[error("API error: {0}")]
    Api(ApiError),

    /// The local authenticator interaction did not produce a credential
    #[error("Authenticator error: {0}")]
    Authenticator(AuthenticatorError),
}

impl CeremonyError {
    /// Whether the ceremony ended because the user dismissed the prompt or the
    /// request was cancelled.
    ///
    /// Callers running autofill-assisted sign-in typically restart listening on
    /// this outcome instead of reporting it.
    pub fn is_user_cancelled(&self) -> bool {
        matches!(self, Self::Authenticator(AuthenticatorError::UserCancelled))
    }

    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::Config(err) => tracing::error!("Configuration error: {}", err),
            Self::Api(err) => tracing::error!("API error: {}", err),
            Self::Authenticator(AuthenticatorError::UserCancelled) => {
                tracing::info!("Ceremony cancelled")
            }
            Self::Authenticator(err) => tracing::error!("Authenticator error: {}", err),
        }
        self
    }
}

impl From<ConfigError> for CeremonyError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err).log()
    }
}

impl From<ApiError> for CeremonyError {
    fn from(err: ApiError) -> Self {
        Self::Api(err).log()
    }
}

impl From<AuthenticatorError> for CeremonyError {
    fn from(err: AuthenticatorError) -> Self {
        Self::Authenticator(err).log()
    }
}
