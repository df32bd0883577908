use thiserror::Error;

/// Errors surfaced by the authenticator bridge.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthenticatorError {
    /// The user declined the platform prompt, or the request was cancelled or
    /// superseded. Expected and silent.
    #[error("Authorization cancelled")]
    UserCancelled,

    /// The authenticator reported an operational failure
    #[error("Authenticator failed: {0}")]
    AuthenticatorFailed(String),

    /// The challenge issued by the server is not valid base64url
    #[error("Unable to decode challenge")]
    ChallengeDecodeFailed,

    /// The user id issued by the server cannot be used as a user handle
    #[error("Unable to encode user id")]
    UserIdEncodeFailed,

    /// An allowed credential id issued by the server is not valid base64url
    #[error("Unable to decode credential id: {0}")]
    CredentialIdDecodeFailed(String),
}
