//! Authenticator bridge
//!
//! Wraps a callback-driven platform authenticator in async request operations,
//! keeping at most one authenticator session in flight.

mod errors;
mod platform;
mod provider;
mod types;

pub use errors::AuthenticatorError;
pub use platform::PlatformAuthenticator;
pub use provider::{AuthorizationDelegate, KeyCredentialProvider};
pub use types::{
    AssertionArtifact, AttestationArtifact, AuthenticatorTransport, AuthorizationMode,
    AuthorizationRequest, CredentialArtifact, PlatformError, PresentationMode, SessionPhase,
    UserVerificationRequirement,
};
