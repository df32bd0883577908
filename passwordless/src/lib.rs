//! passwordless-client - Passkey ceremonies against a Passwordless backend
//!
//! This crate registers and signs in users with public-key credentials. Each
//! ceremony calls the backend's `begin` endpoint, drives the local platform
//! authenticator, and posts the result to the matching `complete` endpoint.
//!
//! The platform authenticator is supplied by the embedding application through
//! [`PlatformAuthenticator`]; the crate turns its callbacks into async calls and
//! keeps at most one authenticator interaction open at a time.

mod api;
mod authenticator;
mod config;
mod coordination;
mod utils;


pub use coordination::{CeremonyError, PasswordlessClient, SignInSelector};

pub use config::{ConfigError, DEFAULT_API_URL, PasswordlessConfig, RelyingPartyIdentity};

pub use api::{
    ApiError, ApiService, AssertionOptions, CeremonySession, CompleteResponse,
    CredentialCreateOptions, HttpResponse, HttpTransport, ProblemDetails,
    PublicKeyCredentialDescriptor, RegisterBeginResponse, RegistrationUser, ReqwestTransport,
    SignInBeginResponse, TransportError,
};

pub use authenticator::{
    AssertionArtifact, AttestationArtifact, AuthenticatorError, AuthenticatorTransport,
    AuthorizationDelegate, AuthorizationMode, AuthorizationRequest, CredentialArtifact,
    KeyCredentialProvider, PlatformAuthenticator, PlatformError, PresentationMode, SessionPhase,
    UserVerificationRequirement,
};

pub use utils::{UtilError, base64url_decode, base64url_encode};
