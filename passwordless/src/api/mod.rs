//! Ceremony protocol client
//!
//! Builds and sends the four wire calls of the register and sign-in ceremonies
//! and maps HTTP status and body to typed responses or [`ApiError`].

mod client;
mod errors;
mod transport;
mod types;

pub use client::ApiService;
pub use errors::{ApiError, TransportError};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{
    AssertionOptions, CeremonySession, CompleteResponse, CredentialCreateOptions,
    ProblemDetails, PublicKeyCredentialDescriptor, RegisterBeginResponse, RegistrationUser,
    SignInBeginResponse,
};
