//! Ceremony orchestration
//!
//! Composes the protocol client and the authenticator bridge into the register
//! and sign-in ceremonies. This is the main entry point of the crate.

mod ceremony;
mod errors;

pub use ceremony::{PasswordlessClient, SignInSelector};
pub use errors::CeremonyError;
