use super::provider::AuthorizationDelegate;
use super::types::{AuthorizationRequest, PresentationMode};

/// The local platform authenticator, seen as a callback-driven capability.
///
/// An implementation configures one interaction on `begin`, shows it on `run`,
/// and reports exactly one terminal event through the delegate it was handed:
/// an attestation, an assertion, or an error. `cancel` asks the platform to
/// abandon the current interaction, which it acknowledges by reporting
/// [`PlatformError::Cancelled`](super::PlatformError::Cancelled).
///
/// Terminal events may be delivered from any thread, including synchronously
/// from inside `run` or `cancel`.
pub trait PlatformAuthenticator: Send + Sync + 'static {
    fn begin(&self, request: AuthorizationRequest, delegate: AuthorizationDelegate);

    fn run(&self, presentation: PresentationMode);

    fn cancel(&self);
}
