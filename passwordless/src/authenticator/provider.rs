use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::{Mutex as AsyncMutex, oneshot};

use crate::api::{AssertionOptions, CredentialCreateOptions};
use crate::utils::base64url_decode;

use super::errors::AuthenticatorError;
use super::platform::PlatformAuthenticator;
use super::types::{
    AssertionArtifact, AttestationArtifact, AuthorizationMode, AuthorizationRequest,
    CredentialArtifact, PlatformError, PresentationMode, SessionKind, SessionPhase,
};

/// WebAuthn caps user handles at 64 bytes.
const MAX_USER_HANDLE_LEN: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, AuthenticatorError>>;

enum Waiter {
    Attestation(Reply<AttestationArtifact>),
    Assertion(Reply<AssertionArtifact>),
}

impl Waiter {
    fn kind(&self) -> SessionKind {
        match self {
            Self::Attestation(_) => SessionKind::Registration,
            Self::Assertion(_) => SessionKind::Assertion,
        }
    }

    /// Consumes the waiter, so it can be resolved at most once.
    fn resolve(self, outcome: Result<CredentialArtifact, AuthenticatorError>) {
        // A send error only means the caller stopped waiting.
        match (self, outcome) {
            (Self::Attestation(reply), Ok(CredentialArtifact::Attestation(artifact))) => {
                let _ = reply.send(Ok(artifact));
            }
            (Self::Assertion(reply), Ok(CredentialArtifact::Assertion(artifact))) => {
                let _ = reply.send(Ok(artifact));
            }
            (waiter, Ok(artifact)) => {
                let error = AuthenticatorError::AuthenticatorFailed(format!(
                    "authenticator returned an {} result to a {} session",
                    artifact.kind(),
                    waiter.kind()
                ));
                waiter.fail(error);
            }
            (waiter, Err(error)) => waiter.fail(error),
        }
    }

    fn fail(self, error: AuthenticatorError) {
        match self {
            Self::Attestation(reply) => {
                let _ = reply.send(Err(error));
            }
            Self::Assertion(reply) => {
                let _ = reply.send(Err(error));
            }
        }
    }
}

/// The single "current session" slot.
struct SessionSlot {
    session_id: u64,
    phase: SessionPhase,
    waiter: Option<Waiter>,
    cancel_requested: bool,
    cancel_waiters: Vec<oneshot::Sender<()>>,
}

impl Default for SessionSlot {
    fn default() -> Self {
        Self {
            session_id: 0,
            phase: SessionPhase::Idle,
            waiter: None,
            cancel_requested: false,
            cancel_waiters: Vec::new(),
        }
    }
}

fn lock_slot(slot: &Mutex<SessionSlot>) -> MutexGuard<'_, SessionSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Callback handle given to the platform authenticator for one session.
///
/// Only the first terminal event delivered for the session it was created for
/// has any effect. Later events, and events for a session that has since been
/// superseded, are ignored.
#[derive(Clone)]
pub struct AuthorizationDelegate {
    session_id: u64,
    slot: Weak<Mutex<SessionSlot>>,
}

impl AuthorizationDelegate {
    pub fn complete_with_attestation(&self, attestation: AttestationArtifact) {
        self.finish(Ok(CredentialArtifact::Attestation(attestation)));
    }

    pub fn complete_with_assertion(&self, assertion: AssertionArtifact) {
        self.finish(Ok(CredentialArtifact::Assertion(assertion)));
    }

    pub fn complete_with_error(&self, error: PlatformError) {
        self.finish(Err(error));
    }

    fn finish(&self, outcome: Result<CredentialArtifact, PlatformError>) {
        let Some(slot) = self.slot.upgrade() else {
            tracing::debug!("Authenticator bridge is gone, dropping terminal signal");
            return;
        };

        let (waiter, cancel_waiters, resolution) = {
            let mut slot = lock_slot(&slot);
            if slot.session_id != self.session_id || !slot.phase.is_in_flight() {
                tracing::debug!(
                    "Ignoring terminal signal for settled session {} (current session {}, {:?})",
                    self.session_id,
                    slot.session_id,
                    slot.phase
                );
                return;
            }

            let resolution = match outcome {
                Ok(artifact) => Ok(artifact),
                Err(PlatformError::Cancelled) => Err(AuthenticatorError::UserCancelled),
                Err(PlatformError::Failed(cause)) if slot.cancel_requested => {
                    tracing::debug!("Failure after cancellation treated as cancelled: {}", cause);
                    Err(AuthenticatorError::UserCancelled)
                }
                Err(PlatformError::Failed(cause)) => {
                    Err(AuthenticatorError::AuthenticatorFailed(cause))
                }
            };

            slot.phase = match &resolution {
                Ok(_) => SessionPhase::Completed,
                Err(AuthenticatorError::UserCancelled) => SessionPhase::Cancelled,
                Err(_) => SessionPhase::Failed,
            };
            slot.cancel_requested = false;

            (
                slot.waiter.take(),
                std::mem::take(&mut slot.cancel_waiters),
                resolution,
            )
        };

        match &resolution {
            Ok(artifact) => tracing::info!("Authenticator {} completed", artifact.kind()),
            Err(AuthenticatorError::UserCancelled) => {
                tracing::info!("Ongoing authenticator session was cancelled")
            }
            Err(error) => tracing::error!("Authenticator session failed: {}", error),
        }

        if let Some(waiter) = waiter {
            waiter.resolve(resolution);
        }
        for released in cancel_waiters {
            let _ = released.send(());
        }
    }
}

/// Bridges the callback-driven platform authenticator into single-shot async
/// operations.
///
/// At most one authenticator session is in flight. A new request first cancels
/// the outstanding one and waits for its terminal callback before starting, so
/// the last request wins. Entry points are serialized by `turn`; the capability
/// is never invoked while the slot lock is held, so it may call back
/// synchronously.
pub struct KeyCredentialProvider {
    rp_id: String,
    authenticator: Arc<dyn PlatformAuthenticator>,
    slot: Arc<Mutex<SessionSlot>>,
    turn: AsyncMutex<()>,
}

impl KeyCredentialProvider {
    pub fn new(rp_id: impl Into<String>, authenticator: Arc<dyn PlatformAuthenticator>) -> Self {
        Self {
            rp_id: rp_id.into(),
            authenticator,
            slot: Arc::new(Mutex::new(SessionSlot::default())),
            turn: AsyncMutex::new(()),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    /// Asks the authenticator to create a credential for the user in `options`.
    pub async fn request_attestation(
        &self,
        options: &CredentialCreateOptions,
    ) -> Result<AttestationArtifact, AuthenticatorError> {
        let receiver = {
            let _turn = self.turn.lock().await;
            self.cancel_in_flight().await;

            tracing::info!("Authenticator registration is running");

            let challenge = decode_challenge(&options.challenge)?;
            let user_id = encode_user_id(&options.user.id)?;
            let display_name = options
                .user
                .display_name
                .clone()
                .unwrap_or_else(|| options.user.name.clone());

            let request = AuthorizationRequest {
                rp_id: self.rp_id.clone(),
                challenge,
                mode: AuthorizationMode::Registration {
                    name: options.user.name.clone(),
                    display_name,
                    user_id,
                },
            };

            let (reply, receiver) = oneshot::channel();
            self.start(request, Waiter::Attestation(reply), PresentationMode::Standard);
            receiver
        };

        await_outcome(receiver).await
    }

    /// Asks the authenticator to sign the challenge in `options` with an existing
    /// credential.
    pub async fn request_assertion(
        &self,
        options: &AssertionOptions,
        presentation: PresentationMode,
    ) -> Result<AssertionArtifact, AuthenticatorError> {
        let receiver = {
            let _turn = self.turn.lock().await;
            self.cancel_in_flight().await;

            tracing::info!(
                "Authenticator assertion is running (presentation: {:?})",
                presentation
            );

            let challenge = decode_challenge(&options.challenge)?;
            let allowed_credentials = options
                .allow_credentials
                .iter()
                .map(|descriptor| {
                    base64url_decode(&descriptor.id).map_err(|_| {
                        AuthenticatorError::CredentialIdDecodeFailed(descriptor.id.clone())
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let request = AuthorizationRequest {
                rp_id: self.rp_id.clone(),
                challenge,
                mode: AuthorizationMode::Assertion {
                    allowed_credentials,
                    user_verification: options.user_verification,
                },
            };

            let (reply, receiver) = oneshot::channel();
            self.start(request, Waiter::Assertion(reply), presentation);
            receiver
        };

        await_outcome(receiver).await
    }

    /// Cancels the in-flight session, if any, and waits until the authenticator
    /// has acknowledged it. Returns immediately when nothing is in flight.
    pub async fn cancel(&self) {
        let _turn = self.turn.lock().await;
        self.cancel_in_flight().await;
    }

    async fn cancel_in_flight(&self) {
        let released = {
            let mut slot = self.lock();
            if !slot.phase.is_in_flight() {
                return;
            }
            let (release, released) = oneshot::channel();
            slot.cancel_requested = true;
            slot.cancel_waiters.push(release);
            released
        };

        tracing::info!("Cancelling in-flight authenticator session");
        self.authenticator.cancel();

        // Resolves on the session's terminal callback.
        let _ = released.await;
    }

    fn start(&self, request: AuthorizationRequest, waiter: Waiter, presentation: PresentationMode) {
        let (session_id, delegate) = {
            let mut slot = self.lock();
            slot.session_id = slot.session_id.wrapping_add(1);
            slot.phase = SessionPhase::Starting;
            slot.waiter = Some(waiter);
            slot.cancel_requested = false;
            let delegate = AuthorizationDelegate {
                session_id: slot.session_id,
                slot: Arc::downgrade(&self.slot),
            };
            (slot.session_id, delegate)
        };

        self.authenticator.begin(request, delegate);

        // The authenticator may already have settled the session from `begin`.
        {
            let mut slot = self.lock();
            if slot.session_id != session_id || slot.phase != SessionPhase::Starting {
                tracing::debug!(
                    "Session {} settled during begin ({:?}), not running it",
                    session_id,
                    slot.phase
                );
                return;
            }
            slot.phase = SessionPhase::AwaitingResult;
        }
        self.authenticator.run(presentation);
    }

    fn lock(&self) -> MutexGuard<'_, SessionSlot> {
        lock_slot(&self.slot)
    }
}

fn decode_challenge(challenge: &str) -> Result<Vec<u8>, AuthenticatorError> {
    base64url_decode(challenge).map_err(|e| {
        tracing::error!("Unable to decode challenge: {}", e);
        AuthenticatorError::ChallengeDecodeFailed
    })
}

fn encode_user_id(user_id: &str) -> Result<Vec<u8>, AuthenticatorError> {
    let bytes = user_id.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_USER_HANDLE_LEN {
        tracing::error!("User id of {} bytes cannot be a user handle", bytes.len());
        return Err(AuthenticatorError::UserIdEncodeFailed);
    }
    Ok(bytes.to_vec())
}

async fn await_outcome<T>(
    receiver: oneshot::Receiver<Result<T, AuthenticatorError>>,
) -> Result<T, AuthenticatorError> {
    receiver.await.unwrap_or_else(|_| {
        Err(AuthenticatorError::AuthenticatorFailed(
            "authenticator session ended without a result".to_string(),
        ))
    })
}
