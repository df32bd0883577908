use serde::{Deserialize, Serialize};

/// Proof produced by the authenticator when a new credential is registered.
///
/// Binary fields hold raw bytes; they are base64url-encoded only when the
/// artifact is put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationArtifact {
    pub credential_id: Vec<u8>,
    pub client_data_json: Vec<u8>,
    pub attestation_object: Option<Vec<u8>>,
    pub transports: Vec<AuthenticatorTransport>,
}

/// Proof produced by the authenticator when signing in with an existing credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionArtifact {
    pub credential_id: Vec<u8>,
    pub client_data_json: Vec<u8>,
    pub authenticator_data: Vec<u8>,
    pub signature: Vec<u8>,
    pub user_handle: Option<Vec<u8>>,
}

/// The signed result of one successful authenticator interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialArtifact {
    Attestation(AttestationArtifact),
    Assertion(AssertionArtifact),
}

impl CredentialArtifact {
    pub(super) fn kind(&self) -> SessionKind {
        match self {
            Self::Attestation(_) => SessionKind::Registration,
            Self::Assertion(_) => SessionKind::Assertion,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthenticatorTransport {
    Usb,
    Nfc,
    Ble,
    Hybrid,
    Internal,
    SmartCard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserVerificationRequirement {
    Required,
    #[default]
    Preferred,
    Discouraged,
}

/// What the authenticator is asked to do, handed to
/// [`PlatformAuthenticator::begin`](super::PlatformAuthenticator::begin).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub rp_id: String,
    pub challenge: Vec<u8>,
    pub mode: AuthorizationMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationMode {
    Registration {
        name: String,
        display_name: String,
        user_id: Vec<u8>,
    },
    Assertion {
        allowed_credentials: Vec<Vec<u8>>,
        user_verification: UserVerificationRequirement,
    },
}

/// How the platform should surface the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationMode {
    /// A modal prompt
    Standard,
    /// Passive listening behind the keyboard's credential suggestions
    AutoFillAssisted,
}

/// Error classification reported by the platform authenticator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The user dismissed the prompt, or the session was cancelled
    Cancelled,
    /// The authenticator could not complete the operation
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SessionKind {
    Registration,
    Assertion,
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registration => write!(f, "registration"),
            Self::Assertion => write!(f, "assertion"),
        }
    }
}

/// Lifecycle of the single authenticator session slot.
///
/// `Completed`, `Cancelled` and `Failed` are settled states: like `Idle`, they
/// accept a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Starting,
    AwaitingResult,
    Completed,
    Cancelled,
    Failed,
}

impl SessionPhase {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Starting | Self::AwaitingResult)
    }
}
