use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::authenticator::{
    AssertionArtifact, AttestationArtifact, AuthenticatorTransport, UserVerificationRequirement,
};
use crate::utils::base64url_encode;

const PUBLIC_KEY_CREDENTIAL_TYPE: &str = "public-key";

/// Opaque session token returned by a begin call.
///
/// It must be echoed back unmodified on the matching complete call. The complete
/// calls take it by value, so one session can only ever pair one begin/complete
/// round.
#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CeremonySession(String);

impl CeremonySession {
    pub fn new(session: impl Into<String>) -> Self {
        Self(session.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Begin responses arrive either flat or wrapped in a `data` object next to the
/// session; both shapes decode to the same options.
#[derive(Deserialize)]
#[serde(untagged)]
enum SessionEnvelope<T> {
    Wrapped {
        data: T,
        session: CeremonySession,
    },
    Flat {
        #[serde(flatten)]
        data: T,
        session: CeremonySession,
    },
}

impl<T> SessionEnvelope<T> {
    fn into_parts(self) -> (T, CeremonySession) {
        match self {
            Self::Wrapped { data, session } | Self::Flat { data, session } => (data, session),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct RegisterBeginRequest<'a> {
    pub(super) token: &'a str,
    pub(super) rp_id: &'a str,
    pub(super) origin: &'a str,
}

/// Response of `/register/begin`.
#[derive(Deserialize, Debug)]
#[serde(from = "SessionEnvelope<CredentialCreateOptions>")]
pub struct RegisterBeginResponse {
    pub options: CredentialCreateOptions,
    pub session: CeremonySession,
}

impl From<SessionEnvelope<CredentialCreateOptions>> for RegisterBeginResponse {
    fn from(envelope: SessionEnvelope<CredentialCreateOptions>) -> Self {
        let (options, session) = envelope.into_parts();
        Self { options, session }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CredentialCreateOptions {
    pub challenge: String,
    pub user: RegistrationUser,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct RegisterCompleteRequest<'a> {
    pub(super) session: &'a str,
    pub(super) response: AttestationRawResponse,
    pub(super) origin: &'a str,
    pub(super) rp_id: &'a str,
    pub(super) nickname: Option<&'a str>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct SignInBeginRequest<'a> {
    pub(super) user_id: Option<&'a str>,
    pub(super) alias: Option<&'a str>,
    pub(super) rp_id: &'a str,
    pub(super) origin: &'a str,
}

/// Response of `/signin/begin`.
#[derive(Deserialize, Debug)]
#[serde(from = "SessionEnvelope<AssertionOptions>")]
pub struct SignInBeginResponse {
    pub options: AssertionOptions,
    pub session: CeremonySession,
}

impl From<SessionEnvelope<AssertionOptions>> for SignInBeginResponse {
    fn from(envelope: SessionEnvelope<AssertionOptions>) -> Self {
        let (options, session) = envelope.into_parts();
        Self { options, session }
    }
}

/// Assertion options for a sign-in. An empty `allow_credentials` list means the
/// authenticator may offer any discoverable credential for the relying party.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssertionOptions {
    pub challenge: String,
    #[serde(default)]
    pub allow_credentials: Vec<PublicKeyCredentialDescriptor>,
    #[serde(default)]
    pub user_verification: UserVerificationRequirement,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyCredentialDescriptor {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: String,
    #[serde(default)]
    pub transports: Option<Vec<AuthenticatorTransport>>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct SignInCompleteRequest<'a> {
    pub(super) session: &'a str,
    pub(super) response: AssertionRawResponse,
    pub(super) origin: &'a str,
    pub(super) rp_id: &'a str,
}

/// Response of both complete calls: the bearer token the relying party verifies.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompleteResponse {
    pub token: String,
}

/// Structured error body returned alongside a rejected request.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    pub title: String,
    pub status: u16,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct AttestationRawResponse {
    id: String,
    raw_id: String,
    #[serde(rename = "type")]
    type_: &'static str,
    response: AttestationResponse,
    extensions: Map<String, Value>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AttestationResponse {
    attestation_object: Option<String>,
    #[serde(rename = "clientDataJSON")]
    client_data_json: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    transports: Vec<AuthenticatorTransport>,
}

impl From<&AttestationArtifact> for AttestationRawResponse {
    fn from(artifact: &AttestationArtifact) -> Self {
        let credential_id = base64url_encode(&artifact.credential_id);
        Self {
            id: credential_id.clone(),
            raw_id: credential_id,
            type_: PUBLIC_KEY_CREDENTIAL_TYPE,
            response: AttestationResponse {
                attestation_object: artifact
                    .attestation_object
                    .as_ref()
                    .map(|object| base64url_encode(object)),
                client_data_json: base64url_encode(&artifact.client_data_json),
                transports: artifact.transports.clone(),
            },
            extensions: Map::new(),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct AssertionRawResponse {
    id: String,
    raw_id: String,
    #[serde(rename = "type")]
    type_: &'static str,
    response: AssertionResponse,
    extensions: Map<String, Value>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AssertionResponse {
    authenticator_data: String,
    #[serde(rename = "clientDataJSON")]
    client_data_json: String,
    signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_handle: Option<String>,
}

impl From<&AssertionArtifact> for AssertionRawResponse {
    fn from(artifact: &AssertionArtifact) -> Self {
        let credential_id = base64url_encode(&artifact.credential_id);
        Self {
            id: credential_id.clone(),
            raw_id: credential_id,
            type_: PUBLIC_KEY_CREDENTIAL_TYPE,
            response: AssertionResponse {
                authenticator_data: base64url_encode(&artifact.authenticator_data),
                client_data_json: base64url_encode(&artifact.client_data_json),
                signature: base64url_encode(&artifact.signature),
                user_handle: artifact
                    .user_handle
                    .as_ref()
                    .map(|handle| base64url_encode(handle)),
            },
            extensions: Map::new(),
        }
    }
}
