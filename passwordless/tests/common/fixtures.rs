use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use passwordless_client::{
    AssertionArtifact, AttestationArtifact, AuthenticatorTransport, PasswordlessClient,
    PasswordlessConfig,
};

use super::authenticator::ScriptedAuthenticator;

pub const TEST_API_KEY: &str = "test:public:0123456789abcdef";
pub const TEST_RP_ID: &str = "app.example.com";

pub fn test_attestation() -> AttestationArtifact {
    AttestationArtifact {
        credential_id: vec![0x0a, 0x0b, 0x0c, 0x0d],
        client_data_json: br#"{"type":"webauthn.create","challenge":"AAEC"}"#.to_vec(),
        attestation_object: Some(vec![0xa3, 0x63, 0x66, 0x6d, 0x74, 0x64]),
        transports: vec![AuthenticatorTransport::Internal, AuthenticatorTransport::Hybrid],
    }
}

pub fn test_assertion() -> AssertionArtifact {
    AssertionArtifact {
        credential_id: vec![0x0a, 0x0b, 0x0c, 0x0d],
        client_data_json: br#"{"type":"webauthn.get","challenge":"AAEC"}"#.to_vec(),
        authenticator_data: vec![0x49, 0x96, 0x0d, 0xe5, 0x05],
        signature: vec![0x30, 0x44, 0x02, 0x20, 0x7f],
        user_handle: None,
    }
}

/// Builds a client that talks to `server` through the default reqwest transport
pub fn client_for(
    server: &MockServer,
    authenticator: &Arc<ScriptedAuthenticator>,
) -> Arc<PasswordlessClient> {
    let config = PasswordlessConfig::new(TEST_API_KEY, TEST_RP_ID)
        .with_api_url(server.base_url())
        .with_request_timeout(Duration::from_secs(5));
    Arc::new(PasswordlessClient::new(config, authenticator.clone()).expect("client should build"))
}
