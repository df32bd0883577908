use std::time::Duration;

use httpmock::prelude::*;
use passwordless_client::{
    ApiError, AuthenticatorError, AuthorizationMode, CeremonyError, PasswordlessClient,
    PasswordlessConfig, PresentationMode, UserVerificationRequirement,
};
use serde_json::json;

use crate::common::{Script, ScriptedAuthenticator, TEST_API_KEY, TEST_RP_ID, client_for};

/// Test sign-in by alias
///
/// This test verifies that:
/// 1. The begin call carries the alias and a null user id
/// 2. Allowed credentials and the verification policy reach the authenticator
/// 3. The authenticator runs with the standard prompt
#[tokio::test]
async fn test_sign_in_with_alias_flow() {
    let server = MockServer::start_async().await;
    let authenticator = ScriptedAuthenticator::new(Script::Assert);
    let client = client_for(&server, &authenticator);

    let begin = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/signin/begin")
                .header("apikey", TEST_API_KEY)
                .json_body_partial(
                    json!({ "alias": "bob", "userId": null, "rpId": TEST_RP_ID }).to_string(),
                );
            then.status(200).json_body(json!({
                "data": {
                    "challenge": "AAEC",
                    "allowCredentials": [
                        { "type": "public-key", "id": "CgsMDQ", "transports": ["internal"] }
                    ],
                    "userVerification": "required"
                },
                "session": "s-sign-1"
            }));
        })
        .await;
    let complete = server
        .mock_async(|when, then| {
            when.method(POST).path("/signin/complete").json_body_partial(
                json!({
                    "session": "s-sign-1",
                    "origin": "https://app.example.com",
                    "response": { "id": "CgsMDQ", "type": "public-key" }
                })
                .to_string(),
            );
            then.status(200).json_body(json!({ "token": "verify_token_bob" }));
        })
        .await;

    let token = client.sign_in_with_alias("bob").await.unwrap();

    assert_eq!(token, "verify_token_bob");
    begin.assert_async().await;
    complete.assert_async().await;

    assert_eq!(authenticator.presentations(), vec![PresentationMode::Standard]);
    let requests = authenticator.requests();
    assert_eq!(
        requests[0].mode,
        AuthorizationMode::Assertion {
            allowed_credentials: vec![vec![0x0a, 0x0b, 0x0c, 0x0d]],
            user_verification: UserVerificationRequirement::Required,
        }
    );
}

#[tokio::test]
async fn test_sign_in_with_user_id_flow() {
    let server = MockServer::start_async().await;
    let authenticator = ScriptedAuthenticator::new(Script::Assert);
    let client = client_for(&server, &authenticator);

    let begin = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/signin/begin")
                .json_body_partial(json!({ "alias": null, "userId": "user-1" }).to_string());
            then.status(200)
                .json_body(json!({ "challenge": "AAEC", "session": "s-sign-2" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/signin/complete");
            then.status(200).json_body(json!({ "token": "verify_token_u1" }));
        })
        .await;

    assert_eq!(
        client.sign_in_with_user_id("user-1").await.unwrap(),
        "verify_token_u1"
    );
    begin.assert_async().await;
    assert_eq!(authenticator.presentations(), vec![PresentationMode::Standard]);
}

/// Test autofill sign-in that is cancelled and restarted
///
/// A cancelled autofill request resolves as user-cancelled without calling the
/// complete endpoint, and listening can be restarted right away.
#[tokio::test]
async fn test_autofill_sign_in_cancel_and_restart() {
    let server = MockServer::start_async().await;
    let authenticator = ScriptedAuthenticator::new(Script::Hold);
    let client = client_for(&server, &authenticator);

    let begin = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/signin/begin")
                .json_body_partial(json!({ "alias": null, "userId": null }).to_string());
            then.status(200)
                .json_body(json!({ "challenge": "AAEC", "session": "s-auto" }));
        })
        .await;
    let complete = server
        .mock_async(|when, then| {
            when.method(POST).path("/signin/complete");
            then.status(200).json_body(json!({ "token": "verify_token_auto" }));
        })
        .await;

    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.sign_in_with_autofill().await }
    });
    authenticator.wait_for_runs(1).await;

    client.cancel_existing_requests().await;

    let error = pending.await.unwrap().unwrap_err();
    assert!(error.is_user_cancelled());
    assert_eq!(authenticator.cancels(), 1);
    assert_eq!(complete.hits_async().await, 0);

    authenticator.set_script(Script::Assert);
    let token = client.sign_in_with_autofill().await.unwrap();

    assert_eq!(token, "verify_token_auto");
    assert_eq!(begin.hits_async().await, 2);
    assert_eq!(
        authenticator.presentations(),
        vec![
            PresentationMode::AutoFillAssisted,
            PresentationMode::AutoFillAssisted
        ]
    );
}

/// Test that a new sign-in supersedes an outstanding one
///
/// The outstanding request must be cancelled before the new authenticator
/// session starts, and only the new one completes.
#[tokio::test]
async fn test_new_sign_in_supersedes_outstanding_one() {
    let server = MockServer::start_async().await;
    let authenticator = ScriptedAuthenticator::new(Script::Hold);
    let client = client_for(&server, &authenticator);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/signin/begin");
            then.status(200)
                .json_body(json!({ "challenge": "AAEC", "session": "s-race" }));
        })
        .await;
    let complete = server
        .mock_async(|when, then| {
            when.method(POST).path("/signin/complete");
            then.status(200).json_body(json!({ "token": "verify_token_race" }));
        })
        .await;

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.sign_in_with_autofill().await }
    });
    authenticator.wait_for_runs(1).await;

    authenticator.set_script(Script::Assert);
    let second = client.sign_in_with_alias("bob").await;

    assert_eq!(second.unwrap(), "verify_token_race");
    assert!(first.await.unwrap().unwrap_err().is_user_cancelled());
    assert_eq!(authenticator.cancels(), 1);
    assert_eq!(authenticator.requests().len(), 2);
    complete.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_sign_in_authenticator_failure() {
    let server = MockServer::start_async().await;
    let authenticator = ScriptedAuthenticator::new(Script::Fail("no matching credential".into()));
    let client = client_for(&server, &authenticator);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/signin/begin");
            then.status(200)
                .json_body(json!({ "challenge": "AAEC", "session": "s-fail" }));
        })
        .await;

    let result = client.sign_in_with_discoverable().await;

    match result {
        Err(CeremonyError::Authenticator(AuthenticatorError::AuthenticatorFailed(cause))) => {
            assert_eq!(cause, "no matching credential")
        }
        other => panic!("Expected AuthenticatorFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sign_in_begin_server_error_without_json() {
    let server = MockServer::start_async().await;
    let authenticator = ScriptedAuthenticator::new(Script::Assert);
    let client = client_for(&server, &authenticator);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/signin/begin");
            then.status(500).body("<html>upstream error</html>");
        })
        .await;

    let result = client.sign_in_with_alias("bob").await;

    assert!(matches!(
        result,
        Err(CeremonyError::Api(ApiError::RequestRejected {
            status: 500,
            body: None
        }))
    ));
    assert!(authenticator.presentations().is_empty());
}

#[tokio::test]
async fn test_sign_in_network_failure() {
    let authenticator = ScriptedAuthenticator::new(Script::Assert);
    // Nothing listens on port 1.
    let config = PasswordlessConfig::new(TEST_API_KEY, TEST_RP_ID)
        .with_api_url("http://127.0.0.1:1")
        .with_request_timeout(Duration::from_secs(2));
    let client = PasswordlessClient::new(config, authenticator.clone()).unwrap();

    let result = client.sign_in_with_alias("bob").await;

    assert!(matches!(
        result,
        Err(CeremonyError::Api(ApiError::NetworkRequestFailed(_)))
    ));
    assert!(authenticator.requests().is_empty());
}
