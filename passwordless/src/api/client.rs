use std::sync::Arc;

use http::{
    HeaderMap, HeaderValue,
    header::{CONTENT_TYPE, HeaderName},
};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use crate::authenticator::{AssertionArtifact, AttestationArtifact};
use crate::config::{PasswordlessConfig, RelyingPartyIdentity};

use super::errors::ApiError;
use super::transport::HttpTransport;
use super::types::{
    CeremonySession, CompleteResponse, ProblemDetails, RegisterBeginRequest,
    RegisterBeginResponse, RegisterCompleteRequest, SignInBeginRequest, SignInBeginResponse,
    SignInCompleteRequest,
};

const API_KEY_HEADER: HeaderName = HeaderName::from_static("apikey");

const REGISTER_BEGIN_PATH: &str = "/register/begin";
const REGISTER_COMPLETE_PATH: &str = "/register/complete";
const SIGNIN_BEGIN_PATH: &str = "/signin/begin";
const SIGNIN_COMPLETE_PATH: &str = "/signin/complete";

/// One-shot request/response mapper for the four ceremony calls.
///
/// Every call is a JSON POST carrying the relying-party identity from the
/// configuration. Nothing is retried here.
pub struct ApiService {
    api_url: String,
    api_key: String,
    relying_party: RelyingPartyIdentity,
    transport: Arc<dyn HttpTransport>,
}

impl ApiService {
    pub fn new(config: &PasswordlessConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            relying_party: config.relying_party(),
            transport,
        }
    }

    /// Starts a registration with the token the relying-party backend issued.
    pub async fn register_begin(&self, token: &str) -> Result<RegisterBeginResponse, ApiError> {
        let body = RegisterBeginRequest {
            token,
            rp_id: &self.relying_party.rp_id,
            origin: &self.relying_party.origin,
        };
        self.post(REGISTER_BEGIN_PATH, &body).await
    }

    /// Finishes a registration. Consumes the session from the matching begin call.
    pub async fn register_complete(
        &self,
        session: CeremonySession,
        attestation: &AttestationArtifact,
        nickname: Option<&str>,
    ) -> Result<CompleteResponse, ApiError> {
        let body = RegisterCompleteRequest {
            session: session.as_str(),
            response: attestation.into(),
            origin: &self.relying_party.origin,
            rp_id: &self.relying_party.rp_id,
            nickname,
        };
        self.post(REGISTER_COMPLETE_PATH, &body).await
    }

    /// Starts a sign-in for an alias, a user id, or neither (discoverable mode).
    ///
    /// At most one selector may be given; asking for both is rejected before any
    /// network I/O.
    pub async fn sign_in_begin(
        &self,
        alias: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<SignInBeginResponse, ApiError> {
        if alias.is_some() && user_id.is_some() {
            return Err(ApiError::InvalidRequest(
                "alias and user id are mutually exclusive".to_string(),
            ));
        }

        let body = SignInBeginRequest {
            user_id,
            alias,
            rp_id: &self.relying_party.rp_id,
            origin: &self.relying_party.origin,
        };
        self.post(SIGNIN_BEGIN_PATH, &body).await
    }

    /// Finishes a sign-in. Consumes the session from the matching begin call.
    pub async fn sign_in_complete(
        &self,
        session: CeremonySession,
        assertion: &AssertionArtifact,
    ) -> Result<CompleteResponse, ApiError> {
        let body = SignInCompleteRequest {
            session: session.as_str(),
            response: assertion.into(),
            origin: &self.relying_party.origin,
            rp_id: &self.relying_party.rp_id,
        };
        self.post(SIGNIN_COMPLETE_PATH, &body).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let address = format!("{}{}", self.api_url, path);
        let url = Url::parse(&address).map_err(|e| {
            tracing::debug!("Invalid endpoint {}: {}", address, e);
            ApiError::InvalidEndpoint(address.clone())
        })?;

        match url.scheme() {
            "https" | "http" if url.has_host() => Ok(url),
            _ => Err(ApiError::InvalidEndpoint(address)),
        }
    }

    fn headers(&self) -> Result<HeaderMap, ApiError> {
        let api_key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| ApiError::InvalidRequest("API key is not a valid header value".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY_HEADER, api_key);
        Ok(headers)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let headers = self.headers()?;
        let payload =
            serde_json::to_vec(body).map_err(|e| ApiError::PayloadEncoding(e.to_string()))?;

        tracing::debug!("POST {}", url);
        let response = self
            .transport
            .post_json(url, headers, payload)
            .await
            .map_err(|e| ApiError::NetworkRequestFailed(e.to_string()))?;

        let status = response.status.as_u16();
        tracing::info!(
            "{} responded with status {} ({} bytes)",
            path,
            status,
            response.body.len()
        );

        if status >= 400 {
            let problem = serde_json::from_slice::<ProblemDetails>(&response.body).ok();
            tracing::debug!("Error body for {}: {:?}", path, problem);
            return Err(ApiError::RequestRejected {
                status,
                body: problem,
            });
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            ApiError::ResponseMalformed(format!("Failed to deserialize response body: {e}"))
        })
    }
}
