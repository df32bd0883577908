use std::sync::Arc;

use crate::api::{ApiService, HttpTransport, ReqwestTransport};
use crate::authenticator::{
    KeyCredentialProvider, PlatformAuthenticator, PresentationMode, SessionPhase,
};
use crate::config::{ConfigError, PasswordlessConfig};

use super::errors::CeremonyError;

/// Who is signing in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInSelector {
    /// A user known by alias (for example an email address)
    ByAlias(String),
    /// A user known by the backend's user id
    ByUserId(String),
    /// Passive listening behind the keyboard's credential suggestions
    AutofillAssisted,
    /// Any credential the authenticator holds for the relying party
    Discoverable,
}

impl SignInSelector {
    fn alias(&self) -> Option<&str> {
        match self {
            Self::ByAlias(alias) => Some(alias.as_str()),
            _ => None,
        }
    }

    fn user_id(&self) -> Option<&str> {
        match self {
            Self::ByUserId(user_id) => Some(user_id.as_str()),
            _ => None,
        }
    }
}

/// Runs the register and sign-in ceremonies against a Passwordless backend.
///
/// Each ceremony is `begin -> local authenticator interaction -> complete` and
/// returns the backend's bearer token. The client keeps no state between
/// ceremonies apart from its configuration and the authenticator bridge, so it
/// can be shared (for example behind an `Arc`) and called concurrently; only
/// the most recent authenticator request stays open.
pub struct PasswordlessClient {
    api: ApiService,
    provider: KeyCredentialProvider,
}

impl PasswordlessClient {
    /// Creates a client talking HTTP through the default reqwest transport.
    pub fn new(
        config: PasswordlessConfig,
        authenticator: Arc<dyn PlatformAuthenticator>,
    ) -> Result<Self, CeremonyError> {
        let transport = ReqwestTransport::new(config.request_timeout())
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self::with_transport(
            config,
            Arc::new(transport),
            authenticator,
        ))
    }

    pub fn with_transport(
        config: PasswordlessConfig,
        transport: Arc<dyn HttpTransport>,
        authenticator: Arc<dyn PlatformAuthenticator>,
    ) -> Self {
        tracing::debug!(
            "Passwordless client for rp_id {} at {}",
            config.rp_id(),
            config.api_url()
        );
        Self {
            api: ApiService::new(&config, transport),
            provider: KeyCredentialProvider::new(config.rp_id(), authenticator),
        }
    }

    /// Registers a new credential for the user the `registration_token` was
    /// issued for, and returns the resulting token.
    pub async fn register(
        &self,
        registration_token: &str,
        nickname: Option<&str>,
    ) -> Result<String, CeremonyError> {
        let begin = self.api.register_begin(registration_token).await?;
        let attestation = self.provider.request_attestation(&begin.options).await?;
        let complete = self
            .api
            .register_complete(begin.session, &attestation, nickname)
            .await?;

        tracing::info!("Registration ceremony completed");
        Ok(complete.token)
    }

    /// Signs in with an existing credential and returns the resulting token.
    ///
    /// The authenticator runs autofill-assisted whenever neither an alias nor a
    /// user id is given.
    pub async fn sign_in(&self, selector: SignInSelector) -> Result<String, CeremonyError> {
        let alias = selector.alias();
        let user_id = selector.user_id();
        let presentation = if alias.is_none() && user_id.is_none() {
            PresentationMode::AutoFillAssisted
        } else {
            PresentationMode::Standard
        };

        let begin = self.api.sign_in_begin(alias, user_id).await?;
        let assertion = self
            .provider
            .request_assertion(&begin.options, presentation)
            .await?;
        let complete = self
            .api
            .sign_in_complete(begin.session, &assertion)
            .await?;

        tracing::info!("Sign-in ceremony completed");
        Ok(complete.token)
    }

    pub async fn sign_in_with_alias(&self, alias: &str) -> Result<String, CeremonyError> {
        self.sign_in(SignInSelector::ByAlias(alias.to_string()))
            .await
    }

    pub async fn sign_in_with_user_id(&self, user_id: &str) -> Result<String, CeremonyError> {
        self.sign_in(SignInSelector::ByUserId(user_id.to_string()))
            .await
    }

    pub async fn sign_in_with_autofill(&self) -> Result<String, CeremonyError> {
        self.sign_in(SignInSelector::AutofillAssisted).await
    }

    pub async fn sign_in_with_discoverable(&self) -> Result<String, CeremonyError> {
        self.sign_in(SignInSelector::Discoverable).await
    }

    /// Cancels the outstanding authenticator request, if any. The ceremony
    /// waiting on it fails with a user-cancelled error.
    pub async fn cancel_existing_requests(&self) {
        self.provider.cancel().await;
    }

    pub fn authenticator_phase(&self) -> SessionPhase {
        self.provider.phase()
    }
}
