use std::{env, time::Duration};

use thiserror::Error;

/// Default base address of the hosted Passwordless API.
pub const DEFAULT_API_URL: &str = "https://v4.passwordless.dev";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration needed to build a [`PasswordlessClient`](crate::PasswordlessClient).
///
/// The relying-party identity (`rp_id` and `origin`) is fixed for the lifetime of
/// the client and is embedded in every begin/complete request.
#[derive(Clone)]
pub struct PasswordlessConfig {
    pub(crate) api_url: String,
    pub(crate) api_key: String,
    pub(crate) rp_id: String,
    pub(crate) origin: String,
    pub(crate) request_timeout: Duration,
}

/// The service identity a credential is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelyingPartyIdentity {
    pub rp_id: String,
    pub origin: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),

    #[error("Unable to build HTTP client: {0}")]
    HttpClient(String),
}

impl PasswordlessConfig {
    /// Creates a configuration for the hosted API with `origin` derived as
    /// `https://{rp_id}`.
    pub fn new(api_key: impl Into<String>, rp_id: impl Into<String>) -> Self {
        let rp_id = rp_id.into();
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            origin: format!("https://{rp_id}"),
            rp_id,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Reads the configuration from `PASSWORDLESS_*` environment variables.
    ///
    /// `PASSWORDLESS_API_KEY` and `PASSWORDLESS_RP_ID` are required;
    /// `PASSWORDLESS_API_URL`, `PASSWORDLESS_ORIGIN` and
    /// `PASSWORDLESS_REQUEST_TIMEOUT` (seconds) override the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| lookup(key).ok_or_else(|| ConfigError::MissingVar(key.into()));

        let mut config = Self::new(
            require("PASSWORDLESS_API_KEY")?,
            require("PASSWORDLESS_RP_ID")?,
        );

        if let Some(api_url) = lookup("PASSWORDLESS_API_URL") {
            config = config.with_api_url(api_url);
        }
        if let Some(origin) = lookup("PASSWORDLESS_ORIGIN") {
            config = config.with_origin(origin);
        }
        if let Some(timeout) = lookup("PASSWORDLESS_REQUEST_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(secs) => config = config.with_request_timeout(Duration::from_secs(secs)),
                Err(_) => tracing::warn!(
                    "Invalid PASSWORDLESS_REQUEST_TIMEOUT: {}. Using default {}s",
                    timeout,
                    DEFAULT_REQUEST_TIMEOUT_SECS
                ),
            }
        }

        tracing::debug!(
            "Loaded passwordless config: api_url={}, rp_id={}, origin={}",
            config.api_url,
            config.rp_id,
            config.origin
        );
        Ok(config)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn rp_id(&self) -> &str {
        &self.rp_id
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn relying_party(&self) -> RelyingPartyIdentity {
        RelyingPartyIdentity {
            rp_id: self.rp_id.clone(),
            origin: self.origin.clone(),
        }
    }
}

// The API key is a credential and stays out of debug output.
impl std::fmt::Debug for PasswordlessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordlessConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("rp_id", &self.rp_id)
            .field("origin", &self.origin)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
