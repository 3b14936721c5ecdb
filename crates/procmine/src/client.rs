//! Client configuration and construction.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::response::{decode_json, expect_success};
use crate::transport::{ApiRequest, HttpTransport, Transport};

/// Immutable connection configuration, fixed at client construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URL scheme, `http` or `https`.
    pub scheme: String,
    /// Backend host.
    pub host: String,
    /// Backend port; omitted from the URL when `None`.
    pub port: Option<u16>,
    /// API token sent as `Authorization: API-Key {token}`.
    pub token: String,
    /// Whether to verify TLS certificates.
    pub verify: bool,
    /// Overrides the scheme/host/port-derived base URL when set.
    pub url: Option<String>,
}

impl ClientConfig {
    /// Create a configuration for the given backend.
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port: None,
            token: token.into(),
            verify: true,
            url: None,
        }
    }

    /// Set the backend port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Toggle TLS certificate verification.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Override the base URL entirely.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// The base URL all request paths are appended to.
    pub fn base_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.trim_end_matches('/').to_string();
        }
        match self.port {
            Some(port) => format!("{}://{}:{}", self.scheme, self.host, port),
            None => format!("{}://{}", self.scheme, self.host),
        }
    }
}

/// The caller's user profile, fetched once at client construction.
///
/// The remote returns more keys than are modeled here; anything
/// unrecognized lands in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(rename = "organizationId", default)]
    pub organization_id: Option<String>,
    #[serde(rename = "apiKey", default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Synchronous client for the process-mining backend.
///
/// Holds no mutable state: configuration and the user profile are fixed
/// at construction and every operation is an independent round trip.
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    profile: UserProfile,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Connect over HTTP and fetch the caller's user profile.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Self::with_transport(config, transport)
    }

    /// Construct over an arbitrary transport.
    ///
    /// The profile fetch still happens here, so the transport must answer
    /// `GET /api/users/by-token` first.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let response = transport.execute(ApiRequest::get("/api/users/by-token"))?;
        let response = expect_success(response)?;
        let profile: UserProfile = decode_json(&response)?;

        Ok(Self {
            config,
            transport,
            profile,
        })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The caller's user profile.
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}
