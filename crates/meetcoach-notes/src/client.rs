//! Authenticated client for the notes API.
//!
//! Every call carries the access token as a bearer token. When the service
//! answers 401 the client exchanges the refresh token for a new pair,
//! writes the pair back to the credential file, and repeats the call once.
//! A second 401 fails the call.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::credentials::{CredentialStore, Credentials};
use crate::error::{NotesError, NotesResult};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Base URL of the notes API.
pub const DEFAULT_API_BASE: &str = "https://api.granola.ai";

/// Token exchange endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://api.workos.com/user_management/authenticate";

/// Desktop app version we identify as.
pub const DEFAULT_CLIENT_VERSION: &str = "5.354.0";

/// Attempts per logical call: the first try plus one retry after refresh.
const MAX_ATTEMPTS: usize = 2;

/// Endpoint and identification settings for [`NotesClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesEndpoints {
    /// Base URL for API calls, without trailing slash.
    pub api_base: String,
    /// Token refresh URL.
    pub auth_url: String,
    /// Version reported in `User-Agent` and `X-Client-Version`.
    pub client_version: String,
}

impl Default for NotesEndpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
        }
    }
}

impl NotesEndpoints {
    /// Validates both URLs and normalizes the base URL.
    pub fn validated(mut self) -> NotesResult<Self> {
        for (name, value) in [("api_base", &self.api_base), ("auth_url", &self.auth_url)] {
            url::Url::parse(value).map_err(|e| {
                NotesError::configuration(format!("invalid {} '{}': {}", name, value, e))
            })?;
        }
        self.api_base = self.api_base.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Absolute URL for an endpoint path such as `/v2/get-documents`.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

/// Token pair returned by the refresh endpoint.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
}

/// Authenticated notes API client.
///
/// Owns the current credentials; a refresh rotates them in place and
/// persists them through the [`CredentialStore`].
pub struct NotesClient<T: HttpTransport> {
    pub(crate) transport: T,
    pub(crate) store: CredentialStore,
    credentials: Credentials,
    endpoints: NotesEndpoints,
}

impl<T: HttpTransport> NotesClient<T> {
    /// Creates a client from already loaded credentials.
    pub fn new(
        transport: T,
        store: CredentialStore,
        credentials: Credentials,
        endpoints: NotesEndpoints,
    ) -> Self {
        Self {
            transport,
            store,
            credentials,
            endpoints,
        }
    }

    /// Loads credentials from `store` and creates a client.
    pub fn connect(
        transport: T,
        store: CredentialStore,
        endpoints: NotesEndpoints,
    ) -> NotesResult<Self> {
        let credentials = store.load()?;
        Ok(Self::new(transport, store, credentials, endpoints))
    }

    /// Returns the current credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the configured endpoints.
    pub fn endpoints(&self) -> &NotesEndpoints {
        &self.endpoints
    }

    /// Sends an authenticated request and returns the parsed JSON body.
    ///
    /// A 401 on the first attempt triggers one refresh and one retry. Any
    /// other non-2xx status, a second 401, or a network failure is returned
    /// as an error.
    pub async fn request(&mut self, endpoint: &str, payload: Value) -> NotesResult<Value> {
        let url = self.endpoints.url_for(endpoint);

        for attempt in 1..=MAX_ATTEMPTS {
            let response = self.send_authenticated(&url, &payload).await?;

            if response.is_unauthorized() {
                if attempt < MAX_ATTEMPTS {
                    debug!(endpoint, "access token rejected, refreshing");
                    self.refresh().await?;
                    continue;
                }
                return Err(NotesError::authentication(format!(
                    "{} still unauthorized after token refresh",
                    endpoint
                )));
            }

            return Self::parse_success(endpoint, response);
        }

        Err(NotesError::internal("request retry loop exited without a response"))
    }

    async fn send_authenticated(&self, url: &str, payload: &Value) -> NotesResult<HttpResponse> {
        let version = &self.endpoints.client_version;
        let request = HttpRequest::post(url, payload.clone())
            .with_bearer(&self.credentials.access_token)
            .with_header("User-Agent", format!("Granola/{}", version))
            .with_header("X-Client-Version", version.as_str());

        self.transport.send(request).await
    }

    fn parse_success(endpoint: &str, response: HttpResponse) -> NotesResult<Value> {
        if !response.is_success() {
            return Err(NotesError::server(format!(
                "API request to {} failed ({}): {}",
                endpoint,
                response.status,
                truncate(&response.body, 200)
            )));
        }
        response.json()
    }

    /// Exchanges the refresh token for a new pair and persists it.
    ///
    /// The old refresh token is spent once the exchange succeeds, so a
    /// persistence failure is logged loudly but does not fail the call: the
    /// new pair in memory is the only usable one for the rest of this run.
    pub async fn refresh(&mut self) -> NotesResult<()> {
        if self.credentials.refresh_token.is_empty() {
            return Err(NotesError::authentication("no refresh token available"));
        }

        let body = json!({
            "client_id": self.credentials.client_id,
            "grant_type": "refresh_token",
            "refresh_token": self.credentials.refresh_token,
        });

        let response = self
            .transport
            .send(HttpRequest::post(&self.endpoints.auth_url, body))
            .await
            .map_err(|e| {
                NotesError::authentication(format!("failed to refresh access token: {}", e))
                    .with_source(e)
            })?;

        if !response.is_success() {
            return Err(NotesError::authentication(format!(
                "token refresh failed ({}): {}",
                response.status,
                truncate(&response.body, 200)
            )));
        }

        let tokens: RefreshResponse = serde_json::from_str(&response.body).map_err(|e| {
            NotesError::authentication(format!("invalid token refresh response: {}", e))
        })?;

        self.credentials.rotate(tokens.access_token, tokens.refresh_token);
        info!("refreshed notes access token");

        if let Err(e) = self.store.persist(&self.credentials) {
            warn!(
                path = %self.store.path().display(),
                error = %e,
                "failed to save refreshed tokens; the next run may need a fresh login"
            );
        }

        Ok(())
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars).collect();
        out.push('…');
        out
    }
}
