//! Main client implementation.
//!
//! Every outbound call runs the same pipeline: attach the current bearer
//! token, send, camelize the response body when the path is an auth path,
//! and on a 401 run the refresh protocol at most once before retrying.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use url::Url;

use mentora_auth::{FileTokenStore, InMemoryTokenStore, SharedTokenStore};
use mentora_config::ClientConfig;

use crate::api::{AssessmentsApi, AuthApi, GroupsApi, SessionsApi, UsersApi};
use crate::case;
use crate::error::{Error, Result};
use crate::refresh::{RefreshFailure, RefreshGate, RefreshOutcome, Ticket};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default path substrings whose response bodies are camelized.
const DEFAULT_AUTH_PATHS: &[&str] = &["/auth/"];

/// Path of the token-refresh endpoint, relative to the API root.
const REFRESH_PATH: &str = "auth/refresh";

/// Hook invoked when credentials expire and the refresh fails terminally.
///
/// The application typically navigates to its login entry point here. The
/// hook is fire-and-forget: it runs before the failure propagates but cannot
/// block or alter it.
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

/// Mentora API client.
///
/// Provides typed access to the platform endpoints with transparent
/// credential handling.
///
/// # Example
///
/// ```no_run
/// use mentora_client::MentoraClient;
///
/// # async fn example() -> mentora_client::Result<()> {
/// let client = MentoraClient::builder()
///     .base_url("https://api.mentora.example")
///     .build()?;
///
/// let me = client.users().me().await?;
/// println!("logged in as {:?}", me.name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MentoraClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client. Owns the cookie jar that carries the refresh session
    /// credential.
    http: reqwest::Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Request timeout.
    timeout: Duration,
    /// Current-token slot, re-read on every attach.
    token_store: SharedTokenStore,
    /// Path substrings whose response bodies are camelized.
    auth_paths: Vec<String>,
    /// Single-flight refresh state, owned per client instance.
    gate: RefreshGate,
    /// Application boundary to signal when re-authentication is required.
    on_session_expired: Option<SessionExpiredHook>,
}

impl MentoraClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client from a [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        ClientBuilder::from_config(config).build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the token store, for login flows that obtain a token outside the
    /// client and need somewhere to put it.
    pub fn token_store(&self) -> &SharedTokenStore {
        &self.inner.token_store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the auth API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the users API.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    /// Access the groups API.
    pub fn groups(&self) -> GroupsApi {
        GroupsApi::new(self.clone())
    }

    /// Access the assessments API.
    pub fn assessments(&self) -> AssessmentsApi {
        AssessmentsApi::new(self.clone())
    }

    /// Access the sessions API.
    pub fn sessions(&self) -> SessionsApi {
        SessionsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Generic HTTP interface
    // ─────────────────────────────────────────────────────────────────────────

    /// Make a GET request.
    pub async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.request(Method::GET, path, None, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let query = serde_json::to_value(query)?;
        let value = self.request(Method::GET, path, Some(query), None).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Make a POST request.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let value = self.request(Method::POST, path, None, Some(body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Make a POST request without a body.
    pub async fn post_empty<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.request(Method::POST, path, None, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Make a PUT request.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let value = self.request(Method::PUT, path, None, Some(body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Make a PATCH request.
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let value = self.request(Method::PATCH, path, None, Some(body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Make a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::DELETE, path, None, None).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request pipeline
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner
            .base_url
            .join(&format!("api/v1/{}", path))
            .map_err(Error::from)
    }

    /// Whether responses from `path` are camelized before returning.
    fn is_auth_path(&self, path: &str) -> bool {
        let path = format!("/{}", path.trim_start_matches('/'));
        self.inner
            .auth_paths
            .iter()
            .any(|needle| path.contains(needle.as_str()))
    }

    fn is_refresh_path(&self, path: &str) -> bool {
        path.trim_start_matches('/') == REFRESH_PATH
    }

    /// Run one call through the full pipeline.
    ///
    /// A 401 enters the refresh protocol and earns exactly one retry; the
    /// retried call's outcome is final, whatever it is. Every other failure
    /// propagates unchanged.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<Value>,
        body: Option<Value>,
    ) -> Result<Value> {
        match self
            .send_once(&method, path, query.as_ref(), body.as_ref())
            .await
        {
            Err(Error::Api { status: 401, .. }) if !self.is_refresh_path(path) => {
                self.acquire_fresh_token().await?;
                self.send_once(&method, path, query.as_ref(), body.as_ref())
                    .await
            }
            outcome => outcome,
        }
    }

    /// Attach, send, normalize. No retry logic here.
    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        query: Option<&Value>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.url(path)?;
        let mut request = self
            .inner
            .http
            .request(method.clone(), url)
            .timeout(self.inner.timeout);

        // re-read on every attempt: the slot may have been rotated by a
        // refresh or written by a login flow outside this client
        if let Some(token) = self.inner.token_store.get() {
            request = request.bearer_auth(token);
        }

        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(path, response).await
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response(&self, path: &str, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            if bytes.is_empty() {
                return Ok(Value::Null);
            }
            let value: Value = serde_json::from_slice(&bytes)?;
            if self.is_auth_path(path) {
                Ok(case::snake_to_camel(&value))
            } else {
                Ok(value)
            }
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Api {
                status: status.as_u16(),
                body,
            })
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Refresh protocol
    // ─────────────────────────────────────────────────────────────────────────

    /// Rotate the access token, coalescing concurrent callers into a single
    /// refresh. Returns the new token; the store is already updated.
    pub(crate) async fn refresh_token(&self) -> Result<String> {
        self.acquire_fresh_token().await
    }

    async fn acquire_fresh_token(&self) -> Result<String> {
        match self.inner.gate.begin() {
            Ticket::Owner => {
                let outcome = self.run_refresh().await;
                self.inner.gate.finish(&outcome);
                match outcome {
                    Ok(token) => Ok(token),
                    Err(failure) => {
                        self.inner.token_store.clear();
                        if let Some(hook) = &self.inner.on_session_expired {
                            hook();
                        }
                        Err(Error::SessionExpired(failure.0))
                    }
                }
            }
            Ticket::Waiter(rx) => {
                tracing::debug!("token refresh already in flight, queuing");
                match rx.await {
                    Ok(Ok(token)) => Ok(token),
                    Ok(Err(failure)) => Err(Error::SessionExpired(failure.0)),
                    // owner task dropped mid-refresh
                    Err(_) => Err(Error::SessionExpired("refresh was interrupted".to_string())),
                }
            }
        }
    }

    /// Call the refresh endpoint and store the rotated token.
    ///
    /// The expired bearer is deliberately not attached; the cookie jar
    /// carries the session credential the endpoint authenticates with.
    async fn run_refresh(&self) -> RefreshOutcome {
        tracing::debug!("refreshing access token");

        let url = self
            .url(REFRESH_PATH)
            .map_err(|err| RefreshFailure(err.to_string()))?;

        let response = self
            .inner
            .http
            .post(url)
            .timeout(self.inner.timeout)
            .send()
            .await
            .map_err(|err| RefreshFailure(format!("refresh request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("refresh endpoint returned {status}");
            return Err(RefreshFailure(format!(
                "refresh endpoint returned {status}: {body}"
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|err| RefreshFailure(format!("malformed refresh response: {err}")))?;
        let value = case::snake_to_camel(&value);

        let token = value
            .get("accessToken")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                RefreshFailure("malformed refresh response: missing accessToken".to_string())
            })?
            .to_string();

        self.inner.token_store.set(&token);
        tracing::info!("access token refreshed");
        Ok(token)
    }
}

/// Builder for creating a [`MentoraClient`].
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    token_store: Option<SharedTokenStore>,
    auth_paths: Vec<String>,
    on_session_expired: Option<SessionExpiredHook>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            token_store: None,
            auth_paths: DEFAULT_AUTH_PATHS.iter().map(|p| p.to_string()).collect(),
            on_session_expired: None,
        }
    }

    /// Create a builder pre-populated from a [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut builder = Self::new()
            .base_url(config.api.base_url.clone())
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .auth_paths(config.auth.auth_paths.clone());

        if let Some(path) = &config.auth.token_file {
            builder = builder.token_store(Arc::new(FileTokenStore::new(path)));
        }

        builder
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the token store. Defaults to an in-memory store.
    pub fn token_store(mut self, store: SharedTokenStore) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Replace the set of path substrings whose responses are camelized.
    pub fn auth_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.auth_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the hook invoked when a token refresh fails terminally.
    pub fn on_session_expired(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Some(Arc::new(hook));
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<MentoraClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(format!("mentora-client/{}", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .build()?;

        let token_store = self
            .token_store
            .unwrap_or_else(|| Arc::new(InMemoryTokenStore::new()));

        Ok(MentoraClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                token_store,
                auth_paths: self.auth_paths,
                gate: RefreshGate::default(),
                on_session_expired: self.on_session_expired,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientBuilder::new().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_with_base_url() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8000")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8000/")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_url_building() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8000")
            .build()
            .unwrap();

        let url = client.url("users").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/users");

        let url = client.url("/users").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/users");
    }

    #[test]
    fn test_auth_path_predicate() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8000")
            .build()
            .unwrap();

        assert!(client.is_auth_path("auth/refresh"));
        assert!(client.is_auth_path("/auth/google"));
        assert!(!client.is_auth_path("users/me"));
        // substring match, not prefix match
        assert!(client.is_auth_path("admin/auth/tokens"));
    }

    #[test]
    fn test_auth_path_predicate_is_configurable() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8000")
            .auth_paths(["/session/"])
            .build()
            .unwrap();

        assert!(client.is_auth_path("session/refresh"));
        assert!(!client.is_auth_path("auth/refresh"));
    }

    #[test]
    fn test_refresh_path_detection() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8000")
            .build()
            .unwrap();

        assert!(client.is_refresh_path("auth/refresh"));
        assert!(client.is_refresh_path("/auth/refresh"));
        assert!(!client.is_refresh_path("auth/refresh/other"));
    }

    #[test]
    fn test_from_config() {
        let config = ClientConfig::from_yaml(
            r#"
api:
  base-url: https://api.mentora.example
  timeout-secs: 3
"#,
        )
        .unwrap();

        let client = MentoraClient::from_config(&config).unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.mentora.example/");
        assert_eq!(client.inner.timeout, Duration::from_secs(3));
    }
}
