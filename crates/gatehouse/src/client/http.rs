//! Authenticated HTTP client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, trace, warn};

use crate::Result;
use crate::auth::refresh::{Attached, RefreshCoordinator, RefreshFailure, RefreshOutcome};
use crate::auth::{AccessToken, CredentialKey, CredentialStore, MemoryStore, RefreshToken};
use crate::error::{AuthError, Error, RequestError};
use crate::notify::{ErrorReporter, Notification, SessionEvent, TracingReporter};
use crate::types::ApiUrl;

use super::endpoints::{self, ErrorBody, RefreshResponse, RefreshTokenBody};
use super::request::{ApiRequest, ApiResponse};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const SESSION_EVENT_CAPACITY: usize = 16;

/// Transport settings for an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("gatehouse/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP client for the Gatehouse API.
///
/// Every request carries the stored access token when one exists. When the
/// server answers 401 the client refreshes the token once, shared with every
/// other request that failed at the same time, and replays the request.
/// If the refresh fails the stored credentials are cleared, callers receive
/// [`AuthError::SessionExpired`] and [`SessionEvent::Expired`] is broadcast.
///
/// Clients are cheap to clone (they use internal `Arc`); clones share the
/// credential store and the refresh state.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base: ApiUrl,
    http: reqwest::Client,
    store: Arc<dyn CredentialStore>,
    reporter: Arc<dyn ErrorReporter>,
    refresh: RefreshCoordinator,
    events: broadcast::Sender<SessionEvent>,
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    base: ApiUrl,
    config: ClientConfig,
    store: Option<Arc<dyn CredentialStore>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
}

impl ApiClientBuilder {
    /// Credential store to read and write tokens through. Defaults to an
    /// empty [`MemoryStore`].
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Receiver of user-facing failures. Defaults to [`TracingReporter`].
    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let http = reqwest::Client::builder()
            .user_agent(self.config.user_agent)
            .timeout(self.config.timeout)
            .build()?;

        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                base: self.base,
                http,
                store: self.store.unwrap_or_else(|| Arc::new(MemoryStore::new())),
                reporter: self.reporter.unwrap_or_else(|| Arc::new(TracingReporter)),
                refresh: RefreshCoordinator::new(),
                events,
            }),
        })
    }
}

impl ApiClient {
    pub fn builder(base: ApiUrl) -> ApiClientBuilder {
        ApiClientBuilder {
            base,
            config: ClientConfig::default(),
            store: None,
            reporter: None,
        }
    }

    /// Create a client with an in-memory store and the tracing reporter.
    pub fn new(base: ApiUrl) -> Result<Self> {
        Self::builder(base).build()
    }

    /// Returns the API base URL this client is configured for.
    pub fn base_url(&self) -> &ApiUrl {
        &self.inner.base
    }

    /// The credential store backing this client.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    /// Subscribe to session lifecycle events.
    pub fn session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Number of refresh calls issued since the client was built.
    pub fn refresh_count(&self) -> u64 {
        self.inner.refresh.started()
    }

    /// Whether a refresh call is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    /// Whether an access token is stored.
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.inner.store.get(CredentialKey::AccessToken)?.is_some())
    }

    /// Issue a request and decode the JSON response.
    pub async fn request<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        self.send(request).await?.json()
    }

    /// Issue a request without passing failures to the error reporter.
    pub(crate) async fn send_unreported(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.execute(request).await
    }

    /// Issue a request and return the raw response.
    ///
    /// Failures that reach the caller as [`Error::Transport`] or
    /// [`Error::Request`] are also passed to the error reporter.
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let outcome = self.execute(request).await;

        if let Err(ref err) = outcome {
            if err.is_reportable() {
                self.inner
                    .reporter
                    .report(Notification::error(err.user_message()));
            } else if err.is_session_expired() {
                debug!("Session expired");
            }
        }

        outcome
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // No receivers is fine; the host may not listen.
        let _ = self.inner.events.send(event);
    }

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let token = self.stored_access_token()?;
        let first = self.dispatch(&request, token.as_ref()).await;

        match first {
            // Anonymous requests have no session to recover.
            Err(Error::Request(err))
                if err.is_unauthorized() && token.is_some() && !request.retry_attempted() =>
            {
                debug!("Access token rejected");
                let retry = request.into_retry();
                let fresh = self.replacement_token(token.as_ref()).await?;
                self.dispatch(&retry, Some(&fresh)).await
            }
            other => other,
        }
    }

    /// The token to replay with after `sent` was rejected.
    ///
    /// A refresh that completed while the request was in flight has already
    /// stored a newer token; only a token that is still current is refreshed.
    async fn replacement_token(&self, sent: Option<&AccessToken>) -> Result<AccessToken> {
        match self.stored_access_token()? {
            Some(current) if Some(&current) != sent => {
                debug!("Access token already refreshed");
                Ok(current)
            }
            Some(_) => self.refreshed_token().await,
            // Cleared by an expired refresh or a logout.
            None => Err(Error::Auth(AuthError::SessionExpired)),
        }
    }

    fn stored_access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self
            .inner
            .store
            .get(CredentialKey::AccessToken)?
            .map(AccessToken::new))
    }

    /// Wait for a new access token, starting the refresh if none is pending.
    async fn refreshed_token(&self) -> Result<AccessToken> {
        let attached = self.inner.refresh.attach(|| {
            let inner = Arc::clone(&self.inner);
            async move {
                let outcome = inner.refresh_tokens().await;
                if let Err(ref failure) = outcome {
                    inner.expire_session(failure);
                }
                inner.refresh.finish();
                outcome
            }
            .boxed()
        });

        if let Attached::Joined(_) = attached {
            debug!("Joining refresh already in flight");
        }

        attached
            .into_pending()
            .await
            .map_err(|_| Error::Auth(AuthError::SessionExpired))
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<ApiResponse> {
        let url = self.inner.base.endpoint(request.path());
        debug!(
            method = %request.method(),
            %url,
            retry = request.retry_attempted(),
            authenticated = token.is_some(),
            "API request"
        );

        let mut builder = self
            .inner
            .http
            .request(request.method().clone(), &url)
            .headers(request.headers().clone());

        if !request.query_params().is_empty() {
            builder = builder.query(request.query_params());
        }

        if let Some(token) = token {
            builder = builder.bearer_auth(token.as_str());
        }

        let response = request.apply_body(builder)?.send().await?;

        handle_response(response).await
    }
}

impl ClientInner {
    /// Exchange the stored refresh token for a new access token and store it.
    #[instrument(skip(self), fields(api = %self.base))]
    async fn refresh_tokens(&self) -> RefreshOutcome {
        info!("Refreshing access token");

        let refresh_token = self
            .store
            .get(CredentialKey::RefreshToken)
            .map_err(|e| RefreshFailure::Store {
                message: e.to_string(),
            })?
            .map(RefreshToken::new)
            .ok_or(RefreshFailure::MissingRefreshToken)?;

        let url = self.base.endpoint(endpoints::REFRESH);
        let response = self
            .http
            .post(&url)
            .json(&RefreshTokenBody {
                refresh_token: refresh_token.as_str(),
            })
            .send()
            .await
            .map_err(|e| RefreshFailure::Unreachable {
                message: e.to_string(),
            })?;

        let status = response.status();
        trace!(status = %status, "Refresh response");
        if !status.is_success() {
            return Err(RefreshFailure::Rejected {
                status: status.as_u16(),
            });
        }

        let body: RefreshResponse =
            response
                .json()
                .await
                .map_err(|e| RefreshFailure::Malformed {
                    message: e.to_string(),
                })?;

        let persist = |key, value: &str| {
            self.store
                .set(key, value)
                .map_err(|e| RefreshFailure::Store {
                    message: e.to_string(),
                })
        };
        persist(CredentialKey::AccessToken, &body.access_token)?;
        if let Some(ref rotated) = body.refresh_token {
            persist(CredentialKey::RefreshToken, rotated)?;
        }

        debug!("Access token refreshed");
        Ok(AccessToken::new(body.access_token))
    }

    fn expire_session(&self, failure: &RefreshFailure) {
        warn!(error = %failure, "Token refresh failed, ending session");

        if let Err(e) = self.store.clear_all() {
            warn!(error = %e, "Failed to clear stored credentials");
        }

        let _ = self.events.send(SessionEvent::Expired);
    }
}

/// Turn a response into the body or a request error.
async fn handle_response(response: reqwest::Response) -> Result<ApiResponse> {
    let status = response.status();
    trace!(status = %status, "API response");

    if status.is_success() {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();
        Ok(ApiResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    } else {
        Err(Error::Request(parse_error_response(response).await))
    }
}

async fn parse_error_response(response: reqwest::Response) -> RequestError {
    let status = response.status().as_u16();

    match response.json::<ErrorBody>().await {
        Ok(body) => RequestError::new(status, body.error, body.message),
        Err(_) => RequestError::new(status, None, None),
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.inner.base)
            .field("refresh", &self.inner.refresh)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let base = ApiUrl::new("https://visitors.example.com/api/v1").unwrap();
        let client = ApiClient::new(base.clone()).unwrap();
        assert_eq!(client.base_url(), &base);
        assert_eq!(client.refresh_count(), 0);
        assert!(!client.is_refreshing());
        assert!(!client.is_authenticated().unwrap());
    }

    #[test]
    fn clones_share_store() {
        let base = ApiUrl::new("https://visitors.example.com/api/v1").unwrap();
        let client = ApiClient::new(base).unwrap();
        let clone = client.clone();
        client.store().set(CredentialKey::AccessToken, "T1").unwrap();
        assert!(clone.is_authenticated().unwrap());
    }

    #[test]
    fn default_config_uses_crate_user_agent() {
        let config = ClientConfig::default();
        assert!(config.user_agent.starts_with("gatehouse/"));
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}
