//! Authenticated API client
//!
//! The single transport surface for page-level code. Every call passes
//! through route classification and the decoration pipeline before it goes
//! out; the 401 recovery path (refresh, swap, replay once) runs between the
//! wire and the caller, so callers never manage tokens or headers.
//!
//! Recovery flow for a private or admin request:
//! 1. Response is 401 and this is the first delivery of the request
//! 2. Call the refresh endpoint directly — never through `call()`, so the
//!    recovery path cannot re-enter itself — with the refresh cookie as the
//!    only credential
//! 3. On success: store the new token, replay the original request once,
//!    return the replay's outcome whatever it is
//! 4. On failure: clear the credential slot, send the user to the login
//!    boundary (at most once), surface the original 401 to the caller
//!
//! Public reads skip all of this: their 401s are final.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use agora_auth::{CredentialStore, UserProfile, ViewKeyStore, session};

use crate::classify::{RouteClass, RoutePolicy};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::navigate::Navigator;
use crate::request::{self, PendingRequest, Pipeline, RequestAttempt};

/// Response handed back to callers: status, headers, raw body.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::Decode(format!("decoding response body: {e}")))
    }

    /// The body as text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Authenticated HTTP client over the forum backend.
///
/// Holds one reqwest client with a cookie store (the refresh cookie lives
/// there), the route policy, and the injected stores and navigator. Cheap to
/// share behind an `Arc`; all methods take `&self`.
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    policy: RoutePolicy,
    credentials: Arc<CredentialStore>,
    view_keys: Arc<ViewKeyStore>,
    navigator: Arc<dyn Navigator>,
    redirect_gate: tokio::sync::Mutex<()>,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        credentials: Arc<CredentialStore>,
        view_keys: Arc<ViewKeyStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("building http client: {e}")))?;

        let policy = RoutePolicy::from_config(&config);
        info!(base_url = %config.base_url, "api client initialized");

        Ok(Self {
            http,
            config,
            policy,
            credentials,
            view_keys,
            navigator,
            redirect_gate: tokio::sync::Mutex::new(()),
        })
    }

    /// Issue a request. The only transport entry point.
    ///
    /// `path` is relative to the configured base URL and must start with `/`.
    /// Transport errors and non-2xx statuses come back as `Err`; the single
    /// recovered case is a 401 on a refresh-eligible request.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
    ) -> Result<ApiResponse> {
        let mut pending = PendingRequest::new(method, path);
        pending.body = body;
        pending.content_type = content_type.map(str::to_owned);
        self.dispatch(RequestAttempt::first(pending)).await
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.call(Method::GET, path, None, None).await
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<ApiResponse> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| Error::Decode(format!("encoding request body: {e}")))?;
        self.call(Method::POST, path, Some(bytes), Some("application/json"))
            .await
    }

    pub async fn put_json(&self, path: &str, body: &serde_json::Value) -> Result<ApiResponse> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| Error::Decode(format!("encoding request body: {e}")))?;
        self.call(Method::PUT, path, Some(bytes), Some("application/json"))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.call(Method::DELETE, path, None, None).await
    }

    /// Log in and store the returned access token.
    ///
    /// The server also plants the refresh cookie on this client's cookie jar,
    /// which is what the silent refresh path lives off later.
    pub async fn login(&self, user_id: &str, password: &str) -> Result<UserProfile> {
        let fresh = session::login(&self.http, &self.config.base_url, user_id, password)
            .await
            .map_err(session_error)?;

        if let Err(e) = self
            .credentials
            .set(fresh.access_token, self.credential_lifetime())
            .await
        {
            warn!(error = %e, "failed to persist access token after login");
        }

        info!(user_id, "logged in");
        Ok(fresh.user)
    }

    /// End the session: best-effort server logout, then wipe the local slot.
    ///
    /// The local credential is cleared even when the logout endpoint is
    /// unreachable — the view-key is left alone.
    pub async fn logout(&self) -> Result<()> {
        let access = self.credentials.get().await.map(|c| c.access);
        if let Err(e) = session::logout(&self.http, &self.config.base_url, access.as_deref()).await
        {
            debug!(error = %e, "logout endpoint call failed, clearing local session anyway");
        }

        self.credentials
            .clear()
            .await
            .map_err(|e| Error::Store(e.to_string()))
    }

    /// Fetch the logged-in user's profile.
    ///
    /// Goes through `call()`, so an expired access token is recovered
    /// silently when the refresh cookie is still alive — this is the session
    /// restore path a host runs on startup.
    pub async fn current_user(&self) -> Result<UserProfile> {
        let response = self.get(agora_auth::PROFILE_PATH).await?;
        response.json()
    }

    fn credential_lifetime(&self) -> Duration {
        Duration::from_secs(self.config.credential_lifetime_secs)
    }

    async fn dispatch(&self, attempt: RequestAttempt) -> Result<ApiResponse> {
        let class = self
            .policy
            .classify(&attempt.request.method, &attempt.request.path);
        let response = self.send_attempt(&attempt, class).await?;

        if response.status().as_u16() == 401 && !attempt.is_replay() && class.triggers_refresh() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            let original = Error::Status { status: 401, body };
            return self.recover_unauthorized(attempt, original).await;
        }

        finish(response).await
    }

    /// Decorate and transmit one attempt.
    ///
    /// The pipeline is rebuilt per attempt from the current store contents,
    /// so a replay after a refresh picks up the swapped token without any
    /// special casing.
    async fn send_attempt(
        &self,
        attempt: &RequestAttempt,
        class: RouteClass,
    ) -> Result<reqwest::Response> {
        let mut pipeline = Pipeline::new();

        // Every class attaches the credential when one is present; absence
        // never short-circuits locally. The server's 401 is the signal that
        // drives recovery, including for requests sent with no token at all.
        if let Some(credential) = self.credentials.get().await {
            pipeline.push(request::bearer(credential.access));
        }

        if self
            .policy
            .wants_view_key(&attempt.request.method, &attempt.request.path)
        {
            let key = self
                .view_keys
                .get_or_create()
                .await
                .map_err(|e| Error::Store(e.to_string()))?;
            pipeline.push(request::view_key(key));
        }

        let decorated = pipeline.apply(attempt.request.clone());

        debug!(
            method = %decorated.method,
            path = %decorated.path,
            class = class.label(),
            attempt = attempt.attempt,
            "dispatching request"
        );

        let url = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            decorated.path
        );

        let mut builder = self
            .http
            .request(decorated.method, &url)
            .headers(decorated.headers);
        if let Some(content_type) = &decorated.content_type {
            builder = builder.header(CONTENT_TYPE, content_type.as_str());
        }
        if let Some(body) = decorated.body {
            builder = builder.body(body);
        }

        builder
            .send()
            .await
            .map_err(|e| Error::Transport(format!("request failed: {e}")))
    }

    /// One-shot 401 recovery: refresh, swap, replay.
    ///
    /// The replay goes through `send_attempt` directly, not `dispatch`, so a
    /// second 401 falls straight through to the caller — there is no path
    /// back into this function for the same request.
    async fn recover_unauthorized(
        &self,
        attempt: RequestAttempt,
        original: Error,
    ) -> Result<ApiResponse> {
        debug!(path = %attempt.request.path, "access rejected, attempting silent refresh");

        match session::refresh_session(&self.http, &self.config.base_url, &self.config.refresh_path)
            .await
        {
            Ok(fresh) => {
                if let Err(e) = self
                    .credentials
                    .set(fresh.access_token, self.credential_lifetime())
                    .await
                {
                    warn!(error = %e, "failed to persist refreshed token");
                }
                info!(path = %attempt.request.path, "session refreshed, replaying request");

                let replay = attempt.replay();
                let class = self
                    .policy
                    .classify(&replay.request.method, &replay.request.path);
                let response = self.send_attempt(&replay, class).await?;
                finish(response).await
            }
            Err(e) => {
                warn!(error = %e, "silent refresh failed, ending session");
                if let Err(store_err) = self.credentials.clear().await {
                    warn!(error = %store_err, "failed to clear credential after refresh failure");
                }
                self.redirect_to_login().await;
                Err(original)
            }
        }
    }

    /// Send the user to the login boundary unless they are already there.
    ///
    /// Serialized through a gate so concurrent failing requests produce one
    /// navigation, not a burst.
    async fn redirect_to_login(&self) {
        let _gate = self.redirect_gate.lock().await;
        if self.navigator.location() != self.config.login_path {
            info!(path = %self.config.login_path, "redirecting to login boundary");
            self.navigator.navigate_to(&self.config.login_path);
        }
    }
}

/// Convert a finished response: 2xx becomes `ApiResponse`, the rest an error.
async fn finish(response: reqwest::Response) -> Result<ApiResponse> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .bytes()
        .await
        .map_err(|e| Error::Transport(format!("reading response body: {e}")))?;

    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    Ok(ApiResponse {
        status,
        headers,
        body: body.to_vec(),
    })
}

/// Map session-endpoint errors onto the caller-facing taxonomy.
fn session_error(e: agora_auth::Error) -> Error {
    match e {
        agora_auth::Error::Http(m) => Error::Transport(m),
        agora_auth::Error::InvalidCredentials(m) => Error::Status {
            status: 401,
            body: m,
        },
        agora_auth::Error::SessionRejected(m) => Error::Session(m),
        agora_auth::Error::Parse(m) => Error::Decode(m),
        agora_auth::Error::Io(m) => Error::Store(m),
    }
}
