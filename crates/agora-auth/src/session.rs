//! Session endpoint calls
//!
//! Handles the four session interactions with the backend's auth controller:
//! login, token refresh, logout, and the current-user profile read.
//!
//! Refresh is deliberately bare: no bearer header, empty JSON body. The
//! HttpOnly refresh cookie riding the caller's cookie jar is the only
//! credential, so a client that lost its access token can still recover a
//! session as long as the cookie is alive.

use serde::{Deserialize, Serialize};

use crate::constants::{LOGIN_PATH, LOGOUT_PATH, PROFILE_PATH};
use crate::error::{Error, Result};

/// Authenticated user profile as returned by login, refresh, and `/auth/me`.
///
/// Only the fields the client acts on are typed; everything else the server
/// sends rides along in `extra` so the profile can be handed back to callers
/// without loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response body shared by the login and refresh endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub access_token: String,
    pub user: UserProfile,
}

/// Join a base URL and an endpoint path.
fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Exchange user credentials for a session.
///
/// On success the server returns the access token in the body and sets the
/// HttpOnly refresh cookie on the response; a cookie-jar-bearing client
/// picks the cookie up automatically.
pub async fn login(
    client: &reqwest::Client,
    base_url: &str,
    user_id: &str,
    password: &str,
) -> Result<SessionResponse> {
    let response = client
        .post(endpoint(base_url, LOGIN_PATH))
        .json(&serde_json::json!({ "userId": user_id, "userPwd": password }))
        .send()
        .await
        .map_err(|e| Error::Http(format!("login request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        if status.as_u16() == 401 {
            return Err(Error::InvalidCredentials(format!(
                "login rejected ({status}): {body}"
            )));
        }

        return Err(Error::SessionRejected(format!(
            "login endpoint returned {status}: {body}"
        )));
    }

    response
        .json::<SessionResponse>()
        .await
        .map_err(|e| Error::Parse(format!("invalid login response: {e}")))
}

/// Mint a new access token using the refresh cookie.
///
/// `refresh_path` comes from client configuration; the default is
/// [`crate::constants::REFRESH_PATH`]. A 2xx response that carries no usable
/// token counts as a rejection, not a success.
pub async fn refresh_session(
    client: &reqwest::Client,
    base_url: &str,
    refresh_path: &str,
) -> Result<SessionResponse> {
    let response = client
        .post(endpoint(base_url, refresh_path))
        .json(&serde_json::json!({}))
        .send()
        .await
        .map_err(|e| Error::Http(format!("refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        // 401/403 means the refresh cookie is missing, expired, or revoked
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::InvalidCredentials(format!(
                "refresh rejected ({status}): {body}"
            )));
        }

        return Err(Error::SessionRejected(format!(
            "refresh endpoint returned {status}: {body}"
        )));
    }

    let session = response
        .json::<SessionResponse>()
        .await
        .map_err(|e| Error::Parse(format!("invalid refresh response: {e}")))?;

    if session.access_token.is_empty() {
        return Err(Error::SessionRejected(
            "refresh response carried no access token".into(),
        ));
    }

    Ok(session)
}

/// End the session server-side (clears the refresh cookie).
///
/// Best-effort from the caller's perspective: the local credential is wiped
/// regardless of this call's outcome, so callers may log and ignore errors.
pub async fn logout(client: &reqwest::Client, base_url: &str, access: Option<&str>) -> Result<()> {
    let mut request = client.post(endpoint(base_url, LOGOUT_PATH));
    if let Some(token) = access {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .map_err(|e| Error::Http(format!("logout request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::SessionRejected(format!(
            "logout endpoint returned {status}"
        )));
    }

    Ok(())
}

/// Fetch the profile of the user the given access token belongs to.
pub async fn current_user(
    client: &reqwest::Client,
    base_url: &str,
    access: &str,
) -> Result<UserProfile> {
    let response = client
        .get(endpoint(base_url, PROFILE_PATH))
        .bearer_auth(access)
        .send()
        .await
        .map_err(|e| Error::Http(format!("profile request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::InvalidCredentials(format!(
                "profile read rejected ({status}): {body}"
            )));
        }

        return Err(Error::SessionRejected(format!(
            "profile endpoint returned {status}: {body}"
        )));
    }

    response
        .json::<UserProfile>()
        .await
        .map_err(|e| Error::Parse(format!("invalid profile response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::REFRESH_PATH;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode, header};
    use axum::routing::post;
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[test]
    fn session_response_deserializes() {
        let json = r#"{
            "accessToken": "at_abc",
            "user": { "userId": "kim", "nickname": "K", "role": "USER", "point": 42 }
        }"#;
        let session: SessionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(session.access_token, "at_abc");
        assert_eq!(session.user.user_id, "kim");
        assert_eq!(session.user.nickname.as_deref(), Some("K"));
        // Unknown fields are retained, not dropped
        assert_eq!(session.user.extra["point"], 42);
    }

    #[test]
    fn user_profile_tolerates_missing_optionals() {
        let json = r#"{ "userId": "lee" }"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.user_id, "lee");
        assert!(profile.nickname.is_none());
        assert!(profile.role.is_none());
    }

    #[test]
    fn endpoint_join_trims_trailing_slash() {
        assert_eq!(
            endpoint("http://h:1/api/", "/auth/login"),
            "http://h:1/api/auth/login"
        );
        assert_eq!(
            endpoint("http://h:1/api", "/auth/login"),
            "http://h:1/api/auth/login"
        );
    }

    /// Spawn a mock backend and return its base URL (with the /api prefix).
    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        format!("http://{addr}/api")
    }

    fn cookie_client() -> reqwest::Client {
        reqwest::Client::builder().cookie_store(true).build().unwrap()
    }

    fn session_json(token: &str) -> String {
        serde_json::json!({
            "accessToken": token,
            "user": { "userId": "kim", "nickname": "K", "role": "USER" }
        })
        .to_string()
    }

    #[tokio::test]
    async fn login_then_refresh_carries_cookie() {
        let app = Router::new()
            .route(
                "/api/auth/login",
                post(|| async {
                    (
                        StatusCode::OK,
                        [
                            (header::SET_COOKIE, "refreshToken=rt_1; Path=/; HttpOnly"),
                            (header::CONTENT_TYPE, "application/json"),
                        ],
                        session_json("at_1"),
                    )
                }),
            )
            .route(
                "/api/auth/refresh",
                post(|headers: HeaderMap| async move {
                    let cookie = headers
                        .get(header::COOKIE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("");
                    if cookie.contains("refreshToken=rt_1") {
                        (
                            StatusCode::OK,
                            [(header::CONTENT_TYPE, "application/json")],
                            session_json("at_2"),
                        )
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            [(header::CONTENT_TYPE, "application/json")],
                            String::new(),
                        )
                    }
                }),
            );
        let base_url = serve(app).await;
        let client = cookie_client();

        let session = login(&client, &base_url, "kim", "pw").await.unwrap();
        assert_eq!(session.access_token, "at_1");

        // The refresh cookie set at login must ride the refresh call
        let refreshed = refresh_session(&client, &base_url, REFRESH_PATH)
            .await
            .unwrap();
        assert_eq!(refreshed.access_token, "at_2");
    }

    #[tokio::test]
    async fn login_401_is_invalid_credentials() {
        let app = Router::new().route(
            "/api/auth/login",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad password") }),
        );
        let base_url = serve(app).await;

        let result = login(&cookie_client(), &base_url, "kim", "wrong").await;
        assert!(matches!(result, Err(Error::InvalidCredentials(_))));
    }

    #[tokio::test]
    async fn refresh_401_is_invalid_credentials() {
        let app = Router::new().route(
            "/api/auth/refresh",
            post(|| async { StatusCode::UNAUTHORIZED }),
        );
        let base_url = serve(app).await;

        let result = refresh_session(&cookie_client(), &base_url, REFRESH_PATH).await;
        assert!(matches!(result, Err(Error::InvalidCredentials(_))));
    }

    #[tokio::test]
    async fn refresh_without_token_is_rejected() {
        let app = Router::new().route(
            "/api/auth/refresh",
            post(|| async {
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "application/json")],
                    session_json(""),
                )
            }),
        );
        let base_url = serve(app).await;

        let result = refresh_session(&cookie_client(), &base_url, REFRESH_PATH).await;
        assert!(matches!(result, Err(Error::SessionRejected(_))));
    }

    #[tokio::test]
    async fn current_user_requires_valid_bearer() {
        let app = Router::new().route(
            "/api/auth/me",
            axum::routing::get(|headers: HeaderMap| async move {
                let auth = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("");
                if auth == "Bearer at_ok" {
                    (
                        StatusCode::OK,
                        [(header::CONTENT_TYPE, "application/json")],
                        r#"{ "userId": "kim", "role": "USER" }"#.to_string(),
                    )
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        [(header::CONTENT_TYPE, "application/json")],
                        String::new(),
                    )
                }
            }),
        );
        let base_url = serve(app).await;
        let client = cookie_client();

        let profile = current_user(&client, &base_url, "at_ok").await.unwrap();
        assert_eq!(profile.user_id, "kim");

        let rejected = current_user(&client, &base_url, "at_bad").await;
        assert!(matches!(rejected, Err(Error::InvalidCredentials(_))));
    }
}
