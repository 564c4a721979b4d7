//! Session endpoint locations
//!
//! The session family lives under the backend's `/auth` controller. These
//! paths are part of the wire contract; the refresh path additionally appears
//! in the client configuration so deployments can relocate it.

/// Login endpoint (POST, JSON `{"userId", "userPwd"}`)
pub const LOGIN_PATH: &str = "/auth/login";

/// Token refresh endpoint (POST, empty body, refresh cookie only)
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Logout endpoint (POST, clears the refresh cookie server-side)
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Current-user profile endpoint (GET, bearer required)
pub const PROFILE_PATH: &str = "/auth/me";

/// Default client-side access-token lifetime hint, in seconds.
/// Mirrors the one-day expiry the backend stamps on its session cookie.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 86_400;
