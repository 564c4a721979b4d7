//! Route classification
//!
//! Pure decision layer: given a method and a path, decide how the request is
//! authenticated before it leaves the client. Checks run in a fixed priority
//! order (admin prefix, then public-read allowlist, then default-private) so
//! no path can match two classes ambiguously. The query string never
//! participates in classification.
//!
//! The view-key is a separate, additive decision: numbered reads under the
//! view-key prefix carry the anonymous view-key header on top of whatever
//! the auth classification decides.

use reqwest::Method;

use crate::config::ClientConfig;

/// How a request is authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Moderation traffic: credential attached when present, the server
    /// rejects on its own when it is absent
    AdminAlwaysAuth,
    /// Public read: credential attached when present for logged-in-enhanced
    /// views, never required, and a 401 is final
    PublicOptionalAuth,
    /// Everything else: credential attached when present; the server's 401
    /// drives the silent refresh path
    PrivateRequireAuth,
}

impl RouteClass {
    /// Class label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            RouteClass::AdminAlwaysAuth => "admin",
            RouteClass::PublicOptionalAuth => "public",
            RouteClass::PrivateRequireAuth => "private",
        }
    }

    /// Whether a 401 on this class may start a silent refresh.
    /// Public reads fail straight to the caller.
    pub fn triggers_refresh(&self) -> bool {
        !matches!(self, RouteClass::PublicOptionalAuth)
    }
}

/// Route knowledge extracted from [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    admin_prefix: String,
    view_key_prefix: String,
    public_read_prefixes: Vec<String>,
}

impl RoutePolicy {
    pub fn new(
        admin_prefix: impl Into<String>,
        view_key_prefix: impl Into<String>,
        public_read_prefixes: Vec<String>,
    ) -> Self {
        Self {
            admin_prefix: admin_prefix.into(),
            view_key_prefix: view_key_prefix.into(),
            public_read_prefixes,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.admin_prefix.clone(),
            config.view_key_prefix.clone(),
            config.public_read_prefixes.clone(),
        )
    }

    /// Classify a request. Pure: same input, same class, no side effects.
    pub fn classify(&self, method: &Method, path: &str) -> RouteClass {
        let path = strip_query(path);

        if path.starts_with(&self.admin_prefix) {
            return RouteClass::AdminAlwaysAuth;
        }

        if *method == Method::GET
            && self
                .public_read_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return RouteClass::PublicOptionalAuth;
        }

        RouteClass::PrivateRequireAuth
    }

    /// Whether the request carries the anonymous view-key header.
    ///
    /// Only numbered detail reads under the view-key prefix qualify
    /// (`/board/42` yes, `/board/search` no): the key deduplicates views of
    /// a single resource, and list/search reads have nothing to deduplicate.
    pub fn wants_view_key(&self, method: &Method, path: &str) -> bool {
        if *method != Method::GET {
            return false;
        }

        let path = strip_query(path);
        let Some(rest) = path.strip_prefix(self.view_key_prefix.as_str()) else {
            return false;
        };

        let segment = rest.split('/').next().unwrap_or("");
        !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Drop the query string before any prefix matching.
fn strip_query(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}
