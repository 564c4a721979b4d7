//! Error types surfaced to page-level callers

/// Errors from API calls.
///
/// The client resolves exactly one failure class on its own (a 401 on a
/// retry-eligible request, via the silent refresh path); everything else
/// lands here untouched for the caller to handle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network-level failure (unreachable host, timeout). Never retried.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status, after any recovery this client performs.
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Session endpoint misbehaved (unexpected status or an unusable body).
    #[error("session error: {0}")]
    Session(String),

    /// Response body could not be decoded into the requested type.
    #[error("decode error: {0}")]
    Decode(String),

    /// Credential or view-key persistence failed.
    #[error("store error: {0}")]
    Store(String),

    /// Client configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is an authentication failure the caller should treat
    /// as "logged out" (the session could not be recovered).
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Whether this is a permission failure (authenticated but not allowed).
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }
}

/// Result alias for API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accessor_only_for_status_errors() {
        let err = Error::Status {
            status: 403,
            body: "banned".into(),
        };
        assert_eq!(err.status(), Some(403));
        assert!(err.is_forbidden());
        assert!(!err.is_unauthorized());

        assert_eq!(Error::Transport("refused".into()).status(), None);
    }

    #[test]
    fn display_includes_status_and_body() {
        let err = Error::Status {
            status: 401,
            body: "token expired".into(),
        };
        let text = err.to_string();
        assert!(text.contains("401"), "got: {text}");
        assert!(text.contains("token expired"), "got: {text}");
    }
}
