//! Request records and the decoration pipeline
//!
//! A request is plain data until the moment it is sent. Decoration (bearer
//! token, view-key) is an ordered list of pure transforms applied to a copy
//! of the record per attempt, so a replay naturally re-reads whatever the
//! stores hold at replay time.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

/// Header carrying the anonymous view-key on board detail reads.
pub const VIEW_KEY_HEADER: HeaderName = HeaderName::from_static("x-view-key");

/// A request as assembled by the caller, before decoration.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub content_type: Option<String>,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
            content_type: None,
        }
    }
}

/// One delivery attempt of a request.
///
/// Replays are fresh records with `attempt + 1`, never an in-place flag on a
/// shared request object, so a request value can be held or reused by the
/// caller without aliasing surprises.
#[derive(Debug, Clone)]
pub struct RequestAttempt {
    pub request: PendingRequest,
    pub attempt: u32,
}

impl RequestAttempt {
    /// The initial delivery of a request.
    pub fn first(request: PendingRequest) -> Self {
        Self {
            request,
            attempt: 0,
        }
    }

    /// The follow-up delivery after a successful token refresh.
    pub fn replay(&self) -> Self {
        Self {
            request: self.request.clone(),
            attempt: self.attempt + 1,
        }
    }

    /// Whether this attempt already went through the refresh path once.
    pub fn is_replay(&self) -> bool {
        self.attempt > 0
    }
}

/// A request-side decoration step.
pub type Transform = Box<dyn Fn(PendingRequest) -> PendingRequest + Send + Sync>;

/// Ordered decoration pipeline, applied functionally before send.
#[derive(Default)]
pub struct Pipeline {
    transforms: Vec<Transform>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transform: Transform) {
        self.transforms.push(transform);
    }

    pub fn apply(&self, request: PendingRequest) -> PendingRequest {
        self.transforms
            .iter()
            .fold(request, |request, transform| transform(request))
    }
}

/// Attach `Authorization: Bearer <token>`, replacing any prior value.
pub fn bearer(token: String) -> Transform {
    Box::new(move |mut request| {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => {
                request.headers.insert(AUTHORIZATION, value);
            }
            Err(e) => warn!(error = %e, "skipping unusable bearer token"),
        }
        request
    })
}

/// Attach the anonymous view-key header.
pub fn view_key(key: String) -> Transform {
    Box::new(move |mut request| {
        match HeaderValue::from_str(&key) {
            Ok(value) => {
                request.headers.insert(VIEW_KEY_HEADER, value);
            }
            Err(e) => warn!(error = %e, "skipping unusable view-key"),
        }
        request
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_applies_in_order() {
        let mut pipeline = Pipeline::new();
        pipeline.push(bearer("first".into()));
        pipeline.push(bearer("second".into()));

        let decorated = pipeline.apply(PendingRequest::new(Method::GET, "/board/1"));
        // Later transforms win on the same header
        assert_eq!(
            decorated.headers.get(AUTHORIZATION).unwrap(),
            "Bearer second"
        );
    }

    #[test]
    fn bearer_and_view_key_coexist() {
        let mut pipeline = Pipeline::new();
        pipeline.push(bearer("at_1".into()));
        pipeline.push(view_key("vk_1".into()));

        let decorated = pipeline.apply(PendingRequest::new(Method::GET, "/board/42"));
        assert_eq!(decorated.headers.get(AUTHORIZATION).unwrap(), "Bearer at_1");
        assert_eq!(decorated.headers.get(VIEW_KEY_HEADER).unwrap(), "vk_1");
    }

    #[test]
    fn empty_pipeline_is_identity() {
        let request = PendingRequest::new(Method::POST, "/messages");
        let decorated = Pipeline::new().apply(request.clone());
        assert_eq!(decorated.path, request.path);
        assert!(decorated.headers.is_empty());
    }

    #[test]
    fn unusable_bearer_is_skipped_not_fatal() {
        let mut pipeline = Pipeline::new();
        pipeline.push(bearer("bad\ntoken".into()));

        let decorated = pipeline.apply(PendingRequest::new(Method::GET, "/board/1"));
        assert!(decorated.headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn replay_increments_attempt_and_preserves_request() {
        let first = RequestAttempt::first(PendingRequest::new(Method::GET, "/notifications"));
        assert_eq!(first.attempt, 0);
        assert!(!first.is_replay());

        let replay = first.replay();
        assert_eq!(replay.attempt, 1);
        assert!(replay.is_replay());
        assert_eq!(replay.request.path, "/notifications");
        // The original record is untouched
        assert_eq!(first.attempt, 0);
    }
}
