//! Authenticated client for the Agora forum backend
//!
//! Page-level code talks to the backend exclusively through
//! [`client::ApiClient::call`] (and its thin `get`/`post_json`/... wrappers);
//! it never manages tokens or headers. Internally a request flows:
//!
//! caller → `ApiClient` → [`classify::RoutePolicy`] decides the auth class →
//! [`request::Pipeline`] decorates (bearer, view-key) → network → back to the
//! caller, except a 401 on a refresh-eligible request, which detours through
//! the one-shot silent refresh before the caller sees anything.
//!
//! The moving parts are injected: the credential and view-key stores come
//! from `agora-auth`, and the login-boundary redirect goes through the
//! [`navigate::Navigator`] capability so hosts and tests decide what a
//! "redirect" means.
//!
//! [`endpoints`] adds typed wrappers for the constantly-polled families
//! (notifications, unread counts, site name); they are plain delegations to
//! `call` and carry no auth logic of their own.

pub mod classify;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod navigate;
pub mod request;

pub use classify::{RouteClass, RoutePolicy};
pub use client::{ApiClient, ApiResponse};
pub use endpoints::Notification;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use navigate::{Navigator, TrackingNavigator};
pub use request::{PendingRequest, Pipeline, RequestAttempt, VIEW_KEY_HEADER};
