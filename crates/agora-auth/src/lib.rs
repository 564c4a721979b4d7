//! Agora session authentication library
//!
//! Provides the persisted token slot, the anonymous view-key, and the session
//! endpoint calls (login, refresh, logout, profile) for the Agora API client.
//! This crate is a standalone library with no dependency on the client crate —
//! it can be tested and used independently.
//!
//! Session flow:
//! 1. `session::login()` exchanges credentials for an access token; the
//!    server also sets the HttpOnly refresh cookie on the shared cookie jar
//! 2. Token stored via `credentials::CredentialStore::set()`
//! 3. The client reads the slot before each authenticated request
//! 4. On a 401, `session::refresh_session()` mints a new access token using
//!    the refresh cookie only
//! 5. `credentials::CredentialStore::clear()` on logout or refresh failure
//!
//! The view-key (`viewkey::ViewKeyStore`) is independent of all of the above:
//! generated once per installation and never cleared.

pub mod constants;
pub mod credentials;
pub mod error;
pub mod session;
pub mod viewkey;

pub use constants::*;
pub use credentials::{Credential, CredentialStore};
pub use error::{Error, Result};
pub use session::{SessionResponse, UserProfile, current_user, login, logout, refresh_session};
pub use viewkey::ViewKeyStore;
