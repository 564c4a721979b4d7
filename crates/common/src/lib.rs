//! Common types for the Agora workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
