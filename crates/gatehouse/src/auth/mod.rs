//! Authentication primitives.
//!
//! Tokens live in a [`CredentialStore`]; the client reads them on every
//! request and coordinates refreshes through a single shared refresh state.

mod credentials;
pub(crate) mod refresh;
mod store;
mod tokens;

pub use credentials::Credentials;
pub use store::{CredentialKey, CredentialStore, MemoryStore};
pub use tokens::{AccessToken, RefreshToken};
