//! gatehouse - Visitor-management API client
//!
//! This library talks to the Gatehouse dashboard API. All requests flow through
//! an [`ApiClient`], which attaches the stored access token, refreshes it once
//! when the server rejects it, and reports failures to a pluggable
//! [`ErrorReporter`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gatehouse::{ApiClient, ApiUrl, Credentials, MemoryStore};
//!
//! # async fn example() -> Result<(), gatehouse::Error> {
//! let base = ApiUrl::new("http://localhost:8000/api/v1")?;
//! let client = ApiClient::builder(base)
//!     .store(Arc::new(MemoryStore::new()))
//!     .build()?;
//!
//! client.auth().signin(Credentials::new("frontdesk", "hunter2")).await?;
//!
//! for premise in client.premises().list().await? {
//!     println!("{}: {}", premise.id, premise.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod notify;
pub mod qr;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{
    AccessToken, CredentialKey, CredentialStore, Credentials, MemoryStore, RefreshToken,
};
pub use client::{ApiClient, ApiClientBuilder, ApiRequest, ApiResponse, ClientConfig};
pub use error::Error;
pub use notify::{ErrorReporter, Notification, SessionEvent, Severity};
pub use types::{ApiUrl, PremiseId, VisitorId};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
