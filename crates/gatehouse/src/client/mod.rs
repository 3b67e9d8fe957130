//! HTTP client for the Gatehouse API.
//!
//! This module provides the authenticated client, the request descriptor it
//! dispatches, and the endpoint paths the services use.

pub mod endpoints;
mod http;
mod request;

pub use http::{ApiClient, ApiClientBuilder, ClientConfig, DEFAULT_TIMEOUT};
pub use request::{ApiRequest, ApiResponse, FormField, RequestBody};
