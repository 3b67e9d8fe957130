//! API endpoint paths and wire types shared by the client and services.

use serde::{Deserialize, Serialize};

use crate::types::{PremiseId, VisitorId};

// ============================================================================
// Endpoint Paths
// ============================================================================

pub const SIGNUP: &str = "/auth/signup/";

pub const SIGNIN: &str = "/auth/signin/";

/// Token refresh; the only call the client makes on its own behalf.
pub const REFRESH: &str = "/auth/refresh/";

pub const LOGOUT: &str = "/auth/logout/";

pub const PREMISES: &str = "/auth/premises/";

pub const VISITORS: &str = "/visitors/";

pub const VISITOR_SIGNIN: &str = "/visitors/signin/";

pub const VISITOR_SIGNOUT: &str = "/visitors/signout/";

pub const DASHBOARD_STATS: &str = "/stats/dashboard/";

pub const RECENT_ACTIVITY: &str = "/stats/recent-activity/";

// `PremiseId` only admits unreserved characters, so ids need no escaping.
pub fn premise(id: &PremiseId) -> String {
    format!("{PREMISES}{id}/")
}

pub fn premise_qr_code(id: &PremiseId) -> String {
    format!("{PREMISES}{id}/qr_code/")
}

pub fn premise_qr_download(id: &PremiseId) -> String {
    format!("{PREMISES}{id}/download_qr_code/")
}

pub fn visitor(id: VisitorId) -> String {
    format!("{VISITORS}{id}/")
}

pub fn visitor_approve(id: VisitorId) -> String {
    format!("{VISITORS}{id}/approve/")
}

pub fn visitor_reject(id: VisitorId) -> String {
    format!("{VISITORS}{id}/reject/")
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for the token refresh and logout endpoints.
#[derive(Debug, Serialize)]
pub struct RefreshTokenBody<'a> {
    pub refresh_token: &'a str,
}

/// Response from the refresh endpoint.
///
/// Servers that rotate refresh tokens also return the new one.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Request body for sign-in.
#[derive(Debug, Serialize)]
pub struct SigninBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Error body format. Both fields are optional and either may carry the
/// human-readable text.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
