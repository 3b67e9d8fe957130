//! Staff authentication endpoints.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, instrument, warn};

use crate::Result;
use crate::auth::{CredentialKey, Credentials};
use crate::client::endpoints::{self, RefreshTokenBody, SigninBody};
use crate::client::{ApiClient, ApiRequest};
use crate::error::{AuthError, InvalidInputError};
use crate::notify::SessionEvent;
use crate::types::require;

/// A staff user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl User {
    /// First and last name when known, else the username.
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() => format!("{first} {last}"),
            (Some(first), _) if !first.is_empty() => first.to_string(),
            _ => self.username.clone(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    })
}

/// Account registration form. Creates the first premise along with the user.
#[derive(Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub premise_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premise_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl SignupRequest {
    /// Check required fields and the password confirmation.
    pub fn validate(&self) -> std::result::Result<(), InvalidInputError> {
        require("username", &self.username)?;
        require("email", &self.email)?;
        require("password", &self.password)?;
        require("confirm_password", &self.confirm_password)?;
        require("premise_name", &self.premise_name)?;

        if self.password != self.confirm_password {
            return Err(InvalidInputError::PasswordMismatch);
        }
        Ok(())
    }
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("premise_name", &self.premise_name)
            .finish_non_exhaustive()
    }
}

/// Response from sign-up and sign-in.
#[derive(Deserialize)]
struct AuthResponse {
    access: String,
    refresh: String,
    user: User,
}

/// Authentication endpoints.
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Register a new account. Does not sign in.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<User> {
        request.validate()?;
        info!("Creating account");

        let response: AuthResponse = self
            .client
            .request(ApiRequest::post(endpoints::SIGNUP).json(request)?)
            .await?;

        Ok(response.user)
    }

    /// Sign in and store the issued tokens.
    ///
    /// Any previous session is discarded first so a stale token is never sent
    /// along with the new credentials.
    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    pub async fn signin(&self, credentials: Credentials) -> Result<User> {
        if credentials.username().trim().is_empty() || credentials.password().is_empty() {
            return Err(AuthError::InvalidCredentials(
                "username and password are required".to_string(),
            )
            .into());
        }
        info!("Signing in");

        let store = self.client.store();
        store.clear_all()?;

        let body = SigninBody {
            username: credentials.username(),
            password: credentials.password(),
        };
        let response: AuthResponse = self
            .client
            .request(ApiRequest::post(endpoints::SIGNIN).json(&body)?)
            .await?;

        store.set(CredentialKey::AccessToken, &response.access)?;
        store.set(CredentialKey::RefreshToken, &response.refresh)?;
        self.client.emit(SessionEvent::SignedIn);

        Ok(response.user)
    }

    /// Revoke the refresh token server-side and clear the local session.
    ///
    /// The local session is cleared even when the server call fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let store = self.client.store();

        if let Some(refresh_token) = store.get(CredentialKey::RefreshToken)? {
            let request = ApiRequest::post(endpoints::LOGOUT).json(&RefreshTokenBody {
                refresh_token: &refresh_token,
            })?;
            if let Err(e) = self.client.send_unreported(request).await {
                warn!(error = %e, "Logout request failed");
            }
        }

        store.clear_all()?;
        self.client.emit(SessionEvent::SignedOut);
        info!("Signed out");
        Ok(())
    }

    /// Whether an access token is stored.
    pub fn is_authenticated(&self) -> Result<bool> {
        self.client.is_authenticated()
    }
}
