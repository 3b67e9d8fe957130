//! Typed handles for the API's feature areas.
//!
//! Each handle borrows the [`ApiClient`] so every call shares its credential
//! store, refresh state and error reporter.

mod auth;
mod premises;
mod stats;
mod visitors;

pub use auth::{AuthApi, SignupRequest, User};
pub use premises::PremisesApi;
pub use stats::StatsApi;
pub use visitors::VisitorsApi;

use crate::client::ApiClient;

impl ApiClient {
    /// Sign-up, sign-in and sign-out.
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Premises management and QR codes.
    pub fn premises(&self) -> PremisesApi<'_> {
        PremisesApi::new(self)
    }

    /// Visitor records and the public kiosk flow.
    pub fn visitors(&self) -> VisitorsApi<'_> {
        VisitorsApi::new(self)
    }

    /// Dashboard statistics.
    pub fn stats(&self) -> StatsApi<'_> {
        StatsApi::new(self)
    }
}
