//! Validated identifiers and API payload types.

mod api_url;
mod premise;
mod stats;
mod visitor;

pub use api_url::{ApiUrl, DEFAULT_API_URL};
pub use premise::{NewPremise, Premise, PremiseId, PremiseUpdate, QrCodeLink};
pub use stats::{ActivityType, DashboardStats, HistoryPoint, NamedCount, RecentActivity};
pub use visitor::{
    IdPhoto, Visitor, VisitorFilter, VisitorId, VisitorSignIn, VisitorSignOut, VisitorStatus,
};

pub(crate) use visitor::require;

use serde::{Deserialize, Deserializer};

/// The one place list responses are normalized.
///
/// List endpoints answer either with a bare JSON array or with an object
/// holding the array under `data`, `premises`, `visitors` or `results`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped(WrappedList<T>),
}

#[derive(Debug, Deserialize)]
pub(crate) struct WrappedList<T> {
    #[serde(alias = "premises", alias = "visitors", alias = "results")]
    data: Vec<T>,
}

impl<T> ListEnvelope<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Wrapped(wrapped) => wrapped.data,
        }
    }
}

/// Deserialize `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
