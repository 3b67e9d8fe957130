//! Dashboard statistics endpoints.

use tracing::{instrument, warn};

use crate::Result;
use crate::client::endpoints;
use crate::client::{ApiClient, ApiRequest};
use crate::types::{DashboardStats, ListEnvelope, RecentActivity};

#[derive(Debug, Clone, Copy)]
pub struct StatsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> StatsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Dashboard aggregates.
    ///
    /// Servers that leave the activity feed out of the dashboard payload get
    /// a second call to the feed endpoint. A failure there leaves the feed
    /// empty rather than failing the dashboard.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardStats> {
        let mut stats: DashboardStats = self
            .client
            .request(ApiRequest::get(endpoints::DASHBOARD_STATS))
            .await?;

        if stats.recent_activity.is_empty() {
            match self.recent_activity().await {
                Ok(activity) => stats.recent_activity = activity,
                Err(e) => warn!(error = %e, "Failed to fetch recent activity"),
            }
        }

        Ok(stats)
    }

    #[instrument(skip(self))]
    pub async fn recent_activity(&self) -> Result<Vec<RecentActivity>> {
        let list: ListEnvelope<RecentActivity> = self
            .client
            .request(ApiRequest::get(endpoints::RECENT_ACTIVITY))
            .await?;
        Ok(list.into_vec())
    }
}
