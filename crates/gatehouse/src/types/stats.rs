//! Dashboard statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Aggregates shown on the dashboard.
///
/// Every field defaults when absent so a partially populated response still
/// renders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_visitors: u64,
    pub active_visitors: u64,
    pub average_duration: String,
    pub recent_sign_ins: u64,
    pub recent_sign_outs: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub sign_ins_by_premise: Vec<NamedCount>,
    #[serde(deserialize_with = "null_as_default")]
    pub visitor_history: Vec<HistoryPoint>,
    #[serde(deserialize_with = "null_as_default")]
    pub visitor_statuses: Vec<NamedCount>,
    #[serde(deserialize_with = "null_as_default")]
    pub recent_activity: Vec<RecentActivity>,
}

/// A labelled count for pie and bar charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub value: u64,
}

/// Visitors per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: String,
    pub visitors: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    SignIn,
    SignOut,
}

/// One entry of the recent activity feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub id: u64,
    pub visitor_name: String,
    pub activity_type: ActivityType,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premise: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn null_activity_becomes_empty() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "totalVisitors": 10,
            "activeVisitors": 2,
            "recentActivity": null
        }))
        .unwrap();
        assert_eq!(stats.total_visitors, 10);
        assert!(stats.recent_activity.is_empty());
        assert!(stats.visitor_history.is_empty());
    }

    #[test]
    fn activity_entry_parses() {
        let entry: RecentActivity = serde_json::from_value(json!({
            "id": 1,
            "visitorName": "Ada Lovelace",
            "activityType": "sign_out",
            "timestamp": "2024-05-01T17:02:00Z",
            "duration": "7h 32m"
        }))
        .unwrap();
        assert_eq!(entry.activity_type, ActivityType::SignOut);
        assert_eq!(entry.duration.as_deref(), Some("7h 32m"));
    }
}
