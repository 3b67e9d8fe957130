//! Side channels exposed to the hosting application.
//!
//! Two channels leave the client besides normal results: an
//! [`ErrorReporter`] that receives a [`Notification`] for every API failure
//! worth showing to the user, and a broadcast of [`SessionEvent`]s so the host
//! can react to sign-in, sign-out and session expiry.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

/// A transient message for the user (toast, banner, console line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    /// An error notification with the standard title.
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.into(),
            severity: Severity::Error,
        }
    }
}

/// Receives failures the user should see.
///
/// Reporting is fire-and-forget: implementations must not block and cannot
/// influence the request outcome.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, notification: Notification);
}

/// Reporter that writes notifications to the tracing pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, notification: Notification) {
        match notification.severity {
            Severity::Error => error!(
                title = %notification.title,
                description = %notification.description,
                "API failure"
            ),
            Severity::Warning => warn!(
                title = %notification.title,
                description = %notification.description,
                "API warning"
            ),
            Severity::Info | Severity::Success => info!(
                title = %notification.title,
                description = %notification.description,
                "API notice"
            ),
        }
    }
}

/// Reporter that forwards notifications over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelReporter {
    /// Create a reporter and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ErrorReporter for ChannelReporter {
    fn report(&self, notification: Notification) {
        // A closed receiver means nobody is listening any more.
        let _ = self.tx.send(notification);
    }
}

/// Session lifecycle changes broadcast by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Tokens were stored after a successful sign-in.
    SignedIn,
    /// The user signed out and tokens were cleared.
    SignedOut,
    /// Refresh failed; tokens were cleared and the user must sign in again.
    Expired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_serializes_lowercase() {
        let n = Notification::error("boom");
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["title"], "Error");
        assert_eq!(json["description"], "boom");
    }

    #[tokio::test]
    async fn channel_reporter_forwards() {
        let (reporter, mut rx) = ChannelReporter::new();
        reporter.report(Notification::error("first"));
        assert_eq!(rx.recv().await.unwrap().description, "first");
    }

    #[test]
    fn channel_reporter_ignores_closed_receiver() {
        let (reporter, rx) = ChannelReporter::new();
        drop(rx);
        reporter.report(Notification::error("nobody listening"));
    }
}
