//! Error reporter that prints to the terminal.

use std::sync::Mutex;

use gatehouse::notify::Severity;
use gatehouse::{ErrorReporter, Notification};

use crate::output;

/// Descriptions already printed during this run.
static REPORTED: Mutex<Vec<String>> = Mutex::new(Vec::new());

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl ErrorReporter for ConsoleReporter {
    fn report(&self, notification: Notification) {
        let line = format!("{}: {}", notification.title, notification.description);
        match notification.severity {
            Severity::Error | Severity::Warning => output::error(&line),
            Severity::Info | Severity::Success => output::note(&line),
        }
        if let Ok(mut reported) = REPORTED.lock() {
            reported.push(notification.description);
        }
    }
}

/// Whether a failure with this description has been printed.
pub fn was_reported(description: &str) -> bool {
    REPORTED
        .lock()
        .is_ok_and(|reported| reported.iter().any(|d| d == description))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_reported_descriptions() {
        assert!(!was_reported("Gateway unavailable"));
        ConsoleReporter.report(Notification::error("Gateway unavailable"));
        assert!(was_reported("Gateway unavailable"));
        assert!(!was_reported("Premise not found"));
    }
}
