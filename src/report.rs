//! Error reporting collaborator.
//!
//! Recoverable problems (a bad `likes` cell, an unknown post id) are not
//! failures of the surrounding operation, but they still need to reach
//! whoever watches production. Components take an [`ErrorReporter`] and
//! hand it the event; what happens next is the reporter's business.

use std::sync::Mutex;

/// How serious a reported event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

pub trait ErrorReporter: Send + Sync {
    /// Report an event with `(key, value)` context pairs.
    fn report(&self, severity: Severity, message: &str, context: &[(&str, &str)]);
}

/// Forwards reports to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, severity: Severity, message: &str, context: &[(&str, &str)]) {
        let context = format_context(context);
        match severity {
            Severity::Warning => tracing::warn!(context = %context, "{}", message),
            Severity::Error => tracing::error!(context = %context, "{}", message),
        }
    }
}

/// A reported event, as captured by [`MemoryReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedEvent {
    pub severity: Severity,
    pub message: String,
    pub context: Vec<(String, String)>,
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<ReportedEvent>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn events(&self) -> Vec<ReportedEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorReporter for MemoryReporter {
    fn report(&self, severity: Severity, message: &str, context: &[(&str, &str)]) {
        if let Ok(mut events) = self.events.lock() {
            events.push(ReportedEvent {
                severity,
                message: message.to_string(),
                context: context
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            });
        }
    }
}

fn format_context(context: &[(&str, &str)]) -> String {
    context
        .iter()
        .map(|(k, v)| format!("{}={:?}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}
