//! Short-lived "Copied" markers for copy actions, keyed by field.

use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const COPY_FEEDBACK: Duration = Duration::from_millis(1600);

#[derive(Debug, Clone, Default)]
pub struct CopyFeedback {
    until: HashMap<String, Instant>,
}

impl CopyFeedback {
    /// Mark `key` as copied; a repeat copy replaces the earlier revert.
    pub fn mark(&mut self, key: impl Into<String>, now: Instant) {
        self.until.insert(key.into(), now + COPY_FEEDBACK);
    }

    pub fn is_copied(&self, key: &str, now: Instant) -> bool {
        self.until.get(key).is_some_and(|until| now < *until)
    }

    /// Drop expired markers.
    pub fn tick(&mut self, now: Instant) {
        self.until.retain(|_, until| now < *until);
    }
}

/// Key for a copy target on one withdrawal row (`w1:ifsc`).
pub fn copy_key(request_id: &str, field: &str) -> String {
    format!("{request_id}:{field}")
}
