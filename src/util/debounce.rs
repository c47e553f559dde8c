//! Per-input debouncer for search boxes.
//!
//! Each edit reschedules the deadline; [`Debouncer::poll`] is called from the
//! loop tick and yields the trimmed value once, when the input has been quiet
//! for the whole window and the trimmed value actually changed.

use std::time::{Duration, Instant};

/// Default quiet period before a search term settles.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(350);

#[derive(Debug, Clone)]
pub struct Debouncer {
    input: String,
    settled: String,
    deadline: Option<Instant>,
    window: Duration,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            input: String::new(),
            settled: String::new(),
            deadline: None,
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Raw, untrimmed text as typed.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The last settled (trimmed) value.
    pub fn settled(&self) -> &str {
        &self.settled
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn push(&mut self, c: char, now: Instant) {
        self.input.push(c);
        self.reschedule(now);
    }

    pub fn backspace(&mut self, now: Instant) {
        if self.input.pop().is_some() {
            self.reschedule(now);
        }
    }

    pub fn set_input(&mut self, text: &str, now: Instant) {
        self.input = text.to_string();
        self.reschedule(now);
    }

    /// Clear both the input and the settled value without emitting.
    pub fn reset(&mut self) {
        self.input.clear();
        self.settled.clear();
        self.deadline = None;
    }

    fn reschedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// `Some(term)` when the window has elapsed and the settled value changed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.settle_now(),
            _ => None,
        }
    }

    /// Settle immediately (Enter key).
    pub fn settle_now(&mut self) -> Option<String> {
        self.deadline = None;
        let trimmed = self.input.trim();
        if trimmed == self.settled {
            return None;
        }
        self.settled = trimmed.to_string();
        Some(self.settled.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rapid_keystrokes_settle_once() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        for (i, c) in "asha".chars().enumerate() {
            d.push(c, t0 + Duration::from_millis(100 * i as u64));
            assert_eq!(d.poll(t0 + Duration::from_millis(100 * i as u64 + 50)), None);
        }
        let last = t0 + Duration::from_millis(300);
        assert_eq!(d.poll(last + Duration::from_millis(349)), None);
        assert_eq!(d.poll(last + Duration::from_millis(350)).as_deref(), Some("asha"));
        assert_eq!(d.poll(last + Duration::from_secs(5)), None);
    }

    #[test]
    fn whitespace_only_changes_do_not_settle() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        d.set_input("ravi", t0);
        assert_eq!(d.settle_now().as_deref(), Some("ravi"));
        d.push(' ', t0);
        assert_eq!(d.poll(t0 + Duration::from_secs(1)), None);
        assert_eq!(d.settled(), "ravi");
        assert_eq!(d.input(), "ravi ");
    }

    #[test]
    fn clearing_settles_to_empty() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(10));
        d.set_input("x", t0);
        d.settle_now();
        d.backspace(t0);
        assert_eq!(d.poll(t0 + Duration::from_millis(10)).as_deref(), Some(""));
    }
}
