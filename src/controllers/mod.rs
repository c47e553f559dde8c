//! Per-tab view-state controllers.
//!
//! Controllers never perform I/O. They queue [`Request`]s on an [`Outbox`],
//! remember the sequence number of the fetch they are waiting on, and apply
//! responses through [`LoadState`], which drops anything that is not the
//! latest request it issued.

pub mod auth;
pub mod home;
pub mod messages;
pub mod referrals;
pub mod users;
pub mod withdrawals;

use crate::error::ApiError;
use crate::types::Request;

pub use auth::{AuthController, LoginForm, SignupForm};
pub use home::HomeController;
pub use messages::{MessageCategory, MessageType, MessagesController};
pub use referrals::ReferralsController;
pub use users::UsersController;
pub use withdrawals::WithdrawalsController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Fetch lifecycle for one panel: `idle -> loading -> ready | error`.
///
/// A failure keeps the last good data on screen next to the error.
#[derive(Debug, Clone)]
pub struct LoadState<T> {
    phase: Phase,
    data: Option<T>,
    error: Option<String>,
    pending: Option<u64>,
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self { phase: Phase::Idle, data: None, error: None, pending: None }
    }
}

impl<T> LoadState<T> {
    pub fn begin(&mut self, seq: u64) {
        self.phase = Phase::Loading;
        self.error = None;
        self.pending = Some(seq);
    }

    pub fn is_current(&self, seq: u64) -> bool {
        self.pending == Some(seq)
    }

    /// Apply a successful response. Returns `false` for a stale one.
    pub fn succeed(&mut self, seq: u64, data: T) -> bool {
        if !self.is_current(seq) {
            log::debug!("[state] dropping stale response #{seq}");
            return false;
        }
        self.pending = None;
        self.phase = Phase::Ready;
        self.data = Some(data);
        true
    }

    pub fn fail(&mut self, seq: u64, message: String) -> bool {
        if !self.is_current(seq) {
            log::debug!("[state] dropping stale failure #{seq}");
            return false;
        }
        self.pending = None;
        self.phase = Phase::Error;
        self.error = Some(message);
        true
    }

    /// Forget everything, including any in-flight request.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Issues sequence numbers and collects requests until the app drains them.
#[derive(Debug, Default)]
pub struct Outbox {
    next_seq: u64,
    queued: Vec<(u64, Request)>,
}

impl Outbox {
    pub fn send(&mut self, request: Request) -> u64 {
        self.next_seq += 1;
        log::debug!("[outbox] #{} {:?}", self.next_seq, request.kind());
        self.queued.push((self.next_seq, request));
        self.next_seq
    }

    pub fn drain(&mut self) -> Vec<(u64, Request)> {
        std::mem::take(&mut self.queued)
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }
}

/// User-visible text for a failed call, with a per-panel fallback.
pub fn error_text(err: &ApiError, fallback: &str) -> String {
    let text = err.to_string();
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}
