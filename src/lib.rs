//! JustStock Admin - terminal console for the JustStock back office
//!
//! Signs an administrator in, then exposes the dashboard overview, the user
//! directory, referral trees, referral withdrawals and broadcast messages.
//!
//! ## Architecture
//!
//! - `controllers` own per-tab state and queue [`types::Request`]s; they never
//!   touch the network.
//! - `runtime` executes queued commands against an [`api::AdminApi`] and feeds
//!   [`types::AppEvent`]s back into [`app::App`].
//! - `normalize` turns loosely shaped backend JSON into view models.
//! - `ui` renders the app with ratatui.
//!
//! The terminal shell lives behind the `native` feature:
//! ```bash
//! cargo build --features native
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod controllers;
pub mod error;
pub mod normalize;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod theme;
pub mod types;
pub mod ui;
pub mod util;

// Platform abstraction layer (clipboard)
pub mod platform;

// Re-export commonly used types
pub use app::{App, Screen, Tab};
pub use config::Config;
pub use types::{AppEvent, Command, Request};
