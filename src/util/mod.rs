//! Small timing helpers for the terminal UI.

pub mod copy_feedback;
pub mod debounce;
