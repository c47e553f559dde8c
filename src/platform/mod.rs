//! Platform glue: the system clipboard.

#[cfg(feature = "native")]
mod native;
#[cfg(feature = "native")]
pub use native::copy_to_clipboard;

/// Without a native clipboard every copy reports failure.
#[cfg(not(feature = "native"))]
pub fn copy_to_clipboard(_content: &str) -> bool {
    false
}
