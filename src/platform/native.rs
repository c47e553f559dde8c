use copypasta::{ClipboardContext, ClipboardProvider};

/// Copy text to the system clipboard. Returns false when no clipboard is
/// reachable (headless sessions, SSH without forwarding).
pub fn copy_to_clipboard(content: &str) -> bool {
    match ClipboardContext::new() {
        Ok(mut ctx) => match ctx.set_contents(content.to_string()) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("[clipboard] write failed: {e}");
                false
            }
        },
        Err(e) => {
            log::warn!("[clipboard] unavailable: {e}");
            false
        }
    }
}
