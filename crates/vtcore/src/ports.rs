//! The three narrow ports the core consumes from its host (§6.1): a byte
//! sink for outbound pty writes, a renderer signal port, and host services
//! (bell, title, clipboard, settings).
//!
//! None of these traits are implemented in this crate. The pty transport,
//! the glyph renderer, and the window integration are out of scope (§1) and
//! provide their own implementations.

use crate::error::HostServiceError;

/// Where outbound bytes (key translation, DA/DSR replies) are written.
///
/// Implementations must not call back into the terminal from within
/// `write_to_pty` (§5): the core is single-threaded and non-reentrant.
pub trait ByteSink {
    fn write_to_pty(&mut self, bytes: &[u8]);
}

/// Redraw/resize signals (§6.1). The renderer reads grid state back out
/// through [`crate::terminal::Terminal`]'s query operations; it never pushes
/// state into the core.
pub trait RendererPort {
    fn redraw(&mut self);
    fn set_show_scroll_indicator(&mut self, show: bool);
    fn update_term_size(&mut self);
}

/// Bell, title, clipboard, and settings, plus the one notification the host
/// needs to know about (§6.1).
pub trait HostServices {
    fn bell_alert(&mut self);
    fn set_window_title(&mut self, title: &str);
    fn config_path(&self) -> Result<String, HostServiceError>;
    fn settings_value(&self, key: &str) -> Result<Option<String>, HostServiceError>;
    fn selection_finished(&mut self);
    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), HostServiceError>;
    fn paste_from_clipboard(&self) -> Result<String, HostServiceError>;
}
