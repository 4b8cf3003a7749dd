//! Construction-time configuration for a [`crate::terminal::Terminal`].

use crate::grid::MAX_SCROLLBACK;

/// Knobs fixed at construction time; everything else is runtime mode state
/// reachable through CSI/ESC sequences (§4.2, §4.3) and is not configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerminalConfig {
    /// Upper bound on scrollback length (§3.3). Defaults to
    /// [`MAX_SCROLLBACK`]; lowering it is supported, raising it is not (the
    /// bound is a protocol invariant, not a policy knob).
    pub max_scrollback: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            max_scrollback: MAX_SCROLLBACK,
        }
    }
}
