//! Cursor/attribute state and per-row tab stops.

use crate::cell::{CellAttributes, DEFAULT_BG, DEFAULT_FG};

/// Current cursor position plus the SGR and mode state that new
/// characters, and `ESC 7`/`ESC 8`/CSI `s`/`u`, capture and restore
/// (§3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribs {
    /// 1-based `(x, y)`. `x` may reach `cols + 1` (pending wrap, §3.6).
    pub cursor: (u16, u16),
    pub wrap_around: bool,
    pub origin_mode: bool,
    pub fg: u16,
    pub bg: u16,
    pub attrib: CellAttributes,
}

impl Default for Attribs {
    fn default() -> Self {
        Self {
            cursor: (1, 1),
            wrap_around: true,
            origin_mode: false,
            fg: DEFAULT_FG,
            bg: DEFAULT_BG,
            attrib: CellAttributes::empty(),
        }
    }
}

/// Per-row tab stop columns (§3.5).
///
/// The original keeps one `QList<int>` of marked columns per row rather
/// than a single row-independent set; `HTS` (`ESC H`) only ever marks the
/// row the cursor is currently on, so two rows can legitimately disagree
/// about where their tab stops are (e.g. after `HTS` at an unusual column,
/// or before a row has been touched by `resetTabs` again).
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TabStops(Vec<Vec<u16>>);

impl TabStops {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild every row's tab stops to the default: every 8th column
    /// starting at 1, up to `cols`.
    pub fn reset(&mut self, cols: u16, rows: u16) {
        self.0.clear();
        let defaults: Vec<u16> = std::iter::successors(Some(1u16), |c| {
            let next = c + 8;
            (next <= cols).then_some(next)
        })
        .collect();
        self.0 = vec![defaults; rows as usize];
    }

    /// Mark column `col` as a tab stop on row `row` (1-based), keeping
    /// the row's stops sorted (`ESC H`).
    pub fn set(&mut self, row: u16, col: u16) {
        let idx = (row - 1) as usize;
        while self.0.len() <= idx {
            self.0.push(Vec::new());
        }
        self.0[idx].push(col);
        self.0[idx].sort_unstable();
    }

    /// Remove `col` from row `row`'s tab stops, if present (CSI `0 g`).
    pub fn clear_at(&mut self, row: u16, col: u16) {
        if let Some(idx) = row.checked_sub(1).map(|i| i as usize) {
            if let Some(stops) = self.0.get_mut(idx) {
                stops.retain(|&c| c != col);
            }
        }
    }

    /// Clear every tab stop on every row (CSI `3 g`).
    pub fn clear_all(&mut self) {
        self.0.clear();
    }

    /// The next tab stop strictly after `col` on `row`, if any.
    #[must_use]
    pub fn next_after(&self, row: u16, col: u16) -> Option<u16> {
        let idx = (row.checked_sub(1)?) as usize;
        self.0.get(idx)?.iter().copied().find(|&c| c > col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_attribs_match_reset_terminal() {
        let attribs = Attribs::default();
        assert_eq!(attribs.cursor, (1, 1));
        assert!(attribs.wrap_around);
        assert!(!attribs.origin_mode);
        assert_eq!(attribs.fg, DEFAULT_FG);
        assert_eq!(attribs.bg, DEFAULT_BG);
    }

    #[test]
    fn tab_stops_default_every_eighth_column() {
        let mut tabs = TabStops::new();
        tabs.reset(20, 3);
        assert_eq!(tabs.next_after(1, 1), Some(9));
        assert_eq!(tabs.next_after(1, 9), Some(17));
        assert_eq!(tabs.next_after(1, 17), None);
    }

    #[test]
    fn tab_stops_are_per_row() {
        let mut tabs = TabStops::new();
        tabs.reset(20, 2);
        tabs.set(1, 5);
        assert_eq!(tabs.next_after(1, 1), Some(5));
        // row 2 is untouched by the row-1-only HTS.
        assert_eq!(tabs.next_after(2, 1), Some(9));
    }

    #[test]
    fn clear_at_and_clear_all() {
        let mut tabs = TabStops::new();
        tabs.reset(20, 1);
        tabs.clear_at(1, 9);
        assert_eq!(tabs.next_after(1, 1), Some(17));
        tabs.clear_all();
        assert_eq!(tabs.next_after(1, 1), None);
    }
}
