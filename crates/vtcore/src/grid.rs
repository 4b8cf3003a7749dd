//! The sparse screen buffer, scrollback FIFO, and the primitives that move
//! rows between them.
//!
//! Rows and row lengths are sparse (§3.2): a [`Buffer`] may hold fewer rows
//! than the screen height, and any row may be shorter than the screen
//! width. Reads past the end of a row or buffer see absent cells; writes
//! extend storage lazily. This is a memory optimization inherited from the
//! original implementation and is preserved exactly, not merely emulated.

use std::collections::VecDeque;

use crate::cell::Cell;

/// Bound on scrollback length (§3.3, §3.6).
pub const MAX_SCROLLBACK: usize = 300;

/// A single row of cells, stored only as long as it has been written to.
pub type Row = Vec<Cell>;

/// One logical screen buffer: primary or alternate.
///
/// Backed by a plain `Vec<Row>` rather than a fixed `cols x rows`
/// rectangle, so that an unwritten row (or the tail of a short row) simply
/// doesn't exist in storage.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Buffer(Vec<Row>);

impl Buffer {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Borrow row `y` (1-based) if it has been written to.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&Row> {
        y.checked_sub(1).and_then(|idx| self.0.get(idx as usize))
    }

    /// Read the cell at `(x, y)` (1-based), or `None` if the row or cell
    /// is absent from sparse storage.
    #[must_use]
    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.row(y)?.get(x.checked_sub(1)? as usize)
    }

    /// Extend storage so row `y` (1-based) exists, then return it
    /// mutably. Newly created rows in between are empty, not
    /// space-filled: they remain absent until written.
    pub fn ensure_row(&mut self, y: u16) -> &mut Row {
        let idx = (y - 1) as usize;
        while self.0.len() <= idx {
            self.0.push(Row::new());
        }
        &mut self.0[idx]
    }

    /// Extend `row` with default cells up to column `x` (1-based,
    /// inclusive) and return the cell index (`x - 1`).
    pub fn ensure_cell(row: &mut Row, x: u16, fill: Cell) -> usize {
        let idx = (x - 1) as usize;
        while row.len() <= idx {
            row.push(fill);
        }
        idx
    }

    /// Ensure row `y` exists and has at least `x` cells, returning a
    /// mutable reference to the cell at `(x, y)`.
    pub fn cell_mut(&mut self, x: u16, y: u16, fill: Cell) -> &mut Cell {
        let row = self.ensure_row(y);
        let idx = Self::ensure_cell(row, x, fill);
        &mut row[idx]
    }

    fn insert_row(&mut self, idx: usize, row: Row) {
        let idx = idx.min(self.0.len());
        self.0.insert(idx, row);
    }

    fn remove_row(&mut self, idx: usize) -> Row {
        let idx = idx.min(self.0.len().saturating_sub(1));
        if self.0.is_empty() {
            Row::new()
        } else {
            self.0.remove(idx)
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.0
    }
}

/// The bounded FIFO of rows that have scrolled off the top of the primary
/// screen (§3.3).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scrollback {
    rows: VecDeque<Row>,
    limit: usize,
}

impl Default for Scrollback {
    fn default() -> Self {
        Self::with_limit(MAX_SCROLLBACK)
    }
}

impl Scrollback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scrollback bounded to `limit` rows rather than
    /// [`MAX_SCROLLBACK`] (`TerminalConfig::max_scrollback`).
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            rows: VecDeque::new(),
            limit,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    #[must_use]
    pub fn rows(&self) -> &VecDeque<Row> {
        &self.rows
    }

    fn push_back(&mut self, row: Row) {
        self.rows.push_back(row);
        while self.rows.len() > self.limit {
            self.rows.pop_front();
        }
    }

    fn pop_back(&mut self) -> Option<Row> {
        self.rows.pop_back()
    }
}

/// Whether a call to [`Grid::scroll_back`] may draw its inserted row from
/// the scrollback tail.
///
/// This models an asymmetry in the original implementation's
/// `scrollBack(lines, insertAt = -1)`: the SENTINEL default (used by CSI
/// `T`) never consumes scrollback, while any EXPLICIT insertion row (used
/// by `IL`/CSI `L` and reverse-index/`ESC M`, which both pass the current
/// cursor row) does, when the primary buffer has scrollback to draw from.
/// See SPEC_FULL.md §11.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollSource {
    /// No explicit row given: insert at `margin_top`, always blank.
    Default,
    /// Explicit row (1-based): insert there, drawing from scrollback when
    /// available on the primary buffer.
    Explicit(u16),
}

/// Primary/alternate screen pair plus the scrollback FIFO, with the
/// primitives that move rows between the active buffer and scrollback.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    primary: Buffer,
    alternate: Buffer,
    scrollback: Scrollback,
    use_alternate: bool,
}

impl Grid {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid whose scrollback is bounded to `limit` rows rather
    /// than [`MAX_SCROLLBACK`].
    #[must_use]
    pub fn with_scrollback_limit(limit: usize) -> Self {
        Self {
            scrollback: Scrollback::with_limit(limit),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_alternate(&self) -> bool {
        self.use_alternate
    }

    pub fn set_alternate(&mut self, alt: bool) {
        self.use_alternate = alt;
    }

    #[must_use]
    pub fn buffer(&self) -> &Buffer {
        if self.use_alternate {
            &self.alternate
        } else {
            &self.primary
        }
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        if self.use_alternate {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    #[must_use]
    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    pub fn clear_scrollback(&mut self) {
        self.scrollback.clear();
    }

    /// Drop `lines` rows off the top of the scroll region, appending each
    /// to scrollback when the primary buffer is active (§4.7,
    /// `scroll_forward`).
    ///
    /// `remove_at` defaults to `margin_top` when `None`; callers that pass
    /// an explicit row (index/`ESC D`) still always push to scrollback —
    /// unlike [`Grid::scroll_back`], there is no asymmetry here.
    pub fn scroll_forward(
        &mut self,
        lines: u16,
        margin_top: u16,
        margin_bottom: u16,
        remove_at: Option<u16>,
    ) {
        if lines == 0 {
            return;
        }
        let remove_at_1based = remove_at.unwrap_or(margin_top);
        let use_alternate = self.use_alternate;
        let buf = self.buffer_mut();
        while buf.len() < margin_bottom as usize {
            buf.0.push(Row::new());
        }
        for _ in 0..lines {
            buf.insert_row(margin_bottom as usize, Row::new());
            let remove_idx = (remove_at_1based - 1) as usize;
            let removed = buf.remove_row(remove_idx);
            if !use_alternate {
                self.scrollback.push_back(removed);
            }
        }
    }

    /// Insert `lines` blank (or scrollback-restored) rows into the scroll
    /// region, dropping the row pushed past `margin_bottom` (§4.7,
    /// `scroll_back`). See [`ScrollSource`] for the scrollback-consumption
    /// rule.
    pub fn scroll_back(
        &mut self,
        lines: u16,
        margin_top: u16,
        margin_bottom: u16,
        source: ScrollSource,
    ) {
        if lines == 0 {
            return;
        }
        let (insert_at_1based, use_backbuffer) = match source {
            ScrollSource::Default => (margin_top, false),
            ScrollSource::Explicit(row) => (row, true),
        };
        let insert_idx = (insert_at_1based - 1) as usize;
        let use_alternate = self.use_alternate;
        for _ in 0..lines {
            let new_row = if !use_alternate && use_backbuffer {
                self.scrollback.pop_back().unwrap_or_default()
            } else {
                Row::new()
            };
            let buf = self.buffer_mut();
            buf.insert_row(insert_idx, new_row);
            let remove_idx = (margin_bottom as usize).min(buf.len().saturating_sub(1));
            buf.remove_row(remove_idx);
        }
    }
}
