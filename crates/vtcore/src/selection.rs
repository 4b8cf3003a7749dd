//! Rectangular(-line) selection over backscroll+screen coordinates (§4.9).

use crate::grid::{Buffer, Scrollback};

/// A normalized selection rectangle in screen coordinates (§3.6): `top <=
/// bottom`, and if `top == bottom`, `left <= right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    pub top: u16,
    pub left: u16,
    pub bottom: u16,
    pub right: u16,
}

impl Selection {
    /// Build a selection from two screen-coordinate endpoints, swapping and
    /// clamping as `setSelection` does.
    #[must_use]
    pub fn new(start: (u16, u16), end: (u16, u16), cols: u16, rows: u16) -> Self {
        let (mut start, mut end) = (start, end);
        if start.1 > end.1 || (start.1 == end.1 && start.0 > end.0) {
            std::mem::swap(&mut start, &mut end);
        }
        let left = start.0.max(1);
        let top = start.1.max(1);
        let right = end.0.min(cols);
        let bottom = end.1.min(rows);
        Self { top, left, bottom, right }
    }

    /// Shift this selection by `lines` (positive = down) as the buffer
    /// scrolls, clamping to `[1, rows] x [1, cols]` and returning `None` if
    /// it falls entirely off-screen (§4.7, §4.9).
    #[must_use]
    pub fn adjusted(&self, lines: i32, cols: u16, rows: u16) -> Option<Self> {
        if lines == 0 {
            return Some(*self);
        }
        let mut tx = self.left;
        let mut ty = shift(self.top, lines);
        let mut bx = self.right;
        let mut by = shift(self.bottom, lines);

        if ty < 1 {
            ty = 1;
            tx = 1;
        }
        if by > rows {
            by = rows;
            bx = cols;
        }
        if by < 1 || ty > rows {
            return None;
        }
        Some(Self {
            top: ty,
            left: tx,
            bottom: by,
            right: bx,
        })
    }
}

fn shift(v: u16, lines: i32) -> u16 {
    (i32::from(v) + lines).max(0) as u16
}

/// Extract the selected text, trimming trailing spaces per line and joining
/// with `\n`. Non-printable cells are omitted (§4.9).
///
/// `backscroll_pos` is the number of scrollback lines the view is currently
/// scrolled back by (0 when not scrolled); when non-zero, rows are read
/// from `scrollback` as well as `buffer`, exactly as `copySelectionToClipboard`
/// does.
#[must_use]
pub fn copy_text(sel: &Selection, buffer: &Buffer, scrollback: &Scrollback, backscroll_pos: usize) -> String {
    let mut out = String::new();

    if backscroll_pos > 0 {
        let sb_len = scrollback.len() as i64;
        let line_from = sb_len - backscroll_pos as i64 + i64::from(sel.top) - 1;
        let line_to = sb_len - backscroll_pos as i64 + i64::from(sel.bottom) - 1;
        let rows: Vec<_> = scrollback.rows().iter().collect();
        for i in line_from..=line_to {
            if i < 0 || i >= sb_len {
                continue;
            }
            let row = rows[i as usize];
            let start = if i == line_from { (sel.left - 1) as usize } else { 0 };
            let end = if i == line_to {
                (sel.right - 1) as i64
            } else {
                row.len() as i64 - 1
            };
            out.push_str(line_text(row, start, end).trim_end());
            out.push('\n');
        }
    }

    let line_from = i64::from(sel.top) - 1 - backscroll_pos as i64;
    let line_to = i64::from(sel.bottom) - 1 - backscroll_pos as i64;
    for i in line_from..=line_to {
        if i < 0 {
            continue;
        }
        let Some(row) = buffer.rows().get(i as usize) else {
            continue;
        };
        let start = if i == line_from { (sel.left - 1) as usize } else { 0 };
        let end = if i == line_to { (sel.right - 1) as i64 } else { row.len() as i64 - 1 };
        out.push_str(line_text(row, start, end).trim_end());
        out.push('\n');
    }

    out.trim().to_string()
}

fn line_text(row: &[crate::cell::Cell], start: usize, end: i64) -> String {
    let mut s = String::new();
    let mut j = start as i64;
    while j <= end {
        if j >= 0 {
            if let Some(cell) = row.get(j as usize) {
                if !cell.c.is_control() {
                    s.push(cell.c);
                }
            }
        }
        j += 1;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::grid::Grid;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalizes_reversed_endpoints() {
        let sel = Selection::new((5, 3), (2, 1), 10, 4);
        assert_eq!(sel, Selection { top: 1, left: 2, bottom: 3, right: 5 });
    }

    #[test]
    fn clamps_to_screen() {
        let sel = Selection::new((1, 1), (50, 50), 10, 4);
        assert_eq!(sel.right, 10);
        assert_eq!(sel.bottom, 4);
    }

    #[test]
    fn adjust_clears_when_off_screen() {
        let sel = Selection { top: 1, left: 1, bottom: 2, right: 3 };
        assert!(sel.adjusted(-5, 10, 4).is_none());
    }

    #[test]
    fn copy_text_trims_trailing_spaces_and_joins() {
        let mut grid = Grid::new();
        for (i, c) in "hi  ".chars().enumerate() {
            grid.buffer_mut().cell_mut(i as u16 + 1, 1, Cell::default()).c = c;
        }
        let sel = Selection { top: 1, left: 1, bottom: 1, right: 4 };
        let text = copy_text(&sel, grid.buffer(), grid.scrollback(), 0);
        assert_eq!(text, "hi");
    }
}
