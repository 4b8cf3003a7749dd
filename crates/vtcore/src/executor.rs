//! CSI/ESC/OSC dispatch (§4.2, §4.3, §4.4, §4.5, §4.6): applies a single
//! parsed [`Command`] to a [`Terminal`]'s state.

use tracing::debug;
use vtenc::{write_csi, EncodeError};

use crate::cell::{Cell, CellAttributes};
use crate::cursor::Attribs;
use crate::grid::ScrollSource;
use crate::parser::Command;
use crate::ports::{ByteSink, HostServices, RendererPort};
use crate::terminal::Terminal;

/// Encode the DA reply (`CSI ? 1 ; 2 c`, §4.4): "VT100 with AVO".
fn encode_da_reply() -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    write_csi!(&mut buf; "?1;2c").map(|_| buf)
}

/// Encode the DSR cursor-position report (`CSI row ; col R`, §4.4).
fn encode_dsr_reply(row: u16, col: u16) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    write_csi!(&mut buf; row, ";", col, "R").map(|_| buf)
}

/// A CSI parameter, defaulted to 1 when absent or `<= 0`. Used both for the
/// usual "repeat count" convention and for `G`/`d`/`H`'s absolute
/// row/column position, which defaults to 1 the same way.
fn count_param(params: &[i64], idx: usize) -> u16 {
    match params.get(idx).copied() {
        Some(v) if v > 0 => v as u16,
        _ => 1,
    }
}

impl Terminal {
    pub(crate) fn apply_command(&mut self, cmd: Command, sink: &mut dyn ByteSink, host: &mut dyn HostServices) {
        match cmd {
            Command::Print(c) => self.insert_at_cursor(c, self.replace_mode, true),
            Command::LineFeed => self.line_feed(),
            Command::CarriageReturn => self.attribs.cursor.0 = 1,
            Command::Backspace => {
                let x = self.attribs.cursor.0;
                self.attribs.cursor.0 = x.saturating_sub(1).max(1);
            }
            Command::Bell => host.bell_alert(),
            Command::Tab => self.handle_tab(),
            Command::Csi { extra, params, final_byte } => self.apply_csi(&extra, &params, final_byte, sink),
            Command::Esc(c) => self.apply_esc(c, sink),
            Command::EscMulti(intro, c) => self.apply_esc_multi(intro, c),
            Command::Osc(body) => self.apply_osc(&body, host),
        }
    }

    // -- Ground-state commands (§4.1) ------------------------------------

    /// Scroll the scroll region forward (rows leave at the top), also
    /// shifting any active selection by `-lines` (§4.7).
    fn scroll_fwd(&mut self, lines: u16, remove_at: Option<u16>) {
        self.grid.scroll_forward(lines, self.margin_top, self.margin_bottom, remove_at);
        self.adjust_selection(-i32::from(lines));
    }

    /// Scroll the scroll region backward (rows enter at the top), also
    /// shifting any active selection by `+lines` (§4.7).
    fn scroll_bwd(&mut self, lines: u16, source: ScrollSource) {
        self.grid.scroll_back(lines, self.margin_top, self.margin_bottom, source);
        self.adjust_selection(i32::from(lines));
    }

    fn adjust_selection(&mut self, lines: i32) {
        if let Some(sel) = self.selection {
            self.selection = sel.adjusted(lines, self.cols, self.rows);
        }
    }

    fn line_feed(&mut self) {
        let (x, y) = self.attribs.cursor;
        if y == self.margin_bottom {
            self.scroll_fwd(1, None);
        } else if x <= self.cols {
            self.attribs.cursor.1 = y + 1;
        }
        // a pending wraparound column at a row other than margin_bottom
        // freezes LF until the next printable character resolves the wrap.
        if self.lnm {
            self.attribs.cursor.0 = 1;
        }
    }

    fn handle_tab(&mut self) {
        let (x, y) = self.attribs.cursor;
        let next = self.tab_stops.next_after(y, x).unwrap_or(self.cols);
        self.attribs.cursor.0 = next.min(self.cols);
    }

    /// Write `c` at the cursor, honoring wraparound and insert/overwrite
    /// mode (§4.5). `advance` controls whether the cursor moves afterward;
    /// `CSI @` (ICH) passes `false` so repeated inserts land at the same
    /// column.
    pub(crate) fn insert_at_cursor(&mut self, c: char, overwrite: bool, advance: bool) {
        let (mut x, mut y) = self.attribs.cursor;
        // The pending-wrap check only fires when the caller also advances
        // the cursor afterward: `CSI @` (ICH) passes `advance = false` and
        // must not resolve a pending wrap merely by inserting a blank.
        if x > self.cols && advance {
            if self.attribs.wrap_around {
                x = 1;
                y += 1;
                if y >= self.margin_bottom {
                    self.scroll_fwd(1, None);
                    y = self.margin_bottom;
                }
            } else {
                x = self.cols;
            }
            self.attribs.cursor = (x, y);
        }

        // Row-extension padding is always a DEFAULT cell (§4.5 step 2): only
        // the cell actually written gets the CURRENT fg/bg/attrib stamped on
        // it below.
        if overwrite {
            let cell = self.grid.buffer_mut().cell_mut(x, y, Cell::default());
            cell.c = c;
            cell.fg = self.attribs.fg;
            cell.bg = self.attribs.bg;
            cell.attrib = self.attribs.attrib;
        } else {
            let cell = Cell {
                c,
                fg: self.attribs.fg,
                bg: self.attribs.bg,
                attrib: self.attribs.attrib,
            };
            let row = self.grid.buffer_mut().ensure_row(y);
            let idx = (x - 1) as usize;
            while row.len() < idx {
                row.push(Cell::default());
            }
            row.insert(idx.min(row.len()), cell);
            row.truncate(self.cols as usize);
        }

        if advance {
            self.attribs.cursor = (x + 1, y);
        }
    }

    fn erase_range(&mut self, from: u16, to: u16, y: u16) {
        if from > to {
            return;
        }
        // Cells actually erased carry the CURRENT attributes (§4.6); any
        // gap cells `cell_mut` must create to reach them are plain DEFAULT
        // padding (§4.5 step 2), not a copy of the current attributes.
        let current = self.default_fill_cell();
        for x in from..=to {
            *self.grid.buffer_mut().cell_mut(x, y, Cell::default()) = current;
        }
    }

    /// Delete-at `(x, y)` (§4.6): clear the cell, then shift the row's
    /// remaining cells `[x+1, row_end]` left by one; the row's last
    /// EXISTING cell (not necessarily column `cols`, since rows are
    /// sparse, §3.2) is set to a blank carrying the CURRENT attributes.
    /// `CSI P` (DCH) calls this once per repeat count at a fixed cursor.
    fn delete_at(&mut self, x: u16, y: u16) {
        let current = self.default_fill_cell();
        *self.grid.buffer_mut().cell_mut(x, y, Cell::default()) = current;
        let row = self.grid.buffer_mut().ensure_row(y);
        let idx = (x - 1) as usize;
        if idx < row.len() {
            for i in idx..row.len() - 1 {
                row[i] = row[i + 1];
            }
            let last = row.len() - 1;
            row[last] = current;
        }
    }

    /// Clear the whole screen. `whole_buffer` additionally drops scrollback;
    /// `ED` (`CSI 2 J`) never sets it, only `ESC #8` (DECALN) does, matching
    /// the original's `clearAll(true)` call at its one call site.
    ///
    /// Walks `[margin_top, margin_bottom]` inclusive. The reference
    /// implementation's loop stops one row short of `margin_bottom`, an
    /// off-by-one this port does not reproduce.
    pub(crate) fn clear_all(&mut self, whole_buffer: bool) {
        for y in self.margin_top..=self.margin_bottom {
            self.erase_range(1, self.cols, y);
        }
        if whole_buffer {
            self.grid.clear_scrollback();
        }
    }

    // -- CSI dispatch (§4.2, §4.4) ----------------------------------------

    /// `extra` must be empty for finals that don't document one (§4.2's
    /// table preamble); finals with a documented `extra` (`J`/`K`'s `?`,
    /// `h`/`l`'s `?`, `p`'s `!`) guard on it explicitly. `S`/`T`/`c` never
    /// carry an `extra` in practice and are left unguarded. A final byte
    /// whose only arms all require a specific `extra` falls through to the
    /// `_` arm and is logged as unhandled when it doesn't match.
    #[allow(clippy::too_many_lines)]
    fn apply_csi(&mut self, extra: &str, params: &[i64], final_byte: char, sink: &mut dyn ByteSink) {
        match final_byte {
            'A' if extra.is_empty() => {
                let n = count_param(params, 0);
                self.attribs.cursor.1 = self.attribs.cursor.1.saturating_sub(n).max(self.margin_top);
            }
            'B' if extra.is_empty() => {
                let n = count_param(params, 0);
                self.attribs.cursor.1 = (self.attribs.cursor.1 + n).min(self.margin_bottom);
            }
            'C' if extra.is_empty() => {
                let n = count_param(params, 0);
                self.attribs.cursor.0 = (self.attribs.cursor.0 + n).min(self.cols);
            }
            'D' if extra.is_empty() => {
                let n = count_param(params, 0);
                self.attribs.cursor.0 = self.attribs.cursor.0.saturating_sub(n).max(1);
            }
            'E' if extra.is_empty() => {
                let n = count_param(params, 0);
                self.attribs.cursor = (1, (self.attribs.cursor.1 + n).min(self.margin_bottom));
            }
            'F' if extra.is_empty() => {
                let n = count_param(params, 0);
                self.attribs.cursor = (1, self.attribs.cursor.1.saturating_sub(n).max(self.margin_top));
            }
            'G' if extra.is_empty() => {
                let x = count_param(params, 0);
                self.attribs.cursor.0 = x.min(self.cols).max(1);
            }
            'd' if extra.is_empty() => {
                let y = count_param(params, 0);
                self.attribs.cursor.1 = y.min(self.rows).max(1);
            }
            'H' | 'f' if extra.is_empty() => {
                let mut row = count_param(params, 0);
                let col = count_param(params, 1).min(self.cols).max(1);
                row = if self.attribs.origin_mode {
                    (row + self.margin_top - 1).min(self.margin_bottom).max(self.margin_top)
                } else {
                    row.min(self.rows).max(1)
                };
                self.attribs.cursor = (col, row);
            }
            'J' if extra.is_empty() || extra == "?" => {
                self.erase_display(params.first().copied().unwrap_or(0));
            }
            'K' if extra.is_empty() || extra == "?" => {
                self.erase_in_line(params.first().copied().unwrap_or(0));
            }
            'L' if extra.is_empty() => {
                let n = count_param(params, 0);
                let y = self.attribs.cursor.1;
                if (self.margin_top..=self.margin_bottom).contains(&y) {
                    self.scroll_bwd(n, ScrollSource::Explicit(y));
                }
            }
            'M' if extra.is_empty() => {
                let n = count_param(params, 0);
                let y = self.attribs.cursor.1;
                if (self.margin_top..=self.margin_bottom).contains(&y) {
                    self.scroll_fwd(n, Some(y));
                }
            }
            'P' if extra.is_empty() => {
                let n = count_param(params, 0);
                let (x, y) = self.attribs.cursor;
                for _ in 0..n {
                    self.delete_at(x, y);
                }
            }
            '@' if extra.is_empty() => {
                let n = count_param(params, 0);
                for _ in 0..n {
                    self.insert_at_cursor(' ', false, false);
                }
            }
            'S' => {
                let n = count_param(params, 0);
                self.scroll_fwd(n, None);
            }
            'T' => {
                let n = count_param(params, 0);
                self.scroll_bwd(n, ScrollSource::Default);
            }
            'c' => {
                if let Ok(buf) = encode_da_reply() {
                    sink.write_to_pty(&buf);
                }
            }
            'g' if extra.is_empty() => match params.first().copied().unwrap_or(0) {
                0 => self.tab_stops.clear_at(self.attribs.cursor.1, self.attribs.cursor.0),
                3 => self.tab_stops.clear_all(),
                _ => {}
            },
            'n' if extra.is_empty() => {
                if params.first().copied() == Some(6) {
                    let (x, y) = self.attribs.cursor;
                    if let Ok(buf) = encode_dsr_reply(y, x) {
                        sink.write_to_pty(&buf);
                    }
                }
            }
            'p' if extra == "!" => self.hard_reset(),
            's' if extra.is_empty() => {
                if self.grid.is_alternate() {
                    self.saved_alt = self.attribs;
                } else {
                    self.saved_primary = self.attribs;
                }
            }
            'u' if extra.is_empty() => {
                self.attribs = if self.grid.is_alternate() { self.saved_alt } else { self.saved_primary };
            }
            'm' if extra.is_empty() => self.apply_sgr(params),
            'h' => self.apply_mode(extra, params, true),
            'l' => self.apply_mode(extra, params, false),
            'r' if extra.is_empty() => self.apply_decstbm(params),
            _ => debug!(final_byte, "unhandled CSI final byte"),
        }
    }

    fn erase_display(&mut self, mode: i64) {
        let (x, y) = self.attribs.cursor;
        match mode {
            0 => {
                self.erase_range(x, self.cols, y);
                for row in (y + 1)..=self.rows {
                    self.erase_range(1, self.cols, row);
                }
            }
            1 => {
                self.erase_range(1, x, y);
                for row in 1..y {
                    self.erase_range(1, self.cols, row);
                }
            }
            2 => self.clear_all(false),
            _ => {}
        }
    }

    fn erase_in_line(&mut self, mode: i64) {
        let (x, y) = self.attribs.cursor;
        match mode {
            0 => self.erase_range(x, self.cols, y),
            1 => self.erase_range(1, x, y),
            2 => self.erase_range(1, self.cols, y),
            _ => {}
        }
    }

    /// `ESC c` and `CSI ! p` (DECSTR) both perform a full reset: the same
    /// state `reset_terminal` restores, minus the host/renderer
    /// notifications only the facade method can make (§3.7, §4.2, §4.3).
    fn hard_reset(&mut self) {
        self.grid = crate::grid::Grid::with_scrollback_limit(self.config.max_scrollback);
        self.attribs = Attribs::default();
        self.saved_primary = self.attribs;
        self.saved_alt = self.attribs;
        self.margin_top = 1;
        self.margin_bottom = self.rows;
        self.show_cursor = true;
        self.app_cursor_keys = false;
        self.replace_mode = true;
        self.lnm = false;
        self.tab_stops.reset(self.cols, self.rows);
        self.selection = None;
        self.backscroll_pos = 0;
    }

    fn apply_decstbm(&mut self, params: &[i64]) {
        let mut top = params.first().copied().filter(|&v| v > 0).unwrap_or(1).clamp(1, i64::from(self.rows)) as u16;
        let mut bottom = params
            .get(1)
            .copied()
            .filter(|&v| v > 0)
            .unwrap_or(i64::from(self.rows))
            .clamp(1, i64::from(self.rows)) as u16;
        if top >= bottom {
            if top == self.rows {
                top -= 1;
            } else {
                bottom = top + 1;
            }
        }
        self.margin_top = top;
        self.margin_bottom = bottom;
        self.attribs.cursor = (1, top);
    }

    /// SGR (§4.6). Parameters are applied left to right; `38`/`48` with a
    /// `5` subparameter set an indexed color and stop processing the rest
    /// of this sequence's parameters (the reference implementation's
    /// special-cased early return); `38;2;...`/`48;2;...` true-color
    /// triples are accepted syntactically and otherwise ignored.
    fn apply_sgr(&mut self, params: &[i64]) {
        if params.is_empty() {
            self.attribs.attrib = CellAttributes::empty();
            self.attribs.fg = crate::cell::DEFAULT_FG;
            self.attribs.bg = crate::cell::DEFAULT_BG;
            return;
        }
        if matches!(params[0], 38 | 48) {
            if params.len() > 2 && params[1] == 5 && (0..=255).contains(&params[2]) {
                let color = params[2] as u16;
                if params[0] == 38 {
                    self.attribs.fg = color;
                } else {
                    self.attribs.bg = color;
                }
            }
            return;
        }

        let mut i = 0;
        while i < params.len() {
            match params[i] {
                0 => {
                    self.attribs.attrib = CellAttributes::empty();
                    self.attribs.fg = crate::cell::DEFAULT_FG;
                    self.attribs.bg = crate::cell::DEFAULT_BG;
                }
                1 => self.attribs.attrib.insert(CellAttributes::BOLD),
                4 => self.attribs.attrib.insert(CellAttributes::UNDERLINE),
                7 => self.attribs.attrib.insert(CellAttributes::NEGATIVE),
                22 => self.attribs.attrib.remove(CellAttributes::BOLD),
                24 => self.attribs.attrib.remove(CellAttributes::UNDERLINE),
                27 => self.attribs.attrib.remove(CellAttributes::NEGATIVE),
                39 => self.attribs.fg = crate::cell::DEFAULT_FG,
                49 => self.attribs.bg = crate::cell::DEFAULT_BG,
                n @ 30..=37 => self.attribs.fg = (n - 30) as u16,
                n @ 40..=47 => self.attribs.bg = (n - 40) as u16,
                n @ 90..=97 => self.attribs.fg = (n - 90 + 8) as u16,
                n @ 100..=107 => self.attribs.bg = (n - 100 + 8) as u16,
                _ => {}
            }
            i += 1;
        }
    }

    /// `CSI ... h`/`CSI ... l` mode set/reset (§4.2's mode table).
    fn apply_mode(&mut self, extra: &str, params: &[i64], set: bool) {
        let private = extra.contains('?');
        for &p in params {
            match (private, p) {
                (true, 1) => self.app_cursor_keys = set,
                (true, 3) => {
                    // DEC column mode (80/132): no real resize support
                    // (§1 Non-goals), absorbed as a margin/tab reset
                    // followed by a full-screen clear, on both set and reset.
                    self.margin_top = 1;
                    self.margin_bottom = self.rows;
                    self.tab_stops.reset(self.cols, self.rows);
                    self.clear_all(false);
                }
                (true, 6) => self.attribs.origin_mode = set,
                (true, 7) => self.attribs.wrap_around = set,
                (true, 12) => {} // blinking cursor: no-op, no visual cursor blink in this engine
                (true, 25) => self.show_cursor = set,
                (true, 1049) => self.switch_alt_screen(set),
                (false, 4) => self.replace_mode = !set,
                (false, 20) => self.lnm = set,
                _ => {}
            }
        }
    }

    /// `CSI ?1049h`/`l`: swap to/from the alternate screen, saving and
    /// restoring cursor/attribute state and resetting margins on entry
    /// (§4.2).
    fn switch_alt_screen(&mut self, enter: bool) {
        if enter == self.grid.is_alternate() {
            return;
        }
        if enter {
            self.saved_primary = self.attribs;
            self.grid.set_alternate(true);
            self.attribs = Attribs::default();
            self.margin_top = 1;
            self.margin_bottom = self.rows;
        } else {
            self.grid.set_alternate(false);
            self.attribs = self.saved_primary;
        }
        self.selection = None;
    }

    // -- ESC dispatch (§4.3) ----------------------------------------------

    fn apply_esc(&mut self, c: char, sink: &mut dyn ByteSink) {
        match c {
            '7' => self.saved_primary = self.attribs,
            '8' => self.attribs = self.saved_primary,
            '>' => self.app_cursor_keys = false,
            '=' => self.app_cursor_keys = true,
            'H' => {
                let (x, y) = self.attribs.cursor;
                self.tab_stops.set(y, x);
            }
            'D' => {
                let y = self.attribs.cursor.1;
                if y == self.margin_bottom {
                    self.scroll_fwd(1, Some(y));
                } else {
                    self.attribs.cursor.1 = (y + 1).min(self.rows);
                }
            }
            'M' => {
                let y = self.attribs.cursor.1;
                if y == self.margin_top {
                    self.scroll_bwd(1, ScrollSource::Explicit(y));
                } else {
                    self.attribs.cursor.1 = y.saturating_sub(1).max(1);
                }
            }
            'E' => {
                self.attribs.cursor.0 = 1;
                self.apply_esc('D', sink);
            }
            'c' => self.hard_reset(),
            'g' => {} // visual bell: no-op (§1 Non-goals)
            _ => debug!(c, "unhandled single-char ESC dispatch"),
        }
    }

    fn apply_esc_multi(&mut self, intro: char, c: char) {
        if intro == '#' && c == '8' {
            // DECALN: drop scrollback, then fill the screen with 'E' for
            // alignment testing (SPEC_FULL §11.6).
            self.clear_all(true);
            let fill_attrib = self.attribs.attrib;
            let (fg, bg) = (self.attribs.fg, self.attribs.bg);
            for y in 1..=self.rows {
                for x in 1..=self.cols {
                    let cell = self.grid.buffer_mut().cell_mut(x, y, crate::cell::Cell::default());
                    cell.c = 'E';
                    cell.fg = fg;
                    cell.bg = bg;
                    cell.attrib = fill_attrib;
                }
            }
        }
        // other two-character introducers select a character set, which
        // this engine does not model (§1 Non-goals).
    }

    // -- OSC dispatch (§4.3) ------------------------------------------------

    fn apply_osc(&mut self, body: &str, host: &mut dyn HostServices) {
        if let Some((code, title)) = body.split_once(';') {
            if code == "0" || code == "1" || code == "2" {
                host.set_window_title(title);
            }
        }
    }
}
