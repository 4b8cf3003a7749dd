//! The public facade (§6.2): wires the parser, grid, cursor state,
//! selection, and key translator together and exposes the operations an
//! embedder drives.

use crate::cell::{Cell, DEFAULT_BG, DEFAULT_FG};
use crate::config::TerminalConfig;
use crate::cursor::{Attribs, TabStops};
use crate::grid::Grid;
use crate::key::{translate, Key, Modifiers};
use crate::parser::Parser;
use crate::ports::{ByteSink, HostServices, RendererPort};
use crate::selection::{copy_text, Selection};
use crate::url::extract_urls;

/// A VT100/xterm-compatible terminal engine (§1).
///
/// Constructed with zero size (§3.7); callers must call [`Terminal::set_size`]
/// before feeding input.
pub struct Terminal {
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) grid: Grid,
    pub(crate) attribs: Attribs,
    pub(crate) saved_primary: Attribs,
    pub(crate) saved_alt: Attribs,
    pub(crate) margin_top: u16,
    pub(crate) margin_bottom: u16,
    pub(crate) tab_stops: TabStops,
    parser: Parser,
    /// SGR/IRM replace mode: `true` (default) means plain overwrite;
    /// `false` means inserted characters shift the tail right (§4.2 mode 4).
    pub(crate) replace_mode: bool,
    pub(crate) show_cursor: bool,
    pub(crate) app_cursor_keys: bool,
    pub(crate) lnm: bool,
    pub(crate) selection: Option<Selection>,
    pub(crate) backscroll_pos: usize,
    pub(crate) config: TerminalConfig,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::with_config(TerminalConfig::default())
    }
}

impl Terminal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: TerminalConfig) -> Self {
        Self {
            cols: 0,
            rows: 0,
            grid: Grid::with_scrollback_limit(config.max_scrollback),
            attribs: Attribs::default(),
            saved_primary: Attribs::default(),
            saved_alt: Attribs::default(),
            margin_top: 1,
            margin_bottom: 1,
            tab_stops: TabStops::new(),
            parser: Parser::new(),
            replace_mode: true,
            show_cursor: true,
            app_cursor_keys: false,
            lnm: false,
            selection: None,
            backscroll_pos: 0,
            config,
        }
    }

    // -- Size control (§6.2, §3.7) ------------------------------------

    #[must_use]
    pub fn term_size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    /// The current scroll region as `(margin_top, margin_bottom)`, 1-based
    /// and inclusive (§3.6, DECSTBM). Defaults to the full screen.
    #[must_use]
    pub fn scroll_region(&self) -> (u16, u16) {
        (self.margin_top, self.margin_bottom)
    }

    /// Resize the terminal, resetting margins to the full screen and
    /// rebuilding tab stops (`setTermSize`). A no-op if the size is
    /// unchanged.
    pub fn set_term_size(&mut self, cols: u16, rows: u16, renderer: &mut dyn RendererPort) {
        if (cols, rows) == (self.cols, self.rows) {
            return;
        }
        self.cols = cols;
        self.rows = rows;
        self.margin_top = 1;
        self.margin_bottom = rows;
        self.tab_stops.reset(cols, rows);
        renderer.update_term_size();
        renderer.redraw();
    }

    /// Clear all buffers, restore default attributes/margins/tabs, and
    /// clear the selection, preserving the current size (`resetTerminal`,
    /// §3.7).
    pub fn reset_terminal(&mut self, host: &mut dyn HostServices, renderer: &mut dyn RendererPort) {
        self.grid = Grid::with_scrollback_limit(self.config.max_scrollback);
        self.attribs = Attribs::default();
        self.saved_primary = self.attribs;
        self.saved_alt = self.attribs;
        self.margin_top = 1;
        self.margin_bottom = self.rows;
        self.show_cursor = true;
        self.app_cursor_keys = false;
        self.replace_mode = true;
        self.lnm = false;
        self.reset_back_buffer_scroll_pos(renderer);
        self.tab_stops.reset(self.cols, self.rows);
        self.clear_selection(host, renderer);
    }

    // -- Queries (§6.2) -------------------------------------------------

    #[must_use]
    pub fn cursor_pos(&self) -> (u16, u16) {
        self.attribs.cursor
    }

    /// The cursor is hidden while the view is scrolled back, regardless of
    /// DECTCEM state (`showCursor`).
    #[must_use]
    pub fn show_cursor(&self) -> bool {
        self.backscroll_pos == 0 && self.show_cursor
    }

    #[must_use]
    pub fn buffer(&self) -> &crate::grid::Buffer {
        self.grid.buffer()
    }

    #[must_use]
    pub fn back_buffer(&self) -> &crate::grid::Scrollback {
        self.grid.scrollback()
    }

    /// Lines of printable text around the cursor row (`printableLinesFromCursor`,
    /// §11.2 of the grounding notes): `lines` rows above the cursor, the
    /// cursor's own row, and — when `with_empty` is set — `lines` rows below
    /// it too. Non-printable cells are dropped; out-of-range rows contribute
    /// an empty string rather than being skipped, so the result always has
    /// `lines + 1` entries (`2*lines + 1` with `with_empty`).
    #[must_use]
    pub fn printable_lines_from_cursor(&self, lines: u16, with_empty: bool) -> Vec<String> {
        let cursor_y = i64::from(self.attribs.cursor.1);
        let start = cursor_y - i64::from(lines);
        let end = cursor_y + if with_empty { i64::from(lines) } else { 0 };
        let mut out = Vec::new();
        for l in (start - 1)..end {
            let mut line = String::new();
            if l >= 0 {
                if let Some(row) = self.grid.buffer().rows().get(l as usize) {
                    for cell in row {
                        if !cell.c.is_control() {
                            line.push(cell.c);
                        }
                    }
                }
            }
            out.push(line);
        }
        out
    }

    // -- Selection / clipboard (§4.9, §6.2) ------------------------------

    pub fn set_selection(&mut self, start: (u16, u16), end: (u16, u16), renderer: &mut dyn RendererPort) {
        self.selection = Some(Selection::new(start, end, self.cols, self.rows));
        renderer.redraw();
    }

    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    pub fn clear_selection(&mut self, host: &mut dyn HostServices, renderer: &mut dyn RendererPort) {
        if self.selection.take().is_some() {
            host.selection_finished();
            renderer.redraw();
        }
    }

    pub fn copy_selection_to_clipboard(&self, host: &mut dyn HostServices) {
        let Some(sel) = self.selection else { return };
        let text = copy_text(&sel, self.grid.buffer(), self.grid.scrollback(), self.backscroll_pos);
        let _ = host.copy_to_clipboard(&text);
    }

    pub fn paste_from_clipboard(&mut self, host: &dyn HostServices, sink: &mut dyn ByteSink) {
        if let Ok(text) = host.paste_from_clipboard() {
            if !text.is_empty() {
                self.reset_back_buffer_scroll_pos_silent();
                sink.write_to_pty(text.as_bytes());
            }
        }
    }

    // -- Backscroll (§4.7, §6.2) -----------------------------------------

    pub fn scroll_back_buffer_fwd(&mut self, lines: u16, host: &mut dyn HostServices, renderer: &mut dyn RendererPort) {
        if self.grid.is_alternate() || lines == 0 {
            return;
        }
        self.clear_selection(host, renderer);
        self.backscroll_pos = self.backscroll_pos.saturating_sub(lines as usize);
        renderer.set_show_scroll_indicator(self.backscroll_pos != 0);
        renderer.redraw();
    }

    pub fn scroll_back_buffer_back(&mut self, lines: u16, host: &mut dyn HostServices, renderer: &mut dyn RendererPort) {
        if self.grid.is_alternate() || lines == 0 {
            return;
        }
        self.clear_selection(host, renderer);
        self.backscroll_pos = (self.backscroll_pos + lines as usize).min(self.grid.scrollback().len());
        renderer.set_show_scroll_indicator(self.backscroll_pos != 0);
        renderer.redraw();
    }

    #[must_use]
    pub fn back_buffer_scroll_pos(&self) -> usize {
        self.backscroll_pos
    }

    pub fn reset_back_buffer_scroll_pos(&mut self, renderer: &mut dyn RendererPort) {
        if self.backscroll_pos == 0 && self.selection.is_none() {
            return;
        }
        self.backscroll_pos = 0;
        self.selection = None;
        renderer.set_show_scroll_indicator(false);
        renderer.redraw();
    }

    fn reset_back_buffer_scroll_pos_silent(&mut self) {
        self.backscroll_pos = 0;
        self.selection = None;
    }

    // -- Utilities (§6.2) -------------------------------------------------

    /// Scan the current view (plus scrollback when the host opts in, or
    /// while scrolled back) for URLs (§4.9, §11.2).
    #[must_use]
    pub fn grab_urls_from_buffer(&self, host: &dyn HostServices) -> Vec<String> {
        let include_backbuffer = (!self.grid.is_alternate()
            && host
                .settings_value("gen/grabUrlsFromBackbuffer")
                .ok()
                .flatten()
                .is_some_and(|v| v == "true"))
            || self.backscroll_pos > 0;

        let mut flat = String::new();
        if include_backbuffer {
            for row in self.grid.scrollback().rows() {
                flatten_row_into(&mut flat, row, self.cols);
            }
        }
        for row in self.grid.buffer().rows() {
            flatten_row_into(&mut flat, row, self.cols);
        }
        extract_urls(&flat)
    }

    #[must_use]
    pub fn get_user_menu_xml(&self, host: &dyn HostServices) -> String {
        let Ok(path) = host.config_path() else {
            return String::new();
        };
        std::fs::read_to_string(format!("{path}/menu.xml")).unwrap_or_default()
    }

    // -- Input (§4.1, §4.5, §6.2) -----------------------------------------

    /// Feed a chunk of code points through the parser and executor,
    /// suppressing intermediate redraws and emitting a single
    /// display-changed signal at the end (§5).
    pub fn insert_in_buffer(
        &mut self,
        chars: &str,
        sink: &mut dyn ByteSink,
        renderer: &mut dyn RendererPort,
        host: &mut dyn HostServices,
    ) {
        if self.cols == 0 || self.rows == 0 {
            tracing::debug!("insert_in_buffer called on a zero-size terminal");
            return;
        }
        let mut parser = std::mem::take(&mut self.parser);
        let mut commands = Vec::new();
        parser.feed(chars, |cmd| commands.push(cmd));
        self.parser = parser;
        for cmd in commands {
            self.apply_command(cmd, sink, host);
        }
        renderer.redraw();
    }

    pub fn key_press(&mut self, key: Key, mods: Modifiers, sink: &mut dyn ByteSink) {
        self.reset_back_buffer_scroll_pos_silent();
        let bytes = translate(key, mods, self.app_cursor_keys, self.lnm);
        if !bytes.is_empty() {
            sink.write_to_pty(&bytes);
        }
    }

    /// Write `s` to the pty, unescaping `\r \n \e \b \t`, `\xHH`, and
    /// `\0OOO` sequences first when `unescape` is set (§6.3).
    pub fn put_string(&self, s: &str, unescape: bool, sink: &mut dyn ByteSink) {
        let text = if unescape { unescape_put_string(s) } else { s.to_string() };
        sink.write_to_pty(text.as_bytes());
    }

    pub(crate) fn default_fill_cell(&self) -> Cell {
        Cell::blank_with(self.attribs.fg, self.attribs.bg, self.attribs.attrib)
    }
}

fn flatten_row_into(out: &mut String, row: &[Cell], cols: u16) {
    for cell in row {
        if !cell.c.is_control() {
            out.push(cell.c);
        } else if cell.c == '\0' {
            out.push(' ');
        }
    }
    if (row.len() as u16) < cols {
        out.push(' ');
    }
}

fn unescape_put_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() {
            match chars[i + 1] {
                'r' => {
                    out.push('\r');
                    i += 2;
                    continue;
                }
                'n' => {
                    out.push('\n');
                    i += 2;
                    continue;
                }
                'e' => {
                    out.push('\u{1B}');
                    i += 2;
                    continue;
                }
                'b' => {
                    out.push('\u{08}');
                    i += 2;
                    continue;
                }
                't' => {
                    out.push('\t');
                    i += 2;
                    continue;
                }
                'x' => {
                    let mut j = i + 2;
                    let mut digits = String::new();
                    while digits.len() < 2 && j < chars.len() && chars[j].is_ascii_hexdigit() {
                        digits.push(chars[j]);
                        j += 1;
                    }
                    if let Ok(v) = u32::from_str_radix(&digits, 16) {
                        if let Some(c) = char::from_u32(v) {
                            out.push(c);
                            i = j;
                            continue;
                        }
                    }
                }
                '0' => {
                    let mut j = i + 2;
                    let mut digits = String::new();
                    while digits.len() < 3 && j < chars.len() && ('0'..='7').contains(&chars[j]) {
                        digits.push(chars[j]);
                        j += 1;
                    }
                    if let Ok(v) = u32::from_str_radix(&digits, 8) {
                        if let Some(c) = char::from_u32(v) {
                            out.push(c);
                            i = j;
                            continue;
                        }
                    }
                }
                _ => {}
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unescape_handles_named_escapes_and_hex() {
        assert_eq!(unescape_put_string(r"a\r\n\t\x41"), "a\r\n\tA");
    }

    #[test]
    fn unescape_handles_octal() {
        assert_eq!(unescape_put_string(r"\0101"), "A");
    }

    #[test]
    fn default_fg_bg_sentinels() {
        let term = Terminal::new();
        assert_eq!(term.attribs.fg, DEFAULT_FG);
        assert_eq!(term.attribs.bg, DEFAULT_BG);
    }
}
