//! Integration tests for the concrete scenarios in spec.md §8, plus the
//! invariants and round-trip laws listed alongside them. Unlike the inline
//! `#[cfg(test)]` modules scattered through `src/`, this file drives the
//! public `Terminal` facade exactly as a host would, through the `ports`
//! traits.

use pretty_assertions::assert_eq;
use vtcore::{ByteSink, Cell, HostServiceError, HostServices, Key, Modifiers, RendererPort, Terminal};

#[derive(Default)]
struct RecordingSink(Vec<u8>);

impl ByteSink for RecordingSink {
    fn write_to_pty(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }
}

#[derive(Default)]
struct NullRenderer {
    redraws: u32,
}

impl RendererPort for NullRenderer {
    fn redraw(&mut self) {
        self.redraws += 1;
    }
    fn set_show_scroll_indicator(&mut self, _show: bool) {}
    fn update_term_size(&mut self) {}
}

#[derive(Default)]
struct NullHost {
    title: Option<String>,
    bells: u32,
}

impl HostServices for NullHost {
    fn bell_alert(&mut self) {
        self.bells += 1;
    }
    fn set_window_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }
    fn config_path(&self) -> Result<String, HostServiceError> {
        Ok(String::new())
    }
    fn settings_value(&self, _key: &str) -> Result<Option<String>, HostServiceError> {
        Ok(None)
    }
    fn selection_finished(&mut self) {}
    fn copy_to_clipboard(&mut self, _text: &str) -> Result<(), HostServiceError> {
        Ok(())
    }
    fn paste_from_clipboard(&self) -> Result<String, HostServiceError> {
        Ok(String::new())
    }
}

fn term(cols: u16, rows: u16) -> (Terminal, RecordingSink, NullRenderer, NullHost) {
    let mut t = Terminal::new();
    let mut renderer = NullRenderer::default();
    t.set_term_size(cols, rows, &mut renderer);
    (t, RecordingSink::default(), renderer, NullHost::default())
}

fn row_text(t: &Terminal, y: u16, cols: u16) -> String {
    let mut out = String::new();
    if let Some(row) = t.buffer().row(y) {
        for cell in row {
            out.push(cell.c);
        }
    }
    while (out.chars().count() as u16) < cols {
        out.push(' ');
    }
    out
}

/// Scenario 1: `"abc"` from fresh state leaves row 1 = `"abc" + blanks`
/// and the cursor at (4, 1).
#[test]
fn scenario_1_plain_text_advances_cursor() {
    let (mut t, mut sink, mut renderer, mut host) = term(10, 4);
    t.insert_in_buffer("abc", &mut sink, &mut renderer, &mut host);
    assert_eq!(row_text(&t, 1, 10), "abc       ");
    assert_eq!(t.cursor_pos(), (4, 1));
}

/// Scenario 2: `"a\x1b[2Jb"` on 10x4 clears the whole screen, then writes
/// `b` at the cursor position left by `a` (ED does not move the cursor).
#[test]
fn scenario_2_ed_clears_but_preserves_cursor() {
    let (mut t, mut sink, mut renderer, mut host) = term(10, 4);
    t.insert_in_buffer("a", &mut sink, &mut renderer, &mut host);
    assert_eq!(t.cursor_pos(), (2, 1));
    t.insert_in_buffer("\x1b[2Jb", &mut sink, &mut renderer, &mut host);
    assert_eq!(t.buffer().cell(2, 1).unwrap().c, 'b');
    assert_eq!(t.cursor_pos(), (3, 1));
    // every other cell on the cleared screen is a blank.
    assert_eq!(t.buffer().cell(1, 1).unwrap().c, ' ');
    assert_eq!(t.buffer().cell(1, 4).unwrap_or(&Cell::default()).c, ' ');
}

/// Scenario 3: `"\x1b[31mX\x1b[0mY"` sets fg=1/attrib=0 on `X` and resets
/// to default fg/attrib=0 on `Y`.
#[test]
fn scenario_3_sgr_applies_then_resets() {
    let (mut t, mut sink, mut renderer, mut host) = term(10, 4);
    t.insert_in_buffer("\x1b[31mX\x1b[0mY", &mut sink, &mut renderer, &mut host);
    let x = t.buffer().cell(1, 1).unwrap();
    assert_eq!(x.c, 'X');
    assert_eq!(x.fg, 1);
    assert!(x.attrib.is_empty());
    let y = t.buffer().cell(2, 1).unwrap();
    assert_eq!(y.c, 'Y');
    assert_eq!(y.fg, vtcore::cell::DEFAULT_FG);
    assert!(y.attrib.is_empty());
}

/// Scenario 4: entering and leaving the alternate screen never touches the
/// primary screen's contents.
#[test]
fn scenario_4_alternate_screen_excursion_preserves_primary() {
    let (mut t, mut sink, mut renderer, mut host) = term(10, 4);
    t.insert_in_buffer("\x1b[?1049h", &mut sink, &mut renderer, &mut host);
    t.insert_in_buffer("Z", &mut sink, &mut renderer, &mut host);
    assert_eq!(t.buffer().cell(1, 1).unwrap().c, 'Z');
    t.insert_in_buffer("\x1b[?1049l", &mut sink, &mut renderer, &mut host);
    assert!(t.buffer().cell(1, 1).is_none(), "primary screen was never touched");
}

/// Scenario 5: on a 10x2 screen, two completed lines followed by a third
/// (not yet newline-terminated) push the first line into scrollback and
/// leave the last two on screen — a fourth `\r\n` after `line3` would
/// scroll a second time, per the ordinary "LF at the bottom margin
/// scrolls" rule (§4.1), so it is deliberately omitted here.
#[test]
fn scenario_5_scrolling_pushes_lines_into_scrollback() {
    let (mut t, mut sink, mut renderer, mut host) = term(10, 2);
    t.insert_in_buffer("line1\r\nline2\r\nline3", &mut sink, &mut renderer, &mut host);
    assert_eq!(t.back_buffer().len(), 1);
    let first = t.back_buffer().rows().front().unwrap();
    let first_text: String = first.iter().map(|c| c.c).collect();
    assert_eq!(first_text.trim_end(), "line1");
    assert_eq!(row_text(&t, 1, 10).trim_end(), "line2");
    assert_eq!(row_text(&t, 2, 10).trim_end(), "line3");
}

/// Scenario 6: arrow keys honor application-cursor-keys mode.
#[test]
fn scenario_6_arrow_keys_honor_app_cursor_mode() {
    let (mut t, _sink, mut renderer, _host) = term(10, 4);
    let mut sink = RecordingSink::default();
    t.key_press(Key::Up, Modifiers::empty(), &mut sink);
    assert_eq!(sink.0, b"\x1b[A");

    let mut sink2 = RecordingSink::default();
    let mut host = NullHost::default();
    t.insert_in_buffer("\x1b[?1h", &mut sink2, &mut renderer, &mut host);
    let mut sink3 = RecordingSink::default();
    t.key_press(Key::Up, Modifiers::empty(), &mut sink3);
    assert_eq!(sink3.0, b"\x1bOA");
}

/// Boundary: writing the `cols`-th printable char leaves the cursor in the
/// pending-wrap position `cols + 1`; the next printable char wraps to
/// `(1, y+1)` when wraparound is on.
#[test]
fn boundary_pending_wrap_then_resolves_on_next_char() {
    let (mut t, mut sink, mut renderer, mut host) = term(4, 4);
    t.insert_in_buffer("abcd", &mut sink, &mut renderer, &mut host);
    assert_eq!(t.cursor_pos(), (5, 1));
    t.insert_in_buffer("e", &mut sink, &mut renderer, &mut host);
    assert_eq!(t.cursor_pos(), (2, 2));
    assert_eq!(t.buffer().cell(1, 2).unwrap().c, 'e');
}

/// Boundary: CUU defaults to 1 and treats an explicit `0` the same as 1.
#[test]
fn boundary_cuu_defaults_and_zero_both_move_one() {
    let (mut t, mut sink, mut renderer, mut host) = term(10, 10);
    t.insert_in_buffer("\x1b[5;1H", &mut sink, &mut renderer, &mut host);
    t.insert_in_buffer("\x1b[A", &mut sink, &mut renderer, &mut host);
    assert_eq!(t.cursor_pos().1, 4);
    t.insert_in_buffer("\x1b[0A", &mut sink, &mut renderer, &mut host);
    assert_eq!(t.cursor_pos().1, 3);
}

/// Boundary: DECSTBM with `top >= bottom` normalizes so the two margins
/// always differ by at least one row (§4.2).
#[test]
fn boundary_decstbm_normalizes_inverted_margins() {
    let (mut t, mut sink, mut renderer, mut host) = term(10, 10);
    t.insert_in_buffer("\x1b[5;5r", &mut sink, &mut renderer, &mut host);
    assert_eq!(t.scroll_region().0, 5);
    assert_eq!(t.scroll_region().1, 6);
}

/// Invariant: after any sequence of input, the cursor stays within its
/// legal range and the margins stay ordered.
#[test]
fn invariant_cursor_and_margins_stay_legal_after_varied_input() {
    let (mut t, mut sink, mut renderer, mut host) = term(8, 6);
    let script = "hello world\r\n\x1b[3;5rline\x1b[10;20H\x1b[?6h\x1b[1;1H\x1b[999Bfoo\x1b[2J\x1b[?1049h bar\x1b[?1049l";
    t.insert_in_buffer(script, &mut sink, &mut renderer, &mut host);
    let (cols, rows) = t.term_size();
    let (x, y) = t.cursor_pos();
    assert!(x >= 1 && x <= cols + 1);
    assert!(y >= 1 && y <= rows);
    assert!(t.scroll_region().0 < t.scroll_region().1);
    assert!(t.scroll_region().0 >= 1 && t.scroll_region().1 <= rows);
}

/// Invariant: scrollback never exceeds the configured bound (300 by
/// default) no matter how much output scrolls through.
#[test]
fn invariant_scrollback_bounded() {
    let (mut t, mut sink, mut renderer, mut host) = term(10, 3);
    for i in 0..500 {
        t.insert_in_buffer(&format!("row{i}\r\n"), &mut sink, &mut renderer, &mut host);
    }
    assert!(t.back_buffer().len() <= 300);
}

/// Invariant: the alternate buffer never grows scrollback, even while a
/// lot of output scrolls through it.
#[test]
fn invariant_alternate_buffer_never_grows_scrollback() {
    let (mut t, mut sink, mut renderer, mut host) = term(10, 3);
    t.insert_in_buffer("\x1b[?1049h", &mut sink, &mut renderer, &mut host);
    for i in 0..20 {
        t.insert_in_buffer(&format!("row{i}\r\n"), &mut sink, &mut renderer, &mut host);
    }
    assert_eq!(t.back_buffer().len(), 0);
}

/// `clear_selection` followed by `selection()` always observes `None`.
#[test]
fn invariant_clear_selection_then_none() {
    let (mut t, mut sink, mut renderer, mut host) = term(10, 4);
    t.insert_in_buffer("hello", &mut sink, &mut renderer, &mut host);
    t.set_selection((1, 1), (3, 1), &mut renderer);
    assert!(t.has_selection());
    t.clear_selection(&mut host, &mut renderer);
    assert!(t.selection().is_none());
}

/// Round-trip: `scroll_forward(k)` then `scroll_back(k)` restores the
/// primary screen and scrollback when scrollback had >= k entries and no
/// trimming occurred (driven here via CSI `S` / CSI `T`, which on an
/// IL/explicit-row-free path are the pure forward/back scroll primitives).
#[test]
fn roundtrip_scroll_forward_then_back_restores_screen() {
    let (mut t, mut sink, mut renderer, mut host) = term(10, 4);
    t.insert_in_buffer("aaa\r\nbbb\r\nccc\r\nddd", &mut sink, &mut renderer, &mut host);
    let before: Vec<String> = (1..=4).map(|y| row_text(&t, y, 10)).collect();

    t.insert_in_buffer("\x1b[2S", &mut sink, &mut renderer, &mut host);
    assert_eq!(t.back_buffer().len(), 2);
    t.insert_in_buffer("\x1b[1;1H\x1b[2L", &mut sink, &mut renderer, &mut host);

    let after: Vec<String> = (1..=4).map(|y| row_text(&t, y, 10)).collect();
    assert_eq!(before, after);
    assert_eq!(t.back_buffer().len(), 0);
}

/// Setting SGR to `0` is idempotent.
#[test]
fn sgr_reset_is_idempotent() {
    let (mut t, mut sink, mut renderer, mut host) = term(10, 4);
    t.insert_in_buffer("\x1b[31;1m\x1b[0m\x1b[0mX", &mut sink, &mut renderer, &mut host);
    let cell = t.buffer().cell(1, 1).unwrap();
    assert_eq!(cell.fg, vtcore::cell::DEFAULT_FG);
    assert!(cell.attrib.is_empty());
}

/// `reset_terminal` is idempotent and restores default state.
#[test]
fn reset_terminal_is_idempotent() {
    let (mut t, mut sink, mut renderer, mut host) = term(10, 4);
    t.insert_in_buffer("\x1b[31mhello\x1b[3;5r", &mut sink, &mut renderer, &mut host);
    t.reset_terminal(&mut host, &mut renderer);
    let after_once = (t.cursor_pos(), t.scroll_region().0, t.scroll_region().1);
    t.reset_terminal(&mut host, &mut renderer);
    let after_twice = (t.cursor_pos(), t.scroll_region().0, t.scroll_region().1);
    assert_eq!(after_once, after_twice);
    assert_eq!(after_once.0, (1, 1));
    assert!(t.buffer().is_empty());
}
