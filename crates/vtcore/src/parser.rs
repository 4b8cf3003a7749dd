//! The escape-sequence parser (§4.1): a four-state machine over a stream
//! of Unicode code points that emits high-level [`Command`]s for the
//! executor to apply.
//!
//! Implemented as a tagged-state `enum` with per-state dispatch (rather
//! than the layered `if`/`else` chain the original C++ source uses) so the
//! transition table in §4.1 is directly auditable against the match
//! arms below.

use smallvec::SmallVec;
use tracing::debug;

/// Characters that introduce a two-byte ESC sequence (§4.1 MULTI state).
const MULTI_INTRODUCERS: &[char] = &['(', ')', '.', '*', '+', '-', '/', '%', '#'];

/// A high-level command emitted by the parser for the executor to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A printable code point to insert at the cursor.
    Print(char),
    /// LF, VT, or FF.
    LineFeed,
    /// CR.
    CarriageReturn,
    /// BS or DEL: move left, do not erase.
    Backspace,
    /// BEL.
    Bell,
    /// HT: advance to the next tab stop.
    Tab,
    /// A complete CSI sequence.
    Csi {
        /// Non-digit bytes preceding the first parameter (e.g. `?`).
        extra: String,
        /// Parsed numeric parameters, in order; non-numeric segments are
        /// dropped (§4.1).
        params: SmallVec<[i64; 4]>,
        final_byte: char,
    },
    /// A single-character ESC dispatch (`ESC <c>` where `<c>` is not `[`,
    /// `]`, `\`, or a MULTI introducer).
    Esc(char),
    /// A two-character ESC dispatch (`ESC <intro> <final>`).
    EscMulti(char, char),
    /// The body of an OSC string (without `ESC ]` and its terminator).
    Osc(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Entry,
    Csi,
    Osc,
    Multi(char),
}

/// The parser's state machine. Holds only the transient accumulation
/// buffers; it carries no terminal state itself.
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    param_buf: String,
    osc_buf: String,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            param_buf: String::new(),
            osc_buf: String::new(),
        }
    }

    /// Feed a chunk of code points through the parser, invoking `emit`
    /// for each [`Command`] produced. The parser always returns to
    /// GROUND at the end of a complete sequence; a sequence left
    /// incomplete at the end of `input` resumes on the next call.
    pub fn feed<F: FnMut(Command)>(&mut self, input: &str, mut emit: F) {
        for c in input.chars() {
            self.feed_char(c, &mut emit);
        }
    }

    fn feed_char<F: FnMut(Command)>(&mut self, c: char, emit: &mut F) {
        // "ANY, ESC -> ENTRY" applies uniformly, interrupting whatever
        // sequence was in progress. Accumulation buffers are left alone:
        // OSC's buffer must survive to support `ESC \` as a terminator.
        if c == '\u{1B}' {
            self.state = State::Entry;
            return;
        }

        match self.state {
            State::Ground => self.feed_ground(c, emit),
            State::Entry => self.feed_entry(c, emit),
            State::Csi => self.feed_csi(c, emit),
            State::Osc => self.feed_osc(c, emit),
            State::Multi(intro) => self.feed_multi(intro, c, emit),
        }
    }

    fn feed_ground<F: FnMut(Command)>(&mut self, c: char, emit: &mut F) {
        match c {
            '\n' | '\u{0B}' | '\u{0C}' => emit(Command::LineFeed),
            '\r' => emit(Command::CarriageReturn),
            '\u{08}' | '\u{7F}' => emit(Command::Backspace),
            '\u{07}' => emit(Command::Bell),
            '\t' => emit(Command::Tab),
            '\u{0E}' | '\u{0F}' => {} // SO/SI: charset shift, ignored (§1 Non-goals)
            '\0' => {}
            c if c.is_control() => {
                debug!(codepoint = c as u32, "unprintable char outside escape sequence");
            }
            c => emit(Command::Print(c)),
        }
    }

    fn feed_entry<F: FnMut(Command)>(&mut self, c: char, emit: &mut F) {
        match c {
            '[' => {
                self.param_buf.clear();
                self.state = State::Csi;
            }
            ']' => {
                self.osc_buf.clear();
                self.state = State::Osc;
            }
            '\\' => {
                emit(Command::Osc(std::mem::take(&mut self.osc_buf)));
                self.state = State::Ground;
            }
            c if MULTI_INTRODUCERS.contains(&c) => {
                self.state = State::Multi(c);
            }
            c => {
                emit(Command::Esc(c));
                self.state = State::Ground;
            }
        }
    }

    fn feed_csi<F: FnMut(Command)>(&mut self, c: char, emit: &mut F) {
        let is_final = ('\u{40}'..='\u{7E}').contains(&c) && c != '[';
        if is_final {
            let (extra, params) = parse_csi_params(&self.param_buf);
            emit(Command::Csi {
                extra,
                params,
                final_byte: c,
            });
            self.state = State::Ground;
        } else {
            self.param_buf.push(c);
        }
    }

    fn feed_osc<F: FnMut(Command)>(&mut self, c: char, emit: &mut F) {
        if c == '\u{07}' {
            emit(Command::Osc(std::mem::take(&mut self.osc_buf)));
            self.state = State::Ground;
        } else {
            self.osc_buf.push(c);
        }
    }

    fn feed_multi<F: FnMut(Command)>(&mut self, intro: char, c: char, emit: &mut F) {
        emit(Command::EscMulti(intro, c));
        self.state = State::Ground;
    }
}

/// Parse a CSI parameter buffer (everything between `[` and the final
/// byte) into its leading non-digit `extra` prefix and its numeric
/// parameters.
///
/// Segments that don't parse as an integer (including empty segments
/// from e.g. `;;`) are silently dropped rather than defaulted, matching
/// the original implementation's `QString::toInt` + `ok` check.
pub(crate) fn parse_csi_params(buf: &str) -> (String, SmallVec<[i64; 4]>) {
    let split_at = buf.find(|c: char| c.is_ascii_digit()).unwrap_or(buf.len());
    let extra = buf[..split_at].to_string();
    let params = buf[split_at..]
        .split(';')
        .filter_map(|seg| seg.parse::<i64>().ok())
        .collect();
    (extra, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collect(input: &str) -> Vec<Command> {
        let mut parser = Parser::new();
        let mut out = Vec::new();
        parser.feed(input, |cmd| out.push(cmd));
        out
    }

    #[test]
    fn printable_text() {
        assert_eq!(collect("abc"), vec![Command::Print('a'), Command::Print('b'), Command::Print('c')]);
    }

    #[test]
    fn csi_cup_with_params() {
        let cmds = collect("\x1b[12;34H");
        assert_eq!(
            cmds,
            vec![Command::Csi {
                extra: String::new(),
                params: SmallVec::from_slice(&[12, 34]),
                final_byte: 'H',
            }]
        );
    }

    #[test]
    fn csi_private_mode() {
        let cmds = collect("\x1b[?1049h");
        assert_eq!(
            cmds,
            vec![Command::Csi {
                extra: "?".to_string(),
                params: SmallVec::from_slice(&[1049]),
                final_byte: 'h',
            }]
        );
    }

    #[test]
    fn osc_title_terminated_by_bel() {
        let cmds = collect("\x1b]0;hello\x07");
        assert_eq!(cmds, vec![Command::Osc("0;hello".to_string())]);
    }

    #[test]
    fn osc_title_terminated_by_st() {
        let cmds = collect("\x1b]2;hello\x1b\\");
        assert_eq!(cmds, vec![Command::Osc("2;hello".to_string())]);
    }

    #[test]
    fn single_char_esc() {
        assert_eq!(collect("\x1b7"), vec![Command::Esc('7')]);
        assert_eq!(collect("\x1bc"), vec![Command::Esc('c')]);
    }

    #[test]
    fn two_char_esc_multi() {
        assert_eq!(collect("\x1b#8"), vec![Command::EscMulti('#', '8')]);
        assert_eq!(collect("\x1b(B"), vec![Command::EscMulti('(', 'B')]);
    }

    #[test]
    fn esc_interrupts_csi_and_restarts() {
        // An ESC mid-CSI abandons it; a following fresh CSI still parses.
        let cmds = collect("\x1b[1;\x1b[2A");
        assert_eq!(
            cmds,
            vec![Command::Csi {
                extra: String::new(),
                params: SmallVec::from_slice(&[2]),
                final_byte: 'A',
            }]
        );
    }

    #[test]
    fn dropped_non_numeric_segments_shift_params() {
        let (extra, params) = parse_csi_params(";5");
        assert_eq!(extra, "");
        assert_eq!(&params[..], &[5]);
    }

    #[test]
    fn split_state_survives_across_feed_calls() {
        let mut parser = Parser::new();
        let mut out = Vec::new();
        parser.feed("\x1b[1", |cmd| out.push(cmd));
        assert!(out.is_empty());
        parser.feed("A", |cmd| out.push(cmd));
        assert_eq!(
            out,
            vec![Command::Csi {
                extra: String::new(),
                params: SmallVec::from_slice(&[1]),
                final_byte: 'A',
            }]
        );
    }
}
