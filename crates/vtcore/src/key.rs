//! Key-to-byte translation (§4.8).
//!
//! Pure function of the logical key, its modifiers, and the two terminal
//! modes that change its encoding (application-cursor-keys, LNM). The
//! caller (`Terminal::key_press`) is responsible for resetting the
//! back-buffer scroll position before translating, and for writing the
//! result to the byte sink.

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held down alongside a key press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b001;
        const CTRL = 0b010;
        const ALT = 0b100;
    }
}

/// A logical key event, independent of any particular keyboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A Unicode code point as it would appear unshifted (letters are
    /// case-folded according to [`Modifiers::SHIFT`] during translation).
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Enter,
    Backspace,
    Tab,
    Escape,
    Delete,
    PageUp,
    PageDown,
    Home,
    End,
    /// F1..=F12.
    Function(u8),
}

/// Map Ctrl+<char> to its control code, ASCII-only (§4.8).
fn control_code_for(c: char) -> Option<u8> {
    match c {
        'A'..='Z' | 'a'..='z' => Some((c as u8) & 0x1F),
        _ => None,
    }
}

/// Translate a key press into the byte sequence sent to the pty.
#[must_use]
pub fn translate(key: Key, mods: Modifiers, app_cursor_keys: bool, lnm: bool) -> Vec<u8> {
    match key {
        Key::Up => arrow(b'A', app_cursor_keys),
        Key::Down => arrow(b'B', app_cursor_keys),
        Key::Right => arrow(b'C', app_cursor_keys),
        Key::Left => arrow(b'D', app_cursor_keys),
        Key::Enter => {
            if lnm {
                b"\r\n".to_vec()
            } else {
                b"\r".to_vec()
            }
        }
        Key::Backspace => vec![0x7F],
        Key::Tab => vec![b'\t'],
        Key::Escape => vec![0x1B],
        Key::Delete => b"\x1b[3~".to_vec(),
        Key::PageUp => b"\x1b[5~".to_vec(),
        Key::PageDown => b"\x1b[6~".to_vec(),
        Key::Home => b"\x1bOH".to_vec(),
        Key::End => b"\x1bOF".to_vec(),
        Key::Function(n @ 1..=12) => format!("\x1b[{}~", 10 + n as u32).into_bytes(),
        Key::Function(_) => Vec::new(),
        Key::Char(c) => translate_char(c, mods),
    }
}

fn arrow(final_byte: u8, app_cursor_keys: bool) -> Vec<u8> {
    let middle = if app_cursor_keys { b'O' } else { b'[' };
    vec![0x1B, middle, final_byte]
}

fn translate_char(c: char, mods: Modifiers) -> Vec<u8> {
    let c = if c.is_alphabetic() {
        if mods.contains(Modifiers::SHIFT) {
            c.to_ascii_uppercase()
        } else {
            c.to_ascii_lowercase()
        }
    } else {
        c
    };

    let is_latin1_or_cyrillic = (c as u32) <= 0xFF || ('\u{410}'..='\u{44F}').contains(&c);
    if !is_latin1_or_cyrillic {
        return c.to_string().into_bytes();
    }

    let mut out = Vec::with_capacity(3);
    if mods.contains(Modifiers::ALT) {
        out.push(0x1B);
    }
    if mods.contains(Modifiers::CTRL) {
        if let Some(code) = control_code_for(c) {
            out.push(code);
            return out;
        }
    }
    out.extend(c.to_string().into_bytes());
    out
}
