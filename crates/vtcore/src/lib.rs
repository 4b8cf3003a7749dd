//! A VT100/xterm-compatible terminal emulation engine.
//!
//! This crate owns the escape-sequence parser, the screen/scrollback grid,
//! cursor and mode state, selection, and key translation. It does not open a
//! pty, does not render glyphs, and does not own a window: those concerns
//! live behind the [`ports`] traits, which a host implements and drives the
//! [`Terminal`] facade through.

pub mod cell;
pub mod config;
pub mod cursor;
mod executor;
pub mod error;
pub mod grid;
pub mod key;
pub mod parser;
pub mod ports;
pub mod selection;
pub mod terminal;
pub mod url;

pub use cell::{Cell, CellAttributes};
pub use config::TerminalConfig;
pub use cursor::Attribs;
pub use error::HostServiceError;
pub use grid::{Buffer, Grid, Scrollback};
pub use key::{Key, Modifiers};
pub use parser::{Command, Parser};
pub use ports::{ByteSink, HostServices, RendererPort};
pub use selection::Selection;
pub use terminal::Terminal;
