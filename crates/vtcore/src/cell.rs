//! Grid cells and their display attributes.

use bitflags::bitflags;

/// Sentinel foreground color index meaning "use the default foreground".
///
/// Matches the original implementation's `defaultFgColor` constant.
pub const DEFAULT_FG: u16 = 257;

/// Sentinel background color index meaning "use the default background".
///
/// Matches the original implementation's `defaultBgColor` constant.
pub const DEFAULT_BG: u16 = 256;

bitflags! {
    /// SGR attribute bits carried on a [`Cell`] and on the terminal's
    /// current [`Attribs`](crate::cursor::Attribs).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CellAttributes: u8 {
        const BOLD = 0b001;
        const UNDERLINE = 0b010;
        const NEGATIVE = 0b100;
    }
}

/// A single grid cell: one code point plus its display attributes.
///
/// Cells are value-typed and cheap to clone, as required by the sparse
/// row/grid model (§3.2): missing cells are represented by the absence of
/// a `Cell` in a row's storage, not by a sentinel `Cell` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub c: char,
    pub fg: u16,
    pub bg: u16,
    pub attrib: CellAttributes,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            c: ' ',
            fg: DEFAULT_FG,
            bg: DEFAULT_BG,
            attrib: CellAttributes::empty(),
        }
    }
}

impl Cell {
    /// Build a blank cell carrying the given current attributes, the way
    /// every erase/insert operation in the executor stamps its fill cells.
    #[must_use]
    pub fn blank_with(fg: u16, bg: u16, attrib: CellAttributes) -> Self {
        Self {
            c: ' ',
            fg,
            bg,
            attrib,
        }
    }
}
