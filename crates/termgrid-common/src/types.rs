use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Terminal dimensions, rows first to match how the spec orders them
/// everywhere else (row, col).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub rows: u16,
    pub cols: u16,
}

impl Size {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

/// Cursor / cell position, 0-indexed internally. The wire protocol's
/// 1-indexed coordinates are translated at the parser/handler boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    pub row: u16,
    pub col: u16,
}

impl Position {
    pub fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

/// Inclusive scroll region (top, bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollRegion {
    pub top: u16,
    pub bottom: u16,
}

impl ScrollRegion {
    pub fn new(top: u16, bottom: u16) -> Self {
        Self { top, bottom }
    }

    pub fn full(rows: u16) -> Self {
        Self {
            top: 0,
            bottom: rows.saturating_sub(1),
        }
    }

    pub fn contains(&self, row: u16) -> bool {
        row >= self.top && row <= self.bottom
    }

    pub fn is_full_screen(&self, rows: u16) -> bool {
        self.top == 0 && self.bottom == rows.saturating_sub(1)
    }
}

/// Color as the wire protocol tags it: default, palette index, or RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    #[default]
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    /// Map an SGR 0-15 color code (30-37/90-97 normalized to 0-15) to a
    /// palette index. Indices 0-15 are reserved for the standard and
    /// bright ANSI colors in every 256-color palette.
    pub fn from_ansi(code: u8) -> Self {
        Color::Indexed(code)
    }
}

bitflags! {
    /// Per-cell text attributes. Matches the SGR flag pairs in spec.md §4.1
    /// (1/22 bold, 3/23 italic, 4/24 underline, 5/25 blink, 7/27 reverse,
    /// 8/28 invisible, 9/29 strikethrough); 2 (faint) shares the "no bold
    /// or faint" reset code 22 with bold, per ECMA-48.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct AttributeFlags: u16 {
        const BOLD          = 0b0000_0001;
        const FAINT         = 0b0000_0010;
        const ITALIC        = 0b0000_0100;
        const UNDERLINE     = 0b0000_1000;
        const BLINK         = 0b0001_0000;
        const REVERSE       = 0b0010_0000;
        const INVISIBLE     = 0b0100_0000;
        const STRIKETHROUGH = 0b1000_0000;
    }
}

/// The SGR-derived rendering attributes of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellAttributes {
    pub flags: AttributeFlags,
    pub fg: Color,
    pub bg: Color,
}

impl CellAttributes {
    pub fn reverse(&self) -> bool {
        self.flags.contains(AttributeFlags::REVERSE)
    }
}

/// A single display cell. Continuation cells (the second half of a
/// double-width glyph) carry an empty grapheme and `is_continuation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub ch: char,
    pub attrs: CellAttributes,
    pub is_continuation: bool,
}

impl Cell {
    pub fn new(ch: char) -> Self {
        Self {
            ch,
            attrs: CellAttributes::default(),
            is_continuation: false,
        }
    }

    pub fn with_attrs(ch: char, attrs: CellAttributes) -> Self {
        Self {
            ch,
            attrs,
            is_continuation: false,
        }
    }

    pub fn continuation(attrs: CellAttributes) -> Self {
        Self {
            ch: '\0',
            attrs,
            is_continuation: true,
        }
    }

    pub fn blank() -> Self {
        Self::new(' ')
    }

    /// Erase this cell to a blank carrying `attrs`, with color reset to
    /// default. Matches spec.md §4.2: erase operations preserve SGR
    /// attributes on the cleared cell except color.
    pub fn erased_with(attrs: CellAttributes) -> Self {
        let mut attrs = attrs;
        attrs.fg = Color::Default;
        attrs.bg = Color::Default;
        Self::with_attrs(' ', attrs)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

bitflags! {
    /// Terminal mode flags, per spec.md §3 "Mode Flags". Power-on values
    /// are constructed by `TerminalMode::initial`, not `Default` (autowrap's
    /// default is a `Config` knob, so it can't be baked into `Default`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct TerminalMode: u16 {
        const INSERT                = 0b0000_0000_0001;
        const ORIGIN                = 0b0000_0000_0010;
        const AUTOWRAP              = 0b0000_0000_0100;
        const CURSOR_VISIBLE        = 0b0000_0000_1000;
        const APPLICATION_KEYPAD    = 0b0000_0001_0000;
        const APPLICATION_CURSOR    = 0b0000_0010_0000;
        const BRACKETED_PASTE       = 0b0000_0100_0000;
        const MOUSE_TRACKING        = 0b0000_1000_0000;
        const ALTERNATE_SCREEN      = 0b0001_0000_0000;
    }
}

impl TerminalMode {
    /// Power-on mode set: cursor visible always; autowrap per config.
    pub fn initial(autowrap_default: bool) -> Self {
        let mut mode = TerminalMode::CURSOR_VISIBLE;
        if autowrap_default {
            mode.insert(TerminalMode::AUTOWRAP);
        }
        mode
    }
}

/// G0/G1 character set selector (spec.md §6: `ESC ( B` / `ESC ( 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphicCharset {
    Ascii,
    DecLineDrawing,
}

impl Default for GraphicCharset {
    fn default() -> Self {
        GraphicCharset::Ascii
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharsetSlot {
    G0,
    G1,
}

impl Default for CharsetSlot {
    fn default() -> Self {
        CharsetSlot::G0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharsetState {
    pub g0: GraphicCharset,
    pub g1: GraphicCharset,
    pub active: CharsetSlot,
}

impl CharsetState {
    /// The mapping currently in effect for PRINT.
    pub fn active_charset(&self) -> GraphicCharset {
        match self.active {
            CharsetSlot::G0 => self.g0,
            CharsetSlot::G1 => self.g1,
        }
    }

    /// Map a printed character through the active charset. DEC Special
    /// Graphics remaps the lowercase-letter range to line-drawing glyphs;
    /// everything else (and ASCII mode) passes through unchanged.
    pub fn map(&self, ch: char) -> char {
        if self.active_charset() == GraphicCharset::DecLineDrawing {
            dec_line_drawing(ch).unwrap_or(ch)
        } else {
            ch
        }
    }
}

fn dec_line_drawing(ch: char) -> Option<char> {
    let mapped = match ch {
        'j' => '\u{2518}', // bottom-right corner
        'k' => '\u{2510}', // top-right corner
        'l' => '\u{250c}', // top-left corner
        'm' => '\u{2514}', // bottom-left corner
        'n' => '\u{253c}', // crossing lines
        'q' => '\u{2500}', // horizontal line
        't' => '\u{251c}', // left tee
        'u' => '\u{2524}', // right tee
        'v' => '\u{2534}', // bottom tee
        'w' => '\u{252c}', // top tee
        'x' => '\u{2502}', // vertical line
        'a' => '\u{2592}', // checkerboard
        '`' => '\u{25c6}', // diamond
        _ => return None,
    };
    Some(mapped)
}
