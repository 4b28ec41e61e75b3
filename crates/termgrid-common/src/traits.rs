use crate::error::Result;
use crate::types::{Color, Size};
use async_trait::async_trait;

/// PTY lifecycle, named in spec.md §6 as an external collaborator. The
/// core never implements this: it is the seam a PTY-owning embedding
/// (see `termgrid-cli`) fills in.
#[async_trait]
pub trait TerminalBackend: Send + Sync {
    async fn write(&mut self, data: &[u8]) -> Result<usize>;
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
    async fn resize(&mut self, size: Size) -> Result<()>;
    async fn is_alive(&self) -> bool;
}

/// Byte-stream-to-event translation, implemented by `termgrid-parser`.
pub trait TerminalParser: Send + Sync {
    fn parse(&mut self, data: &[u8]) -> Vec<ParsedEvent>;
}

/// Events produced by the escape-sequence parser and consumed by the
/// screen command handlers. One variant per spec.md §4.3 category; the
/// handler side matches exhaustively (spec.md §9: "closed set, tagged
/// dispatch").
#[derive(Debug, Clone)]
pub enum ParsedEvent {
    Print(char),
    Control(ControlEvent),
    Csi(CsiSequence),
    Osc(OscSequence),
    Esc(EscSequence),
    /// A CSI sequence with a final byte outside the recognized set
    /// (spec.md §7 `UnknownCsiFinal`). Carries no payload; the core only
    /// needs to count it.
    UnrecognizedCsi,
    /// A CSI or ESC sequence `vte` flagged as malformed (too many
    /// parameters, an invalid intermediate byte) and discarded before a
    /// final byte was even reached (spec.md §7 `MalformedEscape`).
    MalformedEscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    NewLine,
    CarriageReturn,
    Tab,
    Backspace,
    Bell,
    FormFeed,
    VerticalTab,
    /// SO (0x0E): make G1 the active charset slot.
    ShiftOut,
    /// SI (0x0F): make G0 the active charset slot.
    ShiftIn,
}

/// Control Sequence Introducer (CSI) sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum CsiSequence {
    CursorUp(u16),
    CursorDown(u16),
    CursorForward(u16),
    CursorBack(u16),
    CursorPosition { row: u16, col: u16 },
    CursorColumn(u16),
    CursorRow(u16),
    CursorNextLine(u16),
    CursorPreviousLine(u16),

    EraseDisplay(EraseMode),
    EraseLine(EraseMode),
    InsertLines(u16),
    DeleteLines(u16),
    InsertChars(u16),
    DeleteChars(u16),
    EraseChars(u16),
    ScrollUp(u16),
    ScrollDown(u16),
    SetScrollRegion { top: Option<u16>, bottom: Option<u16> },

    SetGraphicsRendition(Vec<SgrParameter>),

    SetMode(Vec<ModeParam>),
    ResetMode(Vec<ModeParam>),

    DeviceStatusReport(u16),
    DeviceAttributes { secondary: bool },

    TabClear(TabClearMode),

    SaveCursor,
    RestoreCursor,
}

/// Operating System Command (OSC) sequences. Only the title-setting OSCs
/// are recognized by this implementation (spec.md §4.3: "all others
/// ignored safely").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OscSequence {
    SetTitle(String),
}

/// ESC sequences without a CSI introducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscSequence {
    Index,
    NextLine,
    TabSet,
    ReverseIndex,
    KeypadApplicationMode,
    KeypadNumericMode,
    SaveCursor,
    RestoreCursor,
    Reset,
    SelectCharset { slot: crate::types::CharsetSlot, charset: crate::types::GraphicCharset },
    ScreenAlignmentTest,
    /// DECID, the legacy alias for primary DA (spec.md §6 ESC single-char `Z`).
    Identify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseMode {
    FromCursor,
    ToCursor,
    All,
    AllAndScrollback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabClearMode {
    CurrentColumn,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgrParameter {
    Reset,
    Bold,
    Faint,
    Italic,
    Underline,
    Blink,
    Reverse,
    Invisible,
    Strikethrough,

    NoBoldFaint,
    NoItalic,
    NoUnderline,
    NoBlink,
    NoReverse,
    NoInvisible,
    NoStrikethrough,

    Foreground(Color),
    Background(Color),
    DefaultForeground,
    DefaultBackground,
}

/// A mode addressed by SM/RM (ANSI) or DECSET/DECRST (DEC private). Modes
/// outside this set are preserved as `Unknown(code)` so they can be
/// counted without aborting (spec.md §7: `UnknownMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeParam {
    Insert,
    ApplicationCursor,
    AutoWrap,
    OriginMode,
    CursorVisible,
    ApplicationKeypad,
    AlternateScreen,
    BracketedPaste,
    MouseTracking,
    Unknown(u16),
}
