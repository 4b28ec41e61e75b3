use termgrid_common::traits::{
    ControlEvent, CsiSequence, EraseMode, EscSequence, ModeParam, OscSequence, ParsedEvent,
    SgrParameter, TabClearMode, TerminalParser,
};
use termgrid_common::types::{CharsetSlot, Color, GraphicCharset};
use tracing::{debug, trace};
use vte::{Params, Parser, Perform};

/// `vte`-based escape-sequence parser (spec.md §4.3). The state machine
/// itself is `vte::Parser` — the published VT500-series transition table —
/// so this crate only needs to translate `Perform` callbacks into
/// `ParsedEvent`s. `vte` also owns the incremental UTF-8 decode with
/// replacement-character recovery on ill-formed input, so malformed bytes
/// never desync the parser here.
pub struct EscapeParser {
    parser: Parser,
    performer: TerminalPerformer,
}

impl EscapeParser {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            performer: TerminalPerformer::new(),
        }
    }
}

impl TerminalParser for EscapeParser {
    fn parse(&mut self, data: &[u8]) -> Vec<ParsedEvent> {
        self.performer.events.clear();
        for &byte in data {
            self.parser.advance(&mut self.performer, byte);
        }
        std::mem::take(&mut self.performer.events)
    }
}

impl Default for EscapeParser {
    fn default() -> Self {
        Self::new()
    }
}

struct TerminalPerformer {
    events: Vec<ParsedEvent>,
}

impl TerminalPerformer {
    fn new() -> Self {
        Self { events: Vec::new() }
    }

    fn get_param(&self, params: &Params, index: usize, default: u16) -> u16 {
        params
            .iter()
            .nth(index)
            .map(|p| p[0])
            .filter(|&v| v > 0)
            .unwrap_or(default)
    }

    /// Like `get_param` but distinguishes "absent" from "present and zero",
    /// needed by DECSTBM where an explicit 0 and an omitted parameter both
    /// mean "use the default edge".
    fn get_param_opt(&self, params: &Params, index: usize) -> Option<u16> {
        params.iter().nth(index).map(|p| p[0]).filter(|&v| v > 0)
    }

    fn parse_sgr_params(&self, params: &Params) -> Vec<SgrParameter> {
        let mut out = Vec::new();
        let values: Vec<i64> = params.iter().map(|p| p[0] as i64).collect();
        if values.is_empty() {
            out.push(SgrParameter::Reset);
            return out;
        }

        let mut i = 0;
        while i < values.len() {
            let param = values[i].max(0) as u32;
            match param {
                0 => out.push(SgrParameter::Reset),
                1 => out.push(SgrParameter::Bold),
                2 => out.push(SgrParameter::Faint),
                3 => out.push(SgrParameter::Italic),
                4 => out.push(SgrParameter::Underline),
                5 => out.push(SgrParameter::Blink),
                7 => out.push(SgrParameter::Reverse),
                8 => out.push(SgrParameter::Invisible),
                9 => out.push(SgrParameter::Strikethrough),

                22 => out.push(SgrParameter::NoBoldFaint),
                23 => out.push(SgrParameter::NoItalic),
                24 => out.push(SgrParameter::NoUnderline),
                25 => out.push(SgrParameter::NoBlink),
                27 => out.push(SgrParameter::NoReverse),
                28 => out.push(SgrParameter::NoInvisible),
                29 => out.push(SgrParameter::NoStrikethrough),

                30..=37 => out.push(SgrParameter::Foreground(Color::from_ansi((param - 30) as u8))),
                38 => {
                    if let Some((color, skip)) = self.parse_extended_color(&values, i) {
                        out.push(SgrParameter::Foreground(color));
                        i += skip;
                    }
                }
                39 => out.push(SgrParameter::DefaultForeground),

                40..=47 => out.push(SgrParameter::Background(Color::from_ansi((param - 40) as u8))),
                48 => {
                    if let Some((color, skip)) = self.parse_extended_color(&values, i) {
                        out.push(SgrParameter::Background(color));
                        i += skip;
                    }
                }
                49 => out.push(SgrParameter::DefaultBackground),

                90..=97 => out.push(SgrParameter::Foreground(Color::from_ansi((param - 90 + 8) as u8))),
                100..=107 => out.push(SgrParameter::Background(Color::from_ansi((param - 100 + 8) as u8))),

                other => debug!("unhandled SGR parameter: {}", other),
            }
            i += 1;
        }

        out
    }

    /// Parse `38;5;n` / `38;2;r;g;b` (and the `48;...` background twins)
    /// starting at index `i`, which points at the `38`/`48` itself. Returns
    /// the decoded color and how many extra entries it consumed.
    fn parse_extended_color(&self, values: &[i64], i: usize) -> Option<(Color, usize)> {
        match values.get(i + 1).copied() {
            Some(5) if values.len() > i + 2 => {
                Some((Color::Indexed(values[i + 2].clamp(0, 255) as u8), 2))
            }
            Some(2) if values.len() > i + 4 => {
                let r = values[i + 2].clamp(0, 255) as u8;
                let g = values[i + 3].clamp(0, 255) as u8;
                let b = values[i + 4].clamp(0, 255) as u8;
                Some((Color::Rgb(r, g, b), 4))
            }
            _ => None,
        }
    }

    fn parse_modes(&self, params: &Params, private: bool) -> Vec<ModeParam> {
        params
            .iter()
            .map(|p| {
                let code = p[0];
                if private {
                    match code {
                        1 => ModeParam::ApplicationCursor,
                        6 => ModeParam::OriginMode,
                        7 => ModeParam::AutoWrap,
                        25 => ModeParam::CursorVisible,
                        1000 | 1002 | 1006 => ModeParam::MouseTracking,
                        2004 => ModeParam::BracketedPaste,
                        1049 => ModeParam::AlternateScreen,
                        other => ModeParam::Unknown(other),
                    }
                } else {
                    match code {
                        4 => ModeParam::Insert,
                        other => ModeParam::Unknown(other),
                    }
                }
            })
            .collect()
    }
}

impl Perform for TerminalPerformer {
    fn print(&mut self, c: char) {
        trace!("print {:?}", c);
        self.events.push(ParsedEvent::Print(c));
    }

    fn execute(&mut self, byte: u8) {
        trace!("execute 0x{:02x}", byte);
        let control = match byte {
            0x00 | 0x7F => return,
            0x07 => ControlEvent::Bell,
            0x08 => ControlEvent::Backspace,
            0x09 => ControlEvent::Tab,
            0x0A => ControlEvent::NewLine,
            0x0B => ControlEvent::VerticalTab,
            0x0C => ControlEvent::FormFeed,
            0x0D => ControlEvent::CarriageReturn,
            0x0E => ControlEvent::ShiftOut,
            0x0F => ControlEvent::ShiftIn,
            _ => {
                debug!("unhandled C0/C1 byte: 0x{:02x}", byte);
                return;
            }
        };
        self.events.push(ParsedEvent::Control(control));
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {
        // DCS strings are absorbed and ignored; no recognized sequence needs one.
    }

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
        if params.is_empty() {
            return;
        }
        let osc_num = std::str::from_utf8(params[0]).ok().and_then(|s| s.parse::<u32>().ok());
        match osc_num {
            Some(0) | Some(2) => {
                if let Some(raw) = params.get(1) {
                    if let Ok(title) = std::str::from_utf8(raw) {
                        self.events.push(ParsedEvent::Osc(OscSequence::SetTitle(title.to_string())));
                    }
                }
            }
            other => debug!("unhandled OSC sequence: {:?}", other),
        }
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], ignore: bool, action: char) {
        trace!(
            "CSI params={:?} intermediates={:?} action={}",
            params.iter().collect::<Vec<_>>(),
            intermediates,
            action
        );
        if ignore {
            self.events.push(ParsedEvent::MalformedEscape);
            return;
        }

        let private = intermediates == b"?";
        let event = match action {
            'A' => Some(CsiSequence::CursorUp(self.get_param(params, 0, 1))),
            'B' => Some(CsiSequence::CursorDown(self.get_param(params, 0, 1))),
            'C' => Some(CsiSequence::CursorForward(self.get_param(params, 0, 1))),
            'D' => Some(CsiSequence::CursorBack(self.get_param(params, 0, 1))),
            'E' => Some(CsiSequence::CursorNextLine(self.get_param(params, 0, 1))),
            'F' => Some(CsiSequence::CursorPreviousLine(self.get_param(params, 0, 1))),
            'G' => Some(CsiSequence::CursorColumn(self.get_param(params, 0, 1))),
            'd' => Some(CsiSequence::CursorRow(self.get_param(params, 0, 1))),
            'H' | 'f' => Some(CsiSequence::CursorPosition {
                row: self.get_param(params, 0, 1),
                col: self.get_param(params, 1, 1),
            }),

            'J' => Some(CsiSequence::EraseDisplay(erase_mode(self.get_param(params, 0, 0)))),
            'K' => Some(CsiSequence::EraseLine(erase_mode(self.get_param(params, 0, 0)))),
            'X' => Some(CsiSequence::EraseChars(self.get_param(params, 0, 1))),
            'L' => Some(CsiSequence::InsertLines(self.get_param(params, 0, 1))),
            'M' => Some(CsiSequence::DeleteLines(self.get_param(params, 0, 1))),
            '@' => Some(CsiSequence::InsertChars(self.get_param(params, 0, 1))),
            'P' => Some(CsiSequence::DeleteChars(self.get_param(params, 0, 1))),
            'S' => Some(CsiSequence::ScrollUp(self.get_param(params, 0, 1))),
            'T' => Some(CsiSequence::ScrollDown(self.get_param(params, 0, 1))),
            'r' => Some(CsiSequence::SetScrollRegion {
                top: self.get_param_opt(params, 0),
                bottom: self.get_param_opt(params, 1),
            }),

            'm' => Some(CsiSequence::SetGraphicsRendition(self.parse_sgr_params(params))),

            'h' => Some(CsiSequence::SetMode(self.parse_modes(params, private))),
            'l' => Some(CsiSequence::ResetMode(self.parse_modes(params, private))),

            'n' => Some(CsiSequence::DeviceStatusReport(self.get_param(params, 0, 0))),
            'c' => Some(CsiSequence::DeviceAttributes {
                secondary: intermediates == b">",
            }),

            'g' => {
                let mode = match self.get_param(params, 0, 0) {
                    3 => TabClearMode::All,
                    _ => TabClearMode::CurrentColumn,
                };
                Some(CsiSequence::TabClear(mode))
            }

            's' => Some(CsiSequence::SaveCursor),
            'u' => Some(CsiSequence::RestoreCursor),

            other => {
                debug!("unhandled CSI final byte: {}", other);
                self.events.push(ParsedEvent::UnrecognizedCsi);
                None
            }
        };

        if let Some(event) = event {
            self.events.push(ParsedEvent::Csi(event));
        }
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], ignore: bool, byte: u8) {
        trace!("ESC intermediates={:?} byte=0x{:02x}", intermediates, byte);
        if ignore {
            self.events.push(ParsedEvent::MalformedEscape);
            return;
        }

        let event = match (intermediates, byte) {
            (b"", b'D') => Some(EscSequence::Index),
            (b"", b'E') => Some(EscSequence::NextLine),
            (b"", b'H') => Some(EscSequence::TabSet),
            (b"", b'M') => Some(EscSequence::ReverseIndex),
            (b"", b'c') => Some(EscSequence::Reset),
            (b"", b'7') => Some(EscSequence::SaveCursor),
            (b"", b'8') => Some(EscSequence::RestoreCursor),
            (b"", b'=') => Some(EscSequence::KeypadApplicationMode),
            (b"", b'>') => Some(EscSequence::KeypadNumericMode),
            (b"#", b'8') => Some(EscSequence::ScreenAlignmentTest),
            (b"(", b'B') => Some(EscSequence::SelectCharset {
                slot: CharsetSlot::G0,
                charset: GraphicCharset::Ascii,
            }),
            (b"(", b'0') => Some(EscSequence::SelectCharset {
                slot: CharsetSlot::G0,
                charset: GraphicCharset::DecLineDrawing,
            }),
            (b")", b'B') => Some(EscSequence::SelectCharset {
                slot: CharsetSlot::G1,
                charset: GraphicCharset::Ascii,
            }),
            (b")", b'0') => Some(EscSequence::SelectCharset {
                slot: CharsetSlot::G1,
                charset: GraphicCharset::DecLineDrawing,
            }),
            (b"", b'Z') => Some(EscSequence::Identify),
            _ => {
                debug!(
                    "unhandled ESC sequence: intermediates={:?} byte=0x{:02x}",
                    intermediates, byte
                );
                None
            }
        };

        if let Some(event) = event {
            self.events.push(ParsedEvent::Esc(event));
        }
    }
}

fn erase_mode(param: u16) -> EraseMode {
    match param {
        1 => EraseMode::ToCursor,
        2 => EraseMode::All,
        3 => EraseMode::AllAndScrollback,
        _ => EraseMode::FromCursor,
    }
}
