use crate::buffer::{Scrollback, ScreenBuffer};
use crate::cursor::Cursor;
use crate::metrics::Metrics;
use crate::probe::ProbeRequest;
use termgrid_common::traits::{
    ControlEvent, CsiSequence, EraseMode, EscSequence, ModeParam, SgrParameter, TabClearMode,
};
use termgrid_common::types::{
    AttributeFlags, Cell, CellAttributes, CharsetSlot, Color, Position, ScrollRegion, Size,
    TerminalMode,
};
use tracing::debug;
use unicode_width::UnicodeWidthChar;

/// The DECSC/DECRC snapshot: cursor position, attributes, charset, and the
/// origin-mode flag (spec.md §4.4 "save/restore cursor"). One level deep —
/// a repeated save overwrites the previous snapshot, and restoring does not
/// consume it, matching how real terminals let a program DECRC repeatedly
/// off a single DECSC.
#[derive(Debug, Clone)]
struct SavedState {
    position: Position,
    attrs: CellAttributes,
    charset: termgrid_common::types::CharsetState,
    origin: bool,
}

/// Everything PRINT/control/CSI/ESC handling touches: the grid, the
/// scrollback, the cursor, mode flags, tab stops, the scroll region, the
/// DECSC/DECRC snapshot, and the alternate screen. Grounded in the source
/// project's `ansi.rs` `AnsiProcessor` dispatch, generalized from its
/// partial coverage to every operation spec.md §4.4 lists.
pub struct Screen {
    size: Size,
    buffer: ScreenBuffer,
    scrollback: Scrollback,
    cursor: Cursor,
    mode: TerminalMode,
    scroll_region: ScrollRegion,
    tab_stops: Vec<u16>,
    saved: Option<SavedState>,
    alternate: Option<(ScreenBuffer, Cursor)>,
}

impl Screen {
    pub fn new(size: Size, autowrap_default: bool, scrollback_cap: usize) -> Self {
        Self {
            size,
            buffer: ScreenBuffer::new(size),
            scrollback: Scrollback::new(scrollback_cap),
            cursor: Cursor::new(),
            mode: TerminalMode::initial(autowrap_default),
            scroll_region: ScrollRegion::full(size.rows),
            tab_stops: default_tab_stops(size.cols),
            saved: None,
            alternate: None,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn buffer(&self) -> &ScreenBuffer {
        &self.buffer
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_visible(&self) -> bool {
        self.mode.contains(TerminalMode::CURSOR_VISIBLE)
    }

    pub fn scrollback_len(&self) -> usize {
        self.scrollback.len()
    }

    pub fn set_scrollback_cap(&mut self, cap: usize) {
        self.scrollback.set_cap(cap);
    }

    pub fn resize(&mut self, new_size: Size) {
        self.buffer.resize(new_size, &mut self.scrollback);
        self.scroll_region = ScrollRegion::full(new_size.rows);
        self.tab_stops = default_tab_stops(new_size.cols);
        let pos = self.cursor.position();
        self.cursor.set_position(Position::new(
            pos.row.min(new_size.rows.saturating_sub(1)),
            pos.col.min(new_size.cols.saturating_sub(1)),
        ));
        self.cursor.set_pending_wrap(false);
        self.size = new_size;
    }

    // ---- PRINT --------------------------------------------------------

    pub fn print(&mut self, ch: char) {
        if self.size.rows == 0 || self.size.cols == 0 {
            return;
        }

        if self.cursor.pending_wrap() {
            if self.mode.contains(TerminalMode::AUTOWRAP) {
                self.cursor.set_pending_wrap(false);
                self.carriage_return();
                self.line_feed();
            } else {
                self.cursor.set_pending_wrap(false);
                // Autowrap may have been toggled off after the phantom
                // column was set; reclaim it so the write below stays
                // in bounds.
                let pos = self.cursor.position();
                if pos.col >= self.size.cols {
                    self.cursor.set_position(Position::new(pos.row, self.size.cols - 1));
                }
            }
        }

        let mapped = self.cursor.charset().map(ch);
        let width = UnicodeWidthChar::width(mapped).unwrap_or(1).max(1) as u16;
        let pos = self.cursor.position();
        let attrs = self.cursor.attrs();

        self.buffer.set_cell(pos, Cell::with_attrs(mapped, attrs));
        if width == 2 && pos.col + 1 < self.size.cols {
            self.buffer.set_cell(Position::new(pos.row, pos.col + 1), Cell::continuation(attrs));
        }

        let next_col = pos.col + width;
        if next_col >= self.size.cols {
            // With autowrap on, the column may sit one past the last real
            // column while the wrap is pending (spec.md §3), since the next
            // print resolves it via CR+LF before ever indexing the buffer.
            // With autowrap off there is no such resolution step, so the
            // cursor stays clamped to the last real column and next `print`
            // just overwrites it in place.
            let wrapped_col = if self.mode.contains(TerminalMode::AUTOWRAP) {
                next_col.min(self.size.cols)
            } else {
                self.size.cols - 1
            };
            self.cursor.set_position(Position::new(pos.row, wrapped_col));
            self.cursor.set_pending_wrap(true);
        } else {
            self.cursor.set_position(Position::new(pos.row, next_col));
        }
    }

    // ---- control characters --------------------------------------------

    pub fn control(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::NewLine | ControlEvent::VerticalTab | ControlEvent::FormFeed => {
                self.line_feed();
            }
            ControlEvent::CarriageReturn => self.carriage_return(),
            ControlEvent::Tab => self.tab(),
            ControlEvent::Backspace => self.backspace(),
            ControlEvent::Bell => debug!("bell"),
            ControlEvent::ShiftOut => self.cursor.charset_mut().active = CharsetSlot::G1,
            ControlEvent::ShiftIn => self.cursor.charset_mut().active = CharsetSlot::G0,
        }
    }

    fn line_feed(&mut self) {
        let region = self.scroll_region;
        let pos = self.cursor.position();
        if pos.row == region.bottom {
            self.buffer.scroll_up(region, 1, self.cursor.attrs(), &mut self.scrollback);
        } else if pos.row + 1 < self.size.rows {
            self.cursor.set_position(Position::new(pos.row + 1, pos.col));
        }
        self.cursor.set_pending_wrap(false);
    }

    fn reverse_index(&mut self) {
        let region = self.scroll_region;
        let pos = self.cursor.position();
        if pos.row == region.top {
            self.buffer.scroll_down(region, 1, self.cursor.attrs());
        } else if pos.row > 0 {
            self.cursor.set_position(Position::new(pos.row - 1, pos.col));
        }
        self.cursor.set_pending_wrap(false);
    }

    fn carriage_return(&mut self) {
        let pos = self.cursor.position();
        self.cursor.set_position(Position::new(pos.row, 0));
        self.cursor.set_pending_wrap(false);
    }

    fn tab(&mut self) {
        let pos = self.cursor.position();
        let next = self
            .tab_stops
            .iter()
            .copied()
            .find(|&stop| stop > pos.col)
            .unwrap_or(self.size.cols - 1);
        self.cursor.set_position(Position::new(pos.row, next));
        self.cursor.set_pending_wrap(false);
    }

    fn backspace(&mut self) {
        let pos = self.cursor.position();
        if pos.col > 0 {
            self.cursor.set_position(Position::new(pos.row, pos.col - 1));
        }
        self.cursor.set_pending_wrap(false);
    }

    // ---- CSI ------------------------------------------------------------

    /// Dispatch one parsed CSI sequence. Returns a `ProbeRequest` when the
    /// sequence is a query the caller must answer (spec.md §4.5); everything
    /// else is handled in place and returns `None`.
    pub fn csi(&mut self, seq: CsiSequence, metrics: &mut Metrics) -> Option<ProbeRequest> {
        match seq {
            CsiSequence::CursorUp(n) => self.cursor_up(n),
            CsiSequence::CursorDown(n) => self.cursor_down(n),
            CsiSequence::CursorForward(n) => self.cursor_forward(n),
            CsiSequence::CursorBack(n) => self.cursor_back(n),
            CsiSequence::CursorPosition { row, col } => self.cursor_position_abs(row, col),
            CsiSequence::CursorColumn(col) => self.cursor_column(col),
            CsiSequence::CursorRow(row) => self.cursor_row(row),
            CsiSequence::CursorNextLine(n) => {
                self.carriage_return();
                self.cursor_down(n);
            }
            CsiSequence::CursorPreviousLine(n) => {
                self.carriage_return();
                self.cursor_up(n);
            }

            CsiSequence::EraseDisplay(mode) => self.erase_display(mode),
            CsiSequence::EraseLine(mode) => self.erase_line(mode),
            CsiSequence::InsertLines(n) => self.insert_lines(n),
            CsiSequence::DeleteLines(n) => self.delete_lines(n),
            CsiSequence::InsertChars(n) => {
                let pos = self.cursor.position();
                self.buffer.insert_chars(pos.row, pos.col, n, self.cursor.attrs());
            }
            CsiSequence::DeleteChars(n) => {
                let pos = self.cursor.position();
                self.buffer.delete_chars(pos.row, pos.col, n, self.cursor.attrs());
            }
            CsiSequence::EraseChars(n) => {
                let pos = self.cursor.position();
                self.buffer.erase_chars(pos.row, pos.col, n, self.cursor.attrs());
            }
            CsiSequence::ScrollUp(n) => {
                self.buffer.scroll_up(self.scroll_region, n, self.cursor.attrs(), &mut self.scrollback);
            }
            CsiSequence::ScrollDown(n) => {
                self.buffer.scroll_down(self.scroll_region, n, self.cursor.attrs());
            }
            CsiSequence::SetScrollRegion { top, bottom } => self.set_scroll_region(top, bottom),

            CsiSequence::SetGraphicsRendition(params) => self.apply_sgr(params),

            CsiSequence::SetMode(modes) => self.set_modes(modes, true, metrics),
            CsiSequence::ResetMode(modes) => self.set_modes(modes, false, metrics),

            CsiSequence::DeviceStatusReport(param) => {
                return Some(ProbeRequest::DeviceStatusReport(param));
            }
            CsiSequence::DeviceAttributes { secondary } => {
                return Some(ProbeRequest::DeviceAttributes { secondary });
            }

            CsiSequence::TabClear(mode) => self.tab_clear(mode),

            CsiSequence::SaveCursor => self.save_cursor(),
            CsiSequence::RestoreCursor => self.restore_cursor(),
        }
        None
    }

    fn vertical_bounds(&self) -> (u16, u16) {
        if self.mode.contains(TerminalMode::ORIGIN) {
            (self.scroll_region.top, self.scroll_region.bottom)
        } else {
            (0, self.size.rows.saturating_sub(1))
        }
    }

    fn cursor_up(&mut self, n: u16) {
        let pos = self.cursor.position();
        let (top, _) = self.vertical_bounds();
        let row = pos.row.saturating_sub(n).max(top);
        self.cursor.set_position(Position::new(row, pos.col));
        self.cursor.set_pending_wrap(false);
    }

    fn cursor_down(&mut self, n: u16) {
        let pos = self.cursor.position();
        let (_, bottom) = self.vertical_bounds();
        let row = pos.row.saturating_add(n).min(bottom);
        self.cursor.set_position(Position::new(row, pos.col));
        self.cursor.set_pending_wrap(false);
    }

    fn cursor_forward(&mut self, n: u16) {
        let pos = self.cursor.position();
        let col = pos.col.saturating_add(n).min(self.size.cols.saturating_sub(1));
        self.cursor.set_position(Position::new(pos.row, col));
        self.cursor.set_pending_wrap(false);
    }

    fn cursor_back(&mut self, n: u16) {
        let pos = self.cursor.position();
        let col = pos.col.saturating_sub(n);
        self.cursor.set_position(Position::new(pos.row, col));
        self.cursor.set_pending_wrap(false);
    }

    fn cursor_position_abs(&mut self, row: u16, col: u16) {
        let col0 = row_col_to_zero(col).min(self.size.cols.saturating_sub(1));
        let row0 = row_col_to_zero(row);
        let final_row = if self.mode.contains(TerminalMode::ORIGIN) {
            (self.scroll_region.top + row0).min(self.scroll_region.bottom)
        } else {
            row0.min(self.size.rows.saturating_sub(1))
        };
        self.cursor.set_position(Position::new(final_row, col0));
        self.cursor.set_pending_wrap(false);
    }

    fn cursor_column(&mut self, col: u16) {
        let pos = self.cursor.position();
        let col0 = row_col_to_zero(col).min(self.size.cols.saturating_sub(1));
        self.cursor.set_position(Position::new(pos.row, col0));
        self.cursor.set_pending_wrap(false);
    }

    fn cursor_row(&mut self, row: u16) {
        let pos = self.cursor.position();
        let row0 = row_col_to_zero(row).min(self.size.rows.saturating_sub(1));
        self.cursor.set_position(Position::new(row0, pos.col));
        self.cursor.set_pending_wrap(false);
    }

    fn cursor_position_clamped(&self) -> Position {
        let pos = self.cursor.position();
        Position::new(
            pos.row.min(self.size.rows.saturating_sub(1)),
            pos.col.min(self.size.cols.saturating_sub(1)),
        )
    }

    fn erase_display(&mut self, mode: EraseMode) {
        let pos = self.cursor_position_clamped();
        let attrs = self.cursor.attrs();
        match mode {
            EraseMode::FromCursor => self.buffer.erase_from_cursor_to_end(pos, attrs),
            EraseMode::ToCursor => self.buffer.erase_from_start_to_cursor(pos, attrs),
            EraseMode::All => self.buffer.erase_all(attrs),
            EraseMode::AllAndScrollback => {
                self.buffer.erase_all(attrs);
                self.scrollback.clear();
            }
        }
    }

    fn erase_line(&mut self, mode: EraseMode) {
        let pos = self.cursor_position_clamped();
        let attrs = self.cursor.attrs();
        match mode {
            EraseMode::FromCursor => self.buffer.erase_line_from_cursor(pos.row, pos.col, attrs),
            EraseMode::ToCursor => self.buffer.erase_line_to_cursor(pos.row, pos.col, attrs),
            EraseMode::All | EraseMode::AllAndScrollback => self.buffer.erase_line_all(pos.row, attrs),
        }
    }

    fn insert_lines(&mut self, n: u16) {
        let pos = self.cursor.position();
        self.buffer.insert_lines(self.scroll_region, pos.row, n, self.cursor.attrs());
    }

    fn delete_lines(&mut self, n: u16) {
        let pos = self.cursor.position();
        self.buffer.delete_lines(self.scroll_region, pos.row, n, self.cursor.attrs());
    }

    fn set_scroll_region(&mut self, top: Option<u16>, bottom: Option<u16>) {
        let top0 = top.map(row_col_to_zero).unwrap_or(0);
        let bottom0 = bottom
            .map(row_col_to_zero)
            .unwrap_or(self.size.rows.saturating_sub(1))
            .min(self.size.rows.saturating_sub(1));
        self.scroll_region = if top0 <= bottom0 {
            ScrollRegion::new(top0, bottom0)
        } else {
            ScrollRegion::full(self.size.rows)
        };
        self.home();
    }

    fn home(&mut self) {
        let row = if self.mode.contains(TerminalMode::ORIGIN) {
            self.scroll_region.top
        } else {
            0
        };
        self.cursor.set_position(Position::new(row, 0));
        self.cursor.set_pending_wrap(false);
    }

    fn apply_sgr(&mut self, params: Vec<SgrParameter>) {
        let mut attrs = self.cursor.attrs();
        for param in params {
            match param {
                SgrParameter::Reset => attrs = CellAttributes::default(),
                SgrParameter::Bold => attrs.flags.insert(AttributeFlags::BOLD),
                SgrParameter::Faint => attrs.flags.insert(AttributeFlags::FAINT),
                SgrParameter::Italic => attrs.flags.insert(AttributeFlags::ITALIC),
                SgrParameter::Underline => attrs.flags.insert(AttributeFlags::UNDERLINE),
                SgrParameter::Blink => attrs.flags.insert(AttributeFlags::BLINK),
                SgrParameter::Reverse => attrs.flags.insert(AttributeFlags::REVERSE),
                SgrParameter::Invisible => attrs.flags.insert(AttributeFlags::INVISIBLE),
                SgrParameter::Strikethrough => attrs.flags.insert(AttributeFlags::STRIKETHROUGH),

                SgrParameter::NoBoldFaint => attrs.flags.remove(AttributeFlags::BOLD | AttributeFlags::FAINT),
                SgrParameter::NoItalic => attrs.flags.remove(AttributeFlags::ITALIC),
                SgrParameter::NoUnderline => attrs.flags.remove(AttributeFlags::UNDERLINE),
                SgrParameter::NoBlink => attrs.flags.remove(AttributeFlags::BLINK),
                SgrParameter::NoReverse => attrs.flags.remove(AttributeFlags::REVERSE),
                SgrParameter::NoInvisible => attrs.flags.remove(AttributeFlags::INVISIBLE),
                SgrParameter::NoStrikethrough => attrs.flags.remove(AttributeFlags::STRIKETHROUGH),

                SgrParameter::Foreground(color) => attrs.fg = color,
                SgrParameter::Background(color) => attrs.bg = color,
                SgrParameter::DefaultForeground => attrs.fg = Color::Default,
                SgrParameter::DefaultBackground => attrs.bg = Color::Default,
            }
        }
        self.cursor.set_attrs(attrs);
    }

    fn set_modes(&mut self, modes: Vec<ModeParam>, enable: bool, metrics: &mut Metrics) {
        for mode in modes {
            let bit = match mode {
                ModeParam::Insert => Some(TerminalMode::INSERT),
                ModeParam::ApplicationCursor => Some(TerminalMode::APPLICATION_CURSOR),
                ModeParam::AutoWrap => Some(TerminalMode::AUTOWRAP),
                ModeParam::OriginMode => Some(TerminalMode::ORIGIN),
                ModeParam::CursorVisible => Some(TerminalMode::CURSOR_VISIBLE),
                ModeParam::ApplicationKeypad => Some(TerminalMode::APPLICATION_KEYPAD),
                ModeParam::BracketedPaste => Some(TerminalMode::BRACKETED_PASTE),
                ModeParam::MouseTracking => Some(TerminalMode::MOUSE_TRACKING),
                ModeParam::AlternateScreen => {
                    if enable {
                        self.enable_alternate_screen();
                    } else {
                        self.disable_alternate_screen();
                    }
                    None
                }
                ModeParam::Unknown(code) => {
                    debug!("unknown mode code: {}", code);
                    metrics.unknown_mode += 1;
                    None
                }
            };
            if let Some(bit) = bit {
                if enable {
                    self.mode.insert(bit);
                } else {
                    self.mode.remove(bit);
                }
            }
        }
    }

    fn tab_clear(&mut self, mode: TabClearMode) {
        match mode {
            TabClearMode::CurrentColumn => {
                let col = self.cursor.position().col;
                self.tab_stops.retain(|&stop| stop != col);
            }
            TabClearMode::All => self.tab_stops.clear(),
        }
    }

    fn save_cursor(&mut self) {
        self.saved = Some(SavedState {
            position: self.cursor.position(),
            attrs: self.cursor.attrs(),
            charset: self.cursor.charset(),
            origin: self.mode.contains(TerminalMode::ORIGIN),
        });
    }

    fn restore_cursor(&mut self) {
        let Some(saved) = self.saved.clone() else { return };
        self.cursor.set_position(saved.position);
        self.cursor.set_attrs(saved.attrs);
        *self.cursor.charset_mut() = saved.charset;
        if saved.origin {
            self.mode.insert(TerminalMode::ORIGIN);
        } else {
            self.mode.remove(TerminalMode::ORIGIN);
        }
        self.cursor.set_pending_wrap(false);
    }

    fn enable_alternate_screen(&mut self) {
        if self.alternate.is_some() {
            return;
        }
        let main_buffer = std::mem::replace(&mut self.buffer, ScreenBuffer::new(self.size));
        let main_cursor = std::mem::replace(&mut self.cursor, Cursor::new());
        self.alternate = Some((main_buffer, main_cursor));
        self.mode.insert(TerminalMode::ALTERNATE_SCREEN);
    }

    fn disable_alternate_screen(&mut self) {
        if let Some((main_buffer, main_cursor)) = self.alternate.take() {
            self.buffer = main_buffer;
            self.cursor = main_cursor;
            self.mode.remove(TerminalMode::ALTERNATE_SCREEN);
        }
    }

    // ---- ESC --------------------------------------------------------------

    /// Dispatch one parsed ESC sequence. Returns a `ProbeRequest` for DECID
    /// (spec.md §6 ESC `Z`, the legacy alias for primary DA); everything else
    /// is handled in place and returns `None`.
    pub fn esc(&mut self, seq: EscSequence) -> Option<ProbeRequest> {
        match seq {
            EscSequence::Index => self.line_feed(),
            EscSequence::NextLine => {
                self.carriage_return();
                self.line_feed();
            }
            EscSequence::TabSet => {
                let col = self.cursor.position().col;
                if !self.tab_stops.contains(&col) {
                    self.tab_stops.push(col);
                    self.tab_stops.sort_unstable();
                }
            }
            EscSequence::ReverseIndex => self.reverse_index(),
            EscSequence::KeypadApplicationMode => {
                self.mode.insert(TerminalMode::APPLICATION_KEYPAD);
            }
            EscSequence::KeypadNumericMode => {
                self.mode.remove(TerminalMode::APPLICATION_KEYPAD);
            }
            EscSequence::SaveCursor => self.save_cursor(),
            EscSequence::RestoreCursor => self.restore_cursor(),
            EscSequence::Reset => self.reset(),
            EscSequence::SelectCharset { slot, charset } => {
                let state = self.cursor.charset_mut();
                match slot {
                    CharsetSlot::G0 => state.g0 = charset,
                    CharsetSlot::G1 => state.g1 = charset,
                }
            }
            EscSequence::ScreenAlignmentTest => self.buffer.fill_all('E'),
            EscSequence::Identify => return Some(ProbeRequest::DeviceAttributes { secondary: false }),
        }
        None
    }

    fn reset(&mut self) {
        let autowrap = self.mode.contains(TerminalMode::AUTOWRAP);
        let cap = self.scrollback.cap();
        *self = Screen::new(self.size, autowrap, cap);
    }
}

fn row_col_to_zero(value: u16) -> u16 {
    value.saturating_sub(1)
}

fn default_tab_stops(cols: u16) -> Vec<u16> {
    (0..cols).step_by(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use termgrid_common::traits::SgrParameter;

    fn screen() -> Screen {
        Screen::new(Size::new(5, 10), true, 100)
    }

    #[test]
    fn autowrap_sets_pending_wrap_then_wraps_on_next_print() {
        let mut s = screen();
        for ch in "1234567890".chars() {
            s.print(ch);
        }
        assert_eq!(s.cursor().position(), Position::new(0, 10));
        assert!(s.cursor().pending_wrap());
        s.print('X');
        assert_eq!(s.cursor().position(), Position::new(1, 1));
        assert_eq!(s.buffer().row(1)[0].ch, 'X');
    }

    #[test]
    fn autowrap_disabled_overwrites_last_column() {
        let mut s = screen();
        let mut metrics = Metrics::new();
        s.csi(
            CsiSequence::ResetMode(vec![ModeParam::AutoWrap]),
            &mut metrics,
        );
        for ch in "1234567890".chars() {
            s.print(ch);
        }
        s.print('X');
        assert_eq!(s.cursor().position(), Position::new(0, 9));
        assert_eq!(s.buffer().row(0)[9].ch, 'X');
    }

    #[test]
    fn origin_mode_biases_cup_by_scroll_region_top() {
        let mut s = screen();
        let mut metrics = Metrics::new();
        s.csi(
            CsiSequence::SetScrollRegion { top: Some(3), bottom: Some(5) },
            &mut metrics,
        );
        s.csi(CsiSequence::SetMode(vec![ModeParam::OriginMode]), &mut metrics);
        s.csi(CsiSequence::CursorPosition { row: 1, col: 1 }, &mut metrics);
        assert_eq!(s.cursor().position(), Position::new(2, 0));
    }

    #[test]
    fn scroll_region_bounded_il_dl() {
        let mut s = screen();
        let mut metrics = Metrics::new();
        s.csi(
            CsiSequence::SetScrollRegion { top: Some(2), bottom: Some(4) },
            &mut metrics,
        );
        s.csi(CsiSequence::CursorPosition { row: 2, col: 1 }, &mut metrics);
        s.print('A');
        s.csi(CsiSequence::CursorPosition { row: 2, col: 1 }, &mut metrics);
        s.csi(CsiSequence::InsertLines(1), &mut metrics);
        assert_eq!(s.buffer().row(1)[0].ch, ' ');
    }

    #[test]
    fn decsc_decrc_round_trip() {
        let mut s = screen();
        let mut metrics = Metrics::new();
        s.csi(CsiSequence::CursorPosition { row: 2, col: 3 }, &mut metrics);
        s.csi(
            CsiSequence::SetGraphicsRendition(vec![SgrParameter::Bold]),
            &mut metrics,
        );
        s.csi(CsiSequence::SaveCursor, &mut metrics);
        s.csi(CsiSequence::CursorPosition { row: 4, col: 4 }, &mut metrics);
        s.csi(
            CsiSequence::SetGraphicsRendition(vec![SgrParameter::Reset]),
            &mut metrics,
        );
        s.csi(CsiSequence::RestoreCursor, &mut metrics);
        assert_eq!(s.cursor().position(), Position::new(1, 2));
        assert!(s
            .cursor()
            .attrs()
            .flags
            .contains(termgrid_common::types::AttributeFlags::BOLD));
    }

    #[test]
    fn alternate_screen_round_trip() {
        let mut s = screen();
        let mut metrics = Metrics::new();
        s.print('A');
        s.csi(
            CsiSequence::SetMode(vec![ModeParam::AlternateScreen]),
            &mut metrics,
        );
        assert_eq!(s.buffer().row(0)[0].ch, ' ');
        s.print('B');
        s.csi(
            CsiSequence::ResetMode(vec![ModeParam::AlternateScreen]),
            &mut metrics,
        );
        assert_eq!(s.buffer().row(0)[0].ch, 'A');
    }

    #[test]
    fn decaln_fills_grid_with_e() {
        let mut s = screen();
        s.esc(EscSequence::ScreenAlignmentTest);
        assert_eq!(s.buffer().row(0)[0].ch, 'E');
        assert_eq!(s.buffer().row(4)[9].ch, 'E');
    }

    #[test]
    fn shift_out_switches_to_g1_line_drawing() {
        let mut s = screen();
        s.esc(EscSequence::SelectCharset {
            slot: CharsetSlot::G1,
            charset: termgrid_common::types::GraphicCharset::DecLineDrawing,
        });
        s.control(ControlEvent::ShiftOut);
        s.print('q');
        assert_eq!(s.buffer().row(0)[0].ch, '─');
        s.control(ControlEvent::ShiftIn);
        s.print('q');
        assert_eq!(s.buffer().row(0)[1].ch, 'q');
    }

    #[test]
    fn decid_requests_primary_device_attributes() {
        let mut s = screen();
        let request = s.esc(EscSequence::Identify);
        assert!(matches!(
            request,
            Some(ProbeRequest::DeviceAttributes { secondary: false })
        ));
    }

    #[test]
    fn unknown_mode_is_counted() {
        let mut s = screen();
        let mut metrics = Metrics::new();
        s.csi(CsiSequence::SetMode(vec![ModeParam::Unknown(9999)]), &mut metrics);
        assert_eq!(metrics.unknown_mode, 1);
    }
}
