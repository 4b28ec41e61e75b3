pub mod buffer;
pub mod config;
pub mod cursor;
pub mod frame;
pub mod metrics;
pub mod probe;
pub mod resolver;
pub mod screen;

use config::Config;
use frame::{Frame, FrameCell};
use metrics::Metrics;
use probe::ProbeRequest;
use resolver::CursorResolver;
use screen::Screen;
use termgrid_common::error::{Result, TermGridError};
use termgrid_common::traits::{ParsedEvent, TerminalParser};
use termgrid_common::types::Size;
use termgrid_parser::EscapeParser;
use tracing::{debug, instrument, trace};

/// The whole terminal-emulation core (spec.md §6): feed it raw PTY bytes,
/// pull a `Frame` snapshot whenever a consumer wants to redraw. Synchronous
/// and allocation-light on the hot `feed` path — no PTY, no async runtime,
/// no rendering live here (spec.md §5); those are `termgrid-cli`'s job.
pub struct Terminal {
    screen: Screen,
    parser: EscapeParser,
    config: Config,
    metrics: Metrics,
    generation: u64,
}

impl Terminal {
    pub fn new(config: Config) -> Self {
        let size = Size::new(config.data.rows, config.data.cols);
        let screen = Screen::new(size, config.data.autowrap_default, config.data.scrollback_cap);
        Self {
            screen,
            parser: EscapeParser::new(),
            config,
            metrics: Metrics::new(),
            generation: 0,
        }
    }

    /// Parse and apply a chunk of raw terminal output. Chunk boundaries
    /// never change the result (spec.md §8 "chunking invariance") — the
    /// parser carries no state across calls except what `vte`'s own
    /// incremental UTF-8 decode needs.
    #[instrument(skip(self, data), fields(len = data.len()))]
    pub fn feed(&mut self, data: &[u8]) {
        let events = self.parser.parse(data);
        if events.is_empty() {
            return;
        }
        for event in events {
            self.apply(event);
        }
        self.generation += 1;
    }

    fn apply(&mut self, event: ParsedEvent) {
        match event {
            ParsedEvent::Print(ch) => {
                if ch == '\u{FFFD}' {
                    self.metrics.malformed_utf8 += 1;
                }
                self.screen.print(ch);
            }
            ParsedEvent::Control(control) => self.screen.control(control),
            ParsedEvent::Csi(csi) => {
                if let Some(request) = self.screen.csi(csi, &mut self.metrics) {
                    self.respond(request);
                }
            }
            ParsedEvent::Esc(esc) => {
                if let Some(request) = self.screen.esc(esc) {
                    self.respond(request);
                }
            }
            ParsedEvent::Osc(termgrid_common::traits::OscSequence::SetTitle(title)) => {
                if let Some(sink) = self.config.osc_title_sink.as_mut() {
                    sink(title);
                }
            }
            ParsedEvent::UnrecognizedCsi => {
                debug!("unrecognized CSI final byte");
                self.metrics.unknown_csi_final += 1;
            }
            ParsedEvent::MalformedEscape => {
                debug!("malformed escape sequence");
                self.metrics.malformed_escape += 1;
            }
        }
    }

    fn respond(&mut self, request: ProbeRequest) {
        let bytes = match request {
            ProbeRequest::DeviceStatusReport(param) => {
                probe::device_status_report(param, self.screen.cursor().position())
            }
            ProbeRequest::DeviceAttributes { secondary } => {
                Some(probe::device_attributes(secondary, &self.config.data.probe_responses))
            }
        };
        let Some(bytes) = bytes else { return };
        trace!(?bytes, "probe response");
        match self.config.outbound_sink.as_mut() {
            Some(sink) => {
                if !sink(&bytes) {
                    self.metrics.response_sink_full += 1;
                }
            }
            None => self.metrics.response_sink_full += 1,
        }
    }

    /// A read-only snapshot of the current screen: per-cell glyph, color,
    /// and attributes, plus the resolved visual caret (spec.md §4.7).
    pub fn snapshot(&self) -> Frame {
        let size = self.screen.size();
        let buffer = self.screen.buffer();
        let rows = (0..size.rows)
            .map(|row| {
                buffer
                    .row(row)
                    .iter()
                    .map(|cell| FrameCell {
                        ch: cell.ch,
                        fg: cell.attrs.fg,
                        bg: cell.attrs.bg,
                        attrs: cell.attrs.flags,
                    })
                    .collect()
            })
            .collect();

        let caret = CursorResolver::resolve(
            buffer,
            self.screen.cursor(),
            &self.config.data.visual_cursor_rules,
            &self.config.data.prompt_markers,
        );

        Frame {
            rows,
            caret_row: caret.row,
            caret_col: caret.col,
            caret_visible: self.screen.cursor_visible(),
            generation: self.generation,
        }
    }

    /// Resize the grid. Rejects degenerate sizes outright rather than
    /// silently clamping (spec.md §7 `ResizeTooSmall`).
    pub fn resize(&mut self, rows: u16, cols: u16) -> Result<()> {
        if rows == 0 || cols == 0 {
            self.metrics.resize_too_small += 1;
            return Err(TermGridError::ResizeTooSmall { rows, cols });
        }
        self.screen.resize(Size::new(rows, cols));
        self.generation += 1;
        Ok(())
    }

    pub fn set_scrollback_cap(&mut self, n: usize) {
        self.screen.set_scrollback_cap(n);
    }

    pub fn scrollback_len(&self) -> usize {
        self.screen.scrollback_len()
    }

    pub fn cursor_visible(&self) -> bool {
        self.screen.cursor_visible()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn size(&self) -> Size {
        self.screen.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::ConfigData;

    fn terminal(rows: u16, cols: u16) -> Terminal {
        let data = ConfigData {
            rows,
            cols,
            ..ConfigData::default()
        };
        Terminal::new(Config::new(data))
    }

    #[test]
    fn hello_wrap_on_narrow_screen() {
        let mut term = terminal(3, 5);
        term.feed(b"HelloWorld");
        let frame = term.snapshot();
        let row0: String = frame.row(0).iter().map(|c| c.ch).collect();
        let row1: String = frame.row(1).iter().map(|c| c.ch).collect();
        assert_eq!(row0, "Hello");
        assert_eq!(row1, "World");
    }

    #[test]
    fn dsr_reply_is_exact() {
        let mut term = terminal(24, 80);
        let replies = std::rc::Rc::new(std::cell::RefCell::new(Vec::<u8>::new()));
        let replies_clone = replies.clone();
        term.config.outbound_sink = Some(Box::new(move |bytes| {
            replies_clone.borrow_mut().extend_from_slice(bytes);
            true
        }));
        term.feed(b"\x1b[10;5H\x1b[6n");
        assert_eq!(&*replies.borrow(), b"\x1b[10;5R");
    }

    #[test]
    fn scroll_into_scrollback_respects_cap() {
        let mut term = terminal(3, 5);
        term.set_scrollback_cap(2);
        for i in 0..10u8 {
            term.feed(format!("{}\r\n", i).as_bytes());
        }
        assert_eq!(term.scrollback_len(), 2);
    }

    #[test]
    fn alternate_screen_round_trip_end_to_end() {
        let mut term = terminal(3, 5);
        term.feed(b"main");
        let before = term.snapshot();
        term.feed(b"\x1b[?1049h");
        term.feed(b"alt!");
        term.feed(b"\x1b[?1049l");
        let after = term.snapshot();
        let row0_before: String = before.row(0).iter().map(|c| c.ch).collect();
        let row0_after: String = after.row(0).iter().map(|c| c.ch).collect();
        assert_eq!(row0_before, row0_after);
    }

    #[test]
    fn malformed_utf8_is_counted_and_replaced() {
        let mut term = terminal(3, 10);
        term.feed(&[0x41, 0xFF, 0x42]);
        let frame = term.snapshot();
        let row0: String = frame.row(0).iter().map(|c| c.ch).collect();
        assert!(row0.starts_with("A\u{FFFD}B"));
        assert_eq!(term.metrics().malformed_utf8, 1);
    }

    #[test]
    fn decid_triggers_same_reply_as_primary_da() {
        let mut term = terminal(24, 80);
        let replies = std::rc::Rc::new(std::cell::RefCell::new(Vec::<u8>::new()));
        let replies_clone = replies.clone();
        term.config.outbound_sink = Some(Box::new(move |bytes| {
            replies_clone.borrow_mut().extend_from_slice(bytes);
            true
        }));
        term.feed(b"\x1bZ");
        assert!(!replies.borrow().is_empty());
    }

    #[test]
    fn malformed_csi_increments_metric() {
        let mut term = terminal(24, 80);
        let mut seq = b"\x1b[".to_vec();
        for i in 0..40 {
            if i > 0 {
                seq.push(b';');
            }
            seq.extend_from_slice(b"1");
        }
        seq.push(b'z');
        term.feed(&seq);
        assert_eq!(term.metrics().malformed_escape, 1);
    }

    #[test]
    fn resize_rejects_zero_dimensions() {
        let mut term = terminal(24, 80);
        assert!(term.resize(0, 10).is_err());
        assert_eq!(term.metrics().resize_too_small, 1);
    }

    #[test]
    fn cursor_always_in_bounds_after_feed() {
        let mut term = terminal(4, 10);
        term.feed(b"\x1b[100;100H");
        let pos = term.screen.cursor().position();
        assert!(pos.row < 4 && pos.col < 10);
    }
}
