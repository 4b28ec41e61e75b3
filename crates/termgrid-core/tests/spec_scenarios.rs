//! The six literal end-to-end scenarios plus the quantified invariants and
//! boundary behaviors named in the terminal-core specification, §8.

use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use termgrid_core::config::{Config, ConfigData};
use termgrid_core::Terminal;

fn terminal(rows: u16, cols: u16) -> Terminal {
    let data = ConfigData { rows, cols, ..ConfigData::default() };
    Terminal::new(Config::new(data))
}

fn row_text(term: &Terminal, row: u16) -> String {
    term.snapshot().row(row).iter().map(|c| c.ch).collect()
}

#[test]
fn scenario_1_hello_wrap() {
    let mut term = terminal(24, 5);
    term.feed(b"Hello");
    let frame = term.snapshot();
    assert_eq!(row_text(&term, 0), "Hello");
    assert_eq!(frame.caret_col, 5);
    term.feed(b"!");
    assert_eq!(row_text(&term, 0), "Hello");
    assert_eq!(row_text(&term, 1).trim_end(), "!");
    let frame = term.snapshot();
    assert_eq!((frame.caret_row, frame.caret_col), (1, 1));
}

#[test]
fn scenario_2_dsr_reply() {
    let replies = Rc::new(RefCell::new(Vec::<u8>::new()));
    let sink_replies = replies.clone();
    let mut config = Config::new(ConfigData::default());
    config.outbound_sink = Some(Box::new(move |bytes| {
        sink_replies.borrow_mut().extend_from_slice(bytes);
        true
    }));
    let mut term = Terminal::new(config);
    term.feed(b"\x1b[10;20H\x1b[6n");
    assert_eq!(&*replies.borrow(), b"\x1b[10;20R");
}

#[test]
fn scenario_3_reverse_video_caret() {
    let mut term = terminal(24, 80);
    term.feed(b"\xe2\x94\x82 > welcome an\x1b[7mh\x1b[27mello !");
    let frame = term.snapshot();
    let row: String = frame.row(0).iter().map(|c| c.ch).collect();
    let h_col = row.find('h').unwrap() as u16;
    assert_eq!(frame.caret_col, h_col);
}

#[test]
fn scenario_4_scroll_into_scrollback() {
    let mut term = terminal(24, 80);
    term.set_scrollback_cap(100);
    // 50 lines separated by CRLF, no trailing newline after the last one —
    // a trailing newline would scroll once more and leave row 23 blank.
    let lines: Vec<String> = (1..=50u32).map(|i| format!("line {}", i)).collect();
    term.feed(lines.join("\r\n").as_bytes());
    assert_eq!(term.scrollback_len(), 26);
    assert!(row_text(&term, 23).starts_with("line 50"));
}

#[test]
fn scenario_5_alternate_screen() {
    let mut term = terminal(24, 80);
    let before = term.snapshot();
    term.feed(b"\x1b[?1049h");
    term.feed(b"A");
    term.feed(b"\x1b[?1049l");
    let after = term.snapshot();
    for row in 0..24 {
        let a: String = before.row(row).iter().map(|c| c.ch).collect();
        let b: String = after.row(row).iter().map(|c| c.ch).collect();
        assert_eq!(a, b);
    }
    assert_eq!(after.caret_row, before.caret_row);
    assert_eq!(after.caret_col, before.caret_col);
}

#[test]
fn scenario_6_malformed_utf8() {
    let mut term = terminal(24, 80);
    term.feed(&[0x41, 0xFF, 0x42]);
    assert!(row_text(&term, 0).starts_with("A\u{FFFD}B"));
}

// ---- Quantified invariants ----------------------------------------------

#[test]
fn sgr_reset_clears_all_attributes() {
    let mut term = terminal(24, 80);
    term.feed(b"\x1b[1;7;31m\x1b[0m");
    let frame = term.snapshot();
    // SGR 0 leaves the cursor's attribute set default; confirm via the next
    // printed cell, since Frame has no direct cursor-attrs accessor.
    let _ = frame;
    term.feed(b"X");
    let cell = term.snapshot().row(0)[0];
    assert_eq!(cell.attrs, termgrid_common::types::AttributeFlags::empty());
}

#[test]
fn ed2_home_matches_fresh_screen() {
    let mut term = terminal(10, 20);
    term.feed(b"some text\x1b[3;5H\x1b[31mmore\x1b[0m");
    term.feed(b"\x1b[2J\x1b[H");
    let fresh = terminal(10, 20);
    let a = term.snapshot();
    let b = fresh.snapshot();
    for row in 0..10 {
        let ra: String = a.row(row).iter().map(|c| c.ch).collect();
        let rb: String = b.row(row).iter().map(|c| c.ch).collect();
        assert_eq!(ra, rb);
    }
    assert_eq!((a.caret_row, a.caret_col), (b.caret_row, b.caret_col));
}

#[test]
fn scroll_region_of_one_row_clears_it_on_su() {
    let mut term = terminal(10, 20);
    term.feed(b"\x1b[3;3r");
    term.feed(b"\x1b[3;1Hhello");
    term.feed(b"\x1b[3S");
    assert_eq!(row_text(&term, 2).trim_end(), "");
}

#[test]
fn origin_mode_cup_targets_scroll_region_top_left() {
    let mut term = terminal(10, 20);
    term.feed(b"\x1b[3;6r\x1b[?6h\x1b[1;1H");
    let frame = term.snapshot();
    assert_eq!((frame.caret_row, frame.caret_col), (2, 0));
}

#[test]
fn scrollback_never_exceeds_cap() {
    let mut term = terminal(5, 10);
    term.set_scrollback_cap(3);
    for i in 0..20u32 {
        term.feed(format!("{}\n", i).as_bytes());
    }
    assert!(term.scrollback_len() <= 3);
}

proptest! {
    #[test]
    fn chunking_does_not_affect_final_snapshot(data in proptest::collection::vec(any::<u8>(), 0..200), split_points in proptest::collection::vec(0usize..200, 0..10)) {
        let whole = {
            let mut term = terminal(10, 20);
            term.feed(&data);
            term.snapshot()
        };

        let chunked = {
            let mut term = terminal(10, 20);
            let mut points: Vec<usize> = split_points.into_iter().filter(|&p| p < data.len()).collect();
            points.sort_unstable();
            points.dedup();
            let mut start = 0;
            for p in points {
                term.feed(&data[start..p]);
                start = p;
            }
            term.feed(&data[start..]);
            term.snapshot()
        };

        prop_assert_eq!(whole.caret_row, chunked.caret_row);
        prop_assert_eq!(whole.caret_col, chunked.caret_col);
        for row in 0..10 {
            let a: Vec<char> = whole.row(row).iter().map(|c| c.ch).collect();
            let b: Vec<char> = chunked.row(row).iter().map(|c| c.ch).collect();
            prop_assert_eq!(a, b);
        }
    }
}
