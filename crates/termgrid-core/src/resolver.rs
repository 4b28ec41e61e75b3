use crate::buffer::ScreenBuffer;
use crate::config::VisualCursorRules;
use crate::cursor::Cursor;
use termgrid_common::types::Position;

/// Reconciles the standards-conformant VT cursor with the "visual caret"
/// that modern TUI clients paint via reverse video instead of explicit
/// positioning (spec.md §4.6). Each rule is read-only and O(rows × cols);
/// the first rule that hits wins.
pub struct CursorResolver;

impl CursorResolver {
    /// Evaluate the three rules in order, honoring which are enabled in
    /// `rules`. Rules that are disabled are skipped entirely, not merely
    /// deprioritized. The VT-cursor rule has no fallback of its own — it is
    /// the base case — so `rules.vt` is accepted for symmetry with the
    /// config surface but is not itself a gate.
    pub fn resolve(
        buffer: &ScreenBuffer,
        cursor: &Cursor,
        rules: &VisualCursorRules,
        prompt_markers: &[String],
    ) -> Position {
        if rules.reverse {
            if let Some(pos) = Self::reverse_video_scan(buffer) {
                return pos;
            }
        }
        if rules.prompt {
            if let Some(pos) = Self::prompt_heuristic(buffer, prompt_markers) {
                return pos;
            }
        }
        cursor.position()
    }

    /// Rule 1: a single contiguous run of 1-4 reverse-video cells on one
    /// row. More than one run, a run spanning rows, or a run outside that
    /// length band disqualifies this rule (spec.md §4.6 rule 1).
    fn reverse_video_scan(buffer: &ScreenBuffer) -> Option<Position> {
        let size = buffer.size();
        let mut run: Option<(u16, u16, u16)> = None; // (row, start_col, len)
        let mut run_count = 0;

        for row in 0..size.rows {
            let cells = buffer.row(row);
            let mut col = 0u16;
            while col < size.cols {
                if cells[col as usize].attrs.reverse() {
                    let start = col;
                    let mut len = 0u16;
                    while col < size.cols && cells[col as usize].attrs.reverse() {
                        len += 1;
                        col += 1;
                    }
                    run_count += 1;
                    if run_count > 1 {
                        return None;
                    }
                    run = Some((row, start, len));
                } else {
                    col += 1;
                }
            }
        }

        match run {
            Some((row, start, len)) if (1..=4).contains(&len) => Some(Position::new(row, start)),
            _ => None,
        }
    }

    /// Rule 2: search the last 8 rows for a configured prompt marker, then
    /// return one column past the last non-space cell following it
    /// (spec.md §4.6 rule 2).
    fn prompt_heuristic(buffer: &ScreenBuffer, markers: &[String]) -> Option<Position> {
        if markers.is_empty() {
            return None;
        }
        let size = buffer.size();
        let window = 8u16.min(size.rows);
        let first_row = size.rows - window;

        for row in first_row..size.rows {
            let line: String = buffer.row(row).iter().map(|c| c.ch).collect();
            for marker in markers {
                if let Some(marker_col) = line.find(marker.as_str()) {
                    let marker_col = line[..marker_col].chars().count() as u16;
                    let marker_len = marker.chars().count() as u16;
                    let after = marker_col + marker_len;
                    if after > size.cols {
                        continue;
                    }
                    let tail: Vec<char> = buffer
                        .row(row)
                        .iter()
                        .skip(after as usize)
                        .map(|c| c.ch)
                        .collect();
                    if let Some(offset) = tail.iter().rposition(|&c| c != ' ') {
                        let col = (after + offset as u16 + 1).min(size.cols.saturating_sub(1));
                        return Some(Position::new(row, col));
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termgrid_common::types::{Cell, CellAttributes, Size};

    fn reversed(ch: char) -> Cell {
        let mut attrs = CellAttributes::default();
        attrs.flags.insert(termgrid_common::types::AttributeFlags::REVERSE);
        Cell::with_attrs(ch, attrs)
    }

    #[test]
    fn single_reverse_run_wins() {
        let mut buffer = ScreenBuffer::new(Size::new(3, 10));
        buffer.set_cell(Position::new(1, 4), reversed('h'));
        let cursor = Cursor::new();
        let pos = CursorResolver::resolve(&buffer, &cursor, &VisualCursorRules::default(), &[]);
        assert_eq!(pos, Position::new(1, 4));
    }

    #[test]
    fn multiple_runs_fall_through_to_vt_cursor() {
        let mut buffer = ScreenBuffer::new(Size::new(3, 10));
        buffer.set_cell(Position::new(0, 1), reversed('a'));
        buffer.set_cell(Position::new(0, 5), reversed('b'));
        let mut cursor = Cursor::new();
        cursor.set_position(Position::new(2, 2));
        let pos = CursorResolver::resolve(&buffer, &cursor, &VisualCursorRules::default(), &[]);
        assert_eq!(pos, Position::new(2, 2));
    }

    #[test]
    fn disabled_rules_are_skipped() {
        let mut buffer = ScreenBuffer::new(Size::new(3, 10));
        buffer.set_cell(Position::new(1, 4), reversed('h'));
        let mut cursor = Cursor::new();
        cursor.set_position(Position::new(2, 2));
        let rules = VisualCursorRules {
            reverse: false,
            prompt: false,
            vt: true,
        };
        let pos = CursorResolver::resolve(&buffer, &cursor, &rules, &[]);
        assert_eq!(pos, Position::new(2, 2));
    }
}
