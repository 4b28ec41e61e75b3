use std::collections::VecDeque;
use termgrid_common::types::{Cell, CellAttributes, Position, ScrollRegion, Size};

/// Fixed-size grid of cells with region-aware line/character operations
/// (spec.md §4.2). Grounded in the source project's `ScreenBuffer`,
/// generalized to scroll-region-bounded insert/delete and erase-preserves-
/// attrs-but-not-color semantics.
pub struct ScreenBuffer {
    rows: Vec<Vec<Cell>>,
    size: Size,
}

impl ScreenBuffer {
    pub fn new(size: Size) -> Self {
        Self {
            rows: (0..size.rows).map(|_| blank_row(size.cols)).collect(),
            size,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn row(&self, row: u16) -> &[Cell] {
        &self.rows[row as usize]
    }

    fn row_mut(&mut self, row: u16) -> &mut [Cell] {
        &mut self.rows[row as usize]
    }

    pub fn cell(&self, pos: Position) -> Cell {
        self.rows[pos.row as usize][pos.col as usize]
    }

    pub fn set_cell(&mut self, pos: Position, cell: Cell) {
        self.rows[pos.row as usize][pos.col as usize] = cell;
    }

    /// Erase columns `[from, to]` (inclusive) of `row` to blanks carrying
    /// `attrs`, color reset to default (spec.md §4.2).
    fn erase_range(&mut self, row: u16, from: u16, to: u16, attrs: CellAttributes) {
        let blank = Cell::erased_with(attrs);
        for col in from..=to {
            self.rows[row as usize][col as usize] = blank;
        }
    }

    pub fn erase_line_from_cursor(&mut self, row: u16, from_col: u16, attrs: CellAttributes) {
        if from_col < self.size.cols {
            self.erase_range(row, from_col, self.size.cols - 1, attrs);
        }
    }

    pub fn erase_line_to_cursor(&mut self, row: u16, to_col: u16, attrs: CellAttributes) {
        self.erase_range(row, 0, to_col.min(self.size.cols - 1), attrs);
    }

    pub fn erase_line_all(&mut self, row: u16, attrs: CellAttributes) {
        self.erase_range(row, 0, self.size.cols - 1, attrs);
    }

    /// Erase rows `[from_row, to_row]` (inclusive) in full, used by the
    /// whole-row parts of ED.
    fn erase_rows(&mut self, from_row: u16, to_row: u16, attrs: CellAttributes) {
        for row in from_row..=to_row {
            self.erase_line_all(row, attrs);
        }
    }

    pub fn erase_from_cursor_to_end(&mut self, pos: Position, attrs: CellAttributes) {
        self.erase_line_from_cursor(pos.row, pos.col, attrs);
        if pos.row + 1 < self.size.rows {
            self.erase_rows(pos.row + 1, self.size.rows - 1, attrs);
        }
    }

    pub fn erase_from_start_to_cursor(&mut self, pos: Position, attrs: CellAttributes) {
        if pos.row > 0 {
            self.erase_rows(0, pos.row - 1, attrs);
        }
        self.erase_line_to_cursor(pos.row, pos.col, attrs);
    }

    pub fn erase_all(&mut self, attrs: CellAttributes) {
        self.erase_rows(0, self.size.rows - 1, attrs);
    }

    pub fn erase_chars(&mut self, row: u16, col: u16, n: u16, attrs: CellAttributes) {
        if col >= self.size.cols {
            return;
        }
        let last = (col + n.max(1) - 1).min(self.size.cols - 1);
        self.erase_range(row, col, last, attrs);
    }

    /// ICH: shift cells at and after `col` right by `n`, padding with blanks;
    /// cells pushed past the right edge are dropped.
    pub fn insert_chars(&mut self, row: u16, col: u16, n: u16, attrs: CellAttributes) {
        let cols = self.size.cols;
        if col >= cols {
            return;
        }
        let n = n.max(1).min(cols - col);
        let blank = Cell::erased_with(attrs);
        let line = self.row_mut(row);
        let mut i = cols - 1;
        while i >= col + n {
            line[i as usize] = line[(i - n) as usize];
            if i == col + n {
                break;
            }
            i -= 1;
        }
        for c in col..col + n {
            line[c as usize] = blank;
        }
    }

    /// DCH: shift cells after `col` left by `n`, pulling in blanks at the
    /// right edge.
    pub fn delete_chars(&mut self, row: u16, col: u16, n: u16, attrs: CellAttributes) {
        let cols = self.size.cols;
        if col >= cols {
            return;
        }
        let n = n.max(1).min(cols - col);
        let blank = Cell::erased_with(attrs);
        let line = self.row_mut(row);
        for c in col..cols - n {
            line[c as usize] = line[(c + n) as usize];
        }
        for c in cols - n..cols {
            line[c as usize] = blank;
        }
    }

    /// IL: insert `n` blank rows at `at_row`, shifting `at_row..=region.bottom`
    /// down; rows pushed past `region.bottom` are dropped.
    pub fn insert_lines(&mut self, region: ScrollRegion, at_row: u16, n: u16, attrs: CellAttributes) {
        if !region.contains(at_row) {
            return;
        }
        let n = n.max(1).min(region.bottom - at_row + 1);
        for _ in 0..n {
            self.rows.remove(region.bottom as usize);
            self.rows.insert(at_row as usize, blank_row_with(self.size.cols, attrs));
        }
    }

    /// DL: delete `n` rows at `at_row`, shifting rows below up within the
    /// region; blank rows fill in at `region.bottom`.
    pub fn delete_lines(&mut self, region: ScrollRegion, at_row: u16, n: u16, attrs: CellAttributes) {
        if !region.contains(at_row) {
            return;
        }
        let n = n.max(1).min(region.bottom - at_row + 1);
        for _ in 0..n {
            self.rows.remove(at_row as usize);
            self.rows.insert(region.bottom as usize, blank_row_with(self.size.cols, attrs));
        }
    }

    /// SU: scroll `region` up by `n`, dropping (or retiring to `scrollback`
    /// when `region` spans the full screen) rows off the top.
    pub fn scroll_up(
        &mut self,
        region: ScrollRegion,
        n: u16,
        attrs: CellAttributes,
        scrollback: &mut Scrollback,
    ) {
        let full_screen = region.is_full_screen(self.size.rows);
        for _ in 0..n {
            let retired = self.rows.remove(region.top as usize);
            if full_screen {
                scrollback.push(retired);
            }
            self.rows.insert(region.bottom as usize, blank_row_with(self.size.cols, attrs));
        }
    }

    /// SD: scroll `region` down by `n`; rows pushed off the bottom are
    /// dropped, never retired to scrollback.
    pub fn scroll_down(&mut self, region: ScrollRegion, n: u16, attrs: CellAttributes) {
        for _ in 0..n {
            self.rows.remove(region.bottom as usize);
            self.rows.insert(region.top as usize, blank_row_with(self.size.cols, attrs));
        }
    }

    pub fn fill_all(&mut self, ch: char) {
        for row in &mut self.rows {
            for cell in row {
                *cell = Cell::new(ch);
            }
        }
    }

    pub fn clear_and_reset(&mut self) {
        self.rows = (0..self.size.rows).map(|_| blank_row(self.size.cols)).collect();
    }

    /// Reflow per spec.md §5: columns truncate/pad in place; height shrink
    /// retires top rows into `scrollback` (mirroring scroll-up), height
    /// growth pads blank rows at the bottom.
    pub fn resize(&mut self, new_size: Size, scrollback: &mut Scrollback) {
        for row in &mut self.rows {
            if new_size.cols > self.size.cols {
                row.extend((self.size.cols..new_size.cols).map(|_| Cell::blank()));
            } else if new_size.cols < self.size.cols {
                row.truncate(new_size.cols as usize);
            }
        }

        if new_size.rows > self.size.rows {
            for _ in self.size.rows..new_size.rows {
                self.rows.push(blank_row(new_size.cols));
            }
        } else if new_size.rows < self.size.rows {
            let excess = self.size.rows - new_size.rows;
            for _ in 0..excess {
                scrollback.push(self.rows.remove(0));
            }
        }

        self.size = new_size;
    }
}

fn blank_row(cols: u16) -> Vec<Cell> {
    vec![Cell::blank(); cols as usize]
}

fn blank_row_with(cols: u16, attrs: CellAttributes) -> Vec<Cell> {
    vec![Cell::erased_with(attrs); cols as usize]
}

/// Retired rows, capped at construction (spec.md §3 "Scrollback"). `cap == 0`
/// disables retention entirely (spec.md §6).
pub struct Scrollback {
    lines: VecDeque<Vec<Cell>>,
    cap: usize,
}

impl Scrollback {
    pub fn new(cap: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            cap,
        }
    }

    pub fn push(&mut self, line: Vec<Cell>) {
        if self.cap == 0 {
            return;
        }
        self.lines.push_back(line);
        while self.lines.len() > self.cap {
            self.lines.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
        while self.lines.len() > self.cap {
            self.lines.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termgrid_common::types::Size;

    #[test]
    fn set_and_get_cell() {
        let mut buf = ScreenBuffer::new(Size::new(5, 10));
        buf.set_cell(Position::new(2, 3), Cell::new('A'));
        assert_eq!(buf.cell(Position::new(2, 3)).ch, 'A');
    }

    #[test]
    fn scroll_up_full_screen_retires_to_scrollback() {
        let mut buf = ScreenBuffer::new(Size::new(3, 5));
        let mut scrollback = Scrollback::new(10);
        buf.set_cell(Position::new(0, 0), Cell::new('X'));
        buf.scroll_up(ScrollRegion::full(3), 1, CellAttributes::default(), &mut scrollback);
        assert_eq!(scrollback.len(), 1);
        assert_eq!(buf.cell(Position::new(2, 0)).ch, ' ');
    }

    #[test]
    fn scroll_up_partial_region_drops_row() {
        let mut buf = ScreenBuffer::new(Size::new(5, 5));
        let mut scrollback = Scrollback::new(10);
        buf.scroll_up(ScrollRegion::new(1, 3), 1, CellAttributes::default(), &mut scrollback);
        assert_eq!(scrollback.len(), 0);
    }

    #[test]
    fn insert_and_delete_chars_roundtrip() {
        let mut buf = ScreenBuffer::new(Size::new(1, 5));
        for (i, ch) in "ABCDE".chars().enumerate() {
            buf.set_cell(Position::new(0, i as u16), Cell::new(ch));
        }
        buf.insert_chars(0, 1, 2, CellAttributes::default());
        let text: String = buf.row(0).iter().map(|c| c.ch).collect();
        assert_eq!(text, "A  BC");

        buf.delete_chars(0, 1, 2, CellAttributes::default());
        let text: String = buf.row(0).iter().map(|c| c.ch).collect();
        assert_eq!(text, "ABC  ");
    }

    #[test]
    fn scrollback_cap_zero_disables_retention() {
        let mut scrollback = Scrollback::new(0);
        scrollback.push(vec![Cell::blank()]);
        assert_eq!(scrollback.len(), 0);
    }
}
