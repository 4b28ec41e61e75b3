use termgrid_common::types::{CellAttributes, CharsetState, Position};

/// VT cursor: position, pending-wrap flag, active SGR attributes, and the
/// active character-set mapping. Origin mode and visibility live on the
/// enclosing screen's mode flags (spec.md §3); this struct only holds what
/// DECSC/DECRC actually snapshot alongside those.
#[derive(Debug, Clone)]
pub struct Cursor {
    position: Position,
    pending_wrap: bool,
    attrs: CellAttributes,
    charset: CharsetState,
}

impl Cursor {
    pub fn new() -> Self {
        Self {
            position: Position::new(0, 0),
            pending_wrap: false,
            attrs: CellAttributes::default(),
            charset: CharsetState::default(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, pos: Position) {
        self.position = pos;
    }

    pub fn pending_wrap(&self) -> bool {
        self.pending_wrap
    }

    pub fn set_pending_wrap(&mut self, pending: bool) {
        self.pending_wrap = pending;
    }

    pub fn attrs(&self) -> CellAttributes {
        self.attrs
    }

    pub fn set_attrs(&mut self, attrs: CellAttributes) {
        self.attrs = attrs;
    }

    pub fn charset(&self) -> CharsetState {
        self.charset
    }

    pub fn charset_mut(&mut self) -> &mut CharsetState {
        &mut self.charset
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_origin_with_no_pending_wrap() {
        let cursor = Cursor::new();
        assert_eq!(cursor.position(), Position::new(0, 0));
        assert!(!cursor.pending_wrap());
    }
}
