use crate::config::ProbeResponses;
use termgrid_common::types::Position;

/// Device queries the screen recognizes but does not itself answer
/// (spec.md §4.5): cursor position reporting and device attributes. The
/// screen hands these back to the caller, which formats and writes the
/// reply through the outbound sink — keeping response formatting out of
/// the command-handler dispatch, matching the source project's `ansi.rs`
/// split between "handle" and "what to send back".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeRequest {
    /// DSR with the given parameter (6 = cursor position, 5 = status).
    DeviceStatusReport(u16),
    DeviceAttributes { secondary: bool },
}

/// `ESC[row;colR` with 1-indexed coordinates, or `ESC[0n` for the plain
/// status query (spec.md §4.4 "DSR (n)").
pub fn device_status_report(param: u16, cursor: Position) -> Option<Vec<u8>> {
    match param {
        6 => Some(format!("\x1b[{};{}R", cursor.row + 1, cursor.col + 1).into_bytes()),
        5 => Some(b"\x1b[0n".to_vec()),
        _ => None,
    }
}

/// Primary DA comes from configuration; secondary DA is a fixed VT102-class
/// identifier (spec.md §4.4 "DA primary/secondary").
pub fn device_attributes(secondary: bool, responses: &ProbeResponses) -> Vec<u8> {
    if secondary {
        b"\x1b[>0;0;0c".to_vec()
    } else {
        responses.da_primary.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dsr_cursor_position_is_one_indexed() {
        let bytes = device_status_report(6, Position::new(9, 19)).unwrap();
        assert_eq!(bytes, b"\x1b[10;20R");
    }

    #[test]
    fn dsr_status_is_fixed() {
        let bytes = device_status_report(5, Position::new(0, 0)).unwrap();
        assert_eq!(bytes, b"\x1b[0n");
    }

    #[test]
    fn da_primary_uses_config() {
        let responses = ProbeResponses {
            da_primary: b"\x1b[?1;2c".to_vec(),
        };
        assert_eq!(device_attributes(false, &responses), b"\x1b[?1;2c");
    }
}
