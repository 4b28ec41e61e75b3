use serde::{Deserialize, Serialize};

/// Diagnostic counters, one per non-fatal error kind in spec.md §7. Nothing
/// here ever causes the core to abort; these are purely observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub malformed_utf8: u64,
    pub malformed_escape: u64,
    pub unknown_mode: u64,
    pub unknown_csi_final: u64,
    pub response_sink_full: u64,
    pub resize_too_small: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}
