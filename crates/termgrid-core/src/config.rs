use serde::{Deserialize, Serialize};

/// Subset of §4.6 rules to evaluate, in the fixed order reverse → prompt →
/// vt. Disabling a rule just skips it; the remaining rules still run in
/// order, per spec.md §4.6's "switch to disable rules 1 and 2".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualCursorRules {
    pub reverse: bool,
    pub prompt: bool,
    pub vt: bool,
}

impl Default for VisualCursorRules {
    fn default() -> Self {
        Self {
            reverse: true,
            prompt: true,
            vt: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResponses {
    pub da_primary: Vec<u8>,
}

impl Default for ProbeResponses {
    fn default() -> Self {
        Self {
            // VT102-class primary DA response, per spec.md §6 default.
            da_primary: b"\x1b[?6c".to_vec(),
        }
    }
}

/// The plain-data half of `Config` — everything that can round-trip through
/// serde. Split out from the callbacks so the callbacks don't block
/// deriving `Serialize`/`Deserialize` on the rest (SPEC_FULL.md §1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigData {
    pub rows: u16,
    pub cols: u16,
    pub scrollback_cap: usize,
    pub autowrap_default: bool,
    pub prompt_markers: Vec<String>,
    pub visual_cursor_rules: VisualCursorRules,
    pub probe_responses: ProbeResponses,
}

impl Default for ConfigData {
    fn default() -> Self {
        Self {
            rows: 24,
            cols: 80,
            scrollback_cap: 1000,
            autowrap_default: true,
            prompt_markers: vec!["│ > ".to_string(), "> ".to_string(), "$ ".to_string()],
            visual_cursor_rules: VisualCursorRules::default(),
            probe_responses: ProbeResponses::default(),
        }
    }
}

/// Construction-time configuration for a `Terminal` (spec.md §6).
/// `outbound_sink` and `osc_title_sink` are the only behavior not covered by
/// `ConfigData`; both are optional, absent by default (open question ii,
/// resolved in SPEC_FULL.md §11).
pub struct Config {
    pub data: ConfigData,
    /// Returns `false` to signal backpressure; bytes are then dropped and
    /// counted via `Metrics::response_sink_full` (spec.md §4.5, §7).
    pub outbound_sink: Option<Box<dyn FnMut(&[u8]) -> bool + Send>>,
    pub osc_title_sink: Option<Box<dyn FnMut(String) + Send>>,
}

impl Config {
    pub fn new(data: ConfigData) -> Self {
        Self {
            data,
            outbound_sink: None,
            osc_title_sink: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(ConfigData::default())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("data", &self.data)
            .field("outbound_sink", &self.outbound_sink.is_some())
            .field("osc_title_sink", &self.osc_title_sink.is_some())
            .finish()
    }
}
