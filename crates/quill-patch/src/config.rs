//! Engine configuration.
//!
//! All fields use `#[serde(default)]` so a partial TOML file (or a plain
//! `PatchConfig::default()`) always yields a working configuration.

use serde::{Deserialize, Serialize};

/// Tunable limits for the patch engine.
///
/// These are safety valves and UI thresholds, not precision knobs; the
/// defaults are what the editor shell ships with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Maximum number of body lines allowed in a single hunk. Guards
    /// against runaway or corrupted patches.
    pub max_hunk_lines: usize,

    /// Unchanged lines padded on each side of a generated hunk.
    pub context_lines: usize,

    /// Hunk count above which a diff is flagged `caution`.
    pub caution_hunk_count: usize,

    /// Changed-line count above which a diff is flagged `caution`.
    pub caution_changed_lines: usize,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            max_hunk_lines: 100,
            context_lines: 3,
            caution_hunk_count: 5,
            caution_changed_lines: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PatchConfig::default();
        assert_eq!(config.max_hunk_lines, 100);
        assert_eq!(config.context_lines, 3);
        assert_eq!(config.caution_hunk_count, 5);
        assert_eq!(config.caution_changed_lines, 50);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: PatchConfig = serde_json::from_str(r#"{"max_hunk_lines": 200}"#).unwrap();
        assert_eq!(config.max_hunk_lines, 200);
        assert_eq!(config.context_lines, 3);
    }
}
