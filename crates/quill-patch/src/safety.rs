//! Heuristic risk tiering of a patch before it is applied.
//!
//! This gates the editor's auto-apply prompt and nothing else. It scans
//! the raw patch text, not the parsed hunk structure, so it works even on
//! patches the parser would reject. It is not a security boundary and
//! must never be relied on to sandbox generated code.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PatchConfig;

/// Substrings that force a `Review` classification when they appear on
/// any changed line. Code-execution primitives and destructive
/// shell/SQL statements.
const DANGEROUS_PATTERNS: &[&str] = &[
    "eval(",
    "exec(",
    "Function(",
    "child_process",
    "subprocess",
    "os.system(",
    "__import__(",
    "rm -rf",
    "DROP TABLE",
    "DROP DATABASE",
    "DELETE FROM",
    "TRUNCATE ",
];

/// Risk tier assigned to a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    #[default]
    Safe,
    Caution,
    Review,
}

impl std::fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SafetyLevel::Safe => "safe",
            SafetyLevel::Caution => "caution",
            SafetyLevel::Review => "review",
        };
        write!(f, "{}", s)
    }
}

/// Classification result for one patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyReport {
    pub level: SafetyLevel,
    /// Human-readable findings, in the order they were detected
    pub issues: Vec<String>,
    /// True only at [`SafetyLevel::Safe`]
    pub safe_to_auto_apply: bool,
}

/// Classifier for raw patch text.
pub struct SafetyClassifier;

impl SafetyClassifier {
    /// Classify a patch with the default thresholds.
    pub fn classify(diff_text: &str) -> SafetyReport {
        Self::classify_with_config(diff_text, &PatchConfig::default())
    }

    /// Classify a patch.
    ///
    /// Any denylisted substring on a changed line forces `Review`; a hunk
    /// or changed-line count past the configured thresholds raises at
    /// least `Caution`.
    pub fn classify_with_config(diff_text: &str, config: &PatchConfig) -> SafetyReport {
        let mut level = SafetyLevel::Safe;
        let mut issues = Vec::new();

        let mut hunk_count = 0usize;
        let mut added = 0usize;
        let mut removed = 0usize;

        for line in diff_text.lines() {
            if line.starts_with("@@") {
                hunk_count += 1;
            } else if line.starts_with('+') && !line.starts_with("+++") {
                added += 1;
            } else if line.starts_with('-') && !line.starts_with("---") {
                removed += 1;
            }

            for pattern in DANGEROUS_PATTERNS {
                if line.contains(pattern) {
                    level = SafetyLevel::Review;
                    issues.push(format!(
                        "potentially dangerous pattern '{}' in: {}",
                        pattern,
                        line.trim()
                    ));
                }
            }
        }

        let changed = added + removed;
        if hunk_count > config.caution_hunk_count {
            if level == SafetyLevel::Safe {
                level = SafetyLevel::Caution;
            }
            issues.push(format!(
                "{} hunks exceeds the review threshold of {}",
                hunk_count, config.caution_hunk_count
            ));
        }
        if changed > config.caution_changed_lines {
            if level == SafetyLevel::Safe {
                level = SafetyLevel::Caution;
            }
            issues.push(format!(
                "{} changed lines exceeds the review threshold of {}",
                changed, config.caution_changed_lines
            ));
        }

        debug!(%level, hunk_count, changed, "classified diff safety");
        SafetyReport {
            level,
            issues,
            safe_to_auto_apply: level == SafetyLevel::Safe,
        }
    }
}
