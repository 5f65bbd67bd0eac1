//! Validate and apply parsed hunks to file content.
//!
//! The applier never trusts line numbers alone: before any mutation, each
//! hunk's context and removal lines are checked against the working buffer
//! at the position the hunk declares (shifted by the net line delta of the
//! hunks applied before it). The transformation is all-or-nothing from the
//! caller's perspective: the first failing hunk aborts the apply and no
//! partial content is ever returned as a success.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::PatchConfig;
use crate::error::{PatchError, Result};
use crate::parser::{DiffLineKind, DiffParser, Hunk};

/// Outcome of applying one diff to one text.
///
/// Expected failures (malformed patch, context mismatch, out-of-bounds
/// hunk) are reported through `error`, never as a panic; the editor shell
/// serializes this struct straight to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyResult {
    pub success: bool,
    /// The fully transformed text; `None` on any failure
    pub new_content: Option<String>,
    pub error: Option<String>,
    /// Hunks applied strictly before the first failure (== total on success)
    pub hunks_applied: usize,
    pub hunks_total: usize,
    /// Non-fatal findings, e.g. "large diff, review recommended"
    pub warnings: Vec<String>,
}

impl ApplyResult {
    fn applied(new_content: String, hunks_total: usize, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            new_content: Some(new_content),
            error: None,
            hunks_applied: hunks_total,
            hunks_total,
            warnings,
        }
    }

    fn failed(
        error: PatchError,
        hunks_applied: usize,
        hunks_total: usize,
        warnings: Vec<String>,
    ) -> Self {
        warn!(%error, hunks_applied, hunks_total, "diff application failed");
        Self {
            success: false,
            new_content: None,
            error: Some(error.to_string()),
            hunks_applied,
            hunks_total,
            warnings,
        }
    }
}

/// Applier for unified diffs.
pub struct DiffApplier;

impl DiffApplier {
    /// Apply a unified diff to `original` with the default configuration.
    pub fn apply(original: &str, diff_text: &str) -> ApplyResult {
        Self::apply_with_config(original, diff_text, &PatchConfig::default())
    }

    /// Apply a unified diff to `original`.
    ///
    /// A header-only diff (the generator's output for identical inputs) is
    /// a trivial success returning the original unchanged. Any other diff
    /// with zero hunks is rejected as an empty changeset.
    pub fn apply_with_config(
        original: &str,
        diff_text: &str,
        config: &PatchConfig,
    ) -> ApplyResult {
        let parsed = match DiffParser::parse(diff_text, config) {
            Ok(parsed) => parsed,
            Err(err) => return ApplyResult::failed(err, 0, 0, Vec::new()),
        };

        if parsed.hunks.is_empty() {
            if DiffParser::is_header_only(diff_text) {
                debug!("header-only diff; returning original content unchanged");
                return ApplyResult::applied(original.to_string(), 0, Vec::new());
            }
            return ApplyResult::failed(PatchError::EmptyDiff, 0, 0, Vec::new());
        }

        let warnings = Self::collect_warnings(&parsed.hunks, config);
        let total = parsed.hunks.len();

        let ends_with_newline = original.ends_with('\n');
        let mut buffer: Vec<String> = original.lines().map(str::to_string).collect();
        let mut delta: i64 = 0;

        for (idx, hunk) in parsed.hunks.iter().enumerate() {
            if let Err(err) = Self::validate_hunk(&buffer, hunk, delta, idx + 1) {
                return ApplyResult::failed(err, idx, total, warnings);
            }
            delta += Self::apply_hunk(&mut buffer, hunk, delta);
        }

        let mut new_content = buffer.join("\n");
        if ends_with_newline && !new_content.is_empty() {
            new_content.push('\n');
        }
        debug!(hunks = total, delta, "applied diff");
        ApplyResult::applied(new_content, total, warnings)
    }

    /// Walk the hunk's context and removal lines against the buffer before
    /// touching it. Comparison is on trimmed content, so whitespace drift
    /// does not fail a hunk; position drift does.
    fn validate_hunk(
        buffer: &[String],
        hunk: &Hunk,
        delta: i64,
        hunk_number: usize,
    ) -> Result<()> {
        let start = hunk.old_start.saturating_sub(1) as i64 + delta;
        if start < 0 || start as usize > buffer.len() {
            return Err(PatchError::StartOutOfBounds {
                hunk: hunk_number,
                start: hunk.old_start,
                file_lines: buffer.len(),
            });
        }

        let mut cursor = start as usize;
        for line in hunk.lines.iter().filter(|l| l.kind != DiffLineKind::Add) {
            if cursor >= buffer.len() {
                return Err(PatchError::PastEndOfFile { hunk: hunk_number });
            }
            if buffer[cursor].trim() != line.content.trim() {
                return Err(PatchError::ContextMismatch {
                    line: cursor + 1,
                    expected: line.content.clone(),
                    actual: buffer[cursor].clone(),
                });
            }
            cursor += 1;
        }
        Ok(())
    }

    /// Mutate the buffer for one validated hunk. Returns the net line
    /// delta this hunk introduced, for the next hunk's offset correction.
    ///
    /// Bounds are guaranteed by [`Self::validate_hunk`]; removal never
    /// advances the cursor because the next line shifts into its place.
    fn apply_hunk(buffer: &mut Vec<String>, hunk: &Hunk, delta: i64) -> i64 {
        let mut cursor = (hunk.old_start.saturating_sub(1) as i64 + delta) as usize;
        let mut hunk_delta = 0i64;

        for line in &hunk.lines {
            match line.kind {
                DiffLineKind::Context => {
                    cursor += 1;
                }
                DiffLineKind::Remove => {
                    buffer.remove(cursor);
                    hunk_delta -= 1;
                }
                DiffLineKind::Add => {
                    buffer.insert(cursor, line.content.clone());
                    cursor += 1;
                    hunk_delta += 1;
                }
            }
        }
        hunk_delta
    }

    fn collect_warnings(hunks: &[Hunk], config: &PatchConfig) -> Vec<String> {
        let mut warnings = Vec::new();

        let changed: usize = hunks
            .iter()
            .map(|h| {
                h.lines
                    .iter()
                    .filter(|l| l.kind != DiffLineKind::Context)
                    .count()
            })
            .sum();
        if hunks.len() > config.caution_hunk_count || changed > config.caution_changed_lines {
            warnings.push("large diff, review recommended".to_string());
        }

        for (idx, hunk) in hunks.iter().enumerate() {
            if !hunk.declared_counts_match() {
                warnings.push(format!(
                    "hunk {} header counts disagree with its body; applying by content",
                    idx + 1
                ));
            }
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_replacement() {
        let diff = "--- a/f.txt\n+++ b/f.txt\n@@ -1,3 +1,3 @@\n a\n-b\n+B\n c\n";
        let result = DiffApplier::apply("a\nb\nc\n", diff);
        assert!(result.success, "apply failed: {:?}", result.error);
        assert_eq!(result.new_content.as_deref(), Some("a\nB\nc\n"));
        assert_eq!(result.hunks_applied, 1);
        assert_eq!(result.hunks_total, 1);
    }

    #[test]
    fn test_context_mismatch_reports_position_and_content() {
        let diff = "@@ -1,2 +1,2 @@\n z\n-y\n+Y\n";
        let result = DiffApplier::apply("x\ny\n", diff);
        assert!(!result.success);
        assert_eq!(result.hunks_applied, 0);
        assert_eq!(result.new_content, None);

        let error = result.error.expect("error message");
        assert!(error.contains("line 1"), "missing line number: {}", error);
        assert!(error.contains("'z'"), "missing expected text: {}", error);
        assert!(error.contains("'x'"), "missing actual text: {}", error);
    }

    #[test]
    fn test_multi_hunk_offsets_tracked() {
        // First hunk grows the file by one line; second hunk's position
        // must shift with it.
        let original = "a\nb\nc\nd\ne\n";
        let diff = concat!(
            "@@ -1,1 +1,2 @@\n",
            " a\n",
            "+a2\n",
            "@@ -4,1 +5,1 @@\n",
            "-d\n",
            "+D\n",
        );
        let result = DiffApplier::apply(original, diff);
        assert!(result.success, "apply failed: {:?}", result.error);
        assert_eq!(result.new_content.as_deref(), Some("a\na2\nb\nc\nD\ne\n"));
        assert_eq!(result.hunks_applied, 2);
    }

    #[test]
    fn test_all_or_nothing_on_later_hunk_failure() {
        let original = "a\nb\nc\nd\n";
        let diff = concat!(
            "@@ -1,1 +1,1 @@\n",
            "-a\n",
            "+A\n",
            "@@ -3,1 +3,1 @@\n",
            "-WRONG\n",
            "+C\n",
        );
        let result = DiffApplier::apply(original, diff);
        assert!(!result.success);
        assert_eq!(result.hunks_applied, 1);
        assert_eq!(result.hunks_total, 2);
        // Failure must not leak partially transformed content.
        assert_eq!(result.new_content, None);
    }

    #[test]
    fn test_start_beyond_file_bounds() {
        let diff = "@@ -10,1 +10,1 @@\n-x\n+y\n";
        let result = DiffApplier::apply("a\nb\n", diff);
        assert!(!result.success);
        let error = result.error.expect("error message");
        assert!(
            error.contains("outside file bounds"),
            "unexpected error: {}",
            error
        );
    }

    #[test]
    fn test_hunk_extends_past_end_of_file() {
        let diff = "@@ -2,3 +2,3 @@\n b\n c\n-d\n+D\n";
        let result = DiffApplier::apply("a\nb\n", diff);
        assert!(!result.success);
        let error = result.error.expect("error message");
        assert!(
            error.contains("beyond end of file"),
            "unexpected error: {}",
            error
        );
    }

    #[test]
    fn test_empty_changeset_rejected() {
        let result = DiffApplier::apply("a\n", "this is not a diff at all\n");
        assert!(!result.success);
        assert!(result.error.expect("error").contains("no valid hunks"));
    }

    #[test]
    fn test_header_only_diff_is_trivial_success() {
        let result = DiffApplier::apply("a\nb\n", "--- a/f.txt\n+++ b/f.txt\n");
        assert!(result.success);
        assert_eq!(result.new_content.as_deref(), Some("a\nb\n"));
        assert_eq!(result.hunks_applied, 0);
        assert_eq!(result.hunks_total, 0);
    }

    #[test]
    fn test_pure_insertion_at_end_of_file() {
        let diff = "@@ -3,1 +3,2 @@\n c\n+d\n";
        let result = DiffApplier::apply("a\nb\nc\n", diff);
        assert!(result.success, "apply failed: {:?}", result.error);
        assert_eq!(result.new_content.as_deref(), Some("a\nb\nc\nd\n"));
    }

    #[test]
    fn test_deletion_of_only_line() {
        let diff = "@@ -1,1 +1,0 @@\n-a\n";
        let result = DiffApplier::apply("a\n", diff);
        assert!(result.success, "apply failed: {:?}", result.error);
        assert_eq!(result.new_content.as_deref(), Some(""));
    }

    #[test]
    fn test_no_trailing_newline_preserved() {
        let diff = "@@ -1,2 +1,2 @@\n a\n-b\n+B\n";
        let result = DiffApplier::apply("a\nb", diff);
        assert!(result.success, "apply failed: {:?}", result.error);
        assert_eq!(result.new_content.as_deref(), Some("a\nB"));
    }

    #[test]
    fn test_whitespace_drift_tolerated_in_context() {
        let diff = "@@ -1,2 +1,2 @@\n a\n-b\n+B\n";
        let result = DiffApplier::apply("  a  \nb\n", diff);
        assert!(result.success, "apply failed: {:?}", result.error);
        // The context line itself is left as it was in the file.
        assert_eq!(result.new_content.as_deref(), Some("  a  \nB\n"));
    }

    #[test]
    fn test_advisory_count_mismatch_warns_but_applies() {
        let diff = "@@ -1,7 +1,7 @@\n a\n-b\n+B\n";
        let result = DiffApplier::apply("a\nb\n", diff);
        assert!(result.success, "apply failed: {:?}", result.error);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("header counts disagree")));
    }

    #[test]
    fn test_large_diff_warning() {
        let mut original = String::new();
        let mut diff = String::from("@@ -1,60 +1,60 @@\n");
        for i in 0..60 {
            original.push_str(&format!("line {}\n", i));
            diff.push_str(&format!("-line {}\n", i));
            diff.push_str(&format!("+LINE {}\n", i));
        }
        let result = DiffApplier::apply(&original, &diff);
        assert!(result.success, "apply failed: {:?}", result.error);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("large diff")));
    }

    #[test]
    fn test_malformed_diff_counts_zero_applied() {
        let diff = "@@ bogus @@\n-a\n+b\n";
        let result = DiffApplier::apply("a\n", diff);
        assert!(!result.success);
        assert_eq!(result.hunks_applied, 0);
        assert!(result.error.expect("error").contains("malformed hunk header"));
    }

    #[test]
    fn test_deterministic() {
        let diff = "@@ -1,3 +1,3 @@\n a\n-b\n+B\n c\n";
        let first = DiffApplier::apply("a\nb\nc\n", diff);
        let second = DiffApplier::apply("a\nb\nc\n", diff);
        assert_eq!(first, second);
    }
}
