//! Produce a reference unified diff the applier can re-apply.
//!
//! This is deliberately not an LCS/edit-distance diff: it finds the first
//! and last differing line by direct positional comparison and emits one
//! hunk covering that span. Its only job is to let the AI-facing layer
//! round-trip a patch through [`DiffApplier`](crate::DiffApplier), so a
//! minimal hunk is not worth the extra machinery.

use crate::config::PatchConfig;

/// Generator for single-hunk reference diffs.
pub struct DiffGenerator;

impl DiffGenerator {
    /// Generate a unified diff from `old` to `new` with the default
    /// configuration.
    pub fn generate(old: &str, new: &str, path: &str) -> String {
        Self::generate_with_config(old, new, path, &PatchConfig::default())
    }

    /// Generate a unified diff from `old` to `new`.
    ///
    /// Identical inputs produce the file headers with no hunk (an empty
    /// changeset the applier treats as a trivial success).
    pub fn generate_with_config(
        old: &str,
        new: &str,
        path: &str,
        config: &PatchConfig,
    ) -> String {
        let old_lines: Vec<&str> = old.lines().collect();
        let new_lines: Vec<&str> = new.lines().collect();

        let mut out = format!("--- a/{}\n+++ b/{}\n", path, path);
        if old_lines == new_lines {
            return out;
        }

        // First differing line from the top.
        let mut first = 0;
        while first < old_lines.len()
            && first < new_lines.len()
            && old_lines[first] == new_lines[first]
        {
            first += 1;
        }

        // Matching tail from the bottom, never crossing `first`.
        let mut tail = 0;
        while tail < old_lines.len() - first
            && tail < new_lines.len() - first
            && old_lines[old_lines.len() - 1 - tail] == new_lines[new_lines.len() - 1 - tail]
        {
            tail += 1;
        }

        let old_end = old_lines.len() - tail;
        let new_end = new_lines.len() - tail;

        // Pad with unchanged context on both sides.
        let hunk_start = first.saturating_sub(config.context_lines);
        let trail_end = (old_end + config.context_lines).min(old_lines.len());

        let old_count = trail_end - hunk_start;
        let new_count = (first - hunk_start) + (new_end - first) + (trail_end - old_end);

        out.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            hunk_start + 1,
            old_count,
            hunk_start + 1,
            new_count
        ));

        for line in &old_lines[hunk_start..first] {
            out.push_str(&format!(" {}\n", line));
        }
        for line in &old_lines[first..old_end] {
            out.push_str(&format!("-{}\n", line));
        }
        for line in &new_lines[first..new_end] {
            out.push_str(&format!("+{}\n", line));
        }
        for line in &old_lines[old_end..trail_end] {
            out.push_str(&format!(" {}\n", line));
        }

        out
    }
}
