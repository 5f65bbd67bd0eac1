//! Parse unified diff text into typed hunks.
//!
//! The grammar accepted here is the classic `---/+++/@@` format, with the
//! tolerances LLM-produced patches need in practice: hunk headers may carry
//! a stray sign, blank context lines may be missing their leading space,
//! and declared header counts are advisory rather than binding.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::PatchConfig;
use crate::error::{PatchError, Result};

/// Hunk header: `@@ -<oldStart>[,<oldCount>] +<newStart>[,<newCount>] @@`.
/// The signs are optional to tolerate the quirk where a model drops or
/// doubles them.
static HUNK_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@@\s+-?(\d+)(?:,(\d+))?\s+\+?(\d+)(?:,(\d+))?\s+@@").expect("valid hunk regex")
});

/// Classification of one line inside a hunk body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLineKind {
    /// Unchanged line, present to anchor and validate the hunk position
    Context,
    /// Line removed from the original
    Remove,
    /// Line added to the new version
    Add,
}

/// One parsed line of a hunk body, without its leading marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: DiffLineKind,
    /// Line content with the `' '`/`'-'`/`'+'` marker stripped
    pub content: String,
    /// 1-based position in the original file, for context and remove lines.
    /// Informational only; the applier recomputes positions itself.
    pub old_line: Option<usize>,
}

/// One contiguous change region of a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// 1-based start line in the original file
    pub old_start: usize,
    /// Declared line span in the original file (defaults to 1 if omitted)
    pub old_count: usize,
    /// 1-based start line in the new file
    pub new_start: usize,
    /// Declared line span in the new file (defaults to 1 if omitted)
    pub new_count: usize,
    /// Body lines in input order
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Lines this hunk actually spans in the original (context + remove).
    pub fn counted_old_lines(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.kind != DiffLineKind::Add)
            .count()
    }

    /// Lines this hunk actually produces in the new file (context + add).
    pub fn counted_new_lines(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.kind != DiffLineKind::Remove)
            .count()
    }

    /// Whether the declared header counts agree with the counted body
    /// lines. Disagreement is advisory, never a hard failure; the applier
    /// surfaces it as a warning.
    pub fn declared_counts_match(&self) -> bool {
        self.old_count == self.counted_old_lines() && self.new_count == self.counted_new_lines()
    }
}

/// An entire parsed patch: hunks in input order, no reordering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedDiff {
    pub hunks: Vec<Hunk>,
}

/// Parser for unified diff text.
pub struct DiffParser;

impl DiffParser {
    /// Parse a raw patch string into hunks.
    ///
    /// `---`/`+++` file headers and any prose around the hunks are
    /// skipped. An input with no hunk headers at all parses successfully
    /// into an empty hunk list; rejecting that is the applier's call.
    pub fn parse(diff_text: &str, config: &PatchConfig) -> Result<ParsedDiff> {
        let lines: Vec<&str> = diff_text.lines().collect();
        let mut hunks = Vec::new();
        let mut idx = 0;

        while idx < lines.len() {
            if lines[idx].starts_with("@@") {
                let (hunk, next) = Self::parse_hunk(&lines, idx, hunks.len() + 1, config)?;
                hunks.push(hunk);
                idx = next;
            } else {
                idx += 1;
            }
        }

        debug!(hunks = hunks.len(), "parsed diff");
        Ok(ParsedDiff { hunks })
    }

    /// Whether a patch consists of file headers only (the generator's
    /// "no change" output): every non-blank line is a `---`/`+++` header.
    pub fn is_header_only(diff_text: &str) -> bool {
        let mut saw_header = false;
        for line in diff_text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with("---") || line.starts_with("+++") {
                saw_header = true;
            } else {
                return false;
            }
        }
        saw_header
    }

    /// Parse the hunk whose `@@` header sits at `header_idx`. Returns the
    /// hunk and the index of the first line it did not consume.
    fn parse_hunk(
        lines: &[&str],
        header_idx: usize,
        hunk_number: usize,
        config: &PatchConfig,
    ) -> Result<(Hunk, usize)> {
        let (old_start, old_count, new_start, new_count) =
            Self::parse_hunk_header(lines[header_idx], header_idx + 1)?;

        let mut body = Vec::new();
        let mut old_cursor = old_start;
        let mut idx = header_idx + 1;

        while idx < lines.len() {
            let line = lines[idx];

            // Next hunk or file header ends this body.
            if line.starts_with("@@") || line.starts_with("---") || line.starts_with("+++") {
                break;
            }

            if body.len() >= config.max_hunk_lines {
                return Err(PatchError::HunkTooLarge {
                    hunk: hunk_number,
                    max: config.max_hunk_lines,
                });
            }

            if let Some(rest) = line.strip_prefix('+') {
                body.push(DiffLine {
                    kind: DiffLineKind::Add,
                    content: rest.to_string(),
                    old_line: None,
                });
            } else if let Some(rest) = line.strip_prefix('-') {
                body.push(DiffLine {
                    kind: DiffLineKind::Remove,
                    content: rest.to_string(),
                    old_line: Some(old_cursor),
                });
                old_cursor += 1;
            } else if let Some(rest) = line.strip_prefix(' ') {
                body.push(DiffLine {
                    kind: DiffLineKind::Context,
                    content: rest.to_string(),
                    old_line: Some(old_cursor),
                });
                old_cursor += 1;
            } else if line.starts_with('\\') {
                // "\ No newline at end of file" marker
            } else {
                // Tolerant fallback: real-world patches sometimes drop the
                // leading space on blank context lines. Taken verbatim.
                body.push(DiffLine {
                    kind: DiffLineKind::Context,
                    content: line.to_string(),
                    old_line: Some(old_cursor),
                });
                old_cursor += 1;
            }

            idx += 1;
        }

        let hunk = Hunk {
            old_start,
            old_count,
            new_start,
            new_count,
            lines: body,
        };
        if !hunk.declared_counts_match() {
            debug!(
                hunk = hunk_number,
                declared_old = hunk.old_count,
                counted_old = hunk.counted_old_lines(),
                declared_new = hunk.new_count,
                counted_new = hunk.counted_new_lines(),
                "hunk header counts disagree with body; treating as advisory"
            );
        }
        Ok((hunk, idx))
    }

    /// Parse one `@@` header line. Counts default to 1 when the `,count`
    /// part is absent.
    fn parse_hunk_header(line: &str, line_number: usize) -> Result<(usize, usize, usize, usize)> {
        let caps = HUNK_HEADER
            .captures(line)
            .ok_or_else(|| PatchError::MalformedHeader {
                line: line_number,
                header: line.to_string(),
            })?;

        let field = |i: usize, default: usize| -> Result<usize> {
            match caps.get(i) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| PatchError::MalformedDiff {
                        line: line_number,
                        reason: format!("invalid number in hunk header: '{}'", m.as_str()),
                    }),
                None => Ok(default),
            }
        };

        let old_start = field(1, 1)?;
        let old_count = field(2, 1)?;
        let new_start = field(3, 1)?;
        let new_count = field(4, 1)?;
        Ok((old_start, old_count, new_start, new_count))
    }
}
