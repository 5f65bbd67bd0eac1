//! Unified diff engine for the Quill editor shell.
//!
//! This crate parses patches in the classic `---/+++/@@` format, validates
//! them against the current file content, and applies them all-or-nothing.
//! It also generates reference diffs the engine can re-apply and assigns a
//! heuristic safety tier used to gate auto-apply in the UI.
//!
//! # Architecture
//!
//! This is a **Layer 2 (Infrastructure)** crate:
//! - Depends on: nothing internal (pure transformation over strings)
//! - Used by: the editor's AI-action layer and the `quill` CLI
//!
//! Everything here is synchronous and stateless; callers may invoke the
//! engine concurrently from independent requests with no coordination.
//! File I/O is the caller's responsibility.
//!
//! # Usage
//!
//! ```rust,ignore
//! use quill_patch::{DiffApplier, DiffGenerator, SafetyClassifier, SafetyLevel};
//!
//! let report = SafetyClassifier::classify(&diff_text);
//! if report.safe_to_auto_apply {
//!     let result = DiffApplier::apply(&file_content, &diff_text);
//!     if result.success {
//!         // Write result.new_content back to the file
//!     } else {
//!         // Ask the model to regenerate; result.error says what failed
//!     }
//! }
//! ```

mod applier;
mod config;
mod error;
mod generator;
mod parser;
mod safety;

pub use applier::{ApplyResult, DiffApplier};
pub use config::PatchConfig;
pub use error::{PatchError, Result};
pub use generator::DiffGenerator;
pub use parser::{DiffLine, DiffLineKind, DiffParser, Hunk, ParsedDiff};
pub use safety::{SafetyClassifier, SafetyLevel, SafetyReport};
