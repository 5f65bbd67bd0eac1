//! Quill patch tooling CLI.
//!
//! Thin front door over the `quill-patch` engine. All file I/O lives here;
//! the engine itself only ever sees strings.
//!
//! # Examples
//!
//! ```bash
//! # Apply a patch, printing the result to stdout
//! quill apply src/main.rs fix.patch
//!
//! # Apply in place
//! quill apply src/main.rs fix.patch --write
//!
//! # Generate a patch the engine can re-apply
//! quill generate old/main.rs new/main.rs --path src/main.rs
//!
//! # Safety-classify a patch before auto-applying it
//! quill check fix.patch
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use quill_patch::{DiffApplier, DiffGenerator, PatchConfig, SafetyClassifier};

#[derive(Parser)]
#[command(name = "quill", version, about = "Unified diff tooling for the Quill editor shell")]
struct Cli {
    /// TOML file overriding the engine defaults (partial files are fine)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a unified diff to a file
    Apply {
        /// File to patch
        file: PathBuf,
        /// Patch in unified diff format
        patch: PathBuf,
        /// Rewrite the file in place instead of printing the result
        #[arg(long)]
        write: bool,
    },
    /// Generate a reference diff between two files
    Generate {
        /// Original version
        old: PathBuf,
        /// Edited version
        new: PathBuf,
        /// Path recorded in the `---`/`+++` headers (defaults to OLD)
        #[arg(long)]
        path: Option<String>,
    },
    /// Print the safety classification of a patch as JSON
    Check {
        /// Patch in unified diff format
        patch: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Apply { file, patch, write } => apply_command(&file, &patch, write, &config),
        Command::Generate { old, new, path } => {
            let old_text = read(&old)?;
            let new_text = read(&new)?;
            let header_path = path.unwrap_or_else(|| old.display().to_string());
            print!(
                "{}",
                DiffGenerator::generate_with_config(&old_text, &new_text, &header_path, &config)
            );
            Ok(())
        }
        Command::Check { patch } => {
            let diff = read(&patch)?;
            let report = SafetyClassifier::classify_with_config(&diff, &config);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

fn apply_command(file: &Path, patch: &Path, write: bool, config: &PatchConfig) -> Result<()> {
    let original = read(file)?;
    let diff = read(patch)?;

    let result = DiffApplier::apply_with_config(&original, &diff, config);
    for warning in &result.warnings {
        eprintln!("warning: {}", warning);
    }

    if !result.success {
        anyhow::bail!(
            "{} ({} of {} hunks applied)",
            result
                .error
                .unwrap_or_else(|| "unknown failure".to_string()),
            result.hunks_applied,
            result.hunks_total
        );
    }

    let new_content = result.new_content.unwrap_or_default();
    if write {
        fs::write(file, &new_content)
            .with_context(|| format!("failed to write {}", file.display()))?;
        eprintln!(
            "applied {} hunk(s) to {}",
            result.hunks_applied,
            file.display()
        );
    } else {
        print!("{}", new_content);
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<PatchConfig> {
    let Some(path) = path else {
        return Ok(PatchConfig::default());
    };
    let text = read(path)?;
    let config = toml::from_str(&text)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    debug!(?config, "loaded engine config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_apply_write_round_trips_through_file() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("hello.txt");
        let patch = dir.path().join("fix.patch");

        fs::write(&file, "hello\nworld\n").expect("seed file");
        fs::write(&patch, "@@ -1,2 +1,2 @@\n hello\n-world\n+rust\n").expect("seed patch");

        apply_command(&file, &patch, true, &PatchConfig::default()).expect("patch applies");

        assert_eq!(
            fs::read_to_string(&file).expect("read back"),
            "hello\nrust\n"
        );
    }

    #[test]
    fn test_apply_failure_leaves_file_untouched() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("hello.txt");
        let patch = dir.path().join("stale.patch");

        fs::write(&file, "hello\nworld\n").expect("seed file");
        fs::write(&patch, "@@ -1,2 +1,2 @@\n goodbye\n-world\n+rust\n").expect("seed patch");

        let err = apply_command(&file, &patch, true, &PatchConfig::default())
            .expect_err("apply should fail");
        assert!(err.to_string().contains("context mismatch"));
        assert_eq!(
            fs::read_to_string(&file).expect("read back"),
            "hello\nworld\n"
        );
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let dir = tempdir().expect("tempdir");
        let config_path = dir.path().join("quill.toml");
        fs::write(&config_path, "max_hunk_lines = 7\n").expect("seed config");

        let config = load_config(Some(&config_path)).expect("config loads");
        assert_eq!(config.max_hunk_lines, 7);
        assert_eq!(config.context_lines, 3);
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let config = load_config(None).expect("default config");
        assert_eq!(config, PatchConfig::default());
    }
}
