//! # globex
//!
//! Glob-pattern filesystem search — compile once, stream matches lazily.
//!
//! globex turns a pattern such as `src/**/*.{rs,toml}` into an immutable
//! [`SearchPlan`]: a constant root directory plus one compiled [`Segment`]
//! per remaining path component. [`SearchPlan::explore`] then walks the
//! filesystem breadth-first on a background thread and hands every match
//! back through a bounded queue as a plain iterator.
//!
//! It does **not** read file contents, sort, rank or deduplicate results.
//!
//! # Quick Start
//!
//! ```rust
//! use std::fs;
//!
//! let dir = tempfile::tempdir().unwrap();
//! fs::write(dir.path().join("invoice_jan.txt"), "").unwrap();
//! fs::write(dir.path().join("report.md"), "").unwrap();
//! fs::create_dir(dir.path().join("archive")).unwrap();
//! fs::write(dir.path().join("archive").join("invoice_dec.TXT"), "").unwrap();
//!
//! let pattern = format!("{}/**/invoice_*.txt", dir.path().display());
//! let plan = globex::glob(pattern).compile().unwrap();
//!
//! let found: Vec<_> = plan.explore().filter_map(Result::ok).collect();
//! assert_eq!(found.len(), 2);
//! assert!(found.iter().all(|m| !m.is_dir));
//! ```
//!
//! # Errors
//!
//! Bad pattern syntax is reported by [`SearchBuilder::compile`] as a
//! [`CompileError`]. Filesystem failures during the walk arrive in-band as
//! `Err(`[`ExploreError`]`)` items; each one concerns a single path and the
//! walk continues past it.
//!
//! ```rust
//! let err = globex::glob("src/a**/*.rs").compile().unwrap_err();
//! assert!(matches!(err, globex::CompileError::RecurseNotAlone(_)));
//! ```
//!
//! # Early exit
//!
//! Dropping the [`Matches`] iterator stops the background worker:
//!
//! ```rust,ignore
//! let first = globex::glob("/data/**/*.log").compile()?.explore().next();
//! ```

#![forbid(unsafe_code)]

mod builder;
mod compiler;
mod engine;
mod entry;
mod error;
mod plan;
mod reader;
mod results;
mod root;
mod segment;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{SearchBuilder, DEFAULT_CHANNEL_SIZE, DEFAULT_IGNORE_DIRS};
pub use compiler::compile_segments;
pub use entry::{Entry, EntryKind};
pub use error::{CompileError, ExploreError};
pub use plan::{version, SearchPlan, GLOB_SYNTAX};
pub use results::{Match, Matches};
pub use root::split_root;
pub use segment::Segment;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SearchBuilder`] for `pattern`.
///
/// # Example
///
/// ```rust
/// let plan = globex::glob("docs/*.md")
///     .autorecurse(true)
///     .max_depth(2)
///     .compile()
///     .unwrap();
///
/// assert_eq!(plan.root(), "docs/");
/// assert!(plan.segments()[0].is_recurse());
/// ```
pub fn glob(pattern: impl Into<String>) -> SearchBuilder {
    SearchBuilder::new(pattern)
}
