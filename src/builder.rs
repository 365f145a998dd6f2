use std::collections::HashSet;

use tracing::debug;

use crate::compiler::{catch_all, compile_segments};
use crate::error::CompileError;
use crate::plan::{PlanInner, SearchPlan};
use crate::root::{fs_path, split_root};
use crate::segment::Segment;

/// Directory names skipped by default: the recycle bin, the volume
/// information folder and git metadata.
pub const DEFAULT_IGNORE_DIRS: [&str; 3] = ["$recycle.bin", "system volume information", ".git"];

/// Default capacity of the result queue.
pub const DEFAULT_CHANNEL_SIZE: usize = 1;

// ---------------------------------------------------------------------------
// SearchBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and compiling a glob search.
///
/// Created via [`globex::glob()`](crate::glob). Configure with chained
/// builder methods, then call [`compile()`](SearchBuilder::compile) to get
/// an immutable [`SearchPlan`].
///
/// # Example
///
/// ```rust,ignore
/// let plan = globex::glob("src/**/*.{rs,toml}")
///     .add_ignore_dir("target")
///     .max_depth(4)
///     .channel_size(64)
///     .compile()?;
///
/// for m in plan.explore() {
///     println!("{}", m?.path.display());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SearchBuilder {
    pattern:      String,
    ignore_dirs:  Vec<String>,
    max_depth:    usize,
    autorecurse:  bool,
    channel_size: usize,
}

impl SearchBuilder {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern:      pattern.into(),
            ignore_dirs:  DEFAULT_IGNORE_DIRS.iter().map(|d| d.to_string()).collect(),
            max_depth:    0,
            autorecurse:  false,
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Never enter or match directories called `name` (case-insensitive).
    pub fn add_ignore_dir(mut self, name: impl Into<String>) -> Self {
        self.ignore_dirs.push(name.into());
        self
    }

    /// Maximum number of levels a `**` expands. `0` (the default) means
    /// unbounded. Plain components never count toward the limit.
    pub fn max_depth(mut self, n: usize) -> Self {
        self.max_depth = n;
        self
    }

    /// Insert implicit `**` recursion. See [`GLOB_SYNTAX`](crate::GLOB_SYNTAX).
    pub fn autorecurse(mut self, yes: bool) -> Self {
        self.autorecurse = yes;
        self
    }

    /// Capacity of the result queue between the walker and the caller.
    /// Values below 1 are raised to 1.
    pub fn channel_size(mut self, n: usize) -> Self {
        self.channel_size = n.max(1);
        self
    }

    // ── Compile ───────────────────────────────────────────────────────────

    /// Compile the pattern into a [`SearchPlan`].
    ///
    /// # Errors
    ///
    /// Returns `Err` for pattern-syntax problems: unbalanced braces or
    /// brackets, `**` sharing a component with other characters, or a
    /// character class the regex engine rejects. Nothing touches the
    /// filesystem except the autorecurse check for a bare directory.
    pub fn compile(self) -> Result<SearchPlan, CompileError> {
        let (root, remainder) = split_root(&self.pattern);

        let mut segments = if remainder.is_empty() {
            Vec::new()
        } else {
            compile_segments(&remainder)?
        };

        let recursed = self.autorecurse && apply_autorecurse(&root, &mut segments)?;

        debug!(
            pattern = %self.pattern,
            root = %root,
            segments = segments.len(),
            autorecurse = recursed,
            "compiled glob"
        );

        Ok(SearchPlan::new(PlanInner {
            root,
            segments,
            ignored: self
                .ignore_dirs
                .iter()
                .map(|d| d.to_lowercase())
                .collect::<HashSet<_>>(),
            max_depth: self.max_depth,
            channel_size: self.channel_size,
        }))
    }
}

/// Add implicit recursion. Returns whether the segment list changed.
///
/// - No segments and the root is a directory: search everything below it.
/// - No `**` and the last segment is a filter: match that filter at any depth.
fn apply_autorecurse(root: &str, segments: &mut Vec<Segment>) -> Result<bool, CompileError> {
    if segments.is_empty() {
        if !fs_path(root).is_dir() {
            return Ok(false);
        }
        segments.push(Segment::Recurse);
        segments.push(catch_all()?);
        return Ok(true);
    }

    let has_recurse = segments.iter().any(Segment::is_recurse);
    if !has_recurse && segments.last().is_some_and(Segment::is_filter) {
        segments.insert(segments.len() - 1, Segment::Recurse);
        return Ok(true);
    }

    Ok(false)
}
