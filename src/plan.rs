use std::collections::HashSet;
use std::sync::Arc;

use crate::engine;
use crate::results::Matches;
use crate::segment::Segment;

/// Pattern grammar accepted by [`SearchBuilder`](crate::SearchBuilder).
pub const GLOB_SYNTAX: &str = r#"Glob syntax

  ?         any single character
  *         any sequence of characters, including none
  **        the current directory and every directory below it;
            must stand alone between separators (`a/**/b`, never `a**`)
  [abc]     any one of the listed characters
  [a-z]     any character in the range; `-` is literal when first or last
  [!abc]    any character NOT listed (`[^abc]` works too)
  [\[] [\]] a literal bracket inside a class; `[]]` also matches `]`
  {a,b,c}   any of the comma-separated alternatives; braces nest

Matching is case-insensitive. Both `/` and `\` separate path components,
and a trailing separator is ignored. Everything before the component that
holds the first `*`, `?`, `[` or `{` is a plain path where the search starts.

Autorecurse (off by default):
  - a plain directory path becomes `<dir>/**/*`, everything below it;
  - a pattern without `**` whose last component is a wildcard gets `**`
    inserted before that component, so `src/*.rs` behaves as `src/**/*.rs`.
"#;

/// Semantic version of the engine.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[derive(Debug)]
pub(crate) struct PlanInner {
    pub root:         String,
    pub segments:     Vec<Segment>,
    pub ignored:      HashSet<String>,
    pub max_depth:    usize,
    pub channel_size: usize,
}

impl PlanInner {
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.contains(&name.to_lowercase())
    }
}

// ---------------------------------------------------------------------------
// SearchPlan
// ---------------------------------------------------------------------------

/// A compiled, immutable glob search.
///
/// Produced by [`SearchBuilder::compile`](crate::SearchBuilder::compile).
/// Cloning is cheap and every clone shares the same plan, so one plan can
/// drive any number of concurrent [`explore`](SearchPlan::explore) calls.
#[derive(Debug, Clone)]
pub struct SearchPlan {
    inner: Arc<PlanInner>,
}

impl SearchPlan {
    pub(crate) fn new(inner: PlanInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Walk the filesystem and stream every match.
    ///
    /// Returns immediately; a background worker fills a queue of
    /// [`channel_size`](SearchPlan::channel_size) items that the returned
    /// iterator drains.
    pub fn explore(&self) -> Matches {
        engine::spawn(Arc::clone(&self.inner))
    }

    /// The constant path the walk starts from, as written in the pattern.
    pub fn root(&self) -> &str {
        &self.inner.root
    }

    pub fn segments(&self) -> &[Segment] {
        &self.inner.segments
    }

    /// Recursion depth cap below a `**`. `0` means unbounded.
    pub fn max_depth(&self) -> usize {
        self.inner.max_depth
    }

    pub fn channel_size(&self) -> usize {
        self.inner.channel_size
    }

    /// Whether a directory called `name` is skipped (case-insensitive).
    pub fn is_ignored(&self, name: &str) -> bool {
        self.inner.is_ignored(name)
    }

    pub fn version() -> &'static str {
        version()
    }

    pub fn glob_syntax() -> &'static str {
        GLOB_SYNTAX
    }
}
