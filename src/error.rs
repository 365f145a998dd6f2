use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Pattern-syntax errors. Returned synchronously by
/// [`SearchBuilder::compile`](crate::SearchBuilder::compile); a plan that
/// fails to compile never starts a traversal.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("unmatched '}}' in `{0}`")]
    UnmatchedBrace(String),

    #[error("unclosed '{{' in `{0}`")]
    UnclosedBrace(String),

    #[error("unclosed '[' in `{0}`")]
    UnclosedBracket(String),

    #[error("path separator inside '{{...}}' in `{0}`")]
    SeparatorInBrace(String),

    #[error("`**` must appear alone between separators, found `{0}`")]
    RecurseNotAlone(String),

    #[error("invalid pattern `{component}`")]
    InvalidRegex {
        component: String,
        #[source]
        source: regex::Error,
    },
}

/// Filesystem errors met during a traversal.
///
/// These are delivered in-band through [`Matches`](crate::Matches) and are
/// local to the one path that failed: the walk keeps going.
#[derive(Error, Debug)]
pub enum ExploreError {
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("IO error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn traversal thread")]
    Spawn(#[source] io::Error),
}

impl ExploreError {
    /// Classify an `io::Error` raised while touching `path`.
    pub(crate) fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// The path that failed. `None` only when the traversal thread itself
    /// could not be started.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotADirectory(p)
            | Self::Io { path: p, .. } => Some(p),
            Self::Spawn(_) => None,
        }
    }
}
