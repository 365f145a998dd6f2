use std::fs;
use std::io;
use std::path::PathBuf;

/// A raw directory entry produced by the entry-stream reader.
///
/// Classification comes from the directory listing itself; no extra
/// `stat()` is issued, and symbolic links are reported as links rather
/// than resolved.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Full path to the entry (listed directory joined with `name`).
    pub path: PathBuf,

    /// The entry's file name.
    pub name: String,

    /// What kind of entry this is.
    pub kind: EntryKind,
}

/// The kind of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// A symbolic link (not followed).
    Symlink,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,
}

impl Entry {
    pub(crate) fn from_dir_entry(de: &fs::DirEntry) -> io::Result<Self> {
        let ft = de.file_type()?;
        let kind = if ft.is_dir() {
            EntryKind::Dir
        } else if ft.is_file() {
            EntryKind::File
        } else if ft.is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::Other
        };

        Ok(Self {
            path: de.path(),
            name: de.file_name().to_string_lossy().into_owned(),
            kind,
        })
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}
