use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Sender};
use regex::Regex;
use tracing::{debug, trace};

use crate::entry::{Entry, EntryKind};
use crate::error::ExploreError;
use crate::plan::PlanInner;
use crate::reader::EntryStream;
use crate::results::{Match, Matches};
use crate::root::fs_path;
use crate::segment::Segment;

// ---------------------------------------------------------------------------
// Pending work
// ---------------------------------------------------------------------------

/// "Evaluate `segments[index]` rooted at `path`."
#[derive(Debug)]
struct PendingWork {
    path:      PathBuf,
    index:     usize,
    /// Set while expanding below a `**`.
    recursing: bool,
    /// Levels expanded below the point where recursion became active.
    depth:     usize,
}

/// The consumer dropped the result sequence or raised the shutdown flag.
struct Cancelled;

type Step = Result<(), Cancelled>;

// ---------------------------------------------------------------------------
// spawn()
// ---------------------------------------------------------------------------

/// Start a traversal of `plan` on its own worker thread.
pub(crate) fn spawn(plan: Arc<PlanInner>) -> Matches {
    let (tx, rx) = bounded(plan.channel_size);
    let shutdown = Arc::new(AtomicBool::new(false));

    let walker = Walker {
        plan,
        queue: VecDeque::new(),
        tx: tx.clone(),
        shutdown: Arc::clone(&shutdown),
    };

    let spawned = thread::Builder::new()
        .name("globex-explore".into())
        .spawn(move || walker.run());

    match spawned {
        Ok(handle) => Matches::new(rx, shutdown, Some(handle)),
        Err(e) => {
            // Capacity is at least one, so this never blocks.
            let _ = tx.send(Err(ExploreError::Spawn(e)));
            Matches::new(rx, shutdown, None)
        }
    }
}

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

struct Walker {
    plan:     Arc<PlanInner>,
    queue:    VecDeque<PendingWork>,
    tx:       Sender<Result<Match, ExploreError>>,
    shutdown: Arc<AtomicBool>,
}

impl Walker {
    fn run(mut self) {
        let root = fs_path(&self.plan.root);
        match self.walk(root) {
            Ok(()) => debug!(root = %self.plan.root, "traversal finished"),
            Err(Cancelled) => debug!(root = %self.plan.root, "traversal cancelled"),
        }
    }

    fn walk(&mut self, root: PathBuf) -> Step {
        // A bare literal path: one existence check, one item.
        if self.plan.segments.is_empty() {
            return match fs::metadata(&root) {
                Ok(meta) => self.emit(root, meta.is_dir()),
                Err(e) => self.fail(&root, e),
            };
        }

        match fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return self.report(ExploreError::NotADirectory(root)),
            Err(e) => return self.fail(&root, e),
        }

        self.schedule(PendingWork {
            path:      root,
            index:     0,
            recursing: false,
            depth:     0,
        })?;

        let plan = Arc::clone(&self.plan);
        while let Some(work) = self.queue.pop_front() {
            self.check()?;
            trace!(
                path = %work.path.display(),
                index = work.index,
                depth = work.depth,
                recursing = work.recursing,
                "processing pending work"
            );

            match &plan.segments[work.index] {
                Segment::Constant(name) => self.visit_constant(&work, name)?,
                Segment::Recurse => self.schedule(PendingWork {
                    path:      work.path,
                    index:     work.index + 1,
                    recursing: true,
                    depth:     0,
                })?,
                Segment::Filter(re) => self.visit_filter(&work, re)?,
            }
        }

        Ok(())
    }

    /// Look up one literal name under `work.path`, then keep descending if a
    /// `**` above is still expanding.
    fn visit_constant(&mut self, work: &PendingWork, name: &str) -> Step {
        let last = self.is_last(work.index);
        let expand = work.recursing && self.can_descend(work.depth);

        let exact = work.path.join(name);
        let mut exact_hit = None;

        match fs::metadata(&exact) {
            Ok(meta) => exact_hit = Some(meta.is_dir()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => self.fail(&exact, e)?,
        }

        // Case-sensitive filesystems may hold several names that differ only
        // by case, so the listing decides there. The same listing yields the
        // recursion candidates.
        let scan_names = exact_hit.is_none() || !cfg!(windows);
        let mut hits: Vec<(PathBuf, bool)> = Vec::new();
        let mut subdirs = Vec::new();
        if scan_names || expand {
            let wanted = name.to_lowercase();
            for entry in self.list(&work.path) {
                self.check()?;
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        // A traversable but unreadable directory still has its exact hit.
                        if exact_hit.is_none() || expand {
                            self.fail(&work.path, e)?;
                        }
                        break;
                    }
                };

                if scan_names && entry.name.to_lowercase() == wanted {
                    hits.push((entry.path.clone(), resolves_to_dir(&entry)));
                }
                if expand && entry.is_dir() && !self.plan.is_ignored(&entry.name) {
                    subdirs.push(entry.path);
                }
            }
        }

        if hits.is_empty() {
            if let Some(is_dir) = exact_hit {
                hits.push((exact, is_dir));
            }
        }

        for (path, is_dir) in hits {
            if last {
                self.emit(path, is_dir)?;
            } else if is_dir {
                self.schedule(PendingWork {
                    path,
                    index: work.index + 1,
                    recursing: false,
                    depth: 0,
                })?;
            }
        }

        self.descend(work, subdirs)
    }

    /// List `work.path` once, matching every entry against `re`.
    fn visit_filter(&mut self, work: &PendingWork, re: &Regex) -> Step {
        let last = self.is_last(work.index);
        let expand = work.recursing && self.can_descend(work.depth);

        let mut subdirs = Vec::new();
        for entry in self.list(&work.path) {
            self.check()?;
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.fail(&work.path, e)?;
                    break;
                }
            };

            if entry.is_dir() {
                if self.plan.is_ignored(&entry.name) {
                    continue;
                }
                if re.is_match(&entry.name) {
                    if last {
                        self.emit(entry.path.clone(), true)?;
                    } else {
                        self.schedule(PendingWork {
                            path:      entry.path.clone(),
                            index:     work.index + 1,
                            recursing: false,
                            depth:     0,
                        })?;
                    }
                }
                if expand {
                    subdirs.push(entry.path);
                }
            } else if last && re.is_match(&entry.name) {
                // Links are reported by target kind but never entered.
                let is_dir = resolves_to_dir(&entry);
                self.emit(entry.path, is_dir)?;
            }
        }

        self.descend(work, subdirs)
    }

    /// Retry the same segment one level deeper in every candidate directory.
    fn descend(&mut self, work: &PendingWork, subdirs: Vec<PathBuf>) -> Step {
        for path in subdirs {
            self.schedule(PendingWork {
                path,
                index:     work.index,
                recursing: true,
                depth:     work.depth + 1,
            })?;
        }
        Ok(())
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn is_last(&self, index: usize) -> bool {
        index + 1 == self.plan.segments.len()
    }

    /// Whether a recursion at `depth` may expand one more level.
    fn can_descend(&self, depth: usize) -> bool {
        self.plan.max_depth == 0 || depth < self.plan.max_depth
    }

    fn list(&self, dir: &Path) -> EntryStream {
        EntryStream::open(dir, Arc::clone(&self.shutdown))
    }

    fn check(&self) -> Step {
        if self.shutdown.load(Ordering::Relaxed) {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    fn schedule(&mut self, work: PendingWork) -> Step {
        self.check()?;
        self.queue.push_back(work);
        Ok(())
    }

    fn emit(&self, path: PathBuf, is_dir: bool) -> Step {
        self.send(Ok(Match { path, is_dir }))
    }

    fn fail(&self, path: &Path, err: io::Error) -> Step {
        self.report(ExploreError::from_io(path, err))
    }

    fn report(&self, err: ExploreError) -> Step {
        debug!(error = %err, "traversal error");
        self.send(Err(err))
    }

    fn send(&self, item: Result<Match, ExploreError>) -> Step {
        self.check()?;
        self.tx.send(item).map_err(|_| Cancelled)
    }
}

/// Directories, plus symlinks that point at one.
fn resolves_to_dir(entry: &Entry) -> bool {
    match entry.kind {
        EntryKind::Dir => true,
        EntryKind::Symlink => fs::metadata(&entry.path).is_ok_and(|m| m.is_dir()),
        _ => false,
    }
}
