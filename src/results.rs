use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use tracing::{debug, warn};

use crate::error::ExploreError;

/// One path matched by a traversal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Match {
    /// Root-relative path as reached by the walk (root joined with each
    /// matched component).
    pub path: PathBuf,

    /// Whether the matched path is a directory.
    pub is_dir: bool,
}

/// The result sequence of one [`SearchPlan::explore`](crate::SearchPlan::explore) call.
///
/// Finite, single-pass, and not restartable. Items arrive in breadth-first
/// discovery order; an `Err` item reports a filesystem failure at one path
/// and the sequence carries on after it.
///
/// Dropping `Matches` before it is exhausted stops the background worker
/// and waits for it to exit.
pub struct Matches {
    rx:       Option<Receiver<Result<Match, ExploreError>>>,
    shutdown: Arc<AtomicBool>,
    worker:   Option<JoinHandle<()>>,
}

impl Matches {
    pub(crate) fn new(
        rx: Receiver<Result<Match, ExploreError>>,
        shutdown: Arc<AtomicBool>,
        worker: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            rx: Some(rx),
            shutdown,
            worker,
        }
    }

    /// Flag that aborts the traversal when set.
    ///
    /// Lets another thread stop a walk that the owning thread is blocked
    /// draining; the sequence then ends once already-queued items are consumed.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }
}

impl Iterator for Matches {
    type Item = Result<Match, ExploreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rx.as_ref()?.recv().ok()
    }
}

impl Drop for Matches {
    fn drop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        if !worker.is_finished() {
            debug!("traversal abandoned, stopping worker");
        }
        self.shutdown.store(true, Ordering::Relaxed);
        // Disconnect first so a worker blocked on a full queue wakes up.
        self.rx.take();
        if worker.join().is_err() {
            warn!("traversal worker panicked");
        }
    }
}
