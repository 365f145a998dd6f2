use std::fs;
use std::io;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::vec;

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::trace;

use crate::entry::Entry;

/// Entries read from the directory handle before being handed to the consumer.
pub(crate) const BATCH_SIZE: usize = 100;

/// Batches buffered between the producer thread and the consumer.
pub(crate) const QUEUE_BATCHES: usize = 4;

type Batch = io::Result<Vec<Entry>>;

// ---------------------------------------------------------------------------
// EntryStream
// ---------------------------------------------------------------------------

/// Lazy listing of one directory, filled by a background producer.
///
/// The producer reads [`BATCH_SIZE`] entries at a time into a bounded queue
/// of [`QUEUE_BATCHES`] batches. A read error is yielded as the final item.
/// Dropping the stream disconnects the queue, which stops the producer at its
/// next push.
pub(crate) struct EntryStream {
    rx:      Receiver<Batch>,
    current: vec::IntoIter<Entry>,
    done:    bool,
}

impl EntryStream {
    pub(crate) fn open(dir: &Path, shutdown: Arc<AtomicBool>) -> Self {
        let (tx, rx) = bounded(QUEUE_BATCHES);

        let producer_tx = tx.clone();
        let path = dir.to_path_buf();
        let spawned = thread::Builder::new()
            .name("globex-readdir".into())
            .spawn(move || produce(path, producer_tx, shutdown));

        if let Err(e) = spawned {
            let _ = tx.send(Err(e));
        }

        Self {
            rx,
            current: Vec::new().into_iter(),
            done: false,
        }
    }
}

impl Iterator for EntryStream {
    type Item = io::Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.next() {
                return Some(Ok(entry));
            }
            if self.done {
                return None;
            }
            match self.rx.recv() {
                Ok(Ok(batch)) => self.current = batch.into_iter(),
                Ok(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Err(_) => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Producer
// ---------------------------------------------------------------------------

fn produce(dir: PathBuf, tx: Sender<Batch>, shutdown: Arc<AtomicBool>) {
    let read = match fs::read_dir(&dir) {
        Ok(read) => read,
        Err(e) => {
            let _ = tx.send(Err(e));
            return;
        }
    };

    let mut batch = Vec::with_capacity(BATCH_SIZE);

    for res in read {
        if shutdown.load(Ordering::Relaxed) {
            return;
        }

        match res.and_then(|de| Entry::from_dir_entry(&de)) {
            Ok(entry) => batch.push(entry),
            Err(e) => {
                if !batch.is_empty() && tx.send(Ok(mem::take(&mut batch))).is_err() {
                    return;
                }
                let _ = tx.send(Err(e));
                return;
            }
        }

        if batch.len() == BATCH_SIZE {
            trace!(dir = %dir.display(), entries = BATCH_SIZE, "directory batch read");
            let full = mem::replace(&mut batch, Vec::with_capacity(BATCH_SIZE));
            if tx.send(Ok(full)).is_err() {
                return;
            }
        }
    }

    if !batch.is_empty() {
        trace!(dir = %dir.display(), entries = batch.len(), "directory batch read");
        let _ = tx.send(Ok(batch));
    }
}
