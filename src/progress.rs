//! Link-processing progress.
//!
//! Provides callback-based progress reporting that decouples the processor
//! from presentation (the CLI renders events with `indicatif`).

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Terminal state a link reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkStatus {
    /// Already in the dedup store; nothing was fetched.
    Deduped,
    /// Summary written and recorded.
    Succeeded,
    /// Fetch, summarisation or persistence failed.
    Failed,
}

/// Progress events emitted while links are processed.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The number of links about to be processed is known.
    Planned {
        /// Links in the batch.
        total: usize,
    },

    /// A link entered processing.
    Started {
        /// Industry the link belongs to.
        industry: String,
        /// The link.
        url: String,
    },

    /// A link reached a terminal state. Emitted exactly once per link.
    Finished {
        /// Industry the link belongs to.
        industry: String,
        /// The link.
        url: String,
        /// State reached.
        status: LinkStatus,
        /// Links finished so far, this one included.
        completed: usize,
    },
}

/// Callback type for receiving progress events.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Shared completion counter with an optional event sink.
#[derive(Default)]
pub struct LinkProgress {
    completed: AtomicUsize,
    callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for LinkProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkProgress")
            .field("completed", &self.completed())
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl LinkProgress {
    /// Counter without a sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter forwarding every event to `callback`.
    pub fn with_callback(callback: ProgressCallback) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            callback: Some(callback),
        }
    }

    /// Links that reached a terminal state.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Announce the size of the next batch.
    pub fn plan(&self, total: usize) {
        self.emit(ProgressEvent::Planned { total });
    }

    /// Start tracking one link.
    ///
    /// The returned ticket counts the link exactly once: on
    /// [`ProgressTicket::finish`], or as [`LinkStatus::Failed`] when dropped
    /// unfinished (for example when its task panics).
    pub fn begin(self: &Arc<Self>, industry: &str, url: &str) -> ProgressTicket {
        self.emit(ProgressEvent::Started {
            industry: industry.to_owned(),
            url: url.to_owned(),
        });
        ProgressTicket {
            progress: Arc::clone(self),
            industry: industry.to_owned(),
            url: url.to_owned(),
            done: false,
        }
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(callback) = &self.callback {
            callback(event);
        }
    }
}

/// Guard for one in-progress link.
#[derive(Debug)]
pub struct ProgressTicket {
    progress: Arc<LinkProgress>,
    industry: String,
    url: String,
    done: bool,
}

impl ProgressTicket {
    /// Record the terminal state and advance the counter.
    pub fn finish(mut self, status: LinkStatus) {
        self.complete(status);
    }

    fn complete(&mut self, status: LinkStatus) {
        if self.done {
            return;
        }
        self.done = true;
        let completed = self.progress.completed.fetch_add(1, Ordering::SeqCst) + 1;
        self.progress.emit(ProgressEvent::Finished {
            industry: std::mem::take(&mut self.industry),
            url: std::mem::take(&mut self.url),
            status,
            completed,
        });
    }
}

impl Drop for ProgressTicket {
    fn drop(&mut self) {
        self.complete(LinkStatus::Failed);
    }
}
