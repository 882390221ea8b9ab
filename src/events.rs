//! Structured events published by the file manager.
//!
//! The manager never logs directly. It hands each [`RenameEvent`] to every
//! subscribed [`RenameObserver`]; the binary wires up tracing, an optional
//! JSON-lines file and an in-memory log the terminal UI reads from.

use std::collections::VecDeque;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::numbering::NumberingPattern;

/// Why a candidate path was not added to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NotFound,
    NotAFile,
    Duplicate,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::NotFound => "not found",
            RejectReason::NotAFile => "not a regular file",
            RejectReason::Duplicate => "already in the list",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RenameEvent {
    FilesAdded {
        requested: usize,
        added: usize,
    },
    CandidateRejected {
        path: PathBuf,
        reason: RejectReason,
    },
    EntryRemoved {
        index: usize,
        name: String,
    },
    EntryMoved {
        from: usize,
        to: usize,
        name: String,
    },
    ListCleared {
        count: usize,
    },
    NumberingStripped {
        original: String,
        stripped: String,
        pattern: NumberingPattern,
    },
    FileRenamed {
        number: i64,
        from: PathBuf,
        to: PathBuf,
    },
    FileCopied {
        number: i64,
        from: PathBuf,
        to: PathBuf,
    },
    SourceVanished {
        path: PathBuf,
    },
    PassCompleted {
        processed: usize,
        skipped: usize,
    },
    PassFailed {
        processed: usize,
        error: String,
    },
}

impl fmt::Display for RenameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenameEvent::FilesAdded { requested, added } => {
                write!(f, "added {added} of {requested} file(s)")
            }
            RenameEvent::CandidateRejected { path, reason } => {
                write!(f, "skipped {}: {reason}", path.display())
            }
            RenameEvent::EntryRemoved { name, .. } => write!(f, "removed {name}"),
            RenameEvent::EntryMoved { from, to, name } => {
                write!(f, "moved {name} from {} to {}", from + 1, to + 1)
            }
            RenameEvent::ListCleared { count } => write!(f, "cleared {count} file(s)"),
            RenameEvent::NumberingStripped { original, stripped, .. } => {
                write!(f, "numbering found: '{original}' -> '{stripped}'")
            }
            RenameEvent::FileRenamed { from, to, .. } => {
                write!(f, "renamed {} -> {}", file_name(from), file_name(to))
            }
            RenameEvent::FileCopied { from, to, .. } => {
                write!(f, "copied {} -> {}", file_name(from), to.display())
            }
            RenameEvent::SourceVanished { path } => {
                write!(f, "missing on disk, skipped {}", path.display())
            }
            RenameEvent::PassCompleted { processed, skipped } => {
                write!(f, "done: {processed} file(s) numbered, {skipped} skipped")
            }
            RenameEvent::PassFailed { processed, error } => {
                write!(f, "stopped after {processed} file(s): {error}")
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub trait RenameObserver {
    fn on_event(&mut self, event: &RenameEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RenameObserver for TracingObserver {
    fn on_event(&mut self, event: &RenameEvent) {
        match event {
            RenameEvent::FilesAdded { requested, added } => {
                tracing::info!(requested, added, "files added");
            }
            RenameEvent::CandidateRejected { path, reason } => {
                tracing::debug!(path = %path.display(), %reason, "candidate rejected");
            }
            RenameEvent::EntryRemoved { index, name } => {
                tracing::debug!(index, name = %name, "entry removed");
            }
            RenameEvent::EntryMoved { from, to, name } => {
                tracing::debug!(from, to, name = %name, "entry moved");
            }
            RenameEvent::ListCleared { count } => {
                tracing::debug!(count, "list cleared");
            }
            RenameEvent::NumberingStripped { original, stripped, pattern } => {
                tracing::info!(original = %original, stripped = %stripped, %pattern, "existing numbering detected");
            }
            RenameEvent::FileRenamed { number, from, to } => {
                tracing::info!(number, from = %from.display(), to = %to.display(), "file renamed");
            }
            RenameEvent::FileCopied { number, from, to } => {
                tracing::info!(number, from = %from.display(), to = %to.display(), "file copied");
            }
            RenameEvent::SourceVanished { path } => {
                tracing::warn!(path = %path.display(), "source vanished before renaming");
            }
            RenameEvent::PassCompleted { processed, skipped } => {
                tracing::info!(processed, skipped, "rename pass completed");
            }
            RenameEvent::PassFailed { processed, error } => {
                tracing::error!(processed, error = %error, "rename pass aborted");
            }
        }
    }
}

/// Appends one JSON object per event to a file.
pub struct JsonLinesObserver {
    writer: BufWriter<File>,
}

impl JsonLinesObserver {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open event log {}", path.display()))?;
        Ok(Self::new(file))
    }

    pub fn new(file: File) -> Self {
        Self {
            writer: BufWriter::new(file),
        }
    }
}

impl RenameObserver for JsonLinesObserver {
    fn on_event(&mut self, event: &RenameEvent) {
        let written = serde_json::to_writer(&mut self.writer, event)
            .map_err(std::io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"))
            .and_then(|_| self.writer.flush());
        if let Err(e) = written {
            tracing::warn!(error = %e, "failed to write event line");
        }
    }
}

/// Bounded in-memory event history. Clones share the same buffer.
#[derive(Debug, Clone)]
pub struct EventLog {
    inner: Arc<Mutex<VecDeque<RenameEvent>>>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    /// Events oldest first.
    pub fn snapshot(&self) -> Vec<RenameEvent> {
        match self.inner.lock() {
            Ok(events) => events.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    pub fn recent(&self, n: usize) -> Vec<RenameEvent> {
        let all = self.snapshot();
        let skip = all.len().saturating_sub(n);
        all.into_iter().skip(skip).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RenameObserver for EventLog {
    fn on_event(&mut self, event: &RenameEvent) {
        let mut events = match self.inner.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}
