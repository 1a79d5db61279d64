//! Bounded in-process record of recently handled failures.
//!
//! [`RecentFailures`] is an [`ErrorLogger`] that keeps the last N log lines in
//! a fixed-size ring with FIFO eviction. Useful for tests, health endpoints,
//! or a debug page listing what went wrong lately without shipping logs
//! anywhere.
//!
//! - Fixed capacity; oldest entries are dropped first
//! - Each entry is capped at `max_entry_bytes`
//! - `RwLock`: concurrent readers, exclusive writers; a poisoned lock is
//!   recovered rather than propagated
//! - Entries hold `Arc<str>`, so reads clone refcounts, not strings
//!
//! # Example
//!
//! ```rust
//! use taxon_errors::{ErrorLogger, HttpStatus, LogLine, RecentFailures};
//!
//! let recent = RecentFailures::new(100, 1024);
//! recent.log_failure(&LogLine {
//!     host: "api-1",
//!     status: HttpStatus::new(500),
//!     method: "GET",
//!     path: "/health",
//!     kind: "Error",
//!     message: "db down",
//!     stack: None,
//! });
//!
//! let last = recent.get_recent(1);
//! assert_eq!(last[0].status, 500);
//! ```

use crate::logging::{ErrorLogger, LogLine, truncate_to};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};

/// Appended to fields cut to fit an entry's byte budget.
const ENTRY_TRUNCATION_INDICATOR: &str = "...[TRUNC]";

/// One recorded failure.
#[derive(Clone, Debug)]
pub struct FailureEntry {
    /// Unix timestamp (seconds) when the line was recorded.
    pub timestamp: u64,
    /// Resolved HTTP status.
    pub status: u16,
    /// Request method.
    pub method: Arc<str>,
    /// Request path, possibly truncated.
    pub path: Arc<str>,
    /// Failure kind name.
    pub kind: Arc<str>,
    /// Message, possibly truncated.
    pub message: Arc<str>,
    /// Approximate size in bytes
    pub size_bytes: usize,
}

/// Fixed-size ring with exact allocation.
struct RingBuffer {
    entries: Box<[Option<FailureEntry>]>,
    tail: usize,
    head: usize,
    len: usize,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            entries: std::iter::repeat_with(|| None)
                .take(capacity)
                .collect::<Box<[Option<FailureEntry>]>>(),
            tail: 0,
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, entry: FailureEntry) -> Option<FailureEntry> {
        let evicted = self.entries[self.tail].replace(entry);
        self.tail = (self.tail + 1) % self.entries.len();

        if self.len < self.entries.len() {
            self.len += 1;
        } else {
            self.head = (self.head + 1) % self.entries.len();
        }

        evicted
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn iter(&self) -> impl DoubleEndedIterator<Item = &FailureEntry> {
        let head = self.head;
        let cap = self.entries.len();

        (0..self.len).filter_map(move |i| self.entries[(head + i) % cap].as_ref())
    }

    fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry = None;
        }
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }
}

/// Ring-buffer [`ErrorLogger`] with bounded memory.
///
/// Clones share the same buffer.
#[derive(Clone)]
pub struct RecentFailures {
    buffer: Arc<RwLock<RingBuffer>>,
    max_entries: usize,
    max_entry_bytes: usize,
    eviction_count: Arc<AtomicU64>,
}

impl RecentFailures {
    /// Keep at most `max_entries` lines (minimum 1), each capped at
    /// `max_entry_bytes`.
    pub fn new(max_entries: usize, max_entry_bytes: usize) -> Self {
        let bounded_entries = max_entries.max(1);
        Self {
            buffer: Arc::new(RwLock::new(RingBuffer::new(bounded_entries))),
            max_entries: bounded_entries,
            max_entry_bytes,
            eviction_count: Arc::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    fn read_buffer(&self) -> RwLockReadGuard<'_, RingBuffer> {
        match self.buffer.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[inline]
    fn write_buffer(&self) -> RwLockWriteGuard<'_, RingBuffer> {
        match self.buffer.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Build a bounded entry. The message gets whatever budget the short
    /// fields leave.
    fn create_entry(&self, line: &LogLine<'_>) -> FailureEntry {
        let mut remaining = self.max_entry_bytes;
        let mut take = |s: &str, cap: usize| -> Arc<str> {
            let truncated = truncate_to(s, remaining.min(cap), ENTRY_TRUNCATION_INDICATOR);
            remaining = remaining.saturating_sub(truncated.len());
            Arc::from(truncated.as_ref())
        };

        let method = take(line.method, 16);
        let kind = take(line.kind, 64);
        let path = take(line.path, 256);
        let message = take(line.message, usize::MAX);

        FailureEntry {
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs()),
            status: line.status.value(),
            size_bytes: method.len() + kind.len() + path.len() + message.len(),
            method,
            path,
            kind,
            message,
        }
    }

    /// The `count` most recent entries, newest first.
    pub fn get_recent(&self, count: usize) -> Vec<FailureEntry> {
        let buffer = self.read_buffer();
        buffer.iter().rev().take(count).cloned().collect()
    }

    /// All entries, newest first.
    pub fn get_all(&self) -> Vec<FailureEntry> {
        let buffer = self.read_buffer();
        buffer.iter().rev().cloned().collect()
    }

    /// Entries matching `predicate`, oldest first.
    pub fn get_filtered<F>(&self, predicate: F) -> Vec<FailureEntry>
    where
        F: Fn(&FailureEntry) -> bool,
    {
        let buffer = self.read_buffer();
        buffer.iter().filter(|e| predicate(e)).cloned().collect()
    }

    /// Entries currently held.
    #[inline]
    pub fn len(&self) -> usize {
        self.read_buffer().len()
    }

    /// Whether nothing is held.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total entries dropped to make room since creation.
    #[inline]
    pub fn eviction_count(&self) -> u64 {
        self.eviction_count.load(Ordering::Relaxed)
    }

    /// Drop every entry; the eviction count is kept.
    pub fn clear(&self) {
        self.write_buffer().clear();
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }
}

impl ErrorLogger for RecentFailures {
    fn log_failure(&self, line: &LogLine<'_>) {
        let entry = self.create_entry(line);
        if self.write_buffer().push(entry).is_some() {
            self.eviction_count.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl std::fmt::Debug for RecentFailures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecentFailures")
            .field("len", &self.len())
            .field("capacity", &self.max_entries)
            .field("evictions", &self.eviction_count())
            .finish()
    }
}
