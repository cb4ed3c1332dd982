// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of Lindaspace.
//
// Lindaspace is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// Lindaspace is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with Lindaspace. If not, see <https://www.gnu.org/licenses/>.

//! Blocking match store
//!
//! ## Purpose
//! Holds the resident tuples and the queue of blocked requests waiting for a
//! match. This is the only shared mutable state behind a tuple space.
//!
//! ## Design
//! - **Tuples**: `Vec<Entry>` in publish order; the earliest match wins. Each
//!   entry keeps its publish sequence number
//! - **Waiters**: `VecDeque<Waiter>` in registration order, each holding a
//!   `oneshot::Sender` used to resume the blocked caller
//! - **Locking**: one `parking_lot::Mutex` around both collections. No lock
//!   is ever held across an `.await`, so every operation is atomic and none
//!   of them suspend
//!
//! ## Offer Order
//! A published tuple is offered to matching waiters oldest first. Readers
//! get a copy and the offer continues; the first consumer takes the tuple
//! and the offer stops. If nobody consumes it, the tuple stays resident.
//!
//! ## Cancellation
//! Dropping a [`Request`] before its caller observed the result removes its
//! waiter. A tuple it had already consumed, whether at call time or from a
//! later publish, is restored: offered to the current waiters and otherwise
//! put back at its original publish position. Restoring undoes the take in
//! the stats and does not count as a write.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

use crate::{Pattern, Tuple, TupleSpaceError};

/// Statistics
///
/// A take by a request that is dropped unobserved is undone when the tuple
/// is restored, so the counters only reflect tuples callers actually got.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TupleSpaceStats {
    total_writes: u64,
    total_reads: u64,
    total_takes: u64,
    current_size: usize,
    pending_waiters: usize,
}

impl TupleSpaceStats {
    /// Get total number of write operations
    pub fn total_writes(&self) -> u64 {
        self.total_writes
    }

    /// Get total number of successful non-destructive reads
    pub fn total_reads(&self) -> u64 {
        self.total_reads
    }

    /// Get total number of successful take operations
    pub fn total_takes(&self) -> u64 {
        self.total_takes
    }

    /// Get current number of tuples in the space
    pub fn current_size(&self) -> usize {
        self.current_size
    }

    /// Get number of blocked requests
    pub fn pending_waiters(&self) -> usize {
        self.pending_waiters
    }
}

/// Tuple tagged with its publish sequence
#[derive(Clone)]
struct Entry {
    seq: u64,
    tuple: Tuple,
}

/// Blocked request waiting for a matching publish
struct Waiter {
    seq: u64,
    pattern: Pattern,
    remove: bool,
    resume: oneshot::Sender<Entry>,
}

struct StoreState {
    tuples: Vec<Entry>,
    waiters: VecDeque<Waiter>,
    next_waiter_seq: u64,
    next_tuple_seq: u64,
    stats: TupleSpaceStats,
}

impl StoreState {
    /// Resolve against resident tuples, earliest first
    fn take_first(&mut self, pattern: &Pattern, remove: bool) -> Option<Entry> {
        let position = self.tuples.iter().position(|e| pattern.matches(&e.tuple))?;

        if remove {
            let entry = self.tuples.remove(position);
            self.stats.total_takes += 1;
            Some(entry)
        } else {
            self.stats.total_reads += 1;
            Some(self.tuples[position].clone())
        }
    }

    /// Offer a tuple to waiters in registration order.
    /// Returns true if a consumer took it.
    fn offer(&mut self, entry: &Entry, namespace: &str) -> bool {
        let mut idx = 0;
        while idx < self.waiters.len() {
            if !self.waiters[idx].pattern.matches(&entry.tuple) {
                idx += 1;
                continue;
            }

            let Some(waiter) = self.waiters.remove(idx) else {
                break;
            };

            if waiter.resume.send(entry.clone()).is_err() {
                tracing::warn!(namespace, seq = waiter.seq, "Dropping abandoned waiter");
                continue;
            }

            if waiter.remove {
                self.stats.total_takes += 1;
                tracing::debug!(namespace, seq = waiter.seq, "Waiter consumed published tuple");
                return true;
            }

            self.stats.total_reads += 1;
            tracing::debug!(namespace, seq = waiter.seq, "Waiter read published tuple");
        }

        false
    }

    /// Put an entry back at its publish position
    fn insert(&mut self, entry: Entry) {
        let position = self.tuples.partition_point(|e| e.seq < entry.seq);
        self.tuples.insert(position, entry);
    }

    fn cancel(&mut self, seq: u64) -> bool {
        match self.waiters.iter().position(|w| w.seq == seq) {
            Some(position) => {
                self.waiters.remove(position);
                self.refresh_gauges();
                true
            }
            None => false,
        }
    }

    fn refresh_gauges(&mut self) {
        self.stats.current_size = self.tuples.len();
        self.stats.pending_waiters = self.waiters.len();
    }
}

/// Tuple bag with blocking and non-blocking match requests
///
/// Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct MatchStore {
    state: Arc<Mutex<StoreState>>,
    namespace: Arc<str>,
}

impl MatchStore {
    /// Create an empty store
    pub fn new(namespace: &str) -> Self {
        Self::with_capacity(namespace, 0, 0)
    }

    /// Create an empty store with pre-sized tuple and waiter collections
    pub fn with_capacity(namespace: &str, tuples: usize, waiters: usize) -> Self {
        MatchStore {
            state: Arc::new(Mutex::new(StoreState {
                tuples: Vec::with_capacity(tuples),
                waiters: VecDeque::with_capacity(waiters),
                next_waiter_seq: 0,
                next_tuple_seq: 0,
                stats: TupleSpaceStats::default(),
            })),
            namespace: Arc::from(namespace),
        }
    }

    /// Namespace used to label log output
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Add a tuple and resume any waiters it satisfies. Never blocks.
    pub fn publish(&self, tuple: Tuple) {
        let mut state = self.state.lock();
        state.stats.total_writes += 1;

        let entry = Entry {
            seq: state.next_tuple_seq,
            tuple,
        };
        state.next_tuple_seq += 1;

        let consumed = state.offer(&entry, &self.namespace);
        if !consumed {
            state.tuples.push(entry);
        }
        state.refresh_gauges();

        tracing::debug!(
            namespace = %self.namespace,
            consumed,
            resident = state.tuples.len(),
            "Published tuple"
        );
    }

    /// Request the first tuple matching `pattern`, waiting if necessary
    ///
    /// The waiter is registered when this is called, not when the returned
    /// future is first polled, so call order fixes resolution order.
    pub fn request(&self, pattern: Pattern, remove: bool) -> Request {
        let mut state = self.state.lock();

        if let Some(entry) = state.take_first(&pattern, remove) {
            state.refresh_gauges();
            tracing::trace!(namespace = %self.namespace, remove, "Request resolved immediately");
            return Request {
                store: self.clone(),
                remove,
                ready: Some(entry),
                registration: None,
            };
        }

        let (tx, rx) = oneshot::channel();
        let seq = state.next_waiter_seq;
        state.next_waiter_seq += 1;
        state.waiters.push_back(Waiter {
            seq,
            pattern,
            remove,
            resume: tx,
        });
        state.refresh_gauges();
        drop(state);

        tracing::debug!(namespace = %self.namespace, seq, remove, "Registered waiter");

        Request {
            store: self.clone(),
            remove,
            ready: None,
            registration: Some(Registration { seq, resume: rx }),
        }
    }

    /// Request the first tuple matching `pattern` without waiting
    ///
    /// ## Errors
    /// - [`TupleSpaceError::NotFound`]: nothing matched; the store is unchanged
    pub fn try_request(&self, pattern: &Pattern, remove: bool) -> Result<Tuple, TupleSpaceError> {
        let mut state = self.state.lock();
        let found = state.take_first(pattern, remove);
        state.refresh_gauges();
        tracing::trace!(namespace = %self.namespace, remove, found = found.is_some(), "Scanned store");
        found.map(|entry| entry.tuple).ok_or(TupleSpaceError::NotFound)
    }

    /// Snapshot of resident tuples in publish order
    pub fn peek_all(&self) -> Vec<Tuple> {
        self.state
            .lock()
            .tuples
            .iter()
            .map(|entry| entry.tuple.clone())
            .collect()
    }

    /// Number of resident tuples
    pub fn len(&self) -> usize {
        self.state.lock().tuples.len()
    }

    /// Whether the store has no resident tuples
    pub fn is_empty(&self) -> bool {
        self.state.lock().tuples.is_empty()
    }

    /// Number of blocked requests
    pub fn pending_waiters(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Operation counters
    pub fn stats(&self) -> TupleSpaceStats {
        self.state.lock().stats.clone()
    }

    fn cancel(&self, seq: u64) -> bool {
        let cancelled = self.state.lock().cancel(seq);
        if cancelled {
            tracing::debug!(namespace = %self.namespace, seq, "Cancelled waiter");
        }
        cancelled
    }

    /// Return a consumed tuple nobody observed
    fn restore(&self, entry: Entry) {
        let mut state = self.state.lock();
        state.stats.total_takes = state.stats.total_takes.saturating_sub(1);

        let consumed = state.offer(&entry, &self.namespace);
        if !consumed {
            state.insert(entry);
        }
        state.refresh_gauges();

        tracing::debug!(
            namespace = %self.namespace,
            consumed,
            resident = state.tuples.len(),
            "Restored tuple consumed by a dropped request"
        );
    }
}

/// Pending match request returned by [`MatchStore::request`]
///
/// Resolves with the matched tuple. Dropping it before it resolves cancels
/// the request; a tuple it already consumed goes back to the store.
#[must_use = "dropping a request cancels it"]
pub struct Request {
    store: MatchStore,
    remove: bool,
    ready: Option<Entry>,
    registration: Option<Registration>,
}

impl Request {
    /// Whether this request has a waiter registered in the store
    pub fn is_registered(&self) -> bool {
        self.registration.is_some()
    }
}

impl Future for Request {
    type Output = Tuple;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Tuple> {
        let this = self.get_mut();

        if let Some(entry) = this.ready.take() {
            return Poll::Ready(entry.tuple);
        }

        let Some(registration) = this.registration.as_mut() else {
            return Poll::Pending;
        };

        match Pin::new(&mut registration.resume).poll(cx) {
            Poll::Ready(Ok(entry)) => {
                this.registration = None;
                Poll::Ready(entry.tuple)
            }
            // the sender is only dropped after a successful send or after
            // cancel(), which needs this request to be dropped first
            Poll::Ready(Err(_)) => Poll::Pending,
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for Request {
    fn drop(&mut self) {
        let unobserved = match self.registration.take() {
            Some(mut registration) => {
                if self.store.cancel(registration.seq) {
                    None
                } else {
                    // offer() sends under the lock, so the value is already here
                    registration.resume.try_recv().ok()
                }
            }
            None => self.ready.take(),
        };

        if let Some(entry) = unobserved {
            if self.remove {
                self.store.restore(entry);
            }
        }
    }
}

struct Registration {
    seq: u64,
    resume: oneshot::Receiver<Entry>,
}
