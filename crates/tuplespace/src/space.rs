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

//! TupleSpace module for process coordination
//!
//! The five Linda operations on top of a [`MatchStore`]:
//!
//! | op    | blocking | removes | on no match      |
//! |-------|----------|---------|------------------|
//! | `out` | no       | n/a     | n/a              |
//! | `in_` | yes      | yes     | waits            |
//! | `rd`  | yes      | no      | waits            |
//! | `inp` | no       | yes     | `Err(NotFound)`  |
//! | `rdp` | no       | no      | `Err(NotFound)`  |
//!
//! ## Example
//! ```
//! use lindaspace_tuplespace::{pattern, tuple, FieldType, Scheduler, TupleSpace};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), lindaspace_tuplespace::TupleSpaceError> {
//! let space = TupleSpace::new(Scheduler::current()?);
//!
//! space.out(tuple!(1, 2)).await;
//! space.out(tuple!("three", 4)).await;
//!
//! assert_eq!(space.in_(pattern!("three", FieldType::Integer)).await, tuple!("three", 4));
//! assert_eq!(space.rdp(pattern!(FieldType::Any, 2))?, tuple!(1, 2));
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::{ready, Future, Ready};
use std::time::Duration;

use crate::scheduler::{Event, EventTrigger, Process, Scheduler};
use crate::store::{MatchStore, Request, TupleSpaceStats};
use crate::{Pattern, Tuple, TupleSpaceError};

/// TupleSpace for coordination
///
/// Cloning is cheap; clones share the same tuples and waiters, so a clone
/// can be moved into every process that coordinates through the space.
#[derive(Clone)]
pub struct TupleSpace {
    store: MatchStore,
    scheduler: Scheduler,
}

impl TupleSpace {
    /// Create an empty in-memory tuple space with default configuration
    pub fn new(scheduler: Scheduler) -> Self {
        Self::with_store(MatchStore::new(crate::config::DEFAULT_NAMESPACE), scheduler)
    }

    pub(crate) fn with_store(store: MatchStore, scheduler: Scheduler) -> Self {
        TupleSpace { store, scheduler }
    }

    /// Write a tuple to the space
    ///
    /// The tuple is published before this returns; the returned future is
    /// already complete and exists so callers can sequence on it.
    pub fn out(&self, tuple: Tuple) -> Ready<()> {
        self.store.publish(tuple);
        ready(())
    }

    /// Take a tuple matching `pattern`, waiting until one exists
    pub fn in_(&self, pattern: Pattern) -> Request {
        self.store.request(pattern, true)
    }

    /// Read a tuple matching `pattern` without removing it, waiting until one exists
    pub fn rd(&self, pattern: Pattern) -> Request {
        self.store.request(pattern, false)
    }

    /// Take a tuple matching `pattern` if one is resident
    ///
    /// ## Errors
    /// - [`TupleSpaceError::NotFound`]: no resident tuple matches
    pub fn inp(&self, pattern: Pattern) -> Result<Tuple, TupleSpaceError> {
        self.store.try_request(&pattern, true)
    }

    /// Read a tuple matching `pattern` if one is resident
    ///
    /// ## Errors
    /// - [`TupleSpaceError::NotFound`]: no resident tuple matches
    pub fn rdp(&self, pattern: Pattern) -> Result<Tuple, TupleSpaceError> {
        self.store.try_request(&pattern, false)
    }

    /// All resident tuples in publish order
    pub fn items(&self) -> Vec<Tuple> {
        self.store.peek_all()
    }

    /// Number of resident tuples
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no tuples are resident
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Get space statistics
    pub fn stats(&self) -> TupleSpaceStats {
        self.store.stats()
    }

    /// Namespace this space logs under
    pub fn namespace(&self) -> &str {
        self.store.namespace()
    }

    /// Scheduler this space spawns processes on
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Current scheduler time
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Resolve with `value` after `delay`
    pub fn timeout<T>(&self, delay: Duration, value: T) -> impl Future<Output = T> + Send + 'static
    where
        T: Send + 'static,
    {
        self.scheduler.timeout(delay, value)
    }

    /// Create a resolve-once event
    pub fn event<T>(&self) -> (EventTrigger<T>, Event<T>)
    where
        T: Clone + Send + 'static,
    {
        self.scheduler.event()
    }

    /// Wait for every process to succeed
    pub async fn all_of<T>(&self, processes: Vec<Process<T>>) -> Result<Vec<T>, TupleSpaceError>
    where
        T: Send + 'static,
    {
        self.scheduler.all_of(processes).await
    }

    /// Wait for the first process to succeed
    pub async fn any_of<T>(&self, processes: Vec<Process<T>>) -> Result<(usize, T), TupleSpaceError>
    where
        T: Send + 'static,
    {
        self.scheduler.any_of(processes).await
    }
}

impl fmt::Debug for TupleSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TupleSpace")
            .field("namespace", &self.namespace())
            .field("len", &self.len())
            .finish()
    }
}

/// Dump of the resident tuples, one field per line
impl fmt::Display for TupleSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.items();
        for (i, tuple) in items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "(")?;
            for field in tuple.fields() {
                writeln!(f, "  {},", field)?;
            }
            write!(f, "),")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pattern, tuple, FieldType};
    use futures::poll;
    use std::task::Poll;

    fn space() -> TupleSpace {
        TupleSpace::new(Scheduler::current().unwrap())
    }

    #[tokio::test]
    async fn test_out_keeps_publish_order() {
        let space = space();
        space.out(tuple!(2)).await;
        space.out(tuple!(1)).await;
        assert_eq!(space.items(), vec![tuple!(2), tuple!(1)]);
    }

    #[tokio::test]
    async fn test_out_out_in() {
        let space = space();
        let mut take = space.in_(pattern!(1));

        space.out(tuple!(2)).await;
        assert_eq!(poll!(&mut take), Poll::Pending);

        space.out(tuple!(1)).await;
        assert_eq!(poll!(&mut take), Poll::Ready(tuple!(1)));
        assert_eq!(space.items(), vec![tuple!(2)]);
    }

    #[tokio::test]
    async fn test_out_out_rd() {
        let space = space();
        let mut read = space.rd(pattern!(1));

        space.out(tuple!(2)).await;
        assert_eq!(poll!(&mut read), Poll::Pending);

        space.out(tuple!(1)).await;
        assert_eq!(poll!(&mut read), Poll::Ready(tuple!(1)));
        assert_eq!(space.items(), vec![tuple!(2), tuple!(1)]);
    }

    #[tokio::test]
    async fn test_in_removes_just_one_duplicated_tuple() {
        let space = space();
        let take = space.in_(pattern!(1));
        space.out(tuple!(1)).await;
        space.out(tuple!(1)).await;

        assert_eq!(take.await, tuple!(1));
        assert_eq!(space.items(), vec![tuple!(1)]);
    }

    #[tokio::test]
    async fn test_in_returns_resident_tuple() {
        let space = space();
        space.out(tuple!(1)).await;
        assert_eq!(space.in_(pattern!(1)).await, tuple!(1));
        assert!(space.is_empty());
    }

    #[tokio::test]
    async fn test_rdp() {
        let space = space();
        space.out(tuple!(1, 2)).await;
        assert_eq!(space.rdp(pattern!(1, FieldType::Any)), Ok(tuple!(1, 2)));
        assert_eq!(space.items(), vec![tuple!(1, 2)]);
    }

    #[tokio::test]
    async fn test_rdp_not_found() {
        let space = space();
        space.out(tuple!(1, 2)).await;
        assert_eq!(
            space.rdp(pattern!(1, "not in tuple-space")),
            Err(TupleSpaceError::NotFound)
        );
        assert_eq!(space.items(), vec![tuple!(1, 2)]);
    }

    #[tokio::test]
    async fn test_inp() {
        let space = space();
        space.out(tuple!(1, 2)).await;
        assert_eq!(space.inp(pattern!(1, FieldType::Any)), Ok(tuple!(1, 2)));
        assert!(space.is_empty());
    }

    #[tokio::test]
    async fn test_inp_not_found() {
        let space = space();
        space.out(tuple!(1, 2)).await;
        assert_eq!(
            space.inp(pattern!(1, "not in tuple-space")),
            Err(TupleSpaceError::NotFound)
        );
        assert_eq!(space.items(), vec![tuple!(1, 2)]);
    }

    #[tokio::test]
    async fn test_clones_share_store() {
        let space = space();
        let other = space.clone();
        other.out(tuple!("shared")).await;
        assert_eq!(space.rdp(pattern!("shared")), Ok(tuple!("shared")));
    }

    #[tokio::test]
    async fn test_unawaited_in_does_not_lose_tuple() {
        let space = space();
        space.out(tuple!(1)).await;

        drop(space.in_(pattern!(1)));
        assert_eq!(space.items(), vec![tuple!(1)]);

        tokio::select! {
            biased;
            _ = std::future::ready(()) => {}
            _ = space.in_(pattern!(1)) => panic!("losing branch resolved"),
        }
        assert_eq!(space.items(), vec![tuple!(1)]);
    }

    #[tokio::test]
    async fn test_display_dump() {
        let space = space();
        space.out(tuple!("a", 1)).await;
        space.out(tuple!(true)).await;

        assert_eq!(
            space.to_string(),
            "(\n  \"a\",\n  1,\n),\n(\n  true,\n),"
        );
    }
}
