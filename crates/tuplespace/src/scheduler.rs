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

//! Scheduling context
//!
//! ## Purpose
//! Everything that can suspend receives a [`Scheduler`] explicitly instead of
//! relying on whatever runtime happens to be ambient. The scheduler provides
//! the primitives the tuple space coordinates with:
//! - **Spawn**: run a fallible future as an independent [`Process`]
//! - **Event**: a resolve-once [`Event`] that wakes every waiter
//! - **Timer**: resume after a delay with a value
//! - **Join**: wait for all (or any) of a set of processes
//!
//! ## Time
//! [`Scheduler::now`] measures from the scheduler's creation using
//! `tokio::time::Instant`, so tests running with a paused clock observe
//! virtual time.

use futures::future::{BoxFuture, FutureExt, Shared, TryFutureExt};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::{AbortHandle, JoinError, JoinHandle};
use tokio::time::Instant;

use crate::TupleSpaceError;

/// Explicit handle to the runtime that drives processes and timers
#[derive(Clone)]
pub struct Scheduler {
    handle: Handle,
    epoch: Instant,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl Scheduler {
    /// Capture the runtime the caller is running on
    ///
    /// ## Errors
    /// - [`TupleSpaceError::NoRuntime`]: called outside a tokio runtime
    pub fn current() -> Result<Self, TupleSpaceError> {
        let handle =
            Handle::try_current().map_err(|e| TupleSpaceError::NoRuntime(e.to_string()))?;
        Ok(Self::from_handle(handle))
    }

    /// Schedule on an explicit runtime handle
    pub fn from_handle(handle: Handle) -> Self {
        let epoch = {
            let _guard = handle.enter();
            Instant::now()
        };
        Scheduler { handle, epoch }
    }

    /// Time elapsed since this scheduler was created
    pub fn now(&self) -> Duration {
        Instant::now().saturating_duration_since(self.epoch)
    }

    /// Start a process
    ///
    /// The future starts running immediately, whether or not the returned
    /// handle is ever awaited.
    pub fn spawn<F, T>(&self, future: F) -> Process<T>
    where
        F: Future<Output = Result<T, TupleSpaceError>> + Send + 'static,
        T: Send + 'static,
    {
        Process {
            handle: self.handle.spawn(future),
        }
    }

    /// Resolve with `value` once `delay` has passed
    ///
    /// The deadline is fixed when this is called, not when the future is
    /// first polled.
    pub fn timeout<T>(&self, delay: Duration, value: T) -> impl Future<Output = T> + Send + 'static
    where
        T: Send + 'static,
    {
        let deadline = Instant::now() + delay;
        async move {
            tokio::time::sleep_until(deadline).await;
            value
        }
    }

    /// Create an unresolved event and the trigger that resolves it
    pub fn event<T>(&self) -> (EventTrigger<T>, Event<T>)
    where
        T: Clone + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel::<Result<T, String>>();
        let outcome = receiver
            .map(|received| match received {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(reason)) => Err(TupleSpaceError::EventFailed(reason)),
                Err(_) => Err(TupleSpaceError::EventFailed(
                    "trigger dropped before resolving".to_string(),
                )),
            })
            .boxed()
            .shared();

        (EventTrigger { sender }, Event { outcome })
    }

    /// Wait for every process, returning outputs in input order
    ///
    /// Fails with the first error as soon as any member fails, without
    /// waiting for the rest. Members are not aborted.
    pub async fn all_of<T>(&self, processes: Vec<Process<T>>) -> Result<Vec<T>, TupleSpaceError>
    where
        T: Send + 'static,
    {
        futures::future::try_join_all(processes).await
    }

    /// Wait for the first process to succeed, returning its index and output
    ///
    /// Fails only if every member fails, with the last failure observed.
    pub async fn any_of<T>(&self, processes: Vec<Process<T>>) -> Result<(usize, T), TupleSpaceError>
    where
        T: Send + 'static,
    {
        if processes.is_empty() {
            return Err(TupleSpaceError::ProcessFailed(
                "any_of called with no processes".to_string(),
            ));
        }

        let indexed = processes
            .into_iter()
            .enumerate()
            .map(|(index, process)| process.map_ok(move |value| (index, value)));

        let (winner, _rest) = futures::future::select_ok(indexed).await?;
        Ok(winner)
    }
}

/// Handle to a spawned process
///
/// Resolves with the process output. Panics and aborts surface as
/// [`TupleSpaceError::ProcessFailed`].
pub struct Process<T> {
    handle: JoinHandle<Result<T, TupleSpaceError>>,
}

impl<T> Process<T> {
    /// Stop the process at its next suspension point
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Whether the process has run to completion
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Handle that can abort the process after this one is consumed
    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.abort_handle()
    }
}

impl<T> fmt::Debug for Process<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("finished", &self.handle.is_finished())
            .finish()
    }
}

impl<T> Future for Process<T> {
    type Output = Result<T, TupleSpaceError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Ready(Ok(output)) => Poll::Ready(output),
            Poll::Ready(Err(e)) => Poll::Ready(Err(join_failure(e))),
            Poll::Pending => Poll::Pending,
        }
    }
}

fn join_failure(error: JoinError) -> TupleSpaceError {
    if error.is_cancelled() {
        TupleSpaceError::ProcessFailed("aborted".to_string())
    } else {
        TupleSpaceError::ProcessFailed(format!("panicked: {}", error))
    }
}

/// Resolves its [`Event`] exactly once
pub struct EventTrigger<T> {
    sender: oneshot::Sender<Result<T, String>>,
}

impl<T> EventTrigger<T> {
    /// Resolve the event with a value
    pub fn succeed(self, value: T) {
        // nobody listening is fine
        let _ = self.sender.send(Ok(value));
    }

    /// Resolve the event with a failure
    pub fn fail(self, reason: impl Into<String>) {
        let _ = self.sender.send(Err(reason.into()));
    }
}

/// Resolve-once event
///
/// Clones share the outcome; every clone wakes when the trigger fires.
#[derive(Clone)]
pub struct Event<T: Clone> {
    outcome: Shared<BoxFuture<'static, Result<T, TupleSpaceError>>>,
}

impl<T: Clone> Event<T> {
    /// Outcome, if some clone has already observed the resolution
    pub fn peek(&self) -> Option<Result<T, TupleSpaceError>> {
        self.outcome.peek().cloned()
    }
}

impl<T: Clone> Future for Event<T> {
    type Output = Result<T, TupleSpaceError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.outcome).poll(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_resolves_after_delay() {
        let scheduler = Scheduler::current().unwrap();
        let value = scheduler.timeout(Duration::from_secs(3), 42).await;

        assert_eq!(value, 42);
        assert_eq!(scheduler.now(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_processes_run_concurrently() {
        let scheduler = Scheduler::current().unwrap();
        let processes = (1..=3)
            .map(|i| {
                let timer = scheduler.timeout(Duration::from_secs(1), i);
                scheduler.spawn(async move { Ok(timer.await) })
            })
            .collect();

        let values = scheduler.all_of(processes).await.unwrap();
        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(scheduler.now(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_of_fails_without_waiting_for_slow_members() {
        let scheduler = Scheduler::current().unwrap();
        let slow = scheduler.timeout(Duration::from_secs(10), 1);
        let processes = vec![
            scheduler.spawn(async move { Ok(slow.await) }),
            scheduler.spawn(async { Err(TupleSpaceError::ProcessFailed("boom".to_string())) }),
        ];

        let result = scheduler.all_of(processes).await;
        assert_eq!(
            result,
            Err(TupleSpaceError::ProcessFailed("boom".to_string()))
        );
        assert!(scheduler.now() < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_any_of_returns_first_success() {
        let scheduler = Scheduler::current().unwrap();
        let slow = scheduler.timeout(Duration::from_secs(5), "slow");
        let fast = scheduler.timeout(Duration::from_secs(1), "fast");
        let processes = vec![
            scheduler.spawn(async move { Ok(slow.await) }),
            scheduler.spawn(async { Err(TupleSpaceError::ProcessFailed("nope".to_string())) }),
            scheduler.spawn(async move { Ok(fast.await) }),
        ];

        assert_eq!(scheduler.any_of(processes).await, Ok((2, "fast")));
        assert_eq!(scheduler.now(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_any_of_empty_fails() {
        let scheduler = Scheduler::current().unwrap();
        let result = scheduler.any_of(Vec::<Process<()>>::new()).await;
        assert!(matches!(result, Err(TupleSpaceError::ProcessFailed(_))));
    }

    #[tokio::test]
    async fn test_event_wakes_every_clone() {
        let scheduler = Scheduler::current().unwrap();
        let (trigger, event) = scheduler.event::<String>();

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let event = event.clone();
                scheduler.spawn(async move { event.await })
            })
            .collect();

        trigger.succeed("ready".to_string());

        let values = scheduler.all_of(waiters).await.unwrap();
        assert_eq!(values, vec!["ready".to_string(); 3]);
        assert_eq!(event.peek(), Some(Ok("ready".to_string())));
    }

    #[tokio::test]
    async fn test_event_failure_and_abandonment() {
        let scheduler = Scheduler::current().unwrap();

        let (trigger, event) = scheduler.event::<u32>();
        trigger.fail("cancelled by operator");
        assert_eq!(
            event.await,
            Err(TupleSpaceError::EventFailed("cancelled by operator".to_string()))
        );

        let (trigger, event) = scheduler.event::<u32>();
        drop(trigger);
        assert!(matches!(event.await, Err(TupleSpaceError::EventFailed(_))));
    }

    #[tokio::test]
    async fn test_aborted_process_reports_failure() {
        let scheduler = Scheduler::current().unwrap();
        let process = scheduler.spawn(async {
            futures::future::pending::<()>().await;
            Ok(())
        });

        process.abort();
        assert_eq!(
            process.await,
            Err(TupleSpaceError::ProcessFailed("aborted".to_string()))
        );
    }

    #[test]
    fn test_current_outside_runtime_fails() {
        assert!(matches!(
            Scheduler::current(),
            Err(TupleSpaceError::NoRuntime(_))
        ));
    }
}
