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

//! Linda `eval`: publish a tuple whose fields are still being computed
//!
//! ## Purpose
//! A [`Template`] mixes plain values with [`Pending`] sub-computations.
//! [`TupleSpace::eval`] spawns every sub-computation as its own process,
//! waits for all of them, writes each result into the position it came
//! from and publishes the finished tuple with `out`.
//!
//! ## Failure
//! - No pending field: `InvalidTemplate`, raised before anything is spawned
//! - Any sub-computation fails or panics: `SubComputationFailure` with its
//!   template position; the other sub-computations are aborted and nothing
//!   is published
//!
//! ## Example
//! ```
//! use lindaspace_tuplespace::{tuple, Scheduler, Template, TupleSpace};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), lindaspace_tuplespace::TupleSpaceError> {
//! let space = TupleSpace::new(Scheduler::current()?);
//! let answer = space.timeout(Duration::from_millis(10), 42);
//!
//! let process = space.eval(
//!     Template::new()
//!         .value("answer")
//!         .pending(async move { anyhow::Ok(answer.await) }),
//! )?;
//!
//! assert_eq!(process.await?, tuple!("answer", 42));
//! assert_eq!(space.items(), vec![tuple!("answer", 42)]);
//! # Ok(())
//! # }
//! ```

use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::task::AbortHandle;

use crate::scheduler::Process;
use crate::{Tuple, TupleField, TupleSpace, TupleSpaceError};

/// Sub-computation embedded in a [`Template`]
pub struct Pending {
    computation: BoxFuture<'static, anyhow::Result<TupleField>>,
}

impl Pending {
    /// Tag a future as a sub-computation producing one tuple field
    pub fn new<F, V, E>(future: F) -> Self
    where
        F: Future<Output = Result<V, E>> + Send + 'static,
        V: Into<TupleField>,
        E: Into<anyhow::Error>,
    {
        let computation = async move {
            match future.await {
                Ok(value) => Ok::<TupleField, anyhow::Error>(value.into()),
                Err(e) => Err(e.into()),
            }
        };

        Pending {
            computation: computation.boxed(),
        }
    }

    async fn run(self, index: usize) -> Result<TupleField, TupleSpaceError> {
        match AssertUnwindSafe(self.computation).catch_unwind().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(TupleSpaceError::SubComputationFailure {
                index,
                reason: format!("{:#}", e),
            }),
            Err(_) => Err(TupleSpaceError::SubComputationFailure {
                index,
                reason: "panicked".to_string(),
            }),
        }
    }
}

impl fmt::Debug for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pending").field(&"<computation>").finish()
    }
}

/// Field of a [`Template`]
#[derive(Debug)]
pub enum TemplateField {
    /// Published as-is
    Value(TupleField),
    /// Replaced by the sub-computation's result
    Pending(Pending),
}

/// Tuple shape passed to [`TupleSpace::eval`]
#[derive(Debug, Default)]
pub struct Template {
    fields: Vec<TemplateField>,
}

impl Template {
    /// Empty template
    pub fn new() -> Self {
        Self::default()
    }

    /// Template from explicit fields
    pub fn from_fields(fields: Vec<TemplateField>) -> Self {
        Template { fields }
    }

    /// Append a plain value
    pub fn value(mut self, value: impl Into<TupleField>) -> Self {
        self.fields.push(TemplateField::Value(value.into()));
        self
    }

    /// Append a sub-computation
    pub fn pending<F, V, E>(mut self, future: F) -> Self
    where
        F: Future<Output = Result<V, E>> + Send + 'static,
        V: Into<TupleField>,
        E: Into<anyhow::Error>,
    {
        self.fields.push(TemplateField::Pending(Pending::new(future)));
        self
    }

    /// Number of fields
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Number of pending sub-computations
    pub fn pending_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| matches!(f, TemplateField::Pending(_)))
            .count()
    }
}

impl From<Tuple> for Template {
    fn from(tuple: Tuple) -> Self {
        Template::from_fields(
            tuple
                .into_fields()
                .into_iter()
                .map(TemplateField::Value)
                .collect(),
        )
    }
}

/// Aborts spawned sub-computations unless the join completed
struct SubComputationGuard {
    handles: Vec<AbortHandle>,
    armed: bool,
}

impl Drop for SubComputationGuard {
    fn drop(&mut self) {
        if self.armed {
            for handle in &self.handles {
                handle.abort();
            }
        }
    }
}

impl TupleSpace {
    /// Evaluate a template and publish the resolved tuple
    ///
    /// Sub-computations start immediately and run concurrently. The
    /// returned process resolves with the published tuple.
    ///
    /// ## Errors
    /// - [`TupleSpaceError::InvalidTemplate`]: the template has no pending
    ///   sub-computation; nothing is spawned or published
    ///
    /// The returned process fails with
    /// [`TupleSpaceError::SubComputationFailure`] if any sub-computation does.
    pub fn eval(&self, template: Template) -> Result<Process<Tuple>, TupleSpaceError> {
        let pending = template.pending_count();
        if pending == 0 {
            let reason = if template.fields.is_empty() {
                "template is empty"
            } else {
                "template has no pending sub-computation"
            };
            return Err(TupleSpaceError::InvalidTemplate(reason.to_string()));
        }

        let arity = template.arity();
        let scheduler = self.scheduler().clone();
        let mut slots: Vec<Option<TupleField>> = Vec::with_capacity(arity);
        let mut positions = Vec::with_capacity(pending);
        let mut units = Vec::with_capacity(pending);

        for (index, field) in template.fields.into_iter().enumerate() {
            match field {
                TemplateField::Value(value) => slots.push(Some(value)),
                TemplateField::Pending(computation) => {
                    slots.push(None);
                    positions.push(index);
                    units.push(scheduler.spawn(computation.run(index)));
                }
            }
        }

        tracing::debug!(
            namespace = %self.namespace(),
            arity,
            pending,
            "Spawned eval sub-computations"
        );

        let mut guard = SubComputationGuard {
            handles: units.iter().map(Process::abort_handle).collect(),
            armed: true,
        };
        let space = self.clone();

        Ok(scheduler.spawn(async move {
            let values = match space.scheduler().all_of(units).await {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!(
                        namespace = %space.namespace(),
                        error = %e,
                        "Eval failed, template not published"
                    );
                    return Err(e);
                }
            };
            guard.armed = false;

            for (index, value) in positions.into_iter().zip(values) {
                slots[index] = Some(value);
            }

            let tuple = Tuple::new(slots.into_iter().flatten().collect());
            space.out(tuple.clone()).await;

            tracing::debug!(namespace = %space.namespace(), arity, "Eval published tuple");
            Ok(tuple)
        }))
    }
}
