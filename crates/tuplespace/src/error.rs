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

/// TupleSpace errors
///
/// Every failure is local to the operation that raised it; none of them
/// leave the store in a modified state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TupleSpaceError {
    /// No resident tuple matched a non-blocking consume or peek
    #[error("Tuple not found")]
    NotFound,

    /// Template passed to eval has no pending sub-computation
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// A sub-computation spawned by eval failed
    #[error("Sub-computation at position {index} failed: {reason}")]
    SubComputationFailure {
        /// Template position of the failed sub-computation
        index: usize,
        /// Failure description
        reason: String,
    },

    /// A spawned process panicked or was aborted
    #[error("Process failed: {0}")]
    ProcessFailed(String),

    /// An event was failed by its trigger or abandoned
    #[error("Event failed: {0}")]
    EventFailed(String),

    /// No tokio runtime available to schedule on
    #[error("No runtime: {0}")]
    NoRuntime(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
