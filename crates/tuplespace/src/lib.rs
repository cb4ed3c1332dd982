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

//! Linda-style tuplespace coordination
//!
//! Provides an in-process shared tuple store with pattern matching,
//! blocking retrieval and `eval` for tuples whose fields are computed
//! by concurrent processes.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Data model
pub mod pattern;
pub mod tuple;

pub mod error;

// Blocking store and the Linda facade on top of it
pub mod space;
pub mod store;

// Process coordination
pub mod eval;
pub mod scheduler;

// Configuration module
pub mod config;

// Re-export main types
pub use config::TupleSpaceConfig;
pub use error::TupleSpaceError;
pub use eval::{Pending, Template, TemplateField};
pub use pattern::{FieldType, Pattern, PatternField};
pub use scheduler::{Event, EventTrigger, Process, Scheduler};
pub use space::TupleSpace;
pub use store::{MatchStore, Request, TupleSpaceStats};
pub use tuple::{OrderedFloat, Tuple, TupleField};
