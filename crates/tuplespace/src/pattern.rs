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

//! Pattern matching
//!
//! A pattern is a fixed-length sequence of field matchers. Each matcher is
//! either a concrete value (the field must equal it) or a type tag (the field
//! must be of that kind). Arity or type mismatches are never errors, they
//! just fail to match.

use serde::{Deserialize, Serialize};

use crate::tuple::{Tuple, TupleField};

/// Pattern for matching tuples
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern {
    /// Pattern fields
    fields: Vec<PatternField>,
}

impl Pattern {
    /// Create a new pattern
    pub fn new(fields: Vec<PatternField>) -> Self {
        Pattern { fields }
    }

    /// Get the pattern fields
    pub fn fields(&self) -> &[PatternField] {
        &self.fields
    }

    /// Number of matchers in the pattern
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Check if a tuple matches this pattern
    pub fn matches(&self, tuple: &Tuple) -> bool {
        let fields = tuple.fields();
        if self.fields.len() != fields.len() {
            return false;
        }

        self.fields
            .iter()
            .zip(fields.iter())
            .all(|(pattern_field, tuple_field)| pattern_field.matches(tuple_field))
    }
}

impl From<&Tuple> for Pattern {
    fn from(tuple: &Tuple) -> Self {
        tuple.to_pattern()
    }
}

/// Field in a pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternField {
    /// Exact match
    Exact(TupleField),
    /// Type constraint
    Type(FieldType),
}

impl PatternField {
    /// Matches any field value
    pub const ANY: PatternField = PatternField::Type(FieldType::Any);

    /// Check if a field matches this pattern
    pub fn matches(&self, field: &TupleField) -> bool {
        match self {
            PatternField::Exact(expected) => field == expected,
            PatternField::Type(field_type) => field_type.admits(field),
        }
    }
}

/// Field type for pattern matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldType {
    /// Any field at all
    Any,
    /// Integer type
    Integer,
    /// Floating point type
    Float,
    /// Integer or floating point
    Number,
    /// String type
    String,
    /// Boolean type
    Boolean,
    /// Binary data type
    Binary,
    /// Null/empty type
    Null,
}

impl FieldType {
    /// Whether a field satisfies this type tag
    pub fn admits(&self, field: &TupleField) -> bool {
        matches!(
            (self, field),
            (FieldType::Any, _)
                | (FieldType::Integer, TupleField::Integer(_))
                | (FieldType::Float, TupleField::Float(_))
                | (FieldType::Number, TupleField::Integer(_) | TupleField::Float(_))
                | (FieldType::String, TupleField::String(_))
                | (FieldType::Boolean, TupleField::Boolean(_))
                | (FieldType::Binary, TupleField::Binary(_))
                | (FieldType::Null, TupleField::Null)
        )
    }
}

/// Helper macro for creating patterns
///
/// Each argument converts into a [`PatternField`]: plain values become exact
/// matchers and [`FieldType`] tags become type matchers.
///
/// # Examples
/// ```
/// use lindaspace_tuplespace::{pattern, tuple, FieldType};
/// let p = pattern!("three", FieldType::Integer);
/// assert!(p.matches(&tuple!("three", 4)));
/// ```
#[macro_export]
macro_rules! pattern {
    ($($field:expr),* $(,)?) => {
        $crate::Pattern::new(vec![$($crate::PatternField::from($field)),*])
    };
}

impl From<FieldType> for PatternField {
    fn from(val: FieldType) -> Self {
        PatternField::Type(val)
    }
}

impl From<TupleField> for PatternField {
    fn from(val: TupleField) -> Self {
        PatternField::Exact(val)
    }
}

impl From<i64> for PatternField {
    fn from(val: i64) -> Self {
        PatternField::Exact(val.into())
    }
}

impl From<i32> for PatternField {
    fn from(val: i32) -> Self {
        PatternField::Exact(val.into())
    }
}

impl From<&str> for PatternField {
    fn from(val: &str) -> Self {
        PatternField::Exact(val.into())
    }
}

impl From<String> for PatternField {
    fn from(val: String) -> Self {
        PatternField::Exact(val.into())
    }
}

impl From<bool> for PatternField {
    fn from(val: bool) -> Self {
        PatternField::Exact(val.into())
    }
}

impl From<f64> for PatternField {
    fn from(val: f64) -> Self {
        PatternField::Exact(val.into())
    }
}

impl From<Vec<u8>> for PatternField {
    fn from(val: Vec<u8>) -> Self {
        PatternField::Exact(val.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple;

    #[test]
    fn test_equal_values_match() {
        assert!(pattern!(1, 2, 3).matches(&tuple!(1, 2, 3)));
        assert!(pattern!("s").matches(&tuple!("s")));
        assert!(pattern!("a", 1, true, 2.5).matches(&tuple!("a", 1, true, 2.5)));
    }

    #[test]
    fn test_wrong_length() {
        assert!(!pattern!(1, 2, 3).matches(&tuple!(1, 2)));
        assert!(!pattern!(FieldType::Any).matches(&tuple!(1, 2)));
        assert!(!pattern!(FieldType::Any, FieldType::Any, FieldType::Any).matches(&tuple!(1, 2)));
    }

    #[test]
    fn test_wrong_type() {
        assert!(!pattern!(1, FieldType::String).matches(&tuple!(1, 2)));
        assert!(pattern!(1, FieldType::Integer).matches(&tuple!(1, 2)));
    }

    #[test]
    fn test_wrong_values() {
        assert!(!pattern!(1, 2, 3).matches(&tuple!(1, 2, 4)));
        assert!(!pattern!("s").matches(&tuple!("x")));
        assert!(!pattern!("a", 1, true).matches(&tuple!("a", 2, true)));
    }

    #[test]
    fn test_integer_literal_does_not_equal_float() {
        assert!(!pattern!(1).matches(&tuple!(1.0)));
    }

    #[test]
    fn test_field_type_tags() {
        let cases = [
            (FieldType::Integer, TupleField::Integer(42), true),
            (FieldType::Integer, TupleField::from("x"), false),
            (FieldType::Float, TupleField::from(3.5), true),
            (FieldType::Number, TupleField::Integer(1), true),
            (FieldType::Number, TupleField::from(3.5), true),
            (FieldType::Number, TupleField::Boolean(true), false),
            (FieldType::String, TupleField::from("x"), true),
            (FieldType::Boolean, TupleField::Boolean(false), true),
            (FieldType::Binary, TupleField::Binary(vec![1]), true),
            (FieldType::Null, TupleField::Null, true),
            (FieldType::Null, TupleField::Integer(0), false),
            (FieldType::Any, TupleField::Null, true),
        ];

        for (tag, field, expected) in cases {
            assert_eq!(tag.admits(&field), expected, "{:?} vs {:?}", tag, field);
        }
    }

    #[test]
    fn test_empty_pattern_matches_empty_tuple_only() {
        let empty = Pattern::new(vec![]);
        assert!(empty.matches(&Tuple::new(vec![])));
        assert!(!empty.matches(&tuple!(1)));
    }

    #[test]
    fn test_any_constant() {
        let p = Pattern::new(vec![PatternField::ANY, PatternField::from(2)]);
        assert!(p.matches(&tuple!(1, 2)));
        assert!(p.matches(&tuple!("x", 2)));
        assert!(!p.matches(&tuple!("x", 3)));
    }
}
