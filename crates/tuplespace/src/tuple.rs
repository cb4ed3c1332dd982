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

//! Tuple values
//!
//! ## Purpose
//! A tuple is an ordered, fixed-length sequence of heterogeneous fields.
//! Tuples are immutable once published and compare structurally, so two
//! tuples with the same fields are equal but remain independent entries
//! in the space.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::pattern::{Pattern, PatternField};

/// A tuple in the space
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tuple {
    /// Tuple fields
    fields: Vec<TupleField>,
}

impl Tuple {
    /// Create a new tuple from fields
    pub fn new(fields: Vec<TupleField>) -> Self {
        Tuple { fields }
    }

    /// Get the fields of the tuple
    pub fn fields(&self) -> &[TupleField] {
        &self.fields
    }

    /// Consume the tuple, returning its fields
    pub fn into_fields(self) -> Vec<TupleField> {
        self.fields
    }

    /// Number of fields
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Get a single field by position
    pub fn get(&self, index: usize) -> Option<&TupleField> {
        self.fields.get(index)
    }

    /// Check if tuple matches a pattern
    pub fn matches(&self, pattern: &Pattern) -> bool {
        pattern.matches(self)
    }

    /// Build the pattern that matches exactly this tuple
    pub fn to_pattern(&self) -> Pattern {
        Pattern::new(
            self.fields
                .iter()
                .cloned()
                .map(PatternField::Exact)
                .collect(),
        )
    }
}

impl From<Vec<TupleField>> for Tuple {
    fn from(fields: Vec<TupleField>) -> Self {
        Tuple::new(fields)
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", field)?;
        }
        // (x,) keeps a single-field tuple distinguishable from a parenthesized value
        if self.fields.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

/// Field in a tuple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TupleField {
    /// Integer value
    Integer(i64),
    /// String value
    String(String),
    /// Boolean value
    Boolean(bool),
    /// Binary data
    Binary(Vec<u8>),
    /// Floating point
    Float(OrderedFloat),
    /// Null value
    Null,
}

impl TupleField {
    /// Integer payload, if this is an integer field
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            TupleField::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload, if this is a string field
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TupleField::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Float payload, if this is a float field
    pub fn as_float(&self) -> Option<f64> {
        match self {
            TupleField::Float(v) => Some(v.get()),
            _ => None,
        }
    }

    /// Boolean payload, if this is a boolean field
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TupleField::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for TupleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TupleField::Integer(v) => write!(f, "{}", v),
            TupleField::String(v) => write!(f, "{:?}", v),
            TupleField::Boolean(v) => write!(f, "{}", v),
            TupleField::Binary(bytes) => {
                write!(f, "0x")?;
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            TupleField::Float(v) => write!(f, "{:?}", v.get()),
            TupleField::Null => write!(f, "null"),
        }
    }
}

/// Ordered float for hashing
///
/// Equality, ordering and hashing all follow the IEEE-754 total order, so
/// `NaN == NaN` and `-0.0 != 0.0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(f64);

impl OrderedFloat {
    /// Create a new OrderedFloat from a float value
    pub fn new(value: f64) -> Self {
        OrderedFloat(value)
    }

    /// Get the inner float value
    pub fn get(&self) -> f64 {
        self.0
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Helper macro for creating tuples from values
///
/// # Examples
/// ```
/// use lindaspace_tuplespace::{tuple, TupleField};
/// let t = tuple!(1, "hello", true);
/// assert_eq!(t.fields()[1], TupleField::String("hello".to_string()));
/// ```
#[macro_export]
macro_rules! tuple {
    ($($field:expr),* $(,)?) => {
        $crate::Tuple::new(vec![$($crate::TupleField::from($field)),*])
    };
}

// Conversion traits
impl From<i64> for TupleField {
    fn from(val: i64) -> Self {
        TupleField::Integer(val)
    }
}

impl From<i32> for TupleField {
    fn from(val: i32) -> Self {
        TupleField::Integer(i64::from(val))
    }
}

impl From<String> for TupleField {
    fn from(val: String) -> Self {
        TupleField::String(val)
    }
}

impl From<&str> for TupleField {
    fn from(val: &str) -> Self {
        TupleField::String(val.to_string())
    }
}

impl From<bool> for TupleField {
    fn from(val: bool) -> Self {
        TupleField::Boolean(val)
    }
}

impl From<Vec<u8>> for TupleField {
    fn from(val: Vec<u8>) -> Self {
        TupleField::Binary(val)
    }
}

impl From<f64> for TupleField {
    fn from(val: f64) -> Self {
        TupleField::Float(OrderedFloat(val))
    }
}

impl From<()> for TupleField {
    fn from(_: ()) -> Self {
        TupleField::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_ordering() {
        let tuple1 = Tuple::new(vec![TupleField::Integer(1)]);
        let tuple2 = Tuple::new(vec![TupleField::Integer(2)]);
        let tuple3 = Tuple::new(vec![TupleField::Integer(1)]);

        assert!(tuple1 < tuple2);
        assert!(tuple1 == tuple3);
        assert_eq!(tuple1.cmp(&tuple3), Ordering::Equal);
    }

    #[test]
    fn test_structural_equality_requires_same_arity() {
        let short = tuple!(1, 2);
        let long = tuple!(1, 2, 3);
        assert_ne!(short, long);
        assert_eq!(short, tuple!(1i64, 2i64));
    }

    #[test]
    fn test_tuple_field_from_conversions() {
        let from_str: TupleField = "test".into();
        assert_eq!(from_str, TupleField::String("test".to_string()));

        let from_bool: TupleField = true.into();
        assert_eq!(from_bool, TupleField::Boolean(true));

        let from_bytes: TupleField = vec![1u8, 2, 3].into();
        assert_eq!(from_bytes, TupleField::Binary(vec![1, 2, 3]));

        let from_float: TupleField = 2.5.into();
        assert_eq!(from_float, TupleField::Float(OrderedFloat(2.5)));

        let from_i32: TupleField = 7i32.into();
        assert_eq!(from_i32, TupleField::Integer(7));

        let from_unit: TupleField = ().into();
        assert_eq!(from_unit, TupleField::Null);
    }

    #[test]
    fn test_ordered_float_nan_is_self_equal() {
        let nan = OrderedFloat::new(f64::NAN);
        assert_eq!(nan, OrderedFloat::new(f64::NAN));
        assert_ne!(OrderedFloat::new(0.0), OrderedFloat::new(-0.0));
        assert!(OrderedFloat::new(1.0) < OrderedFloat::new(2.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(tuple!(1, "three").to_string(), r#"(1, "three")"#);
        assert_eq!(tuple!(1).to_string(), "(1,)");
        assert_eq!(tuple!(vec![0u8, 255u8], ()).to_string(), "(0x00ff, null)");
        assert_eq!(tuple!(1.0).to_string(), "(1.0,)");
    }

    #[test]
    fn test_to_pattern_matches_self() {
        let tuple = tuple!("a", 1, 2.5, false);
        assert!(tuple.matches(&tuple.to_pattern()));
        assert!(!tuple!("a", 1, 2.5, true).matches(&tuple.to_pattern()));
    }

    #[test]
    fn test_accessors() {
        let tuple = tuple!("job", 42);
        assert_eq!(tuple.arity(), 2);
        assert_eq!(tuple.get(0).and_then(TupleField::as_str), Some("job"));
        assert_eq!(tuple.get(1).and_then(TupleField::as_integer), Some(42));
        assert_eq!(tuple.get(2), None);
    }
}
