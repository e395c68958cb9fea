use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::fmt::Display;

use crate::{GREATER_THAN, LESS_THAN};

/// A single test applied to one field of a record.
///
/// Conditions are produced by parsing a where-clause (see [super::Predicate::parse])
/// or by the fluent API (see [super::field]).
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The field is present and equal to the value.
    Equals(Value),
    /// The field is present and orders after the value.
    GreaterThan(Value),
    /// The field is present and orders before the value.
    LessThan(Value),
    /// An operator this store does not know. Never matches.
    Unsupported(String),
}

impl Condition {
    /// Builds the condition for an operator key of an operator-object.
    pub(crate) fn from_operator(operator: &str, operand: Value) -> Condition {
        match operator {
            GREATER_THAN => Condition::GreaterThan(operand),
            LESS_THAN => Condition::LessThan(operand),
            other => {
                log::warn!("Unsupported where-clause operator {}, it will match nothing", other);
                Condition::Unsupported(other.to_string())
            }
        }
    }

    /// Evaluates the condition against the field value of a record.
    ///
    /// `None` means the record does not have the field, which fails every condition.
    pub fn test(&self, field_value: Option<&Value>) -> bool {
        let Some(field_value) = field_value else {
            return false;
        };

        match self {
            Condition::Equals(expected) => values_equal(field_value, expected),
            Condition::GreaterThan(bound) => {
                compare_values(field_value, bound) == Some(Ordering::Greater)
            }
            Condition::LessThan(bound) => compare_values(field_value, bound) == Some(Ordering::Less),
            Condition::Unsupported(_) => false,
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Equals(value) => write!(f, "== {}", value),
            Condition::GreaterThan(value) => write!(f, "> {}", value),
            Condition::LessThan(value) => write!(f, "< {}", value),
            Condition::Unsupported(operator) => write!(f, "{} ?", operator),
        }
    }
}

/// Strict equality of two JSON values, with no coercion between types.
///
/// Numbers are equal when their numeric values are equal (`1` equals `1.0`),
/// arrays and objects are compared element by element.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => compare_numbers(l, r) == Some(Ordering::Equal),
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(key, a)| r.get(key).is_some_and(|b| values_equal(a, b)))
        }
        _ => left == right,
    }
}

/// Natural ordering of two JSON values of the same kind.
///
/// Numbers compare numerically, strings lexicographically and booleans with
/// `false < true`. Every other pairing is unordered and yields `None`.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => compare_numbers(l, r),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

fn compare_numbers(left: &Number, right: &Number) -> Option<Ordering> {
    if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        return Some(l.cmp(&r));
    }
    if let (Some(l), Some(r)) = (left.as_u64(), right.as_u64()) {
        return Some(l.cmp(&r));
    }
    // a negative i64 against a u64 above i64::MAX
    if left.is_i64() && right.is_u64() {
        return Some(Ordering::Less);
    }
    if left.is_u64() && right.is_i64() {
        return Some(Ordering::Greater);
    }
    left.as_f64()?.partial_cmp(&right.as_f64()?)
}
