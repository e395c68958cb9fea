use serde_json::Value;
use std::fmt::Display;

use super::Condition;
use crate::{
    errors::{ErrorKind, JsonDbError, JsonDbResult},
    Record, OPERATOR_PREFIX,
};

/// One condition bound to the field it tests.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCondition {
    field: String,
    condition: Condition,
}

impl FieldCondition {
    pub fn new(field: &str, condition: Condition) -> Self {
        FieldCondition {
            field: field.to_string(),
            condition,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    #[inline]
    pub fn matches(&self, record: &Record) -> bool {
        self.condition.test(record.get(&self.field))
    }
}

impl Display for FieldCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {})", self.field, self.condition)
    }
}

/// A parsed where-clause: every condition must hold for a record to match.
///
/// A where-clause maps field names to either a literal (equality) or an
/// operator-object such as `{"$gt": 20}`:
///
/// ```rust,ignore
/// use jsondb::filter::Predicate;
/// use serde_json::json;
///
/// let predicate = Predicate::parse(&json!({ "name": "Sanan", "age": { "$gt": 20 } }))?;
/// assert!(predicate.matches(json!({ "name": "Sanan", "age": 24 }).as_object().unwrap()));
/// ```
///
/// An operator-object holding several operators yields one condition per operator,
/// so `{"age": {"$gt": 20, "$lt": 30}}` is a range. An empty predicate matches every
/// record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate {
    conditions: Vec<FieldCondition>,
}

impl Predicate {
    pub fn new(conditions: Vec<FieldCondition>) -> Self {
        Predicate { conditions }
    }

    /// Parses a where-clause. Fails with [ErrorKind::InvalidPredicate] when the
    /// clause is not a JSON object or mixes operators with plain keys.
    pub fn parse(where_clause: &Value) -> JsonDbResult<Predicate> {
        let Value::Object(clause) = where_clause else {
            log::error!("WHERE clause should be an object, found {}", where_clause);
            return Err(JsonDbError::new(
                "WHERE clause should be an object.",
                ErrorKind::InvalidPredicate,
            ));
        };

        let mut conditions = Vec::with_capacity(clause.len());
        for (field, expected) in clause {
            if let Value::Object(operators) = expected {
                if is_operator_object(field, operators)? {
                    for (operator, operand) in operators {
                        conditions.push(FieldCondition::new(
                            field,
                            Condition::from_operator(operator, operand.clone()),
                        ));
                    }
                    continue;
                }
            }
            conditions.push(FieldCondition::new(field, Condition::Equals(expected.clone())));
        }
        Ok(Predicate { conditions })
    }

    /// Parses a where-clause that must hold at least one condition.
    pub fn parse_required(where_clause: &Value) -> JsonDbResult<Predicate> {
        let predicate = Predicate::parse(where_clause)?;
        if predicate.is_empty() {
            log::error!("There are no conditions passed to the WHERE clause");
            return Err(JsonDbError::new(
                "There are no conditions passed to the WHERE clause.",
                ErrorKind::InvalidPredicate,
            ));
        }
        Ok(predicate)
    }

    /// Returns `true` if the record satisfies every condition.
    #[inline]
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|condition| condition.matches(record))
    }

    /// Combines two predicates; the result requires both.
    pub fn and(mut self, other: Predicate) -> Predicate {
        self.conditions.extend(other.conditions);
        self
    }

    pub fn conditions(&self) -> &[FieldCondition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.conditions.is_empty() {
            return write!(f, "(all)");
        }
        let parts: Vec<String> = self.conditions.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(" && "))
    }
}

impl TryFrom<&Value> for Predicate {
    type Error = JsonDbError;

    fn try_from(where_clause: &Value) -> Result<Self, Self::Error> {
        Predicate::parse(where_clause)
    }
}

impl TryFrom<Value> for Predicate {
    type Error = JsonDbError;

    fn try_from(where_clause: Value) -> Result<Self, Self::Error> {
        Predicate::parse(&where_clause)
    }
}

// An object whose keys all start with '$' is an operator-object, one without any
// is a nested literal. The empty object is a literal.
fn is_operator_object(field: &str, object: &serde_json::Map<String, Value>) -> JsonDbResult<bool> {
    let operators = object
        .keys()
        .filter(|key| key.starts_with(OPERATOR_PREFIX))
        .count();

    if operators == 0 {
        return Ok(false);
    }
    if operators == object.len() {
        return Ok(true);
    }

    log::error!("Condition on field {} mixes operators and plain keys", field);
    Err(JsonDbError::new(
        &format!("Condition on field '{}' mixes operators and plain keys", field),
        ErrorKind::InvalidPredicate,
    ))
}
