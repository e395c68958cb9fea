use serde_json::Value;

use super::{Condition, FieldCondition, Predicate};

/// Creates a fluent predicate builder for the specified field name.
///
/// ```rust,ignore
/// use jsondb::filter::field;
///
/// let adults = field("age").gt(17).and(field("country").eq("PK"));
/// let rows = db.filter_by("users", &adults)?;
/// ```
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A predicate that matches every record.
pub fn all() -> Predicate {
    Predicate::default()
}

/// A builder for a predicate on one field.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    /// Matches records where the field equals the value.
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Predicate {
        self.build(Condition::Equals(value.into()))
    }

    /// Matches records where the field is greater than the value.
    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> Predicate {
        self.build(Condition::GreaterThan(value.into()))
    }

    /// Matches records where the field is less than the value.
    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> Predicate {
        self.build(Condition::LessThan(value.into()))
    }

    /// Matches records where the field lies strictly between the two values.
    pub fn between<T: Into<Value>>(self, lower: T, upper: T) -> Predicate {
        Predicate::new(vec![
            FieldCondition::new(&self.field_name, Condition::GreaterThan(lower.into())),
            FieldCondition::new(&self.field_name, Condition::LessThan(upper.into())),
        ])
    }

    fn build(self, condition: Condition) -> Predicate {
        Predicate::new(vec![FieldCondition::new(&self.field_name, condition)])
    }
}
