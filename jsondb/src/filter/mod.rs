//! Where-clauses and the predicates they parse into.
//!
//! A where-clause is a JSON object mapping field names to a literal (equality)
//! or an operator-object. It is parsed once into a [Predicate] made of tagged
//! [Condition]s, which is then evaluated against every record of a collection.
//!
//! ```rust,ignore
//! use jsondb::filter::{field, Predicate};
//! use serde_json::json;
//!
//! // parsed from JSON
//! let adults = Predicate::parse(&json!({ "age": { "$gt": 17 } }))?;
//!
//! // or built fluently
//! let adults = field("age").gt(17);
//! ```
//!
//! # Supported Operators
//!
//! - literal value: equality, the field must be present
//! - `$gt`: greater than
//! - `$lt`: less than
//!
//! Unknown `$` operators are accepted but never match.

mod condition;
mod fluent;
mod predicate;

pub use condition::*;
pub use fluent::*;
pub use predicate::*;
