//! # jsondb - file-backed JSON document store
//!
//! jsondb keeps every collection in its own JSON file, `<base_dir>/<name>.json`,
//! shaped as `{ "<name>": [ record, ... ] }`. Records are JSON objects with no fixed
//! schema; each inserted record gets a numeric `id`.
//!
//! There is no index and no query planner. Every operation reads the whole
//! collection file, scans it in memory, and writes mutations back by replacing the
//! whole file through a temporary file and a rename.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jsondb::{JsonDb, Response};
//! use jsondb::filter::field;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = JsonDb::builder().base_dir("/tmp/my-app/database").open()?;
//! db.create_collection("users")?;
//!
//! db.insert_many("users", vec![
//!     json!({ "name": "Sanan", "age": 24 }),
//!     json!({ "name": "Junaid", "age": 32 }),
//! ])?;
//!
//! // where-clauses are plain JSON ...
//! let adults = db.filter("users", &json!({ "age": { "$gt": 20 } }))?.into_data();
//!
//! // ... or built with the fluent API
//! let sanan = db.filter_by("users", &field("name").eq("Sanan"))?.into_data();
//!
//! // the (success, data, message) triple
//! let response = Response::from(db.count("users"));
//! assert!(response.success);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [store]: maps collection names to files and moves records between disk and memory
//! - [filter]: where-clause parsing and record matching
//! - [collection]: the row-set engine, id generation and the collection handle
//! - [jsondb]: the store facade tying them together

pub mod collection;
pub mod common;
pub mod errors;
pub mod filter;
pub mod jsondb;
pub mod jsondb_builder;
pub mod jsondb_config;
pub mod store;

pub use common::*;
pub use crate::jsondb::JsonDb;
pub use crate::jsondb_builder::JsonDbBuilder;
pub use crate::jsondb_config::{JsonDbConfig, JsonDbSettings};

/// A stored record: a JSON object, field order preserved.
pub type Record = serde_json::Map<String, serde_json::Value>;
