//! Collections, records and the operations run over them.

mod id_generator;
mod json_collection;
pub mod operation;
mod record;

pub use id_generator::*;
pub use json_collection::*;
pub use record::*;
