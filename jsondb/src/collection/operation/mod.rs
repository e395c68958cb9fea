//! The row-set engine: pure functions over the in-memory records of one
//! collection. Callers load the records, run one of these, and save the
//! records back when they were mutated.

mod read_operations;
mod write_operations;
mod write_result;

pub use read_operations::*;
pub use write_operations::*;
pub use write_result::*;
