//! Shared constants, locking and small utilities used across jsondb.

mod constants;
mod lock;
mod response;
pub(crate) mod util;

pub use constants::*;
pub use lock::*;
pub use response::*;
pub use util::*;
